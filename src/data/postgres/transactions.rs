use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, Postgres, QueryBuilder, query};
use utoipa::ToSchema;

use super::Pool;
use crate::{
    data::create_id,
    services::import::TxStore,
    statement_parsing::parser::{TxDraft, TxKind},
};

// 9 binds per row, well under the 65535 bind parameter limit
const INSERT_CHUNK_SIZE: usize = 1000;

const TX_COLUMNS: &str =
    "id, date, amount, kind, category, shop, description, created_at, updated_at";

#[derive(Clone)]
pub struct Transactions {
    pool: Pool,
}

impl Transactions {
    pub(crate) fn new(pool: Pool) -> Self {
        return Self { pool };
    }

    pub async fn query(&self, user_id: &str, filters: &TxFilters) -> Result<Vec<Tx>> {
        let mut query: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("select {TX_COLUMNS} from transactions where user_id = "));
        query.push_bind(user_id);

        if let Some(kind) = filters.kind {
            query.push(" and kind = ").push_bind(kind.as_str());
        }

        if let Some(category) = &filters.category {
            query
                .push(" and category ilike ")
                .push_bind(format!("%{category}%"));
        }

        if let Some(start_date) = &filters.start_date {
            query.push(" and date >= ").push_bind(start_date);
        }

        if let Some(end_date) = &filters.end_date {
            query.push(" and date <= ").push_bind(end_date);
        }

        query.push(" order by date desc, id desc");

        let rows = query
            .build_query_as::<TxRow>()
            .fetch_all(&self.pool)
            .await
            .context("error querying transactions")?;

        return rows.into_iter().map(Tx::try_from).collect();
    }

    pub async fn insert(&self, user_id: &str, tx: &TxDraft) -> Result<Tx> {
        let row = sqlx::query_as::<_, TxRow>(&format!(
            r#"
            insert into transactions (
                id, user_id, date, amount, kind,
                category, shop, description, created_at
            )
            values ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            returning {TX_COLUMNS}
            "#
        ))
        .bind(create_id())
        .bind(user_id)
        .bind(&tx.date)
        .bind(tx.amount)
        .bind(tx.kind.as_str())
        .bind(&tx.category)
        .bind(&tx.shop)
        .bind(&tx.description)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .context("error inserting transaction")?;

        return Tx::try_from(row);
    }

    /// Inserts all drafts in one database transaction, nothing is kept if
    /// any chunk fails.
    pub async fn insert_many(&self, user_id: &str, drafts: &[TxDraft]) -> Result<u64> {
        let now = Utc::now();
        let mut inserted = 0;

        let mut tx = self
            .pool
            .begin()
            .await
            .context("error starting transaction")?;

        for chunk in drafts.chunks(INSERT_CHUNK_SIZE) {
            let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
                r#"
                insert into transactions (
                    id, user_id, date, amount, kind,
                    category, shop, description, created_at
                )
                "#,
            );

            builder.push_values(chunk, |mut b, draft| {
                b.push_bind(create_id());
                b.push_bind(user_id);
                b.push_bind(&draft.date);
                b.push_bind(draft.amount);
                b.push_bind(draft.kind.as_str());
                b.push_bind(&draft.category);
                b.push_bind(&draft.shop);
                b.push_bind(&draft.description);
                b.push_bind(now);
            });

            let result = builder
                .build()
                .execute(&mut *tx)
                .await
                .context("error inserting transactions")?;

            inserted += result.rows_affected();
        }

        tx.commit().await.context("error committing transaction")?;

        return Ok(inserted);
    }

    pub async fn update(&self, user_id: &str, id: &str, tx: &TxDraft) -> Result<Option<Tx>> {
        let row = sqlx::query_as::<_, TxRow>(&format!(
            r#"
            update transactions set
                date = $3,
                amount = $4,
                kind = $5,
                category = $6,
                shop = $7,
                description = $8,
                updated_at = $9
            where id = $1 and user_id = $2
            returning {TX_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(user_id)
        .bind(&tx.date)
        .bind(tx.amount)
        .bind(tx.kind.as_str())
        .bind(&tx.category)
        .bind(&tx.shop)
        .bind(&tx.description)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .context("error updating transaction")?;

        return row.map(Tx::try_from).transpose();
    }

    /// Returns false when there was nothing to delete.
    pub async fn delete(&self, user_id: &str, id: &str) -> Result<bool, sqlx::Error> {
        let result = query("delete from transactions where id = $1 and user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        return Ok(result.rows_affected() > 0);
    }
}

impl TxStore for Transactions {
    async fn create_many(&self, user_id: &str, drafts: &[TxDraft]) -> Result<u64> {
        self.insert_many(user_id, drafts).await
    }
}

#[derive(Debug, Default)]
pub struct TxFilters {
    pub kind: Option<TxKind>,
    pub category: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Tx {
    pub id: String,
    pub date: String,
    pub amount: f64,
    #[serde(rename = "type")]
    pub kind: TxKind,
    pub category: String,
    pub shop: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, FromRow)]
struct TxRow {
    id: String,
    date: String,
    amount: f64,
    kind: String,
    category: String,
    shop: String,
    description: String,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

impl TryFrom<TxRow> for Tx {
    type Error = anyhow::Error;

    fn try_from(row: TxRow) -> Result<Self> {
        Ok(Tx {
            kind: row
                .kind
                .parse()
                .with_context(|| format!("bad kind on transaction {}", row.id))?,
            id: row.id,
            date: row.date,
            amount: row.amount,
            category: row.category,
            shop: row.shop,
            description: row.description,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
