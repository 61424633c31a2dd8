use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, query, query_as, query_scalar};
use utoipa::ToSchema;

use super::Pool;

#[derive(Clone)]
pub struct Users {
    pool: Pool,
}

impl Users {
    pub(crate) fn new(pool: Pool) -> Self {
        return Self { pool };
    }

    pub async fn get_by_id(&self, user_id: &str) -> Result<Option<User>, sqlx::Error> {
        let user = query_as::<_, User>(
            "select id, external_id, name, email, created_at from users where id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        return Ok(user);
    }

    /// Creates the user on first login, refreshes name and email afterwards.
    /// Returns the id of the stored user, which differs from `user.id` when
    /// the external id was already known.
    pub async fn upsert_with_session(&self, user: &NewUser, session_id: &str) -> Result<String> {
        let mut tx = self.pool.begin().await.context("error starting tx")?;

        let now = Utc::now();

        let user_id = query_scalar::<_, String>(
            r#"
            insert into users (id, external_id, name, email, created_at)
            values ($1, $2, $3, $4, $5)
            on conflict (external_id) do update set
                name = coalesce(excluded.name, users.name),
                email = coalesce(excluded.email, users.email),
                updated_at = $5
            returning id
            "#,
        )
        .bind(&user.id)
        .bind(&user.external_id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .context("error upserting user")?;

        query("insert into sessions (id, user_id, created_at) values ($1, $2, $3)")
            .bind(session_id)
            .bind(&user_id)
            .bind(now)
            .execute(&mut *tx)
            .await
            .context("error inserting session")?;

        tx.commit().await.context("error committing tx")?;

        return Ok(user_id);
    }
}

pub struct NewUser {
    pub id: String,
    pub external_id: String,
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, FromRow, Serialize, ToSchema)]
pub struct User {
    pub id: String,
    #[serde(skip)]
    pub external_id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}
