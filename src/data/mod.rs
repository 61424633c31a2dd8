use anyhow::{Context, Result};
use sqlx::PgPool;

use crate::config::Config;

mod postgres;
pub use postgres::*;

mod id;
pub use id::create_id;

pub use crate::statement_parsing::parser::TxKind;

#[derive(Clone)]
pub struct Data {
    pub users: postgres::Users,
    pub sessions: postgres::Sessions,
    pub transactions: postgres::Transactions,
}

impl Data {
    pub async fn new(config: &Config) -> Result<Self> {
        let pool = Postgres::connect(&config.database_url)
            .await
            .context("error creating postgres")?;

        return Ok(Self::from_pool(pool));
    }

    pub fn from_pool(pool: PgPool) -> Self {
        let postgres = Postgres::from_pool(pool);

        return Self {
            users: postgres.users,
            sessions: postgres.sessions,
            transactions: postgres.transactions,
        };
    }
}
