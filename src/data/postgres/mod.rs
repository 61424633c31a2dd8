use anyhow::{Context, Result};
use sqlx::PgPool;

mod users;
pub use users::*;

mod sessions;
pub use sessions::*;

mod transactions;
pub use transactions::*;

type Pool = PgPool;

pub(crate) struct Postgres {
    pub users: Users,
    pub sessions: Sessions,
    pub transactions: Transactions,
}

impl Postgres {
    /// Connects and runs pending migrations.
    pub async fn connect(url: &str) -> Result<Pool> {
        let pool = PgPool::connect(url)
            .await
            .context("error connecting to postgres")?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("error running migrations")?;

        tracing::info!("database ready");

        return Ok(pool);
    }

    pub fn from_pool(pool: Pool) -> Self {
        return Self {
            users: Users::new(pool.clone()),
            sessions: Sessions::new(pool.clone()),
            transactions: Transactions::new(pool),
        };
    }
}
