//! Shared database handle.
//!
//! The connection pool is created on first use and reused by every request
//! afterwards. Migrations run once, right after the pool is opened.

use std::sync::Arc;

use migration::{Migrator, MigratorTrait};
use sea_orm::{Database, DatabaseConnection};
use tokio::sync::OnceCell;

use crate::{EngineError, ResultEngine};

#[derive(Clone, Debug)]
pub struct Store {
    url: Option<Arc<str>>,
    connection: Arc<OnceCell<DatabaseConnection>>,
}

impl Store {
    /// A handle that connects (and migrates) lazily on the first query.
    pub fn lazy(url: impl Into<String>) -> Self {
        Self {
            url: Some(Arc::from(url.into())),
            connection: Arc::new(OnceCell::new()),
        }
    }

    /// A handle over an already open connection. No migrations are run.
    pub fn from_connection(db: DatabaseConnection) -> Self {
        Self {
            url: None,
            connection: Arc::new(OnceCell::new_with(Some(db))),
        }
    }

    /// Returns the shared connection, opening it on first use.
    pub async fn connection(&self) -> ResultEngine<&DatabaseConnection> {
        self.connection
            .get_or_try_init(|| async {
                let url = self.url.as_deref().ok_or_else(|| {
                    EngineError::Configuration("database url not set".to_string())
                })?;
                tracing::info!("opening database connection");
                let db = Database::connect(url).await?;
                Migrator::up(&db, None).await?;
                Ok::<_, EngineError>(db)
            })
            .await
    }
}
