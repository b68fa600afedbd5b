use sea_orm::DatabaseConnection;

use crate::{EngineError, ResultEngine, Store};

mod budgets;
mod summary;
mod transactions;
mod users;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.store.connection().await?.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

#[derive(Clone, Debug)]
pub struct Engine {
    store: Store,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// The underlying store handle.
    pub fn store(&self) -> &Store {
        &self.store
    }

    async fn db(&self) -> ResultEngine<&DatabaseConnection> {
        self.store.connection().await
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    store: Option<Store>,
}

impl EngineBuilder {
    /// Use an already open (and migrated) connection.
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.store = Some(Store::from_connection(db));
        self
    }

    /// Connect lazily to `url` on the first operation.
    pub fn database_url(mut self, url: impl Into<String>) -> EngineBuilder {
        self.store = Some(Store::lazy(url));
        self
    }

    /// Share an existing store handle.
    pub fn store(mut self, store: Store) -> EngineBuilder {
        self.store = Some(store);
        self
    }

    /// Construct `Engine`
    pub fn build(self) -> ResultEngine<Engine> {
        let store = self
            .store
            .ok_or_else(|| EngineError::Configuration("missing database".to_string()))?;
        Ok(Engine { store })
    }
}
