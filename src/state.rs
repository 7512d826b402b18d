use std::sync::Arc;

use crate::{
    config::AppConfig,
    db::{create_orm_conn, run_migrations},
    feed::OrderFeed,
    notify::{LogNotifier, OrderNotifier, notifier_from_config},
    store::{MemoryStore, PgStore, Store},
};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub feed: OrderFeed,
    pub notifier: Arc<dyn OrderNotifier>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn Store>,
        notifier: Arc<dyn OrderNotifier>,
        config: AppConfig,
    ) -> Self {
        Self {
            store,
            feed: OrderFeed::new(config.order_feed_capacity),
            notifier,
            config: Arc::new(config),
        }
    }

    /// Fresh in-memory store with the email flow only logging.
    pub fn in_memory(config: AppConfig) -> Self {
        Self::new(Arc::new(MemoryStore::new()), Arc::new(LogNotifier), config)
    }

    /// PostgreSQL when `DATABASE_URL` is set (migrations applied), the
    /// in-memory store otherwise.
    pub async fn from_config(config: AppConfig) -> anyhow::Result<Self> {
        let store: Arc<dyn Store> = match &config.database_url {
            Some(url) => {
                let orm = create_orm_conn(url).await?;
                run_migrations(&orm).await?;
                Arc::new(PgStore::new(orm))
            }
            None => {
                tracing::warn!("DATABASE_URL not set, using the in-memory store");
                Arc::new(MemoryStore::new())
            }
        };
        let notifier = notifier_from_config(&config);
        Ok(Self::new(store, notifier, config))
    }
}
