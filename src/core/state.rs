//! Application state

use std::sync::Arc;

use anyhow::Result;
use tracing::debug;

use crate::api::{WebsiteApi, ZukiiClient};
use crate::auth::AuthStore;
use crate::config::Config;
use crate::db::{Database, KvRepository};
use crate::website::{PollingController, StoreError, WebsiteRecord, WebsiteStore};

pub struct AppState {
    pub config: Config,
    pub db: Database,
    pub auth: AuthStore,
    pub websites: Arc<WebsiteStore>,
    pub poller: PollingController,
}

impl AppState {
    /// Open the configured database and talk to the configured backend
    pub async fn open(config: Config) -> Result<Self> {
        let db = Database::new(config.resolve_db_path()?)?;
        debug!("Using database {} and backend {}", db.path(), config.api_base_url);
        let api = Arc::new(ZukiiClient::with_timeouts(
            config.api_base_url.clone(),
            config.http.timeout(),
            config.http.connect_timeout(),
        ));

        Ok(Self::with_api(config, db, api).await)
    }

    pub async fn with_api(config: Config, db: Database, api: Arc<dyn WebsiteApi>) -> Self {
        let kv = KvRepository::new(db.clone());
        let auth = AuthStore::load(kv.clone()).await;
        let websites = Arc::new(
            WebsiteStore::load(api, kv)
                .await
                .with_embed_script_url(config.embed_script_url.clone()),
        );
        let poller = PollingController::with_interval(Arc::clone(&websites), config.polling.interval())
            .with_max_ticks(config.polling.max_ticks);

        Self {
            config,
            db,
            auth,
            websites,
            poller,
        }
    }

    /// Add a website and start polling it
    pub async fn add_website(&self, name: &str, url: &str) -> Result<WebsiteRecord, StoreError> {
        let record = self.websites.add(name, url).await?;
        self.poller.start(&record.id).await;
        Ok(record)
    }

    /// Re-scrape a website and poll until it settles again
    pub async fn rescrape_website(&self, id: &str) -> Result<WebsiteRecord, StoreError> {
        let record = self.websites.rescrape(id).await?;
        self.poller.start(&record.id).await;
        Ok(record)
    }

    /// Delete a website and stop its poller
    pub async fn remove_website(&self, id: &str) -> Result<(), StoreError> {
        self.websites.remove(id).await?;
        self.poller.stop(id);
        Ok(())
    }
}
