use std::sync::Arc;

use anyhow::Context;
use shared::domain::{NewPizza, PizzaSize};
use storage::{MemoryStore, PizzaStore, Storage};
use tracing::{error, info};

use crate::settings::{normalize_database_url, Settings, StorageBackend};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) store: Arc<dyn PizzaStore>,
}

impl AppState {
    pub(crate) fn new(store: Arc<dyn PizzaStore>) -> Self {
        Self { store }
    }

    pub(crate) async fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let store: Arc<dyn PizzaStore> = match settings.storage {
            StorageBackend::Memory => {
                info!("using in-memory pizza store");
                Arc::new(MemoryStore::new())
            }
            StorageBackend::Sqlite => {
                let database_url = normalize_database_url(&settings.database_url);
                let storage = Storage::new(&database_url).await.map_err(|error| {
                    error!(
                        %database_url,
                        %error,
                        "failed to open SQLite database; verify parent directory exists and permissions are correct"
                    );
                    error
                })?;
                info!(%database_url, "using sqlite pizza store");
                Arc::new(storage)
            }
        };

        let state = Self::new(store);
        if settings.seed_sample_data {
            state.seed_sample_data().await?;
        }
        Ok(state)
    }

    async fn seed_sample_data(&self) -> anyhow::Result<()> {
        let existing = self.store.list_pizzas().await?;
        if !existing.is_empty() {
            return Ok(());
        }
        let seeded = self
            .store
            .add_pizza(NewPizza {
                name: "Margherita".into(),
                size: PizzaSize::Medium,
                is_gluten_free: false,
                price: Some(8.5),
            })
            .await
            .context("failed to seed sample pizza")?;
        info!(pizza_id = %seeded.id, "seeded sample pizza");
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/app_state_tests.rs"]
mod tests;
