use std::collections::BTreeMap;
use std::future::Future;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::utils::Error;

/// Catalog ids of TV shows, persisted as JSON so a series is searched only once.
#[derive(Debug, Clone)]
pub struct ShowIdCache {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl ShowIdCache {
    pub fn load(cache_dir: &Path, id: &str) -> Self {
        let path = cache_dir.join(format!("{id}.json"));
        let entries = match std::fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_else(|e| {
                warn!("Ignoring corrupted cache '{}': {}", path.display(), e);
                BTreeMap::new()
            }),
            Err(_) => BTreeMap::new(),
        };
        info!(
            "Initialized show id cache '{}' with {} entries",
            path.display(),
            entries.len()
        );
        Self { path, entries }
    }

    pub fn get(&self, show_name: &str) -> Option<&str> {
        self.entries.get(show_name).map(String::as_str)
    }

    pub fn insert(&mut self, show_name: &str, show_id: &str) -> Result<(), Error> {
        self.entries.insert(show_name.to_string(), show_id.to_string());
        self.save()
    }

    fn save(&self) -> Result<(), Error> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_vec_pretty(&self.entries)?)?;
        Ok(())
    }

    /// Cached id, or the result of `fetch` which is then remembered.
    /// A failing fetch is logged and yields `None`.
    pub async fn get_or_fetch<F, Fut>(&mut self, show_name: &str, fetch: F) -> Option<String>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Option<String>, Error>>,
    {
        if let Some(id) = self.get(show_name) {
            info!("Got TV show id from cache for {show_name}");
            return Some(id.to_string());
        }

        match fetch().await {
            Ok(Some(id)) => {
                info!("Fetched TV show id for {show_name}");
                if let Err(e) = self.insert(show_name, &id) {
                    warn!("Failed to persist show id cache '{}': {}", self.path.display(), e);
                }
                Some(id)
            }
            Ok(None) => None,
            Err(e) => {
                warn!("Failed to fetch TV show id for {show_name}: {e}");
                None
            }
        }
    }
}
