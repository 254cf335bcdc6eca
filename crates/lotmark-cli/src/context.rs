//! Shared wiring from configuration to library objects.

use std::sync::Arc;

use anyhow::Context as _;

use lotmark_core::{ApiKey, AppConfig, FileKeyStore, KeyManager};
use lotmark_places::{PlacesClient, PlacesError, ServiceGuard};

pub fn build_manager(config: &AppConfig) -> anyhow::Result<KeyManager> {
    let fallback = config
        .maps_api_key
        .as_deref()
        .map(ApiKey::parse)
        .transpose()
        .context("LOTMARK_MAPS_API_KEY is not a valid provider key")?;
    Ok(KeyManager::with_limits(
        Box::new(FileKeyStore::new(config.key_store_path.clone())),
        fallback,
        config.key_change_max,
        std::time::Duration::from_secs(config.key_change_window_secs),
    ))
}

/// Builds a provider client from the managed credential and records the key
/// as active so later `key set` calls can signal a required rebuild.
pub fn build_client(config: &AppConfig, manager: &KeyManager) -> anyhow::Result<Arc<PlacesClient>> {
    let key = manager.key()?.ok_or(PlacesError::NoCredential)?;
    manager.mark_active(&key);
    let client = PlacesClient::new(key, config.request_timeout_secs, &config.user_agent)?;
    tracing::debug!(timeout_secs = config.request_timeout_secs, "provider client ready");
    Ok(Arc::new(client))
}

pub fn guard() -> Arc<ServiceGuard> {
    Arc::new(ServiceGuard::always_online())
}
