//! Monitor registration and subscription intake.

use crate::error::{AppError, Result};
use crate::models::{ContentItem, SourceKey};
use crate::monitor::ContentMonitor;
use crate::registry::SourceResolver;
use crate::storage::MonitorStorage;

/// Register a monitor for a configured source.
///
/// Fails when the source is not configured or already monitored.
pub async fn add_monitor(
    resolver: &dyn SourceResolver,
    storage: &dyn MonitorStorage,
    key: &SourceKey,
) -> Result<ContentMonitor> {
    let source = resolver
        .resolve(&key.code, key.content_type, &key.name)
        .ok_or_else(|| AppError::configuration_missing(&key.code, key.content_type, &key.name))?;

    let mut monitors = storage.load_monitors().await?;
    if monitors.iter().any(|m| &m.key() == key) {
        return Err(AppError::validation(format!("{key} is already monitored")));
    }

    let monitor = ContentMonitor::for_source(&key.code, key.content_type, &source);
    monitors.push(monitor.clone());
    storage.save_monitors(&monitors).await?;

    log::info!("Added monitor {} ({})", key, monitor.title());
    Ok(monitor)
}

/// Queue a pushed item on a stored monitor until its next check.
pub async fn subscribe(
    storage: &dyn MonitorStorage,
    key: &SourceKey,
    item: ContentItem,
) -> Result<()> {
    let mut monitors = storage.load_monitors().await?;
    let monitor = monitors
        .iter_mut()
        .find(|m| &m.key() == key)
        .ok_or_else(|| AppError::validation(format!("{key} is not monitored")))?;

    let id = item.id.clone();
    monitor.subscribe(item)?;
    log::info!(
        "Queued item {} on {} ({} pending)",
        id,
        key,
        monitor.subscribed().len()
    );

    storage.save_monitors(&monitors).await
}
