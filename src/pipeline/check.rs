// src/pipeline/check.rs

//! Check pipeline: run every stored monitor once and record what changed.

use std::time::Duration;

use chrono::Utc;
use futures::stream::{self, StreamExt};

use crate::crawler::CrawlerFactory;
use crate::error::{AppError, Result};
use crate::models::{Config, ContentItem, ContentSnapshot, SourceKey};
use crate::monitor::{CheckOptions, ContentMonitor};
use crate::pipeline::diff::{DiffResult, calculate_diff};
use crate::pipeline::guard::SnapshotGuard;
use crate::registry::SourceResolver;
use crate::storage::MonitorStorage;

/// Result of one successful monitor check.
#[derive(Debug, Clone)]
pub struct CheckReport {
    pub key: SourceKey,
    pub item_count: usize,
    pub diff: DiffResult,
}

/// Summary of a check run.
#[derive(Debug, Default)]
pub struct CheckOutcome {
    pub reports: Vec<CheckReport>,
    pub monitor_total: usize,
    pub failures: usize,
    pub missing_sources: usize,
    pub rejected: usize,
}

impl CheckOutcome {
    /// Number of monitors whose snapshot changed.
    pub fn changed(&self) -> usize {
        self.reports.iter().filter(|r| r.diff.has_changes()).count()
    }
}

/// Check all stored monitors and persist their new state.
pub async fn run_checks(
    config: &Config,
    resolver: &dyn SourceResolver,
    crawlers: &dyn CrawlerFactory,
    storage: &dyn MonitorStorage,
    options: &CheckOptions,
) -> Result<CheckOutcome> {
    let start_time = Utc::now();
    let mut monitors = storage.load_monitors().await?;
    log::info!("Loaded {} monitors", monitors.len());

    let outcome = check_monitors(config, resolver, crawlers, storage, &mut monitors, options).await;
    storage.save_monitors(&monitors).await?;

    let elapsed = Utc::now() - start_time;
    log::info!(
        "Checked {} monitors in {}ms: {} changed, {} failed, {} missing sources, {} rejected",
        outcome.monitor_total,
        elapsed.num_milliseconds(),
        outcome.changed(),
        outcome.failures,
        outcome.missing_sources,
        outcome.rejected
    );
    Ok(outcome)
}

/// Check the given monitors, at most `max_concurrent` at a time.
///
/// Each monitor is checked exactly once. Failures are counted and logged.
pub async fn check_monitors(
    config: &Config,
    resolver: &dyn SourceResolver,
    crawlers: &dyn CrawlerFactory,
    storage: &dyn MonitorStorage,
    monitors: &mut [ContentMonitor],
    options: &CheckOptions,
) -> CheckOutcome {
    let delay = Duration::from_millis(config.checker.request_delay_ms);
    let concurrency = config.checker.max_concurrent.max(1);
    let guard = SnapshotGuard::new(config.guard.clone());

    let mut outcome = CheckOutcome {
        monitor_total: monitors.len(),
        ..CheckOutcome::default()
    };

    let mut check_stream = stream::iter(monitors.iter_mut())
        .map(|monitor| {
            let guard = &guard;
            async move {
                let key = monitor.key();
                let status =
                    check_and_record(monitor, resolver, crawlers, storage, guard, options).await;
                (key, status)
            }
        })
        .buffer_unordered(concurrency);

    while let Some((key, status)) = check_stream.next().await {
        match status {
            CheckStatus::Recorded(report) => outcome.reports.push(report),
            CheckStatus::NotRecorded(error @ AppError::SnapshotGuard { .. }) => {
                outcome.rejected += 1;
                log::error!("[{}] keeping previous snapshot: {}", key, error);
            }
            CheckStatus::NotRecorded(error) => {
                outcome.failures += 1;
                log::warn!("[{}] failed to record snapshot: {}", key, error);
            }
            CheckStatus::Failed(error) if error.is_configuration_missing() => {
                outcome.missing_sources += 1;
                log::error!("[{}] monitor is misconfigured: {}", key, error);
            }
            CheckStatus::Failed(error) => {
                outcome.failures += 1;
                log::warn!("[{}] check failed: {}", key, error);
            }
        }

        if delay.as_millis() > 0 {
            tokio::time::sleep(delay).await;
        }
    }

    outcome
}

enum CheckStatus {
    Recorded(CheckReport),
    /// The check succeeded but its snapshot was not stored
    NotRecorded(AppError),
    Failed(AppError),
}

/// Check one monitor and record its snapshot.
///
/// Subscribed items consumed by the check go back into the monitor's buffer
/// when the snapshot carrying them is not stored.
async fn check_and_record(
    monitor: &mut ContentMonitor,
    resolver: &dyn SourceResolver,
    crawlers: &dyn CrawlerFactory,
    storage: &dyn MonitorStorage,
    guard: &SnapshotGuard,
    options: &CheckOptions,
) -> CheckStatus {
    let key = monitor.key();
    let pending = monitor.subscribed().to_vec();

    let snapshot = match monitor.check(resolver, crawlers, options).await {
        Ok(snapshot) => snapshot,
        Err(error) => return CheckStatus::Failed(error),
    };

    match record_snapshot(storage, guard, &key, snapshot).await {
        Ok(report) => CheckStatus::Recorded(report),
        Err(error) => {
            requeue(monitor, pending);
            CheckStatus::NotRecorded(error)
        }
    }
}

fn requeue(monitor: &mut ContentMonitor, pending: Vec<ContentItem>) {
    if pending.is_empty() {
        return;
    }
    log::info!("[{}] requeueing {} subscribed items", monitor.key(), pending.len());
    for item in pending {
        if let Err(error) = monitor.subscribe(item) {
            log::warn!("[{}] could not requeue item: {}", monitor.key(), error);
        }
    }
}

/// Diff a new snapshot against the stored one and replace it.
async fn record_snapshot(
    storage: &dyn MonitorStorage,
    guard: &SnapshotGuard,
    key: &SourceKey,
    snapshot: ContentSnapshot,
) -> Result<CheckReport> {
    let previous = storage.load_snapshot(key).await?;
    let previous_items = previous.as_ref().map(|s| s.items()).unwrap_or_default();

    guard.validate(snapshot.len(), previous_items.len())?;

    let diff = calculate_diff(previous_items, snapshot.items());
    if diff.has_changes() {
        log::info!(
            "[{}] {} added, {} updated, {} removed",
            key,
            diff.diff.added.len(),
            diff.diff.updated.len(),
            diff.diff.removed.len()
        );
        for item in &diff.added_items {
            log::info!("    + {} ({})", item.title, item.id);
        }
    }

    storage.write_snapshot(key, &snapshot).await?;

    Ok(CheckReport {
        key: key.clone(),
        item_count: snapshot.len(),
        diff,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ContentItem, ContentType};
    use crate::storage::LocalStorage;
    use crate::testing::{FakeCrawler, FakeCrawlerFactory, sample_registry};
    use tempfile::TempDir;

    fn options() -> CheckOptions {
        CheckOptions {
            max_results: 10,
            use_cache: false,
            debug: false,
        }
    }

    #[tokio::test]
    async fn test_run_checks_records_snapshots_and_state() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());
        let mut video = ContentMonitor::new_video("acme", "main", "UC123");
        video.subscribe(ContentItem::new("s1", "Pushed")).unwrap();
        storage
            .save_monitors(&[ContentMonitor::new_publication("acme", "press"), video])
            .await
            .unwrap();

        let factory = FakeCrawlerFactory::new(FakeCrawler::with_items(vec![
            ContentItem::new("1", "First").with_published(10),
        ]));
        let registry = sample_registry();

        let outcome = run_checks(
            &Config::default(),
            &registry,
            &factory,
            &storage,
            &options(),
        )
        .await
        .unwrap();

        assert_eq!(outcome.monitor_total, 2);
        assert_eq!(outcome.reports.len(), 2);
        assert_eq!(outcome.changed(), 2);
        assert_eq!(factory.close_count(), 2);

        let monitors = storage.load_monitors().await.unwrap();
        assert!(monitors.iter().all(|m| m.subscribed().is_empty()));
        assert_eq!(monitors[0].title(), "Acme Press");

        let key = SourceKey::new("acme", ContentType::Video, "main");
        let snapshot = storage.load_snapshot(&key).await.unwrap().unwrap();
        assert_eq!(snapshot.len(), 2);
    }

    #[tokio::test]
    async fn test_second_run_reports_no_changes() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());
        storage
            .save_monitors(&[ContentMonitor::new_publication("acme", "press")])
            .await
            .unwrap();
        let factory = FakeCrawlerFactory::new(FakeCrawler::with_items(vec![
            ContentItem::new("1", "First").with_published(10),
        ]));
        let registry = sample_registry();
        let config = Config::default();

        run_checks(&config, &registry, &factory, &storage, &options())
            .await
            .unwrap();
        let outcome = run_checks(&config, &registry, &factory, &storage, &options())
            .await
            .unwrap();

        assert_eq!(outcome.reports.len(), 1);
        assert_eq!(outcome.changed(), 0);
    }

    #[tokio::test]
    async fn test_failures_are_counted_not_fatal() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());
        let mut monitors = vec![
            ContentMonitor::new_publication("acme", "press"),
            ContentMonitor::new_publication("acme", "removed"),
        ];
        let factory = FakeCrawlerFactory::new(FakeCrawler::failing());
        let registry = sample_registry();

        let outcome = check_monitors(
            &Config::default(),
            &registry,
            &factory,
            &storage,
            &mut monitors,
            &options(),
        )
        .await;

        assert_eq!(outcome.failures, 1);
        assert_eq!(outcome.missing_sources, 1);
        assert!(outcome.reports.is_empty());
        assert_eq!(factory.close_count(), 2);
    }

    #[tokio::test]
    async fn test_guard_keeps_previous_snapshot() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());
        let key = SourceKey::new("acme", ContentType::Publication, "press");
        let previous: Vec<_> = (0..10)
            .map(|i| ContentItem::new(i.to_string(), format!("Item {i}")).with_published(i + 1))
            .collect();
        storage
            .write_snapshot(&key, &ContentSnapshot::new(ContentType::Publication, previous))
            .await
            .unwrap();

        let mut monitors = vec![ContentMonitor::new_publication("acme", "press")];
        let factory = FakeCrawlerFactory::new(FakeCrawler::with_items(vec![ContentItem::new(
            "0", "Item 0",
        )]));
        let registry = sample_registry();

        let outcome = check_monitors(
            &Config::default(),
            &registry,
            &factory,
            &storage,
            &mut monitors,
            &options(),
        )
        .await;

        assert_eq!(outcome.rejected, 1);
        let stored = storage.load_snapshot(&key).await.unwrap().unwrap();
        assert_eq!(stored.len(), 10);
    }

    #[tokio::test]
    async fn test_rejected_snapshot_keeps_subscribed_items() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());
        let key = SourceKey::new("acme", ContentType::Video, "main");
        let previous: Vec<_> = (0..10)
            .map(|i| ContentItem::new(format!("v{i}"), format!("Video {i}")))
            .collect();
        storage
            .write_snapshot(&key, &ContentSnapshot::new(ContentType::Video, previous))
            .await
            .unwrap();

        let mut video = ContentMonitor::new_video("acme", "main", "UC123");
        video.subscribe(ContentItem::new("pushed", "Pushed")).unwrap();
        storage.save_monitors(&[video]).await.unwrap();

        let factory = FakeCrawlerFactory::new(FakeCrawler::with_items(vec![ContentItem::new(
            "v0", "Video 0",
        )]));
        let registry = sample_registry();

        let outcome = run_checks(&Config::default(), &registry, &factory, &storage, &options())
            .await
            .unwrap();
        assert_eq!(outcome.rejected, 1);

        let monitors = storage.load_monitors().await.unwrap();
        let pending: Vec<_> = monitors[0]
            .subscribed()
            .iter()
            .map(|i| i.id.as_str())
            .collect();
        assert_eq!(pending, vec!["pushed"]);
        assert_eq!(monitors[0].subscribed()[0].title, "Pushed");

        let stored = storage.load_snapshot(&key).await.unwrap().unwrap();
        assert_eq!(stored.len(), 10);
    }

    #[tokio::test]
    async fn test_recorded_snapshot_consumes_subscribed_items() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());
        let mut monitors = vec![ContentMonitor::new_video("acme", "main", "UC123")];
        monitors[0]
            .subscribe(ContentItem::new("pushed", "Pushed"))
            .unwrap();

        let factory = FakeCrawlerFactory::new(FakeCrawler::with_items(vec![]));
        let registry = sample_registry();

        let outcome = check_monitors(
            &Config::default(),
            &registry,
            &factory,
            &storage,
            &mut monitors,
            &options(),
        )
        .await;

        assert_eq!(outcome.reports.len(), 1);
        assert!(monitors[0].subscribed().is_empty());
    }
}
