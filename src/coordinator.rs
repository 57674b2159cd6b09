//! Cleanup Coordinator Module
//!
//! A named registry of caches that can be swept together, on demand or on a
//! timer, and queried for aggregated statistics.

use std::collections::HashMap;
use std::mem;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::cache::{CacheStats, Cleanable};
use crate::error::{CoordinatorError, Result};
use crate::tasks::spawn_cleanup_task;

/// Handle to the running sweep task.
struct SweepTask {
    stop: CancellationToken,
    handle: JoinHandle<()>,
}

/// Where the sweep task is in its lifecycle.
#[derive(Default)]
enum Lifecycle {
    #[default]
    Idle,
    Running(SweepTask),
    /// `stop` has cancelled the task and is waiting for it to exit
    Stopping,
}

/// Returns the lifecycle to idle when `stop` finishes or is dropped mid-wait.
struct ResetOnDrop<'a>(&'a Mutex<Lifecycle>);

impl Drop for ResetOnDrop<'_> {
    fn drop(&mut self) {
        *self.0.lock() = Lifecycle::Idle;
    }
}

// == Cleanup Coordinator ==
/// Sweeps and reports on any number of independently typed caches.
///
/// The coordinator only sees the [`Cleanable`] surface of each cache. Its
/// registry lock is independent of the caches' own locks.
///
/// # Lifecycle
/// Register caches at startup, call [`start`](Self::start) once, and await
/// [`stop`](Self::stop) at shutdown. `stop` is idempotent. A second `start`
/// while the sweep task is running is rejected with
/// [`CoordinatorError::AlreadyStarted`], and a `start` racing an unfinished
/// `stop` with [`CoordinatorError::Stopping`].
#[derive(Default)]
pub struct CleanupCoordinator {
    caches: RwLock<HashMap<String, Arc<dyn Cleanable>>>,
    task: Mutex<Lifecycle>,
}

impl CleanupCoordinator {
    // == Constructor ==
    pub fn new() -> Self {
        Self::default()
    }

    // == Registration ==
    /// Registers `cache` under `name`, returning the cache it replaced, if any.
    pub fn register_cache<C>(
        &self,
        name: impl Into<String>,
        cache: Arc<C>,
    ) -> Option<Arc<dyn Cleanable>>
    where
        C: Cleanable + 'static,
    {
        let name = name.into();
        debug!("Registering cache '{}'", name);
        self.caches.write().insert(name, cache)
    }

    /// Removes the cache registered under `name`. Absent names are a no-op.
    pub fn unregister_cache(&self, name: &str) -> Option<Arc<dyn Cleanable>> {
        let removed = self.caches.write().remove(name);
        if removed.is_some() {
            debug!("Unregistered cache '{}'", name);
        }
        removed
    }

    /// Returns the registered names in sorted order.
    pub fn registered_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.caches.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.caches.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.caches.read().is_empty()
    }

    /// Sum of the sizes of every registered cache.
    pub fn total_size(&self) -> usize {
        self.caches.read().values().map(|cache| cache.size()).sum()
    }

    // == Sweeping ==
    /// Sweeps every registered cache and returns the removed count per name.
    pub fn clean_all(&self) -> HashMap<String, usize> {
        let caches = self.caches.read();
        caches
            .iter()
            .map(|(name, cache)| (name.clone(), cache.clean_expired()))
            .collect()
    }

    /// Sweeps a single cache, `None` if no cache has that name.
    pub fn clean_one(&self, name: &str) -> Option<usize> {
        let cache = self.caches.read().get(name).cloned()?;
        Some(cache.clean_expired())
    }

    // == Stats ==
    /// Collects statistics from every cache that reports them.
    ///
    /// Multi-record reports are flattened; caches without statistics are
    /// skipped. The order of the returned list is unspecified.
    pub fn get_all_stats(&self) -> Vec<CacheStats> {
        let caches = self.caches.read();
        caches
            .values()
            .flat_map(|cache| cache.report_stats().into_vec())
            .collect()
    }

    // == Lifecycle ==
    /// Starts the background sweep task.
    ///
    /// The task ends when `cancel` fires or [`stop`](Self::stop) is awaited,
    /// whichever happens first. Must be called from within a Tokio runtime.
    ///
    /// # Errors
    /// * [`CoordinatorError::AlreadyStarted`] if a sweep task is still running
    /// * [`CoordinatorError::Stopping`] if a `stop` is still waiting for the task
    /// * [`CoordinatorError::InvalidRequest`] if `interval` is zero
    pub fn start(self: &Arc<Self>, cancel: CancellationToken, interval: Duration) -> Result<()> {
        if interval.is_zero() {
            return Err(CoordinatorError::InvalidRequest(
                "Sweep interval must be greater than zero".to_string(),
            ));
        }

        let mut task = self.task.lock();
        match &*task {
            Lifecycle::Running(running) if !running.handle.is_finished() => {
                return Err(CoordinatorError::AlreadyStarted);
            }
            Lifecycle::Stopping => return Err(CoordinatorError::Stopping),
            _ => {}
        }

        let stop = CancellationToken::new();
        let handle = spawn_cleanup_task(Arc::downgrade(self), interval, cancel, stop.clone());
        *task = Lifecycle::Running(SweepTask { stop, handle });
        Ok(())
    }

    /// Stops the background sweep task and waits for it to exit.
    ///
    /// Once this returns no sweep is in flight and none will start until the
    /// next successful `start`, which is refused while this call is waiting.
    /// Calling it without a running task, or while another `stop` is
    /// waiting, returns immediately.
    pub async fn stop(&self) {
        let task = {
            let mut guard = self.task.lock();
            match mem::replace(&mut *guard, Lifecycle::Stopping) {
                Lifecycle::Running(task) => task,
                other => {
                    *guard = other;
                    return;
                }
            }
        };
        let _reset = ResetOnDrop(&self.task);

        task.stop.cancel();
        if let Err(err) = task.handle.await {
            warn!("Cache sweep task ended abnormally: {}", err);
        }
    }

    /// Returns true while the sweep task is alive.
    pub fn is_running(&self) -> bool {
        matches!(&*self.task.lock(), Lifecycle::Running(task) if !task.handle.is_finished())
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::cache::{BoundedTtlCache, IdCodeCache};

    /// Counts sweeps and reports no statistics.
    #[derive(Default)]
    struct CountingCache {
        sweeps: AtomicUsize,
    }

    impl CountingCache {
        fn sweeps(&self) -> usize {
            self.sweeps.load(Ordering::SeqCst)
        }
    }

    impl Cleanable for CountingCache {
        fn clean_expired(&self) -> usize {
            self.sweeps.fetch_add(1, Ordering::SeqCst);
            0
        }

        fn size(&self) -> usize {
            0
        }
    }

    fn cache(name: &str) -> Arc<BoundedTtlCache<String, u32>> {
        Arc::new(BoundedTtlCache::named(name, 10, Duration::from_secs(3600)))
    }

    #[test]
    fn test_register_and_unregister() {
        let coordinator = CleanupCoordinator::new();
        assert!(coordinator.is_empty());

        assert!(coordinator.register_cache("users", cache("users")).is_none());
        assert!(coordinator.register_cache("codes", cache("codes")).is_none());

        assert_eq!(coordinator.len(), 2);
        assert_eq!(coordinator.registered_names(), vec!["codes", "users"]);

        assert!(coordinator.unregister_cache("users").is_some());
        assert!(coordinator.unregister_cache("users").is_none());
        assert_eq!(coordinator.registered_names(), vec!["codes"]);
    }

    #[test]
    fn test_reregister_replaces() {
        let coordinator = CleanupCoordinator::new();
        let first = cache("users");
        first.set("a".to_string(), 1, None);
        coordinator.register_cache("users", first);

        let replaced = coordinator.register_cache("users", cache("users"));

        assert_eq!(replaced.map(|c| c.size()), Some(1));
        assert_eq!(coordinator.len(), 1);
        assert_eq!(coordinator.total_size(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_clean_all_reports_per_cache() {
        let coordinator = CleanupCoordinator::new();
        let users = cache("users");
        let codes = cache("codes");
        for c in [&users, &codes] {
            c.set("short".to_string(), 1, Some(Duration::from_secs(1)));
            c.set("long".to_string(), 2, None);
        }
        coordinator.register_cache("users", users.clone());
        coordinator.register_cache("codes", codes.clone());

        tokio::time::sleep(Duration::from_secs(2)).await;
        let results = coordinator.clean_all();

        assert_eq!(results.len(), 2);
        assert_eq!(results["users"], 1);
        assert_eq!(results["codes"], 1);
        assert_eq!(users.size(), 1);
        assert_eq!(codes.size(), 1);
    }

    #[test]
    fn test_clean_one() {
        let coordinator = CleanupCoordinator::new();
        let counting = Arc::new(CountingCache::default());
        coordinator.register_cache("counting", counting.clone());

        assert_eq!(coordinator.clean_one("counting"), Some(0));
        assert_eq!(coordinator.clean_one("missing"), None);
        assert_eq!(counting.sweeps(), 1);
    }

    #[test]
    fn test_get_all_stats_flattens_and_skips() {
        let coordinator = CleanupCoordinator::new();
        coordinator.register_cache("users", cache("users"));
        coordinator.register_cache(
            "invites",
            Arc::new(IdCodeCache::<u64, String>::new("invites", 10, Duration::from_secs(60))),
        );
        coordinator.register_cache("counting", Arc::new(CountingCache::default()));

        let mut names: Vec<String> = coordinator
            .get_all_stats()
            .into_iter()
            .map(|stats| stats.name)
            .collect();
        names.sort();

        assert_eq!(names, vec!["invites_by_code", "invites_by_id", "users"]);
    }

    #[test]
    fn test_get_all_stats_empty() {
        let coordinator = CleanupCoordinator::new();
        assert!(coordinator.get_all_stats().is_empty());
        assert!(coordinator.clean_all().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_sweeps_on_interval() {
        let coordinator = Arc::new(CleanupCoordinator::new());
        let counting = Arc::new(CountingCache::default());
        coordinator.register_cache("counting", counting.clone());

        coordinator
            .start(CancellationToken::new(), Duration::from_secs(10))
            .unwrap();
        assert!(coordinator.is_running());

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(counting.sweeps(), 0, "First sweep waits a full interval");

        tokio::time::sleep(Duration::from_secs(20)).await;
        assert_eq!(counting.sweeps(), 2);

        coordinator.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_is_terminal() {
        let coordinator = Arc::new(CleanupCoordinator::new());
        let counting = Arc::new(CountingCache::default());
        coordinator.register_cache("counting", counting.clone());

        coordinator
            .start(CancellationToken::new(), Duration::from_secs(10))
            .unwrap();
        tokio::time::sleep(Duration::from_secs(15)).await;
        assert_eq!(counting.sweeps(), 1);

        coordinator.stop().await;
        assert!(!coordinator.is_running());

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(counting.sweeps(), 1, "No sweep may run after stop returns");
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_is_idempotent() {
        let coordinator = Arc::new(CleanupCoordinator::new());

        // Never started
        coordinator.stop().await;

        coordinator
            .start(CancellationToken::new(), Duration::from_secs(1))
            .unwrap();
        coordinator.stop().await;
        coordinator.stop().await;

        assert!(!coordinator.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_twice_is_rejected() {
        let coordinator = Arc::new(CleanupCoordinator::new());
        let counting = Arc::new(CountingCache::default());
        coordinator.register_cache("counting", counting.clone());

        coordinator
            .start(CancellationToken::new(), Duration::from_secs(10))
            .unwrap();
        let second = coordinator.start(CancellationToken::new(), Duration::from_secs(10));
        assert_eq!(second, Err(CoordinatorError::AlreadyStarted));

        // Only one loop is sweeping
        tokio::time::sleep(Duration::from_secs(15)).await;
        assert_eq!(counting.sweeps(), 1);

        coordinator.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_after_stop() {
        let coordinator = Arc::new(CleanupCoordinator::new());

        coordinator
            .start(CancellationToken::new(), Duration::from_secs(1))
            .unwrap();
        coordinator.stop().await;

        assert!(coordinator
            .start(CancellationToken::new(), Duration::from_secs(1))
            .is_ok());
        coordinator.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_token_ends_task() {
        let coordinator = Arc::new(CleanupCoordinator::new());
        let counting = Arc::new(CountingCache::default());
        coordinator.register_cache("counting", counting.clone());
        let cancel = CancellationToken::new();

        coordinator
            .start(cancel.clone(), Duration::from_secs(10))
            .unwrap();
        tokio::time::sleep(Duration::from_secs(15)).await;
        cancel.cancel();
        tokio::time::sleep(Duration::from_secs(60)).await;

        assert_eq!(counting.sweeps(), 1);
        assert!(!coordinator.is_running());

        // A cancelled task may be replaced by a fresh start
        assert!(coordinator
            .start(CancellationToken::new(), Duration::from_secs(10))
            .is_ok());
        coordinator.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_during_stop_is_rejected() {
        let coordinator = Arc::new(CleanupCoordinator::new());
        let counting = Arc::new(CountingCache::default());
        coordinator.register_cache("counting", counting.clone());
        coordinator
            .start(CancellationToken::new(), Duration::from_secs(1))
            .unwrap();

        // First poll cancels the task; it cannot exit until this test yields
        let mut stopping = tokio_test::task::spawn(coordinator.stop());
        assert!(stopping.poll().is_pending());
        assert!(!coordinator.is_running());

        let racing = coordinator.start(CancellationToken::new(), Duration::from_secs(1));
        assert_eq!(racing, Err(CoordinatorError::Stopping));

        while stopping.poll().is_pending() {
            tokio::task::yield_now().await;
        }
        drop(stopping);

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(counting.sweeps(), 0);

        assert!(coordinator
            .start(CancellationToken::new(), Duration::from_secs(1))
            .is_ok());
        coordinator.stop().await;
    }

    #[test]
    fn test_stop_without_start_outside_runtime() {
        let coordinator = CleanupCoordinator::new();
        tokio_test::block_on(coordinator.stop());
        assert!(!coordinator.is_running());
    }

    #[test]
    fn test_zero_interval_is_rejected() {
        let coordinator = Arc::new(CleanupCoordinator::new());
        let result = coordinator.start(CancellationToken::new(), Duration::ZERO);
        assert!(matches!(result, Err(CoordinatorError::InvalidRequest(_))));
    }

    #[test]
    fn test_concurrent_registration_and_sweeps() {
        let coordinator = Arc::new(CleanupCoordinator::new());

        let handles: Vec<_> = (0..4)
            .map(|worker| {
                let coordinator = Arc::clone(&coordinator);
                std::thread::spawn(move || {
                    for i in 0..200 {
                        let name = format!("cache-{}-{}", worker, i % 10);
                        coordinator.register_cache(name.clone(), cache(&name));
                        coordinator.clean_all();
                        coordinator.get_all_stats();
                        if i % 3 == 0 {
                            coordinator.unregister_cache(&name);
                        }
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert!(coordinator.len() <= 40);
    }
}
