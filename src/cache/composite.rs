//! Composite Cache Module
//!
//! Facades built from two bounded caches that are kept in step with each other.
//!
//! An LRU eviction on one side removes the mirrored entry on the other. The
//! sub-caches still expire independently, so one direction may briefly outlive
//! the other. Readers treat a miss on either side as a plain miss.

use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use crate::cache::{BoundedTtlCache, Cleanable, StatsReport};

// == Id/Code Cache ==
/// Bidirectional lookup between an identifier and a short code.
///
/// Every pair is written to both the `by_id` and the `by_code` sub-cache and
/// removed from both, including when either side evicts it, so a mapping
/// reachable one way is reachable the other way until either copy expires.
#[derive(Debug)]
pub struct IdCodeCache<I, C> {
    name: String,
    by_id: BoundedTtlCache<I, C>,
    by_code: BoundedTtlCache<C, I>,
}

impl<I, C> IdCodeCache<I, C>
where
    I: Eq + Hash + Clone,
    C: Eq + Hash + Clone,
{
    /// Creates the facade; the sub-caches report as `<name>_by_id` and `<name>_by_code`.
    pub fn new(name: impl Into<String>, max_size: usize, default_ttl: Duration) -> Self {
        let name = name.into();
        Self {
            by_id: BoundedTtlCache::named(format!("{}_by_id", name), max_size, default_ttl),
            by_code: BoundedTtlCache::named(format!("{}_by_code", name), max_size, default_ttl),
            name,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Stores the pair in both directions.
    ///
    /// Any previous pairing of `id` or `code` is dropped first so the mapping
    /// stays one-to-one.
    pub fn insert(&self, id: I, code: C, ttl: Option<Duration>) {
        if let Some(old_code) = self.by_id.remove(&id) {
            if old_code != code {
                self.by_code.remove(&old_code);
            }
        }
        if let Some(old_id) = self.by_code.remove(&code) {
            if old_id != id {
                self.by_id.remove(&old_id);
            }
        }

        let evicted_by_id = self.by_id.set_evicting(id.clone(), code.clone(), ttl);
        let evicted_by_code = self.by_code.set_evicting(code, id, ttl);

        if let Some((old_id, old_code)) = evicted_by_id {
            self.by_code.remove_if_value(&old_code, |paired| *paired == old_id);
        }
        if let Some((old_code, old_id)) = evicted_by_code {
            self.by_id.remove_if_value(&old_id, |paired| *paired == old_code);
        }
    }

    pub fn get_code(&self, id: &I) -> Option<C> {
        self.by_id.get(id)
    }

    pub fn get_id(&self, code: &C) -> Option<I> {
        self.by_code.get(code)
    }

    /// Removes the pair reachable from `id`, returning its code.
    pub fn remove_by_id(&self, id: &I) -> Option<C> {
        let code = self.by_id.remove(id)?;
        self.by_code.remove(&code);
        Some(code)
    }

    /// Removes the pair reachable from `code`, returning its id.
    pub fn remove_by_code(&self, code: &C) -> Option<I> {
        let id = self.by_code.remove(code)?;
        self.by_id.remove(&id);
        Some(id)
    }

    pub fn clear(&self) {
        self.by_id.clear();
        self.by_code.clear();
    }
}

impl<I, C> Cleanable for IdCodeCache<I, C>
where
    I: Eq + Hash + Clone + Send + Sync,
    C: Eq + Hash + Clone + Send + Sync,
{
    fn clean_expired(&self) -> usize {
        self.by_id.clean_expired() + self.by_code.clean_expired()
    }

    fn size(&self) -> usize {
        self.by_id.size() + self.by_code.size()
    }

    fn report_stats(&self) -> StatsReport {
        StatsReport::Many(vec![self.by_id.get_stats(), self.by_code.get_stats()])
    }
}

// == Dual Key Cache ==
/// Object cache reachable through a primary and a secondary key, e.g. an id and a slug.
///
/// Both sub-caches share the same `Arc<V>`, and each remembers the other key
/// so a removal through either key clears both.
#[derive(Debug)]
pub struct DualKeyCache<A, B, V> {
    name: String,
    primary: BoundedTtlCache<A, (B, Arc<V>)>,
    secondary: BoundedTtlCache<B, (A, Arc<V>)>,
}

impl<A, B, V> DualKeyCache<A, B, V>
where
    A: Eq + Hash + Clone,
    B: Eq + Hash + Clone,
{
    /// Creates the facade; the sub-caches report as `<name>_by_<primary_label>`
    /// and `<name>_by_<secondary_label>`.
    pub fn new(
        name: impl Into<String>,
        labels: (&str, &str),
        max_size: usize,
        default_ttl: Duration,
    ) -> Self {
        let name = name.into();
        Self {
            primary: BoundedTtlCache::named(
                format!("{}_by_{}", name, labels.0),
                max_size,
                default_ttl,
            ),
            secondary: BoundedTtlCache::named(
                format!("{}_by_{}", name, labels.1),
                max_size,
                default_ttl,
            ),
            name,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Stores `value` under both keys and returns the shared handle.
    pub fn insert(&self, primary: A, secondary: B, value: V, ttl: Option<Duration>) -> Arc<V> {
        let value = Arc::new(value);

        if let Some((old_secondary, _)) = self.primary.remove(&primary) {
            if old_secondary != secondary {
                self.secondary.remove(&old_secondary);
            }
        }
        if let Some((old_primary, _)) = self.secondary.remove(&secondary) {
            if old_primary != primary {
                self.primary.remove(&old_primary);
            }
        }

        let evicted_primary = self.primary.set_evicting(
            primary.clone(),
            (secondary.clone(), Arc::clone(&value)),
            ttl,
        );
        let evicted_secondary =
            self.secondary
                .set_evicting(secondary, (primary, Arc::clone(&value)), ttl);

        if let Some((old_primary, (old_secondary, _))) = evicted_primary {
            self.secondary
                .remove_if_value(&old_secondary, |(paired, _)| *paired == old_primary);
        }
        if let Some((old_secondary, (old_primary, _))) = evicted_secondary {
            self.primary
                .remove_if_value(&old_primary, |(paired, _)| *paired == old_secondary);
        }
        value
    }

    pub fn get_by_primary(&self, key: &A) -> Option<Arc<V>> {
        self.primary.get(key).map(|(_, value)| value)
    }

    pub fn get_by_secondary(&self, key: &B) -> Option<Arc<V>> {
        self.secondary.get(key).map(|(_, value)| value)
    }

    pub fn remove_by_primary(&self, key: &A) -> Option<Arc<V>> {
        let (secondary, value) = self.primary.remove(key)?;
        self.secondary.remove(&secondary);
        Some(value)
    }

    pub fn remove_by_secondary(&self, key: &B) -> Option<Arc<V>> {
        let (primary, value) = self.secondary.remove(key)?;
        self.primary.remove(&primary);
        Some(value)
    }

    /// Removes every object matching `pred` from both sides.
    ///
    /// Returns the number of objects removed through the primary side.
    pub fn remove_where<F>(&self, mut pred: F) -> usize
    where
        F: FnMut(&V) -> bool,
    {
        let removed = self.primary.remove_by_value(|(_, value)| pred(value));
        self.secondary.remove_by_value(|(_, value)| pred(value));
        removed
    }
}

impl<A, B, V> Cleanable for DualKeyCache<A, B, V>
where
    A: Eq + Hash + Clone + Send + Sync,
    B: Eq + Hash + Clone + Send + Sync,
    V: Send + Sync,
{
    fn clean_expired(&self) -> usize {
        self.primary.clean_expired() + self.secondary.clean_expired()
    }

    fn size(&self) -> usize {
        self.primary.size() + self.secondary.size()
    }

    fn report_stats(&self) -> StatsReport {
        StatsReport::Many(vec![self.primary.get_stats(), self.secondary.get_stats()])
    }
}
