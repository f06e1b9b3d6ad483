//! Timer registry
//!
//! Owns every delayed and repeating task for the coordinator, keyed by
//! `(page, name)`. At most one live timer per key: scheduling under an
//! occupied key replaces the old timer, so a step can never run twice because
//! two callers raced to schedule it.
//!
//! The registry is a pure data structure. It holds no thread and no clock;
//! the host drives it by calling [`advance`](TimerRegistry::advance) with
//! milliseconds since coordinator start, and due tasks are returned to the
//! caller for dispatch on the single control thread.

use crate::sequence::TimerName;
use encore_core::PageId;
use rustc_hash::FxHashMap;
use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Internal slot key for one live timer
    pub struct TimerKey;
}

struct TimerEntry<T> {
    page: PageId,
    name: TimerName,
    fire_at_ms: u64,
    /// `Some` for repeating timers
    interval_ms: Option<u64>,
    /// Registration order, breaks deadline ties deterministically
    seq: u64,
    task: T,
}

/// A timer that came due during an [`advance`](TimerRegistry::advance) call
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DueTimer<T> {
    pub page: PageId,
    pub name: TimerName,
    pub task: T,
}

/// Registry of all scheduled work, generic over the task payload.
///
/// # Example
///
/// ```rust
/// use encore_animation::{TimerName, TimerRegistry};
/// use encore_core::PageId;
///
/// let mut registry: TimerRegistry<&'static str> = TimerRegistry::new();
/// let page = PageId::from("serenity");
///
/// registry.schedule(page.clone(), TimerName::JitterStart, 300, "arm-jitter");
/// assert!(registry.is_scheduled(&page, &TimerName::JitterStart));
///
/// let fired = registry.advance(300);
/// assert_eq!(fired.len(), 1);
/// assert_eq!(fired[0].task, "arm-jitter");
/// assert_eq!(registry.live_count(), 0);
/// ```
pub struct TimerRegistry<T> {
    timers: SlotMap<TimerKey, TimerEntry<T>>,
    by_key: FxHashMap<(PageId, TimerName), TimerKey>,
    now_ms: u64,
    next_seq: u64,
}

impl<T: Clone> Default for TimerRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> TimerRegistry<T> {
    pub fn new() -> Self {
        Self {
            timers: SlotMap::with_key(),
            by_key: FxHashMap::default(),
            now_ms: 0,
            next_seq: 0,
        }
    }

    /// The registry's current clock, in ms since coordinator start
    pub fn now(&self) -> u64 {
        self.now_ms
    }

    // ========================================================================
    // Scheduling
    // ========================================================================

    /// Register a one-shot timer, replacing any timer under the same key
    pub fn schedule(&mut self, page: PageId, name: TimerName, delay_ms: u64, task: T) {
        self.insert(page, name, delay_ms, None, task);
    }

    /// Register a repeating timer, replacing any timer under the same key.
    ///
    /// The first fire happens one interval from now. Intervals are clamped to
    /// at least 1 ms so a zero interval cannot livelock the tick loop.
    pub fn schedule_repeating(&mut self, page: PageId, name: TimerName, interval_ms: u64, task: T) {
        let interval = interval_ms.max(1);
        self.insert(page, name, interval, Some(interval), task);
    }

    fn insert(
        &mut self,
        page: PageId,
        name: TimerName,
        delay_ms: u64,
        interval_ms: Option<u64>,
        task: T,
    ) {
        let map_key = (page.clone(), name.clone());
        if let Some(old) = self.by_key.remove(&map_key) {
            self.timers.remove(old);
            tracing::trace!("timer replaced: {} {}", map_key.0, map_key.1);
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        let key = self.timers.insert(TimerEntry {
            page,
            name,
            fire_at_ms: self.now_ms + delay_ms,
            interval_ms,
            seq,
            task,
        });
        self.by_key.insert(map_key, key);
    }

    // ========================================================================
    // Cancellation
    // ========================================================================

    /// Cancel one timer. A nonexistent key is a no-op.
    pub fn cancel(&mut self, page: &PageId, name: &TimerName) -> bool {
        match self.by_key.remove(&(page.clone(), name.clone())) {
            Some(key) => {
                self.timers.remove(key);
                true
            }
            None => false,
        }
    }

    /// Cancel every timer for a page. Returns how many were live.
    pub fn cancel_all(&mut self, page: &PageId) -> usize {
        let keys: Vec<TimerKey> = self
            .timers
            .iter()
            .filter(|(_, entry)| &entry.page == page)
            .map(|(key, _)| key)
            .collect();
        for key in &keys {
            if let Some(entry) = self.timers.remove(*key) {
                self.by_key.remove(&(entry.page, entry.name));
            }
        }
        if !keys.is_empty() {
            tracing::debug!("cancelled {} timer(s) for page {}", keys.len(), page);
        }
        keys.len()
    }

    // ========================================================================
    // Clock
    // ========================================================================

    /// Move the clock to `now_ms` without collecting timers.
    ///
    /// Called at tick entry so that delays scheduled during the tick are
    /// measured from the tick's own timestamp rather than the previous one.
    pub fn sync_clock(&mut self, now_ms: u64) {
        debug_assert!(now_ms >= self.now_ms, "registry clock went backwards");
        self.now_ms = self.now_ms.max(now_ms);
    }

    /// Move the clock to `now_ms` and collect every due timer.
    ///
    /// Due timers are returned ordered by (deadline, registration order).
    /// One-shots are removed; repeating timers are re-armed at
    /// `now_ms + interval`, so a late advance coalesces missed intervals into
    /// a single fire.
    pub fn advance(&mut self, now_ms: u64) -> Vec<DueTimer<T>> {
        debug_assert!(now_ms >= self.now_ms, "registry clock went backwards");
        self.now_ms = self.now_ms.max(now_ms);

        let mut due: Vec<(u64, u64, TimerKey)> = self
            .timers
            .iter()
            .filter(|(_, entry)| entry.fire_at_ms <= self.now_ms)
            .map(|(key, entry)| (entry.fire_at_ms, entry.seq, key))
            .collect();
        due.sort_unstable();

        let mut fired = Vec::with_capacity(due.len());
        for (_, _, key) in due {
            let Some(entry) = self.timers.get(key) else {
                continue;
            };
            let page = entry.page.clone();
            let name = entry.name.clone();
            let task = entry.task.clone();
            match entry.interval_ms {
                Some(interval) => {
                    if let Some(entry) = self.timers.get_mut(key) {
                        entry.fire_at_ms = self.now_ms + interval;
                    }
                }
                None => {
                    self.timers.remove(key);
                    self.by_key.remove(&(page.clone(), name.clone()));
                }
            }
            fired.push(DueTimer { page, name, task });
        }
        fired
    }

    // ========================================================================
    // Introspection
    // ========================================================================

    pub fn is_scheduled(&self, page: &PageId, name: &TimerName) -> bool {
        self.by_key.contains_key(&(page.clone(), name.clone()))
    }

    /// Deadline of a live timer, in registry clock ms
    pub fn scheduled_at(&self, page: &PageId, name: &TimerName) -> Option<u64> {
        let key = self.by_key.get(&(page.clone(), name.clone()))?;
        self.timers.get(*key).map(|entry| entry.fire_at_ms)
    }

    /// Total live timers across all pages
    pub fn live_count(&self) -> usize {
        self.timers.len()
    }

    /// Live timers for one page
    pub fn live_count_for(&self, page: &PageId) -> usize {
        self.timers
            .values()
            .filter(|entry| &entry.page == page)
            .count()
    }
}
