//! Per-visit page state and its store
//!
//! Tracks, for each page, whether the entrance sequence has completed and
//! which elements are currently in their revealed visual state. Records are
//! created lazily, reset in place, and never destroyed. `reset` is a single
//! atomic replace: subscribers are only notified after a write commits, so no
//! reader can observe a record that mixes pre- and post-reset values.
//!
//! # Example
//!
//! ```rust
//! use encore_core::{PageId, VisitStore};
//!
//! let store = VisitStore::new();
//! let page = PageId::from("serenity");
//!
//! // Lazily created with defaults
//! assert!(!store.get(&page).has_animated);
//!
//! store.update(&page, |s| {
//!     s.has_animated = true;
//!     s.gallery_index = 2;
//! });
//! store.reset(&page);
//! assert_eq!(store.get(&page).gallery_index, 0);
//! ```

use crate::page::{ElementRole, PageId};
use rustc_hash::FxHashMap;
use std::sync::RwLock;

/// Per-element reveal flags for one page visit.
///
/// Only the four roles the entrance sequence (or its scroll-driven
/// companions) reveal are tracked; the title artwork is represented by
/// `VisitState::has_animated` instead.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RevealFlags {
    pub subtitle: bool,
    pub tape: bool,
    pub scroll_hint: bool,
    pub cta: bool,
}

impl RevealFlags {
    /// Roles carrying a reveal flag
    pub const TRACKED: [ElementRole; 4] = [
        ElementRole::Subtitle,
        ElementRole::Tape,
        ElementRole::ScrollHint,
        ElementRole::Cta,
    ];

    /// True when every tracked element is revealed
    pub fn all_revealed(&self) -> bool {
        self.subtitle && self.tape && self.scroll_hint && self.cta
    }

    /// True when any tracked element is revealed
    pub fn any_revealed(&self) -> bool {
        self.subtitle || self.tape || self.scroll_hint || self.cta
    }

    /// Set every tracked flag at once
    pub fn set_all(&mut self, value: bool) {
        self.subtitle = value;
        self.tape = value;
        self.scroll_hint = value;
        self.cta = value;
    }

    /// Read the flag for a role; untracked roles report false
    pub fn is_revealed(&self, role: ElementRole) -> bool {
        match role {
            ElementRole::Subtitle => self.subtitle,
            ElementRole::Tape => self.tape,
            ElementRole::ScrollHint => self.scroll_hint,
            ElementRole::Cta => self.cta,
            _ => false,
        }
    }

    /// Set the flag for a tracked role; untracked roles are ignored
    pub fn set(&mut self, role: ElementRole, value: bool) {
        match role {
            ElementRole::Subtitle => self.subtitle = value,
            ElementRole::Tape => self.tape = value,
            ElementRole::ScrollHint => self.scroll_hint = value,
            ElementRole::Cta => self.cta = value,
            _ => {}
        }
    }
}

/// State record for one page visit
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VisitState {
    /// True once the entrance sequence has completed for the current visit
    pub has_animated: bool,
    /// Currently displayed gallery item
    pub gallery_index: usize,
    /// Per-element reveal flags
    pub reveal: RevealFlags,
    /// Document scroll offset captured when the page was last left
    pub scroll_offset: f32,
}

impl VisitState {
    /// A page that never animated must hold no reveal state and show the
    /// first gallery item.
    pub fn invariant_holds(&self) -> bool {
        self.has_animated || (!self.reveal.any_revealed() && self.gallery_index == 0)
    }

    /// True when the record equals the default exactly
    pub fn is_default(&self) -> bool {
        *self == VisitState::default()
    }
}

type Subscriber = Box<dyn Fn(&VisitState) + Send + Sync>;

/// Handle for removing a store subscription
#[derive(Debug)]
pub struct SubscriptionHandle {
    page: PageId,
    slot: usize,
}

/// Store of visit records, keyed by page.
///
/// Writes replace or merge whole records under a write lock; subscriber
/// notification happens after the lock is released, with a clone of the
/// committed record.
pub struct VisitStore {
    records: RwLock<FxHashMap<PageId, VisitState>>,
    subscribers: RwLock<FxHashMap<PageId, Vec<Option<Subscriber>>>>,
}

impl VisitStore {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(FxHashMap::default()),
            subscribers: RwLock::new(FxHashMap::default()),
        }
    }

    /// Get the record for a page, lazily recording the default
    pub fn get(&self, page: &PageId) -> VisitState {
        {
            let records = self.records.read().unwrap();
            if let Some(state) = records.get(page) {
                return state.clone();
            }
        }

        let state = VisitState::default();
        self.records
            .write()
            .unwrap()
            .insert(page.clone(), state.clone());
        state
    }

    /// Get the record if one was recorded, without creating
    pub fn try_get(&self, page: &PageId) -> Option<VisitState> {
        self.records.read().unwrap().get(page).cloned()
    }

    /// Replace the record for a page
    pub fn set(&self, page: &PageId, state: VisitState) {
        debug_assert!(state.invariant_holds(), "visit state invariant violated");
        {
            let mut records = self.records.write().unwrap();
            records.insert(page.clone(), state.clone());
        }
        self.notify(page, &state);
    }

    /// Merge into the record through a closure
    pub fn update<F>(&self, page: &PageId, f: F)
    where
        F: FnOnce(&mut VisitState),
    {
        let state = {
            let mut records = self.records.write().unwrap();
            let state = records.entry(page.clone()).or_default();
            f(state);
            debug_assert!(state.invariant_holds(), "visit state invariant violated");
            state.clone()
        };
        self.notify(page, &state);
    }

    /// Merge and return a value from the closure
    pub fn update_with<F, R>(&self, page: &PageId, f: F) -> R
    where
        F: FnOnce(&mut VisitState) -> R,
    {
        let (result, state) = {
            let mut records = self.records.write().unwrap();
            let state = records.entry(page.clone()).or_default();
            let result = f(state);
            debug_assert!(state.invariant_holds(), "visit state invariant violated");
            (result, state.clone())
        };
        self.notify(page, &state);
        result
    }

    /// Overwrite the record with the default state (atomic replace)
    pub fn reset(&self, page: &PageId) {
        tracing::debug!("visit record for {} reset to default", page);
        self.set(page, VisitState::default());
    }

    /// Subscribe to committed changes for one page
    pub fn subscribe<F>(&self, page: &PageId, callback: F) -> SubscriptionHandle
    where
        F: Fn(&VisitState) + Send + Sync + 'static,
    {
        let mut subscribers = self.subscribers.write().unwrap();
        let subs = subscribers.entry(page.clone()).or_default();
        let slot = subs.len();
        subs.push(Some(Box::new(callback)));

        SubscriptionHandle {
            page: page.clone(),
            slot,
        }
    }

    /// Remove a subscription
    pub fn unsubscribe(&self, handle: SubscriptionHandle) {
        let mut subscribers = self.subscribers.write().unwrap();
        if let Some(subs) = subscribers.get_mut(&handle.page) {
            if let Some(entry) = subs.get_mut(handle.slot) {
                *entry = None;
            }
        }
    }

    /// Pages with a recorded state
    pub fn pages(&self) -> Vec<PageId> {
        self.records.read().unwrap().keys().cloned().collect()
    }

    /// Whether a page has a recorded state
    pub fn contains(&self, page: &PageId) -> bool {
        self.records.read().unwrap().contains_key(page)
    }

    fn notify(&self, page: &PageId, state: &VisitState) {
        let subscribers = self.subscribers.read().unwrap();
        if let Some(subs) = subscribers.get(page) {
            for callback in subs.iter().flatten() {
                callback(state);
            }
        }
    }
}

impl Default for VisitStore {
    fn default() -> Self {
        Self::new()
    }
}
