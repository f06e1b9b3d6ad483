//! Visibility/resume trigger
//!
//! Normalizes the three raw "this page is active again" signals (tab became
//! visible, history navigation restored a cached view, SPA enter hook) into
//! one deduplicated [`ResumeSignal`] stream. Raw signals land synchronously;
//! the coordinator drains the queue on its next tick, so delivery is always
//! asynchronous relative to the raw event.
//!
//! Dedup rule: multiple raw signals for the same page inside one tick
//! collapse into a single signal, and the first source wins.

use encore_core::PageId;
use indexmap::IndexMap;
use smallvec::SmallVec;
use std::fmt;

/// Which raw signal produced a resume
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResumeSource {
    /// The document became visible after being hidden
    VisibilityRegained,
    /// A history navigation restored a cached page view
    HistoryRestored,
    /// The SPA "entered" lifecycle hook fired
    PageEntered,
}

impl ResumeSource {
    /// Settle delay before the engine evaluates the signal. Entry needs the
    /// longest window for layout to finish; history restores are near
    /// instant.
    pub fn settle_delay_ms(&self) -> u64 {
        match self {
            ResumeSource::VisibilityRegained => 100,
            ResumeSource::HistoryRestored => 50,
            ResumeSource::PageEntered => 200,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ResumeSource::VisibilityRegained => "visibility-regained",
            ResumeSource::HistoryRestored => "history-restored",
            ResumeSource::PageEntered => "page-entered",
        }
    }
}

impl fmt::Display for ResumeSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Normalized "page became active again" event
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResumeSignal {
    pub page: PageId,
    pub source: ResumeSource,
}

/// Collects raw visibility/history/lifecycle signals and yields deduplicated
/// resume signals on drain.
pub struct ResumeTrigger {
    managed: Vec<PageId>,
    /// The managed page currently on screen, if any
    active: Option<PageId>,
    hidden: bool,
    /// Pending signals in arrival order; first source per page wins
    pending: IndexMap<PageId, ResumeSource>,
}

impl ResumeTrigger {
    pub fn new(managed: Vec<PageId>) -> Self {
        Self {
            managed,
            active: None,
            hidden: false,
            pending: IndexMap::new(),
        }
    }

    pub fn is_managed(&self, page: &PageId) -> bool {
        self.managed.contains(page)
    }

    pub fn active(&self) -> Option<&PageId> {
        self.active.as_ref()
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    // ========================================================================
    // Raw signals
    // ========================================================================

    /// SPA enter hook for `page`
    pub fn page_entered(&mut self, page: &PageId) {
        if !self.is_managed(page) {
            tracing::debug!("ignoring enter for unmanaged page {}", page);
            self.active = None;
            return;
        }
        self.active = Some(page.clone());
        self.raise(page, ResumeSource::PageEntered);
    }

    /// SPA leave hook for `page`. Drops any pending signal for it.
    pub fn page_left(&mut self, page: &PageId) {
        if self.active.as_ref() == Some(page) {
            self.active = None;
        }
        self.pending.shift_remove(page);
    }

    pub fn document_hidden(&mut self) {
        self.hidden = true;
    }

    /// Raises a signal for the active page, but only when the document was
    /// actually hidden before.
    pub fn document_visible(&mut self) {
        if !self.hidden {
            return;
        }
        self.hidden = false;
        if let Some(active) = self.active.clone() {
            self.raise(&active, ResumeSource::VisibilityRegained);
        }
    }

    /// History navigation restored a cached view of `page`
    pub fn history_restored(&mut self, page: &PageId) {
        if !self.is_managed(page) {
            tracing::debug!("ignoring history restore for unmanaged page {}", page);
            return;
        }
        self.active = Some(page.clone());
        self.raise(page, ResumeSource::HistoryRestored);
    }

    fn raise(&mut self, page: &PageId, source: ResumeSource) {
        if self.pending.contains_key(page) {
            // First source wins within one tick
            tracing::debug!("resume signal for {} coalesced ({})", page, source);
            return;
        }
        self.pending.insert(page.clone(), source);
    }

    // ========================================================================
    // Delivery
    // ========================================================================

    /// Take every pending signal, in arrival order
    pub fn drain(&mut self) -> SmallVec<[ResumeSignal; 2]> {
        self.pending
            .drain(..)
            .map(|(page, source)| ResumeSignal { page, source })
            .collect()
    }
}
