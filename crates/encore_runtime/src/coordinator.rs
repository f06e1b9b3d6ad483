//! Lifecycle coordinator
//!
//! [`LifecycleCoordinator`] is the composition root: it owns the engine
//! behind one mutex and exposes the host-facing surface (SPA lifecycle
//! hooks, visibility/history signals, the tick pump, queries). Components
//! that outlive the app shell hold a [`CoordinatorHandle`], a weak reference
//! whose calls become no-ops once the coordinator is dropped.

use crate::engine::LifecycleInner;
use encore_core::{
    CoordinatorConfig, GalleryRegistry, PageId, PagePhase, SubscriptionHandle, VisitState,
    VisualStage,
};
use std::sync::{Arc, Mutex, OnceLock, Weak};

// ============================================================================
// Global Coordinator State
// ============================================================================

/// Global coordinator handle for access from anywhere in the application
static GLOBAL_COORDINATOR: OnceLock<CoordinatorHandle> = OnceLock::new();

/// Install the global coordinator handle
///
/// Call once at app startup after wiring the coordinator to its stage.
///
/// # Panics
///
/// Panics if called more than once.
pub fn install_global(handle: CoordinatorHandle) {
    if GLOBAL_COORDINATOR.set(handle).is_err() {
        panic!("install_global() called more than once");
    }
}

/// Get the global coordinator handle
///
/// # Panics
///
/// Panics if [`install_global`] has not been called.
pub fn global() -> CoordinatorHandle {
    GLOBAL_COORDINATOR
        .get()
        .expect("Lifecycle coordinator not installed. Call install_global() at app startup.")
        .clone()
}

/// Try to get the global coordinator handle (returns None if not installed)
pub fn try_global() -> Option<CoordinatorHandle> {
    GLOBAL_COORDINATOR.get().cloned()
}

/// Check if the global coordinator has been installed
pub fn is_global_installed() -> bool {
    GLOBAL_COORDINATOR.get().is_some()
}

// ============================================================================
// LifecycleCoordinator
// ============================================================================

/// The animation lifecycle coordinator.
///
/// Entrance sequences run exactly once per page visit; resets drive a page
/// back to its baseline deterministically; resumed views that look stale
/// replay their entrance. The host feeds it lifecycle notifications and
/// clock ticks; it talks back only through the injected
/// [`VisualStage`].
///
/// # Example
///
/// ```rust
/// use encore_core::{Bounds, CoordinatorConfig, ElementRole, GalleryRegistry, PageId};
/// use encore_runtime::{LifecycleCoordinator, MemoryStage};
///
/// let mut stage = MemoryStage::new(800.0, 600.0);
/// stage.add_element(
///     PageId::from("serenity"),
///     ElementRole::Title,
///     Bounds::new(0.0, 100.0, 400.0, 120.0),
/// );
///
/// let config = CoordinatorConfig::new().with_pages(["serenity"]);
/// let coordinator =
///     LifecycleCoordinator::new(config, Box::new(stage.clone()), GalleryRegistry::new());
///
/// // The trigger is already on screen, so the entrance starts right after
/// // the page-enter settle delay.
/// coordinator.page_entered("serenity");
/// for t in (0u64..=400).step_by(50) {
///     coordinator.tick(t);
/// }
/// assert!(coordinator.phase("serenity").is_animating());
/// ```
pub struct LifecycleCoordinator {
    inner: Arc<Mutex<LifecycleInner>>,
}

impl LifecycleCoordinator {
    pub fn new(
        config: CoordinatorConfig,
        stage: Box<dyn VisualStage>,
        galleries: GalleryRegistry,
    ) -> Self {
        Self {
            inner: Arc::new(Mutex::new(LifecycleInner::new(config, stage, galleries))),
        }
    }

    /// Get a weak handle for passing to components
    pub fn handle(&self) -> CoordinatorHandle {
        CoordinatorHandle {
            inner: Arc::downgrade(&self.inner),
        }
    }

    // ========================================================================
    // Host signals
    // ========================================================================

    /// Advance the coordinator clock and run everything that came due
    pub fn tick(&self, now_ms: u64) {
        self.inner.lock().unwrap().tick(now_ms);
    }

    /// SPA after-enter hook
    pub fn page_entered(&self, page: impl Into<PageId>) {
        self.inner.lock().unwrap().page_entered(&page.into());
    }

    /// SPA before-leave hook
    pub fn page_leaving(&self, page: impl Into<PageId>) {
        self.inner.lock().unwrap().page_leaving(&page.into());
    }

    pub fn document_hidden(&self) {
        self.inner.lock().unwrap().document_hidden();
    }

    pub fn document_visible(&self) {
        self.inner.lock().unwrap().document_visible();
    }

    /// History navigation restored a cached view of `page`
    pub fn history_restored(&self, page: impl Into<PageId>) {
        self.inner.lock().unwrap().history_restored(&page.into());
    }

    /// Scroll or layout changed; sweeps the observation trigger
    pub fn viewport_changed(&self) {
        self.inner.lock().unwrap().viewport_changed();
    }

    /// Run the reset algorithm for `page` regardless of staleness
    pub fn force_reset(&self, page: impl Into<PageId>) {
        self.inner.lock().unwrap().force_reset(&page.into());
    }

    /// Step the page's gallery to its next item
    pub fn advance_gallery(&self, page: impl Into<PageId>) {
        self.inner.lock().unwrap().advance_gallery(&page.into());
    }

    /// The decorative intro finished (or was skipped). Emits the completion
    /// notification exactly once per process; later calls are no-ops.
    pub fn intro_finished(&self) {
        let callback = self.inner.lock().unwrap().take_intro_fire();
        if let Some(callback) = callback {
            callback();
        }
    }

    /// Register the intro-completion listener
    pub fn on_intro_complete(&self, callback: impl Fn() + Send + Sync + 'static) {
        self.inner
            .lock()
            .unwrap()
            .set_intro_callback(Arc::new(callback));
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn visit_state(&self, page: impl Into<PageId>) -> VisitState {
        self.inner.lock().unwrap().visit_state(&page.into())
    }

    pub fn phase(&self, page: impl Into<PageId>) -> PagePhase {
        self.inner.lock().unwrap().phase(&page.into())
    }

    /// Subscribe to visit-state changes for a page.
    ///
    /// Callbacks run after the write commits. They must not call back into
    /// the coordinator.
    pub fn subscribe<F>(&self, page: impl Into<PageId>, callback: F) -> SubscriptionHandle
    where
        F: Fn(&VisitState) + Send + Sync + 'static,
    {
        self.inner.lock().unwrap().subscribe(&page.into(), callback)
    }

    pub fn unsubscribe(&self, handle: SubscriptionHandle) {
        self.inner.lock().unwrap().unsubscribe(handle);
    }

    /// Live timers across all pages
    pub fn live_timer_count(&self) -> usize {
        self.inner.lock().unwrap().live_timer_count()
    }

    /// Live timers for one page
    pub fn live_timer_count_for(&self, page: impl Into<PageId>) -> usize {
        self.inner.lock().unwrap().live_timer_count_for(&page.into())
    }

    /// Whether a reset (including its settle window) is in flight
    pub fn is_reset_active(&self) -> bool {
        self.inner.lock().unwrap().is_reset_active()
    }
}

// ============================================================================
// CoordinatorHandle
// ============================================================================

/// Weak handle to the coordinator
///
/// Passed to components that should not keep the coordinator alive. Every
/// call is a no-op (queries return `None`) once the coordinator is dropped.
#[derive(Clone)]
pub struct CoordinatorHandle {
    inner: Weak<Mutex<LifecycleInner>>,
}

impl CoordinatorHandle {
    pub fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }

    pub fn tick(&self, now_ms: u64) {
        if let Some(inner) = self.inner.upgrade() {
            inner.lock().unwrap().tick(now_ms);
        }
    }

    pub fn page_entered(&self, page: impl Into<PageId>) {
        if let Some(inner) = self.inner.upgrade() {
            inner.lock().unwrap().page_entered(&page.into());
        }
    }

    pub fn page_leaving(&self, page: impl Into<PageId>) {
        if let Some(inner) = self.inner.upgrade() {
            inner.lock().unwrap().page_leaving(&page.into());
        }
    }

    pub fn document_hidden(&self) {
        if let Some(inner) = self.inner.upgrade() {
            inner.lock().unwrap().document_hidden();
        }
    }

    pub fn document_visible(&self) {
        if let Some(inner) = self.inner.upgrade() {
            inner.lock().unwrap().document_visible();
        }
    }

    pub fn history_restored(&self, page: impl Into<PageId>) {
        if let Some(inner) = self.inner.upgrade() {
            inner.lock().unwrap().history_restored(&page.into());
        }
    }

    pub fn viewport_changed(&self) {
        if let Some(inner) = self.inner.upgrade() {
            inner.lock().unwrap().viewport_changed();
        }
    }

    pub fn force_reset(&self, page: impl Into<PageId>) {
        if let Some(inner) = self.inner.upgrade() {
            inner.lock().unwrap().force_reset(&page.into());
        }
    }

    pub fn advance_gallery(&self, page: impl Into<PageId>) {
        if let Some(inner) = self.inner.upgrade() {
            inner.lock().unwrap().advance_gallery(&page.into());
        }
    }

    pub fn intro_finished(&self) {
        let Some(inner) = self.inner.upgrade() else {
            return;
        };
        let callback = inner.lock().unwrap().take_intro_fire();
        if let Some(callback) = callback {
            callback();
        }
    }

    pub fn visit_state(&self, page: impl Into<PageId>) -> Option<VisitState> {
        self.inner
            .upgrade()
            .map(|inner| inner.lock().unwrap().visit_state(&page.into()))
    }

    pub fn phase(&self, page: impl Into<PageId>) -> Option<PagePhase> {
        self.inner
            .upgrade()
            .map(|inner| inner.lock().unwrap().phase(&page.into()))
    }
}
