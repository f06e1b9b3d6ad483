//! Reset/reconcile engine
//!
//! [`LifecycleInner`] owns every component behind the coordinator's mutex:
//! the visit store, the timer registry, both triggers, the stage boundary and
//! the per-page phase map. All work funnels through [`tick`](LifecycleInner::tick)
//! on the single control thread.
//!
//! The reset algorithm runs under the ResetToken (`reset_active`). The token
//! is held across the settle window and released by the recheck task, which
//! is kept outside the Timer Registry so `cancel_all` can never strand it.

use crate::observe::ObservationTrigger;
use crate::resume::{ResumeSource, ResumeTrigger};
use encore_animation::{baseline_ops, DueTimer, TimerName, TimerRegistry, RESET_SETTLE_MS};
use encore_core::{
    CoordinatorConfig, ElementBundle, ElementId, ElementRole, GalleryRegistry, PageId, PagePhase,
    SubscriptionHandle, VisitState, VisitStore, VisualOp, VisualStage,
};
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// Work items carried by registry timers
#[derive(Clone, Debug)]
pub(crate) enum EngineTask {
    /// Post-settle staleness evaluation of a resume signal
    EvaluateResume { source: ResumeSource },
    /// One entrance step, by index into the step list
    StepReveal { step: usize },
    /// One stroke width keyframe, by index
    StrokeFrame { frame: usize },
    /// Arms the repeating jitter
    JitterStart,
    JitterTick,
    TapeSettle,
}

/// Reset settle recheck, deliberately not a registry timer
struct PendingRecheck {
    page: PageId,
    fire_at_ms: u64,
}

pub(crate) struct LifecycleInner {
    pub(crate) config: CoordinatorConfig,
    pub(crate) store: VisitStore,
    pub(crate) registry: TimerRegistry<EngineTask>,
    pub(crate) resume: ResumeTrigger,
    pub(crate) observe: ObservationTrigger,
    pub(crate) stage: Box<dyn VisualStage>,
    pub(crate) galleries: GalleryRegistry,
    /// Resolved element ids, refreshed on page entry and reset
    pub(crate) bundles: FxHashMap<PageId, ElementBundle>,
    pub(crate) phases: FxHashMap<PageId, PagePhase>,
    /// The ResetToken: one reset at a time, coordinator-wide
    pub(crate) reset_active: bool,
    rechecks: Vec<PendingRecheck>,
    intro_callback: Option<Arc<dyn Fn() + Send + Sync>>,
    intro_fired: bool,
    pub(crate) jitter_ticks: u64,
}

impl LifecycleInner {
    pub(crate) fn new(
        config: CoordinatorConfig,
        stage: Box<dyn VisualStage>,
        galleries: GalleryRegistry,
    ) -> Self {
        let resume = ResumeTrigger::new(config.pages.clone());
        Self {
            store: VisitStore::new(),
            registry: TimerRegistry::new(),
            resume,
            observe: ObservationTrigger::new(),
            stage,
            galleries,
            bundles: FxHashMap::default(),
            phases: FxHashMap::default(),
            reset_active: false,
            rechecks: Vec::new(),
            intro_callback: None,
            intro_fired: false,
            jitter_ticks: 0,
            config,
        }
    }

    // ========================================================================
    // Tick pump
    // ========================================================================

    /// Drain resume signals, due rechecks and due timers until nothing is
    /// runnable at `now_ms`. Bounded so zero-delay chains cannot spin.
    pub(crate) fn tick(&mut self, now_ms: u64) {
        const MAX_PASSES: usize = 16;
        self.registry.sync_clock(now_ms);
        for _ in 0..MAX_PASSES {
            let mut did_work = false;

            for signal in self.resume.drain() {
                did_work = true;
                tracing::debug!("resume signal: {} via {}", signal.page, signal.source);
                self.registry.schedule(
                    signal.page.clone(),
                    TimerName::ResumeSettle,
                    signal.source.settle_delay_ms(),
                    EngineTask::EvaluateResume {
                        source: signal.source,
                    },
                );
            }

            let mut due = Vec::new();
            let mut remaining = Vec::new();
            for recheck in self.rechecks.drain(..) {
                if recheck.fire_at_ms <= now_ms {
                    due.push(recheck);
                } else {
                    remaining.push(recheck);
                }
            }
            self.rechecks = remaining;
            for recheck in due {
                did_work = true;
                self.on_reset_recheck(&recheck.page);
            }

            for timer in self.registry.advance(now_ms) {
                did_work = true;
                self.dispatch(timer);
            }

            if !did_work {
                break;
            }
        }
    }

    fn dispatch(&mut self, timer: DueTimer<EngineTask>) {
        match timer.task {
            EngineTask::EvaluateResume { source } => self.evaluate_resume(&timer.page, source),
            EngineTask::StepReveal { step } => self.run_step(&timer.page, step),
            EngineTask::StrokeFrame { frame } => self.on_stroke_frame(&timer.page, frame),
            EngineTask::JitterStart => self.on_jitter_start(&timer.page),
            EngineTask::JitterTick => self.on_jitter_tick(&timer.page),
            EngineTask::TapeSettle => self.on_tape_settle(&timer.page),
        }
    }

    // ========================================================================
    // Host notifications
    // ========================================================================

    pub(crate) fn page_entered(&mut self, page: &PageId) {
        if self.config.manages(page) {
            let bundle = self.refresh_bundle(page);
            if let Some(trigger) = bundle.title {
                self.observe.arm(page, trigger);
            }
        }
        self.resume.page_entered(page);
    }

    /// Saves the scroll offset, cancels the page's timers and stops watching.
    /// Phase and reveal flags survive; the staleness check on return needs
    /// them.
    pub(crate) fn page_leaving(&mut self, page: &PageId) {
        if self.config.manages(page) {
            tracing::debug!("page leaving: {}", page);
            let offset = self.stage.scroll_offset();
            self.store.update(page, |state| state.scroll_offset = offset);
            self.registry.cancel_all(page);
            self.observe.disarm(page);
            self.bundles.remove(page);
        }
        self.resume.page_left(page);
    }

    pub(crate) fn document_hidden(&mut self) {
        self.resume.document_hidden();
    }

    pub(crate) fn document_visible(&mut self) {
        self.resume.document_visible();
    }

    pub(crate) fn history_restored(&mut self, page: &PageId) {
        self.resume.history_restored(page);
    }

    /// Scroll or layout moved the viewport
    pub(crate) fn viewport_changed(&mut self) {
        self.sweep_and_begin();
    }

    // ========================================================================
    // Resume evaluation
    // ========================================================================

    pub(crate) fn evaluate_resume(&mut self, page: &PageId, source: ResumeSource) {
        tracing::debug!("evaluating resume for {} ({})", page, source);
        if self.is_stale(page) {
            self.reset_page(page);
        } else {
            self.sweep_and_begin();
        }
    }

    /// A settled view that came back with its trigger on screen. The flags
    /// say the animation already played, but the user just got the page back
    /// and expects the replay.
    fn is_stale(&mut self, page: &PageId) -> bool {
        if !self.store.get(page).reveal.all_revealed() {
            return false;
        }
        self.trigger_in_view(page)
    }

    fn sweep_and_begin(&mut self) {
        let entered = self.observe.sweep(self.stage.as_ref());
        for page in entered {
            self.handle_entered(&page);
        }
    }

    fn handle_entered(&mut self, page: &PageId) {
        if self.phase(page) != PagePhase::Idle {
            tracing::debug!("entered ignored for {} (phase {})", page, self.phase(page));
            return;
        }
        if self.store.get(page).has_animated {
            tracing::debug!("entered ignored for {} (already animated)", page);
            return;
        }
        self.begin_sequence(page);
    }

    // ========================================================================
    // Reset
    // ========================================================================

    pub(crate) fn reset_page(&mut self, page: &PageId) {
        if self.reset_active {
            tracing::debug!("reset for {} dropped (one already active)", page);
            return;
        }
        self.reset_active = true;
        tracing::debug!("reset begins for {}", page);

        self.registry.cancel_all(page);

        let bundle = self.refresh_bundle(page);
        for role in ElementRole::ALL {
            self.apply_ops(bundle.get(role), baseline_ops(role));
        }

        self.reset_gallery(page, &bundle);

        self.store.reset(page);

        if let Some(trigger) = bundle.title {
            self.observe.rearm(page, trigger);
        }

        self.set_phase(page, PagePhase::Idle);

        self.rechecks.push(PendingRecheck {
            page: page.clone(),
            fire_at_ms: self.registry.now() + RESET_SETTLE_MS,
        });
    }

    fn reset_gallery(&mut self, page: &PageId, bundle: &ElementBundle) {
        let Some(element) = bundle.gallery else {
            return;
        };
        let Some(descriptor) = self.galleries.descriptor(page) else {
            return;
        };
        if descriptor.is_empty() {
            return;
        }
        if let Err(err) = self.stage.show_gallery_item(element, 0) {
            tracing::warn!("gallery reset failed for {}: {}", page, err);
        }
        let tapes = descriptor
            .item(0)
            .map(|item| item.tapes.as_slice())
            .unwrap_or(&[]);
        if let Err(err) = self.stage.rebuild_tape_layers(element, tapes) {
            tracing::warn!("tape rebuild failed for {}: {}", page, err);
        }
    }

    /// Settle recheck: lift the token, then resume immediately if the trigger
    /// is already on screen.
    fn on_reset_recheck(&mut self, page: &PageId) {
        self.reset_active = false;
        tracing::debug!("reset settled for {}", page);

        if self.phase(page) == PagePhase::Idle
            && !self.store.get(page).has_animated
            && self.trigger_in_view(page)
        {
            tracing::debug!("trigger still in view, resuming {}", page);
            self.begin_sequence(page);
        }
    }

    pub(crate) fn force_reset(&mut self, page: &PageId) {
        if !self.config.manages(page) {
            tracing::debug!("force reset for unmanaged page {}", page);
            return;
        }
        self.reset_page(page);
    }

    // ========================================================================
    // Gallery
    // ========================================================================

    pub(crate) fn advance_gallery(&mut self, page: &PageId) {
        if !self.config.manages(page) {
            tracing::debug!("gallery advance for unmanaged page {}", page);
            return;
        }
        let state = self.store.get(page);
        if !state.has_animated {
            tracing::debug!("gallery advance skipped for {} (not animated yet)", page);
            return;
        }
        let bundle = self.bundle(page);
        let Some(element) = bundle.gallery else {
            tracing::debug!("gallery advance skipped for {} (no gallery element)", page);
            return;
        };
        let Some(descriptor) = self.galleries.descriptor(page) else {
            tracing::debug!("gallery advance skipped for {} (no descriptor)", page);
            return;
        };
        let Some(next) = descriptor.next_index(state.gallery_index) else {
            return;
        };
        if let Err(err) = self.stage.show_gallery_item(element, next) {
            tracing::warn!("gallery advance failed for {}: {}", page, err);
            return;
        }
        let tapes = descriptor
            .item(next)
            .map(|item| item.tapes.as_slice())
            .unwrap_or(&[]);
        if let Err(err) = self.stage.rebuild_tape_layers(element, tapes) {
            tracing::warn!("tape rebuild failed for {}: {}", page, err);
        }
        self.store.update(page, |state| state.gallery_index = next);
    }

    // ========================================================================
    // Shared helpers
    // ========================================================================

    pub(crate) fn phase(&self, page: &PageId) -> PagePhase {
        self.phases.get(page).copied().unwrap_or_default()
    }

    pub(crate) fn set_phase(&mut self, page: &PageId, phase: PagePhase) {
        let previous = self.phase(page);
        if previous != phase {
            tracing::debug!("page {} phase {} -> {}", page, previous, phase);
        }
        self.phases.insert(page.clone(), phase);
    }

    pub(crate) fn bundle(&mut self, page: &PageId) -> ElementBundle {
        if let Some(bundle) = self.bundles.get(page) {
            return *bundle;
        }
        self.refresh_bundle(page)
    }

    pub(crate) fn refresh_bundle(&mut self, page: &PageId) -> ElementBundle {
        let bundle = ElementBundle::resolve(self.stage.as_ref(), page);
        self.bundles.insert(page.clone(), bundle);
        bundle
    }

    pub(crate) fn trigger_in_view(&mut self, page: &PageId) -> bool {
        let bundle = self.bundle(page);
        match bundle.title {
            Some(trigger) => self.observe.element_in_view(self.stage.as_ref(), trigger),
            None => false,
        }
    }

    /// Apply ops to an optional element, skipping a missing one silently and
    /// logging stage failures without aborting the caller.
    pub(crate) fn apply_ops(&mut self, element: Option<ElementId>, ops: &[VisualOp]) {
        let Some(element) = element else {
            return;
        };
        for op in ops {
            if let Err(err) = self.stage.apply(element, *op) {
                tracing::warn!("stage apply failed: {}", err);
            }
        }
    }

    // ========================================================================
    // Queries and callbacks
    // ========================================================================

    pub(crate) fn visit_state(&self, page: &PageId) -> VisitState {
        self.store.get(page)
    }

    pub(crate) fn subscribe<F>(&self, page: &PageId, callback: F) -> SubscriptionHandle
    where
        F: Fn(&VisitState) + Send + Sync + 'static,
    {
        self.store.subscribe(page, callback)
    }

    pub(crate) fn unsubscribe(&self, handle: SubscriptionHandle) {
        self.store.unsubscribe(handle);
    }

    pub(crate) fn live_timer_count(&self) -> usize {
        self.registry.live_count()
    }

    pub(crate) fn live_timer_count_for(&self, page: &PageId) -> usize {
        self.registry.live_count_for(page)
    }

    pub(crate) fn is_reset_active(&self) -> bool {
        self.reset_active
    }

    pub(crate) fn set_intro_callback(&mut self, callback: Arc<dyn Fn() + Send + Sync>) {
        self.intro_callback = Some(callback);
    }

    /// Marks the intro as finished. Returns the callback to invoke, only on
    /// the first call.
    pub(crate) fn take_intro_fire(&mut self) -> Option<Arc<dyn Fn() + Send + Sync>> {
        if self.intro_fired {
            tracing::debug!("intro completion already emitted");
            return None;
        }
        self.intro_fired = true;
        self.intro_callback.clone()
    }
}
