//! Animation sequencer
//!
//! Walks the declarative entrance timeline for one page. Every delayed piece
//! of work goes through the Timer Registry under its own name, so a reset
//! cancels exactly the in-flight steps. Handlers treat phase `Idle` as
//! "cancelled": a reset flips the phase before any already-collected task for
//! that page can run, which gives the same guarantee a cleared host timer
//! would.

use crate::engine::{EngineTask, LifecycleInner};
use encore_animation::{
    final_ops, jitter_width, reveal_ops, StepKind, TimerName, ENTRANCE_STEPS, JITTER_INTERVAL_MS,
    JITTER_START_DELAY_MS, STROKE_FRAME_SPACING_MS, STROKE_FRAME_WIDTHS, TAPE_SETTLE_DELAY_MS,
};
use encore_core::{PageId, PagePhase, VisualOp};

impl LifecycleInner {
    /// Start the entrance sequence. Gated on `Idle` phase and a fresh visit
    /// record, so a page can never double-start.
    pub(crate) fn begin_sequence(&mut self, page: &PageId) {
        if self.phase(page) != PagePhase::Idle {
            tracing::debug!("sequence not started for {} (phase {})", page, self.phase(page));
            return;
        }
        if self.store.get(page).has_animated {
            tracing::debug!("sequence not started for {} (already animated)", page);
            return;
        }
        self.set_phase(page, PagePhase::Animating);

        if self.config.reduced_motion {
            self.run_reduced(page);
            return;
        }

        tracing::debug!("entrance sequence begins for {}", page);
        for (index, step) in ENTRANCE_STEPS.iter().enumerate() {
            self.registry.schedule(
                page.clone(),
                TimerName::Step(step.kind),
                step.offset_ms,
                EngineTask::StepReveal { step: index },
            );
        }
    }

    /// Reduced motion: every final value lands synchronously, zero timers
    fn run_reduced(&mut self, page: &PageId) {
        tracing::debug!("reduced motion finals for {}", page);
        let bundle = self.bundle(page);
        for step in ENTRANCE_STEPS {
            self.apply_ops(bundle.get(step.kind.role()), final_ops(step.kind));
        }
        self.complete_sequence(page);
    }

    pub(crate) fn run_step(&mut self, page: &PageId, index: usize) {
        if self.phase(page) != PagePhase::Animating {
            return;
        }
        let Some(spec) = ENTRANCE_STEPS.get(index) else {
            return;
        };
        tracing::debug!("step {} fires for {}", spec.kind, page);
        let bundle = self.bundle(page);
        self.apply_ops(bundle.get(spec.kind.role()), reveal_ops(spec.kind));

        match spec.kind {
            StepKind::Title => {
                for (frame, _) in STROKE_FRAME_WIDTHS.iter().enumerate() {
                    self.registry.schedule(
                        page.clone(),
                        TimerName::StrokeFrame(frame as u8),
                        frame as u64 * STROKE_FRAME_SPACING_MS,
                        EngineTask::StrokeFrame { frame },
                    );
                }
            }
            StepKind::Tape => {
                self.registry.schedule(
                    page.clone(),
                    TimerName::TapeSettle,
                    TAPE_SETTLE_DELAY_MS,
                    EngineTask::TapeSettle,
                );
            }
            StepKind::ScrollHint => self.complete_sequence(page),
            StepKind::Subtitle => {}
        }
    }

    pub(crate) fn on_stroke_frame(&mut self, page: &PageId, frame: usize) {
        if self.phase(page) != PagePhase::Animating {
            return;
        }
        let Some(width) = STROKE_FRAME_WIDTHS.get(frame) else {
            return;
        };
        let bundle = self.bundle(page);
        self.apply_ops(bundle.title, &[VisualOp::StrokeWidth(*width)]);

        if frame + 1 == STROKE_FRAME_WIDTHS.len() {
            self.registry.schedule(
                page.clone(),
                TimerName::JitterStart,
                JITTER_START_DELAY_MS,
                EngineTask::JitterStart,
            );
        }
    }

    pub(crate) fn on_jitter_start(&mut self, page: &PageId) {
        if self.phase(page) == PagePhase::Idle {
            return;
        }
        self.registry.schedule_repeating(
            page.clone(),
            TimerName::Jitter,
            JITTER_INTERVAL_MS,
            EngineTask::JitterTick,
        );
    }

    /// The idle hand-tremor. Keeps running in `Settled`; a reset or leave
    /// cancels it, and ticks landing while a reset is active are skipped.
    pub(crate) fn on_jitter_tick(&mut self, page: &PageId) {
        if self.phase(page) == PagePhase::Idle {
            return;
        }
        if self.reset_active {
            tracing::trace!("jitter tick skipped for {} (reset active)", page);
            return;
        }
        self.jitter_ticks += 1;
        let width = jitter_width(self.registry.now(), self.jitter_ticks);
        let bundle = self.bundle(page);
        self.apply_ops(bundle.title, &[VisualOp::StrokeWidth(width)]);
    }

    pub(crate) fn on_tape_settle(&mut self, page: &PageId) {
        if self.phase(page) == PagePhase::Idle {
            return;
        }
        let bundle = self.bundle(page);
        self.apply_ops(bundle.tape, &[VisualOp::Scale(1.0)]);
    }

    /// The single completion write: `has_animated` plus every reveal flag,
    /// committed atomically, then the page settles.
    fn complete_sequence(&mut self, page: &PageId) {
        self.store.update(page, |state| {
            state.has_animated = true;
            state.reveal.set_all(true);
        });
        self.set_phase(page, PagePhase::Settled);
        tracing::debug!("entrance sequence complete for {}", page);
    }
}
