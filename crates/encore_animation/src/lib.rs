//! Encore Animation
//!
//! Timing layer for the Encore lifecycle coordinator:
//!
//! - **Timer Registry**: single-owner delayed/repeating tasks keyed by
//!   `(page, name)`, driven by the host clock
//! - **Entrance Timeline**: the declarative step list plus every timing,
//!   baseline and final-value constant
//! - **Width Jitter**: the deterministic idle stroke-width picker
//!
//! Nothing in this crate touches the stage or the visit store; it only
//! decides *when* things happen and *which* values apply.

pub mod registry;
pub mod sequence;

pub use registry::{DueTimer, TimerKey, TimerRegistry};
pub use sequence::{
    baseline_ops, final_ops, jitter_width, reveal_ops, StepKind, StepSpec, TimerName,
    ENTRANCE_STEPS, JITTER_INTERVAL_MS, JITTER_START_DELAY_MS, JITTER_WIDTHS, RESET_SETTLE_MS,
    STROKE_FRAME_SPACING_MS, STROKE_FRAME_WIDTHS, TAPE_OVERSHOOT_SCALE, TAPE_SETTLE_DELAY_MS,
    TITLE_FINAL_WIDTH,
};
