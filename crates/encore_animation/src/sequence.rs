//! The declarative entrance timeline
//!
//! This module is pure data: the ordered step list, every timing constant, and
//! the baseline/final visual values for each element role. The runtime engine
//! walks these tables; nothing here schedules anything itself.
//!
//! Keeping the timeline declarative means a reset can cancel exactly the
//! in-flight steps by name, instead of chasing nested closures.

use encore_core::{Color, ElementRole, VisualOp};
use std::fmt;

// ============================================================================
// Steps
// ============================================================================

/// The four entrance reveal steps, in play order
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StepKind {
    Title,
    Subtitle,
    Tape,
    ScrollHint,
}

impl StepKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepKind::Title => "title",
            StepKind::Subtitle => "subtitle",
            StepKind::Tape => "tape",
            StepKind::ScrollHint => "scroll-hint",
        }
    }

    /// The element role this step mutates
    pub fn role(&self) -> ElementRole {
        match self {
            StepKind::Title => ElementRole::Title,
            StepKind::Subtitle => ElementRole::Subtitle,
            StepKind::Tape => ElementRole::Tape,
            StepKind::ScrollHint => ElementRole::ScrollHint,
        }
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One entry in the entrance timeline
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StepSpec {
    pub kind: StepKind,
    /// Milliseconds from sequence start
    pub offset_ms: u64,
}

/// The entrance timeline. Offsets are relative to sequence start; the title
/// fires immediately, the subtitle follows a second behind, tape 400 ms after
/// that, and the scroll hint trails 1200 ms after the subtitle.
pub const ENTRANCE_STEPS: [StepSpec; 4] = [
    StepSpec {
        kind: StepKind::Title,
        offset_ms: 0,
    },
    StepSpec {
        kind: StepKind::Subtitle,
        offset_ms: 1000,
    },
    StepSpec {
        kind: StepKind::Tape,
        offset_ms: 1400,
    },
    StepSpec {
        kind: StepKind::ScrollHint,
        offset_ms: 2200,
    },
];

// ============================================================================
// Timing constants
// ============================================================================

/// Discrete stroke width keyframes for the title draw-on effect
pub const STROKE_FRAME_WIDTHS: [f32; 5] = [0.0, 20.0, 45.0, 70.0, 80.0];

/// Spacing between stroke width keyframes
pub const STROKE_FRAME_SPACING_MS: u64 = 100;

/// Pause between the last stroke frame and the first jitter tick
pub const JITTER_START_DELAY_MS: u64 = 300;

/// Widths the idle jitter cycles through
pub const JITTER_WIDTHS: [f32; 3] = [60.0, 80.0, 100.0];

/// Interval of the idle jitter timer
pub const JITTER_INTERVAL_MS: u64 = 1000;

/// Delay before the tape overshoot relaxes back to resting scale
pub const TAPE_SETTLE_DELAY_MS: u64 = 200;

/// Tape scale at the top of the overshoot
pub const TAPE_OVERSHOOT_SCALE: f32 = 1.1;

/// Reset settle delay before the in-view recheck
pub const RESET_SETTLE_MS: u64 = 100;

/// Stroke width the title holds under reduced motion
pub const TITLE_FINAL_WIDTH: f32 = 80.0;

// ============================================================================
// Timer names
// ============================================================================

/// Names for every timer the coordinator registers.
///
/// One live timer per `(page, name)` key; scheduling under an occupied key
/// replaces the old timer.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TimerName {
    /// One of the four entrance steps
    Step(StepKind),
    /// A single stroke width keyframe, by index
    StrokeFrame(u8),
    /// The one-shot that arms the repeating jitter
    JitterStart,
    /// The repeating idle width jitter
    Jitter,
    /// Tape overshoot relaxation
    TapeSettle,
    /// Post-resume settle before staleness evaluation
    ResumeSettle,
}

impl fmt::Display for TimerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimerName::Step(kind) => write!(f, "step:{kind}"),
            TimerName::StrokeFrame(index) => write!(f, "stroke-frame:{index}"),
            TimerName::JitterStart => write!(f, "jitter-start"),
            TimerName::Jitter => write!(f, "jitter"),
            TimerName::TapeSettle => write!(f, "tape-settle"),
            TimerName::ResumeSettle => write!(f, "resume-settle"),
        }
    }
}

// ============================================================================
// Visual value tables
// ============================================================================

/// Pre-animation baseline for a role.
///
/// Reset applies these unconditionally. Roles with no baseline writes
/// (the gallery resets through item selection instead) return an empty slice.
pub fn baseline_ops(role: ElementRole) -> &'static [VisualOp] {
    match role {
        ElementRole::Title => &[VisualOp::StrokeProgress(0.0), VisualOp::StrokeWidth(0.0)],
        ElementRole::Subtitle => &[
            VisualOp::Opacity(0.0),
            VisualOp::TranslateY(20.0),
            VisualOp::Scale(0.95),
        ],
        ElementRole::Tape => &[
            VisualOp::Opacity(0.0),
            VisualOp::TranslateXPercent(-50.0),
            VisualOp::RotateDeg(-8.0),
        ],
        ElementRole::ScrollHint => &[VisualOp::Opacity(0.0)],
        ElementRole::Cta => &[VisualOp::Opacity(0.0), VisualOp::TranslateY(20.0)],
        ElementRole::Gallery => &[],
        ElementRole::Background => &[VisualOp::Background(Color::WHITE)],
    }
}

/// Values a step applies when it fires during the live sequence.
///
/// The title's stroke widths and the tape's settle are follow-up timers, not
/// part of this list.
pub fn reveal_ops(kind: StepKind) -> &'static [VisualOp] {
    match kind {
        StepKind::Title => &[VisualOp::StrokeProgress(1.0)],
        StepKind::Subtitle => &[
            VisualOp::Opacity(1.0),
            VisualOp::TranslateY(0.0),
            VisualOp::Scale(1.0),
        ],
        StepKind::Tape => &[
            VisualOp::Opacity(1.0),
            VisualOp::Scale(TAPE_OVERSHOOT_SCALE),
        ],
        StepKind::ScrollHint => &[VisualOp::Opacity(1.0)],
    }
}

/// Final resting values for a step, applied synchronously under reduced
/// motion (and by the tape settle timer for the scale component).
pub fn final_ops(kind: StepKind) -> &'static [VisualOp] {
    match kind {
        StepKind::Title => &[
            VisualOp::StrokeProgress(1.0),
            VisualOp::StrokeWidth(TITLE_FINAL_WIDTH),
        ],
        StepKind::Subtitle => &[
            VisualOp::Opacity(1.0),
            VisualOp::TranslateY(0.0),
            VisualOp::Scale(1.0),
        ],
        StepKind::Tape => &[VisualOp::Opacity(1.0), VisualOp::Scale(1.0)],
        StepKind::ScrollHint => &[VisualOp::Opacity(1.0)],
    }
}

// ============================================================================
// Width jitter
// ============================================================================

/// Integer hash for the jitter picker. Deterministic, no RNG state to carry.
fn jitter_hash(tick: u64, salt: u64) -> u32 {
    let mut h = (tick as u32).wrapping_mul(374761393);
    h = h.wrapping_add(((tick >> 32) as u32).wrapping_mul(668265263));
    h = h.wrapping_add((salt as u32).wrapping_mul(2654435761));
    h ^= h >> 13;
    h = h.wrapping_mul(1274126177);
    h ^= h >> 16;
    h
}

/// Pick the stroke width for one jitter tick
pub fn jitter_width(tick: u64, salt: u64) -> f32 {
    let index = jitter_hash(tick, salt) as usize % JITTER_WIDTHS.len();
    JITTER_WIDTHS[index]
}
