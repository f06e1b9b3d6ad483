//! Scenario tests for the lifecycle coordinator.
//!
//! Each test drives a coordinator through host notifications and a stepped
//! clock against a [`MemoryStage`], then inspects visual props and visit
//! state. The clock advances in 50 ms ticks, which lands exactly on every
//! deadline in the entrance timeline.

use crate::coordinator::LifecycleCoordinator;
use crate::stage::{MemoryStage, VisualProps};
use crate::{install_global, is_global_installed, try_global};
use encore_animation::{baseline_ops, JITTER_WIDTHS, TAPE_OVERSHOOT_SCALE, TITLE_FINAL_WIDTH};
use encore_core::{
    Bounds, CoordinatorConfig, ElementId, ElementRole, GalleryDescriptor, GalleryItem,
    GalleryRegistry, PageId, PagePhase, TapeSpec, VisitState, VisualStage,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Two managed pages against an 800x600 viewport. Everything on "alpha" sits
/// above the fold except the call to action; "beta" carries only a title,
/// placed well below the fold.
struct Fixture {
    stage: MemoryStage,
    coordinator: LifecycleCoordinator,
    clock: u64,
    title: ElementId,
    subtitle: ElementId,
    tape: ElementId,
    scroll_hint: ElementId,
    cta: ElementId,
    gallery: ElementId,
    background: ElementId,
    beta_title: ElementId,
}

fn gallery_descriptor() -> GalleryDescriptor {
    let second_tape = TapeSpec {
        offset_x: 30.0,
        ..TapeSpec::default()
    };
    GalleryDescriptor::new(vec![
        GalleryItem::new("prints/dawn.jpg").with_tape(TapeSpec::default()),
        GalleryItem::new("prints/dusk.jpg")
            .with_tape(TapeSpec::default())
            .with_tape(second_tape),
    ])
}

impl Fixture {
    fn new(reduced_motion: bool) -> Self {
        let mut stage = MemoryStage::new(800.0, 600.0);
        let alpha = PageId::from("alpha");
        let beta = PageId::from("beta");

        let background = stage.add_element(
            alpha.clone(),
            ElementRole::Background,
            Bounds::new(0.0, 0.0, 800.0, 2400.0),
        );
        let title = stage.add_element(
            alpha.clone(),
            ElementRole::Title,
            Bounds::new(40.0, 80.0, 400.0, 120.0),
        );
        let subtitle = stage.add_element(
            alpha.clone(),
            ElementRole::Subtitle,
            Bounds::new(40.0, 220.0, 360.0, 40.0),
        );
        let tape = stage.add_element(
            alpha.clone(),
            ElementRole::Tape,
            Bounds::new(500.0, 60.0, 120.0, 36.0),
        );
        let scroll_hint = stage.add_element(
            alpha.clone(),
            ElementRole::ScrollHint,
            Bounds::new(370.0, 480.0, 60.0, 40.0),
        );
        let cta = stage.add_element(
            alpha.clone(),
            ElementRole::Cta,
            Bounds::new(40.0, 1500.0, 200.0, 60.0),
        );
        let gallery = stage.add_element(
            alpha.clone(),
            ElementRole::Gallery,
            Bounds::new(40.0, 600.0, 720.0, 500.0),
        );
        stage.set_gallery_item_count(gallery, 2);

        let beta_title = stage.add_element(
            beta,
            ElementRole::Title,
            Bounds::new(40.0, 2000.0, 400.0, 120.0),
        );

        // The authored baseline a stylesheet would give each element
        for (element, role) in [
            (background, ElementRole::Background),
            (title, ElementRole::Title),
            (subtitle, ElementRole::Subtitle),
            (tape, ElementRole::Tape),
            (scroll_hint, ElementRole::ScrollHint),
            (cta, ElementRole::Cta),
            (beta_title, ElementRole::Title),
        ] {
            for op in baseline_ops(role) {
                stage.apply(element, *op).expect("baseline applies");
            }
        }

        let config = CoordinatorConfig::new()
            .with_pages(["alpha", "beta"])
            .with_reduced_motion(reduced_motion);
        let galleries = GalleryRegistry::new().with(alpha, gallery_descriptor());
        let coordinator =
            LifecycleCoordinator::new(config, Box::new(stage.clone()), galleries);

        Self {
            stage,
            coordinator,
            clock: 0,
            title,
            subtitle,
            tape,
            scroll_hint,
            cta,
            gallery,
            background,
            beta_title,
        }
    }

    /// Run a tick at the current clock, draining anything already due
    fn pump(&mut self) {
        self.coordinator.tick(self.clock);
    }

    /// Step the clock to `t` in 50 ms ticks
    fn pump_to(&mut self, t: u64) {
        while self.clock < t {
            self.clock += 50;
            self.coordinator.tick(self.clock);
        }
    }

    fn advance(&mut self, ms: u64) {
        self.pump_to(self.clock + ms);
    }

    fn props(&self, element: ElementId) -> VisualProps {
        self.stage.props(element).expect("element exists")
    }
}

/// An "alpha" visit pumped through its whole entrance, clock at 2400 ms
fn settled_alpha() -> Fixture {
    let mut fx = Fixture::new(false);
    fx.coordinator.page_entered("alpha");
    fx.pump();
    fx.pump_to(2400);
    assert!(fx.coordinator.visit_state("alpha").has_animated);
    fx
}

// ============================================================================
// Entrance sequence
// ============================================================================

#[test]
fn test_entrance_sequence_timing() {
    let mut fx = Fixture::new(false);
    fx.coordinator.page_entered("alpha");
    fx.pump();

    // Page-enter settle: nothing moves before 200 ms
    fx.pump_to(150);
    assert_eq!(fx.coordinator.phase("alpha"), PagePhase::Idle);
    assert_eq!(fx.props(fx.subtitle).opacity, 0.0);

    // Title reveals first, stroke draw starts at width 0
    fx.pump_to(200);
    assert_eq!(fx.coordinator.phase("alpha"), PagePhase::Animating);
    assert_eq!(fx.props(fx.title).stroke_progress, 1.0);
    assert_eq!(fx.props(fx.title).stroke_width, 0.0);
    assert_eq!(fx.props(fx.subtitle).opacity, 0.0);

    // Keyframes every 100 ms
    fx.pump_to(400);
    assert_eq!(fx.props(fx.title).stroke_width, 45.0);
    fx.pump_to(600);
    assert_eq!(fx.props(fx.title).stroke_width, TITLE_FINAL_WIDTH);

    // Subtitle lands exactly at its offset
    fx.pump_to(1150);
    assert_eq!(fx.props(fx.subtitle).opacity, 0.0);
    fx.pump_to(1200);
    let subtitle = fx.props(fx.subtitle);
    assert_eq!(subtitle.opacity, 1.0);
    assert_eq!(subtitle.translate_y, 0.0);
    assert_eq!(subtitle.scale, 1.0);

    // Tape reveals with overshoot; its resting transforms are untouched
    fx.pump_to(1600);
    let tape = fx.props(fx.tape);
    assert_eq!(tape.opacity, 1.0);
    assert_eq!(tape.scale, TAPE_OVERSHOOT_SCALE);
    assert_eq!(tape.translate_x_pct, -50.0);
    assert_eq!(tape.rotation_deg, -8.0);
    fx.pump_to(1800);
    assert_eq!(fx.props(fx.tape).scale, 1.0);
    assert_eq!(fx.props(fx.tape).rotation_deg, -8.0);

    // Scroll hint closes the sequence and commits the visit record
    fx.pump_to(2350);
    assert_eq!(fx.props(fx.scroll_hint).opacity, 0.0);
    assert!(!fx.coordinator.visit_state("alpha").has_animated);
    fx.pump_to(2400);
    assert_eq!(fx.props(fx.scroll_hint).opacity, 1.0);
    let state = fx.coordinator.visit_state("alpha");
    assert!(state.has_animated);
    assert!(state.reveal.all_revealed());
    assert_eq!(fx.coordinator.phase("alpha"), PagePhase::Settled);
}

#[test]
fn test_jitter_keeps_running_after_settle() {
    let mut fx = settled_alpha();

    // Only the repeating jitter survives completion
    assert_eq!(fx.coordinator.live_timer_count_for("alpha"), 1);

    fx.pump_to(2900);
    assert!(JITTER_WIDTHS.contains(&fx.props(fx.title).stroke_width));
    fx.pump_to(3900);
    assert!(JITTER_WIDTHS.contains(&fx.props(fx.title).stroke_width));
    assert_eq!(fx.props(fx.title).stroke_progress, 1.0);
}

#[test]
fn test_entrance_waits_for_trigger_to_scroll_into_view() {
    let mut fx = Fixture::new(false);
    fx.coordinator.page_entered("beta");
    fx.pump();

    // Below the fold: the settle evaluation finds nothing to do
    fx.pump_to(400);
    assert_eq!(fx.coordinator.phase("beta"), PagePhase::Idle);
    assert_eq!(fx.props(fx.beta_title).stroke_progress, 0.0);

    fx.stage.scroll_to(1700.0);
    fx.coordinator.viewport_changed();
    assert_eq!(fx.coordinator.phase("beta"), PagePhase::Animating);

    // Missing roles are skipped; the sequence still completes on schedule
    fx.advance(2400);
    assert!(fx.coordinator.visit_state("beta").has_animated);
    assert_eq!(fx.coordinator.phase("beta"), PagePhase::Settled);
}

#[test]
fn test_completion_does_not_reveal_cta_visually() {
    let fx = settled_alpha();

    // The flag drives the call to action; the coordinator never paints it
    assert!(fx.coordinator.visit_state("alpha").reveal.is_revealed(ElementRole::Cta));
    assert_eq!(fx.props(fx.cta).opacity, 0.0);
}

// ============================================================================
// Stale return and reset
// ============================================================================

#[test]
fn test_stale_return_resets_and_replays() {
    let mut fx = settled_alpha();
    fx.coordinator.page_leaving("alpha");
    fx.pump();
    assert_eq!(fx.coordinator.live_timer_count_for("alpha"), 0);

    fx.advance(100);
    fx.coordinator.page_entered("alpha");
    fx.pump();
    let entered_at = fx.clock;

    // Settle delay elapses, the view looks stale, reset runs
    fx.pump_to(entered_at + 200);
    assert!(fx.coordinator.is_reset_active());
    assert_eq!(fx.props(fx.subtitle).opacity, 0.0);
    assert_eq!(fx.props(fx.title).stroke_progress, 0.0);
    assert_eq!(fx.props(fx.title).stroke_width, 0.0);
    assert_eq!(fx.props(fx.scroll_hint).opacity, 0.0);
    assert_eq!(fx.stage.gallery_index(fx.gallery), Some(0));
    let state = fx.coordinator.visit_state("alpha");
    assert!(state.is_default());
    assert_eq!(fx.coordinator.phase("alpha"), PagePhase::Idle);
    assert_eq!(fx.coordinator.live_timer_count_for("alpha"), 0);

    // The recheck lifts the token and replays without a fresh scroll event
    fx.pump_to(entered_at + 300);
    assert!(!fx.coordinator.is_reset_active());
    assert_eq!(fx.coordinator.phase("alpha"), PagePhase::Animating);

    fx.pump_to(entered_at + 300 + 2200);
    assert!(fx.coordinator.visit_state("alpha").has_animated);
    assert_eq!(fx.coordinator.phase("alpha"), PagePhase::Settled);
}

#[test]
fn test_resume_with_trigger_offscreen_leaves_view_alone() {
    let mut fx = Fixture::new(false);
    fx.coordinator.page_entered("beta");
    fx.pump();
    fx.pump_to(200);
    fx.stage.scroll_to(1700.0);
    fx.coordinator.viewport_changed();
    fx.advance(2400);
    assert!(fx.coordinator.visit_state("beta").has_animated);

    // Scroll back up before hiding the document
    fx.stage.scroll_to(0.0);
    fx.coordinator.document_hidden();
    fx.advance(500);
    fx.coordinator.document_visible();
    fx.pump();

    // Visibility settle passes with the trigger off screen: no reset
    fx.advance(300);
    assert!(!fx.coordinator.is_reset_active());
    assert!(fx.coordinator.visit_state("beta").has_animated);
    assert_eq!(fx.coordinator.phase("beta"), PagePhase::Settled);
    assert_eq!(fx.props(fx.beta_title).stroke_progress, 1.0);
}

#[test]
fn test_second_reset_in_settle_window_is_dropped() {
    let mut fx = settled_alpha();

    fx.coordinator.force_reset("alpha");
    assert!(fx.coordinator.is_reset_active());
    assert!(fx.coordinator.visit_state("alpha").is_default());
    assert_eq!(fx.coordinator.live_timer_count_for("alpha"), 0);

    // A second reset while the token is held changes nothing
    fx.coordinator.force_reset("alpha");
    assert!(fx.coordinator.is_reset_active());
    assert!(fx.coordinator.visit_state("alpha").is_default());
    assert_eq!(fx.coordinator.live_timer_count_for("alpha"), 0);

    // One recheck, one replay
    fx.advance(100);
    assert!(!fx.coordinator.is_reset_active());
    assert_eq!(fx.coordinator.phase("alpha"), PagePhase::Animating);
}

#[test]
fn test_reset_recheck_skips_replay_when_trigger_left_view() {
    let mut fx = settled_alpha();
    fx.stage.scroll_to(1200.0);

    fx.coordinator.force_reset("alpha");
    fx.advance(200);
    assert!(!fx.coordinator.is_reset_active());
    assert_eq!(fx.coordinator.phase("alpha"), PagePhase::Idle);
    assert_eq!(fx.props(fx.subtitle).opacity, 0.0);

    // Scrolling the trigger back in re-fires the rearmed watcher
    fx.stage.scroll_to(0.0);
    fx.coordinator.viewport_changed();
    assert_eq!(fx.coordinator.phase("alpha"), PagePhase::Animating);
}

#[test]
fn test_reset_restores_baseline_and_tape_layers() {
    let mut fx = settled_alpha();
    fx.coordinator.advance_gallery("alpha");
    assert_eq!(fx.coordinator.visit_state("alpha").gallery_index, 1);

    fx.coordinator.force_reset("alpha");

    assert_eq!(fx.stage.gallery_index(fx.gallery), Some(0));
    assert_eq!(fx.stage.tapes(fx.gallery).len(), 1);
    assert_eq!(fx.props(fx.title).stroke_progress, 0.0);
    assert_eq!(fx.props(fx.subtitle).opacity, 0.0);
    assert_eq!(fx.props(fx.subtitle).translate_y, 20.0);
    assert_eq!(fx.props(fx.tape).opacity, 0.0);
    assert_eq!(fx.props(fx.cta).opacity, 0.0);
    assert_eq!(fx.props(fx.background), VisualProps::default());
    assert!(fx.coordinator.visit_state("alpha").is_default());
}

#[test]
fn test_reset_releases_token_even_when_gallery_restore_fails() {
    let mut fx = settled_alpha();
    // Stage-side item count disagrees with the descriptor, so the gallery
    // restore errors out mid-reset
    fx.stage.set_gallery_item_count(fx.gallery, 0);

    fx.coordinator.force_reset("alpha");
    assert!(fx.coordinator.is_reset_active());

    fx.advance(100);
    assert!(!fx.coordinator.is_reset_active());
    assert_eq!(fx.coordinator.phase("alpha"), PagePhase::Animating);
}

// ============================================================================
// Leaving a page
// ============================================================================

#[test]
fn test_leave_mid_sequence_saves_scroll_and_cancels_timers() {
    let mut fx = Fixture::new(false);
    fx.coordinator.page_entered("alpha");
    fx.pump();
    fx.pump_to(1300);
    assert!(fx.coordinator.live_timer_count_for("alpha") > 0);

    fx.stage.scroll_to(120.0);
    fx.coordinator.page_leaving("alpha");
    fx.pump();

    let state = fx.coordinator.visit_state("alpha");
    assert_eq!(state.scroll_offset, 120.0);
    assert!(!state.has_animated);
    assert_eq!(fx.coordinator.live_timer_count_for("alpha"), 0);

    // Visuals freeze where the sequence left them
    assert_eq!(fx.props(fx.subtitle).opacity, 1.0);
    assert_eq!(fx.props(fx.tape).opacity, 0.0);
    fx.advance(2000);
    assert_eq!(fx.props(fx.tape).opacity, 0.0);
}

// ============================================================================
// Gallery
// ============================================================================

#[test]
fn test_gallery_advance_refused_before_entrance() {
    let mut fx = Fixture::new(false);
    fx.coordinator.page_entered("alpha");
    fx.pump();

    fx.coordinator.advance_gallery("alpha");
    assert_eq!(fx.coordinator.visit_state("alpha").gallery_index, 0);
    assert_eq!(fx.stage.gallery_index(fx.gallery), Some(0));
}

#[test]
fn test_gallery_advance_wraps_and_rebuilds_tapes() {
    let mut fx = settled_alpha();

    fx.coordinator.advance_gallery("alpha");
    assert_eq!(fx.coordinator.visit_state("alpha").gallery_index, 1);
    assert_eq!(fx.stage.gallery_index(fx.gallery), Some(1));
    assert_eq!(fx.stage.tapes(fx.gallery).len(), 2);

    fx.coordinator.advance_gallery("alpha");
    assert_eq!(fx.coordinator.visit_state("alpha").gallery_index, 0);
    assert_eq!(fx.stage.tapes(fx.gallery).len(), 1);
}

// ============================================================================
// Reduced motion
// ============================================================================

#[test]
fn test_reduced_motion_settles_in_one_tick() {
    let mut fx = Fixture::new(true);
    fx.coordinator.page_entered("alpha");
    fx.pump();
    fx.pump_to(200);

    let state = fx.coordinator.visit_state("alpha");
    assert!(state.has_animated);
    assert!(state.reveal.all_revealed());
    assert_eq!(fx.coordinator.phase("alpha"), PagePhase::Settled);

    assert_eq!(fx.props(fx.title).stroke_progress, 1.0);
    assert_eq!(fx.props(fx.title).stroke_width, TITLE_FINAL_WIDTH);
    assert_eq!(fx.props(fx.subtitle).opacity, 1.0);
    assert_eq!(fx.props(fx.tape).opacity, 1.0);
    assert_eq!(fx.props(fx.tape).scale, 1.0);
    assert_eq!(fx.props(fx.scroll_hint).opacity, 1.0);

    // No timers at all: no stroke keyframes, no jitter
    assert_eq!(fx.coordinator.live_timer_count(), 0);
    fx.pump_to(5000);
    assert_eq!(fx.props(fx.title).stroke_width, TITLE_FINAL_WIDTH);
    assert_eq!(fx.coordinator.live_timer_count(), 0);
}

// ============================================================================
// Unmanaged pages, intro gate, handles
// ============================================================================

#[test]
fn test_unmanaged_page_is_ignored() {
    let mut fx = Fixture::new(false);
    fx.coordinator.page_entered("gamma");
    fx.pump();
    fx.pump_to(500);
    assert_eq!(fx.coordinator.live_timer_count(), 0);

    fx.coordinator.force_reset("gamma");
    assert!(!fx.coordinator.is_reset_active());
    fx.coordinator.advance_gallery("gamma");
    fx.coordinator.page_leaving("gamma");
}

#[test]
fn test_intro_completion_fires_once() {
    let fx = Fixture::new(false);
    let fired = Arc::new(AtomicUsize::new(0));
    let sink = fired.clone();
    fx.coordinator.on_intro_complete(move || {
        sink.fetch_add(1, Ordering::SeqCst);
    });

    fx.coordinator.intro_finished();
    fx.coordinator.intro_finished();
    assert_eq!(fired.load(Ordering::SeqCst), 1);
}

#[test]
fn test_subscription_sees_completion_write() {
    let mut fx = Fixture::new(false);
    let seen: Arc<Mutex<Vec<VisitState>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let subscription = fx.coordinator.subscribe("alpha", move |state: &VisitState| {
        sink.lock().unwrap().push(state.clone());
    });

    fx.coordinator.page_entered("alpha");
    fx.pump();
    fx.pump_to(2400);

    let states = seen.lock().unwrap();
    let last = states.last().expect("completion notifies subscribers");
    assert!(last.has_animated);
    assert!(last.reveal.all_revealed());
    drop(states);

    fx.coordinator.unsubscribe(subscription);
}

#[test]
fn test_handle_goes_quiet_after_coordinator_drops() {
    let fx = Fixture::new(false);
    let handle = fx.coordinator.handle();
    assert!(handle.is_alive());
    handle.page_entered("alpha");
    handle.tick(0);
    assert_eq!(handle.phase("alpha"), Some(PagePhase::Idle));

    drop(fx);
    assert!(!handle.is_alive());
    handle.page_entered("alpha");
    handle.tick(100);
    handle.viewport_changed();
    assert_eq!(handle.visit_state("alpha"), None);
    assert_eq!(handle.phase("alpha"), None);
}

#[test]
fn test_global_slot_serves_installed_handle() {
    let fx = Fixture::new(false);
    assert!(!is_global_installed());
    install_global(fx.coordinator.handle());
    assert!(is_global_installed());
    let handle = try_global().expect("handle was installed");
    assert!(handle.is_alive());
}
