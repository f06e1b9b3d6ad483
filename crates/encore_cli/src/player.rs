//! Scenario player
//!
//! Builds a coordinator and an in-memory stage from a parsed scenario, then
//! walks the virtual clock, firing scripted events at their timestamps and
//! ticking the coordinator in between.

use crate::config::{EventAction, Scenario, ScenarioEvent};
use anyhow::Result;
use encore_animation::baseline_ops;
use encore_core::{
    CoordinatorConfig, ElementRole, GalleryDescriptor, GalleryRegistry, PageId, RevealFlags,
    VisualStage,
};
use encore_runtime::{LifecycleCoordinator, MemoryStage};
use serde::Serialize;
use tracing::debug;

// ============================================================================
// Summary
// ============================================================================

/// Final coordinator state after a playback
#[derive(Debug, Serialize)]
pub struct PlaybackSummary {
    pub scenario: String,
    pub played_ms: u64,
    pub live_timers: usize,
    pub pages: Vec<PageSummary>,
}

#[derive(Debug, Serialize)]
pub struct PageSummary {
    pub page: String,
    pub phase: String,
    pub has_animated: bool,
    pub revealed: Vec<String>,
    pub gallery_index: usize,
    pub scroll_offset: f32,
}

// ============================================================================
// Playback
// ============================================================================

pub fn play(scenario: &Scenario) -> Result<PlaybackSummary> {
    let meta = &scenario.scenario;
    let mut stage = MemoryStage::new(meta.viewport_width, meta.viewport_height);
    let mut galleries = GalleryRegistry::new();
    let mut page_ids = Vec::new();

    for page in &scenario.pages {
        let id = PageId::from(page.id.as_str());
        for element in &page.elements {
            let role = element.role()?;
            let handle = stage.add_element(id.clone(), role, element.bounds());
            if role == ElementRole::Gallery && !page.gallery.is_empty() {
                stage.set_gallery_item_count(handle, page.gallery.len());
            }
            // The baseline a stylesheet would author
            for op in baseline_ops(role) {
                stage
                    .apply(handle, *op)
                    .map_err(|err| anyhow::anyhow!("baseline for {}/{}: {}", id, role, err))?;
            }
        }
        if !page.gallery.is_empty() {
            let items = page.gallery.iter().map(|item| item.to_item()).collect();
            galleries.register(id.clone(), GalleryDescriptor::new(items));
        }
        page_ids.push(id);
    }

    let config = CoordinatorConfig::new()
        .with_pages(scenario.pages.iter().map(|page| page.id.as_str()))
        .with_reduced_motion(meta.reduced_motion);
    let coordinator = LifecycleCoordinator::new(config, Box::new(stage.clone()), galleries);
    coordinator.on_intro_complete(|| debug!("intro sequence complete"));

    // Stable sort keeps script order for events sharing a timestamp
    let mut script: Vec<&ScenarioEvent> = scenario.events.iter().collect();
    script.sort_by_key(|event| event.at);

    let tick = meta.tick_ms.max(1);
    let last_event = script.last().map(|event| event.at).unwrap_or(0);
    let duration = meta.duration_ms.max(last_event);

    let mut next = 0;
    let mut now = 0u64;
    loop {
        while next < script.len() && script[next].at <= now {
            debug!("[{:>6} ms] {:?}", now, script[next].action);
            fire(&coordinator, &mut stage, &script[next].action);
            next += 1;
        }
        coordinator.tick(now);
        if now >= duration {
            break;
        }
        now = (now + tick).min(duration);
    }

    Ok(summarize(scenario, &coordinator, duration, &page_ids))
}

fn fire(coordinator: &LifecycleCoordinator, stage: &mut MemoryStage, action: &EventAction) {
    match action {
        EventAction::Enter { page } => coordinator.page_entered(page.as_str()),
        EventAction::Leave { page } => coordinator.page_leaving(page.as_str()),
        EventAction::Scroll { y } => {
            stage.scroll_to(*y);
            coordinator.viewport_changed();
        }
        EventAction::Hide => coordinator.document_hidden(),
        EventAction::Show => coordinator.document_visible(),
        EventAction::HistoryRestore { page } => coordinator.history_restored(page.as_str()),
        EventAction::IntroDone => coordinator.intro_finished(),
        EventAction::GalleryNext { page } => coordinator.advance_gallery(page.as_str()),
        EventAction::ForceReset { page } => coordinator.force_reset(page.as_str()),
    }
}

fn summarize(
    scenario: &Scenario,
    coordinator: &LifecycleCoordinator,
    played_ms: u64,
    pages: &[PageId],
) -> PlaybackSummary {
    let pages = pages
        .iter()
        .map(|id| {
            let state = coordinator.visit_state(id.clone());
            let revealed = RevealFlags::TRACKED
                .iter()
                .filter(|role| state.reveal.is_revealed(**role))
                .map(|role| role.as_str().to_string())
                .collect();
            PageSummary {
                page: id.to_string(),
                phase: coordinator.phase(id.clone()).to_string(),
                has_animated: state.has_animated,
                revealed,
                gallery_index: state.gallery_index,
                scroll_offset: state.scroll_offset,
            }
        })
        .collect();

    PlaybackSummary {
        scenario: scenario.scenario.name.clone(),
        played_ms,
        live_timers: coordinator.live_timer_count(),
        pages,
    }
}

/// Human-readable report for a finished playback
pub fn print_summary(summary: &PlaybackSummary) {
    println!("Scenario: {}", summary.scenario);
    println!("Played:   {} ms", summary.played_ms);
    println!("Timers:   {} live", summary.live_timers);
    for page in &summary.pages {
        println!();
        println!("[{}]", page.page);
        println!("  phase:         {}", page.phase);
        println!("  has_animated:  {}", page.has_animated);
        let revealed = if page.revealed.is_empty() {
            "none".to_string()
        } else {
            page.revealed.join(", ")
        };
        println!("  revealed:      {}", revealed);
        println!("  gallery_index: {}", page.gallery_index);
        println!("  scroll_offset: {}", page.scroll_offset);
    }
}
