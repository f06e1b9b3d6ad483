//! Observation trigger
//!
//! Watches each page's trigger element for viewport intersection and emits a
//! fire-once `Entered` notification when the visible ratio reaches the
//! threshold. The viewport's bottom edge is inset by a fraction of its height
//! so the trigger fires only once the element is meaningfully in frame, not
//! when its first pixel peeks over the fold.
//!
//! Evaluation is pull-based: the engine calls [`sweep`](ObservationTrigger::sweep)
//! whenever the host reports a viewport change, matching the single-threaded
//! control model.

use encore_core::{intersection_ratio, ElementId, PageId, VisualStage};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

/// Minimum visible ratio before a binding fires
pub const DEFAULT_THRESHOLD: f32 = 0.2;

/// Fraction of the viewport height shaved off its bottom edge
pub const BOTTOM_INSET_FRACTION: f32 = 0.1;

struct ObserverBinding {
    element: ElementId,
    /// Latched after the first fire; cleared only by rearming
    fired: bool,
}

/// Re-armable fire-once viewport intersection detection, one binding per page
pub struct ObservationTrigger {
    bindings: FxHashMap<PageId, ObserverBinding>,
    threshold: f32,
    bottom_inset: f32,
}

impl Default for ObservationTrigger {
    fn default() -> Self {
        Self::new()
    }
}

impl ObservationTrigger {
    pub fn new() -> Self {
        Self {
            bindings: FxHashMap::default(),
            threshold: DEFAULT_THRESHOLD,
            bottom_inset: BOTTOM_INSET_FRACTION,
        }
    }

    /// Begin watching `element` for `page`.
    ///
    /// Arming an existing binding for the same element is a no-op (the fired
    /// latch survives); arming with a different element rebinds fresh.
    pub fn arm(&mut self, page: &PageId, element: ElementId) {
        match self.bindings.get_mut(page) {
            Some(binding) if binding.element == element => {}
            _ => {
                self.bindings.insert(
                    page.clone(),
                    ObserverBinding {
                        element,
                        fired: false,
                    },
                );
                tracing::debug!("observer armed for page {}", page);
            }
        }
    }

    /// Stop watching without emitting
    pub fn disarm(&mut self, page: &PageId) -> bool {
        self.bindings.remove(page).is_some()
    }

    /// Disarm then arm. Required after every reset so an element already in
    /// view can trigger again.
    pub fn rearm(&mut self, page: &PageId, element: ElementId) {
        self.disarm(page);
        self.arm(page, element);
    }

    pub fn is_armed(&self, page: &PageId) -> bool {
        self.bindings.contains_key(page)
    }

    pub fn has_fired(&self, page: &PageId) -> bool {
        self.bindings
            .get(page)
            .map(|binding| binding.fired)
            .unwrap_or(false)
    }

    /// The biased in-view predicate, shared with the engine's staleness and
    /// reset-recheck paths.
    pub fn element_in_view(&self, stage: &dyn VisualStage, element: ElementId) -> bool {
        in_view(stage, element, self.threshold, self.bottom_inset)
    }

    /// Evaluate every armed binding against the current viewport, returning
    /// the pages whose trigger just entered view. Each binding fires at most
    /// once until re-armed.
    pub fn sweep(&mut self, stage: &dyn VisualStage) -> SmallVec<[PageId; 2]> {
        let mut entered = SmallVec::new();
        for (page, binding) in self.bindings.iter_mut() {
            if binding.fired {
                continue;
            }
            if in_view(stage, binding.element, self.threshold, self.bottom_inset) {
                binding.fired = true;
                tracing::debug!("trigger entered view for page {}", page);
                entered.push(page.clone());
            }
        }
        entered
    }
}

fn in_view(stage: &dyn VisualStage, element: ElementId, threshold: f32, bottom_inset: f32) -> bool {
    let Some(bounds) = stage.element_bounds(element) else {
        return false;
    };
    let viewport = stage.viewport().with_bottom_inset(bottom_inset);
    intersection_ratio(&bounds, &viewport) >= threshold
}
