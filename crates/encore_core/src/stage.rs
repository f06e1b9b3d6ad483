//! Stage boundary
//!
//! The coordinator never owns rendering. Everything it does to the visual
//! tree goes through [`VisualStage`], a narrow trait a host backend
//! implements. The production backend wires into the real scene graph; tests
//! and the scenario runner use an in-memory stage.
//!
//! Elements are addressed by [`ElementId`], an opaque generational key. A
//! stale id resolved before a page rebuild simply fails to apply, which is
//! why the engine re-resolves its [`ElementBundle`] on every page entry.

use crate::error::StageResult;
use crate::gallery::TapeSpec;
use crate::geometry::Bounds;
use crate::page::{ElementRole, PageId};
use slotmap::new_key_type;

new_key_type! {
    /// Opaque handle to one stage element
    pub struct ElementId;
}

// ============================================================================
// Color
// ============================================================================

/// RGBA color, components in [0, 1]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const TRANSPARENT: Color = Color::rgba(0.0, 0.0, 0.0, 0.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }
}

// ============================================================================
// Visual operations
// ============================================================================

/// One mutation of a stage element.
///
/// These are the only writes the coordinator performs. Values are absolute
/// targets, not deltas; applying the same op twice is harmless.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum VisualOp {
    /// Opacity in [0, 1]
    Opacity(f32),
    /// Vertical offset in pixels, positive is down
    TranslateY(f32),
    /// Horizontal offset as a percentage of the element's own width
    TranslateXPercent(f32),
    Scale(f32),
    /// Rotation in degrees, positive is clockwise
    RotateDeg(f32),
    /// Stroke draw-on progress in [0, 1]
    StrokeProgress(f32),
    /// Stroke width in pixels
    StrokeWidth(f32),
    Background(Color),
}

// ============================================================================
// VisualStage
// ============================================================================

/// Host-side rendering boundary.
///
/// Implementations must tolerate stale [`ElementId`]s: an id minted before a
/// page rebuild should make [`apply`](VisualStage::apply) return an error
/// rather than touch an unrelated element.
pub trait VisualStage: Send {
    /// Look up the current element for a role on a page
    fn resolve(&self, page: &PageId, role: ElementRole) -> Option<ElementId>;

    /// Apply one visual mutation
    fn apply(&mut self, element: ElementId, op: VisualOp) -> StageResult<()>;

    /// Bounds of an element in document coordinates
    fn element_bounds(&self, element: ElementId) -> Option<Bounds>;

    /// Currently visible region in document coordinates
    fn viewport(&self) -> Bounds;

    /// Current vertical scroll offset in pixels
    fn scroll_offset(&self) -> f32;

    /// Make a gallery show the item at `index`
    fn show_gallery_item(&mut self, element: ElementId, index: usize) -> StageResult<()>;

    /// Replace the tape overlays attached to a gallery element
    fn rebuild_tape_layers(&mut self, element: ElementId, tapes: &[TapeSpec]) -> StageResult<()>;
}

// ============================================================================
// ElementBundle
// ============================================================================

/// Resolved element ids for one page, refreshed on each entry.
///
/// Any slot may be `None`; pages are not required to carry every role and
/// the engine skips missing ones.
#[derive(Clone, Copy, Debug, Default)]
pub struct ElementBundle {
    pub title: Option<ElementId>,
    pub subtitle: Option<ElementId>,
    pub tape: Option<ElementId>,
    pub scroll_hint: Option<ElementId>,
    pub cta: Option<ElementId>,
    pub gallery: Option<ElementId>,
    pub background: Option<ElementId>,
}

impl ElementBundle {
    /// Resolve every role for `page` against the stage
    pub fn resolve(stage: &dyn VisualStage, page: &PageId) -> Self {
        Self {
            title: stage.resolve(page, ElementRole::Title),
            subtitle: stage.resolve(page, ElementRole::Subtitle),
            tape: stage.resolve(page, ElementRole::Tape),
            scroll_hint: stage.resolve(page, ElementRole::ScrollHint),
            cta: stage.resolve(page, ElementRole::Cta),
            gallery: stage.resolve(page, ElementRole::Gallery),
            background: stage.resolve(page, ElementRole::Background),
        }
    }

    pub fn get(&self, role: ElementRole) -> Option<ElementId> {
        match role {
            ElementRole::Title => self.title,
            ElementRole::Subtitle => self.subtitle,
            ElementRole::Tape => self.tape,
            ElementRole::ScrollHint => self.scroll_hint,
            ElementRole::Cta => self.cta,
            ElementRole::Gallery => self.gallery,
            ElementRole::Background => self.background,
        }
    }

    /// True when no role resolved at all
    pub fn is_empty(&self) -> bool {
        ElementRole::ALL.iter().all(|role| self.get(*role).is_none())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_constants() {
        assert_eq!(Color::WHITE, Color::rgba(1.0, 1.0, 1.0, 1.0));
        assert_eq!(Color::TRANSPARENT.a, 0.0);
    }

    #[test]
    fn test_empty_bundle() {
        let bundle = ElementBundle::default();
        assert!(bundle.is_empty());
        assert!(bundle.get(ElementRole::Title).is_none());
    }
}
