//! In-memory reference stage
//!
//! [`MemoryStage`] implements [`VisualStage`] over plain records instead of a
//! real scene graph. It backs the test suite and the scenario runner: tests
//! keep a clone of the handle to script scrolling and inspect visual props
//! while the coordinator owns the boxed trait object.
//!
//! All bounds are in document coordinates; the viewport is a window of
//! `viewport_height` starting at the current scroll offset.

use encore_core::{
    Bounds, Color, ElementId, ElementRole, PageId, StageError, StageResult, TapeSpec, VisualOp,
    VisualStage,
};
use rustc_hash::FxHashMap;
use slotmap::SlotMap;
use std::sync::{Arc, Mutex};

/// Inline presentation values of one element
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VisualProps {
    pub opacity: f32,
    pub translate_y: f32,
    pub translate_x_pct: f32,
    pub scale: f32,
    pub rotation_deg: f32,
    pub stroke_progress: f32,
    pub stroke_width: f32,
    pub background: Color,
}

impl Default for VisualProps {
    fn default() -> Self {
        // As-authored values before any baseline or reveal write
        Self {
            opacity: 1.0,
            translate_y: 0.0,
            translate_x_pct: 0.0,
            scale: 1.0,
            rotation_deg: 0.0,
            stroke_progress: 0.0,
            stroke_width: 0.0,
            background: Color::WHITE,
        }
    }
}

struct ElementRecord {
    page: PageId,
    role: ElementRole,
    bounds: Bounds,
    props: VisualProps,
    gallery_index: usize,
    gallery_item_count: Option<usize>,
    tapes: Vec<TapeSpec>,
}

struct MemoryStageInner {
    elements: SlotMap<ElementId, ElementRecord>,
    by_role: FxHashMap<(PageId, ElementRole), ElementId>,
    viewport_width: f32,
    viewport_height: f32,
    scroll_y: f32,
}

/// Cloneable handle to a shared in-memory stage
#[derive(Clone)]
pub struct MemoryStage {
    inner: Arc<Mutex<MemoryStageInner>>,
}

impl MemoryStage {
    pub fn new(viewport_width: f32, viewport_height: f32) -> Self {
        Self {
            inner: Arc::new(Mutex::new(MemoryStageInner {
                elements: SlotMap::with_key(),
                by_role: FxHashMap::default(),
                viewport_width,
                viewport_height,
                scroll_y: 0.0,
            })),
        }
    }

    // ========================================================================
    // Host-side construction
    // ========================================================================

    /// Add an element at fixed document bounds. A second element for the same
    /// `(page, role)` takes over the role mapping.
    pub fn add_element(&mut self, page: PageId, role: ElementRole, bounds: Bounds) -> ElementId {
        let mut inner = self.inner.lock().unwrap();
        let element = inner.elements.insert(ElementRecord {
            page: page.clone(),
            role,
            bounds,
            props: VisualProps::default(),
            gallery_index: 0,
            gallery_item_count: None,
            tapes: Vec::new(),
        });
        inner.by_role.insert((page, role), element);
        element
    }

    pub fn remove_element(&mut self, element: ElementId) -> bool {
        let mut inner = self.inner.lock().unwrap();
        match inner.elements.remove(element) {
            Some(record) => {
                inner.by_role.remove(&(record.page, record.role));
                true
            }
            None => false,
        }
    }

    pub fn set_bounds(&mut self, element: ElementId, bounds: Bounds) {
        let mut inner = self.inner.lock().unwrap();
        if let Some(record) = inner.elements.get_mut(element) {
            record.bounds = bounds;
        }
    }

    /// Declare how many items the element's gallery actually has, enabling
    /// range checks on [`show_gallery_item`](VisualStage::show_gallery_item)
    pub fn set_gallery_item_count(&mut self, element: ElementId, count: usize) {
        let mut inner = self.inner.lock().unwrap();
        if let Some(record) = inner.elements.get_mut(element) {
            record.gallery_item_count = Some(count);
        }
    }

    pub fn set_viewport(&mut self, width: f32, height: f32) {
        let mut inner = self.inner.lock().unwrap();
        inner.viewport_width = width;
        inner.viewport_height = height;
    }

    pub fn scroll_to(&mut self, y: f32) {
        self.inner.lock().unwrap().scroll_y = y;
    }

    // ========================================================================
    // Inspection
    // ========================================================================

    pub fn props(&self, element: ElementId) -> Option<VisualProps> {
        let inner = self.inner.lock().unwrap();
        inner.elements.get(element).map(|record| record.props)
    }

    pub fn bounds(&self, element: ElementId) -> Option<Bounds> {
        let inner = self.inner.lock().unwrap();
        inner.elements.get(element).map(|record| record.bounds)
    }

    pub fn gallery_index(&self, element: ElementId) -> Option<usize> {
        let inner = self.inner.lock().unwrap();
        inner
            .elements
            .get(element)
            .map(|record| record.gallery_index)
    }

    pub fn tapes(&self, element: ElementId) -> Vec<TapeSpec> {
        let inner = self.inner.lock().unwrap();
        inner
            .elements
            .get(element)
            .map(|record| record.tapes.clone())
            .unwrap_or_default()
    }

    /// Role lookup without importing the trait
    pub fn element_for(&self, page: &PageId, role: ElementRole) -> Option<ElementId> {
        let inner = self.inner.lock().unwrap();
        inner.by_role.get(&(page.clone(), role)).copied()
    }

    pub fn element_count(&self) -> usize {
        self.inner.lock().unwrap().elements.len()
    }
}

impl VisualStage for MemoryStage {
    fn resolve(&self, page: &PageId, role: ElementRole) -> Option<ElementId> {
        let inner = self.inner.lock().unwrap();
        let element = inner.by_role.get(&(page.clone(), role)).copied()?;
        inner.elements.contains_key(element).then_some(element)
    }

    fn apply(&mut self, element: ElementId, op: VisualOp) -> StageResult<()> {
        let mut inner = self.inner.lock().unwrap();
        let record = inner
            .elements
            .get_mut(element)
            .ok_or_else(|| StageError::StaleElement(format!("{element:?}")))?;
        let props = &mut record.props;
        match op {
            VisualOp::Opacity(value) => props.opacity = value,
            VisualOp::TranslateY(value) => props.translate_y = value,
            VisualOp::TranslateXPercent(value) => props.translate_x_pct = value,
            VisualOp::Scale(value) => props.scale = value,
            VisualOp::RotateDeg(value) => props.rotation_deg = value,
            VisualOp::StrokeProgress(value) => props.stroke_progress = value,
            VisualOp::StrokeWidth(value) => props.stroke_width = value,
            VisualOp::Background(color) => props.background = color,
        }
        Ok(())
    }

    fn element_bounds(&self, element: ElementId) -> Option<Bounds> {
        self.bounds(element)
    }

    fn viewport(&self) -> Bounds {
        let inner = self.inner.lock().unwrap();
        Bounds::new(0.0, inner.scroll_y, inner.viewport_width, inner.viewport_height)
    }

    fn scroll_offset(&self) -> f32 {
        self.inner.lock().unwrap().scroll_y
    }

    fn show_gallery_item(&mut self, element: ElementId, index: usize) -> StageResult<()> {
        let mut inner = self.inner.lock().unwrap();
        let record = inner
            .elements
            .get_mut(element)
            .ok_or_else(|| StageError::StaleElement(format!("{element:?}")))?;
        if record.role != ElementRole::Gallery {
            return Err(StageError::Mutation(format!(
                "cannot show gallery item on a {} element",
                record.role
            )));
        }
        if let Some(count) = record.gallery_item_count {
            if index >= count {
                return Err(StageError::GalleryRange(format!(
                    "item {index} out of range (gallery has {count})"
                )));
            }
        }
        record.gallery_index = index;
        Ok(())
    }

    fn rebuild_tape_layers(&mut self, element: ElementId, tapes: &[TapeSpec]) -> StageResult<()> {
        let mut inner = self.inner.lock().unwrap();
        let record = inner
            .elements
            .get_mut(element)
            .ok_or_else(|| StageError::StaleElement(format!("{element:?}")))?;
        if record.role != ElementRole::Gallery {
            return Err(StageError::Mutation(format!(
                "cannot rebuild tape layers on a {} element",
                record.role
            )));
        }
        record.tapes = tapes.to_vec();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_writes_props() {
        let mut stage = MemoryStage::new(800.0, 600.0);
        let alpha = PageId::from("alpha");
        let title = stage.add_element(
            alpha.clone(),
            ElementRole::Title,
            Bounds::new(0.0, 0.0, 400.0, 100.0),
        );

        stage.apply(title, VisualOp::StrokeProgress(1.0)).unwrap();
        stage.apply(title, VisualOp::StrokeWidth(45.0)).unwrap();

        let props = stage.props(title).unwrap();
        assert_eq!(props.stroke_progress, 1.0);
        assert_eq!(props.stroke_width, 45.0);
    }

    #[test]
    fn test_stale_element_errors() {
        let mut stage = MemoryStage::new(800.0, 600.0);
        let alpha = PageId::from("alpha");
        let title = stage.add_element(
            alpha.clone(),
            ElementRole::Title,
            Bounds::new(0.0, 0.0, 400.0, 100.0),
        );
        stage.remove_element(title);

        assert!(stage.apply(title, VisualOp::Opacity(0.0)).is_err());
        assert!(stage.resolve(&alpha, ElementRole::Title).is_none());
    }

    #[test]
    fn test_gallery_ops_check_role_and_range() {
        let mut stage = MemoryStage::new(800.0, 600.0);
        let alpha = PageId::from("alpha");
        let title = stage.add_element(
            alpha.clone(),
            ElementRole::Title,
            Bounds::new(0.0, 0.0, 400.0, 100.0),
        );
        let gallery = stage.add_element(
            alpha.clone(),
            ElementRole::Gallery,
            Bounds::new(0.0, 200.0, 400.0, 300.0),
        );
        stage.set_gallery_item_count(gallery, 2);

        assert!(stage.show_gallery_item(title, 0).is_err());
        assert!(stage.show_gallery_item(gallery, 2).is_err());
        stage.show_gallery_item(gallery, 1).unwrap();
        assert_eq!(stage.gallery_index(gallery), Some(1));

        stage
            .rebuild_tape_layers(gallery, &[TapeSpec::default()])
            .unwrap();
        assert_eq!(stage.tapes(gallery).len(), 1);
    }

    #[test]
    fn test_viewport_follows_scroll() {
        let mut stage = MemoryStage::new(800.0, 600.0);
        stage.scroll_to(250.0);
        assert_eq!(stage.viewport(), Bounds::new(0.0, 250.0, 800.0, 600.0));
        assert_eq!(stage.scroll_offset(), 250.0);
    }

    #[test]
    fn test_shared_handle_sees_mutations() {
        let mut stage = MemoryStage::new(800.0, 600.0);
        let viewer = stage.clone();
        let alpha = PageId::from("alpha");
        let subtitle = stage.add_element(
            alpha,
            ElementRole::Subtitle,
            Bounds::new(0.0, 120.0, 400.0, 40.0),
        );

        stage.apply(subtitle, VisualOp::Opacity(0.0)).unwrap();
        assert_eq!(viewer.props(subtitle).unwrap().opacity, 0.0);
    }
}
