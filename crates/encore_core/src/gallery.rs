//! Typed gallery descriptors
//!
//! Each managed page may carry an image gallery with decorative tape overlays
//! per item. The descriptors are plain data, registered up front and injected
//! into the coordinator; at runtime items are addressed only by index, so the
//! lifecycle code never discovers page assets by name.

use crate::page::PageId;
use indexmap::IndexMap;
use smallvec::SmallVec;

/// Which corner or edge a tape overlay is pinned to
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TapeAnchor {
    /// Centered on the top edge
    #[default]
    TopCenter,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl TapeAnchor {
    pub fn as_str(&self) -> &'static str {
        match self {
            TapeAnchor::TopCenter => "top-center",
            TapeAnchor::TopLeft => "top-left",
            TapeAnchor::TopRight => "top-right",
            TapeAnchor::BottomLeft => "bottom-left",
            TapeAnchor::BottomRight => "bottom-right",
        }
    }
}

/// One decorative tape overlay
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TapeSpec {
    pub width: f32,
    pub height: f32,
    /// Resting rotation in degrees
    pub rotation_deg: f32,
    pub anchor: TapeAnchor,
    /// Offset from the anchor, in pixels
    pub offset_x: f32,
    pub offset_y: f32,
}

impl Default for TapeSpec {
    fn default() -> Self {
        Self {
            width: 120.0,
            height: 36.0,
            rotation_deg: -8.0,
            anchor: TapeAnchor::TopCenter,
            offset_x: 0.0,
            offset_y: -14.0,
        }
    }
}

/// Inline list sized for the common one-or-two-tapes case
pub type TapeList = SmallVec<[TapeSpec; 4]>;

/// One gallery item: an image reference plus its tape overlays
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GalleryItem {
    /// Asset key understood by the stage backend
    pub image: String,
    pub tapes: TapeList,
}

impl GalleryItem {
    pub fn new(image: impl Into<String>) -> Self {
        Self {
            image: image.into(),
            tapes: TapeList::new(),
        }
    }

    pub fn with_tape(mut self, tape: TapeSpec) -> Self {
        self.tapes.push(tape);
        self
    }
}

/// Ordered item list for one page's gallery
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GalleryDescriptor {
    pub items: Vec<GalleryItem>,
}

impl GalleryDescriptor {
    pub fn new(items: Vec<GalleryItem>) -> Self {
        Self { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn item(&self, index: usize) -> Option<&GalleryItem> {
        self.items.get(index)
    }

    /// Index after `index`, wrapping; `None` for an empty gallery
    pub fn next_index(&self, index: usize) -> Option<usize> {
        if self.items.is_empty() {
            None
        } else {
            Some((index + 1) % self.items.len())
        }
    }
}

/// Registry mapping pages to their gallery descriptors.
///
/// Iteration order follows registration order, which keeps demo output and
/// state dumps stable.
#[derive(Default)]
pub struct GalleryRegistry {
    galleries: IndexMap<PageId, GalleryDescriptor>,
}

impl GalleryRegistry {
    pub fn new() -> Self {
        Self {
            galleries: IndexMap::new(),
        }
    }

    /// Register (or replace) the descriptor for a page
    pub fn register(&mut self, page: PageId, descriptor: GalleryDescriptor) {
        self.galleries.insert(page, descriptor);
    }

    /// Builder-style registration
    pub fn with(mut self, page: impl Into<PageId>, descriptor: GalleryDescriptor) -> Self {
        self.register(page.into(), descriptor);
        self
    }

    pub fn descriptor(&self, page: &PageId) -> Option<&GalleryDescriptor> {
        self.galleries.get(page)
    }

    pub fn contains(&self, page: &PageId) -> bool {
        self.galleries.contains_key(page)
    }

    pub fn len(&self) -> usize {
        self.galleries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.galleries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PageId, &GalleryDescriptor)> {
        self.galleries.iter()
    }
}
