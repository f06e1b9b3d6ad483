//! Encore Core
//!
//! Foundational primitives for the Encore animation lifecycle coordinator:
//!
//! - **Page Model**: Page identities, element roles, and entrance phases
//! - **Visit State**: Per-page animation memory with subscriptions
//! - **Stage Boundary**: The narrow trait the host backend implements
//! - **Galleries**: Typed descriptors for per-page image galleries
//! - **Geometry**: Bounds math for visibility decisions
//!
//! # Example
//!
//! ```rust
//! use encore_core::{PageId, VisitStore};
//!
//! let store = VisitStore::new();
//! let page = PageId::from("serenity");
//!
//! // Visit records materialize lazily with defaults
//! assert!(!store.get(&page).has_animated);
//!
//! store.update(&page, |state| {
//!     state.has_animated = true;
//!     state.reveal.set_all(true);
//! });
//! assert!(store.get(&page).reveal.all_revealed());
//! ```

pub mod config;
pub mod error;
pub mod gallery;
pub mod geometry;
pub mod page;
pub mod stage;
pub mod state;

pub use config::CoordinatorConfig;
pub use error::{StageError, StageResult};
pub use gallery::{
    GalleryDescriptor, GalleryItem, GalleryRegistry, TapeAnchor, TapeList, TapeSpec,
};
pub use geometry::{intersection_ratio, Bounds};
pub use page::{ElementRole, PageId, PagePhase};
pub use stage::{Color, ElementBundle, ElementId, VisualOp, VisualStage};
pub use state::{RevealFlags, SubscriptionHandle, VisitState, VisitStore};
