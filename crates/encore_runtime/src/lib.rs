//! Encore Runtime
//!
//! The animation lifecycle coordinator: entrance sequences that run exactly
//! once per page visit, deterministic resets on re-entry, and ordered
//! resumption when a stale view comes back.
//!
//! # Example
//!
//! ```rust
//! use encore_core::{Bounds, CoordinatorConfig, ElementRole, GalleryRegistry, PageId};
//! use encore_runtime::{LifecycleCoordinator, MemoryStage};
//!
//! let mut stage = MemoryStage::new(800.0, 600.0);
//! let serenity = PageId::from("serenity");
//! stage.add_element(
//!     serenity.clone(),
//!     ElementRole::Title,
//!     Bounds::new(0.0, 100.0, 400.0, 120.0),
//! );
//!
//! let coordinator = LifecycleCoordinator::new(
//!     CoordinatorConfig::new().with_pages(["serenity"]),
//!     Box::new(stage.clone()),
//!     GalleryRegistry::new(),
//! );
//!
//! coordinator.page_entered("serenity");
//! for t in (0u64..=3000).step_by(50) {
//!     coordinator.tick(t);
//! }
//! assert!(coordinator.visit_state("serenity").has_animated);
//! ```

mod engine;
mod sequencer;

pub mod coordinator;
pub mod error;
pub mod observe;
pub mod resume;
pub mod stage;

#[cfg(test)]
mod tests;

pub use coordinator::{
    global, install_global, is_global_installed, try_global, CoordinatorHandle,
    LifecycleCoordinator,
};
pub use error::{Result, RuntimeError};
pub use observe::{ObservationTrigger, BOTTOM_INSET_FRACTION, DEFAULT_THRESHOLD};
pub use resume::{ResumeSignal, ResumeSource, ResumeTrigger};
pub use stage::{MemoryStage, VisualProps};

/// Prelude module - import everything commonly needed
pub mod prelude {
    pub use crate::coordinator::{CoordinatorHandle, LifecycleCoordinator};
    pub use crate::error::{Result, RuntimeError};
    pub use crate::stage::MemoryStage;

    // Core types
    pub use encore_core::{
        Bounds, CoordinatorConfig, ElementRole, GalleryDescriptor, GalleryItem, GalleryRegistry,
        PageId, PagePhase, TapeSpec, VisitState,
    };
}
