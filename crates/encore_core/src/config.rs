//! Coordinator configuration

use crate::page::PageId;

/// Static configuration for the lifecycle coordinator.
///
/// The managed page set is fixed at construction. Signals mentioning pages
/// outside it are ignored with a debug log, never an error.
#[derive(Clone, Debug, Default)]
pub struct CoordinatorConfig {
    /// Pages the coordinator manages
    pub pages: Vec<PageId>,
    /// When set, entrance sequences complete synchronously with no timers
    pub reduced_motion: bool,
}

impl CoordinatorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pages<I, P>(mut self, pages: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PageId>,
    {
        self.pages = pages.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_reduced_motion(mut self, reduced_motion: bool) -> Self {
        self.reduced_motion = reduced_motion;
        self
    }

    pub fn manages(&self, page: &PageId) -> bool {
        self.pages.contains(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_managed_set() {
        let config = CoordinatorConfig::new().with_pages(["alpha", "beta"]);
        assert!(config.manages(&PageId::from("alpha")));
        assert!(!config.manages(&PageId::from("gamma")));
        assert!(!config.reduced_motion);
    }
}
