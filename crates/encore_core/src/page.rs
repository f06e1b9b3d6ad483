//! Page identity and lifecycle phase types
//!
//! A "page" is one logical view of the site with its own entrance animation
//! state. Pages are identified by an opaque string key that stays stable
//! across re-entries (back/forward navigation, tab re-focus), which is what
//! lets visit state survive a soft navigation and be reconciled on return.

use std::fmt;

/// Stable key identifying one logical page.
///
/// The coordinator only manages pages that were named in its configuration;
/// notifications for unknown keys are ignored.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageId(String);

impl PageId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw string key
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PageId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for PageId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Roles of the visual elements a page can own.
///
/// The stage resolves concrete elements per `(page, role)`; any role may be
/// absent on a given page and is then skipped by every mutation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ElementRole {
    /// Title artwork; doubles as the viewport-intersection trigger
    Title,
    /// Subtitle line revealed after the title
    Subtitle,
    /// Decorative tape overlay
    Tape,
    /// Scroll hint shown last
    ScrollHint,
    /// Call-to-action block (revealed by scroll effects outside the sequence,
    /// but reset and flag-tracked here)
    Cta,
    /// Gallery image container
    Gallery,
    /// Element carrying the page background color
    Background,
}

impl ElementRole {
    /// All roles, in reset order
    pub const ALL: [ElementRole; 7] = [
        ElementRole::Title,
        ElementRole::Subtitle,
        ElementRole::Tape,
        ElementRole::ScrollHint,
        ElementRole::Cta,
        ElementRole::Gallery,
        ElementRole::Background,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ElementRole::Title => "title",
            ElementRole::Subtitle => "subtitle",
            ElementRole::Tape => "tape",
            ElementRole::ScrollHint => "scroll-hint",
            ElementRole::Cta => "cta",
            ElementRole::Gallery => "gallery",
            ElementRole::Background => "background",
        }
    }
}

impl fmt::Display for ElementRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle phase of a page's entrance sequence
///
/// ```text
/// Idle ──entered-view──▶ Animating ──final step──▶ Settled
///   ▲                        │                        │
///   └────────── reset ───────┴────────────────────────┘
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PagePhase {
    /// No animation run; visuals at baseline
    #[default]
    Idle,
    /// Entrance sequence in progress
    Animating,
    /// Sequence complete; final visuals held
    Settled,
}

impl PagePhase {
    pub fn is_idle(&self) -> bool {
        matches!(self, PagePhase::Idle)
    }

    pub fn is_animating(&self) -> bool {
        matches!(self, PagePhase::Animating)
    }

    pub fn is_settled(&self) -> bool {
        matches!(self, PagePhase::Settled)
    }
}

impl fmt::Display for PagePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PagePhase::Idle => "idle",
            PagePhase::Animating => "animating",
            PagePhase::Settled => "settled",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_id_round_trip() {
        let id = PageId::from("serenity");
        assert_eq!(id.as_str(), "serenity");
        assert_eq!(id.to_string(), "serenity");
        assert_eq!(id, PageId::new(String::from("serenity")));
    }

    #[test]
    fn test_phase_predicates() {
        assert!(PagePhase::default().is_idle());
        assert!(PagePhase::Animating.is_animating());
        assert!(PagePhase::Settled.is_settled());
        assert!(!PagePhase::Settled.is_idle());
    }

    #[test]
    fn test_role_names_are_distinct() {
        let mut names: Vec<&str> = ElementRole::ALL.iter().map(|r| r.as_str()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), ElementRole::ALL.len());
    }
}
