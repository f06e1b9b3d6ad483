//! Scenario file handling
//!
//! A scenario is a TOML description of one simulated visit: the site layout
//! (pages, element bounds, gallery items), the virtual clock, and a timed
//! event script. The `run` command plays it against an in-memory stage.

use anyhow::{Context, Result};
use encore_core::{Bounds, ElementRole, GalleryItem, TapeSpec};
use serde::Deserialize;
use std::fs;
use std::path::Path;

// ============================================================================
// Scenario schema
// ============================================================================

/// A parsed scenario file
#[derive(Debug, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub scenario: ScenarioMeta,
    #[serde(default)]
    pub pages: Vec<PageConfig>,
    #[serde(default)]
    pub events: Vec<ScenarioEvent>,
}

#[derive(Debug, Deserialize)]
pub struct ScenarioMeta {
    #[serde(default = "default_name")]
    pub name: String,
    /// Total virtual time to play, in ms. Extended to cover the last event.
    #[serde(default = "default_duration")]
    pub duration_ms: u64,
    /// Clock step between ticks, in ms
    #[serde(default = "default_tick")]
    pub tick_ms: u64,
    #[serde(default)]
    pub reduced_motion: bool,
    #[serde(default = "default_viewport_width")]
    pub viewport_width: f32,
    #[serde(default = "default_viewport_height")]
    pub viewport_height: f32,
}

fn default_name() -> String {
    "scenario".to_string()
}

fn default_duration() -> u64 {
    4000
}

fn default_tick() -> u64 {
    50
}

fn default_viewport_width() -> f32 {
    800.0
}

fn default_viewport_height() -> f32 {
    600.0
}

impl Default for ScenarioMeta {
    fn default() -> Self {
        Self {
            name: default_name(),
            duration_ms: default_duration(),
            tick_ms: default_tick(),
            reduced_motion: false,
            viewport_width: default_viewport_width(),
            viewport_height: default_viewport_height(),
        }
    }
}

/// One managed page: its elements and optional gallery items
#[derive(Debug, Deserialize)]
pub struct PageConfig {
    pub id: String,
    #[serde(default)]
    pub elements: Vec<ElementConfig>,
    #[serde(default)]
    pub gallery: Vec<GalleryItemConfig>,
}

/// One element placed at fixed document coordinates
#[derive(Debug, Deserialize)]
pub struct ElementConfig {
    /// One of: title, subtitle, tape, scroll-hint, cta, gallery, background
    pub role: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl ElementConfig {
    pub fn role(&self) -> Result<ElementRole> {
        for role in ElementRole::ALL {
            if role.as_str() == self.role {
                return Ok(role);
            }
        }
        let valid: Vec<&str> = ElementRole::ALL.iter().map(|role| role.as_str()).collect();
        anyhow::bail!("Unknown element role '{}'. Valid roles: {:?}", self.role, valid)
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.x, self.y, self.width, self.height)
    }
}

#[derive(Debug, Deserialize)]
pub struct GalleryItemConfig {
    pub image: String,
    /// Horizontal tape offsets; one tape layer per entry
    #[serde(default)]
    pub tape_offsets: Vec<f32>,
}

impl GalleryItemConfig {
    pub fn to_item(&self) -> GalleryItem {
        let mut item = GalleryItem::new(self.image.clone());
        for offset in &self.tape_offsets {
            item = item.with_tape(TapeSpec {
                offset_x: *offset,
                ..TapeSpec::default()
            });
        }
        item
    }
}

// ============================================================================
// Event script
// ============================================================================

/// A host notification fired at a point on the virtual clock
#[derive(Debug, Deserialize)]
pub struct ScenarioEvent {
    /// Virtual time at which the event fires, in ms
    pub at: u64,
    #[serde(flatten)]
    pub action: EventAction,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum EventAction {
    /// Router navigation into a page
    Enter { page: String },
    /// Router navigation away from a page
    Leave { page: String },
    /// Scroll the document to `y`
    Scroll { y: f32 },
    /// Tab hidden
    Hide,
    /// Tab visible again
    Show,
    /// Back/forward restore of a page from the navigation cache
    HistoryRestore { page: String },
    /// Preloader handoff
    IntroDone,
    /// Advance a page's gallery to the next item
    GalleryNext { page: String },
    /// Explicit reset, regardless of staleness
    ForceReset { page: String },
}

impl Scenario {
    /// Load a scenario from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let scenario: Scenario = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        Ok(scenario)
    }
}

/// Starter scenario written by `encore sample`: a first visit, a tab switch
/// away and back, and the stale-return replay.
pub const SAMPLE_SCENARIO: &str = r#"# Encore scenario: first visit, tab switch, stale-return replay.
#
# Bounds are document coordinates; the viewport is a window of
# viewport_height starting at the current scroll offset.

[scenario]
name = "serenity-first-visit"
duration_ms = 9000
tick_ms = 50
reduced_motion = false
viewport_width = 800.0
viewport_height = 600.0

[[pages]]
id = "serenity"

[[pages.elements]]
role = "background"
x = 0.0
y = 0.0
width = 800.0
height = 2400.0

[[pages.elements]]
role = "title"
x = 40.0
y = 80.0
width = 400.0
height = 120.0

[[pages.elements]]
role = "subtitle"
x = 40.0
y = 220.0
width = 360.0
height = 40.0

[[pages.elements]]
role = "tape"
x = 500.0
y = 60.0
width = 120.0
height = 36.0

[[pages.elements]]
role = "scroll-hint"
x = 370.0
y = 480.0
width = 60.0
height = 40.0

[[pages.elements]]
role = "cta"
x = 40.0
y = 1500.0
width = 200.0
height = 60.0

[[pages.elements]]
role = "gallery"
x = 40.0
y = 600.0
width = 720.0
height = 500.0

[[pages.gallery]]
image = "prints/dawn.jpg"
tape_offsets = [0.0]

[[pages.gallery]]
image = "prints/dusk.jpg"
tape_offsets = [-30.0, 30.0]

[[events]]
at = 0
action = "intro-done"

[[events]]
at = 0
action = "enter"
page = "serenity"

# Entrance completes at 2400 ms; flip through the gallery once.
[[events]]
at = 3000
action = "gallery-next"
page = "serenity"

# Switch tabs and come back with the title still on screen: the view is
# stale, so the coordinator resets and replays the entrance.
[[events]]
at = 3500
action = "hide"

[[events]]
at = 5000
action = "show"
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_scenario_parses() {
        let scenario: Scenario = toml::from_str(SAMPLE_SCENARIO).expect("sample parses");
        assert_eq!(scenario.scenario.name, "serenity-first-visit");
        assert_eq!(scenario.pages.len(), 1);
        assert_eq!(scenario.pages[0].elements.len(), 7);
        assert_eq!(scenario.pages[0].gallery.len(), 2);
        assert_eq!(scenario.events.len(), 5);

        for element in &scenario.pages[0].elements {
            element.role().expect("role names are valid");
        }
    }

    #[test]
    fn test_event_actions_deserialize_by_tag() {
        let scenario: Scenario = toml::from_str(
            r#"
            [[events]]
            at = 100
            action = "scroll"
            y = 250.0

            [[events]]
            at = 200
            action = "force-reset"
            page = "serenity"
            "#,
        )
        .expect("events parse");

        assert!(matches!(
            scenario.events[0].action,
            EventAction::Scroll { y } if y == 250.0
        ));
        assert!(matches!(
            scenario.events[1].action,
            EventAction::ForceReset { ref page } if page == "serenity"
        ));
    }

    #[test]
    fn test_unknown_role_is_rejected() {
        let element = ElementConfig {
            role: "hero".to_string(),
            x: 0.0,
            y: 0.0,
            width: 10.0,
            height: 10.0,
        };
        assert!(element.role().is_err());
    }

    #[test]
    fn test_meta_defaults_apply() {
        let scenario: Scenario = toml::from_str("").expect("empty scenario parses");
        assert_eq!(scenario.scenario.tick_ms, 50);
        assert_eq!(scenario.scenario.duration_ms, 4000);
        assert!(!scenario.scenario.reduced_motion);
        assert!(scenario.pages.is_empty());
        assert!(scenario.events.is_empty());
    }
}
