//! Engine configuration.
//!
//! Every field has a default matching the stock markup conventions, so hosts only
//! need to pass the pieces they override.

use serde::{Deserialize, Serialize};

use crate::error::PageError;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub markers: Markers,
    pub classes: Classes,
    pub transitions: Transitions,
    pub intersection: IntersectionConfig,
    pub parallax: ParallaxConfig,
    /// Breakpoint name (as exposed through `body::after { content }`) that means mobile layout.
    pub small_breakpoint: String,
}

impl Config {
    /// Parse a (possibly partial) JSON config; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, PageError> {
        Ok(serde_json::from_str(json)?)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            markers: Markers::default(),
            classes: Classes::default(),
            transitions: Transitions::default(),
            intersection: IntersectionConfig::default(),
            parallax: ParallaxConfig::default(),
            small_breakpoint: "small".to_string(),
        }
    }
}

/// Data attributes identifying the landmarks the engine works on.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Markers {
    pub nav: String,
    pub nav_toggle: String,
    pub main_wrapper: String,
    pub main_content: String,
    pub page_link: String,
    pub reveal: String,
    pub parallax: String,
}

impl Default for Markers {
    fn default() -> Self {
        Self {
            nav: "data-nav".to_string(),
            nav_toggle: "data-nav-toggle".to_string(),
            main_wrapper: "data-main-wrapper".to_string(),
            main_content: "data-main-content".to_string(),
            page_link: "data-page-link".to_string(),
            reveal: "data-reveal".to_string(),
            parallax: "data-parallax".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Classes {
    /// Current navigation item.
    pub active: String,
    /// Put on `<body>` while the mobile nav is open.
    pub inactive: String,
    /// One-way reveal marker.
    pub visible: String,
    /// Put on the document element once the enhancement layer is running.
    pub enhanced: String,
}

impl Default for Classes {
    fn default() -> Self {
        Self {
            active: "is-active".to_string(),
            inactive: "is-inactive".to_string(),
            visible: "is-visible".to_string(),
            enhanced: "js".to_string(),
        }
    }
}

/// CSS animation class names for the content swap.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Transitions {
    pub exit: String,
    pub enter: String,
}

impl Default for Transitions {
    fn default() -> Self {
        Self {
            exit: "fadeOutUp".to_string(),
            enter: "fadeInUp".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntersectionConfig {
    pub root_margin: String,
    pub threshold: f64,
}

impl Default for IntersectionConfig {
    fn default() -> Self {
        Self {
            root_margin: "50px 0px".to_string(),
            threshold: 0.01,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParallaxConfig {
    pub speed: f64,
    /// Custom property receiving the scroll offset.
    pub property: String,
    /// Transform applied once to every parallax item; reads `property`.
    pub transform: String,
}

impl ParallaxConfig {
    /// Vertical offset for a given scroll position.
    #[inline]
    pub fn offset(&self, scroll_top: f64) -> f64 {
        scroll_top * self.speed
    }
}

impl Default for ParallaxConfig {
    fn default() -> Self {
        Self {
            speed: 0.3,
            property: "--scrollparallax".to_string(),
            transform: "translateY( calc( var(--scrollparallax) * 1px ) )".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = Config::from_json(r#"{ "parallax": { "speed": 0.5 }, "small_breakpoint": "mobile" }"#)
            .unwrap();
        assert_eq!(cfg.parallax.speed, 0.5);
        assert_eq!(cfg.parallax.property, "--scrollparallax");
        assert_eq!(cfg.small_breakpoint, "mobile");
        assert_eq!(cfg.markers, Markers::default());
    }

    #[test]
    fn invalid_json_is_a_host_error() {
        let err = Config::from_json("{ nope").unwrap_err();
        assert_eq!(err.category(), "host");
    }

    #[test]
    fn default_parallax_offset() {
        let p = ParallaxConfig::default();
        assert!((p.offset(100.0) - 30.0).abs() < 1e-9);
        assert_eq!(p.offset(0.0), 0.0);
    }
}
