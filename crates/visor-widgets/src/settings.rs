#![forbid(unsafe_code)]

//! Window construction settings.
//!
//! Read once from the settings collaborator when a window is built; the
//! core never writes them back. Serde derives keep the shape stable for
//! whatever store the embedder persists with.

use serde::{Deserialize, Serialize};

use visor_placement::SizeReference;

/// Internal page shown as the private-mode home.
pub const PRIVATE_HOME_URI: &str = "about:privatebrowsing";

/// Settings a window reads at construction time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowSettings {
    /// Default window content width in device-independent pixels.
    pub window_width: u32,
    /// Default window content height in device-independent pixels.
    pub window_height: u32,
    /// World width of a default-size window, in scene units.
    pub reference_world_width: f32,
    /// Transparent border reserved around content, in pixels.
    pub border_width: u32,
    /// Cylinder radius windows curve around; 0 renders flat.
    pub cylinder_radius: f32,
    /// Upper bound on the window area multiplier.
    pub max_window_scale: f32,
    /// Home page loaded into fresh non-private sessions.
    pub homepage: String,
}

impl WindowSettings {
    /// The pixel/world conversion ratio these settings imply.
    pub fn size_reference(&self) -> SizeReference {
        SizeReference::new(self.window_width, self.reference_world_width)
    }

    /// Default window aspect ratio (content width / content height).
    pub fn aspect(&self) -> f32 {
        self.window_width as f32 / self.window_height.max(1) as f32
    }
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            window_width: 800,
            window_height: 450,
            reference_world_width: 4.0,
            border_width: 0,
            cylinder_radius: 4.0,
            max_window_scale: 3.0,
            homepage: String::from("about:home"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::WindowSettings;

    #[test]
    fn defaults_are_sane() {
        let settings = WindowSettings::default();
        assert!((settings.aspect() - 800.0 / 450.0).abs() < 1e-5);
        assert_eq!(settings.size_reference().default_window_width, 800);
    }

    #[test]
    fn serde_round_trip_with_partial_input() {
        let settings: WindowSettings =
            serde_json::from_str(r#"{"window_width": 1024, "border_width": 8}"#).unwrap();
        assert_eq!(settings.window_width, 1024);
        assert_eq!(settings.border_width, 8);
        // Unspecified fields fall back to defaults.
        assert_eq!(settings.window_height, 450);

        let json = serde_json::to_string(&settings).unwrap();
        let back: WindowSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(settings, back);
    }
}
