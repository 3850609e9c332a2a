// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Viewer display settings.

use serde::{Deserialize, Serialize};

/// Display settings applied to the viewer surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewerSettings {
    pub show_grid: bool,
    pub show_axes: bool,
    pub background_color: String,
}

impl Default for ViewerSettings {
    fn default() -> Self {
        Self {
            show_grid: true,
            show_axes: true,
            background_color: "#ffffff".into(),
        }
    }
}

/// Partial update for [`ViewerSettings`]; absent fields keep their
/// current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewerSettingsPatch {
    pub show_grid: Option<bool>,
    pub show_axes: Option<bool>,
    pub background_color: Option<String>,
}

/// Settings store: dark mode plus viewer display settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsStore {
    pub dark_mode: bool,
    #[serde(default)]
    pub viewer: ViewerSettings,
}

impl SettingsStore {
    pub fn new() -> Self {
        Self {
            dark_mode: false,
            viewer: ViewerSettings::default(),
        }
    }

    pub fn toggle_dark_mode(&mut self) {
        self.dark_mode = !self.dark_mode;
    }

    /// Apply a partial update to the viewer settings.
    pub fn update_viewer(&mut self, patch: ViewerSettingsPatch) {
        if let Some(show_grid) = patch.show_grid {
            self.viewer.show_grid = show_grid;
        }
        if let Some(show_axes) = patch.show_axes {
            self.viewer.show_axes = show_axes;
        }
        if let Some(background_color) = patch.background_color {
            self.viewer.background_color = background_color;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patch_only_touches_present_fields() {
        let mut settings = SettingsStore::new();
        settings.update_viewer(ViewerSettingsPatch {
            show_grid: Some(false),
            ..Default::default()
        });
        assert!(!settings.viewer.show_grid);
        assert!(settings.viewer.show_axes);
        assert_eq!(settings.viewer.background_color, "#ffffff");
    }

    #[test]
    fn dark_mode_toggles() {
        let mut settings = SettingsStore::new();
        settings.toggle_dark_mode();
        assert!(settings.dark_mode);
        settings.toggle_dark_mode();
        assert!(!settings.dark_mode);
    }

    #[test]
    fn serde_roundtrip_uses_camel_case() {
        let settings = SettingsStore::new();
        let json = serde_json::to_value(&settings).unwrap();
        assert_eq!(json["darkMode"], false);
        assert_eq!(json["viewer"]["showGrid"], true);
        let back: SettingsStore = serde_json::from_value(json).unwrap();
        assert_eq!(back, settings);
    }
}
