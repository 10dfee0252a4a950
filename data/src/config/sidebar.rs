use serde::{Deserialize, Deserializer, Serialize};

/// Width presets offered by the sidebar settings.
pub const WIDTH_PRESETS: [f32; 3] = [220.0, 280.0, 340.0];
pub const COLLAPSED_WIDTH: f32 = 48.0;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Sidebar {
    pub width: f32,
    pub collapsed: bool,
}

impl Sidebar {
    pub fn toggle_collapsed(&mut self) {
        self.collapsed = !self.collapsed;
    }

    pub fn set_width(&mut self, width: f32) {
        self.width = width.clamp(WIDTH_PRESETS[0], WIDTH_PRESETS[WIDTH_PRESETS.len() - 1]);
    }

    /// Width the layout should reserve right now.
    pub fn effective_width(&self) -> f32 {
        if self.collapsed {
            COLLAPSED_WIDTH
        } else {
            self.width
        }
    }
}

impl Default for Sidebar {
    fn default() -> Self {
        Sidebar {
            width: WIDTH_PRESETS[1],
            collapsed: false,
        }
    }
}

pub fn deserialize_sidebar_fallback<'de, D>(deserializer: D) -> Result<Sidebar, D::Error>
where
    D: Deserializer<'de>,
{
    Sidebar::deserialize(deserializer).or(Ok(Sidebar::default()))
}
