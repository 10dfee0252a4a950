use super::sidebar::{Sidebar, deserialize_sidebar_fallback};
use crate::{CityStore, Theme};

use serde::{Deserialize, Serialize};

#[derive(Default, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct State {
    pub cities: CityStore,
    pub selected_theme: Theme,
    #[serde(deserialize_with = "deserialize_sidebar_fallback")]
    pub sidebar: Sidebar,
}

impl State {
    pub fn from_parts(cities: CityStore, selected_theme: Theme, sidebar: Sidebar) -> Self {
        State {
            cities,
            selected_theme,
            sidebar,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let state: State = serde_json::from_str(r#"{ "selected_theme": "nord" }"#).unwrap();
        assert!(state.cities.is_empty());
        assert_eq!(state.sidebar, Sidebar::default());
        assert_eq!(state.selected_theme.0, iced_core::Theme::Nord);
    }

    #[test]
    fn broken_sidebar_does_not_discard_state() {
        let state: State =
            serde_json::from_str(r#"{ "sidebar": { "width": "wide" }, "selected_theme": "dark" }"#)
                .unwrap();
        assert_eq!(state.sidebar, Sidebar::default());
        assert_eq!(state.selected_theme.0, iced_core::Theme::Dark);
    }
}
