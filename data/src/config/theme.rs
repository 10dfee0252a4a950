use iced_core::{
    Color,
    theme::{Custom, Palette},
};
use palette::{FromColor, Hsla, Srgba};
use serde::{Deserialize, Serialize};

const DEFAULT_NAME: &str = "heatline";
const LIGHT_NAME: &str = "heatline-light";

/// Built-in iced themes, keyed by the name stored on disk.
const BUILT_IN: &[(&str, iced_core::Theme)] = &[
    ("ferra", iced_core::Theme::Ferra),
    ("dark", iced_core::Theme::Dark),
    ("light", iced_core::Theme::Light),
    ("dracula", iced_core::Theme::Dracula),
    ("nord", iced_core::Theme::Nord),
    ("solarized_light", iced_core::Theme::SolarizedLight),
    ("solarized_dark", iced_core::Theme::SolarizedDark),
    ("gruvbox_light", iced_core::Theme::GruvboxLight),
    ("gruvbox_dark", iced_core::Theme::GruvboxDark),
    ("catppuccino_latte", iced_core::Theme::CatppuccinLatte),
    ("catppuccino_mocha", iced_core::Theme::CatppuccinMocha),
    ("tokyo_night", iced_core::Theme::TokyoNight),
    ("tokyo_night_light", iced_core::Theme::TokyoNightLight),
    ("kanagawa_wave", iced_core::Theme::KanagawaWave),
    ("kanagawa_lotus", iced_core::Theme::KanagawaLotus),
    ("moonfly", iced_core::Theme::Moonfly),
    ("nightfly", iced_core::Theme::Nightfly),
    ("oxocarbon", iced_core::Theme::Oxocarbon),
];

#[derive(Debug, Clone, PartialEq)]
pub struct Theme(pub iced_core::Theme);

#[derive(Serialize, Deserialize)]
struct SerTheme {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    palette: Option<Palette>,
}

impl Default for Theme {
    fn default() -> Self {
        Self(iced_core::Theme::Custom(heatline_theme().into()))
    }
}

impl From<Theme> for iced_core::Theme {
    fn from(val: Theme) -> Self {
        val.0
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Theme {
    /// Every theme offered in the settings picker.
    pub fn available() -> Vec<Theme> {
        let mut themes = vec![
            Theme::default(),
            Theme(iced_core::Theme::Custom(heatline_light_theme().into())),
        ];
        themes.extend(BUILT_IN.iter().map(|(_, theme)| Theme(theme.clone())));
        themes
    }

    fn from_name(name: &str) -> Option<Self> {
        match name {
            DEFAULT_NAME => Some(Theme::default()),
            LIGHT_NAME => Some(Theme(iced_core::Theme::Custom(
                heatline_light_theme().into(),
            ))),
            _ => BUILT_IN
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, theme)| Theme(theme.clone())),
        }
    }
}

pub fn heatline_theme() -> Custom {
    Custom::new(
        "Heatline".to_string(),
        Palette {
            background: Color::from_rgb8(22, 24, 29),
            text: Color::from_rgb8(222, 224, 228),
            primary: Color::from_rgb8(86, 156, 234),
            success: Color::from_rgb8(92, 190, 120),
            danger: Color::from_rgb8(232, 98, 80),
            warning: Color::from_rgb8(245, 166, 35),
        },
    )
}

pub fn heatline_light_theme() -> Custom {
    Custom::new(
        "Heatline Light".to_string(),
        Palette {
            background: Color::from_rgb8(246, 246, 243),
            text: Color::from_rgb8(36, 38, 42),
            primary: Color::from_rgb8(38, 110, 200),
            success: Color::from_rgb8(46, 140, 80),
            danger: Color::from_rgb8(200, 60, 46),
            warning: Color::from_rgb8(214, 128, 12),
        },
    )
}

impl Serialize for Theme {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        if let iced_core::Theme::Custom(custom) = &self.0 {
            let name = custom.to_string();
            let known = match name.as_str() {
                "Heatline" => Some(DEFAULT_NAME),
                "Heatline Light" => Some(LIGHT_NAME),
                _ => None,
            };

            SerTheme {
                name: known.unwrap_or("custom").to_string(),
                palette: known.is_none().then(|| self.0.palette()),
            }
            .serialize(serializer)
        } else {
            let name = BUILT_IN
                .iter()
                .find(|(_, theme)| *theme == self.0)
                .map_or(DEFAULT_NAME, |(key, _)| *key);
            name.serialize(serializer)
        }
    }
}

impl<'de> Deserialize<'de> for Theme {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value =
            serde_json::Value::deserialize(deserializer).map_err(serde::de::Error::custom)?;

        if let Some(s) = value.as_str() {
            return Theme::from_name(s)
                .ok_or_else(|| serde::de::Error::custom(format!("Invalid theme: {s}")));
        }

        let serialized = SerTheme::deserialize(value).map_err(serde::de::Error::custom)?;

        if serialized.name == "custom" {
            return serialized
                .palette
                .map(|palette| {
                    Theme(iced_core::Theme::Custom(
                        Custom::new("Custom".to_string(), palette).into(),
                    ))
                })
                .ok_or_else(|| serde::de::Error::custom("Custom theme missing palette data"));
        }

        Theme::from_name(&serialized.name).ok_or_else(|| serde::de::Error::custom("Invalid theme"))
    }
}

/// Named color tokens used when painting the temperature chart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartColors {
    pub grid: Color,
    pub label: Color,
    pub this_period: Color,
    pub reference_period: Color,
    pub text: Color,
    pub fill: Color,
    pub warmer: Color,
    pub cooler: Color,
    pub same: Color,
}

impl ChartColors {
    pub fn from_theme(theme: &iced_core::Theme) -> Self {
        let palette = theme.extended_palette();
        let text = palette.background.base.text;

        ChartColors {
            grid: palette.background.strong.color.scale_alpha(0.5),
            label: text.scale_alpha(0.6),
            this_period: palette.warning.base.color,
            reference_period: if palette.is_dark {
                darken(text, 0.3)
            } else {
                lighten(text, 0.35)
            },
            text,
            fill: palette.background.strong.color,
            warmer: palette.danger.base.color,
            cooler: palette.primary.base.color,
            same: palette.secondary.base.color,
        }
    }

    /// Text color readable on top of a pill filled with `background`.
    pub fn pill_text(&self, background: Color) -> Color {
        if is_dark(background) {
            Color::WHITE
        } else {
            Color::BLACK
        }
    }
}

fn to_hsla(color: Color) -> Hsla {
    Hsla::from_color(Srgba::new(color.r, color.g, color.b, color.a))
}

fn from_hsla(hsla: Hsla) -> Color {
    let rgba = Srgba::from_color(hsla);
    Color {
        r: rgba.red,
        g: rgba.green,
        b: rgba.blue,
        a: rgba.alpha,
    }
}

pub fn darken(color: Color, amount: f32) -> Color {
    let mut hsla = to_hsla(color);
    hsla.lightness = (hsla.lightness - amount).max(0.0);
    from_hsla(hsla)
}

pub fn lighten(color: Color, amount: f32) -> Color {
    let mut hsla = to_hsla(color);
    hsla.lightness = (hsla.lightness + amount).min(1.0);
    from_hsla(hsla)
}

pub fn is_dark(color: Color) -> bool {
    let brightness = (color.r * 299.0 + color.g * 587.0 + color.b * 114.0) / 1000.0;
    brightness < 0.5
}
