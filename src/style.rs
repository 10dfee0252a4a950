use data::chart::Tone;
use iced::{
    Border, Color, Theme,
    theme::palette::Pair,
    widget::{container, text},
};

pub const CARD_RADIUS: f32 = 6.0;

pub fn card(theme: &Theme) -> container::Style {
    let palette = theme.extended_palette();

    container::Style {
        background: Some(palette.background.weak.color.into()),
        text_color: Some(palette.background.weak.text),
        border: Border {
            width: 1.0,
            color: palette.background.strong.color.scale_alpha(0.4),
            radius: CARD_RADIUS.into(),
        },
        ..Default::default()
    }
}

pub fn sidebar(theme: &Theme) -> container::Style {
    let palette = theme.extended_palette();

    container::Style {
        background: Some(palette.background.weakest.color.into()),
        border: Border {
            radius: CARD_RADIUS.into(),
            ..Default::default()
        },
        ..Default::default()
    }
}

fn tone_pair(theme: &Theme, tone: Tone) -> Pair {
    let palette = theme.extended_palette();
    match tone {
        Tone::Warmer => palette.danger.weak,
        Tone::Cooler => palette.primary.weak,
        Tone::Same => palette.secondary.weak,
    }
}

/// Small rounded label coloured by how today compares with last year.
pub fn badge(theme: &Theme, tone: Tone) -> container::Style {
    let pair = tone_pair(theme, tone);

    container::Style {
        background: Some(pair.color.into()),
        text_color: Some(pair.text),
        border: Border {
            width: 1.0,
            color: pair.color,
            radius: 9.0.into(),
        },
        ..Default::default()
    }
}

pub fn error_banner(theme: &Theme) -> container::Style {
    let pair = theme.extended_palette().danger.weak;

    container::Style {
        background: Some(pair.color.into()),
        text_color: Some(pair.text),
        border: Border {
            width: 1.0,
            color: pair.color,
            radius: 2.0.into(),
        },
        ..Default::default()
    }
}

pub fn muted_text(theme: &Theme) -> text::Style {
    text::Style {
        color: Some(theme.extended_palette().background.base.text.scale_alpha(0.6)),
    }
}

pub fn tone_text(theme: &Theme, tone: Tone) -> text::Style {
    let palette = theme.extended_palette();
    let color: Color = match tone {
        Tone::Warmer => palette.danger.base.color,
        Tone::Cooler => palette.primary.base.color,
        Tone::Same => palette.secondary.strong.color,
    };
    text::Style { color: Some(color) }
}

pub mod button {
    use iced::{
        Border, Theme,
        widget::button::{Status, Style},
    };

    pub fn transparent(theme: &Theme, status: Status, is_active: bool) -> Style {
        let palette = theme.extended_palette();

        let background = match (status, is_active) {
            (_, true) => Some(palette.background.weak.color.into()),
            (Status::Hovered, false) => Some(palette.background.weak.color.scale_alpha(0.6).into()),
            (Status::Pressed, false) => Some(palette.background.strong.color.into()),
            _ => None,
        };

        let text_color = match status {
            Status::Disabled => palette.background.base.text.scale_alpha(0.3),
            _ => palette.background.base.text,
        };

        Style {
            background,
            text_color,
            border: Border {
                radius: 4.0.into(),
                width: if is_active { 1.0 } else { 0.0 },
                color: palette.background.strong.color,
            },
            ..Default::default()
        }
    }

    pub fn danger(theme: &Theme, status: Status) -> Style {
        let palette = theme.extended_palette();

        let pair = match status {
            Status::Hovered | Status::Pressed => palette.danger.base,
            _ => palette.danger.weak,
        };

        Style {
            background: Some(pair.color.scale_alpha(0.8).into()),
            text_color: pair.text,
            border: Border {
                radius: 4.0.into(),
                ..Default::default()
            },
            ..Default::default()
        }
    }
}
