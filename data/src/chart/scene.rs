//! Everything the chart paints for one frame, already in surface coordinates.

use super::animation::Progress;
use super::geometry::{Geometry, RevealedLine, reveal};

use iced_core::{Point, Rectangle};
use provider::{DELTA_THRESHOLD, MonthSlice};

pub const TEXT_SIZE: f32 = 11.0;
pub const SMALL_TEXT_SIZE: f32 = 10.0;

const GRID_STEPS: usize = 4;
const DATE_TICK_EVERY: usize = 3;
const DATE_FORMAT: &str = "%b %-d";

/// Rough advance width of the chart font, good enough to size pills.
pub fn text_width(text: &str) -> f32 {
    text.chars().count() as f32 * TEXT_SIZE * 0.62
}

pub fn degrees_label(value: f32) -> String {
    format!("{}°", value.round() as i32)
}

/// How a temperature difference reads against the reference year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Warmer,
    Cooler,
    Same,
}

impl Tone {
    pub fn from_delta(delta: f32) -> Self {
        if delta > DELTA_THRESHOLD {
            Tone::Warmer
        } else if delta < -DELTA_THRESHOLD {
            Tone::Cooler
        } else {
            Tone::Same
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Series {
    ThisPeriod,
    Reference,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridLine {
    pub y: f32,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DateTick {
    pub x: f32,
    pub label: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TodayMarker {
    pub x: f32,
    pub tone: Tone,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Callout {
    pub series: Series,
    pub point: Point,
    pub label: String,
    pub pill: Rectangle,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HoverOverlay {
    pub index: usize,
    pub x: f32,
    pub date_label: String,
    pub callouts: Vec<Callout>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub geometry: Geometry,
    pub grid: Vec<GridLine>,
    pub date_ticks: Vec<DateTick>,
    pub today: Option<TodayMarker>,
    pub reference: RevealedLine,
    pub this_period: RevealedLine,
    /// Faded markers after today, no connecting line.
    pub forecast: Vec<Point>,
    pub hover: Option<HoverOverlay>,
}

impl Scene {
    pub fn build(
        geometry: Geometry,
        slice: &MonthSlice,
        progress: Progress,
        hover: Option<usize>,
    ) -> Self {
        let n = slice.len();

        let reference_points = geometry.points(&slice.reference_period, 0..n);
        let observed = slice.observed_end().map_or(0, |end| end + 1);
        let this_points = geometry.points(&slice.this_period, 0..observed);

        let forecast = match slice.today {
            Some(today) => {
                let points = geometry.points(&slice.this_period, today + 1..n);
                let shown = (points.len() as f32 * progress.forecast).floor() as usize;
                points.into_iter().take(shown).map(|(_, p)| p).collect()
            }
            None => vec![],
        };

        Scene {
            grid: grid_lines(&geometry),
            date_ticks: date_ticks(&geometry, slice),
            today: slice.today.map(|idx| TodayMarker {
                x: geometry.x_pos(idx),
                tone: Tone::from_delta(slice.delta),
            }),
            reference: reveal(&reference_points, progress.line),
            this_period: reveal(&this_points, progress.line),
            forecast,
            hover: hover
                .filter(|&idx| idx < n)
                .map(|idx| hover_overlay(&geometry, slice, idx)),
            geometry,
        }
    }
}

fn grid_lines(geometry: &Geometry) -> Vec<GridLine> {
    let (min, max) = geometry.domain();

    (0..=GRID_STEPS)
        .map(|i| {
            let value = min + (i as f32 / GRID_STEPS as f32) * (max - min);
            GridLine {
                y: geometry.y_pos(value),
                label: degrees_label(value),
            }
        })
        .collect()
}

fn date_ticks(geometry: &Geometry, slice: &MonthSlice) -> Vec<DateTick> {
    slice
        .dates
        .iter()
        .enumerate()
        .step_by(DATE_TICK_EVERY)
        .map(|(i, date)| DateTick {
            x: geometry.x_pos(i),
            label: date.format(DATE_FORMAT).to_string(),
        })
        .collect()
}

fn hover_overlay(geometry: &Geometry, slice: &MonthSlice, index: usize) -> HoverOverlay {
    let x = geometry.x_pos(index);

    let callouts = [
        (Series::ThisPeriod, slice.this_period[index]),
        (Series::Reference, slice.reference_period[index]),
    ]
    .into_iter()
    .filter_map(|(series, value)| {
        let value = value?;
        let point = geometry.point(index, value);
        let label = degrees_label(value);
        let pill = geometry.pill_rect(x, point.y, text_width(&label));

        Some(Callout {
            series,
            point,
            label,
            pill,
        })
    })
    .collect();

    HoverOverlay {
        index,
        x,
        date_label: slice.dates[index].format(DATE_FORMAT).to_string(),
        callouts,
    }
}
