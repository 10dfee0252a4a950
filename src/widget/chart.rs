use data::ChartColors;
use data::chart::geometry::{PILL_PADDING, PILL_RADIUS};
use data::chart::scene::{Callout, SMALL_TEXT_SIZE, Scene, Series, TEXT_SIZE, Tone};
use data::chart::{CHART_HEIGHT, ChartRenderer, HoverBinding};

use iced::widget::canvas::{self, LineCap, LineDash, LineJoin, Path, Stroke, Text};
use iced::{Color, Element, Event, Length, Point, Rectangle, Renderer, Size, Theme, mouse, window};

const LINE_WIDTH: f32 = 2.0;
const MARKER_RADIUS: f32 = 2.5;
const HOVER_MARKER_RADIUS: f32 = 4.0;
const FORECAST_ALPHA: f32 = 0.5;
const LABEL_OFFSET: f32 = 6.0;

const REFERENCE_DASH: &[f32] = &[5.0, 4.0];
const TODAY_DASH: &[f32] = &[3.0, 3.0];

#[derive(Debug, Clone, Copy)]
pub enum ChartEvent {
    Hovered {
        binding: HoverBinding,
        size: Size,
        position: Point,
    },
    Left(HoverBinding),
}

pub struct State {
    cache: canvas::Cache,
    last_cache_rev: u64,
    hovering: bool,
}

impl Default for State {
    fn default() -> Self {
        Self {
            cache: canvas::Cache::new(),
            last_cache_rev: 0,
            hovering: false,
        }
    }
}

/// Canvas program painting the temperature chart held by a [`ChartRenderer`].
pub struct TemperatureChart<'a> {
    renderer: &'a ChartRenderer,
}

impl<'a> TemperatureChart<'a> {
    pub fn new(renderer: &'a ChartRenderer) -> Self {
        Self { renderer }
    }

    pub fn view<M>(self) -> Element<'a, M>
    where
        M: From<ChartEvent> + 'a,
    {
        canvas::Canvas::new(self)
            .width(Length::Fill)
            .height(Length::Fixed(CHART_HEIGHT))
            .into()
    }
}

impl<M> canvas::Program<M> for TemperatureChart<'_>
where
    M: From<ChartEvent>,
{
    type State = State;

    fn update(
        &self,
        state: &mut Self::State,
        event: &Event,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> Option<canvas::Action<M>> {
        let binding = self.renderer.binding();

        match event {
            Event::Mouse(mouse::Event::CursorMoved { .. }) => match cursor.position_in(bounds) {
                Some(position) => {
                    state.hovering = true;
                    Some(canvas::Action::publish(M::from(ChartEvent::Hovered {
                        binding,
                        size: bounds.size(),
                        position,
                    })))
                }
                None if state.hovering => {
                    state.hovering = false;
                    Some(canvas::Action::publish(M::from(ChartEvent::Left(binding))))
                }
                None => None,
            },
            Event::Mouse(mouse::Event::CursorLeft) if state.hovering => {
                state.hovering = false;
                Some(canvas::Action::publish(M::from(ChartEvent::Left(binding))))
            }
            Event::Window(window::Event::RedrawRequested(_)) => {
                let revision = self.renderer.revision();
                if state.last_cache_rev != revision {
                    state.cache.clear();
                    state.last_cache_rev = revision;
                }
                None
            }
            _ => None,
        }
    }

    fn draw(
        &self,
        state: &Self::State,
        renderer: &Renderer,
        theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<canvas::Geometry<Renderer>> {
        let Some(scene) = self.renderer.scene(bounds.size()) else {
            return vec![];
        };

        let colors = ChartColors::from_theme(theme);

        let chart = state.cache.draw(renderer, bounds.size(), |frame| {
            fill_static(frame, &scene, &colors);
            fill_series(frame, &scene, &colors);
            fill_hover(frame, &scene, &colors);
        });

        vec![chart]
    }

    fn mouse_interaction(
        &self,
        _state: &Self::State,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> mouse::Interaction {
        let over_plot = cursor.position_in(bounds).is_some_and(|p| {
            self.renderer
                .scene(bounds.size())
                .is_some_and(|scene| scene.geometry.index_at(p.x).is_some())
        });

        if over_plot && !self.renderer.is_animating() {
            mouse::Interaction::Crosshair
        } else {
            mouse::Interaction::default()
        }
    }
}

fn tone_color(colors: &ChartColors, tone: Tone) -> Color {
    match tone {
        Tone::Warmer => colors.warmer,
        Tone::Cooler => colors.cooler,
        Tone::Same => colors.same,
    }
}

fn series_color(colors: &ChartColors, series: Series) -> Color {
    match series {
        Series::ThisPeriod => colors.this_period,
        Series::Reference => colors.reference_period,
    }
}

fn vertical_line(x: f32, top: f32, bottom: f32) -> Path {
    Path::line(Point::new(x, top), Point::new(x, bottom))
}

fn fill_static(frame: &mut canvas::Frame, scene: &Scene, colors: &ChartColors) {
    let geometry = &scene.geometry;
    let padding = geometry.padding();

    for line in &scene.grid {
        frame.stroke(
            &Path::line(
                Point::new(padding.left, line.y),
                Point::new(geometry.plot_right(), line.y),
            ),
            Stroke::default().with_color(colors.grid).with_width(0.5),
        );
        frame.fill_text(Text {
            content: line.label.clone(),
            position: Point::new(padding.left - 5.0, line.y),
            color: colors.label,
            size: TEXT_SIZE.into(),
            align_x: iced::Alignment::End.into(),
            align_y: iced::Alignment::Center.into(),
            ..Default::default()
        });
    }

    for tick in &scene.date_ticks {
        frame.fill_text(Text {
            content: tick.label.clone(),
            position: Point::new(tick.x, geometry.plot_bottom() + LABEL_OFFSET),
            color: colors.label,
            size: TEXT_SIZE.into(),
            align_x: iced::Alignment::Center.into(),
            align_y: iced::Alignment::Start.into(),
            ..Default::default()
        });
    }

    if let Some(today) = scene.today {
        let color = tone_color(colors, today.tone);

        frame.stroke(
            &vertical_line(today.x, padding.top, geometry.plot_bottom()),
            Stroke {
                line_dash: LineDash {
                    segments: TODAY_DASH,
                    offset: 0,
                },
                ..Stroke::default().with_color(color).with_width(0.5)
            },
        );
        frame.fill_text(Text {
            content: "Today".to_string(),
            position: Point::new(today.x, padding.top - 4.0),
            color,
            size: SMALL_TEXT_SIZE.into(),
            align_x: iced::Alignment::Center.into(),
            align_y: iced::Alignment::End.into(),
            ..Default::default()
        });
    }
}

fn fill_polyline(
    frame: &mut canvas::Frame,
    vertices: &[Point],
    markers: &[(usize, Point)],
    color: Color,
    dash: &'static [f32],
) {
    if let Some((first, rest)) = vertices.split_first()
        && !rest.is_empty()
    {
        let path = Path::new(|builder| {
            builder.move_to(*first);
            for vertex in rest {
                builder.line_to(*vertex);
            }
        });

        frame.stroke(
            &path,
            Stroke {
                line_dash: LineDash {
                    segments: dash,
                    offset: 0,
                },
                ..Stroke::default()
                    .with_color(color)
                    .with_width(LINE_WIDTH)
                    .with_line_cap(LineCap::Round)
                    .with_line_join(LineJoin::Round)
            },
        );
    }

    for (_, point) in markers {
        frame.fill(&Path::circle(*point, MARKER_RADIUS), color);
    }
}

fn fill_series(frame: &mut canvas::Frame, scene: &Scene, colors: &ChartColors) {
    fill_polyline(
        frame,
        &scene.reference.vertices,
        &scene.reference.markers,
        colors.reference_period,
        REFERENCE_DASH,
    );
    fill_polyline(
        frame,
        &scene.this_period.vertices,
        &scene.this_period.markers,
        colors.this_period,
        &[],
    );

    let faded = colors.this_period.scale_alpha(FORECAST_ALPHA);
    for point in &scene.forecast {
        frame.fill(&Path::circle(*point, MARKER_RADIUS), faded);
    }
}

fn fill_hover(frame: &mut canvas::Frame, scene: &Scene, colors: &ChartColors) {
    let Some(hover) = &scene.hover else {
        return;
    };
    let geometry = &scene.geometry;

    frame.stroke(
        &vertical_line(hover.x, geometry.padding().top, geometry.plot_bottom()),
        Stroke::default().with_color(colors.fill).with_width(1.0),
    );

    frame.fill_text(Text {
        content: hover.date_label.clone(),
        position: Point::new(hover.x, geometry.plot_bottom() + LABEL_OFFSET),
        color: colors.text,
        size: TEXT_SIZE.into(),
        font: iced::Font {
            weight: iced::font::Weight::Semibold,
            ..Default::default()
        },
        align_x: iced::Alignment::Center.into(),
        align_y: iced::Alignment::Start.into(),
        ..Default::default()
    });

    for callout in &hover.callouts {
        fill_callout(frame, callout, colors);
    }
}

fn fill_callout(frame: &mut canvas::Frame, callout: &Callout, colors: &ChartColors) {
    let color = series_color(colors, callout.series);

    frame.fill(&Path::circle(callout.point, HOVER_MARKER_RADIUS), color);

    let pill = callout.pill;
    frame.fill(
        &Path::rounded_rectangle(
            Point::new(pill.x, pill.y),
            pill.size(),
            PILL_RADIUS.into(),
        ),
        color,
    );

    frame.fill_text(Text {
        content: callout.label.clone(),
        position: Point::new(pill.x + PILL_PADDING, callout.point.y),
        color: colors.pill_text(color),
        size: TEXT_SIZE.into(),
        font: iced::Font {
            weight: iced::font::Weight::Semibold,
            ..Default::default()
        },
        align_x: iced::Alignment::Start.into(),
        align_y: iced::Alignment::Center.into(),
        ..Default::default()
    });
}
