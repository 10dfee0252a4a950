use crate::style;
use crate::widget::chart::{ChartEvent, TemperatureChart};
use data::chart::navigation::Action as NavAction;
use data::chart::{ChartRenderer, Direction, FullLoadRequest, Navigator, SliceRequest, Tone};
use provider::{CitySummary, FullLoad, Location, MonthSlice, TodaySummary, wmo};

use iced::{
    Alignment, Element, Length, Subscription, Task,
    widget::{button, column, container, row, space, text},
    window,
};
use std::time::Instant;

#[derive(Debug, Clone)]
pub enum Message {
    Navigate(Direction),
    FullLoaded(FullLoadRequest, Result<FullLoad, String>),
    SliceFetched(SliceRequest, Result<MonthSlice, String>),
    Prefetched(SliceRequest, Result<MonthSlice, String>),
    Chart(ChartEvent),
    Frame(Instant),
}

impl From<ChartEvent> for Message {
    fn from(event: ChartEvent) -> Self {
        Message::Chart(event)
    }
}

pub enum Action {
    SummaryLoaded(Location, CitySummary),
    ErrorOccurred(String),
}

/// Cards and chart for the selected city.
#[derive(Default)]
pub struct Dashboard {
    city_name: Option<String>,
    summary: Option<TodaySummary>,
    navigator: Navigator,
    renderer: ChartRenderer,
}

impl Dashboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Switches to `location`, dropping every cached month of the previous one.
    pub fn load_city(&mut self, name: String, location: Location) -> Task<Message> {
        log::info!("Loading weather for {name} ({location})");

        let request = self.navigator.reset_for_location(location);
        self.renderer.clear();
        self.summary = None;
        self.city_name = Some(name);

        Task::perform(provider::fetch_full_load(location), move |result| {
            Message::FullLoaded(
                request,
                result.map_err(|err| err.to_user_message().to_string()),
            )
        })
    }

    /// Forgets the current city, e.g. after the last one was removed.
    pub fn unload(&mut self) {
        *self = Self::default();
    }

    pub fn location(&self) -> Option<Location> {
        self.navigator.location()
    }

    pub fn update(&mut self, message: Message) -> (Task<Message>, Option<Action>) {
        match message {
            Message::Navigate(direction) => match self.navigator.navigate(direction) {
                Some(NavAction::Show(slice)) => {
                    self.renderer.draw(slice, false, Instant::now());
                    return (self.prefetch(), None);
                }
                Some(NavAction::Fetch(request)) => {
                    return (fetch_slice(request, Message::SliceFetched), None);
                }
                None => {}
            },
            Message::FullLoaded(request, result) => {
                if !self.navigator.is_current_full_load(&request) {
                    log::debug!("Dropping superseded full load for {}", request.location);
                    return (Task::none(), None);
                }

                match result {
                    Ok(FullLoad {
                        summary,
                        default_slice,
                    }) => {
                        let Some(slice) = self
                            .navigator
                            .on_full_load(&request, Ok::<_, String>(default_slice))
                        else {
                            return (Task::none(), None);
                        };

                        let city_summary = CitySummary {
                            weather_code: summary.weather_code,
                            current_temp: summary.current_temp,
                            temp_diff: summary.delta,
                        };
                        self.summary = Some(summary);
                        self.renderer.draw(slice, true, Instant::now());

                        return (
                            self.prefetch(),
                            Some(Action::SummaryLoaded(request.location, city_summary)),
                        );
                    }
                    Err(err) => {
                        self.navigator
                            .on_full_load(&request, Err::<MonthSlice, _>(&err));
                        return (Task::none(), Some(Action::ErrorOccurred(err)));
                    }
                }
            }
            Message::SliceFetched(request, result) => {
                if let Some(slice) = self.navigator.on_slice_fetched(&request, result) {
                    self.renderer.draw(slice, false, Instant::now());
                    return (self.prefetch(), None);
                }
            }
            Message::Prefetched(request, result) => {
                self.navigator.on_prefetched(&request, result);
            }
            Message::Chart(ChartEvent::Hovered {
                binding,
                size,
                position,
            }) => {
                self.renderer.pointer_moved(binding, size, position);
            }
            Message::Chart(ChartEvent::Left(binding)) => {
                self.renderer.pointer_left(binding);
            }
            Message::Frame(now) => {
                self.renderer.tick(now);
            }
        }

        (Task::none(), None)
    }

    /// Repaints the chart against new bounds or colors without refetching.
    pub fn redraw(&mut self) {
        self.renderer.redraw();
    }

    pub fn subscription(&self) -> Subscription<Message> {
        if self.renderer.is_animating() {
            window::frames().map(Message::Frame)
        } else {
            Subscription::none()
        }
    }

    fn prefetch(&mut self) -> Task<Message> {
        Task::batch(
            self.navigator
                .prefetch_adjacent()
                .into_iter()
                .map(|request| fetch_slice(request, Message::Prefetched)),
        )
    }

    pub fn view(&self) -> Element<'_, Message> {
        let Some(name) = &self.city_name else {
            return container(
                text("Add a city from the sidebar to get started").style(style::muted_text),
            )
            .center(Length::Fill)
            .into();
        };

        let header = text(name.as_str()).size(20);

        let cards: Element<'_, Message> = match &self.summary {
            Some(summary) => row![today_card(summary), year_ago_card(summary)]
                .spacing(12)
                .into(),
            None if self.navigator.full_load().is_some() => {
                text("Loading weather...").style(style::muted_text).into()
            }
            None => space::vertical().height(0).into(),
        };

        column![header, cards, self.chart_card()]
            .spacing(16)
            .padding(16)
            .width(Length::Fill)
            .into()
    }

    fn chart_card(&self) -> Element<'_, Message> {
        let today = chrono::Local::now().date_naive();
        let navigator = &self.navigator;

        let nav_button = |label: &'static str, direction: Direction, enabled: bool| {
            button(text(label).align_x(Alignment::Center))
                .width(28)
                .on_press_maybe(enabled.then_some(Message::Navigate(direction)))
                .style(|theme, status| style::button::transparent(theme, status, false))
        };

        let status: Element<'_, Message> = if navigator.is_loading() {
            text("Loading...").size(11).style(style::muted_text).into()
        } else {
            space::horizontal().width(0).into()
        };

        let controls = row![
            text(navigator.label(today)).size(14),
            status,
            space::horizontal(),
            nav_button("‹", Direction::Back, navigator.can_go_back()),
            nav_button("›", Direction::Forward, navigator.can_go_forward()),
        ]
        .spacing(8)
        .align_y(Alignment::Center);

        container(column![controls, TemperatureChart::new(&self.renderer).view()].spacing(8))
            .padding(12)
            .width(Length::Fill)
            .style(style::card)
            .into()
    }
}

fn fetch_slice(
    request: SliceRequest,
    on_done: fn(SliceRequest, Result<MonthSlice, String>) -> Message,
) -> Task<Message> {
    let today = chrono::Local::now().date_naive();

    Task::perform(
        provider::fetch_month_slice(request.location, request.offset, today),
        move |result| on_done(request, result.map_err(|err| err.to_string())),
    )
}

fn weather_line<'a>(code: Option<u8>) -> Element<'a, Message> {
    match code {
        Some(code) => text(format!("{} {}", wmo::icon(code), wmo::description(code))).into(),
        None => text("No conditions reported").style(style::muted_text).into(),
    }
}

fn today_card<'a>(summary: &TodaySummary) -> Element<'a, Message> {
    let max = match summary.today_max {
        Some(max) => format!("High {max}°"),
        None => "High unavailable".to_string(),
    };

    let tone = Tone::from_delta(summary.delta);

    container(
        column![
            text("Today").size(12).style(style::muted_text),
            text(format!("{}°", summary.current_temp)).size(32),
            weather_line(summary.weather_code),
            row![
                text(max).size(12),
                space::horizontal(),
                diff_badge(summary.delta, tone)
            ]
            .align_y(Alignment::Center),
        ]
        .spacing(4),
    )
    .padding(12)
    .width(Length::FillPortion(1))
    .style(style::card)
    .into()
}

fn year_ago_card<'a>(summary: &TodaySummary) -> Element<'a, Message> {
    let temp = match summary.year_ago_temp {
        Some(temp) => format!("{temp}°"),
        None => "--".to_string(),
    };

    container(
        column![
            text("One year ago").size(12).style(style::muted_text),
            text(temp).size(32),
            weather_line(summary.year_ago_code),
        ]
        .spacing(4),
    )
    .padding(12)
    .width(Length::FillPortion(1))
    .style(style::card)
    .into()
}

pub fn diff_label(delta: f32) -> String {
    match Tone::from_delta(delta) {
        Tone::Warmer => format!("↑ {:.1}° warmer", delta.abs()),
        Tone::Cooler => format!("↓ {:.1}° cooler", delta.abs()),
        Tone::Same => "↔ same".to_string(),
    }
}

fn diff_badge<'a>(delta: f32, tone: Tone) -> Element<'a, Message> {
    container(text(diff_label(delta)).size(11))
        .padding([2, 8])
        .style(move |theme| style::badge(theme, tone))
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn paris() -> Location {
        Location::new(48.85, 2.35)
    }

    fn slice_for(offset: i32) -> MonthSlice {
        let start = NaiveDate::from_ymd_opt(2025, 4, 1).unwrap();
        let dates = start.iter_days().take(3).collect();
        MonthSlice::new(
            dates,
            vec![Some(offset as f32); 3],
            vec![Some(0.0); 3],
            (offset == 0).then_some(1),
            0.0,
        )
        .unwrap()
    }

    fn full_load(delta: f32) -> FullLoad {
        FullLoad {
            summary: TodaySummary {
                weather_code: Some(3),
                current_temp: 12,
                today_max: Some(14),
                year_ago_code: Some(1),
                year_ago_temp: Some(11),
                delta,
            },
            default_slice: slice_for(0),
        }
    }

    fn pending_request(dashboard: &Dashboard) -> FullLoadRequest {
        dashboard.navigator.full_load().cloned().unwrap()
    }

    fn shown_value(dashboard: &Dashboard) -> Option<Option<f32>> {
        dashboard
            .renderer
            .slice()
            .map(|slice| slice.this_period[0])
    }

    #[test]
    fn diff_label_follows_threshold() {
        assert_eq!(diff_label(1.24), "↑ 1.2° warmer");
        assert_eq!(diff_label(-2.0), "↓ 2.0° cooler");
        assert_eq!(diff_label(0.5), "↔ same");
        assert_eq!(diff_label(-0.3), "↔ same");
    }

    #[test]
    fn full_load_for_previous_city_is_dropped() {
        let mut dashboard = Dashboard::new();
        let _ = dashboard.load_city("Berlin".to_string(), Location::new(52.52, 13.41));
        let berlin = pending_request(&dashboard);
        let _ = dashboard.load_city("Paris".to_string(), paris());

        let (_, action) = dashboard.update(Message::FullLoaded(berlin, Ok(full_load(1.0))));
        assert!(action.is_none());
        assert!(dashboard.navigator.full_load().is_some());
        assert!(dashboard.renderer.slice().is_none());
    }

    #[test]
    fn full_load_failure_surfaces_error() {
        let mut dashboard = Dashboard::new();
        let _ = dashboard.load_city("Paris".to_string(), paris());
        let request = pending_request(&dashboard);

        let (_, action) = dashboard.update(Message::FullLoaded(
            request,
            Err("network down".to_string()),
        ));
        assert!(matches!(action, Some(Action::ErrorOccurred(msg)) if msg == "network down"));
        assert!(dashboard.navigator.full_load().is_none());
    }

    #[test]
    fn navigation_before_full_load_keeps_current_month() {
        let mut dashboard = Dashboard::new();
        let _ = dashboard.load_city("Paris".to_string(), paris());
        let request = pending_request(&dashboard);

        let _ = dashboard.update(Message::Navigate(Direction::Back));
        assert_eq!(dashboard.navigator.offset(), 0);
        assert!(!dashboard.navigator.is_loading());

        let (_, action) = dashboard.update(Message::FullLoaded(request, Ok(full_load(-1.2))));
        assert!(matches!(action, Some(Action::SummaryLoaded(..))));
        assert_eq!(dashboard.navigator.offset(), 0);
        assert_eq!(shown_value(&dashboard), Some(Some(0.0)));
        assert!(dashboard.renderer.is_animating());
    }

    #[test]
    fn reselected_city_draws_only_latest_full_load() {
        let mut dashboard = Dashboard::new();
        let _ = dashboard.load_city("Paris".to_string(), paris());
        let first = pending_request(&dashboard);
        let _ = dashboard.load_city("Paris".to_string(), paris());
        let second = pending_request(&dashboard);

        let (_, action) = dashboard.update(Message::FullLoaded(first, Ok(full_load(2.0))));
        assert!(action.is_none());
        assert!(dashboard.renderer.slice().is_none());
        assert!(dashboard.summary.is_none());

        let (_, action) = dashboard.update(Message::FullLoaded(second.clone(), Ok(full_load(0.0))));
        assert!(matches!(action, Some(Action::SummaryLoaded(..))));
        let revision = dashboard.renderer.revision();

        let (_, action) = dashboard.update(Message::FullLoaded(second, Ok(full_load(3.0))));
        assert!(action.is_none());
        assert_eq!(dashboard.renderer.revision(), revision);
        assert_eq!(dashboard.summary.map(|s| s.delta), Some(0.0));
    }

    #[test]
    fn back_navigation_fetches_once_current_month_is_loaded() {
        let mut dashboard = Dashboard::new();
        let _ = dashboard.load_city("Paris".to_string(), paris());
        let request = pending_request(&dashboard);
        let _ = dashboard.update(Message::FullLoaded(request, Ok(full_load(0.0))));

        let (_, action) = dashboard.update(Message::Navigate(Direction::Back));
        assert!(action.is_none());
        assert_eq!(dashboard.navigator.offset(), -1);
        assert!(dashboard.navigator.is_loading());
    }
}
