use crate::style;
use data::chart::Tone;
use data::sidebar::WIDTH_PRESETS;
use data::{City, CityStore};
use provider::{CitySummary, GeoCity, Location, wmo};

use iced::{
    Alignment, Element, Length, Task,
    widget::{button, column, container, pick_list, row, scrollable, space, text, text_input},
};

const PRESET_LABELS: [&str; 3] = ["S", "M", "L"];

#[derive(Debug, Clone)]
pub enum Message {
    SearchChanged(String),
    SearchSubmitted,
    SearchResults(String, Result<Vec<GeoCity>, String>),
    SuggestionPicked(GeoCity),
    CitySelected(String),
    MoveUp(usize),
    MoveDown(usize),
    RemoveCity(String),
    SummaryFetched(String, Result<CitySummary, String>),
    ToggleCollapsed,
    WidthSelected(f32),
    ThemeSelected(data::Theme),
    DataFolderRequested,
}

pub enum Action {
    /// The city the dashboard shows changed, `None` once the list is empty.
    SelectionChanged(Option<City>),
    /// The sidebar width changed, so the chart must be laid out again.
    Resized,
    ThemeSelected(data::Theme),
    DataFolderRequested,
    ErrorOccurred(String),
}

pub struct Sidebar {
    pub state: data::Sidebar,
    cities: CityStore,
    query: String,
    suggestions: Vec<GeoCity>,
    /// Last query sent to the geocoder, cleared once its results arrive.
    in_flight: Option<String>,
}

impl Sidebar {
    pub fn new(state: data::Sidebar, cities: CityStore) -> Self {
        Self {
            state,
            cities,
            query: String::new(),
            suggestions: vec![],
            in_flight: None,
        }
    }

    pub fn cities(&self) -> &CityStore {
        &self.cities
    }

    pub fn selected(&self) -> Option<&City> {
        self.cities.selected()
    }

    /// Badge figures for a city, stored when the dashboard finished its full load.
    pub fn set_summary(&mut self, location: Location, summary: CitySummary) {
        self.cities.update_summary(&location.id(), summary);
    }

    /// Refetches the badge figures of every tracked city.
    pub fn refresh_summaries(&self) -> Task<Message> {
        Task::batch(
            self.cities
                .cities()
                .iter()
                .map(|city| fetch_summary(city.id(), city.location())),
        )
    }

    pub fn update(&mut self, message: Message) -> (Task<Message>, Option<Action>) {
        match message {
            Message::SearchChanged(query) => {
                if query.trim().is_empty() {
                    self.suggestions.clear();
                }
                self.query = query;
            }
            Message::SearchSubmitted => {
                let query = self.query.trim().to_string();
                if query.is_empty() {
                    return (Task::none(), None);
                }

                self.in_flight = Some(query.clone());
                return (
                    Task::perform(provider::search_cities(query.clone()), move |result| {
                        Message::SearchResults(query, result.map_err(|err| err.to_string()))
                    }),
                    None,
                );
            }
            Message::SearchResults(query, result) => {
                if self.in_flight.as_deref() == Some(query.as_str()) {
                    self.in_flight = None;
                }
                if query != self.query.trim() {
                    log::debug!("Dropping results for outdated search {query:?}");
                    return (Task::none(), None);
                }

                match result {
                    Ok(cities) => self.suggestions = cities,
                    Err(err) => {
                        log::warn!("City search for {query:?} failed: {err}");
                        self.suggestions.clear();
                        return (
                            Task::none(),
                            Some(Action::ErrorOccurred(
                                "City search failed, try again later.".to_string(),
                            )),
                        );
                    }
                }
            }
            Message::SuggestionPicked(geo) => {
                let city = City::from(geo);
                let location = city.location();
                let id = self.cities.add(city);
                self.cities.select(&id);

                self.query.clear();
                self.suggestions.clear();

                return (
                    fetch_summary(id, location),
                    Some(Action::SelectionChanged(self.cities.selected().cloned())),
                );
            }
            Message::CitySelected(id) => {
                let previous = self.cities.selected_id();
                if self.cities.select(&id) && previous.as_deref() != Some(id.as_str()) {
                    return (
                        Task::none(),
                        Some(Action::SelectionChanged(self.cities.selected().cloned())),
                    );
                }
            }
            Message::MoveUp(index) => {
                if let Some(to) = index.checked_sub(1) {
                    self.cities.reorder(index, to);
                }
            }
            Message::MoveDown(index) => {
                self.cities.reorder(index, index + 1);
            }
            Message::RemoveCity(id) => {
                let previous = self.cities.selected_id();
                if self.cities.remove(&id).is_some() && self.cities.selected_id() != previous {
                    return (
                        Task::none(),
                        Some(Action::SelectionChanged(self.cities.selected().cloned())),
                    );
                }
            }
            Message::SummaryFetched(id, result) => match result {
                Ok(summary) => self.cities.update_summary(&id, summary),
                Err(err) => log::debug!("Badge refresh for {id} failed: {err}"),
            },
            Message::ToggleCollapsed => {
                self.state.toggle_collapsed();
                return (Task::none(), Some(Action::Resized));
            }
            Message::WidthSelected(width) => {
                self.state.set_width(width);
                return (Task::none(), Some(Action::Resized));
            }
            Message::ThemeSelected(theme) => {
                return (Task::none(), Some(Action::ThemeSelected(theme)));
            }
            Message::DataFolderRequested => {
                return (Task::none(), Some(Action::DataFolderRequested));
            }
        }

        (Task::none(), None)
    }

    pub fn view(&self, theme: &data::Theme) -> Element<'_, Message> {
        let collapse_button = button(text(if self.state.collapsed { "»" } else { "«" }))
            .on_press(Message::ToggleCollapsed)
            .style(|theme, status| style::button::transparent(theme, status, false));

        let content = if self.state.collapsed {
            column![collapse_button].align_x(Alignment::Center)
        } else {
            let header = row![
                text("Cities").size(16),
                space::horizontal(),
                collapse_button
            ]
            .align_y(Alignment::Center);

            column![
                header,
                self.search_view(),
                scrollable(self.city_list()).height(Length::Fill),
                self.settings_view(theme),
            ]
            .spacing(12)
        };

        container(content.padding(8))
            .width(self.state.effective_width())
            .height(Length::Fill)
            .style(style::sidebar)
            .into()
    }

    fn search_view(&self) -> Element<'_, Message> {
        let input = text_input("Search a city...", &self.query)
            .on_input(Message::SearchChanged)
            .on_submit(Message::SearchSubmitted)
            .padding(6);

        let mut content = column![input].spacing(4);

        if self.in_flight.is_some() {
            content = content.push(text("Searching...").size(11).style(style::muted_text));
        }

        for geo in &self.suggestions {
            content = content.push(
                button(text(geo.display_name()).size(12))
                    .width(Length::Fill)
                    .on_press(Message::SuggestionPicked(geo.clone()))
                    .style(|theme, status| style::button::transparent(theme, status, false)),
            );
        }

        content.into()
    }

    fn city_list(&self) -> Element<'_, Message> {
        if self.cities.is_empty() {
            return text("No cities yet").style(style::muted_text).into();
        }

        let selected = self.cities.selected_id();
        let last = self.cities.len() - 1;

        let rows = self.cities.cities().iter().enumerate().map(|(index, city)| {
            let id = city.id();
            let is_selected = selected.as_deref() == Some(id.as_str());

            let label = button(
                row![
                    text(city.name.as_str()).size(13),
                    space::horizontal(),
                    summary_badge(city.summary)
                ]
                .align_y(Alignment::Center)
                .spacing(4),
            )
            .width(Length::Fill)
            .on_press(Message::CitySelected(id.clone()))
            .style(move |theme, status| style::button::transparent(theme, status, is_selected));

            let small = |label: &'static str, message: Option<Message>| {
                button(text(label).size(11))
                    .padding([2, 4])
                    .on_press_maybe(message)
                    .style(|theme, status| style::button::transparent(theme, status, false))
            };

            row![
                label,
                small("↑", (index > 0).then_some(Message::MoveUp(index))),
                small("↓", (index < last).then_some(Message::MoveDown(index))),
                button(text("×").size(11))
                    .padding([2, 4])
                    .on_press(Message::RemoveCity(id))
                    .style(style::button::danger),
            ]
            .spacing(2)
            .align_y(Alignment::Center)
            .into()
        });

        column(rows).spacing(4).into()
    }

    fn settings_view(&self, theme: &data::Theme) -> Element<'_, Message> {
        let presets = WIDTH_PRESETS.iter().zip(PRESET_LABELS).map(|(&width, label)| {
            let is_active = self.state.width == width;
            button(text(label).size(11))
                .padding([2, 8])
                .on_press(Message::WidthSelected(width))
                .style(move |theme, status| style::button::transparent(theme, status, is_active))
                .into()
        });

        let width_row = row![text("Width").size(12), space::horizontal()]
            .extend(presets)
            .spacing(4)
            .align_y(Alignment::Center);

        let themes = pick_list(
            data::Theme::available(),
            Some(theme.clone()),
            Message::ThemeSelected,
        )
        .text_size(12)
        .width(Length::Fill);

        column![
            width_row,
            themes,
            button(text("Open data folder").size(12))
                .width(Length::Fill)
                .on_press(Message::DataFolderRequested)
                .style(|theme, status| style::button::transparent(theme, status, false)),
        ]
        .spacing(8)
        .into()
    }
}

fn fetch_summary(id: String, location: Location) -> Task<Message> {
    Task::perform(provider::fetch_city_summary(location), move |result| {
        Message::SummaryFetched(id, result.map_err(|err| err.to_string()))
    })
}

fn summary_badge<'a>(summary: Option<CitySummary>) -> Element<'a, Message> {
    let Some(summary) = summary else {
        return space::horizontal().width(0).into();
    };

    let icon = summary.weather_code.map(wmo::icon).unwrap_or(' ');
    let tone = Tone::from_delta(summary.temp_diff);

    row![
        text(format!("{icon} {}°", summary.current_temp)).size(12),
        text(format!("{:+.1}", summary.temp_diff))
            .size(10)
            .style(move |theme| style::tone_text(theme, tone)),
    ]
    .spacing(4)
    .align_y(Alignment::Center)
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geo(name: &str, latitude: f64, longitude: f64) -> GeoCity {
        GeoCity {
            name: name.to_string(),
            country: Some("Somewhere".to_string()),
            admin1: None,
            latitude,
            longitude,
        }
    }

    #[test]
    fn picking_a_suggestion_selects_it() {
        let mut sidebar = Sidebar::new(data::Sidebar::default(), CityStore::default());
        sidebar.query = "ber".to_string();

        let (_, action) = sidebar.update(Message::SuggestionPicked(geo("Berlin", 52.52, 13.41)));

        match action {
            Some(Action::SelectionChanged(Some(city))) => assert_eq!(city.name, "Berlin"),
            _ => panic!("expected a selection change"),
        }
        assert!(sidebar.query.is_empty());
        assert_eq!(sidebar.cities().len(), 1);
    }

    #[test]
    fn removing_selected_city_moves_selection() {
        let mut sidebar = Sidebar::new(data::Sidebar::default(), CityStore::default());
        let _ = sidebar.update(Message::SuggestionPicked(geo("Berlin", 52.52, 13.41)));
        let _ = sidebar.update(Message::SuggestionPicked(geo("Oslo", 59.91, 10.75)));
        let _ = sidebar.update(Message::SuggestionPicked(geo("Paris", 48.85, 2.35)));
        let oslo = sidebar.cities().cities()[1].id();
        let _ = sidebar.update(Message::CitySelected(oslo.clone()));

        let (_, action) = sidebar.update(Message::RemoveCity(oslo));

        match action {
            Some(Action::SelectionChanged(Some(city))) => assert_eq!(city.name, "Berlin"),
            _ => panic!("expected Berlin to become selected"),
        }

        let paris = sidebar.cities().cities()[1].id();
        let (_, action) = sidebar.update(Message::RemoveCity(paris));
        assert!(action.is_none());

        let berlin = sidebar.selected().map(City::id).unwrap();
        let (_, action) = sidebar.update(Message::RemoveCity(berlin));
        assert!(matches!(action, Some(Action::SelectionChanged(None))));
    }

    #[test]
    fn searching_indicator_clears_when_input_moved_on() {
        let mut sidebar = Sidebar::new(data::Sidebar::default(), CityStore::default());

        let _ = sidebar.update(Message::SearchChanged("par".to_string()));
        let _ = sidebar.update(Message::SearchSubmitted);
        assert!(sidebar.in_flight.is_some());

        let _ = sidebar.update(Message::SearchChanged("pari".to_string()));
        let _ = sidebar.update(Message::SearchResults("par".to_string(), Ok(vec![])));

        assert!(sidebar.in_flight.is_none());
        assert!(sidebar.suggestions.is_empty());
    }

    #[test]
    fn older_results_keep_newer_search_pending() {
        let mut sidebar = Sidebar::new(data::Sidebar::default(), CityStore::default());

        let _ = sidebar.update(Message::SearchChanged("par".to_string()));
        let _ = sidebar.update(Message::SearchSubmitted);
        let _ = sidebar.update(Message::SearchChanged("paris".to_string()));
        let _ = sidebar.update(Message::SearchSubmitted);

        let _ = sidebar.update(Message::SearchResults(
            "par".to_string(),
            Ok(vec![geo("Parma", 44.8, 10.33)]),
        ));
        assert_eq!(sidebar.in_flight.as_deref(), Some("paris"));
        assert!(sidebar.suggestions.is_empty());

        let _ = sidebar.update(Message::SearchResults(
            "paris".to_string(),
            Ok(vec![geo("Paris", 48.85, 2.35)]),
        ));
        assert!(sidebar.in_flight.is_none());
        assert_eq!(sidebar.suggestions.len(), 1);
    }

    #[test]
    fn outdated_search_results_are_ignored() {
        let mut sidebar = Sidebar::new(data::Sidebar::default(), CityStore::default());
        sidebar.query = "paris".to_string();

        let _ = sidebar.update(Message::SearchResults(
            "par".to_string(),
            Ok(vec![geo("Parma", 44.8, 10.33)]),
        ));
        assert!(sidebar.suggestions.is_empty());

        let _ = sidebar.update(Message::SearchResults(
            "paris".to_string(),
            Ok(vec![geo("Paris", 48.85, 2.35)]),
        ));
        assert_eq!(sidebar.suggestions.len(), 1);
    }

    #[test]
    fn width_presets_resize_the_layout() {
        let mut sidebar = Sidebar::new(data::Sidebar::default(), CityStore::default());

        let (_, action) = sidebar.update(Message::WidthSelected(WIDTH_PRESETS[2]));
        assert!(matches!(action, Some(Action::Resized)));
        assert_eq!(sidebar.state.effective_width(), WIDTH_PRESETS[2]);

        let _ = sidebar.update(Message::ToggleCollapsed);
        assert_eq!(sidebar.state.effective_width(), data::sidebar::COLLAPSED_WIDTH);
    }
}
