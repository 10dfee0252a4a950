#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod logger;
mod screen;
mod style;
mod widget;

use screen::dashboard::{self, Dashboard};
use screen::sidebar::{self, Sidebar};

use iced::{
    Alignment, Element, Length, Size, Subscription, Task,
    widget::{button, column, container, row, space, text},
    window,
};

fn main() {
    if let Err(err) = logger::setup(cfg!(debug_assertions)) {
        eprintln!("Failed to initialize logger: {err}");
    }

    std::panic::set_hook(Box::new(|info| {
        let location = info.location().map_or_else(
            || "unknown location".to_string(),
            |loc| format!("{}:{}:{}", loc.file(), loc.line(), loc.column()),
        );
        log::error!("PANIC at {location}: {info}");
    }));

    let _ = iced::application(Heatline::new, Heatline::update, Heatline::view)
        .settings(iced::Settings {
            antialiasing: true,
            default_text_size: iced::Pixels(13.0),
            ..Default::default()
        })
        .window(window::Settings {
            size: Size::new(1100.0, 720.0),
            min_size: Some(Size::new(720.0, 480.0)),
            exit_on_close_request: false,
            ..window::Settings::default()
        })
        .title(Heatline::title)
        .theme(Heatline::theme)
        .subscription(Heatline::subscription)
        .run();
}

struct Heatline {
    sidebar: Sidebar,
    dashboard: Dashboard,
    theme: data::Theme,
    error: Option<String>,
}

#[derive(Debug, Clone)]
enum Message {
    Sidebar(sidebar::Message),
    Dashboard(dashboard::Message),
    WindowResized,
    CloseRequested(window::Id),
    DismissError,
}

impl Heatline {
    fn new() -> (Self, Task<Message>) {
        let data::State {
            cities,
            selected_theme,
            sidebar,
        } = data::load_state();

        let sidebar = Sidebar::new(sidebar, cities);
        let mut dashboard = Dashboard::new();

        let initial_load = match sidebar.selected() {
            Some(city) => dashboard
                .load_city(city.display_name.clone(), city.location())
                .map(Message::Dashboard),
            None => Task::none(),
        };
        let refresh_badges = sidebar.refresh_summaries().map(Message::Sidebar);

        (
            Self {
                sidebar,
                dashboard,
                theme: selected_theme,
                error: None,
            },
            Task::batch([initial_load, refresh_badges]),
        )
    }

    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::Sidebar(msg) => {
                let (task, action) = self.sidebar.update(msg);

                let follow_up = match action {
                    Some(sidebar::Action::SelectionChanged(Some(city))) => {
                        let location = city.location();
                        self.dashboard
                            .load_city(city.display_name, location)
                            .map(Message::Dashboard)
                    }
                    Some(sidebar::Action::SelectionChanged(None)) => {
                        self.dashboard.unload();
                        Task::none()
                    }
                    Some(sidebar::Action::Resized) => {
                        self.dashboard.redraw();
                        Task::none()
                    }
                    Some(sidebar::Action::ThemeSelected(theme)) => {
                        self.theme = theme;
                        self.dashboard.redraw();
                        Task::none()
                    }
                    Some(sidebar::Action::DataFolderRequested) => {
                        if let Err(err) = data::open_data_folder() {
                            log::warn!("{err}");
                            self.error = Some(format!("Failed to open data folder: {err}"));
                        }
                        Task::none()
                    }
                    Some(sidebar::Action::ErrorOccurred(err)) => {
                        self.error = Some(err);
                        Task::none()
                    }
                    None => Task::none(),
                };

                Task::batch([task.map(Message::Sidebar), follow_up])
            }
            Message::Dashboard(msg) => {
                let (task, action) = self.dashboard.update(msg);

                match action {
                    Some(dashboard::Action::SummaryLoaded(location, summary)) => {
                        self.sidebar.set_summary(location, summary);
                        self.error = None;
                    }
                    Some(dashboard::Action::ErrorOccurred(err)) => {
                        self.error = Some(err);
                    }
                    None => {}
                }

                task.map(Message::Dashboard)
            }
            Message::WindowResized => {
                self.dashboard.redraw();
                Task::none()
            }
            Message::CloseRequested(window) => {
                log::info!("Close requested for window {window:?}");
                self.save_state_to_disk();
                iced::exit()
            }
            Message::DismissError => {
                self.error = None;
                Task::none()
            }
        }
    }

    fn save_state_to_disk(&self) {
        let state = data::State::from_parts(
            self.sidebar.cities().clone(),
            self.theme.clone(),
            self.sidebar.state,
        );

        if let Err(err) = data::save_state(&state) {
            log::error!("Failed to save state: {err}");
        }
    }

    fn view(&self) -> Element<'_, Message> {
        let mut content = column![].width(Length::Fill).height(Length::Fill);

        if let Some(err) = &self.error {
            let banner = container(
                row![
                    text(err.as_str()),
                    space::horizontal(),
                    button(text("×"))
                        .on_press(Message::DismissError)
                        .style(|theme, status| style::button::transparent(theme, status, false)),
                ]
                .align_y(Alignment::Center),
            )
            .padding([4, 12])
            .width(Length::Fill)
            .style(style::error_banner);

            content = content.push(banner);
        }

        content = content.push(self.dashboard.view().map(Message::Dashboard));

        row![self.sidebar.view(&self.theme).map(Message::Sidebar), content]
            .spacing(8)
            .padding(8)
            .into()
    }

    fn title(&self) -> String {
        match self.sidebar.selected() {
            Some(city) => format!("Heatline [{}]", city.name),
            None => "Heatline".to_string(),
        }
    }

    fn theme(&self) -> iced_core::Theme {
        self.theme.clone().into()
    }

    fn subscription(&self) -> Subscription<Message> {
        Subscription::batch([
            self.dashboard.subscription().map(Message::Dashboard),
            window::close_requests().map(Message::CloseRequested),
            window::resize_events().map(|_| Message::WindowResized),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use provider::{GeoCity, Location};

    fn app() -> Heatline {
        Heatline {
            sidebar: Sidebar::new(data::Sidebar::default(), data::CityStore::default()),
            dashboard: Dashboard::new(),
            theme: data::Theme::default(),
            error: None,
        }
    }

    fn berlin() -> GeoCity {
        GeoCity {
            name: "Berlin".to_string(),
            country: Some("Germany".to_string()),
            admin1: None,
            latitude: 52.52,
            longitude: 13.41,
        }
    }

    #[test]
    fn picked_city_is_loaded_on_the_dashboard() {
        let mut app = app();

        let _ = app.update(Message::Sidebar(sidebar::Message::SuggestionPicked(berlin())));

        let location = app.dashboard.location().expect("dashboard should be loading");
        assert!(location.same_place(&Location::new(52.52, 13.41)));
        assert_eq!(app.title(), "Heatline [Berlin]");
    }

    #[test]
    fn removing_last_city_unloads_the_dashboard() {
        let mut app = app();
        let _ = app.update(Message::Sidebar(sidebar::Message::SuggestionPicked(berlin())));

        let id = Location::new(52.52, 13.41).id();
        let _ = app.update(Message::Sidebar(sidebar::Message::RemoveCity(id)));

        assert!(app.dashboard.location().is_none());
        assert_eq!(app.title(), "Heatline");
    }
}
