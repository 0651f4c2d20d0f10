//! Application state for a front end, and the controller that feeds it.
//!
//! [`AppState`] is owned by the UI loop and is the only thing presentation
//! code reads. [`Controller`] turns user intents into background fetches whose
//! results are applied through [`AppState::apply_current`] and friends.

use std::sync::Arc;

use chrono::{Local, Timelike};

use crate::{
    error::{FavoritesError, FetchError, QueryError},
    favorites::FavoritesStore,
    geolocation::GeoLocator,
    history::SearchHistory,
    model::{
        CurrentWeather, CurrentWeatherResult, ForecastDay, ForecastResult, GeoLocation,
        LocationQuery, Units,
    },
    provider::WeatherProvider,
    runner::UiHandle,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Page {
    Home,
    Loading,
    Today,
    Forecast,
    History,
    Favorites,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    /// Light during the day (07:00 to 18:59), dark otherwise.
    pub fn for_hour(hour: u32) -> Self {
        if (7..19).contains(&hour) {
            Theme::Light
        } else {
            Theme::Dark
        }
    }

    pub fn for_now() -> Self {
        Self::for_hour(Local::now().hour())
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

/// `Idle -> Loading -> (Rendered | Errored)` for one kind of fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchState<T> {
    Idle,
    Loading,
    Rendered(T),
    Errored(FetchError),
}

impl<T> FetchState<T> {
    fn from_result(result: Result<T, FetchError>) -> Self {
        match result {
            Ok(value) => FetchState::Rendered(value),
            Err(err) => FetchState::Errored(err),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, FetchState::Loading)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchKind {
    Current,
    Forecast,
}

/// Identifies one submission. Only the newest ticket of a kind may update that
/// kind's result, and only the newest ticket overall may switch the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FetchTicket {
    pub kind: FetchKind,
    pub generation: u64,
    /// Units the request was made with.
    pub units: Units,
}

/// Forecast days labelled with the units they were fetched in.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyForecast {
    pub units: Units,
    pub days: Vec<ForecastDay>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// One-shot message for the user (the GUI's message box).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub message: String,
}

impl Notice {
    fn info(title: &str, message: String) -> Self {
        Self {
            level: NoticeLevel::Info,
            title: title.to_string(),
            message,
        }
    }

    fn error(title: &str, message: String) -> Self {
        Self {
            level: NoticeLevel::Error,
            title: title.to_string(),
            message,
        }
    }
}

/// Contents of the search form.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QueryForm {
    pub city: String,
    pub country: String,
    pub units: Units,
}

impl QueryForm {
    pub fn to_query(&self) -> Result<LocationQuery, QueryError> {
        LocationQuery::new(&self.city, Some(self.country.as_str()), self.units)
    }
}

#[derive(Debug)]
pub struct AppState {
    pub page: Page,
    pub theme: Theme,
    pub form: QueryForm,
    current: FetchState<CurrentWeather>,
    forecast: FetchState<DailyForecast>,
    history: SearchHistory,
    favorites: FavoritesStore,
    notice: Option<Notice>,
    latest_generation: u64,
    latest_current: u64,
    latest_forecast: u64,
    locating: bool,
}

impl AppState {
    pub fn new(favorites: FavoritesStore, history: SearchHistory, theme: Theme) -> Self {
        Self {
            page: Page::Home,
            theme,
            form: QueryForm::default(),
            current: FetchState::Idle,
            forecast: FetchState::Idle,
            history,
            favorites,
            notice: None,
            latest_generation: 0,
            latest_current: 0,
            latest_forecast: 0,
            locating: false,
        }
    }

    pub fn current(&self) -> &FetchState<CurrentWeather> {
        &self.current
    }

    pub fn forecast(&self) -> &FetchState<DailyForecast> {
        &self.forecast
    }

    pub fn history(&self) -> &SearchHistory {
        &self.history
    }

    pub fn favorites(&self) -> &FavoritesStore {
        &self.favorites
    }

    pub fn is_locating(&self) -> bool {
        self.locating
    }

    pub fn take_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }

    pub fn show(&mut self, page: Page) {
        self.page = page;
    }

    /// Switch theme and return to the home page.
    pub fn toggle_theme(&mut self) {
        self.theme = self.theme.toggled();
        self.page = Page::Home;
    }

    fn issue(&mut self, kind: FetchKind, units: Units) -> FetchTicket {
        self.latest_generation += 1;
        match kind {
            FetchKind::Current => self.latest_current = self.latest_generation,
            FetchKind::Forecast => self.latest_forecast = self.latest_generation,
        }
        FetchTicket {
            kind,
            generation: self.latest_generation,
            units,
        }
    }

    fn is_latest_of_kind(&self, ticket: FetchTicket) -> bool {
        let latest = match ticket.kind {
            FetchKind::Current => self.latest_current,
            FetchKind::Forecast => self.latest_forecast,
        };
        ticket.generation == latest
    }

    fn owns_page(&self, ticket: FetchTicket) -> bool {
        ticket.generation == self.latest_generation
    }

    fn reject(&mut self, err: QueryError) -> QueryError {
        self.notice = Some(Notice::error("Missing Input", err.to_string()));
        err
    }

    /// Validate the form and enter `Loading` for a current-weather fetch.
    pub fn begin_current(&mut self) -> Result<(FetchTicket, LocationQuery), QueryError> {
        let query = self.form.to_query().map_err(|e| self.reject(e))?;
        let ticket = self.issue(FetchKind::Current, query.units());
        self.current = FetchState::Loading;
        self.page = Page::Loading;
        tracing::debug!(
            generation = ticket.generation,
            location = %query.composite_location(),
            "current weather requested"
        );
        Ok((ticket, query))
    }

    /// Validate the form and enter `Loading` for a forecast fetch.
    pub fn begin_forecast(&mut self) -> Result<(FetchTicket, LocationQuery), QueryError> {
        let query = self.form.to_query().map_err(|e| self.reject(e))?;
        let ticket = self.issue(FetchKind::Forecast, query.units());
        self.forecast = FetchState::Loading;
        self.page = Page::Loading;
        tracing::debug!(
            generation = ticket.generation,
            location = %query.composite_location(),
            "forecast requested"
        );
        Ok((ticket, query))
    }

    /// Returns `false` and leaves the state alone when a newer current-weather
    /// submission exists.
    pub fn apply_current(&mut self, ticket: FetchTicket, result: CurrentWeatherResult) -> bool {
        if !self.is_latest_of_kind(ticket) {
            tracing::debug!(
                generation = ticket.generation,
                latest = self.latest_current,
                "discarding stale current weather"
            );
            return false;
        }

        if let Ok(weather) = &result {
            self.history.record(weather.city_label());
        }

        self.current = FetchState::from_result(result);
        if self.owns_page(ticket) {
            self.page = Page::Today;
        }
        true
    }

    pub fn apply_forecast(&mut self, ticket: FetchTicket, result: ForecastResult) -> bool {
        if !self.is_latest_of_kind(ticket) {
            tracing::debug!(
                generation = ticket.generation,
                latest = self.latest_forecast,
                "discarding stale forecast"
            );
            return false;
        }

        self.forecast = FetchState::from_result(result.map(|days| DailyForecast {
            units: ticket.units,
            days,
        }));
        if self.owns_page(ticket) {
            self.page = Page::Forecast;
        }
        true
    }

    /// Prefill the form from a geolocation lookup. Errors become a notice.
    pub fn apply_location(&mut self, result: Result<GeoLocation, FetchError>) {
        self.locating = false;
        match result {
            Ok(location) => {
                if !location.city.is_empty() {
                    self.form.city = location.city;
                }
                if !location.country.is_empty() {
                    self.form.country = location.country;
                }
            }
            Err(err) => {
                self.notice = Some(Notice::error("Location Error", err.to_string()));
            }
        }
    }

    /// Put `label` in the city field (country is kept) and start a search.
    pub fn begin_search_from(&mut self, label: &str) -> Result<(FetchTicket, LocationQuery), QueryError> {
        self.form.city = label.to_string();
        self.begin_current()
    }

    /// Save the city currently in the form. Duplicates only produce a notice.
    pub fn save_current_favorite(&mut self) -> Result<bool, FavoritesError> {
        let city = self.form.city.trim().to_string();
        if city.is_empty() {
            return Ok(false);
        }

        let added = self.favorites.add(&city)?;
        self.notice = Some(if added {
            Notice::info("Saved", format!("'{city}' added to favorites."))
        } else {
            Notice::info("Info", format!("'{city}' is already in favorites."))
        });
        Ok(added)
    }

    pub fn remove_favorite(&mut self, label: &str) -> Result<bool, FavoritesError> {
        let removed = self.favorites.remove(label)?;
        if removed {
            self.page = Page::Favorites;
        }
        Ok(removed)
    }
}

/// Dispatches fetches for an [`AppState`] living on the UI loop.
#[derive(Debug, Clone)]
pub struct Controller {
    provider: Arc<dyn WeatherProvider>,
    locator: GeoLocator,
    ui: UiHandle<AppState>,
}

impl Controller {
    pub fn new(provider: Arc<dyn WeatherProvider>, locator: GeoLocator, ui: UiHandle<AppState>) -> Self {
        Self { provider, locator, ui }
    }

    pub fn search(&self, state: &mut AppState) -> Result<FetchTicket, QueryError> {
        let (ticket, query) = state.begin_current()?;
        self.spawn_current(ticket, query);
        Ok(ticket)
    }

    /// Search for a history or favorites entry.
    pub fn search_from(&self, state: &mut AppState, label: &str) -> Result<FetchTicket, QueryError> {
        let (ticket, query) = state.begin_search_from(label)?;
        self.spawn_current(ticket, query);
        Ok(ticket)
    }

    fn spawn_current(&self, ticket: FetchTicket, query: LocationQuery) {
        let provider = Arc::clone(&self.provider);

        self.ui.run_in_background(
            async move { provider.fetch_current(&query).await },
            move |state: &mut AppState, result| {
                state.apply_current(ticket, result);
            },
        );
    }

    pub fn forecast(&self, state: &mut AppState) -> Result<FetchTicket, QueryError> {
        let (ticket, query) = state.begin_forecast()?;
        let provider = Arc::clone(&self.provider);

        self.ui.run_in_background(
            async move { provider.fetch_forecast(&query).await },
            move |state: &mut AppState, result| {
                state.apply_forecast(ticket, result);
            },
        );
        Ok(ticket)
    }

    pub fn locate(&self, state: &mut AppState) {
        state.locating = true;
        let locator = self.locator.clone();

        self.ui.run_in_background(
            async move { locator.locate().await },
            |state: &mut AppState, result| state.apply_location(result),
        );
    }
}
