//! The terminal front end: owns the app state and the UI loop.
//!
//! All state changes happen on this task. Fetches run in the background via
//! [`Controller`] and come back through [`UiLoop::run_next`].

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use weather_core::{
    AppState, Config, Controller, FetchState, GeoLocator, Page, SearchHistory, Theme, UiLoop,
    Units, app::NoticeLevel, provider::provider_from_config, ui_loop,
};

use crate::{cli::LocationArgs, render};

pub struct Session {
    state: AppState,
    ui: UiLoop<AppState>,
    controller: Controller,
}

/// One line typed into the interactive session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Search { city: String, country: Option<String> },
    Units(Units),
    Forecast,
    Save,
    Favorites,
    Remove(String),
    Open(String),
    History,
    Locate,
    Theme,
    Home,
    Animate,
    Help,
    Quit,
}

const HELP: &str = "\
Commands:
  search <city>[, <country>]   current weather (alias: s)
  forecast                     5-day forecast for the form's city (alias: f)
  units <metric|imperial>      change units for the next search
  save                         save the form's city to favorites
  favorites                    list favorites
  remove <city>                remove a favorite
  open <city>                  search a favorite or history entry
  history                      recent searches
  locate                       fill the form from your IP address
  animate                      play the current weather animation
  theme                        toggle light/dark
  home                         back to the form
  help, quit";

/// Parse a command line. Errors are messages meant for the user.
pub fn parse_input(line: &str) -> std::result::Result<Input, String> {
    let line = line.trim();
    let (cmd, rest) = line
        .split_once(char::is_whitespace)
        .map(|(c, r)| (c, r.trim()))
        .unwrap_or((line, ""));

    let require = |what: &str| {
        if rest.is_empty() {
            Err(format!("Usage: {cmd} <{what}>"))
        } else {
            Ok(rest.to_string())
        }
    };

    match cmd.to_lowercase().as_str() {
        "search" | "s" => {
            let text = require("city")?;
            let (city, country) = match text.split_once(',') {
                Some((city, country)) => (city.trim(), Some(country.trim())),
                None => (text.as_str(), None),
            };
            Ok(Input::Search {
                city: city.to_string(),
                country: country.filter(|c| !c.is_empty()).map(str::to_string),
            })
        }
        "units" | "u" => Units::try_from(require("metric|imperial")?.as_str())
            .map(Input::Units)
            .map_err(|e| e.to_string()),
        "forecast" | "f" => Ok(Input::Forecast),
        "save" => Ok(Input::Save),
        "favorites" | "favs" => Ok(Input::Favorites),
        "remove" | "rm" => require("city").map(Input::Remove),
        "open" | "o" => require("city").map(Input::Open),
        "history" | "h" => Ok(Input::History),
        "locate" => Ok(Input::Locate),
        "theme" => Ok(Input::Theme),
        "home" => Ok(Input::Home),
        "animate" => Ok(Input::Animate),
        "help" | "?" => Ok(Input::Help),
        "quit" | "exit" | "q" => Ok(Input::Quit),
        "" => Err(String::new()),
        other => Err(format!("Unknown command '{other}'. Type 'help' for a list.")),
    }
}

impl Session {
    pub fn from_config(config: &Config) -> Result<Self> {
        let provider = provider_from_config(config)?;
        let favorites = weather_core::FavoritesStore::load_or_default(&config.favorites_path);

        let mut state = AppState::new(
            favorites,
            SearchHistory::new(config.history_capacity),
            Theme::for_now(),
        );
        state.form.units = config.units;

        let (ui, handle) = ui_loop();
        let controller = Controller::new(provider, GeoLocator::new(&config.geolocation_url), handle);

        Ok(Self {
            state,
            ui,
            controller,
        })
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn fill_form(&mut self, location: &LocationArgs, default_units: Units) {
        self.state.form.city = location.city.clone();
        self.state.form.country = location.country.clone().unwrap_or_default();
        self.state.form.units = location.units.unwrap_or(default_units);
    }

    /// Fetch current weather for the form and wait for it to be applied.
    pub async fn search(&mut self) -> Result<()> {
        self.controller.search(&mut self.state)?;
        self.settle().await;
        Ok(())
    }

    /// Fetch the forecast for the form and wait for it to be applied.
    pub async fn forecast(&mut self) -> Result<()> {
        self.controller.forecast(&mut self.state)?;
        self.settle().await;
        Ok(())
    }

    async fn settle(&mut self) {
        while self.state.page == Page::Loading {
            if !self.ui.run_next(&mut self.state).await {
                break;
            }
        }
    }

    fn redraw(&mut self) {
        println!("{}", render::page(&self.state));
        if let Some(notice) = self.state.take_notice() {
            match notice.level {
                NoticeLevel::Info => println!("[{}] {}", notice.title, notice.message),
                NoticeLevel::Error => println!("[{}] ❌ {}", notice.title, notice.message),
            }
        }
    }

    pub async fn interact(mut self) -> Result<()> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        println!("{HELP}\n");
        self.redraw();

        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line? else { break };
                    match parse_input(&line) {
                        Ok(Input::Quit) => break,
                        Ok(input) => self.handle(input).await,
                        Err(msg) if msg.is_empty() => {}
                        Err(msg) => println!("{msg}"),
                    }
                }
                applied = self.ui.run_next(&mut self.state) => {
                    if !applied {
                        break;
                    }
                    self.redraw();
                }
            }
        }

        Ok(())
    }

    async fn handle(&mut self, input: Input) {
        let state = &mut self.state;

        // Rejected submissions leave a notice on the state; redraw shows it.
        match input {
            Input::Search { city, country } => {
                state.form.city = city;
                state.form.country = country.unwrap_or_default();
                let _ = self.controller.search(state);
            }
            Input::Units(units) => {
                state.form.units = units;
                println!("Units set to {units}.");
                return;
            }
            Input::Forecast => {
                let _ = self.controller.forecast(state);
            }
            Input::Save => {
                if let Err(e) = state.save_current_favorite() {
                    tracing::warn!("{e}");
                    println!("Could not save favorite: {e}");
                }
            }
            Input::Favorites => state.show(Page::Favorites),
            Input::Remove(label) => match state.remove_favorite(&label) {
                Ok(true) => {}
                Ok(false) => println!("'{label}' is not in favorites."),
                Err(e) => println!("Could not remove favorite: {e}"),
            },
            Input::Open(label) => {
                let _ = self.controller.search_from(state, &label);
            }
            Input::History => state.show(Page::History),
            Input::Locate => {
                self.controller.locate(state);
                println!("Locating...");
                return;
            }
            Input::Theme => state.toggle_theme(),
            Input::Home => state.show(Page::Home),
            Input::Animate => {
                let mode = match state.current() {
                    FetchState::Rendered(weather) => weather.animation_mode,
                    _ => Default::default(),
                };
                render::play_animation(mode, std::time::Duration::from_secs(3)).await;
                return;
            }
            Input::Help => {
                println!("{HELP}");
                return;
            }
            Input::Quit => return,
        }

        self.redraw();
    }
}
