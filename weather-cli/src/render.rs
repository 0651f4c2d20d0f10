//! Human-friendly output: one text block per page, plus ASCII animation frames.

use std::{fmt::Write as _, io::Write as _, time::Duration};

use weather_core::{
    AnimationMode, AppState, CurrentWeather, DailyForecast, FavoritesStore, FetchState, Page,
    SearchHistory, Theme,
    animation::{AnimationState, Particles, Scene},
};

const FRAME_INTERVAL: Duration = Duration::from_millis(40);
const FRAME_COLS: usize = 60;
const FRAME_ROWS: usize = 20;

pub fn page(state: &AppState) -> String {
    let theme = match state.theme {
        Theme::Light => "light",
        Theme::Dark => "dark",
    };

    let body = match state.page {
        Page::Home => home(state),
        Page::Loading => "Fetching data...".to_string(),
        Page::Today => today(state.current()),
        Page::Forecast => forecast(state.forecast()),
        Page::History => history(state.history()),
        Page::Favorites => favorites(state.favorites()),
    };

    format!("── {:?} ── [{theme}]\n{body}", state.page)
}

fn home(state: &AppState) -> String {
    let form = &state.form;
    let mut out = format!(
        "🌍 City: {}  Country: {}  Units: {}",
        or_dash(&form.city),
        or_dash(&form.country),
        form.units
    );
    if state.is_locating() {
        out.push_str("\n📍 Locating...");
    }
    out
}

fn or_dash(s: &str) -> &str {
    if s.is_empty() { "-" } else { s }
}

pub fn today(current: &FetchState<CurrentWeather>) -> String {
    match current {
        FetchState::Idle => "No weather fetched yet.".to_string(),
        FetchState::Loading => "Fetching data...".to_string(),
        FetchState::Errored(err) => format!("❌ {err}"),
        FetchState::Rendered(w) => current_weather(w),
    }
}

pub fn current_weather(w: &CurrentWeather) -> String {
    let unit = w.units.temperature_symbol();
    format!(
        "{}  🌍 ({})\n\
         🌡 {}{unit} (feels {}{unit})\n\
         ☁ {}\n\
         💧 {}%   💨 {} {}\n\
         🌅 {}   🌇 {}",
        w.location,
        w.country_code,
        w.temperature,
        w.feels_like,
        w.description,
        w.humidity,
        w.wind_speed,
        w.units.wind_speed_label(),
        w.sunrise.format("%H:%M"),
        w.sunset.format("%H:%M"),
    )
}

pub fn forecast(state: &FetchState<DailyForecast>) -> String {
    let DailyForecast { units, days } = match state {
        FetchState::Idle => return "No forecast fetched yet.".to_string(),
        FetchState::Loading => return "Fetching data...".to_string(),
        FetchState::Errored(err) => return format!("❌ {err}"),
        FetchState::Rendered(forecast) if forecast.days.is_empty() => {
            return "No forecast data available.".to_string();
        }
        FetchState::Rendered(forecast) => forecast,
    };

    let unit = units.temperature_symbol();
    let mut out = String::new();
    for day in days {
        let _ = writeln!(
            out,
            "{:<11} {:>5}  {}{}",
            day.date.format("%a %d %b"),
            format!("{}{unit}", day.temperature.round()),
            day.description,
            if day.icon.is_some() { "" } else { "  (no icon)" },
        );
    }

    let temps: Vec<f64> = days.iter().map(|d| d.temperature).collect();
    let _ = write!(out, "Temperature Trend (next {} days): {}", days.len(), sparkline(&temps));
    out
}

/// One block character per value, scaled between the min and max.
pub fn sparkline(values: &[f64]) -> String {
    const BARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let span = max - min;

    values
        .iter()
        .map(|v| {
            if span <= f64::EPSILON {
                BARS[3]
            } else {
                let idx = ((v - min) / span * (BARS.len() - 1) as f64).round() as usize;
                BARS[idx.min(BARS.len() - 1)]
            }
        })
        .collect()
}

pub fn history(history: &SearchHistory) -> String {
    if history.is_empty() {
        return "No searches yet.".to_string();
    }
    let mut out = String::from("Recent Searches");
    for city in history.iter() {
        let _ = write!(out, "\n  • {city}");
    }
    out
}

pub fn favorites(favorites: &FavoritesStore) -> String {
    if favorites.is_empty() {
        return "No favorites yet.".to_string();
    }
    let mut out = String::from("⭐ Favorites");
    for city in favorites.items() {
        let _ = write!(out, "\n  ★ {city}");
    }
    out
}

/// Rasterize one animation frame onto a `cols` x `rows` character grid.
pub fn frame(state: &AnimationState, cols: usize, rows: usize) -> String {
    let mut grid = vec![vec![' '; cols]; rows];
    let scene = state.scene;

    let mut plot = |x: f32, y: f32, ch: char| {
        if x < 0.0 || y < 0.0 || scene.width <= 0.0 || scene.height <= 0.0 {
            return;
        }
        let col = (x / scene.width * cols as f32) as usize;
        let row = (y / scene.height * rows as f32) as usize;
        if row < rows && col < cols {
            grid[row][col] = ch;
        }
    };

    match &state.particles {
        Particles::Sun(sun) => {
            for ray in sun.rays() {
                plot(ray.x2, ray.y2, '*');
            }
            let r = sun.radius();
            for step in 0..32 {
                let angle = step as f32 * std::f32::consts::TAU / 32.0;
                plot(sun.cx + r * angle.cos(), sun.cy + r * angle.sin(), 'O');
            }
        }
        Particles::Rain(drops) => {
            for drop in drops {
                plot(drop.x, drop.y, '|');
                plot(drop.x, drop.y + drop.length, '|');
            }
        }
        Particles::Snow(flakes) => {
            for flake in flakes {
                plot(flake.x, flake.y, '*');
            }
        }
    }

    grid.into_iter()
        .map(|row| row.into_iter().collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Drive the animation from a host timer for `length`, redrawing in place.
pub async fn play_animation(mode: AnimationMode, length: Duration) {
    let mut state = AnimationState::start(mode, Scene::default());
    let mut ticker = tokio::time::interval(FRAME_INTERVAL);
    let started = tokio::time::Instant::now();
    let mut last = started;

    let mut stdout = std::io::stdout();
    while last.duration_since(started) < length {
        let now = ticker.tick().await;
        state = state.step(now.duration_since(last));
        last = now;

        let _ = writeln!(stdout, "\x1b[H\x1b[2J{}", frame(&state, FRAME_COLS, FRAME_ROWS));
        let _ = stdout.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};
    use weather_core::{FetchError, ForecastDay, Units, animation::RainDrop};

    fn day(temperature: f64) -> ForecastDay {
        ForecastDay {
            date: NaiveDate::from_ymd_opt(2024, 6, 14).unwrap(),
            temperature,
            description: "Few clouds".into(),
            icon_id: "02d".into(),
            icon: None,
        }
    }

    fn weather() -> CurrentWeather {
        CurrentWeather {
            location: "Paris,FR".into(),
            units: Units::Metric,
            temperature: 18.5,
            feels_like: 17.0,
            description: "Clear sky".into(),
            humidity: 60,
            wind_speed: 3.2,
            country_code: "FR".into(),
            sunrise: NaiveTime::from_hms_opt(6, 5, 0).unwrap(),
            sunset: NaiveTime::from_hms_opt(21, 40, 0).unwrap(),
            icon_id: "01d".into(),
            icon: None,
            animation_mode: AnimationMode::Sun,
        }
    }

    #[test]
    fn current_weather_lists_every_field() {
        let text = current_weather(&weather());
        assert!(text.starts_with("Paris,FR  🌍 (FR)"));
        assert!(text.contains("18.5°C (feels 17°C)"));
        assert!(text.contains("💧 60%   💨 3.2 m/s"));
        assert!(text.contains("🌅 06:05   🌇 21:40"));
    }

    #[test]
    fn errors_render_with_message() {
        let text = today(&FetchState::Errored(FetchError::NotFound { city: "Atlantis".into() }));
        assert_eq!(text, "❌ City 'Atlantis' not found.");
    }

    #[test]
    fn forecast_rounds_temperatures() {
        let text = forecast(&FetchState::Rendered(DailyForecast {
            units: Units::Imperial,
            days: vec![day(21.6)],
        }));
        assert!(text.contains("Fri 14 Jun"));
        assert!(text.contains("22°F"));
        assert!(text.contains("Few clouds"));
    }

    #[test]
    fn forecast_page_labels_units_of_the_request() {
        let mut app = AppState::new(
            FavoritesStore::empty("favorites.json"),
            SearchHistory::default(),
            Theme::Light,
        );
        app.form.city = "Paris".into();

        let (ticket, _) = app.begin_forecast().unwrap();
        app.form.units = Units::Imperial;
        app.apply_forecast(ticket, Ok(vec![day(20.0)]));

        let text = page(&app);
        assert!(text.contains("20°C"));
        assert!(!text.contains("°F"));
    }

    #[test]
    fn sparkline_scales_between_extremes() {
        assert_eq!(sparkline(&[0.0, 7.0]), "▁█");
        assert_eq!(sparkline(&[5.0, 5.0]), "▄▄");
        assert_eq!(sparkline(&[]), "");
    }

    #[test]
    fn frame_plots_rain_inside_the_grid() {
        let state = AnimationState {
            scene: Scene {
                width: 100.0,
                height: 100.0,
            },
            particles: Particles::Rain(vec![RainDrop {
                x: 50.0,
                y: 50.0,
                length: 10.0,
            }]),
        };
        let text = frame(&state, 10, 10);
        let rows: Vec<&str> = text.lines().collect();
        assert_eq!(rows.len(), 10);
        assert_eq!(rows[5].chars().nth(5), Some('|'));
        assert_eq!(rows[6].chars().nth(5), Some('|'));
    }
}
