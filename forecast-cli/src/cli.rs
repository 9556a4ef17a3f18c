use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use forecast_core::{
    Config, Coordinates, FixedGeolocator, Geolocator, IpGeolocator, Lang, ProviderId, SearchState,
    Theme, Units, WeatherSearch, provider::http_client, render::render,
};

use crate::prompt::{self, PromptGeolocator};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "forecast", version, about = "Current weather and 7-day forecast")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Language of labels and descriptions: "ru" or "en".
    #[arg(long, global = true)]
    pub lang: Option<String>,

    /// Unit system: "metric" or "imperial".
    #[arg(long, global = true)]
    pub units: Option<String>,

    /// Start with the night background.
    #[arg(long, global = true)]
    pub dark: bool,

    /// More log output on stderr (repeat for more).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure credentials for a specific provider.
    Configure {
        /// Provider short name, "openweather" or "weatherapi".
        provider: String,
    },

    /// Show current weather and the week ahead for a city.
    Show {
        /// City name.
        city: String,

        /// Print the view state as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show the weather where you are.
    Here {
        /// Latitude; skips position lookup together with --lon.
        #[arg(long, requires = "lon", allow_hyphen_values = true)]
        lat: Option<f64>,

        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lon: Option<f64>,

        /// Grant location access without asking.
        #[arg(long, short = 'y')]
        yes: bool,

        /// Print the view state as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Keep a prompt open: type cities, `:geo`, `:theme` or `:quit`.
    Interactive,
}

/// Settings after command-line overrides are applied to the config file.
pub(crate) struct Session {
    pub config: Config,
    pub theme: Theme,
}

impl Session {
    pub fn render(&self, state: &SearchState) -> String {
        render(state, &self.theme, self.config.lang, self.config.units)
    }
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let mut config = Config::load()?;
        if let Some(lang) = &self.lang {
            config.lang = Lang::try_from(lang.as_str())?;
        }
        if let Some(units) = &self.units {
            config.units = Units::try_from(units.as_str())?;
        }
        let theme = Theme::new(self.dark || config.dark_theme);
        tracing::debug!(
            lang = ?config.lang,
            units = ?config.units,
            dark = theme.is_dark(),
            "settings resolved"
        );

        match self.command {
            Command::Configure { provider } => configure(config, &provider),
            Command::Show { city, json } => {
                let session = Session { config, theme };
                let search = build_search(&session.config, None, false)?;
                let state = search.search_city(&city).await;
                print_state(&session, &state, json)
            }
            Command::Here { lat, lon, yes, json } => {
                let session = Session { config, theme };
                let fixed = lat.zip(lon).map(|(lat, lon)| Coordinates::new(lat, lon));
                let search = build_search(&session.config, fixed, yes)?;
                let state = search.search_here().await;
                print_state(&session, &state, json)
            }
            Command::Interactive => {
                let session = Session { config, theme };
                let search = build_search(&session.config, None, false)?;
                prompt::interactive(session, search).await
            }
        }
    }
}

fn configure(mut config: Config, provider: &str) -> anyhow::Result<()> {
    let id = ProviderId::try_from(provider)?;

    let api_key = inquire::Password::new(&format!("API key for {id}:"))
        .without_confirmation()
        .with_display_mode(inquire::PasswordDisplayMode::Masked)
        .prompt()
        .context("Failed to read API key")?;

    let api_key = api_key.trim();
    if api_key.is_empty() {
        anyhow::bail!("API key for '{id}' must not be empty");
    }

    config.upsert_provider_api_key(id, api_key.to_string());
    let path = config.save()?;
    println!("Saved API key for {id} to {}", path.display());

    let missing = config.missing_providers();
    if !missing.is_empty() {
        let names: Vec<_> = missing.iter().map(ProviderId::as_str).collect();
        println!("Still missing: {}", names.join(", "));
    }

    Ok(())
}

/// Position source: explicit coordinates, then `[home]` from config, then the IP lookup.
fn build_search(
    config: &Config,
    fixed: Option<Coordinates>,
    assume_yes: bool,
) -> anyhow::Result<WeatherSearch> {
    let inner: Arc<dyn Geolocator> = match fixed.or(config.home) {
        Some(coords) => Arc::new(FixedGeolocator(coords)),
        None => {
            let mut geo = IpGeolocator::new(http_client(config.http_timeout())?);
            if let Some(base) = &config.endpoints.geolocation {
                geo = geo.with_base_url(base);
            }
            Arc::new(geo)
        }
    };
    let geolocator = Arc::new(PromptGeolocator::new(inner, config.lang, assume_yes));

    WeatherSearch::from_config(config, geolocator)
}

fn print_state(session: &Session, state: &SearchState, json: bool) -> anyhow::Result<()> {
    if json {
        let out =
            serde_json::to_string_pretty(state).context("Failed to serialize view state")?;
        println!("{out}");
    } else {
        println!("{}", session.render(state));
    }
    Ok(())
}
