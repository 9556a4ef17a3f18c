//! Terminal prompts: the location permission question and the interactive loop.

use std::sync::Arc;

use async_trait::async_trait;
use forecast_core::{Coordinates, GeolocationError, Geolocator, Lang, WeatherSearch};
use inquire::InquireError;

use crate::cli::Session;

/// Asks before handing out the position, like a browser permission prompt.
#[derive(Debug)]
pub struct PromptGeolocator {
    inner: Arc<dyn Geolocator>,
    lang: Lang,
    assume_yes: bool,
}

impl PromptGeolocator {
    pub fn new(inner: Arc<dyn Geolocator>, lang: Lang, assume_yes: bool) -> Self {
        Self { inner, lang, assume_yes }
    }

    fn question(&self) -> &'static str {
        match self.lang {
            Lang::Ru => "Разрешить доступ к местоположению?",
            Lang::En => "Allow access to your location?",
        }
    }
}

#[async_trait]
impl Geolocator for PromptGeolocator {
    async fn locate(&self) -> Result<Coordinates, GeolocationError> {
        if !self.assume_yes {
            let question = self.question();
            let answer = tokio::task::spawn_blocking(move || {
                inquire::Confirm::new(question).with_default(false).prompt()
            })
            .await
            .map_err(|e| GeolocationError::Lookup(e.to_string()))?;

            match answer {
                Ok(true) => {}
                Ok(false)
                | Err(InquireError::OperationCanceled)
                | Err(InquireError::OperationInterrupted) => {
                    return Err(GeolocationError::Denied);
                }
                // No terminal to ask on.
                Err(InquireError::NotTTY) => return Err(GeolocationError::Unsupported),
                Err(other) => return Err(GeolocationError::Lookup(other.to_string())),
            }
        }

        self.inner.locate().await
    }
}

enum Input {
    City(String),
    Geolocate,
    ToggleTheme,
    Quit,
}

fn parse_input(line: &str) -> Input {
    match line.trim() {
        ":q" | ":quit" => Input::Quit,
        ":geo" => Input::Geolocate,
        ":theme" => Input::ToggleTheme,
        _ => Input::City(line.to_string()),
    }
}

pub async fn interactive(mut session: Session, search: WeatherSearch) -> anyhow::Result<()> {
    let placeholder = session.config.lang.text().prompt;

    loop {
        println!("{}\n", session.render(&search.snapshot()));

        let line = tokio::task::spawn_blocking(move || {
            inquire::Text::new(">")
                .with_placeholder(placeholder)
                .with_help_message(":geo, :theme, :quit")
                .prompt()
        })
        .await?;

        let line = match line {
            Ok(line) => line,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(err) => return Err(err.into()),
        };

        match parse_input(&line) {
            Input::Quit => break,
            Input::ToggleTheme => session.theme.toggle(),
            Input::Geolocate => {
                search.search_here().await;
            }
            Input::City(city) => {
                search.search_city(&city).await;
            }
        }
    }

    Ok(())
}
