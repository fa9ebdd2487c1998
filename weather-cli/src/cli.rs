use amap_weather_core::{Config, TransportOptions, WeatherClient, WeatherResult};
use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "amap-weather", version, about = "AMap weather CLI")]
pub struct Cli {
    /// Request timeout in milliseconds, overriding the configured one.
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the AMap API key (and optionally a default timeout).
    Configure,

    /// Show current conditions for a city.
    Live {
        /// City name or adcode, e.g. "深圳" or "440300".
        city: String,
    },

    /// Show current conditions plus forecast for a city.
    Forecast { city: String },

    /// Query with explicit extensions/output values.
    Show {
        city: String,

        /// "base" or "all".
        #[arg(long = "type", default_value = "base")]
        kind: String,

        /// "json" or "xml".
        #[arg(long, default_value = "json")]
        format: String,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let timeout = self.timeout;

        let result = match self.command {
            Command::Configure => return configure(timeout),
            Command::Live { city } => client(timeout)?.get_live_weather(&city).await?,
            Command::Forecast { city } => client(timeout)?.get_forecasts_weather(&city).await?,
            Command::Show { city, kind, format } => {
                client(timeout)?.fetch_weather(&city, &kind, &format).await?
            }
        };

        print_result(result)
    }
}

/// Client from the stored config, with `--timeout` applied on top.
fn client(timeout: Option<u64>) -> anyhow::Result<WeatherClient> {
    let config = Config::load()?;
    let mut client = config.client()?;

    if let Some(ms) = timeout {
        let mut options = client.transport_options().clone();
        options.merge(TransportOptions::default().timeout(ms));
        client.set_transport_options(options);
    }

    tracing::debug!(endpoint = client.base_url(), options = ?client.transport_options(), "client ready");

    Ok(client)
}

fn configure(timeout: Option<u64>) -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let key = Password::new("AMap API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    config.set_api_key(normalize_key(&key)?);

    if let Some(ms) = timeout {
        config.transport.timeout = Some(ms);
    }

    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());

    Ok(())
}

fn normalize_key(input: &str) -> anyhow::Result<String> {
    let key = input.trim();
    if key.is_empty() {
        bail!(
            "API key must not be empty.\n\
             Hint: create a Web Service key in the AMap console and run `amap-weather configure` again."
        );
    }

    Ok(key.to_string())
}

fn print_result(result: WeatherResult) -> anyhow::Result<()> {
    match result {
        WeatherResult::Json(map) => {
            let text = serde_json::to_string_pretty(&map).context("Failed to render JSON")?;
            println!("{text}");
        }
        WeatherResult::Xml(body) => println!("{body}"),
    }

    Ok(())
}
