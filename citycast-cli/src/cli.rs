use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use citycast_core::{
    Config, FileStore, LookupController, Notification, RecencyStore, config::API_KEY_ENV,
    service_from_config,
};

use crate::{format, interactive};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "citycast", version, about = "Current weather and 5-day forecast by city")]
pub struct Cli {
    /// Log what is happening under the hood.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Defaults to `interactive` when omitted.
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key.
    Configure {
        /// Key to store; prompted for when absent.
        #[arg(long)]
        api_key: Option<String>,
    },

    /// Show the weather for a city.
    Show {
        /// City name, e.g. "Paris" or "New York".
        #[arg(required = true, num_args = 1..)]
        city: Vec<String>,
    },

    /// Repeat the last successful search.
    Resume,

    /// List or edit recent searches.
    History {
        #[command(subcommand)]
        action: Option<HistoryAction>,
    },

    /// Search and browse history from a prompt.
    Interactive,
}

#[derive(Debug, Subcommand)]
pub enum HistoryAction {
    /// Forget one city.
    Remove {
        #[arg(required = true, num_args = 1..)]
        city: Vec<String>,
    },

    /// Forget all recent searches.
    Clear,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let config = Config::load()?;

        match self.command.unwrap_or(Command::Interactive) {
            Command::Configure { api_key } => configure(config, api_key),
            Command::Show { city } => {
                let mut controller = controller(&config)?;
                let note = controller.submit(&city.join(" ")).await;
                report(note, &controller)
            }
            Command::Resume => {
                let mut controller = controller(&config)?;
                match controller.initialize().await {
                    Some(note) => report(Some(note), &controller),
                    None => {
                        println!("No previous search. Try `citycast show <city>`.");
                        Ok(())
                    }
                }
            }
            Command::History { action } => history(&config, action),
            Command::Interactive => {
                let controller = controller(&config)?;
                interactive::run(controller).await
            }
        }
    }
}

fn controller(config: &Config) -> anyhow::Result<LookupController<FileStore>> {
    let service = service_from_config(config, std::env::var(API_KEY_ENV).ok())?;
    let store = open_store(config)?;
    Ok(LookupController::new(service, store))
}

fn open_store(config: &Config) -> anyhow::Result<FileStore> {
    let path = config.history_file_path()?;
    FileStore::open(&path)
        .with_context(|| format!("Failed to open history file: {}", path.display()))
}

fn configure(mut config: Config, api_key: Option<String>) -> anyhow::Result<()> {
    let api_key = match api_key {
        Some(key) => key,
        None => inquire::Password::new("OpenWeather API key:")
            .without_confirmation()
            .with_help_message("Get one at https://home.openweathermap.org/api_keys")
            .prompt()?,
    };

    if api_key.trim().is_empty() {
        bail!("API key must not be empty");
    }

    config.set_api_key(api_key);
    let path = config.save()?;
    println!("Saved API key to {}", path.display());
    Ok(())
}

fn history(config: &Config, action: Option<HistoryAction>) -> anyhow::Result<()> {
    let mut recency = RecencyStore::new(open_store(config)?);

    match action {
        None => {
            let (history, last) = recency.load();
            print!("{}", format::render_history(&history, last.as_ref()));
        }
        Some(HistoryAction::Remove { city }) => {
            let city = city.join(" ");
            let history = recency.remove(&city)?;
            println!("Removed {city}.");
            print!("{}", format::render_history(&history, recency.load().1.as_ref()));
        }
        Some(HistoryAction::Clear) => {
            recency.clear()?;
            println!("Search history cleared.");
        }
    }

    Ok(())
}

/// Print the outcome of a lookup; a failed lookup becomes the command's error.
fn report(
    note: Option<Notification>,
    controller: &LookupController<FileStore>,
) -> anyhow::Result<()> {
    match note {
        Some(Notification::Error(msg)) => bail!(msg),
        Some(Notification::Success(msg)) => {
            tracing::info!("{msg}");
            if let Some(result) = controller.current() {
                print!("{}", format::render_lookup(result));
            }
            Ok(())
        }
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn show_joins_multi_word_city() {
        let cli = Cli::try_parse_from(["citycast", "show", "New", "York"]).unwrap();
        match cli.command {
            Some(Command::Show { city }) => assert_eq!(city.join(" "), "New York"),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn no_subcommand_means_interactive() {
        let cli = Cli::try_parse_from(["citycast", "-v"]).unwrap();
        assert!(cli.verbose);
        assert!(cli.command.is_none());
    }

    #[test]
    fn history_remove_requires_city() {
        assert!(Cli::try_parse_from(["citycast", "history", "remove"]).is_err());
    }
}
