use std::fmt;

use citycast_core::{KeyValueStore, LookupController, Notification};
use inquire::{InquireError, Select, Text};

use crate::format;

enum Choice {
    Search,
    Recent(String),
    Remove,
    Quit,
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Choice::Search => f.write_str("Search for a city"),
            Choice::Recent(city) => write!(f, "Recent: {city}"),
            Choice::Remove => f.write_str("Remove a recent search"),
            Choice::Quit => f.write_str("Quit"),
        }
    }
}

/// Esc and Ctrl-C end the session instead of failing it.
fn cancelled<T>(res: Result<T, InquireError>) -> anyhow::Result<Option<T>> {
    match res {
        Ok(value) => Ok(Some(value)),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
        Err(err) => Err(err.into()),
    }
}

fn show<S: KeyValueStore>(note: Option<Notification>, controller: &LookupController<S>) {
    match note {
        Some(Notification::Success(msg)) => {
            println!("✔ {msg}\n");
            if let Some(result) = controller.current() {
                println!("{}", format::render_lookup(result));
            }
        }
        Some(Notification::Error(msg)) => eprintln!("✘ {msg}\n"),
        None => {}
    }
}

pub async fn run<S: KeyValueStore>(mut controller: LookupController<S>) -> anyhow::Result<()> {
    if controller.recency().load().1.is_some() {
        println!("Loading weather data...");
    }
    let note = controller.initialize().await;
    show(note, &controller);

    loop {
        let mut options = vec![Choice::Search];
        options.extend(controller.history().iter().map(|c| Choice::Recent(c.to_string())));
        if !controller.history().is_empty() {
            options.push(Choice::Remove);
        }
        options.push(Choice::Quit);

        let Some(choice) = cancelled(Select::new("What next?", options).prompt())? else {
            return Ok(());
        };

        match choice {
            Choice::Search => {
                let Some(city) = cancelled(
                    Text::new("City:")
                        .with_initial_value(controller.input_city())
                        .prompt(),
                )?
                else {
                    continue;
                };
                controller.set_input(&city);
                println!("Loading weather data...");
                let note = controller.submit_input().await;
                show(note, &controller);
            }
            Choice::Recent(city) => {
                println!("Loading weather data...");
                let note = controller.select_history_entry(&city).await;
                show(note, &controller);
            }
            Choice::Remove => {
                let recent: Vec<String> = controller.history().iter().map(str::to_string).collect();
                let Some(city) = cancelled(Select::new("Remove which?", recent).prompt())? else {
                    continue;
                };
                controller.remove_history_entry(&city)?;
                println!("Removed {city}.\n");
            }
            Choice::Quit => return Ok(()),
        }
    }
}
