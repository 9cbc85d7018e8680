use std::{fs, path::PathBuf, str::FromStr};

use clap::Subcommand;
use eventhub::App;
use eventhub_event::{Event, FilterUpdate, Order, SortBy, sort_events};

use super::print_event;

#[derive(Subcommand)]
pub enum EventCommand {
    /// List events, optionally filtered
    List {
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        location: Option<String>,
        /// today, week or month
        #[arg(long)]
        date: Option<String>,
        /// date, name, price, capacity or registered
        #[arg(long, default_value = "date")]
        sort: String,
        #[arg(long)]
        desc: bool,
    },
    Upcoming {
        #[arg(long, default_value_t = 5)]
        limit: usize,
    },
    Stats,
    Categories,
    Locations,
    /// Add events from a JSON array file; existing ids are skipped
    Import { file: PathBuf },
}

pub fn run(app: &mut App, command: EventCommand) -> anyhow::Result<()> {
    let catalog = app.coordinator.catalog_mut();

    match command {
        EventCommand::List {
            search,
            category,
            location,
            date,
            sort,
            desc,
        } => {
            let by = SortBy::from_str(&sort).map_err(|_| anyhow::anyhow!("unknown sort key {sort}"))?;
            let order = if desc { Order::Desc } else { Order::Asc };

            let mut events = catalog.apply_filters(FilterUpdate {
                search,
                category,
                location,
                date,
            });
            sort_events(&mut events, by, order);

            for event in events {
                print_event(event);
            }
        }
        EventCommand::Upcoming { limit } => {
            for event in catalog.upcoming(limit) {
                print_event(event);
            }
        }
        EventCommand::Stats => {
            let stats = catalog.stats();
            println!(
                "events {}  available {}  registrations {}  categories {}",
                stats.total, stats.available, stats.registrations, stats.categories
            );
        }
        EventCommand::Categories => {
            for category in catalog.categories() {
                println!("{category}");
            }
        }
        EventCommand::Locations => {
            for location in catalog.locations() {
                println!("{location}");
            }
        }
        EventCommand::Import { file } => {
            let events: Vec<Event> = serde_json::from_str(&fs::read_to_string(&file)?)?;
            let total = events.len();
            let added = events
                .into_iter()
                .map(|event| catalog.add(event))
                .filter(|added| *added)
                .count();

            tracing::info!(file = %file.display(), added, total, "events imported");
            println!("imported {added} of {total} events");
        }
    }

    Ok(())
}
