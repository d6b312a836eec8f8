//! Command-line front end for the calendar store.
//!
//! # Responsibility
//! - Drive the calendar lifecycle and views against a local SQLite file.
//! - Keep output line-oriented so it can be diffed in quick local checks.

use anyhow::{anyhow, Context, Result};
use chrono::{Datelike, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use splitcal_core::model::event::parse_event_date;
use splitcal_core::{
    default_log_level, format_event_date, init_logging, CalendarConfig, CalendarEvent,
    CalendarView, EventColor, EventId, EventPatch, EventService, NewEvent, SqliteKeyValueStore,
    ViewMode,
};
use std::path::PathBuf;

const DEFAULT_DB_FILE_NAME: &str = "splitcal_calendar.sqlite3";

#[derive(Parser)]
#[command(name = "splitcal")]
#[command(about = "Manage calendar events stored in a local splitcal database")]
struct Cli {
    /// SQLite file holding the events (defaults to the system temp dir)
    #[arg(long, global = true, env = "SPLITCAL_DB_PATH")]
    db: Option<PathBuf>,

    /// Directory for rolling log files; logging stays off when omitted
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print core linkage info
    Ping,
    Add {
        title: String,

        /// Event date (e.g., "2025-03-20" or "2025-03-20T15:00")
        #[arg(short, long)]
        date: String,

        #[arg(long, default_value = "")]
        description: String,

        /// Display time shown next to the title
        #[arg(long, default_value = NewEvent::DEFAULT_TIME)]
        time: String,

        /// Palette hex token such as "#FF3B30"
        #[arg(long)]
        color: Option<String>,

        #[arg(long)]
        location: Option<String>,

        #[arg(long)]
        reminder: bool,
    },
    /// List all events in creation order
    List,
    Show {
        id: String,
    },
    Update {
        id: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        description: Option<String>,

        #[arg(short, long)]
        date: Option<String>,

        #[arg(long)]
        time: Option<String>,

        #[arg(long)]
        color: Option<String>,

        /// New location; an empty string clears it
        #[arg(long)]
        location: Option<String>,

        #[arg(long)]
        reminder: Option<bool>,
    },
    Delete {
        id: String,
    },
    /// Render the month or week grid around a date
    Grid {
        /// "month" or "week"
        #[arg(short, long, default_value = "month")]
        mode: ViewMode,

        /// Reference date (YYYY-MM-DD); defaults to today
        #[arg(short, long)]
        date: Option<NaiveDate>,
    },
    /// Show the next events from now
    Upcoming,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(log_dir) = &cli.log_dir {
        init_logging(default_log_level(), &log_dir.to_string_lossy())
            .map_err(|err| anyhow!(err))
            .context("failed to initialize logging")?;
    }

    if let Commands::Ping = cli.command {
        println!("splitcal_core ping={}", splitcal_core::ping());
        println!("splitcal_core version={}", splitcal_core::core_version());
        return Ok(());
    }

    let db_path = cli
        .db
        .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_DB_FILE_NAME));
    let storage = SqliteKeyValueStore::open(&db_path)
        .with_context(|| format!("failed to open {}", db_path.display()))?;
    let mut service = EventService::new(storage, CalendarConfig::default());
    service.load();

    match cli.command {
        Commands::Ping => {}
        Commands::Add {
            title,
            date,
            description,
            time,
            color,
            location,
            reminder,
        } => {
            let mut draft = NewEvent::new(title, parse_date(&date)?);
            draft.description = description;
            draft.time = time;
            draft.color = parse_color(color.as_deref())?;
            draft.location = location;
            draft.reminder = reminder;
            let event = service.add_event(draft)?;
            print_event(&event);
        }
        Commands::List => {
            for event in service.events() {
                print_event(event);
            }
        }
        Commands::Show { id } => {
            let event = service
                .get_event_by_id(&EventId::new(id.as_str()))
                .ok_or_else(|| anyhow!("event not found: {id}"))?;
            print_event(event);
            if !event.description.is_empty() {
                println!("  {}", event.description);
            }
        }
        Commands::Update {
            id,
            title,
            description,
            date,
            time,
            color,
            location,
            reminder,
        } => {
            let patch = EventPatch {
                title,
                description,
                date: date.as_deref().map(parse_date).transpose()?,
                time,
                color: parse_color(color.as_deref())?,
                location: location.map(|value| {
                    let trimmed = value.trim();
                    (!trimmed.is_empty()).then(|| trimmed.to_string())
                }),
                reminder,
            };
            if patch.is_empty() {
                anyhow::bail!("nothing to update: pass at least one field flag");
            }
            let event = service.update_event(&EventId::new(id), patch)?;
            print_event(&event);
        }
        Commands::Delete { id } => {
            if service.delete_event(&EventId::new(id.as_str())) {
                println!("deleted {id}");
            } else {
                println!("no event {id}");
            }
        }
        Commands::Grid { mode, date } => {
            let reference = date.unwrap_or_else(|| service.today());
            let view = CalendarView::new(reference, mode);
            println!("{}", view.title());
            for week in service.grid(reference, mode).chunks(7) {
                let cells: Vec<String> = week
                    .iter()
                    .map(|day| {
                        let mut cell = format!("{:>2}", day.date.day());
                        cell.push(if day.is_today { '*' } else { ' ' });
                        if day.is_other_month {
                            cell = format!("({})", cell.trim_end());
                        }
                        match day.event_count {
                            0 => format!("{cell:<6}"),
                            _ if day.overflow() > 0 => {
                                format!("{cell}{}+{}", day.markers.len(), day.overflow())
                            }
                            count => format!("{cell}{count:<3}"),
                        }
                    })
                    .collect();
                println!("{}", cells.join(" "));
            }
        }
        Commands::Upcoming => {
            let upcoming = service.upcoming();
            if upcoming.is_empty() {
                println!("no upcoming events after {}", format_event_date(&Utc::now()));
            }
            for event in upcoming {
                print_event(event);
            }
        }
    }

    Ok(())
}

fn parse_date(raw: &str) -> Result<chrono::DateTime<Utc>> {
    parse_event_date(raw).map_err(|err| anyhow!(err))
}

fn parse_color(raw: Option<&str>) -> Result<Option<EventColor>> {
    raw.map(|value| value.parse::<EventColor>().map_err(|err| anyhow!(err)))
        .transpose()
}

fn print_event(event: &CalendarEvent) {
    let location = event
        .location
        .as_deref()
        .map(|location| format!(" @ {location}"))
        .unwrap_or_default();
    let reminder = if event.reminder { " [reminder]" } else { "" };
    println!(
        "{} {} {} {} {}{}{}",
        event.id,
        format_event_date(&event.date),
        event.time,
        event.color,
        event.title,
        location,
        reminder
    );
}
