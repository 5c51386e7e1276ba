mod list;
mod tui;

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{anyhow, bail, Result};
use chrono::NaiveDate;
use clap::Parser;
use timetable_core::{
    class_for_slot, data_dir, parse_attendance_date, parse_day, timestamp_id, today,
    AttendanceRecord, AttendanceStatus, ClassGateway, Config, DocumentStore, LocalStore, NewClass,
    Slot,
};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

const LOG_FILE_NAME: &str = "timetable.log";

#[derive(Parser)]
#[command(name = "timetable")]
#[command(about = "Weekly timetable with per-class attendance", long_about = None)]
struct Cli {
    /// Directory holding the store, config and log (default: ~/.timetable)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Open the Terminal User Interface
    Tui,
    /// List all classes with attendance counts
    List,
    /// Register a class (usage: add --day mon --period 1 Algorithms)
    Add {
        /// Day as 0-5 or a name prefix (mon, tue, ... sat)
        #[arg(long, value_parser = parse_day_arg)]
        day: u8,
        /// Period 1-6
        #[arg(long)]
        period: u8,
        /// Class name
        #[arg(trailing_var_arg = true, required = true)]
        name: Vec<String>,
    },
    /// Mark attendance for a class (usage: mark <ID> present --date yesterday)
    Mark {
        id: String,
        /// present / absent (prefixes allowed)
        status: AttendanceStatus,
        /// today, yesterday, -Nd, a weekday name or YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<String>,
    },
    /// Delete a class and all of its attendance records
    Delete { id: String },
}

fn parse_day_arg(s: &str) -> Result<u8, String> {
    parse_day(s).map_err(|e| e.to_string())
}

fn init_logging(dir: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join(LOG_FILE_NAME))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

/// Add a class to a free slot. Returns the new id.
fn add_class<S: DocumentStore>(
    gateway: &ClassGateway<S>,
    slot: Slot,
    name: &str,
) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        bail!("Class name is required.");
    }

    let classes = gateway.list_classes();
    if let Some(existing) = class_for_slot(&classes, slot) {
        bail!(
            "{} {} is already taken by '{}' (ID: {}).",
            slot.day_label(),
            slot.period(),
            existing.name,
            existing.id
        );
    }

    gateway.add_class(NewClass::new(name.to_string(), slot))
}

fn class_name<S: DocumentStore>(gateway: &ClassGateway<S>, id: &str) -> Result<String> {
    gateway
        .list_classes()
        .into_iter()
        .find(|c| c.id == id)
        .map(|c| c.name)
        .ok_or_else(|| anyhow!("No class with ID {}.", id))
}

/// Record `status` for `date`. Returns the class name.
fn mark_attendance<S: DocumentStore>(
    gateway: &ClassGateway<S>,
    id: &str,
    status: AttendanceStatus,
    date: NaiveDate,
) -> Result<String> {
    let name = class_name(gateway, id)?;
    gateway.update_attendance(id, AttendanceRecord::new(timestamp_id(), date, status))?;
    Ok(name)
}

/// Delete a class with its records. Returns the class name.
fn delete_class<S: DocumentStore>(gateway: &ClassGateway<S>, id: &str) -> Result<String> {
    let name = class_name(gateway, id)?;
    gateway.delete_class(id)?;
    Ok(name)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let dir = data_dir(cli.data_dir)?;
    init_logging(&dir)?;

    let config = Config::load(&dir)?;
    let gateway = ClassGateway::new(LocalStore::open(Some(dir))?);

    match cli.command {
        Some(Commands::List) => {
            list::show_classes(gateway.list_classes(), &config);
        }
        Some(Commands::Add { day, period, name }) => {
            let slot = Slot::new(day, period)?;
            let id = add_class(&gateway, slot, &name.join(" "))?;
            println!("Class added: {} (ID: {})", name.join(" ").trim(), id);
            println!(
                "  Slot: {} {} ({})",
                slot.day_label(),
                slot.period(),
                config.period_label(slot.period())
            );
        }
        Some(Commands::Mark { id, status, date }) => {
            let date = match date {
                Some(d) => parse_attendance_date(&d)?,
                None => today(),
            };
            let name = mark_attendance(&gateway, &id, status, date)?;
            println!("Marked {} as {} on {}", name, status.as_str(), date.format("%Y-%m-%d"));
        }
        Some(Commands::Delete { id }) => {
            let name = delete_class(&gateway, &id)?;
            println!("Class deleted: {} (ID: {})", name, id);
        }
        Some(Commands::Tui) | None => {
            tui::run(gateway, config)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gateway() -> ClassGateway<LocalStore> {
        ClassGateway::new(LocalStore::in_memory())
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 9, 1).unwrap()
    }

    #[test]
    fn test_add_rejects_blank_name() {
        let gateway = gateway();
        assert!(add_class(&gateway, Slot::default(), "   ").is_err());
        assert!(gateway.list_classes().is_empty());
    }

    #[test]
    fn test_add_rejects_taken_slot() {
        let gateway = gateway();
        add_class(&gateway, Slot::default(), " Algorithms ").unwrap();

        let err = add_class(&gateway, Slot::default(), "Networks").unwrap_err();
        assert!(err.to_string().contains("Algorithms"));

        let classes = gateway.list_classes();
        assert_eq!(classes.len(), 1);
        assert_eq!(classes[0].name, "Algorithms");
    }

    #[test]
    fn test_mark_and_delete_unknown_class_fail() {
        let gateway = gateway();
        assert!(mark_attendance(&gateway, "missing", AttendanceStatus::Present, date()).is_err());
        assert!(delete_class(&gateway, "missing").is_err());
    }

    #[test]
    fn test_mark_then_delete() {
        let gateway = gateway();
        let id = add_class(&gateway, Slot::default(), "Algorithms").unwrap();

        let name = mark_attendance(&gateway, &id, AttendanceStatus::Absent, date()).unwrap();
        assert_eq!(name, "Algorithms");
        assert_eq!(gateway.list_classes()[0].counts().absent, 1);

        delete_class(&gateway, &id).unwrap();
        assert!(gateway.list_classes().is_empty());
    }
}
