//! Execution of the one-shot CLI subcommands.

use std::{
    io::{Read, Write},
    path::PathBuf,
};

use prettytable::{row, Table};
use serde_json::Value;
use wanderlist_core::{
    models::date_format, models::today, normalize, Destination, DestinationFilter, DestinationId,
};

use crate::{config::Command, error::AppError, storage::StoragePort};

/// Runs `command` against `storage`, writing human output to `out`.
/// `serve` is handled by the caller.
pub fn execute(
    command: Command,
    storage: &dyn StoragePort,
    out: &mut dyn Write,
) -> Result<(), AppError> {
    match command {
        Command::List {
            priority,
            continent,
            trip_type,
            visit_status,
        } => {
            let filter = DestinationFilter {
                priority,
                continent,
                trip_type,
                visit_status,
            };
            let destinations = filter.apply(&storage.get_all()?);
            writeln!(out, "{}", destination_table(&destinations))?;
            writeln!(out, "{} destination(s)", destinations.len())?;
        }
        Command::Show { id } => {
            let id = DestinationId(id);
            let destination = storage.get_one(id)?.ok_or(AppError::NotFound(id))?;
            writeln!(out, "{}", serde_json::to_string_pretty(&destination)?)?;
            writeln!(out, "{}", destination.budget)?;
        }
        Command::Add {
            name,
            lat,
            lng,
            country,
            continent,
            priority,
            trip_types,
            notes,
        } => {
            let mut destination = Destination::new(name, lat, lng);
            destination.country = country.unwrap_or_default();
            destination.continent = continent.unwrap_or_default();
            destination.priority = priority.unwrap_or_default();
            destination.trip_type.extend(trip_types);
            destination.notes = notes.unwrap_or_default();

            let saved = storage.save(&destination)?;
            writeln!(out, "Saved {} ({})", saved.name, saved.id)?;
        }
        Command::Save { file } => {
            let raw: Value = serde_json::from_str(&read_input(&file)?)?;
            let saved = storage.save(&normalize(&raw))?;
            writeln!(out, "Saved {} ({})", saved.name, saved.id)?;
        }
        Command::Delete { id } => {
            if storage.delete(DestinationId(id))? {
                writeln!(out, "Deleted {}", id)?;
            } else {
                writeln!(out, "Nothing to delete for {}", id)?;
            }
        }
        Command::Import { file } => {
            let payload = std::fs::read_to_string(&file)?;
            let imported = storage.import_all(&payload)?;
            writeln!(out, "Successfully imported {} destination(s)", imported.len())?;
        }
        Command::Export { file } => {
            let file = file.unwrap_or_else(default_export_path);
            std::fs::write(&file, storage.export_all()?)?;
            writeln!(out, "Exported to {}", file.display())?;
        }
        Command::Migrate => {
            let migrated = storage.migrate_from_legacy()?;
            writeln!(out, "Migrated {} legacy record(s)", migrated)?;
        }
        Command::Serve => {
            return Err(AppError::Internal("serve must be run by the server entry point".to_string()));
        }
    }
    Ok(())
}

pub fn default_export_path() -> PathBuf {
    PathBuf::from(format!("travel-wishlist-{}.json", date_format::format(today())))
}

fn read_input(file: &str) -> Result<String, AppError> {
    if file == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        Ok(std::fs::read_to_string(file)?)
    }
}

fn destination_table(destinations: &[Destination]) -> Table {
    let mut table = Table::new();
    table.add_row(row![
        "ID", "Name", "Country", "Continent", "Priority", "Status", "Trip types", "Budget"
    ]);
    table.add_empty_row();

    for d in destinations {
        let trip_types: Vec<&str> = d.trip_type.iter().map(|t| t.as_str()).collect();
        table.add_row(row![
            d.id,
            d.name,
            d.country,
            d.continent,
            d.priority,
            d.visit_status,
            trip_types.join(", "),
            d.budget.total.estimated
        ]);
    }
    table
}
