pub mod backup;
pub mod costs;
pub mod init;
pub mod inspect;
pub mod intake;
pub mod label;
pub mod load;
pub mod relations;
pub mod status;
pub mod tasks;
pub mod vehicles;

use clap::{Parser, Subcommand};
use rusqlite::Connection;

use crate::db::get_connection;
use crate::error::{DossierError, Result};
use crate::settings::get_db_path;

/// Open the configured database, refusing to create a fresh one implicitly.
pub(crate) fn open_db() -> Result<Connection> {
    let path = get_db_path();
    if !path.exists() {
        return Err(DossierError::Settings(format!(
            "No database found at {}\nRun `dossier init` to set up.",
            path.display()
        )));
    }
    get_connection(&path)
}

pub(crate) fn parse_opt<T>(raw: Option<&str>) -> Result<Option<T>>
where
    T: std::str::FromStr<Err = String>,
{
    raw.map(|s| s.parse::<T>().map_err(DossierError::InvalidValue))
        .transpose()
}

#[derive(Parser)]
#[command(name = "dossier", about = "Vehicle intake and dossier tool for the dealership.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Set up: choose a data directory and initialize the database.
    Init {
        /// Path for dossier data (default: ~/Documents/dossier)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
    },
    /// Switch to an existing data directory.
    Load {
        /// Path to data directory containing dossier.db
        path: String,
    },
    /// Read a purchase invoice and create a new vehicle dossier.
    Intake {
        /// Invoice or OCR text
        #[arg(long)]
        text: Option<String>,
        /// Invoice file (text files are read, other files are referenced by name)
        #[arg(long)]
        file: Option<String>,
        /// Extra context: location, particulars, internal notes
        #[arg(long)]
        notes: Option<String>,
        /// Skip the extraction service and only create the dossier
        #[arg(long = "no-extract")]
        no_extract: bool,
    },
    /// Overview of all vehicles.
    List {
        /// Filter on brand, model, plate or chassis number
        #[arg(long)]
        search: Option<String>,
    },
    /// Show the full dossier of one vehicle.
    Show {
        /// Vehicle ID (shown in `dossier list`)
        id: i64,
        /// Also print the raw extraction output
        #[arg(long)]
        raw: bool,
    },
    /// Edit vehicle and financial fields.
    Edit(EditArgs),
    /// Delete a vehicle dossier with its tasks and costs.
    Delete {
        /// Vehicle ID
        id: i64,
    },
    /// Manage the onboarding checklist of a vehicle.
    Tasks {
        #[command(subcommand)]
        command: TasksCommands,
    },
    /// Track extra costs of a vehicle.
    Costs {
        #[command(subcommand)]
        command: CostsCommands,
    },
    /// Show the indicative margin of a vehicle.
    Margin {
        /// Vehicle ID
        id: i64,
    },
    /// Show the key-tag label of a vehicle.
    Label {
        /// Vehicle ID
        id: i64,
    },
    /// Record inspection notes and optionally draft a report.
    Inspect {
        /// Vehicle ID
        id: i64,
        /// Inspection / damage description
        #[arg(long)]
        text: Option<String>,
        /// Draft an inspection report with the extraction service
        #[arg(long)]
        report: bool,
    },
    /// Manage customers.
    Customers {
        #[command(subcommand)]
        command: RelationCommands,
    },
    /// Manage transporters.
    Transporters {
        #[command(subcommand)]
        command: RelationCommands,
    },
    /// Manage suppliers.
    Suppliers {
        #[command(subcommand)]
        command: RelationCommands,
    },
    /// Back up the database (or all data as JSON).
    Backup {
        /// Output path (default: <data_dir>/backups/dossier-YYYYMMDD-HHMMSS.db|json)
        #[arg(long)]
        output: Option<String>,
        /// Write a portable JSON backup instead of a database copy
        #[arg(long)]
        json: bool,
    },
    /// Replace all data with the contents of a JSON backup.
    Restore {
        /// Path to a JSON backup
        file: String,
    },
    /// Show current database and summary statistics.
    Status,
    /// Print a shell completion script.
    Completions {
        /// Shell: bash, zsh, fish, powershell, elvish
        shell: clap_complete::Shell,
    },
}

#[derive(clap::Args)]
pub struct EditArgs {
    /// Vehicle ID
    pub id: i64,
    #[arg(long)]
    pub brand: Option<String>,
    #[arg(long)]
    pub model: Option<String>,
    /// Type / trim level
    #[arg(long)]
    pub trim: Option<String>,
    /// License plate (empty string clears it)
    #[arg(long)]
    pub plate: Option<String>,
    /// Chassis number / VIN (empty string clears it)
    #[arg(long)]
    pub chassis: Option<String>,
    #[arg(long)]
    pub color: Option<String>,
    /// Fuel: benzine, diesel, hybride, PHEV, EV
    #[arg(long)]
    pub fuel: Option<String>,
    #[arg(long)]
    pub transmission: Option<String>,
    /// RDW reporting code (meldcode)
    #[arg(long = "reporting-code")]
    pub reporting_code: Option<String>,
    /// Date of first registration
    #[arg(long = "first-registration")]
    pub first_registration: Option<String>,
    /// Purchase price excl. VAT
    #[arg(long)]
    pub purchase: Option<f64>,
    /// Registration levy (BPM)
    #[arg(long)]
    pub levy: Option<f64>,
    /// Sale price incl. VAT
    #[arg(long)]
    pub sale: Option<f64>,
    /// VAT treatment: btw, marge or onbekend
    #[arg(long)]
    pub scheme: Option<String>,
    /// Sales status, e.g. 'Te koop', 'Verkocht'
    #[arg(long)]
    pub status: Option<String>,
    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(Subcommand)]
pub enum TasksCommands {
    /// Generate the standard checklist from the vehicle's fuel type.
    Generate {
        /// Vehicle ID
        id: i64,
        /// Regenerate even if tasks exist (discards status/priority edits)
        #[arg(long)]
        force: bool,
    },
    /// List the checklist of a vehicle.
    List {
        /// Vehicle ID
        id: i64,
    },
    /// Update status and/or priority of a task.
    Set {
        /// Vehicle ID
        id: i64,
        /// Task key, e.g. transport_plannen
        key: String,
        /// open, in-progress (bezig), done (afgerond)
        #[arg(long)]
        status: Option<String>,
        /// high (hoog), medium (midden), low (laag)
        #[arg(long)]
        priority: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum CostsCommands {
    /// Add a cost line.
    Add {
        /// Vehicle ID
        id: i64,
        /// Description, e.g. 'Poetsen'
        description: String,
        /// Amount in euros
        amount: f64,
        /// Whether the amount includes VAT: incl or excl
        #[arg(long, default_value = "incl")]
        basis: String,
    },
    /// List cost lines and the resulting margin.
    List {
        /// Vehicle ID
        id: i64,
    },
}

#[derive(Subcommand)]
pub enum RelationCommands {
    /// Add a contact.
    Add {
        /// Company or person name
        name: String,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        city: Option<String>,
    },
    /// List contacts.
    List,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Priority;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_edit() {
        let cli = Cli::try_parse_from([
            "dossier", "edit", "3", "--brand", "Volkswagen", "--sale", "30000", "--scheme", "btw",
        ])
        .unwrap();
        match cli.command {
            Commands::Edit(args) => {
                assert_eq!(args.id, 3);
                assert_eq!(args.brand.as_deref(), Some("Volkswagen"));
                assert_eq!(args.sale, Some(30000.0));
                assert_eq!(args.scheme.as_deref(), Some("btw"));
            }
            _ => panic!("expected edit"),
        }
    }

    #[test]
    fn test_parse_opt() {
        assert_eq!(parse_opt::<Priority>(Some("laag")).unwrap(), Some(Priority::Low));
        assert_eq!(parse_opt::<Priority>(None).unwrap(), None);
        assert!(parse_opt::<Priority>(Some("urgent")).is_err());
    }
}
