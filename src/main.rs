mod backup;
mod cli;
mod db;
mod dossier;
mod error;
mod extractor;
mod fmt;
mod intake;
mod label;
mod margin;
mod models;
mod relations;
mod settings;
mod tasks;

use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands, CostsCommands, TasksCommands};
use models::RelationKind;

fn init_logging() {
    let filter = EnvFilter::try_from_env("DOSSIER_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    init_logging();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init { data_dir } => cli::init::run(data_dir),
        Commands::Load { path } => cli::load::run(&path),
        Commands::Intake {
            text,
            file,
            notes,
            no_extract,
        } => cli::intake::run(text.as_deref(), file.as_deref(), notes.as_deref(), no_extract),
        Commands::List { search } => cli::vehicles::list(search.as_deref()),
        Commands::Show { id, raw } => cli::vehicles::show(id, raw),
        Commands::Edit(args) => cli::vehicles::edit(args),
        Commands::Delete { id } => cli::vehicles::delete(id),
        Commands::Tasks { command } => match command {
            TasksCommands::Generate { id, force } => cli::tasks::generate(id, force),
            TasksCommands::List { id } => cli::tasks::list(id),
            TasksCommands::Set {
                id,
                key,
                status,
                priority,
            } => cli::tasks::set(id, &key, status.as_deref(), priority.as_deref()),
        },
        Commands::Costs { command } => match command {
            CostsCommands::Add {
                id,
                description,
                amount,
                basis,
            } => cli::costs::add(id, &description, amount, &basis),
            CostsCommands::List { id } => cli::costs::list(id),
        },
        Commands::Margin { id } => cli::costs::margin(id),
        Commands::Label { id } => cli::label::run(id),
        Commands::Inspect { id, text, report } => cli::inspect::run(id, text.as_deref(), report),
        Commands::Customers { command } => cli::relations::run(RelationKind::Customer, command),
        Commands::Transporters { command } => cli::relations::run(RelationKind::Transporter, command),
        Commands::Suppliers { command } => cli::relations::run(RelationKind::Supplier, command),
        Commands::Backup { output, json } => cli::backup::run(output, json),
        Commands::Restore { file } => cli::backup::restore(&file),
        Commands::Status => cli::status::run(),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "dossier", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        tracing::debug!(error = ?e, "command failed");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
