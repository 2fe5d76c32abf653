use std::path::PathBuf;

use colored::Colorize;

use crate::cli::open_db;
use crate::error::Result;
use crate::extractor::{GeminiClient, TextExtractor};
use crate::intake::{intake, IntakeSource};
use crate::settings::load_settings;

pub fn run(
    text: Option<&str>,
    file: Option<&str>,
    notes: Option<&str>,
    no_extract: bool,
) -> Result<()> {
    let file = file.map(PathBuf::from);
    let source = IntakeSource::load(text, file.as_deref(), notes)?;
    let conn = open_db()?;

    let client = if no_extract {
        None
    } else {
        Some(GeminiClient::from_settings(&load_settings())?)
    };
    let extractor = client.as_ref().map(|c| c as &dyn TextExtractor);

    if extractor.is_some() {
        println!("Processing invoice...");
    }
    let today = chrono::Local::now().date_naive();
    let result = intake(&conn, extractor, &source, today)?;

    if let Some(existing) = result.duplicate_of {
        println!("This invoice has already been processed (vehicle {existing}).");
        return Ok(());
    }

    if let Some(id) = result.vehicle_id {
        println!("{}", format!("Created vehicle {id}.").green());
        if !result.raw_extraction.is_empty() {
            println!("\n{}\n{}", "Extraction".bold(), result.raw_extraction);
        }
        println!("\nNext: `dossier edit {id} --brand ...` to fill in the fields, then `dossier tasks generate {id}`.");
    }
    Ok(())
}
