use colored::Colorize;

use crate::cli::open_db;
use crate::dossier::{get_vehicle, update_vehicle};
use crate::error::{DossierError, Result};
use crate::extractor::{inspection_request, GeminiClient, TextExtractor, INSTRUCTIONS};
use crate::settings::load_settings;

pub fn run(id: i64, text: Option<&str>, report: bool) -> Result<()> {
    let conn = open_db()?;
    let mut vehicle = get_vehicle(&conn, id)?;

    if let Some(t) = text {
        vehicle.inspection_text = t.trim().to_string();
        update_vehicle(&conn, &vehicle)?;
        println!("Inspection notes saved for vehicle {id}.");
    }

    if report {
        if vehicle.inspection_text.is_empty() {
            return Err(DossierError::InvalidValue(
                "no inspection notes yet; pass --text first".to_string(),
            ));
        }
        let client = GeminiClient::from_settings(&load_settings())?;
        println!("Drafting inspection report...");
        let request = inspection_request(&vehicle.inspection_text, &vehicle)?;
        let output = client.extract(INSTRUCTIONS, &request)?;
        vehicle.inspection_report = Some(output);
        update_vehicle(&conn, &vehicle)?;
    }

    if text.is_some() && !report {
        return Ok(());
    }
    if let Some(r) = &vehicle.inspection_report {
        println!("\n{}\n{r}", "Inspection report".bold());
    } else if vehicle.inspection_text.is_empty() {
        println!("No inspection notes for vehicle {id}.");
    } else {
        println!("{}\n{}", "Inspection notes".bold(), vehicle.inspection_text);
    }
    Ok(())
}
