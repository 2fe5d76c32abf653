use std::path::PathBuf;

use crate::backup::{backup_database, export_data, read_json, restore_data, write_json};
use crate::cli::open_db;
use crate::error::Result;
use crate::fmt::format_bytes;
use crate::settings::load_settings;

pub fn run(output: Option<String>, json: bool) -> Result<()> {
    let conn = open_db()?;

    let dest_path = match output {
        Some(p) => PathBuf::from(p),
        None => {
            let backups_dir = PathBuf::from(&load_settings().data_dir).join("backups");
            let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
            let ext = if json { "json" } else { "db" };
            backups_dir.join(format!("dossier-{stamp}.{ext}"))
        }
    };

    if json {
        write_json(&export_data(&conn)?, &dest_path)?;
    } else {
        backup_database(&conn, &dest_path)?;
    }

    let size = std::fs::metadata(&dest_path)?.len();
    println!("Backup saved to {}", dest_path.display());
    println!("Size: {}", format_bytes(size));
    Ok(())
}

pub fn restore(file: &str) -> Result<()> {
    let data = read_json(&PathBuf::from(file))?;
    let mut conn = open_db()?;
    let summary = restore_data(&mut conn, &data)?;
    println!(
        "Restored {} vehicles and {} relations from {file}",
        summary.vehicles, summary.relations
    );
    Ok(())
}
