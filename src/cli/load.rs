use std::path::PathBuf;

use crate::error::{DossierError, Result};
use crate::settings::{load_settings, save_settings, shellexpand_path, DB_FILE};

pub fn run(path: &str) -> Result<()> {
    let resolved = PathBuf::from(shellexpand_path(path));
    let db_path = resolved.join(DB_FILE);

    if !db_path.exists() {
        return Err(DossierError::Settings(format!(
            "No database found at {}\nRun `dossier init --data-dir {}` to create one.",
            db_path.display(),
            resolved.display()
        )));
    }

    let mut settings = load_settings();
    settings.data_dir = resolved.to_string_lossy().to_string();
    save_settings(&settings)?;

    println!("Switched to {}", resolved.display());
    Ok(())
}
