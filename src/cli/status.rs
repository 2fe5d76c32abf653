use crate::db::{get_connection, get_metadata};
use crate::dossier::count_open_tasks;
use crate::error::Result;
use crate::fmt::format_bytes;
use crate::settings::{api_key, load_settings, API_KEY_ENV};

pub fn run() -> Result<()> {
    let settings = load_settings();
    let db_path = settings.db_path();

    println!("Dealer:     {}", settings.dealer_name);
    println!("Data dir:   {}", settings.data_dir);
    println!("Database:   {}", db_path.display());
    println!("Model:      {}", settings.model_name);
    println!(
        "API key:    {}",
        if api_key().is_some() { "set".to_string() } else { format!("(set {API_KEY_ENV})") }
    );

    if db_path.exists() {
        let size = std::fs::metadata(&db_path)?.len();
        println!("DB size:    {}", format_bytes(size));

        let conn = get_connection(&db_path)?;
        let schema = get_metadata(&conn, "schema_version")?;
        println!("Schema:     {}", schema.as_deref().unwrap_or("(not initialized)"));

        let vehicles: i64 = conn.query_row("SELECT count(*) FROM vehicles", [], |r| r.get(0))?;
        let open_tasks = count_open_tasks(&conn)?;
        let relations: i64 = conn.query_row("SELECT count(*) FROM relations", [], |r| r.get(0))?;

        println!();
        println!("Vehicles:    {vehicles}");
        println!("Open tasks:  {open_tasks}");
        println!("Relations:   {relations}");
    } else {
        println!();
        println!("Database not found. Run `dossier init` to set up.");
    }

    Ok(())
}
