use crate::cli::open_db;
use crate::dossier::get_vehicle;
use crate::error::Result;
use crate::label::{compose, LabelLines};
use crate::settings::load_settings;

pub(crate) fn print_label(label: &LabelLines) {
    println!("Key tag");
    let lines = label.lines();
    let width = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    println!("+{}+", "-".repeat(width + 2));
    for line in lines {
        println!("| {line:<width$} |");
    }
    println!("+{}+", "-".repeat(width + 2));
    if !label.summary.is_empty() {
        println!("{}", label.summary);
    }
}

pub fn run(id: i64) -> Result<()> {
    let conn = open_db()?;
    let vehicle = get_vehicle(&conn, id)?;
    print_label(&compose(&load_settings().dealer_name, &vehicle));
    Ok(())
}
