use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::cli::{costs, label, open_db, parse_opt, tasks, EditArgs};
use crate::dossier::{delete_vehicle, get_vehicle, list_vehicles, update_vehicle, VehiclePatch};
use crate::error::{DossierError, Result};
use crate::fmt::euro;
use crate::label::compose;
use crate::margin;
use crate::models::VehicleRecord;
use crate::settings::load_settings;

fn or_dash(value: &str) -> &str {
    if value.trim().is_empty() {
        "-"
    } else {
        value
    }
}

fn title(v: &VehicleRecord) -> String {
    let name = [v.brand.as_str(), v.model.as_str()]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    if name.is_empty() {
        "Onbekend".to_string()
    } else {
        name
    }
}

fn fuel_line(v: &VehicleRecord) -> String {
    if v.fuel.trim().is_empty() {
        String::new()
    } else {
        format!("{} ({})", v.fuel, v.fuel_type().as_str())
    }
}

pub fn list(search: Option<&str>) -> Result<()> {
    let conn = open_db()?;
    let vehicles = list_vehicles(&conn, search)?;
    if vehicles.is_empty() {
        if search.is_some() {
            println!("No vehicles match.");
        } else {
            println!("No vehicles yet. Run `dossier intake` to add one.");
        }
        return Ok(());
    }

    let today = chrono::Local::now().date_naive();
    let mut table = Table::new();
    table.set_header(vec!["ID", "Vehicle", "Plate", "Status", "Sale (incl.)", "Days", "Open tasks"]);
    for v in &vehicles {
        table.add_row(vec![
            Cell::new(v.id.unwrap_or_default()),
            Cell::new(title(v)),
            Cell::new(v.plate.as_deref().unwrap_or_default()),
            Cell::new(&v.status),
            Cell::new(if v.sale_incl > 0.0 { euro(v.sale_incl) } else { String::new() }),
            Cell::new(v.stand_days(today).map(|d| d.to_string()).unwrap_or_default()),
            Cell::new(v.open_tasks()),
        ]);
    }
    println!("Vehicles\n{table}");
    Ok(())
}

pub fn show(id: i64, raw: bool) -> Result<()> {
    let conn = open_db()?;
    let v = get_vehicle(&conn, id)?;
    let settings = load_settings();

    println!("{}", format!("{} (#{id})", title(&v)).bold());
    let mut table = Table::new();
    let fields: Vec<(&str, String)> = vec![
        ("Status", v.status.clone()),
        ("Intake", v.created_at.clone()),
        ("Brand", v.brand.clone()),
        ("Model", v.model.clone()),
        ("Trim", v.trim.clone()),
        ("Plate", v.plate.clone().unwrap_or_default()),
        ("Chassis", v.chassis.clone().unwrap_or_default()),
        ("Fuel", fuel_line(&v)),
        ("Transmission", v.transmission.clone()),
        ("Color", v.color.clone()),
        ("Reporting code", v.reporting_code.clone()),
        ("First registration", v.first_registration.clone()),
        ("Purchase (excl.)", euro(v.purchase_excl)),
        ("Levy (BPM)", euro(v.levy)),
        ("Sale (incl.)", euro(v.sale_incl)),
        ("VAT / margin", v.tax_scheme.label().to_string()),
        ("Notes", v.notes.clone()),
    ];
    for (name, value) in &fields {
        table.add_row(vec![Cell::new(name), Cell::new(or_dash(value))]);
    }
    println!("{table}");

    println!();
    if v.tasks.is_empty() {
        println!("No tasks yet. Run `dossier tasks generate {id}`.");
    } else {
        tasks::print_tasks(&v.tasks);
    }

    println!();
    costs::print_costs(&v.costs);
    costs::print_margin(&margin::for_vehicle(&v));

    println!();
    label::print_label(&compose(&settings.dealer_name, &v));

    if !v.inspection_text.is_empty() {
        println!("\n{}\n{}", "Inspection".bold(), v.inspection_text);
    }
    if raw && !v.raw_extraction.is_empty() {
        println!("\n{}\n{}", "Extraction".bold(), v.raw_extraction);
    }
    Ok(())
}

pub fn edit(args: EditArgs) -> Result<()> {
    let conn = open_db()?;
    let mut v = get_vehicle(&conn, args.id)?;
    let patch = VehiclePatch {
        status: args.status,
        brand: args.brand,
        model: args.model,
        trim: args.trim,
        plate: args.plate,
        chassis: args.chassis,
        color: args.color,
        fuel: args.fuel,
        transmission: args.transmission,
        reporting_code: args.reporting_code,
        first_registration: args.first_registration,
        purchase_excl: args.purchase,
        levy: args.levy,
        sale_incl: args.sale,
        tax_scheme: parse_opt(args.scheme.as_deref())?,
        notes: args.notes,
    };
    if patch.is_empty() {
        return Err(DossierError::InvalidValue("nothing to update".to_string()));
    }
    patch.apply(&mut v)?;
    update_vehicle(&conn, &v)?;
    println!("Updated vehicle {}: {}", args.id, title(&v));
    Ok(())
}

pub fn delete(id: i64) -> Result<()> {
    let conn = open_db()?;
    let v = get_vehicle(&conn, id)?;
    delete_vehicle(&conn, id)?;
    println!("Deleted vehicle {id}: {}", title(&v));
    Ok(())
}
