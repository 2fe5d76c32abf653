use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::cli::open_db;
use crate::dossier::{add_cost, get_vehicle};
use crate::error::{DossierError, Result};
use crate::fmt::euro;
use crate::margin::{self, MarginSummary};
use crate::models::{CostLine, TaxBasis};

pub(crate) fn print_costs(costs: &[CostLine]) {
    if costs.is_empty() {
        println!("No extra costs.");
        return;
    }
    let mut table = Table::new();
    table.set_header(vec!["Description", "Amount", "VAT"]);
    for c in costs {
        table.add_row(vec![
            Cell::new(&c.description),
            Cell::new(euro(c.amount)),
            Cell::new(c.basis.as_str()),
        ]);
    }
    println!("Costs\n{table}");
}

pub(crate) fn print_margin(m: &MarginSummary) {
    let mut table = Table::new();
    table.add_row(vec![Cell::new("Purchase (excl. VAT)"), Cell::new(euro(m.purchase_excl))]);
    table.add_row(vec![Cell::new("Levy (BPM)"), Cell::new(euro(m.levy))]);
    table.add_row(vec![Cell::new("Extra costs"), Cell::new(euro(m.total_costs))]);
    table.add_row(vec![Cell::new("Sale (net estimate)"), Cell::new(euro(m.sale_excl))]);
    let result = if m.result >= 0.0 {
        euro(m.result).green().bold().to_string()
    } else {
        euro(m.result).red().bold().to_string()
    };
    table.add_row(vec![Cell::new("Indicative result".bold()), Cell::new(result)]);
    println!("Margin\n{table}");
}

pub fn add(id: i64, description: &str, amount: f64, basis: &str) -> Result<()> {
    let basis: TaxBasis = basis.parse().map_err(DossierError::InvalidValue)?;
    let conn = open_db()?;
    let cost = CostLine {
        description: description.trim().to_string(),
        amount,
        basis,
    };
    add_cost(&conn, id, &cost)?;
    println!("Added cost to vehicle {id}: {} {} ({})", cost.description, euro(amount), basis);
    Ok(())
}

pub fn list(id: i64) -> Result<()> {
    let conn = open_db()?;
    let vehicle = get_vehicle(&conn, id)?;
    print_costs(&vehicle.costs);
    print_margin(&margin::for_vehicle(&vehicle));
    Ok(())
}

pub fn margin(id: i64) -> Result<()> {
    let conn = open_db()?;
    let vehicle = get_vehicle(&conn, id)?;
    print_margin(&margin::for_vehicle(&vehicle));
    Ok(())
}
