use comfy_table::{Cell, Table};

use crate::cli::{open_db, RelationCommands};
use crate::error::Result;
use crate::models::{Relation, RelationKind};
use crate::relations::{add_relation, list_relations};

pub fn run(kind: RelationKind, command: RelationCommands) -> Result<()> {
    match command {
        RelationCommands::Add {
            name,
            email,
            phone,
            city,
        } => add(kind, name, email, phone, city),
        RelationCommands::List => list(kind),
    }
}

fn add(
    kind: RelationKind,
    name: String,
    email: Option<String>,
    phone: Option<String>,
    city: Option<String>,
) -> Result<()> {
    let conn = open_db()?;
    let relation = Relation {
        id: None,
        kind,
        name,
        email,
        phone,
        city,
    };
    add_relation(&conn, &relation)?;
    println!("Added {}: {}", kind.as_str(), relation.name.trim());
    Ok(())
}

fn list(kind: RelationKind) -> Result<()> {
    let conn = open_db()?;
    let rows = list_relations(&conn, kind)?;

    let mut table = Table::new();
    table.set_header(vec!["ID", "Name", "Email", "Phone", "City"]);
    for r in rows {
        table.add_row(vec![
            Cell::new(r.id.unwrap_or_default()),
            Cell::new(r.name),
            Cell::new(r.email.unwrap_or_default()),
            Cell::new(r.phone.unwrap_or_default()),
            Cell::new(r.city.unwrap_or_default()),
        ]);
    }
    println!("{}\n{table}", kind.plural_title());
    Ok(())
}
