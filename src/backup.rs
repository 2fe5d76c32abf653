use std::path::Path;

use rusqlite::backup::Backup;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::dossier::{insert_vehicle_with_id, list_vehicles};
use crate::error::{DossierError, Result};
use crate::models::{Relation, VehicleRecord};
use crate::relations::{all_relations, insert_relation_with_id};

pub const BACKUP_FORMAT_VERSION: u32 = 1;

/// Everything the tool stores, as one JSON document.
#[derive(Debug, Serialize, Deserialize)]
pub struct BackupData {
    pub version: u32,
    pub exported_at: String,
    #[serde(default)]
    pub vehicles: Vec<VehicleRecord>,
    #[serde(default)]
    pub relations: Vec<Relation>,
}

pub struct RestoreSummary {
    pub vehicles: usize,
    pub relations: usize,
}

pub fn export_data(conn: &Connection) -> Result<BackupData> {
    let mut vehicles = list_vehicles(conn, None)?;
    vehicles.reverse();
    Ok(BackupData {
        version: BACKUP_FORMAT_VERSION,
        exported_at: chrono::Local::now().to_rfc3339(),
        vehicles,
        relations: all_relations(conn)?,
    })
}

pub fn write_json(data: &BackupData, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(data)?;
    std::fs::write(path, format!("{json}\n"))?;
    tracing::info!(path = %path.display(), vehicles = data.vehicles.len(), "JSON backup written");
    Ok(())
}

pub fn read_json(path: &Path) -> Result<BackupData> {
    let content = std::fs::read_to_string(path)?;
    let data: BackupData = serde_json::from_str(&content)?;
    if data.version > BACKUP_FORMAT_VERSION {
        return Err(DossierError::Other(format!(
            "backup format {} is newer than supported ({BACKUP_FORMAT_VERSION})",
            data.version
        )));
    }
    Ok(data)
}

/// Replace all stored data with the backup contents. Vehicle and relation ids
/// are kept. Runs in a single transaction, so a failing restore leaves the
/// current data in place.
pub fn restore_data(conn: &mut Connection, data: &BackupData) -> Result<RestoreSummary> {
    let tx = conn.transaction()?;
    tx.execute_batch(
        "DELETE FROM costs; DELETE FROM tasks; DELETE FROM vehicles; DELETE FROM relations;",
    )?;
    for vehicle in &data.vehicles {
        insert_vehicle_with_id(&tx, vehicle)?;
    }
    for relation in &data.relations {
        insert_relation_with_id(&tx, relation)?;
    }
    tx.commit()?;
    tracing::info!(vehicles = data.vehicles.len(), relations = data.relations.len(), "backup restored");
    Ok(RestoreSummary {
        vehicles: data.vehicles.len(),
        relations: data.relations.len(),
    })
}

/// Online copy of the SQLite database to `dest`.
pub fn backup_database(conn: &Connection, dest: &Path) -> Result<()> {
    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut dest_conn = Connection::open(dest)?;
    let backup = Backup::new(conn, &mut dest_conn)?;
    backup.run_to_completion(100, std::time::Duration::from_millis(10), None)?;
    tracing::info!(path = %dest.display(), "database backup written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{get_connection, test_db};
    use crate::dossier::{add_cost, delete_vehicle, get_vehicle, insert_vehicle, replace_tasks};
    use crate::relations::add_relation;
    use crate::models::{CostLine, RelationKind, TaxBasis, TaxScheme};
    use crate::tasks::generate_tasks;

    fn seed(conn: &mut Connection) -> i64 {
        let v = VehicleRecord {
            created_at: "2025-02-10".to_string(),
            status: "Te koop".to_string(),
            brand: "Kia".to_string(),
            model: "Niro".to_string(),
            fuel: "PHEV".to_string(),
            sale_incl: 27500.0,
            tax_scheme: TaxScheme::TaxInclusive,
            ..Default::default()
        };
        let id = insert_vehicle(conn, &v).unwrap();
        replace_tasks(conn, id, &generate_tasks(&v.fuel)).unwrap();
        add_cost(
            conn,
            id,
            &CostLine {
                description: "Transport".to_string(),
                amount: 250.0,
                basis: TaxBasis::Exclusive,
            },
        )
        .unwrap();
        add_relation(
            conn,
            &Relation {
                id: None,
                kind: RelationKind::Supplier,
                name: "Autohandel Noord".to_string(),
                email: None,
                phone: Some("050-1234567".to_string()),
                city: None,
            },
        )
        .unwrap();
        id
    }

    #[test]
    fn test_json_export_restore() {
        let (dir, mut conn) = test_db();
        let id = seed(&mut conn);
        let original = get_vehicle(&conn, id).unwrap();

        let path = dir.path().join("backup.json");
        write_json(&export_data(&conn).unwrap(), &path).unwrap();

        let target_path = dir.path().join("restored.db");
        let mut target = get_connection(&target_path).unwrap();
        crate::db::init_db(&target).unwrap();
        let summary = restore_data(&mut target, &read_json(&path).unwrap()).unwrap();
        assert_eq!((summary.vehicles, summary.relations), (1, 1));

        let restored = list_vehicles(&target, None).unwrap().remove(0);
        assert_eq!(restored.brand, original.brand);
        assert_eq!(restored.tasks, original.tasks);
        assert_eq!(restored.costs, original.costs);
        assert_eq!(restored.tax_scheme, TaxScheme::TaxInclusive);
    }

    #[test]
    fn test_restore_replaces_existing_data() {
        let (_dir, mut conn) = test_db();
        seed(&mut conn);
        let empty = BackupData {
            version: BACKUP_FORMAT_VERSION,
            exported_at: String::new(),
            vehicles: Vec::new(),
            relations: Vec::new(),
        };
        restore_data(&mut conn, &empty).unwrap();
        assert!(list_vehicles(&conn, None).unwrap().is_empty());
        let tasks: i64 = conn.query_row("SELECT count(*) FROM tasks", [], |r| r.get(0)).unwrap();
        assert_eq!(tasks, 0);
    }

    #[test]
    fn test_failed_restore_keeps_data() {
        let (_dir, mut conn) = test_db();
        seed(&mut conn);
        let mut bad = export_data(&conn).unwrap();
        bad.relations[0].name = String::new();
        assert!(restore_data(&mut conn, &bad).is_err());
        assert_eq!(list_vehicles(&conn, None).unwrap().len(), 1);
        assert_eq!(all_relations(&conn).unwrap().len(), 1);
    }

    #[test]
    fn test_restore_keeps_ids_across_gaps() {
        let (dir, mut conn) = test_db();
        let mut ids = Vec::new();
        for brand in ["Kia", "Audi", "Tesla"] {
            let v = VehicleRecord {
                brand: brand.to_string(),
                ..Default::default()
            };
            ids.push(insert_vehicle(&conn, &v).unwrap());
        }
        delete_vehicle(&conn, ids[1]).unwrap();
        for name in ["Transport Snel", "Autohandel Noord"] {
            add_relation(
                &conn,
                &Relation {
                    id: None,
                    kind: RelationKind::Supplier,
                    name: name.to_string(),
                    email: None,
                    phone: None,
                    city: None,
                },
            )
            .unwrap();
        }
        conn.execute("DELETE FROM relations WHERE name = 'Transport Snel'", []).unwrap();
        let relation_id = all_relations(&conn).unwrap()[0].id;
        assert_eq!(relation_id, Some(2));

        let path = dir.path().join("backup.json");
        write_json(&export_data(&conn).unwrap(), &path).unwrap();
        restore_data(&mut conn, &read_json(&path).unwrap()).unwrap();

        assert_eq!(get_vehicle(&conn, ids[2]).unwrap().brand, "Tesla");
        assert_eq!(get_vehicle(&conn, ids[0]).unwrap().brand, "Kia");
        assert!(matches!(get_vehicle(&conn, ids[1]), Err(DossierError::UnknownVehicle(_))));
        assert_eq!(all_relations(&conn).unwrap()[0].id, relation_id);
    }

    #[test]
    fn test_newer_format_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("future.json");
        std::fs::write(&path, r#"{"version": 99, "exported_at": ""}"#).unwrap();
        assert!(read_json(&path).is_err());
    }

    #[test]
    fn test_database_backup() {
        let (dir, mut conn) = test_db();
        seed(&mut conn);
        let dest = dir.path().join("backups").join("copy.db");
        backup_database(&conn, &dest).unwrap();
        let copy = get_connection(&dest).unwrap();
        assert_eq!(list_vehicles(&copy, None).unwrap().len(), 1);
    }
}
