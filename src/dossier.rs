use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row};

use crate::error::{DossierError, Result};
use crate::models::{CostLine, Priority, TaskRecord, TaskStatus, TaxScheme, VehicleRecord};

const VEHICLE_COLUMNS: &str = "id, created_at, status, brand, model, trim, plate, chassis, color, fuel, \
     transmission, reporting_code, first_registration, purchase_excl, levy, sale_incl, tax_scheme, \
     notes, raw_extraction, source_checksum, inspection_text, inspection_report";

fn parse_column<T>(idx: usize, raw: String) -> rusqlite::Result<T>
where
    T: std::str::FromStr<Err = String>,
{
    raw.parse()
        .map_err(|e: String| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, e.into()))
}

fn row_to_vehicle(row: &Row) -> rusqlite::Result<VehicleRecord> {
    Ok(VehicleRecord {
        id: row.get(0)?,
        created_at: row.get(1)?,
        status: row.get(2)?,
        brand: row.get(3)?,
        model: row.get(4)?,
        trim: row.get(5)?,
        plate: row.get(6)?,
        chassis: row.get(7)?,
        color: row.get(8)?,
        fuel: row.get(9)?,
        transmission: row.get(10)?,
        reporting_code: row.get(11)?,
        first_registration: row.get(12)?,
        purchase_excl: row.get(13)?,
        levy: row.get(14)?,
        sale_incl: row.get(15)?,
        tax_scheme: parse_column(16, row.get(16)?)?,
        notes: row.get(17)?,
        raw_extraction: row.get(18)?,
        source_checksum: row.get(19)?,
        inspection_text: row.get(20)?,
        inspection_report: row.get(21)?,
        tasks: Vec::new(),
        costs: Vec::new(),
    })
}

fn load_tasks(conn: &Connection, vehicle_id: i64) -> Result<Vec<TaskRecord>> {
    let mut stmt = conn.prepare(
        "SELECT task_key, name, description, priority, status, category, system_generated \
         FROM tasks WHERE vehicle_id = ?1 ORDER BY position",
    )?;
    let rows = stmt
        .query_map([vehicle_id], |row| {
            Ok(TaskRecord {
                key: row.get(0)?,
                name: row.get(1)?,
                description: row.get(2)?,
                priority: parse_column(3, row.get(3)?)?,
                status: parse_column(4, row.get(4)?)?,
                category: row.get(5)?,
                system_generated: row.get(6)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn load_costs(conn: &Connection, vehicle_id: i64) -> Result<Vec<CostLine>> {
    let mut stmt = conn.prepare(
        "SELECT description, amount, basis FROM costs WHERE vehicle_id = ?1 ORDER BY id",
    )?;
    let rows = stmt
        .query_map([vehicle_id], |row| {
            Ok(CostLine {
                description: row.get(0)?,
                amount: row.get(1)?,
                basis: parse_column(2, row.get(2)?)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn with_collections(conn: &Connection, mut vehicle: VehicleRecord) -> Result<VehicleRecord> {
    if let Some(id) = vehicle.id {
        vehicle.tasks = load_tasks(conn, id)?;
        vehicle.costs = load_costs(conn, id)?;
    }
    Ok(vehicle)
}

fn ensure_vehicle(conn: &Connection, id: i64) -> Result<()> {
    let exists = conn
        .prepare_cached("SELECT 1 FROM vehicles WHERE id = ?1")?
        .exists([id])?;
    if exists {
        Ok(())
    } else {
        Err(DossierError::UnknownVehicle(id))
    }
}

fn insert_task_rows(conn: &Connection, vehicle_id: i64, tasks: &[TaskRecord]) -> Result<()> {
    let mut stmt = conn.prepare_cached(
        "INSERT INTO tasks (vehicle_id, position, task_key, name, description, priority, status, category, system_generated) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
    )?;
    for (position, t) in tasks.iter().enumerate() {
        stmt.execute(rusqlite::params![
            vehicle_id,
            position as i64,
            t.key,
            t.name,
            t.description,
            t.priority.as_str(),
            t.status.as_str(),
            t.category,
            t.system_generated,
        ])?;
    }
    Ok(())
}

fn insert_cost_row(conn: &Connection, vehicle_id: i64, cost: &CostLine) -> Result<()> {
    conn.execute(
        "INSERT INTO costs (vehicle_id, description, amount, basis) VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![vehicle_id, cost.description, cost.amount, cost.basis.as_str()],
    )?;
    Ok(())
}

/// Store a vehicle together with any tasks and costs it already carries.
/// The record's own `id` is ignored; the new row id is returned.
pub fn insert_vehicle(conn: &Connection, v: &VehicleRecord) -> Result<i64> {
    insert_vehicle_row(conn, None, v)
}

/// Like [`insert_vehicle`] but keeps the record's `id` when it has one, so
/// restored dossiers stay reachable under the same number.
pub fn insert_vehicle_with_id(conn: &Connection, v: &VehicleRecord) -> Result<i64> {
    insert_vehicle_row(conn, v.id, v)
}

fn insert_vehicle_row(conn: &Connection, id: Option<i64>, v: &VehicleRecord) -> Result<i64> {
    conn.execute(
        "INSERT INTO vehicles (id, created_at, status, brand, model, trim, plate, chassis, color, fuel, \
         transmission, reporting_code, first_registration, purchase_excl, levy, sale_incl, tax_scheme, \
         notes, raw_extraction, source_checksum, inspection_text, inspection_report) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22)",
        rusqlite::params![
            id,
            v.created_at,
            v.status,
            v.brand,
            v.model,
            v.trim,
            v.plate,
            v.chassis,
            v.color,
            v.fuel,
            v.transmission,
            v.reporting_code,
            v.first_registration,
            v.purchase_excl,
            v.levy,
            v.sale_incl,
            v.tax_scheme.as_str(),
            v.notes,
            v.raw_extraction,
            v.source_checksum,
            v.inspection_text,
            v.inspection_report,
        ],
    )?;
    let id = conn.last_insert_rowid();
    insert_task_rows(conn, id, &v.tasks)?;
    for cost in &v.costs {
        insert_cost_row(conn, id, cost)?;
    }
    tracing::info!(vehicle_id = id, "vehicle stored");
    Ok(id)
}

pub fn get_vehicle(conn: &Connection, id: i64) -> Result<VehicleRecord> {
    let vehicle = conn
        .query_row(
            &format!("SELECT {VEHICLE_COLUMNS} FROM vehicles WHERE id = ?1"),
            [id],
            row_to_vehicle,
        )
        .optional()?
        .ok_or(DossierError::UnknownVehicle(id))?;
    with_collections(conn, vehicle)
}

fn matches_search(v: &VehicleRecord, needle: &str) -> bool {
    let haystack = [
        v.brand.as_str(),
        v.model.as_str(),
        v.plate.as_deref().unwrap_or_default(),
        v.chassis.as_deref().unwrap_or_default(),
    ]
    .join(" ")
    .to_lowercase();
    haystack.contains(&needle.to_lowercase())
}

/// All vehicles, newest first, optionally filtered on brand, model, plate or
/// chassis number (case-insensitive).
pub fn list_vehicles(conn: &Connection, search: Option<&str>) -> Result<Vec<VehicleRecord>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {VEHICLE_COLUMNS} FROM vehicles ORDER BY id DESC"
    ))?;
    let vehicles = stmt
        .query_map([], row_to_vehicle)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    vehicles
        .into_iter()
        .filter(|v| match search {
            Some(needle) if !needle.trim().is_empty() => matches_search(v, needle.trim()),
            _ => true,
        })
        .map(|v| with_collections(conn, v))
        .collect()
}

pub fn find_by_checksum(conn: &Connection, checksum: &str) -> Result<Option<i64>> {
    let id = conn
        .query_row(
            "SELECT id FROM vehicles WHERE source_checksum = ?1",
            [checksum],
            |row| row.get(0),
        )
        .optional()?;
    Ok(id)
}

/// Write back the scalar fields of a stored vehicle. Tasks and costs have
/// their own operations and are left untouched.
pub fn update_vehicle(conn: &Connection, v: &VehicleRecord) -> Result<()> {
    let id = v
        .id
        .ok_or_else(|| DossierError::Other("vehicle has not been stored yet".to_string()))?;
    let changed = conn.execute(
        "UPDATE vehicles SET status = ?1, brand = ?2, model = ?3, trim = ?4, plate = ?5, chassis = ?6, \
         color = ?7, fuel = ?8, transmission = ?9, reporting_code = ?10, first_registration = ?11, \
         purchase_excl = ?12, levy = ?13, sale_incl = ?14, tax_scheme = ?15, notes = ?16, \
         inspection_text = ?17, inspection_report = ?18 WHERE id = ?19",
        rusqlite::params![
            v.status,
            v.brand,
            v.model,
            v.trim,
            v.plate,
            v.chassis,
            v.color,
            v.fuel,
            v.transmission,
            v.reporting_code,
            v.first_registration,
            v.purchase_excl,
            v.levy,
            v.sale_incl,
            v.tax_scheme.as_str(),
            v.notes,
            v.inspection_text,
            v.inspection_report,
            id,
        ],
    )?;
    if changed == 0 {
        return Err(DossierError::UnknownVehicle(id));
    }
    tracing::debug!(vehicle_id = id, "vehicle updated");
    Ok(())
}

pub fn delete_vehicle(conn: &Connection, id: i64) -> Result<()> {
    let changed = conn.execute("DELETE FROM vehicles WHERE id = ?1", [id])?;
    if changed == 0 {
        return Err(DossierError::UnknownVehicle(id));
    }
    tracing::info!(vehicle_id = id, "vehicle deleted");
    Ok(())
}

/// Swap the stored task list for `tasks` in one transaction: afterwards the
/// vehicle has either the complete new batch or its previous tasks.
pub fn replace_tasks(conn: &mut Connection, vehicle_id: i64, tasks: &[TaskRecord]) -> Result<()> {
    ensure_vehicle(conn, vehicle_id)?;
    let tx = conn.transaction()?;
    tx.execute("DELETE FROM tasks WHERE vehicle_id = ?1", [vehicle_id])?;
    insert_task_rows(&tx, vehicle_id, tasks)?;
    tx.commit()?;
    tracing::info!(vehicle_id, count = tasks.len(), "tasks replaced");
    Ok(())
}

pub fn update_task(
    conn: &Connection,
    vehicle_id: i64,
    key: &str,
    status: Option<TaskStatus>,
    priority: Option<Priority>,
) -> Result<TaskRecord> {
    ensure_vehicle(conn, vehicle_id)?;
    let mut task = load_tasks(conn, vehicle_id)?
        .into_iter()
        .find(|t| t.key == key)
        .ok_or_else(|| DossierError::Other(format!("Vehicle {vehicle_id} has no task '{key}'")))?;
    if let Some(s) = status {
        task.status = s;
    }
    if let Some(p) = priority {
        task.priority = p;
    }
    conn.execute(
        "UPDATE tasks SET status = ?1, priority = ?2 WHERE vehicle_id = ?3 AND task_key = ?4",
        rusqlite::params![task.status.as_str(), task.priority.as_str(), vehicle_id, key],
    )?;
    Ok(task)
}

/// Number of tasks with status `open` across all vehicles.
pub fn count_open_tasks(conn: &Connection) -> Result<i64> {
    let count = conn.query_row(
        "SELECT count(*) FROM tasks WHERE status = ?1",
        [TaskStatus::Open.as_str()],
        |r| r.get(0),
    )?;
    Ok(count)
}

/// Append a cost line. Lines are never edited afterwards.
pub fn add_cost(conn: &Connection, vehicle_id: i64, cost: &CostLine) -> Result<()> {
    if cost.description.trim().is_empty() {
        return Err(DossierError::InvalidValue("cost description is empty".to_string()));
    }
    if !cost.amount.is_finite() || cost.amount <= 0.0 {
        return Err(DossierError::InvalidValue(format!(
            "cost amount must be greater than zero, got {}",
            cost.amount
        )));
    }
    ensure_vehicle(conn, vehicle_id)?;
    insert_cost_row(conn, vehicle_id, cost)?;
    tracing::debug!(vehicle_id, amount = cost.amount, "cost line added");
    Ok(())
}

/// Partial edit of a vehicle's staff-editable fields.
#[derive(Debug, Default)]
pub struct VehiclePatch {
    pub status: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub trim: Option<String>,
    pub plate: Option<String>,
    pub chassis: Option<String>,
    pub color: Option<String>,
    pub fuel: Option<String>,
    pub transmission: Option<String>,
    pub reporting_code: Option<String>,
    pub first_registration: Option<String>,
    pub purchase_excl: Option<f64>,
    pub levy: Option<f64>,
    pub sale_incl: Option<f64>,
    pub tax_scheme: Option<TaxScheme>,
    pub notes: Option<String>,
}

fn non_negative(field: &str, value: Option<f64>) -> Result<()> {
    match value {
        Some(v) if !v.is_finite() || v < 0.0 => Err(DossierError::InvalidValue(format!(
            "{field} must be zero or positive, got {v}"
        ))),
        _ => Ok(()),
    }
}

/// An empty string clears an optional identifier.
fn optional_text(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

impl VehiclePatch {
    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.brand.is_none()
            && self.model.is_none()
            && self.trim.is_none()
            && self.plate.is_none()
            && self.chassis.is_none()
            && self.color.is_none()
            && self.fuel.is_none()
            && self.transmission.is_none()
            && self.reporting_code.is_none()
            && self.first_registration.is_none()
            && self.purchase_excl.is_none()
            && self.levy.is_none()
            && self.sale_incl.is_none()
            && self.tax_scheme.is_none()
            && self.notes.is_none()
    }

    /// Validate and apply. On error the vehicle is left unchanged.
    pub fn apply(self, v: &mut VehicleRecord) -> Result<()> {
        non_negative("purchase price", self.purchase_excl)?;
        non_negative("levy", self.levy)?;
        non_negative("sale price", self.sale_incl)?;

        fn set<T>(target: &mut T, value: Option<T>) {
            if let Some(value) = value {
                *target = value;
            }
        }
        set(&mut v.status, self.status);
        set(&mut v.brand, self.brand);
        set(&mut v.model, self.model);
        set(&mut v.trim, self.trim);
        set(&mut v.color, self.color);
        set(&mut v.fuel, self.fuel);
        set(&mut v.transmission, self.transmission);
        set(&mut v.reporting_code, self.reporting_code);
        set(&mut v.first_registration, self.first_registration);
        set(&mut v.purchase_excl, self.purchase_excl);
        set(&mut v.levy, self.levy);
        set(&mut v.sale_incl, self.sale_incl);
        set(&mut v.tax_scheme, self.tax_scheme);
        set(&mut v.notes, self.notes);
        if let Some(plate) = self.plate {
            v.plate = optional_text(plate);
        }
        if let Some(chassis) = self.chassis {
            v.chassis = optional_text(chassis);
        }
        Ok(())
    }
}
