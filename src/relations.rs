use rusqlite::Connection;

use crate::error::{DossierError, Result};
use crate::models::{Relation, RelationKind};

pub fn add_relation(conn: &Connection, relation: &Relation) -> Result<i64> {
    insert_relation_row(conn, None, relation)
}

/// Insert keeping the relation's own `id` when set. Used by restore.
pub fn insert_relation_with_id(conn: &Connection, relation: &Relation) -> Result<i64> {
    insert_relation_row(conn, relation.id, relation)
}

fn insert_relation_row(conn: &Connection, id: Option<i64>, relation: &Relation) -> Result<i64> {
    if relation.name.trim().is_empty() {
        return Err(DossierError::InvalidValue("name is required".to_string()));
    }
    conn.execute(
        "INSERT INTO relations (id, kind, name, email, phone, city) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        rusqlite::params![
            id,
            relation.kind.as_str(),
            relation.name.trim(),
            relation.email,
            relation.phone,
            relation.city
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

fn query_relations(conn: &Connection, kind: Option<RelationKind>) -> Result<Vec<Relation>> {
    let mut stmt = conn.prepare(
        "SELECT id, kind, name, email, phone, city FROM relations \
         WHERE ?1 IS NULL OR kind = ?1 ORDER BY kind, name COLLATE NOCASE",
    )?;
    let rows = stmt
        .query_map([kind.map(|k| k.as_str())], |row| {
            let kind: String = row.get(1)?;
            Ok(Relation {
                id: row.get(0)?,
                kind: kind.parse().map_err(|e: String| {
                    rusqlite::Error::FromSqlConversionFailure(1, rusqlite::types::Type::Text, e.into())
                })?,
                name: row.get(2)?,
                email: row.get(3)?,
                phone: row.get(4)?,
                city: row.get(5)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn list_relations(conn: &Connection, kind: RelationKind) -> Result<Vec<Relation>> {
    query_relations(conn, Some(kind))
}

pub fn all_relations(conn: &Connection) -> Result<Vec<Relation>> {
    query_relations(conn, None)
}
