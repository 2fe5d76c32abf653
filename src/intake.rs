use std::path::Path;

use rusqlite::Connection;
use sha2::{Digest, Sha256};

use crate::dossier::{find_by_checksum, insert_vehicle};
use crate::error::{DossierError, Result};
use crate::extractor::{intake_request, TextExtractor, INSTRUCTIONS};
use crate::models::{VehicleRecord, DEFAULT_VEHICLE_STATUS};

/// What staff hand in for a new vehicle.
#[derive(Debug, Default)]
pub struct IntakeSource {
    pub text: String,
    pub file_name: Option<String>,
    pub file_bytes: Vec<u8>,
    pub notes: String,
}

impl IntakeSource {
    /// Build a source from pasted text and/or an invoice file. Text files
    /// are read into the request; other files only contribute their name.
    pub fn load(text: Option<&str>, file: Option<&Path>, notes: Option<&str>) -> Result<Self> {
        let mut source = IntakeSource {
            text: text.unwrap_or_default().to_string(),
            notes: notes.unwrap_or_default().to_string(),
            ..Default::default()
        };
        if let Some(path) = file {
            let bytes = std::fs::read(path)?;
            source.file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string());
            if let Ok(contents) = std::str::from_utf8(&bytes) {
                if !contents.trim().is_empty() {
                    if !source.text.is_empty() {
                        source.text.push('\n');
                    }
                    source.text.push_str(contents);
                }
            }
            source.file_bytes = bytes;
        }
        if source.text.trim().is_empty() && source.file_name.is_none() {
            return Err(DossierError::InvalidValue(
                "provide invoice text (--text) or a file (--file)".to_string(),
            ));
        }
        Ok(source)
    }

    pub fn checksum(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.text.trim().as_bytes());
        hasher.update(&self.file_bytes);
        hex::encode(hasher.finalize())
    }
}

pub struct IntakeResult {
    pub vehicle_id: Option<i64>,
    pub duplicate_of: Option<i64>,
    pub raw_extraction: String,
}

/// Create a vehicle dossier from an invoice. Nothing is stored when the
/// source was seen before or when extraction fails.
pub fn intake(
    conn: &Connection,
    extractor: Option<&dyn TextExtractor>,
    source: &IntakeSource,
    today: chrono::NaiveDate,
) -> Result<IntakeResult> {
    let checksum = source.checksum();
    if let Some(existing) = find_by_checksum(conn, &checksum)? {
        tracing::info!(vehicle_id = existing, "invoice already on record");
        return Ok(IntakeResult {
            vehicle_id: None,
            duplicate_of: Some(existing),
            raw_extraction: String::new(),
        });
    }

    let raw_extraction = match extractor {
        Some(ex) => {
            let request = intake_request(&source.text, source.file_name.as_deref());
            ex.extract(INSTRUCTIONS, &request)?
        }
        None => String::new(),
    };

    let vehicle = VehicleRecord {
        created_at: today.format("%Y-%m-%d").to_string(),
        status: DEFAULT_VEHICLE_STATUS.to_string(),
        notes: source.notes.clone(),
        raw_extraction: raw_extraction.clone(),
        source_checksum: Some(checksum),
        ..Default::default()
    };
    let id = insert_vehicle(conn, &vehicle)?;

    Ok(IntakeResult {
        vehicle_id: Some(id),
        duplicate_of: None,
        raw_extraction,
    })
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::db::test_db;
    use crate::dossier::{get_vehicle, list_vehicles};

    struct FakeExtractor {
        output: String,
        seen: RefCell<Vec<String>>,
    }

    impl TextExtractor for FakeExtractor {
        fn extract(&self, instructions: &str, input: &str) -> Result<String> {
            assert!(instructions.contains("Verzin nooit gegevens"));
            self.seen.borrow_mut().push(input.to_string());
            Ok(self.output.clone())
        }
    }

    struct FailingExtractor;

    impl TextExtractor for FailingExtractor {
        fn extract(&self, _: &str, _: &str) -> Result<String> {
            Err(DossierError::Extraction("503 Service Unavailable".to_string()))
        }
    }

    fn today() -> chrono::NaiveDate {
        chrono::NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()
    }

    fn source(text: &str) -> IntakeSource {
        IntakeSource {
            text: text.to_string(),
            notes: "Staat in Utrecht".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_intake_stores_raw_output() {
        let (_dir, conn) = test_db();
        let fake = FakeExtractor {
            output: "Samenvatting: VW Golf".to_string(),
            seen: RefCell::new(Vec::new()),
        };
        let result = intake(&conn, Some(&fake), &source("Factuur 2025-001"), today()).unwrap();
        let id = result.vehicle_id.unwrap();
        let v = get_vehicle(&conn, id).unwrap();
        assert_eq!(v.raw_extraction, "Samenvatting: VW Golf");
        assert_eq!(v.created_at, "2025-03-01");
        assert_eq!(v.status, "Te koop");
        assert_eq!(v.notes, "Staat in Utrecht");
        assert!(v.tasks.is_empty() && v.costs.is_empty());
        assert!(v.brand.is_empty(), "extraction output must not be parsed into fields");
        assert_eq!(fake.seen.borrow().as_slice(), ["Factuur 2025-001"]);
    }

    #[test]
    fn test_duplicate_source_is_refused() {
        let (_dir, conn) = test_db();
        let first = intake(&conn, None, &source("Factuur 7"), today()).unwrap();
        let second = intake(&conn, None, &source("Factuur 7"), today()).unwrap();
        assert_eq!(second.vehicle_id, None);
        assert_eq!(second.duplicate_of, first.vehicle_id);
        assert_eq!(list_vehicles(&conn, None).unwrap().len(), 1);
    }

    #[test]
    fn test_failed_extraction_stores_nothing() {
        let (_dir, conn) = test_db();
        let err = intake(&conn, Some(&FailingExtractor), &source("Factuur 8"), today());
        assert!(matches!(err, Err(DossierError::Extraction(_))));
        assert!(list_vehicles(&conn, None).unwrap().is_empty());
    }

    #[test]
    fn test_load_requires_input() {
        assert!(IntakeSource::load(None, None, None).is_err());
        assert!(IntakeSource::load(Some("   "), None, None).is_err());
    }

    #[test]
    fn test_load_reads_text_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("factuur.txt");
        std::fs::write(&path, "Merk: Volkswagen").unwrap();
        let src = IntakeSource::load(Some("Extra"), Some(&path), Some("notitie")).unwrap();
        assert_eq!(src.text, "Extra\nMerk: Volkswagen");
        assert_eq!(src.file_name.as_deref(), Some("factuur.txt"));
        assert_eq!(src.notes, "notitie");
    }

    #[test]
    fn test_binary_file_contributes_name_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.pdf");
        std::fs::write(&path, [0xff_u8, 0xfe, 0x00, 0x81]).unwrap();
        let src = IntakeSource::load(None, Some(&path), None).unwrap();
        assert!(src.text.is_empty());
        assert_eq!(src.file_name.as_deref(), Some("scan.pdf"));
        assert_ne!(src.checksum(), source("").checksum());
    }
}
