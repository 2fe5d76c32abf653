use crate::models::VehicleRecord;

pub const DEFAULT_DEALER_NAME: &str = "Land Automotive";

/// Key-tag label: at most four short lines. Derived on demand, never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelLines {
    pub line1: String,
    pub line2: String,
    pub line3: String,
    pub line4: String,
    pub summary: String,
}

impl LabelLines {
    pub fn lines(&self) -> [&str; 4] {
        [
            self.line1.as_str(),
            self.line2.as_str(),
            self.line3.as_str(),
            self.line4.as_str(),
        ]
    }
}

fn join_words(parts: &[&str]) -> String {
    parts
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn last_chars(s: &str, n: usize) -> String {
    let count = s.chars().count();
    s.chars().skip(count.saturating_sub(n)).collect()
}

/// Plate if known, otherwise the tail of the chassis number.
pub fn identifier_line(plate: Option<&str>, chassis: Option<&str>) -> String {
    let plate = plate.map(str::trim).unwrap_or_default();
    if !plate.is_empty() {
        return plate.to_string();
    }
    chassis
        .map(|c| last_chars(c.trim(), 4))
        .unwrap_or_default()
}

pub fn compose(dealer_name: &str, vehicle: &VehicleRecord) -> LabelLines {
    let line2 = join_words(&[
        vehicle.brand.as_str(),
        vehicle.model.as_str(),
        vehicle.trim.as_str(),
    ]);
    let line3 = identifier_line(vehicle.plate.as_deref(), vehicle.chassis.as_deref());
    let line4 = join_words(&[vehicle.color.as_str(), vehicle.fuel.as_str()]);

    let summary = [line2.as_str(), line3.as_str(), line4.as_str()]
        .into_iter()
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join(" | ");

    LabelLines {
        line1: dealer_name.to_string(),
        line2,
        line3,
        line4,
        summary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn golf() -> VehicleRecord {
        VehicleRecord {
            brand: "Volkswagen".to_string(),
            model: "Golf".to_string(),
            trim: "Style".to_string(),
            plate: Some("AB-123-C".to_string()),
            chassis: Some("WVWZZZ1234567890".to_string()),
            color: "Grijs".to_string(),
            fuel: "Diesel".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_full_label() {
        let label = compose(DEFAULT_DEALER_NAME, &golf());
        assert_eq!(label.line1, "Land Automotive");
        assert_eq!(label.line2, "Volkswagen Golf Style");
        assert_eq!(label.line3, "AB-123-C");
        assert_eq!(label.line4, "Grijs Diesel");
        assert_eq!(label.summary, "Volkswagen Golf Style | AB-123-C | Grijs Diesel");
    }

    #[test]
    fn test_chassis_tail_without_plate() {
        let mut v = golf();
        v.plate = None;
        assert_eq!(compose(DEFAULT_DEALER_NAME, &v).line3, "7890");
        v.plate = Some(String::new());
        assert_eq!(compose(DEFAULT_DEALER_NAME, &v).line3, "7890");
    }

    #[test]
    fn test_short_chassis_is_not_padded() {
        assert_eq!(identifier_line(None, Some("X9")), "X9");
        assert_eq!(identifier_line(None, None), "");
    }

    #[test]
    fn test_missing_parts_are_skipped() {
        let v = VehicleRecord {
            brand: "Tesla".to_string(),
            trim: " Long Range ".to_string(),
            fuel: "EV".to_string(),
            ..Default::default()
        };
        let label = compose(DEFAULT_DEALER_NAME, &v);
        assert_eq!(label.line2, "Tesla Long Range");
        assert_eq!(label.line4, "EV");
        assert_eq!(label.summary, "Tesla Long Range | EV");
    }

    #[test]
    fn test_empty_vehicle() {
        let label = compose("Dealer", &VehicleRecord::default());
        assert_eq!(label.lines(), ["Dealer", "", "", ""]);
        assert!(label.summary.is_empty());
    }
}
