use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Fuel classification derived from the free-text fuel field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FuelType {
    Petrol,
    Diesel,
    Hybrid,
    PluginHybrid,
    Electric,
    Unknown,
}

impl FuelType {
    /// Case-insensitive substring classification, first match wins.
    /// "phev" contains "ev", so plug-in hybrids are checked first.
    pub fn classify(raw: &str) -> Self {
        let fuel = raw.to_lowercase();
        if fuel.contains("phev") || fuel.contains("plug") {
            FuelType::PluginHybrid
        } else if fuel.contains("ev") || fuel.contains("elektrisch") || fuel.contains("electric") {
            FuelType::Electric
        } else if fuel.contains("hybr") {
            FuelType::Hybrid
        } else if fuel.contains("diesel") {
            FuelType::Diesel
        } else if fuel.contains("benzine") || fuel.contains("petrol") {
            FuelType::Petrol
        } else {
            FuelType::Unknown
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FuelType::Petrol => "petrol",
            FuelType::Diesel => "diesel",
            FuelType::Hybrid => "hybrid",
            FuelType::PluginHybrid => "plug-in hybrid",
            FuelType::Electric => "electric",
            FuelType::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxScheme {
    /// Regular VAT vehicle ("BTW-auto"): sale price includes 21% VAT.
    TaxInclusive,
    /// Margin vehicle: VAT is levied over the margin only.
    Margin,
    #[default]
    Unknown,
}

impl TaxScheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaxScheme::TaxInclusive => "tax_inclusive",
            TaxScheme::Margin => "margin",
            TaxScheme::Unknown => "unknown",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TaxScheme::TaxInclusive => "BTW",
            TaxScheme::Margin => "Marge",
            TaxScheme::Unknown => "Onbekend",
        }
    }
}

impl FromStr for TaxScheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "tax_inclusive" | "tax-inclusive" | "btw" | "vat" => Ok(TaxScheme::TaxInclusive),
            "margin" | "marge" => Ok(TaxScheme::Margin),
            "unknown" | "onbekend" | "" => Ok(TaxScheme::Unknown),
            other => Err(format!("unknown tax scheme '{other}' (expected btw, marge or onbekend)")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "high" | "hoog" => Ok(Priority::High),
            "medium" | "midden" => Ok(Priority::Medium),
            "low" | "laag" => Ok(Priority::Low),
            other => Err(format!("unknown priority '{other}' (expected high, medium or low)")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Open,
    InProgress,
    Done,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Open => "open",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Done => "done",
        }
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "open" => Ok(TaskStatus::Open),
            "in_progress" | "in-progress" | "bezig" => Ok(TaskStatus::InProgress),
            "done" | "afgerond" => Ok(TaskStatus::Done),
            other => Err(format!("unknown status '{other}' (expected open, in-progress or done)")),
        }
    }
}

/// Whether a cost line amount includes VAT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxBasis {
    Inclusive,
    Exclusive,
}

impl TaxBasis {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaxBasis::Inclusive => "incl",
            TaxBasis::Exclusive => "excl",
        }
    }
}

impl FromStr for TaxBasis {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "incl" | "inclusive" => Ok(TaxBasis::Inclusive),
            "excl" | "exclusive" => Ok(TaxBasis::Exclusive),
            other => Err(format!("unknown tax basis '{other}' (expected incl or excl)")),
        }
    }
}

macro_rules! display_as_str {
    ($($t:ty),*) => {
        $(impl fmt::Display for $t {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        })*
    };
}

display_as_str!(TaxScheme, Priority, TaskStatus, TaxBasis);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub key: String,
    pub name: String,
    pub description: String,
    pub priority: Priority,
    pub status: TaskStatus,
    pub category: String,
    pub system_generated: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostLine {
    pub description: String,
    pub amount: f64,
    pub basis: TaxBasis,
}

pub const DEFAULT_VEHICLE_STATUS: &str = "Te koop";

/// One vehicle dossier as staff see and edit it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VehicleRecord {
    pub id: Option<i64>,
    /// Intake date, YYYY-MM-DD.
    pub created_at: String,
    pub status: String,
    pub brand: String,
    pub model: String,
    pub trim: String,
    pub plate: Option<String>,
    pub chassis: Option<String>,
    pub color: String,
    pub fuel: String,
    pub transmission: String,
    pub reporting_code: String,
    pub first_registration: String,
    pub purchase_excl: f64,
    pub levy: f64,
    pub sale_incl: f64,
    pub tax_scheme: TaxScheme,
    pub notes: String,
    pub raw_extraction: String,
    pub source_checksum: Option<String>,
    pub inspection_text: String,
    pub inspection_report: Option<String>,
    #[serde(default)]
    pub tasks: Vec<TaskRecord>,
    #[serde(default)]
    pub costs: Vec<CostLine>,
}

impl VehicleRecord {
    pub fn fuel_type(&self) -> FuelType {
        FuelType::classify(&self.fuel)
    }

    /// Tasks nobody has started yet.
    pub fn open_tasks(&self) -> usize {
        self.tasks
            .iter()
            .filter(|t| t.status == TaskStatus::Open)
            .count()
    }

    /// Days the vehicle has been in stock as of `today`.
    pub fn stand_days(&self, today: chrono::NaiveDate) -> Option<i64> {
        chrono::NaiveDate::parse_from_str(&self.created_at, "%Y-%m-%d")
            .ok()
            .map(|created| (today - created).num_days())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    Customer,
    Transporter,
    Supplier,
}

impl RelationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationKind::Customer => "customer",
            RelationKind::Transporter => "transporter",
            RelationKind::Supplier => "supplier",
        }
    }

    pub fn plural_title(&self) -> &'static str {
        match self {
            RelationKind::Customer => "Customers",
            RelationKind::Transporter => "Transporters",
            RelationKind::Supplier => "Suppliers",
        }
    }
}

impl FromStr for RelationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "customer" => Ok(RelationKind::Customer),
            "transporter" => Ok(RelationKind::Transporter),
            "supplier" => Ok(RelationKind::Supplier),
            other => Err(format!("unknown relation kind '{other}'")),
        }
    }
}

/// A customer, transporter or supplier contact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relation {
    pub id: Option<i64>,
    pub kind: RelationKind,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub city: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_plugin_hybrid_wins_over_fuel() {
        assert_eq!(FuelType::classify("PHEV benzine"), FuelType::PluginHybrid);
        assert_eq!(FuelType::classify("Plug-in hybride"), FuelType::PluginHybrid);
    }

    #[test]
    fn test_classify_electric() {
        assert_eq!(FuelType::classify("EV"), FuelType::Electric);
        assert_eq!(FuelType::classify("Elektrisch"), FuelType::Electric);
        assert_eq!(FuelType::classify("electric"), FuelType::Electric);
    }

    #[test]
    fn test_classify_hybrid_is_not_combustion() {
        assert_eq!(FuelType::classify("Hybride benzine"), FuelType::Hybrid);
        assert_eq!(FuelType::classify("Benzine"), FuelType::Petrol);
        assert_eq!(FuelType::classify("DIESEL"), FuelType::Diesel);
    }

    #[test]
    fn test_classify_unknown() {
        assert_eq!(FuelType::classify(""), FuelType::Unknown);
        assert_eq!(FuelType::classify("LPG"), FuelType::Unknown);
    }

    #[test]
    fn test_dutch_vocabulary_parses() {
        assert_eq!("hoog".parse::<Priority>().unwrap(), Priority::High);
        assert_eq!("bezig".parse::<TaskStatus>().unwrap(), TaskStatus::InProgress);
        assert_eq!("afgerond".parse::<TaskStatus>().unwrap(), TaskStatus::Done);
        assert_eq!("BTW".parse::<TaxScheme>().unwrap(), TaxScheme::TaxInclusive);
        assert_eq!("Marge".parse::<TaxScheme>().unwrap(), TaxScheme::Margin);
        assert!("maybe".parse::<TaxScheme>().is_err());
    }

    #[test]
    fn test_stored_names_roundtrip() {
        for s in [TaskStatus::Open, TaskStatus::InProgress, TaskStatus::Done] {
            assert_eq!(s.as_str().parse::<TaskStatus>().unwrap(), s);
        }
        for s in [TaxScheme::TaxInclusive, TaxScheme::Margin, TaxScheme::Unknown] {
            assert_eq!(s.as_str().parse::<TaxScheme>().unwrap(), s);
        }
    }

    #[test]
    fn test_open_tasks_excludes_started_work() {
        let task = |status| TaskRecord {
            key: "k".to_string(),
            name: "n".to_string(),
            description: String::new(),
            priority: Priority::Low,
            status,
            category: "technical".to_string(),
            system_generated: true,
        };
        let v = VehicleRecord {
            tasks: vec![
                task(TaskStatus::Open),
                task(TaskStatus::InProgress),
                task(TaskStatus::Done),
            ],
            ..Default::default()
        };
        assert_eq!(v.open_tasks(), 1);
    }

    #[test]
    fn test_stand_days() {
        let v = VehicleRecord {
            created_at: "2025-01-01".to_string(),
            ..Default::default()
        };
        let today = chrono::NaiveDate::from_ymd_opt(2025, 1, 31).unwrap();
        assert_eq!(v.stand_days(today), Some(30));
        assert_eq!(VehicleRecord::default().stand_days(today), None);
    }
}
