use crate::models::{FuelType, Priority, TaskRecord, TaskStatus, VehicleRecord};

struct TaskTemplate {
    key: &'static str,
    name: &'static str,
    description: &'static str,
    category: &'static str,
    priority: Priority,
}

/// Emitted for every vehicle, in this order.
const BASELINE: &[TaskTemplate] = &[
    TaskTemplate {
        key: "transport_plannen",
        name: "Transport plannen",
        description: "Plan transport vanaf de leverancier naar de vestiging.",
        category: "logistics",
        priority: Priority::High,
    },
    TaskTemplate {
        key: "online_zetten",
        name: "Online zetten",
        description: "Zet het voertuig online in Mobilox en op de website.",
        category: "sales-prep",
        priority: Priority::High,
    },
    TaskTemplate {
        key: "check_extra_werk",
        name: "Extra werk checken",
        description: "Controleer cosmetisch en technisch werk en poetsen.",
        category: "technical",
        priority: Priority::Medium,
    },
];

static BPM_REPORT: TaskTemplate = TaskTemplate {
    key: "bpm_rapport_maken",
    name: "BPM-rapport maken",
    description: "Maak een BPM-rapport voor deze plug-in hybride.",
    category: "administration",
    priority: Priority::Medium,
};

static RANGE_TEST: TaskTemplate = TaskTemplate {
    key: "actieradius_testen",
    name: "Actieradius testen",
    description: "Test globaal de actieradius van de elektrische auto.",
    category: "technical",
    priority: Priority::Low,
};

static APPRAISAL: TaskTemplate = TaskTemplate {
    key: "taxatie_inplannen",
    name: "Taxatie inplannen",
    description: "Plan een taxatie in voor deze brandstofauto.",
    category: "administration",
    priority: Priority::Medium,
};

fn conditional_task(fuel: FuelType) -> Option<&'static TaskTemplate> {
    match fuel {
        FuelType::PluginHybrid => Some(&BPM_REPORT),
        FuelType::Electric => Some(&RANGE_TEST),
        FuelType::Petrol | FuelType::Diesel => Some(&APPRAISAL),
        FuelType::Hybrid | FuelType::Unknown => None,
    }
}

impl TaskTemplate {
    fn instantiate(&self) -> TaskRecord {
        TaskRecord {
            key: self.key.to_string(),
            name: self.name.to_string(),
            description: self.description.to_string(),
            priority: self.priority,
            status: TaskStatus::Open,
            category: self.category.to_string(),
            system_generated: true,
        }
    }
}

/// Build the onboarding checklist for a vehicle with the given fuel text:
/// the baseline followed by at most one fuel-specific task.
pub fn generate_tasks(fuel: &str) -> Vec<TaskRecord> {
    BASELINE
        .iter()
        .chain(conditional_task(FuelType::classify(fuel)))
        .map(TaskTemplate::instantiate)
        .collect()
}

/// Replace the record's whole task collection with a freshly generated batch.
/// Earlier status/priority edits are discarded.
pub fn regenerate(record: &mut VehicleRecord) {
    record.tasks = generate_tasks(&record.fuel);
}
