//! Maps deduplicated schedule rows into the externally visible service shape.
//!
//! Display names and categories live in flat lookup functions over closed key
//! sets; anything unmapped falls back to a generated name and the "other"
//! category.

use db::models::{fluid_spec::FluidSpec, schedule_entry::ScheduleEntry};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::urgency::{Urgency, UrgencyAssessment};

/// Externally visible service record. Ephemeral: built per lookup request,
/// never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct FormattedService {
    pub service_name: String,
    pub mileage_interval: i64,
    pub service_category: String,
    pub service_description: String,
    pub parts: Vec<ServicePart>,
    pub estimated_labor_hours: f64,
    pub urgency: Urgency,
    pub priority: i64,
    pub mileage_until_due: i64,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct ServicePart {
    pub part_number: String,
    pub description: String,
    pub qty: f64,
    pub unit: String,
}

/// Build the externally visible record for a deduplicated entry. Labor hours
/// are always zero here; the finalization pass substitutes the category
/// fallback.
pub fn format_service(
    entry: &ScheduleEntry,
    interval_miles: i64,
    fluid: Option<&FluidSpec>,
    assessment: UrgencyAssessment,
) -> FormattedService {
    FormattedService {
        service_name: display_name(&entry.maintenance_item, &entry.action_type),
        mileage_interval: interval_miles,
        service_category: service_category(&entry.maintenance_item, entry.item_category.as_deref())
            .to_string(),
        service_description: description(entry, interval_miles, fluid),
        parts: fluid.map(fluid_parts).unwrap_or_default(),
        estimated_labor_hours: 0.0,
        urgency: assessment.urgency,
        priority: assessment.priority,
        mileage_until_due: assessment.mileage_until_due,
        reason: assessment.reason,
    }
}

fn display_name(item: &str, action: &str) -> String {
    match (item, action) {
        ("Engine Oil", "replace") => "Engine oil change".to_string(),
        ("Engine Oil Filter", "replace") => "Engine oil filter change".to_string(),
        ("Engine Coolant", "replace") => "Coolant flush".to_string(),
        ("Brake Fluid", "replace") => "Brake fluid flush".to_string(),
        ("Transmission Fluid", "replace") => "Transmission fluid service".to_string(),
        ("Power Steering Fluid", "replace") => "Power steering fluid service".to_string(),
        ("Engine Air Filter", "replace") => "Engine air filter replacement".to_string(),
        ("Cabin Air Filter", "replace") => "Cabin air filter replacement".to_string(),
        ("Spark Plugs", "replace") => "Spark plug replacement".to_string(),
        ("Tires", "rotate") => "Tire rotation".to_string(),
        ("Brake Pads", "inspect") => "Brake inspection".to_string(),
        ("Drive Belt", "inspect") => "Drive belt inspection".to_string(),
        _ => format!("{item} {action}"),
    }
}

/// Category resolution order: item table, then the schedule's own grouping,
/// then "other".
fn service_category(item: &str, db_category: Option<&str>) -> &'static str {
    if let Some(category) = item_category(item) {
        return category;
    }
    if let Some(category) = db_category.and_then(grouping_category) {
        return category;
    }
    "other"
}

fn item_category(item: &str) -> Option<&'static str> {
    match item {
        "Engine Oil" | "Engine Oil Filter" => Some("oil_change"),
        "Engine Coolant" | "Brake Fluid" | "Transmission Fluid" | "Power Steering Fluid"
        | "Differential Fluid" | "Transfer Case Fluid" => Some("fluid_service"),
        "Engine Air Filter" | "Cabin Air Filter" => Some("filter"),
        "Spark Plugs" => Some("ignition"),
        "Tires" => Some("tire"),
        "Brake Pads" | "Brake Rotors" => Some("brake"),
        "Drive Belt" | "Timing Belt" => Some("belt"),
        "Battery" => Some("battery"),
        _ => None,
    }
}

fn grouping_category(db_category: &str) -> Option<&'static str> {
    match db_category {
        "lubrication" => Some("oil_change"),
        "cooling" | "transmission" | "hydraulics" => Some("fluid_service"),
        "filters" => Some("filter"),
        "ignition" => Some("ignition"),
        "tires_wheels" => Some("tire"),
        "brakes" => Some("brake"),
        "belts_hoses" => Some("belt"),
        "electrical" => Some("electrical"),
        "inspection" => Some("inspection"),
        _ => None,
    }
}

fn description(entry: &ScheduleEntry, interval_miles: i64, fluid: Option<&FluidSpec>) -> String {
    let mut description = format!(
        "{} {}",
        capitalize(&entry.action_type),
        entry.maintenance_item.to_lowercase()
    );
    if let Some(fluid) = fluid {
        if let Some(quarts) = fluid.capacity_quarts {
            match fluid.capacity_liters {
                Some(liters) => {
                    description.push_str(&format!(". Capacity: {quarts} quarts ({liters}L)"))
                }
                None => description.push_str(&format!(". Capacity: {quarts} quarts")),
            }
        }
        if let Some(spec) = fluid.fluid_spec.as_deref() {
            description.push_str(&format!(". Spec: {spec}"));
        }
    }
    if let Some(notes) = entry.notes.as_deref() {
        description.push_str(&format!(". {notes}"));
    }
    description.push_str(&format!(" every {interval_miles} miles"));
    description
}

/// One synthetic part line per matched fluid.
fn fluid_parts(fluid: &FluidSpec) -> Vec<ServicePart> {
    let description = match (fluid.fluid_spec.as_deref(), fluid.capacity_quarts) {
        (Some(spec), Some(quarts)) => format!("{spec} ({quarts} qt fill)"),
        (Some(spec), None) => spec.to_string(),
        (None, _) => fluid.fluid_type.replace('_', " "),
    };
    vec![ServicePart {
        part_number: fluid.part_number.clone().unwrap_or_default(),
        description,
        qty: fluid.capacity_quarts.unwrap_or(1.0),
        unit: "quarts".to_string(),
    }]
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
