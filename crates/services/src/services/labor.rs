//! Labor-hour fallbacks and the response finalization pass shared by the
//! database and AI lookup paths. Every lookup response goes through
//! `finalize_services` so both paths produce the same shape and ordering.

use super::service_formatter::FormattedService;
use super::urgency::Urgency;

/// Industry-standard labor hours by service category, substituted wherever a
/// service arrives with zero estimated hours.
pub fn fallback_labor_hours(category: &str) -> f64 {
    match category {
        "oil_change" => 0.5,
        "fluid_service" => 1.0,
        "filter" => 0.3,
        "ignition" => 1.2,
        "tire" => 0.5,
        "brake" => 1.5,
        "belt" => 1.0,
        "battery" => 0.3,
        "electrical" => 0.8,
        "inspection" => 0.5,
        _ => 1.0,
    }
}

/// Fill labor hours, drop services that are not yet due, and order the rest
/// most-urgent first (ties: most overdue first).
pub fn finalize_services(mut services: Vec<FormattedService>) -> Vec<FormattedService> {
    for service in &mut services {
        if service.estimated_labor_hours == 0.0 {
            service.estimated_labor_hours = fallback_labor_hours(&service.service_category);
        }
    }
    services.retain(|service| service.urgency != Urgency::NotDue);
    services.sort_by(|a, b| {
        a.priority
            .cmp(&b.priority)
            .then(a.mileage_until_due.cmp(&b.mileage_until_due))
    });
    services
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::urgency::{self, Urgency};

    fn service(name: &str, category: &str, mileage: i64, interval: i64) -> FormattedService {
        let assessment = urgency::classify(mileage, interval);
        FormattedService {
            service_name: name.to_string(),
            mileage_interval: interval,
            service_category: category.to_string(),
            service_description: String::new(),
            parts: Vec::new(),
            estimated_labor_hours: 0.0,
            urgency: assessment.urgency,
            priority: assessment.priority,
            mileage_until_due: assessment.mileage_until_due,
            reason: assessment.reason,
        }
    }

    #[test]
    fn zero_labor_hours_get_the_category_fallback() {
        let finalized = finalize_services(vec![service("Engine oil change", "oil_change", 4_600, 5_000)]);
        assert_eq!(finalized[0].estimated_labor_hours, 0.5);
    }

    #[test]
    fn preset_labor_hours_are_left_alone() {
        let mut input = service("Engine oil change", "oil_change", 4_600, 5_000);
        input.estimated_labor_hours = 0.4;
        let finalized = finalize_services(vec![input]);
        assert_eq!(finalized[0].estimated_labor_hours, 0.4);
    }

    #[test]
    fn not_due_services_never_survive() {
        let finalized = finalize_services(vec![
            service("Engine oil change", "oil_change", 4_600, 5_000),
            service("Cabin air filter replacement", "filter", 1_000, 15_000),
        ]);
        assert_eq!(finalized.len(), 1);
        assert!(finalized.iter().all(|s| s.urgency != Urgency::NotDue));
    }

    #[test]
    fn sorted_by_priority_then_most_overdue() {
        let finalized = finalize_services(vec![
            service("Tire rotation", "tire", 6_300, 6_000),        // overdue by 300
            service("Engine oil change", "oil_change", 4_600, 5_000), // due now
            service("Brake fluid flush", "fluid_service", 31_000, 30_000), // overdue by 1000
        ]);
        let names: Vec<&str> = finalized.iter().map(|s| s.service_name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Brake fluid flush", "Tire rotation", "Engine oil change"]
        );
        assert!(finalized.windows(2).all(|w| w[0].priority <= w[1].priority));
    }
}
