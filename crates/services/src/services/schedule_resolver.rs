//! Turns the raw schedule rows of a matched powertrain config into formatted,
//! urgency-classified services.

use std::collections::HashMap;

use db::models::{fluid_spec::FluidSpec, schedule_entry::ScheduleEntry};
use sqlx::SqlitePool;

use super::{
    service_formatter::{self, FormattedService},
    urgency,
};

pub struct ScheduleResolver;

impl ScheduleResolver {
    /// Fetch and resolve every maintenance action for one powertrain config.
    /// Schedule rows and fluid specs are fetched concurrently.
    pub async fn resolve(
        pool: &SqlitePool,
        powertrain_config_id: i64,
        current_mileage: i64,
    ) -> Result<Vec<FormattedService>, sqlx::Error> {
        let (entries, fluids) = tokio::try_join!(
            ScheduleEntry::find_actionable(pool, powertrain_config_id),
            FluidSpec::find_for_config(pool, powertrain_config_id),
        )?;
        Ok(Self::build_services(entries, &fluids, current_mileage))
    }

    /// Pure assembly step: dedup, fold the oil-change pair, classify, format.
    /// Rows with no derivable interval are dropped silently; that is a
    /// catalog data-quality condition, not an error.
    pub fn build_services(
        entries: Vec<ScheduleEntry>,
        fluids: &[FluidSpec],
        current_mileage: i64,
    ) -> Vec<FormattedService> {
        let entries = Self::dedupe(entries, current_mileage);
        let entries = Self::merge_oil_change(entries);

        let fluids_by_item: HashMap<&str, &FluidSpec> = fluids
            .iter()
            .filter_map(|fluid| fluid.maintenance_item().map(|item| (item, fluid)))
            .collect();

        entries
            .into_iter()
            .filter_map(|entry| {
                let interval = entry
                    .effective_interval(current_mileage)
                    .filter(|interval| *interval > 0)?;
                let assessment = urgency::classify(current_mileage, interval);
                let fluid = fluids_by_item.get(entry.maintenance_item.as_str()).copied();
                Some(service_formatter::format_service(
                    &entry, interval, fluid, assessment,
                ))
            })
            .collect()
    }

    /// Keep exactly one row per (item, action): the one with the smallest
    /// effective interval. A row with an interval beats one without; ties
    /// keep the first row encountered. Encounter order is preserved.
    fn dedupe(entries: Vec<ScheduleEntry>, current_mileage: i64) -> Vec<ScheduleEntry> {
        let mut order: Vec<(i64, String)> = Vec::new();
        let mut best: HashMap<(i64, String), (ScheduleEntry, Option<i64>)> = HashMap::new();
        for entry in entries {
            let key = (entry.maintenance_item_id, entry.action_type.clone());
            let interval = entry.effective_interval(current_mileage);
            match best.get(&key) {
                None => {
                    order.push(key.clone());
                    best.insert(key, (entry, interval));
                }
                Some((_, reigning)) => {
                    let wins = match (interval, *reigning) {
                        (Some(new), Some(old)) => new < old,
                        (Some(_), None) => true,
                        _ => false,
                    };
                    if wins {
                        best.insert(key, (entry, interval));
                    }
                }
            }
        }
        order
            .into_iter()
            .filter_map(|key| best.remove(&key).map(|(entry, _)| entry))
            .collect()
    }

    /// An oil change is presented as one combined service: when both the oil
    /// and the oil-filter replacement survive dedup, the filter row folds
    /// into the oil row.
    fn merge_oil_change(entries: Vec<ScheduleEntry>) -> Vec<ScheduleEntry> {
        let has_oil_change = entries.iter().any(|entry| {
            entry.maintenance_item.eq_ignore_ascii_case("Engine Oil")
                && entry.action_type.eq_ignore_ascii_case("replace")
        });
        if !has_oil_change {
            return entries;
        }
        entries
            .into_iter()
            .filter(|entry| {
                !(entry.maintenance_item.eq_ignore_ascii_case("Engine Oil Filter")
                    && entry.action_type.eq_ignore_ascii_case("replace"))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use db::models::schedule_entry::{IntervalType, RequirementLevel};

    use super::*;
    use crate::services::urgency::Urgency;

    fn entry(id: i64, item_id: i64, item: &str, action: &str, normal: Option<i64>) -> ScheduleEntry {
        ScheduleEntry {
            id,
            powertrain_config_id: 1,
            maintenance_item_id: item_id,
            maintenance_item: item.to_string(),
            item_category: None,
            action_type: action.to_string(),
            requirement_level: RequirementLevel::Required,
            interval_type: IntervalType::FixedRecurring,
            normal_interval_miles: normal,
            severe_interval_miles: None,
            enriched_normal_miles: None,
            enriched_severe_miles: None,
            initial_miles: None,
            initial_months: None,
            fallback_interval_miles: None,
            notes: None,
        }
    }

    #[test]
    fn dedupe_keeps_the_smallest_interval() {
        let rows = vec![
            entry(1, 10, "Engine Oil", "replace", Some(7_500)),
            entry(2, 10, "Engine Oil", "replace", Some(5_000)),
            entry(3, 20, "Tires", "rotate", Some(6_000)),
        ];
        let deduped = ScheduleResolver::dedupe(rows, 4_600);
        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[0].id, 2);
        assert_eq!(deduped[1].id, 3);
    }

    #[test]
    fn dedupe_is_idempotent() {
        let rows = vec![
            entry(1, 10, "Engine Oil", "replace", Some(7_500)),
            entry(2, 10, "Engine Oil", "replace", Some(5_000)),
            entry(3, 20, "Tires", "rotate", Some(6_000)),
        ];
        let once = ScheduleResolver::dedupe(rows, 4_600);
        let twice = ScheduleResolver::dedupe(once.clone(), 4_600);
        let ids = |rows: &[ScheduleEntry]| rows.iter().map(|r| r.id).collect::<Vec<_>>();
        assert_eq!(ids(&once), ids(&twice));
    }

    #[test]
    fn dedupe_ties_keep_the_first_row() {
        let rows = vec![
            entry(1, 10, "Engine Oil", "replace", Some(5_000)),
            entry(2, 10, "Engine Oil", "replace", Some(5_000)),
        ];
        let deduped = ScheduleResolver::dedupe(rows, 0);
        assert_eq!(deduped.len(), 1);
        assert_eq!(deduped[0].id, 1);
    }

    #[test]
    fn oil_filter_folds_into_the_oil_change() {
        let rows = vec![
            entry(1, 10, "Engine Oil", "replace", Some(5_000)),
            entry(2, 11, "Engine Oil Filter", "replace", Some(5_000)),
        ];
        let services = ScheduleResolver::build_services(rows, &[], 4_600);
        assert_eq!(services.len(), 1);
        assert_eq!(services[0].service_name, "Engine oil change");
    }

    #[test]
    fn filter_survives_without_an_oil_change_row() {
        let rows = vec![entry(2, 11, "Engine Oil Filter", "replace", Some(5_000))];
        let services = ScheduleResolver::build_services(rows, &[], 4_600);
        assert_eq!(services.len(), 1);
        assert_eq!(services[0].service_name, "Engine oil filter change");
    }

    #[test]
    fn rows_without_a_derivable_interval_are_dropped() {
        let rows = vec![
            entry(1, 10, "Engine Oil", "replace", None),
            entry(2, 20, "Tires", "rotate", Some(6_000)),
        ];
        let services = ScheduleResolver::build_services(rows, &[], 5_700);
        assert_eq!(services.len(), 1);
        assert_eq!(services[0].service_name, "Tire rotation");
        assert_eq!(services[0].urgency, Urgency::DueNow);
    }
}
