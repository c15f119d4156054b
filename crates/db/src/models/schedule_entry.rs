use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool, Type};
use strum_macros::{Display, EnumString};
use ts_rs::TS;

/// How a schedule row expresses its service interval.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize, TS, EnumString, Display,
)]
#[sqlx(type_name = "interval_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum IntervalType {
    FixedRecurring,
    InitialThenRecurring,
    AlgorithmDriven,
}

/// How strongly the schedule calls for the action.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize, TS, EnumString, Display,
)]
#[sqlx(type_name = "requirement_level", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RequirementLevel {
    Required,
    RequiredAdditional,
    Recommended,
    Informational,
}

/// One maintenance recommendation for a powertrain config. The same
/// (item, action) pair may appear on multiple rows from different catalog
/// sources; the schedule resolver keeps exactly one.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct ScheduleEntry {
    pub id: i64,
    pub powertrain_config_id: i64,
    pub maintenance_item_id: i64,
    pub maintenance_item: String,
    pub item_category: Option<String>,
    pub action_type: String,
    pub requirement_level: RequirementLevel,
    pub interval_type: IntervalType,
    pub normal_interval_miles: Option<i64>,
    pub severe_interval_miles: Option<i64>,
    pub enriched_normal_miles: Option<i64>,
    pub enriched_severe_miles: Option<i64>,
    pub initial_miles: Option<i64>,
    pub initial_months: Option<i64>,
    pub fallback_interval_miles: Option<i64>,
    pub notes: Option<String>,
}

impl ScheduleEntry {
    /// Rows that can actually be scheduled: recognized interval kinds with a
    /// requirement level worth surfacing. Informational rows stay out.
    pub async fn find_actionable(
        pool: &SqlitePool,
        powertrain_config_id: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"SELECT id, powertrain_config_id, maintenance_item_id, maintenance_item,
                      item_category, action_type, requirement_level, interval_type,
                      normal_interval_miles, severe_interval_miles,
                      enriched_normal_miles, enriched_severe_miles,
                      initial_miles, initial_months, fallback_interval_miles, notes
               FROM maintenance_schedules
               WHERE powertrain_config_id = ?
                 AND interval_type IN ('fixed_recurring', 'initial_then_recurring', 'algorithm_driven')
                 AND requirement_level IN ('required', 'required_additional', 'recommended')
               ORDER BY maintenance_item_id, action_type, id"#,
        )
        .bind(powertrain_config_id)
        .fetch_all(pool)
        .await
    }

    /// The single mileage interval that governs when this action is due,
    /// given the vehicle's current odometer reading. `None` means the row
    /// carries no usable interval and cannot be scheduled.
    pub fn effective_interval(&self, current_mileage: i64) -> Option<i64> {
        match self.interval_type {
            // Algorithm-driven rows only ever use the precomputed fallback.
            IntervalType::AlgorithmDriven => self.fallback_interval_miles,
            IntervalType::InitialThenRecurring => match self.initial_miles {
                // Before the first service point the interval is the initial
                // mileage itself.
                Some(initial) if current_mileage < initial => Some(initial),
                _ => self.recurring_interval(),
            },
            IntervalType::FixedRecurring => self.recurring_interval(),
        }
    }

    // Priority: enriched severe, enriched normal, OEM severe, OEM normal.
    fn recurring_interval(&self) -> Option<i64> {
        self.enriched_severe_miles
            .or(self.enriched_normal_miles)
            .or(self.severe_interval_miles)
            .or(self.normal_interval_miles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(interval_type: IntervalType) -> ScheduleEntry {
        ScheduleEntry {
            id: 1,
            powertrain_config_id: 1,
            maintenance_item_id: 10,
            maintenance_item: "Engine Oil".to_string(),
            item_category: None,
            action_type: "replace".to_string(),
            requirement_level: RequirementLevel::Required,
            interval_type,
            normal_interval_miles: None,
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
    fn recurring_priority_prefers_enriched_severe() {
        let mut row = entry(IntervalType::FixedRecurring);
        row.normal_interval_miles = Some(10_000);
        row.severe_interval_miles = Some(7_500);
        row.enriched_normal_miles = Some(6_000);
        row.enriched_severe_miles = Some(5_000);
        assert_eq!(row.effective_interval(20_000), Some(5_000));

        row.enriched_severe_miles = None;
        assert_eq!(row.effective_interval(20_000), Some(6_000));

        row.enriched_normal_miles = None;
        assert_eq!(row.effective_interval(20_000), Some(7_500));

        row.severe_interval_miles = None;
        assert_eq!(row.effective_interval(20_000), Some(10_000));

        row.normal_interval_miles = None;
        assert_eq!(row.effective_interval(20_000), None);
    }

    #[test]
    fn initial_then_recurring_switches_at_initial_mileage() {
        let mut row = entry(IntervalType::InitialThenRecurring);
        row.initial_miles = Some(7_500);
        row.severe_interval_miles = Some(5_000);
        // Still before the first service point.
        assert_eq!(row.effective_interval(3_000), Some(7_500));
        // Past it, the recurring priority chain takes over.
        assert_eq!(row.effective_interval(10_000), Some(5_000));
    }

    #[test]
    fn algorithm_driven_only_uses_fallback() {
        let mut row = entry(IntervalType::AlgorithmDriven);
        row.severe_interval_miles = Some(5_000);
        assert_eq!(row.effective_interval(10_000), None);

        row.fallback_interval_miles = Some(10_000);
        assert_eq!(row.effective_interval(10_000), Some(10_000));
    }
}
