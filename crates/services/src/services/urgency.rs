//! Mileage-based urgency classification.
//!
//! Position within the current service cycle decides the band: more than 10%
//! past the last due point is overdue, within 10% of the next due point is
//! due now, within 25% is coming soon. This is the single urgency policy for
//! every lookup path.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use ts_rs::TS;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, EnumString, Display,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Urgency {
    Overdue,
    DueNow,
    ComingSoon,
    NotDue,
}

impl Urgency {
    pub fn priority(self) -> i64 {
        match self {
            Urgency::Overdue => 1,
            Urgency::DueNow => 2,
            Urgency::ComingSoon => 3,
            Urgency::NotDue => 4,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct UrgencyAssessment {
    pub urgency: Urgency,
    pub priority: i64,
    pub mileage_until_due: i64,
    pub reason: String,
}

impl UrgencyAssessment {
    fn new(urgency: Urgency, mileage_until_due: i64, reason: String) -> Self {
        Self {
            urgency,
            priority: urgency.priority(),
            mileage_until_due,
            reason,
        }
    }
}

/// Classify where `current_mileage` falls within the cyclic service window of
/// `interval_miles`. Pure; `interval_miles` must be positive.
pub fn classify(current_mileage: i64, interval_miles: i64) -> UrgencyAssessment {
    debug_assert!(interval_miles > 0);
    let last_due_at = (current_mileage / interval_miles) * interval_miles;
    let miles_since_due = current_mileage - last_due_at;
    let miles_until_next_due = interval_miles - miles_since_due;
    let ten_pct = interval_miles as f64 * 0.10;
    let twenty_five_pct = interval_miles as f64 * 0.25;

    // A vehicle that has not yet passed its first due point is never overdue,
    // hence the last_due_at guard.
    if miles_since_due as f64 > ten_pct && last_due_at > 0 {
        UrgencyAssessment::new(
            Urgency::Overdue,
            -miles_since_due,
            format!("Overdue by {miles_since_due} miles"),
        )
    } else if miles_until_next_due as f64 <= ten_pct {
        UrgencyAssessment::new(Urgency::DueNow, miles_until_next_due, "Due now".to_string())
    } else if miles_until_next_due as f64 <= twenty_five_pct {
        UrgencyAssessment::new(
            Urgency::ComingSoon,
            miles_until_next_due,
            format!("Due in {miles_until_next_due} miles"),
        )
    } else {
        UrgencyAssessment::new(
            Urgency::NotDue,
            miles_until_next_due,
            format!("Due in {miles_until_next_due} miles"),
        )
    }
}
