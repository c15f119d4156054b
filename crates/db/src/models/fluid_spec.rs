use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use ts_rs::TS;

/// Fluid capacity/spec data for a powertrain config, keyed by fluid type.
/// Enrichment only: a missing fluid spec is never an error.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct FluidSpec {
    pub id: i64,
    pub powertrain_config_id: i64,
    pub fluid_type: String,
    pub capacity_liters: Option<f64>,
    pub capacity_quarts: Option<f64>,
    pub fluid_spec: Option<String>,
    pub part_number: Option<String>,
}

impl FluidSpec {
    pub async fn find_for_config(
        pool: &SqlitePool,
        powertrain_config_id: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"SELECT id, powertrain_config_id, fluid_type, capacity_liters,
                      capacity_quarts, fluid_spec, part_number
               FROM fluid_specs
               WHERE powertrain_config_id = ?
               ORDER BY fluid_type"#,
        )
        .bind(powertrain_config_id)
        .fetch_all(pool)
        .await
    }

    /// The maintenance item this fluid enriches, when the fluid type is a
    /// known code.
    pub fn maintenance_item(&self) -> Option<&'static str> {
        match self.fluid_type.as_str() {
            "engine_oil" => Some("Engine Oil"),
            "coolant" => Some("Engine Coolant"),
            "brake_fluid" => Some("Brake Fluid"),
            "transmission_fluid" => Some("Transmission Fluid"),
            "power_steering_fluid" => Some("Power Steering Fluid"),
            "differential_fluid" => Some("Differential Fluid"),
            "transfer_case_fluid" => Some("Transfer Case Fluid"),
            "washer_fluid" => Some("Windshield Washer Fluid"),
            _ => None,
        }
    }
}
