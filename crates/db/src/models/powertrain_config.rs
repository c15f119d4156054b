use serde::{Deserialize, Serialize};
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};
use ts_rs::TS;

/// One distinct engine/transmission/drivetrain combination. Reference data
/// maintained by the catalog import; never written by this service.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct PowertrainConfig {
    pub id: i64,
    pub oem_make: String,
    pub engine_code: Option<String>,
    pub displacement_liters: Option<f64>,
    pub cylinder_count: Option<i64>,
    pub cylinder_layout: Option<String>,
    pub forced_induction_type: Option<String>,
    pub fuel_type: Option<String>,
    pub transmission_type: Option<String>,
    pub drive_type: Option<String>,
}

/// Engine hints accepted by the tiered config queries. A hint left as `None`
/// acts as a wildcard.
#[derive(Debug, Clone, Default)]
pub struct EngineHints {
    pub engine_code: Option<String>,
    pub displacement_liters: Option<f64>,
    pub drive_type: Option<String>,
    pub transmission_type: Option<String>,
}

impl EngineHints {
    pub fn is_empty(&self) -> bool {
        self.engine_code.is_none()
            && self.displacement_liters.is_none()
            && self.drive_type.is_none()
            && self.transmission_type.is_none()
    }
}

// One config can be linked to the same (make, model) through several
// year-range rows, so the projection must be DISTINCT.
const SELECT_CONFIGS: &str = "SELECT DISTINCT pc.id, pc.oem_make, pc.engine_code, \
     pc.displacement_liters, pc.cylinder_count, pc.cylinder_layout, \
     pc.forced_induction_type, pc.fuel_type, pc.transmission_type, pc.drive_type \
     FROM powertrain_configs pc \
     JOIN vehicle_applications va ON va.powertrain_config_id = pc.id ";

impl PowertrainConfig {
    /// Year/make/model plus every supplied engine hint, matched exactly
    /// (case-insensitively for strings).
    pub async fn find_exact(
        pool: &SqlitePool,
        year: i64,
        make: &str,
        model: &str,
        hints: &EngineHints,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let mut qb = Self::application_query(year, make, model);
        if let Some(code) = &hints.engine_code {
            qb.push(" AND LOWER(pc.engine_code) = ");
            qb.push_bind(code.to_lowercase());
        }
        if let Some(displacement) = hints.displacement_liters {
            qb.push(" AND ROUND(pc.displacement_liters, 1) = ROUND(");
            qb.push_bind(displacement);
            qb.push(", 1)");
        }
        if let Some(drive) = &hints.drive_type {
            qb.push(" AND LOWER(pc.drive_type) = ");
            qb.push_bind(drive.to_lowercase());
        }
        if let Some(transmission) = &hints.transmission_type {
            qb.push(" AND LOWER(pc.transmission_type) = ");
            qb.push_bind(transmission.to_lowercase());
        }
        qb.build_query_as::<Self>().fetch_all(pool).await
    }

    /// Year/make/model/displacement only, every other hint dropped.
    pub async fn find_by_displacement(
        pool: &SqlitePool,
        year: i64,
        make: &str,
        model: &str,
        displacement_liters: f64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let mut qb = Self::application_query(year, make, model);
        qb.push(" AND ROUND(pc.displacement_liters, 1) = ROUND(");
        qb.push_bind(displacement_liters);
        qb.push(", 1)");
        qb.build_query_as::<Self>().fetch_all(pool).await
    }

    /// Year/make/model alone.
    pub async fn find_by_model(
        pool: &SqlitePool,
        year: i64,
        make: &str,
        model: &str,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let mut qb = Self::application_query(year, make, model);
        qb.build_query_as::<Self>().fetch_all(pool).await
    }

    fn application_query(year: i64, make: &str, model: &str) -> QueryBuilder<'static, Sqlite> {
        let mut qb = QueryBuilder::new(SELECT_CONFIGS);
        qb.push("WHERE LOWER(va.make) = ");
        qb.push_bind(make.to_lowercase());
        qb.push(" AND LOWER(va.model) = ");
        qb.push_bind(model.to_lowercase());
        qb.push(" AND va.year_start <= ");
        qb.push_bind(year);
        qb.push(" AND va.year_end >= ");
        qb.push_bind(year);
        qb
    }

    /// Short human-readable engine summary, e.g. "2.0L I4 turbo AWD (K20C2)".
    pub fn engine_summary(&self) -> String {
        let mut parts: Vec<String> = Vec::new();
        if let Some(displacement) = self.displacement_liters {
            parts.push(format!("{displacement:.1}L"));
        }
        if let (Some(layout), Some(count)) = (self.cylinder_layout.as_deref(), self.cylinder_count)
        {
            let prefix = match layout {
                "inline" => "I",
                "v" => "V",
                "flat" => "H",
                other => other,
            };
            parts.push(format!("{prefix}{count}"));
        }
        if let Some(induction) = self.forced_induction_type.as_deref() {
            if induction != "none" {
                parts.push(induction.to_string());
            }
        }
        if let Some(drive) = self.drive_type.as_deref() {
            parts.push(drive.to_uppercase());
        }
        if let Some(code) = self.engine_code.as_deref() {
            parts.push(format!("({code})"));
        }
        if parts.is_empty() {
            format!("{} powertrain", self.oem_make)
        } else {
            parts.join(" ")
        }
    }
}
