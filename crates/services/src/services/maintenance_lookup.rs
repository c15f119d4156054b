//! Entry point for database-backed maintenance lookups.

use db::models::powertrain_config::{EngineHints, PowertrainConfig};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use strum_macros::{Display, EnumString};
use thiserror::Error;
use tracing::info;
use ts_rs::TS;

use super::{
    labor,
    powertrain_matcher::{MatchQuality, PowertrainMatch, PowertrainMatcher, VehicleQuery},
    schedule_resolver::ScheduleResolver,
    service_formatter::FormattedService,
};

#[derive(Debug, Error)]
pub enum MaintenanceLookupError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Vehicle description accepted by the lookup. Everything past
/// year/make/model/mileage is an optional hint.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct LookupParams {
    pub year: i64,
    pub make: String,
    pub model: String,
    pub mileage: i64,
    pub vin: Option<String>,
    pub trim: Option<String>,
    pub displacement_liters: Option<f64>,
    pub cylinder_count: Option<i64>,
    pub engine_code: Option<String>,
    pub fuel_type: Option<String>,
    pub drive_type: Option<String>,
    pub transmission_type: Option<String>,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LookupSource {
    Database,
    AiFallback,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct VehicleInfo {
    pub year: i64,
    pub make: String,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engine: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transmission_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drive_type: Option<String>,
}

/// One candidate powertrain when the catalog cannot tell variants apart.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct VariantResult {
    pub match_quality: MatchQuality,
    pub engine: String,
    pub services: Vec<FormattedService>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct LookupResult {
    pub success: bool,
    pub source: LookupSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_quality: Option<MatchQuality>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle_info: Option<VehicleInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub services: Option<Vec<FormattedService>>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub multiple_variants: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variants: Option<Vec<VariantResult>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl LookupResult {
    /// The no-match signal the route uses to decide on the AI fallback.
    pub fn no_match() -> Self {
        Self {
            success: false,
            source: LookupSource::Database,
            match_quality: None,
            vehicle_info: None,
            services: None,
            multiple_variants: false,
            variants: None,
            message: Some("No maintenance data found for this vehicle".to_string()),
        }
    }

    fn single(params: &LookupParams, matched: PowertrainMatch, services: Vec<FormattedService>) -> Self {
        Self {
            success: true,
            source: LookupSource::Database,
            match_quality: Some(matched.quality),
            vehicle_info: Some(VehicleInfo::for_config(params, &matched.config)),
            services: Some(services),
            multiple_variants: false,
            variants: None,
            message: None,
        }
    }

    fn multi(params: &LookupParams, variants: Vec<(PowertrainMatch, Vec<FormattedService>)>) -> Self {
        // All candidates come from the same tier, so the tier of the first one
        // describes the whole set.
        let quality = variants[0].0.quality;
        Self {
            success: true,
            source: LookupSource::Database,
            match_quality: Some(quality),
            vehicle_info: Some(VehicleInfo::bare(params)),
            services: None,
            multiple_variants: true,
            variants: Some(
                variants
                    .into_iter()
                    .map(|(matched, services)| VariantResult {
                        match_quality: matched.quality,
                        engine: matched.config.engine_summary(),
                        services,
                    })
                    .collect(),
            ),
            message: Some(
                "Multiple powertrain variants matched; confirm the engine with the customer"
                    .to_string(),
            ),
        }
    }
}

impl VehicleInfo {
    fn for_config(params: &LookupParams, config: &PowertrainConfig) -> Self {
        Self {
            year: params.year,
            make: params.make.clone(),
            model: params.model.clone(),
            engine: Some(config.engine_summary()),
            transmission_type: config.transmission_type.clone(),
            drive_type: config.drive_type.clone(),
        }
    }

    fn bare(params: &LookupParams) -> Self {
        Self {
            year: params.year,
            make: params.make.clone(),
            model: params.model.clone(),
            engine: None,
            transmission_type: params.transmission_type.clone(),
            drive_type: params.drive_type.clone(),
        }
    }
}

pub struct MaintenanceLookup;

impl MaintenanceLookup {
    /// Match the vehicle, resolve every candidate config, and shape the
    /// response. Candidates without a single due service are dropped before
    /// the single/multi-variant decision.
    pub async fn lookup(
        pool: &SqlitePool,
        params: &LookupParams,
    ) -> Result<LookupResult, MaintenanceLookupError> {
        let query = VehicleQuery {
            year: params.year,
            make: params.make.clone(),
            model: params.model.clone(),
            hints: EngineHints {
                engine_code: params.engine_code.clone(),
                displacement_liters: params.displacement_liters,
                drive_type: params.drive_type.clone(),
                transmission_type: params.transmission_type.clone(),
            },
        };

        let matches = PowertrainMatcher::resolve(pool, &query).await?;
        if matches.is_empty() {
            info!(
                year = params.year,
                make = %params.make,
                model = %params.model,
                "no powertrain match at any tier"
            );
            return Ok(LookupResult::no_match());
        }

        let mut variants: Vec<(PowertrainMatch, Vec<FormattedService>)> = Vec::new();
        for matched in matches {
            let services =
                ScheduleResolver::resolve(pool, matched.config.id, params.mileage).await?;
            let services = labor::finalize_services(services);
            if !services.is_empty() {
                variants.push((matched, services));
            }
        }

        if variants.is_empty() {
            return Ok(LookupResult::no_match());
        }
        if variants.len() == 1 {
            let (matched, services) = variants.remove(0);
            return Ok(LookupResult::single(params, matched, services));
        }
        Ok(LookupResult::multi(params, variants))
    }
}
