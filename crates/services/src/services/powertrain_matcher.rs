//! Resolves a vehicle description to candidate powertrain configs via a
//! three-tier cascade: exact (with engine hints), relaxed-engine
//! (displacement only), model-only. Tiers are tried in order and the first
//! one returning results wins; results are never merged across tiers.

use db::models::powertrain_config::{EngineHints, PowertrainConfig};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use strum_macros::{Display, EnumString};
use tracing::debug;
use ts_rs::TS;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MatchQuality {
    Exact,
    RelaxedEngine,
    ModelOnly,
}

#[derive(Debug, Clone)]
pub struct VehicleQuery {
    pub year: i64,
    pub make: String,
    pub model: String,
    pub hints: EngineHints,
}

#[derive(Debug, Clone)]
pub struct PowertrainMatch {
    pub config: PowertrainConfig,
    pub quality: MatchQuality,
}

pub struct PowertrainMatcher;

impl PowertrainMatcher {
    /// Run the cascade. An empty result is a valid no-match signal, not an
    /// error.
    pub async fn resolve(
        pool: &SqlitePool,
        query: &VehicleQuery,
    ) -> Result<Vec<PowertrainMatch>, sqlx::Error> {
        // The exact tier only makes sense when there is at least one hint to
        // pin down.
        if !query.hints.is_empty() {
            let configs = PowertrainConfig::find_exact(
                pool,
                query.year,
                &query.make,
                &query.model,
                &query.hints,
            )
            .await?;
            if !configs.is_empty() {
                debug!(count = configs.len(), "powertrain match at exact tier");
                return Ok(Self::tag(configs, MatchQuality::Exact));
            }
        }

        if let Some(displacement) = query.hints.displacement_liters {
            let configs = PowertrainConfig::find_by_displacement(
                pool,
                query.year,
                &query.make,
                &query.model,
                displacement,
            )
            .await?;
            if !configs.is_empty() {
                debug!(count = configs.len(), "powertrain match at relaxed-engine tier");
                return Ok(Self::tag(configs, MatchQuality::RelaxedEngine));
            }
        }

        let configs =
            PowertrainConfig::find_by_model(pool, query.year, &query.make, &query.model).await?;
        if !configs.is_empty() {
            debug!(count = configs.len(), "powertrain match at model-only tier");
        }
        Ok(Self::tag(configs, MatchQuality::ModelOnly))
    }

    fn tag(configs: Vec<PowertrainConfig>, quality: MatchQuality) -> Vec<PowertrainMatch> {
        configs
            .into_iter()
            .map(|config| PowertrainMatch { config, quality })
            .collect()
    }
}
