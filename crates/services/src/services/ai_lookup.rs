//! Generative-AI fallback for vehicles the catalog does not cover.
//!
//! The route only reaches for this path after a database miss (or a database
//! error, which it treats the same way). Responses are classified with the
//! same urgency policy and finalized with the same pass as the database path,
//! so the caller merges both streams identically.

use std::time::Duration;

use backon::{ExponentialBuilder, Retryable};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use super::{
    labor,
    maintenance_lookup::{LookupParams, LookupResult, LookupSource, VehicleInfo},
    service_formatter::FormattedService,
    urgency,
};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";
const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug, Clone, Error)]
pub enum AiLookupError {
    #[error("network error: {0}")]
    Transport(String),
    #[error("timeout")]
    Timeout,
    #[error("http {status}: {body}")]
    Http { status: u16, body: String },
    #[error("rate limited")]
    RateLimited,
    #[error("invalid api key")]
    InvalidApiKey,
    #[error("json error: {0}")]
    Serde(String),
    #[error("missing api key: ANTHROPIC_API_KEY environment variable not set")]
    MissingApiKey,
}

impl AiLookupError {
    /// Returns true if the error is transient and should be retried.
    fn should_retry(&self) -> bool {
        match self {
            Self::Transport(_) | Self::Timeout | Self::RateLimited => true,
            Self::Http { status, .. } => (500..=599).contains(status),
            _ => false,
        }
    }
}

#[derive(Debug, Serialize)]
struct AiMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct AiRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<AiMessage>,
    system: String,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum ContentBlock {
    #[serde(rename = "text")]
    Text { text: String },
}

#[derive(Debug, Deserialize)]
struct AiResponse {
    content: Vec<ContentBlock>,
}

impl AiResponse {
    fn text(&self) -> Option<&str> {
        self.content.iter().find_map(|block| match block {
            ContentBlock::Text { text } => Some(text.as_str()),
        })
    }
}

/// One service line in the model's JSON answer.
#[derive(Debug, Deserialize)]
struct AiService {
    service_name: String,
    mileage_interval: i64,
    service_category: Option<String>,
    service_description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AiServiceList {
    services: Vec<AiService>,
}

/// Client for the AI-backed maintenance lookup.
#[derive(Debug, Clone)]
pub struct AiMaintenanceLookup {
    http: Client,
    api_key: String,
    model: String,
}

impl AiMaintenanceLookup {
    const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

    /// Create a client using the ANTHROPIC_API_KEY environment variable.
    pub fn from_env() -> Result<Self, AiLookupError> {
        let api_key =
            std::env::var("ANTHROPIC_API_KEY").map_err(|_| AiLookupError::MissingApiKey)?;
        Self::new(api_key, None)
    }

    pub fn new(api_key: String, model: Option<String>) -> Result<Self, AiLookupError> {
        let http = Client::builder()
            .timeout(Self::REQUEST_TIMEOUT)
            .user_agent(concat!("wrenchbay/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AiLookupError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            api_key,
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        })
    }

    /// Produce a maintenance lookup result for a vehicle the catalog missed.
    pub async fn lookup(&self, params: &LookupParams) -> Result<LookupResult, AiLookupError> {
        let raw = self.complete(&build_prompt(params)).await?;
        services_from_response(params, &raw)
    }

    async fn complete(&self, prompt: &str) -> Result<String, AiLookupError> {
        let request = AiRequest {
            model: self.model.clone(),
            max_tokens: 4096,
            messages: vec![AiMessage {
                role: "user",
                content: prompt.to_string(),
            }],
            system: "You are an automotive maintenance schedule assistant. Output valid JSON only."
                .to_string(),
        };

        let response = (|| async { self.send_request(&request).await })
            .retry(
                &ExponentialBuilder::default()
                    .with_min_delay(Duration::from_secs(1))
                    .with_max_delay(Duration::from_secs(30))
                    .with_max_times(3)
                    .with_jitter(),
            )
            .when(|e: &AiLookupError| e.should_retry())
            .notify(|e, dur| {
                warn!(
                    "AI lookup call failed, retrying after {:.2}s: {}",
                    dur.as_secs_f64(),
                    e
                )
            })
            .await?;

        response
            .text()
            .map(|s| s.to_string())
            .ok_or_else(|| AiLookupError::Serde("no text content in response".to_string()))
    }

    async fn send_request(&self, request: &AiRequest) -> Result<AiResponse, AiLookupError> {
        let res = self
            .http
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        match res.status() {
            s if s.is_success() => res
                .json::<AiResponse>()
                .await
                .map_err(|e| AiLookupError::Serde(e.to_string())),
            StatusCode::UNAUTHORIZED => Err(AiLookupError::InvalidApiKey),
            StatusCode::TOO_MANY_REQUESTS => Err(AiLookupError::RateLimited),
            s => {
                let status = s.as_u16();
                let body = res.text().await.unwrap_or_default();
                Err(AiLookupError::Http { status, body })
            }
        }
    }
}

fn map_reqwest_error(e: reqwest::Error) -> AiLookupError {
    if e.is_timeout() {
        AiLookupError::Timeout
    } else {
        AiLookupError::Transport(e.to_string())
    }
}

fn build_prompt(params: &LookupParams) -> String {
    format!(
        r#"List the factory maintenance services for this vehicle:

Year: {year}
Make: {make}
Model: {model}
Current mileage: {mileage}

Return ONLY valid JSON in this shape:
{{
  "services": [
    {{
      "service_name": "<name>",
      "mileage_interval": <miles between services>,
      "service_category": "<oil_change|fluid_service|filter|ignition|tire|brake|belt|battery|electrical|inspection|other>",
      "service_description": "<one sentence>"
    }}
  ]
}}

Include every recurring service a franchise dealer would quote. Use realistic
intervals for this specific vehicle."#,
        year = params.year,
        make = params.make,
        model = params.model,
        mileage = params.mileage,
    )
}

/// Parse the model's answer, classify each service, and finalize. Pure so it
/// can be tested without the network.
fn services_from_response(
    params: &LookupParams,
    raw: &str,
) -> Result<LookupResult, AiLookupError> {
    let json = extract_json(raw);
    if json.trim().is_empty() {
        return Err(AiLookupError::Serde("empty response".to_string()));
    }
    let parsed: AiServiceList =
        serde_json::from_str(json).map_err(|e| AiLookupError::Serde(e.to_string()))?;

    let services: Vec<FormattedService> = parsed
        .services
        .into_iter()
        .filter(|service| service.mileage_interval > 0)
        .map(|service| {
            let assessment = urgency::classify(params.mileage, service.mileage_interval);
            FormattedService {
                service_name: service.service_name,
                mileage_interval: service.mileage_interval,
                service_category: service.service_category.unwrap_or_else(|| "other".to_string()),
                service_description: service.service_description.unwrap_or_default(),
                parts: Vec::new(),
                estimated_labor_hours: 0.0,
                urgency: assessment.urgency,
                priority: assessment.priority,
                mileage_until_due: assessment.mileage_until_due,
                reason: assessment.reason,
            }
        })
        .collect();
    let services = labor::finalize_services(services);

    if services.is_empty() {
        return Ok(LookupResult {
            success: false,
            source: LookupSource::AiFallback,
            match_quality: None,
            vehicle_info: None,
            services: None,
            multiple_variants: false,
            variants: None,
            message: Some("No services currently due for this vehicle".to_string()),
        });
    }

    Ok(LookupResult {
        success: true,
        source: LookupSource::AiFallback,
        match_quality: None,
        vehicle_info: Some(VehicleInfo {
            year: params.year,
            make: params.make.clone(),
            model: params.model.clone(),
            engine: None,
            transmission_type: params.transmission_type.clone(),
            drive_type: params.drive_type.clone(),
        }),
        services: Some(services),
        multiple_variants: false,
        variants: None,
        message: None,
    })
}

/// Extract JSON from a string that might wrap it in markdown code fences.
fn extract_json(text: &str) -> &str {
    let text = text.trim();

    if let Some(start) = text.find("```json") {
        let content_start = start + 7;
        if let Some(end) = text[content_start..].find("```") {
            return text[content_start..content_start + end].trim();
        }
    }

    if let Some(start) = text.find("```") {
        let content_start = start + 3;
        let content_start = text[content_start..]
            .find('\n')
            .map(|i| content_start + i + 1)
            .unwrap_or(content_start);
        if let Some(end) = text[content_start..].find("```") {
            return text[content_start..content_start + end].trim();
        }
    }

    text
}
