pub mod ai_lookup;
pub mod labor;
pub mod maintenance_lookup;
pub mod powertrain_matcher;
pub mod schedule_resolver;
pub mod service_formatter;
pub mod urgency;
