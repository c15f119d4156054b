pub mod fluid_spec;
pub mod powertrain_config;
pub mod schedule_entry;
pub mod vehicle;
pub mod vehicle_application;
