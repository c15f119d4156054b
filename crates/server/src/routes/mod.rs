pub mod catalog;
pub mod health;
pub mod maintenance;
pub mod vehicles;

use axum::Router;

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(catalog::router())
        .merge(maintenance::router())
        .merge(vehicles::router())
}
