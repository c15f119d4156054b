use serde::{Deserialize, Serialize};
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};
use ts_rs::TS;

/// Fitment row linking a marketed (make, model, year range) to one powertrain
/// config. Many applications may share a config. Reference data; read-only.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct VehicleApplication {
    pub id: i64,
    pub make: String,
    pub model: String,
    pub year_start: i64,
    pub year_end: i64,
    pub powertrain_config_id: i64,
}

impl VehicleApplication {
    pub async fn find_for_model(
        pool: &SqlitePool,
        make: &str,
        model: &str,
        year: Option<i64>,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let mut qb = QueryBuilder::<Sqlite>::new(
            "SELECT id, make, model, year_start, year_end, powertrain_config_id \
             FROM vehicle_applications WHERE LOWER(make) = ",
        );
        qb.push_bind(make.to_lowercase());
        qb.push(" AND LOWER(model) = ");
        qb.push_bind(model.to_lowercase());
        if let Some(year) = year {
            qb.push(" AND year_start <= ");
            qb.push_bind(year);
            qb.push(" AND year_end >= ");
            qb.push_bind(year);
        }
        qb.push(" ORDER BY year_start, id");
        qb.build_query_as::<Self>().fetch_all(pool).await
    }
}
