use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;

/// A customer vehicle on file with the shop.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Vehicle {
    pub id: Uuid,
    pub year: i64,
    pub make: String,
    pub model: String,
    pub vin: Option<String>,
    pub trim: Option<String>,
    pub mileage: i64,
    pub engine_code: Option<String>,
    pub displacement_liters: Option<f64>,
    pub drive_type: Option<String>,
    pub transmission_type: Option<String>,
    pub fuel_type: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateVehicle {
    pub year: i64,
    pub make: String,
    pub model: String,
    pub vin: Option<String>,
    pub trim: Option<String>,
    pub mileage: Option<i64>,
    pub engine_code: Option<String>,
    pub displacement_liters: Option<f64>,
    pub drive_type: Option<String>,
    pub transmission_type: Option<String>,
    pub fuel_type: Option<String>,
}

const RETURNING_COLUMNS: &str = "RETURNING id, year, make, model, vin, trim, mileage, \
     engine_code, displacement_liters, drive_type, transmission_type, fuel_type, \
     created_at, updated_at";

impl Vehicle {
    pub async fn create(
        pool: &SqlitePool,
        data: &CreateVehicle,
        id: Uuid,
    ) -> Result<Self, sqlx::Error> {
        let sql = format!(
            "INSERT INTO vehicles (id, year, make, model, vin, trim, mileage, engine_code, \
             displacement_liters, drive_type, transmission_type, fuel_type) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) {RETURNING_COLUMNS}"
        );
        sqlx::query_as::<_, Self>(&sql)
            .bind(id)
            .bind(data.year)
            .bind(&data.make)
            .bind(&data.model)
            .bind(&data.vin)
            .bind(&data.trim)
            .bind(data.mileage.unwrap_or(0))
            .bind(&data.engine_code)
            .bind(data.displacement_liters)
            .bind(&data.drive_type)
            .bind(&data.transmission_type)
            .bind(&data.fuel_type)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"SELECT id, year, make, model, vin, trim, mileage, engine_code,
                      displacement_liters, drive_type, transmission_type, fuel_type,
                      created_at, updated_at
               FROM vehicles
               WHERE id = ?"#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn find_all(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"SELECT id, year, make, model, vin, trim, mileage, engine_code,
                      displacement_liters, drive_type, transmission_type, fuel_type,
                      created_at, updated_at
               FROM vehicles
               ORDER BY created_at DESC"#,
        )
        .fetch_all(pool)
        .await
    }

    /// Odometer update at check-in. Returns `None` for an unknown vehicle.
    pub async fn update_mileage(
        pool: &SqlitePool,
        id: Uuid,
        mileage: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        let sql = format!(
            "UPDATE vehicles SET mileage = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ? \
             {RETURNING_COLUMNS}"
        );
        sqlx::query_as::<_, Self>(&sql)
            .bind(mileage)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
