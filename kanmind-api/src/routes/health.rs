/// Liveness check
///
/// `GET /health` is unauthenticated and always answers 200. An unreachable
/// database or a schema behind the embedded migrations shows up as
/// `"status": "degraded"` in the body.
///
/// ```json
/// { "status": "ok", "version": "0.1.0", "database": "up", "schema_version": 20250110000004 }
/// ```

use crate::app::AppState;
use axum::{extract::State, Json};
use kanmind_shared::db::migrations::get_migration_status;
use kanmind_shared::db::pool::health_check as ping_database;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub version: &'static str,
    pub database: &'static str,
    pub schema_version: Option<i64>,
}

pub async fn health_check(State(state): State<AppState>) -> Json<Health> {
    if let Err(e) = ping_database(&state.db).await {
        tracing::warn!(error = %e, "Database unreachable");
        return Json(Health {
            status: "degraded",
            version: env!("CARGO_PKG_VERSION"),
            database: "down",
            schema_version: None,
        });
    }

    let (status, schema_version) = match get_migration_status(&state.db).await {
        Ok(migrations) if migrations.is_up_to_date => ("ok", migrations.latest_version),
        Ok(migrations) => ("degraded", migrations.latest_version),
        Err(e) => {
            tracing::warn!(error = %e, "Could not read migration status");
            ("degraded", None)
        }
    };

    Json(Health {
        status,
        version: env!("CARGO_PKG_VERSION"),
        database: "up",
        schema_version,
    })
}
