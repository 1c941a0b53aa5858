//! Statistics API endpoints

use api_types::stats::Statistic;
use axum::{Extension, Json, extract::State};
use chrono::Utc;

use engine::Account;

use crate::{ServerError, server::ServerState};

/// Fleet counters for the admin dashboard.
pub async fn get_stats(
    Extension(account): Extension<Account>,
    State(state): State<ServerState>,
) -> Result<Json<Statistic>, ServerError> {
    let stats = state.engine.package_stats(&account, Utc::now()).await?;

    Ok(Json(Statistic {
        total: stats.total,
        pending: stats.pending,
        created_last_week: stats.created_last_week,
    }))
}
