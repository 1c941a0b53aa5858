//! Shipping method API endpoints

use api_types::method::{MethodNew, MethodView, MethodsResponse, RateUpdate};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use engine::{Account, ShippingMethod};

use crate::{ServerError, server::ServerState};

fn method_view(method: ShippingMethod) -> MethodView {
    MethodView {
        id: method.id,
        label: method.label,
        rate_per_kg: method.rate_per_kg,
    }
}

/// Every registered method. Open to any authenticated account.
pub async fn list(
    Extension(_account): Extension<Account>,
    State(state): State<ServerState>,
) -> Result<Json<MethodsResponse>, ServerError> {
    let methods = state
        .engine
        .list_shipping_methods()
        .await?
        .into_iter()
        .map(method_view)
        .collect();

    Ok(Json(MethodsResponse { methods }))
}

pub async fn create(
    Extension(account): Extension<Account>,
    State(state): State<ServerState>,
    Json(payload): Json<MethodNew>,
) -> Result<(StatusCode, Json<MethodView>), ServerError> {
    let method = state
        .engine
        .create_shipping_method(&account, &payload.label, payload.rate_per_kg)
        .await?;

    Ok((StatusCode::CREATED, Json(method_view(method))))
}

/// Change a rate. Only packages created afterwards price at the new rate.
pub async fn update_rate(
    Extension(account): Extension<Account>,
    State(state): State<ServerState>,
    Path(method_id): Path<Uuid>,
    Json(payload): Json<RateUpdate>,
) -> Result<Json<MethodView>, ServerError> {
    let method = state
        .engine
        .update_shipping_rate(&account, method_id, payload.rate_per_kg)
        .await?;

    Ok(Json(method_view(method)))
}

pub async fn remove(
    Extension(account): Extension<Account>,
    State(state): State<ServerState>,
    Path(method_id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .delete_shipping_method(&account, method_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
