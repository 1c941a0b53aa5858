//! Package API endpoints

use api_types::package::{
    PackageList, PackageNew, PackageStatus as ApiStatus, PackageView, PackagesResponse,
    StatusUpdate,
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use engine::{Account, CreatePackageCmd, Package, PackageFilter, PackageStatus};

use crate::{ServerError, server::ServerState};

fn map_status(status: PackageStatus) -> ApiStatus {
    match status {
        PackageStatus::Pending => ApiStatus::Pending,
        PackageStatus::PickedUp => ApiStatus::PickedUp,
        PackageStatus::InTransit => ApiStatus::InTransit,
        PackageStatus::OutForDelivery => ApiStatus::OutForDelivery,
        PackageStatus::Delivered => ApiStatus::Delivered,
        PackageStatus::FailedDelivery => ApiStatus::FailedDelivery,
        PackageStatus::Returned => ApiStatus::Returned,
        PackageStatus::Cancelled => ApiStatus::Cancelled,
    }
}

fn engine_status(status: ApiStatus) -> PackageStatus {
    match status {
        ApiStatus::Pending => PackageStatus::Pending,
        ApiStatus::PickedUp => PackageStatus::PickedUp,
        ApiStatus::InTransit => PackageStatus::InTransit,
        ApiStatus::OutForDelivery => PackageStatus::OutForDelivery,
        ApiStatus::Delivered => PackageStatus::Delivered,
        ApiStatus::FailedDelivery => PackageStatus::FailedDelivery,
        ApiStatus::Returned => PackageStatus::Returned,
        ApiStatus::Cancelled => PackageStatus::Cancelled,
    }
}

pub(crate) fn package_view(package: Package) -> PackageView {
    PackageView {
        id: package.id,
        owner_id: package.owner_id,
        recipient_name: package.recipient_name,
        recipient_address: package.recipient_address,
        weight: package.weight,
        method_id: package.method_id,
        cost: package.cost,
        status: map_status(package.status),
        created_at: package.created_at,
    }
}

pub async fn create(
    Extension(account): Extension<Account>,
    State(state): State<ServerState>,
    Json(payload): Json<PackageNew>,
) -> Result<(StatusCode, Json<PackageView>), ServerError> {
    let package = state
        .engine
        .create_package(
            &account,
            CreatePackageCmd::new(
                payload.recipient_name,
                payload.recipient_address,
                payload.weight,
                payload.method_id,
            ),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(package_view(package))))
}

pub async fn get(
    Extension(account): Extension<Account>,
    State(state): State<ServerState>,
    Path(package_id): Path<Uuid>,
) -> Result<Json<PackageView>, ServerError> {
    let package = state.engine.get_package(&account, package_id).await?;
    Ok(Json(package_view(package)))
}

/// List the caller's packages (all of them for admins), newest first.
pub async fn list(
    Extension(account): Extension<Account>,
    State(state): State<ServerState>,
    payload: Option<Json<PackageList>>,
) -> Result<Json<PackagesResponse>, ServerError> {
    let payload = payload.map(|Json(p)| p).unwrap_or_default();
    let filter = PackageFilter {
        status: payload.status.map(engine_status),
        search: payload.search,
        from: payload.from,
        to: payload.to,
    };

    let packages = state
        .engine
        .list_packages(&account, &filter)
        .await?
        .into_iter()
        .map(package_view)
        .collect();

    Ok(Json(PackagesResponse { packages }))
}

/// Owner-initiated cancel of a still-pending package.
pub async fn cancel(
    Extension(account): Extension<Account>,
    State(state): State<ServerState>,
    Path(package_id): Path<Uuid>,
) -> Result<Json<PackageView>, ServerError> {
    let package = state.engine.cancel_package(&account, package_id).await?;
    Ok(Json(package_view(package)))
}

/// Admin status override; any move is legal.
pub async fn set_status(
    Extension(account): Extension<Account>,
    State(state): State<ServerState>,
    Path(package_id): Path<Uuid>,
    Json(payload): Json<StatusUpdate>,
) -> Result<Json<PackageView>, ServerError> {
    let package = state
        .engine
        .set_package_status(&account, package_id, engine_status(payload.status))
        .await?;
    Ok(Json(package_view(package)))
}
