//! Account API endpoints

use api_types::account::{AccountNew, AccountRole, AccountUpdate, AccountView, AccountsResponse};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use engine::{Account, CreateAccountCmd, Role, UpdateAccountCmd};

use crate::{ServerError, server::ServerState};

fn map_role(role: Role) -> AccountRole {
    match role {
        Role::Customer => AccountRole::Customer,
        Role::Admin => AccountRole::Admin,
    }
}

fn engine_role(role: AccountRole) -> Role {
    match role {
        AccountRole::Customer => Role::Customer,
        AccountRole::Admin => Role::Admin,
    }
}

pub(crate) fn account_view(account: Account) -> AccountView {
    AccountView {
        id: account.id,
        name: account.name,
        email: account.email,
        address: account.address,
        role: map_role(account.role),
        created_at: account.created_at,
    }
}

/// Open signup. The created account is always a customer.
pub async fn signup(
    State(state): State<ServerState>,
    Json(payload): Json<AccountNew>,
) -> Result<(StatusCode, Json<AccountView>), ServerError> {
    let account = state
        .engine
        .create_account(CreateAccountCmd::new(
            payload.name,
            payload.email,
            payload.address,
            payload.password,
        ))
        .await?;

    Ok((StatusCode::CREATED, Json(account_view(account))))
}

/// The resolved account of the caller, straight from the auth layer.
pub async fn me(Extension(account): Extension<Account>) -> Json<AccountView> {
    Json(account_view(account))
}

pub async fn list(
    Extension(account): Extension<Account>,
    State(state): State<ServerState>,
) -> Result<Json<AccountsResponse>, ServerError> {
    let accounts = state
        .engine
        .list_accounts(&account)
        .await?
        .into_iter()
        .map(account_view)
        .collect();

    Ok(Json(AccountsResponse { accounts }))
}

pub async fn update(
    Extension(account): Extension<Account>,
    State(state): State<ServerState>,
    Path(account_id): Path<Uuid>,
    Json(payload): Json<AccountUpdate>,
) -> Result<Json<AccountView>, ServerError> {
    let mut cmd = UpdateAccountCmd::new(account_id);
    if let Some(name) = payload.name {
        cmd = cmd.name(name);
    }
    if let Some(email) = payload.email {
        cmd = cmd.email(email);
    }
    if let Some(address) = payload.address {
        cmd = cmd.address(address);
    }
    if let Some(role) = payload.role {
        cmd = cmd.role(engine_role(role));
    }

    let updated = state.engine.update_account(&account, cmd).await?;
    Ok(Json(account_view(updated)))
}

pub async fn remove(
    Extension(account): Extension<Account>,
    State(state): State<ServerState>,
    Path(account_id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_account(&account, account_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
