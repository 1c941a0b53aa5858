//! Authorization gate.
//!
//! Every operation funnels its role and ownership checks through here; no
//! handler or op re-derives access rules on its own.

use sea_orm::{DatabaseTransaction, prelude::*};
use uuid::Uuid;

use crate::{Account, EngineError, ResultEngine, accounts, packages, shipping_methods};

use super::Engine;

/// Admin-only operations call this first.
pub(super) fn require_admin(requester: &Account) -> ResultEngine<()> {
    if requester.role.is_admin() {
        return Ok(());
    }
    Err(EngineError::Forbidden(format!(
        "account {} is not an admin",
        requester.id
    )))
}

/// Only the owner or an admin may read or mutate a package.
///
/// The package id is opaque, so an existing-but-foreign package answers
/// `Forbidden` rather than masquerading as missing.
pub(super) fn require_package_access(
    requester: &Account,
    model: &packages::Model,
) -> ResultEngine<()> {
    if requester.role.is_admin() || model.owner_id == requester.id.to_string() {
        return Ok(());
    }
    Err(EngineError::Forbidden(format!(
        "package {} belongs to another account",
        model.id
    )))
}

impl Engine {
    pub(super) async fn require_package_by_id(
        &self,
        db: &DatabaseTransaction,
        package_id: Uuid,
    ) -> ResultEngine<packages::Model> {
        packages::Entity::find_by_id(package_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("package not exists".to_string()))
    }

    pub(super) async fn find_method_by_id(
        &self,
        db: &DatabaseTransaction,
        method_id: Uuid,
    ) -> ResultEngine<Option<shipping_methods::Model>> {
        shipping_methods::Entity::find_by_id(method_id.to_string())
            .one(db)
            .await
            .map_err(Into::into)
    }

    pub(super) async fn require_method_by_id(
        &self,
        db: &DatabaseTransaction,
        method_id: Uuid,
    ) -> ResultEngine<shipping_methods::Model> {
        self.find_method_by_id(db, method_id)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("shipping method not exists".to_string()))
    }

    pub(super) async fn require_account_by_id(
        &self,
        db: &DatabaseTransaction,
        account_id: Uuid,
    ) -> ResultEngine<accounts::Model> {
        accounts::Entity::find_by_id(account_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("account not exists".to_string()))
    }
}
