//! Status transitions.
//!
//! Every change runs the same five steps: fresh read, authorization,
//! legality, compare-and-set keyed on the status that was read, event
//! publish. The conditional update is the only serialization point; a lost
//! race surfaces as `Conflict` and is never retried here.

use sea_orm::{QueryFilter, TransactionTrait, prelude::*, sea_query::Expr};
use uuid::Uuid;

use crate::notify::PackageEvent;
use crate::packages::transition_permitted;
use crate::{Account, EngineError, Package, PackageStatus, ResultEngine, packages};

use super::{Engine, access::require_package_access, with_tx};

impl Engine {
    /// Customer door into the state machine: cancel an own, still-pending
    /// package.
    pub async fn cancel_package(
        &self,
        requester: &Account,
        package_id: Uuid,
    ) -> ResultEngine<Package> {
        self.apply_transition(requester, package_id, PackageStatus::Cancelled)
            .await
    }

    /// Admin door into the state machine: move a package anywhere.
    pub async fn set_package_status(
        &self,
        requester: &Account,
        package_id: Uuid,
        new_status: PackageStatus,
    ) -> ResultEngine<Package> {
        if !requester.role.is_admin() {
            return Err(EngineError::Forbidden(
                "only admins may set package status".to_string(),
            ));
        }
        self.apply_transition(requester, package_id, new_status)
            .await
    }

    async fn apply_transition(
        &self,
        requester: &Account,
        package_id: Uuid,
        new_status: PackageStatus,
    ) -> ResultEngine<Package> {
        // Fresh read; a caller-supplied snapshot is never trusted.
        let model = with_tx!(self, |db_tx| {
            self.require_package_by_id(&db_tx, package_id).await
        })?;
        require_package_access(requester, &model)?;

        let current = PackageStatus::try_from(model.status.as_str())?;
        if !transition_permitted(requester.role, current, new_status) {
            return Err(EngineError::InvalidTransition(format!(
                "{} -> {} not permitted for {}",
                current.as_str(),
                new_status.as_str(),
                requester.role.as_str()
            )));
        }

        // The order guard spans the conditional write and the publish, so
        // subscribers observe transitions in commit order.
        let _order = self.events.order_guard().await;
        let won = self.cas_set_status(package_id, current, new_status).await?;
        if !won {
            return Err(EngineError::Conflict(format!(
                "package {package_id} changed concurrently"
            )));
        }

        let mut package = Package::try_from(model)?;
        package.status = new_status;
        self.events.publish(&PackageEvent {
            package: package.clone(),
        });
        Ok(package)
    }

    /// Conditional status write keyed on the previously read value. True when
    /// this caller won the race.
    pub(crate) async fn cas_set_status(
        &self,
        package_id: Uuid,
        from: PackageStatus,
        to: PackageStatus,
    ) -> ResultEngine<bool> {
        let result = packages::Entity::update_many()
            .col_expr(packages::Column::Status, Expr::value(to.as_str()))
            .filter(packages::Column::Id.eq(package_id.to_string()))
            .filter(packages::Column::Status.eq(from.as_str()))
            .exec(&self.database)
            .await?;
        Ok(result.rows_affected == 1)
    }
}
