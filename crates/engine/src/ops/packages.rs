use chrono::{DateTime, Duration, Utc};
use sea_orm::{QueryFilter, QueryOrder, Statement, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::notify::{PackageEvent, Subscription};
use crate::{
    Account, CreatePackageCmd, Package, PackageFilter, PackageStatus, ResultEngine, Role,
    accounts, packages,
};

use super::{
    Engine,
    access::{require_admin, require_package_access},
    normalize_required_text, with_tx,
};

/// Fleet counters for the admin dashboard.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PackageStats {
    pub total: i64,
    pub pending: i64,
    pub created_last_week: i64,
}

impl Engine {
    /// Create a package owned by the requester.
    ///
    /// The cost is computed here, once; rate changes never touch it again.
    pub async fn create_package(
        &self,
        requester: &Account,
        cmd: CreatePackageCmd,
    ) -> ResultEngine<Package> {
        let recipient_name = normalize_required_text(&cmd.recipient_name, "recipient name")?;
        let recipient_address =
            normalize_required_text(&cmd.recipient_address, "recipient address")?;
        let cost = self.compute_cost(cmd.weight, cmd.method_id).await?;

        let package = Package::new(
            requester.id,
            recipient_name,
            recipient_address,
            cmd.weight,
            cmd.method_id,
            cost,
        )?;
        let entry: packages::ActiveModel = (&package).into();

        let _order = self.events.order_guard().await;
        entry.insert(&self.database).await?;
        self.events.publish(&PackageEvent {
            package: package.clone(),
        });
        Ok(package)
    }

    /// Fetch one package, enforcing ownership for customers.
    pub async fn get_package(
        &self,
        requester: &Account,
        package_id: Uuid,
    ) -> ResultEngine<Package> {
        with_tx!(self, |db_tx| {
            let model = self.require_package_by_id(&db_tx, package_id).await?;
            require_package_access(requester, &model)?;
            Package::try_from(model)
        })
    }

    /// List packages visible to the requester, newest first.
    ///
    /// Customers are hard-scoped to their own packages before the filter
    /// runs; no filter widens visibility.
    pub async fn list_packages(
        &self,
        requester: &Account,
        filter: &PackageFilter,
    ) -> ResultEngine<Vec<Package>> {
        filter.validate()?;
        with_tx!(self, |db_tx| {
            let mut query = packages::Entity::find()
                .find_also_related(accounts::Entity)
                .order_by_desc(packages::Column::CreatedAt)
                .order_by_desc(packages::Column::Id);
            if requester.role == Role::Customer {
                query = query.filter(packages::Column::OwnerId.eq(requester.id.to_string()));
            }

            let rows: Vec<(packages::Model, Option<accounts::Model>)> =
                query.all(&db_tx).await?;
            let mut out = Vec::with_capacity(rows.len());
            for (package_model, owner_model) in rows {
                let owner_email = owner_model.map(|m| m.email).unwrap_or_default();
                let package = Package::try_from(package_model)?;
                if filter.matches(&package, &owner_email) {
                    out.push(package);
                }
            }
            Ok(out)
        })
    }

    /// Subscribe to package change events.
    ///
    /// The stream only carries packages the requester may see; dropping the
    /// subscription unsubscribes.
    pub fn subscribe_package_events(&self, requester: &Account) -> Subscription {
        self.events.subscribe(requester)
    }

    /// Fleet counters: totals plus activity in the 7 days before `now`.
    pub async fn package_stats(
        &self,
        requester: &Account,
        now: DateTime<Utc>,
    ) -> ResultEngine<PackageStats> {
        require_admin(requester)?;
        let week_ago = now - Duration::days(7);
        with_tx!(self, |db_tx| {
            let backend = self.database.get_database_backend();

            let total: i64 = {
                let stmt = Statement::from_sql_and_values(
                    backend,
                    "SELECT COUNT(*) AS cnt FROM packages;",
                    vec![],
                );
                let row = db_tx.query_one(stmt).await?;
                row.and_then(|r| r.try_get("", "cnt").ok()).unwrap_or(0)
            };

            let pending: i64 = {
                let stmt = Statement::from_sql_and_values(
                    backend,
                    "SELECT COUNT(*) AS cnt FROM packages WHERE status = ?;",
                    vec![PackageStatus::Pending.as_str().into()],
                );
                let row = db_tx.query_one(stmt).await?;
                row.and_then(|r| r.try_get("", "cnt").ok()).unwrap_or(0)
            };

            let created_last_week: i64 = {
                let stmt = Statement::from_sql_and_values(
                    backend,
                    "SELECT COUNT(*) AS cnt FROM packages WHERE created_at >= ?;",
                    vec![week_ago.into()],
                );
                let row = db_tx.query_one(stmt).await?;
                row.and_then(|r| r.try_get("", "cnt").ok()).unwrap_or(0)
            };

            Ok(PackageStats {
                total,
                pending,
                created_last_week,
            })
        })
    }
}
