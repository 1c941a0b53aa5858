use rust_decimal::Decimal;
use sea_orm::{
    ActiveValue, IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait,
    prelude::*, sea_query::Expr,
};
use uuid::Uuid;

use crate::shipping_methods::shipping_cost;
use crate::{
    Account, EngineError, ResultEngine, ShippingMethod, packages, shipping_methods,
};

use super::{Engine, access::require_admin, normalize_required_text, with_tx};

impl Engine {
    /// Shipping cost for `weight` kilograms via `method_id`.
    ///
    /// Pure given its inputs; the repository calls it exactly once per
    /// package, at creation.
    pub async fn compute_cost(&self, weight: Decimal, method_id: Uuid) -> ResultEngine<Decimal> {
        if weight <= Decimal::ZERO {
            return Err(EngineError::InvalidInput("weight must be > 0".to_string()));
        }
        with_tx!(self, |db_tx| {
            let Some(method) = self.find_method_by_id(&db_tx, method_id).await? else {
                return Err(EngineError::InvalidInput(format!(
                    "unknown shipping method {method_id}"
                )));
            };
            Ok(shipping_cost(weight, method.rate_per_kg))
        })
    }

    /// Every method, for pickers and the admin screen. Any authenticated
    /// account may call this.
    pub async fn list_shipping_methods(&self) -> ResultEngine<Vec<ShippingMethod>> {
        with_tx!(self, |db_tx| {
            let models = shipping_methods::Entity::find()
                .order_by_asc(shipping_methods::Column::Label)
                .all(&db_tx)
                .await?;
            models.into_iter().map(ShippingMethod::try_from).collect()
        })
    }

    /// Add a method to the registry.
    pub async fn create_shipping_method(
        &self,
        requester: &Account,
        label: &str,
        rate_per_kg: Decimal,
    ) -> ResultEngine<ShippingMethod> {
        require_admin(requester)?;
        let label = normalize_required_text(label, "label")?;
        let method = ShippingMethod::new(label.clone(), rate_per_kg)?;
        let entry: shipping_methods::ActiveModel = (&method).into();
        with_tx!(self, |db_tx| {
            let exists = shipping_methods::Entity::find()
                .filter(Expr::cust("LOWER(label)").eq(label.to_lowercase()))
                .one(&db_tx)
                .await?
                .is_some();
            if exists {
                return Err(EngineError::Conflict(format!(
                    "shipping method {label} already present"
                )));
            }
            entry.insert(&db_tx).await?;
            Ok(method)
        })
    }

    /// Change a method's rate. Prospective only: packages priced under the
    /// old rate keep their stored cost.
    pub async fn update_shipping_rate(
        &self,
        requester: &Account,
        method_id: Uuid,
        new_rate: Decimal,
    ) -> ResultEngine<ShippingMethod> {
        require_admin(requester)?;
        if new_rate < Decimal::ZERO {
            return Err(EngineError::InvalidInput(
                "rate_per_kg must be >= 0".to_string(),
            ));
        }
        with_tx!(self, |db_tx| {
            let model = self.require_method_by_id(&db_tx, method_id).await?;
            let mut entry = model.into_active_model();
            entry.rate_per_kg = ActiveValue::Set(new_rate);
            let updated = entry.update(&db_tx).await?;
            ShippingMethod::try_from(updated)
        })
    }

    /// Remove a method. Refused while packages still reference it.
    pub async fn delete_shipping_method(
        &self,
        requester: &Account,
        method_id: Uuid,
    ) -> ResultEngine<()> {
        require_admin(requester)?;
        with_tx!(self, |db_tx| {
            let model = self.require_method_by_id(&db_tx, method_id).await?;
            let referenced = packages::Entity::find()
                .filter(packages::Column::MethodId.eq(model.id.clone()))
                .count(&db_tx)
                .await?;
            if referenced > 0 {
                return Err(EngineError::Conflict(format!(
                    "shipping method {method_id} is referenced by {referenced} packages"
                )));
            }
            shipping_methods::Entity::delete_by_id(model.id)
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }
}
