//! Shipping methods and cost computation.

use rust_decimal::Decimal;
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingMethod {
    pub id: Uuid,
    pub label: String,
    pub rate_per_kg: Decimal,
}

impl ShippingMethod {
    pub fn new(label: String, rate_per_kg: Decimal) -> ResultEngine<Self> {
        if rate_per_kg < Decimal::ZERO {
            return Err(EngineError::InvalidInput(
                "rate_per_kg must be >= 0".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            label,
            rate_per_kg,
        })
    }
}

/// Cost of shipping `weight` kilograms at `rate_per_kg`, rounded to cents.
///
/// Called exactly once per package, at creation. The stored cost is never
/// recomputed, so later rate changes only affect new packages.
pub fn shipping_cost(weight: Decimal, rate_per_kg: Decimal) -> Decimal {
    (weight * rate_per_kg).round_dp(2)
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "shipping_methods")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub label: String,
    pub rate_per_kg: Decimal,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::packages::Entity")]
    Packages,
}

impl Related<super::packages::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Packages.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&ShippingMethod> for ActiveModel {
    fn from(method: &ShippingMethod) -> Self {
        Self {
            id: ActiveValue::Set(method.id.to_string()),
            label: ActiveValue::Set(method.label.clone()),
            rate_per_kg: ActiveValue::Set(method.rate_per_kg),
        }
    }
}

impl TryFrom<Model> for ShippingMethod {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::KeyNotFound("shipping method not exists".to_string()))?,
            label: model.label,
            rate_per_kg: model.rate_per_kg,
        })
    }
}
