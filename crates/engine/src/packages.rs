//! Package primitives.
//!
//! A `Package` is a shipment record owned by the account that created it.
//! Its status only ever changes through the transition machinery in
//! `ops::status`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, Role};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PackageStatus {
    Pending,
    PickedUp,
    InTransit,
    OutForDelivery,
    Delivered,
    FailedDelivery,
    Returned,
    Cancelled,
}

impl PackageStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::PickedUp => "picked_up",
            Self::InTransit => "in_transit",
            Self::OutForDelivery => "out_for_delivery",
            Self::Delivered => "delivered",
            Self::FailedDelivery => "failed_delivery",
            Self::Returned => "returned",
            Self::Cancelled => "cancelled",
        }
    }

    /// Terminal for customers. Admins may still move a package out of these
    /// to correct mistakes.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Returned | Self::Cancelled)
    }
}

impl TryFrom<&str> for PackageStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "pending" => Ok(Self::Pending),
            "picked_up" => Ok(Self::PickedUp),
            "in_transit" => Ok(Self::InTransit),
            "out_for_delivery" => Ok(Self::OutForDelivery),
            "delivered" => Ok(Self::Delivered),
            "failed_delivery" => Ok(Self::FailedDelivery),
            "returned" => Ok(Self::Returned),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(EngineError::InvalidInput(format!(
                "invalid package status: {other}"
            ))),
        }
    }
}

/// Whether `role` may move a package from `from` to `to`.
///
/// Customers get exactly one move, cancelling a still-pending package.
/// Admins are unconstrained, backward moves included.
pub(crate) fn transition_permitted(role: Role, from: PackageStatus, to: PackageStatus) -> bool {
    match role {
        Role::Admin => true,
        Role::Customer => from == PackageStatus::Pending && to == PackageStatus::Cancelled,
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub recipient_name: String,
    pub recipient_address: String,
    pub weight: Decimal,
    pub method_id: Uuid,
    pub cost: Decimal,
    pub status: PackageStatus,
    pub created_at: DateTime<Utc>,
}

impl Package {
    pub fn new(
        owner_id: Uuid,
        recipient_name: String,
        recipient_address: String,
        weight: Decimal,
        method_id: Uuid,
        cost: Decimal,
    ) -> ResultEngine<Self> {
        if weight <= Decimal::ZERO {
            return Err(EngineError::InvalidInput("weight must be > 0".to_string()));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            owner_id,
            recipient_name,
            recipient_address,
            weight,
            method_id,
            cost,
            status: PackageStatus::Pending,
            created_at: Utc::now(),
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "packages")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub owner_id: String,
    pub recipient_name: String,
    pub recipient_address: String,
    pub weight: Decimal,
    pub method_id: String,
    pub cost: Decimal,
    pub status: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::OwnerId",
        to = "super::accounts::Column::Id"
    )]
    Accounts,
    #[sea_orm(
        belongs_to = "super::shipping_methods::Entity",
        from = "Column::MethodId",
        to = "super::shipping_methods::Column::Id"
    )]
    ShippingMethods,
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Accounts.def()
    }
}

impl Related<super::shipping_methods::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ShippingMethods.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Package> for ActiveModel {
    fn from(package: &Package) -> Self {
        Self {
            id: ActiveValue::Set(package.id.to_string()),
            owner_id: ActiveValue::Set(package.owner_id.to_string()),
            recipient_name: ActiveValue::Set(package.recipient_name.clone()),
            recipient_address: ActiveValue::Set(package.recipient_address.clone()),
            weight: ActiveValue::Set(package.weight),
            method_id: ActiveValue::Set(package.method_id.to_string()),
            cost: ActiveValue::Set(package.cost),
            status: ActiveValue::Set(package.status.as_str().to_string()),
            created_at: ActiveValue::Set(package.created_at),
        }
    }
}

impl TryFrom<Model> for Package {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::KeyNotFound("package not exists".to_string()))?,
            owner_id: Uuid::parse_str(&model.owner_id)
                .map_err(|_| EngineError::KeyNotFound("account not exists".to_string()))?,
            recipient_name: model.recipient_name,
            recipient_address: model.recipient_address,
            weight: model.weight,
            method_id: Uuid::parse_str(&model.method_id)
                .map_err(|_| EngineError::KeyNotFound("shipping method not exists".to_string()))?,
            cost: model.cost,
            status: PackageStatus::try_from(model.status.as_str())?,
            created_at: model.created_at,
        })
    }
}
