use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod account {
    use super::*;

    /// Role of an account.
    ///
    /// The server treats roles as:
    /// - `admin`: manages all packages, accounts and shipping rates.
    /// - `customer`: creates and tracks their own packages.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum AccountRole {
        Customer,
        Admin,
    }

    /// Request body for signup.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountNew {
        pub name: String,
        pub email: String,
        pub address: String,
        pub password: String,
    }

    /// Request body for updating an account.
    ///
    /// Absent fields are left untouched. `role` is admin-only.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountUpdate {
        pub name: Option<String>,
        pub email: Option<String>,
        pub address: Option<String>,
        pub role: Option<AccountRole>,
    }

    /// An account as returned by the server. Never carries credentials.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountView {
        pub id: Uuid,
        pub name: String,
        pub email: String,
        pub address: String,
        pub role: AccountRole,
        /// RFC3339 timestamp in UTC.
        pub created_at: DateTime<Utc>,
    }

    /// Response body for listing accounts.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountsResponse {
        pub accounts: Vec<AccountView>,
    }
}

pub mod package {
    use super::*;

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

    /// Request body for creating a package.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct PackageNew {
        pub recipient_name: String,
        pub recipient_address: String,
        /// Kilograms, must be > 0. Serialized as a string.
        pub weight: Decimal,
        pub method_id: Uuid,
    }

    /// Filter body for listing packages. Absent fields match everything;
    /// present fields AND-compose.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct PackageList {
        pub status: Option<PackageStatus>,
        /// Case-insensitive substring over id, recipient and owner email.
        pub search: Option<String>,
        /// Inclusive lower bound on creation time.
        pub from: Option<DateTime<Utc>>,
        /// Inclusive upper bound on creation time.
        pub to: Option<DateTime<Utc>>,
    }

    /// Request body for the admin status override.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct StatusUpdate {
        pub status: PackageStatus,
    }

    /// A package snapshot as returned by the server and carried by events.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct PackageView {
        pub id: Uuid,
        pub owner_id: Uuid,
        pub recipient_name: String,
        pub recipient_address: String,
        /// Kilograms. Serialized as a string.
        pub weight: Decimal,
        pub method_id: Uuid,
        /// Fixed at creation time; rate changes never touch it.
        pub cost: Decimal,
        pub status: PackageStatus,
        /// RFC3339 timestamp in UTC.
        pub created_at: DateTime<Utc>,
    }

    /// Response body for listing packages, newest first.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct PackagesResponse {
        pub packages: Vec<PackageView>,
    }
}

pub mod method {
    use super::*;

    /// Request body for registering a shipping method.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct MethodNew {
        pub label: String,
        /// Must be >= 0. Serialized as a string.
        pub rate_per_kg: Decimal,
    }

    /// Request body for a rate change. Prospective only.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct RateUpdate {
        pub rate_per_kg: Decimal,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MethodView {
        pub id: Uuid,
        pub label: String,
        pub rate_per_kg: Decimal,
    }

    /// Response body for listing shipping methods.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct MethodsResponse {
        pub methods: Vec<MethodView>,
    }
}

pub mod stats {
    use super::*;

    /// Fleet counters for the admin dashboard.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct Statistic {
        pub total: i64,
        pub pending: i64,
        pub created_last_week: i64,
    }
}

pub mod event {
    use super::*;

    /// One committed package change, pushed over the event stream.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct PackageEvent {
        pub package: package::PackageView,
    }
}
