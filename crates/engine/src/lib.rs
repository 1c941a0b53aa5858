pub use accounts::{Account, Role};
pub use commands::{CreateAccountCmd, CreatePackageCmd, UpdateAccountCmd};
pub use error::EngineError;
pub use filter::PackageFilter;
pub use notify::{PackageEvent, Subscription};
pub use ops::{Engine, EngineBuilder, PackageStats};
pub use packages::{Package, PackageStatus};
pub use shipping_methods::{ShippingMethod, shipping_cost};

mod accounts;
mod commands;
mod error;
mod filter;
mod notify;
mod ops;
mod packages;
mod shipping_methods;

type ResultEngine<T> = Result<T, EngineError>;
