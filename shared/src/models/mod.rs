//! Data models
//!
//! Row types for the hosted data store tables. Field names match the column
//! names so rows deserialize straight from the REST responses.

pub mod balance;
pub mod delegate;
pub mod location;
pub mod role;
pub mod sheet;
pub mod shipment;
pub mod shipper;
pub mod store;

// Re-exports
pub use balance::*;
pub use delegate::*;
pub use location::*;
pub use role::*;
pub use sheet::*;
pub use shipment::*;
pub use shipper::*;
pub use store::*;

/// Table names in the data store
pub mod tables {
    pub const SHIPMENTS: &str = "shipments";
    pub const DELEGATES: &str = "delegates";
    pub const SHIPPERS: &str = "shippers";
    pub const STORES: &str = "stores";
    pub const SHEETS: &str = "sheets";
    pub const GOVERNORATES: &str = "governorates";
    pub const AREAS: &str = "areas";
    pub const BALANCE_TRANSACTIONS: &str = "balance_transactions";
    pub const USER_ROLES: &str = "user_roles";
}
