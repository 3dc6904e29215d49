//! Data models for the repair-service backend.
//!
//! This module contains the wire types exchanged with the backend:
//!
//! - `Customer`: who owns the machines
//! - `Machine`: a serviced machine with delivery and invoice state
//! - `Repair`, `RepairLog`, `RepairStatus`: repair tickets and their history
//! - `Operation`, `SparePart`: labor and parts, both the global price
//!   catalogs and the entries attached to a repair
//!
//! The backend speaks camelCase JSON; renames are per field.

pub mod catalog;
pub mod customer;
pub mod machine;
pub mod repair;

pub use catalog::{NewOperation, NewSparePart, Operation, SparePart};
pub use customer::{Customer, NewCustomer};
pub use machine::{Machine, NewMachine};
pub use repair::{NewRepair, NewRepairLog, Repair, RepairLog, RepairStatus, RepairUpdate};
