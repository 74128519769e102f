//! Utility modules for hubfs-rs.

pub mod flight;

pub use flight::Flight;
