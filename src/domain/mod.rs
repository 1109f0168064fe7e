//! Domain types and the ports the application layer talks through.

pub mod debt;
pub mod ports;
pub mod profile;
pub mod schedule;
