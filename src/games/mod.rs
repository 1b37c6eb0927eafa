//! Game implementations.

pub mod manhunt;
