//! Fixture-backed warranty data: the JSON dataset and the deterministic
//! lookup service built on top of it.

pub mod dataset;
pub mod lookup;

pub use dataset::{Dataset, DatasetError};
pub use lookup::{
    FixtureWarrantyLookup, ORDER_NOT_FOUND, PRODUCT_DETAILS_NOT_FOUND, SERIAL_NOT_IMPLEMENTED,
};
