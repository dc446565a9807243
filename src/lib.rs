pub mod db;

pub mod portfolios;
pub mod positions;
pub mod stocks;
pub mod transactions;

pub mod errors;
pub mod schema;
pub mod utils;

pub use errors::{Error, Result};
