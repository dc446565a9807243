pub mod stocks_errors;
pub mod stocks_model;
pub mod stocks_repository;
pub mod stocks_service;
pub mod stocks_traits;

pub use stocks_errors::StockError;
pub use stocks_model::{NewStock, Stock, StockDB, StockUpdate};
pub use stocks_repository::StockRepository;
pub use stocks_service::StockService;
pub use stocks_traits::{StockRepositoryTrait, StockServiceTrait};
