pub mod portfolios_errors;
pub mod portfolios_model;
pub mod portfolios_repository;
pub mod portfolios_service;
pub mod portfolios_traits;

pub use portfolios_errors::PortfolioError;
pub use portfolios_model::{NewPortfolio, Portfolio, PortfolioDB, PortfolioSummary, PortfolioUpdate};
pub use portfolios_repository::PortfolioRepository;
pub use portfolios_service::PortfolioService;
pub use portfolios_traits::{PortfolioLookupTrait, PortfolioRepositoryTrait, PortfolioServiceTrait};
