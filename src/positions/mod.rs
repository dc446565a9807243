pub mod calculator;
pub mod positions_errors;
pub mod positions_model;
pub mod positions_repository;
pub mod positions_service;
pub mod positions_traits;

pub use calculator::CostBasis;
pub use positions_errors::PositionError;
pub use positions_model::{Position, PositionDB};
pub use positions_repository::PositionRepository;
pub use positions_service::PositionService;
pub use positions_traits::{PositionRepositoryTrait, PositionServiceTrait};
