pub mod engine;
pub mod error;
pub mod types;

pub use engine::{assign, assign_with_rng};
pub use error::SantaError;
pub use types::{Assignment, Employee, ForbiddenPairs, PriorAssignment};
