pub mod entities;

pub use entities::{EvaluatorProfile, InternshipOption, StudentOption};
