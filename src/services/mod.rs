pub mod evaluations;
pub mod profiles;
pub mod session;

pub use evaluations::{EvaluationListController, EvaluationService};
pub use profiles::ProfileService;
pub use session::{Session, SessionPhase};
