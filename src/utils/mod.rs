pub mod normalize;
pub mod validate;

pub use normalize::{normalize, normalize_as, unwrap_data};
pub use validate::{validate_keyword, validate_required_id, validate_score, validate_sort_param};
