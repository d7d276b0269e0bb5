pub mod dates;
pub mod lenient;
pub mod pagination;

pub use pagination::{
    NormalizedPage, OneBasedPage, SortDirection, SortSpec, ZeroBasedPage,
};
