pub mod auth;
pub mod common;
pub mod evaluations;
pub mod profiles;
