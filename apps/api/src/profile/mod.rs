pub mod completeness;
pub mod handlers;
pub mod validation;
