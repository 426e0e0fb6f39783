pub mod apply;
pub mod handlers;
pub mod listing;
