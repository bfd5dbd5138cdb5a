pub mod cache;
pub mod logging;
pub mod observability;
