pub mod engine;
pub mod limits;
pub mod loader;
pub mod model;
pub mod observability;
pub mod tools;
