pub mod repository;
pub mod resolver;
pub mod types;
