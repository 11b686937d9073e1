pub mod form;
pub mod repository;
pub mod types;
