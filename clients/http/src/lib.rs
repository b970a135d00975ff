pub mod config;
pub mod error;
pub mod routes;
pub mod service;
pub mod store;
