// Library exports for GymLink
// This allows integration tests and external code to use GymLink modules

pub mod authz;
pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod routes;
pub mod service;
pub mod state;
