// Library for tests to access modules

pub mod aggregation;
pub mod config;
pub mod error;
pub mod filter;
pub mod models;
pub mod overview;
pub mod phases;
pub mod report_repo;
pub mod routes;
pub mod session;
pub mod version;
