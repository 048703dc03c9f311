pub mod app;
pub mod config;
pub mod error;
pub mod feed;
pub mod middleware;
pub mod routes;
pub mod services;
