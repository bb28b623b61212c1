pub mod api;
pub mod app;
pub mod cache;
pub mod config;
pub mod eto;
pub mod export;
pub mod fetch_error;
pub mod fetcher;
pub mod importers;
pub mod scheduler;
pub mod services;
pub mod source;
pub mod utils;
