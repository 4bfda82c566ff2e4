pub mod config;
pub mod error;
pub mod flows;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod services;
pub mod state;
