pub mod actions;
pub mod auth;
pub mod config;
pub mod data;
pub mod db;
pub mod error;
pub mod invalidation;
pub mod models;
pub mod resolver;
pub mod search;
pub mod server;
pub mod ui;
pub mod validation;
