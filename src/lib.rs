pub mod config;
pub mod db;
pub mod handlers;
pub mod i18n;
pub mod models;
pub mod services;
pub mod signup;
pub mod state;
pub mod store;
pub mod views;
