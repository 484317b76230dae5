pub mod auth;
pub mod config;
pub mod permissions;
pub mod users;
