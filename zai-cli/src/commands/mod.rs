pub mod chat;
pub mod config;
pub mod credentials;
pub mod headers;
pub mod models;
pub mod sign;
pub mod token;
