pub mod action;
pub mod cert;
pub mod client;
pub mod config;
pub mod interactive;
pub mod style;
