#![forbid(unsafe_code)]

pub mod api;
pub mod auth;
pub mod cli;
pub mod commands;
pub mod config;
pub mod controller;
pub mod formats;
pub mod headings;
pub mod listing;
pub mod logging;
pub mod menu;
pub mod router;
pub mod session;
pub mod store;
pub mod transform;
pub mod viewport;
