#![forbid(unsafe_code)]

pub mod config;
pub mod errors;
pub mod logging;
pub mod models;
pub mod records;
pub mod sender;
pub mod slack;
pub mod storage;
pub mod webhook;

pub use config::GlobalConfig;
pub use errors::{AppError, Result};
