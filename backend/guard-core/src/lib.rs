pub mod classifier;
pub mod config;
pub mod error;
pub mod guard;
pub mod logger;
pub mod rate_limiter;
pub mod retry;
pub mod security;
pub mod storage;
pub mod time;
pub mod validation;

#[cfg(test)]
mod tests;

pub use guard::{ActionGuard, Kernel};

pub const APP_NAME: &str = "client-guard";
pub const ENV_PREFIX: &str = "CLIENT_GUARD_";
