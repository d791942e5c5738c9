mod classifier;
mod config;
mod guard;
mod rate_limiter;
