mod error_sink;
mod file_store;
mod pipeline;
mod transport;
