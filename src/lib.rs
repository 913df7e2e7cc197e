pub mod config;
pub mod engine;
pub mod feed;
pub mod notify;
pub mod pipeline;
pub mod store;
