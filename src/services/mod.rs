pub mod engine;
pub mod fetcher;
pub mod poller;
pub mod store;
