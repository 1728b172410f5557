pub mod app;
pub mod classifier;
pub mod cli;
pub mod composer;
pub mod config;
pub mod device;
pub mod error;
pub mod export;
pub mod metadata_source;
pub mod reconcile;
pub mod scanner;
pub mod session;
pub mod speech;
pub mod translate;
