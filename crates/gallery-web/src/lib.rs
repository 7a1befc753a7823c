pub mod assets;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod error;
pub mod filter;
pub mod gallery;
pub mod highlight;
pub mod pagination;
pub mod preview;
pub mod rate_limit;
pub mod server;
pub mod view;
