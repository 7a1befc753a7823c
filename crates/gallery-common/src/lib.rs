pub mod error;
pub mod markdown;
pub mod model;
pub mod redis;
