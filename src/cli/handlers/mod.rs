//! CLI command handlers, organized by domain:
//! - ask: question answering and single-provider tests
//! - data: corpus listing, ingestion and clearing
//! - info: status and configuration display

pub mod ask;
pub mod data;
pub mod info;

pub use ask::*;
pub use data::*;
pub use info::*;
