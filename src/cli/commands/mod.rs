//! CLI command implementations

pub mod client;
pub mod completions;
pub mod history;
pub mod init;
pub mod login;
pub mod order;
pub mod product;
pub mod sync;
