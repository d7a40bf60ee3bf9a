//! File-backed persistence
//!
//! - [`backend`] - the file-system facade and per-file locks
//! - [`collection`] - [`Store`], the whole-file repository for one entity kind
//! - [`history`] - capped newest-first string lists
//! - [`dataset`] - the stores of one local dataset and cross-store updates

pub mod backend;
pub mod collection;
pub mod dataset;
pub mod history;

pub use backend::{Backend, LocalDir, MemoryDir};
pub use collection::{Store, Stored};
pub use dataset::{ClientUpdate, DataSet, MergeStats};
pub use history::HistoryStore;
