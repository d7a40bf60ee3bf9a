//! Dolibarr ERP collaborator: login, reference data download and sync

pub mod api;
pub mod client;
pub mod error;
pub mod sync;
pub mod transport;

pub use client::{login, DolibarrClient};
pub use error::ErpError;
pub use sync::{pull, SyncReport};
pub use transport::{HttpResponse, ReqwestTransport, Transport};
