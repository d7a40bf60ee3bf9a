//! Pull reference data from Dolibarr into the local dataset

use tracing::info;

use crate::dolibarr::client::DolibarrClient;
use crate::dolibarr::error::ErpError;
use crate::dolibarr::transport::Transport;
use crate::store::{DataSet, MergeStats};

/// What a pull changed locally
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub clients: MergeStats,
    pub produits: MergeStats,
    /// A store could not be written; its stats are zero
    pub save_failed: bool,
}

/// Fetch clients and products, then merge both into `data`
///
/// Both lists are fetched before anything is written, so a network or
/// server error leaves the local files untouched.
pub fn pull<T: Transport>(
    client: &DolibarrClient<T>,
    data: &DataSet,
) -> Result<SyncReport, ErpError> {
    let clients = client.fetch_clients()?;
    let produits = client.fetch_products()?;
    info!(
        clients = clients.len(),
        produits = produits.len(),
        "fetched from ERP"
    );

    let mut report = SyncReport::default();
    match data.merge_api_clients(clients) {
        Some(stats) => report.clients = stats,
        None => report.save_failed = true,
    }
    match data.merge_products(produits) {
        Some(stats) => report.produits = stats,
        None => report.save_failed = true,
    }
    Ok(report)
}
