//! The set of stores making up one local dataset

use std::sync::Arc;

use tracing::{info, warn};

use crate::codec::{ClientSchema, CommandeSchema, ProduitSchema};
use crate::core::entity::Entity;
use crate::entities::{Client, Commande, Produit};
use crate::store::backend::Backend;
use crate::store::collection::Store;
use crate::store::history::HistoryStore;

/// Outcome of [`DataSet::update_client`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientUpdate {
    /// The client record itself was replaced
    pub stored: bool,
    /// Orders whose client snapshot was refreshed
    pub orders_updated: usize,
}

/// Outcome of merging records pulled from the ERP
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    pub added: usize,
    pub updated: usize,
    pub kept_local: usize,
}

/// Clients, products, orders and URL history over one backend
#[derive(Clone)]
pub struct DataSet {
    pub clients: Store<ClientSchema>,
    pub produits: Store<ProduitSchema>,
    pub commandes: Store<CommandeSchema>,
    pub urls: HistoryStore,
}

impl DataSet {
    pub fn open(backend: Arc<dyn Backend>, history_size: usize) -> Self {
        Self {
            clients: Store::new(Arc::clone(&backend)),
            produits: Store::new(Arc::clone(&backend)),
            commandes: Store::new(Arc::clone(&backend)),
            urls: HistoryStore::new(backend, history_size),
        }
    }

    /// Refresh the client snapshot embedded in every order for this client
    ///
    /// Best effort: each order keeps its id, date, lines and user. Returns
    /// the number of orders rewritten.
    pub fn update_client_in_commandes(&self, client: &Client) -> usize {
        let updated = self.commandes.replace_where(|commande: &Commande| {
            (commande.client().id() == client.id()).then(|| commande.with_client(client.clone()))
        });
        if updated > 0 {
            info!(client = client.id(), orders = updated, "client snapshot propagated");
        }
        updated
    }

    /// Replace a client record, optionally propagating it to past orders
    pub fn update_client(&self, client: &Client, propagate: bool) -> ClientUpdate {
        let stored = self.clients.modify_by_id(client);
        let orders_updated = if stored && propagate {
            self.update_client_in_commandes(client)
        } else {
            0
        };
        ClientUpdate {
            stored,
            orders_updated,
        }
    }

    /// Merge ERP clients: same id replaces an ERP record, local records win
    pub fn merge_api_clients(&self, incoming: Vec<Client>) -> Option<MergeStats> {
        merge(&self.clients, incoming, Client::from_api)
    }

    /// Merge ERP products: same id replaces the stored product
    ///
    /// ERP ids carry their own prefix, so only products from an earlier
    /// pull can match.
    pub fn merge_products(&self, incoming: Vec<Produit>) -> Option<MergeStats> {
        merge(&self.produits, incoming, |_| true)
    }
}

/// Upsert `incoming` by id; existing records for which `replaceable` is
/// false are kept. Saves once, returning `None` when the save failed.
fn merge<S>(
    store: &Store<S>,
    incoming: Vec<S::Entity>,
    replaceable: fn(&S::Entity) -> bool,
) -> Option<MergeStats>
where
    S: crate::codec::Schema,
    S::Entity: Entity,
{
    let mut stats = MergeStats::default();

    let saved = store.update(|entities| {
        for record in incoming {
            match entities.iter_mut().find(|e| e.id() == record.id()) {
                Some(existing) if replaceable(existing) => {
                    *existing = record;
                    stats.updated += 1;
                }
                Some(_) => stats.kept_local += 1,
                None => {
                    entities.push(record);
                    stats.added += 1;
                }
            }
        }
        true
    });

    if saved {
        Some(stats)
    } else {
        warn!(file = store.file_name(), "merge not saved");
        None
    }
}
