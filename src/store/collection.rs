//! File-backed entity collections
//!
//! A [`Store`] is bound to exactly one file holding a JSON array of one
//! entity kind. Every mutation reloads the whole collection, changes it in
//! memory and rewrites the whole file, all under the file's lock so that
//! concurrent writers cannot lose each other's updates.
//!
//! Storage failures never escape as errors: reads degrade to an empty
//! collection, writes report `false`, and both are logged.

use std::collections::HashSet;
use std::marker::PhantomData;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::codec::{
    from_document, to_document, ClientSchema, CodecError, CommandeSchema, ProduitSchema, Schema,
};
use crate::core::entity::{numeric_id, Entity};
use crate::store::backend::{acquire, Backend};

/// A schema with a default production file name
pub trait Stored: Schema {
    const FILE_NAME: &'static str;
}

impl Stored for ClientSchema {
    const FILE_NAME: &'static str = "clients.json";
}

impl Stored for ProduitSchema {
    const FILE_NAME: &'static str = "produits.json";
}

impl Stored for CommandeSchema {
    const FILE_NAME: &'static str = "commandes.json";
}

/// Why a read produced nothing usable
enum ReadFailure {
    Io(std::io::Error),
    Codec(CodecError),
}

impl std::fmt::Display for ReadFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReadFailure::Io(e) => write!(f, "{}", e),
            ReadFailure::Codec(e) => write!(f, "{}", e),
        }
    }
}

/// Repository over one entity file
pub struct Store<S: Schema> {
    backend: Arc<dyn Backend>,
    file_name: String,
    _schema: PhantomData<fn() -> S>,
}

impl<S: Schema> Clone for Store<S> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            file_name: self.file_name.clone(),
            _schema: PhantomData,
        }
    }
}

impl<S: Stored> Store<S>
where
    S::Entity: Entity,
{
    /// Store bound to the schema's production file
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self::with_file_name(backend, S::FILE_NAME)
    }
}

impl<S: Schema> Store<S>
where
    S::Entity: Entity,
{
    /// Store bound to an alternate file, e.g. an isolated dataset
    pub fn with_file_name(backend: Arc<dyn Backend>, file_name: impl Into<String>) -> Self {
        Self {
            backend,
            file_name: file_name.into(),
            _schema: PhantomData,
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    fn read(&self) -> Result<Vec<S::Entity>, ReadFailure> {
        match self.backend.read(&self.file_name) {
            Ok(None) => Ok(Vec::new()),
            Ok(Some(text)) => from_document::<S>(&text).map_err(ReadFailure::Codec),
            Err(e) => Err(ReadFailure::Io(e)),
        }
    }

    fn write(&self, entities: &[S::Entity]) -> bool {
        let document = match to_document::<S>(entities) {
            Ok(document) => document,
            Err(e) => {
                warn!(file = %self.file_name, error = %e, "failed to encode collection");
                return false;
            }
        };
        match self.backend.write(&self.file_name, &document) {
            Ok(()) => {
                debug!(file = %self.file_name, count = entities.len(), "collection saved");
                true
            }
            Err(e) => {
                warn!(file = %self.file_name, error = %e, "failed to save collection");
                false
            }
        }
    }

    /// Run one read-modify-write cycle under the file lock
    ///
    /// `change` returns whether it modified the collection; the file is
    /// only rewritten when it did. An unreadable file is left untouched.
    pub fn update<F>(&self, change: F) -> bool
    where
        F: FnOnce(&mut Vec<S::Entity>) -> bool,
    {
        let lock = self.backend.lock(&self.file_name);
        let _guard = acquire(&lock);

        let mut entities = match self.read() {
            Ok(entities) => entities,
            Err(e) => {
                warn!(
                    file = %self.file_name,
                    error = %e,
                    "refusing to rewrite unreadable collection"
                );
                return false;
            }
        };

        change(&mut entities) && self.write(&entities)
    }

    /// Every stored entity; missing or unreadable files yield an empty list
    pub fn load_all(&self) -> Vec<S::Entity> {
        let lock = self.backend.lock(&self.file_name);
        let _guard = acquire(&lock);

        self.read().unwrap_or_else(|e| {
            warn!(file = %self.file_name, error = %e, "failed to load collection");
            Vec::new()
        })
    }

    /// Replace the stored collection
    pub fn save_all(&self, entities: &[S::Entity]) -> bool {
        let lock = self.backend.lock(&self.file_name);
        let _guard = acquire(&lock);
        self.write(entities)
    }

    /// Append one entity
    pub fn add(&self, entity: &S::Entity) -> bool {
        self.update(|entities| {
            entities.push(entity.clone());
            true
        })
    }

    /// Replace the first entity sharing `entity`'s id
    ///
    /// Returns false without writing when no id matches.
    pub fn modify_by_id(&self, entity: &S::Entity) -> bool {
        self.update(|entities| {
            match entities.iter_mut().find(|e| e.id() == entity.id()) {
                Some(slot) => {
                    *slot = entity.clone();
                    true
                }
                None => {
                    debug!(
                        kind = <S::Entity as Entity>::KIND,
                        id = entity.id(),
                        "no record to modify"
                    );
                    false
                }
            }
        })
    }

    /// Remove every entity with this id
    pub fn delete_by_id(&self, id: &str) -> bool {
        self.update(|entities| {
            let before = entities.len();
            entities.retain(|e| e.id() != id);
            entities.len() != before
        })
    }

    /// Rewrite entities in place; `change` returns the replacement for
    /// entities it wants to change
    ///
    /// Returns how many entities were replaced and saved.
    pub fn replace_where<F>(&self, mut change: F) -> usize
    where
        F: FnMut(&S::Entity) -> Option<S::Entity>,
    {
        let mut replaced = 0;
        let saved = self.update(|entities| {
            for slot in entities.iter_mut() {
                if let Some(updated) = change(slot) {
                    *slot = updated;
                    replaced += 1;
                }
            }
            replaced > 0
        });
        if saved {
            replaced
        } else {
            0
        }
    }

    pub fn find_by_id(&self, id: &str) -> Option<S::Entity> {
        self.load_all().into_iter().find(|e| e.id() == id)
    }

    pub fn count(&self) -> usize {
        self.load_all().len()
    }

    /// True when the file exists and is not empty
    pub fn exists(&self) -> bool {
        self.backend
            .size(&self.file_name)
            .is_some_and(|len| len > 0)
    }

    /// Delete the file; succeeds when it was already gone
    pub fn clear(&self) -> bool {
        let lock = self.backend.lock(&self.file_name);
        let _guard = acquire(&lock);

        match self.backend.remove(&self.file_name) {
            Ok(()) => true,
            Err(e) => {
                warn!(file = %self.file_name, error = %e, "failed to clear collection");
                false
            }
        }
    }

    /// Next locally sequential id: one past the largest numeric id
    ///
    /// When that id is `u64::MAX`, the lowest free number is used instead.
    pub fn next_id(&self) -> String {
        let used: HashSet<u64> = self
            .load_all()
            .iter()
            .filter_map(|e| numeric_id(e.id()))
            .collect();
        used.iter()
            .max()
            .map_or(Some(1), |max| max.checked_add(1))
            .or_else(|| (1..u64::MAX).find(|n| !used.contains(n)))
            .unwrap_or(0)
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Client, Commande, LigneCommande, Produit};
    use crate::store::backend::{LocalDir, MemoryDir};
    use chrono::{TimeZone, Utc};
    use tempfile::tempdir;

    fn client(id: &str, nom: &str) -> Client {
        Client::builder()
            .id(id)
            .nom(nom)
            .adresse("10 rue de la Paix")
            .code_postal("75002")
            .ville("Paris")
            .adresse_mail("dupont@example.com")
            .telephone("0123456789")
            .utilisateur("userTest")
            .date_saisie(Utc.timestamp_millis_opt(1_000_000_000_000).unwrap())
            .build()
            .unwrap()
    }

    fn local_store(dir: &std::path::Path) -> Store<ClientSchema> {
        Store::with_file_name(Arc::new(LocalDir::new(dir)), "clients_test.json")
    }

    #[test]
    fn test_missing_file_yields_empty() {
        let dir = tempdir().unwrap();
        let store = local_store(dir.path());
        assert!(store.load_all().is_empty());
        assert_eq!(store.count(), 0);
        assert!(!store.exists());
    }

    #[test]
    fn test_load_after_save() {
        let dir = tempdir().unwrap();
        let store = local_store(dir.path());
        let clients = vec![client("1", "Dupont"), client("2", "Martin")];

        assert!(store.save_all(&clients));
        assert_eq!(store.load_all(), clients);
        assert!(store.exists());

        assert!(store.save_all(&[]));
        assert!(store.load_all().is_empty());
    }

    #[test]
    fn test_add_then_modify_replaces() {
        let dir = tempdir().unwrap();
        let store = local_store(dir.path());
        let original = client("1", "Dupont");

        assert!(store.add(&original));
        let renamed = original.to_builder().nom("Dupont SARL").build().unwrap();
        assert!(store.modify_by_id(&renamed));

        assert_eq!(store.count(), 1);
        assert_eq!(store.find_by_id("1").unwrap().nom(), "Dupont SARL");
    }

    #[test]
    fn test_modify_unknown_id_skips_save() {
        let backend = Arc::new(MemoryDir::new());
        let store: Store<ClientSchema> = Store::new(backend.clone());
        assert!(!store.modify_by_id(&client("9", "Absent")));
        assert!(backend.read("clients.json").unwrap().is_none());
    }

    #[test]
    fn test_delete_by_id() {
        let dir = tempdir().unwrap();
        let store = local_store(dir.path());
        store.add(&client("1", "Dupont"));
        store.add(&client("2", "Martin"));

        assert!(store.delete_by_id("1"));
        assert!(!store.delete_by_id("1"));
        let remaining: Vec<_> = store.load_all().iter().map(|c| c.id().to_string()).collect();
        assert_eq!(remaining, vec!["2"]);
    }

    #[test]
    fn test_clear_is_idempotent() {
        let dir = tempdir().unwrap();
        let store = local_store(dir.path());
        store.add(&client("1", "Dupont"));
        assert!(store.clear());
        assert!(store.clear());
        assert!(!store.exists());
    }

    #[test]
    fn test_corrupt_file_loads_empty_and_is_not_overwritten() {
        let backend = Arc::new(MemoryDir::new());
        backend.insert("clients.json", "{ not json");
        let store: Store<ClientSchema> = Store::new(backend.clone());

        assert!(store.load_all().is_empty());
        assert!(!store.add(&client("1", "Dupont")));
        assert_eq!(
            backend.read("clients.json").unwrap().as_deref(),
            Some("{ not json")
        );
    }

    #[test]
    fn test_null_document_is_empty() {
        let backend = Arc::new(MemoryDir::new());
        backend.insert("clients.json", "null");
        let store: Store<ClientSchema> = Store::new(backend);
        assert!(store.load_all().is_empty());
        assert!(store.add(&client("1", "Dupont")));
        assert_eq!(store.count(), 1);
    }

    #[test]
    fn test_write_failure_returns_false() {
        let store: Store<ClientSchema> = Store::new(Arc::new(MemoryDir::read_only()));
        assert!(!store.save_all(&[client("1", "Dupont")]));
        assert!(!store.add(&client("1", "Dupont")));
        assert!(!store.clear());
        assert_eq!(store.count(), 0);
    }

    #[test]
    fn test_next_id_is_sequential() {
        let dir = tempdir().unwrap();
        let store = local_store(dir.path());
        assert_eq!(store.next_id(), "1");
        store.add(&client("4", "Dupont"));
        store.add(&client("API-12", "Externe"));
        assert_eq!(store.next_id(), "5");
    }

    #[test]
    fn test_next_id_after_largest_possible_id() {
        let store: Store<ClientSchema> = Store::new(Arc::new(MemoryDir::new()));
        store.add(&client(&u64::MAX.to_string(), "Dupont"));
        assert_eq!(store.next_id(), "1");
        store.add(&client("1", "Martin"));
        store.add(&client("3", "Durand"));
        assert_eq!(store.next_id(), "2");
    }

    #[test]
    fn test_replace_where_counts_changes() {
        let dir = tempdir().unwrap();
        let store = local_store(dir.path());
        store.save_all(&[client("1", "a"), client("2", "b"), client("3", "a")]);

        let replaced = store.replace_where(|c| {
            (c.nom() == "a").then(|| c.to_builder().nom("A").build().unwrap())
        });
        assert_eq!(replaced, 2);
        assert_eq!(store.replace_where(|_| None), 0);
        assert_eq!(
            store.load_all().iter().filter(|c| c.nom() == "A").count(),
            2
        );
    }

    #[test]
    fn test_concurrent_adds_are_not_lost() {
        let dir = tempdir().unwrap();
        let root = dir.path().to_path_buf();

        std::thread::scope(|scope| {
            for t in 0..4 {
                let root = root.clone();
                scope.spawn(move || {
                    // Separate backends and stores, same file
                    let store = local_store(&root);
                    for i in 0..10 {
                        assert!(store.add(&client(&format!("{}", t * 100 + i), "Dupont")));
                    }
                });
            }
        });

        let store = local_store(&root);
        let ids: HashSet<String> = store
            .load_all()
            .iter()
            .map(|c| c.id().to_string())
            .collect();
        assert_eq!(ids.len(), 40);
    }

    #[test]
    fn test_order_and_product_files_are_separate() {
        let backend: Arc<dyn Backend> = Arc::new(MemoryDir::new());
        let produits: Store<ProduitSchema> = Store::new(backend.clone());
        let commandes: Store<CommandeSchema> = Store::new(backend.clone());

        let produit = Produit::builder()
            .id("P1")
            .libelle("Stylo")
            .prix_unitaire(1.0)
            .build()
            .unwrap();
        let commande = Commande::builder()
            .id("1")
            .client(client("1", "Dupont"))
            .add_ligne(
                LigneCommande::builder()
                    .produit(produit.clone())
                    .quantite(3)
                    .build()
                    .unwrap(),
            )
            .utilisateur("userTest")
            .build()
            .unwrap();

        assert!(produits.add(&produit));
        assert!(commandes.add(&commande));
        assert_eq!(produits.count(), 1);
        assert_eq!(commandes.count(), 1);
        assert!(backend.size("produits.json").is_some());
        assert!(backend.size("commandes.json").is_some());
        assert!((commandes.load_all()[0].montant_total() - 3.0).abs() < 1e-9);
    }
}
