//! Entity type definitions
//!
//! dolisales keeps three kinds of records:
//!
//! - [`Client`] - customers, created locally or imported from Dolibarr
//! - [`Produit`] - catalogue products
//! - [`Commande`] - orders, embedding a client snapshot and
//!   [`LigneCommande`] lines with product snapshots
//!
//! Each type is built through its builder; `build()` validates, and
//! [`ClientBuilder::build_from_api`] is the lenient path for ERP data.

pub mod client;
pub mod order;
pub mod product;

pub use client::{Client, ClientBuilder};
pub use order::{Commande, CommandeBuilder, LigneCommande, LigneCommandeBuilder};
pub use product::{Produit, ProduitBuilder};
