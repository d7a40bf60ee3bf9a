//! dolisales: offline field-sales companion for Dolibarr
//!
//! Sales representatives capture clients, products and orders into plain
//! JSON files on their machine, and pull reference data from a Dolibarr
//! ERP when a connection is available.

pub mod cli;
pub mod codec;
pub mod core;
pub mod dolibarr;
pub mod entities;
pub mod filter;
pub mod store;
