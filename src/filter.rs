//! In-memory query helpers over loaded collections

use chrono::{DateTime, Utc};

use crate::entities::{Client, Commande, Produit};

/// Client search criteria; unset criteria match everything
#[derive(Debug, Clone, Default)]
pub struct ClientFilter {
    /// Case-insensitive substring of name, address, city or phone
    pub text: Option<String>,
    /// Prefix of the postal code
    pub code_postal: Option<String>,
    /// Restrict to ERP-sourced (`Some(true)`) or local (`Some(false)`)
    pub from_api: Option<bool>,
}

impl ClientFilter {
    pub fn matches(&self, client: &Client) -> bool {
        if let Some(text) = &self.text {
            let needle = text.to_lowercase();
            let hit = [
                client.nom(),
                client.adresse(),
                client.ville(),
                client.telephone(),
            ]
            .iter()
            .any(|field| field.to_lowercase().contains(&needle));
            if !hit {
                return false;
            }
        }

        if let Some(prefix) = &self.code_postal {
            if !client.code_postal().starts_with(prefix.as_str()) {
                return false;
            }
        }

        if let Some(from_api) = self.from_api {
            if client.from_api() != from_api {
                return false;
            }
        }

        true
    }

    pub fn apply(&self, clients: Vec<Client>) -> Vec<Client> {
        clients.into_iter().filter(|c| self.matches(c)).collect()
    }
}

/// Case-insensitive substring on label or description
pub fn search_products(produits: Vec<Produit>, text: &str) -> Vec<Produit> {
    let needle = text.to_lowercase();
    produits
        .into_iter()
        .filter(|p| {
            p.libelle().to_lowercase().contains(&needle)
                || p.description().to_lowercase().contains(&needle)
        })
        .collect()
}

/// Order search criteria
#[derive(Debug, Clone, Default)]
pub struct CommandeFilter {
    pub client_id: Option<String>,
    pub utilisateur: Option<String>,
    /// Inclusive lower bound on the order date
    pub since: Option<DateTime<Utc>>,
    /// Inclusive upper bound on the order date
    pub until: Option<DateTime<Utc>>,
    pub min_total: Option<f64>,
}

impl CommandeFilter {
    pub fn matches(&self, commande: &Commande) -> bool {
        self.client_id
            .as_deref()
            .map_or(true, |id| commande.client().id() == id)
            && self
                .utilisateur
                .as_deref()
                .map_or(true, |u| commande.utilisateur().eq_ignore_ascii_case(u))
            && self.since.map_or(true, |d| commande.date_commande() >= d)
            && self.until.map_or(true, |d| commande.date_commande() <= d)
            && self.min_total.map_or(true, |m| commande.montant_total() >= m)
    }

    pub fn apply(&self, commandes: Vec<Commande>) -> Vec<Commande> {
        commandes.into_iter().filter(|c| self.matches(c)).collect()
    }
}
