//! Order entity types: `Commande` and its `LigneCommande` lines
//!
//! An order embeds by-value snapshots of its client and of each product at
//! the time it was taken. Amounts are always derived from the lines and are
//! never read back from storage.

use chrono::{DateTime, Utc};

use crate::core::entity::Entity;
use crate::core::validation::{require_text, BuildResult, ValidationError};
use crate::entities::client::Client;
use crate::entities::product::Produit;

/// One product line of an order
#[derive(Debug, Clone, PartialEq)]
pub struct LigneCommande {
    produit: Produit,
    quantite: u32,
    remise: f64,
    validee: bool,
}

impl LigneCommande {
    pub fn builder() -> LigneCommandeBuilder {
        LigneCommandeBuilder::default()
    }

    pub fn produit(&self) -> &Produit {
        &self.produit
    }

    pub fn quantite(&self) -> u32 {
        self.quantite
    }

    /// Discount in percent, within [0, 100]
    pub fn remise(&self) -> f64 {
        self.remise
    }

    /// Locked lines can no longer be revised
    pub fn validee(&self) -> bool {
        self.validee
    }

    /// `prixUnitaire * quantite * (1 - remise / 100)`
    pub fn montant_ligne(&self) -> f64 {
        self.produit.prix_unitaire() * f64::from(self.quantite) * (1.0 - self.remise / 100.0)
    }

    /// Change quantity and discount of an unlocked line
    pub fn revise(&self, quantite: i64, remise: f64) -> BuildResult<LigneCommande> {
        if self.validee {
            return Err(ValidationError::new(
                "ligneCommande",
                "validee",
                "line is locked and cannot be revised",
            ));
        }
        self.to_builder().quantite(quantite).remise(remise).build()
    }

    /// Copy of this line with the lock set
    pub fn locked(&self) -> LigneCommande {
        LigneCommande {
            validee: true,
            ..self.clone()
        }
    }

    pub fn to_builder(&self) -> LigneCommandeBuilder {
        LigneCommandeBuilder {
            produit: Some(self.produit.clone()),
            quantite: Some(i64::from(self.quantite)),
            remise: Some(self.remise),
            validee: self.validee,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LigneCommandeBuilder {
    produit: Option<Produit>,
    quantite: Option<i64>,
    remise: Option<f64>,
    validee: bool,
}

impl LigneCommandeBuilder {
    pub fn produit(mut self, produit: Produit) -> Self {
        self.produit = Some(produit);
        self
    }

    pub fn quantite(mut self, quantite: i64) -> Self {
        self.quantite = Some(quantite);
        self
    }

    pub fn remise(mut self, remise: f64) -> Self {
        self.remise = Some(remise);
        self
    }

    pub fn validee(mut self, validee: bool) -> Self {
        self.validee = validee;
        self
    }

    /// Checks, in order: produit, quantite, remise. A missing discount is 0.
    pub fn build(self) -> BuildResult<LigneCommande> {
        const E: &str = "ligneCommande";

        let produit = self
            .produit
            .ok_or_else(|| ValidationError::new(E, "produit", "is required"))?;
        let quantite = match self.quantite {
            Some(q) if q > 0 => u32::try_from(q)
                .map_err(|_| ValidationError::new(E, "quantite", "is too large"))?,
            Some(_) => return Err(ValidationError::new(E, "quantite", "must be > 0")),
            None => return Err(ValidationError::new(E, "quantite", "is required")),
        };
        let remise = match self.remise {
            None => 0.0,
            Some(r) if (0.0..=100.0).contains(&r) => r,
            Some(_) => return Err(ValidationError::new(E, "remise", "must be within [0, 100]")),
        };

        Ok(LigneCommande {
            produit,
            quantite,
            remise,
            validee: self.validee,
        })
    }
}

/// A customer order
#[derive(Debug, Clone, PartialEq)]
pub struct Commande {
    id: String,
    client: Client,
    date_commande: DateTime<Utc>,
    lignes_commande: Vec<LigneCommande>,
    utilisateur: String,
    montant_total: f64,
}

impl Commande {
    pub fn builder() -> CommandeBuilder {
        CommandeBuilder::default()
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Client snapshot taken when the order was recorded
    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn date_commande(&self) -> DateTime<Utc> {
        self.date_commande
    }

    pub fn lignes_commande(&self) -> &[LigneCommande] {
        &self.lignes_commande
    }

    pub fn utilisateur(&self) -> &str {
        &self.utilisateur
    }

    /// Sum of the line amounts, computed at construction
    pub fn montant_total(&self) -> f64 {
        self.montant_total
    }

    /// True when every line is locked
    pub fn is_validated(&self) -> bool {
        self.lignes_commande.iter().all(LigneCommande::validee)
    }

    /// Same order with the client snapshot replaced
    pub fn with_client(&self, client: Client) -> Commande {
        Commande {
            client,
            ..self.clone()
        }
    }

    /// Same order with every line locked
    pub fn validate_lines(&self) -> Commande {
        Commande {
            lignes_commande: self.lignes_commande.iter().map(LigneCommande::locked).collect(),
            ..self.clone()
        }
    }

    pub fn to_builder(&self) -> CommandeBuilder {
        CommandeBuilder {
            id: Some(self.id.clone()),
            client: Some(self.client.clone()),
            date_commande: Some(self.date_commande),
            lignes_commande: self.lignes_commande.clone(),
            utilisateur: Some(self.utilisateur.clone()),
            locked_duplicate: None,
        }
    }
}

impl Entity for Commande {
    const KIND: &'static str = "commande";

    fn id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> String {
        format!("Commande {} - {}", self.id, self.client.nom())
    }
}

#[derive(Debug, Clone, Default)]
pub struct CommandeBuilder {
    id: Option<String>,
    client: Option<Client>,
    date_commande: Option<DateTime<Utc>>,
    lignes_commande: Vec<LigneCommande>,
    utilisateur: Option<String>,
    locked_duplicate: Option<String>,
}

impl CommandeBuilder {
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    pub fn date_commande(mut self, date_commande: DateTime<Utc>) -> Self {
        self.date_commande = Some(date_commande);
        self
    }

    /// Replace all lines as given, without merging
    pub fn lignes_commande(mut self, lignes: Vec<LigneCommande>) -> Self {
        self.lignes_commande = lignes;
        self.locked_duplicate = None;
        self
    }

    /// Add a line, merging it into an existing line for the same product
    ///
    /// Quantities are summed and the new discount wins. A locked line for
    /// the same product makes [`CommandeBuilder::build`] fail.
    pub fn add_ligne(mut self, ligne: LigneCommande) -> Self {
        let existing = self
            .lignes_commande
            .iter_mut()
            .find(|l| l.produit == ligne.produit);

        match existing {
            Some(current) if current.validee => {
                self.locked_duplicate = Some(ligne.produit.id().to_string());
            }
            Some(current) => {
                current.quantite = current.quantite.saturating_add(ligne.quantite);
                current.remise = ligne.remise;
                current.produit = ligne.produit;
            }
            None => self.lignes_commande.push(ligne),
        }
        self
    }

    pub fn utilisateur(mut self, utilisateur: impl Into<String>) -> Self {
        self.utilisateur = Some(utilisateur.into());
        self
    }

    /// Checks, in order: id, client, lignesCommande, utilisateur
    ///
    /// A missing date becomes now.
    pub fn build(self) -> BuildResult<Commande> {
        const E: &str = Commande::KIND;

        let id = require_text(E, "id", self.id.as_ref())?;
        let client = self
            .client
            .ok_or_else(|| ValidationError::new(E, "client", "is required"))?;
        if self.lignes_commande.is_empty() {
            return Err(ValidationError::new(
                E,
                "lignesCommande",
                "must contain at least one line",
            ));
        }
        if let Some(product_id) = self.locked_duplicate {
            return Err(ValidationError::new(
                E,
                "lignesCommande",
                format!("already holds a locked line for product {}", product_id),
            ));
        }
        let utilisateur = require_text(E, "utilisateur", self.utilisateur.as_ref())?;

        let montant_total = self
            .lignes_commande
            .iter()
            .map(LigneCommande::montant_ligne)
            .sum();

        Ok(Commande {
            id,
            client,
            date_commande: self.date_commande.unwrap_or_else(Utc::now),
            lignes_commande: self.lignes_commande,
            utilisateur,
            montant_total,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn produit(id: &str, prix: f64) -> Produit {
        Produit::builder()
            .id(id)
            .libelle(format!("Produit {}", id))
            .prix_unitaire(prix)
            .build()
            .unwrap()
    }

    fn ligne(p: Produit, quantite: i64, remise: f64) -> LigneCommande {
        LigneCommande::builder()
            .produit(p)
            .quantite(quantite)
            .remise(remise)
            .build()
            .unwrap()
    }

    fn client() -> Client {
        Client::builder()
            .id("1")
            .nom("Dupont")
            .adresse("10 rue de la Paix")
            .code_postal("75002")
            .ville("Paris")
            .adresse_mail("dupont@example.com")
            .telephone("0123456789")
            .utilisateur("userTest")
            .date_saisie(Utc::now())
            .build()
            .unwrap()
    }

    #[test]
    fn test_total_is_sum_of_lines() {
        let commande = Commande::builder()
            .id("1")
            .client(client())
            .add_ligne(ligne(produit("A", 10.0), 2, 0.0))
            .add_ligne(ligne(produit("B", 5.0), 1, 0.0))
            .utilisateur("userTest")
            .build()
            .unwrap();
        assert!((commande.montant_total() - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_discounted_line_amount() {
        let l = ligne(produit("A", 100.0), 1, 50.0);
        assert!((l.montant_ligne() - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_line_validation() {
        let err = LigneCommande::builder().quantite(1).build().unwrap_err();
        assert_eq!(err.field, "produit");

        let err = LigneCommande::builder()
            .produit(produit("A", 1.0))
            .quantite(0)
            .build()
            .unwrap_err();
        assert_eq!(err.field, "quantite");

        let err = LigneCommande::builder()
            .produit(produit("A", 1.0))
            .quantite(1)
            .remise(100.5)
            .build()
            .unwrap_err();
        assert_eq!(err.field, "remise");
    }

    #[test]
    fn test_order_without_lines_fails() {
        let err = Commande::builder()
            .id("1")
            .client(client())
            .utilisateur("userTest")
            .build()
            .unwrap_err();
        assert_eq!(err.field, "lignesCommande");
    }

    #[test]
    fn test_order_without_client_fails() {
        let err = Commande::builder()
            .id("1")
            .add_ligne(ligne(produit("A", 1.0), 1, 0.0))
            .utilisateur("userTest")
            .build()
            .unwrap_err();
        assert_eq!(err.field, "client");
    }

    #[test]
    fn test_missing_date_defaults_to_now() {
        let before = Utc::now();
        let commande = Commande::builder()
            .id("1")
            .client(client())
            .add_ligne(ligne(produit("A", 1.0), 1, 0.0))
            .utilisateur("userTest")
            .build()
            .unwrap();
        assert!(commande.date_commande() >= before);
    }

    #[test]
    fn test_same_product_lines_are_merged() {
        let commande = Commande::builder()
            .id("1")
            .client(client())
            .add_ligne(ligne(produit("A", 10.0), 2, 0.0))
            .add_ligne(ligne(produit("A", 10.0), 3, 10.0))
            .utilisateur("userTest")
            .build()
            .unwrap();
        assert_eq!(commande.lignes_commande().len(), 1);
        assert_eq!(commande.lignes_commande()[0].quantite(), 5);
        assert!((commande.montant_total() - 45.0).abs() < 1e-9);
    }

    #[test]
    fn test_locked_line_blocks_merge() {
        let locked = ligne(produit("A", 10.0), 2, 0.0).locked();
        let err = Commande::builder()
            .id("1")
            .client(client())
            .add_ligne(locked)
            .add_ligne(ligne(produit("A", 10.0), 1, 0.0))
            .utilisateur("userTest")
            .build()
            .unwrap_err();
        assert_eq!(err.field, "lignesCommande");
    }

    #[test]
    fn test_replacing_lines_clears_rejected_duplicate() {
        let locked = ligne(produit("A", 10.0), 2, 0.0).locked();
        let commande = Commande::builder()
            .id("1")
            .client(client())
            .add_ligne(locked)
            .add_ligne(ligne(produit("A", 10.0), 1, 0.0))
            .lignes_commande(vec![ligne(produit("B", 4.0), 1, 0.0)])
            .utilisateur("userTest")
            .build()
            .unwrap();
        assert_eq!(commande.lignes_commande().len(), 1);
        assert_eq!(commande.lignes_commande()[0].produit().id(), "B");
    }

    #[test]
    fn test_locked_line_cannot_be_revised() {
        let l = ligne(produit("A", 10.0), 2, 0.0);
        let revised = l.revise(4, 5.0).unwrap();
        assert_eq!(revised.quantite(), 4);

        let err = l.locked().revise(4, 5.0).unwrap_err();
        assert_eq!(err.field, "validee");
    }

    #[test]
    fn test_validate_lines_and_with_client() {
        let commande = Commande::builder()
            .id("7")
            .client(client())
            .add_ligne(ligne(produit("A", 10.0), 2, 0.0))
            .utilisateur("userTest")
            .build()
            .unwrap();
        assert!(!commande.is_validated());
        assert!(commande.validate_lines().is_validated());

        let renamed = client().to_builder().nom("Dupont SARL").build().unwrap();
        let updated = commande.with_client(renamed);
        assert_eq!(updated.client().nom(), "Dupont SARL");
        assert_eq!(updated.id(), "7");
        assert_eq!(updated.date_commande(), commande.date_commande());
        assert_eq!(updated.montant_total(), commande.montant_total());
    }
}
