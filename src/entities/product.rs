//! Product entity type

use crate::core::entity::Entity;
use crate::core::validation::{require_text, BuildResult, ValidationError};

/// VAT rate applied when none is given
pub const DEFAULT_TAUX_TVA: f64 = 20.0;

/// A catalogue product
///
/// Two products are the same product when their ids match, whatever their
/// other fields say.
#[derive(Debug, Clone)]
pub struct Produit {
    id: String,
    libelle: String,
    description: String,
    prix_unitaire: f64,
    taux_tva: f64,
}

impl PartialEq for Produit {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Produit {}

impl Produit {
    pub fn builder() -> ProduitBuilder {
        ProduitBuilder::default()
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn libelle(&self) -> &str {
        &self.libelle
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Unit price excluding VAT
    pub fn prix_unitaire(&self) -> f64 {
        self.prix_unitaire
    }

    /// VAT rate in percent
    pub fn taux_tva(&self) -> f64 {
        self.taux_tva
    }

    /// Unit price including VAT
    pub fn prix_ttc(&self) -> f64 {
        self.prix_unitaire * (1.0 + self.taux_tva / 100.0)
    }

    pub fn to_builder(&self) -> ProduitBuilder {
        ProduitBuilder {
            id: Some(self.id.clone()),
            libelle: Some(self.libelle.clone()),
            description: Some(self.description.clone()),
            prix_unitaire: Some(self.prix_unitaire),
            taux_tva: Some(self.taux_tva),
        }
    }
}

impl Entity for Produit {
    const KIND: &'static str = "produit";

    fn id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> String {
        self.libelle.clone()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProduitBuilder {
    id: Option<String>,
    libelle: Option<String>,
    description: Option<String>,
    prix_unitaire: Option<f64>,
    taux_tva: Option<f64>,
}

impl ProduitBuilder {
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn libelle(mut self, libelle: impl Into<String>) -> Self {
        self.libelle = Some(libelle.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn prix_unitaire(mut self, prix_unitaire: f64) -> Self {
        self.prix_unitaire = Some(prix_unitaire);
        self
    }

    pub fn taux_tva(mut self, taux_tva: f64) -> Self {
        self.taux_tva = Some(taux_tva);
        self
    }

    /// Checks, in order: id, libelle, prixUnitaire, tauxTva
    pub fn build(self) -> BuildResult<Produit> {
        const E: &str = Produit::KIND;

        let id = require_text(E, "id", self.id.as_ref())?;
        let libelle = require_text(E, "libelle", self.libelle.as_ref())?;
        let prix_unitaire = match self.prix_unitaire {
            Some(p) if p.is_finite() && p >= 0.0 => p,
            Some(_) => return Err(ValidationError::new(E, "prixUnitaire", "must be >= 0")),
            None => return Err(ValidationError::new(E, "prixUnitaire", "is required")),
        };
        let taux_tva = match self.taux_tva {
            None => DEFAULT_TAUX_TVA,
            Some(t) if t.is_finite() && t >= 0.0 => t,
            Some(_) => return Err(ValidationError::new(E, "tauxTva", "must be >= 0")),
        };

        Ok(Produit {
            id,
            libelle,
            description: self.description.unwrap_or_default(),
            prix_unitaire,
            taux_tva,
        })
    }
}
