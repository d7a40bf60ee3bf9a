//! Dolibarr REST payloads and their mapping onto entities
//!
//! Dolibarr serializes most numbers as strings ("12", "10.00000000") and
//! leaves unset fields null, so every field is optional and scalar-tolerant.
//! Third parties always go through the lenient client builder.
//!
//! Dolibarr rowids are sequential numbers, like local ids, so every mapped
//! record gets [`ERP_ID_PREFIX`] in front of its rowid.

use chrono::{TimeZone, Utc};
use serde::Deserialize;
use tracing::warn;

use crate::entities::{Client, Produit};

/// Prefix marking ids that come from Dolibarr rowids
pub const ERP_ID_PREFIX: &str = "erp-";

/// Local id for a Dolibarr rowid; blank rowids yield `None`
pub fn erp_id(rowid: &Scalar) -> Option<String> {
    let raw = rowid.as_text();
    if raw.is_empty() {
        None
    } else {
        Some(format!("{}{}", ERP_ID_PREFIX, raw))
    }
}

/// A JSON scalar that may arrive as text or as a number
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Int(i64),
    Float(f64),
    Text(String),
}

impl Scalar {
    pub fn as_text(&self) -> String {
        match self {
            Scalar::Int(i) => i.to_string(),
            Scalar::Float(f) => f.to_string(),
            Scalar::Text(s) => s.trim().to_string(),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Int(i) => Some(*i as f64),
            Scalar::Float(f) => Some(*f),
            Scalar::Text(s) => s.trim().parse().ok(),
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Scalar::Int(i) => Some(*i),
            Scalar::Float(f) => Some(*f as i64),
            Scalar::Text(s) => s.trim().parse().ok(),
        }
    }
}

/// Response of `POST /login`
#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub success: LoginSuccess,
}

#[derive(Debug, Deserialize)]
pub struct LoginSuccess {
    pub token: String,
}

/// Element of `GET /thirdparties`
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ThirdParty {
    pub id: Option<Scalar>,
    pub name: Option<String>,
    pub address: Option<String>,
    pub zip: Option<Scalar>,
    pub town: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    /// Unix seconds
    pub date_creation: Option<Scalar>,
}

impl ThirdParty {
    /// Map onto a client, substituting placeholders for anything unusable
    pub fn into_client(self) -> Client {
        let mut builder = Client::builder();
        if let Some(id) = self.id.as_ref().and_then(erp_id) {
            builder = builder.id(id);
        }
        if let Some(name) = self.name {
            builder = builder.nom(name);
        }
        if let Some(address) = self.address {
            builder = builder.adresse(address);
        }
        if let Some(zip) = self.zip {
            builder = builder.code_postal(zip.as_text());
        }
        if let Some(town) = self.town {
            builder = builder.ville(town);
        }
        if let Some(email) = self.email {
            builder = builder.adresse_mail(email.trim());
        }
        if let Some(phone) = self.phone {
            builder = builder.telephone(compact_phone(&phone));
        }
        if let Some(date) = self
            .date_creation
            .and_then(|d| d.as_i64())
            .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
        {
            builder = builder.date_saisie(date);
        }
        builder.build_from_api()
    }
}

/// Element of `GET /products`
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ApiProduct {
    pub id: Option<Scalar>,
    #[serde(rename = "ref")]
    pub reference: Option<String>,
    pub label: Option<String>,
    pub description: Option<String>,
    /// Price excluding VAT
    pub price: Option<Scalar>,
    pub tva_tx: Option<Scalar>,
}

impl ApiProduct {
    /// Map onto a product; products failing validation are skipped
    pub fn into_produit(self) -> Option<Produit> {
        let mut builder = Produit::builder();
        if let Some(id) = self.id.as_ref().and_then(erp_id) {
            builder = builder.id(id);
        }
        let label = self
            .label
            .filter(|l| !l.trim().is_empty())
            .or(self.reference);
        if let Some(label) = label {
            builder = builder.libelle(label);
        }
        if let Some(description) = self.description {
            builder = builder.description(description);
        }
        if let Some(price) = self.price.as_ref().and_then(Scalar::as_f64) {
            builder = builder.prix_unitaire(price);
        }
        if let Some(rate) = self.tva_tx.as_ref().and_then(Scalar::as_f64) {
            builder = builder.taux_tva(rate);
        }

        match builder.build() {
            Ok(produit) => Some(produit),
            Err(e) => {
                warn!(id = ?self.id, error = %e, "skipping product from ERP");
                None
            }
        }
    }
}

/// Drop the separators Dolibarr users type into phone numbers
fn compact_phone(phone: &str) -> String {
    phone
        .chars()
        .filter(|c| !matches!(c, ' ' | '.' | '-'))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_third_party_mapping() {
        let tp: ThirdParty = serde_json::from_value(json!({
            "id": "12",
            "name": "Boulangerie Martin",
            "address": "3 rue du Four",
            "zip": "69001",
            "town": "Lyon",
            "email": "contact@martin.fr",
            "phone": "04.78.00.00.01",
            "date_creation": 1700000000,
            "status": "1"
        }))
        .unwrap();

        let client = tp.into_client();
        assert_eq!(client.id(), "erp-12");
        assert_eq!(client.telephone(), "0478000001");
        assert_eq!(client.code_postal(), "69001");
        assert_eq!(client.utilisateur(), "API_DOLIBARR");
        assert_eq!(client.date_saisie().timestamp(), 1_700_000_000);
        assert!(client.from_api());
    }

    #[test]
    fn test_sparse_third_party_gets_placeholders() {
        let tp: ThirdParty = serde_json::from_value(json!({
            "id": 40, "name": "Sans adresse", "zip": null, "email": ""
        }))
        .unwrap();
        let client = tp.into_client();
        assert_eq!(client.id(), "erp-40");
        assert_eq!(client.adresse(), "Adresse non renseignée");
        assert_eq!(client.code_postal(), "00000");
        assert_eq!(client.adresse_mail(), "noemail@inconnu.com");
    }

    #[test]
    fn test_product_mapping_parses_string_numbers() {
        let product: ApiProduct = serde_json::from_value(json!({
            "id": "3", "ref": "STY-01", "label": "Stylo",
            "price": "1.50000000", "tva_tx": "5.500"
        }))
        .unwrap();
        let produit = product.into_produit().unwrap();
        assert_eq!(produit.id(), "erp-3");
        assert_eq!(produit.prix_unitaire(), 1.5);
        assert_eq!(produit.taux_tva(), 5.5);
    }

    #[test]
    fn test_product_label_falls_back_to_ref() {
        let product: ApiProduct = serde_json::from_value(json!({
            "id": "4", "ref": "GOM-01", "label": "", "price": 0.8
        }))
        .unwrap();
        assert_eq!(product.into_produit().unwrap().libelle(), "GOM-01");
    }

    #[test]
    fn test_erp_ids_never_look_local() {
        assert_eq!(erp_id(&Scalar::Int(7)).as_deref(), Some("erp-7"));
        assert_eq!(erp_id(&Scalar::Text(" 7 ".into())).as_deref(), Some("erp-7"));
        assert_eq!(erp_id(&Scalar::Text("  ".into())), None);
        assert_eq!(crate::core::entity::numeric_id("erp-7"), None);
    }

    #[test]
    fn test_invalid_product_is_skipped() {
        let product: ApiProduct =
            serde_json::from_value(json!({ "id": "5", "label": "Sans prix" })).unwrap();
        assert!(product.into_produit().is_none());
    }
}
