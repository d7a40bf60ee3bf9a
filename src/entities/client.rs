//! Client entity type

use chrono::{DateTime, Utc};

use crate::core::entity::Entity;
use crate::core::validation::{
    is_email, is_phone, is_postal_code, is_present, require_format, require_text, BuildResult,
    ValidationError, EMAIL_RULE, PHONE_RULE, POSTAL_CODE_RULE,
};

/// Placeholder values substituted by [`ClientBuilder::build_from_api`]
pub mod placeholder {
    pub const ID: &str = "0";
    pub const NOM: &str = "Client inconnu";
    pub const ADRESSE: &str = "Adresse non renseignée";
    pub const CODE_POSTAL: &str = "00000";
    pub const VILLE: &str = "Ville non renseignée";
    pub const ADRESSE_MAIL: &str = "noemail@inconnu.com";
    pub const TELEPHONE: &str = "0000000000";
    pub const UTILISATEUR: &str = "API_DOLIBARR";
}

/// A customer of the sales representative
///
/// Only obtainable through [`ClientBuilder`], so every value is valid.
#[derive(Debug, Clone, PartialEq)]
pub struct Client {
    id: String,
    nom: String,
    adresse: String,
    code_postal: String,
    ville: String,
    adresse_mail: String,
    telephone: String,
    utilisateur: String,
    date_saisie: DateTime<Utc>,
    from_api: bool,
}

impl Client {
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn nom(&self) -> &str {
        &self.nom
    }

    pub fn adresse(&self) -> &str {
        &self.adresse
    }

    pub fn code_postal(&self) -> &str {
        &self.code_postal
    }

    pub fn ville(&self) -> &str {
        &self.ville
    }

    pub fn adresse_mail(&self) -> &str {
        &self.adresse_mail
    }

    pub fn telephone(&self) -> &str {
        &self.telephone
    }

    pub fn utilisateur(&self) -> &str {
        &self.utilisateur
    }

    pub fn date_saisie(&self) -> DateTime<Utc> {
        self.date_saisie
    }

    /// True when the record came from the ERP and may hold placeholders
    pub fn from_api(&self) -> bool {
        self.from_api
    }

    /// Start a replacement record pre-filled with this client's values
    pub fn to_builder(&self) -> ClientBuilder {
        ClientBuilder {
            id: Some(self.id.clone()),
            nom: Some(self.nom.clone()),
            adresse: Some(self.adresse.clone()),
            code_postal: Some(self.code_postal.clone()),
            ville: Some(self.ville.clone()),
            adresse_mail: Some(self.adresse_mail.clone()),
            telephone: Some(self.telephone.clone()),
            utilisateur: Some(self.utilisateur.clone()),
            date_saisie: Some(self.date_saisie),
        }
    }
}

impl Entity for Client {
    const KIND: &'static str = "client";

    fn id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> String {
        self.nom.clone()
    }
}

/// Mutable intermediate for [`Client`]
#[derive(Debug, Clone, Default)]
pub struct ClientBuilder {
    id: Option<String>,
    nom: Option<String>,
    adresse: Option<String>,
    code_postal: Option<String>,
    ville: Option<String>,
    adresse_mail: Option<String>,
    telephone: Option<String>,
    utilisateur: Option<String>,
    date_saisie: Option<DateTime<Utc>>,
}

impl ClientBuilder {
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn nom(mut self, nom: impl Into<String>) -> Self {
        self.nom = Some(nom.into());
        self
    }

    pub fn adresse(mut self, adresse: impl Into<String>) -> Self {
        self.adresse = Some(adresse.into());
        self
    }

    pub fn code_postal(mut self, code_postal: impl Into<String>) -> Self {
        self.code_postal = Some(code_postal.into());
        self
    }

    pub fn ville(mut self, ville: impl Into<String>) -> Self {
        self.ville = Some(ville.into());
        self
    }

    pub fn adresse_mail(mut self, adresse_mail: impl Into<String>) -> Self {
        self.adresse_mail = Some(adresse_mail.into());
        self
    }

    pub fn telephone(mut self, telephone: impl Into<String>) -> Self {
        self.telephone = Some(telephone.into());
        self
    }

    pub fn utilisateur(mut self, utilisateur: impl Into<String>) -> Self {
        self.utilisateur = Some(utilisateur.into());
        self
    }

    pub fn date_saisie(mut self, date_saisie: DateTime<Utc>) -> Self {
        self.date_saisie = Some(date_saisie);
        self
    }

    /// Build a locally authored client
    ///
    /// Checks, in order: id, nom, adresse, codePostal, ville, adresseMail,
    /// telephone, utilisateur, dateSaisie. The result has `from_api == false`.
    pub fn build(self) -> BuildResult<Client> {
        const E: &str = Client::KIND;

        let id = require_text(E, "id", self.id.as_ref())?;
        let nom = require_text(E, "nom", self.nom.as_ref())?;
        let adresse = require_text(E, "adresse", self.adresse.as_ref())?;
        let code_postal = require_format(
            E,
            "codePostal",
            self.code_postal.as_ref(),
            is_postal_code,
            POSTAL_CODE_RULE,
        )?;
        let ville = require_text(E, "ville", self.ville.as_ref())?;
        let adresse_mail = require_format(
            E,
            "adresseMail",
            self.adresse_mail.as_ref(),
            is_email,
            EMAIL_RULE,
        )?;
        let telephone = require_format(
            E,
            "telephone",
            self.telephone.as_ref(),
            is_phone,
            PHONE_RULE,
        )?;
        let utilisateur = require_text(E, "utilisateur", self.utilisateur.as_ref())?;
        let date_saisie = self
            .date_saisie
            .ok_or_else(|| ValidationError::new(E, "dateSaisie", "is required"))?;

        Ok(Client {
            id,
            nom,
            adresse,
            code_postal,
            ville,
            adresse_mail,
            telephone,
            utilisateur,
            date_saisie,
            from_api: false,
        })
    }

    /// Build a client from ERP data, never failing
    ///
    /// Every missing or malformed field is replaced by its [`placeholder`]
    /// value, a missing date by now, and the result is tagged `from_api`.
    pub fn build_from_api(self) -> Client {
        fn text_or(value: Option<String>, fallback: &str) -> String {
            match value {
                Some(v) if is_present(Some(&v)) => v,
                _ => fallback.to_string(),
            }
        }

        fn format_or(value: Option<String>, check: fn(&str) -> bool, fallback: &str) -> String {
            match value {
                Some(v) if check(&v) => v,
                _ => fallback.to_string(),
            }
        }

        Client {
            id: text_or(self.id, placeholder::ID),
            nom: text_or(self.nom, placeholder::NOM),
            adresse: text_or(self.adresse, placeholder::ADRESSE),
            code_postal: format_or(self.code_postal, is_postal_code, placeholder::CODE_POSTAL),
            ville: text_or(self.ville, placeholder::VILLE),
            adresse_mail: format_or(self.adresse_mail, is_email, placeholder::ADRESSE_MAIL),
            telephone: format_or(self.telephone, is_phone, placeholder::TELEPHONE),
            utilisateur: text_or(self.utilisateur, placeholder::UTILISATEUR),
            date_saisie: self.date_saisie.unwrap_or_else(Utc::now),
            from_api: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn dupont() -> ClientBuilder {
        Client::builder()
            .id("123")
            .nom("Dupont")
            .adresse("10 rue de la Paix")
            .code_postal("75002")
            .ville("Paris")
            .adresse_mail("dupont@example.com")
            .telephone("0123456789")
            .utilisateur("userTest")
            .date_saisie(Utc.timestamp_millis_opt(1_000_000_000_000).unwrap())
    }

    #[test]
    fn test_build_valid_client() {
        let client = dupont().build().unwrap();
        assert_eq!(client.id(), "123");
        assert_eq!(client.nom(), "Dupont");
        assert_eq!(client.date_saisie().timestamp_millis(), 1_000_000_000_000);
        assert!(!client.from_api());
    }

    #[test]
    fn test_missing_postal_code_strict_vs_lenient() {
        let builder = Client::builder()
            .id("9")
            .nom("Martin")
            .adresse("1 place du Marché")
            .ville("Lyon")
            .adresse_mail("martin@example.com")
            .telephone("0611223344")
            .utilisateur("userTest")
            .date_saisie(Utc::now());

        let err = builder.clone().build().unwrap_err();
        assert_eq!(err.field, "codePostal");

        let client = builder.build_from_api();
        assert_eq!(client.code_postal(), "00000");
        assert!(client.from_api());
        assert_eq!(client.nom(), "Martin");
    }

    #[test]
    fn test_strict_check_order_reports_first_failure() {
        let err = Client::builder().id("1").build().unwrap_err();
        assert_eq!(err.field, "nom");

        let err = dupont().telephone("12").adresse_mail("nope").build().unwrap_err();
        assert_eq!(err.field, "adresseMail");
    }

    #[test]
    fn test_blank_name_is_rejected() {
        let err = dupont().nom("  ").build().unwrap_err();
        assert_eq!(err.field, "nom");
    }

    #[test]
    fn test_missing_date_is_rejected_in_strict_mode() {
        let builder = ClientBuilder {
            date_saisie: None,
            ..dupont()
        };
        let err = builder.build().unwrap_err();
        assert_eq!(err.field, "dateSaisie");
    }

    #[test]
    fn test_build_from_api_substitutes_every_placeholder() {
        let before = Utc::now();
        let client = Client::builder()
            .telephone("+33 1 23")
            .adresse_mail("broken")
            .build_from_api();

        assert_eq!(client.id(), placeholder::ID);
        assert_eq!(client.nom(), placeholder::NOM);
        assert_eq!(client.adresse(), placeholder::ADRESSE);
        assert_eq!(client.code_postal(), placeholder::CODE_POSTAL);
        assert_eq!(client.ville(), placeholder::VILLE);
        assert_eq!(client.adresse_mail(), placeholder::ADRESSE_MAIL);
        assert_eq!(client.telephone(), placeholder::TELEPHONE);
        assert_eq!(client.utilisateur(), placeholder::UTILISATEUR);
        assert!(client.date_saisie() >= before);
        assert!(client.from_api());
    }

    #[test]
    fn test_build_from_api_keeps_valid_values() {
        let client = dupont().build_from_api();
        assert_eq!(client.telephone(), "0123456789");
        assert_eq!(client.utilisateur(), "userTest");
        assert!(client.from_api());
    }

    #[test]
    fn test_to_builder_replacement_keeps_identity() {
        let client = dupont().build().unwrap();
        let renamed = client.to_builder().nom("Dupont SARL").build().unwrap();
        assert_eq!(renamed.id(), client.id());
        assert_eq!(renamed.nom(), "Dupont SARL");
        assert_eq!(renamed.date_saisie(), client.date_saisie());
    }
}
