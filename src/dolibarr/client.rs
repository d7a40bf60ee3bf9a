//! Dolibarr REST client
//!
//! Every call receives the session explicitly; nothing is read from
//! ambient state.

use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, info};

use crate::core::session::{api_root, Session};
use crate::dolibarr::api::{ApiProduct, LoginResponse, ThirdParty};
use crate::dolibarr::error::ErpError;
use crate::dolibarr::transport::{HttpResponse, Transport};
use crate::entities::{Client, Produit};

const API_KEY_HEADER: &str = "DOLAPIKEY";

/// Page size requested from list endpoints
pub const LIST_LIMIT: usize = 500;

/// Authenticate against `base_url`, returning the API token
pub fn login<T: Transport>(
    transport: &T,
    base_url: &str,
    login: &str,
    password: &str,
) -> Result<Session, ErpError> {
    let url = format!("{}/login", api_root(base_url));
    let body = json!({ "login": login, "password": password });

    let response = transport.post(&url, &[], &body)?;
    if !response.is_success() {
        return Err(ErpError::from_status(response.status));
    }
    let parsed: LoginResponse = parse(&response)?;
    info!(user = login, "logged in");
    Ok(Session::new(base_url, parsed.success.token, login))
}

/// Authenticated Dolibarr client
pub struct DolibarrClient<T: Transport> {
    session: Session,
    transport: T,
}

impl<T: Transport> DolibarrClient<T> {
    pub fn new(session: Session, transport: T) -> Self {
        Self { session, transport }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Customers (third parties of client type)
    pub fn fetch_clients(&self) -> Result<Vec<Client>, ErpError> {
        let url = format!(
            "{}/thirdparties?mode=1&sortfield=t.rowid&sortorder=ASC&limit={}",
            self.session.api_root(),
            LIST_LIMIT
        );
        let records: Vec<ThirdParty> = self.list(&url)?;
        Ok(records.into_iter().map(ThirdParty::into_client).collect())
    }

    /// Products on sale
    pub fn fetch_products(&self) -> Result<Vec<Produit>, ErpError> {
        let url = format!(
            "{}/products?sortfield=t.ref&sortorder=ASC&limit={}",
            self.session.api_root(),
            LIST_LIMIT
        );
        let records: Vec<ApiProduct> = self.list(&url)?;
        Ok(records
            .into_iter()
            .filter_map(ApiProduct::into_produit)
            .collect())
    }

    /// GET a list endpoint; Dolibarr answers 404 when the list is empty
    fn list<R: DeserializeOwned>(&self, url: &str) -> Result<Vec<R>, ErpError> {
        let response = self
            .transport
            .get(url, &[(API_KEY_HEADER, self.session.api_key.as_str())])?;

        match response.status {
            404 => {
                debug!(%url, "empty list");
                Ok(Vec::new())
            }
            _ if response.is_success() => parse(&response),
            status => Err(ErpError::from_status(status)),
        }
    }
}

fn parse<R: DeserializeOwned>(response: &HttpResponse) -> Result<R, ErpError> {
    serde_json::from_str(&response.body).map_err(|e| ErpError::Decode(e.to_string()))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::Value;
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// Transport answering from canned responses keyed by URL path
    #[derive(Default)]
    pub struct CannedTransport {
        responses: HashMap<String, HttpResponse>,
        pub requests: RefCell<Vec<(String, Vec<(String, String)>)>>,
    }

    impl CannedTransport {
        pub fn with(mut self, path: &str, status: u16, body: Value) -> Self {
            self.responses.insert(
                path.to_string(),
                HttpResponse {
                    status,
                    body: body.to_string(),
                },
            );
            self
        }

        fn answer(&self, url: &str, headers: &[(&str, &str)]) -> Result<HttpResponse, ErpError> {
            self.requests.borrow_mut().push((
                url.to_string(),
                headers
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            ));
            let path = url
                .split("/api/index.php")
                .nth(1)
                .and_then(|rest| rest.split('?').next())
                .unwrap_or_default();
            self.responses
                .get(path)
                .cloned()
                .ok_or_else(|| ErpError::Network(format!("no route for {}", path)))
        }
    }

    impl Transport for CannedTransport {
        fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<HttpResponse, ErpError> {
            self.answer(url, headers)
        }

        fn post(
            &self,
            url: &str,
            headers: &[(&str, &str)],
            _body: &Value,
        ) -> Result<HttpResponse, ErpError> {
            self.answer(url, headers)
        }
    }

    pub fn session() -> Session {
        Session::new("https://erp.example.com", "TOKEN", "vendeur1")
    }

    #[test]
    fn test_login_returns_session() {
        let transport = CannedTransport::default().with(
            "/login",
            200,
            json!({ "success": { "code": 200, "token": "abc123" } }),
        );
        let session = login(&transport, "https://erp.example.com/", "vendeur1", "pw").unwrap();
        assert_eq!(session.api_key, "abc123");
        assert_eq!(session.base_url, "https://erp.example.com");
        assert_eq!(session.username, "vendeur1");
    }

    #[test]
    fn test_login_rejected() {
        let transport =
            CannedTransport::default().with("/login", 403, json!({ "error": "denied" }));
        let err = login(&transport, "https://erp.example.com", "x", "y").unwrap_err();
        assert!(matches!(err, ErpError::Http { status: 403, .. }));
    }

    #[test]
    fn test_fetch_clients_sends_api_key() {
        let transport = CannedTransport::default().with(
            "/thirdparties",
            200,
            json!([{ "id": "1", "name": "Martin", "zip": "69001" }]),
        );
        let client = DolibarrClient::new(session(), transport);
        let clients = client.fetch_clients().unwrap();
        assert_eq!(clients.len(), 1);
        assert_eq!(clients[0].nom(), "Martin");

        let requests = client.transport.requests.borrow();
        assert!(requests[0].0.contains("mode=1"));
        assert_eq!(
            requests[0].1,
            vec![("DOLAPIKEY".to_string(), "TOKEN".to_string())]
        );
    }

    #[test]
    fn test_not_found_is_empty_list() {
        let transport = CannedTransport::default().with(
            "/products",
            404,
            json!({ "error": { "code": 404, "message": "No product found" } }),
        );
        let client = DolibarrClient::new(session(), transport);
        assert!(client.fetch_products().unwrap().is_empty());
    }

    #[test]
    fn test_server_error_maps_status() {
        let transport = CannedTransport::default().with("/thirdparties", 500, json!({}));
        let client = DolibarrClient::new(session(), transport);
        let err = client.fetch_clients().unwrap_err();
        assert_eq!(err.to_string(), "Erreur interne du serveur (HTTP 500)");
    }

    #[test]
    fn test_malformed_body_is_decode_error() {
        let transport = CannedTransport::default().with("/products", 200, json!({ "not": "a list" }));
        let client = DolibarrClient::new(session(), transport);
        assert!(matches!(
            client.fetch_products().unwrap_err(),
            ErpError::Decode(_)
        ));
    }
}
