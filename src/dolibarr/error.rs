//! Errors surfaced by the Dolibarr collaborator

use miette::Diagnostic;
use thiserror::Error;

/// User-facing message for a non-2xx HTTP status
pub fn status_message(status: u16) -> &'static str {
    match status {
        400 => "Requête invalide",
        401 => "Identifiants incorrects ou session expirée",
        403 => "Accès refusé",
        404 => "Ressource introuvable",
        408 => "Délai d'attente dépassé",
        429 => "Trop de requêtes, réessayez plus tard",
        500 => "Erreur interne du serveur",
        502 | 503 | 504 => "Serveur indisponible",
        _ => "Erreur inattendue du serveur",
    }
}

#[derive(Debug, Error, Diagnostic)]
pub enum ErpError {
    #[error("{message} (HTTP {status})")]
    #[diagnostic(code(dolisales::erp::http))]
    Http { status: u16, message: &'static str },

    #[error("Impossible de joindre le serveur: {0}")]
    #[diagnostic(
        code(dolisales::erp::network),
        help("check the server URL and your network connection")
    )]
    Network(String),

    #[error("Réponse du serveur illisible: {0}")]
    #[diagnostic(code(dolisales::erp::decode))]
    Decode(String),
}

impl ErpError {
    pub fn from_status(status: u16) -> Self {
        ErpError::Http {
            status,
            message: status_message(status),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_table() {
        assert_eq!(status_message(401), "Identifiants incorrects ou session expirée");
        assert_eq!(status_message(503), "Serveur indisponible");
        assert_eq!(status_message(418), "Erreur inattendue du serveur");
    }

    #[test]
    fn test_http_error_display() {
        let err = ErpError::from_status(404);
        assert_eq!(err.to_string(), "Ressource introuvable (HTTP 404)");
    }
}
