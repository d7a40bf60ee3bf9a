//! Wire schema for [`Client`]

use serde_json::{Map, Value};

use crate::codec::schema::{millis, read_bool, read_millis, read_string, CodecError, Field, Schema};
use crate::entities::client::{Client, ClientBuilder};

/// Key of the provenance flag selecting strict or lenient decoding
pub const FROM_API_KEY: &str = "fromApi";

pub struct ClientSchema;

static FIELDS: &[Field<Client, ClientBuilder>] = &[
    Field {
        key: "id",
        encode: |c| Value::from(c.id()),
        decode: Some(|b, v| Ok(b.id(read_string("id", v)?))),
    },
    Field {
        key: "nom",
        encode: |c| Value::from(c.nom()),
        decode: Some(|b, v| Ok(b.nom(read_string("nom", v)?))),
    },
    Field {
        key: "adresse",
        encode: |c| Value::from(c.adresse()),
        decode: Some(|b, v| Ok(b.adresse(read_string("adresse", v)?))),
    },
    Field {
        key: "codePostal",
        encode: |c| Value::from(c.code_postal()),
        decode: Some(|b, v| Ok(b.code_postal(read_string("codePostal", v)?))),
    },
    Field {
        key: "ville",
        encode: |c| Value::from(c.ville()),
        decode: Some(|b, v| Ok(b.ville(read_string("ville", v)?))),
    },
    Field {
        key: "adresseMail",
        encode: |c| Value::from(c.adresse_mail()),
        decode: Some(|b, v| Ok(b.adresse_mail(read_string("adresseMail", v)?))),
    },
    Field {
        key: "telephone",
        encode: |c| Value::from(c.telephone()),
        decode: Some(|b, v| Ok(b.telephone(read_string("telephone", v)?))),
    },
    Field {
        key: "utilisateur",
        encode: |c| Value::from(c.utilisateur()),
        decode: Some(|b, v| Ok(b.utilisateur(read_string("utilisateur", v)?))),
    },
    Field {
        key: "dateSaisie",
        encode: |c| millis(Some(c.date_saisie())),
        decode: Some(|b, v| Ok(b.date_saisie(read_millis("dateSaisie", v)?))),
    },
    Field {
        key: FROM_API_KEY,
        encode: |c| Value::from(c.from_api()),
        decode: None,
    },
];

impl Schema for ClientSchema {
    type Entity = Client;
    type Builder = ClientBuilder;

    const NAME: &'static str = "client";

    fn fields() -> &'static [Field<Client, ClientBuilder>] {
        FIELDS
    }

    /// Records without the flag predate it and were created locally
    fn finish(builder: ClientBuilder, raw: &Map<String, Value>) -> Result<Client, CodecError> {
        let from_api = match raw.get(FROM_API_KEY) {
            None | Some(Value::Null) => false,
            Some(v) => read_bool(FROM_API_KEY, v)?,
        };
        if from_api {
            Ok(builder.build_from_api())
        } else {
            Ok(builder.build()?)
        }
    }
}
