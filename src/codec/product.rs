//! Wire schema for [`Produit`]

use serde_json::{Map, Value};

use crate::codec::schema::{read_f64, read_string, CodecError, Field, Schema};
use crate::entities::product::{Produit, ProduitBuilder};

pub struct ProduitSchema;

static FIELDS: &[Field<Produit, ProduitBuilder>] = &[
    Field {
        key: "id",
        encode: |p| Value::from(p.id()),
        decode: Some(|b, v| Ok(b.id(read_string("id", v)?))),
    },
    Field {
        key: "libelle",
        encode: |p| Value::from(p.libelle()),
        decode: Some(|b, v| Ok(b.libelle(read_string("libelle", v)?))),
    },
    Field {
        key: "description",
        encode: |p| Value::from(p.description()),
        decode: Some(|b, v| Ok(b.description(read_string("description", v)?))),
    },
    Field {
        key: "prixUnitaire",
        encode: |p| Value::from(p.prix_unitaire()),
        decode: Some(|b, v| Ok(b.prix_unitaire(read_f64("prixUnitaire", v)?))),
    },
    Field {
        key: "tauxTva",
        encode: |p| Value::from(p.taux_tva()),
        decode: Some(|b, v| Ok(b.taux_tva(read_f64("tauxTva", v)?))),
    },
];

impl Schema for ProduitSchema {
    type Entity = Produit;
    type Builder = ProduitBuilder;

    const NAME: &'static str = "produit";

    fn fields() -> &'static [Field<Produit, ProduitBuilder>] {
        FIELDS
    }

    fn finish(builder: ProduitBuilder, _raw: &Map<String, Value>) -> Result<Produit, CodecError> {
        Ok(builder.build()?)
    }
}
