//! Wire schemas for [`Commande`] and [`LigneCommande`]
//!
//! The client and products are written inline as nested objects using
//! their own schemas. `montantLigne` and `montantTotal` are written for
//! readers of the file but discarded on decode.

use serde_json::{Map, Value};

use crate::codec::client::ClientSchema;
use crate::codec::product::ProduitSchema;
use crate::codec::schema::{
    decode, decode_list, encode, encode_list, millis, read_bool, read_f64, read_i64, read_millis,
    read_string, CodecError, Field, Schema,
};
use crate::entities::order::{Commande, CommandeBuilder, LigneCommande, LigneCommandeBuilder};

pub struct LigneCommandeSchema;

static LIGNE_FIELDS: &[Field<LigneCommande, LigneCommandeBuilder>] = &[
    Field {
        key: "produit",
        encode: |l| encode::<ProduitSchema>(l.produit()),
        decode: Some(|b, v| {
            Ok(match decode::<ProduitSchema>(v)? {
                Some(produit) => b.produit(produit),
                None => b,
            })
        }),
    },
    Field {
        key: "quantite",
        encode: |l| Value::from(l.quantite()),
        decode: Some(|b, v| Ok(b.quantite(read_i64("quantite", v)?))),
    },
    Field {
        key: "remise",
        encode: |l| Value::from(l.remise()),
        decode: Some(|b, v| Ok(b.remise(read_f64("remise", v)?))),
    },
    Field {
        key: "validee",
        encode: |l| Value::from(l.validee()),
        decode: Some(|b, v| Ok(b.validee(read_bool("validee", v)?))),
    },
    Field {
        key: "montantLigne",
        encode: |l| Value::from(l.montant_ligne()),
        decode: None,
    },
];

impl Schema for LigneCommandeSchema {
    type Entity = LigneCommande;
    type Builder = LigneCommandeBuilder;

    const NAME: &'static str = "ligneCommande";

    fn fields() -> &'static [Field<LigneCommande, LigneCommandeBuilder>] {
        LIGNE_FIELDS
    }

    fn finish(
        builder: LigneCommandeBuilder,
        _raw: &Map<String, Value>,
    ) -> Result<LigneCommande, CodecError> {
        Ok(builder.build()?)
    }
}

pub struct CommandeSchema;

static COMMANDE_FIELDS: &[Field<Commande, CommandeBuilder>] = &[
    Field {
        key: "id",
        encode: |c| Value::from(c.id()),
        decode: Some(|b, v| Ok(b.id(read_string("id", v)?))),
    },
    Field {
        key: "client",
        encode: |c| encode::<ClientSchema>(c.client()),
        decode: Some(|b, v| {
            Ok(match decode::<ClientSchema>(v)? {
                Some(client) => b.client(client),
                None => b,
            })
        }),
    },
    Field {
        key: "dateCommande",
        encode: |c| millis(Some(c.date_commande())),
        decode: Some(|b, v| Ok(b.date_commande(read_millis("dateCommande", v)?))),
    },
    Field {
        key: "lignesCommande",
        encode: |c| encode_list::<LigneCommandeSchema>(c.lignes_commande()),
        decode: Some(|b, v| Ok(b.lignes_commande(decode_list::<LigneCommandeSchema>(v)?))),
    },
    Field {
        key: "utilisateur",
        encode: |c| Value::from(c.utilisateur()),
        decode: Some(|b, v| Ok(b.utilisateur(read_string("utilisateur", v)?))),
    },
    Field {
        key: "montantTotal",
        encode: |c| Value::from(c.montant_total()),
        decode: None,
    },
];

impl Schema for CommandeSchema {
    type Entity = Commande;
    type Builder = CommandeBuilder;

    const NAME: &'static str = "commande";

    fn fields() -> &'static [Field<Commande, CommandeBuilder>] {
        COMMANDE_FIELDS
    }

    fn finish(builder: CommandeBuilder, _raw: &Map<String, Value>) -> Result<Commande, CodecError> {
        Ok(builder.build()?)
    }
}
