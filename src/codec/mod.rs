//! JSON codec for entities
//!
//! One generic engine ([`schema`]) plus a declarative schema per entity
//! kind. Dates travel as epoch milliseconds, nested entities as nested
//! objects, and derived amounts are never read back.

pub mod client;
pub mod order;
pub mod product;
pub mod schema;

pub use client::ClientSchema;
pub use order::{CommandeSchema, LigneCommandeSchema};
pub use product::ProduitSchema;
pub use schema::{
    decode, decode_list, encode, encode_list, encode_opt, from_document, to_document, CodecError,
    Field, Schema,
};
