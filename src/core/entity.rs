//! Entity trait - common interface for all stored entity types

/// Common trait for all dolisales entities
///
/// Stores match records by [`Entity::id`] only; every other field is
/// payload.
pub trait Entity: Clone {
    /// Entity kind, used in log lines and error messages
    const KIND: &'static str;

    /// Get the entity's identifier
    fn id(&self) -> &str;

    /// Short human label (name, product label, order reference)
    fn label(&self) -> String;
}

/// Parse a locally sequential id, ignoring ids assigned by the ERP in
/// another format
pub fn numeric_id(id: &str) -> Option<u64> {
    id.trim().parse::<u64>().ok()
}
