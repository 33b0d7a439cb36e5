use snaptrack_core::{
    ComparerRegistry, EntityKey, EntityModel, PropertyDescriptor, TrackedEntity, TrackingContext,
};
use uuid::Uuid;

/// Complex property type used across the suites
#[derive(Debug, Clone, PartialEq)]
pub struct Address {
    pub street: String,
}

impl Address {
    #[allow(dead_code)]
    pub fn new(street: &str) -> Self {
        Self {
            street: street.to_string(),
        }
    }
}

/// Registry with the Address comparer installed
#[allow(dead_code)]
pub fn new_registry() -> ComparerRegistry {
    let mut registry = ComparerRegistry::new();
    registry.register_default::<Address>().unwrap();
    registry
}

/// Empty tracking context
#[allow(dead_code)]
pub fn new_context() -> TrackingContext {
    TrackingContext::new()
}

/// Model for the customer entity kind used across the suites
#[allow(dead_code)]
pub fn customer_model() -> EntityModel {
    EntityModel::new(
        "customer",
        vec![
            PropertyDescriptor::scalar("name"),
            PropertyDescriptor::complex::<Address>("address"),
        ],
    )
    .unwrap()
}

/// Build a customer entity with a generated ID
///
/// Returns the entity; its key can be read back via `entity.key()`.
#[allow(dead_code)]
pub fn new_customer(street: &str) -> TrackedEntity {
    customer_with_id(&Uuid::now_v7().to_string(), street)
}

/// Build a customer entity with a fixed ID (for cross-run determinism)
#[allow(dead_code)]
pub fn customer_with_id(id: &str, street: &str) -> TrackedEntity {
    let mut entity = TrackedEntity::for_model(&customer_model(), id);
    entity.put_scalar("name", "Customer").unwrap();
    entity.put_complex("address", Address::new(street)).unwrap();
    entity
}

/// Key for a customer id
#[allow(dead_code)]
pub fn customer_key(id: &str) -> EntityKey {
    EntityKey::new("customer", id)
}
