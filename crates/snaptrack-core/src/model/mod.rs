pub mod entity;
pub mod property;
pub mod state;

pub use entity::{EntityKey, EntityModel, TrackedEntity};
pub use property::{ComplexValue, PropertyDescriptor, PropertyKind, PropertyValue, ScalarValue};
pub use state::EntityState;
