//! Conversion between live tracked entities and persisted rows
//!
//! Dehydration walks an entity's current values into a [`Row`] using the
//! codec registry for complex properties. Hydration rebuilds an entity
//! from a row, driven by the entity model's property declarations (the
//! row alone cannot say which complex type a JSON object used to be).

use serde_json::Value;
use snaptrack_core::model::PropertyKind;
use snaptrack_core::{EntityModel, PropertyValue, ScalarValue, TrackedEntity};

use crate::codec::CodecRegistry;
use crate::errors::{Result, StoreError};
use crate::row::Row;

/// Serialize an entity's current values into a row
///
/// # Errors
///
/// `CodecMissing` for a complex property type without a codec;
/// `Serialization` if encoding fails.
pub fn dehydrate(codecs: &CodecRegistry, entity: &TrackedEntity) -> Result<Row> {
    let mut row = Row::new();
    for (name, value) in entity.properties() {
        let json = match value {
            PropertyValue::Scalar(scalar) => scalar_to_json(scalar),
            PropertyValue::Complex(complex) => {
                let codec = codecs.resolve_for(complex)?;
                codec.encode(complex)?
            }
        };
        row.insert(name, json);
    }
    Ok(row)
}

/// Rebuild an entity from its persisted row
///
/// Properties declared on the model but absent from the row are left
/// unset. The returned entity is detached; attach it to a context to put
/// it under tracking.
///
/// # Errors
///
/// `CodecMissing` for a complex property type without a codec;
/// `ColumnNotScalar` if a scalar column holds structured JSON;
/// `Serialization` if decoding fails.
pub fn hydrate(
    codecs: &CodecRegistry,
    model: &EntityModel,
    id: &str,
    row: &Row,
) -> Result<TrackedEntity> {
    let mut entity = TrackedEntity::for_model(model, id);
    for descriptor in model.properties() {
        let Some(json) = row.get(descriptor.name()) else {
            continue;
        };
        let value = match descriptor.kind() {
            PropertyKind::Scalar => {
                PropertyValue::Scalar(scalar_from_json(descriptor.name(), json)?)
            }
            PropertyKind::Complex { type_id, type_name } => {
                let codec = codecs.resolve(*type_id, type_name)?;
                PropertyValue::Complex(codec.decode(json)?)
            }
        };
        entity.put(descriptor.name(), value).map_err(StoreError::from)?;
    }
    Ok(entity)
}

fn scalar_to_json(scalar: &ScalarValue) -> Value {
    match scalar {
        ScalarValue::Null => Value::Null,
        ScalarValue::Bool(b) => Value::Bool(*b),
        ScalarValue::Int(i) => Value::from(*i),
        ScalarValue::Float(f) => Value::from(*f),
        ScalarValue::Text(s) => Value::String(s.clone()),
    }
}

fn scalar_from_json(column: &str, json: &Value) -> Result<ScalarValue> {
    match json {
        Value::Null => Ok(ScalarValue::Null),
        Value::Bool(b) => Ok(ScalarValue::Bool(*b)),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(ScalarValue::Int(i))
            } else if let Some(f) = n.as_f64() {
                Ok(ScalarValue::Float(f))
            } else {
                Err(StoreError::ColumnNotScalar {
                    column: column.to_string(),
                })
            }
        }
        Value::String(s) => Ok(ScalarValue::Text(s.clone())),
        Value::Array(_) | Value::Object(_) => Err(StoreError::ColumnNotScalar {
            column: column.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use serde_json::json;
    use snaptrack_core::PropertyDescriptor;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Address {
        street: String,
    }

    fn codecs() -> CodecRegistry {
        let mut codecs = CodecRegistry::new();
        codecs.register_default::<Address>().unwrap();
        codecs
    }

    fn customer_model() -> EntityModel {
        EntityModel::new(
            "customer",
            vec![
                PropertyDescriptor::scalar("name"),
                PropertyDescriptor::complex::<Address>("address"),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_dehydrate_writes_complex_as_json() {
        let codecs = codecs();
        let model = customer_model();
        let mut entity = TrackedEntity::for_model(&model, "1");
        entity.put_scalar("name", "Customer").unwrap();
        entity
            .put_complex(
                "address",
                Address {
                    street: "Street".to_string(),
                },
            )
            .unwrap();

        let row = dehydrate(&codecs, &entity).unwrap();
        assert_eq!(row.get("name"), Some(&json!("Customer")));
        assert_eq!(row.get("address"), Some(&json!({"street": "Street"})));
    }

    #[test]
    fn test_hydrate_rebuilds_typed_values() {
        let codecs = codecs();
        let model = customer_model();
        let mut row = Row::new();
        row.insert("name", json!("Customer"));
        row.insert("address", json!({"street": "Street"}));

        let entity = hydrate(&codecs, &model, "1", &row).unwrap();
        assert_eq!(entity.key().to_string(), "customer:1");
        assert_eq!(entity.scalar("name").unwrap().as_text(), Some("Customer"));
        assert_eq!(entity.complex::<Address>("address").unwrap().street, "Street");
    }

    #[test]
    fn test_hydrate_skips_absent_columns() {
        let codecs = codecs();
        let model = customer_model();
        let mut row = Row::new();
        row.insert("name", json!("Customer"));

        let entity = hydrate(&codecs, &model, "1", &row).unwrap();
        assert!(!entity.has_property("address"));
    }

    #[test]
    fn test_hydrate_rejects_structured_scalar_column() {
        let codecs = codecs();
        let model = customer_model();
        let mut row = Row::new();
        row.insert("name", json!({"unexpected": "object"}));

        let result = hydrate(&codecs, &model, "1", &row);
        assert!(matches!(result, Err(StoreError::ColumnNotScalar { .. })));
    }

    #[test]
    fn test_round_trip_preserves_values() {
        let codecs = codecs();
        let model = customer_model();
        let mut entity = TrackedEntity::for_model(&model, "1");
        entity.put_scalar("name", "Customer").unwrap();
        entity
            .put_complex(
                "address",
                Address {
                    street: "Street".to_string(),
                },
            )
            .unwrap();

        let row = dehydrate(&codecs, &entity).unwrap();
        let rebuilt = hydrate(&codecs, &model, "1", &row).unwrap();

        assert_eq!(
            rebuilt.complex::<Address>("address").unwrap(),
            entity.complex::<Address>("address").unwrap()
        );
        assert_eq!(
            rebuilt.scalar("name").unwrap(),
            entity.scalar("name").unwrap()
        );
    }

    #[test]
    fn test_missing_codec_fails_dehydration() {
        let codecs = CodecRegistry::new();
        let model = customer_model();
        let mut entity = TrackedEntity::for_model(&model, "1");
        entity
            .put_complex(
                "address",
                Address {
                    street: "Street".to_string(),
                },
            )
            .unwrap();

        let result = dehydrate(&codecs, &entity);
        assert!(matches!(result, Err(StoreError::CodecMissing { .. })));
    }
}
