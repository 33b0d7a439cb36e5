//! JSON codecs for complex property types
//!
//! A [`JsonCodec`] converts one complex value type to and from the JSON
//! stored in a row column. This is the persistence-side twin of the
//! comparer: equality and cloning come from the comparer registry, the
//! stored shape comes from here. Missing codecs follow the same policy as
//! missing comparers - fatal configuration error at first use.

use std::any::{Any, TypeId};
use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use snaptrack_core::model::ComplexValue;

use crate::errors::{Result, StoreError};

type ErasedEncode =
    Box<dyn Fn(&ComplexValue) -> Option<serde_json::Result<Value>> + Send + Sync>;
type ErasedDecode = Box<dyn Fn(&Value) -> serde_json::Result<ComplexValue> + Send + Sync>;

/// JSON encode/decode pair for one complex value type
pub struct JsonCodec {
    type_id: TypeId,
    type_name: &'static str,
    encode: ErasedEncode,
    decode: ErasedDecode,
}

impl JsonCodec {
    /// Build the serde-backed codec for `T`
    pub fn of<T>() -> Self
    where
        T: Any + Send + Sync + Serialize + DeserializeOwned,
    {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            encode: Box::new(|value| {
                value.downcast_ref::<T>().map(serde_json::to_value)
            }),
            decode: Box::new(|json| {
                serde_json::from_value::<T>(json.clone()).map(ComplexValue::new)
            }),
        }
    }

    /// The `TypeId` this codec handles
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// The type name this codec handles (diagnostic purposes)
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Encode a complex value to its stored JSON
    ///
    /// # Errors
    ///
    /// `Serialization` if the value is not of this codec's type or fails
    /// to serialize.
    pub fn encode(&self, value: &ComplexValue) -> Result<Value> {
        match (self.encode)(value) {
            Some(result) => Ok(result?),
            None => Err(StoreError::Serialization {
                message: format!(
                    "codec for {} cannot encode value of type {}",
                    self.type_name,
                    value.type_name()
                ),
            }),
        }
    }

    /// Decode stored JSON back into a complex value
    ///
    /// # Errors
    ///
    /// `Serialization` if the JSON does not match this codec's type.
    pub fn decode(&self, json: &Value) -> Result<ComplexValue> {
        Ok((self.decode)(json)?)
    }
}

impl std::fmt::Debug for JsonCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "JsonCodec<{}>", self.type_name)
    }
}

/// Registry mapping complex value types to their JSON codecs
#[derive(Debug, Default)]
pub struct CodecRegistry {
    codecs: HashMap<TypeId, JsonCodec>,
}

impl CodecRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            codecs: HashMap::new(),
        }
    }

    /// Install a codec
    ///
    /// # Errors
    ///
    /// `CodecAlreadyRegistered` if a codec for the same type is installed.
    pub fn register(&mut self, codec: JsonCodec) -> Result<()> {
        let type_id = codec.type_id();
        if self.codecs.contains_key(&type_id) {
            return Err(StoreError::CodecAlreadyRegistered {
                type_name: codec.type_name().to_string(),
            });
        }
        self.codecs.insert(type_id, codec);
        Ok(())
    }

    /// Install the serde-backed codec for `T`
    ///
    /// # Errors
    ///
    /// Same conditions as [`Self::register`].
    pub fn register_default<T>(&mut self) -> Result<()>
    where
        T: Any + Send + Sync + Serialize + DeserializeOwned,
    {
        self.register(JsonCodec::of::<T>())
    }

    /// Whether a codec for `T` is installed
    pub fn is_registered<T: Any>(&self) -> bool {
        self.codecs.contains_key(&TypeId::of::<T>())
    }

    /// Resolve the codec for a type
    ///
    /// # Errors
    ///
    /// `CodecMissing` when no codec was registered for the type.
    pub fn resolve(&self, type_id: TypeId, type_name: &str) -> Result<&JsonCodec> {
        self.codecs
            .get(&type_id)
            .ok_or_else(|| StoreError::CodecMissing {
                type_name: type_name.to_string(),
            })
    }

    /// Resolve the codec for a concrete value
    ///
    /// # Errors
    ///
    /// Same conditions as [`Self::resolve`].
    pub fn resolve_for(&self, value: &ComplexValue) -> Result<&JsonCodec> {
        self.resolve(value.type_id(), value.type_name())
    }

    /// Number of registered codecs
    pub fn len(&self) -> usize {
        self.codecs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codecs.is_empty()
    }
}
