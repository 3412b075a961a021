//! Payload capability contract
//!
//! Any domain type that wants to be persisted implements [`Model`]. The
//! stores and the engine never look inside the bytes a model produces.

use crate::cell::Ref;
use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Boxed error a model can carry out of `marshal`
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Serialized payload of a model plus the error marshaling may have hit
///
/// When `error` is set the payload is meaningless and the write must stop
/// before touching the store.
#[derive(Debug)]
pub struct Item {
    data: Vec<u8>,
    error: Option<BoxError>,
}

impl Item {
    /// Successful payload
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self {
            data: data.into(),
            error: None,
        }
    }

    /// Failed marshal carrying its cause
    pub fn failed(error: impl Into<BoxError>) -> Self {
        Self {
            data: Vec::new(),
            error: Some(error.into()),
        }
    }

    /// Serialize `value` as JSON text
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Self {
        match serde_json::to_vec(value) {
            Ok(data) => Self::new(data),
            Err(e) => Self::failed(e),
        }
    }

    /// The carried error, if marshaling failed
    pub fn error(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        self.error.as_deref()
    }

    /// Payload bytes (empty when the item carries an error)
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Payload, or the carried error
    pub fn into_result(self) -> std::result::Result<Vec<u8>, BoxError> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.data),
        }
    }
}

/// Capability set of a persistable payload
pub trait Model {
    /// Convert into the binary form stored in the cell
    fn marshal(&self) -> Item;

    /// Bind stored bytes and populate the model
    fn unmarshal(&mut self, reference: &Ref, data: &[u8]) -> Result<()>;
}

/// Model adapter for any serde type, stored as JSON text
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JsonModel<T>(pub T);

impl<T> JsonModel<T> {
    /// Wrap a value
    pub fn new(value: T) -> Self {
        Self(value)
    }

    /// Unwrap the value
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T: Serialize + DeserializeOwned> Model for JsonModel<T> {
    fn marshal(&self) -> Item {
        Item::json(&self.0)
    }

    fn unmarshal(&mut self, reference: &Ref, data: &[u8]) -> Result<()> {
        self.0 = serde_json::from_slice(data)
            .map_err(|e| Error::Unmarshal(format!("{}: {}", reference, e)))?;
        Ok(())
    }
}

impl<T> std::ops::Deref for JsonModel<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T> std::ops::DerefMut for JsonModel<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.0
    }
}
