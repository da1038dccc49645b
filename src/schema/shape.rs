//! Static schema shapes for record types.
//!
//! A [`SchemaTable`] is built once (usually from generated schema text)
//! and never changes afterwards. It replaces any need to construct a record
//! just to read the schema attached to it.
//!
//! # Example
//!
//! ```
//! use etpwire::schema::{FieldShape, RecordSchema, SchemaTable};
//!
//! let resource = RecordSchema::from_json(r#"{
//!     "type": "record",
//!     "name": "Resource",
//!     "fields": [
//!         { "name": "uri", "type": "string" },
//!         { "name": "name", "type": ["null", "string"] }
//!     ]
//! }"#).unwrap();
//!
//! let table = SchemaTable::builder().record(resource).build();
//! let shape = table.get("Resource").unwrap().field_shape("name").unwrap();
//! assert!(shape.is_nullable_string());
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::error::{EtpError, Result};

/// Declared wire shape of one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldShape {
    /// Absent-value marker.
    Null,
    Boolean,
    Int,
    Long,
    Float,
    Double,
    Bytes,
    /// Text.
    String,
    /// Named record.
    Record(String),
    /// Named enumeration.
    Enum(String),
    /// Named fixed-size binary.
    Fixed(String),
    /// Sequence of items.
    Array(Box<FieldShape>),
    /// String-keyed map of values.
    Map(Box<FieldShape>),
    /// One of several branches.
    Union(Vec<FieldShape>),
}

impl FieldShape {
    /// Check if this is exactly the two-branch union `{null, string}`, in either order.
    pub fn is_nullable_string(&self) -> bool {
        match self {
            FieldShape::Union(branches) => {
                branches.len() == 2
                    && branches.contains(&FieldShape::Null)
                    && branches.contains(&FieldShape::String)
            }
            _ => false,
        }
    }

    /// Parse a shape from schema JSON (a type name, a union array, or a complex type object).
    pub fn from_json(value: &Value) -> Result<Self> {
        match value {
            Value::String(name) => Ok(Self::from_type_name(name)),
            Value::Array(branches) => branches
                .iter()
                .map(Self::from_json)
                .collect::<Result<Vec<_>>>()
                .map(FieldShape::Union),
            Value::Object(object) => {
                let kind = object
                    .get("type")
                    .ok_or_else(|| EtpError::InvalidSchema("type object without 'type'".into()))?;
                let named = |what: &str| -> Result<String> {
                    object
                        .get("name")
                        .and_then(Value::as_str)
                        .map(str::to_string)
                        .ok_or_else(|| EtpError::InvalidSchema(format!("{what} without 'name'")))
                };
                match kind.as_str() {
                    Some("array") => {
                        let items = object.get("items").ok_or_else(|| {
                            EtpError::InvalidSchema("array without 'items'".into())
                        })?;
                        Ok(FieldShape::Array(Box::new(Self::from_json(items)?)))
                    }
                    Some("map") => {
                        let values = object
                            .get("values")
                            .ok_or_else(|| EtpError::InvalidSchema("map without 'values'".into()))?;
                        Ok(FieldShape::Map(Box::new(Self::from_json(values)?)))
                    }
                    Some("record") => Ok(FieldShape::Record(named("record")?)),
                    Some("enum") => Ok(FieldShape::Enum(named("enum")?)),
                    Some("fixed") => Ok(FieldShape::Fixed(named("fixed")?)),
                    // Primitive with annotations, e.g. {"type": "long", "logicalType": ...}
                    _ => Self::from_json(kind),
                }
            }
            other => Err(EtpError::InvalidSchema(format!(
                "unexpected schema value {other}"
            ))),
        }
    }

    fn from_type_name(name: &str) -> Self {
        match name {
            "null" => FieldShape::Null,
            "boolean" => FieldShape::Boolean,
            "int" => FieldShape::Int,
            "long" => FieldShape::Long,
            "float" => FieldShape::Float,
            "double" => FieldShape::Double,
            "bytes" => FieldShape::Bytes,
            "string" => FieldShape::String,
            named => FieldShape::Record(named.to_string()),
        }
    }
}

/// One declared field of a record schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSchema {
    /// Field name as written on the wire.
    pub name: String,
    /// Declared shape.
    pub shape: FieldShape,
}

/// Schema of one record type: its fields plus the fields never sent on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordSchema {
    name: String,
    fields: Vec<FieldSchema>,
    excluded: Vec<String>,
}

impl RecordSchema {
    /// Create an empty schema for a record type.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Add a field.
    pub fn field(mut self, name: impl Into<String>, shape: FieldShape) -> Self {
        self.fields.push(FieldSchema {
            name: name.into(),
            shape,
        });
        self
    }

    /// Mark a field as never sent on the wire.
    pub fn exclude(mut self, name: impl Into<String>) -> Self {
        self.excluded.push(name.into());
        self
    }

    /// Parse an Avro-style record schema.
    ///
    /// An optional top-level `"excludedFields": [..]` lists fields that are
    /// never sent on the wire.
    pub fn from_json(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_json_value(&value)
    }

    /// Parse an Avro-style record schema from an already parsed value.
    pub fn from_json_value(value: &Value) -> Result<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| EtpError::InvalidSchema("record schema must be an object".into()))?;
        if object.get("type").and_then(Value::as_str) != Some("record") {
            return Err(EtpError::InvalidSchema("schema type is not 'record'".into()));
        }
        let name = object
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| EtpError::InvalidSchema("record without 'name'".into()))?;

        let mut schema = RecordSchema::new(name);
        let fields = object
            .get("fields")
            .and_then(Value::as_array)
            .ok_or_else(|| EtpError::InvalidSchema(format!("record {name} without 'fields'")))?;
        for field in fields {
            let field_name = field
                .get("name")
                .and_then(Value::as_str)
                .ok_or_else(|| EtpError::InvalidSchema(format!("field of {name} without 'name'")))?;
            let shape = field.get("type").ok_or_else(|| {
                EtpError::InvalidSchema(format!("field {name}.{field_name} without 'type'"))
            })?;
            schema = schema.field(field_name, FieldShape::from_json(shape)?);
        }

        if let Some(excluded) = object.get("excludedFields").and_then(Value::as_array) {
            for field in excluded.iter().filter_map(Value::as_str) {
                schema = schema.exclude(field);
            }
        }
        Ok(schema)
    }

    /// Record type name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared fields in order.
    pub fn fields(&self) -> &[FieldSchema] {
        &self.fields
    }

    /// Shape of a field, if declared.
    pub fn field_shape(&self, name: &str) -> Option<&FieldShape> {
        self.fields.iter().find(|f| f.name == name).map(|f| &f.shape)
    }

    /// Check if a field is listed as never sent on the wire.
    pub fn is_excluded(&self, name: &str) -> bool {
        self.excluded.iter().any(|f| f == name)
    }
}

/// Immutable mapping from record type name to schema.
#[derive(Debug, Clone, Default)]
pub struct SchemaTable {
    records: HashMap<String, Arc<RecordSchema>>,
}

impl SchemaTable {
    /// Start building a table.
    pub fn builder() -> SchemaTableBuilder {
        SchemaTableBuilder::default()
    }

    /// Schema for a record type.
    pub fn get(&self, record: &str) -> Option<&RecordSchema> {
        self.records.get(record).map(Arc::as_ref)
    }

    /// Number of record schemas.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Builder for [`SchemaTable`]. A later schema with the same name replaces an earlier one.
#[derive(Debug, Default)]
pub struct SchemaTableBuilder {
    records: HashMap<String, Arc<RecordSchema>>,
}

impl SchemaTableBuilder {
    /// Add a record schema.
    pub fn record(mut self, schema: RecordSchema) -> Self {
        self.records
            .insert(schema.name().to_string(), Arc::new(schema));
        self
    }

    /// Add a record schema from Avro-style JSON text.
    pub fn record_json(self, text: &str) -> Result<Self> {
        Ok(self.record(RecordSchema::from_json(text)?))
    }

    /// Freeze the table.
    pub fn build(self) -> SchemaTable {
        SchemaTable {
            records: self.records,
        }
    }
}
