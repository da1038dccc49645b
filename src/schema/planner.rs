//! Per-field serialization planning.
//!
//! For each declared field of a record type the planner decides whether the
//! field is left off the wire entirely and whether a text field is encoded as
//! a nullable string (`{null, string}` union, where unset decodes to `None`
//! rather than the text `"null"`).
//!
//! Plans are computed once per descriptor and cached. Two descriptors with
//! the same names but a different kind, exclusion or field list get their
//! own plans. Concurrent first use of the same record may compute twice; the
//! first plan stored wins and every caller sees that one.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use super::shape::SchemaTable;
use crate::error::{EtpError, Result};

/// Static kind of a declared field, as the record type sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// Text field.
    Text,
    /// Field holding the record's own schema descriptor.
    SchemaDescriptor,
    /// Anything else.
    Other,
}

/// One declared field of a record type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldDescriptor {
    /// Owning record type name.
    pub record: String,
    /// Field name.
    pub name: String,
    /// Static kind.
    pub kind: FieldKind,
    /// Marked as never sent on the wire by the record type itself.
    pub wire_excluded: bool,
}

impl FieldDescriptor {
    /// Create a descriptor.
    pub fn new(record: impl Into<String>, name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            record: record.into(),
            name: name.into(),
            kind,
            wire_excluded: false,
        }
    }

    /// Mark the field as never sent on the wire.
    pub fn wire_excluded(mut self) -> Self {
        self.wire_excluded = true;
        self
    }
}

/// The declared fields of one record type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordDescriptor {
    name: String,
    fields: Vec<FieldDescriptor>,
}

impl RecordDescriptor {
    /// Create a descriptor with no fields.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Add a field of the given kind.
    pub fn field(mut self, name: impl Into<String>, kind: FieldKind) -> Self {
        let field = FieldDescriptor::new(self.name.clone(), name, kind);
        self.fields.push(field);
        self
    }

    /// Add a field that is never sent on the wire.
    pub fn excluded_field(mut self, name: impl Into<String>, kind: FieldKind) -> Self {
        let field = FieldDescriptor::new(self.name.clone(), name, kind).wire_excluded();
        self.fields.push(field);
        self
    }

    /// Record type name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared fields in order.
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }
}

/// Serialization treatment of one field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldPlan {
    /// Leave the field off the wire.
    pub suppress: bool,
    /// Encode as `{null, string}`: unset on the wire reads back as no value.
    pub nullable_string: bool,
}

impl FieldPlan {
    /// No customization.
    pub const DEFAULT: FieldPlan = FieldPlan {
        suppress: false,
        nullable_string: false,
    };

    const SUPPRESS: FieldPlan = FieldPlan {
        suppress: true,
        nullable_string: false,
    };

    const NULLABLE_STRING: FieldPlan = FieldPlan {
        suppress: false,
        nullable_string: true,
    };
}

/// Plans for every declared field of one record type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordPlan {
    record: String,
    fields: Vec<(String, FieldPlan)>,
}

impl RecordPlan {
    /// Record type name.
    pub fn record(&self) -> &str {
        &self.record
    }

    /// Plan for a field, if declared.
    pub fn get(&self, field: &str) -> Option<FieldPlan> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, plan)| *plan)
    }

    /// Check if a field is left off the wire.
    pub fn is_suppressed(&self, field: &str) -> bool {
        self.get(field).is_some_and(|plan| plan.suppress)
    }

    /// Check if a field is encoded as a nullable string.
    pub fn is_nullable_string(&self, field: &str) -> bool {
        self.get(field).is_some_and(|plan| plan.nullable_string)
    }

    /// Names of the fields that go on the wire, in declaration order.
    pub fn wire_fields(&self) -> impl Iterator<Item = &str> {
        self.fields
            .iter()
            .filter(|(_, plan)| !plan.suppress)
            .map(|(name, _)| name.as_str())
    }
}

/// Decides and caches per-field serialization treatment.
///
/// # Example
///
/// ```
/// use etpwire::schema::{
///     FieldKind, FieldPlanner, FieldShape, RecordDescriptor, RecordSchema, SchemaTable,
/// };
///
/// let table = SchemaTable::builder()
///     .record(
///         RecordSchema::new("Resource")
///             .field("uri", FieldShape::String)
///             .field("name", FieldShape::Union(vec![FieldShape::Null, FieldShape::String])),
///     )
///     .build();
/// let planner = FieldPlanner::new(table);
///
/// let resource = RecordDescriptor::new("Resource")
///     .field("uri", FieldKind::Text)
///     .field("name", FieldKind::Text)
///     .field("schema", FieldKind::SchemaDescriptor);
/// let plan = planner.plan_record(&resource);
///
/// assert!(plan.is_nullable_string("name"));
/// assert!(!plan.is_nullable_string("uri"));
/// assert_eq!(plan.wire_fields().collect::<Vec<_>>(), vec!["uri", "name"]);
/// ```
#[derive(Debug)]
pub struct FieldPlanner {
    schemas: Arc<SchemaTable>,
    fields: RwLock<HashMap<FieldDescriptor, FieldPlan>>,
    records: RwLock<HashMap<RecordDescriptor, Arc<RecordPlan>>>,
}

impl FieldPlanner {
    /// Create a planner over a frozen schema table.
    pub fn new(schemas: impl Into<Arc<SchemaTable>>) -> Self {
        Self {
            schemas: schemas.into(),
            fields: RwLock::new(HashMap::new()),
            records: RwLock::new(HashMap::new()),
        }
    }

    /// Schema table in use.
    pub fn schemas(&self) -> &SchemaTable {
        &self.schemas
    }

    /// Plan one field. Never fails: schema problems fall back to [`FieldPlan::DEFAULT`].
    pub fn plan(&self, field: &FieldDescriptor) -> FieldPlan {
        if let Some(plan) = self.fields.read().get(field) {
            return *plan;
        }

        let computed = self.compute(field);
        *self.fields.write().entry(field.clone()).or_insert(computed)
    }

    /// Plan every declared field of a record type, once per descriptor.
    pub fn plan_record(&self, record: &RecordDescriptor) -> Arc<RecordPlan> {
        if let Some(plan) = self.records.read().get(record) {
            return Arc::clone(plan);
        }

        let computed = Arc::new(RecordPlan {
            record: record.name().to_string(),
            fields: record
                .fields()
                .iter()
                .map(|field| (field.name.clone(), self.plan(field)))
                .collect(),
        });
        Arc::clone(
            self.records
                .write()
                .entry(record.clone())
                .or_insert(computed),
        )
    }

    /// Check whether the schema describes a text field the way its kind expects.
    ///
    /// # Errors
    ///
    /// Returns [`EtpError::SchemaMismatch`] when the owning record has no
    /// schema, the field is missing from it, or its shape is not
    /// `{null, string}`. Fields that are not text always pass.
    pub fn check(&self, field: &FieldDescriptor) -> Result<()> {
        if field.kind != FieldKind::Text {
            return Ok(());
        }
        let mismatch = |reason: &str| EtpError::SchemaMismatch {
            record: field.record.clone(),
            field: field.name.clone(),
            reason: reason.to_string(),
        };
        let schema = self
            .schemas
            .get(&field.record)
            .ok_or_else(|| mismatch("no schema for record"))?;
        let shape = schema
            .field_shape(&field.name)
            .ok_or_else(|| mismatch("field not in schema"))?;
        if shape.is_nullable_string() {
            Ok(())
        } else {
            Err(mismatch(&format!("shape {shape:?} is not a null/string union")))
        }
    }

    fn compute(&self, field: &FieldDescriptor) -> FieldPlan {
        let excluded_by_schema = self
            .schemas
            .get(&field.record)
            .is_some_and(|schema| schema.is_excluded(&field.name));

        if field.kind == FieldKind::SchemaDescriptor || field.wire_excluded || excluded_by_schema {
            return FieldPlan::SUPPRESS;
        }

        match self.check(field) {
            Ok(()) if field.kind == FieldKind::Text => FieldPlan::NULLABLE_STRING,
            Ok(()) => FieldPlan::DEFAULT,
            Err(e) => {
                tracing::debug!("Default encoding for {}.{}: {}", field.record, field.name, e);
                FieldPlan::DEFAULT
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldShape, RecordSchema};

    fn planner() -> FieldPlanner {
        let table = SchemaTable::builder()
            .record(
                RecordSchema::new("Resource")
                    .field("uri", FieldShape::String)
                    .field(
                        "name",
                        FieldShape::Union(vec![FieldShape::Null, FieldShape::String]),
                    )
                    .field(
                        "lastChanged",
                        FieldShape::Union(vec![FieldShape::String, FieldShape::Null]),
                    )
                    .field(
                        "sourceCount",
                        FieldShape::Union(vec![FieldShape::Null, FieldShape::Int]),
                    )
                    .field("internalTag", FieldShape::String)
                    .exclude("internalTag"),
            )
            .build();
        FieldPlanner::new(table)
    }

    #[test]
    fn test_schema_descriptor_is_suppressed() {
        let planner = planner();
        let field = FieldDescriptor::new("Resource", "schema", FieldKind::SchemaDescriptor);
        assert_eq!(planner.plan(&field), FieldPlan::SUPPRESS);
    }

    #[test]
    fn test_wire_excluded_is_suppressed() {
        let planner = planner();
        let marked = FieldDescriptor::new("Resource", "name", FieldKind::Text).wire_excluded();
        assert!(planner.plan(&marked).suppress);

        let listed = FieldDescriptor::new("Resource", "internalTag", FieldKind::Text);
        assert!(planner.plan(&listed).suppress);
    }

    #[test]
    fn test_null_string_union_is_nullable_in_either_order() {
        let planner = planner();
        let name = FieldDescriptor::new("Resource", "name", FieldKind::Text);
        let last_changed = FieldDescriptor::new("Resource", "lastChanged", FieldKind::Text);

        assert_eq!(planner.plan(&name), FieldPlan::NULLABLE_STRING);
        assert_eq!(planner.plan(&last_changed), FieldPlan::NULLABLE_STRING);
    }

    #[test]
    fn test_mismatched_union_has_no_customization() {
        let planner = planner();
        let field = FieldDescriptor::new("Resource", "sourceCount", FieldKind::Text);

        assert_eq!(planner.plan(&field), FieldPlan::DEFAULT);
        assert!(matches!(
            planner.check(&field),
            Err(EtpError::SchemaMismatch { .. })
        ));
    }

    #[test]
    fn test_plain_string_has_no_customization() {
        let planner = planner();
        let field = FieldDescriptor::new("Resource", "uri", FieldKind::Text);
        assert_eq!(planner.plan(&field), FieldPlan::DEFAULT);
    }

    #[test]
    fn test_missing_schema_or_field_falls_back() {
        let planner = planner();
        let no_schema = FieldDescriptor::new("Unknown", "name", FieldKind::Text);
        let no_field = FieldDescriptor::new("Resource", "missing", FieldKind::Text);

        assert_eq!(planner.plan(&no_schema), FieldPlan::DEFAULT);
        assert_eq!(planner.plan(&no_field), FieldPlan::DEFAULT);
        assert!(planner.check(&no_schema).unwrap_err().to_string().contains("no schema"));
        assert!(planner.check(&no_field).unwrap_err().to_string().contains("not in schema"));
    }

    #[test]
    fn test_non_text_fields_are_default() {
        let planner = planner();
        let field = FieldDescriptor::new("Resource", "name", FieldKind::Other);
        assert_eq!(planner.plan(&field), FieldPlan::DEFAULT);
        assert!(planner.check(&field).is_ok());
    }

    #[test]
    fn test_record_plan_is_cached_per_type() {
        let planner = planner();
        let record = RecordDescriptor::new("Resource")
            .field("uri", FieldKind::Text)
            .field("name", FieldKind::Text)
            .field("schema", FieldKind::SchemaDescriptor)
            .excluded_field("cache", FieldKind::Other);

        let first = planner.plan_record(&record);
        let second = planner.plan_record(&record);

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.record(), "Resource");
        assert_eq!(first.wire_fields().collect::<Vec<_>>(), vec!["uri", "name"]);
        assert!(first.is_suppressed("schema"));
        assert!(first.is_suppressed("cache"));
        assert!(first.is_nullable_string("name"));
        assert_eq!(first.get("absent"), None);
    }

    #[test]
    fn test_same_names_with_different_descriptors_plan_separately() {
        let planner = planner();

        let text = FieldDescriptor::new("Resource", "name", FieldKind::Text);
        let excluded = text.clone().wire_excluded();
        let schema = FieldDescriptor::new("Resource", "name", FieldKind::SchemaDescriptor);
        assert!(planner.plan(&text).nullable_string);
        assert!(planner.plan(&excluded).suppress);
        assert!(planner.plan(&schema).suppress);
        assert!(!planner.plan(&text).suppress);

        let narrow = RecordDescriptor::new("Resource").field("uri", FieldKind::Text);
        let wide = narrow.clone().field("name", FieldKind::Text);
        let first = planner.plan_record(&narrow);
        let second = planner.plan_record(&wide);
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(first.wire_fields().count(), 1);
        assert_eq!(second.wire_fields().collect::<Vec<_>>(), vec!["uri", "name"]);
        assert!(Arc::ptr_eq(&second, &planner.plan_record(&wide)));
    }

    #[test]
    fn test_concurrent_first_use_sees_one_plan() {
        let planner = Arc::new(planner());
        let record = RecordDescriptor::new("Resource")
            .field("name", FieldKind::Text)
            .field("sourceCount", FieldKind::Text);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let planner = Arc::clone(&planner);
                let record = record.clone();
                std::thread::spawn(move || planner.plan_record(&record))
            })
            .collect();

        let plans: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        for plan in &plans[1..] {
            assert!(Arc::ptr_eq(&plans[0], plan));
        }
        assert!(plans[0].is_nullable_string("name"));
        assert!(!plans[0].is_nullable_string("sourceCount"));
    }
}
