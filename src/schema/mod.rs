//! Schema module - static record schemas and the field planner.
//!
//! - [`SchemaTable`] - immutable record name to [`RecordSchema`] mapping
//! - [`FieldPlanner`] - per-field serialization decisions, cached per type

mod planner;
mod shape;

pub use planner::{
    FieldDescriptor, FieldKind, FieldPlan, FieldPlanner, RecordDescriptor, RecordPlan,
};
pub use shape::{FieldSchema, FieldShape, RecordSchema, SchemaTable, SchemaTableBuilder};
