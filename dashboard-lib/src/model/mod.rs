//! Data model

mod entity;
mod record;
mod record_serde;
mod schema;
mod value;

pub use entity::EntityKind;
pub use record::FieldMap;
pub use record::Record;
pub use record::RecordId;
pub use schema::ColumnKind;
pub use schema::ColumnSpec;
pub use schema::EntitySchema;
pub use value::Value;
