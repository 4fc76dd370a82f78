//! Dynamic entity record

use std::collections::BTreeMap;

use super::Value;

/// Field name to text value, as edited in a form and sent to the backend.
pub type FieldMap = BTreeMap<String, String>;

/// The identifier of a record, in its display form.
///
/// Backends return numeric or string identifiers; both are kept as the text
/// that appears in URLs (`/api/products/42`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordId(String);

impl RecordId {
    /// Creates an identifier from its text form.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for RecordId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<i64> for RecordId {
    fn from(n: i64) -> Self {
        Self(n.to_string())
    }
}

/// One row of domain data.
///
/// Records hold field values as a map from field name to [`Value`]. Which
/// field is the identifier is decided by the entity's schema, not the record.
///
/// # Example
///
/// ```
/// use dashboard_lib::model::Record;
///
/// let record = Record::new()
///     .set("id", 1)
///     .set("product_name", "Widget A")
///     .set("price", 30);
///
/// assert_eq!(record.display("product_name"), "Widget A");
/// assert_eq!(record.display("missing"), "");
/// assert_eq!(record.id("id").unwrap().as_str(), "1");
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    pub(crate) fields: BTreeMap<String, Value>,
}

impl Record {
    /// Creates a new empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the identifier stored in `id_field`, if present and not null.
    pub fn id(&self, id_field: &str) -> Option<RecordId> {
        match self.fields.get(id_field) {
            None | Some(Value::Null) => None,
            Some(value) => Some(RecordId(value.to_string())),
        }
    }

    /// Returns a reference to the field value, if it exists.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Returns the display text of a field; missing values render as empty.
    pub fn display(&self, field: &str) -> String {
        self.fields
            .get(field)
            .map(|v| v.to_string())
            .unwrap_or_default()
    }

    /// Sets a field value (builder pattern).
    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    /// Inserts a field value.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(field.into(), value.into());
    }
}

impl FromIterator<(String, Value)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_from_number_and_string() {
        let numeric = Record::new().set("id", 42);
        assert_eq!(numeric.id("id"), Some(RecordId::from("42")));

        let text = Record::new().set("sku", "A-1");
        assert_eq!(text.id("sku"), Some(RecordId::from("A-1")));
    }

    #[test]
    fn test_id_missing_or_null() {
        let record = Record::new().set("id", Value::Null);
        assert_eq!(record.id("id"), None);
        assert_eq!(record.id("other"), None);
    }

    #[test]
    fn test_clone_is_independent() {
        let original = Record::new().set("product_name", "Widget");
        let mut copy = original.clone();
        copy.insert("product_name", "Gadget");
        assert_eq!(original.display("product_name"), "Widget");
    }
}
