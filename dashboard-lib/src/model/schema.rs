//! Column descriptors and per-entity schemas

use super::EntityKind;

/// How a column is edited in the create/edit form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnKind {
    /// Free text input.
    Text,
    /// Date-time picker; submitted as an ISO-8601 UTC timestamp.
    DateTime,
    /// Closed choice among fixed options.
    Choice(Vec<String>),
}

/// One displayed and editable column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    /// Field name on the record.
    pub name: String,
    /// Header and form label.
    pub label: String,
    /// Input kind.
    pub kind: ColumnKind,
    /// Blank values are rejected before submission.
    pub required: bool,
}

impl ColumnSpec {
    /// Creates a text column labelled with its field name.
    pub fn text(name: impl Into<String>) -> Self {
        Self::with_kind(name, ColumnKind::Text)
    }

    /// Creates a date-time column.
    pub fn date_time(name: impl Into<String>) -> Self {
        Self::with_kind(name, ColumnKind::DateTime)
    }

    /// Creates a closed-choice column.
    pub fn choice<I, S>(name: impl Into<String>, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_kind(
            name,
            ColumnKind::Choice(options.into_iter().map(Into::into).collect()),
        )
    }

    fn with_kind(name: impl Into<String>, kind: ColumnKind) -> Self {
        let name = name.into();
        Self {
            label: name.clone(),
            name,
            kind,
            required: false,
        }
    }

    /// Sets the display label.
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Marks the column as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

/// The column set and identifier field for one entity kind.
///
/// # Example
///
/// ```
/// use dashboard_lib::model::{ColumnSpec, EntityKind, EntitySchema};
///
/// let schema = EntitySchema::new(
///     EntityKind::new("stores").unwrap(),
///     vec![ColumnSpec::text("shopName").label("Shop Name")],
/// );
/// assert_eq!(schema.id_field(), "id");
/// assert_eq!(schema.column("shopName").unwrap().label, "Shop Name");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntitySchema {
    kind: EntityKind,
    id_field: String,
    columns: Vec<ColumnSpec>,
}

impl EntitySchema {
    /// Creates a schema whose identifier field is `id`.
    pub fn new(kind: EntityKind, columns: Vec<ColumnSpec>) -> Self {
        Self {
            kind,
            id_field: "id".to_string(),
            columns,
        }
    }

    /// Overrides the identifier field name.
    pub fn with_id_field(mut self, id_field: impl Into<String>) -> Self {
        self.id_field = id_field.into();
        self
    }

    pub fn kind(&self) -> &EntityKind {
        &self.kind
    }

    pub fn id_field(&self) -> &str {
        &self.id_field
    }

    /// Returns the columns in display order.
    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    /// Looks up a column by field name.
    pub fn column(&self, name: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Looks up a column by field name or label.
    pub fn column_by_header(&self, header: &str) -> Option<&ColumnSpec> {
        self.column(header)
            .or_else(|| self.columns.iter().find(|c| c.label == header))
    }

    // =========================================================================
    // Dashboard presets
    // =========================================================================

    pub fn products() -> Self {
        Self::new(
            EntityKind::products(),
            vec![
                ColumnSpec::text("product_name").label("Product Name"),
                ColumnSpec::text("description").label("Description"),
                ColumnSpec::text("initial_stock").label("Initial Stock"),
                ColumnSpec::text("price").label("Price"),
                ColumnSpec::text("category").label("Category"),
            ],
        )
    }

    pub fn transactions() -> Self {
        Self::new(
            EntityKind::transactions(),
            vec![
                ColumnSpec::date_time("dateTime").label("Date"),
                ColumnSpec::choice("transactionType", ["debit", "credit"]).label("Type"),
                ColumnSpec::text("amount").label("Amount"),
                ColumnSpec::text("taxAmount").label("Tax Amount"),
                ColumnSpec::text("totalAmount").label("Total Amount"),
            ],
        )
    }

    pub fn taxes() -> Self {
        Self::new(
            EntityKind::taxes(),
            vec![
                ColumnSpec::text("taxRate").label("Tax Rate"),
                ColumnSpec::text("applicableCategory").label("Applicable Category"),
            ],
        )
    }

    pub fn reports() -> Self {
        Self::new(
            EntityKind::reports(),
            vec![
                ColumnSpec::date_time("generationDate").label("Generation Date"),
                ColumnSpec::text("totalIncome").label("Total Income"),
                ColumnSpec::text("totalExpenses").label("Total Expenses"),
                ColumnSpec::text("netProfit").label("Net Profit"),
                ColumnSpec::text("taxPaid").label("Tax Paid"),
            ],
        )
    }

    pub fn shops() -> Self {
        Self::new(
            EntityKind::shops(),
            vec![
                ColumnSpec::text("shopName").label("Shop Name"),
                ColumnSpec::text("location").label("Location"),
                ColumnSpec::date_time("registrationDate").label("Registration Date"),
                ColumnSpec::text("category").label("Category"),
                ColumnSpec::text("totalIncome").label("Total Income"),
                ColumnSpec::text("totalExpenses").label("Total Expenses"),
                ColumnSpec::text("netProfit").label("Net Profit"),
            ],
        )
    }

    /// Returns the preset for one of the dashboard's entity kinds.
    pub fn preset(kind: &EntityKind) -> Option<Self> {
        match kind.as_str() {
            "products" => Some(Self::products()),
            "transactions" => Some(Self::transactions()),
            "taxes" => Some(Self::taxes()),
            "reports" => Some(Self::reports()),
            "shops" => Some(Self::shops()),
            _ => None,
        }
    }
}
