//! Create/edit form lifecycle and submission checks.

use chrono::DateTime;
use chrono::NaiveDate;
use chrono::NaiveDateTime;
use chrono::SecondsFormat;
use chrono::Utc;

use crate::error::FieldValidationError;
use crate::error::ValidationError;
use crate::model::ColumnKind;
use crate::model::EntitySchema;
use crate::model::FieldMap;
use crate::model::Record;

/// Open/closed state of the create/edit form.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ModalState {
    #[default]
    Closed,
    Create,
    /// Editing a copy of the record as it was when the form opened.
    Edit(Record),
}

impl ModalState {
    pub fn is_open(&self) -> bool {
        !matches!(self, Self::Closed)
    }

    /// The record being edited, if any.
    pub fn original(&self) -> Option<&Record> {
        match self {
            Self::Edit(record) => Some(record),
            _ => None,
        }
    }
}

/// Seeds an edit draft with the display text of every column the record has.
/// Null and missing values are left out of the draft.
pub(crate) fn seed_from(record: &Record, schema: &EntitySchema) -> FieldMap {
    schema
        .columns()
        .iter()
        .filter_map(|column| match record.get(&column.name) {
            Some(value) if !value.is_null() => Some((column.name.clone(), value.to_string())),
            _ => None,
        })
        .collect()
}

/// Checks a draft against the column descriptors and returns the field map to
/// send. Date-time values are rewritten to UTC ISO-8601 and choice values are
/// trimmed; text is passed through untouched.
pub(crate) fn prepare_submission(
    draft: &FieldMap,
    schema: &EntitySchema,
) -> Result<FieldMap, ValidationError> {
    let mut fields = draft.clone();
    let mut errors = Vec::new();

    for column in schema.columns() {
        let value = draft.get(&column.name).map(|v| v.trim()).unwrap_or("");
        if value.is_empty() {
            if column.required {
                errors.push(FieldValidationError::new(
                    &column.name,
                    format!("{} is required", column.label),
                ));
            }
            continue;
        }

        match &column.kind {
            ColumnKind::Text => {}
            ColumnKind::DateTime => match normalize_date_time(value) {
                Some(normalized) => {
                    fields.insert(column.name.clone(), normalized);
                }
                None => errors.push(FieldValidationError::new(
                    &column.name,
                    format!("'{value}' is not a valid date-time"),
                )),
            },
            ColumnKind::Choice(options) => {
                if options.iter().any(|option| option == value) {
                    fields.insert(column.name.clone(), value.to_string());
                } else {
                    errors.push(FieldValidationError::new(
                        &column.name,
                        format!("must be one of: {}", options.join(", ")),
                    ));
                }
            }
        }
    }

    if errors.is_empty() {
        Ok(fields)
    } else {
        Err(ValidationError::Fields(errors))
    }
}

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
];

/// Parses a date-time input and renders it as `YYYY-MM-DDTHH:MM:SS.mmmZ`.
///
/// Inputs without an offset are taken as UTC; a bare date is midnight.
pub(crate) fn normalize_date_time(input: &str) -> Option<String> {
    let input = input.trim();
    let utc = if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        dt.with_timezone(&Utc)
    } else if let Some(naive) = NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(input, format).ok())
    {
        naive.and_utc()
    } else {
        NaiveDate::parse_from_str(input, "%Y-%m-%d")
            .ok()?
            .and_hms_opt(0, 0, 0)?
            .and_utc()
    };
    Some(utc.to_rfc3339_opts(SecondsFormat::Millis, true))
}
