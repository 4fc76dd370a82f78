//! CSV export and validated CSV import.

use std::collections::HashSet;

use chrono::NaiveDate;

use crate::error::ImportError;
use crate::model::ColumnSpec;
use crate::model::EntityKind;
use crate::model::EntitySchema;
use crate::model::FieldMap;
use crate::model::Record;

fn quote(text: &str) -> String {
    format!("\"{}\"", text.replace('"', "\"\""))
}

/// Renders rows as CSV: a header of quoted column labels, then one line of
/// quoted display values per row, joined by `\n`.
pub fn export<'a, I>(rows: I, columns: &[ColumnSpec]) -> String
where
    I: IntoIterator<Item = &'a Record>,
{
    let header = columns
        .iter()
        .map(|column| quote(&column.label))
        .collect::<Vec<_>>()
        .join(",");

    let mut lines = vec![header];
    lines.extend(rows.into_iter().map(|record| {
        columns
            .iter()
            .map(|column| quote(&record.display(&column.name)))
            .collect::<Vec<_>>()
            .join(",")
    }));
    lines.join("\n")
}

/// Download file name: `{kind}_{YYYY-MM-DD}.csv`.
pub fn file_name(kind: &EntityKind, date: NaiveDate) -> String {
    format!("{}_{}.csv", kind, date.format("%Y-%m-%d"))
}

/// Parses an uploaded CSV into one draft per data row.
///
/// The format is deliberately narrow: cells are split on commas with no
/// quoting, the header names columns by field name or label, and every row
/// must have exactly as many cells as the header. Blank lines are skipped and
/// empty cells are left out of the draft.
pub fn parse_import(text: &str, schema: &EntitySchema) -> Result<Vec<FieldMap>, ImportError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut lines = text
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .enumerate()
        .map(|(index, line)| (index + 1, line))
        .filter(|(_, line)| !line.trim().is_empty());

    let (header_line, header) = lines.next().ok_or(ImportError::Empty)?;
    let fields = header_fields(header_line, header, schema)?;

    let mut drafts = Vec::new();
    for (line, row) in lines {
        let cells = split_line(line, row)?;
        if cells.len() != fields.len() {
            return Err(ImportError::FieldCount {
                line,
                expected: fields.len(),
                found: cells.len(),
            });
        }
        let draft: FieldMap = fields
            .iter()
            .zip(cells)
            .filter(|(_, cell)| !cell.is_empty())
            .map(|(field, cell)| (field.clone(), cell.to_string()))
            .collect();
        drafts.push(draft);
    }

    if drafts.is_empty() {
        return Err(ImportError::NoRows);
    }
    Ok(drafts)
}

fn header_fields(
    line: usize,
    header: &str,
    schema: &EntitySchema,
) -> Result<Vec<String>, ImportError> {
    let mut seen = HashSet::new();
    split_line(line, header)?
        .into_iter()
        .map(|cell| {
            let column = schema
                .column_by_header(cell)
                .ok_or_else(|| ImportError::UnknownColumn {
                    column: cell.to_string(),
                })?;
            if !seen.insert(column.name.as_str()) {
                return Err(ImportError::DuplicateColumn {
                    column: cell.to_string(),
                });
            }
            Ok(column.name.clone())
        })
        .collect()
}

fn split_line(line: usize, text: &str) -> Result<Vec<&str>, ImportError> {
    if text.contains('"') {
        return Err(ImportError::Quoted { line });
    }
    Ok(text.split(',').map(str::trim).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Value;

    fn map(pairs: &[(&str, &str)]) -> FieldMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_export_quotes_and_doubles() {
        let columns = vec![
            ColumnSpec::text("product_name").label("Product Name"),
            ColumnSpec::text("price"),
        ];
        let rows = vec![
            Record::new().set("product_name", "Widget \"Pro\"").set("price", 30),
            Record::new().set("product_name", "a,b").set("price", Value::Null),
        ];
        let csv = export(&rows, &columns);
        assert_eq!(
            csv,
            "\"Product Name\",\"price\"\n\"Widget \"\"Pro\"\"\",\"30\"\n\"a,b\",\"\""
        );
    }

    #[test]
    fn test_export_header_only() {
        let columns = vec![ColumnSpec::text("a"), ColumnSpec::text("b")];
        assert_eq!(export(std::iter::empty::<&Record>(), &columns), "\"a\",\"b\"");
    }

    #[test]
    fn test_file_name() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 9).unwrap();
        assert_eq!(file_name(&EntityKind::taxes(), date), "taxes_2024-02-09.csv");
    }

    #[test]
    fn test_parse_by_name_and_label() {
        let schema = EntitySchema::products();
        let text = "\u{feff}Product Name,price\r\nWidget,30\r\n\r\nGadget,\r\n";
        let drafts = parse_import(text, &schema).unwrap();
        assert_eq!(
            drafts,
            vec![
                map(&[("product_name", "Widget"), ("price", "30")]),
                map(&[("product_name", "Gadget")]),
            ]
        );
    }

    #[test]
    fn test_parse_rejects_malformed() {
        let schema = EntitySchema::products();
        assert_eq!(parse_import("", &schema), Err(ImportError::Empty));
        assert_eq!(parse_import("\n \n", &schema), Err(ImportError::Empty));
        assert_eq!(parse_import("price\n", &schema), Err(ImportError::NoRows));
        assert_eq!(
            parse_import("price,colour\n1,red", &schema),
            Err(ImportError::UnknownColumn {
                column: "colour".into()
            })
        );
        assert_eq!(
            parse_import("price,Price\n1,2", &schema),
            Err(ImportError::DuplicateColumn {
                column: "Price".into()
            })
        );
        assert_eq!(
            parse_import("product_name,price\nWidget\n", &schema),
            Err(ImportError::FieldCount {
                line: 2,
                expected: 2,
                found: 1
            })
        );
        assert_eq!(
            parse_import("product_name\n\n\"Widget, large\"", &schema),
            Err(ImportError::Quoted { line: 3 })
        );
    }
}
