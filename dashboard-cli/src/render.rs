//! Plain-text rendering of a table page.

use dashboard_lib::table::CrudTable;

/// Renders the current page as aligned columns with the identifier first,
/// followed by the page status line.
pub fn page(table: &CrudTable) -> String {
    let schema = table.schema();
    let id_field = schema.id_field();

    let mut header = vec![table.header_text(id_field)];
    header.extend(
        schema
            .columns()
            .iter()
            .map(|column| table.header_text(&column.name)),
    );

    let rows: Vec<Vec<String>> = table
        .page_rows()
        .into_iter()
        .map(|record| {
            let mut cells = vec![record.display(id_field)];
            cells.extend(schema.columns().iter().map(|c| record.display(&c.name)));
            cells
        })
        .collect();

    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut lines = vec![line(&header, &widths)];
    lines.push(
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("  "),
    );
    if rows.is_empty() {
        lines.push("(no records)".to_string());
    }
    lines.extend(rows.iter().map(|row| line(row, &widths)));
    lines.push(String::new());
    lines.push(format!(
        "{} ({} matching)",
        table.page_status(),
        table.filtered().len()
    ));
    lines.join("\n")
}

fn line(cells: &[String], widths: &[usize]) -> String {
    cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| {
            let pad = width.saturating_sub(cell.chars().count());
            format!("{}{}", cell, " ".repeat(pad))
        })
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}

#[cfg(test)]
mod tests {
    use dashboard_lib::model::ColumnSpec;
    use dashboard_lib::model::EntityKind;
    use dashboard_lib::model::EntitySchema;
    use dashboard_lib::model::Record;
    use dashboard_lib::table::TableConfig;

    use super::*;

    #[test]
    fn test_page_layout() {
        let schema = EntitySchema::new(
            EntityKind::taxes(),
            vec![
                ColumnSpec::text("taxRate").label("Tax Rate"),
                ColumnSpec::text("applicableCategory").label("Category"),
            ],
        );
        let records = vec![
            Record::new().set("id", 1).set("taxRate", 0.2).set("applicableCategory", "food"),
            Record::new().set("id", 12).set("taxRate", 0.05),
        ];
        let mut table = CrudTable::new(schema, records, TableConfig::default());
        table.toggle_sort("taxRate").unwrap();

        let expected = "\
id  Tax Rate ▲  Category
--  ----------  --------
12  0.05
1   0.2         food

Page 1 of 1 (2 matching)";
        assert_eq!(page(&table), expected);
    }

    #[test]
    fn test_empty_page() {
        let table = CrudTable::new(EntitySchema::reports(), Vec::new(), TableConfig::default());
        let text = page(&table);
        assert!(text.contains("(no records)"));
        assert!(text.ends_with("Page 1 of 1 (0 matching)"));
    }
}
