//! CrudTable state machine

use std::num::NonZeroUsize;

use chrono::NaiveDate;
use futures::future::join_all;

use super::csv;
use super::form;
use super::form::ModalState;
use super::selection::Selection;
use super::view;
use super::view::SortDirection;
use crate::api::DataGateway;
use crate::error::Error;
use crate::error::FieldValidationError;
use crate::error::ValidationError;
use crate::model::EntityKind;
use crate::model::EntitySchema;
use crate::model::FieldMap;
use crate::model::Record;
use crate::model::RecordId;

const DEFAULT_ITEMS_PER_PAGE: NonZeroUsize = match NonZeroUsize::new(10) {
    Some(n) => n,
    None => NonZeroUsize::MIN,
};

/// Called with the entity kind after every successful create, update or delete.
pub type MutationHook = Box<dyn Fn(&EntityKind) + Send + Sync>;

/// Per-instance table settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableConfig {
    pub items_per_page: NonZeroUsize,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            items_per_page: DEFAULT_ITEMS_PER_PAGE,
        }
    }
}

/// Outcome of a confirmed bulk delete.
#[derive(Debug, Default)]
pub struct BulkDeleteReport {
    pub deleted: Vec<RecordId>,
    pub failed: Vec<(RecordId, Error)>,
}

impl BulkDeleteReport {
    pub fn total(&self) -> usize {
        self.deleted.len() + self.failed.len()
    }
}

/// Outcome of a CSV import that got past parsing.
#[derive(Debug, Default)]
pub struct ImportReport {
    pub created: Vec<Record>,
    /// 1-based data row number and the error message shown for it.
    pub failed: Vec<(usize, String)>,
}

/// View and interaction state of one entity table.
///
/// The table derives its filtered, sorted and paginated views from the record
/// collection it was last given. Mutations go through a [`DataGateway`] and
/// never touch that collection: the owner is told through the mutation hook
/// and is expected to supply a fresh one with [`CrudTable::set_records`].
///
/// # Example
///
/// ```
/// use dashboard_lib::model::{EntitySchema, Record};
/// use dashboard_lib::table::{CrudTable, TableConfig};
///
/// let records = vec![
///     Record::new().set("id", 1).set("product_name", "Widget A"),
///     Record::new().set("id", 2).set("product_name", "Gadget"),
/// ];
/// let mut table = CrudTable::new(EntitySchema::products(), records, TableConfig::default());
///
/// table.set_search_term("widget");
/// assert_eq!(table.page_rows().len(), 1);
/// assert_eq!(table.page_status(), "Page 1 of 1");
/// ```
pub struct CrudTable {
    schema: EntitySchema,
    records: Vec<Record>,
    items_per_page: NonZeroUsize,
    search_term: String,
    sort: Option<(String, SortDirection)>,
    current_page: usize,
    selection: Selection<RecordId>,
    modal: ModalState,
    draft: FieldMap,
    error: Option<String>,
    on_mutated: Option<MutationHook>,
}

impl std::fmt::Debug for CrudTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrudTable")
            .field("kind", self.schema.kind())
            .field("records", &self.records.len())
            .field("search_term", &self.search_term)
            .field("sort", &self.sort)
            .field("current_page", &self.current_page)
            .field("selected", &self.selection.len())
            .field("modal", &self.modal)
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

impl CrudTable {
    pub fn new(schema: EntitySchema, records: Vec<Record>, config: TableConfig) -> Self {
        Self {
            schema,
            records,
            items_per_page: config.items_per_page,
            search_term: String::new(),
            sort: None,
            current_page: 1,
            selection: Selection::new(),
            modal: ModalState::Closed,
            draft: FieldMap::new(),
            error: None,
            on_mutated: None,
        }
    }

    /// Installs the hook called after each successful mutation.
    pub fn with_on_mutated(mut self, hook: impl Fn(&EntityKind) + Send + Sync + 'static) -> Self {
        self.on_mutated = Some(Box::new(hook));
        self
    }

    pub fn schema(&self) -> &EntitySchema {
        &self.schema
    }

    pub fn kind(&self) -> &EntityKind {
        self.schema.kind()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn items_per_page(&self) -> NonZeroUsize {
        self.items_per_page
    }

    /// Replaces the authoritative collection.
    ///
    /// View state is kept; the current page is pulled back if the new
    /// collection has fewer pages. Selected ids are not pruned.
    pub fn set_records(&mut self, records: Vec<Record>) {
        self.records = records;
        self.current_page = self.current_page.clamp(1, self.total_pages());
    }

    // =========================================================================
    // View derivation
    // =========================================================================

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    /// Sets the free-text filter and returns to the first page.
    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
        self.current_page = 1;
    }

    /// Active sort column and direction.
    pub fn sort(&self) -> Option<(&str, SortDirection)> {
        self.sort
            .as_ref()
            .map(|(column, direction)| (column.as_str(), *direction))
    }

    /// Sorts by `column`, flipping the direction if it is already active.
    ///
    /// A newly chosen column starts ascending. Returns to the first page.
    pub fn toggle_sort(&mut self, column: &str) -> Result<SortDirection, ValidationError> {
        if self.schema.column(column).is_none() {
            return Err(ValidationError::UnknownColumn(column.to_string()));
        }
        let direction = match &self.sort {
            Some((active, direction)) if active == column => direction.toggled(),
            _ => SortDirection::Ascending,
        };
        self.sort = Some((column.to_string(), direction));
        self.current_page = 1;
        Ok(direction)
    }

    /// Drops the sort and restores backend order.
    pub fn clear_sort(&mut self) {
        self.sort = None;
        self.current_page = 1;
    }

    /// Every record matching the search term, in display order.
    pub fn filtered(&self) -> Vec<&Record> {
        let mut rows = view::filter(&self.records, self.schema.columns(), &self.search_term);
        if let Some((column, direction)) = &self.sort {
            view::sort(&mut rows, column, *direction);
        }
        rows
    }

    pub fn total_pages(&self) -> usize {
        view::total_pages(self.filtered().len(), self.items_per_page)
    }

    /// The 1-based current page.
    pub fn current_page(&self) -> usize {
        self.current_page
    }

    /// Rows on the current page.
    pub fn page_rows(&self) -> Vec<&Record> {
        let rows = self.filtered();
        let range = view::page_range(rows.len(), self.current_page, self.items_per_page);
        rows[range].to_vec()
    }

    pub fn can_prev(&self) -> bool {
        self.current_page > 1
    }

    pub fn can_next(&self) -> bool {
        self.current_page < self.total_pages()
    }

    /// Moves to `page` if it exists. Returns false and stays put otherwise.
    pub fn go_to_page(&mut self, page: usize) -> bool {
        if page < 1 || page > self.total_pages() {
            return false;
        }
        self.current_page = page;
        true
    }

    pub fn next_page(&mut self) -> bool {
        self.go_to_page(self.current_page + 1)
    }

    pub fn prev_page(&mut self) -> bool {
        self.go_to_page(self.current_page.saturating_sub(1))
    }

    /// Header text for a column, with the sort indicator when it is active.
    pub fn header_text(&self, column: &str) -> String {
        let label = self
            .schema
            .column(column)
            .map(|c| c.label.as_str())
            .unwrap_or(column);
        match &self.sort {
            Some((active, direction)) if active == column => {
                format!("{} {}", label, direction.indicator())
            }
            _ => label.to_string(),
        }
    }

    pub fn page_status(&self) -> String {
        format!("Page {} of {}", self.current_page, self.total_pages())
    }

    // =========================================================================
    // Selection
    // =========================================================================

    pub fn selection(&self) -> &Selection<RecordId> {
        &self.selection
    }

    /// Flips membership of one row. Returns true if the row is now selected.
    pub fn toggle_row(&mut self, id: RecordId) -> bool {
        self.selection.toggle(id)
    }

    /// Selects or deselects one row regardless of its current state.
    pub fn set_row_selected(&mut self, id: RecordId, selected: bool) {
        self.selection.set(id, selected);
    }

    pub fn is_selected(&self, id: &RecordId) -> bool {
        self.selection.is_selected(id)
    }

    /// Identifiers of the rows on the current page.
    pub fn page_ids(&self) -> Vec<RecordId> {
        let id_field = self.schema.id_field();
        self.page_rows()
            .into_iter()
            .filter_map(|record| record.id(id_field))
            .collect()
    }

    /// The derived "select all" checkbox: every row on a non-empty page is selected.
    pub fn page_all_selected(&self) -> bool {
        let ids = self.page_ids();
        !ids.is_empty() && ids.iter().all(|id| self.selection.is_selected(id))
    }

    /// Adds or removes exactly the current page's rows.
    pub fn set_page_selected(&mut self, selected: bool) {
        let ids = self.page_ids();
        if selected {
            self.selection.select_many(ids);
        } else {
            self.selection.deselect_many(&ids);
        }
    }

    // =========================================================================
    // Create/edit form
    // =========================================================================

    pub fn modal(&self) -> &ModalState {
        &self.modal
    }

    pub fn draft(&self) -> &FieldMap {
        &self.draft
    }

    /// Opens the form with an empty draft.
    pub fn open_create(&mut self) {
        self.modal = ModalState::Create;
        self.draft.clear();
    }

    /// Opens the form on a copy of the record `id`.
    ///
    /// Returns false if the collection has no such record.
    pub fn open_edit(&mut self, id: &RecordId) -> bool {
        let id_field = self.schema.id_field();
        let Some(record) = self
            .records
            .iter()
            .find(|record| record.id(id_field).as_ref() == Some(id))
        else {
            return false;
        };
        self.draft = form::seed_from(record, &self.schema);
        self.modal = ModalState::Edit(record.clone());
        true
    }

    /// Sets one draft field.
    pub fn set_field(
        &mut self,
        field: &str,
        value: impl Into<String>,
    ) -> Result<(), ValidationError> {
        if !self.modal.is_open() {
            return Err(ValidationError::FormClosed);
        }
        if self.schema.column(field).is_none() {
            return Err(ValidationError::UnknownColumn(field.to_string()));
        }
        self.draft.insert(field.to_string(), value.into());
        Ok(())
    }

    /// Closes the form, dropping the draft, the original record and the error.
    pub fn close_modal(&mut self) {
        self.modal = ModalState::Closed;
        self.draft.clear();
        self.error = None;
    }

    /// Submits the open form.
    ///
    /// On success the form closes, the search is cleared, the table returns
    /// to the first page and the mutation hook runs. On failure the form stays
    /// open with its draft and the error is recorded. Any earlier error is
    /// cleared first.
    pub async fn submit<G>(&mut self, gateway: &G) -> Option<Record>
    where
        G: DataGateway + ?Sized,
    {
        self.error = None;
        let result = match self.prepare() {
            Ok((fields, None)) => gateway.create(self.schema.kind(), &fields).await,
            Ok((fields, Some(id))) => gateway.update(self.schema.kind(), &id, &fields).await,
            Err(err) => Err(err.into()),
        };

        match result {
            Ok(record) => {
                log::info!("Saved {} record", self.schema.kind().singular());
                self.close_modal();
                self.search_term.clear();
                self.current_page = 1;
                self.notify_mutated();
                Some(record)
            }
            Err(err) => {
                log::error!("Failed to save {} record: {}", self.schema.kind().singular(), err);
                self.error = Some(err.to_string());
                None
            }
        }
    }

    fn prepare(&self) -> Result<(FieldMap, Option<RecordId>), ValidationError> {
        let id = match &self.modal {
            ModalState::Closed => return Err(ValidationError::FormClosed),
            ModalState::Create => None,
            ModalState::Edit(original) => {
                let id_field = self.schema.id_field();
                let id = original.id(id_field).ok_or_else(|| {
                    ValidationError::Fields(vec![FieldValidationError::new(
                        id_field,
                        "record has no identifier",
                    )])
                })?;
                Some(id)
            }
        };
        let fields = form::prepare_submission(&self.draft, &self.schema)?;
        Ok((fields, id))
    }

    // =========================================================================
    // Delete
    // =========================================================================

    /// Deletes one row without confirmation. Returns true on success.
    pub async fn delete_row<G>(&mut self, gateway: &G, id: &RecordId) -> bool
    where
        G: DataGateway + ?Sized,
    {
        self.error = None;
        match gateway.delete(self.schema.kind(), id).await {
            Ok(()) => {
                log::info!("Deleted {} {}", self.schema.kind().singular(), id);
                self.selection.set(id.clone(), false);
                self.notify_mutated();
                true
            }
            Err(err) => {
                log::error!("Failed to delete {} {}: {}", self.schema.kind().singular(), id, err);
                self.error = Some(format!("Failed to delete item: {err}"));
                false
            }
        }
    }

    /// Deletes every selected row after `confirm` accepts the prompt.
    ///
    /// The deletes run concurrently and all of them settle before the
    /// selection is cleared. Returns `None` when nothing is selected or the
    /// prompt is declined, leaving the selection as it was.
    pub async fn bulk_delete<G, F>(&mut self, gateway: &G, confirm: F) -> Option<BulkDeleteReport>
    where
        G: DataGateway + ?Sized,
        F: FnOnce(&str) -> bool,
    {
        if self.selection.is_empty() {
            return None;
        }
        let ids = self.selection.sorted();
        if !confirm(&format!("Delete {} items?", ids.len())) {
            return None;
        }
        self.error = None;

        let kind = self.schema.kind().clone();
        let results = join_all(ids.iter().map(|id| gateway.delete(&kind, id))).await;
        self.selection.clear();

        let mut report = BulkDeleteReport::default();
        for (id, result) in ids.into_iter().zip(results) {
            match result {
                Ok(()) => report.deleted.push(id),
                Err(err) => report.failed.push((id, err)),
            }
        }

        if !report.failed.is_empty() {
            let details = report
                .failed
                .iter()
                .map(|(id, err)| format!("{id}: {err}"))
                .collect::<Vec<_>>()
                .join("; ");
            let message = format!(
                "Failed to delete {} of {} items: {}",
                report.failed.len(),
                report.total(),
                details
            );
            log::error!("{message}");
            self.error = Some(message);
        }
        if !report.deleted.is_empty() {
            log::info!("Deleted {} {}", report.deleted.len(), kind);
            self.notify_mutated();
        }
        Some(report)
    }

    // =========================================================================
    // CSV
    // =========================================================================

    /// CSV of every filtered row in display order.
    pub fn export_csv(&self) -> String {
        csv::export(self.filtered(), self.schema.columns())
    }

    pub fn csv_file_name(&self, date: NaiveDate) -> String {
        csv::file_name(self.schema.kind(), date)
    }

    /// Parses an uploaded CSV and submits one create per row through the form.
    ///
    /// A malformed file is rejected as a whole before any request is sent and
    /// returns `None`. Rows that fail on submission are reported and do not
    /// stop the remaining ones.
    pub async fn import_csv<G>(&mut self, gateway: &G, text: &str) -> Option<ImportReport>
    where
        G: DataGateway + ?Sized,
    {
        self.error = None;
        let drafts = match csv::parse_import(text, &self.schema) {
            Ok(drafts) => drafts,
            Err(err) => {
                log::error!("Rejected CSV import for {}: {}", self.schema.kind(), err);
                self.error = Some(Error::from(err).to_string());
                return None;
            }
        };

        let mut report = ImportReport::default();
        for (index, draft) in drafts.into_iter().enumerate() {
            self.open_create();
            self.draft = draft;
            match self.submit(gateway).await {
                Some(record) => report.created.push(record),
                None => {
                    let message = self.error.take().unwrap_or_default();
                    report.failed.push((index + 1, message));
                    self.close_modal();
                }
            }
        }

        if !report.failed.is_empty() {
            let total = report.created.len() + report.failed.len();
            self.error = Some(format!(
                "Failed to import {} of {} rows: {}",
                report.failed.len(),
                total,
                report
                    .failed
                    .iter()
                    .map(|(row, message)| format!("row {row}: {message}"))
                    .collect::<Vec<_>>()
                    .join("; ")
            ));
        }
        Some(report)
    }

    // =========================================================================
    // Error banner
    // =========================================================================

    /// The message of the last failed interaction.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    fn notify_mutated(&self) {
        if let Some(hook) = &self.on_mutated {
            hook(self.schema.kind());
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::error::ApiError;
    use crate::model::ColumnSpec;

    /// In-memory backend that records every call.
    #[derive(Default)]
    struct FakeGateway {
        records: Mutex<Vec<Record>>,
        calls: Mutex<Vec<String>>,
        failing: HashSet<RecordId>,
        reject_writes: bool,
    }

    impl FakeGateway {
        fn with_records(records: Vec<Record>) -> Self {
            Self {
                records: Mutex::new(records),
                ..Default::default()
            }
        }

        fn failing(mut self, ids: &[&str]) -> Self {
            self.failing = ids.iter().map(|id| RecordId::from(*id)).collect();
            self
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn log(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }
    }

    fn to_record(fields: &FieldMap) -> Record {
        fields
            .iter()
            .map(|(k, v)| (k.clone(), v.as_str().into()))
            .collect()
    }

    #[async_trait]
    impl DataGateway for FakeGateway {
        async fn list(&self, kind: &EntityKind) -> Result<Vec<Record>, Error> {
            self.log(format!("list {kind}"));
            Ok(self.records.lock().unwrap().clone())
        }

        async fn create(&self, kind: &EntityKind, fields: &FieldMap) -> Result<Record, Error> {
            self.log(format!("create {kind} {fields:?}"));
            if self.reject_writes {
                return Err(ApiError::http(400, "Missing required fields").into());
            }
            let mut records = self.records.lock().unwrap();
            let record = to_record(fields).set("id", records.len() as i64 + 100);
            records.push(record.clone());
            Ok(record)
        }

        async fn update(
            &self,
            kind: &EntityKind,
            id: &RecordId,
            fields: &FieldMap,
        ) -> Result<Record, Error> {
            self.log(format!("update {kind} {id} {fields:?}"));
            if self.reject_writes {
                return Err(ApiError::http(500, "Server error").into());
            }
            Ok(to_record(fields).set("id", id.as_str()))
        }

        async fn delete(&self, kind: &EntityKind, id: &RecordId) -> Result<(), Error> {
            self.log(format!("delete {kind} {id}"));
            if self.failing.contains(id) {
                return Err(ApiError::http(404, "Product not found").into());
            }
            self.records
                .lock()
                .unwrap()
                .retain(|r| r.id("id").as_ref() != Some(id));
            Ok(())
        }
    }

    fn products(count: usize) -> Vec<Record> {
        (1..=count)
            .map(|i| {
                Record::new()
                    .set("id", i as i64)
                    .set("product_name", format!("Item {i}"))
                    .set("price", (i * 10) as i64)
            })
            .collect()
    }

    fn table(records: Vec<Record>) -> CrudTable {
        CrudTable::new(EntitySchema::products(), records, TableConfig::default())
    }

    fn page_ids(table: &CrudTable) -> Vec<String> {
        table.page_ids().iter().map(|id| id.to_string()).collect()
    }

    fn mutation_counter(table: CrudTable) -> (CrudTable, Arc<Mutex<Vec<String>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let table = table.with_on_mutated(move |kind| sink.lock().unwrap().push(kind.to_string()));
        (table, seen)
    }

    #[test]
    fn test_search_filters_rows() {
        let mut table = table(vec![
            Record::new().set("id", 1).set("product_name", "Widget A"),
            Record::new().set("id", 2).set("product_name", "Gadget"),
        ]);
        table.set_search_term("widget");
        assert_eq!(page_ids(&table), vec!["1"]);
    }

    #[test]
    fn test_sort_toggle_flips_direction() {
        let mut table = table(vec![
            Record::new().set("id", 1).set("price", 30),
            Record::new().set("id", 2).set("price", 10),
            Record::new().set("id", 3).set("price", 20),
        ]);
        assert_eq!(table.toggle_sort("price").unwrap(), SortDirection::Ascending);
        assert_eq!(page_ids(&table), vec!["2", "3", "1"]);
        assert_eq!(table.header_text("price"), "Price ▲");

        assert_eq!(table.toggle_sort("price").unwrap(), SortDirection::Descending);
        assert_eq!(page_ids(&table), vec!["1", "3", "2"]);
        assert_eq!(table.header_text("price"), "Price ▼");

        assert_eq!(table.toggle_sort("product_name").unwrap(), SortDirection::Ascending);
        assert_eq!(table.header_text("price"), "Price");

        table.clear_sort();
        assert_eq!(page_ids(&table), vec!["1", "2", "3"]);
    }

    #[test]
    fn test_sort_rejects_unknown_column() {
        let mut table = table(products(3));
        assert_eq!(
            table.toggle_sort("colour"),
            Err(ValidationError::UnknownColumn("colour".into()))
        );
        assert_eq!(table.sort(), None);
    }

    #[test]
    fn test_pagination_bounds() {
        let mut table = table(products(23));
        assert_eq!(table.total_pages(), 3);
        assert!(!table.can_prev());
        assert!(!table.prev_page());

        assert!(table.go_to_page(3));
        assert_eq!(table.page_rows().len(), 3);
        assert_eq!(table.page_status(), "Page 3 of 3");
        assert!(!table.can_next());
        assert!(!table.next_page());
        assert!(!table.go_to_page(0));
        assert!(!table.go_to_page(4));
        assert_eq!(table.current_page(), 3);

        assert!(table.prev_page());
        assert_eq!(table.current_page(), 2);
    }

    #[test]
    fn test_empty_table_has_one_page() {
        let table = table(Vec::new());
        assert_eq!(table.total_pages(), 1);
        assert!(table.page_rows().is_empty());
        assert!(!table.page_all_selected());
    }

    #[test]
    fn test_search_and_sort_reset_page() {
        let mut table = table(products(23));
        table.go_to_page(3);
        table.set_search_term("Item");
        assert_eq!(table.current_page(), 1);

        table.go_to_page(2);
        table.toggle_sort("price").unwrap();
        assert_eq!(table.current_page(), 1);
    }

    #[test]
    fn test_set_records_clamps_page() {
        let mut table = table(products(23));
        table.go_to_page(3);
        table.set_records(products(12));
        assert_eq!(table.current_page(), 2);
        table.set_records(Vec::new());
        assert_eq!(table.current_page(), 1);
    }

    #[test]
    fn test_select_all_touches_current_page_only() {
        let mut table = table(products(15));
        table.toggle_row(RecordId::from("12"));
        table.set_page_selected(true);
        assert!(table.page_all_selected());
        assert_eq!(table.selection().len(), 11);

        table.set_page_selected(false);
        assert_eq!(table.selection().sorted(), vec![RecordId::from("12")]);

        table.next_page();
        assert!(!table.page_all_selected());
    }

    #[test]
    fn test_selection_survives_view_changes() {
        let mut table = table(products(15));
        assert!(table.toggle_row(RecordId::from("3")));
        table.next_page();
        table.toggle_sort("price").unwrap();
        table.set_search_term("Item 1");
        assert!(table.is_selected(&RecordId::from("3")));
        assert!(!table.toggle_row(RecordId::from("3")));
        assert!(table.selection().is_empty());
    }

    #[tokio::test]
    async fn test_create_sends_draft_and_resets_view() {
        let gateway = FakeGateway::default();
        let (mut table, seen) = mutation_counter(table(products(23)));
        table.set_search_term("Item");
        table.go_to_page(2);

        table.open_create();
        assert!(table.draft().is_empty());
        table.set_field("product_name", "X").unwrap();
        let created = table.submit(&gateway).await.unwrap();

        assert_eq!(created.display("product_name"), "X");
        assert_eq!(
            gateway.calls(),
            vec![r#"create products {"product_name": "X"}"#]
        );
        assert_eq!(table.modal(), &ModalState::Closed);
        assert!(table.draft().is_empty());
        assert_eq!(table.current_page(), 1);
        assert_eq!(table.search_term(), "");
        assert_eq!(table.error(), None);
        assert_eq!(*seen.lock().unwrap(), vec!["products"]);
        // The collection is only replaced by the owner.
        assert_eq!(table.records().len(), 23);
    }

    #[tokio::test]
    async fn test_edit_seeds_copy_and_updates() {
        let gateway = FakeGateway::default();
        let mut table = table(products(3));
        assert!(table.open_edit(&RecordId::from("2")));
        assert_eq!(table.draft()["product_name"], "Item 2");

        table.set_field("price", "25").unwrap();
        assert_eq!(table.records()[1].display("price"), "20");
        assert_eq!(
            table.modal().original().map(|r| r.display("price")),
            Some("20".to_string())
        );

        table.submit(&gateway).await.unwrap();
        assert_eq!(
            gateway.calls(),
            vec![r#"update products 2 {"price": "25", "product_name": "Item 2"}"#]
        );
        assert!(!table.modal().is_open());
    }

    #[tokio::test]
    async fn test_submit_failure_keeps_form() {
        let gateway = FakeGateway {
            reject_writes: true,
            ..Default::default()
        };
        let (mut table, seen) = mutation_counter(table(products(3)));
        table.set_search_term("Item");
        table.open_create();
        table.set_field("product_name", "X").unwrap();

        assert!(table.submit(&gateway).await.is_none());
        assert_eq!(table.modal(), &ModalState::Create);
        assert_eq!(table.draft()["product_name"], "X");
        assert_eq!(table.error(), Some("HTTP 400: Missing required fields"));
        assert_eq!(table.search_term(), "Item");
        assert!(seen.lock().unwrap().is_empty());

        table.close_modal();
        assert_eq!(table.error(), None);
        assert!(table.draft().is_empty());
    }

    #[tokio::test]
    async fn test_validation_failure_skips_gateway() {
        let gateway = FakeGateway::default();
        let mut table = CrudTable::new(
            EntitySchema::transactions(),
            Vec::new(),
            TableConfig::default(),
        );
        table.open_create();
        table.set_field("transactionType", "refund").unwrap();
        assert!(table.submit(&gateway).await.is_none());
        assert!(gateway.calls().is_empty());
        assert!(table.error().unwrap().contains("transactionType"));
    }

    #[tokio::test]
    async fn test_form_guards() {
        let gateway = FakeGateway::default();
        let mut table = table(products(1));
        assert_eq!(table.set_field("price", "1"), Err(ValidationError::FormClosed));
        assert!(table.submit(&gateway).await.is_none());
        assert_eq!(table.error(), Some("No form is open"));

        table.open_create();
        assert_eq!(
            table.set_field("colour", "red"),
            Err(ValidationError::UnknownColumn("colour".into()))
        );
        assert!(!table.open_edit(&RecordId::from("99")));
    }

    #[tokio::test]
    async fn test_bulk_delete_partial_failure() {
        let gateway = FakeGateway::with_records(products(3)).failing(&["2"]);
        let (mut table, seen) = mutation_counter(table(products(3)));
        table.set_page_selected(true);

        let mut prompt = String::new();
        let report = table
            .bulk_delete(&gateway, |message| {
                prompt = message.to_string();
                true
            })
            .await
            .unwrap();

        assert_eq!(prompt, "Delete 3 items?");
        assert_eq!(report.deleted, vec![RecordId::from("1"), RecordId::from("3")]);
        assert_eq!(report.failed.len(), 1);
        assert!(table.selection().is_empty());
        assert_eq!(
            table.error(),
            Some("Failed to delete 1 of 3 items: 2: HTTP 404: Product not found")
        );
        assert_eq!(*seen.lock().unwrap(), vec!["products"]);

        let fresh = gateway.list(table.kind()).await.unwrap();
        table.set_records(fresh);
        assert_eq!(page_ids(&table), vec!["2"]);
    }

    #[tokio::test]
    async fn test_bulk_delete_declined_keeps_selection() {
        let gateway = FakeGateway::with_records(products(3));
        let mut table = table(products(3));
        table.set_row_selected(RecordId::from("1"), true);
        table.set_row_selected(RecordId::from("1"), true);

        assert!(table.bulk_delete(&gateway, |_| false).await.is_none());
        assert!(gateway.calls().is_empty());
        assert!(table.is_selected(&RecordId::from("1")));

        table.clear_error();
        table.toggle_row(RecordId::from("1"));
        assert!(table.bulk_delete(&gateway, |_| true).await.is_none());
    }

    #[tokio::test]
    async fn test_delete_row() {
        let gateway = FakeGateway::with_records(products(2)).failing(&["2"]);
        let (mut table, seen) = mutation_counter(table(products(2)));
        table.toggle_row(RecordId::from("1"));

        assert!(table.delete_row(&gateway, &RecordId::from("1")).await);
        assert!(table.selection().is_empty());
        assert_eq!(seen.lock().unwrap().len(), 1);

        assert!(!table.delete_row(&gateway, &RecordId::from("2")).await);
        assert_eq!(
            table.error(),
            Some("Failed to delete item: HTTP 404: Product not found")
        );
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_successful_retry_clears_error() {
        let flaky = FakeGateway::with_records(products(3)).failing(&["1", "2"]);
        let healthy = FakeGateway::with_records(products(3));
        let mut table = table(products(3));

        assert!(!table.delete_row(&flaky, &RecordId::from("1")).await);
        assert!(table.error().is_some());
        assert!(table.delete_row(&healthy, &RecordId::from("1")).await);
        assert_eq!(table.error(), None);

        table.set_row_selected(RecordId::from("2"), true);
        let report = table.bulk_delete(&flaky, |_| true).await.unwrap();
        assert_eq!(report.failed.len(), 1);
        assert!(table.error().is_some());

        table.set_row_selected(RecordId::from("2"), true);
        let report = table.bulk_delete(&healthy, |_| true).await.unwrap();
        assert!(report.failed.is_empty());
        assert_eq!(table.error(), None);
    }

    #[tokio::test]
    async fn test_declined_bulk_delete_keeps_error() {
        let flaky = FakeGateway::with_records(products(2)).failing(&["2"]);
        let mut table = table(products(2));
        assert!(!table.delete_row(&flaky, &RecordId::from("2")).await);

        table.set_row_selected(RecordId::from("1"), true);
        assert!(table.bulk_delete(&flaky, |_| false).await.is_none());
        assert_eq!(
            table.error(),
            Some("Failed to delete item: HTTP 404: Product not found")
        );
    }

    #[tokio::test]
    async fn test_custom_id_field() {
        let gateway = FakeGateway::default();
        let schema = EntitySchema::new(EntityKind::shops(), vec![ColumnSpec::text("shopName")])
            .with_id_field("sku");
        let mut table = CrudTable::new(
            schema,
            vec![
                Record::new().set("sku", "A-1").set("id", 1).set("shopName", "x"),
                Record::new().set("sku", "B-2").set("id", 2).set("shopName", "y"),
                Record::new().set("id", 3).set("shopName", "no sku"),
            ],
            TableConfig::default(),
        );

        table.set_page_selected(true);
        assert_eq!(page_ids(&table), vec!["A-1", "B-2"]);
        assert!(table.page_all_selected());
        assert!(!table.is_selected(&RecordId::from("1")));

        assert!(!table.open_edit(&RecordId::from("2")));
        assert!(table.open_edit(&RecordId::from("B-2")));
        assert_eq!(table.draft()["shopName"], "y");
        table.set_field("shopName", "z").unwrap();
        table.submit(&gateway).await.unwrap();

        table.bulk_delete(&gateway, |_| true).await.unwrap();
        assert_eq!(
            gateway.calls(),
            vec![
                r#"update shops B-2 {"shopName": "z"}"#,
                "delete shops A-1",
                "delete shops B-2",
            ]
        );
    }

    #[test]
    fn test_export_covers_filtered_rows() {
        let mut table = table(products(12));
        table.set_search_term("Item 1");
        table.toggle_sort("price").unwrap();
        table.toggle_sort("price").unwrap();
        let csv = table.export_csv();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], r#""Product Name","Description","Initial Stock","Price","Category""#);
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[1], r#""Item 12","","","120","""#);
        assert_eq!(
            table.csv_file_name(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()),
            "products_2024-05-01.csv"
        );
    }

    #[tokio::test]
    async fn test_import_creates_each_row() {
        let gateway = FakeGateway::default();
        let mut table = table(Vec::new());
        let report = table
            .import_csv(&gateway, "Product Name,price\nWidget,30\nGadget,12\n")
            .await
            .unwrap();
        assert_eq!(report.created.len(), 2);
        assert!(report.failed.is_empty());
        assert_eq!(gateway.calls().len(), 2);
        assert_eq!(table.error(), None);
        assert!(!table.modal().is_open());
    }

    #[tokio::test]
    async fn test_import_rejects_malformed_file() {
        let gateway = FakeGateway::default();
        let mut table = table(Vec::new());
        assert!(table.import_csv(&gateway, "colour\nred\n").await.is_none());
        assert!(gateway.calls().is_empty());
        assert_eq!(table.error(), Some("Unknown column 'colour' in header"));
    }

    #[tokio::test]
    async fn test_import_reports_failed_rows() {
        let gateway = FakeGateway {
            reject_writes: true,
            ..Default::default()
        };
        let mut table = table(Vec::new());
        let report = table
            .import_csv(&gateway, "product_name\nA\nB\n")
            .await
            .unwrap();
        assert!(report.created.is_empty());
        assert_eq!(report.failed.len(), 2);
        assert_eq!(
            table.error(),
            Some(
                "Failed to import 2 of 2 rows: row 1: HTTP 400: Missing required fields; \
                 row 2: HTTP 400: Missing required fields"
            )
        );
    }
}
