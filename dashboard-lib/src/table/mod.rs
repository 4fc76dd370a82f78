//! Headless CRUD table
//!
//! [`CrudTable`] owns the view state of one entity table (search term, sort,
//! page, selection, create/edit form) over a record collection supplied by
//! its owner, and issues gateway calls for mutations. It never patches the
//! collection itself: after a successful mutation it calls the `on_mutated`
//! hook and waits to be handed a fresh collection via
//! [`CrudTable::set_records`].

pub mod csv;
mod form;
mod selection;
mod state;
pub mod view;

pub use form::ModalState;
pub use selection::Selection;
pub use state::BulkDeleteReport;
pub use state::CrudTable;
pub use state::ImportReport;
pub use state::MutationHook;
pub use state::TableConfig;
pub use view::SortDirection;
