//! DataGateway trait

use async_trait::async_trait;

use crate::error::Error;
use crate::model::EntityKind;
use crate::model::FieldMap;
use crate::model::Record;
use crate::model::RecordId;

/// List/create/update/delete capability over one backend.
///
/// Every call is a single attempt. Any non-success outcome is an [`Error`]
/// whose `Display` is the human-readable message shown to the user.
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use dashboard_lib::api::DataGateway;
///
/// struct Offline;
///
/// #[async_trait]
/// impl DataGateway for Offline {
///     async fn list(&self, _kind: &EntityKind) -> Result<Vec<Record>, Error> {
///         Ok(Vec::new())
///     }
///     // ...
/// }
/// ```
#[async_trait]
pub trait DataGateway: Send + Sync {
    /// Fetches the full collection for an entity kind.
    async fn list(&self, kind: &EntityKind) -> Result<Vec<Record>, Error>;

    /// Creates a record from form fields and returns it with its identifier.
    async fn create(&self, kind: &EntityKind, fields: &FieldMap) -> Result<Record, Error>;

    /// Updates the record `id` from form fields and returns the stored record.
    async fn update(
        &self,
        kind: &EntityKind,
        id: &RecordId,
        fields: &FieldMap,
    ) -> Result<Record, Error>;

    /// Deletes the record `id`.
    async fn delete(&self, kind: &EntityKind, id: &RecordId) -> Result<(), Error>;
}
