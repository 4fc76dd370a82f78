//! Command execution over the table protocol.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use dashboard_lib::DashboardClient;
use dashboard_lib::api::DataGateway;
use dashboard_lib::auth::PasswordLogin;
use dashboard_lib::error::AuthError;
use dashboard_lib::error::Error;
use dashboard_lib::error::ValidationError;
use dashboard_lib::model::EntityKind;
use dashboard_lib::model::EntitySchema;
use dashboard_lib::model::RecordId;
use dashboard_lib::table::CrudTable;
use dashboard_lib::table::TableConfig;
use thiserror::Error;

use crate::args::Cli;
use crate::args::Command;
use crate::args::ConfigCommand;
use crate::args::ViewArgs;
use crate::confirm;
use crate::render;
use crate::session::Session;
use crate::settings::SettingsError;
use crate::settings::SettingsProvider;

/// Failure of a CLI command; printed and mapped to exit code 1.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Dashboard(#[from] Error),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("settings: {0}")]
    Settings(#[from] SettingsError),

    #[error("{}: {source}", path.display())]
    File {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("No column set is known for '{0}'")]
    UnknownKind(EntityKind),

    #[error("Page {page} is out of range (1-{total})")]
    PageOutOfRange { page: usize, total: usize },

    #[error("No {kind} record with id {id}")]
    NotFound { kind: String, id: RecordId },

    /// The table's error banner after a failed interaction.
    #[error("{0}")]
    Table(String),
}

impl CliError {
    fn from_table(table: &CrudTable) -> Self {
        Self::Table(table.error().unwrap_or("request failed").to_string())
    }
}

pub async fn run(cli: Cli, settings: SettingsProvider) -> Result<(), CliError> {
    let session = Session::resolve(cli.url, cli.token, &settings).await?;

    match cli.command {
        Command::Config { command } => config(command, &session, &settings).await,
        Command::Login { email, password } => {
            let token = PasswordLogin::new(session.url(), &email, password)
                .authenticate()
                .await?;
            settings.set_token(&token.access_token).await?;
            log::info!("Signed in to {} as {}", session.url(), email);
            println!("Signed in as {email}");
            Ok(())
        }
        Command::Logout => {
            settings.clear_token().await?;
            println!("Signed out");
            Ok(())
        }
        Command::List { kind, view, page } => {
            let mut loaded = Loaded::open(&session, kind).await?;
            apply_view(&mut loaded.table, &view)?;
            if !loaded.table.go_to_page(page) {
                return Err(CliError::PageOutOfRange {
                    page,
                    total: loaded.table.total_pages(),
                });
            }
            println!("{}", render::page(&loaded.table));
            Ok(())
        }
        Command::Export { kind, view, out } => {
            let mut loaded = Loaded::open(&session, kind).await?;
            apply_view(&mut loaded.table, &view)?;
            let name = loaded
                .table
                .csv_file_name(chrono::Utc::now().date_naive());
            let path = out.join(name);
            tokio::fs::write(&path, loaded.table.export_csv())
                .await
                .map_err(|source| CliError::File {
                    path: path.clone(),
                    source,
                })?;
            log::info!("Exported {} to {}", loaded.table.kind(), path.display());
            println!(
                "Wrote {} rows to {}",
                loaded.table.filtered().len(),
                path.display()
            );
            Ok(())
        }
        Command::Create { kind, fields } => {
            let mut loaded = Loaded::open(&session, kind).await?;
            loaded.table.open_create();
            for (field, value) in fields {
                loaded.table.set_field(&field, value)?;
            }
            let created = loaded
                .table
                .submit(&loaded.client)
                .await
                .ok_or_else(|| CliError::from_table(&loaded.table))?;
            let id_field = loaded.table.schema().id_field();
            println!(
                "Created {} {}",
                loaded.table.kind().singular(),
                created.display(id_field)
            );
            loaded.refresh().await?;
            println!("{}", render::page(&loaded.table));
            Ok(())
        }
        Command::Update { kind, id, fields } => {
            let mut loaded = Loaded::open(&session, kind).await?;
            let id = RecordId::new(id);
            if !loaded.table.open_edit(&id) {
                return Err(CliError::NotFound {
                    kind: loaded.table.kind().singular().to_string(),
                    id,
                });
            }
            for (field, value) in fields {
                loaded.table.set_field(&field, value)?;
            }
            loaded
                .table
                .submit(&loaded.client)
                .await
                .ok_or_else(|| CliError::from_table(&loaded.table))?;
            println!("Updated {} {}", loaded.table.kind().singular(), id);
            loaded.refresh().await?;
            println!("{}", render::page(&loaded.table));
            Ok(())
        }
        Command::Delete { kind, id } => {
            let mut loaded = Loaded::open(&session, kind).await?;
            let id = RecordId::new(id);
            if !loaded.table.delete_row(&loaded.client, &id).await {
                return Err(CliError::from_table(&loaded.table));
            }
            println!("Deleted {} {}", loaded.table.kind().singular(), id);
            loaded.refresh().await
        }
        Command::BulkDelete { kind, ids, yes } => {
            let mut loaded = Loaded::open(&session, kind).await?;
            for id in ids {
                loaded.table.set_row_selected(RecordId::new(id), true);
            }
            let report = loaded
                .table
                .bulk_delete(&loaded.client, |prompt| yes || confirm::ask(prompt))
                .await;
            let Some(report) = report else {
                println!("Cancelled");
                return Ok(());
            };
            println!("Deleted {} of {} items", report.deleted.len(), report.total());
            loaded.refresh().await?;
            match loaded.table.error() {
                Some(_) => Err(CliError::from_table(&loaded.table)),
                None => Ok(()),
            }
        }
        Command::Import { kind, file } => {
            let text = tokio::fs::read_to_string(&file)
                .await
                .map_err(|source| CliError::File {
                    path: file.clone(),
                    source,
                })?;
            let mut loaded = Loaded::open(&session, kind).await?;
            let report = loaded
                .table
                .import_csv(&loaded.client, &text)
                .await
                .ok_or_else(|| CliError::from_table(&loaded.table))?;
            println!(
                "Imported {} of {} rows",
                report.created.len(),
                report.created.len() + report.failed.len()
            );
            loaded.refresh().await?;
            match loaded.table.error() {
                Some(_) => Err(CliError::from_table(&loaded.table)),
                None => Ok(()),
            }
        }
    }
}

async fn config(
    command: ConfigCommand,
    session: &Session,
    settings: &SettingsProvider,
) -> Result<(), CliError> {
    match command {
        ConfigCommand::Show => {
            println!("url:            {}", session.url());
            println!(
                "session:        {}",
                if session.is_signed_in() { "signed in" } else { "not signed in" }
            );
            println!(
                "items per page: {}",
                session.table_config().items_per_page
            );
            let stored = settings.stored_keys().await?;
            if !stored.is_empty() {
                println!("stored:         {}", stored.join(", "));
            }
        }
        ConfigCommand::SetUrl { url } => {
            // Reject what the client would reject later.
            Session::resolve(Some(url.clone()), None, settings)
                .await?
                .client()?;
            settings.set_api_url(&url).await?;
            println!("url set to {url}");
        }
        ConfigCommand::SetPageSize { items_per_page } => {
            settings.set_items_per_page(items_per_page).await?;
            println!("items per page set to {items_per_page}");
        }
    }
    Ok(())
}

fn apply_view(table: &mut CrudTable, view: &ViewArgs) -> Result<(), CliError> {
    if let Some(term) = &view.search {
        table.set_search_term(term.as_str());
    }
    if let Some(column) = &view.sort {
        table.toggle_sort(column)?;
        if view.desc {
            table.toggle_sort(column)?;
        }
    }
    Ok(())
}

/// A table loaded from the backend, refreshed by its owner after mutations.
struct Loaded<G = DashboardClient> {
    client: G,
    table: CrudTable,
    stale: Arc<AtomicBool>,
}

impl Loaded {
    async fn open(session: &Session, kind: EntityKind) -> Result<Self, CliError> {
        let client = session.client()?;
        Loaded::load(client, kind, session.table_config()).await
    }
}

impl<G: DataGateway> Loaded<G> {
    async fn load(client: G, kind: EntityKind, config: TableConfig) -> Result<Self, CliError> {
        let schema = EntitySchema::preset(&kind).ok_or(CliError::UnknownKind(kind))?;
        let records = client.list(schema.kind()).await?;
        log::debug!("Loaded {} {}", records.len(), schema.kind());

        let stale = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stale);
        let table = CrudTable::new(schema, records, config).with_on_mutated(move |kind| {
            log::debug!("{} changed, refresh pending", kind);
            flag.store(true, Ordering::SeqCst);
        });

        Ok(Self {
            client,
            table,
            stale,
        })
    }

    /// Re-fetches the collection if a mutation went through.
    async fn refresh(&mut self) -> Result<(), CliError> {
        if self.stale.swap(false, Ordering::SeqCst) {
            let records = self.client.list(self.table.kind()).await?;
            self.table.set_records(records);
        }
        Ok(())
    }
}
