use std::num::NonZeroUsize;
use std::path::PathBuf;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use dashboard_lib::model::EntityKind;

/// Merchant dashboard tables from the command line
#[derive(Parser, Debug)]
#[command(name = "dashboard")]
#[command(about = "List, edit, export and import dashboard records", long_about = None)]
pub struct Cli {
    /// Backend URL (e.g., http://localhost:5000); overrides the stored setting
    #[arg(short = 'u', long = "url", env = "DASHBOARD_URL", global = true)]
    pub url: Option<String>,

    /// Bearer token; overrides the stored session
    #[arg(long = "token", env = "DASHBOARD_TOKEN", global = true, hide_env_values = true)]
    pub token: Option<String>,

    /// Log at debug level
    #[arg(short = 'v', long = "verbose", global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show or change stored settings
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
    /// Sign in and store the session token
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Forget the stored session token
    Logout,
    /// Print one page of a table
    List {
        kind: EntityKind,
        #[command(flatten)]
        view: ViewArgs,
        /// 1-based page number
        #[arg(long, default_value_t = 1)]
        page: usize,
    },
    /// Write the filtered rows to `{kind}_{YYYY-MM-DD}.csv`
    Export {
        kind: EntityKind,
        #[command(flatten)]
        view: ViewArgs,
        /// Directory to write into
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
    /// Create a record from FIELD=VALUE pairs
    Create {
        kind: EntityKind,
        #[arg(value_parser = parse_assignment, required = true)]
        fields: Vec<(String, String)>,
    },
    /// Update a record from FIELD=VALUE pairs
    Update {
        kind: EntityKind,
        id: String,
        #[arg(value_parser = parse_assignment, required = true)]
        fields: Vec<(String, String)>,
    },
    /// Delete one record
    Delete { kind: EntityKind, id: String },
    /// Delete several records after confirmation
    BulkDelete {
        kind: EntityKind,
        #[arg(required = true)]
        ids: Vec<String>,
        /// Skip the confirmation prompt
        #[arg(short = 'y', long = "yes", default_value_t = false)]
        yes: bool,
    },
    /// Create one record per row of a CSV file
    Import { kind: EntityKind, file: PathBuf },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    Show,
    SetUrl { url: String },
    SetPageSize { items_per_page: NonZeroUsize },
}

/// Search and sort shared by `list` and `export`.
#[derive(Args, Debug, Default)]
pub struct ViewArgs {
    /// Case-insensitive text filter over the displayed columns
    #[arg(short = 's', long)]
    pub search: Option<String>,
    /// Column to sort by
    #[arg(long)]
    pub sort: Option<String>,
    /// Sort descending
    #[arg(long, requires = "sort", default_value_t = false)]
    pub desc: bool,
}

fn parse_assignment(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((field, value)) if !field.trim().is_empty() => {
            Ok((field.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected FIELD=VALUE, got '{s}'")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_assignment() {
        assert_eq!(
            parse_assignment("product_name=Widget=XL"),
            Ok(("product_name".to_string(), "Widget=XL".to_string()))
        );
        assert_eq!(parse_assignment("price="), Ok(("price".to_string(), String::new())));
        assert!(parse_assignment("=1").is_err());
        assert!(parse_assignment("price").is_err());
    }

    #[test]
    fn test_parse_list_command() {
        let cli = Cli::try_parse_from([
            "dashboard", "list", "products", "--search", "widget", "--sort", "price", "--desc",
            "--page", "2",
        ])
        .unwrap();
        match cli.command {
            Command::List { kind, view, page } => {
                assert_eq!(kind, EntityKind::products());
                assert_eq!(view.search.as_deref(), Some("widget"));
                assert_eq!(view.sort.as_deref(), Some("price"));
                assert!(view.desc);
                assert_eq!(page, 2);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_rejects_bad_kind_and_desc_without_sort() {
        assert!(Cli::try_parse_from(["dashboard", "list", "../etc"]).is_err());
        assert!(Cli::try_parse_from(["dashboard", "list", "products", "--desc"]).is_err());
        assert!(Cli::try_parse_from(["dashboard", "create", "products"]).is_err());
    }

    #[test]
    fn test_parse_bulk_delete() {
        let cli =
            Cli::try_parse_from(["dashboard", "bulk-delete", "taxes", "1", "2", "--yes"]).unwrap();
        match cli.command {
            Command::BulkDelete { kind, ids, yes } => {
                assert_eq!(kind.as_str(), "taxes");
                assert_eq!(ids, vec!["1", "2"]);
                assert!(yes);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_login_takes_email() {
        let cli = Cli::try_parse_from([
            "dashboard", "login", "--email", "merchant@shop.io", "--password", "secret",
        ])
        .unwrap();
        match cli.command {
            Command::Login { email, password } => {
                assert_eq!(email, "merchant@shop.io");
                assert_eq!(password, "secret");
            }
            other => panic!("unexpected command: {other:?}"),
        }
        assert!(
            Cli::try_parse_from(["dashboard", "login", "--username", "m", "--password", "p"])
                .is_err()
        );
    }
}
