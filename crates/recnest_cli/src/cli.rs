//! Command tree and handlers.
//!
//! Handlers are thin: build the service, call one core operation, render the
//! result as JSON. All invariants live in `recnest_core`.

use clap::{ArgAction, Args, Parser, Subcommand};
use recnest_core::db::migrations::{current_version, latest_version};
use recnest_core::{
    AccessionService, AssociationService, CollectionService, MintAccession, SqliteAccessionRepository,
    SqliteCollectionRepository, SqliteMembershipRepository, StoreConfig, StoreError,
    INITIAL_CURSOR,
};
use rusqlite::Connection;
use serde_json::{json, Value};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "recnest",
    version,
    about = "Collections and accession records over a local SQLite store",
    arg_required_else_help = true
)]
pub struct Cli {
    /// TOML config file (default: $RECNEST_CONFIG).
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// SQLite database file; overrides `db_path` from config.
    #[arg(long, global = true, value_name = "PATH")]
    pub db: Option<PathBuf>,

    /// Raise log verbosity above the configured level (repeat for more).
    #[arg(short = 'v', long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show core version, schema version and effective configuration.
    Info,
    /// Collection operations.
    #[command(subcommand, alias = "c")]
    Collection(CollectionCommand),
    /// Accession record operations.
    #[command(subcommand, alias = "a")]
    Accession(AccessionCommand),
}

#[derive(Subcommand, Debug)]
pub enum CollectionCommand {
    /// Mint a new collection.
    Mint {
        id: String,
        name: String,
        #[arg(long)]
        note: Option<String>,
    },
    /// Show one collection with its accession ids.
    Get { id: String },
    /// Replace a collection's name.
    Rename { id: String, name: String },
    /// Replace a collection's note.
    Note { id: String, note: String },
    /// Remove a collection (succeeds if already absent).
    Rm { id: String },
    /// Report whether a collection exists.
    Exists { id: String },
    /// List collections in ascending id order.
    Ls(ListArgs),
    /// List accession ids associated with a collection.
    Members { id: String },
    /// Associate an accession id with a collection.
    Link { id: String, accession_id: String },
    /// Remove every association of an accession id from a collection.
    Unlink { id: String, accession_id: String },
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Offset cursor returned as `next_cursor` by the previous page.
    #[arg(long, default_value = INITIAL_CURSOR, conflicts_with = "after")]
    pub cursor: String,
    /// Page size; capped at the configured `max_limit`.
    #[arg(long)]
    pub limit: Option<u32>,
    /// Keyset mode: list collections with id after this one.
    #[arg(long)]
    pub after: Option<String>,
    /// Keyset mode starting from the first collection.
    #[arg(long, conflicts_with_all = ["after", "cursor"])]
    pub keyset: bool,
}

#[derive(Subcommand, Debug)]
pub enum AccessionCommand {
    /// Mint a new accession record.
    Mint {
        id: String,
        /// Associate the new record with this collection.
        #[arg(long, value_name = "COLLECTION_ID")]
        collection: Option<String>,
        #[arg(long)]
        note: Option<String>,
        /// Linked accession id (not required to exist).
        #[arg(long, value_name = "ACCESSION_ID")]
        linked: Option<String>,
        /// External identifier; repeat to add several in order.
        #[arg(long = "external-id", value_name = "EXTERNAL_ID")]
        external_ids: Vec<String>,
    },
    /// Show one accession record.
    Get { id: String },
    /// Replace an accession record's note.
    Note { id: String, note: String },
    /// Set the linked accession id.
    Link { id: String, linked: String },
    /// Clear the linked accession id.
    UnlinkLinked { id: String },
    /// Append an external identifier.
    AddExternal { id: String, external_id: String },
    /// Remove an accession record (succeeds if already absent).
    Rm { id: String },
    /// Report whether an accession record exists.
    Exists { id: String },
}

/// Runs one command against `conn` and returns the JSON response body.
pub fn run(command: Command, conn: &Connection, config: &StoreConfig) -> Result<Value, StoreError> {
    match command {
        Command::Info => Ok(info(Some(conn), config)),
        Command::Collection(command) => run_collection(command, conn, config),
        Command::Accession(command) => run_accession(command, conn),
    }
}

/// Version and configuration report; `conn` is `None` when the store file
/// does not exist yet.
pub fn info(conn: Option<&Connection>, config: &StoreConfig) -> Value {
    json!({
        "core_version": recnest_core::core_version(),
        "schema_version": conn.and_then(|conn| current_version(conn).ok()),
        "latest_schema_version": latest_version(),
        "config": config,
    })
}

fn run_collection(
    command: CollectionCommand,
    conn: &Connection,
    config: &StoreConfig,
) -> Result<Value, StoreError> {
    let collections =
        CollectionService::with_config(SqliteCollectionRepository::try_new(conn)?, config);
    let associations = AssociationService::new(SqliteMembershipRepository::try_new(conn)?);

    let value = match command {
        CollectionCommand::Mint { id, name, note } => {
            json!({ "minted": collections.mint_collection(id, name, note)? })
        }
        CollectionCommand::Get { id } => json!(collections.get_collection(&id)?),
        CollectionCommand::Rename { id, name } => {
            collections.edit_collection_name(&id, &name)?;
            json!({ "updated": id })
        }
        CollectionCommand::Note { id, note } => {
            collections.edit_collection_note(&id, &note)?;
            json!({ "updated": id })
        }
        CollectionCommand::Rm { id } => {
            json!({ "deleted": true, "id": collections.remove_collection(&id)? })
        }
        CollectionCommand::Exists { id } => {
            json!({ "id": id, "exists": collections.collection_exists(&id)? })
        }
        CollectionCommand::Ls(args) => {
            if args.keyset || args.after.is_some() {
                json!(collections.list_collections_after(args.after.as_deref(), args.limit)?)
            } else {
                json!(collections.list_collections(&args.cursor, args.limit)?)
            }
        }
        CollectionCommand::Members { id } => {
            json!({ "id": id, "accession_ids": associations.list_associated(&id)? })
        }
        CollectionCommand::Link { id, accession_id } => {
            associations.associate(&id, &accession_id)?;
            json!({ "id": id, "associated": accession_id })
        }
        CollectionCommand::Unlink { id, accession_id } => {
            let removed = associations.deassociate(&id, &accession_id)?;
            json!({ "id": id, "deassociated": accession_id, "removed": removed })
        }
    };
    Ok(value)
}

fn run_accession(command: AccessionCommand, conn: &Connection) -> Result<Value, StoreError> {
    let accessions = AccessionService::new(SqliteAccessionRepository::try_new(conn)?);

    let value = match command {
        AccessionCommand::Mint {
            id,
            collection,
            note,
            linked,
            external_ids,
        } => {
            let request = MintAccession {
                id,
                note,
                linked_accession_id: linked,
                external_ids,
                collection_id: collection,
            };
            json!({ "minted": accessions.mint_accession(request)? })
        }
        AccessionCommand::Get { id } => json!(accessions.get_accession(&id)?),
        AccessionCommand::Note { id, note } => {
            accessions.edit_accession_note(&id, &note)?;
            json!({ "updated": id })
        }
        AccessionCommand::Link { id, linked } => {
            accessions.edit_accession_linked_id(&id, Some(&linked))?;
            json!({ "updated": id })
        }
        AccessionCommand::UnlinkLinked { id } => {
            accessions.edit_accession_linked_id(&id, None)?;
            json!({ "updated": id })
        }
        AccessionCommand::AddExternal { id, external_id } => {
            accessions.add_accession_external_id(&id, &external_id)?;
            json!({ "updated": id })
        }
        AccessionCommand::Rm { id } => {
            json!({ "deleted": true, "id": accessions.remove_accession(&id)? })
        }
        AccessionCommand::Exists { id } => {
            json!({ "id": id, "exists": accessions.accession_exists(&id)? })
        }
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::{run, Cli, Command};
    use clap::{CommandFactory, Parser};
    use recnest_core::db::open_db_in_memory;
    use recnest_core::{StoreConfig, StoreErrorKind};

    fn exec(conn: &rusqlite::Connection, args: &[&str]) -> Result<serde_json::Value, StoreErrorKind> {
        let cli = Cli::try_parse_from(std::iter::once("recnest").chain(args.iter().copied()))
            .expect("arguments should parse");
        run(cli.command, conn, &StoreConfig::default()).map_err(|err| err.kind())
    }

    #[test]
    fn command_tree_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn mint_link_and_list_through_commands() {
        let conn = open_db_in_memory().unwrap();

        exec(&conn, &["collection", "mint", "C1", "Books"]).unwrap();
        exec(
            &conn,
            &["accession", "mint", "A1", "--collection", "C1", "--external-id", "x:1"],
        )
        .unwrap();

        let members = exec(&conn, &["collection", "members", "C1"]).unwrap();
        assert_eq!(members["accession_ids"], serde_json::json!(["A1"]));

        let page = exec(&conn, &["c", "ls", "--limit", "1"]).unwrap();
        assert_eq!(page["items"][0]["id"], "C1");
        assert!(page["next_cursor"].is_null());

        let record = exec(&conn, &["a", "get", "A1"]).unwrap();
        assert_eq!(record["external_ids"], serde_json::json!(["x:1"]));

        exec(&conn, &["accession", "link", "A1", "A0"]).unwrap();
        exec(&conn, &["accession", "unlink-linked", "A1"]).unwrap();
        let record = exec(&conn, &["a", "get", "A1"]).unwrap();
        assert!(record["linked_accession_id"].is_null());
    }

    #[test]
    fn errors_surface_their_kind() {
        let conn = open_db_in_memory().unwrap();

        exec(&conn, &["collection", "mint", "C1", "Books"]).unwrap();
        assert_eq!(
            exec(&conn, &["collection", "mint", "C1", "Again"]).unwrap_err(),
            StoreErrorKind::AlreadyExists
        );
        assert_eq!(
            exec(&conn, &["accession", "mint", "A2", "--collection", "C-missing"]).unwrap_err(),
            StoreErrorKind::NotFound
        );
        assert_eq!(
            exec(&conn, &["collection", "ls", "--cursor", "abc"]).unwrap_err(),
            StoreErrorKind::InvalidArgument
        );
    }

    #[test]
    fn info_reports_schema_version() {
        let conn = open_db_in_memory().unwrap();
        let value = run(Command::Info, &conn, &StoreConfig::default()).unwrap();
        assert_eq!(value["schema_version"], value["latest_schema_version"]);
        assert_eq!(value["config"]["max_limit"], 1000);
    }

    #[test]
    fn info_without_store_leaves_schema_version_empty() {
        let value = super::info(None, &StoreConfig::default());
        assert!(value["schema_version"].is_null());
        assert!(value["latest_schema_version"].as_u64().unwrap() >= 2);
    }
}
