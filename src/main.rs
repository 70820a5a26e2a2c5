use amplify_provider::error::format_error;
use amplify_provider::provider::{
    CreateParams, DeleteManyParams, DeleteParams, GetListParams, GetManyParams, GetManyReferenceParams,
    GetOneParams, Identifier, ListResult, Pagination, Record, Sort, SortOrder, UpdateManyParams, UpdateParams,
};
use amplify_provider::resource::Filter;
use amplify_provider::{Config, DataProvider};
use anyhow::{Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// CRUD operations against an AppSync-style GraphQL backend
#[derive(Parser, Debug)]
#[command(name = "amplify-provider", version, about, long_about = None)]
struct Args {
    /// Configuration file (defaults to <config_dir>/amplify-provider/config.yaml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off")]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

#[derive(ClapArgs, Debug)]
struct ListArgs {
    /// Filter object as JSON
    #[arg(long)]
    filter: Option<String>,

    /// Sort field (a query name enables sortDirection)
    #[arg(long)]
    sort_field: Option<String>,

    #[arg(long, value_enum, default_value = "asc")]
    order: Order,

    /// Page to print; earlier pages are fetched first to obtain its token
    #[arg(long, default_value_t = 1)]
    page: u32,

    #[arg(long, default_value_t = 10)]
    per_page: u32,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Order {
    Asc,
    Desc,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List one page of a resource
    List {
        resource: String,
        #[command(flatten)]
        list: ListArgs,
    },
    /// Get one record
    Get { resource: String, id: String },
    /// Get several records
    GetMany {
        resource: String,
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// List records related to another record
    GetManyReference {
        resource: String,
        /// Relation field, `fieldName` or `queryName.fieldName`
        #[arg(long)]
        target: String,
        /// Identifier of the owning record
        #[arg(long)]
        id: String,
        #[command(flatten)]
        list: ListArgs,
    },
    /// Create a record
    Create {
        resource: String,
        /// Record as JSON
        #[arg(long)]
        data: String,
    },
    /// Update a record
    Update {
        resource: String,
        id: String,
        #[arg(long)]
        data: String,
        /// Previous record as JSON
        #[arg(long)]
        previous: Option<String>,
    },
    /// Apply the same changes to several records
    UpdateMany {
        resource: String,
        #[arg(required = true)]
        ids: Vec<String>,
        #[arg(long)]
        data: String,
    },
    /// Delete a record
    Delete {
        resource: String,
        id: String,
        /// Previous record as JSON (carries `_version`)
        #[arg(long)]
        previous: Option<String>,
    },
    /// Delete several records
    DeleteMany {
        resource: String,
        #[arg(required = true)]
        ids: Vec<String>,
    },
}

fn setup_logging(level: LogLevel) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let tracing_level = level.to_tracing_level()?;

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = match std::fs::OpenOptions::new().create(true).append(true).open(&log_path) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Failed to open log file {}: {}", log_path.display(), e);
            return None;
        },
    };

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_max_level(tracing_level)
        .with_writer(non_blocking.with_max_level(tracing_level))
        .with_ansi(false)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("amplify-provider started with log level: {:?}", level);
    tracing::info!("Log file: {:?}", log_path);

    Some(guard)
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("amplify-provider").join("amplify-provider.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".amplify-provider").join("amplify-provider.log");
    }
    PathBuf::from("amplify-provider.log")
}

fn parse_record(raw: &str, what: &str) -> Result<Record> {
    serde_json::from_str(raw).with_context(|| format!("--{} must be a JSON object", what))
}

fn ids(raw: Vec<String>) -> Vec<Identifier> {
    raw.into_iter().map(Identifier::from).collect()
}

impl ListArgs {
    fn filter(&self) -> Result<Filter> {
        match &self.filter {
            Some(raw) => parse_record(raw, "filter"),
            None => Ok(Filter::new()),
        }
    }

    fn sort(&self) -> Option<Sort> {
        let order = match self.order {
            Order::Asc => SortOrder::Asc,
            Order::Desc => SortOrder::Desc,
        };
        self.sort_field.as_ref().map(|field| Sort::new(field.clone(), order))
    }
}

/// What a paged command lists
enum PageSource {
    List,
    Reference { target: String, id: Identifier },
}

/// Whether a page was the last one of its stream (no next-token sentinel in the total)
fn is_last_page(result: &ListResult, page: u32, per_page: u32) -> bool {
    result.total <= u64::from(page - 1) * u64::from(per_page) + result.data.len() as u64
}

/// Fetch pages 1..page in order so the token for `page` is known, then return it.
/// Empty pages with a next token are walked through, since filters apply after `limit`.
async fn walk_to_page(
    provider: &DataProvider,
    resource: &str,
    source: &PageSource,
    list: &ListArgs,
) -> Result<ListResult> {
    let page = list.page.max(1);
    let filter = list.filter()?;

    for current in 1..=page {
        let pagination = Pagination::new(current, list.per_page);
        let result = match source {
            PageSource::List => {
                let params = GetListParams {
                    pagination,
                    sort: list.sort(),
                    filter: filter.clone(),
                };
                provider.get_list(resource, params).await?
            },
            PageSource::Reference { target, id } => {
                let params = GetManyReferenceParams {
                    target: target.clone(),
                    id: id.clone(),
                    pagination,
                    sort: list.sort(),
                    filter: filter.clone(),
                };
                provider.get_many_reference(resource, params).await?
            },
        };

        if current == page {
            return Ok(result);
        }
        if is_last_page(&result, current, list.per_page) {
            tracing::info!("Stream ended at page {} before page {}", current, page);
            return Ok(ListResult::empty());
        }
    }

    Ok(ListResult::empty())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run(provider: &DataProvider, command: Command) -> Result<()> {
    match command {
        Command::List { resource, list } => {
            print_json(&walk_to_page(provider, &resource, &PageSource::List, &list).await?)
        },
        Command::Get { resource, id } => {
            print_json(&provider.get_one(&resource, GetOneParams { id: id.into() }).await?)
        },
        Command::GetMany { resource, ids: raw } => {
            print_json(&provider.get_many(&resource, GetManyParams { ids: ids(raw) }).await?)
        },
        Command::GetManyReference { resource, target, id, list } => {
            let source = PageSource::Reference {
                target,
                id: Identifier::from(id),
            };
            print_json(&walk_to_page(provider, &resource, &source, &list).await?)
        },
        Command::Create { resource, data } => {
            let data = parse_record(&data, "data")?;
            print_json(&provider.create(&resource, CreateParams { data }).await?)
        },
        Command::Update { resource, id, data, previous } => {
            let params = UpdateParams {
                id: id.into(),
                data: parse_record(&data, "data")?,
                previous_data: previous
                    .map(|raw| parse_record(&raw, "previous"))
                    .transpose()?
                    .unwrap_or_default(),
            };
            print_json(&provider.update(&resource, params).await?)
        },
        Command::UpdateMany { resource, ids: raw, data } => {
            let params = UpdateManyParams {
                ids: ids(raw),
                data: parse_record(&data, "data")?,
            };
            print_json(&provider.update_many(&resource, params).await?)
        },
        Command::Delete { resource, id, previous } => {
            let params = DeleteParams {
                id: id.into(),
                previous_data: previous
                    .map(|raw| parse_record(&raw, "previous"))
                    .transpose()?
                    .unwrap_or_default(),
            };
            print_json(&provider.delete(&resource, params).await?)
        },
        Command::DeleteMany { resource, ids: raw } => {
            print_json(&provider.delete_many(&resource, DeleteManyParams { ids: ids(raw) }).await?)
        },
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Keep the guard alive so buffered log lines are flushed on exit
    let _log_guard = setup_logging(args.log_level);

    let config = Config::load(args.config.as_deref())?;
    let provider = config.build_provider()?;

    if let Err(e) = run(&provider, args.command).await {
        tracing::error!("Command failed: {:#}", e);
        eprintln!("Error: {}", format_error(&e));
        std::process::exit(1);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use amplify_provider::provider::ProviderOptions;
    use amplify_provider::{Operations, Transport};
    use async_trait::async_trait;
    use serde_json::{json, Map, Value};
    use std::collections::{HashMap, VecDeque};
    use std::sync::{Arc, Mutex};

    /// Transport answering `listPosts` with queued pages
    #[derive(Default)]
    struct QueuedPages {
        pages: Mutex<VecDeque<Value>>,
        tokens_seen: Mutex<Vec<Value>>,
    }

    #[async_trait]
    impl Transport for QueuedPages {
        async fn execute(&self, _document: &str, variables: Value) -> amplify_provider::Result<Map<String, Value>> {
            self.tokens_seen.lock().unwrap().push(variables["nextToken"].clone());
            let page = self.pages.lock().unwrap().pop_front().unwrap_or(Value::Null);
            let mut data = Map::new();
            data.insert("listPosts".to_string(), page);
            Ok(data)
        }
    }

    fn provider(transport: Arc<QueuedPages>) -> DataProvider {
        let mut queries = HashMap::new();
        queries.insert("listPosts".to_string(), "query ListPosts".to_string());
        DataProvider::new(Operations::new(queries, HashMap::new()), transport, ProviderOptions::default())
    }

    fn list_args(page: u32, per_page: u32) -> ListArgs {
        ListArgs {
            filter: None,
            sort_field: None,
            order: Order::Asc,
            page,
            per_page,
        }
    }

    #[tokio::test]
    async fn test_walk_passes_sparse_pages() {
        let transport = Arc::new(QueuedPages::default());
        transport.pages.lock().unwrap().extend([
            json!({"items": [], "nextToken": "t2"}),
            json!({"items": [{"id": "p2"}], "nextToken": "t3"}),
            json!({"items": [{"id": "p3"}], "nextToken": null}),
        ]);
        let provider = provider(transport.clone());

        let result = walk_to_page(&provider, "posts", &PageSource::List, &list_args(3, 2))
            .await
            .unwrap();

        assert_eq!(result.data, vec![json!({"id": "p3"})]);
        assert_eq!(result.total, 5);
        assert_eq!(
            *transport.tokens_seen.lock().unwrap(),
            vec![Value::Null, json!("t2"), json!("t3")]
        );
    }

    #[tokio::test]
    async fn test_walk_stops_when_stream_ends() {
        let transport = Arc::new(QueuedPages::default());
        transport.pages.lock().unwrap().extend([
            json!({"items": [{"id": "p1"}, {"id": "p2"}], "nextToken": "t2"}),
            json!({"items": [{"id": "p3"}], "nextToken": null}),
        ]);
        let provider = provider(transport.clone());

        let result = walk_to_page(&provider, "posts", &PageSource::List, &list_args(4, 2))
            .await
            .unwrap();

        assert_eq!(result, ListResult::empty());
        assert_eq!(transport.tokens_seen.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_last_page_detection() {
        let full = ListResult {
            data: vec![json!({"id": 1}), json!({"id": 2})],
            total: 5,
        };
        assert!(!is_last_page(&full, 2, 2));

        let sparse = ListResult { data: vec![], total: 1 };
        assert!(!is_last_page(&sparse, 1, 2));

        let last = ListResult { data: vec![json!({"id": 5})], total: 5 };
        assert!(is_last_page(&last, 3, 2));
    }
}
