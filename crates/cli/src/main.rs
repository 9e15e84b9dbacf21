//! Myaku CLI — build canonical search URLs, resolve search options for a
//! location, and inspect or edit remembered preferences.
//!
//! Usage:
//!   myaku url <QUERY> [--page N] [--conv hira|kata|none] [--match exact|starts|ends]
//!   myaku parse <LOCATION>
//!   myaku resolve <LOCATION> [--no-prefs]
//!   myaku prefs show
//!   myaku prefs set <KEY> <VALUE>

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use myaku_core::config::{load_config, FormConfig, CONFIG_FILE_NAME};
use myaku_core::location::query_descriptor_from_location;
use myaku_core::options::fill_defaults;
use myaku_core::query::validate_query_text;
use myaku_core::{
    build_search_url, FilePreferenceStore, Location, MemoryHistory, MemoryPreferenceStore, OptionKey,
    OptionValue, PreferenceStore, QueryDescriptor, SearchForm, SharedQuery, SparseSearchOptions,
};
use serde_json::json;

#[derive(Parser)]
#[command(name = "myaku", version, about = "Japanese dictionary search form tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (default: ./myaku.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the canonical search URL for a query
    Url {
        /// Search query (1 to 100 characters)
        query: String,

        /// Result page
        #[arg(long, short, default_value_t = 1)]
        page: u32,

        /// Kana conversion: hira, kata, or none
        #[arg(long)]
        conv: Option<String>,

        /// Match type: exact, starts, or ends
        #[arg(long = "match")]
        match_type: Option<String>,

        /// Prefix the URL with `base_url` from the config
        #[arg(long)]
        absolute: bool,
    },
    /// Decode a search location into its query, page, and options
    Parse {
        /// Location path with query string, e.g. "/search?q=...&p=2"
        location: String,
    },
    /// Resolve the options a search form would mount with at a location
    Resolve {
        /// Location path with query string, e.g. "/search?q=...&conv=kata"
        location: String,

        /// Ignore remembered preferences
        #[arg(long)]
        no_prefs: bool,
    },
    /// Inspect or edit remembered search options
    Prefs {
        #[command(subcommand)]
        action: PrefsAction,
    },
}

#[derive(Subcommand)]
enum PrefsAction {
    /// Print remembered options
    Show,
    /// Remember one option value
    Set {
        /// Option name: conv/kanaConvertType or match/matchType
        key: String,
        /// Option value, e.g. kata or starts
        value: String,
    },
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("Error: {message}");
    std::process::exit(1);
}

fn print_json(value: &impl serde::Serialize) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{s}"),
        Err(e) => fail(e),
    }
}

fn parse_option(key: OptionKey, raw: &str) -> OptionValue {
    OptionValue::parse(key, raw).unwrap_or_else(|| fail(format!("invalid value '{raw}' for {key}")))
}

fn preference_store(config: &FormConfig) -> Arc<dyn PreferenceStore> {
    match &config.preferences_file {
        Some(path) => Arc::new(FilePreferenceStore::new(path)),
        None => Arc::new(MemoryPreferenceStore::default()),
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("myaku_core=warn".parse().unwrap()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config_path = cli.config.clone().unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME));
    let config = load_config(&config_path);

    match cli.command {
        Commands::Url {
            query,
            page,
            conv,
            match_type,
            absolute,
        } => {
            if let Err(e) = validate_query_text(&query) {
                fail(e);
            }
            if page == 0 {
                fail("page must be 1 or greater");
            }
            let mut sparse = SparseSearchOptions::default();
            if let Some(raw) = conv {
                sparse.set(parse_option(OptionKey::KanaConvertType, &raw));
            }
            if let Some(raw) = match_type {
                sparse.set(parse_option(OptionKey::MatchType, &raw));
            }
            let url = build_search_url(&QueryDescriptor {
                text: query,
                page,
                options: fill_defaults(&sparse),
            });
            match (absolute, &config.base_url) {
                (true, Some(base)) => println!("{base}{url}"),
                (true, None) => fail(format!("--absolute needs base_url in {}", config_path.display())),
                (false, _) => println!("{url}"),
            }
        }

        Commands::Parse { location } => {
            let location = Location::parse(&location);
            match query_descriptor_from_location(&location) {
                Ok(descriptor) => print_json(&json!({
                    "query": descriptor.text,
                    "page": descriptor.page,
                    "options": descriptor.options,
                    "canonicalUrl": build_search_url(&descriptor),
                })),
                Err(e) => fail(e),
            }
        }

        Commands::Resolve { location, no_prefs } => {
            let store: Arc<dyn PreferenceStore> = if no_prefs {
                Arc::new(MemoryPreferenceStore::default())
            } else {
                preference_store(&config)
            };
            let history = MemoryHistory::new(&location);
            let mut form = SearchForm::mount(Arc::new(history), store, Arc::new(SharedQuery::default()));
            if let Some(load) = form.take_preference_load() {
                if let Err(e) = load.await {
                    fail(format!("preference load task failed: {e}"));
                }
            }
            let default_used: Vec<&str> = form.default_used().iter().map(|k| k.wire_name()).collect();
            print_json(&json!({
                "options": form.options(),
                "defaultUsed": default_used,
            }));
        }

        Commands::Prefs { action } => {
            let Some(path) = config.preferences_file.clone() else {
                fail(format!("no preferences_file set in {}", config_path.display()));
            };
            let store = FilePreferenceStore::new(path);
            match action {
                PrefsAction::Show => match store.load().await {
                    Ok(stored) => print_json(&stored),
                    Err(e) => fail(e),
                },
                PrefsAction::Set { key, value } => {
                    let key = OptionKey::from_name(&key).unwrap_or_else(|| {
                        fail(format!(
                            "unknown option '{key}' (known: {}, {})",
                            OptionKey::KanaConvertType,
                            OptionKey::MatchType
                        ))
                    });
                    let value = parse_option(key, &value);
                    if let Err(e) = store.save(value).await {
                        fail(e);
                    }
                    eprintln!("Saved {key} = {value} to {}", store.path().display());
                }
            }
        }
    }
}
