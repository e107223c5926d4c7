//! Movie Browser - headless front end
//!
//! Each invocation activates one screen, performs the requested step and
//! exits. The shared state is persisted between runs, so the home screen
//! remembers the last selected filter.
//!
//! # Usage
//!
//! ```sh
//! movie-browser login --username alice --password hunter222
//! movie-browser browse --filter TOP_RATED --page 2
//! movie-browser browse            # reuses the persisted filter
//! movie-browser support
//! movie-browser status
//! ```

use std::path::PathBuf;
use std::rc::Rc;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use movie_browser::catalog::DEFAULT_ENDPOINT;
use movie_browser::{
    AppContext, AppState, CatalogConfig, CatalogFetcher, Config, Filter, HttpTransport, Navigator,
    Route, StorageLocation,
};

/// Browse the TMDB movie catalog
#[derive(Parser, Debug)]
#[command(name = "movie-browser")]
#[command(about = "Browse the TMDB movie catalog from the terminal")]
struct Cli {
    /// Directory for the persisted snapshot (defaults to the platform data dir)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Keep state in memory only
    #[arg(long, global = true, conflicts_with = "data_dir")]
    ephemeral: bool,

    /// Catalog endpoint; the filter path is appended
    #[arg(long, global = true, default_value = DEFAULT_ENDPOINT)]
    endpoint: String,

    /// TMDB API key
    #[arg(long, global = true, env = "TMDB_API_KEY", default_value = "")]
    api_key: String,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate credentials and log in
    Login {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },
    /// Show one page of the catalog
    Browse {
        /// NOW_PLAYING, POPULAR, TOP_RATED or UPCOMING
        #[arg(long)]
        filter: Option<Filter>,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// Show the support topics
    Support,
    /// Show the persisted state
    Status,
}

impl Cli {
    fn config(&self) -> Config {
        let storage = match (&self.data_dir, self.ephemeral) {
            (_, true) => StorageLocation::Ephemeral,
            (Some(dir), false) => StorageLocation::Dir(dir.clone()),
            (None, false) => StorageLocation::DataDir,
        };
        Config {
            storage,
            catalog: CatalogConfig {
                endpoint: self.endpoint.clone(),
                api_key: self.api_key.clone(),
            },
            ..Default::default()
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = cli.config();
    let storage = config
        .open_storage()
        .context("failed to open snapshot storage")?;
    let ctx = Rc::new(AppContext::new(
        AppState::default(),
        storage,
        &config.storage_key,
    ));
    let mut nav = Navigator::new(
        Rc::clone(&ctx),
        CatalogFetcher::<HttpTransport>::http(config.catalog.clone()),
        config.app_name.clone(),
    );

    match cli.command {
        Command::Login { username, password } => {
            nav.navigate(Route::Login);
            let Some(login) = nav.login() else {
                anyhow::bail!("login screen did not activate");
            };
            if let Err(e) = login.submit(&username, &password) {
                anyhow::bail!("{e}");
            }
            println!("Logged in as {}", ctx.read().auth.username);
        }
        Command::Browse { filter, page } => {
            nav.navigate(Route::Home);
            let Some(home) = nav.home() else {
                anyhow::bail!("home screen did not activate");
            };
            home.set_page(page);
            let shown = match filter {
                Some(filter) => home.select_tab(filter).await,
                None => home.refresh().await,
            };
            if !shown {
                anyhow::bail!("could not load movies, please try again later");
            }

            if let Some(filter) = home.shown_filter() {
                println!("{} (page {})", filter.label(), home.page());
            }
            for movie in home.movies().unwrap_or_default() {
                let year = movie
                    .release_date
                    .as_deref()
                    .and_then(|date| date.get(..4))
                    .unwrap_or("----");
                println!("  {year}  {:>4.1}  {}", movie.vote_average, movie.title);
            }
        }
        Command::Support => {
            nav.navigate(Route::Support);
            let Some(support) = nav.support() else {
                anyhow::bail!("support screen did not activate");
            };
            for section in support.sections() {
                println!("{}", section.title);
                for entry in section.entries {
                    println!("  {}", entry.question);
                    println!("    {}", entry.answer);
                }
            }
        }
        Command::Status => {
            // Any active screen opens the gate and loads the snapshot
            nav.navigate(Route::Login);
            let state = ctx.read();
            let user = if state.is_logged_in() {
                state.auth.username.as_str()
            } else {
                "(not logged in)"
            };
            let filter = match state.browse.home_filter.as_str() {
                "" => "(none)",
                name => name,
            };
            println!("user:   {user}");
            println!("filter: {filter}");
        }
    }

    nav.leave();
    Ok(())
}
