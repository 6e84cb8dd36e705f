// sitecontent command line.
// Operator entry point for reading, publishing and uploading site content.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use sitecontent::token::TokenStore;
use sitecontent::{
    AdminSession, ContentCache, ContentError, ContentFetcher, ContentKey, ContentWriter, GitHubClient,
    RepositoryConfig, Result, SiteConfig, UploadDir,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "sitecontent", version, about = "Read and publish website content")]
struct Cli {
    /// Configuration file (defaults to ./sitecontent.toml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the current content for a key (news, promotions, opening-hours)
    Get {
        key: ContentKey,
        /// Bypass the cache and any intermediary HTTP caches
        #[arg(long)]
        force: bool,
    },
    /// Publish a JSON file as the content for a key
    Put { key: ContentKey, file: PathBuf },
    /// Upload an image and print the URL to reference it by
    Upload {
        file: PathBuf,
        #[arg(long, default_value = "news", value_parser = parse_upload_dir)]
        subdir: UploadDir,
    },
    /// Manage the repository write token
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },
}

#[derive(Debug, Subcommand)]
enum TokenAction {
    /// Save a token; remembered on disk unless --no-remember
    Set {
        token: String,
        #[arg(long)]
        no_remember: bool,
    },
    /// Remove the remembered token
    Clear,
}

fn parse_upload_dir(value: &str) -> std::result::Result<UploadDir, String> {
    UploadDir::parse(value).ok_or_else(|| format!("unknown upload folder '{}'", value))
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            tracing::error!("{}", err);
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "sitecontent=info".into());
    let json = std::env::var("SITECONTENT_LOG_FORMAT").is_ok_and(|f| f == "json");

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    if let Command::Token { action } = &cli.command {
        return manage_token(action);
    }

    let config = SiteConfig::load(cli.config.as_deref())?;
    tracing::debug!(
        owner = %config.remote.owner,
        repo = %config.remote.repo,
        branch = %config.remote.branch,
        ttl_secs = config.cache.ttl_secs,
        "Configuration loaded"
    );

    let reader = GitHubClient::with_base_url(&config.remote.api_base, config.remote.target(), None)?;
    let cache = Arc::new(ContentCache::new(config.cache.ttl()));
    let fetcher = Arc::new(ContentFetcher::new(Arc::new(reader), cache, config.local.source()));

    match cli.command {
        Command::Get { key, force } => match fetcher.load_key(key, force).await {
            Some(data) => {
                println!("{}", serde_json::to_string_pretty(&data)?);
                Ok(ExitCode::SUCCESS)
            }
            None => {
                eprintln!("no data available for {}", key);
                Ok(ExitCode::FAILURE)
            }
        },
        Command::Put { key, file } => {
            let text = tokio::fs::read_to_string(&file).await?;
            let data: serde_json::Value = serde_json::from_str(&text)
                .map_err(|e| ContentError::Validation(format!("{} is not valid JSON: {}", file.display(), e)))?;

            let session = admin_session(&config, fetcher)?;
            let written = session.save_raw(key, &data).await?;
            println!("{}", written.sha().unwrap_or(&written.commit.sha));
            Ok(ExitCode::SUCCESS)
        }
        Command::Upload { file, subdir } => {
            let bytes = tokio::fs::read(&file).await?;
            let file_name = file
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("file")
                .to_string();

            let session = admin_session(&config, fetcher)?;
            let url = session.upload_image(&bytes, &file_name, subdir).await?;
            println!("{}", url);
            Ok(ExitCode::SUCCESS)
        }
        Command::Token { .. } => Ok(ExitCode::SUCCESS),
    }
}

/// Session with a writer when a token is available from config, env or the token store.
fn admin_session(config: &SiteConfig, fetcher: Arc<ContentFetcher>) -> Result<AdminSession> {
    let token = match config.token() {
        Some(token) => Some(token),
        None => TokenStore::new().load()?,
    };

    let writer = match RepositoryConfig::new(config.remote.target(), token.as_deref()) {
        Ok(repository) => Some(ContentWriter::for_repository(
            &repository,
            &config.remote.api_base,
            config.retry.policy(),
        )?),
        Err(err) => {
            tracing::warn!("Writes disabled: {}", err);
            None
        }
    };

    Ok(AdminSession::new(fetcher, writer, config.assets.url_strategy))
}

fn manage_token(action: &TokenAction) -> Result<ExitCode> {
    let mut store = TokenStore::new();
    match action {
        TokenAction::Set { token, no_remember } => {
            store.save(token, !no_remember)?;
            println!("Token saved");
        }
        TokenAction::Clear => {
            store.forget()?;
            println!("Token removed");
        }
    }
    Ok(ExitCode::SUCCESS)
}
