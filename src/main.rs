//! s3-tree terminal application
//!
//! Browse an S3-compatible store as a directory tree using saved
//! connection profiles.

mod shell;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use s3_tree::browser::Browser;
use s3_tree::s3::ProfileRegistry;
use s3_tree::settings::Settings;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Browse an S3-compatible object store as a directory tree
#[derive(Parser, Debug)]
#[command(name = "s3-tree", version, about, long_about = None)]
struct Cli {
    /// Directory holding `<name>.connection` profile records
    #[arg(long = "profiles-dir")]
    profiles_dir: Option<PathBuf>,

    /// Connect with this profile on startup
    #[arg(short = 'p', long = "profile")]
    profile: Option<String>,

    /// Bucket to open after connecting (defaults to the first one)
    #[arg(short = 'b', long = "bucket", requires = "profile")]
    bucket: Option<String>,

    /// Do not reconnect to the last used profile and bucket
    #[arg(long = "no-restore")]
    no_restore: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Log to stderr so shell output stays readable
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    tracing::info!("Starting s3-tree v{}", env!("CARGO_PKG_VERSION"));

    let registry = match cli.profiles_dir {
        Some(dir) => ProfileRegistry::new(dir),
        None => ProfileRegistry::open_default()?,
    };

    let settings = Settings::load().unwrap_or_else(|e| {
        tracing::warn!("Failed to load settings: {}", e);
        Settings::default()
    });

    let (profile, bucket) = if cli.profile.is_some() {
        (cli.profile, cli.bucket)
    } else if cli.no_restore {
        (None, None)
    } else {
        (settings.last_profile.clone(), settings.last_bucket.clone())
    };

    let mut shell = shell::Shell::new(Browser::new(registry), settings);

    if let Some(profile) = profile {
        shell.connect(&profile, bucket.as_deref()).await;
    }

    shell.run().await
}
