mod context;
mod key;
mod lookup;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "lotmark-cli")]
#[command(about = "Address resolution toolkit for the lotmark platform")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Manage the mapping-provider credential.
    Key {
        #[command(subcommand)]
        command: key::KeyCommand,
    },
    /// Fetch ranked location suggestions for a partial input.
    Suggest {
        #[arg(long, value_enum, default_value_t = KindArg::Address)]
        kind: KindArg,
        /// Restrict results to one two-letter country code.
        #[arg(long)]
        country: Option<String>,
        text: String,
    },
    /// Resolve an address or place id to coordinates with a confidence tier.
    Resolve {
        #[arg(long, conflicts_with_all = ["street", "city", "country"])]
        place_id: Option<String>,
        #[arg(long)]
        street: Option<String>,
        #[arg(long)]
        city: Option<String>,
        #[arg(long)]
        country: Option<String>,
    },
    /// Probe provider reachability and report readiness.
    Check,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum KindArg {
    Address,
    City,
    Country,
}

impl From<KindArg> for lotmark_places::LocationKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Address => Self::Address,
            KindArg::City => Self::City,
            KindArg::Country => Self::Country,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = lotmark_core::load_app_config_from_env()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Key { command } => key::run(&config, &command),
        Commands::Suggest {
            kind,
            country,
            text,
        } => lookup::suggest(&config, kind.into(), country, &text).await,
        Commands::Resolve {
            place_id,
            street,
            city,
            country,
        } => lookup::resolve(&config, place_id, street, city, country).await,
        Commands::Check => lookup::check(&config).await,
    }
}
