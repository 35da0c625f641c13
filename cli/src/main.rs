mod check;
mod firestore;
mod migrate;

use clap::{Args, Parser, Subcommand};

use crate::firestore::RestClient;
use crate::migrate::{Assignment, Summary, parse_assignment};

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("missing project id; pass --project or set EVALHUB_PROJECT_ID")]
    MissingProject,
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("document store returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("document decode failed: {0}")]
    Decode(#[from] schema::firestore::CodecError),
    #[error("unknown collection `{0}`")]
    UnknownCollection(String),
    #[error("{failed} of {attempted} patches failed")]
    PartialFailure { failed: usize, attempted: usize },
    #[error("deployment configuration is incomplete")]
    IncompleteConfig,
}

#[derive(Parser, Debug)]
#[command(name = "evalhub-cli", about = "EvalHub operator tools")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Document migrations.
    Migrate(MigrateCommand),
    /// Deployment checks.
    Config(ConfigCommand),
}

#[derive(Args, Debug)]
struct MigrateCommand {
    #[command(subcommand)]
    command: MigrateSubcommand,
}

#[derive(Subcommand, Debug)]
enum MigrateSubcommand {
    /// Set fields on every document of a collection where they are missing.
    Backfill(BackfillArgs),
}

#[derive(Args, Debug)]
struct BackfillArgs {
    #[arg(long, env = "EVALHUB_PROJECT_ID")]
    project: Option<String>,

    /// OAuth access token (`gcloud auth print-access-token`). The emulator
    /// accepts requests without one.
    #[arg(long, env = "EVALHUB_ACCESS_TOKEN", hide_env_values = true)]
    token: Option<String>,

    #[arg(long, env = "EVALHUB_FIRESTORE_API_BASE", default_value = schema::firestore::API_BASE)]
    api_base: String,

    #[arg(long)]
    collection: String,

    /// `field=value`; the value is JSON when it parses, a string otherwise.
    #[arg(long = "set", value_parser = parse_assignment, required = true)]
    assignments: Vec<Assignment>,

    /// Print the plan without writing.
    #[arg(long, default_value_t = false)]
    dry_run: bool,
}

#[derive(Args, Debug)]
struct ConfigCommand {
    #[command(subcommand)]
    command: ConfigSubcommand,
}

#[derive(Subcommand, Debug)]
enum ConfigSubcommand {
    /// Check that a deployment publishes every connection key.
    Check {
        #[arg(long)]
        url: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    match cli.command {
        Command::Migrate(migrate) => match migrate.command {
            MigrateSubcommand::Backfill(args) => run_backfill(args).await,
        },
        Command::Config(config) => match config.command {
            ConfigSubcommand::Check { url } => run_config_check(&url).await,
        },
    }
}

async fn run_backfill(args: BackfillArgs) -> Result<(), CliError> {
    let project = args.project.filter(|p| !p.trim().is_empty()).ok_or(CliError::MissingProject)?;
    let collection = schema::Collection::parse(&args.collection)
        .ok_or_else(|| CliError::UnknownCollection(args.collection.clone()))?;
    let client = RestClient::new(&args.api_base, &project, args.token);

    let mut summary = Summary::default();
    let mut failed = 0_usize;
    let mut page_token: Option<String> = None;
    loop {
        let (documents, next) = client.list_page(collection.as_str(), page_token.as_deref()).await?;
        for patch in summary.plan_page(&documents, &args.assignments) {
            let fields = serde_json::Value::Object(patch.fields.clone());
            if args.dry_run {
                println!("would patch {collection}/{}: {fields}", patch.id);
                continue;
            }
            match client.patch_fields(collection.as_str(), &patch.id, &patch.fields).await {
                Ok(()) => println!("patched {collection}/{}: {fields}", patch.id),
                Err(e) => {
                    failed += 1;
                    eprintln!("failed {collection}/{}: {e}", patch.id);
                }
            }
        }
        eprintln!("scanned {} documents", summary.scanned);
        match next {
            Some(token) => page_token = Some(token),
            None => break,
        }
    }

    let verb = if args.dry_run { "to patch" } else { "patched" };
    println!(
        "{collection}: {} scanned, {} {verb}, {} already up to date",
        summary.scanned, summary.patched, summary.up_to_date
    );
    if failed > 0 {
        return Err(CliError::PartialFailure { failed, attempted: summary.patched });
    }
    Ok(())
}

async fn run_config_check(url: &str) -> Result<(), CliError> {
    let report = check::run(url).await?;
    let names = |keys: &[schema::ConfigKey]| keys.iter().map(|k| k.json_name()).collect::<Vec<_>>().join(", ");

    if report.document_missing.is_empty() {
        println!("config.json: complete");
    } else {
        println!("config.json: missing {}", names(&report.document_missing));
    }
    if report.shell_missing.is_empty() {
        println!("shell meta tags: complete");
    } else {
        println!("shell meta tags: missing {}", names(&report.shell_missing));
    }
    if report.cacheable {
        eprintln!("warning: config.json is served without Cache-Control: no-store");
    }

    if report.is_usable() {
        println!("ok");
        Ok(())
    } else {
        Err(CliError::IncompleteConfig)
    }
}
