use clap::{Parser, Subcommand};
use snafu::{ResultExt, Snafu};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

mod inspect;

/// Environment variable used to configure the log filter, takes precedence over `--log-level`.
const LOG_ENV_VAR: &str = "DUALFORM_LOG";

#[derive(Debug, Snafu)]
enum Error {
    #[snafu(display("failed to inspect {}", file.display()))]
    Inspect {
        source: inspect::Error,
        file: std::path::PathBuf,
    },

    #[snafu(display("failed to serialize JSON schema"))]
    SerializeSchema { source: serde_json::Error },
}

#[derive(Debug, Parser)]
#[command(
    name = "dualform",
    author,
    version,
    about = "Inspect configuration values that are written in a basic or an advanced shape"
)]
struct Cli {
    /// Default log level, used when DUALFORM_LOG is not set.
    #[arg(long, global = true, default_value_t = LevelFilter::WARN)]
    log_level: LevelFilter,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Report whether a value in a YAML or JSON document is a scalar, a sequence or a mapping.
    Inspect(inspect::InspectArguments),

    /// Print the JSON schema of the values understood by `inspect`.
    Schema,
}

#[snafu::report]
fn main() -> Result<(), Error> {
    let cli = Cli::parse();
    init_logging(cli.log_level);

    match cli.command {
        Command::Inspect(arguments) => {
            let output = inspect::run(&arguments).context(InspectSnafu {
                file: arguments.file.clone(),
            })?;
            print!("{output}");
        }
        Command::Schema => {
            let schema = schemars::schema_for!(inspect::Inspected);
            let schema = serde_json::to_string_pretty(&schema).context(SerializeSchemaSnafu)?;
            println!("{schema}");
        }
    }

    Ok(())
}

/// Installs a console subscriber writing to stderr, filtered by [`LOG_ENV_VAR`].
fn init_logging(default_level: LevelFilter) {
    let env_filter = EnvFilter::builder()
        .with_env_var(LOG_ENV_VAR)
        .with_default_directive(default_level.into())
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_filter(env_filter),
        )
        .init();
}
