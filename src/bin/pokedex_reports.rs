use std::process::ExitCode;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use miette::IntoDiagnostic;
use serde_json::Value;
use tracing_subscriber::EnvFilter;

use pokedex_reports::app::{App, RunOptions};
use pokedex_reports::config::ConfigLoader;
use pokedex_reports::domain::{DetailFailurePolicy, ReportKind};
use pokedex_reports::error::PokedexError;
use pokedex_reports::output::{HumanOutput, JsonOutput, OutputMode};
use pokedex_reports::pokeapi::{PokeApiClient, PokeApiHttpClient};

#[derive(Parser)]
#[command(name = "pokedex-reports")]
#[command(about = "Fetch the PokeAPI catalog (cache-first) and write CSV reports")]
#[command(version)]
struct Cli {
    /// Print the run summary as JSON.
    #[arg(long, global = true)]
    json: bool,

    /// Config file (defaults to ./pokedex-reports.json when present).
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Fetch or load cached data and write reports (default)")]
    Run(RunArgs),
    #[command(about = "Show cache entries")]
    Status,
    #[command(about = "Delete the local cache")]
    Clear,
}

#[derive(Args, Clone, Default)]
struct RunArgs {
    /// Report to write; repeat for several. Defaults to all of them.
    #[arg(long = "report", value_enum)]
    reports: Vec<ReportKind>,

    /// Ignore cached data and fetch everything again.
    #[arg(long)]
    refresh: bool,

    /// Override the configured handling of entities whose details cannot be fetched.
    #[arg(long, value_enum)]
    on_detail_error: Option<DetailFailurePolicy>,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(error) = report.downcast_ref::<PokedexError>() {
            return ExitCode::from(map_exit_code(error));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &PokedexError) -> u8 {
    match error {
        _ if error.is_network() => 3,
        PokedexError::ConfigRead(_) | PokedexError::ConfigParse(_) => 2,
        _ => 1,
    }
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output_mode = if cli.json {
        OutputMode::Json
    } else {
        OutputMode::Human
    };
    let mut config = ConfigLoader::resolve(cli.config.as_deref())?;

    match cli.command.unwrap_or(Commands::Run(RunArgs::default())) {
        Commands::Run(args) => {
            if let Some(policy) = args.on_detail_error {
                config.on_detail_error = policy;
            }
            let timeout = config.request_timeout_secs.map(Duration::from_secs);
            let client = PokeApiHttpClient::new(timeout)?;
            run_reports(args, App::new(config, client), output_mode)
        }
        Commands::Status => run_status(App::new(config, NopPokeApi), output_mode),
        Commands::Clear => run_clear(App::new(config, NopPokeApi), output_mode),
    }
}

struct NopPokeApi;

impl PokeApiClient for NopPokeApi {
    fn fetch(&self, _url: &str) -> Result<Value, PokedexError> {
        Err(PokedexError::PokeApiHttp(
            "PokeAPI client not configured".to_string(),
        ))
    }
}

fn run_reports<C: PokeApiClient>(
    args: RunArgs,
    app: App<C>,
    output_mode: OutputMode,
) -> miette::Result<()> {
    let reports = if args.reports.is_empty() {
        ReportKind::ALL.to_vec()
    } else {
        args.reports
    };
    let result = app.run(RunOptions {
        reports,
        force_refresh: args.refresh,
    })?;

    match output_mode {
        OutputMode::Json => JsonOutput::print_run(&result).into_diagnostic(),
        OutputMode::Human => HumanOutput::print_run(&result).into_diagnostic(),
    }
}

fn run_status<C: PokeApiClient>(app: App<C>, output_mode: OutputMode) -> miette::Result<()> {
    let result = app.status();
    match output_mode {
        OutputMode::Json => JsonOutput::print_status(&result).into_diagnostic(),
        OutputMode::Human => HumanOutput::print_status(&result).into_diagnostic(),
    }
}

fn run_clear<C: PokeApiClient>(app: App<C>, output_mode: OutputMode) -> miette::Result<()> {
    let result = app.clear()?;
    match output_mode {
        OutputMode::Json => JsonOutput::print_clear(&result).into_diagnostic(),
        OutputMode::Human => HumanOutput::print_clear(&result).into_diagnostic(),
    }
}
