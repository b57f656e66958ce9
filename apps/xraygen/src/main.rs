use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::ffi::OsString;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use xraygen_browser::ChromeLauncher;
use xraygen_config::{AppConfig, Credentials, hosted_api_key};
use xraygen_create_jira::CreationJob;
use xraygen_engine::{Engine, Invocation, Mode, RunReport, SubprocessRunner, USAGE};
use xraygen_ingest_jira::JiraStoryFetcher;
use xraygen_llm::{LlmConfig, LlmTestGenerator};
use xraygen_logging::{LogFormat, LogLevel, LoggingConfig};
use xraygen_ports::TestGenerator;
use xraygen_schema::{ArtifactKind, GeneratedDocument, UserStory};
use xraygen_store::ArtifactStore;

#[derive(Parser, Debug)]
#[command(name = "xraygen")]
#[command(about = "Generate Xray tests from Jira user stories and create them in Jira.", long_about = None)]
struct Cli {
    /// Configuration file (defaults to ./config.json).
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Run the browser without a window.
    #[arg(long, global = true)]
    headless: bool,
    /// error, warn, info, debug or trace. RUST_LOG takes precedence.
    #[arg(long, global = true)]
    log_level: Option<String>,
    /// plain, compact or json.
    #[arg(long, global = true)]
    log_format: Option<String>,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// [FILE|JIRA] <ISSUE_KEY> [PROJECT_KEY]: fetch, generate and create.
    Generate {
        args: Vec<String>,
    },
    /// Create one kind of issue from a saved test document.
    Create {
        /// tests, test-sets, test-plans or test-executions
        #[arg(long)]
        kind: String,
        /// Path to the generated document.
        #[arg(long)]
        data: PathBuf,
        /// Jira project key.
        #[arg(long)]
        project: String,
    },
}

fn main() -> ExitCode {
    // A missing .env is fine.
    let _ = dotenvy::dotenv_override();
    let cli = Cli::parse();

    if let Err(e) = init_logging(&cli) {
        eprintln!("error: {e:#}");
        return ExitCode::FAILURE;
    }
    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(cli: &Cli) -> Result<()> {
    let mut logging = LoggingConfig::default().with_colors(std::io::stderr().is_terminal());
    if let Some(level) = &cli.log_level {
        logging = logging.with_level(level.parse::<LogLevel>()?);
    }
    if let Some(format) = &cli.log_format {
        logging = logging.with_format(format.parse::<LogFormat>()?);
    }
    xraygen_logging::init(&logging)
}

fn run(cli: Cli) -> Result<ExitCode> {
    let mut config = match &cli.config {
        Some(path) => xraygen_config::load_from(path),
        None => xraygen_config::load(),
    };
    if cli.headless {
        config.browser.headless = true;
    }

    match &cli.cmd {
        Command::Generate { args } => {
            let default_project = &config.jira.project_key_default;
            let invocation = match Invocation::parse(args.as_slice(), default_project) {
                Ok(invocation) => invocation,
                Err(e) => {
                    eprintln!("error: {e}\n\n{USAGE}");
                    return Ok(ExitCode::from(2));
                }
            };
            tracing::info!(
                mode = %invocation.mode,
                issue = %invocation.issue,
                project = %invocation.project_key,
                provider = %config.ai.provider,
                "starting"
            );
            let runner = SubprocessRunner::current_exe()?.with_global_args(child_args(&cli));
            let report = generate(&config, &invocation, &runner)?;
            print_report(&report);
            Ok(if report.is_success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Command::Create {
            kind,
            data,
            project,
        } => {
            let kind: ArtifactKind = kind.parse()?;
            create(&config, kind, data.clone(), project.clone())
        }
    }
}

fn generate(
    config: &AppConfig,
    invocation: &Invocation,
    runner: &SubprocessRunner,
) -> Result<RunReport> {
    // Both phases log in to Jira; fail before a browser opens.
    let credentials = Credentials::resolve(&config.jira)?;
    let api_key = if invocation.mode.generates() {
        hosted_api_key(&config.ai)?
    } else {
        None
    };

    let launcher = ChromeLauncher::from_config(&config.browser);
    let timeout = Duration::from_secs(config.browser.element_timeout_secs);
    let fetcher = JiraStoryFetcher::new(&launcher, config.jira.base_url.clone(), credentials)
        .with_login_timeout(timeout)
        .with_summary_timeout(timeout);
    let generator: Box<dyn TestGenerator> = if invocation.mode.generates() {
        Box::new(LlmTestGenerator::from_config(&LlmConfig::from_app(
            config, api_key,
        ))?)
    } else {
        Box::new(NoGeneration)
    };
    let store = ArtifactStore::new(&config.paths.projects_dir)?;

    Engine::new(&fetcher, generator.as_ref(), runner, &store).run(invocation)
}

/// Stands in for the generator in JIRA mode, which only replays a file.
struct NoGeneration;

impl TestGenerator for NoGeneration {
    fn generate(&self, _story: &UserStory) -> GeneratedDocument {
        GeneratedDocument::empty()
    }
}

fn create(
    config: &AppConfig,
    kind: ArtifactKind,
    data: PathBuf,
    project: String,
) -> Result<ExitCode> {
    let credentials = Credentials::resolve(&config.jira)?;
    let data = std::path::absolute(&data)
        .with_context(|| format!("invalid data path {}", data.display()))?;
    let launcher = ChromeLauncher::from_config(&config.browser);
    let job = CreationJob {
        launcher: &launcher,
        base_url: config.jira.base_url.clone(),
        credentials,
        element_timeout: Duration::from_secs(config.browser.element_timeout_secs),
        kind,
        data_path: data,
        project_key: project,
    };

    let report = job.run()?;
    for outcome in &report.outcomes {
        match (&outcome.created_key, &outcome.error) {
            (_, Some(error)) => println!("FAILED  {}: {error}", outcome.summary),
            (Some(key), None) => println!("{key}  {}", outcome.summary),
            (None, None) => println!("created  {}", outcome.summary),
        }
    }
    println!(
        "{}: {} created, {} failed",
        report.kind,
        report.outcomes.len() - report.failures(),
        report.failures()
    );
    Ok(if report.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Global flags forwarded to `create` child processes.
fn child_args(cli: &Cli) -> Vec<OsString> {
    let mut args = Vec::new();
    if let Some(path) = &cli.config {
        args.push("--config".into());
        args.push(path.clone().into_os_string());
    }
    if cli.headless {
        args.push("--headless".into());
    }
    if let Some(level) = &cli.log_level {
        args.push("--log-level".into());
        args.push(level.into());
    }
    if let Some(format) = &cli.log_format {
        args.push("--log-format".into());
        args.push(format.into());
    }
    args
}

fn print_report(report: &RunReport) {
    if let Some(generation) = &report.generation {
        match &generation.document_path {
            Some(path) => {
                println!("wrote:");
                println!("- {}", path.display());
                println!(
                    "  {} tests, {} test sets",
                    generation.tests, generation.test_sets
                );
            }
            None => println!("no tests generated for {}", generation.story.id),
        }
    }
    let saved = report
        .generation
        .as_ref()
        .is_some_and(|g| g.document_path.is_some());
    if report.invocation.mode == Mode::File && saved {
        println!("next:");
        println!(
            "  xraygen generate JIRA {} {}",
            report.story_id, report.invocation.project_key
        );
    }
    if let Some(creation) = &report.creation {
        for run in &creation.runs {
            let status = if run.output.success { "ok" } else { "FAILED" };
            println!("{}: {} records, {status}", run.kind, run.records);
        }
    }
}
