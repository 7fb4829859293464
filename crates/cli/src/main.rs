mod notifiers;

use anyhow::Context;
use clap::{Parser, Subcommand};
use notifiers::{LogNotifier, WebhookNotifier};
use serde::Deserialize;
use slotwatch_core::fetch::{FetchConfig, HttpSession};
use slotwatch_core::notify::FanOut;
use slotwatch_core::{Outcome, WizardConfig};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "slotwatch", about = "Checks the appointment wizard for free slots")]
struct Cli {
    /// Debug-level logging
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Log as JSON lines on stderr
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Walk the wizard once, notify, and print the outcome
    Check {
        /// JSON config file with `wizard`, `fetch` and `webhook` sections
        #[arg(long)]
        config: Option<String>,

        /// Substring of the office to select
        #[arg(long)]
        office: Option<String>,

        /// Substring of the appointment class to select
        #[arg(long)]
        calendar: Option<String>,

        /// First page of the wizard
        #[arg(long)]
        entry_url: Option<String>,

        /// Number of confirmation pages after the calendar
        #[arg(long)]
        confirm_steps: Option<usize>,

        /// Per-request timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,

        /// Webhook URL that receives the outcome as JSON
        #[arg(long)]
        webhook: Option<String>,

        /// Output the run report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the active form of a saved page (use - for stdin)
    Inspect {
        file: String,

        #[arg(long)]
        json: bool,
    },
    /// Classify a saved terminal page (use - for stdin)
    Classify {
        file: String,

        /// JSON config file; its `wizard.marker` section decides the classification
        #[arg(long)]
        config: Option<String>,

        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileConfig {
    wizard: WizardConfig,
    fetch: FetchConfig,
    webhook: Option<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.log_json);

    match execute(cli.command) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(1)
        }
    }
}

fn execute(command: Commands) -> anyhow::Result<ExitCode> {
    match command {
        Commands::Check {
            config,
            office,
            calendar,
            entry_url,
            confirm_steps,
            timeout,
            webhook,
            json,
        } => {
            let mut file = load_config(config.as_deref())?;
            if let Some(office) = office {
                file.wizard.office_match = office;
            }
            if let Some(calendar) = calendar {
                file.wizard.calendar_match = calendar;
            }
            if let Some(url) = entry_url {
                file.wizard.entry_url = Some(url);
            }
            if let Some(k) = confirm_steps {
                file.wizard.confirm_steps = k;
            }
            if let Some(secs) = timeout {
                file.fetch.timeout_secs = secs;
            }
            if webhook.is_some() {
                file.webhook = webhook;
            }

            let mut notifier = FanOut::new();
            notifier.push(Box::new(LogNotifier));
            if let Some(url) = &file.webhook {
                let hook = WebhookNotifier::new(url, file.fetch.timeout_secs)
                    .context("building webhook client")?;
                notifier.push(Box::new(hook));
            }

            let mut session = HttpSession::new(&file.wizard.origin, &file.fetch)
                .context("building HTTP session")?;
            let report = slotwatch_core::run_and_notify(&mut session, &file.wizard, &mut notifier);

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                for step in &report.steps {
                    println!(
                        "{:<10} {} {} {}",
                        step.step,
                        step.status,
                        step.method,
                        step.url
                    );
                }
                println!("---");
                println!("{}", report.outcome);
            }
            Ok(exit_code(&report.outcome))
        }
        Commands::Inspect { file, json } => {
            let html = read_input(&file)?;
            let page = slotwatch_core::parse(&html)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&page)?);
            } else {
                if let Some(title) = &page.title {
                    println!("title: {title}");
                }
                println!("action: {}", page.action);
                println!("method: {}", page.method);
                println!("fields: {}", page.fields.len());
                println!("---");
                for field in &page.fields {
                    println!("{:?} {}={:?}", field.kind, field.name, field.value);
                    for option in &field.options {
                        println!("    {:?} -> {:?}", option.text, option.payload_value());
                    }
                }
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Classify { file, config, json } => {
            let marker = load_config(config.as_deref())?.wizard.marker;
            let html = read_input(&file)?;
            let outcome = slotwatch_core::classify(&html, &marker);
            if json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                println!("{outcome}");
            }
            Ok(exit_code(&outcome))
        }
    }
}

/// 0 no slots, 2 possible slots, 3 wizard changed, 4 request failed. 1 is reserved for crashes.
fn exit_code(outcome: &Outcome) -> ExitCode {
    match outcome {
        Outcome::NoSlots => ExitCode::SUCCESS,
        Outcome::PossibleSlots { .. } => ExitCode::from(2),
        Outcome::StructuralFailure { .. } => ExitCode::from(3),
        Outcome::TransportFailure { .. } => ExitCode::from(4),
    }
}

fn load_config(path: Option<&str>) -> anyhow::Result<FileConfig> {
    let Some(path) = path else {
        return Ok(FileConfig::default());
    };
    let raw = std::fs::read_to_string(path).with_context(|| format!("reading config {path}"))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing config {path}"))
}

fn read_input(file: &str) -> anyhow::Result<String> {
    if file == "-" {
        use std::io::Read;
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("reading stdin")?;
        Ok(buf)
    } else {
        std::fs::read_to_string(file).with_context(|| format!("reading {file}"))
    }
}

fn init_logging(verbose: bool, json: bool) {
    let default = if verbose {
        "slotwatch=debug,slotwatch_core=debug"
    } else {
        "slotwatch=info,slotwatch_core=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
