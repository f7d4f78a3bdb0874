//! CLI entry point for `bouncewatch`.

use std::path::{Path, PathBuf};

use clap::{CommandFactory, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

use bouncewatch::config::{Config, SearchConfig};
use bouncewatch::lookup::{self, LookupOutcome};
use bouncewatch::provider::{MandrillClient, ProviderClient, SearchWindow};
use bouncewatch::remediate::{self, BulkOutcome};
use bouncewatch::report;

#[derive(Parser)]
#[command(name = "bouncewatch", version)]
#[command(about = "Check delivery status of transactional email and fix deny-listed recipients")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Search window overrides shared by searching commands.
#[derive(clap::Args)]
struct WindowArgs {
    /// Days to look back (defaults from config)
    #[arg(short, long)]
    days: Option<u32>,

    /// Maximum number of messages to fetch (defaults from config, max 1000)
    #[arg(short, long)]
    limit: Option<u32>,
}

impl WindowArgs {
    fn window(&self, defaults: &SearchConfig) -> SearchWindow {
        SearchWindow::last_days(
            self.days.unwrap_or(defaults.lookback_days),
            self.limit.unwrap_or(defaults.limit),
        )
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Show delivery status of recent emails sent to an address
    Check {
        email: String,
        #[command(flatten)]
        window: WindowArgs,
        #[arg(long)]
        json: bool,
        /// Also write the messages to a CSV file
        #[arg(long, value_name = "PATH")]
        csv: Option<PathBuf>,
    },
    /// Remove an address from the provider deny list
    Unreject {
        email: String,
    },
    /// Remove every rejected recipient matching a query from the deny list
    UnrejectAll {
        query: String,
        #[command(flatten)]
        window: WindowArgs,
        /// List the addresses without removing them
        #[arg(long)]
        dry_run: bool,
        #[arg(long)]
        json: bool,
    },
    /// Show open/bounce/reject funnel for a campaign query
    Funnel {
        query: String,
        #[command(flatten)]
        window: WindowArgs,
        /// Number of bounce reasons to list
        #[arg(long, default_value = "5")]
        top: usize,
        #[arg(long)]
        json: bool,
    },
    /// Resend campaign emails that were never opened
    Resend {
        query: String,
        #[command(flatten)]
        window: WindowArgs,
        /// List the messages without resending them
        #[arg(long)]
        dry_run: bool,
        #[arg(long)]
        json: bool,
    },
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
    /// Generate a man page
    Manpage,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = bouncewatch::config::load_config();

    // Configure logging: stderr + optional log file
    let log_level = match cli.verbose {
        0 => config.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    setup_logging(log_level, &config);

    match cli.command {
        Commands::Completions { shell } => cmd_completions(shell),
        Commands::Manpage => cmd_manpage(),
        Commands::Check {
            email,
            window,
            json,
            csv,
        } => {
            let client = MandrillClient::new(&config.provider)?;
            let window = window.window(&config.search);
            cmd_check(&client, &config, &email, &window, json, csv.as_deref()).await
        }
        Commands::Unreject { email } => {
            let client = MandrillClient::new(&config.provider)?;
            cmd_unreject(&client, &email).await
        }
        Commands::UnrejectAll {
            query,
            window,
            dry_run,
            json,
        } => {
            let client = MandrillClient::new(&config.provider)?;
            let window = window.window(&config.funnel);
            cmd_unreject_all(&client, &query, &window, dry_run, json).await
        }
        Commands::Funnel {
            query,
            window,
            top,
            json,
        } => {
            let client = MandrillClient::new(&config.provider)?;
            let window = window.window(&config.funnel);
            cmd_funnel(&client, &query, &window, top, json).await
        }
        Commands::Resend {
            query,
            window,
            dry_run,
            json,
        } => {
            let client = MandrillClient::new(&config.provider)?;
            let window = window.window(&config.funnel);
            cmd_resend(&client, &query, &window, dry_run, json).await
        }
    }
}

/// Set up tracing with stderr output and optional file logging.
fn setup_logging(level: &str, config: &Config) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    // Try to set up file logging
    let log_dir = bouncewatch::config::cache_dir(config);
    if std::fs::create_dir_all(&log_dir).is_ok() {
        let file_appender = tracing_appender::rolling::never(&log_dir, "bouncewatch.log");
        let file_layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(file_appender);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .with(file_layer)
            .init();
    } else {
        // Fall back to stderr only
        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .init();
    }
}

/// Generate shell completions and print to stdout.
fn cmd_completions(shell: clap_complete::Shell) -> anyhow::Result<()> {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "bouncewatch", &mut std::io::stdout());
    Ok(())
}

/// Generate a man page and print to stdout.
fn cmd_manpage() -> anyhow::Result<()> {
    let cmd = Cli::command();
    let man = clap_mangen::Man::new(cmd);
    let mut buf = Vec::new();
    man.render(&mut buf)?;
    std::io::Write::write_all(&mut std::io::stdout(), &buf)?;
    Ok(())
}

/// Check recent messages for one address.
async fn cmd_check(
    client: &dyn ProviderClient,
    config: &Config,
    email: &str,
    window: &SearchWindow,
    json: bool,
    csv: Option<&Path>,
) -> anyhow::Result<()> {
    let spinner = spinner(&format!("Searching messages to {email}"));
    let outcome = lookup::check_address(client, email, window).await;
    spinner.finish_and_clear();
    let outcome = outcome?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report::json::lookup_json(&outcome))?
        );
    } else {
        print!(
            "{}",
            report::table::render_lookup(&outcome, &config.general.date_format)
        );
    }

    if let (Some(path), LookupOutcome::Found(found)) = (csv, &outcome) {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        report::csv::export_csv(found, path, &config.general.date_format)?;
        eprintln!("  Exported CSV to {}", path.display());
    }

    Ok(())
}

/// Remove a single address from the deny list.
async fn cmd_unreject(client: &dyn ProviderClient, email: &str) -> anyhow::Result<()> {
    if remediate::remove_from_deny_list(client, email).await? {
        println!("  {email} removed from the deny list.");
    } else {
        println!("  {email} was not on the deny list.");
    }
    Ok(())
}

/// Remove every remediable recipient of a query from the deny list.
async fn cmd_unreject_all(
    client: &dyn ProviderClient,
    query: &str,
    window: &SearchWindow,
    dry_run: bool,
    json: bool,
) -> anyhow::Result<()> {
    let spinner = spinner("Searching messages");
    let found = lookup::campaign_funnel(client, query, window).await;
    spinner.finish_and_clear();
    let (_, records) = found?;

    let targets = remediate::remediable_addresses(&records);
    if dry_run {
        println!("  {} address(es) would be removed:", targets.len());
        for email in &targets {
            println!("    {email}");
        }
        return Ok(());
    }

    let pb = progress_bar(targets.len(), "Removing");
    let outcome = remediate::bulk_remove(
        client,
        &records,
        Some(&|done, _total| pb.set_position(done as u64)),
    )
    .await;
    pb.finish_and_clear();

    finish_bulk("Deny-list removal", &outcome, json)
}

/// Show funnel metrics for a campaign query.
async fn cmd_funnel(
    client: &dyn ProviderClient,
    query: &str,
    window: &SearchWindow,
    top: usize,
    json: bool,
) -> anyhow::Result<()> {
    let spinner = spinner("Searching messages");
    let found = lookup::campaign_funnel(client, query, window).await;
    spinner.finish_and_clear();
    let (funnel, _) = found?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report::json::funnel_json(&funnel))?
        );
    } else {
        print!("{}", report::table::render_funnel(&funnel, top));
    }
    Ok(())
}

/// Resend unopened messages of a campaign query.
async fn cmd_resend(
    client: &dyn ProviderClient,
    query: &str,
    window: &SearchWindow,
    dry_run: bool,
    json: bool,
) -> anyhow::Result<()> {
    let spinner = spinner("Searching messages");
    let found = lookup::campaign_funnel(client, query, window).await;
    spinner.finish_and_clear();
    let (_, records) = found?;

    let targets = remediate::unopened_with_id(&records);
    if dry_run {
        println!("  {} unopened message(s) would be resent:", targets.len());
        for rec in &targets {
            println!(
                "    {}  {}  {}",
                rec.id,
                rec.to_email,
                rec.subject.as_deref().unwrap_or("")
            );
        }
        return Ok(());
    }

    let pb = progress_bar(targets.len(), "Resending");
    let outcome = remediate::resend_unopened(
        client,
        &records,
        Some(&|done, _total| pb.set_position(done as u64)),
    )
    .await;
    pb.finish_and_clear();

    finish_bulk("Resend", &outcome, json)
}

/// Print a bulk outcome and fail the process if any item failed.
fn finish_bulk(action: &str, outcome: &BulkOutcome, json: bool) -> anyhow::Result<()> {
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report::json::bulk_json(action, outcome))?
        );
    } else {
        print!("{}", report::table::render_bulk(action, outcome));
    }

    if !outcome.is_complete() {
        anyhow::bail!(
            "{action}: {} of {} item(s) failed",
            outcome.failed.len(),
            outcome.attempted
        );
    }
    Ok(())
}

fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .expect("valid template"),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn progress_bar(len: usize, verb: &str) -> ProgressBar {
    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(&format!(
                "{{spinner:.green}} {verb} [{{bar:40.cyan/blue}}] {{pos}}/{{len}}"
            ))
            .expect("valid template")
            .progress_chars("#>-"),
    );
    pb
}
