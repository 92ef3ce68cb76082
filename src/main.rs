// Main CLI entry point for csrfprobe
// Uses clap for argument parsing and hands the five audit phases to the pipeline

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Arg, ArgMatches, Command};
use csrfprobe::config::{RequestConfig, DEFAULT_LEVEL, DEFAULT_THREADS, DEFAULT_TIMEOUT_SECS};
use csrfprobe::engine::{HttpEngine, Requester};
use csrfprobe::errors::AuditResult;
use csrfprobe::headers::extract_headers;
use csrfprobe::pipeline::{run_audit, AuditOptions, ReportRow};
use csrfprobe::reporting::{export_csv, export_markdown};
use csrfprobe::signatures::SignatureDb;
use tracing_subscriber::EnvFilter;

struct Options {
    target: String,
    threads: usize,
    level: usize,
    delay: Duration,
    timeout: Duration,
    interactive_headers: bool,
    hash_db: Option<PathBuf>,
    csv_report: bool,
    markdown_report: bool,
    output_dir: PathBuf,
}

impl Options {
    fn from_matches(matches: &ArgMatches) -> Self {
        Self {
            target: matches.get_one::<String>("url").cloned().unwrap_or_default(),
            threads: matches.get_one::<usize>("threads").copied().unwrap_or(DEFAULT_THREADS),
            level: matches.get_one::<usize>("level").copied().unwrap_or(DEFAULT_LEVEL),
            delay: Duration::from_secs(matches.get_one::<u64>("delay").copied().unwrap_or(0)),
            timeout: Duration::from_secs(
                matches.get_one::<u64>("timeout").copied().unwrap_or(DEFAULT_TIMEOUT_SECS),
            ),
            interactive_headers: matches.get_flag("headers"),
            hash_db: matches.get_one::<String>("hash_db").map(PathBuf::from),
            csv_report: matches.get_flag("csv_report"),
            markdown_report: matches.get_flag("markdown_report"),
            output_dir: matches
                .get_one::<String>("output_dir")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".")),
        }
    }
}

fn cli() -> Command {
    Command::new("csrfprobe")
        .version(clap::crate_version!())
        .about("Audits anti-CSRF tokens: strength, replay, concurrent issuance and enforcement")
        .after_help("EXAMPLES:\n  csrfprobe -u https://shop.test/\n  csrfprobe -u https://shop.test/account -t 8 -l 3 --headers < headers.txt\n\nLOGGING:\n  Set RUST_LOG=debug for request level diagnostics on stderr")
        .arg(Arg::new("url")
            .short('u')
            .long("url")
            .required(true)
            .num_args(1)
            .help("Target URL to crawl"))
        .arg(Arg::new("threads")
            .short('t')
            .long("threads")
            .num_args(1)
            .value_parser(clap::value_parser!(usize))
            .default_value("2")
            .help("Number of simultaneous crawl requests"))
        .arg(Arg::new("level")
            .short('l')
            .long("level")
            .num_args(1)
            .value_parser(clap::value_parser!(usize))
            .default_value("2")
            .help("Levels to crawl"))
        .arg(Arg::new("delay")
            .long("delay")
            .num_args(1)
            .value_parser(clap::value_parser!(u64))
            .default_value("0")
            .help("Delay between requests in seconds"))
        .arg(Arg::new("timeout")
            .long("timeout")
            .num_args(1)
            .value_parser(clap::value_parser!(u64))
            .default_value("20")
            .help("HTTP request timeout in seconds"))
        .arg(Arg::new("headers")
            .long("headers")
            .action(clap::ArgAction::SetTrue)
            .help("Read 'Name: value' headers from stdin"))
        .arg(Arg::new("hash_db")
            .long("hash-db")
            .num_args(1)
            .help("Hash signature database (JSON) instead of the built-in one"))
        .arg(Arg::new("csv_report")
            .long("csv-report")
            .action(clap::ArgAction::SetTrue)
            .help("Write a CSV report"))
        .arg(Arg::new("markdown_report")
            .long("markdown-report")
            .action(clap::ArgAction::SetTrue)
            .help("Write a Markdown report"))
        .arg(Arg::new("output_dir")
            .long("output-dir")
            .num_args(1)
            .help("Directory for reports (default: current directory)"))
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    init_logging();
    let options = Options::from_matches(&cli().get_matches());

    if let Err(e) = run(&options).await {
        eprintln!("[-] {}", e);
        std::process::exit(1);
    }
}

async fn run(options: &Options) -> AuditResult<()> {
    let headers = if options.interactive_headers {
        println!("[!] Paste headers ('Name: value' per line), end with EOF:");
        let text = std::io::read_to_string(std::io::stdin())?;
        extract_headers(&text)?
    } else {
        RequestConfig::default().headers
    };
    let config = RequestConfig::new(headers, options.timeout, options.delay);

    let signatures = match &options.hash_db {
        Some(path) => SignatureDb::load(path)?,
        None => SignatureDb::builtin()?,
    };

    let engine: Arc<dyn Requester> = Arc::new(HttpEngine::new()?);
    let audit = AuditOptions {
        target: options.target.clone(),
        threads: options.threads,
        level: options.level,
    };
    let mut rng = rand::thread_rng();
    let summary = run_audit(engine, &signatures, &audit, &config, &mut rng, &mut std::io::stdout()).await?;

    export_reports(options, &summary.rows)
}

fn export_reports(options: &Options, results: &[ReportRow]) -> AuditResult<()> {
    if options.csv_report {
        match export_csv(results, &options.output_dir) {
            Ok(path) => println!("[!] CSV report written to {}", path.display()),
            Err(e) => eprintln!("[-] Failed to write CSV report: {}", e),
        }
    }
    if options.markdown_report {
        match export_markdown(results, &options.output_dir) {
            Ok(path) => println!("[!] Markdown report written to {}", path.display()),
            Err(e) => eprintln!("[-] Failed to write Markdown report: {}", e),
        }
    }
    Ok(())
}
