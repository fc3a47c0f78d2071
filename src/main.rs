use clap::{Arg, Command};
use log::LevelFilter;
use std::io::Read;
use std::process;
use std::sync::Arc;

use saathi_scan::bundle::ScanHistory;
use saathi_scan::classifier::LexicalClassifier;
use saathi_scan::config::Config;
use saathi_scan::report::ReportRenderer;
use saathi_scan::scanner::Scanner;
use saathi_scan::EvidenceBundle;

#[tokio::main]
async fn main() {
    let matches = Command::new("saathi-scan")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Forensic phishing email scanner: classifier + WHOIS/RDAP OSINT + risk scoring")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
                .default_value("saathi-scan.yaml"),
        )
        .arg(
            Arg::new("generate-config")
                .long("generate-config")
                .value_name("FILE")
                .help("Generate a default configuration file and exit")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("input")
                .short('i')
                .long("input")
                .value_name("FILE")
                .help("Email text file to scan (repeatable; stdin when omitted)")
                .action(clap::ArgAction::Append),
        )
        .arg(
            Arg::new("report")
                .short('r')
                .long("report")
                .value_name("FILE")
                .help("Write the paginated forensic report of the last scan")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("mock")
                .long("mock")
                .help("Offline mode: use fixture WHOIS/RDAP data instead of network lookups")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    let log_level = if matches.get_flag("verbose") {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    if let Some(path) = matches.get_one::<String>("generate-config") {
        match Config::write_default(path) {
            Ok(()) => {
                println!("Default configuration written to: {path}");
                return;
            }
            Err(e) => {
                eprintln!("Error writing configuration file: {e}");
                process::exit(1);
            }
        }
    }

    let config_path = matches.get_one::<String>("config").unwrap();
    let mut config = match load_config(config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading configuration: {e}");
            process::exit(1);
        }
    };
    if matches.get_flag("mock") {
        config.lookups.use_mock = true;
    }

    let classifier = Arc::new(LexicalClassifier::new(config.vocabulary()));
    let scanner = Scanner::new(&config, classifier);
    let renderer = ReportRenderer::new(
        config.report.page_width,
        config.report.page_lines,
        config.report.max_body_lines,
    );

    let inputs: Vec<String> = matches
        .get_many::<String>("input")
        .map(|v| v.cloned().collect())
        .unwrap_or_default();

    let mut history = ScanHistory::new();
    let mut failed = false;

    if inputs.is_empty() {
        match read_stdin() {
            Ok(text) => run_scan(&scanner, &text, "<stdin>", &mut history, &mut failed).await,
            Err(e) => {
                eprintln!("Error reading stdin: {e}");
                process::exit(1);
            }
        }
    } else {
        for path in &inputs {
            match std::fs::read_to_string(path) {
                Ok(text) => run_scan(&scanner, &text, path, &mut history, &mut failed).await,
                Err(e) => {
                    eprintln!("Error reading {path}: {e}");
                    failed = true;
                }
            }
        }
    }

    if history.len() > 1 {
        println!("\nSession history (most recent first):");
        for bundle in history.recent(config.history.display_limit) {
            println!(
                "  {} | {}",
                bundle.timestamp.format("%Y-%m-%d %H:%M:%S"),
                bundle.summary
            );
        }
    }

    if let Some(report_path) = matches.get_one::<String>("report") {
        match history.recent(1).next() {
            Some(bundle) => {
                if let Err(e) = write_report(&renderer, bundle, report_path) {
                    // The scan result above is still valid; only rendering failed.
                    eprintln!("Error writing report: {e}");
                    failed = true;
                }
            }
            None => eprintln!("No completed scan to report on"),
        }
    }

    if failed {
        process::exit(1);
    }
}

async fn run_scan(
    scanner: &Scanner,
    text: &str,
    source: &str,
    history: &mut ScanHistory,
    failed: &mut bool,
) {
    println!("Scanning {source}...");
    match scanner.scan(text).await {
        Ok(bundle) => {
            print_bundle(&bundle);
            history.push(bundle);
        }
        Err(e) => {
            eprintln!("Scan of {source} failed: {e}");
            *failed = true;
        }
    }
}

fn print_bundle(bundle: &EvidenceBundle) {
    println!();
    println!(
        "  Prediction:  {} ({}% confidence)",
        bundle.classifier.label, bundle.classifier.confidence
    );
    println!("  Risk score:  {} / 100", bundle.score);

    if bundle.keywords.is_empty() {
        println!("  Keywords:    none");
    } else {
        println!("  Keywords:    {}", bundle.keywords.join(", "));
    }

    if bundle.urls.is_empty() {
        println!("  URLs:        none");
    } else {
        for url in &bundle.urls {
            println!("  URL:         {url}");
        }
    }

    for record in &bundle.registrations {
        println!("  WHOIS:       {}", record.summary_line());
        if let Some(err) = &record.lookup_error {
            println!("               lookup error: {err}");
        }
    }

    match &bundle.ownership {
        Some(record) => println!("  Ownership:   {}", record.summary_line()),
        None => println!("  Ownership:   no domain or address candidate found"),
    }

    println!("  Summary:     {}", bundle.summary);
}

fn load_config(path: &str) -> anyhow::Result<Config> {
    if std::path::Path::new(path).exists() {
        Config::from_file(path)
    } else {
        log::debug!("Configuration file '{path}' not found, using defaults");
        Ok(Config::default())
    }
}

fn read_stdin() -> anyhow::Result<String> {
    let mut text = String::new();
    std::io::stdin().read_to_string(&mut text)?;
    Ok(text)
}

fn write_report(renderer: &ReportRenderer, bundle: &EvidenceBundle, path: &str) -> anyhow::Result<()> {
    let bytes = renderer.render(bundle)?;
    std::fs::write(path, bytes)?;
    println!("Forensic report written to: {path}");
    Ok(())
}
