//! asmmap CLI: build and query the namespace → assembly ownership index.

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Parser, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use asmmap_core::config::ScanConfig;
use asmmap_core::index::NamespaceIndex;
use asmmap_core::scanner::{ProgressCallback, ScanOutcome, ScanProgress, ScanSummary, Scanner};
use asmmap_core::store::IndexStore;

#[derive(Parser)]
#[command(
    name = "asmmap",
    about = "asmmap - Map every namespace in a project to the assembly that owns it"
)]
struct Cli {
    /// Project root that root folders and the index path are relative to
    #[arg(short, long, global = true)]
    project: Option<PathBuf>,

    /// Index file (default: Assets/VirtuaLabs/Resources/AssemblyNamespaceIndex.json)
    #[arg(short, long, global = true)]
    index: Option<PathBuf>,

    /// JSON scan configuration; command-line flags override it
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log every step
    #[arg(long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan root folders and rebuild the namespace index
    Scan {
        /// Folder containing manifests; repeatable
        #[arg(short, long = "root")]
        roots: Vec<String>,

        /// Add every package folder except engine built-ins
        #[arg(long)]
        all_packages: bool,

        /// Cancel after this many steps, keeping what was resolved so far
        #[arg(long)]
        max_steps: Option<usize>,
    },
    /// List indexed namespaces
    List {
        /// Case-insensitive substring of a namespace or assembly name
        #[arg(short, long)]
        filter: Option<String>,
    },
    /// Show which assembly owns a namespace
    Resolve {
        namespace: String,
    },
    /// Write the index to another file
    Export {
        path: PathBuf,
    },
    /// Delete every mapping
    Clear,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let config = match build_config(&cli) {
        Ok(c) => c,
        Err(e) => fail(&e),
    };

    match cli.command {
        Commands::Scan {
            ref roots,
            all_packages,
            max_steps,
        } => run_scan(config, roots, all_packages, max_steps, cli.quiet),
        Commands::List { ref filter } => run_list(&config, filter.as_deref().unwrap_or("")),
        Commands::Resolve { ref namespace } => run_resolve(&config, namespace),
        Commands::Export { ref path } => run_export(&config, path, cli.quiet),
        Commands::Clear => run_clear(&config, cli.quiet),
    }
}

/// Filter used when `RUST_LOG` is unset.
fn default_level(verbose: bool, quiet: bool) -> &'static str {
    if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "info"
    }
}

fn init_logging(verbose: bool, quiet: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level(verbose, quiet)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn build_config(cli: &Cli) -> Result<ScanConfig, String> {
    let mut config = match cli.config {
        Some(ref path) => ScanConfig::from_file(path).map_err(|e| e.to_string())?,
        None => ScanConfig::default(),
    };
    if let Some(ref project) = cli.project {
        config.project_root = project.clone();
    }
    if let Some(ref index) = cli.index {
        config.index_path = index.clone();
    }
    log::debug!("project root: {}", config.project_root.display());
    Ok(config)
}

fn fail(message: &str) -> ! {
    eprintln!("{} {message}", style("Error:").red().bold());
    std::process::exit(1);
}

fn load_index(config: &ScanConfig) -> (IndexStore, NamespaceIndex) {
    let store = IndexStore::new(config.resolved_index_path());
    match store.load() {
        Ok(index) => (store, index),
        Err(e) => fail(&e.to_string()),
    }
}

fn run_scan(
    mut config: ScanConfig,
    roots: &[String],
    all_packages: bool,
    max_steps: Option<usize>,
    quiet: bool,
) {
    for root in roots {
        let path = Path::new(root);
        if path.is_absolute() {
            let project_root = config.project_root.clone();
            config.roots.add_absolute(&project_root, path);
        } else {
            config.roots.add(root);
        }
    }
    if all_packages {
        let project_root = config.project_root.clone();
        let vendored_root = config.vendored_root.clone();
        let added = config.roots.add_all_packages(&project_root, &vendored_root);
        log::debug!("added {added} package folder(s)");
    }

    let roots = config.roots.clone();
    let mut scanner = match Scanner::open(config) {
        Ok(s) => s,
        Err(e) => fail(&e.to_string()),
    };

    let mut steps = 0usize;
    let should_cancel = move |_: &ScanProgress| {
        steps += 1;
        max_steps.is_some_and(|max| steps > max)
    };

    let start = Instant::now();
    let result = if quiet {
        scanner.run(&roots, None, should_cancel)
    } else {
        let pb = ProgressBar::new(0);
        pb.set_style(
            ProgressStyle::with_template("{spinner:.blue} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=> "),
        );
        pb.set_message("Preparing scan…");

        let progress: ProgressCallback = {
            let pb = pb.clone();
            Box::new(move |p| {
                pb.set_length(p.files_total as u64);
                pb.set_position(p.files_processed as u64);
                let current = p.current_file.as_deref().or(p.current_manifest.as_deref());
                pb.set_message(format!(
                    "asmdefs {}/{} {}",
                    p.manifests_processed,
                    p.manifests_total,
                    current.unwrap_or("")
                ));
            })
        };

        let result = scanner.run(&roots, Some(progress), should_cancel);
        pb.finish_and_clear();
        result
    };

    let summary = match result {
        Ok(s) => s,
        Err(e) => fail(&e.to_string()),
    };

    if !quiet {
        print_summary(&summary, scanner.store().path(), start.elapsed().as_secs_f64());
    }
}

fn print_summary(summary: &ScanSummary, index_path: &Path, seconds: f64) {
    let (mark, title) = match summary.outcome {
        ScanOutcome::Completed => (style("✓").green().bold(), "Scan complete"),
        ScanOutcome::Cancelled => (style("!").yellow().bold(), "Scan cancelled"),
    };
    println!("\n{mark}  {}", style(title).bold());
    println!(
        "  {:<14} {}/{}",
        "Asmdefs:", summary.manifests_processed, summary.manifests_total
    );
    println!(
        "  {:<14} {}/{}",
        "Files:", summary.files_processed, summary.files_total
    );
    println!("  {:<14} {}", "Namespaces:", summary.namespaces);
    println!("  {:<14} {:.1}ms", "Duration:", seconds * 1000.0);
    println!(
        "\n  {} {}",
        style("Index written to:").green(),
        index_path.display()
    );
}

fn run_list(config: &ScanConfig, filter: &str) {
    let (_, index) = load_index(config);
    let mut shown = 0;
    for (namespace, record) in index.filtered(filter) {
        println!(
            "{:<48} → {} ({})",
            namespace, record.assembly_name, record.origin
        );
        shown += 1;
    }
    println!(
        "\n{}",
        style(format!("{shown} of {} namespaces", index.len())).dim()
    );
}

fn run_resolve(config: &ScanConfig, namespace: &str) {
    let (_, index) = load_index(config);
    match index.resolve(namespace) {
        Some((key, record)) => {
            println!("{}", record.assembly_name);
            if key != namespace {
                println!("  {} {key}", style("via prefix").dim());
            }
            println!("  {} {}", style("asmdef").dim(), record.manifest_path);
            println!("  {} {}", style("source").dim(), record.origin);
        }
        None => fail(&format!("no assembly owns namespace {namespace}")),
    }
}

fn run_export(config: &ScanConfig, path: &Path, quiet: bool) {
    let (store, index) = load_index(config);
    if let Err(e) = store.export_to(path, &index) {
        fail(&e.to_string());
    }
    if !quiet {
        println!(
            "{} {} namespaces to {}",
            style("Exported").green(),
            index.len(),
            path.display()
        );
    }
}

fn run_clear(config: &ScanConfig, quiet: bool) {
    let store = IndexStore::new(config.resolved_index_path());
    let removed = match store.clear() {
        Ok(n) => n,
        Err(e) => fail(&e.to_string()),
    };
    if !quiet {
        println!("{} {removed} namespaces", style("Cleared").green());
    }
}
