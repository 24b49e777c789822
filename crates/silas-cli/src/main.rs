//! silas - static site generator for nested directories of org files

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use silas_config::Config;
use silas_engine::{BuildOptions, Builder, Website};
use silas_syntax::tree::visit::TreePrinter;

#[derive(Parser)]
#[command(name = "silas")]
#[command(version, about = "Static site generator for nested directories of org files", long_about = None)]
#[command(after_help = "EXAMPLES:
    silas build                  Build the website into the output directory
    silas build --mode test -p   Preview the test website, drafts included
    silas check                  Resolve every link without writing anything
    silas tree notes.org         Print the parsed tree of one file")]
struct Cli {
    /// Raise log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Config file to use instead of ~/.config/silas/config.toml
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render the website into the output directory
    Build(BuildArgs),
    /// Load the website and resolve all links
    Check(SiteArgs),
    /// Parse one file and print its document tree
    Tree {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

#[derive(Args)]
struct SiteArgs {
    /// Which website to read
    #[arg(long, value_enum, default_value_t = Mode::Site)]
    mode: Mode,

    /// Include drafts and only warn about release problems
    #[arg(short, long)]
    preview: bool,
}

#[derive(Args)]
struct BuildArgs {
    #[command(flatten)]
    site: SiteArgs,

    /// Output directory, cleared before building
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Base URL for links, overriding config and #+URL:
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// The small test website
    Test,
    /// The real website
    Site,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Build(args) => build(&load_config(cli.config.as_deref())?, args),
        Command::Check(args) => check(&load_config(cli.config.as_deref())?, args),
        Command::Tree { file } => tree(&file),
    }
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    let path = path.map_or_else(Config::config_path, Path::to_path_buf);
    log::info!("Config path: {}", path.display());
    let config = Config::load_from_path(&path)?;
    if config.is_none() {
        log::info!("No config file, using defaults");
    }
    Ok(config.unwrap_or_default())
}

fn load_website(config: &Config, mode: Mode) -> Result<Website> {
    let root = config.source_root(mode == Mode::Test);
    Website::load(root).with_context(|| format!("Failed to load website at {}", root.display()))
}

fn build(config: &Config, args: BuildArgs) -> Result<()> {
    let website = load_website(config, args.site.mode)?;

    let output = args.output.unwrap_or_else(|| config.output_dir.clone());
    if output.exists() {
        fs::remove_dir_all(&output)
            .with_context(|| format!("Failed to clear {}", output.display()))?;
    }
    fs::create_dir_all(&output)
        .with_context(|| format!("Failed to create {}", output.display()))?;

    let options = BuildOptions {
        preview: args.site.preview,
        base_url: args.base_url.or_else(|| config.base_url.clone()),
    };
    let report = Builder::new(&website, options).build(&output)?;

    for warning in &report.warnings {
        eprintln!("warning: {warning}");
    }
    println!(
        "Wrote {} pages, {} files and {} feeds to {} ({} drafts skipped, {} warnings)",
        report.pages.len(),
        report.assets.len(),
        report.feeds.len(),
        output.display(),
        report.skipped_drafts.len(),
        report.warnings.len()
    );
    Ok(())
}

fn check(config: &Config, args: SiteArgs) -> Result<()> {
    let website = load_website(config, args.mode)?;
    let report = website.check_links(args.preview)?;

    for warning in &report.warnings {
        eprintln!("warning: {warning}");
    }
    println!(
        "Checked {} links in {} files ({} warnings)",
        report.links,
        website.files().count(),
        report.warnings.len()
    );
    Ok(())
}

fn tree(file: &Path) -> Result<()> {
    let source = silas_engine::io::read_file(file)?;
    let parsed =
        silas_syntax::parse(&source).with_context(|| format!("Failed to parse {}", file.display()))?;

    for (key, value) in parsed.preamble.entries().iter() {
        println!("#+{key}: {value}");
    }
    println!("{}", TreePrinter::print(&parsed.nodes));
    for warning in &parsed.warnings {
        eprintln!("warning: {}: {warning}", file.display());
    }
    Ok(())
}
