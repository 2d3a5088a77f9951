//! docmeta: CLI tool to generate documentation metamodels

mod config;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use config::{CONFIG_FILE_NAME, Config};
use docmeta_build::{BuildOptions, Builder, OutputFormat, load_index};
use docmeta_tree::WriterOptions;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "docmeta")]
#[command(about = "Generate documentation metamodels from source indexes")]
#[command(version)]
#[command(after_help = "Examples:
  docmeta build index.json                  # Write apidoc.xml next to the index
  docmeta build index.json -o api.json -f json
  docmeta build index.json -c elements -c utility --no-deprecated
  docmeta init                              # Create _docmeta.toml")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode - only show errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate the documentation metamodel of a source index
    Build(BuildArgs),

    /// Create a sample configuration file
    Init {
        /// Directory to create the configuration in
        dir: Option<PathBuf>,

        /// Overwrite an existing configuration file
        #[arg(long)]
        force: bool,
    },

    /// Print the JSON schema of the configuration file
    Schema {
        /// Write the schema to a file instead of standard output
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
struct BuildArgs {
    /// Source index (JSON)
    input: PathBuf,

    /// Output file (defaults to apidoc.<format> next to the input)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum)]
    format: Option<Format>,

    /// Write the warnings report to a file instead of standard error
    #[arg(long)]
    warnings: Option<PathBuf>,

    /// Category to emit; repeat to emit several in order
    #[arg(short = 'c', long = "category")]
    categories: Vec<String>,

    /// Leave out deprecated types and members
    #[arg(long)]
    no_deprecated: bool,

    /// Do not map undocumented types onto documented subtypes
    #[arg(long)]
    no_infer_types: bool,

    /// Do not map types by short name or public name
    #[arg(long)]
    no_partial_match: bool,

    /// Member to hide, as Type#officialName; may be repeated
    #[arg(long)]
    hide: Vec<String>,

    /// Number of parallel jobs (defaults to number of CPUs)
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Configuration file (defaults to _docmeta.toml next to the input)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Fail when any warning was reported
    #[arg(long)]
    deny_warnings: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Format {
    Xml,
    Json,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Xml => OutputFormat::Xml,
            Format::Json => OutputFormat::Json,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Build(args) => build(&args, cli.verbose, cli.quiet),
        Commands::Init { dir, force } => init(dir.as_deref(), force, cli.quiet),
        Commands::Schema { output } => schema(output.as_deref()),
    }
}

/// Log to standard error; `RUST_LOG` wins over the verbosity flags
fn init_tracing(verbose: bool, quiet: bool) {
    let default_level = if verbose {
        "debug"
    } else if quiet {
        "error"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn build(args: &BuildArgs, verbose: bool, quiet: bool) -> Result<()> {
    let config = load_config(args)?;

    let format = match (args.format, config.output.format.as_deref()) {
        (Some(format), _) => format,
        (None, None) => Format::Xml,
        (None, Some(name)) => Format::from_str(name, true)
            .map_err(|_| anyhow::anyhow!("Unknown output format in config: {}", name))?,
    };
    let format = OutputFormat::from(format);

    let output_path = match &args.output {
        Some(p) => p.clone(),
        None => args
            .input
            .with_file_name(format!("apidoc.{}", format.extension())),
    };

    let mut hidden_members = config.filter.hidden_members.clone().unwrap_or_default();
    hidden_members.extend(args.hide.iter().cloned());

    let options = BuildOptions {
        categories: if args.categories.is_empty() {
            config.filter.categories.clone()
        } else {
            Some(args.categories.clone())
        },
        include_deprecated: !args.no_deprecated && config.filter.include_deprecated.unwrap_or(true),
        partial_type_match: !args.no_partial_match && config.types.partial_match.unwrap_or(true),
        infer_undocumented_types: !args.no_infer_types && config.types.infer.unwrap_or(true),
        reset_type_cache: true,
        hidden_members,
        parallel_jobs: args.jobs,
        conventions: config.conventions.to_conventions(),
    };

    let writer_options = WriterOptions {
        root_name: config.output.root.clone().unwrap_or_else(|| "apidoc".to_string()),
        indent: config.output.indent.unwrap_or(2),
        declaration: true,
    };

    if verbose {
        eprintln!(
            "Building: {} -> {}",
            args.input.display(),
            output_path.display()
        );
    }

    let index = load_index(&args.input)
        .with_context(|| format!("Failed to load source index: {}", args.input.display()))?;
    if verbose {
        eprintln!("Loaded {} types, {} members", index.types.len(), index.member_count());
    }

    let output = Builder::new(options)
        .with_cache(config.types.mapping_cache())
        .build(index)?;

    output
        .write_to(&output_path, format, &writer_options)
        .with_context(|| format!("Failed to write: {}", output_path.display()))?;

    if !quiet {
        println!("{}", output_path.display());
    }

    let report = output.warnings_report();
    match args.warnings.as_ref().or(config.output.warnings.as_ref()) {
        Some(path) => {
            fs::write(path, &report)
                .with_context(|| format!("Failed to write: {}", path.display()))?;
        }
        None if !quiet => eprint!("{}", report),
        None => {}
    }

    let warning_count = output.warnings.len();
    if !quiet {
        eprintln!(
            "Documented {} types, {} warnings",
            output.document.types().count(),
            warning_count
        );
    }

    if args.deny_warnings && warning_count > 0 {
        anyhow::bail!("{} warnings reported", warning_count);
    }

    Ok(())
}

/// Explicit `--config`, else `_docmeta.toml` next to the input
fn load_config(args: &BuildArgs) -> Result<Config> {
    if let Some(path) = &args.config {
        debug!(path = %path.display(), "loading config");
        return Config::load(path);
    }
    let dir = args
        .input
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let config = Config::load_from_dir(dir)?;
    debug!(dir = %dir.display(), found = config.is_some(), "looked for {}", CONFIG_FILE_NAME);
    Ok(config.unwrap_or_default())
}

fn init(dir: Option<&Path>, force: bool, quiet: bool) -> Result<()> {
    let dir = dir.unwrap_or(Path::new("."));
    let path = dir.join(CONFIG_FILE_NAME);

    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }

    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
    fs::write(&path, Config::sample().to_toml_with_schema()?)
        .with_context(|| format!("Failed to write: {}", path.display()))?;

    if !quiet {
        println!("{}", path.display());
    }
    Ok(())
}

fn schema(output: Option<&Path>) -> Result<()> {
    let schema = Config::json_schema_string()?;
    match output {
        Some(path) => fs::write(path, schema)
            .with_context(|| format!("Failed to write: {}", path.display()))?,
        None => println!("{}", schema),
    }
    Ok(())
}
