//! varcreate CLI
//!
//! Usage:
//!   varcreate [OPTIONS] <PATH>
//!
//! Options:
//!   -v, --verbose            Enable verbose output
//!   -i, --instance <ID>      Instance identifier applied to every variable
//!   -p, --prefix <PREFIX>    Prefix prepended to every variable name
//!   -f, --flags <FLAGS>      Flags applied to every variable
//!   -d, --directory          Create from every *.json file in a directory
//!   -z, --force-default      Overwrite the value of variables that already exist
//!   -c, --config <FILE>      Options file (TOML format)
//!   --list                   Print the registered variables after the run
//!   -h, --help               Print help

use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use varcreate::{
    create_from_dir, create_from_file, CreateOptions, MemoryRegistry, VarFlags,
};

#[derive(Parser)]
#[command(name = "varcreate")]
#[command(about = "Create registry variables from JSON definition files")]
struct Cli {
    /// Definition file, or a directory when --directory is given
    path: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Instance identifier applied to every variable
    #[arg(short, long)]
    instance: Option<u32>,

    /// Prefix prepended to every variable name
    #[arg(short, long)]
    prefix: Option<String>,

    /// Flags applied to every variable, e.g. "volatile,audit"
    #[arg(short, long, value_parser = VarFlags::parse_list)]
    flags: Option<VarFlags>,

    /// Create from every *.json file in a directory (non-recursive)
    #[arg(short, long)]
    directory: bool,

    /// Overwrite the value of variables that already exist
    #[arg(short = 'z', long)]
    force_default: bool,

    /// Options file (TOML format); command line flags take precedence
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the registered variables after the run
    #[arg(long)]
    list: bool,
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let options = match load_options(&cli) {
        Ok(options) => options,
        Err(e) => {
            error!("Error loading options: {}", e);
            std::process::exit(1);
        }
    };

    let mut registry = MemoryRegistry::new();
    let result = if cli.directory {
        create_from_dir(&mut registry, &cli.path, &options)
    } else {
        create_from_file(&mut registry, &cli.path, &options)
    };

    if cli.list {
        for var in registry.variables() {
            println!("{}", var);
        }
    }

    match result.and_then(|outcome| outcome.into_result()) {
        Ok(created) => {
            if options.verbose {
                info!(created, "all variables created");
            }
        }
        Err(e) => {
            error!("error creating vars: {}", e);
            std::process::exit(1);
        }
    }
}

/// Options file first, then command line overrides
fn load_options(cli: &Cli) -> Result<CreateOptions, varcreate::OptionsError> {
    let mut options = match &cli.config {
        Some(path) => CreateOptions::from_file(path)?,
        None => CreateOptions::default(),
    };

    if let Some(prefix) = &cli.prefix {
        options = options.with_prefix(prefix.as_str());
    }
    if let Some(instance) = cli.instance {
        options = options.with_instance_id(instance);
    }
    if let Some(flags) = cli.flags {
        options = options.with_flags(flags);
    }
    if cli.verbose {
        options = options.with_verbose(true);
    }
    if cli.force_default {
        options = options.with_force_default(true);
    }
    Ok(options)
}
