// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Command-line interface for chglog.
//!
//! This binary provides the `chglog` command, which aggregates the
//! changelogs of a repository and writes the result as JSON for a
//! documentation site generator.

use chglog::discover::{self, Layout};
use chglog::grammar::{DEFAULT_PACKAGES_DIR, DEFAULT_ROOT_PACKAGE, Grammar};
use lexopt::prelude::*;
use snafu::prelude::*;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "CHGLOG_LOG";

/// Where to write the JSON document.
#[derive(Debug, Clone, PartialEq, Eq)]
enum OutputTarget {
    /// Write to the specified file.
    File(PathBuf),
    /// Write to stdout.
    Stdout,
}

#[derive(Debug, PartialEq, Eq)]
struct Cli {
    root: PathBuf,
    output: OutputTarget,
    packages_dir: String,
    root_package: String,
    filter: Vec<String>,
    pretty: bool,
    quiet: bool,
    verbose: bool,
}

/// What the command line asked for.
#[derive(Debug, PartialEq, Eq)]
enum Command {
    Run(Cli),
    Help,
    Version,
}

impl Cli {
    fn layout(&self) -> Layout {
        Layout::new(&self.root)
            .with_packages_dir(&self.packages_dir)
            .with_root_package(&self.root_package)
    }

    const fn log_filter(&self) -> &'static str {
        if self.verbose {
            "chglog=debug"
        } else if self.quiet {
            "chglog=warn"
        } else {
            "chglog=info"
        }
    }
}

#[derive(Debug, Snafu)]
enum Error {
    #[snafu(display("failed to parse arguments: {source}"))]
    ParseArgs { source: lexopt::Error },

    #[snafu(display("repository root {} is not a directory", path.display()))]
    NotADirectory { path: PathBuf },

    #[snafu(display("{source}"))]
    Discover { source: discover::DiscoverError },

    #[snafu(display("failed to serialize changelog: {source}"))]
    Serialize { source: serde_json::Error },

    #[snafu(display("failed to create output directory: {source}"))]
    CreateOutputDir { source: std::io::Error },

    #[snafu(display("failed to write {}: {source}", path.display()))]
    WriteFile {
        path: PathBuf,
        source: std::io::Error,
    },
}

fn print_help() {
    println!(
        "\
{name} {version}
Aggregate per-package changelogs into rendered release entries

Usage: {name} [OPTIONS] [ROOT]

Arguments:
  [ROOT]  Repository root (default: .)

Options:
  -o, --output <FILE>          Write JSON to FILE instead of stdout (- for stdout)
      --packages-dir <NAME>    Directory holding packages (default: {packages_dir})
      --root-package <NAME>    Package name for the root changelog (default: {root_package})
  -p, --package <NAME>         Only include entries for NAME (repeatable)
      --pretty                 Pretty-print the JSON output

Other options:
  -q, --quiet                  Only log warnings and errors
  -v, --verbose                Log each discovered file
  -h, --help                   Print help
  -V, --version                Print version

Logging can also be configured with the {log_env} environment variable.",
        name = env!("CARGO_PKG_NAME"),
        version = env!("CARGO_PKG_VERSION"),
        packages_dir = DEFAULT_PACKAGES_DIR,
        root_package = DEFAULT_ROOT_PACKAGE,
        log_env = LOG_ENV,
    );
}

/// Parses arguments, not including the program name.
fn parse_args<I>(args: I) -> Result<Command, lexopt::Error>
where
    I: IntoIterator,
    I::Item: Into<OsString>,
{
    let mut root: Option<PathBuf> = None;
    let mut output = OutputTarget::Stdout;
    let mut packages_dir = DEFAULT_PACKAGES_DIR.to_owned();
    let mut root_package = DEFAULT_ROOT_PACKAGE.to_owned();
    let mut filter = Vec::new();
    let mut pretty = false;
    let mut quiet = false;
    let mut verbose = false;

    let mut parser = lexopt::Parser::from_args(args);
    while let Some(arg) = parser.next()? {
        match arg {
            Short('o') | Long("output") => {
                let val: PathBuf = parser.value()?.parse()?;
                output = if val == Path::new("-") {
                    OutputTarget::Stdout
                } else {
                    OutputTarget::File(val)
                };
            }
            Long("packages-dir") => packages_dir = parser.value()?.string()?,
            Long("root-package") => root_package = parser.value()?.string()?,
            Short('p') | Long("package") => filter.push(parser.value()?.string()?),
            Long("pretty") => pretty = true,
            // Last one wins
            Short('q') | Long("quiet") => {
                quiet = true;
                verbose = false;
            }
            Short('v') | Long("verbose") => {
                verbose = true;
                quiet = false;
            }
            Short('h') | Long("help") => return Ok(Command::Help),
            Short('V') | Long("version") => return Ok(Command::Version),
            Value(val) if root.is_none() => root = Some(val.parse()?),
            _ => return Err(arg.unexpected()),
        }
    }

    Ok(Command::Run(Cli {
        root: root.unwrap_or_else(|| PathBuf::from(".")),
        output,
        packages_dir,
        root_package,
        filter,
        pretty,
        quiet,
        verbose,
    }))
}

fn init_tracing(cli: &Cli) {
    let filter = std::env::var(LOG_ENV).unwrap_or_else(|_| cli.log_filter().to_owned());
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(EnvFilter::new(filter))
        .try_init();
}

fn main() -> Result<(), Error> {
    let cli = match parse_args(std::env::args_os().skip(1)).context(ParseArgsSnafu)? {
        Command::Run(cli) => cli,
        Command::Help => {
            print_help();
            return Ok(());
        }
        Command::Version => {
            println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
    };
    init_tracing(&cli);

    ensure!(cli.root.is_dir(), NotADirectorySnafu { path: &cli.root });

    let grammar = Grammar::new();
    let layout = cli.layout();

    let mut changelog = discover::discover_changelogs(&grammar, &layout).context(DiscoverSnafu)?;
    changelog.filter_packages(&cli.filter);

    let json = if cli.pretty {
        serde_json::to_string_pretty(&changelog)
    } else {
        serde_json::to_string(&changelog)
    }
    .context(SerializeSnafu)?;

    match &cli.output {
        OutputTarget::Stdout => println!("{json}"),
        OutputTarget::File(path) => {
            // Create parent directory if needed
            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
            {
                std::fs::create_dir_all(parent).context(CreateOutputDirSnafu)?;
            }
            std::fs::write(path, format!("{json}\n")).context(WriteFileSnafu { path })?;
            info!(
                path = %path.display(),
                entries = changelog.len(),
                "wrote changelog"
            );
        }
    }

    Ok(())
}
