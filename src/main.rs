use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use railswitch::{InputLayout, RunConfig, Validation};

#[derive(Parser, Debug)]
#[command(name = "railswitch", about = "Count switch flips needed to route tree nodes to the root")]
struct Cli {
    /// Log walk details to stderr (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build the tree and answer every query in order.
    Run {
        /// Input file (reads stdin when omitted).
        input: Option<PathBuf>,
        /// Token layout of each node record.
        #[arg(long, value_enum, default_value = "first-child")]
        layout: LayoutArg,
        /// Accept malformed trees instead of rejecting them.
        #[arg(long)]
        permissive: bool,
        /// Print the initial tree structure to stderr.
        #[arg(long)]
        dump_tree: bool,
        /// Print query counters to stderr when done.
        #[arg(long)]
        stats: bool,
    },
    /// Validate the tree part of an input and report its shape.
    Check {
        /// Input file (reads stdin when omitted).
        input: Option<PathBuf>,
        /// Token layout of each node record.
        #[arg(long, value_enum, default_value = "first-child")]
        layout: LayoutArg,
        /// Accept malformed trees instead of rejecting them.
        #[arg(long)]
        permissive: bool,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LayoutArg {
    /// `k c1 .. ck`, switch starts on c1.
    FirstChild,
    /// `k s c1 .. ck`, switch starts on s.
    ExplicitSwitch,
}

impl From<LayoutArg> for InputLayout {
    fn from(arg: LayoutArg) -> Self {
        match arg {
            LayoutArg::FirstChild => InputLayout::FirstChild,
            LayoutArg::ExplicitSwitch => InputLayout::ExplicitSwitch,
        }
    }
}

fn validation(permissive: bool) -> Validation {
    if permissive {
        Validation::Permissive
    } else {
        Validation::Strict
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    railswitch::logging::init(cli.verbose);

    match cli.command {
        Commands::Run {
            input,
            layout,
            permissive,
            dump_tree,
            stats,
        } => {
            let config = RunConfig::default()
                .with_layout(layout.into())
                .with_validation(validation(permissive))
                .with_tree_dump(dump_tree);
            run_queries(input.as_deref(), &config, stats)?
        }
        Commands::Check {
            input,
            layout,
            permissive,
        } => {
            let config = RunConfig::default()
                .with_layout(layout.into())
                .with_validation(validation(permissive));
            run_check(input.as_deref(), &config)?
        }
    }

    Ok(())
}

fn run_queries(input: Option<&Path>, config: &RunConfig, show_stats: bool) -> Result<()> {
    let text = read_input(input)?;
    let report = railswitch::run(&text, config).context("failed to process input")?;

    if let Some(dump) = &report.tree_dump {
        eprint!("{}", dump);
    }

    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());
    out.write_all(report.render().as_bytes())
        .context("failed to write answers")?;
    out.flush().context("failed to flush answers")?;

    if show_stats {
        eprintln!("{}", report.stats);
    }

    Ok(())
}

fn run_check(input: Option<&Path>, config: &RunConfig) -> Result<()> {
    let text = read_input(input)?;
    let report = railswitch::check(&text, config).context("tree rejected")?;
    print!("{}", report);
    Ok(())
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("failed to read input from {}", path.display())),
        None => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .context("failed to read stdin")?;
            Ok(text)
        }
    }
}
