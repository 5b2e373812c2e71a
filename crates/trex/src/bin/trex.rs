//! Compile a regular expression and test inputs against it

#![deny(
    clippy::disallowed_methods,
    clippy::suspicious,
    clippy::style,
    clippy::clone_on_ref_ptr,
    missing_debug_implementations,
    missing_copy_implementations
)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use tracing::{debug, error};
use tracing_subscriber::{EnvFilter, prelude::*};
use trex::Regex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum Automaton {
    Nfa,
    Dfa,
}

#[derive(Debug, clap::Parser)]
#[command(version, about)]
struct Opts {
    /// The pattern to compile
    #[arg(env = "TREX_PATTERN")]
    pattern: String,

    /// Inputs to test against the pattern
    inputs: Vec<String>,

    /// Also test every line read from standard input
    #[arg(long)]
    stdin: bool,

    /// Print a Graphviz graph of the given automaton instead of matching
    #[arg(long, env = "TREX_DOT", value_enum)]
    dot: Option<Automaton>,

    /// Print nothing, and exit with status 1 unless every input matched
    #[arg(short, long)]
    quiet: bool,
}

fn main() {
    tracing::subscriber::set_global_default(
        tracing_subscriber::Registry::default()
            .with(
                EnvFilter::try_from_default_env()
                    .or_else(|_| EnvFilter::try_new("warn"))
                    .unwrap(),
            )
            .with(tracing_subscriber::fmt::layer().with_writer(io::stderr)),
    )
    .expect("Failed to set default tracing subscriber");

    let opts: Opts = clap::Parser::parse();

    std::process::exit(match run(opts) {
        Ok(true) => 0,
        Ok(false) => 1,
        Err(e) => {
            error!("{e:?}");
            2
        },
    });
}

fn run(opts: Opts) -> Result<bool> {
    let Opts {
        pattern,
        inputs,
        stdin,
        dot,
        quiet,
    } = opts;

    if let Some(automaton) = dot {
        let nfa = trex::parse(&pattern).with_context(|| format!("Invalid pattern {pattern:?}"))?;
        let graph = match automaton {
            Automaton::Nfa => nfa.dot(),
            Automaton::Dfa => nfa.compile().dot(),
        };

        println!("{graph}");
        return Ok(true);
    }

    let re = Regex::new(&pattern).with_context(|| format!("Invalid pattern {pattern:?}"))?;
    debug!(states = re.dfa().len(), "Pattern compiled");

    let mut out = io::stdout().lock();
    let mut all = true;
    let mut test = |input: &str| -> Result<()> {
        let matched = re.is_match(input);
        all &= matched;

        if !quiet {
            writeln!(out, "Match '{input}'? => {matched}").context("Failed to write output")?;
        }

        Ok(())
    };

    for input in &inputs {
        test(input.as_str())?;
    }

    if stdin {
        for line in io::stdin().lock().lines() {
            test(line.context("Failed to read from stdin")?.as_str())?;
        }
    }

    Ok(all || !quiet)
}
