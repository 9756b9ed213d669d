//! Lyra Kernel CLI
//!
//! Thin driver around the kernel library: parses a source file (or
//! stdin) and prints the canonical form of each expression, optionally
//! after one arithmetic reduction pass.

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use lyra::lexer::Lexer;
use lyra::parser::Parser;
use lyra::reduce;
use std::io::Read;
use std::path::PathBuf;
use std::process;

#[derive(ClapParser)]
#[command(name = "lyra-kernel")]
#[command(about = "Parse Lyra source and print its canonical form")]
struct Cli {
    /// Source file; reads stdin when omitted
    input: Option<PathBuf>,

    /// Dump the token stream as JSON instead of parsing
    #[arg(long)]
    tokens: bool,

    /// Apply the Plus/Times reducers bottom-up before printing
    #[arg(long)]
    reduce: bool,
}

fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(&cli) {
        eprintln!("error: {:#}", err);
        process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let (source, file_name) = read_input(cli)?;

    let mut lexer = Lexer::new(&source, file_name);
    let tokens = lexer.tokenize().context("lexing failed")?;

    if cli.tokens {
        let json = serde_json::to_string_pretty(&tokens)?;
        println!("{}", json);
        return Ok(());
    }

    let expr = match Parser::new(tokens).parse() {
        Ok(expr) => expr,
        Err(diagnostics) => {
            for error in &diagnostics.errors {
                eprintln!("error: {}", error);
            }
            process::exit(1);
        }
    };

    let expr = if cli.reduce {
        reduce::eval_arithmetic(&expr)
    } else {
        expr
    };
    println!("{}", expr);
    Ok(())
}

fn read_input(cli: &Cli) -> Result<(String, String)> {
    match &cli.input {
        Some(path) => {
            let source = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            Ok((source, path.display().to_string()))
        }
        None => {
            let mut source = String::new();
            std::io::stdin()
                .read_to_string(&mut source)
                .context("reading stdin")?;
            Ok((source, "<stdin>".to_string()))
        }
    }
}
