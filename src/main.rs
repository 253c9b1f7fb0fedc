use std::{io::Write, path::PathBuf};

use clap::Parser;

use crate::scanner::scan;

mod scanner;
mod types;

#[derive(Parser, Debug)]
#[command(version)]
struct Args {
    file: Option<PathBuf>,
}

fn main() {
    let args = Args::parse();

    args.file.map_or_else(repl, run_file);
}

fn repl() {
    loop {
        print!("> ");
        std::io::stdout().flush().unwrap();
        let mut line = String::new();
        if std::io::stdin().read_line(&mut line).unwrap() > 0 {
            dump_tokens(&line);
        } else {
            println!();
            break;
        }
    }
}

fn run_file(file: PathBuf) {
    match std::fs::read_to_string(&file) {
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(74);
        }
        Ok(source) => {
            if !dump_tokens(&source) {
                std::process::exit(65);
            }
        }
    }
}

/// Scans `source` and prints one debug line per token.
///
/// Lexical errors go to stderr before the token stream; a stream produced
/// from erroneous input should not be handed to a parser, so the return
/// value tells the caller whether the scan was clean.
fn dump_tokens(source: &str) -> bool {
    let (tokens, errors) = scan(source);
    for error in &errors {
        eprintln!("{error}");
    }
    for token in &tokens {
        println!("{token}");
    }
    errors.is_empty()
}
