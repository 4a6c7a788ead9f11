// bfront: parser front end for the B programming language

use std::fs;
use std::path::PathBuf;
use std::process;

use clap::Parser as ClapParser;

use bfront::lexer::{LexError, Lexer, TokenKind};
use bfront::parser::Parser;

#[derive(ClapParser)]
#[command(version, about = "Parse a B source file and print its syntax tree")]
struct Cli {
    /// Source file to parse
    file: PathBuf,

    /// Dump the token stream instead of parsing
    #[arg(long)]
    tokens: bool,
}

fn main() {
    let cli = Cli::parse();

    let source = match fs::read_to_string(&cli.file) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("Error: cannot read '{}': {}", cli.file.display(), err);
            process::exit(1);
        }
    };

    let name = cli.file.display().to_string();

    if cli.tokens {
        if let Err(err) = dump_tokens(&name, &source) {
            eprintln!("{}", err);
            process::exit(1);
        }
        return;
    }

    let mut parser = match Parser::new(&name, &source) {
        Ok(parser) => parser,
        Err(err) => {
            eprintln!("{}", err);
            process::exit(1);
        }
    };

    match parser.parse() {
        Ok(unit) => print!("{}", unit),
        Err(err) => {
            eprintln!("{}", err);
            process::exit(1);
        }
    }
}

fn dump_tokens(name: &str, source: &str) -> Result<(), LexError> {
    let mut lexer = Lexer::new(name, source);

    loop {
        let tok = lexer.next_token()?;
        println!("{}:{}: {}", tok.start.line, tok.start.column, tok);
        if tok.kind == TokenKind::Eof {
            return Ok(());
        }
    }
}
