use std::{env, process};

use lox::Lox;

fn main() {
    let args: Vec<String> = env::args().collect();

    let mut lox = Lox::new();

    let result = match args.len() {
        n if n > 2 => {
            println!("Usage: lox [script]");
            process::exit(64);
        },
        2 => lox.run_file(args[1].clone()),
        _ => lox.run_prompt(),
    };

    if let Err(err) = result {
        eprintln!("{err}");
        process::exit(74);
    }
}
