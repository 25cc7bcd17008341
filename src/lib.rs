#![allow(clippy::needless_return)]

//! A tree-walking interpreter for Lox, the toy language from
//! [Crafting Interpreters](https://craftinginterpreters.com/) by Bob Nystrom.
//! Lox is dynamically typed, lexically scoped, and has first-class functions
//! and single-inheritance classes.
//!
//! ## Scanning
//! The first step in the interpreter is scanning: converting a string of
//! characters into a list of tokens. For example, the string `1 + 2` becomes
//! ```text
//! [Number(1), Plus, Number(2)]
//! ```
//! The scanner is implemented in the [`scanner`](scanner) module as an
//! iterator over the characters in the source code, reporting syntax errors
//! as a [`ScanError`](error::ScanError) and continuing rather than stopping
//! at the first one, so a run can surface more than one mistake at a time.
//!
//! ## Parsing
//! The second step is parsing: converting a list of tokens into an abstract
//! syntax tree. The parser is implemented in the [`parser`](parser) module as
//! a recursive-descent parser. [`Expressions`](expr::Expr) produce a value
//! ([`Object`](object::Object)); [`statements`](stmt::Stmt) perform a side
//! effect and produce nothing. Unlike the scanner, the parser reports only
//! the first [`ParseError`](error::ParseError) it finds and then stops,
//! since a single malformed construct usually leaves the rest of the parse
//! meaningless.
//!
//! ## Resolving
//! The third step is resolving: a static pass over the tree that works out,
//! for every variable reference, how many enclosing scopes separate it from
//! its declaration. The resolver is implemented in the [`resolver`](resolver)
//! module and reports [`ResolveError`](error::ResolveError)s — problems that
//! are syntactically valid but semantically wrong, such as a variable read
//! from its own initializer.
//!
//! ## Interpreting
//! The final step evaluates the tree. The interpreter is implemented in the
//! [`interpreter`](interpreter) module and reports
//! [`RuntimeError`](error::RuntimeError)s for mistakes that can only be
//! caught while the program is running, such as adding a number to a string.
//! Variable bindings live in the [`environment`](environment) module as a
//! chain of scopes, one per block or call frame.

use std::fs;
use std::io::Write;
use std::path::PathBuf;

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

pub mod error;
pub mod token;
pub mod scanner;
pub mod expr;
pub mod stmt;
pub mod environment;
pub mod parser;
pub mod interpreter;
pub mod literal;
pub mod object;
pub mod function;
pub mod resolver;
pub mod class;

use error::DriverError;
use parser::Parser;
use scanner::Scanner;
use resolver::Resolver;

/// Drives the scan/parse/resolve/interpret pipeline for one run, either a
/// whole file or a single REPL line. Owns the interpreter so that variables
/// and functions defined at the REPL persist across lines.
pub struct Lox {
    interpreter: interpreter::Interpreter,
}

impl Lox {
    pub fn new() -> Self {
        Lox {
            interpreter: interpreter::Interpreter::new(),
        }
    }

    /// Runs a script file to completion and exits the process with the
    /// matching status code if a static or runtime error was reported.
    pub fn run_file(&mut self, path: String) -> Result<(), DriverError> {
        let contents = fs::read_to_string(&path).map_err(|source| DriverError::UnreadableFile {
            path: PathBuf::from(path),
            source,
        })?;

        self.run(&contents);

        if error::did_runtime_error() {
            std::process::exit(70);
        }
        if error::did_error() {
            std::process::exit(65);
        }

        Ok(())
    }

    /// Runs an interactive prompt with line editing and persistent history,
    /// stored under the user's home directory. Each line resets the sticky
    /// error flags so one mistake does not poison the rest of the session.
    pub fn run_prompt(&mut self) -> Result<(), DriverError> {
        let mut editor = DefaultEditor::new().map_err(|err| DriverError::Io(std::io::Error::other(err)))?;
        let history_path = history_path();

        if let Some(path) = &history_path {
            let _ = editor.load_history(path);
        }

        loop {
            match editor.readline("> ") {
                Ok(line) => {
                    let _ = editor.add_history_entry(line.as_str());
                    self.run(&line);
                    error::reset_error();
                },
                Err(ReadlineError::Interrupted) => continue,
                Err(ReadlineError::Eof) => break,
                Err(err) => return Err(DriverError::Io(std::io::Error::other(err))),
            }
        }

        if let Some(path) = &history_path {
            let _ = editor.save_history(path);
        }

        Ok(())
    }

    fn run(&mut self, source: &str) {
        let mut scanner = Scanner::new(source);
        let tokens = scanner.scan_tokens();

        if error::did_error() {
            return;
        }

        let mut parser = Parser::new(tokens);
        let statements = match parser.parse() {
            Some(statements) => statements,
            None => return,
        };

        if error::did_error() {
            return;
        }

        let mut resolver = Resolver::new(&mut self.interpreter);
        resolver.resolve(&statements);

        if error::did_error() {
            return;
        }

        self.interpreter.interpret(&statements);
    }
}

impl Default for Lox {
    fn default() -> Self {
        Self::new()
    }
}

fn history_path() -> Option<PathBuf> {
    home::home_dir().map(|mut path| {
        path.push(".lox_history");
        path
    })
}
