//! Shared test-only driver for integration tests: runs a Lox source string
//! through the same scan/parse/resolve/interpret pipeline `Lox::run` uses,
//! capturing printed output and the sticky error flags instead of letting
//! them go to the process's real stdout/stderr.

use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;
use std::sync::Mutex;

use lox::error;
use lox::interpreter::Interpreter;
use lox::parser::Parser;
use lox::resolver::Resolver;
use lox::scanner::Scanner;

/// The sticky error flags in `lox::error` are process-wide statics. Cargo
/// runs integration tests in parallel threads within one process, so every
/// test here takes this lock before touching them to avoid racing another
/// test's scan/parse/resolve/interpret pass.
static TEST_LOCK: Mutex<()> = Mutex::new(());

#[derive(Clone, Default)]
struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.borrow_mut().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

pub struct Run {
    pub output: String,
    pub had_error: bool,
    pub had_runtime_error: bool,
}

/// Runs `source` to completion and returns everything it printed plus
/// whether a static or runtime error was reported. Mirrors `Lox::run`'s
/// phase-by-phase short-circuiting (a scan error skips parsing, a parse
/// error skips resolving, and so on).
pub fn run(source: &str) -> Run {
    let _guard = TEST_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    error::reset_error();

    let buffer = SharedBuffer::default();
    let mut interpreter = Interpreter::with_writer(Box::new(buffer.clone()));

    let tokens = Scanner::new(source).scan_tokens();

    if !error::did_error() {
        if let Some(statements) = Parser::new(tokens).parse() {
            if !error::did_error() {
                Resolver::new(&mut interpreter).resolve(&statements);

                if !error::did_error() {
                    interpreter.interpret(&statements);
                }
            }
        }
    }

    let had_error = error::did_error();
    let had_runtime_error = error::did_runtime_error();
    let output = String::from_utf8(buffer.0.borrow().clone()).expect("print output to be valid UTF-8");

    error::reset_error();

    Run { output, had_error, had_runtime_error }
}

/// Asserts that `source` prints exactly `lines` (each gaining a trailing
/// newline) and reports no error of any kind.
#[allow(dead_code)]
pub fn assert_prints(source: &str, lines: &[&str]) {
    let result = run(source);
    assert!(!result.had_error, "expected no error, got output: {:?}", result.output);

    let expected = if lines.is_empty() { String::new() } else { format!("{}\n", lines.join("\n")) };
    assert_eq!(result.output, expected);
}

static TMP_COUNTER: std::sync::atomic::AtomicUsize = std::sync::atomic::AtomicUsize::new(0);

/// Writes `source` to a fresh file under the system temp directory for
/// tests that drive the real `lox` binary end to end (exit status, actual
/// stderr text) via `assert_cmd` rather than the in-process pipeline above.
#[allow(dead_code)]
pub fn write_temp_script(source: &str) -> std::path::PathBuf {
    let id = TMP_COUNTER.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
    let mut path = std::env::temp_dir();
    path.push(format!("lox-test-{}-{id}.lox", std::process::id()));
    std::fs::write(&path, source).expect("write temp script");
    path
}
