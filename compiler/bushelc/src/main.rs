//! Bushel CLI
//!
//! Runs serialized BushelScript programs (JSON `ProgramDocument`s).

use std::path::Path;
use std::process::ExitCode;

use bushel_ir::{Program, ProgramDocument};
use bushel_rt::{RunError, Runtime, RuntimeConfig, Value};

/// Initialize tracing when `RUST_LOG` is set.
///
/// `BUSHEL_LOG_TREE=1` switches to indented span trees.
fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    if std::env::var("RUST_LOG").is_err() {
        return;
    }
    let filter = EnvFilter::from_default_env();
    if std::env::var("BUSHEL_LOG_TREE").is_ok_and(|v| v == "1") {
        tracing_subscriber::registry()
            .with(tracing_tree::HierarchicalLayer::new(2).with_targets(true))
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_target(true).with_level(true).with_writer(std::io::stderr))
            .with(filter)
            .init();
    }
}

fn load_program(path: &Path) -> Result<Program, String> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    parse_program(&text).map_err(|e| format!("{}: {e}", path.display()))
}

fn parse_program(text: &str) -> Result<Program, String> {
    let document: ProgramDocument =
        serde_json::from_str(text).map_err(|e| format!("invalid program: {e}"))?;
    document.into_program().map_err(|e| e.to_string())
}

fn run_file(path: &str) -> ExitCode {
    let program = match load_program(Path::new(path)) {
        Ok(program) => program,
        Err(message) => {
            eprintln!("error: {message}");
            return ExitCode::from(2);
        }
    };

    let name = Path::new(path)
        .file_stem()
        .map_or_else(|| program.name.clone(), |stem| stem.to_string_lossy().into_owned());
    let mut runtime = Runtime::builder()
        .script_name(name)
        .config(RuntimeConfig::from_env())
        .build();

    match runtime.run(&program) {
        Ok(Value::Null) => ExitCode::SUCCESS,
        Ok(value) => {
            println!("{value}");
            ExitCode::SUCCESS
        }
        Err(RunError::Terminated) => {
            eprintln!("terminated");
            ExitCode::from(130)
        }
        Err(RunError::Error(error)) => {
            eprintln!("error: {error}");
            ExitCode::from(1)
        }
    }
}

fn print_usage() {
    println!("Bushel - BushelScript runtime");
    println!();
    println!("Usage: bushel <command> [args]");
    println!();
    println!("Commands:");
    println!("  run <program.json>  Run a serialized program and print its result");
    println!("  help                Show this message");
    println!();
    println!("Environment:");
    println!("  RUST_LOG                 Enable tracing (e.g. RUST_LOG=bushel_rt=debug)");
    println!("  BUSHEL_LOG_TREE=1        Render traces as span trees");
    println!("  BUSHEL_MAX_CALL_DEPTH    Limit nested function calls");
    println!("  BUSHEL_DELAY_SLICE_MS    Termination polling interval for delay");
}

fn main() -> ExitCode {
    init_tracing();
    let args: Vec<String> = std::env::args().collect();

    match args.get(1).map(String::as_str) {
        Some("run") => match args.get(2) {
            Some(path) => run_file(path),
            None => {
                eprintln!("Usage: bushel run <program.json>");
                ExitCode::from(2)
            }
        },
        Some("help" | "-h" | "--help") => {
            print_usage();
            ExitCode::SUCCESS
        }
        Some(other) => {
            eprintln!("error: unknown command '{other}'");
            print_usage();
            ExitCode::from(2)
        }
        None => {
            print_usage();
            ExitCode::from(2)
        }
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests {
    use bushel_ir::{BinaryOp, ProgramBuilder, ProgramDocument};
    use bushel_rt::{silent_output, Runtime, Value};

    use super::parse_program;

    #[test]
    fn documents_round_trip_into_runnable_programs() {
        let mut b = ProgramBuilder::new("sum");
        let two = b.integer(2);
        let three = b.integer(3);
        let root = b.infix(BinaryOp::Add, two, three);
        let program = b.finish(root).unwrap();
        let json = serde_json::to_string(&ProgramDocument::from(&program)).unwrap();

        let loaded = parse_program(&json).unwrap();
        let value = Runtime::builder().output(silent_output()).build().run(&loaded).unwrap();
        assert!(matches!(value, Value::Integer(5)));
    }

    #[test]
    fn malformed_documents_are_rejected() {
        let error = parse_program("{\"exprs\": []}").unwrap_err();
        assert!(error.starts_with("invalid program"), "{error}");
    }
}
