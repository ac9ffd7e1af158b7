use std::io::{self, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use bftape::generator::Generator;
use bftape::interpreter::{EofPolicy, Interpreter, VmConfig};

#[derive(Parser)]
#[command(name = "bftape", about = "Brainfuck tape VM and text-to-code generator")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Execute a program file against the process's stdin/stdout.
    Run {
        /// Path to the program file.
        file: PathBuf,

        /// Tape length in cells.
        #[arg(long, default_value_t = 30_000)]
        tape_len: usize,

        /// Maximum steps before aborting (0 for unbounded).
        #[arg(long, default_value_t = 1_000_000)]
        max_steps: u64,

        /// End-of-input policy: leave, zero, or byte:<n>.
        #[arg(long, default_value = "leave")]
        eof: String,

        /// Print final pointer and step count to stderr.
        #[arg(long)]
        stats: bool,
    },

    /// Generate a program that prints the given text.
    Gen {
        /// Text the generated program should output.
        text: String,

        /// Number of simulated cells.
        #[arg(long, default_value_t = 10)]
        cells: usize,

        /// Use the single-cell baseline generator instead.
        #[arg(long)]
        simple: bool,

        /// Cell used by the baseline generator.
        #[arg(long, default_value_t = 0)]
        start_cell: usize,

        /// Also execute the generated program.
        #[arg(long)]
        run: bool,
    },
}

/// Parse an end-of-input policy specification string.
fn parse_eof(s: &str) -> Result<EofPolicy, String> {
    match s {
        "leave" => Ok(EofPolicy::LeaveUnchanged),
        "zero" => Ok(EofPolicy::SetToZero),
        other => match other.strip_prefix("byte:") {
            Some(n) => n
                .parse::<u8>()
                .map(EofPolicy::SetTo)
                .map_err(|e| format!("Invalid sentinel byte '{n}': {e}")),
            None => Err(format!(
                "Invalid eof policy '{other}', expected leave, zero, or byte:<n>"
            )),
        },
    }
}

fn main() {
    let cli = Cli::parse();
    match cli.command {
        Command::Run {
            file,
            tape_len,
            max_steps,
            eof,
            stats,
        } => {
            if tape_len == 0 {
                eprintln!("Tape length must be positive");
                std::process::exit(1);
            }
            let eof = match parse_eof(&eof) {
                Ok(policy) => policy,
                Err(e) => {
                    eprintln!("{e}");
                    std::process::exit(1);
                }
            };
            let source = match std::fs::read_to_string(&file) {
                Ok(source) => source,
                Err(e) => {
                    eprintln!("Cannot read {}: {e}", file.display());
                    std::process::exit(1);
                }
            };
            let config = VmConfig {
                tape_len,
                eof,
                max_steps: if max_steps == 0 { None } else { Some(max_steps) },
            };
            let mut vm = Interpreter::stdio(config);
            match vm.execute(&source) {
                Ok(state) => {
                    if stats {
                        eprintln!(
                            "steps: {}, pointer: {}, pc: {}",
                            state.steps, state.pointer, state.program_counter
                        );
                    }
                }
                Err(e) => {
                    eprintln!("{e}");
                    std::process::exit(1);
                }
            }
        }
        Command::Gen {
            text,
            cells,
            simple,
            start_cell,
            run,
        } => {
            let code = if simple {
                Generator::simple_generate(&text, start_cell)
            } else {
                Generator::new(cells).generate(&text)
            };
            println!("{code}");

            if run {
                let mut vm = Interpreter::new(VmConfig::default(), io::empty(), io::stdout());
                if let Err(e) = vm.execute(&code) {
                    eprintln!("{e}");
                    std::process::exit(1);
                }
                let _ = io::stdout().flush();
                println!();
            }
        }
    }
}
