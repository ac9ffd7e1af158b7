use std::io::{self, Read, Write};

use crate::error::{Error, Result};
use crate::program::{
    DECREMENT, INCREMENT, INPUT, LOOP_CLOSE, LOOP_OPEN, MOVE_LEFT, MOVE_RIGHT, OUTPUT, Program,
};

/// What an input instruction does to the current cell once the input source
/// is exhausted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EofPolicy {
    /// Leave the cell untouched.
    LeaveUnchanged,
    /// Store 0.
    SetToZero,
    /// Store a fixed sentinel byte.
    SetTo(u8),
}

/// Engine configuration. Read-only during execution; one configured
/// interpreter can run many programs sequentially.
pub struct VmConfig {
    /// Number of cells on the tape.
    pub tape_len: usize,
    /// Applied uniformly whenever the input source is exhausted.
    pub eof: EofPolicy,
    /// Step ceiling, `None` for unbounded.
    pub max_steps: Option<u64>,
}

impl Default for VmConfig {
    fn default() -> Self {
        Self {
            tape_len: 30_000,
            eof: EofPolicy::LeaveUnchanged,
            max_steps: Some(1_000_000),
        }
    }
}

/// State left behind by a completed run.
#[derive(Debug)]
pub struct ExecutionState {
    pub tape: Vec<u8>,
    pub pointer: usize,
    pub program_counter: usize,
    pub steps: u64,
}

/// The execution engine: a fetch-decode-execute loop over a bounded tape of
/// wrapping u8 cells, with injected byte-stream endpoints for `,` and `.`.
///
/// Each `execute` call builds fresh per-run state (jump table, tape,
/// counters) and discards it on return, so the interpreter is reusable
/// across sequential runs. It is not safe to invoke concurrently: the two
/// endpoints are owned exclusively and reads/writes on them happen in
/// instruction order.
pub struct Interpreter<R: Read, W: Write> {
    config: VmConfig,
    input: R,
    output: W,
}

impl Interpreter<io::Stdin, io::Stdout> {
    /// An interpreter wired to the process's stdin and stdout.
    pub fn stdio(config: VmConfig) -> Self {
        Self::new(config, io::stdin(), io::stdout())
    }
}

impl<R: Read, W: Write> Interpreter<R, W> {
    pub fn new(config: VmConfig, input: R, output: W) -> Self {
        Self {
            config,
            input,
            output,
        }
    }

    /// Run `source` on a zeroed tape with the pointer at cell 0.
    pub fn execute(&mut self, source: &str) -> Result<ExecutionState> {
        self.execute_with(source, &[], 0)
    }

    /// Run `source` with the first cells preloaded from `initial_tape` (the
    /// rest zero-filled) and the pointer starting at `initial_pointer`,
    /// reduced modulo the tape length.
    ///
    /// Validation rejects the program before any instruction executes, so a
    /// failing program has no observable side effects.
    pub fn execute_with(
        &mut self,
        source: &str,
        initial_tape: &[u8],
        initial_pointer: usize,
    ) -> Result<ExecutionState> {
        let tape_len = self.config.tape_len;
        assert!(tape_len > 0, "tape length must be positive");

        let program = Program::parse(source)?;

        if initial_tape.len() > tape_len {
            return Err(Error::TapeOverflow {
                given: initial_tape.len(),
                tape_len,
            });
        }
        let mut tape = vec![0u8; tape_len];
        tape[..initial_tape.len()].copy_from_slice(initial_tape);

        let mut pointer = initial_pointer % tape_len;
        let mut pc: usize = 0;
        let mut steps: u64 = 0;
        let code = program.code();

        while pc < code.len() {
            match code[pc] {
                MOVE_RIGHT => pointer = (pointer + 1) % tape_len,
                MOVE_LEFT => pointer = (pointer + tape_len - 1) % tape_len,
                INCREMENT => tape[pointer] = tape[pointer].wrapping_add(1),
                DECREMENT => tape[pointer] = tape[pointer].wrapping_sub(1),
                OUTPUT => {
                    self.output.write_all(&[tape[pointer]])?;
                    self.output.flush()?;
                }
                INPUT => match read_byte(&mut self.input)? {
                    Some(byte) => tape[pointer] = byte,
                    None => match self.config.eof {
                        EofPolicy::LeaveUnchanged => {}
                        EofPolicy::SetToZero => tape[pointer] = 0,
                        EofPolicy::SetTo(sentinel) => tape[pointer] = sentinel,
                    },
                },
                LOOP_OPEN => {
                    if tape[pointer] == 0 {
                        // Land on the matching ']'; the increment below
                        // steps past it without re-testing the cell.
                        pc = program.jump_target(pc);
                    }
                }
                LOOP_CLOSE => {
                    if tape[pointer] != 0 {
                        // Land on the matching '['; the increment below
                        // steps straight into the loop body.
                        pc = program.jump_target(pc);
                    }
                }
                _ => unreachable!("cleaned stream holds instruction bytes only"),
            }

            pc += 1;
            steps += 1;

            if let Some(limit) = self.config.max_steps {
                if steps >= limit {
                    return Err(Error::StepLimitExceeded(limit));
                }
            }
        }

        Ok(ExecutionState {
            tape,
            pointer,
            program_counter: pc,
            steps,
        })
    }
}

/// Read one byte from the source, `None` on exhaustion.
fn read_byte<R: Read>(input: &mut R) -> io::Result<Option<u8>> {
    let mut buf = [0u8; 1];
    loop {
        match input.read(&mut buf) {
            Ok(0) => return Ok(None),
            Ok(_) => return Ok(Some(buf[0])),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small(tape_len: usize) -> VmConfig {
        VmConfig {
            tape_len,
            ..VmConfig::default()
        }
    }

    /// Run with no input and capture output.
    fn run(config: VmConfig, source: &str) -> (Result<ExecutionState>, Vec<u8>) {
        let mut output = Vec::new();
        let result = Interpreter::new(config, io::empty(), &mut output).execute(source);
        (result, output)
    }

    #[test]
    fn empty_program_terminates_immediately() {
        let (result, output) = run(VmConfig::default(), "just a comment");
        let state = result.unwrap();
        assert_eq!(state.steps, 0);
        assert_eq!(state.pointer, 0);
        assert!(output.is_empty());
    }

    #[test]
    fn move_left_wraps_to_last_cell() {
        let (result, _) = run(small(8), "<");
        assert_eq!(result.unwrap().pointer, 7);
    }

    #[test]
    fn move_right_full_cycle_returns_home() {
        let (result, _) = run(small(5), ">>>>>");
        assert_eq!(result.unwrap().pointer, 0);
    }

    #[test]
    fn decrement_from_zero_wraps_to_255() {
        let (result, _) = run(small(4), "-");
        assert_eq!(result.unwrap().tape[0], 255);
    }

    #[test]
    fn increment_256_times_wraps_to_zero() {
        let source = "+".repeat(256);
        let (result, _) = run(small(4), &source);
        assert_eq!(result.unwrap().tape[0], 0);
    }

    #[test]
    fn clear_loop_drains_cell() {
        // [-] with the cell at v runs the body v times: 3 steps for the
        // first pass, then 2 per pass ( ']' jumps onto '[' and the advance
        // lands in the body, so '[' is only tested once ).
        for (v, expected_steps) in [(0u8, 1u64), (1, 3), (255, 511)] {
            let mut output = Vec::new();
            let mut vm = Interpreter::new(small(4), io::empty(), &mut output);
            let state = vm.execute_with("[-]", &[v], 0).unwrap();
            assert_eq!(state.tape[0], 0, "v={v}");
            assert_eq!(state.steps, expected_steps, "v={v}");
        }
    }

    #[test]
    fn copy_loop_moves_value() {
        let (result, output) = run(small(4), "++[>+++<-]>.");
        let state = result.unwrap();
        assert_eq!(output, vec![6]);
        assert_eq!(state.tape[0], 0);
        assert_eq!(state.tape[1], 6);
    }

    #[test]
    fn output_writes_bytes_in_order() {
        let mut output = Vec::new();
        let mut vm = Interpreter::new(small(4), io::empty(), &mut output);
        vm.execute_with(".+.+.", &[65], 0).unwrap();
        assert_eq!(output, vec![65, 66, 67]);
    }

    #[test]
    fn input_stores_bytes() {
        let mut output = Vec::new();
        let mut vm = Interpreter::new(small(4), &b"AB"[..], &mut output);
        vm.execute(",.>,.").unwrap();
        assert_eq!(output, vec![b'A', b'B']);
    }

    #[test]
    fn eof_leave_unchanged_keeps_cell() {
        let mut output = Vec::new();
        let mut vm = Interpreter::new(small(4), io::empty(), &mut output);
        let state = vm.execute_with(",", &[42], 0).unwrap();
        assert_eq!(state.tape[0], 42);
    }

    #[test]
    fn eof_set_to_zero_clears_cell_every_time() {
        let config = VmConfig {
            tape_len: 4,
            eof: EofPolicy::SetToZero,
            ..VmConfig::default()
        };
        let mut output = Vec::new();
        let mut vm = Interpreter::new(config, io::empty(), &mut output);
        let state = vm.execute_with(",+,", &[42], 0).unwrap();
        assert_eq!(state.tape[0], 0);
    }

    #[test]
    fn eof_sentinel_stores_payload() {
        let config = VmConfig {
            tape_len: 4,
            eof: EofPolicy::SetTo(7),
            ..VmConfig::default()
        };
        let mut output = Vec::new();
        let mut vm = Interpreter::new(config, io::empty(), &mut output);
        let state = vm.execute(",").unwrap();
        assert_eq!(state.tape[0], 7);
    }

    #[test]
    fn step_limit_fails_after_exactly_k_steps() {
        let config = VmConfig {
            tape_len: 4,
            max_steps: Some(100),
            ..VmConfig::default()
        };
        // +[] never terminates: ']' keeps jumping onto '[' and advancing
        // back to itself.
        let (result, _) = run(config, "+[]");
        assert!(matches!(result, Err(Error::StepLimitExceeded(100))));
    }

    #[test]
    fn step_limit_counts_the_final_instruction() {
        // The ceiling check runs after every step, so finishing on exactly
        // the limit still fails.
        let config = VmConfig {
            tape_len: 4,
            max_steps: Some(2),
            ..VmConfig::default()
        };
        let (result, _) = run(config, "++");
        assert!(matches!(result, Err(Error::StepLimitExceeded(2))));
    }

    #[test]
    fn unbounded_ceiling_lets_long_runs_finish() {
        let config = VmConfig {
            tape_len: 4,
            max_steps: None,
            ..VmConfig::default()
        };
        let source = "+".repeat(300);
        let (result, _) = run(config, &source);
        assert_eq!(result.unwrap().steps, 300);
    }

    #[test]
    fn output_before_step_limit_failure_is_preserved() {
        let config = VmConfig {
            tape_len: 4,
            max_steps: Some(10),
            ..VmConfig::default()
        };
        let mut output = Vec::new();
        let result = Interpreter::new(config, io::empty(), &mut output).execute("+.[]");
        assert!(matches!(result, Err(Error::StepLimitExceeded(10))));
        assert_eq!(output, vec![1]);
    }

    #[test]
    fn oversized_initial_tape_is_rejected() {
        let mut output = Vec::new();
        let mut vm = Interpreter::new(small(4), io::empty(), &mut output);
        let result = vm.execute_with("+", &[0; 5], 0);
        assert!(matches!(
            result,
            Err(Error::TapeOverflow {
                given: 5,
                tape_len: 4
            })
        ));
    }

    #[test]
    fn short_initial_tape_is_zero_filled() {
        let mut output = Vec::new();
        let mut vm = Interpreter::new(small(4), io::empty(), &mut output);
        let state = vm.execute_with("", &[5], 0).unwrap();
        assert_eq!(state.tape, vec![5, 0, 0, 0]);
    }

    #[test]
    fn initial_pointer_selects_starting_cell() {
        let mut output = Vec::new();
        let mut vm = Interpreter::new(small(4), io::empty(), &mut output);
        vm.execute_with(".", &[0, 65], 1).unwrap();
        assert_eq!(output, vec![65]);
    }

    #[test]
    fn invalid_program_has_no_side_effects() {
        // The '+' and '.' before the stray ']' must never run.
        let (result, output) = run(small(4), "+.]");
        assert!(matches!(result, Err(Error::UnmatchedCloseBracket(2))));
        assert!(output.is_empty());
    }

    #[test]
    fn interpreter_is_reusable_across_runs() {
        let mut vm = Interpreter::new(small(4), io::empty(), io::sink());
        let first = vm.execute("+++").unwrap();
        let second = vm.execute("+").unwrap();
        assert_eq!(first.tape[0], 3);
        assert_eq!(second.tape[0], 1);
    }
}
