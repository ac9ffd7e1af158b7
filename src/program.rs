use crate::error::{Error, Result};

pub const MOVE_LEFT: u8 = b'<';
pub const MOVE_RIGHT: u8 = b'>';
pub const INCREMENT: u8 = b'+';
pub const DECREMENT: u8 = b'-';
pub const OUTPUT: u8 = b'.';
pub const INPUT: u8 = b',';
pub const LOOP_OPEN: u8 = b'[';
pub const LOOP_CLOSE: u8 = b']';

/// Sentinel for non-bracket slots in the jump table. Never read by the
/// engine: the table is only consulted at bracket positions, and validation
/// guarantees every bracket has a partner.
const NO_JUMP: usize = usize::MAX;

/// Returns true for the eight instruction bytes; everything else is a
/// comment and is stripped before validation.
pub fn is_instruction(byte: u8) -> bool {
    matches!(
        byte,
        MOVE_LEFT
            | MOVE_RIGHT
            | INCREMENT
            | DECREMENT
            | OUTPUT
            | INPUT
            | LOOP_OPEN
            | LOOP_CLOSE
    )
}

/// A validated program: the cleaned instruction stream plus a bidirectional
/// jump table pairing every `[` with its `]`. Immutable once parsed.
#[derive(Debug)]
pub struct Program {
    code: Vec<u8>,
    jumps: Vec<usize>,
}

impl Program {
    /// Strip comment characters, check bracket nesting, and build the jump
    /// table in one left-to-right scan with an explicit position stack.
    ///
    /// Fails before any instruction could execute: `]` with no pending `[`
    /// is rejected the moment it is seen, and any `[` still open at the end
    /// of the scan is reported with its position.
    pub fn parse(source: &str) -> Result<Self> {
        let code: Vec<u8> = source.bytes().filter(|&b| is_instruction(b)).collect();

        let mut jumps = vec![NO_JUMP; code.len()];
        let mut stack: Vec<usize> = Vec::new();

        for (pos, &byte) in code.iter().enumerate() {
            match byte {
                LOOP_OPEN => stack.push(pos),
                LOOP_CLOSE => {
                    let open = stack
                        .pop()
                        .ok_or(Error::UnmatchedCloseBracket(pos))?;
                    jumps[open] = pos;
                    jumps[pos] = open;
                }
                _ => {}
            }
        }

        if !stack.is_empty() {
            return Err(Error::UnmatchedOpenBracket(stack));
        }

        Ok(Self { code, jumps })
    }

    /// The cleaned instruction stream.
    pub fn code(&self) -> &[u8] {
        &self.code
    }

    pub fn len(&self) -> usize {
        self.code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }

    /// Position of the bracket matching the one at `pos`.
    ///
    /// Only meaningful at bracket positions; validation guarantees a
    /// partner exists for every one of them.
    pub fn jump_target(&self, pos: usize) -> usize {
        self.jumps[pos]
    }
}
