/// Greedy text-to-program generator.
///
/// Simulates a small tape of remembered cell values and, for every byte of
/// the target text, picks the cell whose move-distance plus value-delta is
/// cheapest, then emits the moves, the `+`/`-` run, and a `.`. One byte of
/// lookahead only; it never searches multi-byte sequences.
///
/// The virtual pointer persists across `generate` calls on the same
/// instance (the cell model does not), so a reused generator picks up where
/// the previous program left the pointer. Call [`Generator::reset`] between
/// unrelated texts.
pub struct Generator {
    cell_count: usize,
    pointer: usize,
}

impl Default for Generator {
    fn default() -> Self {
        Self::new(10)
    }
}

impl Generator {
    /// `cell_count` is the number of simulated cells and must be at least 1.
    pub fn new(cell_count: usize) -> Self {
        assert!(cell_count >= 1, "generator needs at least one cell");
        Self {
            cell_count,
            pointer: 0,
        }
    }

    /// Move the virtual pointer back to cell 0.
    pub fn reset(&mut self) {
        self.pointer = 0;
    }

    /// Generate a program whose output is exactly the UTF-8 bytes of `text`.
    pub fn generate(&mut self, text: &str) -> String {
        let mut code = String::new();
        let mut cells = vec![0u8; self.cell_count];

        for target in text.bytes() {
            // Cheapest cell: moves to reach it plus increments/decrements
            // to retune it. Ties go to the lowest index.
            let mut best_cell = 0;
            let mut best_cost = usize::MAX;
            for (cell, &value) in cells.iter().enumerate() {
                let cost = cell.abs_diff(self.pointer) + value.abs_diff(target) as usize;
                if cost < best_cost {
                    best_cost = cost;
                    best_cell = cell;
                }
            }

            push_moves(&mut code, self.pointer, best_cell);
            push_deltas(&mut code, cells[best_cell], target);
            code.push('.');
            cells[best_cell] = target;
            self.pointer = best_cell;
        }

        code
    }

    /// Single-cell baseline: park the pointer on `start_cell` and retune
    /// that one cell for every byte. No search, no instance state.
    pub fn simple_generate(text: &str, start_cell: usize) -> String {
        let mut code = String::new();
        let mut current: u8 = 0;
        let mut pointer = 0;

        for target in text.bytes() {
            if pointer != start_cell {
                push_moves(&mut code, pointer, start_cell);
                pointer = start_cell;
            }
            push_deltas(&mut code, current, target);
            code.push('.');
            current = target;
        }

        code
    }
}

/// Emit the `>`/`<` run taking the pointer from `from` to `to`.
fn push_moves(code: &mut String, from: usize, to: usize) {
    if to > from {
        code.push_str(&">".repeat(to - from));
    } else if to < from {
        code.push_str(&"<".repeat(from - to));
    }
}

/// Emit the `+`/`-` run taking a cell from `current` to `target`.
fn push_deltas(code: &mut String, current: u8, target: u8) {
    if target > current {
        code.push_str(&"+".repeat((target - current) as usize));
    } else if target < current {
        code.push_str(&"-".repeat((current - target) as usize));
    }
}
