//!
//! Score storage of the trellis
//!
//! * `ScoreBuffers`: two rows of `n_states` scores, used alternately
//! * `ScoreMatrix`: dense `n_positions x n_states` scores
//! * `TracebackTable`: predecessor of each cell
//!
use crate::common::StateIndex;
use crate::prob::Prob;

///
/// Predecessor sentinel of the traceback table
///
pub const NONE: StateIndex = StateIndex::MAX;

///
/// Ping-pong buffers holding the scores of the previous and current
/// position.
///
/// After `advance()` the former current row becomes `previous` and the new
/// `current` is filled with `p=0`.
///
#[derive(Debug, Clone)]
pub struct ScoreBuffers {
    rows: [Vec<Prob>; 2],
    cur: usize,
}

impl ScoreBuffers {
    pub fn new(n_states: usize) -> Self {
        ScoreBuffers {
            rows: [vec![Prob::zero(); n_states], vec![Prob::zero(); n_states]],
            cur: 0,
        }
    }
    pub fn n_states(&self) -> usize {
        self.rows[0].len()
    }
    pub fn current(&self) -> &[Prob] {
        &self.rows[self.cur]
    }
    pub fn previous(&self) -> &[Prob] {
        &self.rows[1 - self.cur]
    }
    pub fn current_mut(&mut self) -> &mut [Prob] {
        &mut self.rows[self.cur]
    }
    ///
    /// (previous, current) at once, for filling the current row from the
    /// previous one.
    ///
    pub fn split(&mut self) -> (&[Prob], &mut [Prob]) {
        let (a, b) = self.rows.split_at_mut(1);
        if self.cur == 0 {
            (&b[0], &mut a[0])
        } else {
            (&a[0], &mut b[0])
        }
    }
    /// swap the rows and clear the new current row
    pub fn advance(&mut self) {
        self.cur = 1 - self.cur;
        for x in self.rows[self.cur].iter_mut() {
            *x = Prob::zero();
        }
    }
    /// fill both rows with `p=0`
    pub fn clear(&mut self) {
        for row in self.rows.iter_mut() {
            for x in row.iter_mut() {
                *x = Prob::zero();
            }
        }
        self.cur = 0;
    }
    /// Is every score of both rows `p=0`?
    pub fn is_cleared(&self) -> bool {
        self.rows.iter().all(|row| row.iter().all(|x| x.is_zero()))
    }
}

///
/// Dense score table of `n_positions x n_states`
///
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreMatrix {
    n_states: usize,
    cells: Vec<Prob>,
}

impl ScoreMatrix {
    pub fn new(n_positions: usize, n_states: usize) -> Self {
        ScoreMatrix {
            n_states,
            cells: vec![Prob::zero(); n_positions * n_states],
        }
    }
    pub fn n_positions(&self) -> usize {
        if self.n_states == 0 {
            0
        } else {
            self.cells.len() / self.n_states
        }
    }
    pub fn n_states(&self) -> usize {
        self.n_states
    }
    pub fn get(&self, pos: usize, state: StateIndex) -> Prob {
        self.cells[pos * self.n_states + state]
    }
    pub fn set(&mut self, pos: usize, state: StateIndex, value: Prob) {
        self.cells[pos * self.n_states + state] = value;
    }
    pub fn row(&self, pos: usize) -> &[Prob] {
        &self.cells[pos * self.n_states..(pos + 1) * self.n_states]
    }
    pub fn set_row(&mut self, pos: usize, row: &[Prob]) {
        self.cells[pos * self.n_states..(pos + 1) * self.n_states].copy_from_slice(row);
    }
    /// iterate over rows
    pub fn rows(&self) -> impl Iterator<Item = &[Prob]> + '_ {
        self.cells.chunks(self.n_states.max(1))
    }
}

///
/// Best predecessor of each (position, state) cell.
///
/// Cells never reached, and every cell at position 0, hold `NONE`.
///
#[derive(Debug, Clone, PartialEq)]
pub struct TracebackTable {
    n_states: usize,
    cells: Vec<StateIndex>,
}

impl TracebackTable {
    pub fn new(n_positions: usize, n_states: usize) -> Self {
        TracebackTable {
            n_states,
            cells: vec![NONE; n_positions * n_states],
        }
    }
    pub fn get(&self, pos: usize, state: StateIndex) -> Option<StateIndex> {
        match self.cells[pos * self.n_states + state] {
            NONE => None,
            s => Some(s),
        }
    }
    pub fn set(&mut self, pos: usize, state: StateIndex, prev: StateIndex) {
        self.cells[pos * self.n_states + state] = prev;
    }
    ///
    /// Follow predecessors from `(pos, state)` back to position 0.
    /// Returns the states in the tail-first order.
    ///
    pub fn trace(&self, pos: usize, state: StateIndex) -> Vec<StateIndex> {
        let mut states = Vec::with_capacity(pos + 1);
        let mut s = state;
        states.push(s);
        for p in (1..=pos).rev() {
            match self.get(p, s) {
                Some(prev) => {
                    s = prev;
                    states.push(s);
                }
                None => break,
            }
        }
        states
    }
}
