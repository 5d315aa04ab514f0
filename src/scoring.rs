use serde::Serialize;

pub const POINTS_PER_LINE: u32 = 100;

/// Running totals for one session. Flat per-line scoring, no combos.
#[derive(Clone, Copy, Serialize, Debug, Default, PartialEq, Eq)]
pub struct Scoring {
    pub score: u32,
    pub lines: u32,
    pub pieces: u32,
}

impl Scoring {
    pub fn record_lock(&mut self, cleared: usize) {
        let cleared = cleared as u32;
        self.pieces = self.pieces.saturating_add(1);
        self.lines = self.lines.saturating_add(cleared);
        self.score = self
            .score
            .saturating_add(cleared.saturating_mul(POINTS_PER_LINE));
    }
}
