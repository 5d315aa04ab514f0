use std::collections::VecDeque;

use serde::Serialize;

use crate::bag::{PieceQueue, Randomizer, SevenBag, PREVIEW_DEPTH};
use crate::board::Board;
use crate::command::Command;
use crate::piece::{ActivePiece, Point};
use crate::scoring::Scoring;
use crate::settings::Settings;
use crate::shape::PieceKind;
use crate::{log, COLS, ROWS};

/// Scheduler state. `Locking`, `LineClearing` and `Spawning` are passed
/// through inside a single step; between steps the game rests in `Falling`,
/// `Paused` or `GameOver`.
#[derive(Clone, Copy, Serialize, Debug, PartialEq, Eq)]
pub enum Phase {
    Spawning,
    Falling,
    Locking,
    LineClearing,
    Paused,
    GameOver,
}

#[derive(Clone, Copy, Serialize, Debug, PartialEq, Eq)]
pub enum RenderCell {
    Empty,
    Block(PieceKind),
    Ghost(PieceKind),
}

pub type RenderGrid = [[RenderCell; COLS]; ROWS];

#[derive(Clone, Serialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub score: u32,
    pub lines: u32,
    pub pieces: u32,
    pub tick_ms: u32,
    pub drops_per_second: f32,
    pub state: Phase,
    /// Gravity steps processed since the last reset.
    pub ticks: u64,
}

#[derive(Clone, Serialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GameView {
    pub grid: RenderGrid,
    pub active: Vec<Point>,
    pub ghost: Vec<Point>,
    pub upcoming: Vec<PieceKind>,
    pub stats: Stats,
}

/// One play session. All mutation goes through `step`; commands submitted
/// between steps wait in an ordered queue.
pub struct Game {
    settings: Settings,
    board: Board,
    active: Option<ActivePiece>,
    queue: PieceQueue,
    scoring: Scoring,
    tick_ms: u32,
    phase: Phase,
    commands: VecDeque<Command>,
    gravity_accum_ms: f64,
    ticks: u64,
}

impl Game {
    pub fn new(settings: Settings) -> Self {
        let randomizer: Box<dyn Randomizer> = match settings.seed {
            Some(seed) => Box::new(SevenBag::from_seed(seed)),
            None => Box::new(SevenBag::from_entropy()),
        };
        Self::with_randomizer(settings, randomizer)
    }

    pub fn with_randomizer(settings: Settings, randomizer: Box<dyn Randomizer>) -> Self {
        Self::with_board(settings, Board::new(), randomizer)
    }

    /// Starts from a pre-filled well. The first piece spawns immediately, so
    /// a blocked spawn area yields `GameOver` before any step runs.
    pub fn with_board(settings: Settings, board: Board, randomizer: Box<dyn Randomizer>) -> Self {
        let tick_ms = settings.clamp_tick(settings.tick_ms);
        let mut game = Self {
            settings,
            board,
            active: None,
            queue: PieceQueue::new(randomizer),
            scoring: Scoring::default(),
            tick_ms,
            phase: Phase::Spawning,
            commands: VecDeque::new(),
            gravity_accum_ms: 0.0,
            ticks: 0,
        };
        game.advance();
        game
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn active(&self) -> Option<&ActivePiece> {
        self.active.as_ref()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn submit_command(&mut self, cmd: Command) {
        self.commands.push_back(cmd);
    }

    /// Advances the simulation by one host frame. Queued commands run first,
    /// in order; then at most one gravity step once the accumulated time
    /// exceeds the interval.
    /// A piece locked by a command suppresses this frame's gravity step and
    /// any later piece commands from the same frame.
    pub fn step(&mut self, elapsed_ms: f64) {
        // taken up front so a Reset mid-frame cannot drop the commands after it
        let pending = std::mem::take(&mut self.commands);
        let mut locked = false;
        for cmd in pending {
            if locked && cmd.targets_piece() {
                continue;
            }
            // a Reset deals a fresh piece, so later commands target it
            locked = self.apply(cmd) || (locked && cmd != Command::Reset);
        }

        if self.phase != Phase::Falling {
            return;
        }
        if elapsed_ms.is_finite() && elapsed_ms > 0.0 {
            self.gravity_accum_ms += elapsed_ms;
        }
        if self.gravity_accum_ms > f64::from(self.tick_ms) {
            // missed intervals coalesce into this one step
            self.gravity_accum_ms = 0.0;
            if !locked {
                self.ticks += 1;
                self.descend();
            }
        }
    }

    /// Returns true when the command locked the falling piece.
    fn apply(&mut self, cmd: Command) -> bool {
        match cmd {
            // accepted in every phase
            Command::Reset => self.reset(),
            _ if self.phase == Phase::GameOver => {}
            Command::TogglePause if self.phase == Phase::Paused => self.phase = Phase::Falling,
            _ if self.phase == Phase::Paused => {}
            Command::MoveLeft => self.shift(-1),
            Command::MoveRight => self.shift(1),
            Command::RotateCw => {
                if let Some(rotated) = self.active.and_then(|p| p.attempt_rotate(&self.board)) {
                    self.active = Some(rotated);
                }
            }
            Command::SoftDrop => return self.descend(),
            Command::HardDrop => {
                if let Some(piece) = self.active {
                    self.active = Some(piece.hard_drop(&self.board));
                    self.lock();
                    return true;
                }
            }
            Command::TogglePause => self.phase = Phase::Paused,
        }
        false
    }

    fn shift(&mut self, d_col: i32) {
        if let Some(moved) = self.active.and_then(|p| p.attempt_move(&self.board, 0, d_col)) {
            self.active = Some(moved);
        }
    }

    /// One row down; a blocked descent locks. Returns true on lock.
    fn descend(&mut self) -> bool {
        let Some(piece) = self.active else {
            return false;
        };
        match piece.attempt_move(&self.board, 1, 0) {
            Some(next) => {
                self.active = Some(next);
                false
            }
            None => {
                self.lock();
                true
            }
        }
    }

    fn lock(&mut self) {
        self.phase = Phase::Locking;
        self.advance();
    }

    /// Runs the transient phases until the game comes to rest.
    fn advance(&mut self) {
        loop {
            match self.phase {
                Phase::Locking => {
                    if let Some(piece) = self.active.take() {
                        self.board = self.board.merge(&piece);
                    }
                    self.phase = Phase::LineClearing;
                }
                Phase::LineClearing => {
                    let (board, cleared) = self.board.clear_lines();
                    self.board = board;
                    self.scoring.record_lock(cleared);
                    self.phase = Phase::Spawning;
                }
                Phase::Spawning => {
                    let candidate = ActivePiece::spawn(self.queue.pop());
                    if self.board.can_place(&candidate) {
                        self.active = Some(candidate);
                        self.phase = Phase::Falling;
                    } else {
                        self.active = None;
                        self.phase = Phase::GameOver;
                        log(&format!(
                            "top out on spawn: score {} lines {}",
                            self.scoring.score, self.scoring.lines
                        ));
                    }
                }
                Phase::Falling | Phase::Paused | Phase::GameOver => break,
            }
        }
    }

    /// Discards the session and deals a fresh one from new bags. The speed
    /// setting survives.
    pub fn reset(&mut self) {
        self.queue.discard();
        self.board = Board::new();
        self.active = None;
        self.scoring = Scoring::default();
        self.commands.clear();
        self.gravity_accum_ms = 0.0;
        self.ticks = 0;
        self.phase = Phase::Spawning;
        self.advance();
        log("game reset");
    }

    pub fn tick_ms(&self) -> u32 {
        self.tick_ms
    }

    pub fn set_tick_ms(&mut self, tick_ms: u32) {
        self.tick_ms = self.settings.clamp_tick(tick_ms);
    }

    pub fn faster(&mut self) {
        self.set_tick_ms(self.tick_ms.saturating_sub(self.settings.tick_step_ms));
    }

    pub fn slower(&mut self) {
        self.set_tick_ms(self.tick_ms.saturating_add(self.settings.tick_step_ms));
    }

    pub fn ghost(&self) -> Option<ActivePiece> {
        if !self.settings.ghost_enabled {
            return None;
        }
        self.active.map(|p| p.hard_drop(&self.board))
    }

    /// Board plus the falling piece, with the ghost on cells left empty.
    pub fn render_grid(&self) -> RenderGrid {
        let mut grid = [[RenderCell::Empty; COLS]; ROWS];
        for (r, row) in self.board.rows().iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                if let Some(kind) = cell {
                    grid[r][c] = RenderCell::Block(*kind);
                }
            }
        }
        if let Some(ghost) = self.ghost() {
            for (r, c) in visible(ghost.board_cells()) {
                if grid[r][c] == RenderCell::Empty {
                    grid[r][c] = RenderCell::Ghost(ghost.kind);
                }
            }
        }
        if let Some(piece) = self.active {
            for (r, c) in visible(piece.board_cells()) {
                grid[r][c] = RenderCell::Block(piece.kind);
            }
        }
        grid
    }

    pub fn stats(&self) -> Stats {
        Stats {
            score: self.scoring.score,
            lines: self.scoring.lines,
            pieces: self.scoring.pieces,
            tick_ms: self.tick_ms,
            drops_per_second: 1000.0 / self.tick_ms as f32,
            state: self.phase,
            ticks: self.ticks,
        }
    }

    pub fn upcoming(&self, depth: usize) -> Vec<PieceKind> {
        self.queue.upcoming(depth)
    }

    pub fn view(&self) -> GameView {
        let cells = |piece: Option<ActivePiece>| -> Vec<Point> {
            piece
                .map(|p| p.board_cells().map(Point::from).collect())
                .unwrap_or_default()
        };
        GameView {
            grid: self.render_grid(),
            active: cells(self.active),
            ghost: cells(self.ghost()),
            upcoming: self.upcoming(PREVIEW_DEPTH),
            stats: self.stats(),
        }
    }
}

fn visible(cells: impl Iterator<Item = (i32, i32)>) -> impl Iterator<Item = (usize, usize)> {
    cells
        .filter(|&(r, c)| (0..ROWS as i32).contains(&r) && (0..COLS as i32).contains(&c))
        .map(|(r, c)| (r as usize, c as usize))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bag::tests::ScriptedBags;
    use PieceKind::*;

    const ORDER: [PieceKind; 7] = [O, I, T, S, Z, J, L];

    fn game() -> Game {
        Game::with_randomizer(
            Settings::default(),
            Box::new(ScriptedBags::repeating(ORDER)),
        )
    }

    fn run(game: &mut Game, cmds: &[Command]) {
        for &cmd in cmds {
            game.submit_command(cmd);
        }
        game.step(0.0);
    }

    #[test]
    fn spawns_first_piece_at_anchor() {
        let game = game();
        assert_eq!(game.phase(), Phase::Falling);
        let piece = game.active().unwrap();
        assert_eq!((piece.kind, piece.row, piece.col), (O, 0, 3));
        assert_eq!(game.upcoming(PREVIEW_DEPTH), vec![I, T, S, Z, J]);
    }

    #[test]
    fn gravity_waits_for_full_interval() {
        let mut game = game();
        game.step(400.0);
        assert_eq!(game.active().unwrap().row, 0);
        game.step(350.0);
        assert_eq!(game.active().unwrap().row, 0);
        assert_eq!(game.stats().ticks, 0);
        game.step(1.0);
        assert_eq!(game.active().unwrap().row, 1);
        assert_eq!(game.stats().ticks, 1);
    }

    #[test]
    fn long_frame_coalesces_into_one_step() {
        let mut game = game();
        game.step(10_000.0);
        assert_eq!(game.active().unwrap().row, 1);
        game.step(0.0);
        assert_eq!(game.active().unwrap().row, 1);
    }

    #[test]
    fn gravity_locks_o_on_floor_and_spawns_next() {
        let mut game = game();
        for _ in 0..18 {
            game.step(751.0);
        }
        assert_eq!(game.active().unwrap().row, 18);
        assert_eq!(game.board().occupied_count(), 0);

        game.step(751.0);
        for (row, col) in [(18, 3), (18, 4), (19, 3), (19, 4)] {
            assert_eq!(game.board().get(row, col), Some(O));
        }
        let next = game.active().unwrap();
        assert_eq!((next.kind, next.row), (I, 0));
        assert_eq!(game.stats().pieces, 1);
    }

    #[test]
    fn hard_drop_then_move_left_locks_once() {
        let mut game = game();
        run(&mut game, &[Command::HardDrop, Command::MoveLeft]);
        assert_eq!(game.board().occupied_count(), 4);
        assert_eq!(game.board().get(19, 3), Some(O));
        let next = game.active().unwrap();
        assert_eq!((next.kind, next.row, next.col), (I, 0, 3));
        assert_eq!(game.stats().pieces, 1);
    }

    #[test]
    fn command_lock_suppresses_same_frame_gravity() {
        let mut game = game();
        game.submit_command(Command::HardDrop);
        game.step(800.0);
        assert_eq!(game.active().unwrap().row, 0);
        assert_eq!(game.stats().ticks, 0);
    }

    #[test]
    fn commands_apply_in_submission_order() {
        let mut game = game();
        run(
            &mut game,
            &[Command::MoveRight, Command::MoveRight, Command::MoveLeft],
        );
        assert_eq!(game.active().unwrap().col, 4);
        run(&mut game, &[Command::SoftDrop, Command::SoftDrop]);
        assert_eq!(game.active().unwrap().row, 2);
    }

    #[test]
    fn walls_stop_sideways_moves() {
        let mut game = game();
        run(&mut game, &[Command::MoveLeft; 8]);
        assert_eq!(game.active().unwrap().col, 0);
        run(&mut game, &[Command::MoveRight; 12]);
        assert_eq!(game.active().unwrap().col, 8);
    }

    #[test]
    fn soft_drop_on_floor_locks() {
        let mut game = game();
        run(&mut game, &[Command::SoftDrop; 18]);
        assert_eq!(game.board().occupied_count(), 0);
        run(&mut game, &[Command::SoftDrop, Command::MoveRight]);
        assert_eq!(game.board().occupied_count(), 4);
        assert_eq!(game.active().unwrap().col, 3);
    }

    #[test]
    fn rotate_turns_active_piece() {
        let mut game = game();
        run(&mut game, &[Command::HardDrop]);
        assert_eq!(game.active().unwrap().kind, I);
        run(&mut game, &[Command::RotateCw]);
        assert_eq!(game.active().unwrap().shape.height(), 4);
    }

    #[test]
    fn pause_blocks_gravity_and_moves() {
        let mut game = game();
        run(&mut game, &[Command::TogglePause]);
        assert_eq!(game.phase(), Phase::Paused);
        run(&mut game, &[Command::MoveLeft, Command::HardDrop]);
        game.step(5_000.0);
        let piece = game.active().unwrap();
        assert_eq!((piece.row, piece.col), (0, 3));
        assert_eq!(game.board().occupied_count(), 0);

        run(&mut game, &[Command::TogglePause, Command::MoveLeft]);
        assert_eq!(game.phase(), Phase::Falling);
        assert_eq!(game.active().unwrap().col, 2);
    }

    #[test]
    fn pause_keeps_partial_interval() {
        let mut game = game();
        game.step(700.0);
        run(&mut game, &[Command::TogglePause]);
        game.step(2_000.0);
        run(&mut game, &[Command::TogglePause]);
        game.step(50.0);
        assert_eq!(game.active().unwrap().row, 0);
        game.step(1.0);
        assert_eq!(game.active().unwrap().row, 1);
    }

    #[test]
    fn blocked_spawn_is_game_over_without_ticks() {
        let mut board = Board::new();
        for row in 0..ROWS {
            for col in 0..COLS {
                if col != 0 {
                    board.set(row, col, Some(Z));
                }
            }
        }
        let game = Game::with_board(
            Settings::default(),
            board,
            Box::new(ScriptedBags::repeating(ORDER)),
        );
        assert_eq!(game.phase(), Phase::GameOver);
        assert!(game.active().is_none());
        assert_eq!(game.stats().ticks, 0);
    }

    #[test]
    fn game_over_accepts_only_reset() {
        let mut game = game();
        for _ in 0..40 {
            run(&mut game, &[Command::HardDrop]);
            if game.phase() == Phase::GameOver {
                break;
            }
        }
        assert_eq!(game.phase(), Phase::GameOver);
        let board = *game.board();
        let stats = game.stats();

        run(&mut game, &[Command::MoveLeft, Command::HardDrop, Command::TogglePause]);
        game.step(10_000.0);
        assert_eq!(game.board(), &board);
        assert_eq!(game.stats(), stats);

        run(&mut game, &[Command::Reset]);
        assert_eq!(game.phase(), Phase::Falling);
        assert_eq!(game.board().occupied_count(), 0);
        assert_eq!(game.stats().score, 0);
        assert_eq!(game.stats().pieces, 0);
    }

    #[test]
    fn commands_after_reset_target_new_piece() {
        let mut game = game();
        run(&mut game, &[Command::HardDrop, Command::Reset, Command::MoveLeft]);
        assert_eq!(game.board().occupied_count(), 0);
        assert_eq!(game.active().unwrap().col, 2);
    }

    #[test]
    fn reset_keeps_later_commands_in_frame() {
        let mut game = game();
        run(
            &mut game,
            &[Command::Reset, Command::MoveLeft, Command::MoveLeft],
        );
        let piece = game.active().unwrap();
        assert_eq!((piece.kind, piece.row, piece.col), (O, 0, 1));
    }

    #[test]
    fn reset_from_pause_accepts_moves_in_same_frame() {
        let mut game = game();
        run(&mut game, &[Command::TogglePause]);
        assert_eq!(game.phase(), Phase::Paused);
        run(&mut game, &[Command::Reset, Command::MoveRight]);
        assert_eq!(game.phase(), Phase::Falling);
        assert_eq!(game.active().unwrap().col, 4);
    }

    #[test]
    fn gravity_fires_only_past_interval() {
        let mut game = game();
        game.step(750.0);
        assert_eq!(game.active().unwrap().row, 0);
        assert_eq!(game.stats().ticks, 0);
        game.step(0.5);
        assert_eq!(game.active().unwrap().row, 1);
        assert_eq!(game.stats().ticks, 1);
    }

    #[test]
    fn line_clear_scores_and_shifts() {
        let mut board = Board::new();
        for col in 0..COLS {
            if col != 3 && col != 4 {
                board.set(19, col, Some(J));
            }
        }
        board.set(18, 0, Some(T));
        let mut game = Game::with_board(
            Settings::default(),
            board,
            Box::new(ScriptedBags::repeating(ORDER)),
        );
        run(&mut game, &[Command::HardDrop]);
        let stats = game.stats();
        assert_eq!((stats.score, stats.lines), (100, 1));
        assert_eq!(game.board().get(19, 0), Some(T));
        assert_eq!(game.board().get(19, 3), Some(O));
        assert_eq!(game.board().get(19, 4), Some(O));
        assert_eq!(game.board().occupied_count(), 3);
    }

    #[test]
    fn speed_controls_clamp() {
        let mut game = game();
        assert_eq!(game.tick_ms(), 750);
        for _ in 0..10 {
            game.faster();
        }
        assert_eq!(game.tick_ms(), 150);
        for _ in 0..20 {
            game.slower();
        }
        assert_eq!(game.tick_ms(), 1200);
        game.set_tick_ms(400);
        assert_eq!(game.stats().drops_per_second, 2.5);
    }

    #[test]
    fn speed_survives_reset() {
        let mut game = game();
        game.faster();
        run(&mut game, &[Command::Reset]);
        assert_eq!(game.tick_ms(), 650);
    }

    #[test]
    fn render_grid_shows_ghost_under_piece() {
        let game = game();
        let grid = game.render_grid();
        assert_eq!(grid[0][3], RenderCell::Block(O));
        assert_eq!(grid[1][4], RenderCell::Block(O));
        assert_eq!(grid[18][3], RenderCell::Ghost(O));
        assert_eq!(grid[19][4], RenderCell::Ghost(O));
        assert_eq!(grid[10][3], RenderCell::Empty);

        let view = game.view();
        assert_eq!(view.active.len(), 4);
        assert_eq!(view.ghost.len(), 4);
        assert_eq!(view.upcoming.len(), PREVIEW_DEPTH);
    }

    #[test]
    fn ghost_can_be_disabled() {
        let settings = Settings {
            ghost_enabled: false,
            ..Settings::default()
        };
        let game = Game::with_randomizer(settings, Box::new(ScriptedBags::repeating(ORDER)));
        assert!(game.ghost().is_none());
        let ghosts = game
            .render_grid()
            .iter()
            .flatten()
            .filter(|c| matches!(c, RenderCell::Ghost(_)))
            .count();
        assert_eq!(ghosts, 0);
    }

    #[test]
    fn ghost_never_covers_active_cells() {
        let mut game = game();
        run(&mut game, &[Command::SoftDrop; 17]);
        // O at row 17 overlaps its own ghost at row 18
        let grid = game.render_grid();
        assert_eq!(grid[18][3], RenderCell::Block(O));
        assert_eq!(grid[19][3], RenderCell::Ghost(O));
    }

    #[test]
    fn view_serializes_to_json() {
        let game = Game::new(Settings {
            seed: Some(5),
            ..Settings::default()
        });
        let json = serde_json::to_value(game.view()).unwrap();
        assert_eq!(json["stats"]["state"], "Falling");
        assert_eq!(json["stats"]["tickMs"], 750);
        assert_eq!(json["grid"].as_array().unwrap().len(), ROWS);
        assert_eq!(json["upcoming"].as_array().unwrap().len(), PREVIEW_DEPTH);
    }
}
