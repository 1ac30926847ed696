//! Engine state management.
//!
//! Holds the board grid, both players' pieces, the pending die value, and
//! the turn/selection state, and exposes the query/command surface the
//! evaluator and any front end drive the game through. Move derivation is
//! an exact-distance walk along the track in `board::path`, with the
//! re-entry and last-row restrictions threaded through each branch.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

use crate::board::dice;
use crate::board::path::{successors, ROWS};
use crate::board::piece::{Piece, PieceId, Player, Square};

/// Smallest and largest playable board widths; widths are forced odd.
pub const MIN_COLUMNS: u8 = 7;
pub const MAX_COLUMNS: u8 = 15;

/// Default board width.
pub const DEFAULT_COLUMNS: u8 = 9;

/// Contract violations raised by engine commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TabError {
    /// The target is not among the selected piece's legal destinations.
    #[error("no legal move to {0} for the selected piece and die value")]
    IllegalMove(Square),
    /// Move execution attempted without a prior selection.
    #[error("no piece selected; query a piece's moves before moving")]
    NoSelection,
    /// Roll attempted while a value is already pending.
    #[error("the die has already been rolled this turn")]
    DieAlreadyRolled,
    /// Move or pass attempted before rolling.
    #[error("the die has not been rolled yet")]
    DieNotRolled,
    /// Pass attempted while at least one legal move exists.
    #[error("cannot pass while legal moves remain")]
    IllegalPass,
}

/// What happened when a move was executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveOutcome {
    /// The opponent piece removed from play, if the move captured.
    pub captured: Option<PieceId>,
    /// Whether the mover keeps the turn (die value 1, 4, or 6).
    pub extra_turn: bool,
}

/// A stand-in for a piece during path searches. Hypothetical queries build
/// probes on the fly; a probe can never enter the engine's piece vector.
#[derive(Debug, Clone, Copy)]
struct Probe {
    player: Player,
    square: Square,
    has_moved: bool,
    has_reached_end: bool,
}

impl Probe {
    fn of(piece: &Piece) -> Probe {
        Probe {
            player: piece.player,
            square: piece.square,
            has_moved: piece.has_moved,
            has_reached_end: piece.has_reached_end,
        }
    }
}

/// The full game state and rules engine.
pub struct TabEngine {
    columns: u8,
    /// One vector of cells per row; each cell holds at most one piece id.
    grid: [Vec<Option<PieceId>>; 4],
    /// All pieces ever created, indexed by id. Captured pieces stay here
    /// with their tombstone flag set.
    pieces: Vec<Piece>,
    current_player: Player,
    die: Option<u8>,
    selected: Option<PieceId>,
    forfeited: Option<Player>,
    rng: SmallRng,
}

impl TabEngine {
    /// Creates a fresh game: `columns` is clamped odd into
    /// [`MIN_COLUMNS`, `MAX_COLUMNS`], both home rows fully populated,
    /// player one to move.
    pub fn new(columns: u8) -> TabEngine {
        Self::with_rng(columns, SmallRng::from_entropy())
    }

    /// Like [`TabEngine::new`] but with a seeded die, for reproducible games.
    pub fn seeded(columns: u8, seed: u64) -> TabEngine {
        Self::with_rng(columns, SmallRng::seed_from_u64(seed))
    }

    /// Creates an engine with no pieces at all. Position-construction
    /// helper for scripted scenarios; normal games use [`TabEngine::new`].
    pub fn empty(columns: u8) -> TabEngine {
        let columns = clamp_odd(columns);
        TabEngine {
            columns,
            grid: std::array::from_fn(|_| vec![None; columns as usize]),
            pieces: Vec::new(),
            current_player: Player::One,
            die: None,
            selected: None,
            forfeited: None,
            rng: SmallRng::from_entropy(),
        }
    }

    fn with_rng(columns: u8, rng: SmallRng) -> TabEngine {
        let mut engine = TabEngine::empty(columns);
        engine.rng = rng;
        for col in 0..engine.columns {
            engine.place_piece(Square::new(Player::One.initial_row(), col), Player::One);
            engine.place_piece(Square::new(Player::Two.initial_row(), col), Player::Two);
        }
        engine
    }

    // ---- Position construction ------------------------------------------

    /// Places a new piece for `player`. Returns its id, or `None` if the
    /// square is out of bounds or already occupied.
    pub fn place_piece(&mut self, square: Square, player: Player) -> Option<PieceId> {
        if !self.in_bounds(square) || self.cell(square).is_some() {
            return None;
        }
        let id = PieceId(self.pieces.len() as u8);
        self.pieces.push(Piece::new(id, player, square));
        self.grid[square.row as usize][square.col as usize] = Some(id);
        Some(id)
    }

    /// Overrides a placed piece's movement history flags.
    pub fn set_piece_flags(&mut self, id: PieceId, has_moved: bool, has_reached_end: bool) {
        if let Some(piece) = self.pieces.get_mut(id.0 as usize) {
            piece.has_moved = has_moved;
            piece.has_reached_end = has_reached_end;
        }
    }

    /// Sets which side is to move.
    pub fn set_current_player(&mut self, player: Player) {
        self.current_player = player;
    }

    // ---- Queries --------------------------------------------------------

    /// Board width in columns. Height is always [`ROWS`].
    pub fn columns(&self) -> u8 {
        self.columns
    }

    /// The side to move.
    pub fn current_player(&self) -> Player {
        self.current_player
    }

    /// The pending die value, if one has been rolled and not yet used.
    pub fn die(&self) -> Option<u8> {
        self.die
    }

    /// Looks a piece up by id, captured or not.
    pub fn piece(&self, id: PieceId) -> Option<&Piece> {
        self.pieces.get(id.0 as usize)
    }

    /// The piece occupying a square, if any.
    pub fn piece_at(&self, square: Square) -> Option<&Piece> {
        let id = self.cell(square)?;
        self.pieces.get(id.0 as usize)
    }

    /// Iterates every cell with its occupant, row-major.
    pub fn cells(&self) -> impl Iterator<Item = (Square, Option<&Piece>)> + '_ {
        (0..ROWS).flat_map(move |row| {
            (0..self.columns).map(move |col| {
                let square = Square::new(row, col);
                (square, self.piece_at(square))
            })
        })
    }

    /// Iterates a player's pieces still in play.
    pub fn pieces(&self, player: Player) -> impl Iterator<Item = &Piece> + '_ {
        self.pieces
            .iter()
            .filter(move |p| !p.captured && p.player == player)
    }

    /// Number of pieces a player still has in play.
    pub fn piece_count(&self, player: Player) -> usize {
        self.pieces(player).count()
    }

    /// Whether the player still occupies any cell of their initial row.
    pub fn has_pieces_on_initial_row(&self, player: Player) -> bool {
        let row = player.initial_row();
        self.pieces(player).any(|p| p.square.row == row)
    }

    /// The winner, if the game is over: the side whose opponent has no
    /// pieces left, or the opponent of a forfeiting side. Pure query; the
    /// engine never forces termination.
    pub fn winner(&self) -> Option<Player> {
        if let Some(quitter) = self.forfeited {
            return Some(quitter.opponent());
        }
        if self.piece_count(Player::One) == 0 {
            return Some(Player::Two);
        }
        if self.piece_count(Player::Two) == 0 {
            return Some(Player::One);
        }
        None
    }

    /// Whether rolling is currently permitted.
    pub fn can_roll(&self) -> bool {
        self.die.is_none()
    }

    /// Whether the current player may legally pass: a die is pending and
    /// no piece of theirs has a legal move.
    pub fn can_pass(&self) -> bool {
        self.die.is_some() && !self.has_any_legal_move()
    }

    /// The current player's pieces, in board order.
    pub fn selectable_pieces(&self) -> Vec<&Piece> {
        self.cells()
            .filter_map(|(_, piece)| piece)
            .filter(|p| p.player == self.current_player)
            .collect()
    }

    /// Legal destinations for the piece at `square` under the pending die.
    /// Pure variant of [`TabEngine::select`]: empty if no die is pending
    /// or the square does not hold a current-player piece.
    pub fn legal_destinations(&self, square: Square) -> Vec<Square> {
        let die = match self.die {
            Some(d) => d,
            None => return Vec::new(),
        };
        match self.piece_at(square) {
            Some(p) if p.player == self.current_player => self.destinations(Probe::of(p), die),
            _ => Vec::new(),
        }
    }

    /// Legal destinations for a what-if piece of `player` at `square`
    /// given a die value, without touching any state. A real piece of
    /// that player at the square is evaluated as-is; otherwise a probe
    /// with `has_moved` set (and `has_reached_end` inferred from the row)
    /// stands in. Used by the evaluator's risk/threat estimates.
    pub fn hypothetical_moves(&self, square: Square, die: u8, player: Player) -> Vec<Square> {
        if die == 0 || !self.in_bounds(square) {
            return Vec::new();
        }
        let probe = match self.piece_at(square) {
            Some(p) if p.player == player => Probe::of(p),
            _ => Probe {
                player,
                square,
                has_moved: true,
                has_reached_end: square.row == player.last_row(),
            },
        };
        self.destinations(probe, die)
    }

    // ---- Commands -------------------------------------------------------

    /// Rolls the stick die with the engine's own randomness.
    pub fn roll_die(&mut self) -> Result<u8, TabError> {
        if self.die.is_some() {
            return Err(TabError::DieAlreadyRolled);
        }
        let reroll_high = self.all_pieces_unmoved(self.current_player);
        let value = Self::roll_value(&mut self.rng, reroll_high);
        self.die = Some(value);
        Ok(value)
    }

    /// Rolls using a caller-supplied source of randomness, for
    /// reproducible roll sequences.
    pub fn roll_die_with(&mut self, rng: &mut impl Rng) -> Result<u8, TabError> {
        if self.die.is_some() {
            return Err(TabError::DieAlreadyRolled);
        }
        let reroll_high = self.all_pieces_unmoved(self.current_player);
        let value = Self::roll_value(rng, reroll_high);
        self.die = Some(value);
        Ok(value)
    }

    /// Selects the piece at `square` and returns its legal destinations.
    /// Selection sticks even when the destination list is empty; it is
    /// the required precursor to [`TabEngine::move_selected`]. No-op
    /// (and empty) if no die is pending or the square does not hold a
    /// current-player piece.
    pub fn select(&mut self, square: Square) -> Vec<Square> {
        let die = match self.die {
            Some(d) => d,
            None => return Vec::new(),
        };
        let piece = match self.piece_at(square) {
            Some(p) if p.player == self.current_player => *p,
            _ => return Vec::new(),
        };
        self.selected = Some(piece.id);
        self.destinations(Probe::of(&piece), die)
    }

    /// Moves the selected piece to `target`, resolving any capture.
    /// Clears the selection and the die; the turn passes to the opponent
    /// unless the die value grants an extra turn.
    pub fn move_selected(&mut self, target: Square) -> Result<MoveOutcome, TabError> {
        let id = self.selected.take().ok_or(TabError::NoSelection)?;
        let die = self.die.ok_or(TabError::DieNotRolled)?;

        let piece = self.pieces[id.0 as usize];
        if !self.destinations(Probe::of(&piece), die).contains(&target) {
            return Err(TabError::IllegalMove(target));
        }

        let captured = match self.piece_at(target) {
            Some(other) if other.player != piece.player => Some(other.id),
            _ => None,
        };
        if let Some(taken) = captured {
            self.pieces[taken.0 as usize].captured = true;
        }

        self.grid[piece.square.row as usize][piece.square.col as usize] = None;
        self.grid[target.row as usize][target.col as usize] = Some(id);
        let piece = &mut self.pieces[id.0 as usize];
        piece.square = target;
        piece.has_moved = true;
        if target.row == piece.player.last_row() {
            piece.has_reached_end = true;
        }

        let extra_turn = dice::grants_extra_turn(die);
        self.die = None;
        if !extra_turn {
            self.current_player = self.current_player.opponent();
        }
        Ok(MoveOutcome {
            captured,
            extra_turn,
        })
    }

    /// Gives up the turn. Only legal when a die is pending and no piece
    /// of the current player can move; an extra-turn die value keeps the
    /// turn even across a pass.
    pub fn pass_turn(&mut self) -> Result<(), TabError> {
        let die = self.die.ok_or(TabError::DieNotRolled)?;
        if self.has_any_legal_move() {
            return Err(TabError::IllegalPass);
        }
        self.selected = None;
        self.die = None;
        if !dice::grants_extra_turn(die) {
            self.current_player = self.current_player.opponent();
        }
        Ok(())
    }

    /// Records that `player` has given up. [`TabEngine::winner`] reports
    /// their opponent from then on; other state is left untouched.
    pub fn forfeit(&mut self, player: Player) {
        self.forfeited = Some(player);
    }

    // ---- Move derivation ------------------------------------------------

    /// Every destination reachable in exactly `steps` steps from the
    /// probe's square, exploring both arms of any junction. Duplicates
    /// from converging branches collapse.
    fn destinations(&self, probe: Probe, steps: u8) -> Vec<Square> {
        if steps == 0 {
            return Vec::new();
        }
        // A piece's first move must be a roll of exactly 1.
        if !probe.has_moved && steps != 1 {
            return Vec::new();
        }
        // Pieces parked on the last row sit out until the initial row is clear.
        if probe.square.row == probe.player.last_row()
            && self.has_pieces_on_initial_row(probe.player)
        {
            return Vec::new();
        }

        let mut found = Vec::new();
        self.walk(
            probe.player,
            probe.square,
            steps,
            probe.has_moved,
            probe.has_reached_end,
            &mut found,
        );
        found
    }

    fn walk(
        &self,
        player: Player,
        position: Square,
        steps_left: u8,
        left_initial: bool,
        entered_last: bool,
        found: &mut Vec<Square>,
    ) {
        if steps_left == 0 {
            match self.piece_at(position) {
                Some(occupant) if occupant.player == player => {}
                _ => {
                    if !found.contains(&position) {
                        found.push(position);
                    }
                }
            }
            return;
        }

        let initial = player.initial_row();
        let last = player.last_row();
        for next in successors(position, self.columns).squares() {
            // Once off the initial row, a path may never step back into it.
            if left_initial && position.row != initial && next.row == initial {
                continue;
            }
            // The last row is closed while the initial row is occupied.
            if next.row == last && self.has_pieces_on_initial_row(player) {
                continue;
            }
            // Entry into the last row is single-use, even mid-path.
            let entering_last = next.row == last && position.row != last;
            if entered_last && entering_last {
                continue;
            }
            self.walk(
                player,
                next,
                steps_left - 1,
                left_initial,
                entered_last || entering_last,
                found,
            );
        }
    }

    // ---- Internals ------------------------------------------------------

    fn roll_value(rng: &mut impl Rng, reroll_high: bool) -> u8 {
        loop {
            let value = dice::roll(rng);
            // Until a side has moved at least one piece, 4 and 6 are
            // rerolled.
            if reroll_high && (value == 4 || value == 6) {
                continue;
            }
            return value;
        }
    }

    fn all_pieces_unmoved(&self, player: Player) -> bool {
        self.pieces(player).all(|p| !p.has_moved)
    }

    fn has_any_legal_move(&self) -> bool {
        let die = match self.die {
            Some(d) => d,
            None => return false,
        };
        self.pieces(self.current_player)
            .any(|p| !self.destinations(Probe::of(p), die).is_empty())
    }

    fn in_bounds(&self, square: Square) -> bool {
        square.row < ROWS && square.col < self.columns
    }

    fn cell(&self, square: Square) -> Option<PieceId> {
        if !self.in_bounds(square) {
            return None;
        }
        self.grid[square.row as usize][square.col as usize]
    }
}

/// Clamps a requested width into range and forces it odd.
fn clamp_odd(columns: u8) -> u8 {
    let clamped = columns.clamp(MIN_COLUMNS, MAX_COLUMNS);
    if clamped % 2 == 0 {
        clamped + 1
    } else {
        clamped
    }
}
