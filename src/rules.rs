//! Rule modules: variant-specific legality, table evolution, and terminal
//! conditions behind a shared capability interface, so the turn engine stays
//! agnostic of which game is being played.

use crate::cards::Card;
use crate::engine::{InvariantViolation, SessionState};

pub mod elimination;
pub mod shedding;

pub use elimination::EliminationRules;
pub use shedding::SheddingRules;

/// The two supported game families.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    /// Daifugo-style climbing game: shed cards by beating the table.
    Shedding,
    /// Old Maid-style game: strip pairs, draw blind, avoid the marked card.
    Elimination,
}

/// A committed player intent. `Play`/`Pass` belong to the shedding variant,
/// `Draw` to the elimination variant; rule modules reject foreign moves.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Move {
    Play(Vec<Card>),
    Pass,
    /// Blind draw of the card at `index` from the next active player's hand.
    Draw { index: usize },
}

/// Variant-owned table state, opaque to the turn engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableState {
    Shedding(shedding::Table),
    /// No shared table: all exchanges are pairwise hand-to-hand.
    Elimination,
}

impl TableState {
    /// Cards currently in play on the table (empty for elimination).
    pub fn cards(&self) -> &[Card] {
        match self {
            TableState::Shedding(t) => t.cards(),
            TableState::Elimination => &[],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.cards().is_empty()
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum IllegalMoveError {
    #[error("session is not awaiting a play")]
    NotAwaitingPlay,
    #[error("it is not seat {0}'s turn")]
    NotYourTurn(usize),
    #[error("seat {0} does not exist at this table")]
    UnknownSeat(usize),
    #[error("seat {0} already finished")]
    AlreadyFinished(usize),
    #[error("move does not belong to this game variant")]
    WrongVariant,
    #[error("a play needs at least one card")]
    EmptyPlay,
    #[error("selected cards are not all held in hand")]
    CardsNotHeld,
    #[error("cards do not form a single-rank combination")]
    MalformedCombination,
    #[error("combination size must match the table: expected {expected}, got {got}")]
    WrongCombinationSize { expected: usize, got: usize },
    #[error("combination does not beat the table under the current order")]
    DoesNotBeatTable,
    #[error("passing is only allowed against a non-empty table")]
    PassNotAllowed,
    #[error("draw index {got} out of range for a hand of {len} cards")]
    DrawOutOfRange { len: usize, got: usize },
}

/// Capability interface every game variant satisfies. The engine owns turn
/// order, finish ranks, and termination; the module owns legality and how
/// hands/table evolve.
pub trait RuleModule {
    fn variant(&self) -> Variant;

    fn initial_table(&self) -> TableState;

    /// Post-deal normalization (sorting, initial pair stripping). Returns
    /// seats whose hands emptied, in finish order.
    fn after_deal(&self, state: &mut SessionState) -> Vec<usize>;

    /// Seat that leads the first turn. May point at a finished seat; the
    /// engine advances past it.
    fn lead_seat(&self, state: &SessionState) -> usize;

    /// Whether declining to play is currently a legal option.
    fn pass_allowed(&self, state: &SessionState) -> bool;

    /// Validate a move against current state without mutating anything.
    /// Deterministic: re-checking the same (state, move) pair always agrees.
    fn check_move(
        &self,
        state: &SessionState,
        seat: usize,
        mv: &Move,
    ) -> Result<(), IllegalMoveError>;

    /// Apply a move `check_move` accepted. Returns seats emptied by the move
    /// in finish order; the engine then advances to the next active seat
    /// after the mover. Errors only on internal inconsistency, never on
    /// player input.
    fn apply_move(
        &self,
        state: &mut SessionState,
        seat: usize,
        mv: &Move,
    ) -> Result<Vec<usize>, InvariantViolation>;

    /// Enumerate moves `check_move` would accept for `seat`. Bounded: one
    /// representative per rank/size pairing, never the full suit cross
    /// product.
    fn legal_moves(&self, state: &SessionState, seat: usize) -> Vec<Move>;
}

/// Rule module for a variant.
pub fn rules_for(variant: Variant) -> Box<dyn RuleModule> {
    match variant {
        Variant::Shedding => Box::new(SheddingRules::new()),
        Variant::Elimination => Box::new(EliminationRules::new()),
    }
}
