//! The shared turn engine: a `Setup → Dealing → AwaitingPlay → Resolving →
//! Finished` state machine that owns turn order, finish ranks, and the
//! card-conservation invariant, delegating legality and state evolution to
//! the active rule module.

use std::collections::BTreeMap;

use crate::cards::{Card, Rank, Suit};
use crate::deck::Deck;
use crate::hand::Hand;
use crate::rules::{IllegalMoveError, Move, RuleModule, TableState};

/// Session lifecycle phases. `Resolving` is only ever observable from within
/// a commit; externally the engine rests in the other four.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum Phase {
    Setup,
    Dealing,
    AwaitingPlay,
    Resolving,
    Finished,
}

/// One seat at the table. Created at session setup, never destroyed
/// mid-session; `finished`/`rank` are assigned by the engine as hands empty.
#[derive(Debug, Clone)]
pub struct Player {
    pub(crate) id: usize,
    pub(crate) human: bool,
    pub(crate) hand: Hand,
    pub(crate) finished: bool,
    pub(crate) rank: Option<u32>,
}

impl Player {
    pub fn id(&self) -> usize {
        self.id
    }

    pub fn is_human(&self) -> bool {
        self.human
    }

    pub fn hand(&self) -> &Hand {
        &self.hand
    }

    pub(crate) fn hand_mut(&mut self) -> &mut Hand {
        &mut self.hand
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Finishing rank, 1 = best, assigned in the order hands empty.
    pub fn rank(&self) -> Option<u32> {
        self.rank
    }
}

/// Notifications the engine raises for the presentation layer. Transport is
/// the consumer's business; the engine only accumulates them.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Event {
    TurnAdvanced { seat: usize },
    MoveRejected { seat: usize, reason: String },
    PlayerFinished { seat: usize, rank: u32 },
    /// Seats ordered best rank first.
    SessionFinished { ranking: Vec<usize> },
    RevolutionToggled { reversed: bool },
    TrickCleared,
    PairsDiscarded { seat: usize, pairs: usize },
    MarkedCardDrawn { seat: usize },
}

/// Internal engine bugs: these must halt and surface, never be papered over.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum InvariantViolation {
    #[error("card census mismatch: expected {expected} cards, found {found}")]
    CardCount { expected: usize, found: usize },
    #[error("card multiset drifted from the dealt deck at {card}")]
    CensusDrift { card: String },
    #[error("a move reached apply without passing validation")]
    UncheckedMove,
    #[error("no active player to advance to")]
    NoActivePlayer,
    #[error("seat {0} has no legal move and passing is not allowed")]
    NoSafeMove(usize),
    #[error("turn loop exceeded {0} iterations without finishing")]
    TurnLoopStuck(usize),
}

/// Errors a commit can produce: a rejected move (session unchanged) or a
/// surfaced engine bug (session unusable).
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MoveError {
    #[error(transparent)]
    Illegal(#[from] IllegalMoveError),
    #[error(transparent)]
    Invariant(#[from] InvariantViolation),
}

type Census = BTreeMap<(Rank, Suit), usize>;

/// Everything a rule module may read or mutate: seats, the variant-owned
/// table, the discard pile, and the pass streak. The engine keeps the turn
/// cursor and phase to itself.
#[derive(Debug)]
pub struct SessionState {
    players: Vec<Player>,
    table: TableState,
    discard: Vec<Card>,
    pass_streak: usize,
    census: Census,
    events: Vec<Event>,
}

impl SessionState {
    fn new(humans: &[bool], table: TableState) -> Self {
        let players = humans
            .iter()
            .enumerate()
            .map(|(id, &human)| Player {
                id,
                human,
                hand: Hand::new(),
                finished: false,
                rank: None,
            })
            .collect();
        Self {
            players,
            table,
            discard: Vec::new(),
            pass_streak: 0,
            census: Census::new(),
            events: Vec::new(),
        }
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub(crate) fn players_mut(&mut self) -> &mut [Player] {
        &mut self.players
    }

    pub fn table(&self) -> &TableState {
        &self.table
    }

    pub(crate) fn table_mut(&mut self) -> &mut TableState {
        &mut self.table
    }

    pub fn discard(&self) -> &[Card] {
        &self.discard
    }

    pub fn pass_streak(&self) -> usize {
        self.pass_streak
    }

    pub(crate) fn discard_all<I>(&mut self, cards: I)
    where
        I: IntoIterator<Item = Card>,
    {
        self.discard.extend(cards);
    }

    pub(crate) fn reset_pass_streak(&mut self) {
        self.pass_streak = 0;
    }

    pub(crate) fn bump_pass_streak(&mut self) -> usize {
        self.pass_streak += 1;
        self.pass_streak
    }

    pub(crate) fn push_event(&mut self, event: Event) {
        self.events.push(event);
    }

    pub(crate) fn drain_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    /// Players still in the game (hand not yet emptied).
    pub fn active_count(&self) -> usize {
        self.players.iter().filter(|p| !p.finished).count()
    }

    /// Next unfinished seat strictly after `seat` in table order.
    pub(crate) fn next_active_after(&self, seat: usize) -> Option<usize> {
        let n = self.players.len();
        if n == 0 {
            return None;
        }
        (1..=n).map(|step| (seat + step) % n).find(|&i| !self.players[i].finished && i != seat)
    }

    fn take_census(&self) -> Census {
        let mut census = Census::new();
        let all = self
            .players
            .iter()
            .flat_map(|p| p.hand.cards().iter())
            .chain(self.table.cards().iter())
            .chain(self.discard.iter());
        for card in all {
            *census.entry((card.rank(), card.suit())).or_insert(0) += 1;
        }
        census
    }

    #[cfg(test)]
    pub(crate) fn for_test(hands: Vec<Vec<Card>>, table: TableState) -> Self {
        let mut state = Self::new(&vec![false; hands.len()], table);
        for (seat, cards) in hands.into_iter().enumerate() {
            state.players[seat].hand = Hand::from_cards(cards);
        }
        state.census = state.take_census();
        state
    }
}

/// The turn state machine for one playthrough. Single-threaded by contract:
/// exactly one move resolves at a time and nothing blocks; a human turn is
/// the engine resting in `AwaitingPlay` until a commit arrives.
pub struct TurnEngine {
    rules: Box<dyn RuleModule>,
    state: SessionState,
    phase: Phase,
    current: usize,
    next_rank: u32,
}

impl TurnEngine {
    /// `humans[i]` flags whether seat `i` is human-controlled.
    pub fn new(rules: Box<dyn RuleModule>, humans: &[bool]) -> Self {
        let table = rules.initial_table();
        Self {
            state: SessionState::new(humans, table),
            rules,
            phase: Phase::Setup,
            current: 0,
            next_rank: 1,
        }
    }

    pub fn rules(&self) -> &dyn RuleModule {
        self.rules.as_ref()
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Seat the engine is waiting on (meaningful in `AwaitingPlay`).
    pub fn current(&self) -> usize {
        self.current
    }

    pub fn drain_events(&mut self) -> Vec<Event> {
        self.state.drain_events()
    }

    /// Discard all in-progress state and return to `Setup`. Legal at any
    /// phase; seats and their human flags survive, everything else resets.
    pub fn reset(&mut self) {
        self.phase = Phase::Setup;
        self.current = 0;
        self.next_rank = 1;
        self.state.discard.clear();
        self.state.pass_streak = 0;
        self.state.events.clear();
        self.state.census.clear();
        self.state.table = self.rules.initial_table();
        for player in &mut self.state.players {
            player.hand = Hand::new();
            player.finished = false;
            player.rank = None;
        }
    }

    /// Deal a (shuffled) deck and begin play. Restartable: any in-progress
    /// state is discarded, so this doubles as "new game" after `Finished`.
    pub fn start(&mut self, deck: Deck) -> Result<(), InvariantViolation> {
        self.phase = Phase::Dealing;
        self.next_rank = 1;
        self.state.discard.clear();
        self.state.pass_streak = 0;
        self.state.events.clear();
        self.state.table = self.rules.initial_table();
        for player in &mut self.state.players {
            player.hand = Hand::new();
            player.finished = false;
            player.rank = None;
        }

        let expected: Census = {
            let mut census = Census::new();
            for card in deck.cards() {
                *census.entry((card.rank(), card.suit())).or_insert(0) += 1;
            }
            census
        };
        let seats = self.state.players.len();
        for (seat, cards) in deck.deal_round_robin(seats).into_iter().enumerate() {
            self.state.players[seat].hand = Hand::from_cards(cards);
        }
        self.state.census = expected;

        let emptied = self.rules.after_deal(&mut self.state);
        for seat in emptied {
            self.finish_player(seat);
        }
        self.verify_census()?;

        if self.state.active_count() <= 1 {
            self.finish_session();
            return Ok(());
        }
        let lead = self.rules.lead_seat(&self.state);
        self.current = if self.state.players[lead].finished {
            self.state.next_active_after(lead).ok_or(InvariantViolation::NoActivePlayer)?
        } else {
            lead
        };
        self.phase = Phase::AwaitingPlay;
        self.state.push_event(Event::TurnAdvanced { seat: self.current });
        log::debug!("session started, seat {} leads", self.current);
        Ok(())
    }

    /// Resolve one move for `seat`. Rejections leave every piece of session
    /// state, including the turn cursor, untouched.
    pub fn commit(&mut self, seat: usize, mv: &Move) -> Result<(), MoveError> {
        if let Err(e) = self.check_commit(seat, mv) {
            self.state.push_event(Event::MoveRejected { seat, reason: e.to_string() });
            return Err(e.into());
        }

        self.phase = Phase::Resolving;
        let emptied = self.rules.apply_move(&mut self.state, seat, mv)?;
        for s in emptied {
            self.finish_player(s);
        }
        self.verify_census()?;

        if self.state.active_count() <= 1 {
            self.finish_session();
            return Ok(());
        }

        let next = self
            .state
            .next_active_after(seat)
            .ok_or(InvariantViolation::NoActivePlayer)?;
        self.current = next;
        self.phase = Phase::AwaitingPlay;
        self.state.push_event(Event::TurnAdvanced { seat: next });
        Ok(())
    }

    fn check_commit(&self, seat: usize, mv: &Move) -> Result<(), IllegalMoveError> {
        if !matches!(self.phase, Phase::AwaitingPlay) {
            return Err(IllegalMoveError::NotAwaitingPlay);
        }
        if seat >= self.state.players.len() {
            return Err(IllegalMoveError::UnknownSeat(seat));
        }
        if self.state.players[seat].finished {
            return Err(IllegalMoveError::AlreadyFinished(seat));
        }
        if seat != self.current {
            return Err(IllegalMoveError::NotYourTurn(seat));
        }
        self.rules.check_move(&self.state, seat, mv)
    }

    fn finish_player(&mut self, seat: usize) {
        let player = &mut self.state.players[seat];
        if player.finished {
            return;
        }
        player.finished = true;
        let rank = self.next_rank;
        player.rank = Some(rank);
        self.next_rank += 1;
        log::debug!("seat {seat} finished with rank {rank}");
        self.state.push_event(Event::PlayerFinished { seat, rank });
    }

    /// Assign the worst remaining rank(s) and close the session.
    fn finish_session(&mut self) {
        let stragglers: Vec<usize> = self
            .state
            .players
            .iter()
            .filter(|p| !p.finished)
            .map(|p| p.id)
            .collect();
        for seat in stragglers {
            self.finish_player(seat);
        }
        let mut ranking: Vec<usize> = (0..self.state.players.len()).collect();
        ranking.sort_by_key(|&i| self.state.players[i].rank.unwrap_or(u32::MAX));
        log::info!("session finished, ranking {ranking:?}");
        self.phase = Phase::Finished;
        self.state.push_event(Event::SessionFinished { ranking });
    }

    /// Cards are moved, never created or destroyed: the multiset across all
    /// hands, the table, and the discard pile must equal the dealt deck.
    fn verify_census(&self) -> Result<(), InvariantViolation> {
        let found = self.state.take_census();
        let expected_total: usize = self.state.census.values().sum();
        let found_total: usize = found.values().sum();
        if expected_total != found_total {
            return Err(InvariantViolation::CardCount {
                expected: expected_total,
                found: found_total,
            });
        }
        if let Some((&(rank, suit), _)) = self
            .state
            .census
            .iter()
            .find(|&(key, &count)| found.get(key).copied().unwrap_or(0) != count)
        {
            return Err(InvariantViolation::CensusDrift {
                card: Card::new(rank, suit).to_string(),
            });
        }
        Ok(())
    }
}
