//! Session facade: configuration, human/bot seat wiring, and the public
//! (hidden-information) view. This is the layer a UI talks to; it drives bot
//! turns automatically and exposes only what the viewing seat may see.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::cards::Card;
use crate::deck::Deck;
use crate::engine::{Event, MoveError, Phase, TurnEngine};
use crate::rules::{rules_for, Move, TableState, Variant};
use crate::strategy::{BotStrategy, Difficulty, StrategyProfile};

/// Bot-turn iterations allowed in one drive before the engine is presumed
/// stuck. Generous: the longest legitimate sessions resolve in a few hundred
/// moves.
const TURN_LIMIT: usize = 10_000;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("player count {0} out of supported range 2..=6")]
    PlayerCount(usize),
    #[error("human seat {0} out of range for the configured player count")]
    SeatOutOfRange(usize),
    #[error("human seat {0} listed twice")]
    DuplicateSeat(usize),
    #[error("joker count {got} unsupported for this variant (max {max})")]
    JokerCount { got: usize, max: usize },
}

/// Everything needed to set a table. Construct via `shedding`/`elimination`
/// and adjust with the builder helpers; `GameSession::create` validates.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub player_count: usize,
    pub human_seats: Vec<usize>,
    pub joker_count: usize,
    pub variant: Variant,
    pub difficulty: Difficulty,
    pub seed: Option<u64>,
}

impl SessionConfig {
    pub fn shedding(player_count: usize) -> Self {
        Self {
            player_count,
            human_seats: Vec::new(),
            joker_count: 2,
            variant: Variant::Shedding,
            difficulty: Difficulty::Low,
            seed: None,
        }
    }

    /// Elimination always plays with exactly one joker, the marked card.
    pub fn elimination(player_count: usize) -> Self {
        Self {
            player_count,
            human_seats: Vec::new(),
            joker_count: 1,
            variant: Variant::Elimination,
            difficulty: Difficulty::Low,
            seed: None,
        }
    }

    pub fn with_human_seat(mut self, seat: usize) -> Self {
        self.human_seats.push(seat);
        self
    }

    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = difficulty;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(2..=6).contains(&self.player_count) {
            return Err(ConfigError::PlayerCount(self.player_count));
        }
        for (i, &seat) in self.human_seats.iter().enumerate() {
            if seat >= self.player_count {
                return Err(ConfigError::SeatOutOfRange(seat));
            }
            if self.human_seats[..i].contains(&seat) {
                return Err(ConfigError::DuplicateSeat(seat));
            }
        }
        let max = match self.variant {
            Variant::Shedding => 2,
            Variant::Elimination => 1,
        };
        let ok = match self.variant {
            Variant::Shedding => self.joker_count <= max,
            Variant::Elimination => self.joker_count == 1,
        };
        if !ok {
            return Err(ConfigError::JokerCount { got: self.joker_count, max });
        }
        Ok(())
    }
}

/// Hidden-information snapshot for one viewing seat. Opponent hands appear
/// only as counts; `own_hand` is present only when a viewer is given.
#[derive(Debug, Clone)]
pub struct PublicState {
    pub phase: Phase,
    pub active_seat: usize,
    pub table: Vec<Card>,
    pub reversed: bool,
    pub hand_counts: Vec<usize>,
    pub ranks: Vec<Option<u32>>,
    pub own_hand: Option<Vec<Card>>,
}

/// What a successful commit leaves behind, for callers that do not want to
/// re-query.
#[derive(Debug, Clone)]
pub struct MoveResult {
    pub phase: Phase,
    pub table: Vec<Card>,
    pub hand_counts: Vec<usize>,
    pub finished: bool,
}

pub struct GameSession {
    config: SessionConfig,
    engine: TurnEngine,
    bots: Vec<Option<BotStrategy>>,
}

impl GameSession {
    pub fn create(config: SessionConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let humans: Vec<bool> =
            (0..config.player_count).map(|s| config.human_seats.contains(&s)).collect();
        let bots = humans
            .iter()
            .enumerate()
            .map(|(seat, &human)| {
                if human {
                    None
                } else {
                    let mut profile = StrategyProfile::for_difficulty(config.difficulty);
                    if let Some(seed) = config.seed {
                        // Derive a distinct stream per seat from the session
                        // seed so reruns are reproducible.
                        profile = profile.with_seed(seed.wrapping_add(seat as u64 + 1));
                    }
                    Some(BotStrategy::new(profile))
                }
            })
            .collect();
        let engine = TurnEngine::new(rules_for(config.variant), &humans);
        Ok(Self { config, engine, bots })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.engine.phase()
    }

    pub fn active_seat(&self) -> usize {
        self.engine.current()
    }

    /// Shuffle, deal, and play through any leading bot turns, stopping at the
    /// first human seat (or at `Finished` for an all-bot table).
    pub fn start(&mut self) -> Result<(), MoveError> {
        let mut deck = Deck::standard(self.config.joker_count);
        if self.config.variant == Variant::Elimination {
            deck.mark_joker();
        }
        match self.config.seed {
            Some(seed) => deck.shuffle_seeded(seed),
            None => {
                let mut rng = ChaCha8Rng::from_os_rng();
                deck.shuffle_with(&mut rng);
            }
        }
        self.engine.start(deck)?;
        self.run_bots()
    }

    /// Commit a human move, then drive bots until a human is up again.
    pub fn commit_move(&mut self, seat: usize, mv: &Move) -> Result<MoveResult, MoveError> {
        self.engine.commit(seat, mv)?;
        self.run_bots()?;
        Ok(self.move_result())
    }

    fn run_bots(&mut self) -> Result<(), MoveError> {
        let mut turns = 0usize;
        while self.engine.phase() == Phase::AwaitingPlay {
            let seat = self.engine.current();
            let Some(bot) = self.bots[seat].as_mut() else {
                break;
            };
            let mv = bot.choose(self.engine.rules(), self.engine.state(), seat)?;
            self.engine.commit(seat, &mv)?;
            turns += 1;
            if turns > TURN_LIMIT {
                return Err(crate::engine::InvariantViolation::TurnLoopStuck(TURN_LIMIT).into());
            }
        }
        Ok(())
    }

    fn move_result(&self) -> MoveResult {
        let state = self.engine.state();
        MoveResult {
            phase: self.engine.phase(),
            table: state.table().cards().to_vec(),
            hand_counts: state.players().iter().map(|p| p.hand().len()).collect(),
            finished: self.engine.phase() == Phase::Finished,
        }
    }

    /// Snapshot for `viewer`. Pass `None` for a spectator view with no hand
    /// contents at all; an out-of-range viewer gets the spectator view.
    pub fn public_state(&self, viewer: Option<usize>) -> PublicState {
        let state = self.engine.state();
        let reversed = match state.table() {
            TableState::Shedding(t) => t.reversed(),
            TableState::Elimination => false,
        };
        PublicState {
            phase: self.engine.phase(),
            active_seat: self.engine.current(),
            table: state.table().cards().to_vec(),
            reversed,
            hand_counts: state.players().iter().map(|p| p.hand().len()).collect(),
            ranks: state.players().iter().map(|p| p.rank()).collect(),
            own_hand: viewer
                .and_then(|s| state.players().get(s))
                .map(|p| p.hand().cards().to_vec()),
        }
    }

    pub fn drain_events(&mut self) -> Vec<Event> {
        self.engine.drain_events()
    }

    /// Discard the current playthrough and return to `Setup` with the same
    /// configuration. Nothing is dealt; the next playthrough begins on the
    /// following `start` call.
    pub fn reset(&mut self) {
        self.engine.reset();
    }

    /// Finishing ranks by seat, populated once the session is over.
    pub fn ranking(&self) -> Vec<Option<u32>> {
        self.engine.state().players().iter().map(|p| p.rank()).collect()
    }

    /// Drive an all-bot session to the end and return seats ordered best
    /// rank first. Errors if a human seat is configured.
    pub fn run_to_completion(&mut self) -> Result<Vec<usize>, MoveError> {
        self.start()?;
        if self.engine.phase() != Phase::Finished {
            return Err(crate::engine::InvariantViolation::TurnLoopStuck(TURN_LIMIT).into());
        }
        let ranks = self.ranking();
        let mut seats: Vec<usize> = (0..ranks.len()).collect();
        seats.sort_by_key(|&s| ranks[s].unwrap_or(u32::MAX));
        Ok(seats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_validation_catches_bad_tables() {
        assert!(matches!(
            GameSession::create(SessionConfig::shedding(1)).err(),
            Some(ConfigError::PlayerCount(1))
        ));
        assert!(matches!(
            GameSession::create(SessionConfig::shedding(4).with_human_seat(4)).err(),
            Some(ConfigError::SeatOutOfRange(4))
        ));
        assert!(matches!(
            GameSession::create(
                SessionConfig::shedding(4).with_human_seat(1).with_human_seat(1)
            )
            .err(),
            Some(ConfigError::DuplicateSeat(1))
        ));
        let mut bad = SessionConfig::elimination(4);
        bad.joker_count = 0;
        assert!(matches!(
            GameSession::create(bad).err(),
            Some(ConfigError::JokerCount { got: 0, max: 1 })
        ));
    }

    #[test]
    fn all_bot_shedding_session_finishes() {
        let mut session =
            GameSession::create(SessionConfig::shedding(4).with_seed(1234)).unwrap();
        let ranking = session.run_to_completion().unwrap();
        assert_eq!(ranking.len(), 4);
        let ranks = session.ranking();
        for seat in 0..4 {
            assert!(ranks[seat].is_some());
        }
    }

    #[test]
    fn public_state_hides_other_hands() {
        let mut session = GameSession::create(
            SessionConfig::shedding(4).with_human_seat(0).with_seed(99),
        )
        .unwrap();
        session.start().unwrap();

        let view = session.public_state(Some(0));
        let own = view.own_hand.expect("viewer sees their own hand");
        assert_eq!(own.len(), view.hand_counts[0]);
        let spectator = session.public_state(None);
        assert!(spectator.own_hand.is_none());
    }
}
