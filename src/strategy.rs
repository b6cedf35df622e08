//! Bot decision making on top of `RuleModule::legal_moves`. Strategies never
//! touch session state; they pick from the already-validated move list, so a
//! bot move can only be rejected if the engine itself is broken.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::cards::Rank;
use crate::engine::{InvariantViolation, SessionState};
use crate::rules::{Move, RuleModule, TableState, Variant};
use crate::rules::shedding::combination_strength;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Difficulty {
    /// Plays a uniformly random legal move and occasionally passes on
    /// purpose.
    #[default]
    Low,
    /// Always plays when it can, picking the strongest shedding combination
    /// or the safest elimination draw.
    High,
}

/// Tunable bot parameters. `play_probability` is the chance a bot plays
/// rather than voluntarily passing when both are legal.
#[derive(Debug, Clone, Copy)]
pub struct StrategyProfile {
    pub difficulty: Difficulty,
    pub play_probability: f64,
    pub rng_seed: Option<u64>,
}

impl StrategyProfile {
    pub fn for_difficulty(difficulty: Difficulty) -> Self {
        let play_probability = match difficulty {
            Difficulty::Low => 0.7,
            Difficulty::High => 1.0,
        };
        Self { difficulty, play_probability, rng_seed: None }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }
}

impl Default for StrategyProfile {
    fn default() -> Self {
        Self::for_difficulty(Difficulty::Low)
    }
}

/// Per-seat bot state: the profile plus a private RNG stream.
pub struct BotStrategy {
    profile: StrategyProfile,
    rng: StdRng,
}

impl BotStrategy {
    pub fn new(profile: StrategyProfile) -> Self {
        let rng = match profile.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self { profile, rng }
    }

    pub fn profile(&self) -> &StrategyProfile {
        &self.profile
    }

    /// Pick a move for `seat`. Errors only when the rules offer no legal
    /// move and passing is not allowed, which the variants never produce
    /// for an active seat.
    pub fn choose(
        &mut self,
        rules: &dyn RuleModule,
        state: &SessionState,
        seat: usize,
    ) -> Result<Move, InvariantViolation> {
        let legal = rules.legal_moves(state, seat);
        let can_pass = rules.pass_allowed(state);

        if legal.is_empty() {
            return if can_pass { Ok(Move::Pass) } else { Err(InvariantViolation::NoSafeMove(seat)) };
        }
        if can_pass && self.rng.random::<f64>() >= self.profile.play_probability {
            return Ok(Move::Pass);
        }

        let choice = match self.profile.difficulty {
            Difficulty::Low => self.pick_uniform(&legal),
            Difficulty::High => match rules.variant() {
                Variant::Shedding => self.pick_strongest(&legal, state),
                Variant::Elimination => self.pick_safest_draw(&legal, state, seat),
            },
        };
        Ok(choice)
    }

    fn pick_uniform(&mut self, legal: &[Move]) -> Move {
        legal[self.rng.random_range(0..legal.len())].clone()
    }

    /// Hardest-to-beat combination under the current order direction,
    /// breaking strength ties uniformly.
    fn pick_strongest(&mut self, legal: &[Move], state: &SessionState) -> Move {
        let reversed = match state.table() {
            TableState::Shedding(t) => t.reversed(),
            TableState::Elimination => false,
        };
        let strength = |mv: &Move| match mv {
            Move::Play(cards) => {
                let s = combination_strength(cards, reversed);
                if reversed { 20 - s } else { s }
            }
            _ => 0,
        };
        let best = legal.iter().map(strength).max().unwrap_or(0);
        let tied: Vec<&Move> = legal.iter().filter(|mv| strength(mv) == best).collect();
        (*tied[self.rng.random_range(0..tied.len())]).clone()
    }

    /// Prefer draw positions whose rank does not already appear in our own
    /// hand, to avoid forming a pair that sheds a card we just sank a turn
    /// into. Falls back to uniform when every position matches.
    fn pick_safest_draw(&mut self, legal: &[Move], state: &SessionState, seat: usize) -> Move {
        let Some(target) = state.next_active_after(seat) else {
            return self.pick_uniform(legal);
        };
        let own: Vec<Rank> =
            state.players()[seat].hand().cards().iter().map(|c| c.rank()).collect();
        let target_hand = state.players()[target].hand().cards();

        let safe: Vec<&Move> = legal
            .iter()
            .filter(|mv| match mv {
                Move::Draw { index } => target_hand
                    .get(*index)
                    .is_some_and(|c| !c.is_marked() && !own.contains(&c.rank())),
                _ => false,
            })
            .collect();
        if safe.is_empty() {
            self.pick_uniform(legal)
        } else {
            (*safe[self.rng.random_range(0..safe.len())]).clone()
        }
    }
}
