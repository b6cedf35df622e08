//! Old Maid-style elimination rules: hands shed same-rank pairs
//! automatically, turns are blind draws from the next active player, and the
//! last player standing holds the marked card and takes the worst rank.

use std::collections::BTreeMap;

use crate::cards::Rank;
use crate::engine::{Event, InvariantViolation, SessionState};
use crate::rules::{IllegalMoveError, Move, RuleModule, TableState, Variant};

#[derive(Debug, Default)]
pub struct EliminationRules;

impl EliminationRules {
    pub fn new() -> Self {
        Self
    }

    /// Strip every same-rank pair from `seat`'s hand into the discard pile.
    /// One pass reaches the fixed point: afterwards no two unmarked cards in
    /// the hand share a rank. The marked card never pairs and is always
    /// retained. Returns the number of pairs removed.
    fn strip_pairs(&self, state: &mut SessionState, seat: usize) -> usize {
        let mut budget: BTreeMap<Rank, usize> = BTreeMap::new();
        for card in state.players()[seat].hand().cards() {
            if !card.is_marked() {
                *budget.entry(card.rank()).or_insert(0) += 1;
            }
        }
        for count in budget.values_mut() {
            *count = (*count / 2) * 2;
        }

        let removed = state.players_mut()[seat].hand_mut().remove_where(|card| {
            if card.is_marked() {
                return false;
            }
            match budget.get_mut(&card.rank()) {
                Some(n) if *n > 0 => {
                    *n -= 1;
                    true
                }
                _ => false,
            }
        });

        let pairs = removed.len() / 2;
        state.discard_all(removed);
        if pairs > 0 {
            state.push_event(Event::PairsDiscarded { seat, pairs });
        }
        pairs
    }
}

impl RuleModule for EliminationRules {
    fn variant(&self) -> Variant {
        Variant::Elimination
    }

    fn initial_table(&self) -> TableState {
        TableState::Elimination
    }

    /// Normalize every hand once dealing completes; a hand emptied by the
    /// initial strip finishes immediately, in seat order.
    fn after_deal(&self, state: &mut SessionState) -> Vec<usize> {
        let mut emptied = Vec::new();
        for seat in 0..state.players().len() {
            self.strip_pairs(state, seat);
            if state.players()[seat].hand().is_empty() {
                emptied.push(seat);
            }
        }
        emptied
    }

    fn lead_seat(&self, _state: &SessionState) -> usize {
        0
    }

    fn pass_allowed(&self, _state: &SessionState) -> bool {
        false
    }

    fn check_move(
        &self,
        state: &SessionState,
        seat: usize,
        mv: &Move,
    ) -> Result<(), IllegalMoveError> {
        match mv {
            Move::Draw { index } => {
                let Some(target) = state.next_active_after(seat) else {
                    return Err(IllegalMoveError::NotAwaitingPlay);
                };
                let len = state.players()[target].hand().len();
                if *index >= len {
                    return Err(IllegalMoveError::DrawOutOfRange { len, got: *index });
                }
                Ok(())
            }
            Move::Pass => Err(IllegalMoveError::PassNotAllowed),
            Move::Play(_) => Err(IllegalMoveError::WrongVariant),
        }
    }

    fn apply_move(
        &self,
        state: &mut SessionState,
        seat: usize,
        mv: &Move,
    ) -> Result<Vec<usize>, InvariantViolation> {
        let Move::Draw { index } = mv else {
            return Err(InvariantViolation::UncheckedMove);
        };
        let target = state.next_active_after(seat).ok_or(InvariantViolation::NoActivePlayer)?;
        let card = state.players_mut()[target]
            .hand_mut()
            .remove_at(*index)
            .ok_or(InvariantViolation::UncheckedMove)?;

        if card.is_marked() {
            state.push_event(Event::MarkedCardDrawn { seat });
        }
        state.players_mut()[seat].hand_mut().add(card);
        self.strip_pairs(state, seat);

        // Drawer first, then the drawn-from hand (original finish order).
        let mut emptied = Vec::new();
        if state.players()[seat].hand().is_empty() {
            emptied.push(seat);
        }
        if state.players()[target].hand().is_empty() {
            emptied.push(target);
        }
        Ok(emptied)
    }

    fn legal_moves(&self, state: &SessionState, seat: usize) -> Vec<Move> {
        let Some(target) = state.next_active_after(seat) else {
            return Vec::new();
        };
        (0..state.players()[target].hand().len())
            .map(|index| Move::Draw { index })
            .collect()
    }
}
