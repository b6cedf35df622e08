//! Daifugo-style shedding rules: same-rank combinations must beat the table
//! under the current order direction, four-of-a-kind triggers a revolution
//! that inverts rank strength, and the first player to empty their hand takes
//! the best finishing rank.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::cards::{Card, Rank, Suit};
use crate::engine::{Event, InvariantViolation, SessionState};
use crate::rules::{IllegalMoveError, Move, RuleModule, TableState, Variant};

/// Strength a joker combination counts as under the normal order. Jokers are
/// the strongest card and stay strongest after a reversal.
const JOKER_STRENGTH_ASCENDING: u8 = 20;
const JOKER_STRENGTH_DESCENDING: u8 = 0;

/// Combination size that toggles the rank-order reversal.
const REVOLUTION_SIZE: usize = 4;

/// Largest combination the move enumeration considers.
const MAX_COMBINATION: usize = 4;

/// Shedding-mode table: the last accepted play, who made it, and the order
/// direction.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Table {
    play: Vec<Card>,
    last_seat: Option<usize>,
    reversed: bool,
}

impl Table {
    pub fn cards(&self) -> &[Card] {
        &self.play
    }

    pub fn last_seat(&self) -> Option<usize> {
        self.last_seat
    }

    pub fn reversed(&self) -> bool {
        self.reversed
    }
}

/// Effective strength of a well-formed combination under the given order
/// direction. Joker combinations pin to the extreme that keeps them
/// strongest.
pub fn combination_strength(cards: &[Card], reversed: bool) -> u8 {
    if cards.iter().any(|c| c.is_joker()) {
        if reversed {
            JOKER_STRENGTH_DESCENDING
        } else {
            JOKER_STRENGTH_ASCENDING
        }
    } else {
        cards.first().map(|c| c.rank().value()).unwrap_or(0)
    }
}

/// A combination is well-formed iff it is a single card, or every card
/// shares one rank, or it contains a joker (jokers match any context).
pub fn is_well_formed(cards: &[Card]) -> bool {
    match cards.len() {
        0 => false,
        1 => true,
        _ => {
            if cards.iter().any(|c| c.is_joker()) {
                return true;
            }
            let rank = cards[0].rank();
            cards.iter().all(|c| c.rank() == rank)
        }
    }
}

/// Hand ordering used for display/bookkeeping: strongest card first under
/// the current direction. Cosmetic only, never consulted for legality.
pub fn hand_comparator(reversed: bool) -> impl Fn(&Card, &Card) -> Ordering {
    move |a, b| {
        if reversed {
            a.rank().value().cmp(&b.rank().value())
        } else {
            b.rank().value().cmp(&a.rank().value())
        }
    }
}

#[derive(Debug, Default)]
pub struct SheddingRules;

impl SheddingRules {
    pub fn new() -> Self {
        Self
    }

    fn table<'a>(&self, state: &'a SessionState) -> &'a Table {
        match state.table() {
            TableState::Shedding(t) => t,
            TableState::Elimination => unreachable!("shedding rules with elimination table"),
        }
    }

    fn beats(&self, candidate: &[Card], table: &Table) -> bool {
        let cand = combination_strength(candidate, table.reversed);
        let curr = combination_strength(&table.play, table.reversed);
        if table.reversed {
            cand < curr
        } else {
            cand > curr
        }
    }
}

impl RuleModule for SheddingRules {
    fn variant(&self) -> Variant {
        Variant::Shedding
    }

    fn initial_table(&self) -> TableState {
        TableState::Shedding(Table::default())
    }

    fn after_deal(&self, state: &mut SessionState) -> Vec<usize> {
        for player in state.players_mut() {
            player.hand_mut().sort_by(hand_comparator(false));
        }
        Vec::new()
    }

    /// The holder of the Three of Spades opens; seat 0 as a fallback.
    fn lead_seat(&self, state: &SessionState) -> usize {
        let opener = Card::new(Rank::Three, Suit::Spades);
        state
            .players()
            .iter()
            .position(|p| p.hand().contains(&opener))
            .unwrap_or(0)
    }

    fn pass_allowed(&self, state: &SessionState) -> bool {
        !self.table(state).play.is_empty()
    }

    fn check_move(
        &self,
        state: &SessionState,
        seat: usize,
        mv: &Move,
    ) -> Result<(), IllegalMoveError> {
        let table = self.table(state);
        match mv {
            Move::Pass => {
                if table.play.is_empty() {
                    return Err(IllegalMoveError::PassNotAllowed);
                }
                Ok(())
            }
            Move::Play(cards) => {
                if cards.is_empty() {
                    return Err(IllegalMoveError::EmptyPlay);
                }
                let mut probe = state.players()[seat].hand().clone();
                if probe.take_exact(cards).is_none() {
                    return Err(IllegalMoveError::CardsNotHeld);
                }
                if !is_well_formed(cards) {
                    return Err(IllegalMoveError::MalformedCombination);
                }
                if table.play.is_empty() {
                    return Ok(());
                }
                if cards.len() != table.play.len() {
                    return Err(IllegalMoveError::WrongCombinationSize {
                        expected: table.play.len(),
                        got: cards.len(),
                    });
                }
                if !self.beats(cards, table) {
                    return Err(IllegalMoveError::DoesNotBeatTable);
                }
                Ok(())
            }
            Move::Draw { .. } => Err(IllegalMoveError::WrongVariant),
        }
    }

    fn apply_move(
        &self,
        state: &mut SessionState,
        seat: usize,
        mv: &Move,
    ) -> Result<Vec<usize>, InvariantViolation> {
        match mv {
            Move::Play(cards) => {
                let played = state.players_mut()[seat]
                    .hand_mut()
                    .take_exact(cards)
                    .ok_or(InvariantViolation::UncheckedMove)?;

                let toggles = played.len() >= REVOLUTION_SIZE;
                let emptied = if state.players()[seat].hand().is_empty() {
                    vec![seat]
                } else {
                    Vec::new()
                };

                let TableState::Shedding(table) = state.table_mut() else {
                    return Err(InvariantViolation::UncheckedMove);
                };
                let previous = std::mem::replace(&mut table.play, played);
                table.last_seat = Some(seat);
                let reversed = if toggles {
                    table.reversed = !table.reversed;
                    Some(table.reversed)
                } else {
                    None
                };
                state.discard_all(previous);
                state.reset_pass_streak();

                if let Some(reversed) = reversed {
                    // Cosmetic re-sort of every remaining hand; legality of
                    // the triggering play was judged before the toggle.
                    for player in state.players_mut() {
                        player.hand_mut().sort_by(hand_comparator(reversed));
                    }
                    state.push_event(Event::RevolutionToggled { reversed });
                }

                Ok(emptied)
            }
            Move::Pass => {
                let streak = state.bump_pass_streak();
                let active = state.active_count();
                if active > 1 && streak >= active - 1 {
                    // Trick over: the turn advances past this final passer,
                    // which in the common full-circle case lands back on the
                    // player whose combination went unanswered.
                    let TableState::Shedding(table) = state.table_mut() else {
                        return Err(InvariantViolation::UncheckedMove);
                    };
                    let cleared = std::mem::take(&mut table.play);
                    table.last_seat = None;
                    state.discard_all(cleared);
                    state.reset_pass_streak();
                    state.push_event(Event::TrickCleared);
                }
                Ok(Vec::new())
            }
            Move::Draw { .. } => Err(InvariantViolation::UncheckedMove),
        }
    }

    fn legal_moves(&self, state: &SessionState, seat: usize) -> Vec<Move> {
        let hand = state.players()[seat].hand().cards();
        let jokers: Vec<Card> = hand.iter().copied().filter(|c| c.is_joker()).collect();
        let mut by_rank: BTreeMap<Rank, Vec<Card>> = BTreeMap::new();
        for &card in hand.iter().filter(|c| !c.is_joker()) {
            by_rank.entry(card.rank()).or_default().push(card);
        }

        let mut candidates: Vec<Vec<Card>> = Vec::new();
        for cards in by_rank.values() {
            candidates.push(vec![cards[0]]);
            for k in 2..=MAX_COMBINATION {
                if cards.len() >= k {
                    candidates.push(cards[..k].to_vec());
                } else if cards.len() + jokers.len() >= k {
                    let mut padded = cards.clone();
                    padded.extend_from_slice(&jokers[..k - cards.len()]);
                    candidates.push(padded);
                }
            }
        }
        if !jokers.is_empty() {
            candidates.push(vec![jokers[0]]);
        }
        if jokers.len() >= 2 {
            candidates.push(jokers[..2].to_vec());
        }

        candidates.retain(|c| self.check_move(state, seat, &Move::Play(c.clone())).is_ok());
        candidates.into_iter().map(Move::Play).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::parse_cards;

    fn state_with(hands: &[&str]) -> SessionState {
        SessionState::for_test(
            hands.iter().map(|s| parse_cards(s).unwrap()).collect(),
            SheddingRules::new().initial_table(),
        )
    }

    fn set_table(state: &mut SessionState, play: &str, seat: usize, reversed: bool) {
        *state.table_mut() = TableState::Shedding(Table {
            play: parse_cards(play).unwrap(),
            last_seat: Some(seat),
            reversed,
        });
    }

    #[test]
    fn seven_beats_six_until_the_order_reverses() {
        let rules = SheddingRules::new();
        let mut state = state_with(&["7c 5d", "6h 8s"]);

        set_table(&mut state, "6s", 1, false);
        let seven = Move::Play(parse_cards("7c").unwrap());
        let five = Move::Play(parse_cards("5d").unwrap());
        assert!(rules.check_move(&state, 0, &seven).is_ok());
        assert_eq!(rules.check_move(&state, 0, &five), Err(IllegalMoveError::DoesNotBeatTable));

        set_table(&mut state, "6s", 1, true);
        assert_eq!(rules.check_move(&state, 0, &seven), Err(IllegalMoveError::DoesNotBeatTable));
        assert!(rules.check_move(&state, 0, &five).is_ok());
    }

    #[test]
    fn triple_does_not_toggle_but_quad_does() {
        let rules = SheddingRules::new();
        let mut state = state_with(&["9c 9d 9h 5s", "4c 4d 4h 4s Kc"]);

        let triple = Move::Play(parse_cards("9c 9d 9h").unwrap());
        rules.apply_move(&mut state, 0, &triple).unwrap();
        let TableState::Shedding(t) = state.table() else { panic!() };
        assert!(!t.reversed());

        let quad = Move::Play(parse_cards("4c 4d 4h 4s").unwrap());
        rules.apply_move(&mut state, 1, &quad).unwrap();
        let TableState::Shedding(t) = state.table() else { panic!() };
        assert!(t.reversed());
        assert!(state
            .drain_events()
            .contains(&Event::RevolutionToggled { reversed: true }));
    }

    #[test]
    fn joker_padded_quad_also_toggles() {
        let rules = SheddingRules::new();
        let mut state = state_with(&["4c 4d 4h JOKER Kc"]);
        let padded = Move::Play(parse_cards("4c 4d 4h JOKER").unwrap());
        assert!(rules.check_move(&state, 0, &padded).is_ok());
        rules.apply_move(&mut state, 0, &padded).unwrap();
        let TableState::Shedding(t) = state.table() else { panic!() };
        assert!(t.reversed());
    }

    #[test]
    fn all_other_actives_passing_clears_the_trick() {
        let rules = SheddingRules::new();
        let mut state = state_with(&["5c 9d", "6h Kd", "7s Ac", "8c Qd"]);

        let play = Move::Play(parse_cards("5c").unwrap());
        rules.apply_move(&mut state, 0, &play).unwrap();
        assert_eq!(state.pass_streak(), 0);

        rules.apply_move(&mut state, 1, &Move::Pass).unwrap();
        assert_eq!(state.pass_streak(), 1);
        rules.apply_move(&mut state, 2, &Move::Pass).unwrap();
        assert!(!state.table().is_empty(), "two passes of three stay short of the threshold");

        // Third pass reaches the threshold; the trick clears and the turn
        // advances past the final passer, landing back on seat 0, whose
        // play went unanswered.
        rules.apply_move(&mut state, 3, &Move::Pass).unwrap();
        assert!(state.table().is_empty());
        assert_eq!(state.pass_streak(), 0);
        assert_eq!(state.discard().len(), 1);
        assert_eq!(state.next_active_after(3), Some(0));
        let TableState::Shedding(t) = state.table() else { panic!() };
        assert_eq!(t.last_seat(), None);
        assert!(state.drain_events().contains(&Event::TrickCleared));
    }

    // An unanswered single: everyone else passes, the table resets, and the
    // next lead is the seat after the last passer.
    #[test]
    fn unanswered_play_hands_the_fresh_trick_to_its_owner() {
        let rules = SheddingRules::new();
        let mut state = state_with(&["5c 9d", "6h Kd", "7s Ac", "Kc Qd"]);

        rules.apply_move(&mut state, 3, &Move::Play(parse_cards("Kc").unwrap())).unwrap();
        rules.apply_move(&mut state, 0, &Move::Pass).unwrap();
        rules.apply_move(&mut state, 1, &Move::Pass).unwrap();
        rules.apply_move(&mut state, 2, &Move::Pass).unwrap();

        assert!(state.table().is_empty());
        assert_eq!(state.next_active_after(2), Some(3), "trick winner leads the next trick");
    }

    #[test]
    fn pass_is_illegal_against_an_empty_table() {
        let rules = SheddingRules::new();
        let state = state_with(&["5c", "6h"]);
        assert_eq!(rules.check_move(&state, 0, &Move::Pass), Err(IllegalMoveError::PassNotAllowed));
    }

    #[test]
    fn legal_moves_agree_with_check_move() {
        let rules = SheddingRules::new();
        let mut state = state_with(&["3c 7d 7h 7s JOKER Kc", "4c 4d"]);
        set_table(&mut state, "6s 6d", 1, false);

        let legal = rules.legal_moves(&state, 0);
        assert!(!legal.is_empty());
        for mv in &legal {
            assert!(rules.check_move(&state, 0, mv).is_ok(), "enumerated illegal {mv:?}");
            let Move::Play(cards) = mv else { panic!("shedding enumerates plays only") };
            assert_eq!(cards.len(), 2, "must match the table size");
        }
        // Enumeration is deterministic for identical state.
        assert_eq!(legal, rules.legal_moves(&state, 0));
    }

    #[test]
    fn emptying_the_hand_reports_the_seat() {
        let rules = SheddingRules::new();
        let mut state = state_with(&["5c", "6h 7d"]);
        let emptied =
            rules.apply_move(&mut state, 0, &Move::Play(parse_cards("5c").unwrap())).unwrap();
        assert_eq!(emptied, vec![0]);
    }

    #[test]
    fn well_formed_combinations() {
        assert!(is_well_formed(&parse_cards("7c").unwrap()));
        assert!(is_well_formed(&parse_cards("7c 7d 7h").unwrap()));
        assert!(is_well_formed(&parse_cards("7c 7d JOKER").unwrap()));
        assert!(!is_well_formed(&parse_cards("7c 8d").unwrap()));
        assert!(!is_well_formed(&[]));
    }

    #[test]
    fn joker_strength_pins_to_the_strong_extreme() {
        let joker = parse_cards("JOKER").unwrap();
        let twos = parse_cards("2c 2d").unwrap();
        assert_eq!(combination_strength(&joker, false), JOKER_STRENGTH_ASCENDING);
        assert_eq!(combination_strength(&joker, true), JOKER_STRENGTH_DESCENDING);
        assert_eq!(combination_strength(&twos, false), 15);
    }

    #[test]
    fn comparator_orders_strongest_first_until_reversed() {
        let mut cards = parse_cards("3c 2d Kh").unwrap();
        cards.sort_by(hand_comparator(false));
        assert_eq!(cards, parse_cards("2d Kh 3c").unwrap());
        cards.sort_by(hand_comparator(true));
        assert_eq!(cards, parse_cards("3c Kh 2d").unwrap());
    }
}
