use crate::cards::Card;

/// A player's hand: an ordered card sequence mutated only by dealing,
/// playing/discarding, and drawing. A card instance lives in exactly one
/// hand (or on the table) at a time; `take_exact` enforces that a play can
/// never duplicate a reference.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hand {
    cards: Vec<Card>,
}

impl Hand {
    pub fn new() -> Self {
        Self { cards: Vec::new() }
    }

    pub fn from_cards(cards: Vec<Card>) -> Self {
        Self { cards }
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn contains(&self, card: &Card) -> bool {
        self.cards.contains(card)
    }

    pub fn add(&mut self, card: Card) {
        self.cards.push(card);
    }

    /// Extract every card matching the predicate, preserving the relative
    /// order of both the removed cards and the remainder.
    pub fn remove_where<F>(&mut self, mut pred: F) -> Vec<Card>
    where
        F: FnMut(&Card) -> bool,
    {
        let mut removed = Vec::new();
        let mut kept = Vec::with_capacity(self.cards.len());
        for card in self.cards.drain(..) {
            if pred(&card) {
                removed.push(card);
            } else {
                kept.push(card);
            }
        }
        self.cards = kept;
        removed
    }

    /// Remove the card at `index`, if any (the blind-draw primitive).
    pub fn remove_at(&mut self, index: usize) -> Option<Card> {
        if index < self.cards.len() {
            Some(self.cards.remove(index))
        } else {
            None
        }
    }

    /// Remove exactly one instance per requested card. Returns the removed
    /// cards (hand instances, so marker flags survive), or `None` without
    /// mutating when any request cannot be satisfied.
    pub fn take_exact(&mut self, selection: &[Card]) -> Option<Vec<Card>> {
        let mut indices: Vec<usize> = Vec::with_capacity(selection.len());
        for want in selection {
            let found = self
                .cards
                .iter()
                .enumerate()
                .position(|(i, c)| c == want && !indices.contains(&i))?;
            indices.push(found);
        }
        indices.sort_unstable();
        let mut taken = Vec::with_capacity(indices.len());
        for &i in indices.iter().rev() {
            taken.push(self.cards.remove(i));
        }
        taken.reverse();
        Some(taken)
    }

    pub fn sort_by<F>(&mut self, cmp: F)
    where
        F: FnMut(&Card, &Card) -> std::cmp::Ordering,
    {
        self.cards.sort_by(cmp);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::parse_cards;

    fn hand(s: &str) -> Hand {
        Hand::from_cards(parse_cards(s).unwrap())
    }

    #[test]
    fn add_and_contains() {
        let mut h = hand("3s 7h");
        let card = parse_cards("Kd").unwrap()[0];
        assert!(!h.contains(&card));
        h.add(card);
        assert!(h.contains(&card));
        assert_eq!(h.len(), 3);
    }

    #[test]
    fn remove_where_preserves_remainder_order() {
        let mut h = hand("3s 7h 3d Kc 7c");
        let sevens = h.remove_where(|c| c.rank() == crate::cards::Rank::Seven);
        assert_eq!(sevens, parse_cards("7h 7c").unwrap());
        assert_eq!(h.cards(), parse_cards("3s 3d Kc").unwrap().as_slice());
    }

    #[test]
    fn take_exact_removes_one_instance_per_request() {
        let mut h = hand("7h 7d 7c");
        let taken = h.take_exact(&parse_cards("7h 7d").unwrap()).unwrap();
        assert_eq!(taken.len(), 2);
        assert_eq!(h.len(), 1);
    }

    #[test]
    fn take_exact_fails_without_mutation_when_card_missing() {
        let mut h = hand("7h 7d");
        assert!(h.take_exact(&parse_cards("7h Ks").unwrap()).is_none());
        assert_eq!(h.len(), 2, "failed take must leave the hand untouched");
    }

    #[test]
    fn take_exact_never_duplicates_a_reference() {
        // Two jokers requested, only one held: must fail, not take it twice.
        let mut h = hand("JOKER 3c");
        assert!(h.take_exact(&parse_cards("JOKER JOKER").unwrap()).is_none());
        assert_eq!(h.len(), 2);
    }

    #[test]
    fn remove_at_bounds() {
        let mut h = hand("3s 7h");
        assert!(h.remove_at(5).is_none());
        let c = h.remove_at(0).unwrap();
        assert_eq!(c, parse_cards("3s").unwrap()[0]);
        assert_eq!(h.len(), 1);
    }
}
