use crate::cards::{Card, Rank, Suit};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// A 52-card deck plus an optional number of jokers. Owned only during
/// session setup; dealing consumes it, after which no deck object exists.
#[derive(Debug, Clone)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    /// ```
    /// use cardtable_rs::deck::Deck;
    ///
    /// assert_eq!(Deck::standard(0).len(), 52);
    /// assert_eq!(Deck::standard(2).len(), 54);
    /// ```
    pub fn standard(joker_count: usize) -> Self {
        let mut cards = Vec::with_capacity(52 + joker_count);
        for &s in &Suit::NATURAL {
            for &r in &Rank::NATURAL {
                cards.push(Card::new(r, s));
            }
        }
        for _ in 0..joker_count {
            cards.push(Card::joker());
        }
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

    /// Flag the first joker as the elimination-game marker. Returns false if
    /// the deck holds no joker.
    pub fn mark_joker(&mut self) -> bool {
        if let Some(j) = self.cards.iter_mut().find(|c| c.is_joker()) {
            j.mark();
            return true;
        }
        false
    }

    /// Shuffle using a seeded RNG for reproducibility.
    pub fn shuffle_seeded(&mut self, seed: u64) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        self.cards.shuffle(&mut rng);
    }

    /// Shuffle using the provided RNG implementing Rng.
    pub fn shuffle_with<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.cards.shuffle(rng);
    }

    /// Deal the whole deck round-robin, one card at a time, consuming it.
    /// When `seats` does not divide the deck size evenly the earlier seats
    /// receive one card more.
    pub fn deal_round_robin(self, seats: usize) -> Vec<Vec<Card>> {
        assert!(seats > 0, "deal requires at least one seat");
        let mut hands = vec![Vec::with_capacity(self.cards.len() / seats + 1); seats];
        for (i, card) in self.cards.into_iter().enumerate() {
            hands[i % seats].push(card);
        }
        hands
    }
}
