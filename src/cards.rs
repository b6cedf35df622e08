use std::fmt;
use std::str::FromStr;

/// Card ranks in climbing order: Three (low) through Two (high), with the
/// joker above everything. This is the shedding-game order; the elimination
/// variant only cares about rank equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Rank {
    Three = 3,
    Four = 4,
    Five = 5,
    Six = 6,
    Seven = 7,
    Eight = 8,
    Nine = 9,
    Ten = 10,
    Jack = 11,
    Queen = 12,
    King = 13,
    Ace = 14,
    Two = 15,
    Joker = 16,
}

impl Rank {
    /// The thirteen natural ranks, climbing order, joker excluded.
    pub const NATURAL: [Rank; 13] = [
        Rank::Three,
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
        Rank::Ace,
        Rank::Two,
    ];

    pub const fn value(self) -> u8 {
        self as u8
    }

    pub const fn label(self) -> &'static str {
        match self {
            Rank::Three => "3",
            Rank::Four => "4",
            Rank::Five => "5",
            Rank::Six => "6",
            Rank::Seven => "7",
            Rank::Eight => "8",
            Rank::Nine => "9",
            Rank::Ten => "10",
            Rank::Jack => "J",
            Rank::Queen => "Q",
            Rank::King => "K",
            Rank::Ace => "A",
            Rank::Two => "2",
            Rank::Joker => "JOKER",
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RankParseError {
    #[error("invalid rank: '{0}'")]
    Invalid(String),
}

impl FromStr for Rank {
    type Err = RankParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        let r = match upper.as_str() {
            "3" => Rank::Three,
            "4" => Rank::Four,
            "5" => Rank::Five,
            "6" => Rank::Six,
            "7" => Rank::Seven,
            "8" => Rank::Eight,
            "9" => Rank::Nine,
            "10" | "T" => Rank::Ten,
            "J" => Rank::Jack,
            "Q" => Rank::Queen,
            "K" => Rank::King,
            "A" => Rank::Ace,
            "2" => Rank::Two,
            "JOKER" => Rank::Joker,
            _ => return Err(RankParseError::Invalid(s.to_string())),
        };
        Ok(r)
    }
}

/// Four natural suits plus the wildcard joker suit. Suit order carries no
/// gameplay meaning but is fixed so cards sort stably.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Suit {
    Clubs,
    Diamonds,
    Hearts,
    Spades,
    Joker,
}

impl Suit {
    pub const NATURAL: [Suit; 4] = [Suit::Clubs, Suit::Diamonds, Suit::Hearts, Suit::Spades];

    pub const fn to_char(self) -> char {
        match self {
            Suit::Clubs => 'c',
            Suit::Diamonds => 'd',
            Suit::Hearts => 'h',
            Suit::Spades => 's',
            Suit::Joker => '*',
        }
    }
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SuitParseError {
    #[error("invalid suit: '{0}'")]
    Invalid(String),
}

impl TryFrom<char> for Suit {
    type Error = SuitParseError;
    fn try_from(c: char) -> Result<Self, Self::Error> {
        match c.to_ascii_lowercase() {
            'c' => Ok(Suit::Clubs),
            'd' => Ok(Suit::Diamonds),
            'h' => Ok(Suit::Hearts),
            's' => Ok(Suit::Spades),
            '*' => Ok(Suit::Joker),
            _ => Err(SuitParseError::Invalid(c.to_string())),
        }
    }
}

/// A playing card: rank + suit, plus the elimination-game marker flag.
///
/// Equality and hashing consider rank and suit only; `marked` designates the
/// single Old-Maid card and never participates in identity (a deck holds at
/// most one marked card per session).
///
/// ```
/// use cardtable_rs::cards::{Card, Rank, Suit};
///
/// let card = Card::new(Rank::Queen, Suit::Spades);
/// assert_eq!(card.to_string(), "Qs");
/// assert_eq!(Card::joker().to_string(), "JOKER");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Card {
    rank: Rank,
    suit: Suit,
    marked: bool,
}

impl Card {
    pub const fn new(rank: Rank, suit: Suit) -> Self {
        Self { rank, suit, marked: false }
    }

    pub const fn joker() -> Self {
        Self { rank: Rank::Joker, suit: Suit::Joker, marked: false }
    }

    pub const fn rank(self) -> Rank {
        self.rank
    }
    pub const fn suit(self) -> Suit {
        self.suit
    }

    pub const fn is_joker(self) -> bool {
        matches!(self.rank, Rank::Joker)
    }

    pub const fn is_marked(self) -> bool {
        self.marked
    }

    pub(crate) fn mark(&mut self) {
        self.marked = true;
    }
}

impl PartialEq for Card {
    fn eq(&self, other: &Self) -> bool {
        self.rank == other.rank && self.suit == other.suit
    }
}

impl Eq for Card {}

impl PartialOrd for Card {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Card {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.rank, self.suit).cmp(&(other.rank, other.suit))
    }
}

impl std::hash::Hash for Card {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        (self.rank, self.suit).hash(state);
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_joker() {
            write!(f, "JOKER")
        } else {
            write!(f, "{}{}", self.rank, self.suit)
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CardParseError {
    #[error("invalid card: '{0}'")]
    Invalid(String),
    #[error(transparent)]
    Rank(#[from] RankParseError),
    #[error(transparent)]
    Suit(#[from] SuitParseError),
}

impl FromStr for Card {
    type Err = CardParseError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let t = s.trim();
        if t.eq_ignore_ascii_case("joker") {
            return Ok(Card::joker());
        }
        // rank is everything but the last char; suit is the last char.
        // Split on the char boundary so multi-byte suit symbols fail as a
        // parse error rather than a slicing panic.
        let Some((split, suit_ch)) = t.char_indices().last() else {
            return Err(CardParseError::Invalid(s.to_string()));
        };
        let rank_str = &t[..split];
        if rank_str.is_empty() {
            return Err(CardParseError::Invalid(s.to_string()));
        }

        let rank = Rank::from_str(rank_str)?;
        let suit = Suit::try_from(suit_ch)?;
        if matches!(rank, Rank::Joker) != matches!(suit, Suit::Joker) {
            return Err(CardParseError::Invalid(s.to_string()));
        }
        Ok(Card::new(rank, suit))
    }
}

/// Parse multiple cards separated by whitespace or commas.
///
/// ```
/// use cardtable_rs::cards::{parse_cards, Card, Rank, Suit};
///
/// let cards = parse_cards("Qs, 10d JOKER").unwrap();
/// assert_eq!(cards[0], Card::new(Rank::Queen, Suit::Spades));
/// assert_eq!(cards[1], Card::new(Rank::Ten, Suit::Diamonds));
/// assert!(cards[2].is_joker());
/// ```
pub fn parse_cards(input: &str) -> Result<Vec<Card>, CardParseError> {
    input
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .map(Card::from_str)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rank_display_and_from_str() {
        assert_eq!(Rank::Two.to_string(), "2");
        assert_eq!(Rank::from_str("T").unwrap(), Rank::Ten);
        assert_eq!(Rank::from_str("10").unwrap(), Rank::Ten);
        assert_eq!(Rank::from_str("joker").unwrap(), Rank::Joker);
        assert!(Rank::from_str("1").is_err());
    }

    #[test]
    fn climbing_order_puts_two_above_ace() {
        assert!(Rank::Two > Rank::Ace);
        assert!(Rank::Joker > Rank::Two);
        assert!(Rank::Three < Rank::Four);
    }

    #[test]
    fn card_display_and_from_str() {
        let q = Card::new(Rank::Queen, Suit::Spades);
        assert_eq!(q.to_string(), "Qs");
        assert_eq!(Card::from_str("Qs").unwrap(), q);
        assert_eq!(Card::from_str("10d").unwrap(), Card::new(Rank::Ten, Suit::Diamonds));
        assert_eq!(Card::from_str("JOKER").unwrap(), Card::joker());
        assert!(Card::from_str("Jokerc").is_err());
    }

    #[test]
    fn multibyte_suit_symbols_are_rejected_not_panicked() {
        assert!(matches!(Card::from_str("Q♠"), Err(CardParseError::Suit(_))));
        assert!(matches!(Card::from_str("♠"), Err(CardParseError::Invalid(_))));
        assert!(matches!(Card::from_str(""), Err(CardParseError::Invalid(_))));
        assert!(matches!(Card::from_str("s"), Err(CardParseError::Invalid(_))));
    }

    #[test]
    fn marked_flag_does_not_affect_identity() {
        let mut a = Card::joker();
        let b = Card::joker();
        a.mark();
        assert!(a.is_marked());
        assert_eq!(a, b);
    }

    #[test]
    fn parse_many_cards() {
        let xs = parse_cards("3s, Ah JOKER").unwrap();
        assert_eq!(xs.len(), 3);
        assert_eq!(xs[0], Card::new(Rank::Three, Suit::Spades));
        assert_eq!(xs[1], Card::new(Rank::Ace, Suit::Hearts));
        assert!(xs[2].is_joker());
    }
}
