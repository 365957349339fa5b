use std::fmt;
use std::str::FromStr;

/// Card ranks in deal-code order. Discriminants are the face numbers, with
/// the ace stored high so the code layout (2..K then A) maps directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Rank {
    Two = 2,
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
}

impl Rank {
    /// Ranks in the order they appear inside one suit of the 1–52 code space.
    pub const ALL: [Rank; 13] = [
        Rank::Two,
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
    ];

    /// Point value used for bull counting: A = 1, 10/J/Q/K = 10.
    pub const fn points(self) -> u8 {
        match self {
            Rank::Ace => 1,
            Rank::Ten | Rank::Jack | Rank::Queen | Rank::King => 10,
            r => r as u8,
        }
    }

    /// Comparison order for high-card tie breaks: A = 1 (lowest) .. K = 13.
    pub const fn order(self) -> u8 {
        match self {
            Rank::Ace => 1,
            r => r as u8,
        }
    }

    /// J, Q or K.
    pub const fn is_face(self) -> bool {
        matches!(self, Rank::Jack | Rank::Queen | Rank::King)
    }

    /// Rank from its comparison order (1 = A .. 13 = K).
    pub const fn from_order(order: u8) -> Option<Rank> {
        match order {
            1 => Some(Rank::Ace),
            2..=13 => Some(Rank::ALL[(order - 2) as usize]),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Rank::Two => "2",
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
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
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
            "2" => Rank::Two,
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
            "A" | "1" => Rank::Ace,
            _ => return Err(RankParseError::Invalid(s.to_string())),
        };
        Ok(r)
    }
}

/// Four suits. Declaration order follows tie-break strength:
/// diamond (1) < club (2) < heart (3) < spade (4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Suit {
    Diamonds,
    Clubs,
    Hearts,
    Spades,
}

impl Suit {
    /// Suits in code order: 1..=13 spades, 14..=26 hearts, 27..=39 clubs, 40..=52 diamonds.
    pub const CODE_ORDER: [Suit; 4] = [Suit::Spades, Suit::Hearts, Suit::Clubs, Suit::Diamonds];

    pub const fn strength(self) -> u8 {
        match self {
            Suit::Diamonds => 1,
            Suit::Clubs => 2,
            Suit::Hearts => 3,
            Suit::Spades => 4,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Suit::Spades => "黑桃",
            Suit::Hearts => "红心",
            Suit::Clubs => "梅花",
            Suit::Diamonds => "方片",
        }
    }

    const fn code_index(self) -> u8 {
        match self {
            Suit::Spades => 0,
            Suit::Hearts => 1,
            Suit::Clubs => 2,
            Suit::Diamonds => 3,
        }
    }
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SuitParseError {
    #[error("invalid suit: '{0}'")]
    Invalid(String),
}

impl FromStr for Suit {
    type Err = SuitParseError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "黑桃" | "s" | "S" | "spades" => Ok(Suit::Spades),
            "红心" | "紅心" | "h" | "H" | "hearts" => Ok(Suit::Hearts),
            "梅花" | "c" | "C" | "clubs" => Ok(Suit::Clubs),
            "方片" | "方块" | "方塊" | "d" | "D" | "diamonds" => Ok(Suit::Diamonds),
            _ => Err(SuitParseError::Invalid(s.to_string())),
        }
    }
}

/// A playing card decoded from the 1–52 deal code.
///
/// ```
/// use table_audit::cards::{Card, Rank, Suit};
///
/// let card = Card::from_code(13).unwrap();
/// assert_eq!(card, Card::new(Rank::Ace, Suit::Spades));
/// assert_eq!(card.to_string(), "黑桃A");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Card {
    rank: Rank,
    suit: Suit,
}

impl Card {
    pub const fn new(rank: Rank, suit: Suit) -> Self {
        Self { rank, suit }
    }

    /// Decode a server deal code (1..=52).
    pub fn from_code(code: u8) -> Result<Self, CardParseError> {
        if !(1..=52).contains(&code) {
            return Err(CardParseError::Code(code));
        }
        let idx = code - 1;
        let suit = Suit::CODE_ORDER[(idx / 13) as usize];
        let rank = Rank::ALL[(idx % 13) as usize];
        Ok(Self { rank, suit })
    }

    pub const fn code(self) -> u8 {
        let within = match self.rank {
            Rank::Ace => 12,
            r => r as u8 - 2,
        };
        self.suit.code_index() * 13 + within + 1
    }

    pub const fn rank(self) -> Rank {
        self.rank
    }

    pub const fn suit(self) -> Suit {
        self.suit
    }

    pub const fn points(self) -> u8 {
        self.rank.points()
    }

    /// Tie-break key: rank order (A lowest), then suit strength.
    pub const fn strength(self) -> (u8, u8) {
        (self.rank.order(), self.suit.strength())
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.suit, self.rank)
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CardParseError {
    #[error("invalid card: '{0}'")]
    Invalid(String),
    #[error("card code out of range 1..=52: {0}")]
    Code(u8),
    #[error(transparent)]
    Rank(#[from] RankParseError),
    #[error(transparent)]
    Suit(#[from] SuitParseError),
}

impl FromStr for Card {
    type Err = CardParseError;

    /// Accepts the display form (`黑桃A`, `方片10`) or the short ASCII form (`As`, `10d`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let t = s.trim();
        if t.chars().count() < 2 {
            return Err(CardParseError::Invalid(s.to_string()));
        }
        let first = t.chars().next().map(|c| c.is_ascii()).unwrap_or(false);
        if first {
            // rank first, suit letter last
            let (rank_str, suit_str) = t.split_at(t.len() - 1);
            let rank = Rank::from_str(rank_str)?;
            let suit = Suit::from_str(suit_str)?;
            return Ok(Card::new(rank, suit));
        }
        // two-character suit name, then rank
        let split = t.char_indices().nth(2).map(|(i, _)| i).unwrap_or(t.len());
        let (suit_str, rank_str) = t.split_at(split);
        let suit = Suit::from_str(suit_str)?;
        let rank = Rank::from_str(rank_str)?;
        Ok(Card::new(rank, suit))
    }
}

/// Parse multiple cards separated by whitespace or commas.
///
/// ```
/// use table_audit::cards::{parse_cards, Card, Rank, Suit};
///
/// let cards = parse_cards("黑桃A, 红心10 Kd").unwrap();
/// assert_eq!(cards[0], Card::new(Rank::Ace, Suit::Spades));
/// assert_eq!(cards[1], Card::new(Rank::Ten, Suit::Hearts));
/// assert_eq!(cards[2], Card::new(Rank::King, Suit::Diamonds));
/// ```
pub fn parse_cards(input: &str) -> Result<Vec<Card>, CardParseError> {
    input
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .map(Card::from_str)
        .collect()
}
