use crate::cards::{parse_cards, Card, CardParseError};
use std::collections::HashSet;
use std::str::FromStr;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum HandError {
    #[error("expected exactly five cards, got {0}")]
    CardCount(usize),
    #[error("card decode error: {0}")]
    Card(#[from] CardParseError),
}

/// Five cards dealt to one bull-bull seat, in deal order.
///
/// Duplicate detection is a round-level concern (see [`CardLedger`]), so a
/// hand only checks its size.
///
/// ```
/// use table_audit::hand::BullHand;
///
/// let hand = BullHand::from_codes(&[1, 2, 3, 4, 5]).unwrap();
/// assert_eq!(hand.to_string(), "黑桃2 黑桃3 黑桃4 黑桃5 黑桃6");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BullHand([Card; 5]);

impl BullHand {
    pub fn new(cards: [Card; 5]) -> Self {
        Self(cards)
    }

    pub fn try_new(cards: &[Card]) -> Result<Self, HandError> {
        let arr: [Card; 5] = cards.try_into().map_err(|_| HandError::CardCount(cards.len()))?;
        Ok(Self(arr))
    }

    /// Decode a seat's raw deal codes.
    pub fn from_codes(codes: &[u8]) -> Result<Self, HandError> {
        if codes.len() != 5 {
            return Err(HandError::CardCount(codes.len()));
        }
        let cards = codes.iter().map(|&c| Card::from_code(c)).collect::<Result<Vec<_>, _>>()?;
        Self::try_new(&cards)
    }

    pub fn cards(&self) -> &[Card; 5] {
        &self.0
    }

    pub fn points(&self) -> [u8; 5] {
        self.0.map(Card::points)
    }

    /// Highest single card by (rank order, suit strength).
    pub fn high_card(&self) -> Card {
        let mut best = self.0[0];
        for &c in &self.0[1..] {
            if c.strength() > best.strength() {
                best = c;
            }
        }
        best
    }
}

impl std::fmt::Display for BullHand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, c) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

impl FromStr for BullHand {
    type Err = HandError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let cards = parse_cards(s)?;
        Self::try_new(&cards)
    }
}

/// Cards already seen in the current round.
#[derive(Debug, Default)]
pub struct CardLedger {
    seen: HashSet<Card>,
}

impl CardLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a card; returns `false` when it was already dealt this round.
    pub fn record(&mut self, card: Card) -> bool {
        self.seen.insert(card)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{Rank, Suit};

    #[test]
    fn wrong_card_count_is_rejected() {
        assert_eq!(BullHand::from_codes(&[1, 2, 3]), Err(HandError::CardCount(3)));
        let cards = [Card::new(Rank::Ace, Suit::Spades); 6];
        assert_eq!(BullHand::try_new(&cards), Err(HandError::CardCount(6)));
    }

    #[test]
    fn bad_code_surfaces_card_error() {
        assert!(matches!(
            BullHand::from_codes(&[1, 2, 3, 4, 99]),
            Err(HandError::Card(CardParseError::Code(99)))
        ));
    }

    #[test]
    fn high_card_uses_ace_low_and_suit_tiebreak() {
        let hand: BullHand = "黑桃A 红心K 黑桃K 梅花2 方片3".parse().unwrap();
        assert_eq!(hand.high_card(), Card::new(Rank::King, Suit::Spades));
    }

    #[test]
    fn ledger_flags_repeats() {
        let mut ledger = CardLedger::new();
        let c = Card::new(Rank::Five, Suit::Clubs);
        assert!(ledger.record(c));
        assert!(!ledger.record(c));
        assert_eq!(ledger.len(), 1);
    }
}
