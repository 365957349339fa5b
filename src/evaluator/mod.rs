pub(crate) mod combinations;
pub(crate) mod detector;
pub(crate) mod hand_analysis;

use crate::cards::Card;
use crate::hand::BullHand;
use core::cmp::Ordering;
use std::fmt;

/// Bull-bull hand types from weakest to strongest. The discriminant is the
/// hand-type code the game server records (`cardType`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum HandType {
    NoBull = 0,
    Bull1 = 1,
    Bull2 = 2,
    Bull3 = 3,
    Bull4 = 4,
    Bull5 = 5,
    Bull6 = 6,
    Bull7 = 7,
    Bull8 = 8,
    Bull9 = 9,
    BullBull = 10,
    FourFlower = 11,
    FiveFlower = 12,
    FourBomb = 13,
    FiveSmall = 14,
}

impl HandType {
    pub const ALL: [HandType; 15] = [
        HandType::NoBull,
        HandType::Bull1,
        HandType::Bull2,
        HandType::Bull3,
        HandType::Bull4,
        HandType::Bull5,
        HandType::Bull6,
        HandType::Bull7,
        HandType::Bull8,
        HandType::Bull9,
        HandType::BullBull,
        HandType::FourFlower,
        HandType::FiveFlower,
        HandType::FourBomb,
        HandType::FiveSmall,
    ];

    pub const fn rank(self) -> u8 {
        self as u8
    }

    pub fn from_rank(rank: u8) -> Option<HandType> {
        Self::ALL.get(rank as usize).copied()
    }

    /// Hand type for a bull number: 0 is 牛牛, 1..=9 are 牛一..牛九.
    pub fn from_bull_number(n: u8) -> HandType {
        match n % 10 {
            0 => HandType::BullBull,
            k => Self::ALL[k as usize],
        }
    }

    /// Settlement multiplier applied on top of the stake.
    pub const fn multiplier(self) -> i64 {
        match self {
            HandType::FiveSmall
            | HandType::FourBomb
            | HandType::FiveFlower
            | HandType::FourFlower => 4,
            HandType::BullBull => 3,
            HandType::Bull7 | HandType::Bull8 | HandType::Bull9 => 2,
            _ => 1,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            HandType::NoBull => "没牛",
            HandType::Bull1 => "牛一",
            HandType::Bull2 => "牛二",
            HandType::Bull3 => "牛三",
            HandType::Bull4 => "牛四",
            HandType::Bull5 => "牛五",
            HandType::Bull6 => "牛六",
            HandType::Bull7 => "牛七",
            HandType::Bull8 => "牛八",
            HandType::Bull9 => "牛九",
            HandType::BullBull => "牛牛",
            HandType::FourFlower => "四花牛",
            HandType::FiveFlower => "五花牛",
            HandType::FourBomb => "四炸",
            HandType::FiveSmall => "五小牛",
        }
    }
}

impl fmt::Display for HandType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Evaluation result. Ordering is hand type first, then the high card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub struct Evaluation {
    pub hand_type: HandType,
    pub high_card: Card,
}

impl Ord for Evaluation {
    fn cmp(&self, other: &Self) -> Ordering {
        self.hand_type
            .cmp(&other.hand_type)
            .then_with(|| self.high_card.strength().cmp(&other.high_card.strength()))
    }
}

impl PartialOrd for Evaluation {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Classify a five-card hand.
///
/// ```
/// use table_audit::evaluator::{evaluate, HandType};
/// use table_audit::hand::BullHand;
///
/// let hand: BullHand = "黑桃10 红心J 梅花Q 方片K 黑桃A".parse().unwrap();
/// assert_eq!(evaluate(&hand), HandType::Bull1);
/// ```
pub fn evaluate(hand: &BullHand) -> HandType {
    use detector::DETECTORS;
    use hand_analysis::HandAnalysis;

    let analysis = HandAnalysis::new(hand);

    // Special patterns first, in payout priority order
    for detector in DETECTORS.iter() {
        if detector.detect(&analysis) {
            return detector.hand_type();
        }
    }

    match combinations::bull_number(&analysis.points) {
        Some(n) => HandType::from_bull_number(n),
        None => HandType::NoBull,
    }
}

/// Full evaluation including the tie-break card.
pub fn evaluate_full(hand: &BullHand) -> Evaluation {
    Evaluation { hand_type: evaluate(hand), high_card: hand.high_card() }
}

/// Order two hands: hand type, then highest card (rank with A low, then suit).
///
/// ```
/// use table_audit::evaluator::compare;
/// use table_audit::hand::BullHand;
/// use std::cmp::Ordering;
///
/// let a: BullHand = "黑桃10 红心J 梅花Q 方片K 黑桃5".parse().unwrap();
/// let b: BullHand = "黑桃2 红心3 梅花A 方片4 红心A".parse().unwrap();
/// assert_eq!(compare(&a, &b), Ordering::Greater);
/// ```
pub fn compare(a: &BullHand, b: &BullHand) -> Ordering {
    evaluate_full(a).cmp(&evaluate_full(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hand(s: &str) -> BullHand {
        s.parse().expect("valid hand")
    }

    #[test]
    fn ranks_and_multipliers_table() {
        assert_eq!(HandType::FiveSmall.rank(), 14);
        assert_eq!(HandType::NoBull.rank(), 0);
        assert_eq!(HandType::from_rank(10), Some(HandType::BullBull));
        assert_eq!(HandType::from_rank(15), None);
        assert_eq!(HandType::Bull6.multiplier(), 1);
        assert_eq!(HandType::Bull7.multiplier(), 2);
        assert_eq!(HandType::BullBull.multiplier(), 3);
        assert_eq!(HandType::FourFlower.multiplier(), 4);
    }

    #[test]
    fn no_bull_when_no_triple_sums_to_ten() {
        assert_eq!(evaluate(&hand("黑桃2 黑桃3 红心A 梅花4 方片A")), HandType::NoBull);
    }

    #[test]
    fn five_small_beats_four_of_a_kind() {
        // four aces plus a two: both patterns hold, five-small is checked first
        assert_eq!(evaluate(&hand("黑桃A 红心A 梅花A 方片A 黑桃2")), HandType::FiveSmall);
        assert_eq!(evaluate(&hand("黑桃9 红心9 梅花9 方片9 黑桃2")), HandType::FourBomb);
    }

    #[test]
    fn equal_types_fall_back_to_high_card() {
        // both 牛牛; K♠ beats K♥
        let a = hand("黑桃K 红心5 梅花5 方片10 梅花10");
        let b = hand("红心K 黑桃5 方片5 红心10 黑桃10");
        assert_eq!(evaluate(&a), HandType::BullBull);
        assert_eq!(evaluate(&b), HandType::BullBull);
        assert_eq!(compare(&a, &b), Ordering::Greater);
        assert_eq!(compare(&b, &a), Ordering::Less);
        assert_eq!(compare(&a, &a), Ordering::Equal);
    }
}
