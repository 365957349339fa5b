use crate::cards::Rank;
use crate::hand::BullHand;

/// Pre-computed facts about a five-card hand.
/// Built once and shared by all pattern detectors.
#[derive(Debug, Clone)]
pub struct HandAnalysis {
    pub points: [u8; 5],
    pub point_sum: u8,
    /// Cards of each rank, indexed by rank order (A = 1 .. K = 13).
    pub rank_counts: [u8; 14],
    /// J/Q/K count.
    pub court_cards: u8,
    pub tens: u8,
}

impl HandAnalysis {
    pub fn new(hand: &BullHand) -> Self {
        let points = hand.points();
        let point_sum = points.iter().sum();

        let mut rank_counts = [0u8; 14];
        let mut court_cards = 0;
        let mut tens = 0;
        for card in hand.cards() {
            let rank = card.rank();
            rank_counts[rank.order() as usize] += 1;
            if rank.is_face() {
                court_cards += 1;
            } else if rank == Rank::Ten {
                tens += 1;
            }
        }

        Self { points, point_sum, rank_counts, court_cards, tens }
    }

    pub fn quad(&self) -> Option<Rank> {
        self.rank_counts
            .iter()
            .position(|&n| n == 4)
            .and_then(|order| Rank::from_order(order as u8))
    }
}
