use super::wagers::{SeatContext, SeatStakes, WagerRules};
use super::{fits, RoundError, SeatSettlement};
use crate::outcome::SharkOutcome;
use crate::profile::PositionId;
use crate::record::RoundRecord;
use crate::report::RoundAudit;
use tracing::trace;

/// Shark: one animal comes up; birds (1..=4) also pay 飞禽 (11) and beasts
/// (5..=8) also pay 走兽 (12). No rake.
pub struct Shark;

const BIRDS: PositionId = 11;
const BEASTS: PositionId = 12;

pub fn winning_positions(animal: PositionId) -> Vec<PositionId> {
    match animal {
        1..=4 => vec![animal, BIRDS],
        5..=8 => vec![animal, BEASTS],
        _ => vec![animal],
    }
}

impl WagerRules for Shark {
    /// Winning positions.
    type Outcome = Vec<PositionId>;

    fn decode(&self, round: &RoundRecord, _audit: &mut RoundAudit<'_>) -> Result<Vec<PositionId>, RoundError> {
        let code = round.big_data().pub1.as_deref().unwrap_or_default();
        let outcome = SharkOutcome::decode(code)?;
        trace!(round = %round.game_no, position = outcome.position, rate = outcome.rate, "shark draw");
        Ok(winning_positions(outcome.position))
    }

    fn settle_seat(
        &self,
        ctx: &mut SeatContext<'_>,
        stakes: &SeatStakes,
        winning: &Vec<PositionId>,
    ) -> Result<SeatSettlement, RoundError> {
        // opposing birds/beasts stakes hedge each other
        let hedged = (stakes.on(BIRDS) - stakes.on(BEASTS)).abs();
        let others: i64 = stakes
            .by_position
            .iter()
            .filter(|(&p, _)| p != BIRDS && p != BEASTS)
            .map(|(_, &v)| v)
            .sum();
        let total = stakes.total();
        let won = ctx.winnings(stakes, winning)?;
        Ok(SeatSettlement::wager(hedged + others, fits(won.checked_sub(total), "payout")?, 0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{Catalog, GameTitle};

    #[test]
    fn animals_add_their_group() {
        assert_eq!(winning_positions(3), vec![3, 11]);
        assert_eq!(winning_positions(8), vec![8, 12]);
        assert_eq!(winning_positions(10), vec![10]);
    }

    #[test]
    fn hedged_group_bets_are_netted() {
        let catalog = Catalog::builtin();
        let profile = catalog.profile(GameTitle::Shark).unwrap();
        let mut ctx = SeatContext::new(profile, 1);
        let stakes = SeatStakes::from_pairs([(11, 1000), (12, 400), (4, 200)]);
        let s = Shark.settle_seat(&mut ctx, &stakes, &winning_positions(4)).unwrap();
        // 鹰 pays 12x, 飞禽 pays 2x
        assert_eq!(s, SeatSettlement::wager(600 + 200, 2400 + 2000 - 1600, 0));
    }
}
