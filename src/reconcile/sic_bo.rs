use super::wagers::{cross_check, SeatContext, SeatStakes, WagerRules};
use super::{fits, RoundError, SeatSettlement};
use crate::outcome::SicBoOutcome;
use crate::profile::PositionId;
use crate::record::RoundRecord;
use crate::report::RoundAudit;

/// Sic bo: three dice, no rake. Positions 1 small, 2 big, 3 odd, 4 even,
/// 5 any triple, 6..=11 a specific triple, 12..=25 totals 4..=17.
pub struct SicBo;

/// Every position the dice pay.
pub fn derive_positions(dice: [u8; 3]) -> Vec<PositionId> {
    let total: u8 = dice.iter().sum();
    let mut positions = Vec::new();
    if (4..=10).contains(&total) {
        positions.push(1);
    }
    if (11..=17).contains(&total) {
        positions.push(2);
    }
    positions.push(if total % 2 == 1 { 3 } else { 4 });
    if dice[0] == dice[1] && dice[1] == dice[2] {
        positions.push(5);
        positions.push(5 + dice[0]);
    }
    if (4..=17).contains(&total) {
        positions.push(total + 8);
    }
    positions
}

impl WagerRules for SicBo {
    type Outcome = SicBoOutcome;

    fn decode(&self, round: &RoundRecord, audit: &mut RoundAudit<'_>) -> Result<SicBoOutcome, RoundError> {
        let code = round.big_data().pub1.as_deref().unwrap_or_default();
        let outcome = SicBoOutcome::decode(code)?;
        cross_check(audit, &outcome.positions, &derive_positions(outcome.dice));
        Ok(outcome)
    }

    fn settle_seat(
        &self,
        ctx: &mut SeatContext<'_>,
        stakes: &SeatStakes,
        outcome: &SicBoOutcome,
    ) -> Result<SeatSettlement, RoundError> {
        let total = stakes.total();
        let won = ctx.winnings(stakes, &outcome.positions)?;
        Ok(SeatSettlement::wager(total, fits(won.checked_sub(total), "payout")?, 0))
    }
}
