use super::wagers::{SeatContext, SeatStakes, WagerRules};
use super::{fits, sum_fits, RoundError, SeatSettlement};
use crate::outcome::SuitsOutcome;
use crate::record::RoundRecord;
use crate::report::RoundAudit;

/// Four suits: positions 1..=4 the suits, 5 big, 6 small, 7 odd, 8 even,
/// 9 the seven. When the seven comes up the big/small/odd/even stakes are
/// returned and do not count toward the valid bet.
pub struct FourSuits;

const SEVEN: u8 = 9;
const KEPT_ON_SEVEN: [u8; 5] = [1, 2, 3, 4, SEVEN];

impl WagerRules for FourSuits {
    type Outcome = SuitsOutcome;

    fn decode(&self, round: &RoundRecord, _audit: &mut RoundAudit<'_>) -> Result<SuitsOutcome, RoundError> {
        let code = round.big_data().pub1.as_deref().unwrap_or_default();
        Ok(SuitsOutcome::decode(code)?)
    }

    fn settle_seat(
        &self,
        ctx: &mut SeatContext<'_>,
        stakes: &SeatStakes,
        outcome: &SuitsOutcome,
    ) -> Result<SeatSettlement, RoundError> {
        let valid = if outcome.positions.contains(&SEVEN) {
            stakes.on_any(KEPT_ON_SEVEN)
        } else {
            stakes.total()
        };
        // winning stakes only count where odds are known
        let winning_stake = sum_fits(
            outcome
                .positions
                .iter()
                .filter(|&&p| ctx.profile.odds(p).is_some())
                .map(|&p| stakes.on(p)),
            "winning stakes",
        )?;
        let gross = ctx.winnings(stakes, &outcome.positions)?;
        let (profit, deduct) = ctx.profile.rake.settle(fits(gross.checked_sub(winning_stake), "profit")?);
        let lost = fits(valid.checked_sub(winning_stake), "payout")?;
        Ok(SeatSettlement::wager(valid, fits(profit.checked_sub(lost), "payout")?, deduct))
    }
}
