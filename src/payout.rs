//! Settlement arithmetic shared by every title: hand-type payouts, chip caps,
//! rake and fixed odds. All amounts are integer chip units.

use crate::evaluator::HandType;
use serde::{Deserialize, Serialize};

/// Basis points in one whole.
pub const BPS_SCALE: i64 = 10_000;

/// Uncapped bull-bull settlement for one player; `None` on overflow.
///
/// ```
/// use table_audit::evaluator::HandType;
/// use table_audit::payout::nominal_payout;
///
/// assert_eq!(nominal_payout(100, HandType::BullBull, 2, 3), Some(1800));
/// assert_eq!(nominal_payout(i64::MAX / 2, HandType::BullBull, 2, 1), None);
/// ```
pub fn nominal_payout(stake: i64, hand_type: HandType, banker_mult: i64, player_mult: i64) -> Option<i64> {
    stake
        .checked_mul(hand_type.multiplier())?
        .checked_mul(banker_mult)?
        .checked_mul(player_mult)
}

/// Nobody settles more than the chips they brought to the table.
pub fn cap(nominal: i64, chips: i64) -> i64 {
    nominal.min(chips)
}

/// House commission on winnings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RakeRule {
    pub applies: bool,
    pub rate_bps: i64,
}

impl RakeRule {
    pub const NONE: RakeRule = RakeRule { applies: false, rate_bps: 0 };

    pub const fn percent(pct: i64) -> Self {
        Self { applies: true, rate_bps: pct * 100 }
    }

    /// Split a gross win into `(payout, deduct)`. Losses and zero are untouched.
    pub fn settle(&self, win: i64) -> (i64, i64) {
        if !self.applies || win <= 0 {
            return (win, 0);
        }
        let deduct = i128::from(win) * i128::from(self.rate_bps) / i128::from(BPS_SCALE);
        // the deduct never exceeds the win it is taken from
        let deduct = i64::try_from(deduct).map_or(win, |d| d.clamp(0, win));
        (win - deduct, deduct)
    }
}

impl Default for RakeRule {
    fn default() -> Self {
        Self::NONE
    }
}

/// Fixed odds in hundredths (3.9 is `Odds(390)`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Odds(pub i64);

impl Odds {
    pub const fn whole(n: i64) -> Self {
        Self(n * 100)
    }

    /// Gross return on a winning stake, stake included, truncated to whole
    /// chips. `None` when the return does not fit a chip amount.
    pub fn apply(self, stake: i64) -> Option<i64> {
        i64::try_from(i128::from(stake) * i128::from(self.0) / 100).ok()
    }
}

impl std::fmt::Display for Odds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}
