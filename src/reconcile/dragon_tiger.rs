//! Dragon-tiger: one card each side. Besides the side bets there are suit
//! bets for each side and two bets on whether the side with the smaller
//! table total wins.

use super::wagers::{cross_check, SeatContext, SeatStakes, WagerRules};
use super::{fits, sum_fits, RoundError, SeatSettlement};
use crate::cards::Suit;
use crate::outcome::{DragonTigerOutcome, DrawnCard};
use crate::profile::PositionId;
use crate::record::{RoundRecord, TableInfo};
use crate::report::RoundAudit;
use core::cmp::Ordering;

pub struct DragonTiger;

const DRAGON: PositionId = 1;
const TIGER: PositionId = 2;
const TIE: PositionId = 3;
const BANKER_WIN: PositionId = 12;
const BANKER_LOSE: PositionId = 13;

/// A decoded round plus whether banker bets are returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Round {
    pub positions: Vec<PositionId>,
    /// Ties and rounds with equal table totals return 壓庄 stakes.
    pub refund: bool,
}

fn suit_offset(suit: Suit) -> PositionId {
    match suit {
        Suit::Spades => 0,
        Suit::Hearts => 1,
        Suit::Clubs => 2,
        Suit::Diamonds => 3,
    }
}

/// Positions the two cards and the table totals pay.
pub fn derive_positions(dragon: DrawnCard, tiger: DrawnCard, info: TableInfo) -> Vec<PositionId> {
    let mut positions = Vec::with_capacity(4);
    let winner = dragon.key().cmp(&tiger.key());
    positions.push(match winner {
        Ordering::Greater => DRAGON,
        Ordering::Less => TIGER,
        Ordering::Equal => TIE,
    });
    positions.push(4 + suit_offset(dragon.suit));
    positions.push(8 + suit_offset(tiger.suit));

    let (winning_total, losing_total) = match winner {
        Ordering::Greater => (info.long, info.hu),
        Ordering::Less => (info.hu, info.long),
        Ordering::Equal => return positions,
    };
    match winning_total.cmp(&losing_total) {
        Ordering::Less => positions.push(BANKER_WIN),
        Ordering::Greater => positions.push(BANKER_LOSE),
        Ordering::Equal => {}
    }
    positions
}

impl WagerRules for DragonTiger {
    type Outcome = Round;

    fn decode(&self, round: &RoundRecord, audit: &mut RoundAudit<'_>) -> Result<Round, RoundError> {
        let big = round.big_data();
        let code = big.pub1.as_deref().unwrap_or_default();
        let outcome = DragonTigerOutcome::decode(code)?;
        cross_check(audit, &outcome.positions, &derive_positions(outcome.dragon, outcome.tiger, big.info));
        let refund = outcome.dragon.key() == outcome.tiger.key() || big.info.long == big.info.hu;
        Ok(Round { positions: outcome.positions, refund })
    }

    fn settle_seat(
        &self,
        ctx: &mut SeatContext<'_>,
        stakes: &SeatStakes,
        round: &Round,
    ) -> Result<SeatSettlement, RoundError> {
        let total = stakes.total();
        let deducted = sum_fits(
            ctx.profile
                .deductions
                .iter()
                .filter(|rule| rule.fires(&stakes.by_position, round.refund))
                .map(|rule| rule.deducted(&stakes.by_position)),
            "deductions",
        )?;
        let refunds = if round.refund { stakes.on_any([BANKER_WIN, BANKER_LOSE]) } else { 0 };
        let won = ctx.winnings(stakes, &round.positions)?;
        let payout = won.checked_add(refunds).and_then(|v| v.checked_sub(total));
        Ok(SeatSettlement::wager(
            fits(total.checked_sub(deducted), "valid bet")?,
            fits(payout, "payout")?,
            0,
        ))
    }
}
