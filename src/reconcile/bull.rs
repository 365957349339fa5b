//! Bull-bull: every player settles head-to-head against the banker, and the
//! banker's aggregate exposure is capped at the chips they carried.

use super::{fits, sum_fits, Reconciler, RoundError, SeatSettlement, Settlements};
use crate::evaluator::{evaluate_full, Evaluation};
use crate::hand::{BullHand, CardLedger};
use crate::payout::{cap, nominal_payout, RakeRule};
use crate::profile::{GameProfile, GameTitle};
use crate::proration::{next_seat, prorate, Seat};
use crate::record::{RoundRecord, SeatRecord};
use crate::report::{DiscrepancyKind, RoundAudit};
use core::cmp::Ordering;
use std::collections::BTreeMap;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BullOptions {
    pub seat_count: Seat,
    /// Overrides the profile's rake when set.
    pub rake: Option<RakeRule>,
}

impl Default for BullOptions {
    fn default() -> Self {
        Self { seat_count: 5, rake: None }
    }
}

pub struct BullReconciler<'a> {
    profile: &'a GameProfile,
    seat_count: Seat,
    rake: RakeRule,
    bid_phase: u8,
}

impl<'a> BullReconciler<'a> {
    pub fn new(profile: &'a GameProfile, options: BullOptions) -> Self {
        Self {
            profile,
            seat_count: options.seat_count.max(2),
            rake: options.rake.unwrap_or(profile.rake),
            bid_phase: profile.bid_phase.unwrap_or(2),
        }
    }

    /// The seat that bid for the bank and placed no player bet.
    fn resolve_banker(
        &self,
        bids: &BTreeMap<Seat, i64>,
        bets: &BTreeMap<Seat, i64>,
    ) -> Result<Seat, RoundError> {
        let candidates: Vec<Seat> = (1..=self.seat_count)
            .filter(|s| bids.contains_key(s) && !bets.contains_key(s))
            .collect();
        match candidates.as_slice() {
            [banker] => Ok(*banker),
            _ => Err(RoundError::AmbiguousBanker(candidates)),
        }
    }
}

/// One player's head-to-head result before the banker cap.
#[derive(Debug, Clone, Copy)]
struct Duel {
    valid: i64,
    /// Positive when the player wins, negative when the banker wins.
    gross: i64,
}

fn chips(seat: &SeatRecord) -> Result<i64, RoundError> {
    seat.chip.ok_or(RoundError::MissingSeatField { seat: seat.pos, field: "chip" })
}

impl Reconciler for BullReconciler<'_> {
    fn title(&self) -> GameTitle {
        GameTitle::BullBull
    }

    fn settle(&self, round: &RoundRecord, audit: &mut RoundAudit<'_>) -> Result<Settlements, RoundError> {
        let big = round.big_data();
        let blink = big.blink.ok_or(RoundError::MissingField("blink"))?;
        if big.att.is_empty() {
            return Err(RoundError::NoSeats);
        }

        let mut bids = BTreeMap::new();
        let mut bets = BTreeMap::new();
        for action in &big.act {
            let book = if action.ty == self.bid_phase {
                &mut bids
            } else if action.ty == self.profile.bet_phase {
                &mut bets
            } else {
                continue;
            };
            book.insert(action.pos, action.bet.unwrap_or(0));
        }
        let banker = self.resolve_banker(&bids, &bets)?;
        let banker_mult = match bids.get(&banker).copied().unwrap_or(0) {
            0 => 1,
            m => m,
        };
        debug!(round = %round.game_no, banker, banker_mult, "banker resolved");

        let mut ledger = CardLedger::new();
        let mut evals: BTreeMap<Seat, Evaluation> = BTreeMap::new();
        for seat in &big.att {
            let hand = BullHand::from_codes(&seat.card)
                .map_err(|source| RoundError::Hand { seat: seat.pos, source })?;
            for &card in hand.cards() {
                if !ledger.record(card) {
                    audit.note(
                        DiscrepancyKind::DuplicateCard,
                        Some(seat.pos),
                        format!("{card} dealt twice"),
                    );
                }
            }
            evals.insert(seat.pos, evaluate_full(&hand));
        }

        let banker_record = round.seat(banker).ok_or(RoundError::MissingBanker(banker))?;
        let banker_chips = chips(banker_record)?;
        let banker_eval = evals[&banker];

        let mut duels: BTreeMap<Seat, Duel> = BTreeMap::new();
        for seat in big.att.iter().filter(|s| s.pos != banker) {
            let player_mult = *bets
                .get(&seat.pos)
                .ok_or(RoundError::MissingSeatField { seat: seat.pos, field: "bet multiplier" })?;
            let player_chips = chips(seat)?;
            let eval = evals[&seat.pos];
            let duel = match eval.cmp(&banker_eval) {
                Ordering::Greater => {
                    let nominal = nominal_payout(blink, eval.hand_type, banker_mult, player_mult);
                    let v = cap(fits(nominal, "nominal payout")?, player_chips);
                    Duel { valid: v, gross: v }
                }
                Ordering::Less => {
                    let nominal = nominal_payout(blink, banker_eval.hand_type, banker_mult, player_mult);
                    let v = cap(fits(nominal, "nominal payout")?, player_chips);
                    Duel { valid: v, gross: fits(v.checked_neg(), "nominal payout")? }
                }
                Ordering::Equal => return Err(RoundError::Tie(seat.pos)),
            };
            duels.insert(seat.pos, duel);
        }

        let mut gross: BTreeMap<Seat, i64> = duels.iter().map(|(&s, d)| (s, d.gross)).collect();
        let winners_total = sum_fits(gross.values().copied().filter(|&g| g > 0), "winnings")?;
        let losers_total = fits(
            gross.values().filter(|&&g| g < 0).try_fold(0i64, |acc, &g| acc.checked_add(g.checked_neg()?)),
            "losses",
        )?;
        // both totals are non-negative
        let mut banker_net = losers_total - winners_total;
        let banker_floor = fits(banker_chips.checked_neg(), "banker chips")?;
        let start = next_seat(banker, self.seat_count);

        if banker_net > banker_chips {
            // banker can only take its own chips plus what it pays out
            let losers: BTreeMap<Seat, i64> = gross.iter().filter(|(_, &g)| g < 0).map(|(&s, &g)| (s, g)).collect();
            let pool = fits(banker_chips.checked_add(winners_total).and_then(i64::checked_neg), "banker pool")?;
            debug!(round = %round.game_no, pool, "prorating banker win");
            gross.extend(prorate(&losers, pool, start, self.seat_count)?);
            banker_net = banker_chips;
        } else if banker_net < banker_floor {
            let winners: BTreeMap<Seat, i64> = gross.iter().filter(|(_, &g)| g > 0).map(|(&s, &g)| (s, g)).collect();
            let pool = fits(banker_chips.checked_add(losers_total), "banker pool")?;
            debug!(round = %round.game_no, pool, "prorating banker loss");
            gross.extend(prorate(&winners, pool, start, self.seat_count)?);
            banker_net = banker_floor;
        }

        let mut settlements = Settlements::new();
        for (&seat, duel) in &duels {
            let (payout, deduct) = self.rake.settle(gross[&seat]);
            settlements.insert(
                seat,
                SeatSettlement {
                    valid_bet: duel.valid,
                    payout,
                    deduct,
                    hand_type: Some(evals[&seat].hand_type),
                },
            );
        }
        let banker_valid = sum_fits(duels.values().map(|d| d.valid), "valid bets")?.min(banker_chips);
        let (payout, deduct) = self.rake.settle(banker_net);
        settlements.insert(
            banker,
            SeatSettlement {
                valid_bet: banker_valid,
                payout,
                deduct,
                hand_type: Some(banker_eval.hand_type),
            },
        );
        Ok(settlements)
    }
}
