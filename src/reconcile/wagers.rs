//! Shared machinery for the fixed-odds wager titles: stake collection, chip
//! and limit checks, and odds lookups. Each title only supplies how its
//! outcome code decodes and how a seat's stakes settle.

use super::{fits, Reconciler, RoundError, SeatSettlement, Settlements};
use crate::profile::{GameProfile, GameTitle, PositionId, Room};
use crate::record::{RoundRecord, SeatRecord};
use crate::report::{DiscrepancyKind, RoundAudit};
use std::collections::BTreeMap;
use tracing::trace;

/// One seat's stakes summed per bet position. Built by
/// [`WagerReconciler::collect_stakes`], which guarantees the absolute stakes
/// sum to a chip amount, so any subtotal fits.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeatStakes {
    pub by_position: BTreeMap<PositionId, i64>,
}

impl SeatStakes {
    pub fn total(&self) -> i64 {
        self.by_position.values().sum()
    }

    pub fn on(&self, position: PositionId) -> i64 {
        self.by_position.get(&position).copied().unwrap_or(0)
    }

    /// Sum of stakes on the given positions.
    pub fn on_any(&self, positions: impl IntoIterator<Item = PositionId>) -> i64 {
        positions.into_iter().map(|p| self.on(p)).sum()
    }

    pub fn from_pairs(pairs: impl IntoIterator<Item = (PositionId, i64)>) -> Self {
        let mut stakes = Self::default();
        for (pos, amount) in pairs {
            *stakes.by_position.entry(pos).or_insert(0) += amount;
        }
        stakes
    }
}

/// Title-specific rules plugged into [`WagerReconciler`].
pub trait WagerRules {
    type Outcome;

    /// Decode the outcome code, noting any disagreement between the recorded
    /// winning positions and the recorded draw.
    fn decode(&self, round: &RoundRecord, audit: &mut RoundAudit<'_>) -> Result<Self::Outcome, RoundError>;

    fn settle_seat(
        &self,
        ctx: &mut SeatContext<'_>,
        stakes: &SeatStakes,
        outcome: &Self::Outcome,
    ) -> Result<SeatSettlement, RoundError>;
}

/// Lookups available while settling one seat.
pub struct SeatContext<'a> {
    pub profile: &'a GameProfile,
    pub seat: PositionId,
    misses: Vec<PositionId>,
}

impl<'a> SeatContext<'a> {
    pub fn new(profile: &'a GameProfile, seat: PositionId) -> Self {
        Self { profile, seat, misses: Vec::new() }
    }

    /// Gross return (stake included) of every staked winning position.
    /// Positions without odds are skipped and reported afterwards.
    pub fn winnings(&mut self, stakes: &SeatStakes, winning: &[PositionId]) -> Result<i64, RoundError> {
        let mut total: i64 = 0;
        for &pos in winning {
            let stake = stakes.on(pos);
            if stake == 0 {
                continue;
            }
            match self.profile.odds(pos) {
                Some(odds) => {
                    let won = fits(odds.apply(stake), "winnings")?;
                    total = fits(total.checked_add(won), "winnings")?;
                }
                None => self.misses.push(pos),
            }
        }
        Ok(total)
    }

    fn take_misses(&mut self) -> Vec<PositionId> {
        std::mem::take(&mut self.misses)
    }
}

pub struct WagerReconciler<'a, R> {
    profile: &'a GameProfile,
    rules: R,
}

impl<'a, R: WagerRules> WagerReconciler<'a, R> {
    pub fn new(profile: &'a GameProfile, rules: R) -> Self {
        Self { profile, rules }
    }

    /// The round's room, or `None` after noting why it is unknown.
    fn resolve_room(&self, round: &RoundRecord, audit: &mut RoundAudit<'_>) -> Option<&'a Room> {
        let Some(server_id) = round.room().server_id else {
            audit.note(DiscrepancyKind::LookupMiss, None, "no ServerID; chip and limit checks skipped");
            return None;
        };
        let room = self.profile.room(server_id);
        if room.is_none() {
            audit.note(
                DiscrepancyKind::LookupMiss,
                None,
                format!("ServerID {server_id} is not a {} room; chip and limit checks skipped", self.profile.title),
            );
        }
        room
    }

    /// Sum the seat's bets per position, checking each bet against the
    /// room's chips and each total against the room's limits.
    pub fn collect_stakes(
        &self,
        seat: &SeatRecord,
        room: Option<&Room>,
        audit: &mut RoundAudit<'_>,
    ) -> Result<SeatStakes, RoundError> {
        let mut stakes = SeatStakes::default();
        let mut staked: i64 = 0;
        for action in seat.act.iter().filter(|a| a.ty == self.profile.bet_phase) {
            let Some(amount) = action.bet else {
                audit.note(
                    DiscrepancyKind::LookupMiss,
                    Some(seat.pos),
                    format!("bet on {} has no amount", self.profile.position_name(action.pos)),
                );
                continue;
            };
            if let Some(room) = room {
                if !room.composable(amount) {
                    audit.note(
                        DiscrepancyKind::ChipDenomination,
                        Some(seat.pos),
                        format!(
                            "bet {amount} on {} cannot be made from {} chips {:?}",
                            self.profile.position_name(action.pos),
                            room.name,
                            room.chips
                        ),
                    );
                }
            }
            staked = fits(amount.checked_abs().and_then(|a| staked.checked_add(a)), "seat stakes")?;
            *stakes.by_position.entry(action.pos).or_insert(0) += amount;
        }

        if let Some(room) = room {
            for (&pos, &total) in &stakes.by_position {
                match self.profile.limit(room.server_id, pos) {
                    Some(limit) if !limit.admits(total) => audit.note(
                        DiscrepancyKind::StakeLimit,
                        Some(seat.pos),
                        format!(
                            "{} total {total} outside {}..={}",
                            self.profile.position_name(pos),
                            limit.min,
                            limit.max
                        ),
                    ),
                    Some(_) => {}
                    None => audit.note(
                        DiscrepancyKind::LookupMiss,
                        Some(seat.pos),
                        format!("no limit for {} in {}", self.profile.position_name(pos), room.name),
                    ),
                }
            }
        }
        Ok(stakes)
    }
}

impl<R: WagerRules> Reconciler for WagerReconciler<'_, R> {
    fn title(&self) -> GameTitle {
        self.profile.title
    }

    fn settle(&self, round: &RoundRecord, audit: &mut RoundAudit<'_>) -> Result<Settlements, RoundError> {
        let big = round.big_data();
        if big.pub1.as_deref().map_or(true, str::is_empty) {
            return Err(RoundError::MissingField("pub1"));
        }
        if big.att.is_empty() {
            return Err(RoundError::NoSeats);
        }
        let outcome = self.rules.decode(round, audit)?;
        let room = self.resolve_room(round, audit);

        let mut settlements = Settlements::new();
        for seat in &big.att {
            let stakes = self.collect_stakes(seat, room, audit)?;
            let mut ctx = SeatContext::new(self.profile, seat.pos);
            let settlement = self.rules.settle_seat(&mut ctx, &stakes, &outcome)?;
            for pos in ctx.take_misses() {
                audit.note(
                    DiscrepancyKind::LookupMiss,
                    Some(seat.pos),
                    format!("no odds for winning position {pos}"),
                );
            }
            trace!(round = %round.game_no, seat = seat.pos, ?settlement, "seat settled");
            settlements.insert(seat.pos, settlement);
        }
        Ok(settlements)
    }
}

/// Note recorded winning positions the draw does not justify.
pub fn cross_check(
    audit: &mut RoundAudit<'_>,
    recorded: &[PositionId],
    derived: &[PositionId],
) {
    let unexplained: Vec<PositionId> = recorded.iter().copied().filter(|p| !derived.contains(p)).collect();
    if !unexplained.is_empty() {
        audit.note(
            DiscrepancyKind::Outcome,
            None,
            format!("winning positions {unexplained:?} not derivable from the draw (derived {derived:?})"),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::Catalog;
    use crate::record::Action;
    use crate::report::ReconciliationContext;

    fn seat(actions: &[(u8, u8, Option<i64>)]) -> SeatRecord {
        SeatRecord {
            pos: 1,
            act: actions.iter().map(|&(ty, pos, bet)| Action { ty, pos, bet }).collect(),
            ..SeatRecord::default()
        }
    }

    struct NoRules;
    impl WagerRules for NoRules {
        type Outcome = ();
        fn decode(&self, _: &RoundRecord, _: &mut RoundAudit<'_>) -> Result<(), RoundError> {
            Ok(())
        }
        fn settle_seat(&self, _: &mut SeatContext<'_>, s: &SeatStakes, _: &()) -> Result<SeatSettlement, RoundError> {
            Ok(SeatSettlement::wager(s.total(), 0, 0))
        }
    }

    #[test]
    fn stakes_sum_per_position_and_check_room() {
        let catalog = Catalog::builtin();
        let profile = catalog.profile(GameTitle::SicBo).unwrap();
        let rec = WagerReconciler::new(profile, NoRules);
        let room = profile.room(82001);
        let mut ctx = ReconciliationContext::new();
        let stakes = {
            let mut audit = RoundAudit::new(&mut ctx, "w1");
            rec.collect_stakes(
                &seat(&[
                    (3, 1, Some(5000)),
                    (3, 1, Some(5000)),
                    (3, 1, Some(1000)), // pushes 小 over 10000
                    (3, 6, Some(100)),  // not a chip, under the minimum
                    (2, 2, Some(200)),  // other phase
                    (3, 4, None),
                ]),
                room,
                &mut audit,
            )
            .unwrap()
        };
        assert_eq!(stakes.on(1), 11000);
        assert_eq!(stakes.on(6), 100);
        assert_eq!(stakes.on(2), 0);
        assert_eq!(stakes.total(), 11100);
        let kinds: Vec<DiscrepancyKind> = ctx.discrepancies().iter().map(|d| d.kind).collect();
        assert_eq!(
            kinds,
            vec![
                DiscrepancyKind::ChipDenomination,
                DiscrepancyKind::LookupMiss,
                DiscrepancyKind::StakeLimit,
                DiscrepancyKind::StakeLimit,
            ]
        );
    }

    #[test]
    fn winnings_skip_unknown_odds() {
        let catalog = Catalog::builtin();
        let profile = catalog.profile(GameTitle::DragonTiger).unwrap();
        let mut ctx = SeatContext::new(profile, 1);
        let stakes = SeatStakes::from_pairs([(1, 1000), (4, 1000), (40, 500)]);
        assert_eq!(ctx.winnings(&stakes, &[1, 4, 40, 9]), Ok(2000 + 3900));
        assert_eq!(ctx.take_misses(), vec![40]);

        // dragon pays 2x and still fits; 3.9x on a suit does not
        let stakes = SeatStakes::from_pairs([(1, i64::MAX / 2), (4, i64::MAX / 2)]);
        assert_eq!(ctx.winnings(&stakes, &[1]), Ok(i64::MAX - 1));
        assert_eq!(ctx.winnings(&stakes, &[4]), Err(RoundError::Overflow("winnings")));
    }

    #[test]
    fn seat_stakes_must_fit_a_chip_amount() {
        let catalog = Catalog::builtin();
        let profile = catalog.profile(GameTitle::SicBo).unwrap();
        let rec = WagerReconciler::new(profile, NoRules);
        let mut ctx = ReconciliationContext::new();
        let mut audit = RoundAudit::new(&mut ctx, "w2");
        let huge = seat(&[(3, 1, Some(i64::MAX - 10)), (3, 2, Some(-20))]);
        assert_eq!(rec.collect_stakes(&huge, None, &mut audit), Err(RoundError::Overflow("seat stakes")));
        let min = seat(&[(3, 1, Some(i64::MIN))]);
        assert_eq!(rec.collect_stakes(&min, None, &mut audit), Err(RoundError::Overflow("seat stakes")));
    }

    #[test]
    fn cross_check_flags_only_unexplained() {
        let mut ctx = ReconciliationContext::new();
        let mut audit = RoundAudit::new(&mut ctx, "c");
        cross_check(&mut audit, &[1, 3], &[1, 3, 5]);
        assert_eq!(audit.count(), 0);
        cross_check(&mut audit, &[1, 2], &[1, 3]);
        assert_eq!(audit.count(), 1);
    }
}
