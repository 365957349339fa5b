use serde_json::{json, Value};
use table_audit::config::AuditConfig;
use table_audit::driver::{BatchDriver, GameSelection};
use table_audit::profile::{Catalog, GameTitle};
use table_audit::report::{AuditReport, DiscrepancyKind, Field};

fn seat(pos: u8, phase: u8, bets: &[(u8, i64)], valid: i64, changes: i64) -> Value {
    let act: Vec<Value> = bets.iter().map(|&(p, bet)| json!({"ty": phase, "pos": p, "bet": bet})).collect();
    json!({"pos": pos, "validBet": valid, "changes": changes, "act": act})
}

fn round(game_no: &str, server: u32, pub1: &str, seats: Vec<Value>) -> Value {
    json!({
        "gameNo": game_no,
        "log": {"data": {
            "roomData": {"ServerID": server},
            "big_data": {"pub1": pub1, "att": seats},
        }},
    })
}

fn audit_with(selection: GameSelection, rounds: &[Value]) -> AuditReport {
    let catalog = Catalog::builtin();
    let driver = BatchDriver::new(&catalog, selection, &AuditConfig::default()).unwrap();
    driver.run(rounds)
}

fn audit(rounds: &[Value]) -> AuditReport {
    audit_with(GameSelection::Auto, rounds)
}

fn kinds(report: &AuditReport) -> Vec<DiscrepancyKind> {
    report.discrepancies.iter().map(|d| d.kind).collect()
}

#[test]
fn sic_bo_round_is_clean() {
    // 4 2 4: small, even, total 10. 小 pays 2x, 10點 pays 6x, 大 loses.
    let r = round(
        "sb-1",
        82001,
        "424010418",
        vec![
            seat(1, 3, &[(1, 1000), (18, 200), (2, 500)], 1700, 2000 + 1200 - 1700),
            seat(2, 3, &[], 0, 0),
        ],
    );
    let report = audit(&[r]);
    assert!(report.is_clean(), "{report}");
}

#[test]
fn sic_bo_positions_must_follow_from_the_dice() {
    // 大 cannot win on a total of 10; the seat is still settled as recorded
    let r = round(
        "sb-2",
        82001,
        "42401020418",
        vec![seat(1, 3, &[(1, 1000), (18, 200), (2, 500)], 1700, 2000 + 1200 + 1000 - 1700)],
    );
    let report = audit(&[r]);
    assert_eq!(kinds(&report), vec![DiscrepancyKind::Outcome]);
    assert_eq!(report.rounds_failed, 0);
}

#[test]
fn sic_bo_mismatch_reports_both_values() {
    let r = round("sb-3", 82001, "424010418", vec![seat(1, 3, &[(1, 1000)], 1000, 900)]);
    let report = audit(&[r]);
    assert_eq!(report.discrepancies.len(), 1);
    let d = &report.discrepancies[0];
    assert_eq!(d.field, Some(Field::Payout));
    assert_eq!((d.computed, d.recorded), (Some(1000), Some(900)));
}

#[test]
fn four_suits_seven_refunds_even_money_bets() {
    // 7 pays 13x: 2400 profit raked 120; 大 refunded, 黑 lost
    let r = round(
        "fs-1",
        86601,
        "0709",
        vec![seat(1, 3, &[(1, 1000), (5, 1000), (9, 200)], 1200, 2280 - 1000)],
    );
    let report = audit(&[r]);
    assert!(report.is_clean(), "{report}");
}

#[test]
fn dragon_tiger_hedges_are_not_valid_bets() {
    let mut r = round(
        "dt-1",
        9001,
        // ♠K against ♥K: dragon, 黑桃龍, 紅心虎, and dragon had the smaller table
        "3d2d01040912",
        vec![
            seat(1, 4, &[(1, 1000), (12, 500)], 1500, 2000 + 980 - 1500),
            seat(2, 4, &[(1, 1000), (2, 1000)], 0, 0),
        ],
    );
    r["log"]["data"]["big_data"]["info"] = json!({"long": 5000, "hu": 8000});
    let report = audit(&[r]);
    assert!(report.is_clean(), "{report}");
}

#[test]
fn dragon_tiger_outcome_cross_check() {
    let mut r = round("dt-2", 9001, "3d2d0204", vec![seat(1, 4, &[(4, 200)], 200, 780 - 200)]);
    r["log"]["data"]["big_data"]["info"] = json!({"long": 5000, "hu": 5000});
    let report = audit(&[r]);
    assert_eq!(kinds(&report), vec![DiscrepancyKind::Outcome]);
}

#[test]
fn unknown_room_skips_chip_checks_once() {
    // 鹰 pays 12x and 飞禽 2x
    let r = round(
        "sh-1",
        86399,
        "0412",
        vec![
            seat(1, 2, &[(4, 200), (11, 1000)], 1200, 2400 + 2000 - 1200),
            seat(2, 2, &[(11, 333)], 333, 666 - 333),
        ],
    );
    let report = audit_with(GameSelection::Fixed(GameTitle::Shark), &[r]);
    assert_eq!(kinds(&report), vec![DiscrepancyKind::LookupMiss]);
    assert_eq!(report.discrepancies[0].seat, None);
}

#[test]
fn car_drift_count_mismatch_and_rake() {
    // 宝马 pays 5x: 4000 net, 200 raked
    let mut seat1 = seat(1, 2, &[(6, 1000)], 1000, 3800);
    seat1["deduct"] = json!(200);
    let r = round("cd-1", 86701, "20605", vec![seat1]);
    let report = audit(&[r]);
    assert_eq!(kinds(&report), vec![DiscrepancyKind::Outcome]);
}

#[test]
fn chip_and_limit_violations_are_flagged_per_seat() {
    // 300 cannot be made from the room's chips; 12000 on 小 is over the 10000 limit
    let r = round(
        "sb-4",
        82001,
        "424010418",
        vec![seat(1, 3, &[(3, 300), (1, 10000), (1, 2000)], 12300, 24000 - 12300)],
    );
    let report = audit(&[r]);
    assert_eq!(kinds(&report), vec![DiscrepancyKind::ChipDenomination, DiscrepancyKind::StakeLimit]);
    assert!(report.discrepancies.iter().all(|d| d.seat == Some(1)));
}

#[test]
fn missing_outcome_code_is_structural() {
    let r = round("sb-5", 82001, "", vec![seat(1, 3, &[(1, 1000)], 1000, 1000)]);
    let report = audit(&[r]);
    assert_eq!(kinds(&report), vec![DiscrepancyKind::Structural]);
    assert_eq!(report.rounds_failed, 1);
}

#[test]
fn oversized_bets_are_flagged_without_stopping_the_batch() {
    const HUGE: i64 = 9_000_000_000_000_050;
    // a losing 大 bet no chip stack can make and far over the limit
    let odd = round("sb-6", 82001, "424010418", vec![seat(1, 3, &[(2, HUGE)], HUGE, -HUGE)]);
    let next = round("sb-7", 82001, "424010418", vec![seat(1, 3, &[(1, 1000)], 1000, 1000)]);
    let report = audit(&[odd, next]);
    assert_eq!(report.rounds_processed, 2);
    assert_eq!(report.rounds_failed, 0);
    assert_eq!(kinds(&report), vec![DiscrepancyKind::ChipDenomination, DiscrepancyKind::StakeLimit]);
    assert!(report.discrepancies.iter().all(|d| d.round_id == "sb-6"));
}

#[test]
fn winnings_too_large_to_settle_fail_only_their_round() {
    // 小 pays 2x: 9e18 back does not fit a chip amount
    let big = 9_000_000_000_000_000;
    let odd = round("sb-8", 82001, "424010418", vec![seat(1, 3, &[(1, big)], big, big)]);
    let next = round("sb-9", 82001, "424010418", vec![seat(1, 3, &[(1, 1000)], 1000, 1000)]);
    let report = audit(&[odd, next]);
    assert_eq!(report.rounds_processed, 2);
    assert_eq!(report.rounds_failed, 1);
    assert_eq!(kinds(&report), vec![DiscrepancyKind::StakeLimit, DiscrepancyKind::Structural]);
    assert!(report.discrepancies[1].description.contains("overflows"));
    assert!(report.discrepancies.iter().all(|d| d.round_id == "sb-8"));
}
