use serde_json::json;
use table_audit::config::AuditConfig;
use table_audit::driver::{parse_batch, BatchDriver, GameSelection};
use table_audit::profile::{Catalog, GameTitle};
use table_audit::report::{AuditReport, DiscrepancyKind, ReconciliationContext};

const BATCH: &str = r#"[
  {"gameNo": 1001, "log": {"data": {"roomData": {"ServerID": 82001},
     "big_data": {"pub1": "424010418", "att": [
        {"pos": 1, "validBet": 1000, "changes": 1000, "act": [{"ty": 3, "pos": 1, "bet": 1000}]}]}}}},
  {"gameNo": "1002", "log": {"data": {"roomData": {"ServerID": 86301},
     "big_data": {"pub1": "0905", "att": [
        {"pos": 3, "validBet": 200, "changes": 4800, "act": [{"ty": 2, "pos": 9, "bet": 200}]}]}}}},
  {"gameNo": "1003", "log": {"data": {"roomData": {"ServerID": 86301},
     "big_data": {"pub1": "0905", "att": [
        {"pos": 3, "validBet": 200, "changes": 5000, "act": [{"ty": 2, "pos": 9, "bet": 200}]}]}}}},
  "not a round"
]"#;

fn run(selection: GameSelection) -> AuditReport {
    let catalog = Catalog::builtin();
    let driver = BatchDriver::new(&catalog, selection, &AuditConfig::default()).unwrap();
    driver.run(&parse_batch(BATCH).unwrap())
}

#[test]
fn auto_selection_mixes_titles() {
    let report = run(GameSelection::Auto);
    assert_eq!(report.rounds_processed, 4);
    assert_eq!(report.rounds_failed, 1);
    // 银鲨 pays 25x: 5000 back on 200 staked, 4800 net
    let kinds: Vec<(String, DiscrepancyKind)> =
        report.discrepancies.iter().map(|d| (d.round_id.clone(), d.kind)).collect();
    assert_eq!(
        kinds,
        vec![
            ("1003".to_string(), DiscrepancyKind::Mismatch),
            ("#3".to_string(), DiscrepancyKind::Structural),
        ]
    );
    assert_eq!(report.flagged_rounds(), 2);
    assert!((report.pass_ratio() - 0.5).abs() < 1e-9);
}

#[test]
fn fixed_selection_applies_one_title_to_every_round() {
    // read as dragon-tiger, "424010418" has an invalid suit digit and the
    // four-digit shark codes carry no winning position
    let report = run(GameSelection::Fixed(GameTitle::DragonTiger));
    assert_eq!(report.rounds_processed, 4);
    assert_eq!(report.rounds_failed, 4);
    assert!(report.discrepancies.iter().all(|d| d.kind == DiscrepancyKind::Structural));
    let ids: Vec<&str> = report.discrepancies.iter().map(|d| d.round_id.as_str()).collect();
    assert_eq!(ids, vec!["1001", "1002", "1003", "#3"]);
    assert!(report.discrepancies[1].description.contains("shorter than 6"));
}

#[test]
fn report_serializes_for_later_viewing() {
    let report = run(GameSelection::Auto);
    let text = report.to_json().unwrap();
    let back: AuditReport = serde_json::from_str(&text).unwrap();
    assert_eq!(back, report);
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(value["discrepancies"][0]["kind"], json!("mismatch"));
    assert_eq!(value["discrepancies"][0]["field"], json!("payout"));
    assert!(value["discrepancies"][1].get("seat").is_none());
}

#[test]
fn run_into_accumulates_across_batches() {
    let catalog = Catalog::builtin();
    let config = AuditConfig::from_json(r#"{"progress_every": 1}"#).unwrap();
    let driver = BatchDriver::new(&catalog, GameSelection::Auto, &config).unwrap();
    let records = parse_batch(BATCH).unwrap();
    let mut ctx = ReconciliationContext::new();
    driver.run_into(&records[..2], &mut ctx);
    driver.run_into(&records[2..], &mut ctx);
    let report = ctx.into_report();
    assert_eq!(report, run(GameSelection::Auto));
}
