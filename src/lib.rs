//! table-audit: settlement reconciliation for recorded table-game rounds
//!
//! Goals:
//! - Recompute every seat's valid bet, payout and rake from the raw round log
//! - Report each disagreement with the recorded figures instead of stopping
//! - No panics for malformed input; broken rounds become structural findings
//!
//! ## Quick start: classify a bull-bull hand
//! ```
//! use table_audit::evaluator::{evaluate, HandType};
//! use table_audit::hand::BullHand;
//!
//! let hand = BullHand::from_codes(&[10, 24, 38, 49, 11]).unwrap();
//! assert_eq!(evaluate(&hand), HandType::FiveFlower);
//! ```
//!
//! ## Quick start: audit a batch
//! ```
//! use table_audit::config::AuditConfig;
//! use table_audit::driver::{parse_batch, BatchDriver, GameSelection};
//! use table_audit::profile::Catalog;
//!
//! let catalog = Catalog::builtin();
//! let driver = BatchDriver::new(&catalog, GameSelection::Auto, &AuditConfig::default()).unwrap();
//! let report = driver.run(&parse_batch("[]").unwrap());
//! assert!(report.is_clean());
//! ```
//!
//! ## CLI
//! ```sh
//! cargo run --bin table-audit -- --input rounds.json --tui
//! ```

pub mod cards;
pub mod config;
pub mod deck;
pub mod driver;
pub mod evaluator;
pub mod hand;
pub mod outcome;
pub mod payout;
pub mod profile;
pub mod proration;
pub mod reconcile;
pub mod record;
pub mod report;
pub mod tui;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
