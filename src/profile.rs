//! Static per-title tables: rooms, chip denominations, bet positions, odds
//! and stake limits.
//!
//! The built-in [`Catalog`] mirrors the live server configuration. A JSON
//! catalog with the same shape can replace it (see `AuditConfig`).

use crate::payout::{Odds, RakeRule};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::{BTreeMap, BinaryHeap, HashSet};
use std::fmt;
use std::str::FromStr;

/// Bet position id as recorded in `act[].pos`.
pub type PositionId = u8;
pub type ServerId = u32;

#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum ProfileError {
    #[error("unknown game title {0:?}")]
    UnknownTitle(String),
    #[error("server id {0} belongs to more than one room")]
    DuplicateServer(ServerId),
    #[error("title {0} appears more than once")]
    DuplicateTitle(GameTitle),
    #[error("room {server_id} has no chip denominations")]
    NoChips { server_id: ServerId },
    #[error("room {server_id} chip {chip} is not positive")]
    BadChip { server_id: ServerId, chip: i64 },
    #[error("room {server_id} chips {chips:?} are too finely spread to check")]
    ChipSpread { server_id: ServerId, chips: Vec<i64> },
    #[error("catalog json: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameTitle {
    BullBull,
    SicBo,
    FourSuits,
    Shark,
    CarDrift,
    DragonTiger,
}

impl GameTitle {
    pub const ALL: [GameTitle; 6] = [
        GameTitle::BullBull,
        GameTitle::SicBo,
        GameTitle::FourSuits,
        GameTitle::Shark,
        GameTitle::CarDrift,
        GameTitle::DragonTiger,
    ];

    pub const fn slug(self) -> &'static str {
        match self {
            GameTitle::BullBull => "bull_bull",
            GameTitle::SicBo => "sic_bo",
            GameTitle::FourSuits => "four_suits",
            GameTitle::Shark => "shark",
            GameTitle::CarDrift => "car_drift",
            GameTitle::DragonTiger => "dragon_tiger",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            GameTitle::BullBull => "牛牛",
            GameTitle::SicBo => "百人骰宝",
            GameTitle::FourSuits => "黑红梅芳",
            GameTitle::Shark => "金鲨银鲨",
            GameTitle::CarDrift => "豪车漂移",
            GameTitle::DragonTiger => "龙虎斗",
        }
    }
}

impl fmt::Display for GameTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for GameTitle {
    type Err = ProfileError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let norm = s.trim().to_ascii_lowercase().replace('-', "_");
        GameTitle::ALL
            .into_iter()
            .find(|t| t.slug() == norm)
            .ok_or_else(|| ProfileError::UnknownTitle(s.to_owned()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub server_id: ServerId,
    pub name: String,
    pub chips: Vec<i64>,
}

impl Room {
    /// Whether `amount` can be paid with any number of the room's chips.
    ///
    /// ```
    /// use table_audit::profile::Room;
    ///
    /// let room = Room { server_id: 1, name: "t".into(), chips: vec![200, 500] };
    /// assert!(room.composable(700));
    /// assert!(room.composable(1100));
    /// assert!(!room.composable(300));
    /// ```
    pub fn composable(&self, amount: i64) -> bool {
        if amount <= 0 {
            return false;
        }
        let Some((unit, chips)) = self.normalized_chips() else {
            return false;
        };
        if amount % unit != 0 {
            return false;
        }
        let target = amount / unit;
        let Some(&smallest) = chips.iter().min() else {
            return false;
        };
        if smallest > MAX_CHIP_SPREAD {
            return false;
        }
        // every sum in a residue class above its least member is reachable by
        // adding smallest chips
        let least = least_sums(&chips, smallest);
        least[(target % smallest) as usize].is_some_and(|sum| sum <= target)
    }

    /// Chip values divided by their common unit, with the unit.
    fn normalized_chips(&self) -> Option<(i64, Vec<i64>)> {
        let chips: Vec<i64> = self.chips.iter().copied().filter(|&c| c > 0).collect();
        let unit = chips.iter().fold(0, |g, &c| gcd(g, c));
        (unit > 0).then(|| (unit, chips.iter().map(|&c| c / unit).collect()))
    }
}

/// Largest smallest-chip-to-unit ratio a room may have; it sizes the residue
/// table in [`Room::composable`].
pub const MAX_CHIP_SPREAD: i64 = 100_000;

/// Least sum of chips (any number of each) in every residue class modulo
/// `modulus`, `None` where the class is unreachable.
fn least_sums(chips: &[i64], modulus: i64) -> Vec<Option<i64>> {
    let mut least = vec![None; modulus as usize];
    let mut queue = BinaryHeap::from([Reverse((0i64, 0usize))]);
    least[0] = Some(0);
    while let Some(Reverse((sum, residue))) = queue.pop() {
        if least[residue].is_some_and(|best| best < sum) {
            continue;
        }
        for &chip in chips {
            let Some(next) = sum.checked_add(chip) else { continue };
            let r = (next % modulus) as usize;
            if least[r].map_or(true, |best| next < best) {
                least[r] = Some(next);
                queue.push(Reverse((next, r)));
            }
        }
    }
    least
}

fn gcd(a: i64, b: i64) -> i64 {
    if b == 0 {
        a
    } else {
        gcd(b, a % b)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BetPosition {
    pub id: PositionId,
    pub name: String,
    pub odds: Odds,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakeLimit {
    pub server_id: ServerId,
    pub position: PositionId,
    pub min: i64,
    pub max: i64,
}

impl StakeLimit {
    pub fn admits(&self, total: i64) -> bool {
        (self.min..=self.max).contains(&total)
    }
}

/// Which kind of round a deduction rule fires in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundScope {
    Always,
    Normal,
    Refund,
}

/// How many positions of a group must be staked for the rule to fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trigger {
    AllOf,
    AnyOf,
    AtLeast(usize),
}

/// Hedged stakes excluded from the valid bet: when the trigger holds, every
/// stake on the group's positions is deducted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeductionRule {
    pub positions: Vec<PositionId>,
    pub trigger: Trigger,
    pub scope: RoundScope,
}

impl DeductionRule {
    pub fn fires(&self, stakes: &BTreeMap<PositionId, i64>, refund_round: bool) -> bool {
        let in_scope = match self.scope {
            RoundScope::Always => true,
            RoundScope::Normal => !refund_round,
            RoundScope::Refund => refund_round,
        };
        if !in_scope {
            return false;
        }
        let staked = self.positions.iter().filter(|p| stakes.contains_key(p)).count();
        match self.trigger {
            Trigger::AllOf => staked == self.positions.len(),
            Trigger::AnyOf => staked > 0,
            Trigger::AtLeast(n) => staked >= n,
        }
    }

    pub fn deducted(&self, stakes: &BTreeMap<PositionId, i64>) -> i64 {
        stakes.iter().filter(|(p, _)| self.positions.contains(p)).map(|(_, &v)| v).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameProfile {
    pub title: GameTitle,
    /// `GameID` the server stamps on this title's rounds.
    #[serde(default)]
    pub game_id: Option<u32>,
    /// Action tag of a wager (or, for bull-bull, a player's bet multiplier).
    pub bet_phase: u8,
    /// Bull-bull banker bidding tag.
    #[serde(default)]
    pub bid_phase: Option<u8>,
    #[serde(default)]
    pub rake: RakeRule,
    #[serde(default)]
    pub rooms: Vec<Room>,
    #[serde(default)]
    pub positions: Vec<BetPosition>,
    #[serde(default)]
    pub limits: Vec<StakeLimit>,
    #[serde(default)]
    pub deductions: Vec<DeductionRule>,
}

impl GameProfile {
    pub fn room(&self, server_id: ServerId) -> Option<&Room> {
        self.rooms.iter().find(|r| r.server_id == server_id)
    }

    pub fn position(&self, id: PositionId) -> Option<&BetPosition> {
        self.positions.iter().find(|p| p.id == id)
    }

    pub fn position_name(&self, id: PositionId) -> String {
        self.position(id).map_or_else(|| format!("#{id}"), |p| p.name.clone())
    }

    pub fn odds(&self, id: PositionId) -> Option<Odds> {
        self.position(id).map(|p| p.odds)
    }

    pub fn limit(&self, server_id: ServerId, position: PositionId) -> Option<&StakeLimit> {
        self.limits.iter().find(|l| l.server_id == server_id && l.position == position)
    }
}

/// Every title's tables, built once and shared by reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    pub profiles: Vec<GameProfile>,
}

impl Catalog {
    pub fn profile(&self, title: GameTitle) -> Option<&GameProfile> {
        self.profiles.iter().find(|p| p.title == title)
    }

    /// The profile whose rooms include `server_id`.
    pub fn profile_for_server(&self, server_id: ServerId) -> Option<&GameProfile> {
        self.profiles.iter().find(|p| p.room(server_id).is_some())
    }

    pub fn profile_for_game_id(&self, game_id: u32) -> Option<&GameProfile> {
        self.profiles.iter().find(|p| p.game_id == Some(game_id))
    }

    pub fn from_json(text: &str) -> Result<Self, ProfileError> {
        let catalog: Catalog = serde_json::from_str(text)?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn to_json(&self) -> Result<String, ProfileError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ProfileError> {
        let mut titles = HashSet::new();
        let mut servers = HashSet::new();
        for profile in &self.profiles {
            if !titles.insert(profile.title) {
                return Err(ProfileError::DuplicateTitle(profile.title));
            }
            for room in &profile.rooms {
                if !servers.insert(room.server_id) {
                    return Err(ProfileError::DuplicateServer(room.server_id));
                }
                if room.chips.is_empty() {
                    return Err(ProfileError::NoChips { server_id: room.server_id });
                }
                if let Some(&chip) = room.chips.iter().find(|&&c| c <= 0) {
                    return Err(ProfileError::BadChip { server_id: room.server_id, chip });
                }
                let spread = room.normalized_chips().and_then(|(_, c)| c.into_iter().min());
                if spread.map_or(true, |s| s > MAX_CHIP_SPREAD) {
                    return Err(ProfileError::ChipSpread { server_id: room.server_id, chips: room.chips.clone() });
                }
            }
        }
        Ok(())
    }

    pub fn builtin() -> Self {
        Self {
            profiles: vec![
                bull_bull(),
                sic_bo(),
                four_suits(),
                shark(),
                car_drift(),
                dragon_tiger(),
            ],
        }
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

// ============================================================================
// Built-in tables
// ============================================================================

const TIERS: [&str; 4] = ["新手场", "中級场", "高級场", "大師场"];

fn rooms(title: GameTitle, first_server: ServerId, chips: [&[i64]; 4]) -> Vec<Room> {
    chips
        .iter()
        .enumerate()
        .map(|(i, c)| Room {
            server_id: first_server + i as ServerId,
            name: format!("{}{}", title.label(), TIERS[i]),
            chips: c.to_vec(),
        })
        .collect()
}

fn positions(entries: &[(&str, i64)]) -> Vec<BetPosition> {
    entries
        .iter()
        .enumerate()
        .map(|(i, &(name, odds))| BetPosition {
            id: i as PositionId + 1,
            name: name.to_owned(),
            odds: Odds(odds),
        })
        .collect()
}

fn limits(
    server_id: ServerId,
    min: i64,
    ids: impl IntoIterator<Item = PositionId>,
    max: impl Fn(PositionId) -> i64,
) -> Vec<StakeLimit> {
    ids.into_iter()
        .map(|position| StakeLimit { server_id, position, min, max: max(position) })
        .collect()
}

fn bull_bull() -> GameProfile {
    GameProfile {
        title: GameTitle::BullBull,
        game_id: Some(830),
        bet_phase: 4,
        bid_phase: Some(2),
        rake: RakeRule::percent(5),
        rooms: Vec::new(),
        positions: Vec::new(),
        limits: Vec::new(),
        deductions: Vec::new(),
    }
}

fn sic_bo() -> GameProfile {
    let title = GameTitle::SicBo;
    let mut table: Vec<(&str, i64)> = vec![
        ("小", 200),
        ("大", 200),
        ("單", 200),
        ("雙", 200),
        ("任意豹子", 3000),
        ("豹子1", 18000),
        ("豹子2", 18000),
        ("豹子3", 18000),
        ("豹子4", 18000),
        ("豹子5", 18000),
        ("豹子6", 18000),
    ];
    const TOTAL_NAMES: [&str; 14] = [
        "4點", "5點", "6點", "7點", "8點", "9點", "10點", "11點", "12點", "13點", "14點", "15點",
        "16點", "17點",
    ];
    const TOTAL_ODDS: [i64; 14] = [60, 30, 18, 12, 8, 6, 6, 6, 6, 8, 12, 18, 30, 60];
    table.extend(TOTAL_NAMES.iter().zip(TOTAL_ODDS).map(|(&n, o)| (n, o * 100)));

    let mut lims = limits(82001, 200, 1..=25, |p| if (6..=11).contains(&p) { 5000 } else { 10000 });
    lims.extend(limits(82002, 2000, 1..=25, |p| match p {
        5 => 30000,
        6..=11 => 10000,
        _ => 100000,
    }));
    lims.extend(limits(82003, 20000, 1..=25, |_| 1_000_000));
    lims.extend(limits(82004, 50000, 1..=25, |_| 2_500_000));

    GameProfile {
        title,
        game_id: None,
        bet_phase: 3,
        bid_phase: None,
        rake: RakeRule::NONE,
        rooms: rooms(
            title,
            82001,
            [
                &[200, 500, 1000, 2000, 5000, 10000],
                &[2000, 5000, 10000, 20000, 50000, 100000],
                &[20000, 50000, 100000, 200000, 500000, 1000000],
                &[50000, 100000, 200000, 500000, 1000000, 2500000],
            ],
        ),
        positions: positions(&table),
        limits: lims,
        deductions: Vec::new(),
    }
}

fn four_suits() -> GameProfile {
    let title = GameTitle::FourSuits;
    let tiers = [(86601, 200, 10000), (86602, 2000, 100000), (86603, 20000, 1000000), (86604, 50000, 1500000)];
    GameProfile {
        title,
        game_id: None,
        bet_phase: 3,
        bid_phase: None,
        rake: RakeRule::percent(5),
        rooms: rooms(
            title,
            86601,
            [
                &[200, 500, 1000, 2000, 5000, 10000],
                &[2000, 5000, 10000, 20000, 50000, 100000],
                &[20000, 50000, 100000, 200000, 500000, 1000000],
                &[50000, 100000, 200000, 500000, 1000000, 1500000],
            ],
        ),
        positions: positions(&[
            ("黑", 400),
            ("紅", 400),
            ("梅", 400),
            ("芳", 400),
            ("大", 200),
            ("小", 200),
            ("單", 200),
            ("雙", 200),
            ("7", 1300),
        ]),
        limits: tiers.iter().flat_map(|&(s, min, max)| limits(s, min, 1..=9, move |_| max)).collect(),
        deductions: Vec::new(),
    }
}

fn shark() -> GameProfile {
    let title = GameTitle::Shark;
    // (server, min, max for animals 1..=8, silver shark, gold shark, birds/beasts)
    let tiers = [
        (86301, 200, 60000, 30000, 15000, 90000),
        (86302, 1000, 100000, 50000, 25000, 150000),
        (86303, 5000, 200000, 100000, 50000, 300000),
        (86304, 20000, 400000, 200000, 100000, 600000),
    ];
    GameProfile {
        title,
        game_id: None,
        bet_phase: 2,
        bid_phase: None,
        rake: RakeRule::NONE,
        rooms: rooms(
            title,
            86301,
            [
                &[200, 1000, 5000, 15000, 30000],
                &[1000, 5000, 10000, 20000, 50000],
                &[5000, 10000, 20000, 50000, 100000],
                &[20000, 50000, 100000, 200000, 3000000],
            ],
        ),
        positions: positions(&[
            ("燕子", 600),
            ("鸽子", 800),
            ("孔雀", 900),
            ("鹰", 1200),
            ("兔子", 600),
            ("猴子", 800),
            ("熊猫", 900),
            ("狮子", 1200),
            ("银鲨", 2500),
            ("金鲨", 5000),
            ("飞禽", 200),
            ("走兽", 200),
        ]),
        limits: tiers
            .iter()
            .flat_map(|&(s, min, animal, silver, gold, group)| {
                limits(s, min, 1..=12, move |p| match p {
                    9 => silver,
                    10 => gold,
                    11 | 12 => group,
                    _ => animal,
                })
            })
            .collect(),
        deductions: Vec::new(),
    }
}

fn car_drift() -> GameProfile {
    let title = GameTitle::CarDrift;
    let tiers: [(ServerId, i64, [i64; 8]); 4] = [
        (86701, 200, [5000, 7000, 10000, 20000, 25000, 40000, 50000, 65000]),
        (86702, 1000, [12000, 15000, 25000, 50000, 62000, 100000, 130000, 150000]),
        (86703, 5000, [50000, 70000, 100000, 200000, 250000, 400000, 500000, 650000]),
        (86704, 20000, [200000, 300000, 400000, 800000, 1000000, 1600000, 2000000, 2500000]),
    ];
    GameProfile {
        title,
        game_id: None,
        bet_phase: 2,
        bid_phase: None,
        rake: RakeRule::percent(5),
        rooms: rooms(
            title,
            86701,
            [
                &[200, 1000, 5000, 10000, 20000, 65000],
                &[1000, 5000, 10000, 50000, 100000, 150000],
                &[5000, 10000, 50000, 200000, 500000, 650000],
                &[20000, 100000, 200000, 500000, 1000000, 2500000],
            ],
        ),
        positions: positions(&[
            ("法拉利", 4000),
            ("兰博基尼", 3000),
            ("保时捷", 2000),
            ("玛莎拉蒂", 1000),
            ("奔驰", 800),
            ("宝马", 500),
            ("捷豹", 400),
            ("路虎", 300),
            ("LUCK", 0),
        ]),
        // the LUCK slot is not a wager and has no limit
        limits: tiers
            .iter()
            .flat_map(|&(s, min, maxes)| limits(s, min, 1..=8, move |p| maxes[p as usize - 1]))
            .collect(),
        deductions: Vec::new(),
    }
}

fn dragon_tiger() -> GameProfile {
    let title = GameTitle::DragonTiger;
    let mut lims = limits(9001, 200, 1..=13, |_| 10000);
    lims.extend(limits(9002, 1000, 1..=13, |_| 50000));
    lims.extend(limits(9003, 5000, 1..=13, |p| if p == 3 { 50000 } else { 250000 }));
    lims.extend(limits(9004, 20000, 1..=13, |p| if p == 3 { 50000 } else { 1_000_000 }));

    GameProfile {
        title,
        game_id: None,
        bet_phase: 4,
        bid_phase: None,
        rake: RakeRule::NONE,
        rooms: rooms(
            title,
            9001,
            [
                &[200, 500, 1000, 2000, 5000, 10000],
                &[1000, 2000, 5000, 10000, 20000, 50000],
                &[5000, 10000, 20000, 50000, 100000, 250000],
                &[20000, 50000, 100000, 200000, 500000, 1000000],
            ],
        ),
        positions: positions(&[
            ("龍", 200),
            ("虎", 200),
            ("和", 3000),
            ("黑桃龍", 390),
            ("紅心龍", 390),
            ("梅花龍", 390),
            ("方塊龍", 390),
            ("黑桃虎", 390),
            ("紅心虎", 390),
            ("梅花虎", 390),
            ("方塊虎", 390),
            ("壓庄贏", 196),
            ("壓庄輸", 196),
        ]),
        limits: lims,
        deductions: vec![
            DeductionRule { positions: vec![1, 2], trigger: Trigger::AllOf, scope: RoundScope::Always },
            DeductionRule { positions: vec![12, 13], trigger: Trigger::AllOf, scope: RoundScope::Normal },
            DeductionRule { positions: vec![12, 13], trigger: Trigger::AnyOf, scope: RoundScope::Refund },
            DeductionRule {
                positions: vec![4, 5, 6, 7],
                trigger: Trigger::AtLeast(3),
                scope: RoundScope::Always,
            },
            DeductionRule {
                positions: vec![8, 9, 10, 11],
                trigger: Trigger::AtLeast(3),
                scope: RoundScope::Always,
            },
        ],
    }
}
