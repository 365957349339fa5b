//! Serde model of one logged round.
//!
//! The server log is loose: ids arrive as numbers or strings and most seat
//! fields are optional. Everything here deserializes leniently; deciding
//! which missing fields matter is the reconciler's job.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundRecord {
    #[serde(rename = "gameNo", deserialize_with = "string_or_number")]
    pub game_no: String,
    pub log: RoundLog,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundLog {
    pub data: LogData,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogData {
    #[serde(rename = "roomData", default)]
    pub room_data: RoomData,
    #[serde(default)]
    pub big_data: BigData,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomData {
    #[serde(rename = "GameID", default)]
    pub game_id: Option<u32>,
    #[serde(rename = "ServerID", default)]
    pub server_id: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BigData {
    /// Bull-bull base stake.
    #[serde(default)]
    pub blink: Option<i64>,
    #[serde(default)]
    pub act: Vec<Action>,
    #[serde(default)]
    pub att: Vec<SeatRecord>,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub pub1: Option<String>,
    #[serde(default)]
    pub info: TableInfo,
}

/// Dragon-tiger table totals on each side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableInfo {
    #[serde(default)]
    pub long: i64,
    #[serde(default)]
    pub hu: i64,
}

/// One logged action: phase tag, seat or bet position, and amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub ty: u8,
    pub pos: u8,
    #[serde(default)]
    pub bet: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatRecord {
    pub pos: u8,
    #[serde(default)]
    pub chip: Option<i64>,
    #[serde(default)]
    pub deduct: Option<i64>,
    #[serde(rename = "validBet", default)]
    pub valid_bet: Option<i64>,
    #[serde(default)]
    pub changes: Option<i64>,
    #[serde(default)]
    pub total: Option<i64>,
    #[serde(rename = "cardType", default)]
    pub card_type: Option<u8>,
    #[serde(default)]
    pub card: Vec<u8>,
    #[serde(default)]
    pub act: Vec<Action>,
}

impl RoundRecord {
    pub fn from_value(value: &Value) -> Result<Self, serde_json::Error> {
        Self::deserialize(value)
    }

    pub fn big_data(&self) -> &BigData {
        &self.log.data.big_data
    }

    pub fn room(&self) -> &RoomData {
        &self.log.data.room_data
    }

    pub fn seat(&self, pos: u8) -> Option<&SeatRecord> {
        self.big_data().att.iter().find(|s| s.pos == pos)
    }
}

/// Best-effort round id for a record that failed to parse.
pub fn round_id_hint(value: &Value, index: usize) -> String {
    match value.get("gameNo") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => format!("#{index}"),
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    String(String),
    Number(serde_json::Number),
}

impl From<StringOrNumber> for String {
    fn from(v: StringOrNumber) -> Self {
        match v {
            StringOrNumber::String(s) => s,
            StringOrNumber::Number(n) => n.to_string(),
        }
    }
}

fn string_or_number<'de, D: Deserializer<'de>>(de: D) -> Result<String, D::Error> {
    StringOrNumber::deserialize(de).map(String::from)
}

fn opt_string_or_number<'de, D: Deserializer<'de>>(de: D) -> Result<Option<String>, D::Error> {
    Ok(Option::<StringOrNumber>::deserialize(de)?.map(String::from))
}
