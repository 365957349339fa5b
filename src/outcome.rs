//! Decoders for the `pub1` outcome string each wager title records.
//!
//! Every title packs its result into a run of ASCII digits: a short
//! title-specific header followed by fixed-width groups naming the winning
//! bet positions.

use crate::cards::Suit;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum OutcomeError {
    #[error("outcome code is empty")]
    Empty,
    #[error("outcome code {code:?} shorter than {needed} characters")]
    TooShort { code: String, needed: usize },
    #[error("unexpected character {ch:?} at offset {at} in {code:?}")]
    BadChar { code: String, at: usize, ch: char },
    #[error("trailing partial group {rest:?} in {code:?}")]
    Incomplete { code: String, rest: String },
}

/// Parse `width` decimal digits starting at byte `at`.
fn digits(code: &str, at: usize, width: usize) -> Result<u32, OutcomeError> {
    let slice = code.get(at..at + width).ok_or_else(|| OutcomeError::TooShort {
        code: code.to_owned(),
        needed: at + width,
    })?;
    let mut value = 0u32;
    for (i, ch) in slice.chars().enumerate() {
        let d = ch.to_digit(10).ok_or_else(|| OutcomeError::BadChar {
            code: code.to_owned(),
            at: at + i,
            ch,
        })?;
        value = value.saturating_mul(10).saturating_add(d);
    }
    Ok(value)
}

fn require_len(code: &str, needed: usize) -> Result<(), OutcomeError> {
    if code.is_empty() {
        return Err(OutcomeError::Empty);
    }
    if code.len() < needed || !code.is_ascii() {
        return Err(OutcomeError::TooShort { code: code.to_owned(), needed });
    }
    Ok(())
}

/// Two-digit position groups from `offset` to the end of the code.
pub fn position_groups(code: &str, offset: usize) -> Result<Vec<u8>, OutcomeError> {
    let tail = code.get(offset..).unwrap_or("");
    if tail.len() % 2 != 0 {
        return Err(OutcomeError::Incomplete {
            code: code.to_owned(),
            rest: tail.chars().last().map(String::from).unwrap_or_default(),
        });
    }
    (offset..code.len()).step_by(2).map(|at| digits(code, at, 2).map(|v| v as u8)).collect()
}

/// Sic bo: three dice, then winning positions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SicBoOutcome {
    pub dice: [u8; 3],
    pub positions: Vec<u8>,
}

impl SicBoOutcome {
    /// ```
    /// use table_audit::outcome::SicBoOutcome;
    ///
    /// let o = SicBoOutcome::decode("424010418").unwrap();
    /// assert_eq!(o.dice, [4, 2, 4]);
    /// assert_eq!(o.positions, vec![1, 4, 18]);
    /// ```
    pub fn decode(code: &str) -> Result<Self, OutcomeError> {
        require_len(code, 3)?;
        let mut dice = [0u8; 3];
        for (i, die) in dice.iter_mut().enumerate() {
            *die = digits(code, i, 1)? as u8;
        }
        Ok(Self { dice, positions: position_groups(code, 3)? })
    }

    pub fn total(&self) -> u8 {
        self.dice.iter().sum()
    }
}

/// Four suits: a two-character draw header, then winning positions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuitsOutcome {
    pub positions: Vec<u8>,
}

impl SuitsOutcome {
    pub fn decode(code: &str) -> Result<Self, OutcomeError> {
        require_len(code, 3)?;
        Ok(Self { positions: position_groups(code, 2)? })
    }
}

/// Shark: the animal position followed by the multiplier shown on the wheel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharkOutcome {
    pub position: u8,
    pub rate: u32,
}

impl SharkOutcome {
    pub fn decode(code: &str) -> Result<Self, OutcomeError> {
        require_len(code, 4)?;
        let position = digits(code, 0, 2)? as u8;
        let rate = digits(code, 2, code.len() - 2)?;
        Ok(Self { position, rate })
    }
}

/// Car drift: declared group count, then `(position, rate)` pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CarDriftOutcome {
    pub declared: u8,
    pub groups: Vec<(u8, u8)>,
}

impl CarDriftOutcome {
    /// ```
    /// use table_audit::outcome::CarDriftOutcome;
    ///
    /// let o = CarDriftOutcome::decode("10900").unwrap();
    /// assert_eq!(o.declared, 1);
    /// assert_eq!(o.groups, vec![(9, 0)]);
    /// ```
    pub fn decode(code: &str) -> Result<Self, OutcomeError> {
        require_len(code, 3)?;
        let declared = digits(code, 0, 1)? as u8;
        let body = &code[1..];
        if body.len() % 4 != 0 {
            let whole = body.len() / 4 * 4;
            return Err(OutcomeError::Incomplete {
                code: code.to_owned(),
                rest: body[whole..].to_owned(),
            });
        }
        let groups = (1..code.len())
            .step_by(4)
            .map(|at| Ok((digits(code, at, 2)? as u8, digits(code, at + 2, 2)? as u8)))
            .collect::<Result<Vec<_>, OutcomeError>>()?;
        Ok(Self { declared, groups })
    }

    pub fn positions(&self) -> Vec<u8> {
        self.groups.iter().map(|&(pos, _)| pos).collect()
    }
}

/// One dragon-tiger card: suit plus face value 1..=13.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawnCard {
    pub suit: Suit,
    pub value: u8,
}

impl DrawnCard {
    pub fn key(self) -> (u8, u8) {
        (self.value, self.suit.strength())
    }
}

/// Dragon-tiger: dragon card, tiger card, then winning positions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragonTigerOutcome {
    pub dragon: DrawnCard,
    pub tiger: DrawnCard,
    pub positions: Vec<u8>,
}

impl DragonTigerOutcome {
    /// ```
    /// use table_audit::cards::Suit;
    /// use table_audit::outcome::DragonTigerOutcome;
    ///
    /// let o = DragonTigerOutcome::decode("3d1a010409").unwrap();
    /// assert_eq!(o.dragon.suit, Suit::Spades);
    /// assert_eq!(o.dragon.value, 13);
    /// assert_eq!(o.tiger.value, 10);
    /// assert_eq!(o.positions, vec![1, 4, 9]);
    /// ```
    pub fn decode(code: &str) -> Result<Self, OutcomeError> {
        // two cards and at least one winning position
        require_len(code, 6)?;
        let dragon = Self::card(code, 0)?;
        let tiger = Self::card(code, 2)?;
        Ok(Self { dragon, tiger, positions: position_groups(code, 4)? })
    }

    fn card(code: &str, at: usize) -> Result<DrawnCard, OutcomeError> {
        let bad = |offset: usize| {
            let ch = code[offset..].chars().next().unwrap_or('?');
            OutcomeError::BadChar { code: code.to_owned(), at: offset, ch }
        };
        let suit = match digits(code, at, 1)? {
            0 => Suit::Diamonds,
            1 => Suit::Clubs,
            2 => Suit::Hearts,
            3 => Suit::Spades,
            _ => return Err(bad(at)),
        };
        let value = code[at + 1..]
            .chars()
            .next()
            .and_then(|c| c.to_digit(16))
            .filter(|v| (1..=13).contains(v))
            .ok_or_else(|| bad(at + 1))? as u8;
        Ok(DrawnCard { suit, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_groups_reject_odd_tail() {
        assert_eq!(position_groups("0102", 0), Ok(vec![1, 2]));
        assert!(matches!(position_groups("01023", 0), Err(OutcomeError::Incomplete { .. })));
        assert!(matches!(position_groups("01x2", 0), Err(OutcomeError::BadChar { at: 2, .. })));
    }

    #[test]
    fn sic_bo_needs_three_dice() {
        assert_eq!(SicBoOutcome::decode(""), Err(OutcomeError::Empty));
        assert!(matches!(SicBoOutcome::decode("42"), Err(OutcomeError::TooShort { .. })));
        let o = SicBoOutcome::decode("666020511").unwrap();
        assert_eq!(o.total(), 18);
        assert_eq!(o.positions, vec![2, 5, 11]);
    }

    #[test]
    fn suits_skip_header() {
        let o = SuitsOutcome::decode("3a0207").unwrap();
        assert_eq!(o.positions, vec![2, 7]);
    }

    #[test]
    fn shark_position_and_rate() {
        assert_eq!(SharkOutcome::decode("0309"), Ok(SharkOutcome { position: 3, rate: 9 }));
        assert_eq!(SharkOutcome::decode("10100"), Ok(SharkOutcome { position: 10, rate: 100 }));
        assert!(SharkOutcome::decode("031").is_err());
    }

    #[test]
    fn car_drift_groups() {
        let o = CarDriftOutcome::decode("201050903").unwrap();
        assert_eq!(o.declared, 2);
        assert_eq!(o.groups, vec![(1, 5), (9, 3)]);
        assert_eq!(o.positions(), vec![1, 9]);
        assert!(matches!(
            CarDriftOutcome::decode("101050"),
            Err(OutcomeError::Incomplete { .. })
        ));
    }

    #[test]
    fn dragon_tiger_needs_a_winning_position() {
        for code in ["3d1a", "3d1a0"] {
            assert_eq!(
                DragonTigerOutcome::decode(code),
                Err(OutcomeError::TooShort { code: code.to_owned(), needed: 6 })
            );
        }
        assert_eq!(DragonTigerOutcome::decode("3d1a01").map(|o| o.positions), Ok(vec![1]));
    }

    #[test]
    fn dragon_tiger_rejects_bad_cards() {
        assert!(matches!(
            DragonTigerOutcome::decode("4d1a01"),
            Err(OutcomeError::BadChar { at: 0, .. })
        ));
        assert!(matches!(
            DragonTigerOutcome::decode("3e1a01"),
            Err(OutcomeError::BadChar { at: 1, .. })
        ));
        assert!(matches!(
            DragonTigerOutcome::decode("301a01"),
            Err(OutcomeError::BadChar { at: 1, .. })
        ));
    }
}
