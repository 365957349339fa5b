//! Capped settlement: when the payer cannot cover every nominal amount, the
//! payable pool is split proportionally and odd chips are walked around the
//! table one at a time.

use std::collections::BTreeMap;

/// Seat numbers are 1-based.
pub type Seat = u8;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProrationError {
    #[error("nothing to prorate")]
    Empty,
    #[error("nominal amounts sum to zero")]
    ZeroTotal,
    #[error("nominal amounts and pool do not share one sign")]
    MixedSigns,
    #[error("seat {seat} outside 1..={seat_count}")]
    SeatOutOfRange { seat: Seat, seat_count: Seat },
}

/// Next seat clockwise, wrapping `seat_count` back to 1.
pub const fn next_seat(seat: Seat, seat_count: Seat) -> Seat {
    seat % seat_count + 1
}

/// Split `pool` across seats in proportion to `nominal`.
///
/// Each share starts as the ceiling of its exact proportional value; the
/// rounding surplus is then taken back one chip per seat, starting at
/// `start_seat` and rotating through `1..=seat_count`. The result always sums
/// to `pool` and no share is more than one chip from its exact value.
///
/// ```
/// use std::collections::BTreeMap;
/// use table_audit::proration::prorate;
///
/// let nominal = BTreeMap::from([(1, 100), (2, 100), (3, 100)]);
/// let shares = prorate(&nominal, 100, 2, 5).unwrap();
/// assert_eq!(shares.values().sum::<i64>(), 100);
/// assert_eq!(shares[&1], 34);
/// assert_eq!(shares[&2], 33);
/// ```
pub fn prorate(
    nominal: &BTreeMap<Seat, i64>,
    pool: i64,
    start_seat: Seat,
    seat_count: Seat,
) -> Result<BTreeMap<Seat, i64>, ProrationError> {
    if nominal.is_empty() {
        return Err(ProrationError::Empty);
    }
    if let Some(&seat) = nominal.keys().find(|&&s| s == 0 || s > seat_count) {
        return Err(ProrationError::SeatOutOfRange { seat, seat_count });
    }

    let positive = nominal.values().any(|&v| v > 0);
    let negative = nominal.values().any(|&v| v < 0);
    if positive && negative {
        return Err(ProrationError::MixedSigns);
    }
    let total: i128 = nominal.values().map(|&v| i128::from(v)).sum();
    if total == 0 {
        return Err(ProrationError::ZeroTotal);
    }
    if pool != 0 && (pool > 0) != (total > 0) {
        return Err(ProrationError::MixedSigns);
    }

    let mut shares: BTreeMap<Seat, i64> = nominal
        .iter()
        .map(|(&seat, &amount)| {
            // |amount| <= |total|, so every share lies between 0 and pool
            (seat, ceil_div(i128::from(amount) * i128::from(pool), total) as i64)
        })
        .collect();

    let mut difference = i128::from(pool) - shares.values().map(|&v| i128::from(v)).sum::<i128>();
    let step = difference.signum() as i64;
    let mut seat = start_seat.clamp(1, seat_count);
    while difference != 0 {
        if let Some(share) = shares.get_mut(&seat) {
            *share += step;
            difference -= i128::from(step);
        }
        seat = next_seat(seat, seat_count);
    }

    Ok(shares)
}

/// Ceiling division for signed integers.
fn ceil_div(n: i128, d: i128) -> i128 {
    let (n, d) = if d < 0 { (-n, -d) } else { (n, d) };
    let q = n.div_euclid(d);
    if n.rem_euclid(d) == 0 {
        q
    } else {
        q + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ceil_div_handles_signs() {
        assert_eq!(ceil_div(7, 2), 4);
        assert_eq!(ceil_div(-7, 2), -3);
        assert_eq!(ceil_div(7, -2), -3);
        assert_eq!(ceil_div(-7, -2), 4);
        assert_eq!(ceil_div(6, 3), 2);
    }

    #[test]
    fn rotation_wraps() {
        assert_eq!(next_seat(4, 5), 5);
        assert_eq!(next_seat(5, 5), 1);
    }

    #[test]
    fn exact_split_needs_no_fixup() {
        let nominal = BTreeMap::from([(1, 200), (3, 600)]);
        let shares = prorate(&nominal, 400, 1, 5).unwrap();
        assert_eq!(shares, BTreeMap::from([(1, 100), (3, 300)]));
    }

    #[test]
    fn surplus_is_taken_back_from_start_seat() {
        // three equal claims on 100: ceil gives 34 each, two chips come back
        let nominal = BTreeMap::from([(1, 10), (2, 10), (4, 10)]);
        let shares = prorate(&nominal, 100, 4, 5).unwrap();
        // seat 4 first, 5 is empty, then wraps to 1
        assert_eq!(shares, BTreeMap::from([(1, 33), (2, 34), (4, 33)]));
    }

    #[test]
    fn negative_amounts_prorate_too() {
        let nominal = BTreeMap::from([(2, -300), (3, -100), (5, -200)]);
        // ideal: -250, -83.33, -166.67; ceilings sum to -499
        let shares = prorate(&nominal, -500, 3, 5).unwrap();
        assert_eq!(shares, BTreeMap::from([(2, -250), (3, -84), (5, -166)]));
    }

    #[test]
    fn rejects_bad_input() {
        assert_eq!(prorate(&BTreeMap::new(), 10, 1, 5), Err(ProrationError::Empty));
        assert_eq!(
            prorate(&BTreeMap::from([(1, 0), (2, 0)]), 10, 1, 5),
            Err(ProrationError::ZeroTotal)
        );
        assert_eq!(
            prorate(&BTreeMap::from([(1, 5), (2, -5)]), 10, 1, 5),
            Err(ProrationError::MixedSigns)
        );
        assert_eq!(
            prorate(&BTreeMap::from([(1, 5)]), -10, 1, 5),
            Err(ProrationError::MixedSigns)
        );
        assert_eq!(
            prorate(&BTreeMap::from([(6, 5)]), 10, 1, 5),
            Err(ProrationError::SeatOutOfRange { seat: 6, seat_count: 5 })
        );
    }
}
