//! Reward settlement: converting a confirmed rating into point awards.
//!
//! The award scales the activity's base points by the rating out of five,
//! rounded half-up. Re-reviews settle as deltas against what the previous
//! rating would have granted; a lowered rating never claws back points
//! already on the ledger -- the ledger only ever moves forward.

/// Points granted for `rating` against an activity worth `base_points`.
///
/// `award = round(base_points × rating / 5)`, clamped to zero for
/// activities that carry no reward.
pub fn award_points(base_points: i32, rating: i32) -> i64 {
    if base_points <= 0 {
        return 0;
    }
    ((f64::from(base_points) * f64::from(rating) / 5.0).round()) as i64
}

/// Outcome of settling one review against the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settlement {
    /// Append a ledger entry for this many points (always positive).
    Grant(i64),
    /// No ledger activity for this review.
    Nothing,
}

impl Settlement {
    /// The entry to append, if any.
    pub fn granted(self) -> Option<i64> {
        match self {
            Settlement::Grant(points) => Some(points),
            Settlement::Nothing => None,
        }
    }
}

/// Settle a review for an activity worth `base_points`.
///
/// First finalization grants the full award for `new_rating` when positive.
/// A re-review grants only the positive delta over the previous rating's
/// award, and only when the rating strictly increased: lowering a rating
/// after finalization leaves the ledger untouched.
pub fn settle(base_points: i32, previous_rating: Option<i32>, new_rating: i32, first_finalization: bool) -> Settlement {
    if base_points <= 0 {
        return Settlement::Nothing;
    }

    let new_award = award_points(base_points, new_rating);

    if first_finalization {
        return if new_award > 0 {
            Settlement::Grant(new_award)
        } else {
            Settlement::Nothing
        };
    }

    match previous_rating {
        Some(previous) if new_rating > previous => {
            let delta = new_award - award_points(base_points, previous);
            if delta > 0 {
                Settlement::Grant(delta)
            } else {
                Settlement::Nothing
            }
        }
        _ => Settlement::Nothing,
    }
}
