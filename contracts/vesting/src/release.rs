use crate::error::Error;
use crate::storage::Lock;

/// Scores are percentages of the remaining allocation.
pub const SCORE_DENOMINATOR: u32 = 100;

/// `floor(remaining * score / 100)`, multiplied before dividing so small
/// remainders are not truncated to zero.
pub fn release_increment(remaining: i128, score: u32) -> Result<i128, Error> {
    if score > SCORE_DENOMINATOR {
        return Err(Error::ScoreOutOfRange);
    }
    if remaining < 0 {
        return Err(Error::MathOverflow);
    }

    remaining
        .checked_mul(i128::from(score))
        .ok_or(Error::MathOverflow)?
        .checked_div(i128::from(SCORE_DENOMINATOR))
        .ok_or(Error::MathOverflow)
}

/// Applies one epoch's score to `lock` and returns the amount released.
pub fn settle_lock(lock: &mut Lock, score: u32) -> Result<i128, Error> {
    let remaining = lock.remaining()?;
    let increment = release_increment(remaining, score)?;

    lock.released_amount = lock
        .released_amount
        .checked_add(increment)
        .ok_or(Error::MathOverflow)?;

    if lock.released_amount > lock.total_amount {
        return Err(Error::MathOverflow);
    }

    Ok(increment)
}
