use soroban_sdk::contracttype;

use crate::error::Error;

/// One day in seconds; grace period of the original deployment.
pub const DEFAULT_GRACE_PERIOD_SECS: u64 = 24 * 60 * 60;

/// 60 days in seconds; epoch length of the original deployment.
pub const DEFAULT_SCORING_EPOCH_SECS: u64 = 60 * 24 * 60 * 60; // 5_184_000

/// When a report for the current epoch may be submitted.
#[derive(Clone, Debug, Eq, PartialEq)]
#[contracttype]
pub enum WindowPolicy {
    /// Any time at or after the deadline.
    Open,
    /// Between the deadline and `deadline + grace`, both inclusive.
    Windowed(u64),
}

impl WindowPolicy {
    fn grace_period(&self) -> u64 {
        match self {
            WindowPolicy::Open => u64::MAX,
            WindowPolicy::Windowed(grace) => *grace,
        }
    }
}

pub fn deadline(last_update_ts: u64, scoring_epoch_size: u64) -> u64 {
    last_update_ts.saturating_add(scoring_epoch_size)
}

/// Checks `deadline <= now <= deadline + grace`.
pub fn check_window(
    policy: &WindowPolicy,
    scoring_epoch_size: u64,
    last_update_ts: u64,
    now: u64,
) -> Result<(), Error> {
    let opens_at = deadline(last_update_ts, scoring_epoch_size);
    if now < opens_at {
        return Err(Error::EpochNotFinished);
    }

    let closes_at = opens_at.saturating_add(policy.grace_period());
    if now > closes_at {
        return Err(Error::WindowClosed);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPOCH: u64 = 1_000;
    const GRACE: u64 = 100;

    #[test]
    fn windowed_bounds_are_inclusive() {
        let policy = WindowPolicy::Windowed(GRACE);
        assert_eq!(
            check_window(&policy, EPOCH, 50, 50 + EPOCH - 1),
            Err(Error::EpochNotFinished)
        );
        assert_eq!(check_window(&policy, EPOCH, 50, 50 + EPOCH), Ok(()));
        assert_eq!(check_window(&policy, EPOCH, 50, 50 + EPOCH + GRACE), Ok(()));
        assert_eq!(
            check_window(&policy, EPOCH, 50, 50 + EPOCH + GRACE + 1),
            Err(Error::WindowClosed)
        );
    }

    #[test]
    fn open_policy_never_closes() {
        let policy = WindowPolicy::Open;
        assert_eq!(
            check_window(&policy, EPOCH, 0, EPOCH - 1),
            Err(Error::EpochNotFinished)
        );
        assert_eq!(check_window(&policy, EPOCH, 0, EPOCH), Ok(()));
        assert_eq!(check_window(&policy, EPOCH, 0, u64::MAX), Ok(()));
    }

    #[test]
    fn deadline_saturates() {
        assert_eq!(deadline(u64::MAX - 1, EPOCH), u64::MAX);
        assert_eq!(
            check_window(&WindowPolicy::Windowed(GRACE), EPOCH, u64::MAX - 1, u64::MAX),
            Ok(())
        );
    }
}
