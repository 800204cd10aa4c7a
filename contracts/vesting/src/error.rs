use soroban_sdk::contracterror;

#[contracterror]
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
#[repr(u32)]
pub enum Error {
    /// Reports are not accepted until the operator has called `initialize`.
    NotInitialized = 1,
    /// The registry is sealed; grants and re-initialization are rejected.
    AlreadyInitialized = 2,
    Unauthorized = 3,
    LockNotFound = 4,
    DuplicateGrant = 5,
    InvalidArgument = 6,
    /// No locks were granted, or the contract balance differs from the total granted.
    NotReady = 7,
    AlreadyFinalized = 8,
    EpochNotFinished = 9,
    /// The grace period after the epoch deadline has elapsed.
    WindowClosed = 10,
    ScoreOutOfRange = 11,
    MathOverflow = 12,
    /// The registry already holds `MAX_BENEFICIARIES` locks.
    TooManyBeneficiaries = 13,
}
