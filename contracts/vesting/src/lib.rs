#![no_std]

//! Score-gated vesting.
//!
//! The operator grants one lock per beneficiary, the contract is funded with
//! exactly the granted total, and `initialize` seals the registry. From then
//! on the oracle reports a score in `[0, 100]` once per epoch and every lock
//! releases that percentage of its remaining balance. The engine finalizes
//! once every lock is fully released.

use soroban_sdk::{
    contract, contractimpl, log, panic_with_error, symbol_short, token, Address, Env, Vec,
};

mod epoch;
mod error;
mod release;
mod storage;

pub use epoch::{WindowPolicy, DEFAULT_GRACE_PERIOD_SECS, DEFAULT_SCORING_EPOCH_SECS};
pub use error::Error;
pub use release::SCORE_DENOMINATOR;
pub use storage::{Lock, Phase};

use epoch::{check_window, deadline};
use release::{release_increment, settle_lock};
use storage::{
    has_lock, read_beneficiaries, read_config, read_lock, read_state, write_beneficiaries,
    write_config, write_lock, write_state, Config, EngineState,
};

/// Upper bound on locks. A report writes each lock and pays each beneficiary
/// in one transaction, two ledger entries per lock, and has to stay under the
/// network's per-transaction write-entry limit.
pub const MAX_BENEFICIARIES: u32 = 10;

#[contract]
pub struct VestingContract;

fn require_role(caller: &Address, role: &Address) -> Result<(), Error> {
    caller.require_auth();
    if caller != role {
        return Err(Error::Unauthorized);
    }
    Ok(())
}

/// Single gate for every phase-dependent entry point.
fn require_phase(actual: Phase, expected: Phase) -> Result<(), Error> {
    if actual == expected {
        return Ok(());
    }
    Err(match (expected, actual) {
        (Phase::Configuring, _) => Error::AlreadyInitialized,
        (_, Phase::Finalized) => Error::AlreadyFinalized,
        _ => Error::NotInitialized,
    })
}

fn report(env: &Env, caller: Address, value: u32) -> Result<(), Error> {
    let config = read_config(env)?;
    require_role(&caller, &config.oracle)?;

    let mut state = read_state(env)?;
    require_phase(state.phase, Phase::Initialized)?;

    let now = env.ledger().timestamp();
    if let Err(err) = check_window(
        &config.window,
        config.scoring_epoch_size,
        state.last_update_ts,
        now,
    ) {
        log!(
            env,
            "score update outside window",
            now,
            deadline(state.last_update_ts, config.scoring_epoch_size)
        );
        return Err(err);
    }

    if value > SCORE_DENOMINATOR {
        return Err(Error::ScoreOutOfRange);
    }

    let epoch_number = state
        .epoch_number
        .checked_add(1)
        .ok_or(Error::MathOverflow)?;
    let contract = env.current_contract_address();
    let client = token::Client::new(env, &config.token);

    let mut released_this_epoch = 0_i128;
    let mut all_released = true;
    for beneficiary in read_beneficiaries(env).iter() {
        let mut lock = read_lock(env, &beneficiary)?;
        let increment = settle_lock(&mut lock, value)?;
        write_lock(env, &lock);

        if increment > 0 {
            client.transfer(&contract, &beneficiary, &increment);
            released_this_epoch = released_this_epoch
                .checked_add(increment)
                .ok_or(Error::MathOverflow)?;
            env.events().publish(
                (symbol_short!("released"), beneficiary),
                (caller.clone(), epoch_number, increment, lock.released_amount),
            );
        }

        all_released &= lock.is_fully_released();
    }

    state.released_total = state
        .released_total
        .checked_add(released_this_epoch)
        .ok_or(Error::MathOverflow)?;
    if state.released_total > state.total_vesting_amount {
        return Err(Error::MathOverflow);
    }

    state.last_score = value;
    state.epoch_number = epoch_number;
    state.last_update_ts = now;

    env.events().publish(
        (symbol_short!("score"), epoch_number),
        (caller.clone(), value, released_this_epoch, now),
    );

    if all_released {
        state.phase = Phase::Finalized;
        env.events().publish(
            (symbol_short!("final"), epoch_number),
            (caller, state.released_total, now),
        );
    }

    write_state(env, &state);
    Ok(())
}

#[contractimpl]
impl VestingContract {
    /// Roles, token, epoch length and window policy are fixed here for the
    /// lifetime of the contract.
    pub fn __constructor(
        env: Env,
        owner: Address,
        token: Address,
        operator: Address,
        oracle: Address,
        scoring_epoch_size: u64,
        window: WindowPolicy,
    ) {
        if scoring_epoch_size == 0 || window == WindowPolicy::Windowed(0) {
            panic_with_error!(&env, Error::InvalidArgument);
        }

        write_config(
            &env,
            &Config {
                owner,
                token,
                operator,
                oracle,
                scoring_epoch_size,
                window,
            },
        );
        write_state(&env, &EngineState::new());
        write_beneficiaries(&env, &Vec::new(&env));
    }

    pub fn grant_vesting(
        env: Env,
        caller: Address,
        beneficiary: Address,
        amount: i128,
    ) -> Result<(), Error> {
        let config = read_config(&env)?;
        require_role(&caller, &config.operator)?;

        let mut state = read_state(&env)?;
        require_phase(state.phase, Phase::Configuring)?;

        // The contract's own address stands in for the null identity.
        if amount <= 0 || beneficiary == env.current_contract_address() {
            return Err(Error::InvalidArgument);
        }

        if has_lock(&env, &beneficiary) {
            return Err(Error::DuplicateGrant);
        }

        let mut beneficiaries = read_beneficiaries(&env);
        if beneficiaries.len() >= MAX_BENEFICIARIES {
            return Err(Error::TooManyBeneficiaries);
        }

        state.total_vesting_amount = state
            .total_vesting_amount
            .checked_add(amount)
            .ok_or(Error::MathOverflow)?;

        write_lock(
            &env,
            &Lock {
                beneficiary: beneficiary.clone(),
                total_amount: amount,
                released_amount: 0,
            },
        );
        beneficiaries.push_back(beneficiary.clone());
        write_beneficiaries(&env, &beneficiaries);
        write_state(&env, &state);

        env.events().publish(
            (symbol_short!("granted"), beneficiary),
            (caller, amount, state.total_vesting_amount),
        );

        Ok(())
    }

    /// Seals the registry. The contract must hold exactly the granted total.
    pub fn initialize(env: Env, caller: Address) -> Result<(), Error> {
        let config = read_config(&env)?;
        require_role(&caller, &config.operator)?;

        let mut state = read_state(&env)?;
        require_phase(state.phase, Phase::Configuring)?;

        if state.total_vesting_amount == 0 {
            return Err(Error::NotReady);
        }

        let balance =
            token::Client::new(&env, &config.token).balance(&env.current_contract_address());
        if balance != state.total_vesting_amount {
            log!(
                &env,
                "vesting amount and token balance are different",
                state.total_vesting_amount,
                balance
            );
            return Err(Error::NotReady);
        }

        let now = env.ledger().timestamp();
        state.phase = Phase::Initialized;
        state.epoch_number = 0;
        state.last_update_ts = now;
        write_state(&env, &state);

        env.events().publish(
            (symbol_short!("init"), caller),
            (state.total_vesting_amount, now),
        );

        Ok(())
    }

    /// Releases `score` percent of every lock's remaining balance.
    pub fn update_score(env: Env, caller: Address, score: u32) -> Result<(), Error> {
        report(&env, caller, score)
    }

    /// Same as `update_score`, for deployments whose oracle reports ranks.
    pub fn update_rank(env: Env, caller: Address, rank: u32) -> Result<(), Error> {
        report(&env, caller, rank)
    }

    pub fn locks(env: Env, beneficiary: Address) -> Result<Lock, Error> {
        read_lock(&env, &beneficiary)
    }

    /// Amount a report of `score` would release to `beneficiary` right now.
    pub fn preview_release(env: Env, beneficiary: Address, score: u32) -> Result<i128, Error> {
        let lock = read_lock(&env, &beneficiary)?;
        release_increment(lock.remaining()?, score)
    }

    pub fn beneficiaries(env: Env) -> Vec<Address> {
        read_beneficiaries(&env)
    }

    /// Earliest time the next report is accepted.
    pub fn next_deadline(env: Env) -> Result<u64, Error> {
        let config = read_config(&env)?;
        let state = read_state(&env)?;
        if state.phase == Phase::Configuring {
            return Err(Error::NotInitialized);
        }
        Ok(deadline(state.last_update_ts, config.scoring_epoch_size))
    }

    pub fn phase(env: Env) -> Result<Phase, Error> {
        Ok(read_state(&env)?.phase)
    }

    pub fn initialized(env: Env) -> Result<bool, Error> {
        Ok(read_state(&env)?.phase != Phase::Configuring)
    }

    pub fn finalized(env: Env) -> Result<bool, Error> {
        Ok(read_state(&env)?.phase == Phase::Finalized)
    }

    pub fn total_vesting_amount(env: Env) -> Result<i128, Error> {
        Ok(read_state(&env)?.total_vesting_amount)
    }

    pub fn released_total(env: Env) -> Result<i128, Error> {
        Ok(read_state(&env)?.released_total)
    }

    pub fn last_score(env: Env) -> Result<u32, Error> {
        Ok(read_state(&env)?.last_score)
    }

    pub fn epoch_number(env: Env) -> Result<u32, Error> {
        Ok(read_state(&env)?.epoch_number)
    }

    pub fn last_update_ts(env: Env) -> Result<u64, Error> {
        Ok(read_state(&env)?.last_update_ts)
    }

    pub fn owner(env: Env) -> Result<Address, Error> {
        Ok(read_config(&env)?.owner)
    }

    pub fn token(env: Env) -> Result<Address, Error> {
        Ok(read_config(&env)?.token)
    }

    pub fn operator(env: Env) -> Result<Address, Error> {
        Ok(read_config(&env)?.operator)
    }

    pub fn oracle(env: Env) -> Result<Address, Error> {
        Ok(read_config(&env)?.oracle)
    }

    pub fn scoring_epoch_size(env: Env) -> Result<u64, Error> {
        Ok(read_config(&env)?.scoring_epoch_size)
    }

    pub fn window_policy(env: Env) -> Result<WindowPolicy, Error> {
        Ok(read_config(&env)?.window)
    }
}
