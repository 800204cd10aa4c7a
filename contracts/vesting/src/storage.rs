use soroban_sdk::{contracttype, Address, Env, Vec};

use crate::epoch::WindowPolicy;
use crate::error::Error;

/// Lifecycle of the engine. Transitions only move forward.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[contracttype]
pub enum Phase {
    Configuring = 0,
    Initialized = 1,
    Finalized = 2,
}

/// Allocation held for one beneficiary.
#[derive(Clone, Debug, Eq, PartialEq)]
#[contracttype]
pub struct Lock {
    pub beneficiary: Address,
    pub total_amount: i128,
    pub released_amount: i128,
}

impl Lock {
    pub fn remaining(&self) -> Result<i128, Error> {
        self.total_amount
            .checked_sub(self.released_amount)
            .ok_or(Error::MathOverflow)
    }

    pub fn is_fully_released(&self) -> bool {
        self.released_amount == self.total_amount
    }
}

/// Deployment parameters, written once by the constructor.
#[derive(Clone, Debug)]
#[contracttype]
pub struct Config {
    pub owner: Address,
    pub token: Address,
    pub operator: Address,
    pub oracle: Address,
    pub scoring_epoch_size: u64,
    pub window: WindowPolicy,
}

/// Counters mutated by grants, initialization and reports.
#[derive(Clone, Debug)]
#[contracttype]
pub struct EngineState {
    pub phase: Phase,
    pub total_vesting_amount: i128,
    /// Sum of `released_amount` over every lock.
    pub released_total: i128,
    pub last_score: u32,
    pub epoch_number: u32,
    /// Time of the last accepted report, or of `initialize` before the first one.
    pub last_update_ts: u64,
}

impl EngineState {
    pub fn new() -> Self {
        Self {
            phase: Phase::Configuring,
            total_vesting_amount: 0,
            released_total: 0,
            last_score: 0,
            epoch_number: 0,
            last_update_ts: 0,
        }
    }
}

#[derive(Clone)]
#[contracttype]
enum DataKey {
    Config,
    State,
    /// Beneficiaries in grant order; drives report iteration.
    Beneficiaries,
    Lock(Address),
}

pub fn read_config(env: &Env) -> Result<Config, Error> {
    env.storage()
        .instance()
        .get(&DataKey::Config)
        .ok_or(Error::NotInitialized)
}

pub fn write_config(env: &Env, config: &Config) {
    env.storage().instance().set(&DataKey::Config, config);
}

pub fn read_state(env: &Env) -> Result<EngineState, Error> {
    env.storage()
        .instance()
        .get(&DataKey::State)
        .ok_or(Error::NotInitialized)
}

pub fn write_state(env: &Env, state: &EngineState) {
    env.storage().instance().set(&DataKey::State, state);
}

pub fn read_beneficiaries(env: &Env) -> Vec<Address> {
    env.storage()
        .persistent()
        .get(&DataKey::Beneficiaries)
        .unwrap_or_else(|| Vec::new(env))
}

pub fn write_beneficiaries(env: &Env, beneficiaries: &Vec<Address>) {
    env.storage()
        .persistent()
        .set(&DataKey::Beneficiaries, beneficiaries);
}

pub fn has_lock(env: &Env, beneficiary: &Address) -> bool {
    env.storage()
        .persistent()
        .has(&DataKey::Lock(beneficiary.clone()))
}

pub fn read_lock(env: &Env, beneficiary: &Address) -> Result<Lock, Error> {
    env.storage()
        .persistent()
        .get(&DataKey::Lock(beneficiary.clone()))
        .ok_or(Error::LockNotFound)
}

pub fn write_lock(env: &Env, lock: &Lock) {
    env.storage()
        .persistent()
        .set(&DataKey::Lock(lock.beneficiary.clone()), lock);
}
