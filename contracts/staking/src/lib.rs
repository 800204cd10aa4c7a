#![no_std]

use soroban_sdk::{
    contract, contracterror, contractimpl, contracttype, log, symbol_short, token, Address, Env,
};

/// 60 days in seconds; staked tokens stay locked at least this long after activation.
pub const WITHDRAWAL_MATURITY_SECS: u64 = 60 * 24 * 60 * 60; // 5_184_000

/// 10 days in seconds between a withdrawal request and the first withdrawal.
pub const COOLDOWN_PERIOD_SECS: u64 = 10 * 24 * 60 * 60; // 864_000

#[contract]
pub struct StakingContract;

#[derive(Clone)]
#[contracttype]
enum DataKey {
    Owner,
    Token,
    /// Activation time; absent until `initialize_staking`.
    InitializedAt,
    TotalSupply,
    Balance(Address),
    WithdrawalRequest(Address),
}

#[contracterror]
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
#[repr(u32)]
pub enum Error {
    AlreadyInitialized = 1,
    Unauthorized = 2,
    InvalidArgument = 3,
    /// Amount exceeds the staked balance, the token balance or the allowance.
    InsufficientBalance = 4,
    WithdrawalDisabled = 5,
    CooldownPending = 6,
    MathOverflow = 7,
    /// Owner or token missing from storage; the constructor never ran.
    NotConfigured = 8,
}

fn read_owner(env: &Env) -> Result<Address, Error> {
    env.storage()
        .instance()
        .get(&DataKey::Owner)
        .ok_or(Error::NotConfigured)
}

fn read_token(env: &Env) -> Result<Address, Error> {
    env.storage()
        .instance()
        .get(&DataKey::Token)
        .ok_or(Error::NotConfigured)
}

fn read_initialized_at(env: &Env) -> Option<u64> {
    env.storage().instance().get(&DataKey::InitializedAt)
}

fn read_total_supply(env: &Env) -> i128 {
    env.storage()
        .instance()
        .get(&DataKey::TotalSupply)
        .unwrap_or(0)
}

fn read_balance(env: &Env, holder: &Address) -> i128 {
    env.storage()
        .persistent()
        .get(&DataKey::Balance(holder.clone()))
        .unwrap_or(0)
}

fn write_balances(env: &Env, holder: &Address, balance: i128, total_supply: i128) {
    env.storage()
        .persistent()
        .set(&DataKey::Balance(holder.clone()), &balance);
    env.storage()
        .instance()
        .set(&DataKey::TotalSupply, &total_supply);
}

fn read_withdrawal_request(env: &Env, holder: &Address) -> Option<u64> {
    env.storage()
        .persistent()
        .get(&DataKey::WithdrawalRequest(holder.clone()))
}

fn withdrawal_enabled(env: &Env) -> bool {
    match read_initialized_at(env) {
        Some(initialized_at) => {
            env.ledger().timestamp() >= initialized_at.saturating_add(WITHDRAWAL_MATURITY_SECS)
        }
        None => false,
    }
}

fn require_withdrawal_enabled(env: &Env) -> Result<(), Error> {
    if !withdrawal_enabled(env) {
        return Err(Error::WithdrawalDisabled);
    }
    Ok(())
}

#[contractimpl]
impl StakingContract {
    pub fn __constructor(env: Env, owner: Address, token: Address) {
        env.storage().instance().set(&DataKey::Owner, &owner);
        env.storage().instance().set(&DataKey::Token, &token);
        env.storage().instance().set(&DataKey::TotalSupply, &0_i128);
    }

    /// Starts the maturity period. Owner only, once.
    pub fn initialize_staking(env: Env, caller: Address) -> Result<u64, Error> {
        caller.require_auth();
        if caller != read_owner(&env)? {
            return Err(Error::Unauthorized);
        }
        if read_initialized_at(&env).is_some() {
            return Err(Error::AlreadyInitialized);
        }

        let now = env.ledger().timestamp();
        env.storage().instance().set(&DataKey::InitializedAt, &now);
        env.events().publish((symbol_short!("init"), caller), now);
        Ok(now)
    }

    pub fn is_withdrawal_enabled(env: Env) -> bool {
        withdrawal_enabled(&env)
    }

    /// Pulls `amount` from `from` using the allowance granted to this contract.
    pub fn stake(env: Env, from: Address, amount: i128) -> Result<i128, Error> {
        from.require_auth();
        if amount <= 0 {
            return Err(Error::InvalidArgument);
        }

        let contract = env.current_contract_address();
        let client = token::Client::new(&env, &read_token(&env)?);
        if client.allowance(&from, &contract) < amount || client.balance(&from) < amount {
            return Err(Error::InsufficientBalance);
        }

        let balance = read_balance(&env, &from)
            .checked_add(amount)
            .ok_or(Error::MathOverflow)?;
        let total_supply = read_total_supply(&env)
            .checked_add(amount)
            .ok_or(Error::MathOverflow)?;

        client.transfer_from(&contract, &from, &contract, &amount);
        write_balances(&env, &from, balance, total_supply);

        env.events().publish(
            (symbol_short!("stake"), from),
            (amount, balance, total_supply),
        );
        Ok(balance)
    }

    pub fn request_withdrawal(env: Env, from: Address) -> Result<u64, Error> {
        from.require_auth();
        require_withdrawal_enabled(&env)?;

        let now = env.ledger().timestamp();
        env.storage()
            .persistent()
            .set(&DataKey::WithdrawalRequest(from.clone()), &now);

        env.events().publish((symbol_short!("wd_req"), from), now);
        Ok(now)
    }

    /// The request stays valid after a withdrawal, so the rest of the balance
    /// can follow without a new cooldown.
    pub fn withdraw(env: Env, from: Address, amount: i128) -> Result<i128, Error> {
        from.require_auth();
        require_withdrawal_enabled(&env)?;

        let now = env.ledger().timestamp();
        let requested_at = read_withdrawal_request(&env, &from).ok_or(Error::CooldownPending)?;
        let unlocks_at = requested_at.saturating_add(COOLDOWN_PERIOD_SECS);
        if now < unlocks_at {
            log!(&env, "cooldown time pending", now, unlocks_at);
            return Err(Error::CooldownPending);
        }

        if amount <= 0 {
            return Err(Error::InvalidArgument);
        }

        let staked = read_balance(&env, &from);
        if amount > staked {
            return Err(Error::InsufficientBalance);
        }

        let balance = staked.checked_sub(amount).ok_or(Error::MathOverflow)?;
        let total_supply = read_total_supply(&env)
            .checked_sub(amount)
            .ok_or(Error::MathOverflow)?;
        write_balances(&env, &from, balance, total_supply);

        token::Client::new(&env, &read_token(&env)?).transfer(
            &env.current_contract_address(),
            &from,
            &amount,
        );

        env.events().publish(
            (symbol_short!("withdraw"), from),
            (amount, balance, total_supply),
        );
        Ok(balance)
    }

    pub fn balance_of(env: Env, holder: Address) -> i128 {
        read_balance(&env, &holder)
    }

    pub fn total_supply(env: Env) -> i128 {
        read_total_supply(&env)
    }

    pub fn withdrawal_request(env: Env, holder: Address) -> Option<u64> {
        read_withdrawal_request(&env, &holder)
    }

    pub fn initialized(env: Env) -> bool {
        read_initialized_at(&env).is_some()
    }

    pub fn initialized_at(env: Env) -> Option<u64> {
        read_initialized_at(&env)
    }

    pub fn owner(env: Env) -> Result<Address, Error> {
        read_owner(&env)
    }

    pub fn token(env: Env) -> Result<Address, Error> {
        read_token(&env)
    }
}
