//! # Token ledger
//!
//! The escrow never moves money itself: custody lives in an external token
//! contract implementing the standard Soroban token interface. This module is
//! the only place that calls it.
//!
//! All calls go through the fallible `try_*` client methods. A rejected
//! transfer (insufficient balance or allowance, frozen account, non-token
//! contract) comes back as [`Error::TransferFailed`] rather than trapping, so
//! callers can report it by kind. Returning that error from an entry point
//! still aborts the invocation, which rolls back any bookkeeping already
//! written in it.

use soroban_sdk::{token, Address, Env};

use crate::Error;

/// Pull `amount` from `from` into contract custody.
///
/// Uses `transfer_from` with the contract as spender, so `from` must have
/// approved at least `amount` beforehand.
pub fn debit(env: &Env, token: &Address, from: &Address, amount: i128) -> Result<(), Error> {
    let custody = env.current_contract_address();
    match token::Client::new(env, token).try_transfer_from(&custody, from, &custody, &amount) {
        Ok(Ok(())) => Ok(()),
        _ => Err(Error::TransferFailed),
    }
}

/// Push `amount` out of contract custody to `to`.
pub fn credit(env: &Env, token: &Address, to: &Address, amount: i128) -> Result<(), Error> {
    let custody = env.current_contract_address();
    match token::Client::new(env, token).try_transfer(&custody, to, &amount) {
        Ok(Ok(())) => Ok(()),
        _ => Err(Error::TransferFailed),
    }
}

/// Whether `token` answers the token interface.
pub fn is_usable(env: &Env, token: &Address) -> bool {
    matches!(token::Client::new(env, token).try_decimals(), Ok(Ok(_)))
}
