//! Soroban `ScVal` decoding for event topics and data.
//!
//! `getEvents` returns each topic and the event value as base64-encoded XDR
//! `ScVal`s. The escrow only publishes a handful of shapes: a `Symbol` plus a
//! `U64` project id as topics, and a `contracttype` struct (an `ScVal::Map`
//! keyed by field-name symbols) as data.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use stellar_xdr::curr::{Limits, ReadXdr, ScMap, ScVal};

use crate::errors::{IndexerError, Result};

/// Decode one base64 XDR `ScVal`.
pub fn decode_base64(b64: &str) -> Result<ScVal> {
    let bytes = STANDARD
        .decode(b64.trim())
        .map_err(|e| IndexerError::EventParse(format!("invalid base64: {e}")))?;
    ScVal::from_xdr(bytes, Limits::none())
        .map_err(|e| IndexerError::EventParse(format!("invalid ScVal XDR: {e}")))
}

pub fn as_symbol(val: &ScVal) -> Option<String> {
    match val {
        ScVal::Symbol(sym) => Some(String::from_utf8_lossy(sym.0.as_slice()).into_owned()),
        _ => None,
    }
}

pub fn as_u64(val: &ScVal) -> Option<u64> {
    match val {
        ScVal::U64(n) => Some(*n),
        ScVal::U32(n) => Some(u64::from(*n)),
        _ => None,
    }
}

pub fn as_i128(val: &ScVal) -> Option<i128> {
    match val {
        ScVal::I128(parts) => Some((i128::from(parts.hi) << 64) | i128::from(parts.lo)),
        ScVal::I64(n) => Some(i128::from(*n)),
        ScVal::U64(n) => Some(i128::from(*n)),
        ScVal::U32(n) => Some(i128::from(*n)),
        ScVal::I32(n) => Some(i128::from(*n)),
        _ => None,
    }
}

/// Strkey form (`G…` account, `C…` contract).
pub fn as_address(val: &ScVal) -> Option<String> {
    match val {
        ScVal::Address(addr) => Some(addr.to_string()),
        _ => None,
    }
}

/// Field of a `contracttype` struct, looked up by name.
pub fn field<'a>(val: &'a ScVal, name: &str) -> Option<&'a ScVal> {
    let ScVal::Map(Some(ScMap(entries))) = val else {
        return None;
    };
    entries
        .iter()
        .find(|entry| as_symbol(&entry.key).as_deref() == Some(name))
        .map(|entry| &entry.val)
}
