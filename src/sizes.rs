//! Size-string parsing for the CLI collaborator (§6.3).
//!
//! Grammar: `INT ( "" | "kb" | "mb" | "gb" )`, case-insensitive, powers
//! of 1024. Named out of scope for the engine proper (§1), but the CLI
//! binary still needs a concrete parser to satisfy the surface contract.

use crate::error::{GxdError, Result};

const KB: u64 = 1024;
const MB: u64 = KB * 1024;
const GB: u64 = MB * 1024;

pub fn parse_size(input: &str) -> Result<u64> {
    let trimmed = input.trim();
    let lower = trimmed.to_ascii_lowercase();

    let (digits, multiplier) = if let Some(rest) = lower.strip_suffix("gb") {
        (rest, GB)
    } else if let Some(rest) = lower.strip_suffix("mb") {
        (rest, MB)
    } else if let Some(rest) = lower.strip_suffix("kb") {
        (rest, KB)
    } else {
        (lower.as_str(), 1)
    };

    let digits = digits.trim();
    let count: u64 = digits
        .parse()
        .map_err(|_| GxdError::InvalidArgument(format!("not a valid size: '{input}'")))?;

    count
        .checked_mul(multiplier)
        .ok_or_else(|| GxdError::InvalidArgument(format!("size overflow: '{input}'")))
}
