pub const CONFIG_SEED: &[u8] = b"config";
pub const LOAN_SEED: &[u8] = b"loan";
pub const LENDER_SHARE_SEED: &[u8] = b"lender_share";

/// 100% expressed in basis points
pub const BPS_DENOMINATOR: u64 = 10_000;

pub const SECONDS_PER_DAY: i64 = 24 * 60 * 60;
pub const SECONDS_PER_YEAR: i64 = 365 * SECONDS_PER_DAY;

/// Time after `due_ts` during which a drawn loan cannot be defaulted
pub const GRACE_PERIOD_SECS: i64 = 7 * SECONDS_PER_DAY;

pub const MIN_TERM_SECS: i64 = SECONDS_PER_DAY;
pub const MAX_APR_BPS: u32 = 10_000; // 100%
pub const MAX_FEE_BPS: u16 = 1_000; // 10% of interest

/// Upper bound on distinct lenders so finalize_funding fits in one transaction
pub const MAX_LENDERS_PER_LOAN: u32 = 24;
