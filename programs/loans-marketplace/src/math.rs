use anchor_lang::prelude::*;

use crate::constants::{BPS_DENOMINATOR, SECONDS_PER_YEAR};
use crate::errors::LoanError;

/// Simple (non-compounding) interest on `principal` at `apr_bps` over `elapsed_secs`.
///
/// `floor(principal * apr_bps * elapsed_secs / (10_000 * SECONDS_PER_YEAR))`
pub fn accrue(principal: u64, apr_bps: u32, elapsed_secs: i64) -> Result<u64> {
    require!(elapsed_secs >= 0, LoanError::InvalidParam);

    if principal == 0 || apr_bps == 0 || elapsed_secs == 0 {
        return Ok(0);
    }

    let numerator = (principal as u128)
        .checked_mul(apr_bps as u128)
        .ok_or(LoanError::MathOverflow)?
        .checked_mul(elapsed_secs as u128)
        .ok_or(LoanError::MathOverflow)?;
    let denominator = (BPS_DENOMINATOR as u128)
        .checked_mul(SECONDS_PER_YEAR as u128)
        .ok_or(LoanError::MathOverflow)?;

    u64::try_from(numerator / denominator).map_err(|_| error!(LoanError::MathOverflow))
}

/// `floor(amount * bps / 10_000)`
pub fn bps_of(amount: u64, bps: u32) -> Result<u64> {
    let scaled = (amount as u128)
        .checked_mul(bps as u128)
        .ok_or(LoanError::MathOverflow)?
        / BPS_DENOMINATOR as u128;

    u64::try_from(scaled).map_err(|_| error!(LoanError::MathOverflow))
}

/// `collateral * 10_000 >= funded * min_collateral_bps`, evaluated without rounding
pub fn meets_collateral_requirement(
    collateral: u64,
    funded: u64,
    min_collateral_bps: u32,
) -> Result<bool> {
    let posted = (collateral as u128)
        .checked_mul(BPS_DENOMINATOR as u128)
        .ok_or(LoanError::MathOverflow)?;
    let required = (funded as u128)
        .checked_mul(min_collateral_bps as u128)
        .ok_or(LoanError::MathOverflow)?;

    Ok(posted >= required)
}

/// Pro-rata basis points for each `(lender, principal)` position.
///
/// Each share is `floor(principal * 10_000 / funded)`. The leftover basis points
/// go to the largest principal, ties broken by the smallest lender key, so the
/// result always sums to exactly 10_000 regardless of input order.
pub fn pro_rata_shares(positions: &[(Pubkey, u64)], funded: u64) -> Result<Vec<u32>> {
    require!(funded > 0 && !positions.is_empty(), LoanError::InvalidParam);

    let mut total: u64 = 0;
    for (_, principal) in positions {
        total = total.checked_add(*principal).ok_or(LoanError::MathOverflow)?;
    }
    require!(total == funded, LoanError::InvalidAccount);

    let mut shares = Vec::with_capacity(positions.len());
    let mut assigned: u64 = 0;
    for (_, principal) in positions {
        let bps = (*principal as u128)
            .checked_mul(BPS_DENOMINATOR as u128)
            .ok_or(LoanError::MathOverflow)?
            / funded as u128;
        // principal <= funded, so bps <= 10_000
        let bps = bps as u32;
        assigned += bps as u64;
        shares.push(bps);
    }

    let remainder = BPS_DENOMINATOR
        .checked_sub(assigned)
        .ok_or(LoanError::MathOverflow)?;
    if remainder > 0 {
        let (absorber, _) = positions
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.1.cmp(&b.1).then_with(|| b.0.cmp(&a.0)))
            .ok_or(LoanError::InvalidParam)?;
        shares[absorber] += remainder as u32;
    }

    Ok(shares)
}

/// How a repayment is applied: interest first, then principal
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct RepaymentSplit {
    pub interest: u64,
    pub principal: u64,
}

pub fn split_repayment(
    amount: u64,
    accrued_interest: u64,
    outstanding_principal: u64,
) -> Result<RepaymentSplit> {
    require!(amount > 0, LoanError::InvalidParam);

    let total_due = accrued_interest
        .checked_add(outstanding_principal)
        .ok_or(LoanError::MathOverflow)?;
    require!(amount <= total_due, LoanError::ExceedsLoanAmount);

    let interest = amount.min(accrued_interest);
    Ok(RepaymentSplit {
        interest,
        principal: amount - interest,
    })
}

/// Protocol fee charged on the interest portion of a repayment
pub fn protocol_fee(interest: u64, fee_bps: u16) -> Result<u64> {
    bps_of(interest, fee_bps as u32)
}
