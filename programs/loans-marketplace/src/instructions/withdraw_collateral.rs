use anchor_lang::prelude::*;

use crate::events::CollateralWithdrawn;
use crate::instructions::{transfer_from_escrow, Drawdown};

/// The borrower takes back staged collateral from a loan that missed its funding deadline.
/// Uses the same accounts as drawdown: borrower-signed, escrow to borrower.
pub fn handler(ctx: Context<Drawdown>) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;

    let collateral = ctx.accounts.loan.withdraw_expired_collateral(now)?;

    transfer_from_escrow(
        &ctx.accounts.token_program,
        &ctx.accounts.escrow,
        &ctx.accounts.borrower_token,
        &ctx.accounts.loan,
        collateral,
    )?;

    let loan = &ctx.accounts.loan;
    emit!(CollateralWithdrawn {
        loan: loan.key(),
        borrower: loan.borrower,
        amount: collateral,
    });

    msg!("Collateral withdrawn: Loan={}, Amount={}", loan.loan_id, collateral);

    Ok(())
}
