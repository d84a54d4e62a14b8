use anchor_lang::prelude::*;

use crate::constants::LOAN_SEED;
use crate::events::InterestAccrued;
use crate::state::*;

/// Permissionless refresh of a drawn loan's accrued interest.
#[derive(Accounts)]
pub struct AccrueInterest<'info> {
    #[account(
        mut,
        seeds = [LOAN_SEED, loan.borrower.as_ref(), &loan.loan_id.to_le_bytes()],
        bump = loan.bump
    )]
    pub loan: Account<'info, LoanAccount>,
}

pub fn handler(ctx: Context<AccrueInterest>) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let loan = &mut ctx.accounts.loan;

    let interest = loan.accrue_interest(now)?;

    emit!(InterestAccrued {
        loan: loan.key(),
        interest,
        accrued_interest: loan.accrued_interest,
        timestamp: now,
    });

    Ok(())
}
