use anchor_lang::prelude::*;

use crate::constants::LOAN_SEED;
use crate::events::LoanDefaulted;
use crate::state::*;

/// Permissionless liquidation trigger for loans past due plus grace period.
#[derive(Accounts)]
pub struct MarkDefault<'info> {
    #[account(
        mut,
        seeds = [LOAN_SEED, loan.borrower.as_ref(), &loan.loan_id.to_le_bytes()],
        bump = loan.bump
    )]
    pub loan: Account<'info, LoanAccount>,

    pub caller: Signer<'info>,
}

pub fn handler(ctx: Context<MarkDefault>) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let loan = &mut ctx.accounts.loan;

    loan.mark_default(now)?;

    emit!(LoanDefaulted {
        loan: loan.key(),
        borrower: loan.borrower,
        caller: ctx.accounts.caller.key(),
        collateral_seized: loan.collateral_amount,
        outstanding_principal: loan.outstanding_principal,
        outstanding_interest: loan.accrued_interest,
    });

    msg!("Loan {} marked as defaulted", loan.loan_id);

    Ok(())
}
