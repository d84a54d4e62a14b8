use anchor_lang::prelude::*;
use anchor_lang::AccountsExit;

use crate::constants::{LENDER_SHARE_SEED, LOAN_SEED};
use crate::errors::LoanError;
use crate::events::FundingFinalized;
use crate::state::*;

/// Permissionless. Every `LenderShare` of the loan is passed as a writable
/// remaining account.
#[derive(Accounts)]
pub struct FinalizeFunding<'info> {
    #[account(
        mut,
        seeds = [LOAN_SEED, loan.borrower.as_ref(), &loan.loan_id.to_le_bytes()],
        bump = loan.bump
    )]
    pub loan: Account<'info, LoanAccount>,

    pub caller: Signer<'info>,
}

/// Share PDA rebuilt from its stored bump.
fn share_address(program_id: &Pubkey, loan: &Pubkey, lender: &Pubkey, bump: u8) -> Result<Pubkey> {
    Pubkey::create_program_address(
        &[LENDER_SHARE_SEED, loan.as_ref(), lender.as_ref(), &[bump]],
        program_id,
    )
    .map_err(|_| error!(LoanError::InvalidAccount))
}

pub fn handler<'info>(ctx: Context<'_, '_, 'info, 'info, FinalizeFunding<'info>>) -> Result<()> {
    let loan_key = ctx.accounts.loan.key();

    let mut shares: Vec<Account<'info, LenderShare>> =
        Vec::with_capacity(ctx.remaining_accounts.len());
    for info in ctx.remaining_accounts.iter() {
        require!(info.is_writable, LoanError::InvalidAccount);
        let share: Account<'info, LenderShare> = Account::try_from(info)?;
        let expected = share_address(ctx.program_id, &loan_key, &share.lender, share.bump)?;
        require_keys_eq!(info.key(), expected, LoanError::InvalidAccount);
        shares.push(share);
    }

    ctx.accounts
        .loan
        .finalize_funding(loan_key, shares.as_mut_slice())?;

    // remaining accounts are not persisted by the framework
    for share in shares.iter() {
        share.exit(ctx.program_id)?;
    }

    let loan = &ctx.accounts.loan;
    emit!(FundingFinalized {
        loan: loan_key,
        funded_amount: loan.funded_amount,
        actual_apr_bps: loan.actual_apr_bps,
        lender_count: loan.lender_count,
    });

    msg!(
        "Loan {} funding finalized: Amount={}, APR={} bps, Lenders={}",
        loan.loan_id,
        loan.funded_amount,
        loan.actual_apr_bps,
        loan.lender_count
    );

    Ok(())
}
