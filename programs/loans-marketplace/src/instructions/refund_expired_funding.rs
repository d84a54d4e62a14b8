use anchor_lang::prelude::*;

use crate::events::FundingRefunded;
use crate::instructions::{transfer_from_escrow, LenderWithdrawal};

/// A lender takes back its principal from a loan that missed its funding deadline.
pub fn handler(ctx: Context<LenderWithdrawal>) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let loan_key = ctx.accounts.loan.key();

    let refund = ctx
        .accounts
        .loan
        .refund_expired(loan_key, &mut ctx.accounts.lender_share, now)?;

    transfer_from_escrow(
        &ctx.accounts.token_program,
        &ctx.accounts.escrow,
        &ctx.accounts.lender_token,
        &ctx.accounts.loan,
        refund,
    )?;

    emit!(FundingRefunded {
        loan: loan_key,
        lender: ctx.accounts.lender.key(),
        amount: refund,
        total_funded: ctx.accounts.loan.funded_amount,
    });

    msg!("Funding refunded: Loan={}, Amount={}", ctx.accounts.loan.loan_id, refund);

    Ok(())
}
