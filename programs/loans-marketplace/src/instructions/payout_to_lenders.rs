use anchor_lang::prelude::*;

use crate::events::CollateralClaimed;
use crate::instructions::{transfer_from_escrow, LenderWithdrawal};

/// A lender pulls its pro-rata cut of a defaulted loan's collateral.
pub fn handler(ctx: Context<LenderWithdrawal>) -> Result<()> {
    let loan_key = ctx.accounts.loan.key();

    let cut = ctx
        .accounts
        .loan
        .claim_collateral(loan_key, &mut ctx.accounts.lender_share)?;

    transfer_from_escrow(
        &ctx.accounts.token_program,
        &ctx.accounts.escrow,
        &ctx.accounts.lender_token,
        &ctx.accounts.loan,
        cut,
    )?;

    emit!(CollateralClaimed {
        loan: loan_key,
        lender: ctx.accounts.lender.key(),
        amount: cut,
        pro_rata_bps: ctx.accounts.lender_share.pro_rata_bps,
    });

    msg!("Collateral claimed: Loan={}, Amount={}", ctx.accounts.loan.loan_id, cut);

    Ok(())
}
