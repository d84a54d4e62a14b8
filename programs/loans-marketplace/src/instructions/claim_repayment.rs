use anchor_lang::prelude::*;
use anchor_spl::associated_token::get_associated_token_address;
use anchor_spl::token::{Token, TokenAccount};

use crate::constants::{CONFIG_SEED, LENDER_SHARE_SEED, LOAN_SEED};
use crate::errors::LoanError;
use crate::events::RepaymentClaimed;
use crate::instructions::transfer_from_escrow;
use crate::state::*;

/// Accounts shared by every lender withdrawal from a loan's escrow
#[derive(Accounts)]
pub struct LenderWithdrawal<'info> {
    #[account(
        seeds = [CONFIG_SEED],
        bump = config.bump
    )]
    pub config: Account<'info, Config>,

    #[account(
        mut,
        seeds = [LOAN_SEED, loan.borrower.as_ref(), &loan.loan_id.to_le_bytes()],
        bump = loan.bump
    )]
    pub loan: Account<'info, LoanAccount>,

    #[account(
        mut,
        seeds = [LENDER_SHARE_SEED, loan.key().as_ref(), lender.key().as_ref()],
        bump = lender_share.bump,
        has_one = lender @ LoanError::Unauthorized
    )]
    pub lender_share: Account<'info, LenderShare>,

    #[account(
        mut,
        address = get_associated_token_address(&loan.key(), &config.stable_mint) @ LoanError::InvalidAccount
    )]
    pub escrow: Account<'info, TokenAccount>,

    #[account(
        mut,
        constraint = lender_token.mint == config.stable_mint @ LoanError::InvalidAccount,
        constraint = lender_token.owner == lender.key() @ LoanError::InvalidAccount
    )]
    pub lender_token: Account<'info, TokenAccount>,

    pub lender: Signer<'info>,

    pub token_program: Program<'info, Token>,
}

pub fn handler(ctx: Context<LenderWithdrawal>) -> Result<()> {
    let loan_key = ctx.accounts.loan.key();

    let claim = ctx
        .accounts
        .loan
        .claim_repayment(loan_key, &mut ctx.accounts.lender_share)?;

    transfer_from_escrow(
        &ctx.accounts.token_program,
        &ctx.accounts.escrow,
        &ctx.accounts.lender_token,
        &ctx.accounts.loan,
        claim.total(),
    )?;

    emit!(RepaymentClaimed {
        loan: loan_key,
        lender: ctx.accounts.lender.key(),
        principal: claim.principal,
        interest: claim.interest,
    });

    msg!(
        "Repayment claimed: Loan={}, Principal={}, Interest={}",
        ctx.accounts.loan.loan_id,
        claim.principal,
        claim.interest
    );

    Ok(())
}
