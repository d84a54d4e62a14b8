use anchor_lang::prelude::*;
use anchor_spl::associated_token::get_associated_token_address;
use anchor_spl::token::{Token, TokenAccount};

use crate::constants::{CONFIG_SEED, LENDER_SHARE_SEED, LOAN_SEED};
use crate::errors::LoanError;
use crate::events::LenderFunded;
use crate::instructions::transfer_from_signer;
use crate::state::*;

#[derive(Accounts)]
pub struct LenderFund<'info> {
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
        init_if_needed,
        payer = lender,
        space = LenderShare::LEN,
        seeds = [LENDER_SHARE_SEED, loan.key().as_ref(), lender.key().as_ref()],
        bump
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

    #[account(mut)]
    pub lender: Signer<'info>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
}

pub fn handler(ctx: Context<LenderFund>, amount: u64) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let loan_key = ctx.accounts.loan.key();
    let lender_key = ctx.accounts.lender.key();

    let loan = &mut ctx.accounts.loan;
    let lender_share = &mut ctx.accounts.lender_share;
    loan.fund(
        loan_key,
        lender_share,
        lender_key,
        ctx.bumps.lender_share,
        amount,
        now,
    )?;

    transfer_from_signer(
        &ctx.accounts.token_program,
        &ctx.accounts.lender_token,
        &ctx.accounts.escrow,
        &ctx.accounts.lender,
        amount,
    )?;

    emit!(LenderFunded {
        loan: loan_key,
        lender: lender_key,
        amount,
        lender_principal: ctx.accounts.lender_share.principal,
        total_funded: ctx.accounts.loan.funded_amount,
    });

    msg!(
        "Loan {} funded: Lender={}, Amount={}, Total={}/{}",
        ctx.accounts.loan.loan_id,
        lender_key,
        amount,
        ctx.accounts.loan.funded_amount,
        ctx.accounts.loan.amount
    );

    Ok(())
}
