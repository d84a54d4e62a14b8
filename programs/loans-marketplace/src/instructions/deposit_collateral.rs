use anchor_lang::prelude::*;
use anchor_spl::associated_token::get_associated_token_address;
use anchor_spl::token::{Token, TokenAccount};

use crate::constants::{CONFIG_SEED, LOAN_SEED};
use crate::errors::LoanError;
use crate::events::CollateralDeposited;
use crate::instructions::transfer_from_signer;
use crate::state::*;

#[derive(Accounts)]
pub struct DepositCollateral<'info> {
    #[account(
        seeds = [CONFIG_SEED],
        bump = config.bump
    )]
    pub config: Account<'info, Config>,

    #[account(
        mut,
        seeds = [LOAN_SEED, borrower.key().as_ref(), &loan.loan_id.to_le_bytes()],
        bump = loan.bump,
        has_one = borrower @ LoanError::Unauthorized
    )]
    pub loan: Account<'info, LoanAccount>,

    #[account(
        mut,
        address = get_associated_token_address(&loan.key(), &config.stable_mint) @ LoanError::InvalidAccount
    )]
    pub escrow: Account<'info, TokenAccount>,

    #[account(
        mut,
        constraint = borrower_token.mint == config.stable_mint @ LoanError::InvalidAccount,
        constraint = borrower_token.owner == borrower.key() @ LoanError::InvalidAccount
    )]
    pub borrower_token: Account<'info, TokenAccount>,

    pub borrower: Signer<'info>,

    pub token_program: Program<'info, Token>,
}

pub fn handler(ctx: Context<DepositCollateral>, amount: u64) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;

    ctx.accounts.loan.deposit_collateral(amount, now)?;

    transfer_from_signer(
        &ctx.accounts.token_program,
        &ctx.accounts.borrower_token,
        &ctx.accounts.escrow,
        &ctx.accounts.borrower,
        amount,
    )?;

    let loan = &ctx.accounts.loan;
    emit!(CollateralDeposited {
        loan: loan.key(),
        borrower: loan.borrower,
        amount,
        total: loan.collateral_amount,
    });

    msg!("Collateral deposited: Loan={}, Amount={}, Total={}", loan.loan_id, amount, loan.collateral_amount);

    Ok(())
}
