use anchor_lang::prelude::*;
use anchor_spl::associated_token::get_associated_token_address;
use anchor_spl::token::{Token, TokenAccount};

use crate::constants::{CONFIG_SEED, LOAN_SEED};
use crate::errors::LoanError;
use crate::events::LoanDrawn;
use crate::instructions::transfer_from_escrow;
use crate::state::*;

#[derive(Accounts)]
pub struct Drawdown<'info> {
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

pub fn handler(ctx: Context<Drawdown>) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;

    let principal = ctx.accounts.loan.drawdown(now)?;

    transfer_from_escrow(
        &ctx.accounts.token_program,
        &ctx.accounts.escrow,
        &ctx.accounts.borrower_token,
        &ctx.accounts.loan,
        principal,
    )?;

    let loan = &ctx.accounts.loan;
    emit!(LoanDrawn {
        loan: loan.key(),
        borrower: loan.borrower,
        principal,
        collateral: loan.collateral_amount,
        start_ts: loan.start_ts,
        due_ts: loan.due_ts,
    });

    msg!("Loan {} drawn: Principal={}, Due={}", loan.loan_id, principal, loan.due_ts);

    Ok(())
}
