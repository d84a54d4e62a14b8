use anchor_lang::prelude::*;
use anchor_spl::associated_token::AssociatedToken;
use anchor_spl::token::{Mint, Token, TokenAccount};

use crate::constants::{CONFIG_SEED, LOAN_SEED};
use crate::errors::LoanError;
use crate::events::LoanCreated;
use crate::lifecycle::LoanTerms;
use crate::state::*;

#[derive(Accounts)]
#[instruction(loan_id: u64)]
pub struct CreateLoan<'info> {
    #[account(
        seeds = [CONFIG_SEED],
        bump = config.bump
    )]
    pub config: Account<'info, Config>,

    #[account(
        init,
        payer = borrower,
        space = LoanAccount::LEN,
        seeds = [
            LOAN_SEED,
            borrower.key().as_ref(),
            &loan_id.to_le_bytes()
        ],
        bump
    )]
    pub loan: Account<'info, LoanAccount>,

    #[account(address = config.stable_mint @ LoanError::InvalidAccount)]
    pub stable_mint: Account<'info, Mint>,

    /// Single escrow for pooled principal and posted collateral. May already
    /// exist, since anyone can create the loan's associated token account.
    #[account(
        init_if_needed,
        payer = borrower,
        associated_token::mint = stable_mint,
        associated_token::authority = loan
    )]
    pub escrow: Account<'info, TokenAccount>,

    #[account(mut)]
    pub borrower: Signer<'info>,

    pub associated_token_program: Program<'info, AssociatedToken>,
    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
}

#[allow(clippy::too_many_arguments)]
pub fn handler(
    ctx: Context<CreateLoan>,
    loan_id: u64,
    amount: u64,
    term_secs: i64,
    max_apr_bps: u32,
    min_collateral_bps: u32,
    funding_deadline: i64,
) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let terms = LoanTerms {
        amount,
        term_secs,
        max_apr_bps,
        min_collateral_bps,
        funding_deadline,
    };

    let loan = LoanAccount::new_request(
        ctx.accounts.borrower.key(),
        loan_id,
        ctx.bumps.loan,
        terms,
        now,
    )?;
    ctx.accounts.loan.set_inner(loan);

    emit!(LoanCreated {
        borrower: ctx.accounts.borrower.key(),
        loan: ctx.accounts.loan.key(),
        loan_id,
        amount,
        term_secs,
        max_apr_bps,
        min_collateral_bps,
        funding_deadline,
    });

    msg!("Loan created: ID={}, Amount={}, Term={}s", loan_id, amount, term_secs);

    Ok(())
}
