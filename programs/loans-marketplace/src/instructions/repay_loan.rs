use anchor_lang::prelude::*;
use anchor_spl::associated_token::get_associated_token_address;
use anchor_spl::token::{Token, TokenAccount};

use crate::constants::{CONFIG_SEED, LOAN_SEED};
use crate::errors::LoanError;
use crate::events::{LoanSettled, Repayment};
use crate::instructions::{transfer_from_escrow, transfer_from_signer};
use crate::state::*;

#[derive(Accounts)]
pub struct RepayLoan<'info> {
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

    /// Protocol fee sink owned by the admin
    #[account(
        mut,
        constraint = fee_vault.mint == config.stable_mint @ LoanError::InvalidAccount,
        constraint = fee_vault.owner == config.admin @ LoanError::InvalidAccount
    )]
    pub fee_vault: Account<'info, TokenAccount>,

    pub borrower: Signer<'info>,

    pub token_program: Program<'info, Token>,
}

pub fn handler(ctx: Context<RepayLoan>, amount: u64) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let fee_bps = ctx.accounts.config.fee_bps;

    let outcome = ctx.accounts.loan.repay(amount, fee_bps, now)?;

    transfer_from_signer(
        &ctx.accounts.token_program,
        &ctx.accounts.borrower_token,
        &ctx.accounts.escrow,
        &ctx.accounts.borrower,
        outcome.to_escrow(),
    )?;
    transfer_from_signer(
        &ctx.accounts.token_program,
        &ctx.accounts.borrower_token,
        &ctx.accounts.fee_vault,
        &ctx.accounts.borrower,
        outcome.fee,
    )?;
    if outcome.settled {
        transfer_from_escrow(
            &ctx.accounts.token_program,
            &ctx.accounts.escrow,
            &ctx.accounts.borrower_token,
            &ctx.accounts.loan,
            outcome.collateral_released,
        )?;
    }

    let loan = &ctx.accounts.loan;
    emit!(Repayment {
        loan: loan.key(),
        interest: outcome.interest,
        principal: outcome.principal,
        fee: outcome.fee,
        outstanding_principal: loan.outstanding_principal,
    });

    msg!(
        "Repayment recorded: Loan={}, Interest={}, Principal={}, Fee={}",
        loan.loan_id,
        outcome.interest,
        outcome.principal,
        outcome.fee
    );

    if outcome.settled {
        emit!(LoanSettled {
            loan: loan.key(),
            total_repaid_principal: loan.total_repaid_principal,
            total_repaid_interest: loan.total_repaid_interest,
            collateral_released: outcome.collateral_released,
        });

        msg!("Loan {} settled", loan.loan_id);
    }

    Ok(())
}
