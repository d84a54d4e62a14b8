pub mod accrue_interest;
pub mod claim_repayment;
pub mod create_loan;
pub mod deposit_collateral;
pub mod drawdown;
pub mod finalize_funding;
pub mod initialize_config;
pub mod lender_fund;
pub mod mark_default;
pub mod payout_to_lenders;
pub mod refund_expired_funding;
pub mod repay_loan;
pub mod update_config;
pub mod verify_score_attestation;
pub mod withdraw_collateral;

pub use accrue_interest::*;
pub use claim_repayment::*;
pub use create_loan::*;
pub use deposit_collateral::*;
pub use drawdown::*;
pub use finalize_funding::*;
pub use initialize_config::*;
pub use lender_fund::*;
pub use mark_default::*;
pub use payout_to_lenders::*;
pub use refund_expired_funding::*;
pub use repay_loan::*;
pub use update_config::*;
pub use verify_score_attestation::*;
pub use withdraw_collateral::*;

use anchor_lang::prelude::*;
use anchor_spl::token::{self, Token, TokenAccount, Transfer};

use crate::constants::LOAN_SEED;
use crate::state::LoanAccount;

/// Moves tokens out of an account the signer controls.
pub(crate) fn transfer_from_signer<'info>(
    token_program: &Program<'info, Token>,
    from: &Account<'info, TokenAccount>,
    to: &Account<'info, TokenAccount>,
    authority: &Signer<'info>,
    amount: u64,
) -> Result<()> {
    if amount == 0 {
        return Ok(());
    }

    token::transfer(
        CpiContext::new(
            token_program.to_account_info(),
            Transfer {
                from: from.to_account_info(),
                to: to.to_account_info(),
                authority: authority.to_account_info(),
            },
        ),
        amount,
    )
}

/// Moves tokens out of a loan's escrow, signed by the loan PDA.
pub(crate) fn transfer_from_escrow<'info>(
    token_program: &Program<'info, Token>,
    escrow: &Account<'info, TokenAccount>,
    to: &Account<'info, TokenAccount>,
    loan: &Account<'info, LoanAccount>,
    amount: u64,
) -> Result<()> {
    if amount == 0 {
        return Ok(());
    }

    let loan_id = loan.loan_id.to_le_bytes();
    let bump = [loan.bump];
    let seeds: &[&[u8]] = &[LOAN_SEED, loan.borrower.as_ref(), &loan_id, &bump];

    token::transfer(
        CpiContext::new_with_signer(
            token_program.to_account_info(),
            Transfer {
                from: escrow.to_account_info(),
                to: to.to_account_info(),
                authority: loan.to_account_info(),
            },
            &[seeds],
        ),
        amount,
    )
}
