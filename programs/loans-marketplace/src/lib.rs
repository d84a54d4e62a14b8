use anchor_lang::prelude::*;

declare_id!("BTH9yYvKRBZHXJAPuv724mCMiDcjcnCqef7rDdSZUJWf");

pub mod attestation;
pub mod constants;
pub mod errors;
pub mod events;
pub mod instructions;
pub mod lifecycle;
pub mod math;
pub mod state;

use instructions::*;
use state::*;

#[program]
pub mod loans_marketplace {
    use super::*;

    /// One-time protocol bootstrap
    pub fn initialize_config(
        ctx: Context<InitializeConfig>,
        fee_bps: u16,
        score_attestor: [u8; 64],
    ) -> Result<()> {
        instructions::initialize_config::handler(ctx, fee_bps, score_attestor)
    }

    /// Admin-only parameter changes
    pub fn update_config(
        ctx: Context<UpdateConfig>,
        fee_bps: Option<u16>,
        score_attestor: Option<[u8; 64]>,
    ) -> Result<()> {
        instructions::update_config::handler(ctx, fee_bps, score_attestor)
    }

    /// Open a loan request for funding
    pub fn create_loan_request(
        ctx: Context<CreateLoan>,
        loan_id: u64,
        amount: u64,
        term_secs: i64,
        max_apr_bps: u32,
        min_collateral_bps: u32,
        funding_deadline: i64,
    ) -> Result<()> {
        instructions::create_loan::handler(
            ctx,
            loan_id,
            amount,
            term_secs,
            max_apr_bps,
            min_collateral_bps,
            funding_deadline,
        )
    }

    /// Contribute principal to a loan in funding
    pub fn lender_fund(ctx: Context<LenderFund>, amount: u64) -> Result<()> {
        instructions::lender_fund::handler(ctx, amount)
    }

    /// Stage collateral in the loan escrow
    pub fn deposit_collateral(ctx: Context<DepositCollateral>, amount: u64) -> Result<()> {
        instructions::deposit_collateral::handler(ctx, amount)
    }

    /// Freeze pro-rata shares once the loan is fully funded
    pub fn finalize_funding<'info>(
        ctx: Context<'_, '_, 'info, 'info, FinalizeFunding<'info>>,
    ) -> Result<()> {
        instructions::finalize_funding::handler(ctx)
    }

    /// Release the principal to the borrower
    pub fn drawdown(ctx: Context<Drawdown>) -> Result<()> {
        instructions::drawdown::handler(ctx)
    }

    /// Bring a drawn loan's accrued interest up to date
    pub fn accrue_interest(ctx: Context<AccrueInterest>) -> Result<()> {
        instructions::accrue_interest::handler(ctx)
    }

    /// Repay interest then principal
    pub fn repay_loan(ctx: Context<RepayLoan>, amount: u64) -> Result<()> {
        instructions::repay_loan::handler(ctx, amount)
    }

    /// Withdraw a lender's share of repayments
    pub fn claim_repayment(ctx: Context<LenderWithdrawal>) -> Result<()> {
        instructions::claim_repayment::handler(ctx)
    }

    /// Default a loan past its grace period
    pub fn mark_default(ctx: Context<MarkDefault>) -> Result<()> {
        instructions::mark_default::handler(ctx)
    }

    /// Claim a lender's cut of seized collateral
    pub fn payout_to_lenders(ctx: Context<LenderWithdrawal>) -> Result<()> {
        instructions::payout_to_lenders::handler(ctx)
    }

    /// Return principal from a loan that missed its funding deadline
    pub fn refund_expired_funding(ctx: Context<LenderWithdrawal>) -> Result<()> {
        instructions::refund_expired_funding::handler(ctx)
    }

    /// Return staged collateral from a loan that missed its funding deadline
    pub fn withdraw_collateral(ctx: Context<Drawdown>) -> Result<()> {
        instructions::withdraw_collateral::handler(ctx)
    }

    /// Check a signed credit score claim
    pub fn verify_score_attestation(
        ctx: Context<VerifyScoreAttestation>,
        claim: ScoreClaim,
        signature: [u8; 64],
        recovery_id: u8,
    ) -> Result<u16> {
        instructions::verify_score_attestation::handler(ctx, claim, signature, recovery_id)
    }
}
