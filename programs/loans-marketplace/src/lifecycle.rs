//! Loan and lender-share transitions.
//!
//! Every method checks all of its preconditions before touching any field, so a
//! rejected call leaves both accounts exactly as they were. Token movements are
//! returned to the caller, which performs the matching SPL transfers in the same
//! instruction.

use std::ops::DerefMut;

use anchor_lang::prelude::*;

use crate::constants::{GRACE_PERIOD_SECS, MAX_APR_BPS, MAX_LENDERS_PER_LOAN, MIN_TERM_SECS};
use crate::errors::LoanError;
use crate::math;
use crate::state::{LenderShare, LoanAccount, LoanState};

/// Borrower-chosen terms of a loan request
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoanTerms {
    pub amount: u64,
    pub term_secs: i64,
    pub max_apr_bps: u32,
    pub min_collateral_bps: u32,
    pub funding_deadline: i64,
}

impl LoanTerms {
    pub fn validate(&self, now: i64) -> Result<()> {
        require!(self.amount > 0, LoanError::InvalidParam);
        require!(self.term_secs >= MIN_TERM_SECS, LoanError::InvalidParam);
        require!(
            self.max_apr_bps > 0 && self.max_apr_bps <= MAX_APR_BPS,
            LoanError::InvalidParam
        );
        require!(self.min_collateral_bps <= 10_000, LoanError::InvalidParam);
        require!(self.funding_deadline > now, LoanError::InvalidParam);
        Ok(())
    }
}

/// Token movements caused by a repayment
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct RepaymentOutcome {
    pub interest: u64,
    pub principal: u64,
    /// Part of `interest` routed to the fee sink instead of escrow
    pub fee: u64,
    /// Collateral returned to the borrower when the loan settles
    pub collateral_released: u64,
    pub settled: bool,
}

impl RepaymentOutcome {
    /// Amount that lands in escrow for lenders
    pub fn to_escrow(&self) -> u64 {
        self.principal + self.interest - self.fee
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct ClaimOutcome {
    pub principal: u64,
    pub interest: u64,
}

impl ClaimOutcome {
    pub fn total(&self) -> u64 {
        self.principal + self.interest
    }
}

impl LoanAccount {
    /// Creates a loan request already open for funding.
    pub fn new_request(
        borrower: Pubkey,
        loan_id: u64,
        bump: u8,
        terms: LoanTerms,
        now: i64,
    ) -> Result<Self> {
        terms.validate(now)?;

        Ok(Self {
            borrower,
            loan_id,
            bump,
            amount: terms.amount,
            term_secs: terms.term_secs,
            max_apr_bps: terms.max_apr_bps,
            min_collateral_bps: terms.min_collateral_bps,
            funding_deadline: terms.funding_deadline,
            state: LoanState::Funding,
            ..Default::default()
        })
    }

    /// Adds `amount` from `lender`, creating the lender's share on first contribution.
    pub fn fund(
        &mut self,
        loan_key: Pubkey,
        share: &mut LenderShare,
        lender: Pubkey,
        share_bump: u8,
        amount: u64,
        now: i64,
    ) -> Result<()> {
        require!(amount > 0, LoanError::InvalidParam);
        require!(self.state == LoanState::Funding, LoanError::InvalidState);
        require!(now <= self.funding_deadline, LoanError::FundingExpired);

        let new_funded = self
            .funded_amount
            .checked_add(amount)
            .ok_or(LoanError::MathOverflow)?;
        require!(new_funded <= self.amount, LoanError::ExceedsLoanAmount);

        let is_new = share.lender == Pubkey::default();
        if is_new {
            require!(
                self.lender_count < MAX_LENDERS_PER_LOAN,
                LoanError::InvalidParam
            );
        } else {
            require_keys_eq!(share.lender, lender, LoanError::InvalidAccount);
            require_keys_eq!(share.loan, loan_key, LoanError::InvalidAccount);
        }
        let new_principal = share
            .principal
            .checked_add(amount)
            .ok_or(LoanError::MathOverflow)?;

        if is_new {
            share.lender = lender;
            share.loan = loan_key;
            share.bump = share_bump;
            self.lender_count += 1;
        }
        share.principal = new_principal;
        self.funded_amount = new_funded;

        Ok(())
    }

    /// Stages collateral in escrow ahead of drawdown.
    pub fn deposit_collateral(&mut self, amount: u64, now: i64) -> Result<()> {
        require!(amount > 0, LoanError::InvalidParam);
        require!(
            matches!(self.state, LoanState::Funding | LoanState::Funded),
            LoanError::InvalidState
        );
        if self.state == LoanState::Funding {
            require!(now <= self.funding_deadline, LoanError::FundingWindowOver);
        }

        self.collateral_amount = self
            .collateral_amount
            .checked_add(amount)
            .ok_or(LoanError::MathOverflow)?;

        Ok(())
    }

    /// Locks the APR and freezes every lender's pro-rata share.
    ///
    /// `shares` must be the complete set of this loan's shares.
    pub fn finalize_funding<S>(&mut self, loan_key: Pubkey, shares: &mut [S]) -> Result<()>
    where
        S: DerefMut<Target = LenderShare>,
    {
        require!(self.state == LoanState::Funding, LoanError::InvalidState);
        require!(self.funded_amount == self.amount, LoanError::NotFullyFunded);
        require!(
            shares.len() == self.lender_count as usize,
            LoanError::InvalidAccount
        );

        let mut positions: Vec<(Pubkey, u64)> = Vec::with_capacity(shares.len());
        for share in shares.iter() {
            require_keys_eq!(share.loan, loan_key, LoanError::InvalidAccount);
            require!(
                !positions.iter().any(|(lender, _)| *lender == share.lender),
                LoanError::InvalidAccount
            );
            positions.push((share.lender, share.principal));
        }

        let bps = math::pro_rata_shares(&positions, self.funded_amount)?;
        for (share, bps) in shares.iter_mut().zip(bps) {
            share.pro_rata_bps = bps;
        }

        self.actual_apr_bps = self.max_apr_bps;
        self.state = LoanState::Funded;

        Ok(())
    }

    /// Starts the loan clock. Returns the principal to release to the borrower.
    pub fn drawdown(&mut self, now: i64) -> Result<u64> {
        require!(self.state == LoanState::Funded, LoanError::InvalidState);
        require!(
            math::meets_collateral_requirement(
                self.collateral_amount,
                self.funded_amount,
                self.min_collateral_bps
            )?,
            LoanError::InsufficientCollateral
        );
        let due_ts = now
            .checked_add(self.term_secs)
            .ok_or(LoanError::MathOverflow)?;

        self.start_ts = now;
        self.due_ts = due_ts;
        self.last_accrual_ts = now;
        self.outstanding_principal = self.funded_amount;
        self.state = LoanState::Drawn;

        Ok(self.funded_amount)
    }

    /// Interest earned since `last_accrual_ts` that has not been booked yet.
    pub fn pending_interest(&self, now: i64) -> Result<u64> {
        if now <= self.last_accrual_ts {
            return Ok(0);
        }
        math::accrue(
            self.outstanding_principal,
            self.actual_apr_bps,
            now - self.last_accrual_ts,
        )
    }

    /// Books pending interest into `accrued_interest`. Returns the amount booked.
    pub fn accrue_interest(&mut self, now: i64) -> Result<u64> {
        require!(self.state == LoanState::Drawn, LoanError::InvalidState);

        let interest = self.pending_interest(now)?;
        let accrued = self
            .accrued_interest
            .checked_add(interest)
            .ok_or(LoanError::MathOverflow)?;

        self.accrued_interest = accrued;
        if now > self.last_accrual_ts {
            self.last_accrual_ts = now;
        }

        Ok(interest)
    }

    /// Principal plus interest owed at `now`, the exact amount that settles the loan.
    pub fn outstanding_balance(&self, now: i64) -> Result<u64> {
        if self.state != LoanState::Drawn {
            return Ok(0);
        }
        let pending = self.pending_interest(now)?;
        self.outstanding_principal
            .checked_add(self.accrued_interest)
            .and_then(|owed| owed.checked_add(pending))
            .ok_or(error!(LoanError::MathOverflow))
    }

    /// Applies a repayment: accrued interest first, then principal.
    pub fn repay(&mut self, amount: u64, fee_bps: u16, now: i64) -> Result<RepaymentOutcome> {
        require!(amount > 0, LoanError::InvalidParam);
        require!(self.state == LoanState::Drawn, LoanError::InvalidState);

        let accrued = self
            .accrued_interest
            .checked_add(self.pending_interest(now)?)
            .ok_or(LoanError::MathOverflow)?;
        let split = math::split_repayment(amount, accrued, self.outstanding_principal)?;
        let fee = math::protocol_fee(split.interest, fee_bps)?;

        let total_repaid_interest = self
            .total_repaid_interest
            .checked_add(split.interest)
            .ok_or(LoanError::MathOverflow)?;
        let total_repaid_principal = self
            .total_repaid_principal
            .checked_add(split.principal)
            .ok_or(LoanError::MathOverflow)?;
        let total_fees_paid = self
            .total_fees_paid
            .checked_add(fee)
            .ok_or(LoanError::MathOverflow)?;

        self.accrued_interest = accrued - split.interest;
        if now > self.last_accrual_ts {
            self.last_accrual_ts = now;
        }
        self.outstanding_principal -= split.principal;
        self.total_repaid_interest = total_repaid_interest;
        self.total_repaid_principal = total_repaid_principal;
        self.total_fees_paid = total_fees_paid;

        let mut outcome = RepaymentOutcome {
            interest: split.interest,
            principal: split.principal,
            fee,
            ..Default::default()
        };

        if self.outstanding_principal == 0 {
            outcome.collateral_released = self.collateral_amount;
            outcome.settled = true;
            self.collateral_amount = 0;
            self.state = LoanState::Settled;
        }

        Ok(outcome)
    }

    /// First instant at which the loan may be defaulted.
    pub fn default_eligible_after(&self) -> Result<i64> {
        self.due_ts
            .checked_add(GRACE_PERIOD_SECS)
            .ok_or(error!(LoanError::MathOverflow))
    }

    /// Moves an overdue loan to `Defaulted`, freezing its collateral for lenders.
    pub fn mark_default(&mut self, now: i64) -> Result<()> {
        require!(self.state == LoanState::Drawn, LoanError::InvalidState);
        require!(now > self.default_eligible_after()?, LoanError::TooEarly);

        self.accrue_interest(now)?;
        self.state = LoanState::Defaulted;

        Ok(())
    }

    /// Lifecycle status as seen by readers; reports `Delinquent` for an overdue drawn loan.
    pub fn status_at(&self, now: i64) -> LoanState {
        match self.state {
            LoanState::Drawn if now > self.due_ts => LoanState::Delinquent,
            state => state,
        }
    }

    /// Credits `share` with its pro-rata part of everything repaid so far.
    pub fn claim_repayment(&self, loan_key: Pubkey, share: &mut LenderShare) -> Result<ClaimOutcome> {
        require!(
            matches!(
                self.state,
                LoanState::Drawn | LoanState::Settled | LoanState::Defaulted
            ),
            LoanError::InvalidState
        );
        require_keys_eq!(share.loan, loan_key, LoanError::InvalidAccount);

        let interest_pool = self
            .total_repaid_interest
            .checked_sub(self.total_fees_paid)
            .ok_or(LoanError::MathOverflow)?;
        let principal_due = math::bps_of(self.total_repaid_principal, share.pro_rata_bps)?;
        let interest_due = math::bps_of(interest_pool, share.pro_rata_bps)?;

        let outcome = ClaimOutcome {
            principal: principal_due
                .checked_sub(share.repaid_principal)
                .ok_or(LoanError::MathOverflow)?,
            interest: interest_due
                .checked_sub(share.repaid_interest)
                .ok_or(LoanError::MathOverflow)?,
        };
        require!(outcome.total() > 0, LoanError::NothingToClaim);

        share.repaid_principal = principal_due;
        share.repaid_interest = interest_due;

        Ok(outcome)
    }

    /// Marks `share` as paid out of the seized collateral. Returns its cut.
    pub fn claim_collateral(&self, loan_key: Pubkey, share: &mut LenderShare) -> Result<u64> {
        require!(self.state == LoanState::Defaulted, LoanError::InvalidState);
        require_keys_eq!(share.loan, loan_key, LoanError::InvalidAccount);
        require!(!share.collateral_claimed, LoanError::AlreadyClaimed);

        let cut = math::bps_of(self.collateral_amount, share.pro_rata_bps)?;
        share.collateral_claimed = true;

        Ok(cut)
    }

    fn require_funding_expired(&self, now: i64) -> Result<()> {
        require!(self.state == LoanState::Funding, LoanError::InvalidState);
        require!(now > self.funding_deadline, LoanError::TooEarly);
        // A fully funded loan must go through finalize_funding instead
        require!(self.funded_amount < self.amount, LoanError::InvalidState);
        Ok(())
    }

    /// Returns a lender's principal from a loan that missed its funding deadline.
    pub fn refund_expired(&mut self, loan_key: Pubkey, share: &mut LenderShare, now: i64) -> Result<u64> {
        self.require_funding_expired(now)?;
        require_keys_eq!(share.loan, loan_key, LoanError::InvalidAccount);
        require!(share.principal > 0, LoanError::InsufficientFunding);

        let refund = share.principal;
        self.funded_amount = self
            .funded_amount
            .checked_sub(refund)
            .ok_or(LoanError::MathOverflow)?;
        share.principal = 0;

        Ok(refund)
    }

    /// Returns staged collateral from a loan that missed its funding deadline.
    pub fn withdraw_expired_collateral(&mut self, now: i64) -> Result<u64> {
        self.require_funding_expired(now)?;
        require!(self.collateral_amount > 0, LoanError::NothingToClaim);

        let collateral = self.collateral_amount;
        self.collateral_amount = 0;

        Ok(collateral)
    }
}
