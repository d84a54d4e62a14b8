use anchor_lang::prelude::*;

/// Event emitted when the protocol config is created
#[event]
pub struct ConfigInitialized {
    pub admin: Pubkey,
    pub fee_bps: u16,
    pub stable_mint: Pubkey,
}

/// Event emitted when the admin changes protocol parameters
#[event]
pub struct ConfigUpdated {
    pub admin: Pubkey,
    pub fee_bps: u16,
    pub score_attestor_changed: bool,
}

/// Event emitted when a borrower opens a loan request
#[event]
pub struct LoanCreated {
    pub borrower: Pubkey,
    pub loan: Pubkey,
    pub loan_id: u64,
    pub amount: u64,
    pub term_secs: i64,
    pub max_apr_bps: u32,
    pub min_collateral_bps: u32,
    pub funding_deadline: i64,
}

/// Event emitted when a lender adds principal to a loan
#[event]
pub struct LenderFunded {
    pub loan: Pubkey,
    pub lender: Pubkey,
    pub amount: u64,
    pub lender_principal: u64,
    pub total_funded: u64,
}

/// Event emitted when the borrower stages collateral in escrow
#[event]
pub struct CollateralDeposited {
    pub loan: Pubkey,
    pub borrower: Pubkey,
    pub amount: u64,
    pub total: u64,
}

/// Event emitted when pro-rata shares are frozen
#[event]
pub struct FundingFinalized {
    pub loan: Pubkey,
    pub funded_amount: u64,
    pub actual_apr_bps: u32,
    pub lender_count: u32,
}

/// Event emitted when the borrower receives the principal
#[event]
pub struct LoanDrawn {
    pub loan: Pubkey,
    pub borrower: Pubkey,
    pub principal: u64,
    pub collateral: u64,
    pub start_ts: i64,
    pub due_ts: i64,
}

#[event]
pub struct InterestAccrued {
    pub loan: Pubkey,
    pub interest: u64,
    pub accrued_interest: u64,
    pub timestamp: i64,
}

/// Event emitted for every repayment
#[event]
pub struct Repayment {
    pub loan: Pubkey,
    pub interest: u64,
    pub principal: u64,
    pub fee: u64,
    pub outstanding_principal: u64,
}

#[event]
pub struct RepaymentClaimed {
    pub loan: Pubkey,
    pub lender: Pubkey,
    pub principal: u64,
    pub interest: u64,
}

/// Event emitted when the last principal is repaid
#[event]
pub struct LoanSettled {
    pub loan: Pubkey,
    pub total_repaid_principal: u64,
    pub total_repaid_interest: u64,
    pub collateral_released: u64,
}

/// Event emitted when an overdue loan is defaulted
#[event]
pub struct LoanDefaulted {
    pub loan: Pubkey,
    pub borrower: Pubkey,
    pub caller: Pubkey,
    pub collateral_seized: u64,
    pub outstanding_principal: u64,
    pub outstanding_interest: u64,
}

#[event]
pub struct CollateralClaimed {
    pub loan: Pubkey,
    pub lender: Pubkey,
    pub amount: u64,
    pub pro_rata_bps: u32,
}

#[event]
pub struct FundingRefunded {
    pub loan: Pubkey,
    pub lender: Pubkey,
    pub amount: u64,
    pub total_funded: u64,
}

#[event]
pub struct CollateralWithdrawn {
    pub loan: Pubkey,
    pub borrower: Pubkey,
    pub amount: u64,
}

#[event]
pub struct ScoreAttestationVerified {
    pub subject: Pubkey,
    pub loan: Pubkey,
    pub score: u16,
    pub grade: u8,
    pub expiry_ts: i64,
}
