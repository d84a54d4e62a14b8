use anchor_lang::prelude::*;

/// Protocol-wide configuration singleton
#[account]
pub struct Config {
    pub admin: Pubkey,
    pub fee_bps: u16,
    pub stable_mint: Pubkey,
    /// Uncompressed secp256k1 public key (x || y) of the credit score attestor
    pub score_attestor: [u8; 64],
    pub bump: u8,
}

impl Config {
    pub const LEN: usize = 8 + 32 + 2 + 32 + 64 + 1;
}

/// One loan request per (borrower, loan_id)
#[account]
#[derive(Default, Debug)]
pub struct LoanAccount {
    pub borrower: Pubkey,
    pub loan_id: u64,
    pub bump: u8,

    // Terms, fixed at creation
    pub amount: u64,
    pub term_secs: i64,
    pub max_apr_bps: u32,
    pub min_collateral_bps: u32,
    pub funding_deadline: i64,

    pub state: LoanState,
    pub funded_amount: u64,
    pub collateral_amount: u64,
    pub lender_count: u32,

    pub actual_apr_bps: u32,
    pub start_ts: i64,
    pub due_ts: i64,

    pub last_accrual_ts: i64,
    pub accrued_interest: u64,
    pub outstanding_principal: u64,

    pub total_repaid_principal: u64,
    pub total_repaid_interest: u64,
    pub total_fees_paid: u64,
}

impl LoanAccount {
    pub const LEN: usize = 8
        + 32 + 8 + 1
        + 8 + 8 + 4 + 4 + 8
        + 1 + 8 + 8 + 4
        + 4 + 8 + 8
        + 8 + 8 + 8
        + 8 + 8 + 8;
}

/// A lender's position in one loan
#[account]
#[derive(Default, Debug)]
pub struct LenderShare {
    pub lender: Pubkey,
    pub loan: Pubkey,
    pub principal: u64,
    pub repaid_principal: u64,
    pub repaid_interest: u64,
    /// Frozen at finalize_funding; all shares of a loan sum to 10_000
    pub pro_rata_bps: u32,
    pub collateral_claimed: bool,
    pub bump: u8,
}

impl LenderShare {
    pub const LEN: usize = 8 + 32 + 32 + 8 + 8 + 8 + 4 + 1 + 1;
}

/// Loan lifecycle state.
///
/// `Delinquent` is a read-only status reported by `LoanAccount::status_at`;
/// it is never written to an account.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum LoanState {
    #[default]
    Created,
    Funding,
    Funded,
    Drawn,
    Delinquent,
    Defaulted,
    Settled,
}

/// Off-chain credit score claim signed by the score attestor
#[derive(AnchorSerialize, AnchorDeserialize, Clone, PartialEq, Eq, Debug)]
pub struct ScoreClaim {
    pub subject: Pubkey,
    pub loan: Pubkey,
    pub score: u16,
    pub grade: u8,
    pub pd_bps: u32,
    pub recommended_min_collateral_bps: u16,
    pub attestor: Pubkey,
    pub posted_at: i64,
    pub expiry_ts: i64,
    pub revoked: bool,
}

/// KYC / proof-of-personhood style claim issued by an identity provider
#[derive(AnchorSerialize, AnchorDeserialize, Clone, PartialEq, Eq, Debug)]
pub struct IdentityAttestation {
    pub subject: Pubkey,
    pub schema_id: u8,
    pub claim_hash: [u8; 32],
    pub issuer: Pubkey,
    pub issued_at: i64,
    pub expiry_ts: i64,
    pub revoked: bool,
}
