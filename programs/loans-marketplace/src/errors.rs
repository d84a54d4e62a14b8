use anchor_lang::prelude::*;

#[error_code]
pub enum LoanError {
    #[msg("Invalid parameter")]
    InvalidParam,

    #[msg("Operation not allowed in the current loan state")]
    InvalidState,

    #[msg("Calculation overflow")]
    MathOverflow,

    #[msg("Funding window is over")]
    FundingWindowOver,

    #[msg("Funding deadline has passed")]
    FundingExpired,

    #[msg("Loan is not fully funded")]
    NotFullyFunded,

    #[msg("Insufficient collateral")]
    InsufficientCollateral,

    #[msg("Too early")]
    TooEarly,

    #[msg("Invalid account")]
    InvalidAccount,

    #[msg("Insufficient funding")]
    InsufficientFunding,

    #[msg("Already claimed")]
    AlreadyClaimed,

    #[msg("Amount exceeds what the loan allows")]
    ExceedsLoanAmount,

    #[msg("Unauthorized access")]
    Unauthorized,

    #[msg("Nothing to claim")]
    NothingToClaim,

    #[msg("Attestation signature does not match the configured attestor")]
    InvalidSignature,

    #[msg("Attestation expired")]
    AttestationExpired,

    #[msg("Attestation revoked")]
    AttestationRevoked,
}
