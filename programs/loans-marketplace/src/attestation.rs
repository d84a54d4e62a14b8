//! Advisory checks on externally signed credit and identity claims.
//!
//! Nothing here gates a loan transition; lender-facing tooling calls these to
//! decide whether to trust a borrower's score.

use anchor_lang::prelude::*;
use solana_program::keccak;
use solana_program::secp256k1_recover::secp256k1_recover;

use crate::errors::LoanError;
use crate::state::{IdentityAttestation, ScoreClaim};

/// Digest the attestor signs: `keccak256(subject || u64be(score) || u64be(posted_at))`
pub fn score_message_hash(subject: &Pubkey, score: u16, posted_at: i64) -> [u8; 32] {
    keccak::hashv(&[
        subject.as_ref(),
        &u64::from(score).to_be_bytes(),
        &(posted_at as u64).to_be_bytes(),
    ])
    .to_bytes()
}

impl ScoreClaim {
    pub fn is_fresh(&self, now: i64) -> bool {
        !self.revoked && self.expiry_ts > now
    }

    /// Checks freshness, then that `signature` recovers to `attestor_key`.
    pub fn verify(
        &self,
        signature: &[u8; 64],
        recovery_id: u8,
        attestor_key: &[u8; 64],
        now: i64,
    ) -> Result<()> {
        require!(!self.revoked, LoanError::AttestationRevoked);
        require!(self.expiry_ts > now, LoanError::AttestationExpired);

        let hash = score_message_hash(&self.subject, self.score, self.posted_at);
        let recovered = secp256k1_recover(&hash, recovery_id, signature)
            .map_err(|_| error!(LoanError::InvalidSignature))?;
        require!(
            recovered.to_bytes() == *attestor_key,
            LoanError::InvalidSignature
        );

        Ok(())
    }
}

impl IdentityAttestation {
    pub fn is_valid(&self, now: i64) -> bool {
        !self.revoked && self.expiry_ts > now
    }
}
