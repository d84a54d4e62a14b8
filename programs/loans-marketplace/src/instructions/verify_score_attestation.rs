use anchor_lang::prelude::*;

use crate::constants::CONFIG_SEED;
use crate::events::ScoreAttestationVerified;
use crate::state::*;

#[derive(Accounts)]
pub struct VerifyScoreAttestation<'info> {
    #[account(
        seeds = [CONFIG_SEED],
        bump = config.bump
    )]
    pub config: Account<'info, Config>,
}

/// Read-only. Returns the attested score when the claim is fresh and signed by
/// the configured attestor.
pub fn handler(
    ctx: Context<VerifyScoreAttestation>,
    claim: ScoreClaim,
    signature: [u8; 64],
    recovery_id: u8,
) -> Result<u16> {
    let now = Clock::get()?.unix_timestamp;

    claim.verify(&signature, recovery_id, &ctx.accounts.config.score_attestor, now)?;

    emit!(ScoreAttestationVerified {
        subject: claim.subject,
        loan: claim.loan,
        score: claim.score,
        grade: claim.grade,
        expiry_ts: claim.expiry_ts,
    });

    msg!("Credit score for {}: {}", claim.subject, claim.score);

    Ok(claim.score)
}
