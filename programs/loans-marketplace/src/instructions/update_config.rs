use anchor_lang::prelude::*;

use crate::constants::{CONFIG_SEED, MAX_FEE_BPS};
use crate::errors::LoanError;
use crate::events::ConfigUpdated;
use crate::state::*;

#[derive(Accounts)]
pub struct UpdateConfig<'info> {
    #[account(
        mut,
        seeds = [CONFIG_SEED],
        bump = config.bump,
        has_one = admin @ LoanError::Unauthorized
    )]
    pub config: Account<'info, Config>,

    pub admin: Signer<'info>,
}

pub fn handler(
    ctx: Context<UpdateConfig>,
    fee_bps: Option<u16>,
    score_attestor: Option<[u8; 64]>,
) -> Result<()> {
    let config = &mut ctx.accounts.config;

    if let Some(fee) = fee_bps {
        require!(fee <= MAX_FEE_BPS, LoanError::InvalidParam);
        config.fee_bps = fee;
    }

    let score_attestor_changed = score_attestor.is_some();
    if let Some(key) = score_attestor {
        config.score_attestor = key;
    }

    emit!(ConfigUpdated {
        admin: config.admin,
        fee_bps: config.fee_bps,
        score_attestor_changed,
    });

    msg!("Config updated: fee={} bps", config.fee_bps);

    Ok(())
}
