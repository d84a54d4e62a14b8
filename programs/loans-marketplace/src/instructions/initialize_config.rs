use anchor_lang::prelude::*;
use anchor_spl::token::Mint;

use crate::constants::{CONFIG_SEED, MAX_FEE_BPS};
use crate::errors::LoanError;
use crate::events::ConfigInitialized;
use crate::state::*;

#[derive(Accounts)]
pub struct InitializeConfig<'info> {
    #[account(
        init,
        payer = admin,
        space = Config::LEN,
        seeds = [CONFIG_SEED],
        bump
    )]
    pub config: Account<'info, Config>,

    pub stable_mint: Account<'info, Mint>,

    #[account(mut)]
    pub admin: Signer<'info>,

    pub system_program: Program<'info, System>,
}

pub fn handler(ctx: Context<InitializeConfig>, fee_bps: u16, score_attestor: [u8; 64]) -> Result<()> {
    require!(fee_bps <= MAX_FEE_BPS, LoanError::InvalidParam);

    let config = &mut ctx.accounts.config;
    config.admin = ctx.accounts.admin.key();
    config.fee_bps = fee_bps;
    config.stable_mint = ctx.accounts.stable_mint.key();
    config.score_attestor = score_attestor;
    config.bump = ctx.bumps.config;

    emit!(ConfigInitialized {
        admin: config.admin,
        fee_bps,
        stable_mint: config.stable_mint,
    });

    msg!("Loans marketplace initialized with fee: {} bps", fee_bps);

    Ok(())
}
