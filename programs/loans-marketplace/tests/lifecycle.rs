//! End-to-end loan lifecycles driven through the same transitions the program
//! instructions call, with token movements applied to an in-memory ledger.

use std::collections::HashMap;

use anchor_lang::prelude::Pubkey;
use loans_marketplace::constants::{GRACE_PERIOD_SECS, SECONDS_PER_DAY};
use loans_marketplace::errors::LoanError;
use loans_marketplace::lifecycle::LoanTerms;
use loans_marketplace::state::{LenderShare, LoanAccount, LoanState};

const NOW: i64 = 1_700_000_000;
const USDC: u64 = 1_000_000;
const FEE_BPS: u16 = 1_000;

type TxResult<T> = std::result::Result<T, anchor_lang::error::Error>;

fn err(e: LoanError) -> anchor_lang::error::Error {
    e.into()
}

/// Token balances keyed by owner. Transfers are all-or-nothing.
#[derive(Default)]
struct Ledger {
    balances: HashMap<Pubkey, u64>,
}

impl Ledger {
    fn mint(&mut self, owner: Pubkey, amount: u64) {
        *self.balances.entry(owner).or_default() += amount;
    }

    fn balance(&self, owner: &Pubkey) -> u64 {
        self.balances.get(owner).copied().unwrap_or_default()
    }

    fn transfer(&mut self, from: Pubkey, to: Pubkey, amount: u64) -> TxResult<()> {
        if amount == 0 {
            return Ok(());
        }
        let available = self.balance(&from);
        if available < amount {
            // stands in for the token program's insufficient-funds failure
            return Err(err(LoanError::InsufficientFunding));
        }
        self.balances.insert(from, available - amount);
        self.mint(to, amount);
        Ok(())
    }
}

/// One loan with its escrow and lender shares. Every method behaves like one
/// instruction: on any error, no account or balance changes.
struct Market {
    ledger: Ledger,
    borrower: Pubkey,
    fee_vault: Pubkey,
    loan_key: Pubkey,
    escrow: Pubkey,
    loan: LoanAccount,
    shares: HashMap<Pubkey, LenderShare>,
}

impl Market {
    fn open(amount: u64) -> Self {
        let borrower = Pubkey::new_unique();
        let terms = LoanTerms {
            amount,
            term_secs: 30 * SECONDS_PER_DAY,
            max_apr_bps: 1_200,
            min_collateral_bps: 2_000,
            funding_deadline: NOW + 7 * SECONDS_PER_DAY,
        };
        let loan = LoanAccount::new_request(borrower, 1, 255, terms, NOW).unwrap();

        let mut ledger = Ledger::default();
        ledger.mint(borrower, 10_000 * USDC);

        Self {
            ledger,
            borrower,
            fee_vault: Pubkey::new_unique(),
            loan_key: Pubkey::new_unique(),
            escrow: Pubkey::new_unique(),
            loan,
            shares: HashMap::new(),
        }
    }

    fn new_lender(&mut self, balance: u64) -> Pubkey {
        let lender = Pubkey::new_unique();
        self.ledger.mint(lender, balance);
        lender
    }

    fn share(&self, lender: &Pubkey) -> &LenderShare {
        &self.shares[lender]
    }

    fn atomically<T>(
        &mut self,
        lender: Option<Pubkey>,
        f: impl FnOnce(&mut LoanAccount, Option<&mut LenderShare>, &mut Ledger, &Market) -> TxResult<T>,
    ) -> TxResult<T> {
        let mut loan = self.loan.clone();
        let mut share = lender.map(|l| self.shares.get(&l).cloned().unwrap_or_default());
        let mut ledger = Ledger {
            balances: self.ledger.balances.clone(),
        };

        let out = f(&mut loan, share.as_mut(), &mut ledger, self)?;

        self.loan = loan;
        if let (Some(lender), Some(share)) = (lender, share) {
            self.shares.insert(lender, share);
        }
        self.ledger = ledger;
        Ok(out)
    }

    fn fund(&mut self, lender: Pubkey, amount: u64, now: i64) -> TxResult<()> {
        self.atomically(Some(lender), |loan, share, ledger, m| {
            loan.fund(m.loan_key, share.unwrap(), lender, 1, amount, now)?;
            ledger.transfer(lender, m.escrow, amount)
        })
    }

    fn deposit_collateral(&mut self, amount: u64, now: i64) -> TxResult<()> {
        self.atomically(None, |loan, _, ledger, m| {
            loan.deposit_collateral(amount, now)?;
            ledger.transfer(m.borrower, m.escrow, amount)
        })
    }

    fn finalize(&mut self) -> TxResult<()> {
        let mut lenders: Vec<Pubkey> = self.shares.keys().copied().collect();
        lenders.sort();
        let mut shares: Vec<LenderShare> = lenders.iter().map(|l| self.shares[l].clone()).collect();

        let mut refs: Vec<&mut LenderShare> = shares.iter_mut().collect();
        self.loan.finalize_funding(self.loan_key, &mut refs)?;
        drop(refs);
        for (lender, share) in lenders.into_iter().zip(shares) {
            self.shares.insert(lender, share);
        }
        Ok(())
    }

    fn drawdown(&mut self, now: i64) -> TxResult<()> {
        self.atomically(None, |loan, _, ledger, m| {
            let principal = loan.drawdown(now)?;
            ledger.transfer(m.escrow, m.borrower, principal)
        })
    }

    fn repay(&mut self, amount: u64, now: i64) -> TxResult<()> {
        self.atomically(None, |loan, _, ledger, m| {
            let outcome = loan.repay(amount, FEE_BPS, now)?;
            ledger.transfer(m.borrower, m.escrow, outcome.to_escrow())?;
            ledger.transfer(m.borrower, m.fee_vault, outcome.fee)?;
            ledger.transfer(m.escrow, m.borrower, outcome.collateral_released)
        })
    }

    fn mark_default(&mut self, now: i64) -> TxResult<()> {
        self.atomically(None, |loan, _, _, _| loan.mark_default(now))
    }

    fn claim_repayment(&mut self, lender: Pubkey) -> TxResult<u64> {
        self.atomically(Some(lender), |loan, share, ledger, m| {
            let claim = loan.claim_repayment(m.loan_key, share.unwrap())?;
            ledger.transfer(m.escrow, lender, claim.total())?;
            Ok(claim.total())
        })
    }

    fn payout(&mut self, lender: Pubkey) -> TxResult<u64> {
        self.atomically(Some(lender), |loan, share, ledger, m| {
            let cut = loan.claim_collateral(m.loan_key, share.unwrap())?;
            ledger.transfer(m.escrow, lender, cut)?;
            Ok(cut)
        })
    }

    fn refund(&mut self, lender: Pubkey, now: i64) -> TxResult<u64> {
        self.atomically(Some(lender), |loan, share, ledger, m| {
            let refund = loan.refund_expired(m.loan_key, share.unwrap(), now)?;
            ledger.transfer(m.escrow, lender, refund)?;
            Ok(refund)
        })
    }

    fn escrow_balance(&self) -> u64 {
        self.ledger.balance(&self.escrow)
    }

    fn sum_principal(&self) -> u64 {
        self.shares.values().map(|s| s.principal).sum()
    }

    fn sum_bps(&self) -> u32 {
        self.shares.values().map(|s| s.pro_rata_bps).sum()
    }
}

/// Scenario A setup: 1000 USDC, 30 days, 12% APR, 20% collateral, one lender.
fn single_lender_drawn() -> (Market, Pubkey) {
    let mut market = Market::open(1_000 * USDC);
    let lender = market.new_lender(1_000 * USDC);

    market.fund(lender, 1_000 * USDC, NOW).unwrap();
    market.finalize().unwrap();
    market.deposit_collateral(200 * USDC, NOW).unwrap();
    market.drawdown(NOW + 60).unwrap();

    (market, lender)
}

fn two_lenders_drawn(a: u64, b: u64) -> (Market, Pubkey, Pubkey) {
    let mut market = Market::open((a + b) * USDC);
    let first = market.new_lender(a * USDC);
    let second = market.new_lender(b * USDC);

    market.fund(first, a * USDC, NOW).unwrap();
    market.fund(second, b * USDC, NOW).unwrap();
    market.finalize().unwrap();
    market.deposit_collateral((a + b) * USDC / 5, NOW).unwrap();
    market.drawdown(NOW).unwrap();

    (market, first, second)
}

#[test]
fn scenario_a_single_lender_drawdown() {
    let borrower_start = 10_000 * USDC;
    let (market, lender) = single_lender_drawn();

    assert_eq!(market.loan.actual_apr_bps, 1_200);
    assert_eq!(market.share(&lender).pro_rata_bps, 10_000);
    assert_eq!(market.loan.state, LoanState::Drawn);
    assert_eq!(market.escrow_balance(), 200 * USDC);
    assert_eq!(
        market.ledger.balance(&market.borrower),
        borrower_start - 200 * USDC + 1_000 * USDC
    );
}

#[test]
fn scenario_b_full_repayment_settles() {
    let (mut market, lender) = single_lender_drawn();
    let borrower_before = market.ledger.balance(&market.borrower);
    let later = market.loan.start_ts + 15 * SECONDS_PER_DAY;

    let owed = market.loan.outstanding_balance(later).unwrap();
    let interest = owed - 1_000 * USDC;
    assert!(interest > 0);

    assert_eq!(market.repay(owed + 1, later).unwrap_err(), err(LoanError::ExceedsLoanAmount));
    market.repay(owed, later).unwrap();

    assert_eq!(market.loan.state, LoanState::Settled);
    assert_eq!(market.loan.outstanding_principal, 0);
    assert_eq!(market.loan.total_repaid_interest, interest);
    assert_eq!(market.loan.total_repaid_principal, 1_000 * USDC);

    let fee = interest / 10;
    assert_eq!(market.ledger.balance(&market.fee_vault), fee);
    // collateral came back, repayment left
    assert_eq!(
        market.ledger.balance(&market.borrower),
        borrower_before - owed + 200 * USDC
    );
    assert_eq!(market.escrow_balance(), owed - fee);

    let claimed = market.claim_repayment(lender).unwrap();
    assert_eq!(claimed, owed - fee);
    assert_eq!(market.escrow_balance(), 0);
    assert_eq!(market.ledger.balance(&lender), owed - fee);
}

#[test]
fn scenario_b_partial_repayments_pay_interest_first() {
    let (mut market, _) = single_lender_drawn();
    let start = market.loan.start_ts;

    market.repay(10 * USDC, start + 10 * SECONDS_PER_DAY).unwrap();
    assert_eq!(market.loan.accrued_interest, 0);
    assert_eq!(
        market.loan.outstanding_principal,
        1_000 * USDC - (10 * USDC - market.loan.total_repaid_interest)
    );
    assert_eq!(market.loan.state, LoanState::Drawn);

    let later = start + 20 * SECONDS_PER_DAY;
    let owed = market.loan.outstanding_balance(later).unwrap();
    market.repay(owed, later).unwrap();
    assert_eq!(market.loan.state, LoanState::Settled);
}

#[test]
fn scenario_c_two_lenders_split_collateral() {
    let (mut market, first, second) = two_lenders_drawn(300, 700);
    assert_eq!(market.share(&first).pro_rata_bps, 3_000);
    assert_eq!(market.share(&second).pro_rata_bps, 7_000);

    let due = market.loan.due_ts;
    market.mark_default(due + 8 * SECONDS_PER_DAY).unwrap();
    assert_eq!(market.loan.state, LoanState::Defaulted);

    assert_eq!(market.payout(first).unwrap(), 60 * USDC);
    assert_eq!(market.payout(second).unwrap(), 140 * USDC);
    assert_eq!(market.escrow_balance(), 0);
    assert_eq!(market.ledger.balance(&first), 60 * USDC);
    assert_eq!(market.ledger.balance(&second), 140 * USDC);
}

#[test]
fn scenario_d_rounding_remainder_and_dust() {
    let mut market = Market::open(7);
    let lenders: Vec<Pubkey> = [1, 3, 3]
        .iter()
        .map(|p| {
            let lender = market.new_lender(*p);
            market.fund(lender, *p, NOW).unwrap();
            lender
        })
        .collect();

    market.finalize().unwrap();
    assert_eq!(market.sum_bps(), 10_000);
    assert_eq!(market.share(&lenders[0]).pro_rata_bps, 1_428);

    let mut big: Vec<Pubkey> = lenders[1..].to_vec();
    big.sort();
    assert_eq!(market.share(&big[0]).pro_rata_bps, 4_287);
    assert_eq!(market.share(&big[1]).pro_rata_bps, 4_285);

    market.deposit_collateral(100, NOW).unwrap();
    market.drawdown(NOW).unwrap();
    market.mark_default(market.loan.due_ts + GRACE_PERIOD_SECS + 1).unwrap();

    let paid: u64 = lenders.iter().map(|l| market.payout(*l).unwrap()).sum();
    assert_eq!(paid, 14 + 42 + 42);
    let dust = market.escrow_balance();
    assert_eq!(dust, 100 - paid);
    assert!(dust < lenders.len() as u64);
}

#[test]
fn scenario_e_default_waits_for_grace_period() {
    let (mut market, _) = single_lender_drawn();
    let due = market.loan.due_ts;

    assert_eq!(
        market.mark_default(due + SECONDS_PER_DAY).unwrap_err(),
        err(LoanError::TooEarly)
    );
    assert_eq!(market.loan.state, LoanState::Drawn);
    assert_eq!(market.loan.status_at(due + SECONDS_PER_DAY), LoanState::Delinquent);

    market.mark_default(due + 8 * SECONDS_PER_DAY).unwrap();
    assert_eq!(market.loan.state, LoanState::Defaulted);
}

#[test]
fn funded_amount_never_exceeds_request() {
    let mut market = Market::open(1_000 * USDC);
    let lenders: Vec<Pubkey> = (0..4).map(|_| market.new_lender(500 * USDC)).collect();

    market.fund(lenders[0], 400 * USDC, NOW).unwrap();
    market.fund(lenders[1], 400 * USDC, NOW).unwrap();
    assert_eq!(market.sum_principal(), market.loan.funded_amount);

    // a late lender working from a stale view of the counter overshoots
    let before = market.ledger.balance(&lenders[2]);
    assert_eq!(
        market.fund(lenders[2], 300 * USDC, NOW).unwrap_err(),
        err(LoanError::ExceedsLoanAmount)
    );
    assert_eq!(market.ledger.balance(&lenders[2]), before);
    assert!(!market.shares.contains_key(&lenders[2]));

    market.fund(lenders[2], 200 * USDC, NOW).unwrap();
    assert_eq!(market.loan.funded_amount, market.loan.amount);
    assert_eq!(market.sum_principal(), market.loan.funded_amount);
    assert_eq!(market.escrow_balance(), market.loan.funded_amount);

    assert_eq!(
        market.fund(lenders[3], 1, NOW).unwrap_err(),
        err(LoanError::ExceedsLoanAmount)
    );
}

#[test]
fn failed_transfer_rolls_back_funding() {
    let mut market = Market::open(1_000 * USDC);
    let poor = market.new_lender(10 * USDC);

    assert!(market.fund(poor, 20 * USDC, NOW).is_err());
    assert_eq!(market.loan.funded_amount, 0);
    assert_eq!(market.loan.lender_count, 0);
    assert!(!market.shares.contains_key(&poor));
}

#[test]
fn drawdown_cannot_run_twice() {
    let (mut market, _) = single_lender_drawn();
    let escrow = market.escrow_balance();

    assert_eq!(
        market.drawdown(NOW + 120).unwrap_err(),
        err(LoanError::InvalidState)
    );
    assert_eq!(market.escrow_balance(), escrow);
}

#[test]
fn collateral_cannot_be_claimed_twice() {
    let (mut market, first, _) = two_lenders_drawn(300, 700);
    market.mark_default(market.loan.due_ts + 8 * SECONDS_PER_DAY).unwrap();

    market.payout(first).unwrap();
    let balance = market.ledger.balance(&first);
    assert_eq!(market.payout(first).unwrap_err(), err(LoanError::AlreadyClaimed));
    assert_eq!(market.ledger.balance(&first), balance);
}

#[test]
fn repayments_before_default_stay_claimable() {
    let (mut market, first, second) = two_lenders_drawn(300, 700);
    market.repay(100 * USDC, NOW).unwrap();
    market.mark_default(market.loan.due_ts + 8 * SECONDS_PER_DAY).unwrap();

    assert_eq!(market.claim_repayment(first).unwrap(), 30 * USDC);
    assert_eq!(market.claim_repayment(second).unwrap(), 70 * USDC);
    assert_eq!(market.payout(first).unwrap(), 60 * USDC);
    assert_eq!(market.payout(second).unwrap(), 140 * USDC);
    assert_eq!(market.escrow_balance(), 0);
}

#[test]
fn expired_funding_returns_every_lender() {
    let mut market = Market::open(1_000 * USDC);
    let a = market.new_lender(300 * USDC);
    let b = market.new_lender(300 * USDC);
    market.fund(a, 300 * USDC, NOW).unwrap();
    market.fund(b, 200 * USDC, NOW).unwrap();

    let late = market.loan.funding_deadline + 1;
    assert_eq!(market.fund(b, 10 * USDC, late).unwrap_err(), err(LoanError::FundingExpired));

    assert_eq!(market.refund(a, late).unwrap(), 300 * USDC);
    assert_eq!(market.refund(b, late).unwrap(), 200 * USDC);
    assert_eq!(market.sum_principal(), market.loan.funded_amount);
    assert_eq!(market.escrow_balance(), 0);
    assert_eq!(market.ledger.balance(&b), 300 * USDC);
}

#[test]
fn pre_created_escrow_with_stray_balance_does_not_change_payouts() {
    let mut market = Market::open(1_000 * USDC);
    let escrow = market.escrow;
    market.ledger.mint(escrow, 5 * USDC);

    let first = market.new_lender(300 * USDC);
    let second = market.new_lender(700 * USDC);
    market.fund(first, 300 * USDC, NOW).unwrap();
    market.fund(second, 700 * USDC, NOW).unwrap();
    market.finalize().unwrap();
    market.deposit_collateral(200 * USDC, NOW).unwrap();
    market.drawdown(NOW).unwrap();
    assert_eq!(market.ledger.balance(&market.borrower), 10_000 * USDC - 200 * USDC + 1_000 * USDC);

    market.repay(100 * USDC, NOW).unwrap();
    market.mark_default(market.loan.due_ts + 8 * SECONDS_PER_DAY).unwrap();

    assert_eq!(market.claim_repayment(first).unwrap(), 30 * USDC);
    assert_eq!(market.claim_repayment(second).unwrap(), 70 * USDC);
    assert_eq!(market.payout(first).unwrap(), 60 * USDC);
    assert_eq!(market.payout(second).unwrap(), 140 * USDC);
    assert_eq!(market.escrow_balance(), 5 * USDC);
}
