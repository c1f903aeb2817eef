//! Simulated payout issuer
//!
//! Stands in for a real bank transfer integration. Declines can be
//! configured per merchant, either permanently or for the first attempt
//! only, which is enough to drive the retry-on-next-batch behavior.

use crate::core::traits::PayoutIssuer;
use crate::types::{Amount, MerchantId, PayoutError};
use std::collections::HashSet;

/// A payout the simulated issuer accepted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedPayout {
    pub merchant_id: MerchantId,
    pub amount: Amount,
    pub reference: String,
}

/// In-process payout issuer with configurable declines
#[derive(Debug, Clone, Default)]
pub struct SimulatedIssuer {
    declined: HashSet<MerchantId>,
    declined_once: HashSet<MerchantId>,
    attempts: usize,
    issued: Vec<IssuedPayout>,
}

impl SimulatedIssuer {
    /// Create an issuer that accepts every payout
    pub fn new() -> Self {
        SimulatedIssuer::default()
    }

    /// Decline every payout to `merchant_id`
    pub fn decline(mut self, merchant_id: impl Into<MerchantId>) -> Self {
        self.declined.insert(merchant_id.into());
        self
    }

    /// Decline only the next payout to `merchant_id`
    pub fn decline_once(mut self, merchant_id: impl Into<MerchantId>) -> Self {
        self.declined_once.insert(merchant_id.into());
        self
    }

    /// Payouts accepted so far, in call order
    pub fn issued(&self) -> &[IssuedPayout] {
        &self.issued
    }

    /// Number of times the issuer has been called
    pub fn attempts(&self) -> usize {
        self.attempts
    }
}

impl PayoutIssuer for SimulatedIssuer {
    fn issue_payout(
        &mut self,
        merchant_id: &str,
        amount: Amount,
        reference: &str,
    ) -> Result<(), PayoutError> {
        self.attempts += 1;

        if self.declined.contains(merchant_id) {
            return Err(PayoutError::new(format!(
                "payout to {} declined by bank",
                merchant_id
            )));
        }
        if self.declined_once.remove(merchant_id) {
            return Err(PayoutError::new("bank unavailable"));
        }

        self.issued.push(IssuedPayout {
            merchant_id: merchant_id.to_string(),
            amount,
            reference: reference.to_string(),
        });
        Ok(())
    }
}
