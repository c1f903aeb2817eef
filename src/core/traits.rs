//! Collaborator traits for the ledger engine
//!
//! The payout issuer is the only external call the engine makes. It is
//! injected at construction so tests can substitute deterministic fakes
//! (always succeed, always fail, fail then succeed).

use crate::types::{Amount, PayoutError};

/// External capability that moves money to a merchant's bank account
///
/// Called synchronously, at most once per merchant per payout batch. The
/// engine applies no timeout; callers needing bounded latency must enforce
/// a deadline inside their implementation.
pub trait PayoutIssuer {
    /// Issue a payout of `amount` minor units to `merchant_id`
    ///
    /// `reference` is unique per call.
    fn issue_payout(
        &mut self,
        merchant_id: &str,
        amount: Amount,
        reference: &str,
    ) -> Result<(), PayoutError>;
}

impl<F> PayoutIssuer for F
where
    F: FnMut(&str, Amount, &str) -> Result<(), PayoutError>,
{
    fn issue_payout(
        &mut self,
        merchant_id: &str,
        amount: Amount,
        reference: &str,
    ) -> Result<(), PayoutError> {
        self(merchant_id, amount, reference)
    }
}
