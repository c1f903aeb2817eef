//! Payout result type

use super::account::{Amount, MerchantId};
use super::error::PayoutError;

/// Outcome of a single merchant payout within a batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayoutResult {
    /// Merchant the payout was attempted for
    pub merchant_id: MerchantId,

    /// Aggregated Available amount that was attempted
    pub amount: Amount,

    /// Reference handed to the payout issuer
    pub reference: String,

    /// Whether the issuer accepted the payout
    pub success: bool,

    /// Issuer failure detail, `None` on success
    pub error: Option<PayoutError>,
}

impl PayoutResult {
    pub(crate) fn succeeded(merchant_id: MerchantId, amount: Amount, reference: String) -> Self {
        PayoutResult {
            merchant_id,
            amount,
            reference,
            success: true,
            error: None,
        }
    }

    pub(crate) fn failed(
        merchant_id: MerchantId,
        amount: Amount,
        reference: String,
        error: PayoutError,
    ) -> Self {
        PayoutResult {
            merchant_id,
            amount,
            reference,
            success: false,
            error: Some(error),
        }
    }
}
