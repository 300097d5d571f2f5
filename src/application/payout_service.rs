use super::settlement::{SettlementHandle, spawn_settlement};
use crate::domain::payout::{Payout, PayoutFilter, PayoutRequest, PayoutStatus};
use crate::domain::ports::{PaymentProcessorRef, PayoutStoreRef, VendorStoreRef};
use crate::domain::query::{ListQuery, Page, Pagination};
use crate::domain::vendor::VendorStatus;
use crate::error::{MarketError, Result};
use rust_decimal::Decimal;
use tracing::info;
use uuid::Uuid;

/// What `process` hands back: the payout as committed in `processing`, and a
/// handle on the settlement that was started after that commit.
#[derive(Debug)]
pub struct ProcessReceipt {
    pub payout: Payout,
    pub settlement: SettlementHandle,
}

/// Owns the payout lifecycle:
/// `pending --process--> processing --settlement--> completed | failed`.
pub struct PayoutService {
    payouts: PayoutStoreRef,
    vendors: VendorStoreRef,
    processor: PaymentProcessorRef,
}

impl PayoutService {
    pub fn new(
        payouts: PayoutStoreRef,
        vendors: VendorStoreRef,
        processor: PaymentProcessorRef,
    ) -> Self {
        Self {
            payouts,
            vendors,
            processor,
        }
    }

    /// Creates a `pending` payout for an `active` vendor.
    ///
    /// The amount is not checked against accrued earnings.
    pub async fn create(&self, request: PayoutRequest) -> Result<Payout> {
        let vendor = self.vendors.get_vendor(request.vendor_id).await?;
        if vendor.status != VendorStatus::Active {
            return Err(MarketError::InvalidState(format!(
                "vendor {} is not active",
                vendor.id
            )));
        }

        let payout = self.payouts.create_payout(Payout::new(request)).await?;
        info!(
            payout_id = %payout.id,
            vendor_id = %payout.vendor_id,
            amount = %payout.amount,
            currency = %payout.currency,
            "payout created"
        );
        Ok(payout)
    }

    pub async fn get(&self, id: Uuid) -> Result<Payout> {
        self.payouts.get_payout(id).await
    }

    pub async fn list(&self, filter: &PayoutFilter, pagination: Pagination) -> Result<Page<Payout>> {
        let query = ListQuery::payouts(filter, pagination);
        self.payouts.list_payouts(&query).await
    }

    /// Moves a `pending` payout to `processing` and starts settlement.
    ///
    /// Two concurrent calls cannot both succeed: the status change is a
    /// compare-and-swap, and the loser gets `InvalidState`.
    pub async fn process(&self, id: Uuid) -> Result<ProcessReceipt> {
        let current = self.payouts.get_payout(id).await?;
        if current.status != PayoutStatus::Pending {
            return Err(MarketError::InvalidState(format!(
                "payout {} is not in pending status (status: {})",
                id, current.status
            )));
        }

        let payout = self
            .payouts
            .transition_payout_status(id, PayoutStatus::Pending, PayoutStatus::Processing)
            .await?;
        info!(payout_id = %id, "payout processing started");

        let settlement = spawn_settlement(
            self.payouts.clone(),
            self.processor.clone(),
            payout.clone(),
        );
        Ok(ProcessReceipt { payout, settlement })
    }

    pub async fn pending_amount(&self, vendor_id: Uuid) -> Result<Decimal> {
        self.payouts.sum_pending_payout_amount(vendor_id).await
    }
}
