use super::payout::{Payout, PayoutStatus};
use super::query::{ListQuery, Page};
use super::vendor::{Vendor, VendorStatus};
use crate::error::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Durable vendor records. The store is the source of truth.
#[async_trait]
pub trait VendorStore: Send + Sync {
    /// Fails with `Conflict` if a vendor already exists for `vendor.user_id`.
    async fn create_vendor(&self, vendor: Vendor) -> Result<Vendor>;
    async fn get_vendor(&self, id: Uuid) -> Result<Vendor>;
    async fn get_vendor_by_user_id(&self, user_id: Uuid) -> Result<Vendor>;
    /// Replaces the editable fields. `user_id`, `status`, `commission_rate`,
    /// the counters and `created_at` keep their persisted values, and
    /// `updated_at` strictly increases.
    async fn update_vendor(&self, vendor: Vendor) -> Result<Vendor>;
    /// Compare-and-swap: succeeds only if the persisted status is one of `from`,
    /// otherwise fails with `InvalidState`.
    async fn transition_vendor_status(
        &self,
        id: Uuid,
        from: &[VendorStatus],
        to: VendorStatus,
    ) -> Result<Vendor>;
    async fn list_vendors(&self, query: &ListQuery) -> Result<Page<Vendor>>;
}

/// Durable payout records.
#[async_trait]
pub trait PayoutStore: Send + Sync {
    /// Fails with `NotFound` if `payout.vendor_id` has no vendor record.
    async fn create_payout(&self, payout: Payout) -> Result<Payout>;
    async fn get_payout(&self, id: Uuid) -> Result<Payout>;
    /// Compare-and-swap from `from` to `to`; sets `processed_at` when `to` is terminal.
    async fn transition_payout_status(
        &self,
        id: Uuid,
        from: PayoutStatus,
        to: PayoutStatus,
    ) -> Result<Payout>;
    async fn list_payouts(&self, query: &ListQuery) -> Result<Page<Payout>>;
    /// Zero when the vendor has no pending payouts.
    async fn sum_pending_payout_amount(&self, vendor_id: Uuid) -> Result<Decimal>;
}

/// Time-limited vendor copies. Never authoritative.
#[async_trait]
pub trait VendorCache: Send + Sync {
    async fn put(&self, vendor: &Vendor, ttl: Duration) -> Result<()>;
    /// `Ok(None)` on a miss or an expired entry.
    async fn get(&self, id: Uuid) -> Result<Option<Vendor>>;
    async fn invalidate(&self, id: Uuid) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettlementOutcome {
    Completed,
    Failed { reason: String },
}

/// The payment-processor round trip that settles a payout.
#[async_trait]
pub trait PaymentProcessor: Send + Sync {
    async fn settle(&self, payout: &Payout) -> Result<SettlementOutcome>;
}

pub type VendorStoreRef = Arc<dyn VendorStore>;
pub type PayoutStoreRef = Arc<dyn PayoutStore>;
pub type VendorCacheRef = Arc<dyn VendorCache>;
pub type PaymentProcessorRef = Arc<dyn PaymentProcessor>;
