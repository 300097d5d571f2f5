use crate::domain::payout::{Payout, PayoutStatus};
use crate::domain::ports::{PayoutStore, VendorCache, VendorStore};
use crate::domain::query::{ListQuery, Page};
use crate::domain::vendor::{Vendor, VendorStatus};
use crate::error::{MarketError, Result};
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;
use uuid::Uuid;

#[derive(Default)]
struct Tables {
    vendors: HashMap<Uuid, Vendor>,
    vendors_by_user: HashMap<Uuid, Uuid>,
    payouts: HashMap<Uuid, Payout>,
}

/// A thread-safe in-memory store for vendors and their payouts.
///
/// Both tables live behind a single `RwLock`, so uniqueness checks, the
/// vendor foreign key on payouts and compare-and-swap status changes are
/// atomic with respect to each other. Ideal for testing or ephemeral runs.
#[derive(Default, Clone)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    /// Creates a new, empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VendorStore for InMemoryStore {
    async fn create_vendor(&self, vendor: Vendor) -> Result<Vendor> {
        let mut tables = self.tables.write().await;
        if tables.vendors_by_user.contains_key(&vendor.user_id) {
            return Err(MarketError::Conflict(format!(
                "vendor already exists for user {}",
                vendor.user_id
            )));
        }
        if tables.vendors.contains_key(&vendor.id) {
            return Err(MarketError::Conflict(format!(
                "vendor {} already exists",
                vendor.id
            )));
        }
        tables.vendors_by_user.insert(vendor.user_id, vendor.id);
        tables.vendors.insert(vendor.id, vendor.clone());
        Ok(vendor)
    }

    async fn get_vendor(&self, id: Uuid) -> Result<Vendor> {
        let tables = self.tables.read().await;
        tables
            .vendors
            .get(&id)
            .cloned()
            .ok_or_else(|| MarketError::not_found("vendor", id))
    }

    async fn get_vendor_by_user_id(&self, user_id: Uuid) -> Result<Vendor> {
        let tables = self.tables.read().await;
        tables
            .vendors_by_user
            .get(&user_id)
            .and_then(|id| tables.vendors.get(id))
            .cloned()
            .ok_or_else(|| MarketError::not_found("vendor for user", user_id))
    }

    async fn update_vendor(&self, mut vendor: Vendor) -> Result<Vendor> {
        let mut tables = self.tables.write().await;
        let existing = tables
            .vendors
            .get(&vendor.id)
            .ok_or_else(|| MarketError::not_found("vendor", vendor.id))?;

        vendor.rebase_on(existing);

        tables.vendors.insert(vendor.id, vendor.clone());
        Ok(vendor)
    }

    async fn transition_vendor_status(
        &self,
        id: Uuid,
        from: &[VendorStatus],
        to: VendorStatus,
    ) -> Result<Vendor> {
        let mut tables = self.tables.write().await;
        let vendor = tables
            .vendors
            .get_mut(&id)
            .ok_or_else(|| MarketError::not_found("vendor", id))?;
        vendor.transition(from, to)?;
        Ok(vendor.clone())
    }

    async fn list_vendors(&self, query: &ListQuery) -> Result<Page<Vendor>> {
        let tables = self.tables.read().await;
        Ok(query.execute(tables.vendors.values().cloned()))
    }
}

#[async_trait]
impl PayoutStore for InMemoryStore {
    async fn create_payout(&self, payout: Payout) -> Result<Payout> {
        let mut tables = self.tables.write().await;
        if !tables.vendors.contains_key(&payout.vendor_id) {
            return Err(MarketError::not_found("vendor", payout.vendor_id));
        }
        if tables.payouts.contains_key(&payout.id) {
            return Err(MarketError::Conflict(format!(
                "payout {} already exists",
                payout.id
            )));
        }
        tables.payouts.insert(payout.id, payout.clone());
        Ok(payout)
    }

    async fn get_payout(&self, id: Uuid) -> Result<Payout> {
        let tables = self.tables.read().await;
        tables
            .payouts
            .get(&id)
            .cloned()
            .ok_or_else(|| MarketError::not_found("payout", id))
    }

    async fn transition_payout_status(
        &self,
        id: Uuid,
        from: PayoutStatus,
        to: PayoutStatus,
    ) -> Result<Payout> {
        let mut tables = self.tables.write().await;
        let payout = tables
            .payouts
            .get_mut(&id)
            .ok_or_else(|| MarketError::not_found("payout", id))?;
        payout.advance(from, to)?;
        Ok(payout.clone())
    }

    async fn list_payouts(&self, query: &ListQuery) -> Result<Page<Payout>> {
        let tables = self.tables.read().await;
        Ok(query.execute(tables.payouts.values().cloned()))
    }

    async fn sum_pending_payout_amount(&self, vendor_id: Uuid) -> Result<Decimal> {
        let tables = self.tables.read().await;
        Ok(tables
            .payouts
            .values()
            .filter(|p| p.vendor_id == vendor_id && p.status == PayoutStatus::Pending)
            .map(|p| p.amount.value())
            .sum())
    }
}

struct CacheEntry {
    bytes: Vec<u8>,
    expires_at: Instant,
}

/// An in-process vendor cache with per-entry TTL.
///
/// Entries are stored JSON-encoded under `vendor:<id>` keys, the same shape a
/// networked key-value cache would hold. Expired entries are dropped lazily
/// on read; there is no size bound.
#[derive(Default, Clone)]
pub struct InMemoryVendorCache {
    entries: Arc<RwLock<HashMap<String, CacheEntry>>>,
}

impl InMemoryVendorCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key(id: Uuid) -> String {
        format!("vendor:{id}")
    }

    /// Stores raw bytes under `key`, bypassing encoding. Lets callers seed
    /// entries written by other producers.
    pub async fn put_raw(&self, key: String, bytes: Vec<u8>, ttl: Duration) {
        let mut entries = self.entries.write().await;
        entries.insert(
            key,
            CacheEntry {
                bytes,
                expires_at: Instant::now() + ttl,
            },
        );
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl VendorCache for InMemoryVendorCache {
    async fn put(&self, vendor: &Vendor, ttl: Duration) -> Result<()> {
        let bytes = serde_json::to_vec(vendor)?;
        self.put_raw(Self::key(vendor.id), bytes, ttl).await;
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Vendor>> {
        let key = Self::key(id);
        let mut entries = self.entries.write().await;
        let Some(entry) = entries.get(&key) else {
            return Ok(None);
        };
        if entry.expires_at <= Instant::now() {
            entries.remove(&key);
            return Ok(None);
        }
        let vendor = serde_json::from_slice(&entry.bytes)?;
        Ok(Some(vendor))
    }

    async fn invalidate(&self, id: Uuid) -> Result<()> {
        let mut entries = self.entries.write().await;
        entries.remove(&Self::key(id));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::money::{Amount, CommissionRate, Currency};
    use crate::domain::payout::{PayoutMethod, PayoutRequest};
    use crate::domain::vendor::{
        Address, BankDetails, BusinessType, Document, VendorRegistration,
    };
    use rust_decimal_macros::dec;

    fn vendor_for(user_id: Uuid) -> Vendor {
        Vendor::register(
            VendorRegistration {
                user_id,
                company_name: "Acme Books".to_string(),
                business_type: BusinessType::Individual,
                tax_id: None,
                registration_number: None,
                address: Address::default(),
                bank_details: BankDetails::default(),
            },
            CommissionRate::default(),
        )
    }

    fn payout_for(vendor_id: Uuid, amount: Decimal) -> Payout {
        Payout::new(PayoutRequest {
            vendor_id,
            amount: Amount::new(amount).unwrap(),
            currency: Currency::new("USD").unwrap(),
            payout_method: PayoutMethod::BankTransfer,
            payout_details: Document::new(),
        })
    }

    #[tokio::test]
    async fn test_in_memory_vendor_store() {
        let store = InMemoryStore::new();
        let vendor = vendor_for(Uuid::new_v4());

        store.create_vendor(vendor.clone()).await.unwrap();
        assert_eq!(store.get_vendor(vendor.id).await.unwrap(), vendor);
        assert_eq!(
            store.get_vendor_by_user_id(vendor.user_id).await.unwrap().id,
            vendor.id
        );

        let missing = store.get_vendor(Uuid::new_v4()).await;
        assert!(matches!(missing, Err(MarketError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_user_id_is_unique() {
        let store = InMemoryStore::new();
        let user_id = Uuid::new_v4();
        store.create_vendor(vendor_for(user_id)).await.unwrap();

        let second = store.create_vendor(vendor_for(user_id)).await;
        assert!(matches!(second, Err(MarketError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_update_preserves_created_at_and_bumps_updated_at() {
        let store = InMemoryStore::new();
        let vendor = store
            .create_vendor(vendor_for(Uuid::new_v4()))
            .await
            .unwrap();

        let mut changed = vendor.clone();
        changed.company_name = "Acme Rare Books".to_string();
        changed.created_at = chrono::Utc::now() + chrono::Duration::days(1);

        let updated = store.update_vendor(changed).await.unwrap();
        assert_eq!(updated.created_at, vendor.created_at);
        assert!(updated.updated_at > vendor.updated_at);

        let unknown = store.update_vendor(vendor_for(Uuid::new_v4())).await;
        assert!(matches!(unknown, Err(MarketError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_stale_update_keeps_status_and_counters() {
        let store = InMemoryStore::new();
        let vendor = store
            .create_vendor(vendor_for(Uuid::new_v4()))
            .await
            .unwrap();

        // a caller read the vendor before it was approved
        let mut stale = vendor.clone();
        store
            .transition_vendor_status(vendor.id, &[VendorStatus::Pending], VendorStatus::Active)
            .await
            .unwrap();

        stale.company_name = "Acme Rare Books".to_string();
        stale.total_orders = 99;
        stale.rating = dec!(5);
        let updated = store.update_vendor(stale).await.unwrap();

        assert_eq!(updated.status, VendorStatus::Active);
        assert_eq!(updated.total_orders, 0);
        assert_eq!(updated.rating, vendor.rating);
        assert_eq!(updated.company_name, "Acme Rare Books");
        assert_eq!(store.get_vendor(vendor.id).await.unwrap(), updated);
    }

    #[tokio::test]
    async fn test_payout_requires_existing_vendor() {
        let store = InMemoryStore::new();
        let orphan = store
            .create_payout(payout_for(Uuid::new_v4(), dec!(10)))
            .await;
        assert!(matches!(orphan, Err(MarketError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_payout_status_compare_and_swap() {
        let store = InMemoryStore::new();
        let vendor = store
            .create_vendor(vendor_for(Uuid::new_v4()))
            .await
            .unwrap();
        let payout = store
            .create_payout(payout_for(vendor.id, dec!(10)))
            .await
            .unwrap();

        let processing = store
            .transition_payout_status(payout.id, PayoutStatus::Pending, PayoutStatus::Processing)
            .await
            .unwrap();
        assert_eq!(processing.status, PayoutStatus::Processing);
        assert!(processing.processed_at.is_none());

        let lost = store
            .transition_payout_status(payout.id, PayoutStatus::Pending, PayoutStatus::Processing)
            .await;
        assert!(matches!(lost, Err(MarketError::InvalidState(_))));

        let failed = store
            .transition_payout_status(payout.id, PayoutStatus::Processing, PayoutStatus::Failed)
            .await
            .unwrap();
        assert!(failed.processed_at.is_some());
    }

    #[tokio::test]
    async fn test_sum_pending_amount() {
        let store = InMemoryStore::new();
        let vendor = store
            .create_vendor(vendor_for(Uuid::new_v4()))
            .await
            .unwrap();
        assert_eq!(
            store.sum_pending_payout_amount(vendor.id).await.unwrap(),
            Decimal::ZERO
        );

        store
            .create_payout(payout_for(vendor.id, dec!(50.00)))
            .await
            .unwrap();
        let settled = store
            .create_payout(payout_for(vendor.id, dec!(10.00)))
            .await
            .unwrap();
        store
            .create_payout(payout_for(vendor.id, dec!(75.25)))
            .await
            .unwrap();
        store
            .transition_payout_status(settled.id, PayoutStatus::Pending, PayoutStatus::Processing)
            .await
            .unwrap();

        assert_eq!(
            store.sum_pending_payout_amount(vendor.id).await.unwrap(),
            dec!(125.25)
        );
    }

    #[tokio::test]
    async fn test_cache_round_trip_and_invalidate() {
        let cache = InMemoryVendorCache::new();
        let vendor = vendor_for(Uuid::new_v4());

        cache.put(&vendor, Duration::from_secs(60)).await.unwrap();
        assert_eq!(cache.len().await, 1);
        assert_eq!(cache.get(vendor.id).await.unwrap(), Some(vendor.clone()));

        cache.invalidate(vendor.id).await.unwrap();
        assert_eq!(cache.get(vendor.id).await.unwrap(), None);
        assert_eq!(cache.len().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cache_entry_expires() {
        let cache = InMemoryVendorCache::new();
        let vendor = vendor_for(Uuid::new_v4());
        cache.put(&vendor, Duration::from_secs(3600)).await.unwrap();

        tokio::time::advance(Duration::from_secs(3599)).await;
        assert!(cache.get(vendor.id).await.unwrap().is_some());

        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(cache.get(vendor.id).await.unwrap().is_none());
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_cache_corrupt_entry_is_an_error() {
        let cache = InMemoryVendorCache::new();
        let id = Uuid::new_v4();
        cache
            .put_raw(
                InMemoryVendorCache::key(id),
                b"not json".to_vec(),
                Duration::from_secs(60),
            )
            .await;

        assert!(cache.get(id).await.is_err());
    }
}
