use crate::config::Config;
use crate::domain::money::CommissionRate;
use crate::domain::ports::{VendorCacheRef, VendorStoreRef};
use crate::domain::query::{ListQuery, Page, Pagination};
use crate::domain::vendor::{Vendor, VendorFilter, VendorPatch, VendorRegistration, VendorStatus};
use crate::error::{MarketError, Result};
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Owns the vendor lifecycle: registration, cache-aside reads, partial
/// updates and guarded status transitions.
///
/// The store is authoritative. Cache writes and invalidations are best-effort:
/// their failures are logged and never fail the operation.
pub struct VendorService {
    store: VendorStoreRef,
    cache: VendorCacheRef,
    commission_rate: CommissionRate,
    cache_ttl: Duration,
}

impl VendorService {
    pub fn new(store: VendorStoreRef, cache: VendorCacheRef, config: &Config) -> Self {
        Self {
            store,
            cache,
            commission_rate: config.commission_rate,
            cache_ttl: config.cache_ttl(),
        }
    }

    pub async fn register(&self, request: VendorRegistration) -> Result<Vendor> {
        request.validate()?;

        match self.store.get_vendor_by_user_id(request.user_id).await {
            Ok(_) => {
                return Err(MarketError::Conflict(format!(
                    "vendor already exists for user {}",
                    request.user_id
                )));
            }
            Err(e) if e.is_not_found() => {}
            Err(e) => return Err(e),
        }

        let vendor = self
            .store
            .create_vendor(Vendor::register(request, self.commission_rate))
            .await?;
        info!(vendor_id = %vendor.id, user_id = %vendor.user_id, "vendor registered");

        self.cache_vendor(&vendor).await;
        Ok(vendor)
    }

    pub async fn get(&self, id: Uuid) -> Result<Vendor> {
        if let Some(vendor) = self.cached_vendor(id).await {
            return Ok(vendor);
        }

        let vendor = self.store.get_vendor(id).await?;
        self.cache_vendor(&vendor).await;
        Ok(vendor)
    }

    /// Store-only lookup; results are not cached.
    pub async fn get_by_user_id(&self, user_id: Uuid) -> Result<Vendor> {
        self.store.get_vendor_by_user_id(user_id).await
    }

    pub async fn update(&self, id: Uuid, patch: VendorPatch) -> Result<Vendor> {
        patch.validate()?;

        let mut vendor = self.store.get_vendor(id).await?;
        vendor.apply(patch);
        let vendor = self.store.update_vendor(vendor).await?;
        info!(vendor_id = %vendor.id, "vendor updated");

        self.cache_vendor(&vendor).await;
        Ok(vendor)
    }

    /// `pending` or `suspended` -> `active`.
    pub async fn approve(&self, id: Uuid) -> Result<Vendor> {
        self.transition(
            id,
            &[VendorStatus::Pending, VendorStatus::Suspended],
            VendorStatus::Active,
        )
        .await
    }

    /// `active` -> `suspended`.
    pub async fn suspend(&self, id: Uuid) -> Result<Vendor> {
        self.transition(id, &[VendorStatus::Active], VendorStatus::Suspended)
            .await
    }

    /// `pending` -> `rejected`. Rejection is final.
    pub async fn reject(&self, id: Uuid) -> Result<Vendor> {
        self.transition(id, &[VendorStatus::Pending], VendorStatus::Rejected)
            .await
    }

    pub async fn list(&self, filter: &VendorFilter, pagination: Pagination) -> Result<Page<Vendor>> {
        let query = ListQuery::vendors(filter, pagination);
        self.store.list_vendors(&query).await
    }

    async fn transition(&self, id: Uuid, from: &[VendorStatus], to: VendorStatus) -> Result<Vendor> {
        let vendor = self.store.transition_vendor_status(id, from, to).await?;
        info!(vendor_id = %id, status = %to, "vendor status changed");

        // Invalidate rather than refresh: the next read goes to the store.
        if let Err(e) = self.cache.invalidate(id).await {
            warn!(vendor_id = %id, error = %e, "failed to invalidate cached vendor");
        }
        Ok(vendor)
    }

    async fn cache_vendor(&self, vendor: &Vendor) {
        if let Err(e) = self.cache.put(vendor, self.cache_ttl).await {
            warn!(vendor_id = %vendor.id, error = %e, "failed to cache vendor");
        }
    }

    async fn cached_vendor(&self, id: Uuid) -> Option<Vendor> {
        match self.cache.get(id).await {
            Ok(Some(vendor)) => {
                debug!(vendor_id = %id, "vendor cache hit");
                Some(vendor)
            }
            Ok(None) => None,
            Err(e) => {
                warn!(vendor_id = %id, error = %e, "vendor cache read failed, using store");
                None
            }
        }
    }
}
