use crate::domain::payout::{Payout, PayoutStatus};
use crate::domain::ports::{PayoutStore, VendorStore};
use crate::domain::query::{ListQuery, Page};
use crate::domain::vendor::{Vendor, VendorStatus};
use crate::error::{MarketError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, IteratorMode, Options, WriteBatch};
use rust_decimal::Decimal;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Column Family for vendor records, keyed by vendor id.
pub const CF_VENDORS: &str = "vendors";
/// Column Family mapping user id to vendor id (the uniqueness index).
pub const CF_VENDOR_USERS: &str = "vendor_users";
/// Column Family for payout records, keyed by payout id.
pub const CF_PAYOUTS: &str = "vendor_payouts";

/// A persistent store implementation using RocksDB.
///
/// Vendors, the user-id index and payouts live in separate Column Families.
/// Values are JSON; keys are the raw 16 uuid bytes.
///
/// RocksDB has no conditional writes, so every read-check-write sequence
/// (uniqueness, foreign key, status compare-and-swap) runs under `write_lock`.
/// Clones share both the `Arc<DB>` and the lock.
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
    write_lock: Arc<Mutex<()>>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// Ensures that the required column families exist.
    ///
    /// # Arguments
    ///
    /// * `path` - The filesystem path where the database will be stored.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let descriptors = [CF_VENDORS, CF_VENDOR_USERS, CF_PAYOUTS]
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()))
            .collect::<Vec<_>>();

        let db = DB::open_cf_descriptors(&opts, path, descriptors)?;

        Ok(Self {
            db: Arc::new(db),
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    fn cf(&self, name: &str) -> Result<&ColumnFamily> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| MarketError::store(format!("{name} column family not found")))
    }

    fn read<T: DeserializeOwned>(&self, cf_name: &str, key: Uuid) -> Result<Option<T>> {
        let cf = self.cf(cf_name)?;
        match self.db.get_pinned_cf(cf, key.as_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn write<T: Serialize>(&self, cf_name: &str, key: Uuid, value: &T) -> Result<()> {
        let cf = self.cf(cf_name)?;
        let bytes = serde_json::to_vec(value)?;
        self.db.put_cf(cf, key.as_bytes(), bytes)?;
        Ok(())
    }

    fn scan<T: DeserializeOwned>(&self, cf_name: &str) -> Result<Vec<T>> {
        let cf = self.cf(cf_name)?;
        let mut rows = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (_key, value) = item?;
            rows.push(serde_json::from_slice(&value)?);
        }
        Ok(rows)
    }

    fn vendor_id_for_user(&self, user_id: Uuid) -> Result<Option<Uuid>> {
        let cf = self.cf(CF_VENDOR_USERS)?;
        match self.db.get_pinned_cf(cf, user_id.as_bytes())? {
            Some(bytes) => Uuid::from_slice(&bytes)
                .map(Some)
                .map_err(|e| MarketError::StoreError(Box::new(e))),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl VendorStore for RocksDBStore {
    async fn create_vendor(&self, vendor: Vendor) -> Result<Vendor> {
        let _guard = self.write_lock.lock().await;
        if self.vendor_id_for_user(vendor.user_id)?.is_some() {
            return Err(MarketError::Conflict(format!(
                "vendor already exists for user {}",
                vendor.user_id
            )));
        }

        // Record and index land together or not at all.
        let mut batch = WriteBatch::default();
        batch.put_cf(
            self.cf(CF_VENDORS)?,
            vendor.id.as_bytes(),
            serde_json::to_vec(&vendor)?,
        );
        batch.put_cf(
            self.cf(CF_VENDOR_USERS)?,
            vendor.user_id.as_bytes(),
            vendor.id.as_bytes(),
        );
        self.db.write(batch)?;

        Ok(vendor)
    }

    async fn get_vendor(&self, id: Uuid) -> Result<Vendor> {
        self.read(CF_VENDORS, id)?
            .ok_or_else(|| MarketError::not_found("vendor", id))
    }

    async fn get_vendor_by_user_id(&self, user_id: Uuid) -> Result<Vendor> {
        let id = self
            .vendor_id_for_user(user_id)?
            .ok_or_else(|| MarketError::not_found("vendor for user", user_id))?;
        self.read(CF_VENDORS, id)?
            .ok_or_else(|| MarketError::not_found("vendor for user", user_id))
    }

    async fn update_vendor(&self, mut vendor: Vendor) -> Result<Vendor> {
        let _guard = self.write_lock.lock().await;
        let existing: Vendor = self
            .read(CF_VENDORS, vendor.id)?
            .ok_or_else(|| MarketError::not_found("vendor", vendor.id))?;

        vendor.rebase_on(&existing);

        self.write(CF_VENDORS, vendor.id, &vendor)?;
        Ok(vendor)
    }

    async fn transition_vendor_status(
        &self,
        id: Uuid,
        from: &[VendorStatus],
        to: VendorStatus,
    ) -> Result<Vendor> {
        let _guard = self.write_lock.lock().await;
        let mut vendor: Vendor = self
            .read(CF_VENDORS, id)?
            .ok_or_else(|| MarketError::not_found("vendor", id))?;
        vendor.transition(from, to)?;
        self.write(CF_VENDORS, id, &vendor)?;
        Ok(vendor)
    }

    async fn list_vendors(&self, query: &ListQuery) -> Result<Page<Vendor>> {
        let vendors: Vec<Vendor> = self.scan(CF_VENDORS)?;
        Ok(query.execute(vendors))
    }
}

#[async_trait]
impl PayoutStore for RocksDBStore {
    async fn create_payout(&self, payout: Payout) -> Result<Payout> {
        let _guard = self.write_lock.lock().await;
        if self.read::<Vendor>(CF_VENDORS, payout.vendor_id)?.is_none() {
            return Err(MarketError::not_found("vendor", payout.vendor_id));
        }
        self.write(CF_PAYOUTS, payout.id, &payout)?;
        Ok(payout)
    }

    async fn get_payout(&self, id: Uuid) -> Result<Payout> {
        self.read(CF_PAYOUTS, id)?
            .ok_or_else(|| MarketError::not_found("payout", id))
    }

    async fn transition_payout_status(
        &self,
        id: Uuid,
        from: PayoutStatus,
        to: PayoutStatus,
    ) -> Result<Payout> {
        let _guard = self.write_lock.lock().await;
        let mut payout: Payout = self
            .read(CF_PAYOUTS, id)?
            .ok_or_else(|| MarketError::not_found("payout", id))?;
        payout.advance(from, to)?;
        self.write(CF_PAYOUTS, id, &payout)?;
        Ok(payout)
    }

    async fn list_payouts(&self, query: &ListQuery) -> Result<Page<Payout>> {
        let payouts: Vec<Payout> = self.scan(CF_PAYOUTS)?;
        Ok(query.execute(payouts))
    }

    async fn sum_pending_payout_amount(&self, vendor_id: Uuid) -> Result<Decimal> {
        let payouts: Vec<Payout> = self.scan(CF_PAYOUTS)?;
        Ok(payouts
            .iter()
            .filter(|p| p.vendor_id == vendor_id && p.status == PayoutStatus::Pending)
            .map(|p| p.amount.value())
            .sum())
    }
}
