mod common;

use common::{payout_request, registration};
use rust_decimal_macros::dec;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;
use vendor_payouts::application::settlement::SimulatedProcessor;
use vendor_payouts::domain::money::CommissionRate;
use vendor_payouts::domain::payout::{Payout, PayoutStatus};
use vendor_payouts::domain::ports::{
    PaymentProcessorRef, PayoutStoreRef, SettlementOutcome, VendorCacheRef, VendorStoreRef,
};
use vendor_payouts::domain::vendor::Vendor;
use vendor_payouts::infrastructure::in_memory::{InMemoryStore, InMemoryVendorCache};

#[tokio::test]
async fn test_ports_as_trait_objects() {
    let store = Arc::new(InMemoryStore::new());
    let vendor_store: VendorStoreRef = store.clone();
    let payout_store: PayoutStoreRef = store;
    let cache: VendorCacheRef = Arc::new(InMemoryVendorCache::new());
    let processor: PaymentProcessorRef = Arc::new(SimulatedProcessor);

    let vendor = Vendor::register(
        registration(Uuid::new_v4(), "Acme Books"),
        CommissionRate::default(),
    );
    let vendor_id = vendor.id;

    // Verify Send + Sync by spawning tasks
    let vs_handle = tokio::spawn({
        let vendor_store = vendor_store.clone();
        let cache = cache.clone();
        async move {
            let created = vendor_store.create_vendor(vendor).await.unwrap();
            cache.put(&created, Duration::from_secs(60)).await.unwrap();
            cache.get(created.id).await.unwrap().unwrap()
        }
    });
    let cached = vs_handle.await.unwrap();
    assert_eq!(cached.id, vendor_id);

    let ps_handle = tokio::spawn(async move {
        let payout = payout_store
            .create_payout(Payout::new(payout_request(vendor_id, dec!(42.00))))
            .await
            .unwrap();
        let outcome = processor.settle(&payout).await.unwrap();
        (payout, outcome)
    });

    let (payout, outcome) = ps_handle.await.unwrap();
    assert_eq!(payout.status, PayoutStatus::Pending);
    assert_eq!(outcome, SettlementOutcome::Completed);
    assert_eq!(vendor_store.get_vendor(vendor_id).await.unwrap().id, vendor_id);
}
