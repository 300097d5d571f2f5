//! Application layer containing the lifecycle orchestration.
//!
//! `VendorService` and `PayoutService` are the entry points callers use. They
//! compose the storage, cache and payment-processor ports, and hand
//! settlement off to a background tokio task whose result comes back through
//! a `SettlementHandle`.

pub mod payout_service;
pub mod settlement;
pub mod vendor_service;
