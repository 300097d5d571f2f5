#![allow(dead_code)]

use rust_decimal::Decimal;
use serde_json::{Value, json};
use std::sync::Arc;
use uuid::Uuid;
use vendor_payouts::application::payout_service::PayoutService;
use vendor_payouts::application::settlement::SimulatedProcessor;
use vendor_payouts::application::vendor_service::VendorService;
use vendor_payouts::config::Config;
use vendor_payouts::domain::money::{Amount, Currency};
use vendor_payouts::domain::payout::{PayoutMethod, PayoutRequest};
use vendor_payouts::domain::vendor::{
    Address, BankDetails, BusinessType, Document, Vendor, VendorRegistration,
};
use vendor_payouts::infrastructure::in_memory::{InMemoryStore, InMemoryVendorCache};

/// Services wired over one shared in-memory store and cache.
pub struct Harness {
    pub store: InMemoryStore,
    pub cache: InMemoryVendorCache,
    pub vendors: VendorService,
    pub payouts: PayoutService,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(&Config::default())
    }

    pub fn with_config(config: &Config) -> Self {
        let store = InMemoryStore::new();
        let cache = InMemoryVendorCache::new();
        let vendors = VendorService::new(
            Arc::new(store.clone()),
            Arc::new(cache.clone()),
            config,
        );
        let payouts = PayoutService::new(
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            Arc::new(SimulatedProcessor),
        );
        Self {
            store,
            cache,
            vendors,
            payouts,
        }
    }

    pub async fn active_vendor(&self) -> Vendor {
        let vendor = self
            .vendors
            .register(registration(Uuid::new_v4(), "Acme Books"))
            .await
            .unwrap();
        self.vendors.approve(vendor.id).await.unwrap()
    }
}

pub fn registration(user_id: Uuid, company_name: &str) -> VendorRegistration {
    VendorRegistration {
        user_id,
        company_name: company_name.to_string(),
        business_type: BusinessType::Company,
        tax_id: Some(format!("TAX-{}", &user_id.simple().to_string()[..8])),
        registration_number: None,
        address: Address {
            street: "1 Main St".to_string(),
            city: "Springfield".to_string(),
            state: "IL".to_string(),
            postal_code: "62701".to_string(),
            country: "US".to_string(),
            extra: Document::new(),
        },
        bank_details: BankDetails {
            account_name: company_name.to_string(),
            account_number: "000123".to_string(),
            bank_name: "First Bank".to_string(),
            bank_code: "FB01".to_string(),
            iban: None,
            swift_code: None,
            extra: Document::new(),
        },
    }
}

pub fn payout_request(vendor_id: Uuid, amount: Decimal) -> PayoutRequest {
    PayoutRequest {
        vendor_id,
        amount: Amount::new(amount).unwrap(),
        currency: Currency::new("USD").unwrap(),
        payout_method: PayoutMethod::BankTransfer,
        payout_details: Document::new(),
    }
}

pub fn registration_json(user_id: Uuid, company_name: &str) -> Value {
    json!({
        "user_id": user_id,
        "company_name": company_name,
        "business_type": "company",
        "tax_id": "TAX-99887",
        "address": {
            "street": "1 Main St",
            "city": "Springfield",
            "state": "IL",
            "postal_code": "62701",
            "country": "US"
        },
        "bank_details": {
            "account_name": company_name,
            "account_number": "000123",
            "bank_name": "First Bank",
            "bank_code": "FB01"
        }
    })
}
