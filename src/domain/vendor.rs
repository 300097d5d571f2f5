use super::money::CommissionRate;
use crate::error::MarketError;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Open key/value document for forward-compatible fields.
pub type Document = Map<String, Value>;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Hash)]
#[serde(rename_all = "lowercase")]
pub enum VendorStatus {
    Pending,
    Active,
    Suspended,
    Rejected,
}

impl VendorStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Active => "active",
            Self::Suspended => "suspended",
            Self::Rejected => "rejected",
        }
    }
}

impl std::fmt::Display for VendorStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for VendorStatus {
    type Err = MarketError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "active" => Ok(Self::Active),
            "suspended" => Ok(Self::Suspended),
            "rejected" => Ok(Self::Rejected),
            other => Err(MarketError::ValidationError(format!(
                "Unknown vendor status: {other}"
            ))),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum BusinessType {
    Individual,
    Company,
    Cooperative,
}

/// Postal address of a vendor. Unknown keys survive a round trip through `extra`.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Default)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    #[serde(flatten)]
    pub extra: Document,
}

impl Address {
    pub fn validate(&self) -> Result<(), MarketError> {
        require("address.street", &self.street)?;
        require("address.city", &self.city)?;
        require("address.state", &self.state)?;
        require("address.postal_code", &self.postal_code)?;
        require("address.country", &self.country)
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Default)]
pub struct BankDetails {
    pub account_name: String,
    pub account_number: String,
    pub bank_name: String,
    pub bank_code: String,
    #[serde(default)]
    pub iban: Option<String>,
    #[serde(default)]
    pub swift_code: Option<String>,
    #[serde(flatten)]
    pub extra: Document,
}

impl BankDetails {
    pub fn validate(&self) -> Result<(), MarketError> {
        require("bank_details.account_name", &self.account_name)?;
        require("bank_details.account_number", &self.account_number)?;
        require("bank_details.bank_name", &self.bank_name)?;
        require("bank_details.bank_code", &self.bank_code)
    }
}

/// A marketplace seller account.
///
/// `rating`, `total_sales` and `total_orders` are maintained by the reporting
/// pipeline; nothing in this crate writes them after registration.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Vendor {
    pub id: Uuid,
    pub user_id: Uuid,
    pub company_name: String,
    pub business_type: BusinessType,
    pub tax_id: Option<String>,
    pub registration_number: Option<String>,
    pub status: VendorStatus,
    pub commission_rate: CommissionRate,
    pub rating: Decimal,
    pub total_sales: Decimal,
    pub total_orders: u64,
    pub address: Address,
    pub bank_details: BankDetails,
    #[serde(default)]
    pub verification_documents: Document,
    #[serde(default)]
    pub settings: Document,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Vendor {
    /// Builds a freshly registered vendor in `pending` with zeroed counters.
    pub fn register(request: VendorRegistration, commission_rate: CommissionRate) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id: request.user_id,
            company_name: request.company_name,
            business_type: request.business_type,
            tax_id: request.tax_id,
            registration_number: request.registration_number,
            status: VendorStatus::Pending,
            commission_rate,
            rating: Decimal::ZERO,
            total_sales: Decimal::ZERO,
            total_orders: 0,
            address: request.address,
            bank_details: request.bank_details,
            verification_documents: Document::new(),
            settings: Document::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Merges the fields present in `patch`; absent fields are left untouched.
    ///
    /// Address and bank details are replaced wholesale, never deep-merged.
    pub fn apply(&mut self, patch: VendorPatch) {
        if let Some(company_name) = patch.company_name {
            self.company_name = company_name;
        }
        if let Some(business_type) = patch.business_type {
            self.business_type = business_type;
        }
        if let Some(tax_id) = patch.tax_id {
            self.tax_id = Some(tax_id);
        }
        if let Some(registration_number) = patch.registration_number {
            self.registration_number = Some(registration_number);
        }
        if let Some(address) = patch.address {
            self.address = address;
        }
        if let Some(bank_details) = patch.bank_details {
            self.bank_details = bank_details;
        }
        if let Some(settings) = patch.settings {
            self.settings = settings;
        }
    }

    /// Moves to `to` if the current status is one of `from`.
    pub fn transition(&mut self, from: &[VendorStatus], to: VendorStatus) -> Result<(), MarketError> {
        if !from.contains(&self.status) {
            return Err(MarketError::InvalidState(format!(
                "vendor {} is {}, cannot become {}",
                self.id, self.status, to
            )));
        }
        self.status = to;
        self.touch();
        Ok(())
    }

    /// Takes the fields that only the store and the state machine may change
    /// from `persisted`, then bumps `updated_at`.
    ///
    /// Identity, timestamps, status, commission rate and the reporting
    /// counters all come from `persisted`, so a full replace built from a
    /// stale read cannot undo a status transition.
    pub fn rebase_on(&mut self, persisted: &Vendor) {
        self.user_id = persisted.user_id;
        self.status = persisted.status;
        self.commission_rate = persisted.commission_rate;
        self.rating = persisted.rating;
        self.total_sales = persisted.total_sales;
        self.total_orders = persisted.total_orders;
        self.created_at = persisted.created_at;
        self.updated_at = persisted.updated_at;
        self.touch();
    }

    /// Bumps `updated_at`, never letting it stand still or go backwards.
    pub fn touch(&mut self) {
        let floor = self.updated_at + chrono::Duration::microseconds(1);
        self.updated_at = Utc::now().max(floor);
    }

    /// Case-insensitive substring match over company name or tax id.
    /// `needle` must already be lower case.
    pub fn matches_search(&self, needle: &str) -> bool {
        self.company_name.to_lowercase().contains(needle)
            || self
                .tax_id
                .as_deref()
                .is_some_and(|tax_id| tax_id.to_lowercase().contains(needle))
    }
}

#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct VendorRegistration {
    pub user_id: Uuid,
    pub company_name: String,
    pub business_type: BusinessType,
    #[serde(default)]
    pub tax_id: Option<String>,
    #[serde(default)]
    pub registration_number: Option<String>,
    pub address: Address,
    pub bank_details: BankDetails,
}

impl VendorRegistration {
    pub fn validate(&self) -> Result<(), MarketError> {
        validate_company_name(&self.company_name)?;
        if let Some(tax_id) = &self.tax_id {
            validate_tax_id(tax_id)?;
        }
        if let Some(registration_number) = &self.registration_number {
            validate_registration_number(registration_number)?;
        }
        self.address.validate()?;
        self.bank_details.validate()
    }
}

/// Partial update of a vendor. `None` means "leave as is".
#[derive(Debug, Deserialize, PartialEq, Clone, Default)]
pub struct VendorPatch {
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub business_type: Option<BusinessType>,
    #[serde(default)]
    pub tax_id: Option<String>,
    #[serde(default)]
    pub registration_number: Option<String>,
    #[serde(default)]
    pub address: Option<Address>,
    #[serde(default)]
    pub bank_details: Option<BankDetails>,
    #[serde(default)]
    pub settings: Option<Document>,
}

impl VendorPatch {
    pub fn validate(&self) -> Result<(), MarketError> {
        if let Some(company_name) = &self.company_name {
            validate_company_name(company_name)?;
        }
        if let Some(tax_id) = &self.tax_id {
            validate_tax_id(tax_id)?;
        }
        if let Some(registration_number) = &self.registration_number {
            validate_registration_number(registration_number)?;
        }
        if let Some(address) = &self.address {
            address.validate()?;
        }
        if let Some(bank_details) = &self.bank_details {
            bank_details.validate()?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct VendorFilter {
    pub status: Option<VendorStatus>,
    pub search: Option<String>,
}

fn require(field: &str, value: &str) -> Result<(), MarketError> {
    if value.trim().is_empty() {
        Err(MarketError::ValidationError(format!("{field} is required")))
    } else {
        Ok(())
    }
}

fn validate_length(field: &str, value: &str, min: usize, max: usize) -> Result<(), MarketError> {
    let len = value.chars().count();
    if len < min || len > max {
        Err(MarketError::ValidationError(format!(
            "{field} must be between {min} and {max} characters, got {len}"
        )))
    } else {
        Ok(())
    }
}

fn validate_company_name(name: &str) -> Result<(), MarketError> {
    validate_length("company_name", name.trim(), 2, 255)
}

fn validate_tax_id(tax_id: &str) -> Result<(), MarketError> {
    validate_length("tax_id", tax_id, 5, 50)
}

fn validate_registration_number(number: &str) -> Result<(), MarketError> {
    validate_length("registration_number", number, 0, 100)
}
