use super::money::{Amount, Currency};
use super::vendor::Document;
use crate::error::MarketError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PayoutStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl PayoutStatus {
    /// `completed` and `failed` are final; `processed_at` is set on entering them.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for PayoutStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PayoutStatus {
    type Err = MarketError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "processing" => Ok(Self::Processing),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            other => Err(MarketError::ValidationError(format!(
                "Unknown payout status: {other}"
            ))),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum PayoutMethod {
    BankTransfer,
    #[serde(rename = "paypal")]
    PayPal,
    Stripe,
}

impl PayoutMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BankTransfer => "bank_transfer",
            Self::PayPal => "paypal",
            Self::Stripe => "stripe",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Payout {
    pub id: Uuid,
    pub vendor_id: Uuid,
    pub amount: Amount,
    pub currency: Currency,
    pub status: PayoutStatus,
    pub payout_method: PayoutMethod,
    pub payout_details: Document,
    pub processed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Payout {
    pub fn new(request: PayoutRequest) -> Self {
        Self {
            id: Uuid::new_v4(),
            vendor_id: request.vendor_id,
            amount: request.amount,
            currency: request.currency,
            status: PayoutStatus::Pending,
            payout_method: request.payout_method,
            payout_details: request.payout_details,
            processed_at: None,
            created_at: Utc::now(),
        }
    }

    /// Applies a guarded status change: fails with `InvalidState` unless the
    /// current status is `from`. Entering a terminal status stamps `processed_at`.
    pub fn advance(&mut self, from: PayoutStatus, to: PayoutStatus) -> Result<(), MarketError> {
        if self.status != from {
            return Err(MarketError::InvalidState(format!(
                "payout {} is {}, expected {}",
                self.id, self.status, from
            )));
        }
        self.status = to;
        if to.is_terminal() {
            self.processed_at = Some(Utc::now());
        }
        Ok(())
    }
}

/// A request to pay a vendor out.
///
/// `amount` and `currency` validate while deserializing, so a parsed request
/// is already well-formed.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct PayoutRequest {
    pub vendor_id: Uuid,
    pub amount: Amount,
    pub currency: Currency,
    pub payout_method: PayoutMethod,
    pub payout_details: Document,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PayoutFilter {
    pub vendor_id: Option<Uuid>,
    pub status: Option<PayoutStatus>,
}
