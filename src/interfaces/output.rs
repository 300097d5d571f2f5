use crate::domain::money::{Amount, CommissionRate, Currency};
use crate::domain::payout::{Payout, PayoutMethod, PayoutStatus};
use crate::domain::query::Page;
use crate::domain::vendor::{BusinessType, Vendor, VendorStatus};
use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::Serialize;
use std::io::{self, Write};
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum OutputError {
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Json,
    Csv,
}

/// Flat projection of a vendor for tabular output; sub-documents are omitted.
#[derive(Debug, Serialize)]
struct VendorRow<'a> {
    id: Uuid,
    user_id: Uuid,
    company_name: &'a str,
    business_type: BusinessType,
    tax_id: Option<&'a str>,
    status: VendorStatus,
    commission_rate: CommissionRate,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl<'a> From<&'a Vendor> for VendorRow<'a> {
    fn from(vendor: &'a Vendor) -> Self {
        Self {
            id: vendor.id,
            user_id: vendor.user_id,
            company_name: &vendor.company_name,
            business_type: vendor.business_type,
            tax_id: vendor.tax_id.as_deref(),
            status: vendor.status,
            commission_rate: vendor.commission_rate,
            created_at: vendor.created_at,
            updated_at: vendor.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
struct PayoutRow<'a> {
    id: Uuid,
    vendor_id: Uuid,
    amount: Amount,
    currency: &'a Currency,
    status: PayoutStatus,
    payout_method: PayoutMethod,
    processed_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl<'a> From<&'a Payout> for PayoutRow<'a> {
    fn from(payout: &'a Payout) -> Self {
        Self {
            id: payout.id,
            vendor_id: payout.vendor_id,
            amount: payout.amount,
            currency: &payout.currency,
            status: payout.status,
            payout_method: payout.payout_method,
            processed_at: payout.processed_at,
            created_at: payout.created_at,
        }
    }
}

/// Writes command results: single values as pretty JSON, listings as JSON
/// pages or CSV rows.
pub struct ListingWriter<W: Write> {
    inner: W,
}

impl<W: Write> ListingWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub fn write_json<T: Serialize>(&mut self, value: &T) -> Result<(), OutputError> {
        serde_json::to_writer_pretty(&mut self.inner, value)?;
        writeln!(self.inner)?;
        Ok(())
    }

    pub fn write_vendors(&mut self, page: &Page<Vendor>, format: OutputFormat) -> Result<(), OutputError> {
        match format {
            OutputFormat::Json => self.write_json(page),
            OutputFormat::Csv => self.write_rows(page.items.iter().map(VendorRow::from)),
        }
    }

    pub fn write_payouts(&mut self, page: &Page<Payout>, format: OutputFormat) -> Result<(), OutputError> {
        match format {
            OutputFormat::Json => self.write_json(page),
            OutputFormat::Csv => self.write_rows(page.items.iter().map(PayoutRow::from)),
        }
    }

    fn write_rows<T, I>(&mut self, rows: I) -> Result<(), OutputError>
    where
        T: Serialize,
        I: IntoIterator<Item = T>,
    {
        let mut wtr = csv::Writer::from_writer(&mut self.inner);
        for row in rows {
            wtr.serialize(row)?;
        }
        wtr.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}
