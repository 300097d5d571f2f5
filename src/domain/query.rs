//! Listing queries shared by the vendor and payout stores.
//!
//! A [`ListQuery`] is a conjunction of [`Predicate`]s plus a [`Pagination`]
//! window. Stores hand their candidate rows to [`ListQuery::execute`], which
//! counts every match, orders by `created_at` descending (id descending breaks
//! ties) and slices out the requested page.

use super::payout::{Payout, PayoutFilter, PayoutStatus};
use super::vendor::{Vendor, VendorFilter, VendorStatus};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::cmp::Reverse;
use uuid::Uuid;

pub const DEFAULT_PAGE_LIMIT: u32 = 20;
pub const DEFAULT_MAX_PAGE_LIMIT: u32 = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    VendorStatusEq(VendorStatus),
    PayoutStatusEq(PayoutStatus),
    VendorIdEq(Uuid),
    /// Lower-cased needle, matched against company name or tax id.
    Search(String),
}

/// A row that listing queries can filter and order.
pub trait Listable {
    fn id(&self) -> Uuid;
    fn created_at(&self) -> DateTime<Utc>;
    /// Predicates that do not apply to this row type never match.
    fn satisfies(&self, predicate: &Predicate) -> bool;
}

impl Listable for Vendor {
    fn id(&self) -> Uuid {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn satisfies(&self, predicate: &Predicate) -> bool {
        match predicate {
            Predicate::VendorStatusEq(status) => self.status == *status,
            Predicate::Search(needle) => self.matches_search(needle),
            Predicate::VendorIdEq(id) => self.id == *id,
            Predicate::PayoutStatusEq(_) => false,
        }
    }
}

impl Listable for Payout {
    fn id(&self) -> Uuid {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn satisfies(&self, predicate: &Predicate) -> bool {
        match predicate {
            Predicate::PayoutStatusEq(status) => self.status == *status,
            Predicate::VendorIdEq(id) => self.vendor_id == *id,
            Predicate::VendorStatusEq(_) | Predicate::Search(_) => false,
        }
    }
}

/// A clamped page window: `page >= 1` and `1 <= limit <= max_limit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    page: u32,
    limit: u32,
}

impl Pagination {
    pub fn new(page: i64, limit: i64, max_limit: u32) -> Self {
        let max_limit = max_limit.max(1);
        let page = u32::try_from(page.max(1)).unwrap_or(u32::MAX);
        let limit = u32::try_from(limit.clamp(1, i64::from(max_limit))).unwrap_or(max_limit);
        Self { page, limit }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }

    pub fn total_pages(&self, total: u64) -> u64 {
        total.div_ceil(u64::from(self.limit))
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ListQuery {
    predicates: Vec<Predicate>,
    pagination: Pagination,
}

impl ListQuery {
    pub fn vendors(filter: &VendorFilter, pagination: Pagination) -> Self {
        let mut predicates = Vec::new();
        if let Some(status) = filter.status {
            predicates.push(Predicate::VendorStatusEq(status));
        }
        if let Some(search) = filter.search.as_deref().map(str::trim)
            && !search.is_empty()
        {
            predicates.push(Predicate::Search(search.to_lowercase()));
        }
        Self {
            predicates,
            pagination,
        }
    }

    pub fn payouts(filter: &PayoutFilter, pagination: Pagination) -> Self {
        let mut predicates = Vec::new();
        if let Some(vendor_id) = filter.vendor_id {
            predicates.push(Predicate::VendorIdEq(vendor_id));
        }
        if let Some(status) = filter.status {
            predicates.push(Predicate::PayoutStatusEq(status));
        }
        Self {
            predicates,
            pagination,
        }
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub fn pagination(&self) -> Pagination {
        self.pagination
    }

    pub fn matches<T: Listable>(&self, row: &T) -> bool {
        self.predicates.iter().all(|p| row.satisfies(p))
    }

    /// Filters, counts, orders and paginates `rows`.
    pub fn execute<T, I>(&self, rows: I) -> Page<T>
    where
        T: Listable,
        I: IntoIterator<Item = T>,
    {
        let mut matched: Vec<T> = rows.into_iter().filter(|row| self.matches(row)).collect();
        let total = matched.len() as u64;
        matched.sort_by_key(|row| Reverse((row.created_at(), row.id())));

        let offset = usize::try_from(self.pagination.offset()).unwrap_or(usize::MAX);
        let items = matched
            .into_iter()
            .skip(offset)
            .take(self.pagination.limit() as usize)
            .collect();

        Page {
            items,
            total,
            page: self.pagination.page(),
            limit: self.pagination.limit(),
            total_pages: self.pagination.total_pages(total),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u64,
}
