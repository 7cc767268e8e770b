//! List query parsing, filtering, search, ordering and pagination

use std::cmp::Ordering;

use chrono::NaiveDate;
use serde::Serialize;

use crate::constants::{DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT, MSG_INVALID_DATE};
use crate::error::{FieldErrors, Result};
use crate::model::Owned;

pub const DATE_FROM: &str = "created_at__date__gte";
pub const DATE_TO: &str = "created_at__date__lte";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderField {
    Id,
    Name,
    CreatedAt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderKey {
    pub field: OrderField,
    pub desc: bool,
}

impl OrderKey {
    /// `name`, `-created_at`, ...; unknown fields yield `None`
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        let (desc, name) = match raw.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, raw),
        };
        let field = match name {
            "id" => OrderField::Id,
            "name" => OrderField::Name,
            "created_at" => OrderField::CreatedAt,
            _ => return None,
        };
        Some(OrderKey { field, desc })
    }

    fn compare<T: Owned>(&self, a: &T, b: &T) -> Ordering {
        let o = match self.field {
            OrderField::Id => a.id().as_bytes().cmp(b.id().as_bytes()),
            OrderField::Name => a.name().cmp(b.name()),
            OrderField::CreatedAt => a.created_at().cmp(&b.created_at()),
        };
        if self.desc {
            o.reverse()
        } else {
            o
        }
    }
}

/// Parsed list/export/removal query string
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListQuery {
    /// `None` means the default page size
    pub limit: Option<usize>,
    pub offset: usize,
    pub created_from: Option<NaiveDate>,
    pub created_to: Option<NaiveDate>,
    pub ordering: Vec<OrderKey>,
    pub search: Vec<String>,
    pub name_search: Vec<String>,
    pub columns: Vec<String>,
    pub ids: Vec<String>,
}

impl ListQuery {
    /// Parse a raw query string, with or without the leading `?`
    pub fn parse(query: &str) -> Result<Self> {
        let query = query.strip_prefix('?').unwrap_or(query);
        let mut q = ListQuery::default();
        let mut errors = FieldErrors::new();
        for (k, v) in url::form_urlencoded::parse(query.as_bytes()) {
            match k.as_ref() {
                "limit" => q.limit = positive(&v).or(q.limit),
                "offset" => q.offset = non_negative(&v).unwrap_or(q.offset),
                DATE_FROM => match date(&v) {
                    Some(d) => q.created_from = Some(d),
                    None => errors.add(DATE_FROM, MSG_INVALID_DATE),
                },
                DATE_TO => match date(&v) {
                    Some(d) => q.created_to = Some(d),
                    None => errors.add(DATE_TO, MSG_INVALID_DATE),
                },
                "order_by" | "ordering" => q.ordering.extend(v.split(',').filter_map(OrderKey::parse)),
                "search" => q.search.extend(terms(&v)),
                "name__search" => q.name_search.extend(terms(&v)),
                "column" => q.columns.extend(list(&v)),
                "ids" => q.ids.extend(list(&v)),
                _ => {}
            }
        }
        errors.into_result()?;
        Ok(q)
    }

    /// Effective page size
    pub fn page_limit(&self) -> usize {
        self.limit.unwrap_or(DEFAULT_PAGE_LIMIT).min(MAX_PAGE_LIMIT)
    }

    /// Does a record pass the date filters and both searches
    pub fn matches<T: Owned>(&self, item: &T) -> bool {
        let day = item.created_at().date_naive();
        if self.created_from.is_some_and(|d| day < d) || self.created_to.is_some_and(|d| day > d) {
            return false;
        }
        let name = item.name().to_lowercase();
        if !self.search.iter().all(|t| name.contains(t.as_str())) {
            return false;
        }
        if !self.name_search.is_empty() {
            let words: Vec<&str> = name.split(|c: char| !c.is_alphanumeric()).filter(|w| !w.is_empty()).collect();
            if !self.name_search.iter().all(|t| words.contains(&t.as_str())) {
                return false;
            }
        }
        true
    }

    /// Filter then order; newest first unless ordering was requested
    pub fn apply<T: Owned>(&self, items: Vec<T>) -> Vec<T> {
        let mut items: Vec<T> = items.into_iter().filter(|i| self.matches(i)).collect();
        items.sort_by(|a, b| {
            let requested = self.ordering.iter().fold(Ordering::Equal, |acc, k| acc.then_with(|| k.compare(a, b)));
            requested
                .then_with(|| b.created_at().cmp(&a.created_at()))
                .then_with(|| b.seq().cmp(&a.seq()))
        });
        items
    }

    /// Cut one page out of already ordered items
    pub fn paginate<T>(&self, items: Vec<T>) -> Page<T> {
        let count = items.len();
        let limit = self.page_limit();
        let offset = self.offset;
        let results: Vec<T> = items.into_iter().skip(offset).take(limit).collect();
        let end = offset.saturating_add(limit);
        let next = (end < count).then(|| page_link(limit, end));
        let previous = (offset > 0).then(|| page_link(limit, offset.saturating_sub(limit)));
        Page { count, next, previous, results }
    }
}

fn page_link(limit: usize, offset: usize) -> String {
    format!("?limit={}&offset={}", limit, offset)
}

fn positive(raw: &str) -> Option<usize> {
    raw.trim().parse::<usize>().ok().filter(|n| *n > 0)
}

fn non_negative(raw: &str) -> Option<usize> {
    raw.trim().parse::<usize>().ok()
}

fn date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

/// Lowercased search terms split on whitespace and commas
fn terms(raw: &str) -> impl Iterator<Item = String> + '_ {
    raw.split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
}

/// Repeated or comma-separated values
fn list(raw: &str) -> impl Iterator<Item = String> + '_ {
    raw.split(',').map(str::trim).filter(|s| !s.is_empty()).map(String::from)
}

/// Paginated envelope
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub count: usize,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    /// Convert every result, stopping at the first error
    pub fn try_map<U, F: FnMut(T) -> Result<U>>(self, f: F) -> Result<Page<U>> {
        Ok(Page {
            count: self.count,
            next: self.next,
            previous: self.previous,
            results: self.results.into_iter().map(f).collect::<Result<Vec<U>>>()?,
        })
    }
}
