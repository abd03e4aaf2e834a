//! Collection ordering policies

use chrono::{DateTime, Utc};
use std::cmp::Ordering;

use super::ContentItem;
use crate::helpers::DateNormalizer;

/// How a collection listing is ordered. All policies are stable: items
/// with equal keys keep their directory order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortPolicy {
    /// Newest first; undated items last
    ReverseChronological,
    /// Numeric `order` ascending first, then the rest newest first
    ManualOrderThenDate,
    /// Numeric `order` ascending; items without an order last, unordered
    OrderUndefinedLast,
}

impl SortPolicy {
    /// Sort items, using the current instant for dates that cannot be read
    pub fn sort(&self, items: Vec<ContentItem>, normalizer: &DateNormalizer) -> Vec<ContentItem> {
        self.sort_at(items, normalizer, Utc::now())
    }

    /// Sort items with an explicit fallback instant
    pub fn sort_at(
        &self,
        items: Vec<ContentItem>,
        normalizer: &DateNormalizer,
        now: DateTime<Utc>,
    ) -> Vec<ContentItem> {
        let mut keyed: Vec<(SortKey, ContentItem)> = items
            .into_iter()
            .map(|item| (self.key(&item, normalizer, now), item))
            .collect();

        // `sort_by` is stable
        keyed.sort_by(|(a, _), (b, _)| self.compare(a, b));

        keyed.into_iter().map(|(_, item)| item).collect()
    }

    fn key(&self, item: &ContentItem, normalizer: &DateNormalizer, now: DateTime<Utc>) -> SortKey {
        let metadata = &item.metadata;
        match self {
            SortPolicy::ReverseChronological => SortKey {
                order: None,
                date: metadata
                    .date
                    .as_ref()
                    .map(|date| normalizer.normalize_at(Some(date), now)),
            },
            SortPolicy::ManualOrderThenDate => SortKey {
                order: metadata.order,
                date: Some(normalizer.normalize_at(metadata.date.as_ref(), now)),
            },
            SortPolicy::OrderUndefinedLast => SortKey {
                order: metadata.order,
                date: None,
            },
        }
    }

    fn compare(&self, a: &SortKey, b: &SortKey) -> Ordering {
        match self {
            SortPolicy::ReverseChronological => newest_first_undated_last(a.date, b.date),
            SortPolicy::ManualOrderThenDate => match (a.order, b.order) {
                (Some(x), Some(y)) => x.total_cmp(&y),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => newest_first_undated_last(a.date, b.date),
            },
            SortPolicy::OrderUndefinedLast => match (a.order, b.order) {
                (Some(x), Some(y)) => x.total_cmp(&y),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct SortKey {
    order: Option<f64>,
    date: Option<DateTime<Utc>>,
}

fn newest_first_undated_last(a: Option<DateTime<Utc>>, b: Option<DateTime<Utc>>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
