//! Query/filter engine
//!
//! Filters the in-memory aggregate by user id, order id and date range.
//! A user is included, whole, when at least one of their orders matches
//! every supplied criterion.

use chrono::NaiveDate;

use crate::aggregate::OrderStore;
use crate::domain::{Order, User};

/// Filter criteria; `None` fields are not applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderFilter {
    pub user_id: Option<i64>,
    pub order_id: Option<i64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl OrderFilter {
    /// Whether this order, under this user, satisfies every supplied
    /// criterion.
    fn matches(&self, user: &User, order: &Order) -> bool {
        if let Some(user_id) = self.user_id {
            if user.user_id != user_id {
                return false;
            }
        }
        if let Some(order_id) = self.order_id {
            if order.order_id != order_id {
                return false;
            }
        }

        if self.start_date.is_some() || self.end_date.is_some() {
            // Calendar comparison; an order whose date does not parse
            // never matches a date criterion.
            let date = match NaiveDate::parse_from_str(&order.date, "%Y-%m-%d") {
                Ok(date) => date,
                Err(_) => return false,
            };
            if let Some(start) = self.start_date {
                if date < start {
                    return false;
                }
            }
            if let Some(end) = self.end_date {
                if date > end {
                    return false;
                }
            }
        }

        true
    }
}

/// Users having at least one order matching all supplied criteria.
/// Matching users are returned in full, all their orders included. No
/// criteria returns every user.
pub fn filter_users(store: &OrderStore, filter: &OrderFilter) -> Vec<User> {
    store
        .users()
        .filter(|user| user.orders.iter().any(|order| filter.matches(user, order)))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broadcast::OrderBroadcaster;
    use crate::domain::LegacyRecord;
    use rust_decimal_macros::dec;

    fn seeded_store() -> OrderStore {
        let mut store = OrderStore::new(OrderBroadcaster::new(30));
        for (user_id, name, order_id, date) in [
            (85, "Jama Block", 906, "20210618"),
            (85, "Jama Block", 907, "20210702"),
            (86, "Kat Ryndem", 811, "20210301"),
            (90, "Vern Bauch", 815, "20211125"),
        ] {
            store.apply(&LegacyRecord {
                user_id,
                user_name: name.to_string(),
                order_id,
                product_id: 1,
                value: dec!(10.00),
                date: date.to_string(),
            });
        }
        store
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_no_criteria_returns_all_users() {
        let store = seeded_store();
        let users = filter_users(&store, &OrderFilter::default());
        assert_eq!(users.len(), 3);
    }

    #[test]
    fn test_filter_by_user_id() {
        let store = seeded_store();
        let users = filter_users(
            &store,
            &OrderFilter {
                user_id: Some(86),
                ..Default::default()
            },
        );
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].user_name, "Kat Ryndem");
    }

    #[test]
    fn test_filter_by_unknown_user_is_empty() {
        let store = seeded_store();
        let users = filter_users(
            &store,
            &OrderFilter {
                user_id: Some(999),
                ..Default::default()
            },
        );
        assert!(users.is_empty());
    }

    #[test]
    fn test_filter_by_order_id_returns_whole_user() {
        let store = seeded_store();
        let users = filter_users(
            &store,
            &OrderFilter {
                order_id: Some(906),
                ..Default::default()
            },
        );
        assert_eq!(users.len(), 1);
        // The user comes back in full, not just the matching order.
        assert_eq!(users[0].orders.len(), 2);
    }

    #[test]
    fn test_filter_by_date_range() {
        let store = seeded_store();
        let users = filter_users(
            &store,
            &OrderFilter {
                start_date: Some(date("2021-06-01")),
                end_date: Some(date("2021-07-31")),
                ..Default::default()
            },
        );
        let ids: Vec<i64> = users.iter().map(|u| u.user_id).collect();
        assert_eq!(ids, vec![85]);
    }

    #[test]
    fn test_all_criteria_must_match_within_one_order() {
        let store = seeded_store();
        // User 85 has order 906 (June) and 907 (July). Asking for order
        // 906 in July matches nothing: criteria apply to a single order.
        let users = filter_users(
            &store,
            &OrderFilter {
                user_id: Some(85),
                order_id: Some(906),
                start_date: Some(date("2021-07-01")),
                ..Default::default()
            },
        );
        assert!(users.is_empty());
    }

    #[test]
    fn test_start_date_only() {
        let store = seeded_store();
        let users = filter_users(
            &store,
            &OrderFilter {
                start_date: Some(date("2021-11-01")),
                ..Default::default()
            },
        );
        let ids: Vec<i64> = users.iter().map(|u| u.user_id).collect();
        assert_eq!(ids, vec![90]);
    }
}
