//! Aggregate module
//!
//! The in-memory order aggregate: a userId → User map folded from every
//! non-duplicate legacy record seen so far. The store is an explicitly
//! owned object constructed at process start and passed by handle; tests
//! get isolation by building fresh instances.

use std::collections::BTreeMap;

use crate::broadcast::OrderBroadcaster;
use crate::domain::{LegacyRecord, Order, OrderEvent, User};

/// Canonical store of aggregated users, keyed by userId.
///
/// Keys iterate in ascending numeric order, which fixes the order of
/// query results.
#[derive(Debug)]
pub struct OrderStore {
    users: BTreeMap<i64, User>,
    broadcaster: OrderBroadcaster,
}

impl OrderStore {
    pub fn new(broadcaster: OrderBroadcaster) -> Self {
        Self {
            users: BTreeMap::new(),
            broadcaster,
        }
    }

    /// Fold one parsed record into the aggregate.
    ///
    /// Creates the user on first sight, creates the order on first sight
    /// under that user, appends the product, and publishes the updated
    /// order to live subscribers. Returns the published event.
    pub fn apply(&mut self, record: &LegacyRecord) -> OrderEvent {
        let user = self
            .users
            .entry(record.user_id)
            .or_insert_with(|| User::new(record.user_id, &record.user_name));

        let idx = match user
            .orders
            .iter()
            .position(|o| o.order_id == record.order_id)
        {
            Some(idx) => idx,
            None => {
                user.orders.push(Order::open(record.order_id, &record.date));
                user.orders.len() - 1
            }
        };

        let order = &mut user.orders[idx];
        order.add_product(record.product_id, record.value);

        let event = OrderEvent::OrderUpdated {
            user_id: record.user_id,
            order: order.clone(),
        };
        self.broadcaster.publish(event.clone());
        event
    }

    pub fn get(&self, user_id: i64) -> Option<&User> {
        self.users.get(&user_id)
    }

    /// All users in ascending userId order.
    pub fn users(&self) -> impl Iterator<Item = &User> {
        self.users.values()
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn record(user_id: i64, order_id: i64, product_id: i64, value: &str) -> LegacyRecord {
        LegacyRecord {
            user_id,
            user_name: format!("User {}", user_id),
            order_id,
            product_id,
            value: value.parse().unwrap(),
            date: "20210618".to_string(),
        }
    }

    fn store() -> OrderStore {
        OrderStore::new(OrderBroadcaster::new(30))
    }

    #[test]
    fn test_apply_creates_user_order_product() {
        let mut store = store();
        let rec = LegacyRecord {
            user_id: 85,
            user_name: "Jama Block".to_string(),
            order_id: 906,
            product_id: 4,
            value: dec!(293.47),
            date: "20210618".to_string(),
        };

        store.apply(&rec);

        let user = store.get(85).unwrap();
        assert_eq!(user.user_name, "Jama Block");
        assert_eq!(user.orders.len(), 1);

        let order = &user.orders[0];
        assert_eq!(order.order_id, 906);
        assert_eq!(order.date, "2021-06-18");
        assert_eq!(order.products.len(), 1);
        assert_eq!(order.products[0].product_id, 4);
        assert_eq!(order.products[0].value, dec!(293.47));
        assert_eq!(order.total, dec!(293.47));
    }

    #[test]
    fn test_apply_same_order_accumulates() {
        let mut store = store();
        store.apply(&record(85, 906, 1, "100.00"));
        store.apply(&record(85, 906, 2, "50.50"));

        let user = store.get(85).unwrap();
        assert_eq!(user.orders.len(), 1);
        assert_eq!(user.orders[0].products.len(), 2);
        assert_eq!(user.orders[0].total, dec!(150.50));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_apply_same_user_new_order_appends() {
        let mut store = store();
        store.apply(&record(85, 906, 1, "100.00"));
        store.apply(&record(85, 907, 1, "10.00"));

        let user = store.get(85).unwrap();
        assert_eq!(user.orders.len(), 2);
        // Insertion order is first-seen order.
        assert_eq!(user.orders[0].order_id, 906);
        assert_eq!(user.orders[1].order_id, 907);
    }

    #[test]
    fn test_apply_second_user_does_not_touch_first() {
        let mut store = store();
        store.apply(&record(85, 906, 1, "100.00"));
        store.apply(&record(86, 906, 1, "20.00"));

        assert_eq!(store.len(), 2);
        assert_eq!(store.get(85).unwrap().orders[0].total, dec!(100.00));
        assert_eq!(store.get(86).unwrap().orders[0].total, dec!(20.00));
    }

    #[test]
    fn test_users_iterate_in_ascending_id_order() {
        let mut store = store();
        store.apply(&record(300, 1, 1, "1.00"));
        store.apply(&record(2, 2, 1, "1.00"));
        store.apply(&record(85, 3, 1, "1.00"));

        let ids: Vec<i64> = store.users().map(|u| u.user_id).collect();
        assert_eq!(ids, vec![2, 85, 300]);
    }

    #[tokio::test]
    async fn test_apply_publishes_order_updated() {
        let broadcaster = OrderBroadcaster::new(30);
        let mut rx = broadcaster.subscribe().unwrap();
        let mut store = OrderStore::new(broadcaster);

        store.apply(&record(85, 906, 1, "100.00"));
        store.apply(&record(85, 906, 2, "50.00"));

        let first = rx.recv().await.unwrap();
        let OrderEvent::OrderUpdated { order, user_id } = first;
        assert_eq!(user_id, 85);
        assert_eq!(order.products.len(), 1);

        // The second event carries the full order state so far.
        let OrderEvent::OrderUpdated { order, .. } = rx.recv().await.unwrap();
        assert_eq!(order.products.len(), 2);
        assert_eq!(order.total, dec!(150.00));
    }

    #[test]
    fn test_returned_event_matches_store_state() {
        let mut store = store();
        let event = store.apply(&record(85, 906, 1, "100.00"));

        let OrderEvent::OrderUpdated { order, .. } = event;
        assert_eq!(&order, &store.get(85).unwrap().orders[0]);
    }
}
