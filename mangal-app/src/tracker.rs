//! Live order tracking
//!
//! A reducer over typed channel events. The backend owns every status
//! transition; this tracker only labels the current value and derives the
//! countdown to the estimated-ready time.
//!
//! Timestamps are passed in by the caller (a one-second ticker in the view),
//! which keeps the whole state machine synchronous and testable.

use mangal_client::{Api, ChannelEvent, HttpClient, MessageClient, MessageError, Room};
use shared::models::order::{Order, OrderPatch, OrderStatus, ServiceKind, StatusGroup};
use shared::types::{GeoPoint, Timestamp};
use shared::util::parse_millis;
use std::sync::{Arc, Mutex};

use crate::validate;

/// Remaining time until the estimated-ready instant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Remaining {
    pub total_seconds: i64,
    pub minutes: i64,
    pub seconds: i64,
}

impl Remaining {
    fn from_millis(remain_ms: i64) -> Self {
        let total_seconds = remain_ms.max(0) / 1000;
        Self {
            total_seconds,
            minutes: total_seconds / 60,
            seconds: total_seconds % 60,
        }
    }
}

/// Tagged update consumed by the tracker reducer
#[derive(Debug, Clone)]
pub enum TrackerEvent {
    /// Full order state from a load or manual refetch
    Snapshot(Order),
    /// Partial update from the push channel
    Patch(OrderPatch),
    /// Driver position push
    DriverLocation(GeoPoint),
}

/// Order tracker state machine
#[derive(Debug, Clone, Default)]
pub struct OrderTracker {
    order: Option<Order>,
    accepted_at_ms: Option<Timestamp>,
    ready_at_ms: Option<Timestamp>,
    /// Set once the missing-acceptedAt fallback has fired; the captured
    /// instant is never overwritten by later reads that still lack the field
    accepted_at_defaulted: bool,
}

impl OrderTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn order(&self) -> Option<&Order> {
        self.order.as_ref()
    }

    pub fn accepted_at_ms(&self) -> Option<Timestamp> {
        self.accepted_at_ms
    }

    pub fn ready_at_ms(&self) -> Option<Timestamp> {
        self.ready_at_ms
    }

    /// Feed one event into the reducer. `now_ms` is the wall clock at
    /// delivery time; it only matters for the one-time acceptedAt fallback.
    pub fn apply(&mut self, event: TrackerEvent, now_ms: i64) {
        match event {
            TrackerEvent::Snapshot(order) => self.apply_snapshot(order, now_ms),
            TrackerEvent::Patch(patch) => self.apply_patch(patch, now_ms),
            TrackerEvent::DriverLocation(point) => {
                if let Some(order) = &mut self.order {
                    order.driver_location = Some(point);
                }
            }
        }
    }

    fn establish_accepted_at(&mut self, explicit: Option<i64>, accepted_now: Option<i64>) {
        if let Some(ts) = explicit {
            if self.accepted_at_ms.is_none() {
                self.accepted_at_ms = Some(ts);
            }
        } else if self.accepted_at_ms.is_none() {
            if let Some(now) = accepted_now {
                self.accepted_at_ms = Some(now);
                self.accepted_at_defaulted = true;
            }
        }
    }

    fn apply_snapshot(&mut self, order: Order, now_ms: i64) {
        let explicit_accepted = order.accepted_at.as_deref().and_then(parse_millis);
        let accepted_now =
            (order.status == OrderStatus::Accepted && !self.accepted_at_defaulted).then_some(now_ms);
        self.establish_accepted_at(explicit_accepted, accepted_now);

        if let Some(ready) = order.ready_at.as_deref().and_then(parse_millis) {
            self.ready_at_ms = Some(ready);
        } else if let (Some(base), Some(eta)) = (self.accepted_at_ms, order.eta_minutes) {
            self.ready_at_ms = Some(base + eta * 60_000);
        }

        self.order = Some(order);
    }

    fn apply_patch(&mut self, patch: OrderPatch, now_ms: i64) {
        let Some(order) = &mut self.order else {
            // a patch racing ahead of the snapshot has nothing to merge into
            tracing::debug!("dropping order patch before initial snapshot");
            return;
        };
        order.apply_patch(&patch);

        // acceptedAt: explicit from the payload, else the one-time fallback
        // when the status just became ACCEPTED without a timestamp
        let explicit_accepted = patch.accepted_at.as_deref().and_then(parse_millis);
        let accepted_now = (patch.status == Some(OrderStatus::Accepted)
            && patch.accepted_at.is_none()
            && !self.accepted_at_defaulted)
            .then_some(now_ms);
        self.establish_accepted_at(explicit_accepted, accepted_now);

        // readyAt: explicit wins; otherwise a new ETA recomputes from the
        // established acceptedAt base
        if let Some(ready) = patch.ready_at.as_deref().and_then(parse_millis) {
            self.ready_at_ms = Some(ready);
        } else if let Some(eta) = patch.eta_minutes {
            if let Some(base) = self.accepted_at_ms {
                self.ready_at_ms = Some(base + eta * 60_000);
            }
        }
    }

    /// Countdown to the estimated-ready instant, clamped at zero.
    ///
    /// Falls back to acceptedAt + etaMinutes when no readyAt has been
    /// derived; `None` when no estimate exists at all.
    pub fn remaining(&self, now_ms: i64) -> Option<Remaining> {
        let end = self.ready_at_ms.or_else(|| {
            let base = self.accepted_at_ms?;
            let eta = self.order.as_ref()?.eta_minutes?;
            Some(base + eta * 60_000)
        })?;
        Some(Remaining::from_millis(end - now_ms))
    }

    pub fn status_group(&self) -> Option<StatusGroup> {
        self.order.as_ref().map(|o| o.status.group())
    }

    pub fn is_in_progress(&self) -> bool {
        self.status_group() == Some(StatusGroup::InProgress)
    }

    /// Final from the customer's perspective: ready or terminal
    pub fn is_final(&self) -> bool {
        matches!(
            self.status_group(),
            Some(StatusGroup::Ready | StatusGroup::Terminal)
        )
    }

    /// Customer-facing progress message (Swedish)
    pub fn friendly_message(&self, now_ms: i64) -> Option<String> {
        let order = self.order.as_ref()?;
        if order.status == OrderStatus::Ready {
            return Some("Din mat är klar. Hoppas det smakar.".into());
        }
        if let Some(remaining) = self.remaining(now_ms) {
            if remaining.total_seconds == 0
                && matches!(
                    order.status,
                    OrderStatus::Accepted | OrderStatus::InKitchen | OrderStatus::Preparing
                )
            {
                return Some(
                    "Förlåt, det tar lite längre tid än väntat. Vi jobbar så snabbt vi kan."
                        .into(),
                );
            }
        }
        Some(match order.service_kind() {
            Some(ServiceKind::Delivery) => {
                "Tack för din beställning! Vi förbereder den och meddelar när den är på väg."
                    .into()
            }
            Some(ServiceKind::DineIn) => {
                "Tack för din beställning! Vi börjar tillaga den. Vi säger till när den är redo."
                    .into()
            }
            _ => {
                "Tack för din beställning! Vi börjar tillaga den. Vi meddelar när den är klar för upphämtning."
                    .into()
            }
        })
    }
}

/// Resolve user input into a tracked order.
///
/// A 5-digit numeric input is treated as a short lookup code first and only
/// then as a direct identifier. Every failure path lands in `Ok(None)` (a
/// non-fatal "not found" state); resolution never escalates into an error.
pub async fn resolve_order<C: HttpClient>(api: &Api<C>, input: &str) -> Option<Order> {
    let input = input.trim();
    if validate::is_lookup_code(input) {
        match api.lookup_order_id(input).await {
            Ok(id) => match api.get_order(&id).await {
                Ok(order) => return Some(order),
                Err(e) => tracing::warn!("order fetch after lookup failed: {}", e),
            },
            Err(e) => tracing::debug!("lookup code {} did not resolve: {}", input, e),
        }
    }
    match api.get_order(input).await {
        Ok(order) => Some(order),
        Err(e) => {
            tracing::warn!("order {} not found: {}", input, e);
            None
        }
    }
}

/// Live subscription binding a tracker to the push channel.
///
/// Joins the order's room on start and leaves it again on shutdown, so no
/// handler can touch state for a view that is gone.
pub struct TrackerSubscription {
    tracker: Arc<Mutex<OrderTracker>>,
    room: Room,
    client: MessageClient,
    task: tokio::task::JoinHandle<()>,
}

impl TrackerSubscription {
    pub async fn start(
        client: MessageClient,
        order: Order,
        now_ms: i64,
    ) -> Result<Self, MessageError> {
        let room = Room::Order(order.id.clone());
        let order_id = order.id.clone();
        let tracker = Arc::new(Mutex::new(OrderTracker::new()));
        tracker
            .lock()
            .expect("tracker lock")
            .apply(TrackerEvent::Snapshot(order), now_ms);

        client.join(&room).await?;

        let mut rx = client.subscribe();
        let task_tracker = tracker.clone();
        let task = tokio::spawn(async move {
            loop {
                let event = match MessageClient::recv_event(&mut rx).await {
                    Ok(event) => event,
                    Err(e) => {
                        tracing::warn!("tracker channel closed: {}", e);
                        break;
                    }
                };
                let now_ms = shared::util::now_millis();
                let mut tracker = task_tracker.lock().expect("tracker lock");
                match event {
                    ChannelEvent::OrderUpdate(patch) => {
                        // the order room only carries our own updates, but the
                        // admin feed shape includes ids; respect them
                        let for_us = patch.id.as_deref().map(|id| id == order_id);
                        if for_us != Some(false) {
                            tracker.apply(TrackerEvent::Patch(patch), now_ms);
                        }
                    }
                    ChannelEvent::DriverLocation(loc) => {
                        tracker.apply(TrackerEvent::DriverLocation(loc.point()), now_ms);
                    }
                    _ => {}
                }
            }
        });

        Ok(Self {
            tracker,
            room,
            client,
            task,
        })
    }

    pub fn tracker(&self) -> Arc<Mutex<OrderTracker>> {
        self.tracker.clone()
    }

    /// Tear down: stop the handler task, then leave the room.
    pub async fn shutdown(self) {
        self.task.abort();
        if let Err(e) = self.client.leave(&self.room).await {
            tracing::debug!("leave room failed during shutdown: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FakeHttp, FailKind};
    use serde_json::json;
    use shared::normalize::{normalize_order, normalize_order_patch};

    const T0: i64 = 1_750_000_000_000;

    fn accepted_order(eta: Option<i64>, accepted_at: Option<&str>) -> Order {
        let mut raw = json!({
            "id": "o1",
            "status": "ACCEPTED",
            "customerName": "Aram",
            "createdAt": "2025-06-15T11:00:00Z"
        });
        if let Some(eta) = eta {
            raw["etaMinutes"] = json!(eta);
        }
        if let Some(ts) = accepted_at {
            raw["acceptedAt"] = json!(ts);
        }
        normalize_order(&raw)
    }

    #[test]
    fn ready_at_derived_from_accepted_plus_eta() {
        let mut tracker = OrderTracker::new();
        tracker.apply(
            TrackerEvent::Snapshot(accepted_order(Some(15), Some("2025-06-15T11:05:00Z"))),
            T0,
        );
        let accepted = parse_millis("2025-06-15T11:05:00Z").unwrap();
        assert_eq!(tracker.ready_at_ms(), Some(accepted + 900_000));

        // one millisecond past the deadline reports zero, not negative
        let remaining = tracker.remaining(accepted + 900_001).unwrap();
        assert_eq!(remaining.total_seconds, 0);
        assert_eq!(remaining.minutes, 0);
        assert_eq!(remaining.seconds, 0);
    }

    #[test]
    fn missing_accepted_at_defaults_once_and_sticks() {
        let mut tracker = OrderTracker::new();
        tracker.apply(TrackerEvent::Snapshot(accepted_order(Some(10), None)), T0);
        assert_eq!(tracker.accepted_at_ms(), Some(T0));
        assert_eq!(tracker.ready_at_ms(), Some(T0 + 600_000));

        // a later refetch still lacking the field must not reset the base
        tracker.apply(
            TrackerEvent::Snapshot(accepted_order(Some(10), None)),
            T0 + 120_000,
        );
        assert_eq!(tracker.accepted_at_ms(), Some(T0));
        assert_eq!(tracker.ready_at_ms(), Some(T0 + 600_000));
    }

    #[test]
    fn pending_order_has_no_countdown() {
        let mut tracker = OrderTracker::new();
        tracker.apply(
            TrackerEvent::Snapshot(normalize_order(&json!({"id": "o1", "status": "PENDING"}))),
            T0,
        );
        assert_eq!(tracker.accepted_at_ms(), None);
        assert!(tracker.remaining(T0).is_none());
    }

    #[test]
    fn patch_merge_is_shallow() {
        let mut tracker = OrderTracker::new();
        tracker.apply(TrackerEvent::Snapshot(accepted_order(Some(15), None)), T0);
        tracker.apply(
            TrackerEvent::Patch(normalize_order_patch(&json!({"status": "READY"}))),
            T0 + 60_000,
        );
        let order = tracker.order().unwrap();
        assert_eq!(order.status, OrderStatus::Ready);
        // fields absent from the patch keep their previous values
        assert_eq!(order.customer_name.as_deref(), Some("Aram"));
        assert_eq!(order.eta_minutes, Some(15));
    }

    #[test]
    fn explicit_ready_at_in_patch_wins() {
        let mut tracker = OrderTracker::new();
        tracker.apply(TrackerEvent::Snapshot(accepted_order(Some(15), None)), T0);
        tracker.apply(
            TrackerEvent::Patch(normalize_order_patch(
                &json!({"readyAt": "2025-06-15T12:00:00Z", "etaMinutes": 45}),
            )),
            T0 + 1000,
        );
        assert_eq!(tracker.ready_at_ms(), parse_millis("2025-06-15T12:00:00Z"));
    }

    #[test]
    fn new_eta_recomputes_from_fixed_accepted_base() {
        let mut tracker = OrderTracker::new();
        tracker.apply(TrackerEvent::Snapshot(accepted_order(Some(15), None)), T0);
        tracker.apply(
            TrackerEvent::Patch(normalize_order_patch(&json!({"etaMinutes": 25}))),
            T0 + 300_000,
        );
        // base stays at the originally captured acceptedAt, not "now"
        assert_eq!(tracker.ready_at_ms(), Some(T0 + 25 * 60_000));
    }

    #[test]
    fn acceptance_patch_without_timestamp_captures_now_once() {
        let mut tracker = OrderTracker::new();
        tracker.apply(
            TrackerEvent::Snapshot(normalize_order(&json!({"id": "o1", "status": "PENDING"}))),
            T0,
        );
        tracker.apply(
            TrackerEvent::Patch(normalize_order_patch(
                &json!({"status": "ACCEPTED", "etaMinutes": 20}),
            )),
            T0 + 30_000,
        );
        assert_eq!(tracker.accepted_at_ms(), Some(T0 + 30_000));
        assert_eq!(tracker.ready_at_ms(), Some(T0 + 30_000 + 20 * 60_000));

        // a second timestampless ACCEPTED update must not reset the base
        tracker.apply(
            TrackerEvent::Patch(normalize_order_patch(&json!({"status": "ACCEPTED"}))),
            T0 + 90_000,
        );
        assert_eq!(tracker.accepted_at_ms(), Some(T0 + 30_000));
    }

    #[test]
    fn patch_before_snapshot_is_dropped() {
        let mut tracker = OrderTracker::new();
        tracker.apply(
            TrackerEvent::Patch(normalize_order_patch(&json!({"status": "READY"}))),
            T0,
        );
        assert!(tracker.order().is_none());
    }

    #[test]
    fn cancelled_and_canceled_group_together() {
        for raw in ["CANCELLED", "CANCELED"] {
            let mut tracker = OrderTracker::new();
            tracker.apply(
                TrackerEvent::Snapshot(normalize_order(&json!({"id": "o1", "status": raw}))),
                T0,
            );
            assert_eq!(tracker.status_group(), Some(StatusGroup::Terminal));
            assert!(tracker.is_final());
        }
    }

    #[test]
    fn friendly_messages_follow_state() {
        let mut tracker = OrderTracker::new();
        tracker.apply(TrackerEvent::Snapshot(accepted_order(Some(15), None)), T0);
        assert!(
            tracker
                .friendly_message(T0)
                .unwrap()
                .starts_with("Tack för din beställning")
        );
        // countdown exhausted while still cooking
        assert!(
            tracker
                .friendly_message(T0 + 16 * 60_000)
                .unwrap()
                .starts_with("Förlåt")
        );
        tracker.apply(
            TrackerEvent::Patch(normalize_order_patch(&json!({"status": "READY"}))),
            T0,
        );
        assert_eq!(
            tracker.friendly_message(T0).unwrap(),
            "Din mat är klar. Hoppas det smakar."
        );
    }

    #[test]
    fn driver_location_updates_order() {
        let mut tracker = OrderTracker::new();
        tracker.apply(TrackerEvent::Snapshot(accepted_order(None, None)), T0);
        tracker.apply(
            TrackerEvent::DriverLocation(GeoPoint {
                lat: 59.33,
                lng: 18.06,
            }),
            T0,
        );
        let loc = tracker.order().unwrap().driver_location.unwrap();
        assert_eq!(loc.lat, 59.33);
    }

    #[tokio::test]
    async fn resolve_prefers_lookup_for_five_digit_codes() {
        let http = FakeHttp::new();
        http.respond("orders/lookup/12345", json!({"orderId": "abc"}));
        http.respond("orders/abc", json!({"id": "abc", "status": "ACCEPTED"}));
        let api = Api::new(http);
        let order = resolve_order(&api, "12345").await.unwrap();
        assert_eq!(order.id, "abc");
    }

    #[tokio::test]
    async fn resolve_falls_back_to_direct_id() {
        let http = FakeHttp::new();
        http.fail("orders/lookup/12345", FailKind::NotFound);
        http.respond("orders/12345", json!({"id": "12345", "status": "PENDING"}));
        let api = Api::new(http);
        let order = resolve_order(&api, "12345").await.unwrap();
        assert_eq!(order.id, "12345");
    }

    #[tokio::test]
    async fn resolve_failure_is_not_found_not_error() {
        let http = FakeHttp::new();
        http.fail("orders/nope", FailKind::NotFound);
        let api = Api::new(http);
        assert!(resolve_order(&api, "nope").await.is_none());
    }

    #[tokio::test]
    async fn subscription_applies_pushes_and_leaves_on_shutdown() {
        use mangal_client::{BusMessage, EventType};
        use tokio::sync::broadcast;

        let (server_tx, _keep) = broadcast::channel(64);
        let (client_tx, mut server_rx) = broadcast::channel(64);
        let client = MessageClient::memory(&server_tx, &client_tx);

        let sub = TrackerSubscription::start(client, accepted_order(Some(15), None), T0)
            .await
            .unwrap();

        // join frame arrives first
        let join = server_rx.recv().await.unwrap();
        assert_eq!(join.event_type, EventType::JoinRoom);

        let payload = serde_json::to_vec(&json!({"_id": "o1", "status": "READY"})).unwrap();
        server_tx
            .send(BusMessage::new(EventType::OrderUpdate, payload))
            .unwrap();

        // wait until the background task applied the patch
        let tracker = sub.tracker();
        for _ in 0..100 {
            if tracker.lock().unwrap().order().unwrap().status == OrderStatus::Ready {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }
        assert_eq!(
            tracker.lock().unwrap().order().unwrap().status,
            OrderStatus::Ready
        );

        sub.shutdown().await;
        loop {
            let frame = server_rx.recv().await.unwrap();
            if frame.event_type == EventType::LeaveRoom {
                break;
            }
        }
    }
}
