//! Admin order board
//!
//! Reducer over the admin-wide order feed: new orders prepend, push updates
//! shallow-merge by id, a manual refresh replaces the list (last write wins).
//! Also owns the per-order ETA prefill, the active/history filters, the
//! local stats fallback and the optimistic paid toggle.

use chrono::{DateTime, Datelike, Local};
use mangal_client::{Api, ChannelEvent, ClientResult, HttpClient, MessageClient, MessageError, Room};
use shared::models::catering::CateringRequest;
use shared::models::order::{
    Order, OrderPatch, OrderStatus, OverviewStats, PeriodStats, ServiceKind,
};
use shared::models::wait_times::WaitTimesConfig;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Fallback ETA suggestions until the wait-time config has loaded
#[derive(Debug, Clone, Copy)]
pub struct DefaultEta {
    pub dine_in: i64,
    pub takeaway: i64,
}

impl Default for DefaultEta {
    fn default() -> Self {
        Self {
            dine_in: 15,
            takeaway: 20,
        }
    }
}

/// Admin order feed state
#[derive(Debug, Clone, Default)]
pub struct OrderBoard {
    orders: Vec<Order>,
    /// Suggested ETA minutes per order id; operator entries stick
    eta_prefill: HashMap<String, i64>,
    default_eta: DefaultEta,
}

impl OrderBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    /// Seed the default ETA suggestions from the wait-time config.
    ///
    /// Goes through [`WaitTimesConfig::minutes_for`], so the emergency
    /// override flag is honored here exactly as everywhere else.
    pub fn seed_default_eta(&mut self, config: &WaitTimesConfig, day_of_week: u8, time: &str) {
        if let Some(m) = config.minutes_for(ServiceKind::DineIn, day_of_week, time) {
            self.default_eta.dine_in = m as i64;
        }
        if let Some(m) = config.minutes_for(ServiceKind::Takeaway, day_of_week, time) {
            self.default_eta.takeaway = m as i64;
        }
    }

    fn wants_prefill(order: &Order) -> bool {
        order.status.is_active() || order.status == OrderStatus::Ready
    }

    fn suggested_minutes(&self, order: &Order) -> Option<i64> {
        match order.service_kind() {
            Some(ServiceKind::DineIn) => Some(self.default_eta.dine_in),
            Some(ServiceKind::Takeaway) => Some(self.default_eta.takeaway),
            _ => None,
        }
    }

    fn prefill_eta(&mut self, order: &Order) {
        if !Self::wants_prefill(order) || self.eta_prefill.contains_key(&order.id) {
            return;
        }
        if let Some(minutes) = self.suggested_minutes(order) {
            self.eta_prefill.insert(order.id.clone(), minutes);
        }
    }

    /// Suggested ETA for an order: operator entry, then prefill, then the
    /// order's own etaMinutes.
    pub fn eta_for(&self, order_id: &str) -> Option<i64> {
        if let Some(minutes) = self.eta_prefill.get(order_id) {
            return Some(*minutes);
        }
        self.orders
            .iter()
            .find(|o| o.id == order_id)
            .and_then(|o| o.eta_minutes)
    }

    /// Operator-entered ETA; overrides any prefill
    pub fn set_eta(&mut self, order_id: &str, minutes: i64) {
        self.eta_prefill.insert(order_id.to_string(), minutes);
    }

    /// Replace the whole list from a refetch (last write wins)
    pub fn refresh(&mut self, orders: Vec<Order>) {
        self.orders = orders;
        let mut pending: Vec<(String, i64)> = Vec::new();
        for order in &self.orders {
            if !Self::wants_prefill(order) || self.eta_prefill.contains_key(&order.id) {
                continue;
            }
            if let Some(minutes) = self.suggested_minutes(order) {
                pending.push((order.id.clone(), minutes));
            }
        }
        self.eta_prefill.extend(pending);
    }

    /// New-order push: prepend and prefill its ETA suggestion
    pub fn apply_new(&mut self, order: Order) {
        self.prefill_eta(&order);
        self.orders.insert(0, order);
    }

    /// Order-update push: shallow merge into the matching order
    pub fn apply_patch(&mut self, patch: &OrderPatch) {
        let Some(id) = patch.id.as_deref() else {
            tracing::debug!("order patch without id dropped");
            return;
        };
        if let Some(order) = self.orders.iter_mut().find(|o| o.id == id) {
            order.apply_patch(patch);
        }
    }

    // ========== Views ==========

    fn on_board(order: &Order) -> bool {
        order.status.is_active()
            || (order.status == OrderStatus::Ready && order.paid != Some(true))
    }

    /// Orders the board shows: active plus READY-but-unpaid
    pub fn active_view(&self) -> Vec<&Order> {
        self.orders.iter().filter(|o| Self::on_board(o)).collect()
    }

    /// History: everything else, grouped by local date, newest day first,
    /// entries within a day newest first.
    pub fn history(&self) -> Vec<(String, Vec<&Order>)> {
        let mut groups: Vec<(String, Vec<&Order>)> = Vec::new();
        let mut entries: Vec<&Order> = self
            .orders
            .iter()
            .filter(|o| !Self::on_board(o))
            .collect();
        entries.sort_by_key(|o| std::cmp::Reverse(created_at_ms(o)));

        for order in entries {
            let key = local_date_key(&order.created_at);
            match groups.iter_mut().find(|(k, _)| *k == key) {
                Some((_, list)) => list.push(order),
                None => groups.push((key, vec![order])),
            }
        }
        groups
    }

    // ========== Stats ==========

    /// Top items by quantity: backend stats when available, else counted
    /// from the local order lines.
    pub fn top_items(&self, stats: Option<&OverviewStats>) -> Vec<(String, i64)> {
        if let Some(stats) = stats {
            if !stats.top_items.is_empty() {
                return stats
                    .top_items
                    .iter()
                    .map(|t| (t.name.clone(), t.quantity))
                    .collect();
            }
        }
        let mut counts: HashMap<String, i64> = HashMap::new();
        for order in &self.orders {
            for item in &order.items {
                *counts.entry(item.name.clone()).or_default() += item.qty;
            }
        }
        let mut sorted: Vec<(String, i64)> = counts.into_iter().collect();
        sorted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        sorted.truncate(5);
        sorted
    }

    /// Local revenue fallback over paid-or-delivered orders, in the raw
    /// currency unit, computed against the given local "now".
    pub fn local_revenue(&self, now: DateTime<Local>) -> LocalRevenue {
        let start_of_day = now
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .map(|d| d.and_local_timezone(Local))
            .and_then(|r| r.single());
        let Some(start_of_day) = start_of_day else {
            return LocalRevenue::default();
        };
        let days_from_monday = now.date_naive().weekday().num_days_from_monday() as i64;
        let start_of_week = start_of_day - chrono::Duration::days(days_from_monday);
        let start_of_month = start_of_day
            - chrono::Duration::days((now.date_naive().day0()) as i64);

        let countable: Vec<&Order> = self
            .orders
            .iter()
            .filter(|o| o.paid == Some(true) || o.status == OrderStatus::Delivered)
            .collect();
        let sum_from = |from: DateTime<Local>| -> PeriodStats {
            let from_ms = from.timestamp_millis();
            let in_range: Vec<&&Order> = countable
                .iter()
                .filter(|o| created_at_ms(o) >= from_ms)
                .collect();
            PeriodStats {
                orders: in_range.len() as i64,
                revenue: in_range.iter().map(|o| o.raw_total()).sum(),
            }
        };

        LocalRevenue {
            day: sum_from(start_of_day),
            week: sum_from(start_of_week),
            month: sum_from(start_of_month),
        }
    }

    // ========== Mutations ==========

    /// Toggle paid optimistically, reconcile against the request outcome.
    ///
    /// The board flips immediately so a READY order disappears the moment it
    /// is marked paid; a failed request rolls the flag back and surfaces the
    /// error for an inline notice.
    pub async fn toggle_paid<C: HttpClient>(
        &mut self,
        api: &Api<C>,
        order_id: &str,
    ) -> ClientResult<bool> {
        let prior = self
            .orders
            .iter()
            .find(|o| o.id == order_id)
            .and_then(|o| o.paid);
        let next = prior != Some(true);
        self.set_paid_local(order_id, Some(next));

        match api.set_order_paid(order_id, next).await {
            Ok(()) => Ok(next),
            Err(e) => {
                self.set_paid_local(order_id, prior);
                Err(e)
            }
        }
    }

    fn set_paid_local(&mut self, order_id: &str, paid: Option<bool>) {
        if let Some(order) = self.orders.iter_mut().find(|o| o.id == order_id) {
            order.paid = paid;
        }
    }
}

/// Day/week/month revenue computed locally
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalRevenue {
    pub day: PeriodStats,
    pub week: PeriodStats,
    pub month: PeriodStats,
}

/// Live subscription binding the board to the admin-wide feed.
///
/// Joins the blanket admin room; new orders and field updates flow into the
/// board, new catering requests pile up in a triage inbox. Torn down
/// explicitly when the console view goes away.
pub struct BoardSubscription {
    board: Arc<Mutex<OrderBoard>>,
    catering_inbox: Arc<Mutex<Vec<CateringRequest>>>,
    client: MessageClient,
    task: tokio::task::JoinHandle<()>,
}

impl BoardSubscription {
    pub async fn start(
        client: MessageClient,
        board: Arc<Mutex<OrderBoard>>,
    ) -> Result<Self, MessageError> {
        client.join(&Room::Admin).await?;

        let catering_inbox: Arc<Mutex<Vec<CateringRequest>>> = Arc::new(Mutex::new(Vec::new()));
        let mut rx = client.subscribe();
        let task_board = board.clone();
        let task_inbox = catering_inbox.clone();
        let task = tokio::spawn(async move {
            loop {
                let event = match MessageClient::recv_event(&mut rx).await {
                    Ok(event) => event,
                    Err(e) => {
                        tracing::warn!("admin channel closed: {}", e);
                        break;
                    }
                };
                match event {
                    ChannelEvent::OrderNew(order) => {
                        task_board.lock().expect("board lock").apply_new(order);
                    }
                    ChannelEvent::OrderUpdate(patch) => {
                        task_board.lock().expect("board lock").apply_patch(&patch);
                    }
                    ChannelEvent::CateringNew(request) => {
                        task_inbox.lock().expect("inbox lock").push(request);
                    }
                    ChannelEvent::DriverLocation(_) => {}
                }
            }
        });

        Ok(Self {
            board,
            catering_inbox,
            client,
            task,
        })
    }

    pub fn board(&self) -> Arc<Mutex<OrderBoard>> {
        self.board.clone()
    }

    /// Drain catering requests that arrived since the last call
    pub fn take_catering_requests(&self) -> Vec<CateringRequest> {
        std::mem::take(&mut *self.catering_inbox.lock().expect("inbox lock"))
    }

    /// Tear down: stop the handler task, then leave the admin room.
    pub async fn shutdown(self) {
        self.task.abort();
        if let Err(e) = self.client.leave(&Room::Admin).await {
            tracing::debug!("leave admin room failed during shutdown: {}", e);
        }
    }
}

fn created_at_ms(order: &Order) -> i64 {
    shared::util::parse_millis(&order.created_at).unwrap_or(0)
}

fn local_date_key(created_at: &str) -> String {
    match DateTime::parse_from_rfc3339(created_at) {
        Ok(dt) => dt.with_timezone(&Local).format("%Y-%m-%d").to_string(),
        Err(_) => created_at.to_string(),
    }
}

/// Swedish wall-clock time (HH:MM) for list rows
pub fn format_time_only(created_at: &str) -> String {
    match DateTime::parse_from_rfc3339(created_at) {
        Ok(dt) => dt.with_timezone(&Local).format("%H:%M").to_string(),
        Err(_) => created_at.to_string(),
    }
}

/// Method badge label (Swedish)
pub fn method_label(order: &Order) -> Option<String> {
    let raw = order.method.as_deref()?;
    Some(match ServiceKind::parse(raw) {
        Some(ServiceKind::DineIn) => "Äta här".to_string(),
        Some(ServiceKind::Takeaway) => "Ta med".to_string(),
        Some(ServiceKind::Delivery) => "Utkörning".to_string(),
        None => raw.to_string(),
    })
}
