//! Driver location pusher
//!
//! Consumes position samples from a watch channel and forwards each one to
//! the driver endpoint. Authenticated by the driver's own token, never the
//! admin credential. A failed push is logged and skipped; there is no retry
//! policy, the next sample simply supersedes it.

use mangal_client::{Api, HttpClient};
use shared::types::GeoPoint;
use tokio::sync::watch;

/// Feed of position samples; `None` until the first fix arrives
pub type PositionRx = watch::Receiver<Option<GeoPoint>>;

/// Create the sender/receiver pair for a position feed
pub fn position_channel() -> (watch::Sender<Option<GeoPoint>>, PositionRx) {
    watch::channel(None)
}

/// Push positions for one order until the sender side is dropped.
pub async fn run_pusher<C: HttpClient>(
    api: &Api<C>,
    driver_token: &str,
    order_id: &str,
    mut positions: PositionRx,
) {
    while positions.changed().await.is_ok() {
        let Some(point) = *positions.borrow_and_update() else {
            continue;
        };
        if let Err(e) = api
            .driver_upsert_location(driver_token, order_id, point.lat, point.lng)
            .await
        {
            tracing::warn!("driver location push failed: {}", e);
        }
    }
    tracing::debug!("position feed closed, pusher for order {} done", order_id);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FakeHttp, FailKind};
    use mangal_client::Api;
    use serde_json::json;

    #[tokio::test]
    async fn pushes_latest_sample_until_feed_closes() {
        let http = FakeHttp::new();
        http.respond("driver/orders/o1/location", json!({"ok": true}));
        let api = Api::new(http);

        let (tx, rx) = position_channel();
        tx.send(Some(GeoPoint {
            lat: 59.33,
            lng: 18.06,
        }))
        .unwrap();
        tx.send(Some(GeoPoint {
            lat: 59.34,
            lng: 18.07,
        }))
        .unwrap();
        drop(tx);

        // runs to completion once the feed is closed
        run_pusher(&api, "drv-token", "o1", rx).await;

        let calls = api.http().calls();
        // watch coalesces: only the latest sample goes out
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].1, "driver/orders/o1/location");
        assert_eq!(calls[0].2.as_ref().unwrap()["lat"], 59.34);
    }

    #[tokio::test]
    async fn failed_push_is_skipped_not_fatal() {
        let http = FakeHttp::new();
        http.fail("driver/orders/o1/location", FailKind::Internal);
        let api = Api::new(http);

        let (tx, rx) = position_channel();
        tx.send(Some(GeoPoint { lat: 1.0, lng: 2.0 })).unwrap();
        drop(tx);

        // the pusher completes despite the error
        run_pusher(&api, "drv", "o1", rx).await;
        assert_eq!(api.http().calls().len(), 1);
    }
}
