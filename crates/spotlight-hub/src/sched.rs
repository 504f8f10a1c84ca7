// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Session scheduling: the daily open tick and the claim-relative close
//! timer. The scheduler holds no state of its own beyond task handles.

use crate::{announce_open, emit_delivery, HubState};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time;
use tracing::{info, warn};

/// Tick at `interval`, opening a session on each tick. An overlapping open
/// (session still active from the previous cycle) is a logged no-op.
pub(crate) async fn run_open_ticker(hub: Arc<Mutex<HubState>>, interval: Duration) {
    let mut ticker = time::interval(interval);
    // the first tick fires immediately; the cycle starts one interval out
    ticker.tick().await;
    info!("open ticker started, interval {:?}", interval);
    loop {
        ticker.tick().await;
        let mut h = hub.lock().await;
        match h.session.open_session() {
            Ok(()) => {
                if let Err(err) = announce_open(&mut h).await {
                    warn!(?err, "open announcement failed");
                }
            }
            Err(err) => info!(%err, "open tick skipped"),
        }
    }
}

/// Arm the close timer for the configured delay, counted from now (i.e.
/// from the successful claim, not from the open tick). Re-arming replaces
/// any previous timer. Caller holds the hub lock.
pub(crate) fn arm_close_timer(h: &mut HubState, hub: &Arc<Mutex<HubState>>) {
    disarm_close_timer(h);
    let delay = h.close_after;
    let hub = Arc::clone(hub);
    h.close_timer = Some(tokio::spawn(async move {
        time::sleep(delay).await;
        let mut h = hub.lock().await;
        h.close_timer = None;
        if let Some(delivery) = h.session.close_and_deliver() {
            info!(
                "close tick: delivering {} compliment(s) to {}",
                delivery.snapshot.public.len() + delivery.snapshot.anonymous.len(),
                delivery.recipient.display_name
            );
            if let Err(err) = emit_delivery(&mut h, &delivery).await {
                // best-effort: the session has already reset to idle
                warn!(?err, "delivery emission failed");
            }
        }
    }));
}

/// Cancel a pending close timer, if any. Caller holds the hub lock.
pub(crate) fn disarm_close_timer(h: &mut HubState) {
    if let Some(handle) = h.close_timer.take() {
        handle.abort();
    }
}
