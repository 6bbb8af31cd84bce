//! Scheduler tick loop.
//!
//! [`run_ticker`] drives [`SessionHandle::tick`] on a fixed interval until
//! a shutdown future resolves. The tick period bounds how late a spawn or
//! absorption can be observed; the scheduler itself catches up on every
//! occurrence that came due between ticks.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tracing::info;

use crate::handle::SessionHandle;

/// Result of a ticker run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickerSummary {
    /// Number of ticks executed.
    pub ticks: u64,
}

/// Tick `handle` every `period` until `shutdown` completes.
pub async fn run_ticker<F>(handle: Arc<SessionHandle>, period: Duration, shutdown: F) -> TickerSummary
where
    F: Future<Output = ()>,
{
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tokio::pin!(shutdown);

    let mut ticks: u64 = 0;
    info!(
        period_ms = u64::try_from(period.as_millis()).unwrap_or(u64::MAX),
        "Ticker starting"
    );

    loop {
        tokio::select! {
            biased;
            () = &mut shutdown => break,
            _ = interval.tick() => {
                handle.tick().await;
                ticks = ticks.saturating_add(1);
            }
        }
    }

    info!(ticks, "Ticker stopped");
    TickerSummary { ticks }
}
