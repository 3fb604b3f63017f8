// WHY: async driver feeding pointer moves and host notifications into one engine
// Single task; the engine is borrowed mutably per event so handlers never overlap

use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info};

use crate::dom::Document;
use crate::engine::SentenceHighlighter;
use crate::highlight::{CaretSource, PointerEvent};
use crate::host::TabSubscription;
use crate::scheduler::PointerScheduler;

/// Counters for one run of the loop
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopStats {
    pub moves: usize,
    pub throttled: usize,
    pub fired: usize,
    pub highlighted: usize,
    pub notifications: usize,
}

/// Run until the pointer channel closes.
///
/// A move still waiting for its debounce when the channel closes is dropped.
pub async fn run<C: CaretSource + ?Sized>(
    engine: &mut SentenceHighlighter,
    doc: &mut Document,
    caret_source: &C,
    mut pointer_events: mpsc::Receiver<PointerEvent>,
    mut notifications: TabSubscription,
) -> LoopStats {
    let mut scheduler = PointerScheduler::new(engine.scheduler_config());
    let mut stats = LoopStats::default();
    let mut notifications_open = true;

    info!("Event loop started");
    loop {
        let deadline = scheduler.next_deadline();
        tokio::select! {
            event = pointer_events.recv() => {
                let Some(event) = event else {
                    break;
                };
                stats.moves += 1;
                if !scheduler.on_move(event, Instant::now()) {
                    stats.throttled += 1;
                }
            }
            _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                if let Some(event) = scheduler.poll(Instant::now()) {
                    stats.fired += 1;
                    let report = engine.handle_pointer_move(doc, caret_source, &event);
                    if report.map(|r| r.is_highlighted()).unwrap_or(false) {
                        stats.highlighted += 1;
                    }
                }
            }
            notification = notifications.recv(), if notifications_open => {
                match notification {
                    Some(notification) => {
                        stats.notifications += 1;
                        debug!(?notification, "Host notification");
                        engine.apply_notification(doc, &notification);
                    }
                    None => notifications_open = false,
                }
            }
        }
    }

    info!(
        moves = stats.moves,
        throttled = stats.throttled,
        fired = stats.fired,
        highlighted = stats.highlighted,
        notifications = stats.notifications,
        "Event loop finished"
    );
    stats
}
