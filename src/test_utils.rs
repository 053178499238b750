use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

use tokio::sync::mpsc;

/// Counts elements leaving a producer and reaching a consumer, remembering the largest gap
#[derive(Clone, Default)]
pub struct InFlight {
    sent: Arc<AtomicUsize>,
    received: Arc<AtomicUsize>,
    max: Arc<AtomicUsize>,
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_sent(&self) {
        self.sent.fetch_add(1, Ordering::SeqCst);
    }

    /// Call after the consumer took an element. Returns the elements still in flight.
    pub fn on_received(&self) -> usize {
        let received = self.received.fetch_add(1, Ordering::SeqCst) + 1;
        let in_flight = self.sent.load(Ordering::SeqCst).saturating_sub(received);
        self.max.fetch_max(in_flight, Ordering::SeqCst);
        in_flight
    }

    pub fn sent(&self) -> usize {
        self.sent.load(Ordering::SeqCst)
    }

    pub fn max(&self) -> usize {
        self.max.load(Ordering::SeqCst)
    }
}

pub async fn wait_for_capacity<T>(sender: &mpsc::Sender<T>) -> usize {
    tokio::time::sleep(Duration::from_millis(20)).await;
    sender.capacity()
}

pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(20)).await;
}
