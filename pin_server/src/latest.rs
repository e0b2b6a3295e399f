//! One-slot handoff of the most recently inferred depth buffer.
//!
use std::sync::Arc;

use tokio::sync::watch;

use crate::heightfield::DepthBuffer;

/// Read side of the depth handoff.
pub trait DepthProvider {
    /// The most recently published buffer, or `None` before the first
    /// completed pass.
    fn latest_depth(&self) -> Option<Arc<DepthBuffer>>;
}

/// Create the overwrite-on-publish cell connecting the inference loop to the
/// actuation loop.
///
/// A newly published buffer replaces the previous one; there is no backlog,
/// and a slow reader only ever sees the latest completed pass.
pub fn latest_depth_cell() -> (LatestDepthSender, LatestDepthReceiver) {
    let (tx, rx) = watch::channel(None);

    (LatestDepthSender { tx }, LatestDepthReceiver { rx })
}

pub struct LatestDepthSender {
    tx: watch::Sender<Option<Arc<DepthBuffer>>>,
}

impl LatestDepthSender {
    pub fn publish(&self, buffer: DepthBuffer) {
        self.tx.send_replace(Some(Arc::new(buffer)));
    }
}

#[derive(Clone)]
pub struct LatestDepthReceiver {
    rx: watch::Receiver<Option<Arc<DepthBuffer>>>,
}

impl DepthProvider for LatestDepthReceiver {
    fn latest_depth(&self) -> Option<Arc<DepthBuffer>> {
        self.rx.borrow().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer(fill: f32) -> DepthBuffer {
        DepthBuffer::new(vec![fill; 9], 3, 3).unwrap()
    }

    #[test]
    fn empty_until_first_publish() {
        let (tx, rx) = latest_depth_cell();
        assert!(rx.latest_depth().is_none());

        tx.publish(buffer(1.0));
        assert!(rx.latest_depth().is_some());
    }

    #[test]
    fn publish_overwrites_without_backlog() {
        let (tx, rx) = latest_depth_cell();

        tx.publish(buffer(1.0));
        tx.publish(buffer(2.0));
        tx.publish(buffer(3.0));

        let latest = rx.latest_depth().unwrap();
        assert_eq!(latest.data()[0], 3.0);

        // Reading is not consuming.
        assert!(rx.latest_depth().is_some());
    }
}
