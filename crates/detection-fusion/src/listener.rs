//! Per-record push notification

use detection_types::FusedDetection;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, warn};

/// Receives every fused record, synchronously, during a fuse pass.
///
/// Called after the manager released its state lock, so listeners may call
/// back into the manager. Implementations must not block.
pub trait FusionListener: Send + Sync {
    fn on_fused_detection(&self, detection: &FusedDetection);
}

impl<F> FusionListener for F
where
    F: Fn(&FusedDetection) + Send + Sync,
{
    fn on_fused_detection(&self, detection: &FusedDetection) {
        self(detection)
    }
}

/// Publishes fused records into a bounded tokio channel
#[derive(Debug, Clone)]
pub struct ChannelListener {
    sender: mpsc::Sender<FusedDetection>,
}

impl ChannelListener {
    pub fn new(sender: mpsc::Sender<FusedDetection>) -> Self {
        Self { sender }
    }

    /// Create a listener and the receiving end of its channel
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<FusedDetection>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self::new(sender), receiver)
    }
}

impl FusionListener for ChannelListener {
    fn on_fused_detection(&self, detection: &FusedDetection) {
        match self.sender.try_send(detection.clone()) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                warn!("Fused detection channel full, dropping notification");
                metrics::counter!("fusion_notifications_dropped_total").increment(1);
            }
            Err(TrySendError::Closed(_)) => {
                debug!("Fused detection channel closed");
            }
        }
    }
}
