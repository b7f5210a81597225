use std::sync::Arc;

use futures::Stream;
use futures::stream;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::controller::PermitInfo;
use crate::controller::ThrottleController;
use crate::directive::ThrottleDirective;
use crate::error::PermitError;

/// Cloneable handle for sharing one [`ThrottleController`] between tasks.
///
/// The lock is held across the whole read-wait-grant sequence of a permit,
/// so concurrent callers are granted permits one interval apart. Adjustments
/// made while a permit is pending apply once that permit has been granted.
#[derive(Clone, Debug)]
pub struct SharedThrottle {
    inner: Arc<Mutex<ThrottleController>>,
}

impl SharedThrottle {
    pub fn new(controller: ThrottleController) -> Self {
        Self {
            inner: Arc::new(Mutex::new(controller)),
        }
    }

    pub async fn next_permit(&self) -> PermitInfo {
        self.inner.lock().await.next_permit().await
    }

    /// Cancelling `cancel` aborts both a wait for the lock and a wait for the
    /// interval.
    pub async fn next_permit_with_cancellation(
        &self,
        cancel: &CancellationToken,
    ) -> Result<PermitInfo, PermitError> {
        let mut controller = tokio::select! {
            biased;
            controller = self.inner.lock() => controller,
            _ = cancel.cancelled() => return Err(PermitError::Cancelled),
        };
        controller.next_permit_with_cancellation(cancel).await
    }

    pub async fn adjust(&self, directive: Option<ThrottleDirective>) {
        self.inner.lock().await.adjust(directive);
    }

    /// Shares the lock held by a pending permit, so this can wait up to a full
    /// interval while another task is being throttled.
    pub async fn current_interval_millis(&self) -> i64 {
        self.inner.lock().await.current_interval_millis()
    }

    /// Endless stream of permits, one per interval. Adjust the pacing through
    /// this handle (or a clone of it) between items.
    pub fn permits(&self) -> impl Stream<Item = PermitInfo> + Send + 'static {
        stream::unfold(self.clone(), |throttle| async move {
            let permit = throttle.next_permit().await;
            Some((permit, throttle))
        })
    }
}

impl From<ThrottleController> for SharedThrottle {
    fn from(controller: ThrottleController) -> Self {
        Self::new(controller)
    }
}
