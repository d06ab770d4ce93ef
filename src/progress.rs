//! Progress indicator capability.
//!
//! The loader never looks an indicator up; it is handed one and only drives
//! it through this trait.

use async_trait::async_trait;
use std::sync::Arc;

#[async_trait]
pub trait ProgressIndicator: Send + Sync {
    /// Make the indicator visible. Awaited before any work starts.
    async fn show(&self);

    /// Hide the indicator. Awaited on every exit path of a load.
    async fn hide(&self);

    fn set_message(&self, message: &str);

    /// Fraction of work done, in `[0, 1]`. Fire-and-forget.
    fn set_progress(&self, fraction: f32);
}

/// Indicator that discards everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoProgress;

#[async_trait]
impl ProgressIndicator for NoProgress {
    async fn show(&self) {}

    async fn hide(&self) {}

    fn set_message(&self, _message: &str) {}

    fn set_progress(&self, _fraction: f32) {}
}

/// Shared indicators, so the owner can keep a handle while a loader drives it.
#[async_trait]
impl<T: ProgressIndicator + ?Sized> ProgressIndicator for Arc<T> {
    async fn show(&self) {
        (**self).show().await
    }

    async fn hide(&self) {
        (**self).hide().await
    }

    fn set_message(&self, message: &str) {
        (**self).set_message(message)
    }

    fn set_progress(&self, fraction: f32) {
        (**self).set_progress(fraction)
    }
}
