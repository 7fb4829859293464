//! The seam to whatever delivers results out-of-band.

use crate::outcome::Outcome;

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("delivery failed: {0}")]
    Delivery(String),
    #[error("channel rejected message: HTTP {0}")]
    Rejected(u16),
}

pub trait Notifier {
    /// Deliver one outcome. Implementations report failure through the return
    /// value; a failed delivery never changes the run's outcome.
    fn notify(&mut self, outcome: &Outcome, detail: &str) -> bool;
}

impl<N: Notifier + ?Sized> Notifier for Box<N> {
    fn notify(&mut self, outcome: &Outcome, detail: &str) -> bool {
        (**self).notify(outcome, detail)
    }
}

/// Fans one outcome out to several notifiers. Every target is tried; the
/// delivery counts only if all of them succeeded.
#[derive(Default)]
pub struct FanOut {
    targets: Vec<Box<dyn Notifier>>,
}

impl FanOut {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, notifier: Box<dyn Notifier>) {
        self.targets.push(notifier);
    }
}

impl Notifier for FanOut {
    fn notify(&mut self, outcome: &Outcome, detail: &str) -> bool {
        let mut delivered = true;
        for target in &mut self.targets {
            delivered &= target.notify(outcome, detail);
        }
        delivered
    }
}
