//! Face wrapper that records every interest it forwards

use std::future::Future;
use std::sync::Arc;

use parking_lot::Mutex;

use bigboard_core::{BoardResult, Name};

use crate::{Data, Face, Interest};

/// Forwards interests to an inner face and keeps a copy of each one
pub struct RecordingFace<F> {
    inner: F,
    log: Arc<Mutex<Vec<Interest>>>,
}

impl<F: Face> RecordingFace<F> {
    pub fn new(inner: F) -> Self {
        RecordingFace {
            inner,
            log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Interests whose name equals `name`, in issue order
    pub fn interests_for(&self, name: &Name) -> Vec<Interest> {
        self.log
            .lock()
            .iter()
            .filter(|i| i.name() == name)
            .cloned()
            .collect()
    }
}

impl<F: Face> Face for RecordingFace<F> {
    fn express_interest(
        &self,
        interest: Interest,
    ) -> impl Future<Output = BoardResult<Data>> + Send {
        self.log.lock().push(interest.clone());
        self.inner.express_interest(interest)
    }
}
