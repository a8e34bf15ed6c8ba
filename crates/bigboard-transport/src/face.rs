//! The substrate interface

use std::future::Future;
use std::sync::Arc;

use bigboard_core::BoardResult;

use crate::{Data, Interest};

/// A handle on the named request/response network.
///
/// `express_interest` resolves with the first matching Data, or with
/// `BoardError::InterestTimeout` once the interest lifetime elapses.
pub trait Face: Send + Sync + 'static {
    fn express_interest(
        &self,
        interest: Interest,
    ) -> impl Future<Output = BoardResult<Data>> + Send;
}

impl<F: Face> Face for Arc<F> {
    fn express_interest(
        &self,
        interest: Interest,
    ) -> impl Future<Output = BoardResult<Data>> + Send {
        (**self).express_interest(interest)
    }
}
