#![allow(missing_docs)]
#![allow(dead_code)]

use std::future::Future;
use std::pin::pin;
use std::task::{Context, Poll, Waker};

use flappy_evo::simulation::params::Params;

/// Drives a future to completion on the current thread. The headless
/// frontends used in tests never actually suspend, so a no-op waker is
/// enough.
pub fn block_on<F: Future>(fut: F) -> F::Output {
    let mut fut = pin!(fut);
    let waker = Waker::noop();
    let mut cx = Context::from_waker(waker);
    loop {
        if let Poll::Ready(value) = fut.as_mut().poll(&mut cx) {
            return value;
        }
    }
}

pub fn create_test_params() -> Params {
    Params::default()
}
