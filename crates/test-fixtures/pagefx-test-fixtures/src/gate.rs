//! Manually opened futures for interleaving tests.

use std::cell::{Cell, RefCell};
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::sync::Arc;
use std::task::{Context, Poll, Wake, Waker};

#[derive(Default)]
struct GateInner {
    open: Cell<bool>,
    wakers: RefCell<Vec<Waker>>,
}

/// A latch: every `wait()` stays pending until `open()` is called.
#[derive(Clone, Default)]
pub struct Gate {
    inner: Rc<GateInner>,
}

impl Gate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&self) {
        self.inner.open.set(true);
        for waker in self.inner.wakers.borrow_mut().drain(..) {
            waker.wake();
        }
    }

    pub fn is_open(&self) -> bool {
        self.inner.open.get()
    }

    pub fn wait(&self) -> GateWait {
        GateWait {
            inner: self.inner.clone(),
        }
    }
}

pub struct GateWait {
    inner: Rc<GateInner>,
}

impl Future for GateWait {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.inner.open.get() {
            return Poll::Ready(());
        }
        self.inner.wakers.borrow_mut().push(cx.waker().clone());
        Poll::Pending
    }
}

struct NoopWake;

impl Wake for NoopWake {
    fn wake(self: Arc<Self>) {}
}

/// Poll a future exactly once with a waker that does nothing.
pub fn poll_once<F: Future + ?Sized>(fut: Pin<&mut F>) -> Poll<F::Output> {
    let waker = Waker::from(Arc::new(NoopWake));
    let mut cx = Context::from_waker(&waker);
    fut.poll(&mut cx)
}
