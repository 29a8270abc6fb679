//! Ways to get the outcome out of a promise: `.await` it, or block on it.
//!
//! Both register one handler on the promise and then let go of their own
//! handle. If every other handle and every resolver is dropped while the
//! promise is still pending, the handler is dropped unfired and the waiter
//! gets [`WaitError::Abandoned`] instead of hanging forever.
use crate::promise::Promise;
use crate::WaitError;
use parking_lot::Mutex;
use std::{
    future::{Future, IntoFuture},
    pin::Pin,
    sync::{mpsc::channel, Arc},
    task::{Context, Poll, Waker},
};

#[derive(Debug)]
enum WakerState {
    Fresh,
    Tainted,
}

#[derive(Debug)]
struct Inner<T, E> {
    value: Option<Result<T, E>>,
    waker: Result<Waker, WakerState>,
}

/// Lives inside the handler registered on the promise.
struct Producer<T, E> {
    inner: Arc<Mutex<Inner<T, E>>>,
}

impl<T, E> Producer<T, E> {
    fn resolve(self, value: Result<T, E>) {
        let waker = {
            let mut inner = self.inner.lock();
            inner.value = Some(value);
            std::mem::replace(&mut inner.waker, Err(WakerState::Tainted))
        };
        if let Ok(waker) = waker {
            waker.wake()
        }
    }
}

impl<T, E> Drop for Producer<T, E> {
    /// If the handler never fired, wake the waiter so it sees the taint.
    fn drop(&mut self) {
        let waker = std::mem::replace(&mut self.inner.lock().waker, Err(WakerState::Tainted));
        if let Ok(waker) = waker {
            waker.wake()
        }
    }
}

/// The future returned by `promise.into_future()`.
///
/// # Examples
///
/// ```
/// use promise_then::{Promise, Resolve};
/// use futures::executor::block_on;
/// use std::thread;
///
/// let (tx, rx) = std::sync::mpsc::channel::<Resolve<String>>();
/// let promise = Promise::<String, ()>::new(move |resolve, _| {
///     tx.send(resolve).unwrap();
///     Ok(())
/// });
/// let task1 = thread::spawn(move || block_on(async {
///     promise.await
/// }));
/// rx.recv().unwrap()(String::from("🍓"));
/// let received = task1.join().expect("The task1 thread has panicked");
/// assert_eq!(received, Ok(String::from("🍓")));
/// ```
#[derive(Debug)]
pub struct Waiter<T, E> {
    inner: Arc<Mutex<Inner<T, E>>>,
}

impl<T, E> Future for Waiter<T, E> {
    type Output = Result<T, WaitError<E>>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut inner = self.inner.lock();
        match inner.value.take() {
            Some(value) => Poll::Ready(value.map_err(WaitError::Rejected)),
            None => match std::mem::replace(&mut inner.waker, Ok(cx.waker().clone())) {
                Err(WakerState::Tainted) => Poll::Ready(Err(WaitError::Abandoned)),
                _ => Poll::Pending,
            },
        }
    }
}

impl<T, E> IntoFuture for Promise<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    type Output = Result<T, WaitError<E>>;
    type IntoFuture = Waiter<T, E>;

    fn into_future(self) -> Self::IntoFuture {
        let inner = Arc::new(Mutex::new(Inner {
            value: None,
            waker: Err(WakerState::Fresh),
        }));
        let producer = Producer {
            inner: inner.clone(),
        };
        self.at(move |outcome| producer.resolve(outcome.map(T::clone).map_err(E::clone)));
        Waiter { inner }
    }
}

impl<T, E> Promise<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    /// Blocks the calling thread until the promise settles.
    ///
    /// Never call this from the thread that is expected to settle the
    /// promise: nothing else will, and the call will not return.
    ///
    /// ```
    /// use promise_then::{Promise, WaitError};
    /// use std::thread;
    ///
    /// let (tx, rx) = std::sync::mpsc::channel();
    /// let promise = Promise::<u32, String>::new(move |_, reject| {
    ///     tx.send(reject).unwrap();
    ///     Ok(())
    /// });
    /// let task1 = thread::spawn(move || rx.recv().unwrap()("💥".to_string()));
    /// assert_eq!(promise.wait(), Err(WaitError::Rejected("💥".to_string())));
    /// task1.join().expect("The task1 thread has panicked");
    /// ```
    pub fn wait(self) -> Result<T, WaitError<E>> {
        let (tx, rx) = channel();
        self.at(move |outcome| {
            // The receiver only goes away once `wait` has returned.
            let _ = tx.send(outcome.map(T::clone).map_err(E::clone));
        });
        drop(self);
        match rx.recv() {
            Ok(value) => value.map_err(WaitError::Rejected),
            Err(_) => Err(WaitError::Abandoned),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{Promise, Reject, Resolve, WaitError};
    use futures::executor::block_on;
    use std::{thread, time::Duration};

    fn deferred() -> (Promise<String, String>, Resolve<String>, Reject<String>) {
        let mut callbacks = None;
        let promise = Promise::new(|resolve, reject| {
            callbacks = Some((resolve, reject));
            Ok(())
        });
        let (resolve, reject) = callbacks.unwrap();
        (promise, resolve, reject)
    }

    #[test]
    fn test_await_settled_promise() {
        let promise = Promise::<String, String>::resolve("🍓".into());
        assert_eq!(block_on(async { promise.await }), Ok("🍓".to_string()));
    }

    #[test]
    fn test_await_resolved_from_other_thread() {
        let (promise, resolve, _reject) = deferred();
        let task1 = thread::spawn(move || block_on(async { promise.map(|s| s.len()).await }));
        let task2 = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            resolve(String::from("🍓"));
        });
        task2.join().expect("The task2 thread has panicked");
        assert_eq!(task1.join().expect("The task1 thread has panicked"), Ok(4));
    }

    #[test]
    fn test_await_rejection() {
        let (promise, _resolve, reject) = deferred();
        let task1 = thread::spawn(move || block_on(async { promise.await }));
        reject("reject!!".into());
        assert_eq!(
            task1.join().expect("The task1 thread has panicked"),
            Err(WaitError::Rejected("reject!!".to_string()))
        );
    }

    #[test]
    fn test_await_abandoned_promise() {
        let (promise, resolve, reject) = deferred();
        let task1 = thread::spawn(move || block_on(async { promise.await }));
        thread::sleep(Duration::from_millis(20));
        drop(resolve);
        drop(reject);
        assert_eq!(
            task1.join().expect("The task1 thread has panicked"),
            Err(WaitError::Abandoned)
        );
    }

    #[test]
    fn test_wait_resolved_from_other_thread() {
        let (promise, resolve, _reject) = deferred();
        let task1 = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            resolve("hi".into());
        });
        assert_eq!(promise.wait(), Ok("hi".to_string()));
        task1.join().expect("The task1 thread has panicked");
    }

    #[test]
    fn test_wait_abandoned_promise() {
        let (promise, resolve, reject) = deferred();
        drop((resolve, reject));
        assert_eq!(promise.wait(), Err(WaitError::Abandoned));
    }
}
