//! The promise state machine: construction, settlement and subscription.
//!
//! Every promise owns one lock around its state. The lock is only held to
//! read or swap the state; handlers always run after it is released, on the
//! settled payload shared out of it. A handler may therefore call back into
//! any promise, including the one that fired it, without deadlocking.
use crate::state::{outcome, Handler, Outcome, Settled, State};
use parking_lot::Mutex;
use std::fmt::{self, Debug};
use std::sync::Arc;

/// Fulfills the promise it was handed out by. Calls after the first
/// settlement are ignored.
pub type Resolve<T> = Arc<dyn Fn(T) + Send + Sync>;

/// Rejects the promise it was handed out by. Calls after the first
/// settlement are ignored.
pub type Reject<E> = Arc<dyn Fn(E) + Send + Sync>;

/// A value of type `T`, or an error of type `E`, that may not be known yet.
///
/// A promise starts out pending and settles exactly once, either fulfilled
/// or rejected. Continuations attached with [`then`](Promise::then) and its
/// siblings run on whichever thread settles the promise, or right away on
/// the calling thread when the promise is already settled.
///
/// Cloning a `Promise` clones the handle, not the value.
///
/// # Examples
///
/// ```
/// use promise_then::{Promise, Resolve};
/// use std::thread;
///
/// let (tx, rx) = std::sync::mpsc::channel::<Resolve<String>>();
/// let promise = Promise::<String, ()>::new(move |resolve, _reject| {
///     tx.send(resolve).unwrap();
///     Ok(())
/// });
/// let loud = promise.map(|s| s.to_uppercase());
///
/// let task1 = thread::spawn(move || {
///     let resolve = rx.recv().unwrap();
///     resolve("hi".into());
/// });
/// task1.join().expect("The task1 thread has panicked");
/// assert_eq!(loud.peek(), Some(Ok("HI".to_string())));
/// ```
pub struct Promise<T, E> {
    inner: Arc<Mutex<State<T, E>>>,
}

impl<T, E> Clone for Promise<T, E> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T, E> Promise<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    /// Runs `executor` right away on the calling thread, handing it the
    /// callbacks that settle the new promise. They may be called inside the
    /// executor or stored and called later from any thread.
    ///
    /// An executor returning `Err(error)` rejects the promise with `error`,
    /// unless it was already settled.
    ///
    /// ```
    /// use promise_then::Promise;
    ///
    /// let failed = Promise::<u32, &str>::new(|_resolve, _reject| Err("no disk"));
    /// assert_eq!(failed.peek(), Some(Err("no disk")));
    /// ```
    pub fn new<F>(executor: F) -> Self
    where
        F: FnOnce(Resolve<T>, Reject<E>) -> Result<(), E>,
    {
        let promise = Self {
            inner: Arc::new(Mutex::new(State::pending())),
        };
        let (resolve, reject) = promise.callbacks();
        if let Err(error) = executor(resolve, reject.clone()) {
            tracing::trace!("promise executor returned an error");
            reject(error);
        }
        promise
    }

    /// A promise already fulfilled with `value`.
    pub fn resolve(value: T) -> Self {
        Self::new(|resolve, _| {
            resolve(value);
            Ok(())
        })
    }

    /// A promise already rejected with `error`.
    pub fn reject(error: E) -> Self {
        Self::new(|_, reject| {
            reject(error);
            Ok(())
        })
    }

    /// Settles with the outcome of whichever input settles first.
    ///
    /// "First" is the first settlement the returned promise sees; the rest
    /// are dropped. Losing inputs keep running. Under concurrent settlement
    /// the thread that takes the returned promise's lock first wins. With no
    /// inputs the returned promise never settles.
    ///
    /// ```
    /// use promise_then::{Promise, Resolve};
    ///
    /// let mut slow_resolve: Option<Resolve<i32>> = None;
    /// let slow = Promise::<i32, ()>::new(|resolve, _| {
    ///     slow_resolve = Some(resolve);
    ///     Ok(())
    /// });
    /// let winner = Promise::race([slow, Promise::resolve(2)]);
    /// slow_resolve.unwrap()(1);
    /// assert_eq!(winner.peek(), Some(Ok(2)));
    /// ```
    pub fn race<I>(promises: I) -> Self
    where
        I: IntoIterator<Item = Promise<T, E>>,
    {
        Self::new(|resolve, reject| {
            for promise in promises {
                let resolve = resolve.clone();
                let reject = reject.clone();
                promise.then_or(
                    move |value| resolve(value.clone()),
                    move |error| reject(error.clone()),
                );
            }
            Ok(())
        })
    }

    /// Derives a promise settled by `dispatch` once `parent` settles.
    pub(crate) fn when<U, D>(parent: &Promise<U, E>, dispatch: D) -> Self
    where
        U: Clone + Send + Sync + 'static,
        D: for<'a> FnOnce(Outcome<'a, U, E>, Resolve<T>, Reject<E>) + Send + 'static,
    {
        Self::new(|resolve, reject| {
            parent.at(move |outcome| dispatch(outcome, resolve, reject));
            Ok(())
        })
    }

    /// Runs `handler` exactly once with the outcome: now if settled,
    /// otherwise when the promise settles, after every handler queued before
    /// it.
    pub(crate) fn at<H>(&self, handler: H)
    where
        H: for<'a> FnOnce(Outcome<'a, T, E>) + Send + 'static,
    {
        let settled = {
            let mut state = self.inner.lock();
            let settled = state.settled();
            match settled {
                Some(settled) => settled,
                None => {
                    if let State::Pending(handlers) = &mut *state {
                        handlers.append(Box::new(handler) as Handler<T, E>);
                    }
                    return;
                }
            }
        };
        handler(outcome(&settled));
    }

    /// Moves the promise out of `Pending`, then fires the queued handlers
    /// once the lock is released. No-op once settled.
    fn settle(&self, result: Result<T, E>) {
        let settled: Settled<T, E> = result.map(Arc::new).map_err(Arc::new);
        let handlers = {
            let mut state = self.inner.lock();
            if !state.is_pending() {
                tracing::debug!("ignoring settlement of an already {} promise", state.kind());
                return;
            }
            let previous = std::mem::replace(&mut *state, State::from(settled.clone()));
            match previous {
                State::Pending(handlers) => handlers,
                State::Fulfilled(_) | State::Rejected(_) => return,
            }
        };
        let kind = if settled.is_ok() { "fulfilled" } else { "rejected" };
        tracing::trace!(handlers = handlers.len(), "promise {}", kind);
        let view = outcome(&settled);
        for handler in handlers {
            handler(view);
        }
    }

    fn callbacks(&self) -> (Resolve<T>, Reject<E>) {
        let fulfilled = self.clone();
        let rejected = self.clone();
        (
            Arc::new(move |value: T| fulfilled.settle(Ok(value))),
            Arc::new(move |error: E| rejected.settle(Err(error))),
        )
    }
}

impl<T, E> Promise<T, E> {
    pub fn is_pending(&self) -> bool {
        self.inner.lock().is_pending()
    }

    pub fn is_fulfilled(&self) -> bool {
        matches!(&*self.inner.lock(), State::Fulfilled(_))
    }

    pub fn is_rejected(&self) -> bool {
        matches!(&*self.inner.lock(), State::Rejected(_))
    }

    /// A copy of the outcome, or `None` while pending.
    pub fn peek(&self) -> Option<Result<T, E>>
    where
        T: Clone,
        E: Clone,
    {
        let settled = self.inner.lock().settled()?;
        Some(outcome(&settled).map(T::clone).map_err(E::clone))
    }
}

impl<T: Debug, E: Debug> Debug for Promise<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.lock();
        f.debug_tuple("Promise").field(&*state).finish()
    }
}
