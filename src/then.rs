//! Continuations: every method here derives a new promise from `self`.
//!
//! A rejected parent never runs a success continuation. Its error reaches
//! the derived promise unchanged, whether or not a rejection observer ran.
use crate::promise::Promise;

impl<T, E> Promise<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    /// Observes the value. The derived promise settles the same way as
    /// `self`.
    pub fn then<F>(&self, on_fulfilled: F) -> Promise<T, E>
    where
        F: FnOnce(&T) + Send + 'static,
    {
        self.then_or(on_fulfilled, |_| {})
    }

    /// Like [`then`](Self::then), also observing the error on rejection.
    pub fn then_or<F, R>(&self, on_fulfilled: F, on_rejected: R) -> Promise<T, E>
    where
        F: FnOnce(&T) + Send + 'static,
        R: FnOnce(&E) + Send + 'static,
    {
        Promise::<T, E>::when(self, move |outcome, resolve, reject| match outcome {
            Ok(value) => {
                on_fulfilled(value);
                resolve(value.clone());
            }
            Err(error) => {
                on_rejected(error);
                reject(error.clone());
            }
        })
    }

    /// Fulfills the derived promise with what `on_fulfilled` returns.
    ///
    /// ```
    /// use promise_then::Promise;
    ///
    /// let doubled = Promise::<i32, ()>::resolve(5).map(|x| x * 2);
    /// assert_eq!(doubled.peek(), Some(Ok(10)));
    /// ```
    pub fn map<U, F>(&self, on_fulfilled: F) -> Promise<U, E>
    where
        U: Clone + Send + Sync + 'static,
        F: FnOnce(&T) -> U + Send + 'static,
    {
        self.map_or(on_fulfilled, |_| {})
    }

    pub fn map_or<U, F, R>(&self, on_fulfilled: F, on_rejected: R) -> Promise<U, E>
    where
        U: Clone + Send + Sync + 'static,
        F: FnOnce(&T) -> U + Send + 'static,
        R: FnOnce(&E) + Send + 'static,
    {
        Promise::<U, E>::when(self, move |outcome, resolve, reject| match outcome {
            Ok(value) => resolve(on_fulfilled(value)),
            Err(error) => {
                on_rejected(error);
                reject(error.clone());
            }
        })
    }

    /// Settles the derived promise with the promise `on_fulfilled` returns,
    /// once that one settles. The result is a `Promise<U, E>`, never a
    /// promise of a promise.
    ///
    /// ```
    /// use promise_then::Promise;
    ///
    /// let next = Promise::<i32, ()>::resolve(1).flat_map(|x| Promise::resolve(x + 1));
    /// assert_eq!(next.peek(), Some(Ok(2)));
    /// ```
    pub fn flat_map<U, F>(&self, on_fulfilled: F) -> Promise<U, E>
    where
        U: Clone + Send + Sync + 'static,
        F: FnOnce(&T) -> Promise<U, E> + Send + 'static,
    {
        self.flat_map_or(on_fulfilled, |_| {})
    }

    pub fn flat_map_or<U, F, R>(&self, on_fulfilled: F, on_rejected: R) -> Promise<U, E>
    where
        U: Clone + Send + Sync + 'static,
        F: FnOnce(&T) -> Promise<U, E> + Send + 'static,
        R: FnOnce(&E) + Send + 'static,
    {
        Promise::<U, E>::when(self, move |outcome, resolve, reject| match outcome {
            Ok(value) => on_fulfilled(value).at(move |inner| match inner {
                Ok(value) => resolve(value.clone()),
                Err(error) => reject(error.clone()),
            }),
            Err(error) => {
                on_rejected(error);
                reject(error.clone());
            }
        })
    }

    /// Fulfills the derived promise with `Ok`, rejects it with `Err`.
    /// Unlike [`map`](Self::map) the continuation can fail the chain.
    ///
    /// ```
    /// use promise_then::Promise;
    ///
    /// let parsed = Promise::<String, String>::resolve("x1".into())
    ///     .try_map(|s| s.parse::<u8>().map_err(|e| e.to_string()));
    /// assert!(parsed.is_rejected());
    /// ```
    pub fn try_map<U, F>(&self, on_fulfilled: F) -> Promise<U, E>
    where
        U: Clone + Send + Sync + 'static,
        F: FnOnce(&T) -> Result<U, E> + Send + 'static,
    {
        Promise::<U, E>::when(self, move |outcome, resolve, reject| match outcome {
            Ok(value) => match on_fulfilled(value) {
                Ok(next) => resolve(next),
                Err(error) => {
                    tracing::trace!("continuation returned an error");
                    reject(error);
                }
            },
            Err(error) => reject(error.clone()),
        })
    }

    /// Observes the error. A fulfilled value passes through untouched and the
    /// derived promise is still rejected with the same error.
    ///
    /// ```
    /// use promise_then::Promise;
    /// use std::sync::{Arc, Mutex};
    ///
    /// let seen = Arc::new(Mutex::new(None));
    /// let out = seen.clone();
    /// let caught = Promise::<(), &str>::reject("E")
    ///     .then(|_| unreachable!())
    ///     .catch(move |e| *out.lock().unwrap() = Some(*e));
    /// assert_eq!(*seen.lock().unwrap(), Some("E"));
    /// assert_eq!(caught.peek(), Some(Err("E")));
    /// ```
    pub fn catch<R>(&self, on_rejected: R) -> Promise<T, E>
    where
        R: FnOnce(&E) + Send + 'static,
    {
        self.then_or(|_| {}, on_rejected)
    }

    /// Runs `action` when `self` settles either way. The derived promise
    /// carries the original value or error, not anything from `action`.
    pub fn always<A>(&self, action: A) -> Promise<T, E>
    where
        A: FnOnce() + Send + 'static,
    {
        Promise::<T, E>::when(self, move |outcome, resolve, reject| {
            action();
            match outcome {
                Ok(value) => resolve(value.clone()),
                Err(error) => reject(error.clone()),
            }
        })
    }
}
