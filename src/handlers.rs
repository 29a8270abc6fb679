//! An ordered, append-only queue of callbacks.
//!
//! `Handlers` does no locking of its own. The [`Promise`](crate::Promise)
//! owning it only touches it while holding its own lock.
use std::fmt;

/// Callbacks in the order they were appended.
///
/// # Examples
///
/// ```
/// use promise_then::Handlers;
///
/// let mut handlers: Handlers<fn(i32) -> i32> = Handlers::new();
/// handlers.append(|x| x + 1);
/// handlers.append(|x| x * 2);
/// let results: Vec<i32> = handlers.iter().map(|h| h(10)).collect();
/// assert_eq!(results, vec![11, 20]);
/// ```
pub struct Handlers<H> {
    handlers: Vec<H>,
}

impl<H> Handlers<H> {
    pub fn new() -> Self {
        Self { handlers: Vec::new() }
    }

    /// Adds `handler` after every handler already queued.
    pub fn append(&mut self, handler: H) {
        self.handlers.push(handler);
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Borrows the handlers in insertion order. May be called any number of
    /// times; each call walks the same handlers again.
    pub fn iter(&self) -> std::slice::Iter<'_, H> {
        self.handlers.iter()
    }
}

impl<H> Default for Handlers<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> IntoIterator for Handlers<H> {
    type Item = H;
    type IntoIter = std::vec::IntoIter<H>;

    /// Consumes the queue. This is how `FnOnce` handlers get fired.
    fn into_iter(self) -> Self::IntoIter {
        self.handlers.into_iter()
    }
}

impl<'a, H> IntoIterator for &'a Handlers<H> {
    type Item = &'a H;
    type IntoIter = std::slice::Iter<'a, H>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<H> fmt::Debug for Handlers<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handlers")
            .field("len", &self.handlers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::Handlers;

    #[test]
    fn test_handlers_keep_insertion_order() {
        let mut handlers: Handlers<Box<dyn Fn() -> &'static str>> = Handlers::new();
        handlers.append(Box::new(|| "h1"));
        handlers.append(Box::new(|| "h2"));
        handlers.append(Box::new(|| "h3"));
        let order: Vec<_> = handlers.iter().map(|h| h()).collect();
        assert_eq!(order, vec!["h1", "h2", "h3"]);
    }

    #[test]
    fn test_handlers_iteration_is_restartable() {
        let mut handlers: Handlers<u8> = Handlers::default();
        handlers.append(1);
        handlers.append(2);
        let first: Vec<_> = handlers.iter().copied().collect();
        let second: Vec<_> = (&handlers).into_iter().copied().collect();
        assert_eq!(first, second);
        assert_eq!(handlers.len(), 2);
    }

    #[test]
    fn test_handlers_drain_once() {
        let mut fired = Vec::new();
        {
            let mut handlers: Handlers<Box<dyn FnOnce(&mut Vec<u8>)>> = Handlers::new();
            handlers.append(Box::new(|v| v.push(1)));
            handlers.append(Box::new(|v| v.push(2)));
            for handler in handlers {
                handler(&mut fired);
            }
        }
        assert_eq!(fired, vec![1, 2]);
    }

    #[test]
    fn test_handlers_empty() {
        let handlers: Handlers<()> = Handlers::new();
        assert!(handlers.is_empty());
        assert_eq!(handlers.iter().count(), 0);
        assert_eq!(format!("{handlers:?}"), "Handlers { len: 0 }");
    }
}
