use crate::handlers::Handlers;
use std::fmt::{self, Debug};
use std::sync::Arc;

/// A settled promise as seen by its observers. The payload stays owned by
/// the promise; observers only borrow it.
pub(crate) type Outcome<'a, T, E> = Result<&'a T, &'a E>;

/// Callback queued on a pending promise, fired once with its outcome.
pub(crate) type Handler<T, E> = Box<dyn for<'a> FnOnce(Outcome<'a, T, E>) + Send>;

/// Terminal payload, shared so it can be read after the lock is released.
pub(crate) type Settled<T, E> = Result<Arc<T>, Arc<E>>;

pub(crate) enum State<T, E> {
    Pending(Handlers<Handler<T, E>>),
    Fulfilled(Arc<T>),
    Rejected(Arc<E>),
}

impl<T, E> State<T, E> {
    pub(crate) fn pending() -> Self {
        State::Pending(Handlers::new())
    }

    pub(crate) fn is_pending(&self) -> bool {
        matches!(self, State::Pending(_))
    }

    /// `None` while pending.
    pub(crate) fn settled(&self) -> Option<Settled<T, E>> {
        match self {
            State::Pending(_) => None,
            State::Fulfilled(value) => Some(Ok(value.clone())),
            State::Rejected(error) => Some(Err(error.clone())),
        }
    }

    pub(crate) fn kind(&self) -> &'static str {
        match self {
            State::Pending(_) => "pending",
            State::Fulfilled(_) => "fulfilled",
            State::Rejected(_) => "rejected",
        }
    }
}

pub(crate) fn outcome<T, E>(settled: &Settled<T, E>) -> Outcome<'_, T, E> {
    match settled {
        Ok(value) => Ok(&**value),
        Err(error) => Err(&**error),
    }
}

impl<T, E> From<Settled<T, E>> for State<T, E> {
    fn from(settled: Settled<T, E>) -> Self {
        match settled {
            Ok(value) => State::Fulfilled(value),
            Err(error) => State::Rejected(error),
        }
    }
}

impl<T: Debug, E: Debug> Debug for State<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            State::Pending(handlers) => write!(f, "Pending({} handlers)", handlers.len()),
            State::Fulfilled(value) => f.debug_tuple("Fulfilled").field(value).finish(),
            State::Rejected(error) => f.debug_tuple("Rejected").field(error).finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{outcome, State};
    use std::sync::Arc;

    #[test]
    fn test_state_settled() {
        let pending = State::<u8, String>::pending();
        assert!(pending.is_pending());
        assert!(pending.settled().is_none());

        let fulfilled = State::<u8, String>::from(Ok(Arc::new(7)));
        let settled = fulfilled.settled().unwrap();
        assert_eq!(outcome(&settled), Ok(&7));
        assert_eq!(fulfilled.kind(), "fulfilled");

        let rejected = State::<u8, String>::from(Err(Arc::new("boom".to_string())));
        let settled = rejected.settled().unwrap();
        assert_eq!(outcome(&settled), Err(&"boom".to_string()));
        assert!(!rejected.is_pending());
    }

    #[test]
    fn test_settled_payload_is_shared() {
        let fulfilled = State::<String, ()>::from(Ok(Arc::new("big".to_string())));
        let (first, second) = (fulfilled.settled().unwrap(), fulfilled.settled().unwrap());
        match (first, second) {
            (Ok(a), Ok(b)) => assert!(Arc::ptr_eq(&a, &b)),
            _ => panic!("expected fulfilled"),
        }
    }

    #[test]
    fn test_state_debug() {
        let mut pending = State::<u8, ()>::pending();
        if let State::Pending(handlers) = &mut pending {
            handlers.append(Box::new(|_| {}));
        }
        assert_eq!(format!("{pending:?}"), "Pending(1 handlers)");
        assert_eq!(
            format!("{:?}", State::<u8, ()>::from(Ok(Arc::new(3)))),
            "Fulfilled(3)"
        );
    }
}
