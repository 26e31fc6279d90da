/// Outcome of a call that did not fail.
///
/// `Suppressed` means the server rejected the session, the session was cleared
/// and the view was already sent to the login page. Callers must drop the call's
/// result without reporting anything.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply<T> {
    Data(T),
    Suppressed,
}

impl<T> Reply<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Reply<U> {
        match self {
            Reply::Data(value) => Reply::Data(f(value)),
            Reply::Suppressed => Reply::Suppressed,
        }
    }

    pub fn data(self) -> Option<T> {
        match self {
            Reply::Data(value) => Some(value),
            Reply::Suppressed => None,
        }
    }

    #[must_use]
    pub fn is_suppressed(&self) -> bool {
        matches!(self, Reply::Suppressed)
    }
}
