// libs/tenant-cell/src/scoped.rs

/// A value that only exists once the required scoping identifier is
/// resolved. Callers must handle both arms; there is no silent empty
/// fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scoped<T> {
    Unscoped,
    Ready(T),
}

impl<T> Scoped<T> {
    pub fn is_ready(&self) -> bool {
        matches!(self, Scoped::Ready(_))
    }

    pub fn as_ref(&self) -> Scoped<&T> {
        match self {
            Scoped::Ready(value) => Scoped::Ready(value),
            Scoped::Unscoped => Scoped::Unscoped,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Scoped<U> {
        match self {
            Scoped::Ready(value) => Scoped::Ready(f(value)),
            Scoped::Unscoped => Scoped::Unscoped,
        }
    }

    pub fn ready(self) -> Option<T> {
        match self {
            Scoped::Ready(value) => Some(value),
            Scoped::Unscoped => None,
        }
    }

    pub fn ok_or<E>(self, err: E) -> Result<T, E> {
        match self {
            Scoped::Ready(value) => Ok(value),
            Scoped::Unscoped => Err(err),
        }
    }
}

impl<T> From<Option<T>> for Scoped<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Scoped::Ready(value),
            None => Scoped::Unscoped,
        }
    }
}
