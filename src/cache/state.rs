//! Observable state of a single cached query.

/// Snapshot of one query as a UI binding would render it.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryState<V, E> {
    /// No data yet.
    Pending { fetching: bool },
    /// Data present and the last fetch succeeded.
    Success { data: V, stale: bool, fetching: bool },
    /// The last fetch failed. `data` is the last successful value, if any.
    Error {
        error: E,
        data: Option<V>,
        fetching: bool,
    },
}

impl<V, E> QueryState<V, E> {
    pub fn is_pending(&self) -> bool {
        matches!(self, QueryState::Pending { .. })
    }

    pub fn is_success(&self) -> bool {
        matches!(self, QueryState::Success { .. })
    }

    pub fn is_error(&self) -> bool {
        matches!(self, QueryState::Error { .. })
    }

    pub fn is_fetching(&self) -> bool {
        match self {
            QueryState::Pending { fetching }
            | QueryState::Success { fetching, .. }
            | QueryState::Error { fetching, .. } => *fetching,
        }
    }

    /// The value a view would show, including stale or pre-error data.
    pub fn data(&self) -> Option<&V> {
        match self {
            QueryState::Pending { .. } => None,
            QueryState::Success { data, .. } => Some(data),
            QueryState::Error { data, .. } => data.as_ref(),
        }
    }

    pub fn error(&self) -> Option<&E> {
        match self {
            QueryState::Error { error, .. } => Some(error),
            _ => None,
        }
    }
}
