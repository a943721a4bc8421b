use thiserror::Error;

use crate::construct::Term;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("type error: `{expected}` expected got `{term}`")]
    Type { expected: &'static str, term: Term },
    #[error("results closed")]
    Closed,
    #[error("internal invariant violated: {0}")]
    Invariant(String),
    #[error("lock poisoned: {0}")]
    Lock(String),
}

impl EngineError {
    /// A goal head that does not resolve to something callable.
    pub fn not_callable(term: Term) -> Self {
        Self::Type {
            expected: "callable",
            term,
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
