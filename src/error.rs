//! Error types for the TD(λ) engine

use thiserror::Error;

use crate::gym::{Action, Pos};

/// Main error type for the crate
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum Error {
    #[error("state {state:?} has no legal action that leaves it")]
    NoLegalActions { state: Pos },

    #[error("no action value recorded for state {state:?} and action `{action}`")]
    UnknownEntry { state: Pos, action: Action },

    #[error("episodes cannot start from {state:?}, it is not a normal cell")]
    InvalidStart { state: Pos },

    #[error("grid layout has no cells")]
    EmptyLayout,

    #[error("grid row {row} has {got} cells, expected {expected}")]
    RaggedLayout {
        row: usize,
        expected: usize,
        got: usize,
    },

    #[error("invalid cell character '{character}' at row {row}, column {col}")]
    InvalidCell { character: char, row: usize, col: usize },

    #[error("action `{action}` is reserved for {state:?}, which is not a normal cell")]
    InvalidExclusiveSource { action: Action, state: Pos },

    #[error("state {state:?} lies outside the grid")]
    OutOfGrid { state: Pos },
}

pub type Result<T> = std::result::Result<T, Error>;
