mod trace_grid;

pub use trace_grid::{TraceDecay, TraceGrid};
