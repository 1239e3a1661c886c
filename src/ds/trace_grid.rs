use crate::{
    error::{Error, Result},
    gym::Pos,
};

/// How a trace magnitude is turned into the basis that gets multiplied by the decay factor
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum TraceDecay {
    /// Truncate the trace toward zero before decaying it
    ///
    /// Any trace below `1.0` therefore becomes exactly `0.0` on the following sweep,
    /// so in practice credit only reaches the state visited one step earlier.
    #[default]
    Truncated,
    /// Decay the full magnitude, zeroing traces whose decayed value falls below `cutoff`
    Exact { cutoff: f64 },
}

impl TraceDecay {
    fn apply(self, trace: f64, factor: f64) -> f64 {
        match self {
            TraceDecay::Truncated => factor * trace.trunc(),
            TraceDecay::Exact { cutoff } => {
                let decayed = factor * trace;
                if decayed.abs() < cutoff {
                    0.0
                } else {
                    decayed
                }
            }
        }
    }
}

/// A dense grid of eligibility traces
///
/// Values are stored for every coordinate, but the indices of nonzero traces are tracked
/// separately so that a [sweep](TraceGrid::sweep) only touches states that are still eligible.
#[derive(Debug, Clone)]
pub struct TraceGrid {
    traces: Vec<f64>,
    active: Vec<usize>,
    rows: usize,
    cols: usize,
    decay: TraceDecay,
}

impl TraceGrid {
    /// Allocate a zeroed grid of traces
    pub fn new(rows: usize, cols: usize, decay: TraceDecay) -> Self {
        Self {
            traces: vec![0.0; rows * cols],
            active: Vec::new(),
            rows,
            cols,
            decay,
        }
    }

    fn index(&self, pos: Pos) -> Option<usize> {
        let (row, col) = pos;
        (row >= 0 && col >= 0 && (row as usize) < self.rows && (col as usize) < self.cols)
            .then(|| row as usize * self.cols + col as usize)
    }

    fn pos(&self, ix: usize) -> Pos {
        ((ix / self.cols) as i32, (ix % self.cols) as i32)
    }

    /// Current trace at `pos`, zero for coordinates off the grid
    pub fn get(&self, pos: Pos) -> f64 {
        self.index(pos).map_or(0.0, |ix| self.traces[ix])
    }

    /// Number of coordinates with a nonzero trace
    pub fn active_len(&self) -> usize {
        self.active.len()
    }

    /// Increment the trace at `pos` by one
    pub fn bump(&mut self, pos: Pos) -> Result<()> {
        let ix = self.index(pos).ok_or(Error::OutOfGrid { state: pos })?;
        if self.traces[ix] == 0.0 {
            self.active.push(ix);
        }
        self.traces[ix] += 1.0;
        Ok(())
    }

    /// Visit every nonzero trace, then decay it by `factor`
    ///
    /// `f` receives each coordinate together with its trace *before* decay. Traces that
    /// decay to zero stop being visited. Iteration order is unspecified.
    pub fn sweep<E, F>(&mut self, factor: f64, mut f: F) -> std::result::Result<(), E>
    where
        F: FnMut(Pos, f64) -> std::result::Result<(), E>,
    {
        let mut i = 0;
        while i < self.active.len() {
            let ix = self.active[i];
            let trace = self.traces[ix];
            f(self.pos(ix), trace)?;

            let decayed = self.decay.apply(trace, factor);
            self.traces[ix] = decayed;
            if decayed == 0.0 {
                self.active.swap_remove(i);
            } else {
                i += 1;
            }
        }
        Ok(())
    }

    /// Reset every trace to zero
    pub fn clear(&mut self) {
        for ix in self.active.drain(..) {
            self.traces[ix] = 0.0;
        }
    }
}
