use std::fmt;

use rand::Rng;

use crate::{
    algo::TdLambdaAgent,
    error::Result,
    gym::{Cell, Pos},
};

const CELL_WIDTH: usize = 6;

/// A snapshot of the greedy action chosen in every cell, printable as a text table
///
/// Target and wall cells are shown as `T` and `W`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyGrid {
    rows: Vec<Vec<String>>,
}

impl PolicyGrid {
    /// Query the agent's policy once per valid state
    ///
    /// Ties are broken with the agent's random source, so capturing advances it.
    pub fn capture<R: Rng>(agent: &mut TdLambdaAgent<R>) -> Result<Self> {
        let env = agent.env();
        let (rows, cols) = (env.rows() as i32, env.cols() as i32);
        let mut labels = Vec::with_capacity(rows as usize);
        for row in 0..rows {
            let mut line = Vec::with_capacity(cols as usize);
            for col in 0..cols {
                line.push(Self::label(agent, (row, col))?);
            }
            labels.push(line);
        }
        Ok(Self { rows: labels })
    }

    fn label<R: Rng>(agent: &mut TdLambdaAgent<R>, pos: Pos) -> Result<String> {
        Ok(match agent.env().cell(pos) {
            Some(Cell::Normal) => agent.policy(pos)?.to_string(),
            Some(Cell::Target) => "T".to_string(),
            Some(Cell::Wall) | None => "W".to_string(),
        })
    }

    /// Label at `pos`, if it is on the grid
    pub fn get(&self, pos: Pos) -> Option<&str> {
        let (row, col) = (usize::try_from(pos.0).ok()?, usize::try_from(pos.1).ok()?);
        self.rows.get(row)?.get(col).map(String::as_str)
    }
}

impl fmt::Display for PolicyGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cols = self.rows.first().map_or(0, Vec::len);
        let rule = "-".repeat(cols * (CELL_WIDTH + 3) + 1);
        for row in &self.rows {
            writeln!(f, "{rule}")?;
            write!(f, "|")?;
            for label in row {
                write!(f, " {label:<CELL_WIDTH$} |")?;
            }
            writeln!(f)?;
        }
        writeln!(f, "{rule}")
    }
}
