use std::collections::HashMap;

use strum::VariantArray;

use crate::{
    error::{Error, Result},
    gym::{Action, Pos},
};

/// Action-value estimates Q(s, a) for a fixed set of states
///
/// Every state the table is built for gets an entry for every [`Action`], whether or not
/// the action is legal there. Entries are never added or removed afterwards, so a lookup
/// for any other state is reported as [`Error::UnknownEntry`] instead of defaulting.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionValueTable {
    values: HashMap<(Pos, Action), f64>,
}

impl ActionValueTable {
    /// Create a zero-initialized table covering `states`
    pub fn new(states: impl IntoIterator<Item = Pos>) -> Self {
        let values = states
            .into_iter()
            .flat_map(|s| Action::VARIANTS.iter().map(move |&a| ((s, a), 0.0)))
            .collect();
        Self { values }
    }

    pub fn get(&self, state: Pos, action: Action) -> Result<f64> {
        self.values
            .get(&(state, action))
            .copied()
            .ok_or(Error::UnknownEntry { state, action })
    }

    pub fn set(&mut self, state: Pos, action: Action, value: f64) -> Result<()> {
        *self.entry(state, action)? = value;
        Ok(())
    }

    /// Add `amount` to the current estimate
    pub fn add(&mut self, state: Pos, action: Action, amount: f64) -> Result<()> {
        *self.entry(state, action)? += amount;
        Ok(())
    }

    fn entry(&mut self, state: Pos, action: Action) -> Result<&mut f64> {
        self.values
            .get_mut(&(state, action))
            .ok_or(Error::UnknownEntry { state, action })
    }

    /// Number of (state, action) entries
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&(Pos, Action), &f64)> {
        self.values.iter()
    }
}
