pub mod grid_world;

pub use grid_world::{Action, Cell, GridWorld, Layout, Pos, SLIDES_POLICY};
