pub mod action_values;
pub mod td_lambda;
