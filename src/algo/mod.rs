pub mod tabular;

pub use tabular::{
    action_values::ActionValueTable,
    td_lambda::{Bootstrap, EpisodeReport, Exp, TdLambdaAgent, TdLambdaConfig, TrainingReport},
};
