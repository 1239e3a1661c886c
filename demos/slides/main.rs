use std::error::Error;

use td_lambda::{
    algo::{Bootstrap, TdLambdaAgent, TdLambdaConfig},
    gym::{GridWorld, SLIDES_POLICY},
    viz::PolicyGrid,
};

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // `--greedy` bootstraps from the best next action instead of the one just taken
    let bootstrap = if std::env::args().any(|arg| arg == "--greedy") {
        Bootstrap::Greedy
    } else {
        Bootstrap::TakenAction
    };

    let config = TdLambdaConfig {
        bootstrap,
        ..Default::default()
    };
    let mut agent = TdLambdaAgent::new(GridWorld::slides(), config);
    agent.seed_values(SLIDES_POLICY.iter().map(|&(state, action)| (state, action, 1.0)))?;

    println!("Before training, T = Target, W = Wall");
    print!("{}", PolicyGrid::capture(&mut agent)?);

    println!("\nRunning TD(λ) episodes...\n");
    let report = agent.train()?;
    println!(
        "{} episodes, {} steps, {} abandoned at the step cap\n",
        report.episodes, report.steps, report.truncated
    );

    println!("After training, T = Target, W = Wall");
    print!("{}", PolicyGrid::capture(&mut agent)?);

    Ok(())
}
