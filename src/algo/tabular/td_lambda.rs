use log::{debug, info, trace, warn};
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::{
    assert_interval,
    ds::{TraceDecay, TraceGrid},
    error::{Error, Result},
    exploration::Greedy,
    gym::{Action, Cell, GridWorld, Pos},
};

use super::action_values::ActionValueTable;

/// Which next-state estimate the TD error bootstraps from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Bootstrap {
    /// Q(s', a) for the same action `a` that was just taken
    ///
    /// A cycle of states whose TD errors are all zero is a fixed point of this rule, so
    /// training is not guaranteed to leave such loops.
    #[default]
    TakenAction,
    /// max<sub>b</sub> Q(s', b) over the actions legal at s'
    Greedy,
}

/// Configuration for the [`TdLambdaAgent`]
#[derive(Debug, Clone)]
pub struct TdLambdaConfig {
    /// Learning rate, in `[0, 1]`
    pub alpha: f64,
    /// Discount factor, in `[0, 1]`
    pub gamma: f64,
    /// Trace decay parameter, in `[0, 1]`
    pub lambda: f64,
    /// Number of outer training passes
    pub iterations: usize,
    /// Episodes run from the same start state in each pass
    pub horizon: usize,
    /// Seed for the tie-breaking random source
    pub seed: u64,
    /// Reward for every step that does not enter the target
    pub step_reward: f64,
    /// Reward for entering the target
    pub target_reward: f64,
    /// Transitions after which an episode is abandoned
    ///
    /// Episodes otherwise run until the target is reached, which may never happen.
    pub max_episode_steps: usize,
    pub trace_decay: TraceDecay,
    pub bootstrap: Bootstrap,
    /// Clear all eligibility traces at the start of every episode
    ///
    /// **Default**: `false`, traces carry over between episodes
    pub reset_traces: bool,
}

impl Default for TdLambdaConfig {
    fn default() -> Self {
        Self {
            alpha: 0.8,
            gamma: 0.9,
            lambda: 0.8,
            iterations: 100,
            horizon: 10,
            seed: 9527,
            step_reward: -1.0,
            target_reward: 100.0,
            max_episode_steps: 10_000,
            trace_decay: TraceDecay::default(),
            bootstrap: Bootstrap::default(),
            reset_traces: false,
        }
    }
}

/// A single transition observed by the agent
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Exp {
    /// The state the action was taken in
    pub state: Pos,
    /// The action taken
    pub action: Action,
    /// The state entered after the action
    pub next_state: Pos,
    /// The reward received for the transition
    pub reward: f64,
    /// Whether `next_state` is terminal
    pub done: bool,
}

/// Summary of one episode
#[derive(Debug, Clone, PartialEq)]
pub struct EpisodeReport {
    pub start: Pos,
    pub steps: usize,
    pub reward: f64,
    pub reached_target: bool,
}

impl EpisodeReport {
    /// Whether the episode hit the step cap before reaching the target
    pub fn truncated(&self) -> bool {
        !self.reached_target
    }
}

/// Totals accumulated over a training run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrainingReport {
    pub episodes: usize,
    pub steps: usize,
    pub reached_target: usize,
    pub truncated: usize,
}

impl TrainingReport {
    fn record(&mut self, episode: &EpisodeReport) {
        self.episodes += 1;
        self.steps += episode.steps;
        if episode.truncated() {
            self.truncated += 1;
        } else {
            self.reached_target += 1;
        }
    }
}

/// Backward-view TD(λ) on a [`GridWorld`]
///
/// After every transition the TD error
///
/// δ = r + γ Q(s', a) - Q(s, a)
///
/// is assigned to every state with a nonzero eligibility trace e:
///
/// Q(x, a) ← Q(x, a) + α δ e(x), then e(x) ← γ λ e(x)
///
/// Traces are kept per state, not per (state, action) pair, and the update is applied to
/// the action `a` that was just taken.
///
/// ### Generics
/// - `R` - The random source used to break ties between equally valued actions
pub struct TdLambdaAgent<R: Rng = StdRng> {
    env: GridWorld,
    values: ActionValueTable,
    traces: TraceGrid,
    greedy: Greedy<R>,
    alpha: f64,
    gamma: f64,
    lambda: f64,
    iterations: usize,
    horizon: usize,
    step_reward: f64,
    target_reward: f64,
    max_episode_steps: usize,
    bootstrap: Bootstrap,
    reset_traces: bool,
    episode: u32,
}

impl TdLambdaAgent<StdRng> {
    /// Initialize a new agent whose random source is seeded from `config.seed`
    ///
    /// **Panics** if `alpha`, `gamma` or `lambda` is not in the interval `[0,1]`
    pub fn new(env: GridWorld, config: TdLambdaConfig) -> Self {
        let rng = StdRng::seed_from_u64(config.seed);
        Self::with_rng(env, config, rng)
    }
}

impl<R: Rng> TdLambdaAgent<R> {
    /// Initialize a new agent with an explicit random source, ignoring `config.seed`
    ///
    /// **Panics** if `alpha`, `gamma` or `lambda` is not in the interval `[0,1]`
    pub fn with_rng(env: GridWorld, config: TdLambdaConfig, rng: R) -> Self {
        assert_interval!(config.alpha, 0.0, 1.0);
        assert_interval!(config.gamma, 0.0, 1.0);
        assert_interval!(config.lambda, 0.0, 1.0);

        let values = ActionValueTable::new(env.valid_states());
        let traces = TraceGrid::new(env.rows(), env.cols(), config.trace_decay);
        Self {
            env,
            values,
            traces,
            greedy: Greedy::new(rng),
            alpha: config.alpha,
            gamma: config.gamma,
            lambda: config.lambda,
            iterations: config.iterations,
            horizon: config.horizon,
            step_reward: config.step_reward,
            target_reward: config.target_reward,
            max_episode_steps: config.max_episode_steps,
            bootstrap: config.bootstrap,
            reset_traces: config.reset_traces,
            episode: 0,
        }
    }

    pub fn env(&self) -> &GridWorld {
        &self.env
    }

    pub fn values(&self) -> &ActionValueTable {
        &self.values
    }

    /// Mutable access to the action values, e.g. to seed a starting policy
    pub fn values_mut(&mut self) -> &mut ActionValueTable {
        &mut self.values
    }

    pub fn traces(&self) -> &TraceGrid {
        &self.traces
    }

    /// Number of episodes run so far
    pub fn episode(&self) -> u32 {
        self.episode
    }

    /// Overwrite a batch of action values
    pub fn seed_values(
        &mut self,
        entries: impl IntoIterator<Item = (Pos, Action, f64)>,
    ) -> Result<()> {
        entries
            .into_iter()
            .try_for_each(|(state, action, value)| self.values.set(state, action, value))
    }

    fn legal_values(&self, state: Pos) -> Result<Vec<(Action, f64)>> {
        self.env
            .legal_actions(state)
            .into_iter()
            .map(|a| Ok((a, self.values.get(state, a)?)))
            .collect()
    }

    /// Choose the highest valued legal action at `state`, breaking ties at random
    pub fn policy(&mut self, state: Pos) -> Result<Action> {
        let candidates = self.legal_values(state)?;
        self.greedy
            .choose(&candidates)
            .ok_or(Error::NoLegalActions { state })
    }

    fn bootstrap_value(&self, exp: &Exp) -> Result<f64> {
        if exp.done {
            return Ok(0.0);
        }
        match self.bootstrap {
            Bootstrap::TakenAction => self.values.get(exp.next_state, exp.action),
            Bootstrap::Greedy => self
                .legal_values(exp.next_state)?
                .into_iter()
                .map(|(_, v)| v)
                .reduce(f64::max)
                .ok_or(Error::NoLegalActions {
                    state: exp.next_state,
                }),
        }
    }

    /// Apply the TD(λ) update for one transition
    ///
    /// **Returns** the TD error δ
    pub fn learn(&mut self, exp: Exp) -> Result<f64> {
        let q_value = self.values.get(exp.state, exp.action)?;
        let delta = exp.reward + self.gamma * self.bootstrap_value(&exp)? - q_value;

        self.traces.bump(exp.state)?;

        let factor = self.gamma * self.lambda;
        let step = self.alpha * delta;
        let Self { values, traces, .. } = self;
        traces.sweep(factor, |pos, e| {
            // "Terminal state" is the state just entered, and only when `done` is set.
            // The target never holds a trace, so in practice this only matters for
            // transitions supplied directly to `learn`.
            if exp.done && pos == exp.next_state {
                return Ok(());
            }
            values.add(pos, exp.action, step * e)
        })?;

        trace!(
            "{:?} -{}-> {:?}: reward {}, delta {delta:.4}, {} eligible",
            exp.state,
            exp.action,
            exp.next_state,
            exp.reward,
            self.traces.active_len()
        );
        Ok(delta)
    }

    /// Run one episode from `start`, learning after every transition
    pub fn go(&mut self, start: Pos) -> Result<EpisodeReport> {
        if self.env.cell(start) != Some(Cell::Normal) {
            return Err(Error::InvalidStart { state: start });
        }
        if self.reset_traces {
            self.traces.clear();
        }

        let mut report = EpisodeReport {
            start,
            steps: 0,
            reward: 0.0,
            reached_target: false,
        };
        let mut state = start;
        while report.steps < self.max_episode_steps {
            let action = self.policy(state)?;
            let next_state = self.env.transition(state, action);
            let done = self.env.is_target(next_state);
            let reward = if done {
                self.target_reward
            } else {
                self.step_reward
            };

            self.learn(Exp {
                state,
                action,
                next_state,
                reward,
                done,
            })?;

            report.steps += 1;
            report.reward += reward;
            state = next_state;
            if done {
                report.reached_target = true;
                break;
            }
        }

        if report.truncated() {
            warn!(
                "Episode {} from {start:?} abandoned after {} steps without reaching the target",
                self.episode, report.steps
            );
        }
        self.episode += 1;
        Ok(report)
    }

    /// Run the full training schedule
    ///
    /// Each of the `iterations` passes picks the next start state in row-major order,
    /// wrapping around, and runs `horizon` episodes from it.
    pub fn train(&mut self) -> Result<TrainingReport> {
        let starts = self.env.valid_states();
        let mut report = TrainingReport::default();
        if starts.is_empty() {
            warn!("Grid has no valid start states, nothing to train");
            return Ok(report);
        }

        for iteration in 0..self.iterations {
            let start = starts[iteration % starts.len()];
            let before = report.steps;
            for _ in 0..self.horizon {
                let episode = self.go(start)?;
                report.record(&episode);
            }
            debug!(
                "Iteration {iteration}: {} episodes from {start:?} took {} steps",
                self.horizon,
                report.steps - before
            );
        }

        info!(
            "Trained {} episodes ({} steps), {} reached the target, {} truncated",
            report.episodes, report.steps, report.reached_target, report.truncated
        );
        Ok(report)
    }

    /// Follow the policy from `start` for at most `max_steps` transitions, stopping at the target
    ///
    /// **Returns** the visited states, beginning with `start`
    pub fn greedy_path(&mut self, start: Pos, max_steps: usize) -> Result<Vec<Pos>> {
        let mut path = vec![start];
        let mut state = start;
        while !self.env.is_target(state) && path.len() <= max_steps {
            let action = self.policy(state)?;
            state = self.env.transition(state, action);
            path.push(state);
        }
        Ok(path)
    }
}
