// Pure computations over match data: metrics, trends, weapon ranking, prompts.

pub mod match_metrics;
pub mod prompt;
pub mod trend;
pub mod weapons;
