// Demonstration: fill a trajectory buffer with a synthetic rollout and print
// the resulting training targets.
//
// Run from the repo root:
//   RUST_LOG=debug cargo run --example process_batch -- --steps 8 --envs 3

use std::env;

use pg_returns::{ReturnAdvantageEstimator, ReturnsConfig, ReturnsError, TrajectoryBuffer};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), ReturnsError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args: Vec<String> = env::args().collect();
    let steps: usize = arg_value(&args, "--steps")
        .and_then(|s| s.parse().ok())
        .unwrap_or(8);
    let envs: usize = arg_value(&args, "--envs")
        .and_then(|s| s.parse().ok())
        .unwrap_or(3);
    let horizon = 5;

    // Each env runs a constant-reward episode that ends every `horizon`
    // steps; env 0 is cut off by a time limit, the others terminate.
    let mut buffer = TrajectoryBuffer::new(steps, envs);
    for t in 0..steps {
        let reward = vec![1.0; envs];
        let value: Vec<f64> = (0..envs).map(|e| 0.5 + 0.1 * e as f64).collect();
        let done = vec![(t + 1) % horizon == 0; envs];
        let timeout: Vec<bool> = (0..envs).map(|e| e == 0 && done[e]).collect();
        buffer.record_step(t, &reward, &done, &value, &timeout)?;
        if timeout[0] {
            buffer.record_truncated_value(t, 0, 2.0)?;
        }
    }
    buffer.set_bootstrap_value(&vec![1.0; envs])?;

    let config = ReturnsConfig {
        discount: 0.9,
        gae_lambda: 0.95,
        bootstrap_timelimit: true,
        mid_batch_reset: true,
        normalize_advantage: true,
    };
    let estimator = ReturnAdvantageEstimator::new(config)?;
    tracing::info!(strategy = ?estimator.strategy(), steps, envs, "processing synthetic batch");

    let processed = estimator.process_returns(&buffer.batch()?)?;
    println!("returns:\n{:.3}", processed.returns);
    println!("advantage:\n{:.3}", processed.advantage);
    println!("valid:\n{}", processed.valid_or_ones());
    println!("{}", processed.summary());
    Ok(())
}

fn arg_value<'a>(args: &'a [String], key: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == key)
        .and_then(|i| args.get(i + 1))
        .map(|s| s.as_str())
}
