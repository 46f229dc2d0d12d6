//! Symbolic Regression with Genetic Programming
//!
//! This example fits f(x) = x^2 + 2x from 40 samples on [-5, 5].
//!
//! An optional argument names a JSON file with `GpConfig` fields; fields it
//! leaves out keep their defaults. Set `RUST_LOG=debug` to see per-generation
//! progress.
//!
//! ```text
//! cargo run --example symbolic_regression -- config.json
//! ```

use std::fs;

use symreg_gp::prelude::*;

fn target(x: f64) -> f64 {
    x * x + 2.0 * x
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    println!("=== Symbolic Regression with GP ===\n");

    let config = match std::env::args().nth(1) {
        Some(path) => serde_json::from_str::<GpConfig>(&fs::read_to_string(&path)?)?,
        None => GpConfig::default().with_seed(42),
    };

    let points = PointSet::linspace("x", -5.0, 5.0, 40, target);

    println!("Target function: f(x) = x^2 + 2*x");
    println!("Training points: {}", points.len());
    println!(
        "Population: {}, max depth: {}, generation cap: {}, target: {}",
        config.population_size, config.max_depth, config.generation_cap, config.target_fitness
    );
    println!();

    let result = evolve(&config, &points)?;

    for stats in result.stats.generations.iter().step_by(10) {
        println!(
            "Gen {:3}: best = {:.6}, mean = {:.6}, mean size = {:.1}",
            stats.generation, stats.best_fitness, stats.mean_fitness, stats.mean_size
        );
    }

    println!("\n=== Final Result ===");
    println!("{}", result.stats.summary());
    println!("Best expression: {}", result.best);
    println!("Tree size: {} nodes", result.best.size());
    println!("Tree depth: {}", result.best.depth());

    println!("\nComparison on test points:");
    println!("{:>6} {:>12} {:>12} {:>12}", "x", "Target", "Predicted", "Error");
    for (x, predicted) in result.best.sample_grid("x", -3.5, 2.5, 5) {
        match predicted {
            Some(y) => println!(
                "{:6.1} {:12.4} {:12.4} {:12.6}",
                x,
                target(x),
                y,
                (target(x) - y).abs()
            ),
            None => println!("{:6.1} {:12.4} {:>12} {:>12}", x, target(x), "undefined", "-"),
        }
    }

    Ok(())
}
