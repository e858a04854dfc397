//! Batch Experiment
//!
//! Runs MMAS and Simple-ACO a number of times on the same randomised
//! problem and compares the per-iteration averages. Set `RUST_LOG=info`
//! to see each run complete.

use aco_design::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Batch Experiment ===\n");

    let mut rng = StdRng::seed_from_u64(42);
    let problem = DesignProblem::random(ProblemKind::Test, 5, 15, 15, 0.2, &mut rng)?;
    println!(
        "Problem: {} attributes, {} methods, {} uses, {} classes\n",
        problem.number_of_attributes(),
        problem.number_of_methods(),
        problem.number_of_uses(),
        problem.number_of_classes()
    );

    for config in [AcoConfig::mmas(), AcoConfig::simple_aco()] {
        let config = AcoConfig {
            number_of_iterations: 100,
            ..config
        };
        let algorithm = config.algorithm;
        let results = BatchRunner::new(config, problem.clone())
            .runs(10)
            .seed(7)
            .run()?;

        println!("--- {} ---", algorithm);
        for averages in results.averages.iter().step_by(20) {
            println!(
                "  iteration {:>3}: average CBO = {:.4}, best CBO = {:.4}, best NAC = {:.4}",
                averages.iteration, averages.average_cbo, averages.best_cbo, averages.best_nac
            );
        }
        println!("  mean best CBO over runs: {:.4}\n", results.mean_best_cbo());

        if let Some(path) = std::env::args().nth(1) {
            let file = format!("{}-{}.json", path, algorithm);
            results.write_json(&file)?;
            println!("  results written to {}\n", file);
        }
    }

    Ok(())
}
