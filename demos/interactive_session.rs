//! Interactive Design Session
//!
//! Drives an interactive search step by step. A simulated designer scores
//! each presented design by its coupling and class balance, freezes the
//! most cohesive class once, and archives anything scoring above 80.
//!
//! In a real application the request would be shown to a person; the
//! second half of the demo does the same through a `ChannelReviewer`
//! answered from another thread.

use std::thread;
use std::time::Duration;

use aco_design::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing_subscriber::EnvFilter;

/// Scores designs the way a designer who dislikes coupling might
struct SimulatedDesigner {
    froze: bool,
}

impl SimulatedDesigner {
    fn score(&self, request: &EvaluationRequest) -> u32 {
        let path = &request.path;
        let penalty = 70.0 * path.cbo() + 10.0 * path.nac().min(3.0);
        (100.0 - penalty).clamp(0.0, 100.0).round() as u32
    }

    fn respond(&mut self, request: &EvaluationRequest) -> EvaluationResponse {
        let score = self.score(request);
        let mut feedback = DesignerFeedback::new(score);
        if score > 80 {
            feedback = feedback.archive();
        }
        if !self.froze && request.number_of_classes() > 1 {
            // freeze the class with the most methods
            let largest = request
                .classes
                .iter()
                .enumerate()
                .max_by_key(|(_, class)| class.methods.len())
                .map(|(index, _)| index);
            if let Some(index) = largest {
                feedback = feedback.freeze(index);
                self.froze = true;
            }
        }
        EvaluationResponse::Evaluated(feedback)
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Interactive Design Session ===\n");

    let mut rng = StdRng::seed_from_u64(42);
    let problem = DesignProblem::from_partition(ProblemKind::Test, &[(3, 2), (2, 3), (2, 2)])?;

    let mut search = SearchBuilder::new()
        .problem(problem.clone())
        .mode(Mode::Interactive)
        .pheromone_update(PheromoneUpdate::ParetoBased)
        .number_of_iterations(60)
        .design_label("three-class design")
        .build()?;

    let mut designer = SimulatedDesigner { froze: false };

    loop {
        match search.step(&mut rng)? {
            StepResult::NeedsEvaluation(request) => {
                let response = designer.respond(&request);
                println!(
                    "Interaction {} (iteration {}): CBO = {:.3}, {} classes frozen",
                    request.interaction,
                    request.iteration,
                    request.path.cbo(),
                    request.freeze_list.len()
                );
                search.provide_response(response)?;
            }

            StepResult::IterationComplete {
                iteration,
                best_cbo,
                interacted,
            } => {
                if interacted {
                    println!(
                        "  iteration {} complete: best CBO = {:.3}, weights = {}",
                        iteration,
                        best_cbo,
                        search.weights()
                    );
                }
            }

            StepResult::Complete(result) => {
                println!("\n=== Session Complete ===");
                println!("Reason: {}", result.termination_reason);
                println!("Iterations: {}", result.iterations);
                println!("Interactions: {}", result.interactions);
                println!("Archived designs: {}", result.archive.len());
                println!("Final weights: {}", result.final_weights);
                if let Some(best) = result.best_so_far {
                    println!("Best CBO found: {:.3}", best.cbo);
                }
                break;
            }
        }
    }

    println!("\n=== Channel Reviewer ===\n");

    let mut search = SearchBuilder::new()
        .problem(problem)
        .mode(Mode::Interactive)
        .number_of_iterations(200)
        .build()?;

    let policy = InteractionPolicy {
        timeout: Some(Duration::from_secs(5)),
        ..InteractionPolicy::default()
    };
    let (mut reviewer, handle) = ChannelReviewer::pair(policy);

    let designer = thread::spawn(move || {
        let mut answered = 0;
        while let Some(request) = handle.next_request() {
            answered += 1;
            // a designer who has seen enough after five designs
            let response = if answered == 5 {
                EvaluationResponse::stop()
            } else {
                EvaluationResponse::evaluation((100.0 * (1.0 - request.path.cbo())) as u32)
            };
            if !handle.respond(response) {
                break;
            }
        }
        answered
    });

    let result = search.run_with_reviewer(&mut rng, &mut reviewer)?;
    drop(reviewer);

    println!("Stopped after {} iterations", result.iterations);
    println!("Designer answered {} requests", designer.join().unwrap_or(0));

    Ok(())
}
