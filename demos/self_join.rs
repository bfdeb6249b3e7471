//! Self-join: finding repeated passages inside one piece.
//!
//! Builds a synthetic 12-dimensional chroma sequence with a chorus that
//! occurs twice, then reports the best-matching pair and the positions with
//! no good repetition.
//!
//! Run with: cargo run --release --example self_join

use simple_rs::{Engine, FeatureSequence, JoinConfig};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let n = 400;
    let chorus_len = 40;
    let chorus_at = [60, 280];

    let rows: Vec<Vec<f64>> = (0..12)
        .map(|d| {
            (0..n)
                .map(|t| {
                    let in_chorus = chorus_at.iter().find(|&&s| (s..s + chorus_len).contains(&t));
                    match in_chorus {
                        Some(&s) => {
                            let k = (t - s) as f64;
                            ((k * 0.3 + d as f64).sin() + 1.0) * 0.5
                        }
                        None => {
                            let x = (t * 7 + d * 13) % 17;
                            x as f64 / 17.0
                        }
                    }
                })
                .collect()
        })
        .collect();
    let seq = FeatureSequence::from_rows(&rows)?;

    let m = 20;
    let engine = Engine::new(JoinConfig::new(m));
    let mp = engine.self_join(&seq)?;

    println!("Self-Join on a Synthetic Chroma Sequence");
    println!("========================================");
    println!("Dimensions: {}", seq.ndim());
    println!("Length: {}", seq.len());
    println!("Subsequence length: {m}");
    println!("Exclusion zone: {}", mp.exclusion_zone);
    println!("Profile length: {}", mp.len());

    if let Some((i, d, j)) = mp.best_match() {
        println!("\nBest repetition:");
        println!("  frames {i}..{} repeat at {j}..{}", i + m, j + m);
        println!("  squared distance: {d:.6}");
    }

    let (worst_i, worst_d) = mp
        .profile
        .iter()
        .enumerate()
        .filter(|(_, d)| d.is_finite())
        .fold((0, f64::NEG_INFINITY), |acc, (i, &d)| if d > acc.1 { (i, d) } else { acc });
    println!("\nLeast repeated passage:");
    println!("  frame {worst_i}, squared distance: {worst_d:.6}");

    Ok(())
}
