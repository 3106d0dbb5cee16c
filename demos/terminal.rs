//! Load-test style demo: thousands of concurrent tasks reporting into one
//! tracker. Run with `cargo run --example terminal`.

use std::time::{Duration, Instant};

use rand::Rng;
use taskline::ProgressTracker;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let requests: u64 = 10_000;

    let tracker = ProgressTracker::builder(requests)
        .prefix("requests")
        .build()?;

    let started = Instant::now();
    let mut tasks = tokio::task::JoinSet::new();
    for _ in 0..requests {
        let tracker = tracker.clone();
        tasks.spawn(async move {
            let pause = rand::rng().random_range(0..25);
            tokio::time::sleep(Duration::from_millis(pause)).await;
            tracker.update().await
        });
    }
    while let Some(res) = tasks.join_next().await {
        res??;
    }

    tracker.finish().await?;
    println!("total time: {:.2?}", started.elapsed());
    Ok(())
}
