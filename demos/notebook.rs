//! Shows the notebook wiring: the host environment owns the display area
//! and hands the tracker a handle to it. Here the "host" is a stand-in that
//! prints each replacement to stdout. Run with `cargo run --example notebook`.

use std::fmt;
use std::io;
use std::time::Duration;

use taskline::{DisplayHandle, DrawTarget, HostEnvironment, ProgressTracker};

/// Stand-in for a kernel-owned display cell.
struct PrintingCell;

impl fmt::Debug for PrintingCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrintingCell").finish()
    }
}

impl DisplayHandle for PrintingCell {
    fn replace(&self, html: &str) -> io::Result<()> {
        println!("display <- {html}");
        Ok(())
    }

    fn close(&self) -> io::Result<()> {
        println!("display closed");
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("detected host: {:?}", HostEnvironment::detect());

    let tracker = ProgressTracker::builder(8)
        .prefix("training")
        .draw_target(DrawTarget::notebook(Box::new(PrintingCell)))
        .build()?;

    for _ in 0..8 {
        tokio::time::sleep(Duration::from_millis(150)).await;
        tracker.update().await?;
    }
    tracker.finish().await?;
    Ok(())
}
