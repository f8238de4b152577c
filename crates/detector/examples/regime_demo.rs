//! Walk a single detector through normal operation, a spike and recovery.
//!
//! Run with: `cargo run -p blackice-detector --example regime_demo`

use blackice_detector::RegimeDetector;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Small window, pure count-based persistence (3 points)
    let mut detector = RegimeDetector::new(10, 2.0, 3, 0.0)?;
    let wobble = |i: usize| ((i * 7) % 5) as f64 * 0.4 - 0.8;

    println!("Phase 1: normal operation (~50)");
    for i in 0..15 {
        let value = 50.0 + wobble(i);
        let event = detector.update(value);
        println!("[{:>2}] {:>5.1} -> {} (z={:.1})", i, value, event.state, event.zscore);
    }

    println!("\nPhase 2: spike (~80)");
    for i in 15..20 {
        let value = 80.0 + wobble(i);
        let event = detector.update(value);
        println!(
            "[{:>2}] {:>5.1} -> {} (z={:.1}, {})",
            i, value, event.state, event.zscore, event.reason
        );
    }

    println!("\nPhase 3: back to normal");
    for i in 20..25 {
        let value = 50.0 + wobble(i);
        let event = detector.update(value);
        println!("[{:>2}] {:>5.1} -> {}", i, value, event.state);
    }

    Ok(())
}
