use anyhow::{bail, Result};

use glint_core::EasingType;

/// `(elapsed_ms, position)` rows from the start to the end of a run
pub fn table(easing: EasingType, distance: f64, duration: f64, steps: u32) -> Vec<(f64, f64)> {
    (0..=steps)
        .map(|i| {
            let t = duration * i as f64 / steps as f64;
            (t, easing.ease(t, 0.0, distance, duration))
        })
        .collect()
}

pub fn run(easing: &str, distance: f64, duration: f64, steps: u32) -> Result<()> {
    let easing: EasingType = easing.parse()?;
    if steps == 0 {
        bail!("steps must be at least 1");
    }
    if duration <= 0.0 {
        bail!("duration must be positive");
    }

    println!("{} over {} ms, {} px\n", easing.name(), duration, distance);
    println!("{:>10}  {:>10}", "ms", "px");
    for (t, y) in table(easing, distance, duration, steps) {
        let bar_len = if distance != 0.0 {
            (y / distance * 40.0).round().clamp(0.0, 40.0) as usize
        } else {
            0
        };
        println!("{:>10.1}  {:>10.2}  {}", t, y, "#".repeat(bar_len));
    }
    Ok(())
}
