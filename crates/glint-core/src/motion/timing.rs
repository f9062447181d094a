//! Frame clock arithmetic
//!
//! All engine time is expressed in milliseconds on the host's frame clock
//! (`performance.now()` in a browser, a monotonic `Instant` elsewhere).

/// Milliseconds on the host frame clock
pub type Millis = f64;

/// Elapsed time since `start`, clamped to `[0, duration]`
#[inline]
pub fn clamped_elapsed(start: Millis, now: Millis, duration: Millis) -> Millis {
    if duration <= 0.0 {
        return 0.0;
    }
    (now - start).clamp(0.0, duration)
}
