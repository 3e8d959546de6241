//! Normalized time to frame index derivation.

/// Frame count of a clip, `max(1, round(length * frame_rate))`.
///
/// Zero, negative or non-finite authoring data collapses to a single frame instead of failing.
pub fn total_frames(length: f32, frame_rate: f32) -> u32 {
    let raw = (length * frame_rate).round();
    if raw.is_finite() && raw >= 1.0 {
        raw.min(u32::MAX as f32) as u32
    } else {
        1
    }
}

/// Position within the current cycle: `repeat(t, 1)` when looping, `clamp01(t)` otherwise.
pub fn fractional_position(normalized_time: f32, looped: bool) -> f32 {
    if looped {
        normalized_time - normalized_time.floor()
    } else {
        normalized_time.clamp(0.0, 1.0)
    }
}

/// `clamp(floor(t * total_frames), 0, total_frames - 1)`.
pub fn frame_index(fraction: f32, total_frames: u32) -> u32 {
    let total_frames = total_frames.max(1);
    let raw = (fraction * total_frames as f32).floor();
    if raw.is_nan() || raw <= 0.0 {
        return 0;
    }
    (raw.min(u32::MAX as f32) as u32).min(total_frames - 1)
}

/// Loop cycle a normalized time falls into.
pub fn cycle_index(normalized_time: f32) -> i64 {
    normalized_time.floor() as i64
}
