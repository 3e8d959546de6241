use crate::ClipId;

/// Opaque token for one playback context (state instance, transition, re-entry).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct StateEpoch(pub u64);

impl StateEpoch {
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

/// One observation of the host player, taken once per tick.
#[derive(Clone, Debug, PartialEq)]
pub struct ClipSample {
    /// `None` when the host cannot report a stable identity (blend trees, retimed states).
    pub clip: Option<ClipId>,
    /// Playback position in clip lengths; exceeds 1 after wrapping for looping clips.
    pub normalized_time: f32,
    pub looped: bool,
    pub epoch: StateEpoch,
    /// Nominal clip length in seconds.
    pub length: f32,
    pub frame_rate: f32,
}

impl ClipSample {
    pub fn new(clip: impl Into<ClipId>, length: f32, frame_rate: f32) -> Self {
        Self {
            clip: Some(clip.into()),
            normalized_time: 0.0,
            looped: false,
            epoch: StateEpoch::default(),
            length,
            frame_rate,
        }
    }

    /// A sample that only knows the nominal length of what is playing.
    pub fn anonymous(length: f32, frame_rate: f32) -> Self {
        Self {
            clip: None,
            normalized_time: 0.0,
            looped: false,
            epoch: StateEpoch::default(),
            length,
            frame_rate,
        }
    }

    pub fn at(mut self, normalized_time: f32) -> Self {
        self.normalized_time = normalized_time;
        self
    }

    pub fn looped(mut self, looped: bool) -> Self {
        self.looped = looped;
        self
    }

    pub fn in_epoch(mut self, epoch: StateEpoch) -> Self {
        self.epoch = epoch;
        self
    }
}

/// Narrow query interface over the host animation player for one tracked instance.
pub trait ClipQuery {
    /// `None` means nothing trackable is playing.
    fn sample(&self) -> Option<ClipSample>;
}

impl<F> ClipQuery for F
where
    F: Fn() -> Option<ClipSample>,
{
    fn sample(&self) -> Option<ClipSample> {
        self()
    }
}

/// In-memory player driven by hand. Useful for tests and offline simulation.
#[derive(Clone, Debug, Default)]
pub struct FixedClip {
    current: Option<ClipSample>,
}

impl FixedClip {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn playing(sample: ClipSample) -> Self {
        Self {
            current: Some(sample),
        }
    }

    /// Starts `sample`, moving to a fresh epoch if the previous one would be reused.
    pub fn play(&mut self, mut sample: ClipSample) {
        if let Some(previous) = &self.current {
            if previous.epoch == sample.epoch {
                sample.epoch = previous.epoch.next();
            }
        }
        self.current = Some(sample);
    }

    pub fn stop(&mut self) {
        self.current = None;
    }

    pub fn seek(&mut self, normalized_time: f32) {
        if let Some(current) = &mut self.current {
            current.normalized_time = normalized_time;
        }
    }

    pub fn advance(&mut self, delta: f32) {
        if let Some(current) = &mut self.current {
            current.normalized_time += delta;
        }
    }

    /// Re-enters the current state from the start under a new epoch.
    pub fn reenter(&mut self) {
        if let Some(current) = &mut self.current {
            current.epoch = current.epoch.next();
            current.normalized_time = 0.0;
        }
    }

    pub fn current(&self) -> Option<&ClipSample> {
        self.current.as_ref()
    }
}

impl ClipQuery for FixedClip {
    fn sample(&self) -> Option<ClipSample> {
        self.current.clone()
    }
}
