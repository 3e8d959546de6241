use crate::{ClipId, ClipSample, Error, Sequence};
use std::collections::HashMap;
use std::sync::Arc;

pub const DEFAULT_LENGTH_TOLERANCE: f32 = 0.01;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TrackerConfig {
    /// Maximum nominal length difference (seconds) accepted by the fallback match.
    pub length_tolerance: f32,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            length_tolerance: DEFAULT_LENGTH_TOLERANCE,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MatchKind {
    Identity,
    Length,
}

#[derive(Clone, Debug)]
pub struct Selection {
    pub sequence: Arc<Sequence>,
    pub matched_by: MatchKind,
}

/// Candidate sequences bound to one tracked instance, in registration order.
///
/// At most one sequence is bound per clip; attaching a second one replaces the first.
#[derive(Clone, Debug, Default)]
pub struct SequenceSet {
    sequences: Vec<Arc<Sequence>>,
    by_clip: HashMap<ClipId, usize>,
    indexed_len: usize,
    dirty: bool,
    config: TrackerConfig,
}

impl SequenceSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: TrackerConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn set_length_tolerance(&mut self, tolerance: f32) -> Result<(), Error> {
        if tolerance.is_nan() || tolerance < 0.0 {
            return Err(Error::InvalidValue {
                message: "length tolerance must be finite and >= 0".to_string(),
            });
        }
        self.config.length_tolerance = tolerance;
        Ok(())
    }

    /// Binds `sequence`, returning the sequence previously bound to the same clip.
    pub fn attach(&mut self, sequence: impl Into<Arc<Sequence>>) -> Option<Arc<Sequence>> {
        let sequence = sequence.into();
        let replaced = self
            .sequences
            .iter()
            .position(|s| s.clip == sequence.clip)
            .map(|index| self.sequences.remove(index));
        self.sequences.push(sequence);
        self.dirty = true;
        replaced
    }

    pub fn detach(&mut self, clip: &ClipId) -> Result<Arc<Sequence>, Error> {
        let Some(index) = self.sequences.iter().position(|s| &s.clip == clip) else {
            return Err(Error::UnknownClip {
                clip: clip.to_string(),
            });
        };
        self.dirty = true;
        Ok(self.sequences.remove(index))
    }

    pub fn clear(&mut self) {
        self.sequences.clear();
        self.dirty = true;
    }

    pub fn get(&self, clip: &ClipId) -> Option<&Arc<Sequence>> {
        self.sequences.iter().find(|s| &s.clip == clip)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Sequence>> {
        self.sequences.iter()
    }

    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }

    /// Picks the sequence for the clip being played: exact identity first, then the first
    /// candidate (registration order) whose nominal length is within tolerance.
    pub fn select(&mut self, clip: Option<&ClipId>, nominal_length: f32) -> Option<Selection> {
        self.ensure_index();

        if let Some(index) = clip.and_then(|clip| self.by_clip.get(clip)) {
            return Some(Selection {
                sequence: self.sequences[*index].clone(),
                matched_by: MatchKind::Identity,
            });
        }

        if !nominal_length.is_finite() {
            return None;
        }
        let tolerance = self.config.length_tolerance;
        self.sequences
            .iter()
            .find(|s| (s.length - nominal_length).abs() <= tolerance)
            .map(|sequence| Selection {
                sequence: sequence.clone(),
                matched_by: MatchKind::Length,
            })
    }

    pub fn select_for(&mut self, sample: &ClipSample) -> Option<Selection> {
        self.select(sample.clip.as_ref(), sample.length)
    }

    fn ensure_index(&mut self) {
        if !self.dirty && self.indexed_len == self.sequences.len() {
            return;
        }
        self.by_clip.clear();
        for (index, sequence) in self.sequences.iter().enumerate() {
            self.by_clip.insert(sequence.clip.clone(), index);
        }
        self.indexed_len = self.sequences.len();
        self.dirty = false;
    }
}

impl FromIterator<Sequence> for SequenceSet {
    fn from_iter<I: IntoIterator<Item = Sequence>>(iter: I) -> Self {
        let mut set = Self::new();
        for sequence in iter {
            set.attach(sequence);
        }
        set
    }
}

impl FromIterator<Arc<Sequence>> for SequenceSet {
    fn from_iter<I: IntoIterator<Item = Arc<Sequence>>>(iter: I) -> Self {
        let mut set = Self::new();
        for sequence in iter {
            set.attach(sequence);
        }
        set
    }
}
