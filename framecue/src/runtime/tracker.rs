use crate::{
    ClipId, ClipSample, Keyframe, KeyframeId, Sequence, SequenceId, SequenceSet, StateEpoch,
    cycle_index, fractional_position, frame_index,
};
use log::{debug, trace};
use std::collections::HashSet;
use std::sync::{Arc, Weak};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TrackerPhase {
    /// No sequence matches what the host is playing.
    Idle,
    Tracking,
}

/// Why a playthrough was restarted.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ResetReason {
    /// Different clip, a different selected sequence or a new state epoch.
    ContextChanged,
    /// A looping clip entered a new cycle.
    LoopWrapped,
    /// Normalized time moved backwards within the same context.
    TimeRegressed,
    /// The derived frame index moved backwards without any of the above.
    FrameRegressed,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TickReport {
    /// Keyframes dispatched this tick, in firing order.
    pub fired: Vec<KeyframeId>,
    /// Last playthrough reset applied this tick.
    pub reset: Option<ResetReason>,
    /// Frame index derived this tick, if firing was not suppressed.
    pub frame: Option<u32>,
}

/// Identifies one playthrough. Anonymous clips are told apart by the sequence they selected.
#[derive(Clone, Debug, PartialEq, Eq)]
struct PlaybackContext {
    clip: Option<ClipId>,
    sequence: SequenceId,
    epoch: StateEpoch,
}

/// Per-instance firing state.
///
/// Each call to [`PlaybackTracker::update`] consumes one host sample and fires every keyframe
/// between the previously processed frame and the current one that has not fired yet in the
/// current playthrough.
#[derive(Debug)]
pub struct PlaybackTracker {
    active: Option<Weak<Sequence>>,
    active_id: Option<SequenceId>,
    context: Option<PlaybackContext>,
    last_cycle: Option<i64>,
    last_frame: Option<u32>,
    last_normalized_time: f32,
    fired: HashSet<KeyframeId>,
}

impl Default for PlaybackTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaybackTracker {
    pub fn new() -> Self {
        Self {
            active: None,
            active_id: None,
            context: None,
            last_cycle: None,
            last_frame: None,
            last_normalized_time: -1.0,
            fired: HashSet::new(),
        }
    }

    pub fn phase(&self) -> TrackerPhase {
        if self.active_id.is_some() {
            TrackerPhase::Tracking
        } else {
            TrackerPhase::Idle
        }
    }

    pub fn active_sequence(&self) -> Option<Arc<Sequence>> {
        self.active.as_ref().and_then(Weak::upgrade)
    }

    pub fn epoch(&self) -> Option<StateEpoch> {
        self.context.as_ref().map(|context| context.epoch)
    }

    pub fn last_frame(&self) -> Option<u32> {
        self.last_frame
    }

    pub fn last_normalized_time(&self) -> Option<f32> {
        (self.last_normalized_time >= 0.0).then_some(self.last_normalized_time)
    }

    pub fn fired_count(&self) -> usize {
        self.fired.len()
    }

    pub fn has_fired(&self, keyframe: KeyframeId) -> bool {
        self.fired.contains(&keyframe)
    }

    /// Forgets everything, as if tracking had just started.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Processes one sample. `fire` is invoked once for every keyframe that becomes due.
    pub fn update(
        &mut self,
        candidates: &mut SequenceSet,
        sample: Option<&ClipSample>,
        mut fire: impl FnMut(&Sequence, &Keyframe),
    ) -> TickReport {
        let mut report = TickReport::default();

        let Some(sample) = sample else {
            self.go_idle();
            return report;
        };
        let Some(selection) = candidates.select_for(sample) else {
            self.go_idle();
            return report;
        };
        let sequence = selection.sequence;
        self.enter_tracking(&sequence);

        let context = PlaybackContext {
            clip: sample.clip.clone(),
            sequence: sequence.id(),
            epoch: sample.epoch,
        };
        if self.context.as_ref() != Some(&context) {
            self.context = Some(context);
            self.last_cycle = None;
            self.last_normalized_time = -1.0;
            self.reset_playthrough(ResetReason::ContextChanged, &mut report);
        }

        // Samples taken mid-transition may carry no usable time.
        if !sample.normalized_time.is_finite() {
            trace!("stale sample for clip '{}' ignored", sequence.clip);
            return report;
        }

        let normalized_time = sample.normalized_time;
        if sample.looped {
            let cycle = cycle_index(normalized_time);
            if self.last_cycle.is_some_and(|last| last != cycle) {
                self.reset_playthrough(ResetReason::LoopWrapped, &mut report);
            }
            self.last_cycle = Some(cycle);
        } else {
            self.last_cycle = None;
        }

        if self.last_normalized_time >= 0.0 && normalized_time < self.last_normalized_time {
            self.reset_playthrough(ResetReason::TimeRegressed, &mut report);
        }
        self.last_normalized_time = normalized_time;

        let total_frames = sequence.total_frames();
        let current = frame_index(
            fractional_position(normalized_time, sample.looped),
            total_frames,
        );
        report.frame = Some(current);
        if self.last_frame == Some(current) {
            return report;
        }

        let mut start = self.last_frame.map_or(0, |frame| frame + 1);
        if current < start {
            self.reset_playthrough(ResetReason::FrameRegressed, &mut report);
            start = 0;
        }

        for keyframe in sequence.keyframes_in(start..=current) {
            if !self.fired.insert(keyframe.id()) {
                continue;
            }
            trace!(
                "clip '{}' frame {}: firing {} keyframe {:?}",
                sequence.clip,
                keyframe.frame,
                keyframe.kind.name(),
                keyframe.id()
            );
            fire(sequence.as_ref(), keyframe);
            report.fired.push(keyframe.id());
        }
        self.last_frame = Some(current);
        report
    }

    /// Starts a new playthrough: nothing has fired and no frame has been processed.
    fn reset_playthrough(&mut self, reason: ResetReason, report: &mut TickReport) {
        if self.last_frame.is_some() || !self.fired.is_empty() {
            debug!(
                "playthrough reset ({reason:?}) after frame {:?}, {} keyframes fired",
                self.last_frame,
                self.fired.len()
            );
        }
        self.last_frame = None;
        self.fired.clear();
        report.reset = Some(reason);
    }

    fn enter_tracking(&mut self, sequence: &Arc<Sequence>) {
        if self.active_id != Some(sequence.id()) {
            debug!("tracking sequence for clip '{}'", sequence.clip);
            self.active_id = Some(sequence.id());
        }
        self.active = Some(Arc::downgrade(sequence));
    }

    fn go_idle(&mut self) {
        if self.active_id.take().is_some() {
            debug!("no sequence matches the playing clip, tracker idle");
        }
        self.active = None;
    }
}
