use crate::{
    AnchorContext, ClipId, ClipQuery, ClipSample, Dispatcher, Error, EventHandler, ObjectHandle,
    PlaybackTracker, Pose, Sequence, SequenceSet, TickReport, TrackerConfig,
};
use std::sync::Arc;

/// Everything owned by one tracked object: its candidate sequences, firing state, bindings and
/// spawned objects.
///
/// Instances share nothing mutable, so different instances may be ticked from different threads.
/// A single instance must be ticked serially.
#[derive(Debug)]
pub struct TrackedInstance {
    anchor: AnchorContext,
    sequences: SequenceSet,
    tracker: PlaybackTracker,
    dispatcher: Dispatcher,
}

impl TrackedInstance {
    pub fn new(object: ObjectHandle) -> Self {
        Self::with_config(object, TrackerConfig::default())
    }

    pub fn with_config(object: ObjectHandle, config: TrackerConfig) -> Self {
        Self {
            anchor: AnchorContext::new(object),
            sequences: SequenceSet::with_config(config),
            tracker: PlaybackTracker::new(),
            dispatcher: Dispatcher::new(),
        }
    }

    pub fn with_sequences(object: ObjectHandle, sequences: SequenceSet) -> Self {
        Self {
            anchor: AnchorContext::new(object),
            sequences,
            tracker: PlaybackTracker::new(),
            dispatcher: Dispatcher::new(),
        }
    }

    pub fn anchor(&self) -> &AnchorContext {
        &self.anchor
    }

    pub fn set_pose(&mut self, pose: Pose) {
        self.anchor.pose = pose;
    }

    pub fn sequences(&self) -> &SequenceSet {
        &self.sequences
    }

    pub fn sequences_mut(&mut self) -> &mut SequenceSet {
        &mut self.sequences
    }

    pub fn tracker(&self) -> &PlaybackTracker {
        &self.tracker
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn attach_sequence(
        &mut self,
        sequence: impl Into<Arc<Sequence>>,
    ) -> Option<Arc<Sequence>> {
        self.sequences.attach(sequence)
    }

    pub fn detach_sequence(&mut self, clip: &ClipId) -> Result<Arc<Sequence>, Error> {
        self.sequences.detach(clip)
    }

    pub fn bind(&mut self, id: impl Into<String>, object: ObjectHandle) -> Option<ObjectHandle> {
        self.dispatcher.bind(id, object)
    }

    pub fn unbind(&mut self, id: &str) -> Result<ObjectHandle, Error> {
        self.dispatcher.unbind(id)
    }

    pub fn forget_spawned(&mut self, object: ObjectHandle) -> bool {
        self.dispatcher.forget_spawned(object)
    }

    /// Samples `query` and fires whatever became due since the previous tick.
    pub fn tick(&mut self, query: &dyn ClipQuery, handler: &mut dyn EventHandler) -> TickReport {
        let sample = query.sample();
        self.update(sample.as_ref(), handler)
    }

    pub fn update(
        &mut self,
        sample: Option<&ClipSample>,
        handler: &mut dyn EventHandler,
    ) -> TickReport {
        let Self {
            anchor,
            sequences,
            tracker,
            dispatcher,
        } = self;
        tracker.update(sequences, sample, |_, keyframe| {
            dispatcher.dispatch(anchor, keyframe, &mut *handler);
        })
    }

    /// Ends tracking and destroys every object still alive from spawn keyframes.
    pub fn teardown(mut self, handler: &mut dyn EventHandler) -> usize {
        self.dispatcher.destroy_spawned(handler)
    }
}
