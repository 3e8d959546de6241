use crate::{
    Anchor, AnchorContext, ClipId, ClipSample, EventHandler, FixedClip, HandlerError,
    KeyframeKind, ObjectHandle, ObjectTarget, PlaySound, Pose, Sequence, SpawnObject,
    SpawnRequest, TrackedInstance, TrackerPhase,
};
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

#[derive(Clone, Default)]
struct Log {
    lines: Rc<RefCell<Vec<String>>>,
}

impl Log {
    fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.lines.borrow_mut())
    }
}

struct LoggingHandler {
    log: Log,
    next_object: u64,
}

impl LoggingHandler {
    fn new(log: Log) -> Self {
        Self {
            log,
            next_object: 100,
        }
    }
}

impl EventHandler for LoggingHandler {
    fn spawn(
        &mut self,
        instance: &AnchorContext,
        request: &SpawnRequest<'_>,
    ) -> Result<ObjectHandle, HandlerError> {
        self.next_object += 1;
        self.log.lines.borrow_mut().push(format!(
            "spawn {} at {:?} from {:?}",
            request.prefab, request.anchor, instance.pose.position
        ));
        Ok(ObjectHandle(self.next_object))
    }

    fn play_sound(
        &mut self,
        _instance: &AnchorContext,
        sound: &PlaySound,
    ) -> Result<(), HandlerError> {
        self.log
            .lines
            .borrow_mut()
            .push(format!("sound {}", sound.clip));
        Ok(())
    }

    fn set_active(
        &mut self,
        _instance: &AnchorContext,
        target: ObjectHandle,
        active: bool,
        _detach: bool,
    ) -> Result<(), HandlerError> {
        self.log
            .lines
            .borrow_mut()
            .push(format!("active {} {active}", target.0));
        Ok(())
    }

    fn destroy(&mut self, object: ObjectHandle) -> Result<(), HandlerError> {
        self.log
            .lines
            .borrow_mut()
            .push(format!("destroy {}", object.0));
        Ok(())
    }
}

fn swing() -> Sequence {
    Sequence::new("swing", 1.0, 10.0)
        .with_keyframe(
            1,
            KeyframeKind::SpawnObject(SpawnObject {
                prefab: "trail".to_string(),
                anchor: Anchor::Binding("blade".to_string()),
                parent_to_anchor: true,
                lifetime: None,
            }),
        )
        .with_keyframe(3, KeyframeKind::PlaySound(PlaySound::new("whoosh")))
        .with_keyframe(
            4,
            KeyframeKind::EnableObject {
                target: ObjectTarget::id("sparks"),
                detach_on_enable: false,
            },
        )
        .with_keyframe(
            8,
            KeyframeKind::DisableObject {
                target: ObjectTarget::id("sparks"),
            },
        )
        .with_keyframe(9, KeyframeKind::DestroySpawned)
}

fn setup() -> (TrackedInstance, FixedClip, LoggingHandler, Log) {
    let mut instance = TrackedInstance::new(ObjectHandle(1));
    instance.attach_sequence(swing());
    instance.bind("blade", ObjectHandle(2));
    instance.bind("sparks", ObjectHandle(3));
    instance.set_pose(Pose::at([1.0, 2.0, 3.0]));

    let log = Log::default();
    let handler = LoggingHandler::new(log.clone());
    let clip = FixedClip::playing(ClipSample::new("swing", 1.0, 10.0));
    (instance, clip, handler, log)
}

#[test]
fn full_playthrough_dispatches_every_kind() {
    let (mut instance, mut clip, mut handler, log) = setup();

    for _ in 0..10 {
        instance.tick(&clip, &mut handler);
        clip.advance(0.1);
    }
    instance.tick(&clip, &mut handler);

    assert_eq!(
        log.take(),
        vec![
            "spawn trail at ObjectHandle(2) from [1.0, 2.0, 3.0]",
            "sound whoosh",
            "active 3 true",
            "active 3 false",
            "destroy 101",
        ]
    );
    assert!(instance.dispatcher().spawned().is_empty());
}

#[test]
fn replaying_the_state_fires_again() {
    let (mut instance, mut clip, mut handler, log) = setup();
    clip.seek(0.35);
    instance.tick(&clip, &mut handler);
    assert_eq!(log.take().len(), 2);

    clip.reenter();
    instance.tick(&clip, &mut handler);
    assert!(log.take().is_empty());
    clip.seek(0.35);
    instance.tick(&clip, &mut handler);
    assert_eq!(
        log.take(),
        vec![
            "spawn trail at ObjectHandle(2) from [1.0, 2.0, 3.0]",
            "sound whoosh"
        ]
    );
    assert_eq!(instance.dispatcher().spawned().len(), 2);
}

#[test]
fn teardown_destroys_live_spawns() {
    let (mut instance, mut clip, mut handler, log) = setup();
    clip.seek(0.5);
    instance.tick(&clip, &mut handler);
    log.take();

    assert_eq!(instance.teardown(&mut handler), 1);
    assert_eq!(log.take(), vec!["destroy 101"]);
}

#[test]
fn stopped_clip_idles_without_callbacks() {
    let (mut instance, mut clip, mut handler, log) = setup();
    clip.stop();
    let report = instance.tick(&clip, &mut handler);
    assert!(report.fired.is_empty());
    assert_eq!(instance.tracker().phase(), TrackerPhase::Idle);
    assert!(log.take().is_empty());
}

#[test]
fn closures_work_as_clip_queries() {
    let (mut instance, _clip, mut handler, log) = setup();
    let query = || Some(ClipSample::new("swing", 1.0, 10.0).at(0.45));
    let report = instance.tick(&query, &mut handler);
    assert_eq!(report.fired.len(), 3);
    assert_eq!(log.take().len(), 3);
}

#[test]
fn detaching_the_sequence_stops_firing() {
    let (mut instance, mut clip, mut handler, log) = setup();
    let detached = instance
        .detach_sequence(&ClipId::new("swing"))
        .expect("detach");
    assert_eq!(detached.keyframes().len(), 5);
    assert!(instance.detach_sequence(&ClipId::new("swing")).is_err());

    clip.seek(1.0);
    instance.tick(&clip, &mut handler);
    assert!(log.take().is_empty());

    instance.attach_sequence(detached);
    instance.tick(&clip, &mut handler);
    assert_eq!(log.take().len(), 5);
}

#[test]
fn unbound_targets_are_skipped_but_still_marked_fired() {
    let (mut instance, mut clip, mut handler, log) = setup();
    instance.unbind("sparks").expect("sparks bound");
    clip.seek(0.45);
    let report = instance.tick(&clip, &mut handler);
    assert_eq!(report.fired.len(), 3);
    assert_eq!(log.take().len(), 2);
    assert_eq!(instance.tracker().fired_count(), 3);
}

#[test]
fn shared_sequences_fire_independently_per_instance() {
    let shared = Arc::new(swing());
    let log = Log::default();
    let mut handler = LoggingHandler::new(log.clone());
    let mut first = TrackedInstance::new(ObjectHandle(1));
    let mut second = TrackedInstance::new(ObjectHandle(2));
    first.attach_sequence(shared.clone());
    second.attach_sequence(shared);

    let sample = ClipSample::new("swing", 1.0, 10.0).at(0.35);
    first.update(Some(&sample), &mut handler);
    second.update(Some(&sample), &mut handler);
    first.update(Some(&sample), &mut handler);
    assert_eq!(log.take().len(), 4);
}

#[test]
fn instances_can_move_between_threads() {
    fn assert_send<T: Send>() {}
    assert_send::<TrackedInstance>();
}

#[test]
fn playing_a_new_clip_starts_over() {
    let (mut instance, mut clip, mut handler, log) = setup();
    clip.seek(0.35);
    instance.tick(&clip, &mut handler);
    log.take();

    // Same clip, same epoch requested: the player still moves to a fresh epoch.
    clip.play(ClipSample::new("swing", 1.0, 10.0).at(0.35));
    let report = instance.tick(&clip, &mut handler);
    assert_eq!(report.fired.len(), 2);
    assert_eq!(instance.tracker().epoch(), Some(crate::StateEpoch(1)));
}
