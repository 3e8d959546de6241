use framecue::{
    AnchorContext, ClipSample, EventHandler, FixedClip, HandlerError, ObjectHandle, PlaySound,
    SequenceSet, SpawnRequest, StateEpoch, TrackedInstance,
};
use serde_json::json;
use std::path::PathBuf;

/// Prints every side effect as a JSON line instead of touching a scene.
struct PrintHandler {
    tick: usize,
    next_object: u64,
}

impl PrintHandler {
    fn emit(&self, value: serde_json::Value) {
        println!("{}", json!({ "tick": self.tick, "effect": value }));
    }
}

impl EventHandler for PrintHandler {
    fn spawn(
        &mut self,
        _instance: &AnchorContext,
        request: &SpawnRequest<'_>,
    ) -> Result<ObjectHandle, HandlerError> {
        self.next_object += 1;
        self.emit(json!({
            "kind": "spawn",
            "prefab": request.prefab,
            "anchor": request.anchor.0,
            "parented": request.parent_to_anchor,
            "lifetime": request.lifetime,
            "object": self.next_object,
        }));
        Ok(ObjectHandle(self.next_object))
    }

    fn play_sound(
        &mut self,
        _instance: &AnchorContext,
        sound: &PlaySound,
    ) -> Result<(), HandlerError> {
        self.emit(json!({ "kind": "sound", "clip": sound.clip, "volume": sound.volume }));
        Ok(())
    }

    fn set_active(
        &mut self,
        _instance: &AnchorContext,
        target: ObjectHandle,
        active: bool,
        detach: bool,
    ) -> Result<(), HandlerError> {
        let kind = if active { "enable" } else { "disable" };
        self.emit(json!({
            "kind": kind,
            "target": target.0,
            "detach": detach,
        }));
        Ok(())
    }

    fn destroy(&mut self, object: ObjectHandle) -> Result<(), HandlerError> {
        self.emit(json!({ "kind": "destroy", "object": object.0 }));
        Ok(())
    }
}

fn main() {
    env_logger::init();

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let mut positional = Vec::<String>::new();
    let mut looped = false;
    let mut bindings = Vec::<(String, u64)>::new();

    let mut i = 0usize;
    while i < args.len() {
        match args[i].as_str() {
            "--loop" => {
                looped = true;
                i += 1;
            }
            "--bind" => {
                // --bind name=42
                if let Some((name, object)) = args.get(i + 1).and_then(|s| s.split_once('=')) {
                    let object = object.parse().expect("binding object must be an integer");
                    bindings.push((name.to_string(), object));
                }
                i += 2;
            }
            other => {
                positional.push(other.to_string());
                i += 1;
            }
        }
    }

    let path = positional
        .first()
        .map(PathBuf::from)
        .expect("usage: tick_dump <sequences.json> <clip> [times...] [--loop] [--bind id=n]");
    let clip = positional.get(1).cloned().expect("missing clip name");
    let times: Vec<f32> = positional[2..]
        .iter()
        .map(|t| t.parse().expect("normalized time must be a number"))
        .collect();
    let times = if times.is_empty() {
        (0..=20).map(|i| i as f32 * 0.05).collect()
    } else {
        times
    };

    let json = std::fs::read_to_string(&path).expect("read sequences");
    let sequences = SequenceSet::from_json_str(&json).expect("parse sequences");
    let sequence = sequences
        .get(&clip.as_str().into())
        .cloned()
        .expect("clip has no sequence");

    let mut instance = TrackedInstance::with_sequences(ObjectHandle(0), sequences);
    for (name, object) in bindings {
        instance.bind(name, ObjectHandle(object));
    }

    let mut player = FixedClip::playing(
        ClipSample::new(clip.as_str(), sequence.length, sequence.frame_rate)
            .looped(looped)
            .in_epoch(StateEpoch(1)),
    );
    let mut handler = PrintHandler {
        tick: 0,
        next_object: 0,
    };

    for (tick, time) in times.into_iter().enumerate() {
        handler.tick = tick;
        player.seek(time);
        let report = instance.tick(&player, &mut handler);
        println!(
            "{}",
            json!({
                "tick": tick,
                "time": time,
                "frame": report.frame,
                "fired": report.fired.len(),
                "reset": report.reset.map(|r| format!("{r:?}")),
            })
        );
    }

    let destroyed = instance.teardown(&mut handler);
    println!("{}", json!({ "teardown": destroyed }));
}
