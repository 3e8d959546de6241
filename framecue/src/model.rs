use crate::Error;
use crate::ids::{next_keyframe_id, next_sequence_id};
use std::fmt;
use std::ops::RangeInclusive;
use std::sync::Arc;

/// Stable identity of a reference clip as reported by the host player.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClipId(Arc<str>);

impl ClipId {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ClipId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ClipId {
    fn from(value: String) -> Self {
        Self(Arc::from(value))
    }
}

impl fmt::Display for ClipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyframeId(u64);

impl KeyframeId {
    pub fn get(self) -> u64 {
        self.0
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SequenceId(u64);

impl SequenceId {
    pub fn get(self) -> u64 {
        self.0
    }
}

/// Opaque host object reference (scene node, entity, game object).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectHandle(pub u64);

/// World-space position and orientation. `rotation` is a unit quaternion in `[x, y, z, w]` order.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Pose {
    pub position: [f32; 3],
    pub rotation: [f32; 4],
}

impl Pose {
    pub const IDENTITY: Self = Self {
        position: [0.0, 0.0, 0.0],
        rotation: [0.0, 0.0, 0.0, 1.0],
    };

    pub fn at(position: [f32; 3]) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[cfg(feature = "glam")]
impl Pose {
    pub fn from_glam(position: glam::Vec3, rotation: glam::Quat) -> Self {
        Self {
            position: position.to_array(),
            rotation: rotation.to_array(),
        }
    }

    pub fn translation(&self) -> glam::Vec3 {
        glam::Vec3::from_array(self.position)
    }

    pub fn orientation(&self) -> glam::Quat {
        glam::Quat::from_array(self.rotation)
    }
}

/// Where a spawned object is placed.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum Anchor {
    /// The tracked instance itself.
    #[default]
    Instance,
    /// An object registered in the instance's binding table.
    Binding(String),
}

#[derive(Clone, Debug, PartialEq)]
pub struct SpawnObject {
    pub prefab: String,
    pub anchor: Anchor,
    /// Parent the spawned object to the anchor; otherwise it is placed at the anchor pose in
    /// world space.
    pub parent_to_anchor: bool,
    pub lifetime: Option<f32>,
}

impl SpawnObject {
    pub fn new(prefab: impl Into<String>) -> Self {
        Self {
            prefab: prefab.into(),
            anchor: Anchor::Instance,
            parent_to_anchor: false,
            lifetime: None,
        }
    }

    /// Lifetime in seconds, if one is set and positive.
    pub fn effective_lifetime(&self) -> Option<f32> {
        self.lifetime.filter(|t| t.is_finite() && *t > 0.0)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PlaySound {
    pub clip: String,
    pub volume: f32,
}

impl PlaySound {
    pub fn new(clip: impl Into<String>) -> Self {
        Self {
            clip: clip.into(),
            volume: 1.0,
        }
    }
}

/// Target of an enable/disable keyframe: a binding id, a direct reference, or both.
/// The binding id wins when it resolves.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct ObjectTarget {
    pub id: Option<String>,
    pub object: Option<ObjectHandle>,
}

impl ObjectTarget {
    pub fn id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            object: None,
        }
    }

    pub fn object(object: ObjectHandle) -> Self {
        Self {
            id: None,
            object: Some(object),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum KeyframeKind {
    SpawnObject(SpawnObject),
    PlaySound(PlaySound),
    EnableObject {
        target: ObjectTarget,
        detach_on_enable: bool,
    },
    DisableObject {
        target: ObjectTarget,
    },
    DestroySpawned,
}

impl KeyframeKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::SpawnObject(_) => "spawn",
            Self::PlaySound(_) => "sound",
            Self::EnableObject { .. } => "enable",
            Self::DisableObject { .. } => "disable",
            Self::DestroySpawned => "destroySpawned",
        }
    }
}

#[derive(Clone, Debug)]
pub struct Keyframe {
    id: KeyframeId,
    pub frame: u32,
    pub kind: KeyframeKind,
}

impl Keyframe {
    pub fn new(frame: u32, kind: KeyframeKind) -> Self {
        Self {
            id: KeyframeId(next_keyframe_id()),
            frame,
            kind,
        }
    }

    pub fn id(&self) -> KeyframeId {
        self.id
    }
}

/// Keyframes authored against one reference clip.
///
/// Keyframes are kept sorted by frame; keyframes sharing a frame keep insertion order.
#[derive(Clone, Debug)]
pub struct Sequence {
    id: SequenceId,
    pub clip: ClipId,
    /// Nominal clip length in seconds.
    pub length: f32,
    /// Nominal frames per second.
    pub frame_rate: f32,
    keyframes: Vec<Keyframe>,
}

impl Sequence {
    pub fn new(clip: impl Into<ClipId>, length: f32, frame_rate: f32) -> Self {
        Self {
            id: SequenceId(next_sequence_id()),
            clip: clip.into(),
            length,
            frame_rate,
            keyframes: Vec::new(),
        }
    }

    pub fn with_keyframe(mut self, frame: u32, kind: KeyframeKind) -> Self {
        self.add_keyframe(frame, kind);
        self
    }

    pub fn id(&self) -> SequenceId {
        self.id
    }

    pub fn add_keyframe(&mut self, frame: u32, kind: KeyframeKind) -> KeyframeId {
        let keyframe = Keyframe::new(frame, kind);
        let id = keyframe.id;
        self.insert_sorted(keyframe);
        id
    }

    /// Inserts an existing keyframe, e.g. one moved out of another sequence.
    ///
    /// A keyframe identity may appear only once per sequence.
    pub fn insert(&mut self, keyframe: Keyframe) -> Result<KeyframeId, Error> {
        if self.keyframes.iter().any(|k| k.id == keyframe.id) {
            return Err(Error::DuplicateKeyframe {
                clip: self.clip.to_string(),
                id: keyframe.id.get(),
            });
        }
        let id = keyframe.id;
        self.insert_sorted(keyframe);
        Ok(id)
    }

    fn insert_sorted(&mut self, keyframe: Keyframe) {
        let at = self.keyframes.partition_point(|k| k.frame <= keyframe.frame);
        self.keyframes.insert(at, keyframe);
    }

    pub fn remove_keyframe(&mut self, id: KeyframeId) -> Option<Keyframe> {
        let index = self.keyframes.iter().position(|k| k.id == id)?;
        Some(self.keyframes.remove(index))
    }

    pub fn keyframes(&self) -> &[Keyframe] {
        &self.keyframes
    }

    pub fn keyframes_at(&self, frame: u32) -> &[Keyframe] {
        self.keyframes_in(frame..=frame)
    }

    pub fn keyframes_in(&self, frames: RangeInclusive<u32>) -> &[Keyframe] {
        let (start, end) = (*frames.start(), *frames.end());
        if end < start {
            return &[];
        }
        let lo = self.keyframes.partition_point(|k| k.frame < start);
        let hi = self.keyframes.partition_point(|k| k.frame <= end);
        &self.keyframes[lo..hi]
    }

    pub fn total_frames(&self) -> u32 {
        crate::total_frames(self.length, self.frame_rate)
    }

    pub fn last_frame(&self) -> u32 {
        self.total_frames() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.keyframes.is_empty()
    }
}
