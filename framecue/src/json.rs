use crate::{
    Anchor, Error, KeyframeKind, ObjectHandle, ObjectTarget, PlaySound, SEQUENCE_FORMAT_MAJOR,
    Sequence, SequenceSet, SpawnObject,
};
use serde::Deserialize;
use std::collections::HashSet;

#[derive(Debug, Deserialize)]
struct Root {
    #[serde(default)]
    format: Option<String>,
    #[serde(default)]
    sequences: Vec<SequenceDef>,
}

fn default_frame_rate() -> f32 {
    30.0
}

fn default_volume() -> f32 {
    1.0
}

#[derive(Debug, Deserialize)]
struct SequenceDef {
    clip: String,
    length: f32,
    #[serde(default = "default_frame_rate", rename = "fps")]
    frame_rate: f32,
    #[serde(default)]
    keyframes: Vec<KeyframeDef>,
}

#[derive(Debug, Deserialize)]
struct KeyframeDef {
    frame: u32,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    prefab: Option<String>,
    #[serde(default)]
    anchor: Option<String>,
    #[serde(default)]
    parent: bool,
    #[serde(default)]
    lifetime: Option<f32>,
    #[serde(default)]
    clip: Option<String>,
    #[serde(default = "default_volume")]
    volume: f32,
    #[serde(default)]
    target: Option<String>,
    #[serde(default)]
    object: Option<u64>,
    #[serde(default)]
    detach: bool,
}

fn validate_format_version(value: &str) -> Result<(), Error> {
    let major = value
        .split('.')
        .next()
        .and_then(|major| major.trim().parse::<u32>().ok());
    match major {
        Some(major) if major == SEQUENCE_FORMAT_MAJOR => Ok(()),
        _ => Err(Error::JsonFormatVersion {
            value: value.to_string(),
        }),
    }
}

fn invalid(clip: &str, message: impl Into<String>) -> Error {
    Error::JsonInvalidSequence {
        clip: clip.to_string(),
        message: message.into(),
    }
}

fn parse_kind(clip: &str, def: KeyframeDef) -> Result<KeyframeKind, Error> {
    let target = || -> Result<ObjectTarget, Error> {
        if def.target.is_none() && def.object.is_none() {
            return Err(invalid(
                clip,
                format!(
                    "'{}' keyframe at frame {} needs a target or object",
                    def.kind, def.frame
                ),
            ));
        }
        Ok(ObjectTarget {
            id: def.target.clone(),
            object: def.object.map(ObjectHandle),
        })
    };

    let kind = match def.kind.as_str() {
        "spawn" => {
            let prefab = def.prefab.clone().filter(|p| !p.is_empty()).ok_or_else(|| {
                invalid(
                    clip,
                    format!("spawn keyframe at frame {} has no prefab", def.frame),
                )
            })?;
            KeyframeKind::SpawnObject(SpawnObject {
                prefab,
                anchor: def
                    .anchor
                    .clone()
                    .map(Anchor::Binding)
                    .unwrap_or(Anchor::Instance),
                parent_to_anchor: def.parent,
                lifetime: def.lifetime,
            })
        }
        "sound" => {
            let sound = def.clip.clone().filter(|c| !c.is_empty()).ok_or_else(|| {
                invalid(
                    clip,
                    format!("sound keyframe at frame {} has no clip", def.frame),
                )
            })?;
            KeyframeKind::PlaySound(PlaySound {
                clip: sound,
                volume: def.volume,
            })
        }
        "enable" => KeyframeKind::EnableObject {
            target: target()?,
            detach_on_enable: def.detach,
        },
        "disable" => KeyframeKind::DisableObject { target: target()? },
        "destroySpawned" => KeyframeKind::DestroySpawned,
        other => {
            return Err(invalid(
                clip,
                format!("unsupported keyframe type '{other}' at frame {}", def.frame),
            ));
        }
    };
    Ok(kind)
}

fn build_sequence(def: SequenceDef) -> Result<Sequence, Error> {
    if def.clip.trim().is_empty() {
        return Err(invalid(&def.clip, "clip name is empty"));
    }
    let mut sequence = Sequence::new(def.clip.as_str(), def.length, def.frame_rate);
    // `Sequence::add_keyframe` inserts after existing keys on the same frame, so file order is
    // preserved for keyframes sharing a frame.
    for keyframe in def.keyframes {
        let frame = keyframe.frame;
        let kind = parse_kind(&def.clip, keyframe)?;
        sequence.add_keyframe(frame, kind);
    }
    Ok(sequence)
}

impl Sequence {
    /// Parses a single sequence object.
    pub fn from_json_str(input: &str) -> Result<Self, Error> {
        let def: SequenceDef = serde_json::from_str(input).map_err(|e| Error::JsonParse {
            message: e.to_string(),
        })?;
        build_sequence(def)
    }
}

impl SequenceSet {
    /// Parses a `{ "format": "1.0", "sequences": [...] }` document.
    pub fn from_json_str(input: &str) -> Result<Self, Error> {
        let root: Root = serde_json::from_str(input).map_err(|e| Error::JsonParse {
            message: e.to_string(),
        })?;
        if let Some(format) = root.format.as_deref() {
            validate_format_version(format)?;
        }

        let mut seen = HashSet::new();
        let mut set = SequenceSet::new();
        for def in root.sequences {
            if !seen.insert(def.clip.clone()) {
                return Err(Error::JsonDuplicateClip { clip: def.clip });
            }
            set.attach(build_sequence(def)?);
        }
        Ok(set)
    }
}
