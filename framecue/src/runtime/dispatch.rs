use crate::{Anchor, Error, Keyframe, KeyframeKind, ObjectHandle, ObjectTarget, PlaySound, Pose};
use log::{debug, warn};
use std::collections::HashMap;
use thiserror::Error;

/// Failure reported by a host handler. Logged by the dispatcher and otherwise ignored.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("{kind} keyframes are not supported by this handler")]
    Unsupported { kind: &'static str },

    #[error("missing asset: {name}")]
    MissingAsset { name: String },

    #[error("object {object:?} no longer exists")]
    StaleObject { object: ObjectHandle },

    #[error("{message}")]
    Other { message: String },
}

/// The tracked instance as seen by handlers.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AnchorContext {
    pub object: ObjectHandle,
    pub pose: Pose,
}

impl AnchorContext {
    pub fn new(object: ObjectHandle) -> Self {
        Self {
            object,
            pose: Pose::IDENTITY,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SpawnRequest<'a> {
    pub prefab: &'a str,
    /// Object whose pose the spawned object takes.
    pub anchor: ObjectHandle,
    pub parent_to_anchor: bool,
    /// Seconds until the host tears the object down on its own.
    pub lifetime: Option<f32>,
}

/// Host side effects, one method per keyframe kind.
///
/// The default implementations report [`HandlerError::Unsupported`] so a host only implements
/// the kinds its sequences use.
pub trait EventHandler {
    fn spawn(
        &mut self,
        instance: &AnchorContext,
        request: &SpawnRequest<'_>,
    ) -> Result<ObjectHandle, HandlerError> {
        let _ = (instance, request);
        Err(HandlerError::Unsupported { kind: "spawn" })
    }

    fn play_sound(
        &mut self,
        instance: &AnchorContext,
        sound: &PlaySound,
    ) -> Result<(), HandlerError> {
        let _ = (instance, sound);
        Err(HandlerError::Unsupported { kind: "sound" })
    }

    /// Activates or deactivates `target`. `detach` asks for the target to be unparented while
    /// keeping its world pose; it is only ever set when activating.
    fn set_active(
        &mut self,
        instance: &AnchorContext,
        target: ObjectHandle,
        active: bool,
        detach: bool,
    ) -> Result<(), HandlerError> {
        let _ = (instance, target, active, detach);
        Err(HandlerError::Unsupported {
            kind: if active { "enable" } else { "disable" },
        })
    }

    fn destroy(&mut self, object: ObjectHandle) -> Result<(), HandlerError> {
        let _ = object;
        Err(HandlerError::Unsupported {
            kind: "destroySpawned",
        })
    }
}

/// Fans fired keyframes out to an [`EventHandler`] and owns the per-instance binding table and
/// the set of objects spawned on the instance's behalf.
#[derive(Clone, Debug, Default)]
pub struct Dispatcher {
    bindings: HashMap<String, ObjectHandle>,
    spawned: Vec<ObjectHandle>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `object` under `id`, returning the object previously bound there.
    pub fn bind(&mut self, id: impl Into<String>, object: ObjectHandle) -> Option<ObjectHandle> {
        self.bindings.insert(id.into(), object)
    }

    pub fn unbind(&mut self, id: &str) -> Result<ObjectHandle, Error> {
        self.bindings.remove(id).ok_or_else(|| Error::UnknownBinding { id: id.to_string() })
    }

    pub fn binding(&self, id: &str) -> Option<ObjectHandle> {
        self.bindings.get(id).copied()
    }

    /// Binding id first, direct reference as fallback.
    pub fn resolve(&self, target: &ObjectTarget) -> Option<ObjectHandle> {
        target
            .id
            .as_deref()
            .and_then(|id| self.binding(id))
            .or(target.object)
    }

    pub fn spawned(&self) -> &[ObjectHandle] {
        &self.spawned
    }

    /// Drops `object` from the spawned set without destroying it, e.g. after its lifetime ran
    /// out on the host side.
    pub fn forget_spawned(&mut self, object: ObjectHandle) -> bool {
        let before = self.spawned.len();
        self.spawned.retain(|o| *o != object);
        self.spawned.len() != before
    }

    pub fn dispatch(
        &mut self,
        instance: &AnchorContext,
        keyframe: &Keyframe,
        handler: &mut dyn EventHandler,
    ) {
        let result = match &keyframe.kind {
            KeyframeKind::SpawnObject(spawn) => {
                let anchor = match &spawn.anchor {
                    Anchor::Instance => instance.object,
                    Anchor::Binding(id) => self.binding(id).unwrap_or_else(|| {
                        debug!("spawn anchor '{id}' is not bound, using the instance");
                        instance.object
                    }),
                };
                let request = SpawnRequest {
                    prefab: &spawn.prefab,
                    anchor,
                    parent_to_anchor: spawn.parent_to_anchor,
                    lifetime: spawn.effective_lifetime(),
                };
                handler.spawn(instance, &request).map(|object| {
                    self.spawned.push(object);
                })
            }
            KeyframeKind::PlaySound(sound) => handler.play_sound(instance, sound),
            KeyframeKind::EnableObject {
                target,
                detach_on_enable,
            } => self.toggle(instance, target, true, *detach_on_enable, handler),
            KeyframeKind::DisableObject { target } => {
                self.toggle(instance, target, false, false, handler)
            }
            KeyframeKind::DestroySpawned => {
                self.destroy_spawned(handler);
                Ok(())
            }
        };

        if let Err(err) = result {
            warn!(
                "{} keyframe {:?} at frame {} failed: {err}",
                keyframe.kind.name(),
                keyframe.id(),
                keyframe.frame
            );
        }
    }

    /// Destroys every live spawned object. Returns how many were handed to the handler.
    pub fn destroy_spawned(&mut self, handler: &mut dyn EventHandler) -> usize {
        let spawned = std::mem::take(&mut self.spawned);
        for object in &spawned {
            if let Err(err) = handler.destroy(*object) {
                warn!("failed to destroy spawned object {object:?}: {err}");
            }
        }
        spawned.len()
    }

    fn toggle(
        &self,
        instance: &AnchorContext,
        target: &ObjectTarget,
        active: bool,
        detach: bool,
        handler: &mut dyn EventHandler,
    ) -> Result<(), HandlerError> {
        let Some(object) = self.resolve(target) else {
            debug!("toggle target {target:?} did not resolve, skipped");
            return Ok(());
        };
        handler.set_active(instance, object, active, active && detach)
    }
}
