//! Animation Coordinator
//!
//! The only place looping effects are started or stopped. Maps each agent's
//! status and motion to a [`Presentation`] and tracks the effect instance
//! currently running for it, so refreshing an unchanged agent is a no-op.

use std::collections::HashMap;

use temple_events::{
    AgentId, AgentStatus, EffectId, EffectInstance, LoopKind, Presentation, PresentationUpdate,
    StatusIcon,
};

use crate::agent::AgentRecord;
use crate::timers::Millis;

/// Opacity of offline agents.
pub const OFFLINE_OPACITY: f32 = 0.4;

/// What an agent should look like given its status and whether it walks.
///
/// Walking wins over every status. Opacity depends on status alone, so an
/// agent forced offline mid-move walks on dimmed.
pub fn presentation_for(status: AgentStatus, is_moving: bool) -> Presentation {
    let (effect, icon) = if is_moving {
        (Some(LoopKind::Walk), StatusIcon::Walking)
    } else {
        let effect = match status {
            AgentStatus::Error => Some(LoopKind::Flash),
            AgentStatus::Thinking | AgentStatus::Replying => Some(LoopKind::Breathe),
            AgentStatus::Idle | AgentStatus::Active | AgentStatus::Offline => None,
        };
        (effect, StatusIcon::for_status(status))
    };
    let opacity = match status {
        AgentStatus::Offline => OFFLINE_OPACITY,
        _ => 1.0,
    };
    Presentation {
        effect,
        icon,
        opacity,
    }
}

#[derive(Debug, Clone, Copy)]
struct Running {
    presentation: Presentation,
    effect: Option<EffectInstance>,
}

#[derive(Debug, Default)]
pub struct AnimationCoordinator {
    running: HashMap<AgentId, Running>,
    next_effect: u64,
}

impl AnimationCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reconciles `record` with what is currently shown.
    ///
    /// Returns an update only when the presentation changed. A loop of the
    /// same kind keeps its instance; any other change stops the old loop
    /// before a new instance starts.
    pub fn refresh(&mut self, record: &AgentRecord, now: Millis) -> Option<PresentationUpdate> {
        let desired = presentation_for(record.status(), record.is_moving());
        let previous = self.running.get(record.id()).copied();
        if let Some(prev) = previous {
            if prev.presentation == desired {
                return None;
            }
        }

        let kept = previous
            .and_then(|prev| prev.effect)
            .filter(|effect| Some(effect.kind) == desired.effect);
        let effect = match (kept, desired.effect) {
            (Some(effect), _) => Some(effect),
            (None, Some(kind)) => Some(self.start(kind)),
            (None, None) => None,
        };
        if let Some(stopped) = previous.and_then(|prev| prev.effect) {
            if Some(stopped) != effect {
                tracing::trace!("{} stops {:?} #{}", record.id(), stopped.kind, stopped.id.0);
            }
        }

        self.running.insert(
            record.id().clone(),
            Running {
                presentation: desired,
                effect,
            },
        );

        Some(PresentationUpdate {
            agent_id: record.id().clone(),
            at_ms: now,
            position: record.position(),
            status: record.status(),
            is_moving: record.is_moving(),
            motion: record.motion().copied(),
            effect,
            icon: desired.icon,
            opacity: desired.opacity,
        })
    }

    /// Effect instance currently running for an agent.
    pub fn effect(&self, id: &AgentId) -> Option<EffectInstance> {
        self.running.get(id).and_then(|r| r.effect)
    }

    pub fn presentation(&self, id: &AgentId) -> Option<Presentation> {
        self.running.get(id).map(|r| r.presentation)
    }

    /// Stops whatever runs for an agent and forgets it.
    pub fn release(&mut self, id: &AgentId) -> Option<EffectInstance> {
        self.running.remove(id).and_then(|r| r.effect)
    }

    fn start(&mut self, kind: LoopKind) -> EffectInstance {
        self.next_effect += 1;
        EffectInstance {
            id: EffectId(self.next_effect),
            kind,
        }
    }
}
