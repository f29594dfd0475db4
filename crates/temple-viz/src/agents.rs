//! Agent rendering: sprites, motion playback, and loop effects.
//!
//! The viewer never decides what an agent does. It spawns one entity tree
//! per session agent and replays the [`PresentationUpdate`]s the session
//! pushes: motion plans are tweened against the session clock and effect
//! instances restart only when their id changes.

use bevy::prelude::*;
use std::collections::HashMap;

use temple_events::{
    status_color, AgentId, AgentStatus, AgentTier, EffectInstance, MotionPlan, Point,
    PresentationUpdate, StatusIcon,
};

use crate::effects::{loop_pose, LoopPose};
use crate::scene::{hex_color, hex_color_alpha, SceneFrame, SKIN, UI_TEXT};
use crate::session::{PresentationChanged, SessionStep, TempleDriver};

/// Plugin for agent rendering.
pub struct AgentPlugin;

impl Plugin for AgentPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<AgentEntities>()
            .add_systems(Startup, spawn_agents)
            .add_systems(
                Update,
                (
                    despawn_departed_agents,
                    apply_presentation_updates,
                    update_agent_transforms,
                    apply_agent_alpha,
                )
                    .chain()
                    .after(SessionStep),
            );
    }
}

/// Visual state of one agent, mirrored from its latest update.
#[derive(Component, Debug, Clone)]
pub struct VisualAgent {
    pub agent_id: AgentId,
    pub tier_scale: f32,
    /// Where the agent stands when no move is in flight.
    pub rest: Point,
    pub motion: Option<MotionPlan>,
    pub effect: Option<EffectInstance>,
    /// Session time the current effect instance started.
    pub effect_started_ms: u64,
    pub opacity: f32,
    pub status: AgentStatus,
    pub icon: StatusIcon,
    pub is_moving: bool,
    pub bubble: Entity,
    pub bubble_text: Entity,
}

impl VisualAgent {
    pub fn new(agent_id: AgentId, tier: AgentTier, rest: Point) -> Self {
        Self {
            agent_id,
            tier_scale: tier_scale(tier),
            rest,
            motion: None,
            effect: None,
            effect_started_ms: 0,
            opacity: 1.0,
            status: AgentStatus::Idle,
            icon: StatusIcon::Idle,
            is_moving: false,
            bubble: Entity::PLACEHOLDER,
            bubble_text: Entity::PLACEHOLDER,
        }
    }

    /// Takes over an update. A new effect id restarts the loop; the same id
    /// keeps its phase.
    pub fn apply(&mut self, update: &PresentationUpdate) {
        self.rest = update.position;
        self.motion = update.motion;
        if self.effect.map(|e| e.id) != update.effect.map(|e| e.id) {
            self.effect = update.effect;
            self.effect_started_ms = update.at_ms;
        }
        self.opacity = update.opacity;
        self.status = update.status;
        self.icon = update.icon;
        self.is_moving = update.is_moving;
    }

    /// Scene position at `now_ms`.
    pub fn position_at(&self, now_ms: u64) -> Point {
        match &self.motion {
            Some(plan) => plan.position_at(now_ms),
            None => self.rest,
        }
    }

    /// Loop pose at `now_ms`.
    pub fn pose_at(&self, now_ms: u64) -> LoopPose {
        match self.effect {
            Some(effect) => loop_pose(effect.kind, now_ms.saturating_sub(self.effect_started_ms)),
            None => LoopPose::REST,
        }
    }
}

/// Sprite color before opacity and flashing are applied.
#[derive(Component, Debug, Clone, Copy)]
pub struct BaseColor(pub Color);

/// Resource mapping agent ids to their root entities.
#[derive(Resource, Default)]
pub struct AgentEntities {
    pub map: HashMap<AgentId, Entity>,
}

impl AgentEntities {
    pub fn get(&self, agent_id: &AgentId) -> Option<Entity> {
        self.map.get(agent_id).copied()
    }

    pub fn insert(&mut self, agent_id: AgentId, entity: Entity) {
        self.map.insert(agent_id, entity);
    }

    pub fn remove(&mut self, agent_id: &AgentId) -> Option<Entity> {
        self.map.remove(agent_id)
    }
}

/// Higher tiers are drawn larger.
pub fn tier_scale(tier: AgentTier) -> f32 {
    match tier {
        AgentTier::Primary => 1.3,
        AgentTier::Lieutenant => 1.15,
        AgentTier::Worker | AgentTier::Special => 1.0,
    }
}

/// Short ASCII mark for the status bubble.
pub fn bubble_mark(icon: StatusIcon) -> &'static str {
    match icon {
        StatusIcon::Walking => "~",
        StatusIcon::Idle => "z",
        StatusIcon::Thinking => "?",
        StatusIcon::Replying => ">",
        StatusIcon::Active => "!",
        StatusIcon::Error => "x",
        StatusIcon::Offline => "-",
    }
}

/// Draw order: agents lower on the floor overlap the ones behind them.
fn depth_for(position: Point, frame: &SceneFrame) -> f32 {
    2.0 + (position.y / frame.height).clamp(0.0, 1.0)
}

fn spawn_agents(
    mut commands: Commands,
    driver: Res<TempleDriver>,
    frame: Res<SceneFrame>,
    mut entities: ResMut<AgentEntities>,
) {
    let session = &driver.session;
    for record in session.agents() {
        let Some(profile) = session.profile(record.id()) else {
            continue;
        };
        let label = if profile.name_en.is_empty() {
            profile.id.to_string()
        } else {
            profile.name_en.clone()
        };
        let world = frame.to_world(record.position());
        let mut visual = VisualAgent::new(record.id().clone(), record.tier(), record.position());

        let body_color = hex_color(profile.color);
        let halo_color = hex_color_alpha(profile.color, 0.25);
        let bubble_color = hex_color(status_color(AgentStatus::Idle));

        let root = commands
            .spawn(SpatialBundle::from_transform(Transform::from_xyz(
                world.x,
                world.y,
                depth_for(record.position(), &frame),
            )))
            .id();

        let halo = spawn_part(
            &mut commands,
            halo_color,
            Vec2::splat(34.0),
            Vec3::new(0.0, 0.0, -0.05),
        );
        let body = spawn_part(
            &mut commands,
            body_color,
            Vec2::new(20.0, 26.0),
            Vec3::new(0.0, -4.0, 0.0),
        );
        let head = spawn_part(
            &mut commands,
            hex_color(SKIN),
            Vec2::splat(14.0),
            Vec3::new(0.0, 14.0, 0.01),
        );
        let bubble = spawn_part(
            &mut commands,
            bubble_color,
            Vec2::splat(14.0),
            Vec3::new(15.0, 24.0, 0.02),
        );
        let bubble_text = commands
            .spawn(Text2dBundle {
                text: Text::from_section(
                    bubble_mark(StatusIcon::Idle),
                    TextStyle {
                        font_size: 11.0,
                        color: hex_color(UI_TEXT),
                        ..default()
                    },
                )
                .with_justify(JustifyText::Center),
                transform: Transform::from_xyz(15.0, 24.0, 0.03),
                ..default()
            })
            .id();
        let name = commands
            .spawn(Text2dBundle {
                text: Text::from_section(
                    label,
                    TextStyle {
                        font_size: 10.0,
                        color: hex_color(UI_TEXT),
                        ..default()
                    },
                )
                .with_justify(JustifyText::Center),
                transform: Transform::from_xyz(0.0, -26.0, 0.03),
                ..default()
            })
            .id();

        visual.bubble = bubble;
        visual.bubble_text = bubble_text;
        commands
            .entity(root)
            .insert(visual)
            .push_children(&[halo, body, head, bubble, bubble_text, name]);
        entities.insert(record.id().clone(), root);
    }
    tracing::info!("Spawned {} agents", entities.map.len());
}

fn spawn_part(commands: &mut Commands, color: Color, size: Vec2, offset: Vec3) -> Entity {
    commands
        .spawn((
            SpriteBundle {
                sprite: Sprite {
                    color,
                    custom_size: Some(size),
                    ..default()
                },
                transform: Transform::from_translation(offset),
                ..default()
            },
            BaseColor(color),
        ))
        .id()
}

/// Removes entities of agents the session no longer has.
fn despawn_departed_agents(
    mut commands: Commands,
    driver: Res<TempleDriver>,
    mut entities: ResMut<AgentEntities>,
) {
    let departed: Vec<AgentId> = entities
        .map
        .keys()
        .filter(|id| driver.session.agent(id).is_none())
        .cloned()
        .collect();
    for id in departed {
        if let Some(entity) = entities.remove(&id) {
            commands.entity(entity).despawn_recursive();
            tracing::debug!("Despawned {}", id);
        }
    }
}

fn apply_presentation_updates(
    mut changes: EventReader<PresentationChanged>,
    entities: Res<AgentEntities>,
    mut agents: Query<&mut VisualAgent>,
    mut colors: Query<&mut BaseColor>,
    mut texts: Query<&mut Text>,
) {
    for PresentationChanged(update) in changes.read() {
        let Some(entity) = entities.get(&update.agent_id) else {
            continue;
        };
        let Ok(mut visual) = agents.get_mut(entity) else {
            continue;
        };
        visual.apply(update);

        if let Ok(mut base) = colors.get_mut(visual.bubble) {
            base.0 = hex_color(status_color(update.status));
        }
        if let Ok(mut text) = texts.get_mut(visual.bubble_text) {
            text.sections[0].value = bubble_mark(update.icon).to_string();
        }
    }
}

fn update_agent_transforms(
    driver: Res<TempleDriver>,
    frame: Res<SceneFrame>,
    mut agents: Query<(&VisualAgent, &mut Transform)>,
) {
    let now_ms = driver.session.now_ms();
    for (visual, mut transform) in agents.iter_mut() {
        let position = visual.position_at(now_ms);
        let pose = visual.pose_at(now_ms);
        let world = frame.to_world(position);

        transform.translation = Vec3::new(world.x, world.y, depth_for(position, &frame));
        transform.scale = (pose.scale * visual.tier_scale).extend(1.0);
        transform.rotation = Quat::from_rotation_z(-pose.angle_deg.to_radians());
    }
}

/// Status opacity times the flash alpha, over each part's own alpha.
fn apply_agent_alpha(
    driver: Res<TempleDriver>,
    agents: Query<(&VisualAgent, &Children)>,
    mut parts: Query<(&BaseColor, &mut Sprite)>,
) {
    let now_ms = driver.session.now_ms();
    for (visual, children) in agents.iter() {
        let alpha = visual.opacity * visual.pose_at(now_ms).alpha;
        for &child in children.iter() {
            if let Ok((base, mut sprite)) = parts.get_mut(child) {
                sprite.color = base.0.with_alpha(base.0.alpha() * alpha);
            }
        }
    }
}
