//! Heads-up display: status bar, agent picking, hover tooltip, and the info panel.

use bevy::prelude::*;
use std::collections::BTreeMap;

use temple_core::{AgentRecord, RosterEntry};
use temple_events::{AgentId, AgentStatus};

use crate::agents::VisualAgent;
use crate::camera::MainCamera;
use crate::scene::{hex_color, hex_color_alpha, HIVE_GOLD, NIGHT_SKY, UI_MUTED, UI_TEXT};
use crate::session::{SessionClock, SessionStep, TempleDriver};

/// Click radius around an agent's center before tier scaling.
const PICK_RADIUS: f32 = 18.0;

const TOOLTIP_WIDTH: f32 = 120.0;
/// Gap between the cursor and the tooltip's bottom edge.
const TOOLTIP_LIFT: f32 = 56.0;

const HINTS: &str = "Click: select | F: follow | O: offline | E: error | U: release | \
                     Del: remove | Space: pause | [ ]: speed | Home: reset view";

pub struct HudPlugin;

impl Plugin for HudPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Selection>()
            .add_systems(Startup, setup_hud)
            .add_systems(
                Update,
                (select_agent_on_click, handle_agent_commands).before(SessionStep),
            )
            .add_systems(
                Update,
                (update_status_bar, update_info_panel, update_tooltip).after(SessionStep),
            );
    }
}

/// Agent picked with the mouse.
#[derive(Resource, Default, Debug)]
pub struct Selection {
    pub agent: Option<AgentId>,
}

#[derive(Component)]
pub struct StatusBarText;

#[derive(Component)]
pub struct InfoPanel;

#[derive(Component)]
pub struct InfoText;

#[derive(Component)]
pub struct Tooltip;

#[derive(Component)]
pub struct TooltipText;

/// `mm:ss` of session time.
pub fn format_clock(now_ms: u64) -> String {
    let secs = now_ms / 1_000;
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Status bar contents.
pub fn status_line(
    counts: &BTreeMap<AgentStatus, usize>,
    moving: usize,
    now_ms: u64,
    clock: &SessionClock,
) -> String {
    let total: usize = counts.values().sum();
    let tallies: Vec<String> = counts
        .iter()
        .map(|(status, count)| format!("{} {}", status, count))
        .collect();
    let playback = if clock.paused {
        "paused".to_string()
    } else {
        format!("x{}", clock.time_scale)
    };
    format!(
        "Hive Temple | Agents: {} | moving {} | {} | {} {}",
        total,
        moving,
        tallies.join(" / "),
        format_clock(now_ms),
        playback
    )
}

/// Info panel contents for one agent.
pub fn info_text(profile: &RosterEntry, record: &AgentRecord) -> String {
    let name = if profile.name_en.is_empty() {
        profile.id.to_string()
    } else {
        profile.name_en.clone()
    };
    let mut lines = vec![
        format!("{} ({})", name, profile.id),
        format!("Tier: {}", profile.tier.label()),
    ];
    if !profile.role.is_empty() {
        lines.push(format!("Role: {}", profile.role));
    }
    let pinned = if record.is_pinned() { " (pinned)" } else { "" };
    lines.push(format!("Status: {}{}", record.status(), pinned));
    match record.move_target() {
        Some(target) => lines.push(format!("Walking to {}", target)),
        None => lines.push(format!("Standing at {}", record.position())),
    }
    lines.join("\n")
}

/// Tooltip title (`name (tier)`) and role line.
pub fn tooltip_lines(profile: &RosterEntry) -> (String, String) {
    let name = if profile.name_en.is_empty() {
        &profile.name
    } else {
        &profile.name_en
    };
    (format!("{} ({})", name, profile.tier.label()), profile.role.clone())
}

/// Top-left corner of the tooltip for a cursor at `cursor` (window pixels),
/// centered above the cursor and kept on screen.
pub fn tooltip_anchor(cursor: Vec2) -> Vec2 {
    Vec2::new(cursor.x - TOOLTIP_WIDTH / 2.0, cursor.y - TOOLTIP_LIFT).max(Vec2::ZERO)
}

/// Cursor position in window pixels and in world space.
fn cursor_positions(
    windows: &Query<&Window>,
    camera_query: &Query<(&Camera, &GlobalTransform), With<MainCamera>>,
) -> Option<(Vec2, Vec2)> {
    let screen = windows.get_single().ok()?.cursor_position()?;
    let (camera, camera_transform) = camera_query.get_single().ok()?;
    let world = camera.viewport_to_world_2d(camera_transform, screen)?;
    Some((screen, world))
}

/// Closest agent whose pick circle contains `cursor`.
pub fn pick_agent<'a>(
    cursor: Vec2,
    candidates: impl IntoIterator<Item = (&'a AgentId, Vec2, f32)>,
) -> Option<AgentId> {
    candidates
        .into_iter()
        .map(|(id, center, radius)| (id, cursor.distance(center), radius))
        .filter(|(_, distance, radius)| distance <= radius)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(id, _, _)| id.clone())
}

fn setup_hud(mut commands: Commands) {
    let text_style = |size: f32, color: Color| TextStyle {
        font_size: size,
        color,
        ..default()
    };

    commands
        .spawn(NodeBundle {
            style: Style {
                position_type: PositionType::Absolute,
                top: Val::Px(0.0),
                left: Val::Px(0.0),
                width: Val::Percent(100.0),
                height: Val::Px(28.0),
                padding: UiRect::axes(Val::Px(12.0), Val::Px(6.0)),
                border: UiRect::bottom(Val::Px(1.0)),
                ..default()
            },
            background_color: hex_color_alpha(NIGHT_SKY, 0.8).into(),
            border_color: hex_color_alpha(HIVE_GOLD, 0.3).into(),
            ..default()
        })
        .with_children(|parent| {
            parent.spawn((
                TextBundle::from_section("", text_style(13.0, hex_color(HIVE_GOLD))),
                StatusBarText,
            ));
        });

    commands
        .spawn((
            NodeBundle {
                style: Style {
                    position_type: PositionType::Absolute,
                    top: Val::Px(36.0),
                    right: Val::Px(12.0),
                    padding: UiRect::all(Val::Px(10.0)),
                    border: UiRect::all(Val::Px(1.0)),
                    flex_direction: FlexDirection::Column,
                    ..default()
                },
                background_color: hex_color_alpha(NIGHT_SKY, 0.9).into(),
                border_color: hex_color_alpha(HIVE_GOLD, 0.6).into(),
                visibility: Visibility::Hidden,
                ..default()
            },
            InfoPanel,
        ))
        .with_children(|parent| {
            parent.spawn((
                TextBundle::from_section("", text_style(13.0, hex_color(UI_TEXT))),
                InfoText,
            ));
        });

    commands
        .spawn((
            NodeBundle {
                style: Style {
                    position_type: PositionType::Absolute,
                    width: Val::Px(TOOLTIP_WIDTH),
                    padding: UiRect::all(Val::Px(6.0)),
                    border: UiRect::all(Val::Px(1.0)),
                    justify_content: JustifyContent::Center,
                    ..default()
                },
                background_color: hex_color_alpha(NIGHT_SKY, 0.9).into(),
                border_color: hex_color_alpha(HIVE_GOLD, 0.6).into(),
                visibility: Visibility::Hidden,
                z_index: ZIndex::Global(10),
                ..default()
            },
            Tooltip,
        ))
        .with_children(|parent| {
            parent.spawn((
                TextBundle::from_sections([
                    TextSection::new("", text_style(11.0, hex_color(HIVE_GOLD))),
                    TextSection::new("", text_style(9.0, hex_color(UI_MUTED))),
                ])
                .with_text_justify(JustifyText::Center),
                TooltipText,
            ));
        });

    let hints = TextBundle::from_section(HINTS, text_style(11.0, hex_color_alpha(UI_TEXT, 0.6)));
    commands.spawn(hints.with_style(Style {
        position_type: PositionType::Absolute,
        bottom: Val::Px(8.0),
        left: Val::Px(12.0),
        ..default()
    }));
}

fn select_agent_on_click(
    mouse_button: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window>,
    camera_query: Query<(&Camera, &GlobalTransform), With<MainCamera>>,
    agents: Query<(&VisualAgent, &Transform)>,
    mut selection: ResMut<Selection>,
) {
    if !mouse_button.just_pressed(MouseButton::Left) {
        return;
    }
    let Some((_, world)) = cursor_positions(&windows, &camera_query) else {
        return;
    };

    let candidates = agents.iter().map(|(agent, transform)| {
        (
            &agent.agent_id,
            transform.translation.truncate(),
            PICK_RADIUS * agent.tier_scale,
        )
    });
    selection.agent = pick_agent(world, candidates);
    if let Some(id) = &selection.agent {
        tracing::debug!("Selected {}", id);
    }
}

/// Pins or releases the selected agent's status, or removes it.
fn handle_agent_commands(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut driver: ResMut<TempleDriver>,
    mut selection: ResMut<Selection>,
) {
    let Some(id) = selection.agent.clone() else {
        return;
    };

    let result = if keyboard.just_pressed(KeyCode::KeyO) {
        driver.session.pin_status(&id, AgentStatus::Offline)
    } else if keyboard.just_pressed(KeyCode::KeyE) {
        driver.session.pin_status(&id, AgentStatus::Error)
    } else if keyboard.just_pressed(KeyCode::KeyU) {
        driver.session.unpin_status(&id)
    } else if keyboard.just_pressed(KeyCode::Delete) {
        if driver.session.teardown(&id).is_some() {
            tracing::info!("Removed {}", id);
        }
        selection.agent = None;
        Ok(())
    } else {
        Ok(())
    };

    if let Err(e) = result {
        tracing::warn!("Command on {} failed: {}", id, e);
    }
}

fn update_status_bar(
    driver: Res<TempleDriver>,
    clock: Res<SessionClock>,
    mut texts: Query<&mut Text, With<StatusBarText>>,
) {
    let session = &driver.session;
    let mut counts = BTreeMap::new();
    let mut moving = 0;
    for record in session.agents() {
        *counts.entry(record.status()).or_insert(0) += 1;
        if record.is_moving() {
            moving += 1;
        }
    }
    let line = status_line(&counts, moving, session.now_ms(), &clock);
    for mut text in texts.iter_mut() {
        text.sections[0].value.clone_from(&line);
    }
}

fn update_info_panel(
    driver: Res<TempleDriver>,
    selection: Res<Selection>,
    mut panels: Query<&mut Visibility, With<InfoPanel>>,
    mut texts: Query<&mut Text, With<InfoText>>,
) {
    let session = &driver.session;
    let shown = selection
        .agent
        .as_ref()
        .and_then(|id| Some(info_text(session.profile(id)?, session.agent(id)?)));

    for mut visibility in panels.iter_mut() {
        *visibility = if shown.is_some() {
            Visibility::Inherited
        } else {
            Visibility::Hidden
        };
    }
    if let Some(body) = shown {
        for mut text in texts.iter_mut() {
            text.sections[0].value.clone_from(&body);
        }
    }
}

/// Shows name, tier and role of the agent under the cursor.
fn update_tooltip(
    windows: Query<&Window>,
    camera_query: Query<(&Camera, &GlobalTransform), With<MainCamera>>,
    agents: Query<(&VisualAgent, &Transform)>,
    driver: Res<TempleDriver>,
    mut tooltips: Query<(&mut Style, &mut Visibility, &mut BorderColor), With<Tooltip>>,
    mut texts: Query<&mut Text, With<TooltipText>>,
) {
    let Ok((mut style, mut visibility, mut border)) = tooltips.get_single_mut() else {
        return;
    };
    let hovered = cursor_positions(&windows, &camera_query).and_then(|(screen, world)| {
        let candidates = agents.iter().map(|(agent, transform)| {
            (
                &agent.agent_id,
                transform.translation.truncate(),
                PICK_RADIUS * agent.tier_scale,
            )
        });
        let id = pick_agent(world, candidates)?;
        Some((screen, driver.session.profile(&id)?))
    });
    let Some((screen, profile)) = hovered else {
        *visibility = Visibility::Hidden;
        return;
    };

    let anchor = tooltip_anchor(screen);
    style.left = Val::Px(anchor.x);
    style.top = Val::Px(anchor.y);
    *border = hex_color_alpha(profile.color, 0.6).into();
    *visibility = Visibility::Inherited;

    let (title, role) = tooltip_lines(profile);
    for mut text in texts.iter_mut() {
        text.sections[0].value.clone_from(&title);
        text.sections[1].value = if role.is_empty() {
            String::new()
        } else {
            format!("\n{}", role)
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use temple_events::{AgentTier, Point};

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(61_999), "01:01");
        assert_eq!(format_clock(600_000), "10:00");
    }

    #[test]
    fn test_status_line() {
        let mut counts = BTreeMap::new();
        counts.insert(AgentStatus::Idle, 10);
        counts.insert(AgentStatus::Thinking, 7);
        let mut clock = SessionClock::default();

        let line = status_line(&counts, 3, 65_000, &clock);
        assert_eq!(line, "Hive Temple | Agents: 17 | moving 3 | idle 10 / thinking 7 | 01:05 x1");

        clock.paused = true;
        assert!(status_line(&counts, 0, 0, &clock).ends_with("00:00 paused"));
    }

    #[test]
    fn test_pick_agent_prefers_closest() {
        let a = AgentId::new("a");
        let b = AgentId::new("b");
        let candidates = vec![
            (&a, Vec2::new(0.0, 0.0), 18.0),
            (&b, Vec2::new(10.0, 0.0), 18.0),
        ];
        assert_eq!(pick_agent(Vec2::new(8.0, 0.0), candidates.clone()), Some(b.clone()));
        assert_eq!(pick_agent(Vec2::new(-5.0, 0.0), candidates.clone()), Some(a.clone()));
        assert_eq!(pick_agent(Vec2::new(100.0, 0.0), candidates), None);
    }

    #[test]
    fn test_info_text() {
        let profile = RosterEntry::new("daji", "妲己", AgentTier::Lieutenant).with_role("Intel");
        let record = AgentRecord::new(
            AgentId::new("daji"),
            AgentTier::Lieutenant,
            100.0,
            Point::new(320.0, 270.0),
        );
        let text = info_text(&profile, &record);
        assert!(text.starts_with("妲己 (daji)"));
        assert!(text.contains("Tier: L2"));
        assert!(text.contains("Role: Intel"));
        assert!(text.contains("Status: idle"));
        assert!(text.contains("Standing at"));
    }

    #[test]
    fn test_tooltip_lines() {
        let mut profile = RosterEntry::new("daji", "妲己", AgentTier::Lieutenant).with_role("Intel");
        profile.name_en = "Daji".into();
        let (title, role) = tooltip_lines(&profile);
        assert_eq!(title, "Daji (L2)");
        assert_eq!(role, "Intel");

        profile.name_en.clear();
        assert_eq!(tooltip_lines(&profile).0, "妲己 (L2)");
    }

    #[test]
    fn test_tooltip_anchor() {
        assert_eq!(tooltip_anchor(Vec2::new(400.0, 300.0)), Vec2::new(340.0, 244.0));
        // near the top-left corner it stays on screen
        assert_eq!(tooltip_anchor(Vec2::new(10.0, 20.0)), Vec2::ZERO);
    }
}
