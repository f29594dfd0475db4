//! Roster Setup
//!
//! The default agent hierarchy, and loading a replacement roster from JSON.

use std::collections::HashSet;
use std::path::Path;

use thiserror::Error;

use temple_events::{AgentId, AgentTier};

use crate::agent::RosterEntry;

#[derive(Debug, Error)]
pub enum RosterError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("agent `{0}` appears twice in the roster")]
    DuplicateId(AgentId),
}

fn agent(
    id: &str,
    name: &str,
    name_en: &str,
    tier: AgentTier,
    role: &str,
    color: u32,
    emoji: &str,
) -> RosterEntry {
    RosterEntry {
        id: AgentId::new(id),
        name: name.into(),
        name_en: name_en.into(),
        tier,
        role: role.into(),
        color,
        emoji: emoji.into(),
    }
}

/// The seventeen agents of the default temple.
pub fn default_roster() -> Vec<RosterEntry> {
    use AgentTier::*;

    let support = "Customer service agent";
    vec![
        // === PRIMARY ===
        agent("jiangziya", "姜子牙", "Jiang Ziya", Primary, "Hive roster steward", 0xFFBF00, "🕯️"),
        // === LIEUTENANTS ===
        agent("daji", "妲己", "Daji", Lieutenant, "Intelligence analysis", 0x8B5CF6, "🦊"),
        agent("zhouwang", "紂王", "Zhou Wang", Lieutenant, "Execution management", 0xB8860B, "👑"),
        // === WORKERS ===
        // Telegram bots
        agent("qianliyan", "千里眼", "Qianliyan", Worker, "Telegram admin bot", 0xFFD700, "👁️"),
        agent("shunfenger", "順風耳", "Shunfeng'er", Worker, "Telegram support bot", 0xFFB6C1, "👂"),
        // Support agents
        agent("xiaosen", "小森", "Xiaosen", Worker, support, 0x22C55E, "🌲"),
        agent("xiaomei", "小美", "Xiaomei", Worker, support, 0xEC4899, "🌸"),
        agent("xiaoyi", "小義", "Xiaoyi", Worker, support, 0xDC2626, "⚔️"),
        agent("xiaoying", "小影", "Xiaoying", Worker, support, 0x7C3AED, "🌙"),
        agent("xiaomao", "小貓", "Xiaomao", Worker, support, 0xF97316, "🐱"),
        agent("xiaohao", "小豪", "Xiaohao", Worker, support, 0x3B82F6, "💪"),
        agent("xiaocai", "小財", "Xiaocai", Worker, support, 0xEAB308, "💰"),
        agent("xiaolv", "小律", "Xiaolv", Worker, support, 0x1E40AF, "⚖️"),
        agent("xiaoba", "小扒", "Xiaoba", Worker, support, 0x92400E, "🔍"),
        agent("xiaokou", "小摳", "Xiaokou", Worker, support, 0x6B7280, "🧮"),
        agent("xiaoyou", "小遊", "Xiaoyou", Worker, "Experience actuary", 0x06B6D4, "🎮"),
        agent("xiaoming", "小明", "Xiaoming", Worker, support, 0x38BDF8, "💡"),
        // === SPECIAL ===
        agent("yuanshi", "元始天尊", "Yuanshi Tianzun", Special, "System monitor", 0xF8FAFC, "☁️"),
    ]
}

/// Entries of one tier, in roster order.
pub fn by_tier(roster: &[RosterEntry], tier: AgentTier) -> Vec<&RosterEntry> {
    roster.iter().filter(|e| e.tier == tier).collect()
}

/// Parses a roster from a JSON array and rejects repeated ids.
pub fn roster_from_json(json: &str) -> Result<Vec<RosterEntry>, RosterError> {
    let roster: Vec<RosterEntry> = serde_json::from_str(json)?;
    let mut seen = HashSet::new();
    for entry in &roster {
        if !seen.insert(&entry.id) {
            return Err(RosterError::DuplicateId(entry.id.clone()));
        }
    }
    Ok(roster)
}

pub fn load_roster(path: &Path) -> Result<Vec<RosterEntry>, RosterError> {
    let content = std::fs::read_to_string(path)?;
    roster_from_json(&content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_roster_shape() {
        let roster = default_roster();
        assert_eq!(roster.len(), 17);
        assert_eq!(by_tier(&roster, AgentTier::Primary).len(), 1);
        assert_eq!(by_tier(&roster, AgentTier::Lieutenant).len(), 2);
        assert_eq!(by_tier(&roster, AgentTier::Worker).len(), 13);
        assert_eq!(by_tier(&roster, AgentTier::Special).len(), 1);
    }

    #[test]
    fn test_default_roster_ids_unique() {
        let json = serde_json::to_string(&default_roster()).unwrap();
        assert_eq!(roster_from_json(&json).unwrap(), default_roster());
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let json = r#"[
            {"id": "a", "name": "A", "name_en": "A", "tier": "worker", "role": "", "color": 0, "emoji": ""},
            {"id": "a", "name": "A2", "name_en": "A2", "tier": "L3", "role": "", "color": 0, "emoji": ""}
        ]"#;
        assert!(matches!(roster_from_json(json), Err(RosterError::DuplicateId(_))));
    }

    #[test]
    fn test_load_roster_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"id": "solo", "name": "Solo", "name_en": "Solo", "tier": "special", "role": "watcher", "color": 255, "emoji": "☁️"}}]"#
        )
        .unwrap();
        let roster = load_roster(file.path()).unwrap();
        assert_eq!(roster.len(), 1);
        assert_eq!(roster[0].tier, AgentTier::Special);
    }
}
