//! Agent Registry (C2): in-memory store of agent cards plus the derived
//! routing indices (SkillKeywords, per-agent AgentCapabilities), rebuilt
//! from scratch on every mutation.

use parking_lot::RwLock;
use sb_protocol::{AgentCapabilities, AgentCard, SkillKeywords, SkillSummary};
use serde::Serialize;
use std::collections::HashMap;

/// Summary record returned by `list()`.
#[derive(Debug, Clone, Serialize)]
pub struct AgentSummary {
    pub agent_id: String,
    pub name: String,
    pub description: String,
    pub url: String,
    pub skills: Vec<String>,
    pub keywords: Vec<String>,
    pub streaming: bool,
    pub push_notifications: bool,
}

#[derive(Default)]
struct Derived {
    skill_keywords: SkillKeywords,
    capabilities: HashMap<String, AgentCapabilities>,
}

/// Thread-safe registry of agent cards, keyed by `card.name`.
///
/// Readers (routing, list) take a shared lock; `add`/`remove` take an
/// exclusive lock and rebuild both derived indices under it, so a caller
/// never observes a partial view of the indices relative to the card set.
pub struct AgentRegistry {
    cards: RwLock<HashMap<String, AgentCard>>,
    /// Insertion order of agent names, used to make routing tie-breaks and
    /// `list()` output deterministic.
    order: RwLock<Vec<String>>,
    derived: RwLock<Derived>,
}

impl Default for AgentRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self {
            cards: RwLock::new(HashMap::new()),
            order: RwLock::new(Vec::new()),
            derived: RwLock::new(Derived::default()),
        }
    }

    /// Insert or replace the card under key `card.name`, then rebuild both
    /// derived indices over the full current card set.
    pub fn add(&self, card: AgentCard) {
        let name = card.name.clone();
        let url = card.url.clone();
        let skill_count = card.skills.len();
        {
            let mut cards = self.cards.write();
            let mut order = self.order.write();
            if !cards.contains_key(&name) {
                order.push(name.clone());
            }
            cards.insert(name.clone(), card);
        }
        self.rebuild_indices();
        sb_domain::trace::TraceEvent::AgentRegistered {
            agent_id: name.clone(),
            name,
            url,
            skill_count,
        }
        .emit();
    }

    /// Resolves `identifier` in priority order — exact name, exact URL,
    /// case-insensitive name, URL substring — and removes the matching
    /// card. Returns the removed card, or `None` if nothing matched.
    pub fn remove(&self, identifier: &str) -> Option<AgentCard> {
        let removed_name = {
            let cards = self.cards.read();
            if cards.contains_key(identifier) {
                Some(identifier.to_string())
            } else if let Some((name, _)) = cards.iter().find(|(_, c)| c.url == identifier) {
                Some(name.clone())
            } else if let Some((name, _)) = cards
                .iter()
                .find(|(n, _)| n.eq_ignore_ascii_case(identifier))
            {
                Some(name.clone())
            } else {
                cards
                    .iter()
                    .find(|(_, c)| c.url.contains(identifier))
                    .map(|(name, _)| name.clone())
            }
        };

        let removed_name = removed_name?;
        let removed = {
            let mut cards = self.cards.write();
            let mut order = self.order.write();
            order.retain(|n| n != &removed_name);
            cards.remove(&removed_name)
        };
        if removed.is_some() {
            self.rebuild_indices();
            sb_domain::trace::TraceEvent::AgentRemoved {
                agent_id: removed_name.clone(),
                name: removed_name.clone(),
            }
            .emit();
        }
        removed
    }

    pub fn lookup_by_id(&self, id: &str) -> Option<AgentCard> {
        self.cards.read().get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.cards.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.read().is_empty()
    }

    /// Ordered summary records, following insertion order.
    pub fn list(&self) -> Vec<AgentSummary> {
        let cards = self.cards.read();
        let order = self.order.read();
        order
            .iter()
            .filter_map(|name| cards.get(name))
            .map(|card| AgentSummary {
                agent_id: card.name.clone(),
                name: card.name.clone(),
                description: card.description.clone(),
                url: card.url.clone(),
                skills: card.skills.iter().map(|s| s.name.clone()).collect(),
                keywords: card
                    .skills
                    .iter()
                    .flat_map(|s| s.tags.iter().cloned())
                    .collect(),
                streaming: card.capabilities.streaming,
                push_notifications: card.capabilities.push_notifications,
            })
            .collect()
    }

    /// Ordered snapshot of (card, capabilities) pairs for the routing
    /// engine to score against, in the registry's stable insertion order.
    pub fn snapshot(&self) -> Vec<(AgentCard, AgentCapabilities)> {
        let cards = self.cards.read();
        let order = self.order.read();
        let derived = self.derived.read();
        order
            .iter()
            .filter_map(|name| {
                let card = cards.get(name)?;
                let caps = derived.capabilities.get(name).cloned().unwrap_or_default();
                Some((card.clone(), caps))
            })
            .collect()
    }

    pub fn skill_keywords(&self) -> SkillKeywords {
        self.derived.read().skill_keywords.clone()
    }

    fn rebuild_indices(&self) {
        let cards = self.cards.read();
        let mut skill_keywords = SkillKeywords::new();
        let mut capabilities = HashMap::new();

        for card in cards.values() {
            let mut caps = AgentCapabilities::default();
            for skill in &card.skills {
                for tag in &skill.tags {
                    caps.keywords.insert(tag.to_lowercase());
                }
                for token in tokenize_domains(&skill.name, &skill.description) {
                    caps.domains.insert(token);
                }
                caps.examples.extend(skill.examples.iter().cloned());
                caps.skills_by_id.insert(
                    skill.id.clone(),
                    SkillSummary {
                        name: skill.name.clone(),
                        description: skill.description.clone(),
                        tags: skill.tags.clone(),
                    },
                );

                let keywords = skill_keywords.entry(skill.name.clone()).or_default();
                for tag in &skill.tags {
                    let lower = tag.to_lowercase();
                    if !keywords.contains(&lower) {
                        keywords.push(lower);
                    }
                }
                for token in skill.name.split('_') {
                    let lower = token.to_lowercase();
                    if !lower.is_empty() && !keywords.contains(&lower) {
                        keywords.push(lower);
                    }
                }
                for word in skill.description.to_lowercase().split_whitespace().take(3) {
                    if word.len() >= 3 && !keywords.contains(&word.to_string()) {
                        keywords.push(word.to_string());
                    }
                }
            }
            capabilities.insert(card.name.clone(), caps);
        }

        let mut derived = self.derived.write();
        derived.skill_keywords = skill_keywords;
        derived.capabilities = capabilities;
    }
}

/// Tokens >=4 chars drawn from a skill's name and description, lowercased.
fn tokenize_domains(name: &str, description: &str) -> Vec<String> {
    name.split(['_', ' '])
        .chain(description.split_whitespace())
        .map(|t| t.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase())
        .filter(|t| t.len() >= 4)
        .collect()
}
