//! What a chat session needs from a mask, and how picking a mask opens one.
//!
//! Sessions themselves belong to the caller; [`SessionDirectory`] is the
//! narrow view of them the selection flow needs.

use crate::core::mask::{ChatMessage, Mask};
use crate::core::mask_store::MaskStore;
use crate::core::model_config::{effective_model_config, resolve_model, ModelConfig};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub id: String,
    pub mask_id: String,
    /// Epoch millis of the last message.
    pub last_update: i64,
}

/// Everything a new conversation copies from its mask.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSeed {
    pub mask_id: String,
    pub mask_name: String,
    pub model: String,
    pub model_config: ModelConfig,
    pub context: Vec<ChatMessage>,
    /// Assistant-specific backend, if the mask has one.
    pub bend_url: Option<String>,
}

impl SessionSeed {
    pub fn from_mask(mask: &Mask, global: &ModelConfig) -> Self {
        let bend_url = Some(mask.bend_url.trim())
            .filter(|url| !url.is_empty())
            .map(str::to_string);
        Self {
            mask_id: mask.id.clone(),
            mask_name: mask.name.clone(),
            model: resolve_model(mask, global),
            model_config: effective_model_config(mask, global),
            context: mask.context.clone(),
            bend_url,
        }
    }
}

pub trait SessionDirectory {
    fn sessions_by_mask(&self, mask_id: &str) -> Vec<SessionSummary>;
    fn select_mask(&mut self, mask_id: &str);
    fn new_session(&mut self, seed: SessionSeed) -> SessionSummary;
    /// Returns false when no session has `session_id`.
    fn select_session(&mut self, session_id: &str) -> bool;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MaskSelection {
    Resumed(SessionSummary),
    Created(SessionSummary),
}

impl MaskSelection {
    pub fn session(&self) -> &SessionSummary {
        match self {
            MaskSelection::Resumed(session) | MaskSelection::Created(session) => session,
        }
    }
}

/// Find a mask by id, preferring the freshly built built-ins over persisted copies.
pub fn find_mask(store: &MaskStore, mask_id: &str) -> Option<Mask> {
    store
        .get_all()
        .into_iter()
        .find(|mask| mask.id == mask_id)
        .or_else(|| store.get(Some(mask_id)).cloned())
}

/// Select `mask_id`, then resume its most recently updated session or start a new one.
///
/// Returns `None` for unknown masks and when the session to resume has vanished.
pub fn open_mask<D: SessionDirectory>(
    store: &MaskStore,
    sessions: &mut D,
    mask_id: &str,
) -> Option<MaskSelection> {
    let Some(mask) = find_mask(store, mask_id) else {
        debug!(mask_id, "Cannot open unknown mask");
        return None;
    };
    sessions.select_mask(mask_id);

    let latest = sessions
        .sessions_by_mask(mask_id)
        .into_iter()
        .max_by_key(|session| session.last_update);

    match latest {
        Some(session) => {
            if sessions.select_session(&session.id) {
                Some(MaskSelection::Resumed(session))
            } else {
                debug!(mask_id, session_id = %session.id, "Latest session disappeared");
                None
            }
        }
        None => {
            let global = &store.app_config().model_config;
            let seed = SessionSeed::from_mask(&mask, global);
            Some(MaskSelection::Created(sessions.new_session(seed)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::AppConfig;
    use crate::core::lang::Lang;
    use crate::core::mask::{
        MaskPatch, Role, ARGUE_MASK_ID, DEFAULT_MASK_ID, TRANSLATE_MASK_ID,
    };

    #[derive(Default)]
    struct FakeSessions {
        sessions: Vec<SessionSummary>,
        seeds: Vec<SessionSeed>,
        selected_mask: Option<String>,
        selected_session: Option<String>,
    }

    impl SessionDirectory for FakeSessions {
        fn sessions_by_mask(&self, mask_id: &str) -> Vec<SessionSummary> {
            self.sessions
                .iter()
                .filter(|session| session.mask_id == mask_id)
                .cloned()
                .collect()
        }

        fn select_mask(&mut self, mask_id: &str) {
            self.selected_mask = Some(mask_id.to_string());
        }

        fn new_session(&mut self, seed: SessionSeed) -> SessionSummary {
            let session = SessionSummary {
                id: format!("session-{}", self.sessions.len() + 1),
                mask_id: seed.mask_id.clone(),
                last_update: 0,
            };
            self.sessions.push(session.clone());
            self.seeds.push(seed);
            self.selected_session = Some(session.id.clone());
            session
        }

        fn select_session(&mut self, session_id: &str) -> bool {
            if self.sessions.iter().any(|session| session.id == session_id) {
                self.selected_session = Some(session_id.to_string());
                true
            } else {
                false
            }
        }
    }

    fn store() -> MaskStore {
        MaskStore::in_memory(AppConfig {
            lang: Some(Lang::En),
            ..AppConfig::default()
        })
    }

    fn session(id: &str, mask_id: &str, last_update: i64) -> SessionSummary {
        SessionSummary {
            id: id.to_string(),
            mask_id: mask_id.to_string(),
            last_update,
        }
    }

    #[test]
    fn first_open_creates_a_seeded_session() {
        let store = store();
        let mut sessions = FakeSessions::default();

        let selection = open_mask(&store, &mut sessions, TRANSLATE_MASK_ID).expect("known mask");

        assert!(matches!(selection, MaskSelection::Created(_)));
        assert_eq!(sessions.selected_mask.as_deref(), Some(TRANSLATE_MASK_ID));
        let seed = &sessions.seeds[0];
        assert_eq!(seed.model, "grok-3-fast");
        assert_eq!(
            seed.bend_url.as_deref(),
            Some("http://localhost:8088/api/v/translate")
        );
    }

    #[test]
    fn reopening_resumes_most_recent_session() {
        let store = store();
        let mut sessions = FakeSessions {
            sessions: vec![
                session("old", ARGUE_MASK_ID, 10),
                session("newest", ARGUE_MASK_ID, 30),
                session("other-mask", TRANSLATE_MASK_ID, 99),
                session("middle", ARGUE_MASK_ID, 20),
            ],
            ..Default::default()
        };

        let selection = open_mask(&store, &mut sessions, ARGUE_MASK_ID).expect("known mask");

        assert_eq!(selection, MaskSelection::Resumed(session("newest", ARGUE_MASK_ID, 30)));
        assert_eq!(sessions.selected_session.as_deref(), Some("newest"));
        assert!(sessions.seeds.is_empty());
    }

    #[test]
    fn unknown_masks_are_not_selected() {
        let store = store();
        let mut sessions = FakeSessions::default();

        assert!(open_mask(&store, &mut sessions, "missing").is_none());
        assert!(sessions.selected_mask.is_none());
    }

    #[test]
    fn user_masks_can_be_opened() {
        let mut store = store();
        let created = store.create(Some(MaskPatch {
            name: Some("Reviewer".to_string()),
            ..Default::default()
        }));
        let mut sessions = FakeSessions::default();

        let selection = open_mask(&store, &mut sessions, &created.id).expect("known mask");

        assert_eq!(selection.session().mask_id, created.id);
        assert_eq!(sessions.seeds[0].mask_name, "Reviewer");
        assert_eq!(sessions.seeds[0].bend_url, None);
    }

    #[test]
    fn seed_uses_global_config_for_synced_masks() {
        let global = ModelConfig {
            model: "gpt-4.1".to_string(),
            temperature: 0.2,
            ..ModelConfig::default()
        };
        let mut mask = crate::core::mask::create_empty_mask(&ModelConfig::default(), Lang::En);
        mask.context
            .push(ChatMessage::new(Role::System, "Answer in haiku."));

        let seed = SessionSeed::from_mask(&mask, &global);
        assert_eq!(seed.model, "gpt-4.1");
        assert_eq!(seed.model_config.temperature, 0.2);
        assert_eq!(seed.context.len(), 1);

        mask.sync_global_config = Some(false);
        let pinned = SessionSeed::from_mask(&mask, &global);
        assert_eq!(pinned.model, ModelConfig::default().model);
    }

    #[test]
    fn default_mask_is_openable_even_when_never_persisted() {
        let store = store();
        assert!(store.is_empty());
        let mut sessions = FakeSessions::default();

        let selection = open_mask(&store, &mut sessions, DEFAULT_MASK_ID);
        assert!(matches!(selection, Some(MaskSelection::Created(_))));
    }
}
