//! Numbered fixes for mask state persisted by older releases.
//!
//! Each step is gated on the version the state was persisted at and only
//! runs when that version is below the step's threshold. After the steps,
//! the default mask is synthesized if the collection lacks it.

use crate::core::config::AppConfig;
use crate::core::mask::{create_default_mask, Mask, DEFAULT_MASK_ID};
use crate::core::mask_store::MaskState;
use std::collections::BTreeMap;
use tracing::info;

/// Produces a fresh mask id; injected so migrations can be replayed in tests.
pub type IdSource<'a> = &'a mut dyn FnMut() -> String;

pub struct MigrationStep {
    /// The step runs for state persisted at any version strictly below this one.
    pub below: f64,
    pub description: &'static str,
    apply: fn(&mut MaskState, IdSource<'_>),
}

impl MigrationStep {
    pub fn applies_to(&self, from_version: f64) -> bool {
        from_version < self.below
    }
}

pub const MIGRATIONS: &[MigrationStep] = &[
    MigrationStep {
        below: 3.0,
        description: "assign fresh ids to every mask",
        apply: assign_fresh_ids,
    },
    MigrationStep {
        below: 3.1,
        description: "re-key masks by their own id",
        apply: rekey_by_id,
    },
    MigrationStep {
        below: 3.2,
        description: "stop the default mask from tracking global config",
        apply: unsync_default_mask,
    },
];

fn assign_fresh_ids(state: &mut MaskState, next_id: IdSource<'_>) {
    for mask in state.masks.values_mut() {
        mask.id = next_id();
    }
}

fn rekey_by_id(state: &mut MaskState, _next_id: IdSource<'_>) {
    let masks = std::mem::take(&mut state.masks);
    state.masks = masks
        .into_values()
        .map(|mask| (mask.id.clone(), mask))
        .collect::<BTreeMap<String, Mask>>();
}

fn unsync_default_mask(state: &mut MaskState, _next_id: IdSource<'_>) {
    for mask in state.masks.values_mut() {
        if mask.id == DEFAULT_MASK_ID && mask.sync_global_config == Some(true) {
            mask.sync_global_config = Some(false);
        }
    }
}

fn ensure_default_mask(state: &mut MaskState, config: &AppConfig) {
    if !state.masks.contains_key(DEFAULT_MASK_ID) {
        info!("Default mask missing after migration; synthesizing it");
        let lang = state.language.unwrap_or_else(|| config.lang());
        state.masks.insert(
            DEFAULT_MASK_ID.to_string(),
            create_default_mask(&config.model_config, lang),
        );
    }
}

/// Run every step whose gate `from_version` falls under, then restore the default mask.
pub fn migrate(
    mut state: MaskState,
    from_version: f64,
    config: &AppConfig,
    next_id: IdSource<'_>,
) -> MaskState {
    for step in MIGRATIONS {
        if step.applies_to(from_version) {
            info!(
                below = step.below,
                step = step.description,
                masks = state.masks.len(),
                "Applying mask migration"
            );
            (step.apply)(&mut state, &mut *next_id);
        }
    }
    ensure_default_mask(&mut state, config);
    state
}
