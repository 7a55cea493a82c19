// src/plans/mod.rs

#[cfg(windows)]
pub mod definitions;

use indexmap::IndexMap;
use once_cell::sync::Lazy;

use crate::actions::Action;

/// A named, ordered sequence of actions making up one logical
/// configuration change.
///
/// Order is significant: later actions may depend on the side effects of
/// earlier ones, and the runner never reorders or parallelizes.
#[derive(Debug)]
pub struct Plan {
    name: String,
    description: String,
    actions: Vec<Action>,
}

impl Plan {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        actions: Vec<Action>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            actions,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }
}

pub type PlanFactory = fn() -> Plan;

/// Built-in plans, in presentation order. Plans are constructed fresh on
/// every lookup; nothing here touches the system until a runner executes
/// them.
static CATALOG: Lazy<IndexMap<&'static str, PlanFactory>> = Lazy::new(|| {
    #[cfg(windows)]
    {
        IndexMap::from([
            ("remove-edge", definitions::remove_edge as PlanFactory),
            ("remove-copilot", definitions::remove_copilot as PlanFactory),
            ("disable-widgets", definitions::disable_widgets as PlanFactory),
            ("disable-game-bar", definitions::disable_game_bar as PlanFactory),
            (
                "reset-taskbar-layout",
                definitions::reset_taskbar_layout as PlanFactory,
            ),
            ("remove-bloatware", definitions::remove_bloatware as PlanFactory),
            ("disk-cleanup", definitions::disk_cleanup as PlanFactory),
            (
                "remove-timer-service",
                definitions::remove_timer_service as PlanFactory,
            ),
        ])
    }
    #[cfg(not(windows))]
    {
        IndexMap::new()
    }
});

/// The catalog of built-in plans, keyed by CLI name.
pub fn builtin_plans() -> &'static IndexMap<&'static str, PlanFactory> {
    &CATALOG
}

/// Constructs the built-in plan registered under `name`.
pub fn find(name: &str) -> Option<Plan> {
    CATALOG.get(name).map(|factory| factory())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_plan_names_resolve_to_none() {
        assert!(find("no-such-plan").is_none());
    }

    #[cfg(windows)]
    #[test]
    fn every_catalog_entry_constructs_a_nonempty_plan() {
        for (name, factory) in builtin_plans() {
            let plan = factory();
            assert_eq!(plan.name(), *name, "catalog key must match plan name");
            assert!(!plan.actions().is_empty(), "plan '{}' has no actions", name);
            assert!(!plan.description().is_empty());
        }
    }
}
