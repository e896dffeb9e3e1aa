//! Property tests for the audit-trail invariants: activity log growth,
//! transition-chain contiguity, and permission isolation across modules.

use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;

use atrium_core::model::lead::{LeadPatch, LeadStatus, NewLead};
use atrium_core::model::role::{ActionKind, Module, ModulePermission, NewRole};
use atrium_core::store::StoreMode;
use atrium_core::store::leads::LeadStore;
use atrium_core::store::roles::RoleStore;
use atrium_core::{ActivityKind, ClockHandle, ManualClock};

#[derive(Debug, Clone)]
enum LeadOp {
    Update(f64),
    SetStatus(LeadStatus),
    Delete,
    Restore,
    Note,
}

fn arb_lead_op() -> impl Strategy<Value = LeadOp> {
    prop_oneof![
        (0.0f64..100_000.0).prop_map(LeadOp::Update),
        prop::sample::select(LeadStatus::ALL.to_vec()).prop_map(LeadOp::SetStatus),
        Just(LeadOp::Delete),
        Just(LeadOp::Restore),
        Just(LeadOp::Note),
    ]
}

fn arb_module() -> impl Strategy<Value = Module> {
    prop::sample::select(Module::ALL.to_vec())
}

fn arb_action() -> impl Strategy<Value = ActionKind> {
    prop::sample::select(ActionKind::ALL.to_vec())
}

fn lead_store() -> LeadStore {
    let start = Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap();
    LeadStore::new(
        StoreMode::Strict,
        ClockHandle::new(ManualClock::starting_at(start, Duration::seconds(7))),
    )
}

fn role_store() -> RoleStore {
    let start = Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap();
    RoleStore::new(
        StoreMode::Strict,
        ClockHandle::new(ManualClock::starting_at(start, Duration::seconds(7))),
    )
}

proptest! {
    #![proptest_config(proptest::test_runner::Config::with_cases(256))]

    /// The activity log holds exactly one entry per applied operation plus
    /// the creation seed; skipped no-ops add nothing.
    #[test]
    fn activity_log_length_tracks_applied_ops(ops in prop::collection::vec(arb_lead_op(), 0..40)) {
        let mut leads = lead_store();
        let id = leads
            .add(NewLead::new("Acme", "a@acme.test"), "agent1")
            .unwrap()
            .id
            .clone();

        let mut applied = 0usize;
        for op in ops {
            let outcome = match op {
                LeadOp::Update(value) => leads.update(
                    &id,
                    LeadPatch { value: Some(value), ..LeadPatch::default() },
                    "agent1",
                ),
                LeadOp::SetStatus(to) => leads.update_status(&id, to, "agent1", None),
                LeadOp::Delete => leads.delete(&id, "agent1"),
                LeadOp::Restore => leads.restore(&id, "agent1"),
                LeadOp::Note => leads.add_activity(&id, ActivityKind::Note, "agent1", "note"),
            }
            .unwrap();
            if outcome.changed() {
                applied += 1;
            }
        }

        let lead = leads.get(&id).unwrap();
        prop_assert_eq!(lead.activities.len(), 1 + applied);
    }

    /// Stage history is a contiguous chain: the seed entry has no prior
    /// status, and every later entry's `from` equals its predecessor's `to`.
    /// Timestamps along the chain strictly increase.
    #[test]
    fn stage_history_chains_contiguously(
        statuses in prop::collection::vec(
            prop::sample::select(LeadStatus::ALL.to_vec()),
            0..20,
        ),
    ) {
        let mut leads = lead_store();
        let id = leads
            .add(NewLead::new("Acme", "a@acme.test"), "agent1")
            .unwrap()
            .id
            .clone();

        for status in &statuses {
            leads.update_status(&id, *status, "agent1", None).unwrap();
        }

        let lead = leads.get(&id).unwrap();
        let history = lead.stage_history();
        prop_assert_eq!(history.len(), 1 + statuses.len());
        prop_assert!(history[0].from.is_none());
        for pair in history.windows(2) {
            prop_assert_eq!(pair[1].from, Some(pair[0].to));
            prop_assert!(pair[1].at > pair[0].at);
        }
    }

    /// Toggling actions on arbitrary modules never disturbs any module the
    /// toggles did not name.
    #[test]
    fn permission_toggles_isolate_sibling_modules(
        toggles in prop::collection::vec(
            (arb_module(), arb_action(), any::<bool>()),
            0..30,
        ),
    ) {
        let mut roles = role_store();
        let id = roles
            .add(NewRole::custom("Analyst"), "admin")
            .unwrap()
            .id
            .clone();

        for (module, action, value) in &toggles {
            roles.set_action(&id, *module, *action, *value, "admin").unwrap();
        }

        let touched: Vec<Module> = toggles.iter().map(|(m, _, _)| *m).collect();
        let role = roles.get(&id).unwrap();
        prop_assert_eq!(role.permissions().len(), Module::ALL.len());
        for module in Module::ALL {
            if !touched.contains(&module) {
                prop_assert_eq!(
                    role.permission_for(module).unwrap(),
                    &ModulePermission::seeded(module)
                );
            }
        }
    }
}
