//! Lifecycle behavior shared by every entity store, exercised through the
//! suite container: creation seeding, update stamping, delete/restore
//! round-trips, transition chains, and permission resolution.

use chrono::{Duration, TimeZone, Utc};

use atrium_core::model::employee::{EmployeePatch, NewEmployee};
use atrium_core::model::firm::{FirmPatch, NewFirm};
use atrium_core::model::invoice::{LineItem, NewInvoice, PartySnapshot};
use atrium_core::model::issue::{IssueStatus, NewIssue};
use atrium_core::model::lead::{LeadPatch, LeadStatus, NewLead};
use atrium_core::model::member::{NewProjectMember, NewTeam, PermissionBundle, ProjectRole, TeamRole};
use atrium_core::model::project::NewProject;
use atrium_core::model::role::{ActionKind, Module, ModulePermission, NewRole, Scope};
use atrium_core::{
    ActivityKind, ClockHandle, ManualClock, RecordId, StoreError, Suite, SuiteConfig,
    resolve_project_permissions, resolve_team_permissions,
};

fn test_suite() -> Suite {
    let start = Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap();
    Suite::with_clock(
        SuiteConfig::default(),
        ClockHandle::new(ManualClock::starting_at(start, Duration::minutes(1))),
    )
}

#[test]
fn creation_seeds_stamps_and_one_activity() {
    let mut suite = test_suite();
    let lead = suite
        .leads
        .add(NewLead::new("Acme", "contact@acme.test"), "agent1")
        .unwrap();

    assert_eq!(lead.created_at, lead.updated_at);
    assert_eq!(lead.activities.len(), 1);
    assert_eq!(lead.activities.entries()[0].kind, ActivityKind::Created);
}

#[test]
fn update_strictly_bumps_updated_at_and_appends_one_entry() {
    let mut suite = test_suite();
    let id = suite
        .leads
        .add(NewLead::new("Acme", "contact@acme.test"), "agent1")
        .unwrap()
        .id
        .clone();

    let mut prev = suite.leads.get(&id).unwrap().updated_at;
    for round in 0..5 {
        let patch = LeadPatch {
            value: Some(f64::from(round) * 100.0),
            ..LeadPatch::default()
        };
        suite.leads.update(&id, patch, "agent1").unwrap();
        let lead = suite.leads.get(&id).unwrap();
        assert!(lead.updated_at > prev);
        assert_eq!(lead.activities.len(), 2 + round as usize);
        prev = lead.updated_at;
    }
}

#[test]
fn delete_restore_roundtrip_changes_only_flag_stamp_and_log_tail() {
    let mut suite = test_suite();
    let id = suite
        .clients
        .add(
            atrium_core::model::client::NewClient::new("Globex"),
            "agent1",
        )
        .unwrap()
        .id
        .clone();
    let before = suite.clients.get(&id).unwrap().clone();

    suite.clients.delete(&id, "agent1").unwrap();
    assert!(suite.clients.get(&id).unwrap().deleted);
    assert_eq!(suite.clients.list_active().count(), 0);

    suite.clients.restore(&id, "agent1").unwrap();
    let after = suite.clients.get(&id).unwrap();

    assert!(!after.deleted);
    assert_eq!(after.name, before.name);
    assert_eq!(after.email, before.email);
    assert_eq!(after.created_at, before.created_at);
    assert!(after.updated_at > before.updated_at);
    assert_eq!(after.activities.len(), before.activities.len() + 2);
    let kinds: Vec<_> = after
        .activities
        .iter()
        .skip(before.activities.len())
        .map(|a| a.kind)
        .collect();
    assert_eq!(kinds, vec![ActivityKind::Deleted, ActivityKind::Restored]);
}

#[test]
fn lead_stage_scenario_matches_expected_text() {
    let mut suite = test_suite();
    let id = suite
        .leads
        .add(NewLead::new("Acme", "contact@acme.test"), "agent1")
        .unwrap()
        .id
        .clone();

    suite
        .leads
        .update_status(&id, LeadStatus::Qualified, "agent1", None)
        .unwrap();

    let lead = suite.leads.get(&id).unwrap();
    assert_eq!(lead.status, LeadStatus::Qualified);
    assert_eq!(lead.stage_history().len(), 2);
    assert_eq!(lead.stage_history()[0].from, None);
    assert_eq!(lead.stage_history()[1].from, Some(LeadStatus::New));
    assert_eq!(
        lead.activities.last().unwrap().description,
        "Status changed from New to Qualified"
    );
}

#[test]
fn issue_transition_chain_is_contiguous_from_empty_start() {
    let mut suite = test_suite();
    let project = RecordId::new_unchecked("proj-1");
    let id = suite
        .issues
        .add(NewIssue::new(project, "Ship it"), "dev1")
        .unwrap()
        .id
        .clone();

    for status in [
        IssueStatus::InProgress,
        IssueStatus::InReview,
        IssueStatus::Done,
    ] {
        suite.issues.update_status(&id, status, "dev1").unwrap();
    }

    let issue = suite.issues.get(&id).unwrap();
    let chain: Vec<_> = issue
        .history()
        .iter()
        .filter(|c| c.field == "status")
        .collect();
    assert_eq!(chain.len(), 4);
    assert!(chain[0].from.is_none());
    for pair in chain.windows(2) {
        assert_eq!(pair[1].from, pair[0].to);
    }
    assert_eq!(chain[3].to.as_deref(), Some("done"));
}

#[test]
fn rejected_reorder_leaves_issue_untouched() {
    let mut suite = test_suite();
    let project = RecordId::new_unchecked("proj-1");
    let id = suite
        .issues
        .add(NewIssue::new(project, "Ship it"), "dev1")
        .unwrap()
        .id
        .clone();
    let before = suite.issues.get(&id).unwrap().clone();

    let err = suite
        .issues
        .reorder(&id, IssueStatus::Done, 9, "dev1", |from, to| {
            Err(format!("cannot jump from {from} to {to}"))
        })
        .unwrap_err();

    match err {
        StoreError::WorkflowViolation { reason, .. } => assert!(!reason.is_empty()),
        other => panic!("expected workflow violation, got {other:?}"),
    }
    assert_eq!(suite.issues.get(&id).unwrap(), &before);
}

#[test]
fn role_creation_seeds_all_modules_and_toggles_stay_isolated() {
    let mut suite = test_suite();
    let id = suite
        .roles
        .add(NewRole::custom("Accountant"), "admin")
        .unwrap()
        .id
        .clone();

    let role = suite.roles.get(&id).unwrap();
    assert_eq!(role.permissions().len(), Module::ALL.len());
    for module in Module::ALL {
        assert_eq!(
            role.permission_for(module).unwrap(),
            &ModulePermission::seeded(module)
        );
    }

    suite
        .roles
        .set_action(&id, Module::Invoices, ActionKind::View, true, "admin")
        .unwrap();
    let role = suite.roles.get(&id).unwrap();
    assert!(role.permission_for(Module::Invoices).unwrap().actions.view);
    for module in Module::ALL.iter().filter(|m| **m != Module::Invoices) {
        assert_eq!(
            role.permission_for(*module).unwrap(),
            &ModulePermission::seeded(*module)
        );
    }
    assert_eq!(
        role.permission_for(Module::Invoices).unwrap().scope,
        Scope::Own
    );
}

#[test]
fn permission_resolution_override_beats_role_default() {
    let mut suite = test_suite();
    let project = suite
        .projects
        .add(
            NewProject::new(RecordId::new_unchecked("ws-1"), "Website"),
            "pm",
        )
        .unwrap()
        .id
        .clone();

    let member_id = suite
        .project_members
        .add(NewProjectMember::new(project.clone(), "u1", ProjectRole::Viewer), "pm")
        .unwrap()
        .id
        .clone();

    assert_eq!(
        resolve_project_permissions(&suite.project_members, &project, "u1").unwrap(),
        PermissionBundle::read_only()
    );

    suite
        .project_members
        .set_override(&member_id, Some(PermissionBundle::all()), "pm")
        .unwrap();
    assert_eq!(
        resolve_project_permissions(&suite.project_members, &project, "u1").unwrap(),
        PermissionBundle::all()
    );

    assert!(matches!(
        resolve_project_permissions(&suite.project_members, &project, "ghost"),
        Err(StoreError::MemberNotFound { .. })
    ));
}

#[test]
fn team_membership_and_resolution_work_through_suite() {
    let mut suite = test_suite();
    let team = suite.teams.add(NewTeam::new("Platform"), "admin").unwrap().id.clone();
    suite
        .teams
        .add_member(&team, "u1", TeamRole::Member, "admin")
        .unwrap();

    assert_eq!(
        resolve_team_permissions(&suite.teams, &team, "u1").unwrap(),
        TeamRole::Member.default_bundle()
    );

    suite.teams.remove_member(&team, "u1", "admin").unwrap();
    assert!(matches!(
        resolve_team_permissions(&suite.teams, &team, "u1"),
        Err(StoreError::MemberNotFound { .. })
    ));
}

#[test]
fn employee_lifecycle_follows_the_shared_pattern() {
    let mut suite = test_suite();
    let id = suite
        .employees
        .add(NewEmployee::new("Jo", "jo@firm.test"), "hr")
        .unwrap()
        .id
        .clone();

    let patch = EmployeePatch {
        position: Some("Engineer".into()),
        ..EmployeePatch::default()
    };
    suite.employees.update(&id, patch, "hr").unwrap();

    assert!(suite.employees.delete(&id, "hr").unwrap().changed());
    assert_eq!(suite.employees.list_active().count(), 0);
    assert!(suite.employees.restore(&id, "hr").unwrap().changed());

    let employee = suite.employees.get(&id).unwrap();
    assert_eq!(employee.position.as_deref(), Some("Engineer"));
    let kinds: Vec<_> = employee.activities.iter().map(|a| a.kind).collect();
    assert_eq!(
        kinds,
        vec![
            ActivityKind::Created,
            ActivityKind::Updated,
            ActivityKind::Deleted,
            ActivityKind::Restored
        ]
    );
}

#[test]
fn invoice_embeds_the_firm_snapshot_at_issue_time() {
    let mut suite = test_suite();
    let mut new_firm = NewFirm::new("Atrium LLC");
    new_firm.address = Some("1 Main St".into());
    let firm_id = suite.firms.add(new_firm, "admin").unwrap().id.clone();

    let invoice_id = suite
        .invoices
        .add(
            NewInvoice {
                number: "INV-100".into(),
                items: vec![LineItem {
                    description: "consulting".into(),
                    quantity: 2.0,
                    unit_price: 150.0,
                }],
                tax: 0.0,
                client: PartySnapshot::named("Globex"),
                firm: suite.firms.get(&firm_id).unwrap().party_snapshot(),
            },
            "billing",
        )
        .unwrap()
        .id
        .clone();

    // Later firm edits never reach invoices issued before them.
    let patch = FirmPatch {
        name: Some("Atrium Holdings".into()),
        address: Some("9 Harbor Rd".into()),
        ..FirmPatch::default()
    };
    suite.firms.update(&firm_id, patch, "admin").unwrap();

    let invoice = suite.invoices.get(&invoice_id).unwrap();
    assert_eq!(invoice.firm.name, "Atrium LLC");
    assert_eq!(invoice.firm.address.as_deref(), Some("1 Main St"));
    assert_eq!(suite.firms.get(&firm_id).unwrap().name, "Atrium Holdings");
}
