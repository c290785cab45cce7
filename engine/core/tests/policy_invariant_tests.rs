// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Cross-cutting policy properties.
//!
//! - Resolution is deterministic.
//! - Discovery and invocation agree for every (tenant, caller, configuration).
//! - Unauthenticated callers only ever see the default capability.
//! - Agents never see anything beyond `Default` and `AgentTools`.
//! - Unconfigured tenants are default-on for humans.
//! - Configuration changes take effect on the very next call.

mod common;

use std::collections::BTreeSet;

use common::{ctx, sized_catalog, toggle_matrix, Harness, CLASSIFICATIONS};
use loadout_core::domain::caller::{CallerClassification, RequestContext, TenantId};
use loadout_core::domain::capability::{CapabilityCatalog, HEALTH_CAPABILITY};
use loadout_core::domain::error::AccessError;
use loadout_core::domain::loadout::LoadoutId;
use loadout_core::domain::resolver::{resolve_group_state, IntegrationPresence};
use loadout_core::domain::tenant_policy::TenantPolicyConfiguration;

fn scenario_catalog() -> CapabilityCatalog {
    sized_catalog(&[
        (LoadoutId::Default, 1),
        (LoadoutId::DeveloperCore, 2),
        (LoadoutId::Query, 19),
        (LoadoutId::OntologyMaintenance, 22),
        (LoadoutId::OntologyQuestions, 5),
        (LoadoutId::DataLiaison, 8),
    ])
}

fn names_in(catalog: &CapabilityCatalog, loadout: LoadoutId) -> Vec<String> {
    catalog.in_loadout(loadout).map(|s| s.name.clone()).collect()
}

#[test]
fn test_resolution_is_deterministic() {
    for (config, installed) in toggle_matrix() {
        for who in CLASSIFICATIONS {
            let presence = IntegrationPresence::from(installed);
            let first = resolve_group_state(Some(&config), who, presence);
            let second = resolve_group_state(Some(&config), who, presence);
            assert_eq!(first, second);
        }
    }
}

#[tokio::test]
async fn test_discovery_and_invocation_agree() {
    let harness = Harness::standard();
    let tenant = TenantId::new();

    let mut probes: Vec<String> = harness.catalog.all().iter().map(|s| s.name.clone()).collect();
    probes.push("drop_database".to_string());
    probes.push(String::new());

    for (config, installed) in toggle_matrix() {
        harness.set_policy(tenant, &config).await;
        harness.oracle.set_installed(tenant, installed);

        for who in CLASSIFICATIONS {
            let ctx = ctx(who, tenant);
            let visible: BTreeSet<String> = harness.visible(&ctx).await.into_iter().collect();

            for name in &probes {
                match harness.guard.authorize(&ctx, name).await {
                    Ok(_call) => assert!(
                        visible.contains(name),
                        "{} authorized but not listed for {} under {:?}",
                        name,
                        who,
                        config
                    ),
                    Err(AccessError::CapabilityNotEnabled { capability }) => {
                        assert_eq!(&capability, name);
                        assert!(
                            !visible.contains(name),
                            "{} listed but denied for {} under {:?}",
                            name,
                            who,
                            config
                        );
                    }
                    Err(other) => panic!("unexpected error for {}: {}", name, other),
                }
            }
        }
    }

    assert_eq!(harness.provider.outstanding(), 0);
}

#[tokio::test]
async fn test_unauthenticated_floor() {
    let harness = Harness::standard();
    let tenant = TenantId::new();
    let expected = vec![HEALTH_CAPABILITY.to_string()];

    // No claims at all.
    assert_eq!(harness.visible(&RequestContext::anonymous()).await, expected);

    // Malformed tenant degrades the same way.
    let malformed = RequestContext::with_claims(loadout_core::domain::caller::Claims::new(
        "alice",
        CallerClassification::Administrator,
        "not-a-tenant",
    ));
    assert_eq!(harness.visible(&malformed).await, expected);

    // Explicit unauthenticated classification, under every configuration.
    for (config, installed) in toggle_matrix() {
        harness.set_policy(tenant, &config).await;
        harness.oracle.set_installed(tenant, installed);
        assert_eq!(
            harness
                .visible(&ctx(CallerClassification::Unauthenticated, tenant))
                .await,
            expected
        );
    }
}

#[tokio::test]
async fn test_agent_ceiling() {
    let harness = Harness::standard();
    let tenant = TenantId::new();

    let allowed: BTreeSet<String> = harness
        .catalog
        .all()
        .iter()
        .filter(|s| s.belongs_to(LoadoutId::Default) || s.belongs_to(LoadoutId::AgentTools))
        .map(|s| s.name.clone())
        .collect();

    let forbidden_only: BTreeSet<String> = harness
        .catalog
        .all()
        .iter()
        .filter(|s| !s.loadouts.iter().any(|l| l.is_agent_reachable()))
        .map(|s| s.name.clone())
        .collect();

    for (config, installed) in toggle_matrix() {
        harness.set_policy(tenant, &config).await;
        harness.oracle.set_installed(tenant, installed);

        let visible: BTreeSet<String> = harness
            .visible(&ctx(CallerClassification::Agent, tenant))
            .await
            .into_iter()
            .collect();
        assert!(visible.is_subset(&allowed));
        assert!(visible.is_disjoint(&forbidden_only));
        assert_eq!(visible.len() > 1, config.agent_tools.enabled);
    }
}

#[tokio::test]
async fn test_unconfigured_tenant_is_default_on_for_humans() {
    let harness = Harness::standard();
    let tenant = TenantId::new();

    let admin: BTreeSet<String> = harness
        .visible(&ctx(CallerClassification::Administrator, tenant))
        .await
        .into_iter()
        .collect();
    for loadout in [LoadoutId::Default, LoadoutId::DeveloperCore, LoadoutId::Query] {
        for name in names_in(&harness.catalog, loadout) {
            assert!(admin.contains(&name), "administrator missing {}", name);
        }
    }

    let user: BTreeSet<String> = harness
        .visible(&ctx(CallerClassification::User, tenant))
        .await
        .into_iter()
        .collect();
    for loadout in [LoadoutId::Default, LoadoutId::Query] {
        for name in names_in(&harness.catalog, loadout) {
            assert!(user.contains(&name), "user missing {}", name);
        }
    }

    // Agents are not defaulted on.
    assert_eq!(
        harness.visible(&ctx(CallerClassification::Agent, tenant)).await,
        vec![HEALTH_CAPABILITY.to_string()]
    );
}

#[tokio::test]
async fn test_sized_catalog_administrator_and_agent_scenario() {
    let harness = Harness::new(scenario_catalog());
    let tenant = TenantId::new();

    let mut config = TenantPolicyConfiguration::default();
    config.developer.add_query_tools = true;
    config.developer.add_ontology_maintenance = true;
    config.agent_tools.enabled = false;
    harness.set_policy(tenant, &config).await;

    let admin = harness
        .visible(&ctx(CallerClassification::Administrator, tenant))
        .await;
    assert!(admin.len() >= 35, "administrator saw {}", admin.len());
    assert!(admin.iter().all(|name| !name.starts_with("data_liaison_")));
    // Default + DeveloperCore + Query + OntologyMaintenance + OntologyQuestions
    assert_eq!(admin.len(), 1 + 2 + 19 + 22 + 5);

    assert_eq!(
        harness.visible(&ctx(CallerClassification::Agent, tenant)).await,
        vec!["health".to_string()]
    );
}

#[tokio::test]
async fn test_sized_catalog_user_scenario() {
    let harness = Harness::new(scenario_catalog());
    let tenant = TenantId::new();

    let mut config = TenantPolicyConfiguration::default();
    config.developer.add_query_tools = true;
    config.developer.add_ontology_maintenance = true;
    config.agent_tools.enabled = false;
    harness.set_policy(tenant, &config).await;

    let user: BTreeSet<String> = harness
        .visible(&ctx(CallerClassification::User, tenant))
        .await
        .into_iter()
        .collect();

    for name in names_in(&harness.catalog, LoadoutId::Query)
        .into_iter()
        .chain(names_in(&harness.catalog, LoadoutId::OntologyMaintenance))
    {
        assert!(user.contains(&name), "user missing {}", name);
    }
    for name in names_in(&harness.catalog, LoadoutId::DeveloperCore) {
        assert!(!user.contains(&name), "user sees developer capability {}", name);
    }
}

#[tokio::test]
async fn test_standard_catalog_user_excludes_developer_diagnostics() {
    let harness = Harness::standard();
    let tenant = TenantId::new();
    let user = harness.visible(&ctx(CallerClassification::User, tenant)).await;

    assert!(user.contains(&"execute_approved_query".to_string()));
    assert!(user.contains(&"update_column".to_string()));
    assert!(!user.contains(&"echo".to_string()));
    assert!(!user.contains(&"execute".to_string()));
}

#[tokio::test]
async fn test_discovery_preserves_catalog_order() {
    let harness = Harness::standard();
    let visible = harness
        .visible(&ctx(CallerClassification::Administrator, TenantId::new()))
        .await;

    let positions: Vec<usize> = visible
        .iter()
        .map(|name| {
            harness
                .catalog
                .all()
                .iter()
                .position(|s| &s.name == name)
                .unwrap()
        })
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));
}

#[tokio::test]
async fn test_configuration_change_visible_on_next_call() {
    let harness = Harness::standard();
    let tenant = TenantId::new();
    let agent = ctx(CallerClassification::Agent, tenant);

    assert!(matches!(
        harness.guard.authorize(&agent, "get_context").await,
        Err(AccessError::CapabilityNotEnabled { .. })
    ));

    let mut config = TenantPolicyConfiguration::default();
    config.agent_tools.enabled = true;
    harness.set_policy(tenant, &config).await;
    assert!(harness.guard.authorize(&agent, "get_context").await.is_ok());

    config.agent_tools.enabled = false;
    harness.set_policy(tenant, &config).await;
    assert!(harness.guard.authorize(&agent, "get_context").await.is_err());
}

#[tokio::test]
async fn test_data_liaison_follows_integration_presence() {
    let harness = Harness::standard();
    let tenant = TenantId::new();
    let user = ctx(CallerClassification::User, tenant);

    assert!(harness.guard.authorize(&user, "share_query_result").await.is_err());

    harness.oracle.set_installed(tenant, true);
    assert!(harness.guard.authorize(&user, "share_query_result").await.is_ok());

    let mut config = TenantPolicyConfiguration::default();
    config.data_liaison.enabled = false;
    harness.set_policy(tenant, &config).await;
    assert!(harness.guard.authorize(&user, "share_query_result").await.is_err());
}
