// src/access/engine.rs

use thiserror::Error;

use crate::{
    access::{
        capabilities::MANAGING_ROLES,
        filter::{ListHints, ScopeFilter},
    },
    models::{
        access::{Deny, Identity, Operation, OwnerStamp, ResourceKind, Target},
        auth::Role,
    },
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ZoneListingError {
    #[error(transparent)]
    Denied(#[from] Deny),
    #[error("a zona é obrigatória")]
    MissingZone,
}

/// Filtro de listagem derivado do cargo. Nunca falha: um cargo sem
/// registros visíveis recebe um filtro que não casa com nada.
pub fn authorize_list(identity: &Identity, kind: ResourceKind, hints: &ListHints) -> ScopeFilter {
    let caps = kind.capabilities();
    if !caps.listable_roles.contains(&identity.role) {
        return ScopeFilter::nothing();
    }

    // Zona/filial enviadas pelo chamador só valem para o Owner
    let mut filter = ScopeFilter::everything();
    match identity.role {
        Role::Owner => {
            filter.zone = hints.zone.clone();
            filter.branch = hints.branch.clone();
        }
        Role::RegionalManager => {
            filter.zone = identity.zone.clone();
        }
        Role::Manager => {
            filter.zone = identity.zone.clone();
            filter.branch = identity.branch.clone();
        }
        role if role.is_field_staff() => {
            filter.owner = Some(identity.id);
        }
        _ => return ScopeFilter::nothing(),
    }

    match kind {
        ResourceKind::Account => {
            filter.roles = account_roles(identity.role, hints.role);
            filter.status = hints.status;
        }
        ResourceKind::Lead | ResourceKind::Job => {
            filter.owner_in = hints.owner_ids.clone();
            filter.next_visit = hints.visit_date_predicate();
            filter.visits = hints.visit_count_predicate();
        }
    }

    filter
}

// O filtro de cargo enviado só estreita o conjunto permitido, nunca amplia
fn account_roles(actor: Role, requested: Option<Role>) -> Option<Vec<Role>> {
    match (actor, requested) {
        (Role::Owner, requested) => requested.map(|role| vec![role]),
        (actor, Some(role)) => Some(
            actor.subordinates().iter().copied().filter(|r| *r == role).collect(),
        ),
        (actor, None) => Some(actor.subordinates().to_vec()),
    }
}

/// Listagem de contas de uma zona (sem Owners). O Owner escolhe a zona,
/// o Regional Manager fica preso à própria.
pub fn authorize_zone_listing(
    identity: &Identity,
    zone: Option<&str>,
) -> Result<ScopeFilter, ZoneListingError> {
    let zone = match identity.role {
        Role::Owner => zone.map(str::to_owned).ok_or(ZoneListingError::MissingZone)?,
        Role::RegionalManager => identity.zone.clone().ok_or(ZoneListingError::MissingZone)?,
        _ => return Err(Deny::role_forbidden().into()),
    };

    Ok(ScopeFilter {
        zone: Some(zone),
        roles: Some(Role::Owner.subordinates().iter().copied().filter(|r| *r != Role::Owner).collect()),
        ..ScopeFilter::everything()
    })
}

/// Decide update/delete/verify sobre um alvo já buscado.
///
/// Ordem das checagens: cargo permitido para a operação, alvo existente,
/// alvo dentro do escopo do chamador.
pub fn authorize_mutate(
    identity: &Identity,
    kind: ResourceKind,
    target: Option<Target<'_>>,
    operation: Operation,
) -> Result<(), Deny> {
    let caps = kind.capabilities();
    let role = identity.role;

    let permitted = match (kind, operation) {
        (ResourceKind::Account, Operation::Verify) => caps.verifiable && MANAGING_ROLES.contains(&role),
        (ResourceKind::Account, _) | (_, Operation::Verify) => false,
        (_, Operation::Update) => MANAGING_ROLES.contains(&role) || caps.creator_role == Some(role),
        (_, Operation::Delete) => MANAGING_ROLES.contains(&role),
    };
    if !permitted {
        return Err(Deny::role_forbidden());
    }

    let target = target.ok_or_else(Deny::not_found)?;
    if within_scope(identity, target) {
        Ok(())
    } else {
        Err(Deny::scope_mismatch())
    }
}

fn within_scope(identity: &Identity, target: Target<'_>) -> bool {
    let same_zone = target.zone().is_some() && target.zone() == identity.zone.as_deref();
    let same_branch = target.branch().is_some() && target.branch() == identity.branch.as_deref();

    let managed = |role: Role| identity.role.subordinates().contains(&role);

    match (identity.role, target) {
        (Role::Owner, _) => true,
        (Role::RegionalManager, Target::Record { .. }) => same_zone,
        (Role::RegionalManager, Target::Account { role, .. }) => same_zone && managed(role),
        (Role::Manager, Target::Record { .. }) => same_zone && same_branch,
        (Role::Manager, Target::Account { role, .. }) => same_zone && same_branch && managed(role),
        (_, Target::Record { added_by, .. }) => added_by == identity.id,
        (_, Target::Account { .. }) => false,
    }
}

/// Quem pode criar e com quais âncoras o novo registro nasce.
pub fn authorize_create(identity: &Identity, kind: ResourceKind) -> Result<OwnerStamp, Deny> {
    if let Some(creator) = kind.capabilities().creator_role {
        if creator != identity.role {
            return Err(Deny::role_forbidden());
        }
    }

    Ok(OwnerStamp {
        owner: identity.id,
        added_by: identity.id,
        zone: identity.zone.clone(),
        branch: identity.branch.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::filter::{VisitCountPredicate, VisitDatePredicate};
    use crate::models::access::DenyReason;
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn owner() -> Identity {
        Identity::new(Uuid::new_v4(), Role::Owner, None, None).unwrap()
    }

    fn regional(zone: &str) -> Identity {
        Identity::new(Uuid::new_v4(), Role::RegionalManager, Some(zone.into()), None).unwrap()
    }

    fn manager(zone: &str, branch: &str) -> Identity {
        Identity::new(Uuid::new_v4(), Role::Manager, Some(zone.into()), Some(branch.into())).unwrap()
    }

    fn field(role: Role, zone: &str, branch: &str) -> Identity {
        Identity::new(Uuid::new_v4(), role, Some(zone.into()), Some(branch.into())).unwrap()
    }

    fn record<'a>(added_by: Uuid, zone: &'a str, branch: &'a str) -> Target<'a> {
        Target::Record { added_by, zone: Some(zone), branch: Some(branch) }
    }

    fn account<'a>(role: Role, zone: &'a str, branch: &'a str) -> Target<'a> {
        Target::Account { role, zone: Some(zone), branch: Some(branch) }
    }

    fn reason(result: Result<(), Deny>) -> Option<DenyReason> {
        result.err().map(|deny| deny.reason)
    }

    fn hinted() -> ListHints {
        ListHints {
            zone: Some("Zone B".into()),
            branch: Some("Branch 9".into()),
            ..Default::default()
        }
    }

    // --- listagem ---

    #[test]
    fn field_staff_only_see_their_own_records() {
        for (role, kind) in [(Role::Salesman, ResourceKind::Lead), (Role::Technician, ResourceKind::Job)] {
            let me = field(role, "Zone A", "Branch 1");
            let filter = authorize_list(&me, kind, &hinted());

            assert_eq!(filter.owner, Some(me.id));
            assert_eq!(filter.zone, None);
            assert_eq!(filter.branch, None);
            assert!(!filter.match_nothing);
        }
    }

    #[test]
    fn manager_scope_ignores_caller_hints() {
        let me = manager("Zone A", "Branch 1");
        let filter = authorize_list(&me, ResourceKind::Lead, &hinted());

        assert_eq!(
            filter,
            ScopeFilter {
                zone: Some("Zone A".into()),
                branch: Some("Branch 1".into()),
                ..ScopeFilter::everything()
            }
        );
    }

    #[test]
    fn regional_manager_is_pinned_to_zone() {
        let me = regional("Zone A");
        let filter = authorize_list(&me, ResourceKind::Job, &hinted());

        assert_eq!(filter.zone.as_deref(), Some("Zone A"));
        assert_eq!(filter.branch, None);
    }

    #[test]
    fn owner_hints_are_honored_verbatim() {
        let filter = authorize_list(&owner(), ResourceKind::Lead, &hinted());

        assert_eq!(filter.zone.as_deref(), Some("Zone B"));
        assert_eq!(filter.branch.as_deref(), Some("Branch 9"));

        let unscoped = authorize_list(&owner(), ResourceKind::Lead, &ListHints::default());
        assert_eq!(unscoped, ScopeFilter::everything());
    }

    #[test]
    fn roles_outside_listable_set_match_nothing() {
        let salesman = field(Role::Salesman, "Zone A", "Branch 1");
        let technician = field(Role::Technician, "Zone A", "Branch 1");

        assert!(authorize_list(&salesman, ResourceKind::Job, &ListHints::default()).match_nothing);
        assert!(authorize_list(&technician, ResourceKind::Lead, &ListHints::default()).match_nothing);
        assert!(authorize_list(&technician, ResourceKind::Account, &ListHints::default()).match_nothing);
    }

    #[test]
    fn regional_manager_never_lists_owners() {
        let me = regional("Zone A");

        let filter = authorize_list(&me, ResourceKind::Account, &ListHints::default());
        let roles = filter.roles.unwrap();
        assert!(!roles.contains(&Role::Owner));
        assert!(!roles.contains(&Role::RegionalManager));

        // Pedir explicitamente por Owners resulta em conjunto vazio
        let hints = ListHints { role: Some(Role::Owner), ..Default::default() };
        let filter = authorize_list(&me, ResourceKind::Account, &hints);
        assert_eq!(filter.roles, Some(vec![]));
    }

    #[test]
    fn manager_account_listing_is_field_staff_in_branch() {
        let me = manager("Zone A", "Branch 1");
        let hints = ListHints { role: Some(Role::Technician), ..hinted() };
        let filter = authorize_list(&me, ResourceKind::Account, &hints);

        assert_eq!(filter.zone.as_deref(), Some("Zone A"));
        assert_eq!(filter.branch.as_deref(), Some("Branch 1"));
        assert_eq!(filter.roles, Some(vec![Role::Technician]));
    }

    #[test]
    fn owner_name_search_intersects_with_scope() {
        let me = field(Role::Salesman, "Zone A", "Branch 1");
        let hints = ListHints { owner_ids: Some(vec![]), ..Default::default() };
        let filter = authorize_list(&me, ResourceKind::Lead, &hints);

        assert_eq!(filter.owner, Some(me.id));
        assert_eq!(filter.owner_in, Some(vec![]));
    }

    #[test]
    fn visit_filters_apply_only_to_records() {
        let from = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
        let hints = ListHints {
            next_visit: Some(false),
            has_visit: Some(true),
            date_from: Some(from),
            ..Default::default()
        };

        let records = authorize_list(&owner(), ResourceKind::Lead, &hints);
        assert_eq!(records.next_visit, VisitDatePredicate::Between { from: Some(from), to: None });
        assert_eq!(records.visits, VisitCountPredicate::Positive);

        let accounts = authorize_list(&owner(), ResourceKind::Account, &hints);
        assert_eq!(accounts.next_visit, VisitDatePredicate::Any);
    }

    #[test]
    fn zone_listing_rules() {
        let filter = authorize_zone_listing(&regional("Zone A"), Some("Zone B")).unwrap();
        assert_eq!(filter.zone.as_deref(), Some("Zone A"));
        assert!(!filter.roles.unwrap().contains(&Role::Owner));

        let filter = authorize_zone_listing(&owner(), Some("Zone B")).unwrap();
        assert_eq!(filter.zone.as_deref(), Some("Zone B"));

        assert_eq!(authorize_zone_listing(&owner(), None), Err(ZoneListingError::MissingZone));
        assert_eq!(
            authorize_zone_listing(&manager("Zone A", "Branch 1"), Some("Zone A")),
            Err(ZoneListingError::Denied(Deny::role_forbidden()))
        );
    }

    // --- mutações ---

    #[test]
    fn field_staff_update_only_own_records() {
        let me = field(Role::Salesman, "Zone A", "Branch 1");
        let mine = record(me.id, "Zone A", "Branch 1");
        let theirs = record(Uuid::new_v4(), "Zone A", "Branch 1");

        assert_eq!(authorize_mutate(&me, ResourceKind::Lead, Some(mine), Operation::Update), Ok(()));
        assert_eq!(
            reason(authorize_mutate(&me, ResourceKind::Lead, Some(theirs), Operation::Update)),
            Some(DenyReason::ScopeMismatch)
        );
    }

    #[test]
    fn field_staff_cannot_touch_the_other_kind() {
        let me = field(Role::Salesman, "Zone A", "Branch 1");
        let mine = record(me.id, "Zone A", "Branch 1");

        assert_eq!(
            reason(authorize_mutate(&me, ResourceKind::Job, Some(mine), Operation::Update)),
            Some(DenyReason::RoleForbidden)
        );
    }

    #[test]
    fn manager_denied_outside_branch_even_in_same_zone() {
        let me = manager("Zone A", "Branch 1");
        let other_branch = record(Uuid::new_v4(), "Zone A", "Branch 2");

        for op in [Operation::Update, Operation::Delete] {
            for kind in [ResourceKind::Lead, ResourceKind::Job] {
                assert_eq!(
                    reason(authorize_mutate(&me, kind, Some(other_branch), op)),
                    Some(DenyReason::ScopeMismatch)
                );
            }
        }

        let same_branch = record(Uuid::new_v4(), "Zone A", "Branch 1");
        assert_eq!(authorize_mutate(&me, ResourceKind::Job, Some(same_branch), Operation::Delete), Ok(()));
    }

    #[test]
    fn regional_manager_mutates_whole_zone() {
        let me = regional("Zone A");
        let in_zone = record(Uuid::new_v4(), "Zone A", "Branch 7");
        let out_of_zone = record(Uuid::new_v4(), "Zone B", "Branch 1");

        assert_eq!(authorize_mutate(&me, ResourceKind::Lead, Some(in_zone), Operation::Delete), Ok(()));
        assert_eq!(
            reason(authorize_mutate(&me, ResourceKind::Lead, Some(out_of_zone), Operation::Update)),
            Some(DenyReason::ScopeMismatch)
        );
    }

    #[test]
    fn technician_can_never_delete() {
        let me = field(Role::Technician, "Zone A", "Branch 1");
        let mine = record(me.id, "Zone A", "Branch 1");

        assert_eq!(
            reason(authorize_mutate(&me, ResourceKind::Job, Some(mine), Operation::Delete)),
            Some(DenyReason::RoleForbidden)
        );
        // Mesmo com o alvo ausente, o cargo é checado primeiro
        assert_eq!(
            reason(authorize_mutate(&me, ResourceKind::Job, None, Operation::Delete)),
            Some(DenyReason::RoleForbidden)
        );
    }

    #[test]
    fn missing_target_is_not_found_before_scope() {
        let me = manager("Zone A", "Branch 1");
        assert_eq!(
            reason(authorize_mutate(&me, ResourceKind::Lead, None, Operation::Update)),
            Some(DenyReason::NotFound)
        );
    }

    #[test]
    fn owner_mutates_anything() {
        let me = owner();
        let anywhere = record(Uuid::new_v4(), "Zone Z", "Branch 9");
        assert_eq!(authorize_mutate(&me, ResourceKind::Lead, Some(anywhere), Operation::Update), Ok(()));
        assert_eq!(authorize_mutate(&me, ResourceKind::Job, Some(anywhere), Operation::Delete), Ok(()));
    }

    #[test]
    fn accounts_have_no_update_or_delete_contract() {
        let target = account(Role::Salesman, "Zone A", "Branch 1");
        assert_eq!(
            reason(authorize_mutate(&owner(), ResourceKind::Account, Some(target), Operation::Delete)),
            Some(DenyReason::RoleForbidden)
        );
        let lead = record(Uuid::new_v4(), "Zone A", "Branch 1");
        assert_eq!(
            reason(authorize_mutate(&owner(), ResourceKind::Lead, Some(lead), Operation::Verify)),
            Some(DenyReason::RoleForbidden)
        );
    }

    // --- verificação de contas ---

    #[test]
    fn manager_verifies_field_staff_in_branch() {
        let me = manager("Zone A", "Branch 1");
        let verify = |target| authorize_mutate(&me, ResourceKind::Account, Some(target), Operation::Verify);

        assert_eq!(verify(account(Role::Salesman, "Zone A", "Branch 1")), Ok(()));
        assert_eq!(verify(account(Role::Technician, "Zone A", "Branch 1")), Ok(()));
        assert_eq!(
            reason(verify(account(Role::Manager, "Zone A", "Branch 1"))),
            Some(DenyReason::ScopeMismatch)
        );
        assert_eq!(
            reason(verify(account(Role::Salesman, "Zone A", "Branch 2"))),
            Some(DenyReason::ScopeMismatch)
        );
    }

    #[test]
    fn regional_manager_verifies_managers_in_zone() {
        let me = regional("Zone A");
        let verify = |target| authorize_mutate(&me, ResourceKind::Account, Some(target), Operation::Verify);

        assert_eq!(verify(account(Role::Manager, "Zone A", "Branch 3")), Ok(()));
        assert_eq!(
            reason(verify(account(Role::RegionalManager, "Zone A", "Branch 3"))),
            Some(DenyReason::ScopeMismatch)
        );
        assert_eq!(
            reason(verify(account(Role::Manager, "Zone B", "Branch 3"))),
            Some(DenyReason::ScopeMismatch)
        );
    }

    #[test]
    fn field_staff_cannot_verify() {
        let me = field(Role::Salesman, "Zone A", "Branch 1");
        let target = account(Role::Salesman, "Zone A", "Branch 1");
        assert_eq!(
            reason(authorize_mutate(&me, ResourceKind::Account, Some(target), Operation::Verify)),
            Some(DenyReason::RoleForbidden)
        );
    }

    // --- criação ---

    #[test]
    fn only_creator_role_may_create() {
        assert_eq!(
            authorize_create(&owner(), ResourceKind::Lead).map_err(|d| d.reason),
            Err(DenyReason::RoleForbidden)
        );
        let technician = field(Role::Technician, "Zone A", "Branch 1");
        assert!(authorize_create(&technician, ResourceKind::Lead).is_err());
        assert!(authorize_create(&technician, ResourceKind::Job).is_ok());
    }

    #[test]
    fn stamp_comes_from_identity() {
        let me = field(Role::Salesman, "Zone A", "Branch 1");
        let stamp = authorize_create(&me, ResourceKind::Lead).unwrap();

        assert_eq!(
            stamp,
            OwnerStamp {
                owner: me.id,
                added_by: me.id,
                zone: Some("Zone A".into()),
                branch: Some("Branch 1".into()),
            }
        );
    }

    #[test]
    fn account_creation_is_unrestricted() {
        let me = field(Role::Technician, "Zone A", "Branch 1");
        assert!(authorize_create(&me, ResourceKind::Account).is_ok());
    }
}
