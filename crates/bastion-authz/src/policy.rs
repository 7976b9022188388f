//! Access policy evaluation.
//!
//! Every function here is pure and fails closed: anything that cannot
//! positively confirm a grant denies. Administrator bypass is applied by
//! callers through [`Role::is_admin`] or `RestrictedRequestContext::is_admin`,
//! except where a function receives the full context and checks it itself.

use bastion_core::{
    Authorization, Authorizations, Endpoint, EndpointGroup, EndpointId, Registry,
    ResourceControl, RestrictedRequestContext, Role, TeamAccessPolicies, TeamId, TeamMembership,
    User, UserAccessPolicies, UserId,
};
use http::Method;
use tracing::debug;

use crate::operation::classify;

/// A request to run one API operation with a given authorization set.
#[derive(Debug, Clone, Copy)]
pub struct ApiOperationAuthorizationRequest<'a> {
    /// Request path, possibly with a query string.
    pub path: &'a str,
    /// Request method.
    pub method: &'a Method,
    /// Authorizations held by the caller.
    pub authorizations: &'a Authorizations,
}

/// Whether the classified operation is in the request's authorization set.
///
/// Undefined operations are always refused, even if a set was persisted
/// with a sentinel in it.
pub fn authorized_operation(request: &ApiOperationAuthorizationRequest<'_>) -> bool {
    let operation = classify(request.path, request.method);
    let granted = !operation.is_undefined() && request.authorizations.contains(&operation);
    debug!(
        authorization = %operation,
        http.method = %request.method,
        http.path = request.path,
        granted,
        "Evaluated API operation"
    );
    granted
}

/// Whether the user, or one of their teams, appears in the policies.
pub fn authorized_access(
    user_id: UserId,
    memberships: &[TeamMembership],
    user_policies: &UserAccessPolicies,
    team_policies: &TeamAccessPolicies,
) -> bool {
    user_policies.contains_key(&user_id)
        || memberships
            .iter()
            .any(|m| team_policies.contains_key(&m.team_id))
}

/// Whether the user has access through the environment group's policies.
pub fn authorized_endpoint_group_access(
    group: &EndpointGroup,
    user_id: UserId,
    memberships: &[TeamMembership],
) -> bool {
    authorized_access(
        user_id,
        memberships,
        &group.user_access_policies,
        &group.team_access_policies,
    )
}

/// Whether the user has access to an environment.
///
/// The group's policies are checked first; the environment's own policies
/// are the fallback. Either one granting is enough.
pub fn authorized_endpoint_access(
    endpoint: &Endpoint,
    group: &EndpointGroup,
    user_id: UserId,
    memberships: &[TeamMembership],
) -> bool {
    authorized_endpoint_group_access(group, user_id, memberships)
        || authorized_access(
            user_id,
            memberships,
            &endpoint.user_access_policies,
            &endpoint.team_access_policies,
        )
}

/// Whether the caller may read a resource.
pub fn authorized_resource_control_access(
    rc: &ResourceControl,
    ctx: &RestrictedRequestContext,
) -> bool {
    if ctx.is_admin || rc.public {
        return true;
    }
    rc.team_accesses.iter().any(|t| ctx.is_member_of(t.team_id))
        || rc.user_accesses.iter().any(|u| u.user_id == ctx.user_id)
}

/// Whether the caller may modify a resource control.
///
/// Stricter than read access: a non-admin may only update a record with a
/// single unambiguous owner, either exactly one user or teams alone.
pub fn authorized_resource_control_update(
    rc: &ResourceControl,
    ctx: &RestrictedRequestContext,
) -> bool {
    if ctx.is_admin || rc.public {
        return true;
    }
    if rc.administrators_only {
        return false;
    }

    let users = rc.user_accesses.len();
    let teams = rc.team_accesses.len();
    if users == 0 && teams == 0 {
        return false;
    }
    if users > 1 || (users == 1 && teams == 1) {
        return false;
    }
    if users == 1 && rc.user_accesses[0].user_id == ctx.user_id {
        return true;
    }
    rc.team_accesses.iter().any(|t| ctx.is_member_of(t.team_id))
}

/// Whether the caller may manage a team (admin or leader of that team).
pub fn authorized_team_management(team_id: TeamId, ctx: &RestrictedRequestContext) -> bool {
    ctx.is_admin || ctx.leads(team_id)
}

/// Whether the caller leads at least one team.
pub fn authorized_team_leader(ctx: &RestrictedRequestContext) -> bool {
    ctx.is_admin || ctx.is_team_leader
}

/// Whether the caller may manage a user account (admin or self).
pub fn authorized_user_management(user_id: UserId, ctx: &RestrictedRequestContext) -> bool {
    ctx.is_admin || ctx.user_id == user_id
}

/// Whether the user may use a registry from an environment.
pub fn authorized_registry_access(
    registry: &Registry,
    user: &User,
    memberships: &[TeamMembership],
    endpoint_id: EndpointId,
) -> bool {
    if user.role.is_admin() {
        return true;
    }
    if user
        .endpoint_authorizations
        .get(&endpoint_id)
        .is_some_and(|set| set.contains(&Authorization::EndpointResourcesAccess))
    {
        return true;
    }
    registry
        .registry_accesses
        .get(&endpoint_id)
        .is_some_and(|policies| {
            authorized_access(
                user.id,
                memberships,
                &policies.user_access_policies,
                &policies.team_access_policies,
            )
        })
}

/// Finds the resource control protecting `resource_id`, either directly or
/// as one of its sub-resources.
pub fn find_resource_control<'a>(
    resource_id: &str,
    controls: &'a [ResourceControl],
) -> Option<&'a ResourceControl> {
    controls
        .iter()
        .find(|rc| rc.resource_id == resource_id)
        .or_else(|| {
            controls
                .iter()
                .find(|rc| rc.sub_resource_ids.iter().any(|id| id == resource_id))
        })
}

/// Shared administrator guard.
#[must_use]
pub const fn bypasses_authorization(role: Role) -> bool {
    role.is_admin()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bastion_core::fixtures::{self, any_policy};
    use bastion_core::{MembershipRole, ResourceControlType};

    fn ctx(user: u32, teams: &[(u32, MembershipRole)]) -> RestrictedRequestContext {
        RestrictedRequestContext::member(
            UserId(user),
            teams
                .iter()
                .map(|(team, role)| fixtures::membership(user, *team, *role))
                .collect(),
        )
    }

    fn rc() -> ResourceControl {
        ResourceControl::new("c1", ResourceControlType::Container)
    }

    #[test]
    fn test_authorized_operation() {
        let set: Authorizations = [Authorization::PortainerEndpointList].into();
        let allowed = ApiOperationAuthorizationRequest {
            path: "/endpoints",
            method: &Method::GET,
            authorizations: &set,
        };
        assert!(authorized_operation(&allowed));

        let denied = ApiOperationAuthorizationRequest {
            path: "/endpoints",
            method: &Method::POST,
            authorizations: &set,
        };
        assert!(!authorized_operation(&denied));
    }

    #[test]
    fn test_sentinel_in_granted_set_is_still_refused() {
        let set: Authorizations = [Authorization::PortainerUndefined].into();
        let request = ApiOperationAuthorizationRequest {
            path: "/no/such/route",
            method: &Method::GET,
            authorizations: &set,
        };
        assert!(!authorized_operation(&request));
    }

    #[test]
    fn test_authorized_access_user_or_team() {
        let mut users = UserAccessPolicies::new();
        let mut teams = TeamAccessPolicies::new();
        assert!(!authorized_access(UserId(1), &[], &users, &teams));

        users.insert(UserId(1), any_policy());
        assert!(authorized_access(UserId(1), &[], &users, &teams));

        let memberships = [fixtures::membership(2, 7, MembershipRole::Member)];
        assert!(!authorized_access(UserId(2), &memberships, &users, &teams));
        teams.insert(TeamId(7), any_policy());
        assert!(authorized_access(UserId(2), &memberships, &users, &teams));
    }

    #[test]
    fn test_endpoint_access_group_or_endpoint() {
        let mut endpoint = fixtures::docker_endpoint(1);
        let mut group = fixtures::unassigned_group();
        assert!(!authorized_endpoint_access(&endpoint, &group, UserId(3), &[]));

        group.user_access_policies.insert(UserId(3), any_policy());
        assert!(authorized_endpoint_access(&endpoint, &group, UserId(3), &[]));

        group.user_access_policies.clear();
        endpoint.user_access_policies.insert(UserId(3), any_policy());
        assert!(authorized_endpoint_access(&endpoint, &group, UserId(3), &[]));
    }

    #[test]
    fn test_resource_control_access() {
        let admin = RestrictedRequestContext::admin(UserId(1));
        assert!(authorized_resource_control_access(&rc(), &admin));
        assert!(authorized_resource_control_access(&rc().public(), &ctx(9, &[])));
        assert!(!authorized_resource_control_access(&rc(), &ctx(9, &[])));
        assert!(authorized_resource_control_access(&rc().with_user(9), &ctx(9, &[])));
        assert!(authorized_resource_control_access(
            &rc().with_team(4),
            &ctx(9, &[(4, MembershipRole::Member)])
        ));
    }

    #[test]
    fn test_resource_control_update_rules() {
        let owner = ctx(7, &[]);
        let other = ctx(8, &[]);

        assert!(!authorized_resource_control_update(&rc(), &owner));
        assert!(authorized_resource_control_update(&rc().with_user(7), &owner));
        assert!(!authorized_resource_control_update(&rc().with_user(7), &other));
        assert!(!authorized_resource_control_update(
            &rc().with_user(7).with_user(8),
            &owner
        ));
        assert!(!authorized_resource_control_update(
            &rc().with_user(7).with_team(1),
            &ctx(7, &[(1, MembershipRole::Member)])
        ));
        assert!(!authorized_resource_control_update(
            &rc().with_user(7).administrators_only(),
            &owner
        ));
        assert!(authorized_resource_control_update(
            &rc().with_team(1).with_team(2),
            &ctx(8, &[(2, MembershipRole::Member)])
        ));
        assert!(authorized_resource_control_update(
            &rc().administrators_only(),
            &RestrictedRequestContext::admin(UserId(1))
        ));
    }

    #[test]
    fn test_team_and_user_management() {
        let leader = ctx(5, &[(3, MembershipRole::Leader), (4, MembershipRole::Member)]);
        assert!(authorized_team_management(TeamId(3), &leader));
        assert!(!authorized_team_management(TeamId(4), &leader));
        assert!(authorized_team_leader(&leader));
        assert!(!authorized_team_leader(&ctx(6, &[(4, MembershipRole::Member)])));

        assert!(authorized_user_management(UserId(5), &leader));
        assert!(!authorized_user_management(UserId(6), &leader));
    }

    #[test]
    fn test_registry_access() {
        let mut registry = Registry {
            id: bastion_core::RegistryId(1),
            name: "hub".into(),
            registry_accesses: Default::default(),
        };
        let user = fixtures::standard_user(4, []);
        assert!(!authorized_registry_access(&registry, &user, &[], EndpointId(1)));

        let resources = user
            .clone()
            .with_endpoint_authorizations(EndpointId(1), [Authorization::EndpointResourcesAccess]);
        assert!(authorized_registry_access(&registry, &resources, &[], EndpointId(1)));
        assert!(!authorized_registry_access(&registry, &resources, &[], EndpointId(2)));

        registry
            .registry_accesses
            .entry(EndpointId(2))
            .or_default()
            .user_access_policies
            .insert(UserId(4), any_policy());
        assert!(authorized_registry_access(&registry, &user, &[], EndpointId(2)));
        assert!(authorized_registry_access(
            &registry,
            &fixtures::admin_user(1),
            &[],
            EndpointId(9)
        ));
    }

    #[test]
    fn test_find_resource_control_by_sub_resource() {
        let mut stack = ResourceControl::new("stack-1", ResourceControlType::Stack);
        stack.sub_resource_ids = vec!["svc-a".into(), "svc-b".into()];
        let controls = vec![rc(), stack];

        assert_eq!(
            find_resource_control("c1", &controls).map(|rc| rc.resource_id.as_str()),
            Some("c1")
        );
        assert_eq!(
            find_resource_control("svc-b", &controls).map(|rc| rc.resource_id.as_str()),
            Some("stack-1")
        );
        assert!(find_resource_control("zzz", &controls).is_none());
    }
}
