//! Role-derived permissions per resource.
//!
//! Nothing here is cached: views call [`capabilities_for`] with the identity
//! they hold at render time, so a role change is reflected immediately.

use crate::types::{Identity, Role};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Users,
    Customers,
    Products,
    Orders,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 4] = [
        ResourceKind::Users,
        ResourceKind::Customers,
        ResourceKind::Products,
        ResourceKind::Orders,
    ];

    /// Collection path under the API base URL
    pub fn path(&self) -> &'static str {
        match self {
            ResourceKind::Users => "/users",
            ResourceKind::Customers => "/customers",
            ResourceKind::Products => "/products",
            ResourceKind::Orders => "/orders",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ResourceKind::Users => "users",
            ResourceKind::Customers => "customers",
            ResourceKind::Products => "products",
            ResourceKind::Orders => "orders",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    pub create: bool,
    pub edit: bool,
    pub delete: bool,
}

impl Capabilities {
    pub const NONE: Capabilities = Capabilities {
        create: false,
        edit: false,
        delete: false,
    };

    pub const ALL: Capabilities = Capabilities {
        create: true,
        edit: true,
        delete: true,
    };

    pub fn is_read_only(&self) -> bool {
        *self == Capabilities::NONE
    }
}

pub fn capabilities(role: Role, resource: ResourceKind) -> Capabilities {
    match (role, resource) {
        (Role::Admin, _) => Capabilities::ALL,
        (Role::Editor, ResourceKind::Users) => Capabilities::NONE,
        (Role::Editor, _) => Capabilities {
            create: true,
            edit: true,
            delete: false,
        },
        (Role::Viewer, _) => Capabilities::NONE,
    }
}

/// Capabilities of whoever is signed in; an anonymous caller gets none.
pub fn capabilities_for(identity: Option<&Identity>, resource: ResourceKind) -> Capabilities {
    identity
        .map(|identity| capabilities(identity.role, resource))
        .unwrap_or(Capabilities::NONE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_can_do_everything_everywhere() {
        for resource in ResourceKind::ALL {
            assert_eq!(capabilities(Role::Admin, resource), Capabilities::ALL);
        }
    }

    #[test]
    fn editor_creates_and_edits_but_never_deletes() {
        for resource in [ResourceKind::Customers, ResourceKind::Products, ResourceKind::Orders] {
            let caps = capabilities(Role::Editor, resource);
            assert!(caps.create && caps.edit, "{:?}", resource);
            assert!(!caps.delete, "{:?}", resource);
        }
        assert!(capabilities(Role::Editor, ResourceKind::Users).is_read_only());
    }

    #[test]
    fn viewer_is_read_only() {
        for resource in ResourceKind::ALL {
            assert!(capabilities(Role::Viewer, resource).is_read_only());
        }
    }

    #[test]
    fn mask_is_a_pure_function_of_role() {
        for role in Role::ALL {
            for resource in ResourceKind::ALL {
                assert_eq!(capabilities(role, resource), capabilities(role, resource));
            }
        }
    }

    #[test]
    fn anonymous_caller_has_no_capabilities() {
        assert_eq!(capabilities_for(None, ResourceKind::Products), Capabilities::NONE);
    }
}
