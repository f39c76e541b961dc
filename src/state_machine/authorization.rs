//! Role, ownership and capability checks for lifecycle operations.
//!
//! Every permission decision goes through [`authorize`]; the registry supplies the
//! permissions an edge accepts and the entity supplies who owns it.

use super::entity::Ownership;
use super::registry::Permission;
use crate::models::{Actor, Role};

/// Check whether `actor` satisfies at least one of `permitted` for an entity.
pub fn authorize(actor: &Actor, permitted: &[Permission], ownership: &Ownership<'_>) -> bool {
    permitted
        .iter()
        .any(|permission| satisfies(actor, *permission, ownership))
}

fn satisfies(actor: &Actor, permission: Permission, ownership: &Ownership<'_>) -> bool {
    match permission {
        Permission::Owner => actor.role == Role::Student && ownership.owner_id == actor.id,
        Permission::AssignedVa => {
            actor.role == Role::Va && ownership.assigned_va_id == Some(actor.id.as_str())
        }
        Permission::AnyVa => actor.role == Role::Va,
        Permission::AssignedPrintCenter => {
            actor.role == Role::PrintCenter
                && ownership.print_center_id == Some(actor.id.as_str())
        }
        Permission::Admin(capability) => actor.has_capability(capability),
        Permission::System => actor.role == Role::System,
    }
}
