//! Role lookup

use shared::models::{AppRole, UserRoleRow, tables};

use super::RoleSource;
use crate::store::{DataStore, Query, decode};

/// Resolve the role of `user_id` from the role table
///
/// Never fails: errors, a missing row and unrecognized role text all fall back
/// to [`AppRole::User`] with [`RoleSource::Defaulted`].
pub async fn resolve_role(store: &dyn DataStore, user_id: &str) -> (AppRole, RoleSource) {
    let query = Query::new().eq("user_id", user_id);
    let row = match store.select_one(tables::USER_ROLES, &query).await {
        Ok(row) => row,
        Err(e) => {
            tracing::warn!(user_id, "role lookup failed, defaulting to user: {e}");
            return defaulted(format!("lookup failed: {e}"));
        }
    };

    let Some(row) = row else {
        tracing::debug!(user_id, "no role row, defaulting to user");
        return defaulted("no role row".into());
    };

    match decode::<UserRoleRow>(row) {
        Ok(row) => match row.parsed_role() {
            Some(role) => {
                tracing::debug!(user_id, %role, "role resolved");
                (role, RoleSource::Resolved)
            }
            None => {
                tracing::warn!(user_id, role = %row.role, "unknown role text, defaulting to user");
                defaulted(format!("unknown role '{}'", row.role))
            }
        },
        Err(e) => {
            tracing::warn!(user_id, "malformed role row, defaulting to user: {e}");
            defaulted(format!("malformed role row: {e}"))
        }
    }
}

fn defaulted(reason: String) -> (AppRole, RoleSource) {
    (AppRole::User, RoleSource::Defaulted { reason })
}
