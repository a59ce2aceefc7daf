use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

pub use policy_engine::{Attribute, Group, Policy};

/// A principal that can be granted access
///
/// Multiple subjects may share a `user_id`; a user can own several subjects.
/// `id` is `None` until the store assigns one on put.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub id: Option<Uuid>,
    pub user_id: String,
}

impl Subject {
    pub fn new(user_id: &str) -> Self {
        Self {
            id: None,
            user_id: user_id.to_string(),
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.id {
            Some(id) => write!(f, "subject:{}({})", id, self.user_id),
            None => write!(f, "subject:<unassigned>({})", self.user_id),
        }
    }
}

/// The join record binding one subject to one group
///
/// At most one live contract exists per (subject_id, group_id) pair; the
/// contracts table enforces this with a unique constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Contract {
    pub id: Uuid,
    pub subject_id: Uuid,
    pub group_id: Uuid,
}

impl fmt::Display for Contract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "contract:{}({}->{})", self.id, self.subject_id, self.group_id)
    }
}
