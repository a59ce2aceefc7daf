use crate::{error::Result, relationship::RelationshipManager};
use policy_engine::{merge_groups, ContextProperty, PolicyEngine, Verdict};
use relation_store::RelationStore;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

/// Service facade over the relationship manager and the policy engine
#[derive(Clone)]
pub struct AuthzService {
    manager: RelationshipManager,
    engine: PolicyEngine,
}

impl AuthzService {
    pub fn new(store: Arc<dyn RelationStore>) -> Self {
        Self {
            manager: RelationshipManager::new(store),
            engine: PolicyEngine::new(),
        }
    }

    /// The relationship consistency manager backing this service
    pub fn manager(&self) -> &RelationshipManager {
        &self.manager
    }

    /// Decide whether a subject is permitted under a named policy
    ///
    /// Resolves every group bound to the subject via contracts, merges their
    /// attribute lists in resolution order, loads the policy and evaluates
    /// its condition tree. Resolution and load failures surface to the
    /// caller; a successful evaluation is always `Permitted` or `Denied`.
    pub async fn authorize(
        &self,
        subject_id: Uuid,
        policy_id: Uuid,
        ctx: Option<&ContextProperty>,
    ) -> Result<Verdict> {
        let groups = self.manager.groups_by_subject(subject_id).await?;
        debug!(%subject_id, group_count = groups.len(), "resolved groups for subject");

        let merged = merge_groups(&groups);
        let policy = self.manager.get_policy(policy_id).await?;
        let verdict = self.engine.check(&policy, &merged, ctx)?;

        info!(%subject_id, %policy_id, %verdict, "authorization decided");
        Ok(verdict)
    }
}
