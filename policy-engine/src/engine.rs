use crate::{
    attributes::EffectiveAttributes,
    error::{PolicyError, Result},
    models::{Condition, ContextProperty, Group, Policy, Verdict},
};
use tracing::debug;

/// Recursive-descent evaluator for policy condition trees
///
/// The engine is stateless and side-effect-free; concurrent checks of
/// independent policy/group pairs need no coordination.
#[derive(Debug, Clone, Copy, Default)]
pub struct PolicyEngine;

impl PolicyEngine {
    pub fn new() -> Self {
        Self
    }

    /// Evaluate a policy against a subject's merged group
    ///
    /// The group is projected into an effective attribute lookup
    /// (last-write-wins for duplicate keys) before recursion begins at the
    /// policy's root condition.
    ///
    /// # Errors
    ///
    /// Fails with [`PolicyError::MalformedPolicy`] when the policy carries no
    /// condition, or when a negation node carries no inner condition.
    pub fn check(
        &self,
        policy: &Policy,
        group: &Group,
        ctx: Option<&ContextProperty>,
    ) -> Result<Verdict> {
        let condition = policy.condition.as_ref().ok_or_else(|| {
            PolicyError::MalformedPolicy(format!(
                "no condition for policy {}",
                policy
                    .id
                    .map(|id| id.to_string())
                    .unwrap_or_else(|| "<unassigned>".to_string())
            ))
        })?;

        let attributes = EffectiveAttributes::from_group(group);
        self.evaluate(condition, &attributes, ctx)
    }

    fn evaluate(
        &self,
        condition: &Condition,
        attributes: &EffectiveAttributes,
        ctx: Option<&ContextProperty>,
    ) -> Result<Verdict> {
        let verdict = match condition {
            Condition::HasAttribute { keys } => {
                if keys.iter().all(|key| attributes.contains_key(key)) {
                    Verdict::Permitted
                } else {
                    Verdict::Denied
                }
            }
            Condition::EvaluateAttribute { key, op, value } => match attributes.get(key) {
                // absent attribute can never satisfy an operator
                None => Verdict::Denied,
                Some(attribute) => {
                    if op.holds(attribute, value) {
                        Verdict::Permitted
                    } else {
                        Verdict::Denied
                    }
                }
            },
            Condition::Negation { condition } => {
                let inner = condition.as_deref().ok_or_else(|| {
                    PolicyError::MalformedPolicy("negation has no inner condition".to_string())
                })?;
                self.evaluate(inner, attributes, ctx)?.negate()
            }
            Condition::And { conditions } => {
                let mut verdict = Verdict::Permitted;
                for inner in conditions {
                    if self.evaluate(inner, attributes, ctx)? == Verdict::Denied {
                        verdict = Verdict::Denied;
                        break;
                    }
                }
                verdict
            }
            Condition::Or { conditions } => {
                let mut verdict = Verdict::Denied;
                for inner in conditions {
                    if self.evaluate(inner, attributes, ctx)? == Verdict::Permitted {
                        verdict = Verdict::Permitted;
                        break;
                    }
                }
                verdict
            }
        };

        debug!(?verdict, "evaluated policy condition");
        Ok(verdict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Attribute, Operation};

    fn admin_group() -> Group {
        Group::with_attributes(vec![Attribute::new("role", "admin")])
    }

    fn check(condition: Condition, group: &Group) -> Result<Verdict> {
        PolicyEngine::new().check(&Policy::with_condition(condition), group, None)
    }

    /// A node that is guaranteed to fail evaluation
    fn erroring_condition() -> Condition {
        Condition::Negation { condition: None }
    }

    #[test]
    fn test_has_attribute() {
        let group = admin_group();
        let verdict = check(Condition::has_attribute(["role"]), &group).unwrap();
        assert_eq!(verdict, Verdict::Permitted);

        let verdict = check(Condition::has_attribute(["role", "region"]), &group).unwrap();
        assert_eq!(verdict, Verdict::Denied, "region is missing");
    }

    #[test]
    fn test_evaluate_attribute_operators() {
        let group = Group::with_attributes(vec![Attribute::new("level", "5")]);

        let verdict = check(
            Condition::evaluate_attribute("level", Operation::Gte, "3"),
            &group,
        )
        .unwrap();
        assert_eq!(verdict, Verdict::Permitted);

        let verdict = check(
            Condition::evaluate_attribute("level", Operation::Lt, "3"),
            &group,
        )
        .unwrap();
        assert_eq!(verdict, Verdict::Denied);

        // an absent attribute denies under any operator
        let verdict = check(
            Condition::evaluate_attribute("missing", Operation::Eq, "x"),
            &group,
        )
        .unwrap();
        assert_eq!(verdict, Verdict::Denied);
    }

    #[test]
    fn test_negation_flips_denied_to_permitted() {
        let group = admin_group();
        let verdict = check(
            Condition::negation(Condition::has_attribute(["missing"])),
            &group,
        )
        .unwrap();
        assert_eq!(verdict, Verdict::Permitted);
    }

    #[test]
    fn test_and_short_circuits_before_erroring_child() {
        let group = admin_group();
        let condition = Condition::and(vec![
            Condition::has_attribute(["missing"]),
            erroring_condition(),
        ]);
        let verdict = check(condition, &group).unwrap();
        assert_eq!(verdict, Verdict::Denied);
    }

    #[test]
    fn test_or_short_circuits_before_erroring_child() {
        let group = admin_group();
        let condition = Condition::or(vec![
            Condition::has_attribute(["role"]),
            erroring_condition(),
        ]);
        let verdict = check(condition, &group).unwrap();
        assert_eq!(verdict, Verdict::Permitted);
    }

    #[test]
    fn test_or_denies_when_every_child_denies() {
        let group = admin_group();
        let condition = Condition::or(vec![
            Condition::has_attribute(["missing"]),
            Condition::evaluate_attribute("role", Operation::Eq, "viewer"),
        ]);
        let verdict = check(condition, &group).unwrap();
        assert_eq!(verdict, Verdict::Denied);
    }

    #[test]
    fn test_empty_children() {
        let group = admin_group();
        assert_eq!(
            check(Condition::and(vec![]), &group).unwrap(),
            Verdict::Permitted
        );
        assert_eq!(
            check(Condition::or(vec![]), &group).unwrap(),
            Verdict::Denied
        );
    }

    #[test]
    fn test_policy_without_condition_is_malformed() {
        let policy = Policy {
            id: Some(uuid::Uuid::new_v4()),
            condition: None,
        };
        let err = PolicyEngine::new()
            .check(&policy, &admin_group(), None)
            .unwrap_err();
        assert!(matches!(err, PolicyError::MalformedPolicy(_)));
    }

    #[test]
    fn test_negation_without_inner_is_malformed() {
        let err = check(erroring_condition(), &admin_group()).unwrap_err();
        assert!(matches!(err, PolicyError::MalformedPolicy(_)));
    }

    #[test]
    fn test_nested_tree() {
        let group = Group::with_attributes(vec![
            Attribute::new("role", "admin"),
            Attribute::new("region", "us-west-2"),
        ]);
        let condition = Condition::and(vec![
            Condition::has_attribute(["role", "region"]),
            Condition::or(vec![
                Condition::evaluate_attribute("region", Operation::Contains, "eu"),
                Condition::evaluate_attribute("role", Operation::Eq, "admin"),
            ]),
        ]);
        let verdict = check(condition, &group).unwrap();
        assert_eq!(verdict, Verdict::Permitted);
    }
}
