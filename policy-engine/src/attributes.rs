use crate::models::{Attribute, Group};
use std::collections::HashMap;

/// Key/value lookup projected from a group's attribute list
///
/// The attribute list may carry duplicate keys; projection collapses them
/// with last-write-wins by list order. When the list is the concatenation
/// produced by [`merge_groups`], a later group's value for a conflicting key
/// therefore overrides an earlier group's.
#[derive(Debug, Clone, Default)]
pub struct EffectiveAttributes {
    map: HashMap<String, String>,
}

impl EffectiveAttributes {
    pub fn from_group(group: &Group) -> Self {
        let mut map = HashMap::with_capacity(group.attributes.len());
        for Attribute { key, value } in &group.attributes {
            map.insert(key.clone(), value.clone());
        }
        Self { map }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.map.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// Merge all groups bound to a subject into one synthetic group
///
/// Attribute lists are concatenated in resolution order; deduplication is
/// deferred to [`EffectiveAttributes::from_group`]. The synthetic group has
/// no identifier.
pub fn merge_groups(groups: &[Group]) -> Group {
    let mut attributes = Vec::with_capacity(groups.iter().map(|g| g.attributes.len()).sum());
    for group in groups {
        attributes.extend(group.attributes.iter().cloned());
    }
    Group {
        id: None,
        attributes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_concatenates_in_order() {
        let a = Group::with_attributes(vec![
            Attribute::new("role", "admin"),
            Attribute::new("tier", "gold"),
        ]);
        let b = Group::with_attributes(vec![Attribute::new("region", "eu")]);

        let merged = merge_groups(&[a, b]);
        assert_eq!(merged.id, None);
        assert_eq!(merged.attributes.len(), 3);
        assert_eq!(merged.attributes[0].key, "role");
        assert_eq!(merged.attributes[2].key, "region");
    }

    #[test]
    fn test_projection_is_last_write_wins() {
        let first = Group::with_attributes(vec![Attribute::new("tier", "silver")]);
        let second = Group::with_attributes(vec![Attribute::new("tier", "gold")]);

        let merged = merge_groups(&[first.clone(), second.clone()]);
        let attrs = EffectiveAttributes::from_group(&merged);
        assert_eq!(attrs.get("tier"), Some("gold"));

        // merge order is observable for conflicting keys
        let merged = merge_groups(&[second, first]);
        let attrs = EffectiveAttributes::from_group(&merged);
        assert_eq!(attrs.get("tier"), Some("silver"));
    }

    #[test]
    fn test_merge_of_nothing_is_empty() {
        let merged = merge_groups(&[]);
        assert!(merged.attributes.is_empty());
        assert!(EffectiveAttributes::from_group(&merged).is_empty());
    }
}
