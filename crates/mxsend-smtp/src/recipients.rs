//! Grouping recipients by destination domain.
//!
//! Each group is delivered over its own connection with its own
//! MAIL/RCPT/DATA sequence.

use std::collections::{HashMap, HashSet};

use crate::error::Result;
use crate::types::Address;

/// Recipients that share a destination domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipientGroup {
    /// Destination domain.
    pub domain: String,
    /// Unique recipients, in first-seen order.
    pub recipients: Vec<Address>,
}

impl RecipientGroup {
    /// Returns the recipient addresses as strings.
    pub fn addresses(&self) -> impl Iterator<Item = &str> {
        self.recipients.iter().map(Address::as_str)
    }
}

/// Deduplicates `addresses` and partitions them by domain.
///
/// Groups appear in the order their domain was first seen; recipients keep
/// their first-seen order within a group. Exact duplicates are dropped.
///
/// # Errors
///
/// Returns [`crate::Error::InvalidAddress`] for the first address that does
/// not parse.
pub fn group_by_domain<I, S>(addresses: I) -> Result<Vec<RecipientGroup>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen: HashSet<Address> = HashSet::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<RecipientGroup> = Vec::new();

    for raw in addresses {
        let address = Address::new(raw.as_ref())?;
        if !seen.insert(address.clone()) {
            continue;
        }

        let slot = *index.entry(address.domain().to_string()).or_insert_with(|| {
            groups.push(RecipientGroup {
                domain: address.domain().to_string(),
                recipients: Vec::new(),
            });
            groups.len() - 1
        });
        groups[slot].recipients.push(address);
    }

    Ok(groups)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::Error;
    use proptest::prelude::*;

    fn flatten(groups: &[RecipientGroup]) -> Vec<(&str, Vec<&str>)> {
        groups
            .iter()
            .map(|g| (g.domain.as_str(), g.addresses().collect()))
            .collect()
    }

    #[test]
    fn test_groups_and_dedups() {
        let groups = group_by_domain(["a@x", "b@y", "a@x", "c@x"]).unwrap();
        assert_eq!(
            flatten(&groups),
            vec![("x", vec!["a@x", "c@x"]), ("y", vec!["b@y"])]
        );
    }

    #[test]
    fn test_empty_input() {
        assert!(group_by_domain(Vec::<String>::new()).unwrap().is_empty());
    }

    #[test]
    fn test_missing_at_fails() {
        let err = group_by_domain(["a@x", "nobody"]).unwrap_err();
        assert!(matches!(err, Error::InvalidAddress(_)));
    }

    #[test]
    fn test_domain_after_first_at() {
        let groups = group_by_domain(["u@mail@x", "v@x"]).unwrap();
        assert_eq!(
            flatten(&groups),
            vec![("mail@x", vec!["u@mail@x"]), ("x", vec!["v@x"])]
        );
    }

    #[test]
    fn test_whitespace_variants_are_duplicates() {
        let groups = group_by_domain(["a@x", " a@x "]).unwrap();
        assert_eq!(groups[0].recipients.len(), 1);
    }

    proptest! {
        #[test]
        fn groups_partition_the_deduplicated_input(
            input in proptest::collection::vec(("[a-d]{1,2}", "[x-z]"), 0..40)
        ) {
            let addresses: Vec<String> = input
                .iter()
                .map(|(local, domain)| format!("{local}@{domain}"))
                .collect();
            let groups = group_by_domain(&addresses).unwrap();

            let mut expected: Vec<&str> = Vec::new();
            for addr in &addresses {
                if !expected.contains(&addr.as_str()) {
                    expected.push(addr);
                }
            }

            let mut all: Vec<&str> = groups.iter().flat_map(RecipientGroup::addresses).collect();
            prop_assert_eq!(all.len(), expected.len());
            all.sort_unstable();
            expected.sort_unstable();
            prop_assert_eq!(all, expected);

            for group in &groups {
                prop_assert!(group.recipients.iter().all(|r| r.domain() == group.domain));
            }
            let domains: HashSet<&str> = groups.iter().map(|g| g.domain.as_str()).collect();
            prop_assert_eq!(domains.len(), groups.len());
        }

        #[test]
        fn group_order_follows_first_seen_domain(
            input in proptest::collection::vec(("[a-d]", "[x-z]"), 1..20)
        ) {
            let addresses: Vec<String> = input
                .iter()
                .map(|(local, domain)| format!("{local}@{domain}"))
                .collect();
            let groups = group_by_domain(&addresses).unwrap();

            let mut first_seen: Vec<&str> = Vec::new();
            for (_, domain) in &input {
                if !first_seen.contains(&domain.as_str()) {
                    first_seen.push(domain);
                }
            }
            let order: Vec<&str> = groups.iter().map(|g| g.domain.as_str()).collect();
            prop_assert_eq!(order, first_seen);
        }
    }
}
