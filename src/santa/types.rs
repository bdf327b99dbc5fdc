use std::collections::{HashMap, HashSet};
use serde::{Deserialize, Serialize};

/// One employee from the current roster. The name is the identity key;
/// the input files carry no separate ID column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub name: String,
    pub email: String,
}

/// One (giver -> receiver) pairing from a previous round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorAssignment {
    pub giver_name: String,
    pub giver_email: String,
    pub receiver_name: String,
    pub receiver_email: String,
}

/// One freshly generated pairing. The receiver's email is resolved against
/// the current roster, never carried over from the prior-results file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub giver_name: String,
    pub giver_email: String,
    pub receiver_name: String,
    pub receiver_email: String,
}

/// The (giver, receiver) pairs disallowed because they happened last round.
/// Pairs naming employees who have since left the roster stay in the set;
/// they simply never match a draw.
#[derive(Debug, Clone, Default)]
pub struct ForbiddenPairs {
    by_giver: HashMap<String, HashSet<String>>,
    len: usize,
}

impl ForbiddenPairs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the set from prior-round records. Rows with a blank giver or
    /// receiver name cannot form a pair and are dropped.
    pub fn from_prior(prior: &[PriorAssignment]) -> Self {
        let mut pairs = ForbiddenPairs::new();
        let mut dropped = 0usize;
        for record in prior {
            let giver = record.giver_name.trim();
            let receiver = record.receiver_name.trim();
            if giver.is_empty() || receiver.is_empty() {
                dropped += 1;
                continue;
            }
            pairs.insert(giver, receiver);
        }
        if dropped > 0 {
            log::warn!("dropped {} prior assignment(s) with blank names", dropped);
        }
        pairs
    }

    pub fn insert(&mut self, giver: &str, receiver: &str) {
        if self
            .by_giver
            .entry(giver.to_string())
            .or_default()
            .insert(receiver.to_string())
        {
            self.len += 1;
        }
    }

    pub fn contains(&self, giver: &str, receiver: &str) -> bool {
        self.by_giver
            .get(giver)
            .map(|receivers| receivers.contains(receiver))
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prior(giver: &str, receiver: &str) -> PriorAssignment {
        PriorAssignment {
            giver_name: giver.to_string(),
            giver_email: format!("{}@corp.test", giver.to_lowercase()),
            receiver_name: receiver.to_string(),
            receiver_email: format!("{}@corp.test", receiver.to_lowercase()),
        }
    }

    #[test]
    fn from_prior_collects_name_pairs() {
        let pairs = ForbiddenPairs::from_prior(&[prior("Alice", "Bob"), prior("Bob", "Carol")]);
        assert_eq!(pairs.len(), 2);
        assert!(pairs.contains("Alice", "Bob"));
        assert!(pairs.contains("Bob", "Carol"));
        assert!(!pairs.contains("Bob", "Alice"));
    }

    #[test]
    fn from_prior_drops_blank_names() {
        let mut blank = prior("Alice", "Bob");
        blank.receiver_name = "   ".to_string();
        let pairs = ForbiddenPairs::from_prior(&[blank, prior("Bob", "Carol")]);
        assert_eq!(pairs.len(), 1);
        assert!(!pairs.contains("Alice", "Bob"));
    }

    #[test]
    fn duplicate_pairs_count_once() {
        let pairs = ForbiddenPairs::from_prior(&[prior("Alice", "Bob"), prior("Alice", "Bob")]);
        assert_eq!(pairs.len(), 1);
    }

    #[test]
    fn from_prior_trims_names() {
        let mut padded = prior("Alice", "Bob");
        padded.giver_name = " Alice ".to_string();
        let pairs = ForbiddenPairs::from_prior(&[padded]);
        assert!(pairs.contains("Alice", "Bob"));
    }
}
