use std::collections::{HashMap, HashSet};

use rand::Rng;

use super::error::SantaError;
use super::types::{Assignment, Employee, ForbiddenPairs};

/// Runs the matcher with the thread-local RNG.
pub fn assign(roster: &[Employee], prior: &ForbiddenPairs) -> Result<Vec<Assignment>, SantaError> {
    assign_with_rng(roster, prior, &mut rand::thread_rng())
}

/// Randomized sequential allocation with rejection sampling.
///
/// Givers are processed in roster order. Each giver draws uniformly from the
/// pool of not-yet-assigned receivers until the draw is neither the giver
/// themselves nor a repeat of a prior-round pair; the chosen receiver then
/// leaves the pool for good. Committed draws are never revisited, so whether
/// a full assignment is found can depend on processing order even when a
/// valid derangement exists. When no remaining candidate can satisfy the
/// current giver the engine fails instead of sampling forever.
pub fn assign_with_rng<R: Rng + ?Sized>(
    roster: &[Employee],
    prior: &ForbiddenPairs,
    rng: &mut R,
) -> Result<Vec<Assignment>, SantaError> {
    validate_roster(roster)?;

    let emails: HashMap<&str, &str> = roster
        .iter()
        .map(|e| (e.name.as_str(), e.email.as_str()))
        .collect();

    let mut pool: Vec<String> = roster.iter().map(|e| e.name.clone()).collect();
    let mut assignments = Vec::with_capacity(roster.len());

    for giver in roster {
        // Sampling an exhausted pool would never terminate, so check before
        // drawing that at least one remaining candidate is valid.
        let has_valid = pool
            .iter()
            .any(|candidate| candidate != &giver.name && !prior.contains(&giver.name, candidate));
        if !has_valid {
            return Err(SantaError::AssignmentUnsatisfiable {
                giver: giver.name.clone(),
                remaining: pool.clone(),
            });
        }

        let receiver = loop {
            let idx = rng.gen_range(0..pool.len());
            let candidate = &pool[idx];
            if candidate != &giver.name && !prior.contains(&giver.name, candidate) {
                break pool.remove(idx);
            }
        };

        let receiver_email = emails
            .get(receiver.as_str())
            .copied()
            .unwrap_or("")
            .to_string();

        assignments.push(Assignment {
            giver_name: giver.name.clone(),
            giver_email: giver.email.clone(),
            receiver_name: receiver,
            receiver_email,
        });
    }

    Ok(assignments)
}

fn validate_roster(roster: &[Employee]) -> Result<(), SantaError> {
    if roster.len() < 2 {
        return Err(SantaError::InvalidRoster {
            reason: format!("need at least 2 employees, got {}", roster.len()),
        });
    }

    let mut seen = HashSet::new();
    for employee in roster {
        if employee.name.trim().is_empty() {
            return Err(SantaError::InvalidRoster {
                reason: "employee with blank name".to_string(),
            });
        }
        if employee.email.trim().is_empty() {
            return Err(SantaError::InvalidRoster {
                reason: format!("blank email for {}", employee.name),
            });
        }
        if !seen.insert(employee.name.as_str()) {
            return Err(SantaError::InvalidRoster {
                reason: format!("duplicate employee name: {}", employee.name),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::santa::types::PriorAssignment;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn employee(name: &str) -> Employee {
        Employee {
            name: name.to_string(),
            email: format!("{}@corp.test", name.to_lowercase()),
        }
    }

    fn roster(names: &[&str]) -> Vec<Employee> {
        names.iter().map(|n| employee(n)).collect()
    }

    fn forbidden(pairs: &[(&str, &str)]) -> ForbiddenPairs {
        let mut set = ForbiddenPairs::new();
        for (giver, receiver) in pairs {
            set.insert(giver, receiver);
        }
        set
    }

    fn assert_valid_derangement(
        roster: &[Employee],
        prior: &ForbiddenPairs,
        assignments: &[Assignment],
    ) {
        assert_eq!(assignments.len(), roster.len());
        let mut receivers = HashSet::new();
        for (giver, assignment) in roster.iter().zip(assignments) {
            assert_eq!(assignment.giver_name, giver.name);
            assert_eq!(assignment.giver_email, giver.email);
            assert_ne!(assignment.receiver_name, assignment.giver_name, "self-pairing");
            assert!(
                !prior.contains(&assignment.giver_name, &assignment.receiver_name),
                "repeated prior pair {} -> {}",
                assignment.giver_name,
                assignment.receiver_name
            );
            assert!(
                receivers.insert(assignment.receiver_name.clone()),
                "{} received twice",
                assignment.receiver_name
            );
            let expected = roster
                .iter()
                .find(|e| e.name == assignment.receiver_name)
                .expect("receiver not on roster");
            assert_eq!(assignment.receiver_email, expected.email);
        }
    }

    #[test]
    fn two_person_roster_swaps() {
        let roster = roster(&["Alice", "Bob"]);
        let assignments = assign(&roster, &ForbiddenPairs::new()).unwrap();
        assert_eq!(assignments.len(), 2);
        assert_eq!(assignments[0].giver_name, "Alice");
        assert_eq!(assignments[0].receiver_name, "Bob");
        assert_eq!(assignments[1].giver_name, "Bob");
        assert_eq!(assignments[1].receiver_name, "Alice");
    }

    #[test]
    fn fails_fast_when_history_forbids_both_pairs() {
        let roster = roster(&["Alice", "Bob"]);
        let prior = forbidden(&[("Alice", "Bob"), ("Bob", "Alice")]);
        let err = assign(&roster, &prior).unwrap_err();
        match err {
            SantaError::AssignmentUnsatisfiable { giver, remaining } => {
                assert_eq!(giver, "Alice");
                assert_eq!(remaining, vec!["Alice".to_string(), "Bob".to_string()]);
            }
            other => panic!("expected AssignmentUnsatisfiable, got {other:?}"),
        }
    }

    #[test]
    fn forbidden_pair_forces_the_only_legal_chain() {
        // Alice goes first with a full pool; Bob is forbidden and Alice is
        // herself, so Carol is the only legal draw. That cascades: Bob can
        // only take Alice, Carol only Bob. The whole run is deterministic.
        let roster = roster(&["Alice", "Bob", "Carol"]);
        let prior = forbidden(&[("Alice", "Bob")]);
        for _ in 0..200 {
            let assignments = assign(&roster, &prior).unwrap();
            assert_eq!(assignments[0].receiver_name, "Carol");
            assert_eq!(assignments[1].receiver_name, "Alice");
            assert_eq!(assignments[2].receiver_name, "Bob");
        }
    }

    #[test]
    fn five_person_fuzz_never_violates_invariants() {
        let roster = roster(&["Alice", "Bob", "Carol", "Dave", "Erin"]);
        let prior = ForbiddenPairs::new();
        for _ in 0..1000 {
            let assignments = assign(&roster, &prior).unwrap();
            assert_valid_derangement(&roster, &prior, &assignments);
        }
    }

    #[test]
    fn fuzz_with_history_never_repeats_prior_pairs() {
        let roster = roster(&["Alice", "Bob", "Carol", "Dave", "Erin"]);
        let prior = forbidden(&[("Alice", "Bob"), ("Carol", "Dave"), ("Erin", "Alice")]);
        for _ in 0..1000 {
            let assignments = assign(&roster, &prior).unwrap();
            assert_valid_derangement(&roster, &prior, &assignments);
        }
    }

    #[test]
    fn seeded_runs_are_reproducible() {
        let roster = roster(&["Alice", "Bob", "Carol", "Dave", "Erin", "Frank"]);
        let prior = forbidden(&[("Alice", "Bob"), ("Dave", "Erin")]);

        let mut first_rng = StdRng::seed_from_u64(42);
        let first = assign_with_rng(&roster, &prior, &mut first_rng).unwrap();
        let mut second_rng = StdRng::seed_from_u64(42);
        let second = assign_with_rng(&roster, &prior, &mut second_rng).unwrap();

        assert_eq!(first, second);
        assert_valid_derangement(&roster, &prior, &first);
    }

    #[test]
    fn rejects_roster_smaller_than_two() {
        let err = assign(&roster(&["Alice"]), &ForbiddenPairs::new()).unwrap_err();
        assert!(matches!(err, SantaError::InvalidRoster { .. }));
    }

    #[test]
    fn rejects_duplicate_names() {
        let roster = roster(&["Alice", "Bob", "Alice"]);
        let err = assign(&roster, &ForbiddenPairs::new()).unwrap_err();
        match err {
            SantaError::InvalidRoster { reason } => assert!(reason.contains("Alice")),
            other => panic!("expected InvalidRoster, got {other:?}"),
        }
    }

    #[test]
    fn rejects_blank_fields() {
        let mut roster = roster(&["Alice", "Bob"]);
        roster[1].email = "  ".to_string();
        let err = assign(&roster, &ForbiddenPairs::new()).unwrap_err();
        assert!(matches!(err, SantaError::InvalidRoster { .. }));
    }

    #[test]
    fn history_for_departed_employees_is_inert() {
        // Zed left the company; pairs naming him can never match a draw and
        // must not block the remaining roster.
        let roster = roster(&["Alice", "Bob"]);
        let prior = ForbiddenPairs::from_prior(&[
            PriorAssignment {
                giver_name: "Alice".to_string(),
                giver_email: "alice@corp.test".to_string(),
                receiver_name: "Zed".to_string(),
                receiver_email: "zed@corp.test".to_string(),
            },
            PriorAssignment {
                giver_name: "Zed".to_string(),
                giver_email: "zed@corp.test".to_string(),
                receiver_name: "Bob".to_string(),
                receiver_email: "bob@corp.test".to_string(),
            },
        ]);
        let assignments = assign(&roster, &prior).unwrap();
        assert_eq!(assignments[0].receiver_name, "Bob");
        assert_eq!(assignments[1].receiver_name, "Alice");
    }

    #[test]
    fn unsatisfiable_remainder_is_detected_mid_run() {
        // Carol is the last giver and the only name left in the pool is her
        // own whenever Alice and Bob both draw from {Bob, Alice}. Forcing
        // their picks with history leaves Carol stuck with herself.
        let roster = roster(&["Alice", "Bob", "Carol"]);
        let prior = forbidden(&[
            ("Alice", "Carol"),
            ("Bob", "Carol"),
        ]);
        let err = assign(&roster, &prior).unwrap_err();
        match err {
            SantaError::AssignmentUnsatisfiable { giver, remaining } => {
                assert_eq!(giver, "Carol");
                assert_eq!(remaining, vec!["Carol".to_string()]);
            }
            other => panic!("expected AssignmentUnsatisfiable, got {other:?}"),
        }
    }
}
