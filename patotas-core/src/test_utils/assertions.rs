//! Assertions over patota results

use crate::core_patota::{Access, JoinOutcome, PatotaError, RosterEntry, Role};
use std::fmt::Debug;

/// Assert that a Result is Ok and return the value
pub fn assert_ok<T, E: Debug>(result: Result<T, E>) -> T {
    match result {
        Ok(value) => value,
        Err(e) => panic!("Expected Ok, got Err: {:?}", e),
    }
}

/// Assert the redemption created a new membership
pub fn assert_joined(outcome: &JoinOutcome) {
    if !outcome.is_new_membership() {
        panic!("Expected Joined, got {:?}", outcome);
    }
}

/// Assert the redemption changed nothing
pub fn assert_already_member(outcome: &JoinOutcome) {
    if outcome.is_new_membership() {
        panic!("Expected AlreadyMember, got {:?}", outcome);
    }
}

pub fn assert_granted(access: &Access, expected: Role) {
    match access.role() {
        Some(role) if role == expected => {}
        other => panic!("Expected access as {:?}, got {:?}", expected, other),
    }
}

pub fn assert_not_found<T: Debug>(result: Result<T, PatotaError>) {
    match result {
        Err(PatotaError::NotFound(_)) => {}
        other => panic!("Expected NotFound, got {:?}", other),
    }
}

/// Assert roster scores, in order
pub fn assert_scores(entries: &[RosterEntry], expected: &[i64]) {
    let scores: Vec<i64> = entries.iter().map(|e| e.score).collect();
    assert_eq!(scores, expected, "roster scores out of order");
}
