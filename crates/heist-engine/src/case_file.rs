//! The shared evidence ledger.

use std::sync::{Mutex, PoisonError};

use heist_core::{Evidence, EvidenceMask, Profile};

/// Consistent view of the case file at one instant.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CaseSnapshot {
    /// Union of every guard's collected evidence.
    pub collected: EvidenceMask,
    /// Set once `collected` has equalled a profile signature.
    pub solved: bool,
}

/// Evidence collected by all guards, behind one lock.
///
/// `collected` only grows and `solved` never reverts. The OR and the
/// signature check happen under the same lock acquisition, so no guard can
/// observe a collected mask that matches a signature without also seeing
/// `solved`.
#[derive(Debug, Default)]
pub struct CaseFile {
    state: Mutex<CaseSnapshot>,
}

impl CaseFile {
    /// An empty, unsolved case file.
    pub fn new() -> Self {
        Self::default()
    }

    /// OR `kind` into the collected mask and re-check the solved flag.
    /// Returns the state after the update.
    pub fn record(&self, kind: Evidence) -> CaseSnapshot {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.collected.insert(kind);
        if !state.solved && Profile::is_signature(state.collected) {
            state.solved = true;
        }
        *state
    }

    /// Current state.
    pub fn snapshot(&self) -> CaseSnapshot {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current collected mask.
    pub fn collected(&self) -> EvidenceMask {
        self.snapshot().collected
    }

    /// Whether the case has been solved.
    pub fn is_solved(&self) -> bool {
        self.snapshot().solved
    }
}

const _: fn() = || {
    fn assert<T: Send + Sync>() {}
    assert::<CaseFile>();
};

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn exact_signature_solves() {
        let case = CaseFile::new();
        assert!(!case.record(Evidence::RfidSpoof).solved);
        assert!(!case.record(Evidence::CameraBlackout).solved);
        let snap = case.record(Evidence::ForcedLock);
        assert!(snap.solved);
        assert_eq!(Profile::matching(snap.collected), Some(Profile::Insider));
    }

    #[test]
    fn solved_survives_extra_evidence() {
        let case = CaseFile::new();
        for kind in Profile::Pro.signature() {
            case.record(kind);
        }
        assert!(case.is_solved());
        let snap = case.record(Evidence::LaserTrip);
        assert!(snap.solved);
        assert_eq!(snap.collected.len(), 4);
    }

    #[test]
    fn duplicate_evidence_is_idempotent() {
        let case = CaseFile::new();
        case.record(Evidence::ToolMarks);
        let snap = case.record(Evidence::ToolMarks);
        assert_eq!(snap.collected, EvidenceMask::from(Evidence::ToolMarks));
        assert!(!snap.solved);
    }

    #[test]
    fn concurrent_recording_unions_everything() {
        let case = std::sync::Arc::new(CaseFile::new());
        let handles: Vec<_> = Evidence::ALL
            .into_iter()
            .map(|kind| {
                let case = std::sync::Arc::clone(&case);
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        case.record(kind);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(case.collected().len(), 7);
    }

    proptest! {
        #[test]
        fn collected_is_monotone_and_solved_sticks(bits in prop::collection::vec(0u8..7, 0..40)) {
            let case = CaseFile::new();
            let mut prev = case.snapshot();
            for b in bits {
                let kind = Evidence::ALL[b as usize];
                let next = case.record(kind);
                prop_assert!(prev.collected.is_subset(next.collected));
                prop_assert!(next.collected.contains(kind));
                prop_assert!(!prev.solved || next.solved);
                if next.solved && !prev.solved {
                    prop_assert!(Profile::is_signature(next.collected));
                }
                prev = next;
            }
        }
    }
}
