//! Property-based tests for the roster.
//!
//! These verify invariants that must hold for all interleavings of
//! add/remove/rename, not just the scripted scenarios: the name index stays
//! injective, failed renames change nothing, and operator status follows the
//! fingerprint rather than the name.

use std::{
    cell::RefCell,
    collections::HashSet,
    rc::Rc,
    time::{Duration, Instant},
};

use proptest::prelude::*;
use wardroom_core::{MemberProfile, Outbox, Roster};

#[derive(Clone, Default)]
struct RecordingOutbox(Rc<RefCell<Vec<String>>>);

impl Outbox for RecordingOutbox {
    fn deliver(&self, line: String) -> bool {
        self.0.borrow_mut().push(line);
        true
    }
}

fn profile(name: &str) -> MemberProfile {
    MemberProfile {
        name: name.to_string(),
        color: "33".to_string(),
        fingerprint: format!("SHA256:{name}"),
        client_version: "SSH-2.0-proptest".to_string(),
    }
}

#[derive(Debug, Clone)]
enum Op {
    Add(String),
    Remove(usize),
    Rename(usize, String),
}

fn name_strategy() -> impl Strategy<Value = String> {
    // Includes names that collide and names that fail validation.
    prop_oneof![
        "[a-c]{1,4}",
        Just("alice".to_string()),
        Just(String::new()),
        Just("two words".to_string()),
        Just("averylongname_over16bytes".to_string()),
    ]
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        name_strategy().prop_map(Op::Add),
        (0usize..8).prop_map(Op::Remove),
        ((0usize..8), name_strategy()).prop_map(|(i, n)| Op::Rename(i, n)),
    ]
}

/// Replay an op sequence against a fresh roster, returning it along with the
/// ids that are still members.
fn replay(ops: &[Op]) -> (Roster<RecordingOutbox>, Vec<u64>) {
    let mut roster: Roster<RecordingOutbox> = Roster::new();
    let mut next_id = 0u64;
    let mut live: Vec<u64> = Vec::new();

    for op in ops {
        match op {
            Op::Add(name) => {
                roster.add(next_id, profile(name), RecordingOutbox::default());
                live.push(next_id);
                next_id += 1;
            },
            Op::Remove(index) => {
                if !live.is_empty() {
                    let id = live.remove(index % live.len());
                    roster.remove(id);
                }
            },
            Op::Rename(index, name) => {
                if !live.is_empty() {
                    let id = live[index % live.len()];
                    let _ = roster.rename(id, name);
                }
            },
        }
    }

    (roster, live)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Property: the name -> member mapping is injective after any
    /// interleaving of add/remove/rename.
    #[test]
    fn names_stay_unique(ops in prop::collection::vec(op_strategy(), 0..40)) {
        let (roster, live) = replay(&ops);

        let names = roster.list(None);
        let distinct: HashSet<&String> = names.iter().collect();
        prop_assert_eq!(distinct.len(), names.len(), "duplicate names in {:?}", names);
        prop_assert_eq!(names.len(), live.len());
        prop_assert_eq!(roster.member_count(), live.len());
    }

    /// Property: every live member is reachable through its listed name.
    #[test]
    fn listed_names_resolve(ops in prop::collection::vec(op_strategy(), 0..40)) {
        let (roster, _) = replay(&ops);

        for name in roster.list(None) {
            let view = roster.who(&name);
            prop_assert!(view.is_some(), "listed name {name:?} does not resolve");
            prop_assert_eq!(view.unwrap().name, name);
        }
    }

    /// Property: a rename to a taken name fails and leaves both parties
    /// untouched.
    #[test]
    fn failed_rename_changes_nothing(
        first in "[a-z]{1,8}",
        second in "[a-z]{1,8}",
    ) {
        prop_assume!(first != second);

        let mut roster: Roster<RecordingOutbox> = Roster::new();
        let a = roster.add(1, profile(&first), RecordingOutbox::default());
        let b = roster.add(2, profile(&second), RecordingOutbox::default());

        prop_assert!(roster.rename(2, &a).is_err());
        prop_assert_eq!(roster.who(&a).unwrap().id, 1);
        prop_assert_eq!(roster.who(&b).unwrap().id, 2);
    }

    /// Property: operator status follows the fingerprint through any chain
    /// of successful renames.
    #[test]
    fn op_survives_renames(new_names in prop::collection::vec("[d-z]{1,8}", 1..6)) {
        let mut roster: Roster<RecordingOutbox> = Roster::new();
        roster.add(7, profile("carol"), RecordingOutbox::default());
        roster.op("SHA256:carol");

        for name in &new_names {
            let _ = roster.rename(7, name);
            prop_assert!(roster.is_op(7));
        }
    }

    /// Property: a silence deadline in the future mutes, a past one never
    /// does.
    #[test]
    fn silence_fence_respects_now(offset_secs in 1u64..3600) {
        let mut roster: Roster<RecordingOutbox> = Roster::new();
        roster.add(1, profile("bob"), RecordingOutbox::default());

        let t0 = Instant::now();
        let until = t0 + Duration::from_secs(offset_secs);
        roster.silence(1, until);

        prop_assert!(roster.is_silenced(1, t0));
        prop_assert!(!roster.is_silenced(1, until));
        prop_assert!(!roster.is_silenced(1, until + Duration::from_secs(1)));
    }
}
