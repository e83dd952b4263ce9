//! Property-based tests for the membership cache
//!
//! Applies random operation sequences to the cache and to a plain `HashSet`
//! model and compares the two after every step.

use favfeed::client::favorites::MembershipCache;
use proptest::prelude::*;
use std::collections::HashSet;

#[derive(Debug, Clone)]
enum Op {
    Add(u64),
    Remove(u64),
    Replace(HashSet<u64>),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..20u64).prop_map(Op::Add),
        (0..20u64).prop_map(Op::Remove),
        prop::collection::hash_set(0..20u64, 0..8).prop_map(Op::Replace),
    ]
}

proptest! {
    #[test]
    fn test_cache_matches_set_model(ops in prop::collection::vec(op_strategy(), 0..64)) {
        let cache = MembershipCache::new();
        let mut model = HashSet::new();

        for op in ops {
            let before = cache.current_snapshot().version();
            let changed = match op {
                Op::Add(id) => {
                    let inserted = model.insert(id);
                    prop_assert_eq!(cache.add(id), inserted);
                    inserted
                }
                Op::Remove(id) => {
                    let removed = model.remove(&id);
                    prop_assert_eq!(cache.remove(id), removed);
                    removed
                }
                Op::Replace(ids) => {
                    let differs = ids != model;
                    prop_assert_eq!(cache.replace(ids.clone()), differs);
                    model = ids;
                    differs
                }
            };

            let snapshot = cache.current_snapshot();
            prop_assert_eq!(snapshot.ids(), &model);
            prop_assert_eq!(snapshot.version(), before + u64::from(changed));
        }
    }

    #[test]
    fn test_version_bumps_only_on_change(id in 0..1000u64) {
        let cache = MembershipCache::new();
        prop_assert!(cache.add(id));
        let version = cache.current_snapshot().version();

        prop_assert!(!cache.add(id));
        prop_assert!(!cache.remove(id + 1));
        prop_assert_eq!(cache.current_snapshot().version(), version);

        prop_assert!(cache.remove(id));
        prop_assert_eq!(cache.current_snapshot().version(), version + 1);
    }

    #[test]
    fn test_subscriber_sees_latest_state(ids in prop::collection::vec(0..50u64, 1..20)) {
        let cache = MembershipCache::new();
        for id in &ids {
            cache.add(*id);
        }

        let rx = cache.watch();
        let latest = rx.borrow().clone();
        let expected: HashSet<u64> = ids.into_iter().collect();
        prop_assert_eq!(latest.ids(), &expected);
        prop_assert_eq!(latest.version(), cache.current_snapshot().version());
    }
}
