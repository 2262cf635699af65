//! Property Tests

use crate::*;
use proptest::prelude::*;
use std::collections::BTreeSet;

proptest! {
    #[test]
    fn count_equals_distinct_tokens(
        batches in prop::collection::vec(prop::collection::vec("[a-e]{1,2}", 0..6), 0..6)
    ) {
        let h = Harness::new();
        let job = h.client.create("job", RECORDED, vec![]).unwrap();

        let mut expected = BTreeSet::new();
        for batch in &batches {
            job.wait_for(batch.iter().cloned()).unwrap();
            expected.extend(batch.iter().cloned());
        }

        prop_assert_eq!(job.count().unwrap(), expected.len() as u64);
        prop_assert_eq!(job.waiting_for().unwrap(), expected);
    }

    #[test]
    fn absent_token_never_fires(
        tokens in prop::collection::btree_set("[a-e]", 1..5),
        absent in "[x-z]"
    ) {
        let h = Harness::new();
        let job = h.client.create("job", RECORDED, vec![]).unwrap();
        job.wait_for(tokens.iter().cloned()).unwrap();

        prop_assert!(!job.done([absent]).unwrap().is_fired());
        prop_assert_eq!(job.count().unwrap(), tokens.len() as u64);
        prop_assert_eq!(h.call_count(), 0);
    }
}
