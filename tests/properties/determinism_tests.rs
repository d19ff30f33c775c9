use std::collections::BTreeSet;

use proptest::prelude::*;

use roster::check::{CheckConfig, CheckEngine, Verdict};
use roster::test_utils::fixtures::TeamFixture;

fn team_ids() -> impl Strategy<Value = BTreeSet<String>> {
    prop::collection::btree_set("[a-z]{1,6}", 0..6)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn test_engine_is_idempotent(registry in team_ids(), descriptors in team_ids()) {
        let fixture = TeamFixture::new();
        let registry: Vec<&str> = registry.iter().map(String::as_str).collect();
        fixture.write_registry_ids(&registry);
        for id in &descriptors {
            fixture.write_team(id);
        }

        let engine = CheckEngine::with_builtin_checks(CheckConfig::default());
        let first = engine.run(&fixture.snapshot());
        let second = engine.run(&fixture.snapshot());
        prop_assert_eq!(first, second);
    }

    #[test]
    fn test_consistent_iff_sets_match(registry in team_ids(), descriptors in team_ids()) {
        let fixture = TeamFixture::new();
        let registry_ids: Vec<&str> = registry.iter().map(String::as_str).collect();
        fixture.write_registry_ids(&registry_ids);
        for id in &descriptors {
            fixture.write_team(id);
        }

        let config = CheckConfig::default().with_required_teams(Vec::<String>::new());
        let report = CheckEngine::with_builtin_checks(config).run(&fixture.snapshot());
        let expected = !registry.is_empty() && registry == descriptors;
        prop_assert_eq!(report.verdict() == Verdict::Consistent, expected);
    }
}
