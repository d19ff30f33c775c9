use proptest::prelude::*;

use roster::team::{TeamDescriptor, parse_record};
use roster::test_utils::fixtures::descriptor_source;

proptest! {
    #[test]
    fn test_parser_never_panics(source in ".*") {
        let _ = parse_record(&source);
    }

    #[test]
    fn test_parser_never_panics_on_shell_like_input(
        source in r#"([A-Z_]{1,8}=)?[ a-z$(){}\[\]'"`\\;&|#=\n]{0,40}"#
    ) {
        let _ = parse_record(&source);
    }

    #[test]
    fn test_syntax_errors_point_into_the_source(source in r#"[A-Z_=a-z"'$(`\n ]{0,60}"#) {
        if let Err(err) = parse_record(&source) {
            let lines = source.lines().count().max(1);
            prop_assert!(err.line >= 1);
            prop_assert!(err.line <= lines + 1);
        }
    }

    #[test]
    fn test_rendered_descriptor_parses_back(
        id in "[a-z][a-z0-9_-]{0,12}",
        name in "[A-Za-z0-9][A-Za-z0-9 ,.-]{0,20}",
        agents in prop::collection::vec("[a-z][a-z0-9-]{0,8}", 1..5),
    ) {
        let agent_refs: Vec<&str> = agents.iter().map(String::as_str).collect();
        let source = descriptor_source(&id, &name, "Owns things", &agent_refs);
        let record = parse_record(&source).unwrap();
        let team = TeamDescriptor::from_record(&record);
        prop_assert_eq!(team.id, id);
        prop_assert_eq!(team.name, name);
        prop_assert_eq!(team.agents, agents);
    }
}
