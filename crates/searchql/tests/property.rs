use proptest::prelude::*;
use searchql::{QueryExpr, StringLiteral, parse_canonical, parse_query};

fn arb_field() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("a".to_string()),
        Just("price".to_string()),
        Just("not".to_string()),
        "[a-z_][a-z0-9_]{0,6}",
    ]
}

fn arb_tag() -> impl Strategy<Value = String> {
    prop_oneof![
        "[A-Za-z_][A-Za-z0-9_]{0,5}",
        any::<String>().prop_map(|s| StringLiteral::new(s).to_string()),
    ]
}

fn arb_number() -> impl Strategy<Value = String> {
    prop_oneof![
        (-1_000_000i64..1_000_000).prop_map(|n| (n as f64 / 100.0).to_string()),
        (-9_999i64..10_000, -40i32..40).prop_map(|(m, e)| format!("{m}e{e}")),
    ]
}

fn arb_bound(open: &'static str) -> impl Strategy<Value = String> {
    prop_oneof![
        Just(open.to_string()),
        Just("inf".to_string()),
        arb_number(),
        arb_number().prop_map(|n| format!("({n}")),
    ]
}

fn arb_predicate() -> impl Strategy<Value = String> {
    let tags = (arb_field(), prop::collection::vec(arb_tag(), 1..4))
        .prop_map(|(field, tags)| format!("@{field}:{{{}}}", tags.join("|")));
    let range = (arb_field(), arb_bound("-inf"), arb_bound("+inf"))
        .prop_map(|(field, lo, hi)| format!("@{field}:[{lo} {hi}]"));
    prop_oneof![Just("*".to_string()), tags, range]
}

fn arb_query(depth: u32) -> BoxedStrategy<String> {
    if depth == 0 {
        return arb_predicate().boxed();
    }

    let leaf = arb_predicate();
    let juxtaposed = prop::collection::vec(arb_query(depth - 1), 2..4).prop_map(|qs| qs.join(" "));
    let alternatives =
        prop::collection::vec(arb_query(depth - 1), 2..4).prop_map(|qs| qs.join(" | "));
    let grouped = arb_query(depth - 1).prop_map(|q| format!("({q})"));
    let negated = arb_query(depth - 1).prop_map(|q| format!("-{q}"));
    prop_oneof![leaf, juxtaposed, alternatives, grouped, negated].boxed()
}

proptest! {
    #[test]
    fn generated_queries_parse_deterministically(query in arb_query(3)) {
        let first = parse_query(&query).expect("generated query should parse");
        let second = parse_query(&query).expect("generated query should parse");
        prop_assert_eq!(first.to_string(), second.to_string());
        prop_assert_eq!(first, second);
    }

    #[test]
    fn dump_reparses_to_same_tree(query in arb_query(3)) {
        let parsed = parse_query(&query).expect("generated query should parse");
        let rendered = parsed.to_string();
        let reparsed = parse_canonical(&rendered).expect("dump output should reparse");
        prop_assert_eq!(reparsed.to_string(), rendered);
        prop_assert_eq!(parsed, reparsed);
    }

    #[test]
    fn juxtaposed_predicates_form_one_and(preds in prop::collection::vec(arb_predicate(), 2..8)) {
        let parsed = parse_query(&preds.join(" ")).expect("generated query should parse");
        match parsed {
            QueryExpr::And(and) => prop_assert_eq!(and.inners().len(), preds.len()),
            other => prop_assert!(false, "expected AndExpr, got {}", other.name()),
        }
    }
}
