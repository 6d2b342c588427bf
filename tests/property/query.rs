use super::trees::{arb_element, count_named};
use proptest::prelude::*;
use spscheck::query::{Expr, select_from_root};
use spscheck::tree::Document;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    // Results are in document order and free of duplicates
    #[test]
    fn results_are_sorted_and_unique(root in arb_element(4), path in prop::sample::select(vec![
        "//a", "//b/..", "//*/@t", "//a | //b | //a", "//c/ancestor::*", "//b/preceding-sibling::*",
        "//a[@t='x']/following-sibling::b", "//text()", "//node()",
    ])) {
        let doc = Document::new(root);
        let found = select_from_root(&doc, &Expr::compile(path).unwrap());
        prop_assert!(found.windows(2).all(|w| w[0] < w[1]), "{} not strictly ordered", path);
    }

    // `//name` finds every element with that name
    #[test]
    fn descendant_search_counts_every_match(root in arb_element(4)) {
        let expected = count_named(&root, "b");
        let doc = Document::new(root);
        let found = select_from_root(&doc, &Expr::compile("//b").unwrap());
        prop_assert_eq!(found.len(), expected);
    }

    // An anchored relative path is the same query as its `//` form
    #[test]
    fn anchoring_matches_double_slash(root in arb_element(4)) {
        let doc = Document::new(root);
        let anchored = Expr::compile("a/b").unwrap().anchored();
        let explicit = Expr::compile("//a/b").unwrap();
        prop_assert_eq!(select_from_root(&doc, &anchored), select_from_root(&doc, &explicit));
    }

    // Filters only ever narrow a step
    #[test]
    fn filters_narrow(root in arb_element(4)) {
        let doc = Document::new(root);
        let all = select_from_root(&doc, &Expr::compile("//a").unwrap());
        for filtered in ["//a[@t]", "//a[@t='x']", "//a[not(b)]", "//a[count(*) >= 1]", "//a[1]"] {
            let narrowed = select_from_root(&doc, &Expr::compile(filtered).unwrap());
            prop_assert!(narrowed.iter().all(|i| all.contains(i)), "{} widened", filtered);
        }
    }

    // A predicate and its negation partition the step
    #[test]
    fn negation_partitions(root in arb_element(4)) {
        let doc = Document::new(root);
        let all = select_from_root(&doc, &Expr::compile("//*").unwrap()).len();
        let with = select_from_root(&doc, &Expr::compile("//*[@t='x' or b]").unwrap()).len();
        let negated = Expr::compile("//*[not(@t='x' or b)]").unwrap();
        let without = select_from_root(&doc, &negated).len();
        prop_assert_eq!(with + without, all);
    }

    // Compilation never panics; it accepts or reports an error
    #[test]
    fn compile_never_panics(source in "[a-z@/\\[\\]()'=!<>.:*| 0-9-]{0,24}") {
        let _ = Expr::compile(&source);
    }
}
