use super::trees::arb_element;
use proptest::prelude::*;
use spscheck::evaluate::{Verdict, count_holds, evaluate_test};
use spscheck::query::Item;
use spscheck::tree::Document;
use spscheck::types::{CountCondition, Predicate};

fn holds(doc: &Document, predicate: &Predicate, blank_is_absent: bool) -> bool {
    let context = Item::Node(doc.root().id());
    evaluate_test(predicate, doc, &context, blank_is_absent) != Verdict::Fail
}

fn arb_path() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec!["//a", "//b[@t='x']", "//c/a", "//*/@t", "//a[b]"])
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    // Not(Not(p)) agrees with p
    #[test]
    fn double_negation(root in arb_element(3), path in arb_path()) {
        let doc = Document::new(root);
        let p = Predicate::present(path).unwrap();
        let nn = Predicate::not(Predicate::not(p.clone()));
        prop_assert_eq!(holds(&doc, &p, false), holds(&doc, &nn, false));
    }

    // Present and Absent are complements
    #[test]
    fn present_absent_complement(
        root in arb_element(3),
        path in arb_path(),
        blank in any::<bool>(),
    ) {
        let doc = Document::new(root);
        let present = Predicate::present(path).unwrap();
        let absent = Predicate::absent(path).unwrap();
        prop_assert_ne!(holds(&doc, &present, blank), holds(&doc, &absent, blank));
    }

    // Xor holds exactly when its operands differ
    #[test]
    fn xor_is_inequality(root in arb_element(3), a in arb_path(), b in arb_path()) {
        let doc = Document::new(root);
        let (pa, pb) = (Predicate::present(a).unwrap(), Predicate::present(b).unwrap());
        let expected = holds(&doc, &pa, false) != holds(&doc, &pb, false);
        prop_assert_eq!(holds(&doc, &Predicate::xor(pa, pb), false), expected);
    }

    // Treating blanks as absent can only turn a presence pass into a failure
    #[test]
    fn blank_filter_is_monotonic(root in arb_element(3), path in arb_path()) {
        let doc = Document::new(root);
        let p = Predicate::present(path).unwrap();
        if holds(&doc, &p, true) {
            prop_assert!(holds(&doc, &p, false));
        }
    }

    // Count operators agree with plain integer comparison
    #[test]
    fn count_condition_operators(count in 0usize..20, n in 0usize..20) {
        prop_assert_eq!(count_holds(count, &CountCondition::exactly(n)), count == n);
        prop_assert_eq!(count_holds(count, &CountCondition::at_least(n)), count >= n);
        prop_assert_eq!(count_holds(count, &CountCondition::at_most(n)), count <= n);
        let ne = CountCondition { ne: Some(n), ..Default::default() };
        prop_assert_eq!(count_holds(count, &ne), count != n);
    }

    // Count with eq agrees with the query result size
    #[test]
    fn count_matches_selection(root in arb_element(3), path in arb_path(), n in 0usize..6) {
        let doc = Document::new(root);
        let expr = spscheck::query::Expr::compile(path).unwrap();
        let size = spscheck::query::select_from_root(&doc, &expr).len();
        let p = Predicate::count(path, CountCondition::exactly(n)).unwrap();
        prop_assert_eq!(holds(&doc, &p, true), size == n);
    }
}
