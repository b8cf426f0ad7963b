//! Property-based tests for list precedence.
//!
//! For any rule list over leaf fields, the decision for a leaf is the
//! decision of the last rule naming it, and that rule is the decider.
//! Inclusion and exact matching are tracked independently.

use docmeta_model::{FieldTree, TypeRegistry};
use docmeta_projection::{Decision, EvaluationContext, ListProjector, Projection, Projector};
use docmeta_types::Path;
use proptest::prelude::*;

const LEAVES: [&str; 4] = ["id", "name", "address.city", "address.zip"];

fn tree() -> FieldTree {
    let types = TypeRegistry::with_defaults();
    let string = types.get("string").unwrap();
    let mut tree = FieldTree::new();
    tree.add_simple(tree.root(), "id", string.clone()).unwrap();
    tree.add_simple(tree.root(), "name", string.clone()).unwrap();
    let address = tree.add_object(tree.root(), "address").unwrap();
    tree.add_simple(address, "city", string.clone()).unwrap();
    tree.add_simple(address, "zip", string).unwrap();
    tree
}

fn rules_strategy() -> impl Strategy<Value = Vec<(usize, bool)>> {
    prop::collection::vec((0..LEAVES.len(), any::<bool>()), 0..12)
}

proptest! {
    #[test]
    fn last_matching_rule_decides(rules in rules_strategy(), target in 0..LEAVES.len()) {
        let tree = tree();
        let projections: Vec<Projection> = rules
            .iter()
            .map(|&(leaf, include)| {
                let field = Path::parse(LEAVES[leaf]).unwrap();
                if include { Projection::include(field) } else { Projection::exclude(field) }
            })
            .collect();
        let list = ListProjector::new(&projections, &Path::empty(), &tree, tree.root()).unwrap();

        let path = Path::parse(LEAVES[target]).unwrap();
        let projected = list.project(&path, &EvaluationContext::detached());

        match rules.iter().rposition(|&(leaf, _)| leaf == target) {
            Some(k) => {
                prop_assert_eq!(projected.decision, Decision::from_include(rules[k].1));
                let decider = projected.deciding.unwrap();
                prop_assert!(std::ptr::addr_eq(
                    decider as *const dyn Projector,
                    &*list.items()[k] as *const dyn Projector,
                ));
            }
            None => {
                prop_assert_eq!(projected.decision, Decision::Undecided);
                prop_assert!(projected.deciding.is_none());
            }
        }
    }

    #[test]
    fn inclusion_iff_any_include_rule(rules in rules_strategy()) {
        let tree = tree();
        let projections: Vec<Projection> = rules
            .iter()
            .map(|&(leaf, include)| {
                let field = Path::parse(LEAVES[leaf]).unwrap();
                if include { Projection::include(field) } else { Projection::exclude(field) }
            })
            .collect();
        let list = ListProjector::new(&projections, &Path::empty(), &tree, tree.root()).unwrap();
        prop_assert_eq!(list.has_inclusion(), rules.iter().any(|&(_, include)| include));
        // Every leaf rule names one path exactly.
        prop_assert_eq!(list.exact_match(), !rules.is_empty());
    }
}
