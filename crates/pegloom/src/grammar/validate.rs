//! Static checks run on a rule map before it is compiled

use crate::error::GrammarError;
use crate::grammar::{GrammarRule, RuleMap};
use compact_str::CompactString;
use hashbrown::HashSet;
use log::debug;

/// Validate a grammar for common issues
///
/// # Errors
///
/// Returns an error if the grammar is empty, references an undefined rule,
/// or contains left recursion.
pub fn validate_grammar(rules: &RuleMap) -> Result<(), GrammarError> {
    if rules.is_empty() {
        return Err(GrammarError::Empty);
    }
    validate_references(rules)?;
    detect_left_recursion(rules)
}

/// Check that every referenced rule is defined.
///
/// Rules are checked in definition order; the first undefined reference is
/// reported together with the rule containing it.
///
/// # Errors
///
/// Returns [`GrammarError::UndefinedRule`] for the first missing reference.
pub fn validate_references(rules: &RuleMap) -> Result<(), GrammarError> {
    for (name, rule) in rules {
        if let Some(missing) = rule
            .references()
            .into_iter()
            .find(|reference| !rules.contains_key(*reference))
        {
            debug!("rule `{name}` references undefined rule `{missing}`");
            return Err(GrammarError::UndefinedRule {
                rule: name.clone(),
                reference: missing.into(),
            });
        }
    }
    Ok(())
}

/// Reject rules that can reach themselves before consuming input.
///
/// Every rule is checked, not only the start rule.
///
/// # Errors
///
/// Returns [`GrammarError::LeftRecursion`] with the reference path of the
/// first cycle found.
pub fn detect_left_recursion(rules: &RuleMap) -> Result<(), GrammarError> {
    match left_recursive_cycles(rules).into_iter().next() {
        Some(cycle) => {
            debug!("left recursion through {}", cycle.join(" -> "));
            Err(GrammarError::LeftRecursion { cycle })
        }
        None => Ok(()),
    }
}

/// One reference path per left-recursive rule, e.g. `["expr", "term", "expr"]`.
///
/// Undefined references end the search silently; report them with
/// [`validate_references`].
#[must_use]
pub fn left_recursive_cycles(rules: &RuleMap) -> Vec<Vec<CompactString>> {
    let mut cycles = Vec::new();
    for (name, rule) in rules {
        let mut search = CycleSearch {
            rules,
            target: name,
            path: vec![name.clone()],
            visited: HashSet::new(),
        };
        if let Some(cycle) = search.first_position(rule) {
            cycles.push(cycle);
        }
    }
    cycles
}

/// Depth-first search for `target` in first position, scoped to one rule
struct CycleSearch<'a> {
    rules: &'a RuleMap,
    target: &'a str,
    path: Vec<CompactString>,
    visited: HashSet<&'a str>,
}

impl<'a> CycleSearch<'a> {
    fn first_position(&mut self, rule: &'a GrammarRule) -> Option<Vec<CompactString>> {
        match rule {
            GrammarRule::Literal(_) | GrammarRule::CharRange { .. } | GrammarRule::Any => None,
            GrammarRule::Sequence(rules) => rules.first().and_then(|first| self.first_position(first)),
            GrammarRule::Alternation(rules) => {
                rules.iter().find_map(|branch| self.first_position(branch))
            }
            GrammarRule::Repetition { rule, .. }
            | GrammarRule::Optional(rule)
            | GrammarRule::Action(rule) => self.first_position(rule),
            GrammarRule::Negation { rule, then } => self
                .first_position(rule)
                .or_else(|| self.first_position(then)),
            GrammarRule::Reference(name) => {
                if name.as_str() == self.target {
                    let mut cycle = self.path.clone();
                    cycle.push(name.clone());
                    return Some(cycle);
                }
                if !self.visited.insert(name.as_str()) {
                    return None;
                }
                let body = self.rules.get(name)?;
                self.path.push(name.clone());
                let found = self.first_position(body);
                self.path.pop();
                found
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules(entries: Vec<(&str, GrammarRule)>) -> RuleMap {
        entries
            .into_iter()
            .map(|(name, rule)| (CompactString::from(name), rule))
            .collect()
    }

    #[test]
    fn test_undefined_reference() {
        let map = rules(vec![
            ("a", GrammarRule::reference("b")),
            ("b", GrammarRule::seq([GrammarRule::literal("x"), GrammarRule::reference("c")])),
        ]);
        let error = validate_references(&map).unwrap_err();
        assert_eq!(
            error,
            GrammarError::UndefinedRule {
                rule: "b".into(),
                reference: "c".into(),
            }
        );
    }

    #[test]
    fn test_forward_references_are_fine() {
        let map = rules(vec![
            ("a", GrammarRule::reference("b")),
            ("b", GrammarRule::literal("x")),
        ]);
        assert!(validate_grammar(&map).is_ok());
    }

    #[test]
    fn test_direct_left_recursion() {
        let map = rules(vec![(
            "e",
            GrammarRule::seq([GrammarRule::reference("e"), GrammarRule::literal("+")]),
        )]);
        let cycles = left_recursive_cycles(&map);
        assert_eq!(cycles, vec![vec![CompactString::from("e"), "e".into()]]);
    }

    #[test]
    fn test_indirect_left_recursion_through_alternation() {
        let map = rules(vec![
            ("expr", GrammarRule::reference("term")),
            (
                "term",
                GrammarRule::choice([
                    GrammarRule::literal("x"),
                    GrammarRule::seq([GrammarRule::reference("expr"), GrammarRule::literal("*")]),
                ]),
            ),
        ]);
        let error = detect_left_recursion(&map).unwrap_err();
        assert_eq!(error.cycle().unwrap().join(" -> "), "expr -> term -> expr");
    }

    #[test]
    fn test_recursion_after_first_position_is_allowed() {
        let map = rules(vec![(
            "parens",
            GrammarRule::choice([
                GrammarRule::seq([
                    GrammarRule::literal("("),
                    GrammarRule::reference("parens"),
                    GrammarRule::literal(")"),
                ]),
                GrammarRule::literal("x"),
            ]),
        )]);
        assert!(left_recursive_cycles(&map).is_empty());
    }

    #[test]
    fn test_cycle_not_through_target_terminates() {
        let map = rules(vec![
            ("start", GrammarRule::reference("loop_a")),
            ("loop_a", GrammarRule::star(GrammarRule::reference("loop_b"))),
            ("loop_b", GrammarRule::opt(GrammarRule::reference("loop_a"))),
        ]);
        let cycles = left_recursive_cycles(&map);
        // loop_a and loop_b are left recursive, start only leads into them
        assert_eq!(cycles.len(), 2);
        assert_eq!(cycles[0].join(" -> "), "loop_a -> loop_b -> loop_a");
    }

    #[test]
    fn test_negation_operands_are_first_position() {
        let map = rules(vec![(
            "n",
            GrammarRule::not_followed_by(GrammarRule::literal("x"), GrammarRule::reference("n")),
        )]);
        assert_eq!(left_recursive_cycles(&map).len(), 1);
    }

    #[test]
    fn test_empty_grammar() {
        assert_eq!(validate_grammar(&RuleMap::default()), Err(GrammarError::Empty));
    }
}
