//! Rule matching engine
//!
//! Compiles raw rules into predicate chains and filters entity lists.
//! Compilation happens once per `filter` call; rules are plain data until
//! then.
//!
//! Constraint evaluation order per (rule, entity) is fixed: kind equality,
//! `if`, `if not`, `must`, `must not`. `must` fires on a missed whole-word
//! match; `must not` fires on a hit of its trailing-anchored pattern.
//! The `must not` pattern has no leading `(^|\s)` anchor, so it can match
//! starting mid-word. That asymmetry is part of the rule-file contract and
//! is covered by tests; do not "fix" it.

use regex::Regex;
use thiserror::Error;

use ridilint_core::Entity;

use crate::schema::{PatternSet, RawRule};

#[derive(Debug, Error)]
pub enum RuleError {
    #[error("invalid pattern `{pattern}` in rule `{rule}`: {source}")]
    Pattern {
        pattern: String,
        /// The rule's reason string, the closest thing a rule has to a name.
        rule: String,
        #[source]
        source: regex::Error,
    },
}

/// One compiled constraint of a rule.
enum Constraint {
    /// Every pattern must whole-word-match the clause, or the rule is
    /// skipped for this entity.
    WholeWordAll(Vec<Regex>),
    /// No pattern may whole-word-match the clause, or the rule is skipped.
    WholeWordNoneOf(Vec<Regex>),
    /// The clause must whole-word-match, or the rule fires.
    MustWholeWord(Regex),
    /// The clause must not match (trailing anchor only), or the rule fires.
    MustNotTrailingWholeWord(Regex),
}

struct CompiledRule {
    kind: String,
    constraints: Vec<Constraint>,
    reason: String,
}

impl CompiledRule {
    /// Returns the failure reason when this rule fires for the entity.
    fn evaluate(&self, entity: &Entity) -> Option<&str> {
        if entity.kind.as_str() != self.kind {
            return None;
        }
        for constraint in &self.constraints {
            match constraint {
                Constraint::WholeWordAll(patterns) => {
                    if patterns.iter().any(|re| !re.is_match(&entity.clause)) {
                        return None;
                    }
                }
                Constraint::WholeWordNoneOf(patterns) => {
                    if patterns.iter().any(|re| re.is_match(&entity.clause)) {
                        return None;
                    }
                }
                Constraint::MustWholeWord(pattern) => {
                    if !pattern.is_match(&entity.clause) {
                        return Some(&self.reason);
                    }
                }
                Constraint::MustNotTrailingWholeWord(pattern) => {
                    if pattern.is_match(&entity.clause) {
                        return Some(&self.reason);
                    }
                }
            }
        }
        None
    }
}

/// Evaluate the ordered rule list against the ordered entity list.
///
/// Entity order is preserved; only entities with a firing rule survive,
/// each carrying the reason of the first rule that fired for it.
pub fn filter(rules: &[RawRule], entities: Vec<Entity>) -> Result<Vec<Entity>, RuleError> {
    let compiled = rules.iter().map(compile).collect::<Result<Vec<_>, _>>()?;

    let mut matched = Vec::new();
    for mut entity in entities {
        for rule in &compiled {
            if let Some(reason) = rule.evaluate(&entity) {
                entity.reason = Some(reason.to_string());
                matched.push(entity);
                break;
            }
        }
    }

    Ok(matched)
}

fn compile(rule: &RawRule) -> Result<CompiledRule, RuleError> {
    let mut constraints = Vec::new();

    if let Some(set) = &rule.if_patterns {
        constraints.push(Constraint::WholeWordAll(compile_whole_word_set(
            set,
            &rule.reason,
        )?));
    }
    if let Some(set) = &rule.if_not_patterns {
        constraints.push(Constraint::WholeWordNoneOf(compile_whole_word_set(
            set,
            &rule.reason,
        )?));
    }
    if let Some(pattern) = &rule.must {
        constraints.push(Constraint::MustWholeWord(compile_whole_word(
            pattern,
            &rule.reason,
        )?));
    }
    if let Some(pattern) = &rule.must_not {
        constraints.push(Constraint::MustNotTrailingWholeWord(compile_pattern(
            &format!("{}($|\\s)", pattern),
            pattern,
            &rule.reason,
        )?));
    }

    Ok(CompiledRule {
        kind: rule.kind.clone(),
        constraints,
        reason: rule.reason.clone(),
    })
}

fn compile_whole_word_set(set: &PatternSet, rule: &str) -> Result<Vec<Regex>, RuleError> {
    set.patterns()
        .iter()
        .map(|pattern| compile_whole_word(pattern, rule))
        .collect()
}

fn compile_whole_word(pattern: &str, rule: &str) -> Result<Regex, RuleError> {
    compile_pattern(&format!("(^|\\s){}($|\\s)", pattern), pattern, rule)
}

fn compile_pattern(expression: &str, pattern: &str, rule: &str) -> Result<Regex, RuleError> {
    Regex::new(expression).map_err(|source| RuleError::Pattern {
        pattern: pattern.to_string(),
        rule: rule.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ridilint_core::EntityKind;

    fn entity(kind: EntityKind, clause: &str) -> Entity {
        Entity::new(1, 0, clause.to_string(), kind)
    }

    fn rule(json: &str) -> RawRule {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_must_fires_on_missed_match() {
        let rules = vec![rule(
            r#"{"type": "class", "must": "class [A-Z]", "reason": "classes are uppercase"}"#,
        )];
        let flagged = filter(&rules, vec![entity(EntityKind::Class, "class abc")]).unwrap();
        assert_eq!(flagged.len(), 1);
        assert_eq!(flagged[0].reason.as_deref(), Some("classes are uppercase"));
    }

    #[test]
    fn test_must_passes_on_match() {
        let rules = vec![rule(
            r#"{"type": "class", "must": "class [A-Z]\\w*", "reason": "r"}"#,
        )];
        let flagged = filter(&rules, vec![entity(EntityKind::Class, "class Abc")]).unwrap();
        assert!(flagged.is_empty());
    }

    #[test]
    fn test_kind_mismatch_never_fires() {
        let rules = vec![rule(
            r#"{"type": "var", "must": "nothing-will-match", "reason": "r"}"#,
        )];
        let flagged = filter(&rules, vec![entity(EntityKind::Class, "class ABC")]).unwrap();
        assert!(flagged.is_empty());
    }

    #[test]
    fn test_whole_word_boundaries() {
        let rules = vec![rule(r#"{"type": "var", "must": "foo", "reason": "r"}"#)];
        let hits = |clause: &str| {
            !filter(&rules, vec![entity(EntityKind::Var, clause)])
                .unwrap()
                .is_empty()
        };
        // `must` fires when `foo` is NOT present as a whole word
        assert!(!hits("a foo b"));
        assert!(!hits("foo b"));
        assert!(!hits("a foo"));
        assert!(!hits("foo"));
        assert!(hits("afoo"));
        assert!(hits("fooa"));
    }

    #[test]
    fn test_if_gates_application() {
        let rules = vec![rule(
            r#"{"type": "var", "if": "legacy", "must": "\\$l_", "reason": "r"}"#,
        )];
        // no `legacy` in the clause: rule does not apply, no reason
        let flagged = filter(&rules, vec![entity(EntityKind::Var, "$foo")]).unwrap();
        assert!(flagged.is_empty());
        // gated in and must misses: fires
        let flagged = filter(&rules, vec![entity(EntityKind::Var, "legacy $foo")]).unwrap();
        assert_eq!(flagged.len(), 1);
    }

    #[test]
    fn test_if_list_requires_all() {
        let rules = vec![rule(
            r#"{"type": "var", "if": ["alpha", "beta"], "must": "never-there", "reason": "r"}"#,
        )];
        let flagged = filter(&rules, vec![entity(EntityKind::Var, "alpha $x")]).unwrap();
        assert!(flagged.is_empty());
        let flagged = filter(&rules, vec![entity(EntityKind::Var, "alpha beta $x")]).unwrap();
        assert_eq!(flagged.len(), 1);
    }

    #[test]
    fn test_if_not_skips_rule() {
        let rules = vec![rule(
            r#"{"type": "var", "if not": "exempt", "must": "never-there", "reason": "r"}"#,
        )];
        let flagged = filter(&rules, vec![entity(EntityKind::Var, "exempt $x")]).unwrap();
        assert!(flagged.is_empty());
        let flagged = filter(&rules, vec![entity(EntityKind::Var, "plain $x")]).unwrap();
        assert_eq!(flagged.len(), 1);
    }

    #[test]
    fn test_must_not_fires_on_match() {
        let rules = vec![rule(
            r#"{"type": "property", "must not": "\\$tmp", "reason": "no temp properties"}"#,
        )];
        let flagged = filter(
            &rules,
            vec![entity(EntityKind::Property, "class A { public $tmp")],
        )
        .unwrap();
        assert_eq!(flagged.len(), 1);
        assert_eq!(flagged[0].reason.as_deref(), Some("no temp properties"));
    }

    #[test]
    fn test_must_not_has_no_leading_anchor() {
        // `must not` matches mid-word at the start: `foo` hits `barfoo`.
        // The symmetric `must` pattern would not.
        let rules = vec![rule(r#"{"type": "var", "must not": "foo", "reason": "r"}"#)];
        let flagged = filter(&rules, vec![entity(EntityKind::Var, "barfoo")]).unwrap();
        assert_eq!(flagged.len(), 1);
        // but the trailing anchor still holds: `fooa` does not hit
        let flagged = filter(&rules, vec![entity(EntityKind::Var, "fooa")]).unwrap();
        assert!(flagged.is_empty());
    }

    #[test]
    fn test_must_then_must_not_in_one_rule() {
        let rules = vec![rule(
            r#"{"type": "var", "must": "\\$\\w+", "must not": "\\$bad", "reason": "r"}"#,
        )];
        // must passes, must not hits
        let flagged = filter(&rules, vec![entity(EntityKind::Var, "$bad")]).unwrap();
        assert_eq!(flagged.len(), 1);
        // must passes, must not clean
        let flagged = filter(&rules, vec![entity(EntityKind::Var, "$good")]).unwrap();
        assert!(flagged.is_empty());
    }

    #[test]
    fn test_first_matching_rule_wins() {
        let rules = vec![
            rule(r#"{"type": "var", "must": "never-there", "reason": "first"}"#),
            rule(r#"{"type": "var", "must": "never-there", "reason": "second"}"#),
        ];
        let flagged = filter(&rules, vec![entity(EntityKind::Var, "$x")]).unwrap();
        assert_eq!(flagged.len(), 1);
        assert_eq!(flagged[0].reason.as_deref(), Some("first"));
    }

    #[test]
    fn test_filter_preserves_entity_order() {
        let rules = vec![rule(
            r#"{"type": "var", "must": "never-there", "reason": "r"}"#,
        )];
        let entities = vec![
            entity(EntityKind::Var, "$a"),
            entity(EntityKind::Class, "class A"),
            entity(EntityKind::Var, "$b"),
            entity(EntityKind::Var, "$c"),
        ];
        let flagged = filter(&rules, entities).unwrap();
        let clauses: Vec<&str> = flagged.iter().map(|e| e.clause.as_str()).collect();
        assert_eq!(clauses, vec!["$a", "$b", "$c"]);
    }

    #[test]
    fn test_invalid_pattern_is_an_error() {
        let rules = vec![rule(r#"{"type": "var", "must": "([", "reason": "r"}"#)];
        assert!(matches!(
            filter(&rules, vec![entity(EntityKind::Var, "$x")]),
            Err(RuleError::Pattern { .. })
        ));
    }
}
