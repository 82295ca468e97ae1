use crate::style::owned_css::{AtRuleBlock, Container, Node, OwnedDeclaration, OwnedRule};

/// Minified length of one declaration: `prop:value` plus `!important`.
pub fn declaration_bytes(decl: &OwnedDeclaration) -> usize {
    let important = if decl.important { "!important".len() } else { 0 };
    decl.property.len() + 1 + decl.value.len() + important
}

/// Additive estimate of a rule's minified size: selectors plus one comma per
/// extra selector, two braces, declarations plus one semicolon per extra
/// declaration. A rule without declarations is dropped from the output and
/// costs nothing.
pub fn estimated_bytes(rule: &OwnedRule) -> usize {
    if rule.declarations.is_empty() {
        return 0;
    }
    let selectors: usize = rule.selectors.iter().map(|s| s.text().len()).sum();
    let selector_separators = rule.selectors.len().saturating_sub(1);
    let declarations: usize = rule.declarations.iter().map(declaration_bytes).sum();
    let declaration_separators = rule.declarations.len() - 1;
    selectors + selector_separators + 2 + declarations + declaration_separators
}

/// Only a strict improvement counts; ties keep the original rules.
pub fn plan_is_smaller(original: &[&OwnedRule], merged: &[&OwnedRule]) -> bool {
    let before: usize = original.iter().map(|rule| estimated_bytes(rule)).sum();
    let after: usize = merged.iter().map(|rule| estimated_bytes(rule)).sum();
    after < before
}

/// Estimate for every rule in a container, nested containers included.
pub fn estimated_container_bytes(container: &Container) -> usize {
    container
        .nodes
        .iter()
        .map(|node| match node {
            Node::Rule(rule) => estimated_bytes(rule),
            Node::AtRule(at_rule) => match &at_rule.block {
                Some(AtRuleBlock::Nested(nested)) => estimated_container_bytes(nested),
                _ => 0,
            },
            Node::Comment(_) | Node::Verbatim(_) => 0,
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::owned_css::Selector;

    fn rule(selectors: &[&str], pairs: &[(&str, &str)]) -> OwnedRule {
        OwnedRule::new(
            selectors.iter().map(|s| Selector::parse(s)).collect(),
            pairs
                .iter()
                .map(|(p, v)| OwnedDeclaration::new(*p, *v, false))
                .collect(),
        )
    }

    #[test]
    fn test_estimate_matches_minified_length() {
        let r = rule(&[".test0"], &[("color", "red"), ("border", "none"), ("margin", "0")]);
        assert_eq!(estimated_bytes(&r), r.to_string().len());
        let joined = rule(&["h1", "h2"], &[("display", "block")]);
        assert_eq!(estimated_bytes(&joined), "h1,h2{display:block}".len());
    }

    #[test]
    fn test_important_counts() {
        let r = OwnedRule::new(
            vec![Selector::parse("a")],
            vec![OwnedDeclaration::new("color", "red", true)],
        );
        assert_eq!(estimated_bytes(&r), "a{color:red!important}".len());
    }

    #[test]
    fn test_empty_rule_is_free() {
        assert_eq!(estimated_bytes(&rule(&["h1"], &[])), 0);
    }

    #[test]
    fn test_ties_are_rejected() {
        let a = rule(&["a"], &[("color", "red")]);
        let b = rule(&["b"], &[("color", "red")]);
        assert!(!plan_is_smaller(&[&a], &[&b]));
        let merged = rule(&["a", "b"], &[("color", "red")]);
        assert!(plan_is_smaller(&[&a, &b], &[&merged]));
    }
}
