use crate::style::capabilities::CapabilitySet;
use crate::style::owned_css::{AtRuleBlock, Node, OwnedDeclaration, OwnedRule};
use crate::style::selector_compare::selector_lists_can_coexist;

/// ------------------------------
/// 1. Property relatedness
/// ------------------------------

/// Shorthands whose longhands do not share their name as a prefix.
const IRREGULAR_SHORTHANDS: &[(&str, &[&str])] = &[
    ("font", &["line-height"]),
    ("inset", &["top", "right", "bottom", "left"]),
    ("place-content", &["align-content", "justify-content"]),
    ("place-items", &["align-items", "justify-items"]),
    ("place-self", &["align-self", "justify-self"]),
    ("gap", &["row-gap", "column-gap", "grid-row-gap", "grid-column-gap"]),
    ("grid-gap", &["row-gap", "column-gap", "grid-row-gap", "grid-column-gap"]),
    ("columns", &["column-width", "column-count"]),
    ("flex-flow", &["flex-direction", "flex-wrap"]),
    (
        "grid-area",
        &["grid-row-start", "grid-row-end", "grid-column-start", "grid-column-end"],
    ),
];

fn unprefixed(property: &str) -> String {
    let lower = property.to_ascii_lowercase();
    if lower.starts_with("--") {
        return lower;
    }
    for vendor in ["-webkit-", "-moz-", "-ms-", "-o-"] {
        if let Some(rest) = lower.strip_prefix(vendor) {
            return rest.to_string();
        }
    }
    lower
}

/// Whether writing one property can change the value of the other. Errs on
/// the side of "related": `margin`/`margin-top`, `border-color`/
/// `border-top-color`, `border-top-color`/`border-top-style`, `font`/
/// `line-height` and `all`/anything are related. `text-align`/
/// `text-transform` are not.
pub fn properties_related(a: &str, b: &str) -> bool {
    let a = unprefixed(a);
    let b = unprefixed(b);
    if a == b {
        return true;
    }
    if a.starts_with("--") || b.starts_with("--") {
        return false;
    }
    if a == "all" || b == "all" {
        return true;
    }

    let parts_a: Vec<&str> = a.split('-').collect();
    let parts_b: Vec<&str> = b.split('-').collect();
    let (short, long) = if parts_a.len() <= parts_b.len() {
        (&parts_a, &parts_b)
    } else {
        (&parts_b, &parts_a)
    };
    if long.starts_with(short) {
        return true;
    }
    // border-color / border-top-color, border-radius / border-top-left-radius
    if short.len() == 2 && short.first() == long.first() && short.last() == long.last() {
        return true;
    }
    // border-bottom-color / border-bottom-style
    if short.len() >= 3 && short[..2] == long[..2] {
        return true;
    }

    IRREGULAR_SHORTHANDS.iter().any(|(shorthand, longhands)| {
        (a == *shorthand && longhands.contains(&b.as_str()))
            || (b == *shorthand && longhands.contains(&a.as_str()))
    })
}

/// ------------------------------
/// 2. Extraction planning
/// ------------------------------

/// How two declaration lists split into a shared part and two residuals.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    /// In the first rule's order.
    pub shared: Vec<OwnedDeclaration>,
    pub residual_a: Vec<OwnedDeclaration>,
    pub residual_b: Vec<OwnedDeclaration>,
}

/// Narrow `candidates` to the declarations that can move into a combined
/// rule emitted after `a`'s residual and before `b`'s residual.
///
/// A shared declaration is kept only when
/// - no residual declaration of `a` after it writes a related property,
/// - no residual declaration of `b` before it writes a related property,
/// - every related shared declaration keeps its relative order in `b`.
///
/// Dropping one declaration turns it into a residual, which may block
/// others, so this runs to a fixed point.
pub fn plan_extraction(
    a: &[OwnedDeclaration],
    b: &[OwnedDeclaration],
    candidates: &[OwnedDeclaration],
) -> Extraction {
    let mut used_a = vec![false; a.len()];
    let mut used_b = vec![false; b.len()];
    let mut pairs: Vec<(usize, usize)> = Vec::new();

    for candidate in candidates {
        let in_a = (0..a.len()).find(|&i| !used_a[i] && a[i] == *candidate);
        let in_b = (0..b.len()).find(|&i| !used_b[i] && b[i] == *candidate);
        if let (Some(ia), Some(ib)) = (in_a, in_b) {
            used_a[ia] = true;
            used_b[ib] = true;
            pairs.push((ia, ib));
        }
    }
    pairs.sort_unstable();

    loop {
        let blocked = pairs.iter().position(|&(ia, ib)| {
            let property = &a[ia].property;
            let residual_after_in_a = (ia + 1..a.len())
                .any(|q| !used_a[q] && properties_related(&a[q].property, property));
            let residual_before_in_b =
                (0..ib).any(|q| !used_b[q] && properties_related(&b[q].property, property));
            let reordered = pairs.iter().any(|&(ja, jb)| {
                ja < ia && jb > ib && properties_related(&a[ja].property, property)
            });
            residual_after_in_a || residual_before_in_b || reordered
        });
        match blocked {
            Some(index) => {
                let (ia, ib) = pairs.remove(index);
                used_a[ia] = false;
                used_b[ib] = false;
            }
            None => break,
        }
    }

    let residual = |list: &[OwnedDeclaration], used: &[bool]| -> Vec<OwnedDeclaration> {
        list.iter()
            .zip(used)
            .filter(|(_, used)| !**used)
            .map(|(decl, _)| decl.clone())
            .collect()
    };
    Extraction {
        shared: pairs.iter().map(|&(ia, _)| a[ia].clone()).collect(),
        residual_a: residual(a, &used_a),
        residual_b: residual(b, &used_b),
    }
}

/// ------------------------------
/// 3. Safety checks
/// ------------------------------

/// Whether moving `moved` across the `intervening` siblings leaves every
/// winning value alone. Overlap between selectors is never assumed to be
/// disjoint, so any intervening write to a related property is unsafe. So
/// are nested containers, nested style rules and statements such as
/// `@import`; only comments and opaque blocks like `@font-face` are not.
pub fn intervening_is_transparent(intervening: &[Node], moved: &[OwnedDeclaration]) -> bool {
    intervening.iter().all(|node| match node {
        Node::Rule(rule) => !rule.declarations.iter().any(|written| {
            moved
                .iter()
                .any(|decl| properties_related(&written.property, &decl.property))
        }),
        Node::Comment(_) => true,
        Node::AtRule(at_rule) => matches!(at_rule.block, Some(AtRuleBlock::Verbatim(_))),
        Node::Verbatim(_) => false,
    })
}

/// Whether `shared` can be pulled out of `rule_a` and `rule_b` into one
/// combined rule without changing the cascade.
pub fn safe_to_extract(
    rule_a: &OwnedRule,
    rule_b: &OwnedRule,
    intervening: &[Node],
    shared: &[OwnedDeclaration],
    capabilities: &CapabilitySet,
) -> bool {
    if shared.is_empty() {
        return false;
    }
    if !selector_lists_can_coexist(&rule_a.selectors, &rule_b.selectors, capabilities) {
        return false;
    }
    if !intervening_is_transparent(intervening, shared) {
        return false;
    }
    plan_extraction(&rule_a.declarations, &rule_b.declarations, shared).shared.len()
        == shared.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::owned_css::{
        AtRule, Comment, Container, ContainerKind, Selector, VerbatimRule,
    };

    fn decls(pairs: &[(&str, &str)]) -> Vec<OwnedDeclaration> {
        pairs
            .iter()
            .map(|(property, value)| OwnedDeclaration::new(*property, *value, false))
            .collect()
    }

    fn rule(selector: &str, pairs: &[(&str, &str)]) -> OwnedRule {
        OwnedRule::new(vec![Selector::parse(selector)], decls(pairs))
    }

    #[test]
    fn test_related_properties() {
        assert!(properties_related("margin", "margin-top"));
        assert!(properties_related("overflow", "overflow-x"));
        assert!(properties_related("border-color", "border-bottom-color"));
        assert!(properties_related("background", "-webkit-background-clip"));
        assert!(properties_related("font", "line-height"));
        assert!(properties_related("all", "color"));
        assert!(!properties_related("text-align", "text-transform"));
        assert!(properties_related("border-bottom-color", "border-bottom-style"));
        assert!(properties_related("grid-template-rows", "grid-template-areas"));
        assert!(!properties_related("margin-top", "margin-bottom"));
        assert!(!properties_related("font-family", "font-weight"));
        assert!(!properties_related("color", "background-color"));
        assert!(!properties_related("--color", "color"));
    }

    #[test]
    fn test_extraction_moves_independent_declarations() {
        let a = decls(&[("color", "red"), ("border", "none"), ("margin", "0")]);
        let b = decls(&[("color", "green"), ("border", "none"), ("margin", "0")]);
        let extraction = plan_extraction(&a, &b, &decls(&[("border", "none"), ("margin", "0")]));
        assert_eq!(extraction.shared, decls(&[("border", "none"), ("margin", "0")]));
        assert_eq!(extraction.residual_a, decls(&[("color", "red")]));
        assert_eq!(extraction.residual_b, decls(&[("color", "green")]));
    }

    #[test]
    fn test_extraction_blocked_by_later_override_in_first() {
        let a = decls(&[("display", "inline-block"), ("display", "block")]);
        let b = decls(&[("display", "inline-block")]);
        let extraction = plan_extraction(&a, &b, &decls(&[("display", "inline-block")]));
        assert!(extraction.shared.is_empty());
    }

    #[test]
    fn test_extraction_blocked_by_earlier_shorthand_in_second() {
        let a = decls(&[("margin-bottom", "20px")]);
        let b = decls(&[("margin", "10px"), ("margin-bottom", "20px")]);
        let extraction = plan_extraction(&a, &b, &decls(&[("margin-bottom", "20px")]));
        assert!(extraction.shared.is_empty());
        assert_eq!(extraction.residual_b.len(), 2);
    }

    #[test]
    fn test_extraction_blocked_by_reordering() {
        let a = decls(&[("color", "red"), ("color", "blue")]);
        let b = decls(&[("color", "blue"), ("color", "red")]);
        let extraction = plan_extraction(&a, &b, &a);
        assert!(extraction.shared.is_empty());
    }

    #[test]
    fn test_extraction_reaches_fixed_point() {
        // Dropping `border` (blocked by `border-bottom`) must also drop
        // `border-radius`, which would otherwise move after it.
        let a = decls(&[
            ("border-radius", "0"),
            ("border", "1px solid"),
            ("border-bottom", "0"),
        ]);
        let b = decls(&[("border-radius", "0"), ("border", "1px solid"), ("border-top", "0")]);
        let candidates = decls(&[("border-radius", "0"), ("border", "1px solid")]);
        assert!(plan_extraction(&a, &b, &candidates).shared.is_empty());
    }

    #[test]
    fn test_intervening_rules_writing_shared_properties() {
        let moved = decls(&[("color", "red")]);
        let writer = Node::Rule(rule(".x", &[("color", "blue")]));
        let bystander = Node::Rule(rule(".y", &[("margin", "0")]));
        let comment = Node::Comment(Comment {
            before: String::new(),
            text: "/* c */".to_string(),
        });
        assert!(intervening_is_transparent(&[bystander, comment], &moved));
        assert!(!intervening_is_transparent(&[writer], &moved));
    }

    #[test]
    fn test_nested_container_is_a_barrier() {
        let media = Node::AtRule(AtRule {
            before: String::new(),
            name: "media".to_string(),
            params: " print".to_string(),
            block: Some(AtRuleBlock::Nested(Container::new(
                ContainerKind::Conditional,
                Vec::new(),
            ))),
        });
        assert!(!intervening_is_transparent(&[media], &decls(&[("color", "red")])));
    }

    #[test]
    fn test_statements_and_nested_rules_are_barriers() {
        let moved = decls(&[("color", "red")]);
        let at_rule = |name: &str, block: Option<AtRuleBlock>| {
            Node::AtRule(AtRule {
                before: String::new(),
                name: name.to_string(),
                params: String::new(),
                block,
            })
        };
        assert!(!intervening_is_transparent(&[at_rule("import", None)], &moved));
        assert!(!intervening_is_transparent(&[at_rule("namespace", None)], &moved));
        let nested = Node::Verbatim(VerbatimRule {
            before: String::new(),
            text: "h1{h2{}}".to_string(),
        });
        assert!(!intervening_is_transparent(&[nested], &moved));
        let font_face = at_rule("font-face", Some(AtRuleBlock::Verbatim("src:url(a)".to_string())));
        assert!(intervening_is_transparent(&[font_face], &moved));
    }

    #[test]
    fn test_safe_to_extract() {
        let caps = CapabilitySet::modern();
        let a = rule("h1", &[("color", "red")]);
        let b = rule("h2", &[("color", "red"), ("text-decoration", "underline")]);
        let shared = decls(&[("color", "red")]);
        assert!(safe_to_extract(&a, &b, &[], &shared, &caps));
        assert!(!safe_to_extract(&a, &b, &[], &[], &caps));

        let placeholder = rule("::placeholder", &[("color", "red")]);
        assert!(!safe_to_extract(
            &placeholder,
            &b,
            &[],
            &shared,
            &CapabilitySet::legacy()
        ));
    }
}
