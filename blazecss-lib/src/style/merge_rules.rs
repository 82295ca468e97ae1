use crate::style::capabilities::CapabilitySet;
use crate::style::cascade::{intervening_is_transparent, plan_extraction, safe_to_extract};
use crate::style::declarations::{common_ordered_subset, equal_as_sets};
use crate::style::owned_css::{
    AtRule, AtRuleBlock, Container, ContainerKind, Node, OwnedRule, Selector,
};
use crate::style::selector_compare::{selector_lists_can_coexist, selector_lists_equal};
use crate::style::size::plan_is_smaller;
use log::{debug, trace};
use rayon::prelude::*;

/// A merge decided for two neighbouring rules, fully built before anything
/// in the container is touched.
#[derive(Debug, Clone, PartialEq)]
pub enum MergePlan {
    /// Same declarations: both selector lists share the later rule's
    /// declarations, at the later rule's position.
    Full(OwnedRule),
    /// Same selectors: the earlier rule with the later rule's declarations
    /// appended, at the earlier rule's position.
    SelectorIdentity(OwnedRule),
    /// Common declarations moved into a combined rule that sits between what
    /// is left of each rule. Empty residuals are omitted.
    Partial {
        residual_a: Option<OwnedRule>,
        combined: OwnedRule,
        residual_b: Option<OwnedRule>,
    },
}

impl MergePlan {
    /// Rules the plan emits, in output order.
    pub fn rules(&self) -> Vec<&OwnedRule> {
        match self {
            MergePlan::Full(rule) | MergePlan::SelectorIdentity(rule) => vec![rule],
            MergePlan::Partial {
                residual_a,
                combined,
                residual_b,
            } => residual_a
                .iter()
                .chain(std::iter::once(combined))
                .chain(residual_b.iter())
                .collect(),
        }
    }
}

/// Merge the rules of `container` and, independently, of every nested
/// conditional container. Keyframe containers come back untouched.
pub fn merge_container(container: Container, capabilities: &CapabilitySet) -> Container {
    if container.kind == ContainerKind::Keyframes {
        return container;
    }
    let Container { kind, nodes, after } = container;
    let mut nodes = merge_nested(nodes, capabilities);
    // A pass can leave behind a pair that only the next pass sees, e.g. a
    // selector merge that creates a new partial-merge partner. Every
    // committed plan shrinks the estimated size, so the passes end.
    let mut pass = 1;
    loop {
        let (merged, committed) = plan_rule_list(&nodes, capabilities);
        nodes = merged;
        if committed == 0 {
            break;
        }
        trace!("pass {} committed {} merges", pass, committed);
        pass += 1;
    }
    Container { kind, nodes, after }
}

/// Nested containers share nothing mutable, so they are merged in parallel.
fn merge_nested(nodes: Vec<Node>, capabilities: &CapabilitySet) -> Vec<Node> {
    nodes
        .into_par_iter()
        .map(|node| match node {
            Node::AtRule(AtRule {
                before,
                name,
                params,
                block: Some(AtRuleBlock::Nested(nested)),
            }) => Node::AtRule(AtRule {
                before,
                name,
                params,
                block: Some(AtRuleBlock::Nested(merge_container(nested, capabilities))),
            }),
            other => other,
        })
        .collect()
}

fn rule_at(nodes: &[Node], index: usize) -> Option<&OwnedRule> {
    match nodes.get(index) {
        Some(Node::Rule(rule)) => Some(rule),
        _ => None,
    }
}

/// The next rule that could take part in a merge, unless a nested container
/// or nested rule comes first.
fn next_candidate(rest: &[Node]) -> Option<&OwnedRule> {
    for node in rest {
        match node {
            Node::Rule(rule) if rule.is_merge_candidate() => return Some(rule),
            Node::AtRule(at_rule) if at_rule.container().is_some() => return None,
            Node::Verbatim(_) => return None,
            _ => {}
        }
    }
    None
}

/// One greedy pass in document order. Each rule is only compared with the
/// rule the output currently ends on; merges committed in this pass are not
/// reopened. Returns the new nodes and the number of merges committed.
fn plan_rule_list(nodes: &[Node], capabilities: &CapabilitySet) -> (Vec<Node>, usize) {
    let mut output: Vec<Node> = Vec::with_capacity(nodes.len());
    let mut committed = 0;
    // Index into `output` of the rule the next candidate is compared with.
    let mut previous: Option<usize> = None;

    for (index, node) in nodes.iter().enumerate() {
        match node {
            Node::Rule(rule) if rule.is_merge_candidate() => {
                let plan = previous.and_then(|prev_index| {
                    let prev_rule = rule_at(&output, prev_index)?;
                    let intervening = &output[prev_index + 1..];
                    let next = next_candidate(&nodes[index + 1..]);
                    plan_merge(prev_rule, rule, intervening, next, capabilities)
                        .map(|plan| (prev_index, plan))
                });
                previous = match plan {
                    Some((prev_index, plan)) => {
                        committed += 1;
                        Some(apply_plan(&mut output, prev_index, plan))
                    }
                    None => {
                        output.push(node.clone());
                        Some(output.len() - 1)
                    }
                };
            }
            Node::AtRule(at_rule) if at_rule.container().is_some() => {
                output.push(node.clone());
                previous = None;
            }
            Node::Verbatim(_) => {
                output.push(node.clone());
                previous = None;
            }
            _ => output.push(node.clone()),
        }
    }
    (output, committed)
}

/// Apply a plan to the output and return the index of the rule the next
/// candidate should be compared with.
fn apply_plan(output: &mut Vec<Node>, prev_index: usize, plan: MergePlan) -> usize {
    match plan {
        MergePlan::Full(rule) => {
            output.remove(prev_index);
            output.push(Node::Rule(rule));
            output.len() - 1
        }
        MergePlan::SelectorIdentity(rule) => {
            output[prev_index] = Node::Rule(rule);
            prev_index
        }
        MergePlan::Partial {
            residual_a,
            combined,
            residual_b,
        } => {
            match residual_a {
                Some(rule) => output[prev_index] = Node::Rule(rule),
                None => {
                    output.remove(prev_index);
                }
            }
            output.push(Node::Rule(combined));
            if let Some(rule) = residual_b {
                output.push(Node::Rule(rule));
            }
            output.len() - 1
        }
    }
}

fn joined_selectors(a: &OwnedRule, b: &OwnedRule) -> Vec<Selector> {
    a.selectors.iter().chain(&b.selectors).cloned().collect()
}

/// Decide how (and whether) `b` merges into the preceding rule `a`.
/// `intervening` holds the comments and statements between them; `next` is
/// the rule after `b`, used to defer a partial merge when `b` shares more
/// with it.
pub fn plan_merge(
    a: &OwnedRule,
    b: &OwnedRule,
    intervening: &[Node],
    next: Option<&OwnedRule>,
    capabilities: &CapabilitySet,
) -> Option<MergePlan> {
    if !a.is_merge_candidate() || !b.is_merge_candidate() {
        return None;
    }
    let originals = [a, b];

    if equal_as_sets(&a.declarations, &b.declarations)
        && safe_to_extract(a, b, intervening, &a.declarations, capabilities)
    {
        let merged = OwnedRule::new(joined_selectors(a, b), b.declarations.clone());
        if !plan_is_smaller(&originals, &[&merged]) {
            trace!("full merge of {} and {} would not shrink", a.selector_text(), b.selector_text());
            return None;
        }
        debug!("full merge: {} + {}", a.selector_text(), b.selector_text());
        return Some(MergePlan::Full(merged));
    }

    if selector_lists_equal(&a.selectors, &b.selectors) {
        if !intervening_is_transparent(intervening, &b.declarations) {
            return None;
        }
        let declarations = a.declarations.iter().chain(&b.declarations).cloned().collect();
        let merged = a.with_declarations(declarations);
        if !plan_is_smaller(&originals, &[&merged]) {
            return None;
        }
        debug!("selector merge: {}", a.selector_text());
        return Some(MergePlan::SelectorIdentity(merged));
    }

    let common = common_ordered_subset(&a.declarations, &b.declarations);
    if common.is_empty()
        || !selector_lists_can_coexist(&a.selectors, &b.selectors, capabilities)
    {
        return None;
    }
    if let Some(next) = next {
        if selector_lists_can_coexist(&b.selectors, &next.selectors, capabilities)
            && common_ordered_subset(&b.declarations, &next.declarations).len() > common.len()
        {
            trace!("deferring {} to merge forward with {}", b.selector_text(), next.selector_text());
            return None;
        }
    }

    let extraction = plan_extraction(&a.declarations, &b.declarations, &common);
    if !safe_to_extract(a, b, intervening, &extraction.shared, capabilities) {
        return None;
    }
    let plan = MergePlan::Partial {
        residual_a: (!extraction.residual_a.is_empty())
            .then(|| a.with_declarations(extraction.residual_a.clone())),
        combined: OwnedRule::new(joined_selectors(a, b), extraction.shared),
        residual_b: (!extraction.residual_b.is_empty())
            .then(|| b.with_declarations(extraction.residual_b.clone())),
    };
    if !plan_is_smaller(&originals, &plan.rules()) {
        trace!(
            "partial merge of {} and {} would not shrink",
            a.selector_text(),
            b.selector_text()
        );
        return None;
    }
    debug!("partial merge: {} + {}", a.selector_text(), b.selector_text());
    Some(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::owned_css::{Comment, OwnedDeclaration, VerbatimRule};
    use crate::style::size::estimated_container_bytes;

    fn rule(selectors: &[&str], pairs: &[(&str, &str)]) -> OwnedRule {
        OwnedRule::new(
            selectors.iter().map(|s| Selector::parse(s)).collect(),
            pairs
                .iter()
                .map(|(p, v)| OwnedDeclaration::new(*p, *v, false))
                .collect(),
        )
    }

    fn sheet(rules: Vec<OwnedRule>) -> Container {
        Container::new(
            ContainerKind::Stylesheet,
            rules.into_iter().map(Node::Rule).collect(),
        )
    }

    fn printed(container: &Container) -> Vec<String> {
        container
            .nodes
            .iter()
            .map(|node| match node {
                Node::Rule(rule) => rule.to_string(),
                Node::Comment(comment) => comment.text.clone(),
                Node::AtRule(at_rule) => format!("@{}", at_rule.name),
                Node::Verbatim(verbatim) => verbatim.text.clone(),
            })
            .collect()
    }

    #[test]
    fn test_full_merge() {
        let merged = merge_container(
            sheet(vec![
                rule(&["h1"], &[("display", "block")]),
                rule(&["h2"], &[("display", "block")]),
            ]),
            &CapabilitySet::legacy(),
        );
        assert_eq!(printed(&merged), vec!["h1,h2{display:block}"]);
    }

    #[test]
    fn test_selector_identity_merge() {
        let merged = merge_container(
            sheet(vec![
                rule(&["h1"], &[("display", "block")]),
                rule(&["h1"], &[("text-decoration", "underline")]),
            ]),
            &CapabilitySet::legacy(),
        );
        assert_eq!(
            printed(&merged),
            vec!["h1{display:block;text-decoration:underline}"]
        );
    }

    #[test]
    fn test_partial_merge_plan_parts() {
        let a = rule(&[".test0"], &[("color", "red"), ("border", "none"), ("margin", "0")]);
        let b = rule(&[".test1"], &[("color", "green"), ("border", "none"), ("margin", "0")]);
        let plan = plan_merge(&a, &b, &[], None, &CapabilitySet::legacy());
        let rendered: Vec<String> = plan
            .as_ref()
            .map(|plan| plan.rules().iter().map(|r| r.to_string()).collect())
            .unwrap_or_default();
        assert_eq!(
            rendered,
            vec![
                ".test0{color:red}",
                ".test0,.test1{border:none;margin:0}",
                ".test1{color:green}"
            ]
        );
    }

    #[test]
    fn test_size_rejection() {
        let a = rule(&[".test0"], &[("color", "red"), ("border", "none"), ("margin", "0")]);
        let b = rule(
            &[".longlonglonglong"],
            &[("color", "green"), ("border", "none"), ("margin", "0")],
        );
        assert_eq!(plan_merge(&a, &b, &[], None, &CapabilitySet::modern()), None);
    }

    #[test]
    fn test_lookahead_defers_partial_merge() {
        let merged = merge_container(
            sheet(vec![
                rule(&["h1"], &[("color", "black")]),
                rule(&["h2"], &[("color", "black"), ("font-weight", "bold")]),
                rule(&["h3"], &[("color", "black"), ("font-weight", "bold")]),
            ]),
            &CapabilitySet::legacy(),
        );
        assert_eq!(
            printed(&merged),
            vec!["h1{color:black}", "h2,h3{color:black;font-weight:bold}"]
        );
    }

    #[test]
    fn test_comments_stay_in_place() {
        let container = Container::new(
            ContainerKind::Stylesheet,
            vec![
                Node::Rule(rule(&["h1"], &[("color", "red")])),
                Node::Comment(Comment {
                    before: String::new(),
                    text: "/* c */".to_string(),
                }),
                Node::Rule(rule(&["h2"], &[("color", "red")])),
            ],
        );
        let merged = merge_container(container, &CapabilitySet::legacy());
        assert_eq!(printed(&merged), vec!["/* c */", "h1,h2{color:red}"]);
    }

    #[test]
    fn test_empty_rules_pass_through() {
        let merged = merge_container(
            sheet(vec![rule(&["h1"], &[]), rule(&["h2"], &[])]),
            &CapabilitySet::legacy(),
        );
        assert_eq!(printed(&merged), vec!["h1{}", "h2{}"]);
    }

    #[test]
    fn test_keyframes_untouched() {
        let keyframes = Container::new(
            ContainerKind::Keyframes,
            vec![
                Node::Rule(rule(&["0%"], &[("color", "red")])),
                Node::Rule(rule(&["to"], &[("color", "red")])),
            ],
        );
        assert_eq!(
            merge_container(keyframes.clone(), &CapabilitySet::modern()),
            keyframes
        );
    }

    #[test]
    fn test_never_grows_and_is_idempotent() {
        let input = sheet(vec![
            rule(&["h1"], &[("color", "red"), ("text-decoration", "underline")]),
            rule(&["h2"], &[("text-decoration", "underline"), ("color", "green")]),
            rule(&["h3"], &[("font-weight", "bold"), ("color", "green")]),
        ]);
        let caps = CapabilitySet::legacy();
        let once = merge_container(input.clone(), &caps);
        assert!(estimated_container_bytes(&once) <= estimated_container_bytes(&input));
        let twice = merge_container(once.clone(), &caps);
        assert_eq!(twice, once);
    }

    #[test]
    fn test_passes_repeat_until_nothing_merges() {
        // The selector merge of the two `b` rules only happens after `a` was
        // compared with the first of them.
        let merged = merge_container(
            sheet(vec![
                rule(&["a"], &[("margin", "1px"), ("margin", "1px"), ("color", "red")]),
                rule(&["b"], &[("margin", "1px"), ("margin", "0")]),
                rule(&["b"], &[("top", "0"), ("color", "red")]),
            ]),
            &CapabilitySet::modern(),
        );
        assert_eq!(
            printed(&merged),
            vec![
                "a{margin:1px;margin:1px}",
                "a,b{color:red}",
                "b{margin:1px;margin:0;top:0}"
            ]
        );
        assert_eq!(merge_container(merged.clone(), &CapabilitySet::modern()), merged);
    }

    #[test]
    fn test_nested_rules_are_barriers() {
        let container = Container::new(
            ContainerKind::Stylesheet,
            vec![
                Node::Rule(rule(&["h1"], &[("color", "red")])),
                Node::Verbatim(VerbatimRule {
                    before: String::new(),
                    text: ".a{&:hover{color:blue}}".to_string(),
                }),
                Node::Rule(rule(&["h2"], &[("color", "red")])),
            ],
        );
        assert_eq!(
            merge_container(container.clone(), &CapabilitySet::modern()),
            container
        );
    }
}
