//! Turns an owned stylesheet tree back into CSS text.
//!
//! Rules and declarations that still carry source raws print exactly as they
//! were read; rules built by the merge planner use the compact default form.

use crate::style::owned_css::{AtRule, AtRuleBlock, Container, Node, OwnedRule};

pub fn print_container(container: &Container) -> String {
    let mut out = String::new();
    write_nodes(&mut out, container);
    out
}

fn write_nodes(out: &mut String, container: &Container) {
    for node in &container.nodes {
        match node {
            Node::Rule(rule) => write_rule(out, rule),
            Node::Comment(comment) => {
                out.push_str(&comment.before);
                out.push_str(&comment.text);
            }
            Node::AtRule(at_rule) => write_at_rule(out, at_rule),
            Node::Verbatim(verbatim) => {
                out.push_str(&verbatim.before);
                out.push_str(&verbatim.text);
            }
        }
    }
    out.push_str(&container.after);
}

fn write_at_rule(out: &mut String, at_rule: &AtRule) {
    out.push_str(&at_rule.before);
    out.push('@');
    out.push_str(&at_rule.name);
    out.push_str(&at_rule.params);
    match &at_rule.block {
        None => out.push(';'),
        Some(AtRuleBlock::Nested(container)) => {
            out.push('{');
            write_nodes(out, container);
            out.push('}');
        }
        Some(AtRuleBlock::Verbatim(body)) => {
            out.push('{');
            out.push_str(body);
            out.push('}');
        }
    }
}

fn write_rule(out: &mut String, rule: &OwnedRule) {
    let Some(raws) = &rule.raws else {
        out.push_str(&rule.to_string());
        return;
    };
    out.push_str(&raws.before);
    out.push_str(&raws.selector);
    out.push_str(&raws.between);
    out.push('{');
    for (index, decl) in rule.declarations.iter().enumerate() {
        if index > 0 {
            out.push(';');
        }
        match &decl.raws {
            Some(decl_raws) => {
                out.push_str(&decl_raws.before);
                out.push_str(&decl_raws.text);
                out.push_str(&decl_raws.after);
            }
            None => out.push_str(&decl.to_string()),
        }
    }
    if raws.semicolon && !rule.declarations.is_empty() {
        out.push(';');
    }
    out.push_str(&raws.after);
    out.push('}');
}
