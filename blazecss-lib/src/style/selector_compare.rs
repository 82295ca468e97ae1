use crate::style::capabilities::{pseudo_requirements, Capability, CapabilitySet};
use crate::style::owned_css::Selector;
use cssparser::{ParseError, Parser, ParserInput, Token};

/// ------------------------------
/// 1. Selector feature scanning
/// ------------------------------

/// Supported attribute selector operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeOperator {
    /// [attr="value"]
    Exact,
    /// [attr~="value"]
    Includes,
    /// [attr|="value"]
    DashMatch,
    /// [attr^="value"]
    Prefix,
    /// [attr$="value"]
    Suffix,
    /// [attr*="value"]
    Substring,
}

/// Supported combinators (the descendant combinator needs no capability).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    /// `>`
    Child,
    /// `+`
    AdjacentSibling,
    /// `~`
    GeneralSibling,
}

/// A pseudo-class or pseudo-element as written, e.g. `::-moz-selection`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pseudo {
    pub colons: usize,
    /// Lowercase name without the colons.
    pub name: String,
}

impl Pseudo {
    pub fn spelling(&self) -> String {
        format!("{}{}", ":".repeat(self.colons), self.name)
    }

    /// `webkit` for `::-webkit-scrollbar`.
    pub fn vendor(&self) -> Option<&str> {
        let rest = self.name.strip_prefix('-')?;
        let (vendor, _) = rest.split_once('-')?;
        match vendor {
            "webkit" | "moz" | "ms" | "o" => Some(vendor),
            _ => None,
        }
    }
}

/// Everything in a selector that matters for compatibility.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectorFeatures {
    pub pseudos: Vec<Pseudo>,
    pub combinators: Vec<Combinator>,
    /// Operator (None for `[attr]`) and whether the `i` flag was given.
    pub attributes: Vec<(Option<AttributeOperator>, bool)>,
}

impl SelectorFeatures {
    /// Capabilities an engine needs to understand the selector.
    pub fn requirements(&self) -> Vec<Capability> {
        let mut required = Vec::new();
        for pseudo in &self.pseudos {
            required.extend_from_slice(pseudo_requirements(&pseudo.spelling()));
        }
        for combinator in &self.combinators {
            required.push(match combinator {
                Combinator::GeneralSibling => Capability::Css3Selectors,
                Combinator::Child | Combinator::AdjacentSibling => Capability::Css2Selectors,
            });
        }
        for (operator, insensitive) in &self.attributes {
            required.push(match operator {
                None
                | Some(AttributeOperator::Exact)
                | Some(AttributeOperator::Includes)
                | Some(AttributeOperator::DashMatch) => Capability::Css2Selectors,
                Some(_) => Capability::Css3Selectors,
            });
            if *insensitive {
                required.push(Capability::CaseInsensitiveAttributes);
            }
        }
        required
    }

    /// Vendor prefixes in source order.
    pub fn vendors(&self) -> Vec<&str> {
        self.pseudos.iter().filter_map(Pseudo::vendor).collect()
    }
}

/// Scan a selector's text for pseudos, combinators and attribute selectors.
/// Arguments of functional pseudos (`:not(a > b)`) are scanned as well.
pub fn scan_features(selector: &str) -> SelectorFeatures {
    let mut input = ParserInput::new(selector);
    let mut parser = Parser::new(&mut input);
    let mut features = SelectorFeatures::default();
    scan_tokens(&mut parser, &mut features);
    features
}

fn scan_tokens<'i>(input: &mut Parser<'i, '_>, features: &mut SelectorFeatures) {
    while let Ok(token) = input.next_including_whitespace_and_comments().cloned() {
        match token {
            Token::Delim('>') => features.combinators.push(Combinator::Child),
            Token::Delim('+') => features.combinators.push(Combinator::AdjacentSibling),
            Token::Delim('~') => features.combinators.push(Combinator::GeneralSibling),
            Token::SquareBracketBlock => {
                let attribute = input
                    .parse_nested_block(|inner| Ok::<_, ParseError<'i, ()>>(read_attribute(inner)));
                features.attributes.push(attribute.unwrap_or((None, false)));
            }
            Token::Colon => scan_pseudo(input, features),
            _ => {}
        }
    }
}

/// Read the pseudo after a `:` token.
fn scan_pseudo<'i>(input: &mut Parser<'i, '_>, features: &mut SelectorFeatures) {
    let mut colons = 1;
    loop {
        let state = input.state();
        match input.next_including_whitespace_and_comments().cloned() {
            Ok(Token::Colon) => colons += 1,
            Ok(Token::Ident(name)) => {
                let name = name.to_ascii_lowercase();
                features.pseudos.push(Pseudo { colons, name });
                return;
            }
            Ok(Token::Function(name)) => {
                let name = name.to_ascii_lowercase();
                // `2n+1` is not a combinator.
                if takes_selector_argument(&name) {
                    let _ = input.parse_nested_block(|inner| {
                        scan_tokens(inner, features);
                        Ok::<_, ParseError<'i, ()>>(())
                    });
                }
                features.pseudos.push(Pseudo { colons, name });
                return;
            }
            _ => {
                input.reset(&state);
                return;
            }
        }
    }
}

fn takes_selector_argument(name: &str) -> bool {
    matches!(
        name,
        "not"
            | "is"
            | "matches"
            | "where"
            | "has"
            | "any"
            | "-moz-any"
            | "-webkit-any"
            | "host"
            | "host-context"
            | "slotted"
    )
}

/// Read the inside of `[...]` into its operator and case flag.
fn read_attribute(input: &mut Parser<'_, '_>) -> (Option<AttributeOperator>, bool) {
    let mut operator = None;
    let mut seen_value = false;
    let mut insensitive = false;
    while let Ok(token) = input.next() {
        match token {
            Token::Delim('=') if operator.is_none() => operator = Some(AttributeOperator::Exact),
            Token::IncludeMatch => operator = Some(AttributeOperator::Includes),
            Token::DashMatch => operator = Some(AttributeOperator::DashMatch),
            Token::PrefixMatch => operator = Some(AttributeOperator::Prefix),
            Token::SuffixMatch => operator = Some(AttributeOperator::Suffix),
            Token::SubstringMatch => operator = Some(AttributeOperator::Substring),
            // Whatever follows the value is the flag.
            Token::Ident(flag) if seen_value => insensitive = flag.eq_ignore_ascii_case("i"),
            _ if operator.is_some() => seen_value = true,
            _ => {}
        }
    }
    (operator, insensitive)
}

/// ------------------------------
/// 2. Comparison
/// ------------------------------

/// Structural identity, ignoring insignificant whitespace.
pub fn selectors_equal(a: &Selector, b: &Selector) -> bool {
    a.key() == b.key()
}

/// Identical selector lists, in the same order.
pub fn selector_lists_equal(a: &[Selector], b: &[Selector]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| selectors_equal(x, y))
}

/// Custom-property mixins (`--foo:{...}`) read as rules whose selector ends
/// with a colon; they never share a selector list.
fn is_css_mixin(selector: &Selector) -> bool {
    selector.text().ends_with(':')
}

/// Plain class/id/tag lists never need a capability or carry a vendor.
fn is_simple(selector: &Selector) -> bool {
    let text = selector.text();
    let text = text.strip_prefix('#').unwrap_or(text);
    !text.is_empty()
        && text
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_' | ' '))
}

/// Whether `a` and `b` may be joined into one selector list for the engines
/// described by `capabilities`.
pub fn can_coexist(a: &Selector, b: &Selector, capabilities: &CapabilitySet) -> bool {
    if is_css_mixin(a) || is_css_mixin(b) {
        return false;
    }
    if is_simple(a) && is_simple(b) {
        return true;
    }

    let features_a = scan_features(a.text());
    let features_b = scan_features(b.text());
    if !capabilities.supports_all(&features_a.requirements())
        || !capabilities.supports_all(&features_b.requirements())
    {
        return false;
    }
    if features_a.vendors() != features_b.vendors() {
        return false;
    }

    // `:-ms-input-placeholder` and `::-ms-input-placeholder` target different
    // engines; one of them drops the whole list.
    !features_a.pseudos.iter().any(|pa| {
        pa.vendor().is_some()
            && features_b
                .pseudos
                .iter()
                .any(|pb| pb.name == pa.name && pb.colons != pa.colons)
    })
}

/// `can_coexist` for every selector of `a` against every selector of `b`.
pub fn selector_lists_can_coexist(
    a: &[Selector],
    b: &[Selector],
    capabilities: &CapabilitySet,
) -> bool {
    a.iter()
        .all(|x| b.iter().all(|y| can_coexist(x, y, capabilities)))
}
