// src/style/owned_css.rs (the fully-owned stylesheet tree the merge engine works on)
use cssparser::{ParseError, Parser, ParserInput, Token};
use std::fmt;
use std::hash::{Hash, Hasher};

/// What kind of scope a container is. Only `Stylesheet` and `Conditional`
/// containers are ever planned; keyframes pass through untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    Stylesheet,
    /// `@media`, `@supports`, `@layer`, ...
    Conditional,
    Keyframes,
}

/// An ordered list of children forming one merge boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct Container {
    pub kind: ContainerKind,
    pub nodes: Vec<Node>,
    /// Whitespace before the closing brace (or end of input for the root).
    pub after: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Rule(OwnedRule),
    Comment(Comment),
    AtRule(AtRule),
    /// A style rule holding nested rules, kept byte for byte.
    Verbatim(VerbatimRule),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    pub before: String,
    /// Full comment text including the `/*` and `*/` markers.
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VerbatimRule {
    pub before: String,
    /// Selector, block and closing brace.
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AtRule {
    pub before: String,
    /// Name without the `@`, e.g. "media".
    pub name: String,
    /// Raw text between the name and the `{` or `;`.
    pub params: String,
    /// `None` for statements such as `@charset "utf-8";`.
    pub block: Option<AtRuleBlock>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AtRuleBlock {
    Nested(Container),
    /// Bodies kept byte for byte, e.g. `@font-face`.
    Verbatim(String),
}

/// One complex selector out of a selector list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    text: String,
    key: String,
}

/// A (property, value, important) triple. Equality and hashing only look at
/// the logical triple, never at the source formatting.
#[derive(Debug, Clone)]
pub struct OwnedDeclaration {
    pub property: String,
    /// Normalized value: comments removed, whitespace collapsed.
    pub value: String,
    pub important: bool,
    pub raws: Option<DeclarationRaws>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclarationRaws {
    /// Whitespace and comments ahead of the property name.
    pub before: String,
    /// Exact source text of the declaration.
    pub text: String,
    /// Whitespace between the value and the `;` or `}`.
    pub after: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OwnedRule {
    /// e.g. "div", ".red", "#header > a"
    pub selectors: Vec<Selector>,
    pub declarations: Vec<OwnedDeclaration>,
    /// Source formatting; `None` for rules built by the merge planner.
    pub raws: Option<RuleRaws>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleRaws {
    pub before: String,
    pub selector: String,
    pub between: String,
    /// Whether the last declaration was followed by a `;`.
    pub semicolon: bool,
    pub after: String,
}

impl Container {
    pub fn new(kind: ContainerKind, nodes: Vec<Node>) -> Self {
        Container {
            kind,
            nodes,
            after: String::new(),
        }
    }
}

impl AtRule {
    pub fn container(&self) -> Option<&Container> {
        match &self.block {
            Some(AtRuleBlock::Nested(container)) => Some(container),
            _ => None,
        }
    }
}

impl Selector {
    pub fn parse(raw: &str) -> Self {
        Selector {
            text: normalize_tokens(raw, false),
            key: normalize_tokens(raw, true),
        }
    }

    /// Whitespace-collapsed text used when printing new selector lists.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Comparison key: `text` without the whitespace around combinators.
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl OwnedDeclaration {
    pub fn new(property: impl Into<String>, value: impl Into<String>, important: bool) -> Self {
        OwnedDeclaration {
            property: property.into(),
            value: value.into(),
            important,
            raws: None,
        }
    }
}

impl PartialEq for OwnedDeclaration {
    fn eq(&self, other: &Self) -> bool {
        self.property == other.property
            && self.value == other.value
            && self.important == other.important
    }
}

impl Eq for OwnedDeclaration {}

impl Hash for OwnedDeclaration {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.property.hash(state);
        self.value.hash(state);
        self.important.hash(state);
    }
}

impl OwnedRule {
    /// A rule with default formatting.
    pub fn new(selectors: Vec<Selector>, declarations: Vec<OwnedDeclaration>) -> Self {
        OwnedRule {
            selectors,
            declarations,
            raws: None,
        }
    }

    /// Rules with no selectors or no declarations never take part in a merge.
    pub fn is_merge_candidate(&self) -> bool {
        !self.selectors.is_empty() && !self.declarations.is_empty()
    }

    /// Same selectors and formatting, different declarations.
    pub fn with_declarations(&self, declarations: Vec<OwnedDeclaration>) -> Self {
        OwnedRule {
            selectors: self.selectors.clone(),
            declarations,
            raws: self.raws.clone(),
        }
    }

    pub fn selector_text(&self) -> String {
        self.selectors
            .iter()
            .map(Selector::text)
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl fmt::Display for OwnedDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.property, self.value)?;
        if self.important {
            f.write_str("!important")?;
        }
        Ok(())
    }
}

/// Default formatting: `h1,h2{color:red;margin:0}`.
impl fmt::Display for OwnedRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{{", self.selector_text())?;
        for (index, decl) in self.declarations.iter().enumerate() {
            if index > 0 {
                f.write_str(";")?;
            }
            write!(f, "{}", decl)?;
        }
        f.write_str("}")
    }
}

/// Writes tokens back as text with comments dropped and whitespace runs
/// collapsed to one space. Strings and escapes keep their source spelling.
pub(crate) struct TokenWriter {
    out: String,
    pending_space: bool,
    /// Drop the spaces around top-level `>`, `+` and `~`.
    tight_combinators: bool,
    after_combinator: bool,
}

impl TokenWriter {
    pub(crate) fn new(tight_combinators: bool) -> Self {
        TokenWriter {
            out: String::new(),
            pending_space: false,
            tight_combinators,
            after_combinator: false,
        }
    }

    fn write_text(&mut self, text: &str) {
        if self.pending_space && !self.out.is_empty() {
            self.out.push(' ');
        }
        self.pending_space = false;
        self.after_combinator = false;
        self.out.push_str(text);
    }

    /// Write the next token of `input`, including the contents of a block it
    /// opens. Returns the token, or `None` at the end of the input.
    pub(crate) fn write_token<'i>(
        &mut self,
        input: &mut Parser<'i, '_>,
        top_level: bool,
    ) -> Option<Token<'i>> {
        let start = input.position();
        let token = input.next_including_whitespace_and_comments().ok()?.clone();
        match &token {
            Token::WhiteSpace(_) => self.pending_space = !self.after_combinator,
            Token::Comment(_) => {}
            Token::Delim(c @ ('>' | '+' | '~')) if top_level && self.tight_combinators => {
                self.pending_space = false;
                self.out.push(*c);
                self.after_combinator = true;
            }
            Token::Function(_)
            | Token::ParenthesisBlock
            | Token::SquareBracketBlock
            | Token::CurlyBracketBlock => {
                self.write_text(input.slice_from(start));
                let _ = input.parse_nested_block(|nested| -> Result<(), ParseError<'i, ()>> {
                    while self.write_token(nested, false).is_some() {}
                    Ok(())
                });
                self.write_text(match token {
                    Token::SquareBracketBlock => "]",
                    Token::CurlyBracketBlock => "}",
                    _ => ")",
                });
            }
            _ => self.write_text(input.slice_from(start)),
        }
        Some(token)
    }

    pub(crate) fn finish(self) -> String {
        self.out
    }
}

fn normalize_tokens(raw: &str, tight_combinators: bool) -> String {
    let mut input = ParserInput::new(raw);
    let mut parser = Parser::new(&mut input);
    let mut writer = TokenWriter::new(tight_combinators);
    while writer.write_token(&mut parser, true).is_some() {}
    writer.finish()
}
