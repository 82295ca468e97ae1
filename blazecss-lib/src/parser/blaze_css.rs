//! This module reads CSS text into the owned stylesheet tree the merge
//! engine works on.
//!
//! Tokenizing and block structure come from `cssparser`; the rule and
//! declaration parsers below slice the source between the positions it
//! reports, so every byte of formatting an untouched rule needs to print back
//! unchanged (see `crate::parser::printer`) is kept. An optional strict pass
//! runs the same text through lightningcss first.

use crate::error::BlazeCssError;
use crate::style::owned_css::{
    AtRule, AtRuleBlock, Comment, Container, ContainerKind, DeclarationRaws, Node,
    OwnedDeclaration, OwnedRule, RuleRaws, Selector, TokenWriter, VerbatimRule,
};
use cssparser::{
    parse_important, AtRuleParser, CowRcStr, DeclarationParser, Delimiter, ParseError, Parser,
    ParserInput, ParserState, QualifiedRuleParser, RuleBodyItemParser, RuleBodyParser,
    SourceLocation, Token,
};
use lightningcss::stylesheet::{ParserOptions, StyleSheet as LightningStyleSheet};
use std::fmt;

/// At-rules whose body is a list of rules merged as its own scope.
const CONDITIONAL_AT_RULES: &[&str] = &[
    "media",
    "supports",
    "document",
    "-moz-document",
    "layer",
    "container",
    "scope",
    "starting-style",
];

/// Parse a whole stylesheet.
///
/// Style rules holding nested rules come back as `Node::Verbatim`.
///
/// # Errors
///
/// Returns `BlazeCssError::Parse` for unterminated blocks or comments, bad
/// strings, a stray `}`, a selector without a block and a declaration
/// without a `:`.
pub fn parse_stylesheet(css: &str) -> Result<Container, BlazeCssError> {
    let mut input = ParserInput::new(css);
    let mut parser = Parser::new(&mut input);
    Ok(read_rule_list(css, &mut parser, ContainerKind::Stylesheet)?)
}

/// Run `css` through the lightningcss parser and report the first error it
/// finds. Nothing from its parse is kept.
pub fn validate_with_lightningcss(css: &str) -> Result<(), BlazeCssError> {
    LightningStyleSheet::parse(css, ParserOptions::default())
        .map(|_| ())
        .map_err(|e| {
            let (line, column) = e
                .loc
                .as_ref()
                .map(|loc| (loc.line + 1, loc.column))
                .unwrap_or((0, 0));
            BlazeCssError::Parse {
                message: e.kind.to_string(),
                line,
                column,
            }
        })
}

#[derive(Debug, Clone, PartialEq)]
enum ReadError {
    UnterminatedBlock,
    UnterminatedComment,
    BlockInValue,
}

impl fmt::Display for ReadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadError::UnterminatedBlock => write!(f, "unterminated block"),
            ReadError::UnterminatedComment => write!(f, "unterminated comment"),
            ReadError::BlockInValue => write!(f, "unexpected block in declaration value"),
        }
    }
}

type ReadResult<'i, T> = Result<T, ParseError<'i, ReadError>>;

/// A node and the byte offset its first token starts at.
struct ReadNode {
    start: usize,
    node: Node,
}

/// Line (0-based) and column (1-based) of a byte offset.
fn location_at(source: &str, offset: usize) -> SourceLocation {
    let consumed = &source[..offset.min(source.len())];
    let line_start = consumed.rfind('\n').map_or(0, |newline| newline + 1);
    SourceLocation {
        line: consumed.matches('\n').count() as u32,
        column: consumed[line_start..].chars().count() as u32 + 1,
    }
}

/// Children of a stylesheet or of a conditional or keyframes block.
fn read_rule_list<'i>(
    source: &'i str,
    input: &mut Parser<'i, '_>,
    kind: ContainerKind,
) -> ReadResult<'i, Container> {
    let mut nodes = Vec::new();
    let mut rule_parser = RuleListParser { source };
    let mut rules = RuleBodyParser::new(input, &mut rule_parser);
    let mut gap_start = rules.input.position().byte_index();
    while let Some(result) = rules.next() {
        let ReadNode { start, mut node } = result.map_err(|(error, _)| error)?;
        let before = read_gap(source, gap_start, start, &mut nodes)?;
        set_before(&mut node, before);
        nodes.push(node);
        gap_start = rules.input.position().byte_index();
    }
    let end = rules.input.position().byte_index();
    let after = read_gap(source, gap_start, end, &mut nodes)?;
    Ok(Container { kind, nodes, after })
}

/// Comments between two nodes become nodes of their own. Returns the
/// whitespace after the last one; anything else in the gap is an error.
fn read_gap<'i>(
    source: &'i str,
    from: usize,
    to: usize,
    nodes: &mut Vec<Node>,
) -> ReadResult<'i, String> {
    let gap = &source[from..to];
    let mut input = ParserInput::new(gap);
    let mut parser = Parser::new(&mut input);
    let mut whitespace_start = 0;
    loop {
        let token_start = parser.position().byte_index();
        let token = match parser.next_including_whitespace_and_comments() {
            Ok(token) => token.clone(),
            Err(_) => break,
        };
        let location = location_at(source, from + token_start);
        match token {
            Token::WhiteSpace(_) => {}
            Token::Comment(_) => {
                let text = &gap[token_start..parser.position().byte_index()];
                if text.len() < 4 || !text.ends_with("*/") {
                    return Err(location.new_custom_error(ReadError::UnterminatedComment));
                }
                nodes.push(Node::Comment(Comment {
                    before: gap[whitespace_start..token_start].to_string(),
                    text: text.to_string(),
                }));
                whitespace_start = parser.position().byte_index();
            }
            other => return Err(location.new_unexpected_token_error(other)),
        }
    }
    Ok(gap[whitespace_start..].to_string())
}

fn set_before(node: &mut Node, before: String) {
    match node {
        Node::Rule(rule) => {
            if let Some(raws) = &mut rule.raws {
                raws.before = before;
            }
        }
        Node::Comment(comment) => comment.before = before,
        Node::AtRule(at_rule) => at_rule.before = before,
        Node::Verbatim(verbatim) => verbatim.before = before,
    }
}

/// The `}` closing a block must be at `end`; cssparser closes blocks silently
/// at the end of input.
fn ensure_closed<'i>(source: &str, end: usize, open: SourceLocation) -> ReadResult<'i, ()> {
    if source.as_bytes().get(end) == Some(&b'}') {
        Ok(())
    } else {
        Err(open.new_custom_error(ReadError::UnterminatedBlock))
    }
}

fn skip_remaining(input: &mut Parser<'_, '_>) {
    while input.next_including_whitespace_and_comments().is_ok() {}
}

/// Consume a rule prelude and return the offsets of its top-level commas.
fn read_prelude<'i>(input: &mut Parser<'i, '_>) -> ReadResult<'i, Vec<usize>> {
    let mut commas = Vec::new();
    loop {
        let location = input.current_source_location();
        let offset = input.position().byte_index();
        let token = match input.next_including_whitespace_and_comments() {
            Ok(token) => token.clone(),
            Err(_) => return Ok(commas),
        };
        match token {
            Token::Comma => commas.push(offset),
            Token::Semicolon | Token::CloseCurlyBracket | Token::BadString(_) | Token::BadUrl(_) => {
                return Err(location.new_unexpected_token_error(token))
            }
            _ => {}
        }
    }
}

struct RulePrelude<'i> {
    /// Selector text as written, without the whitespace before `{`.
    selector: &'i str,
    between: &'i str,
    selectors: Vec<Selector>,
    open: SourceLocation,
}

struct AtRulePrelude {
    name: String,
    params: String,
    open: SourceLocation,
}

struct RuleListParser<'i> {
    source: &'i str,
}

impl<'i> QualifiedRuleParser<'i> for RuleListParser<'i> {
    type Prelude = RulePrelude<'i>;
    type QualifiedRule = ReadNode;
    type Error = ReadError;

    fn parse_prelude<'t>(&mut self, input: &mut Parser<'i, 't>) -> ReadResult<'i, RulePrelude<'i>> {
        let start = input.position().byte_index();
        let commas = read_prelude(input)?;
        let end = input.position().byte_index();

        let prelude = &self.source[start..end];
        let selector = prelude.trim_end_matches(|c: char| c.is_ascii_whitespace());
        let mut selectors = Vec::new();
        let mut from = start;
        for to in commas.into_iter().chain(std::iter::once(start + selector.len())) {
            let parsed = Selector::parse(&self.source[from..to]);
            if !parsed.text().is_empty() {
                selectors.push(parsed);
            }
            from = to + 1;
        }
        Ok(RulePrelude {
            selector,
            between: &prelude[selector.len()..],
            selectors,
            open: input.current_source_location(),
        })
    }

    fn parse_block<'t>(
        &mut self,
        prelude: RulePrelude<'i>,
        start: &ParserState,
        input: &mut Parser<'i, 't>,
    ) -> ReadResult<'i, ReadNode> {
        read_style_rule(self.source, prelude, start, input)
    }
}

impl<'i> AtRuleParser<'i> for RuleListParser<'i> {
    type Prelude = AtRulePrelude;
    type AtRule = ReadNode;
    type Error = ReadError;

    fn parse_prelude<'t>(
        &mut self,
        name: CowRcStr<'i>,
        input: &mut Parser<'i, 't>,
    ) -> ReadResult<'i, AtRulePrelude> {
        let start = input.position();
        read_prelude(input)?;
        Ok(AtRulePrelude {
            name: name.to_string(),
            params: input.slice_from(start).to_string(),
            open: input.current_source_location(),
        })
    }

    fn rule_without_block(
        &mut self,
        prelude: AtRulePrelude,
        start: &ParserState,
    ) -> Result<ReadNode, ()> {
        Ok(ReadNode {
            start: start.position().byte_index(),
            node: Node::AtRule(AtRule {
                before: String::new(),
                name: prelude.name,
                params: prelude.params,
                block: None,
            }),
        })
    }

    fn parse_block<'t>(
        &mut self,
        prelude: AtRulePrelude,
        start: &ParserState,
        input: &mut Parser<'i, 't>,
    ) -> ReadResult<'i, ReadNode> {
        let lower = prelude.name.to_ascii_lowercase();
        let block = if lower.ends_with("keyframes") {
            AtRuleBlock::Nested(read_rule_list(self.source, input, ContainerKind::Keyframes)?)
        } else if CONDITIONAL_AT_RULES.contains(&lower.as_str()) {
            AtRuleBlock::Nested(read_rule_list(self.source, input, ContainerKind::Conditional)?)
        } else {
            let body_start = input.position();
            skip_remaining(input);
            AtRuleBlock::Verbatim(input.slice_from(body_start).to_string())
        };
        ensure_closed(self.source, input.position().byte_index(), prelude.open)?;
        Ok(ReadNode {
            start: start.position().byte_index(),
            node: Node::AtRule(AtRule {
                before: String::new(),
                name: prelude.name,
                params: prelude.params,
                block: Some(block),
            }),
        })
    }
}

impl<'i> DeclarationParser<'i> for RuleListParser<'i> {
    type Declaration = ReadNode;
    type Error = ReadError;
}

impl<'i> RuleBodyItemParser<'i, ReadNode, ReadError> for RuleListParser<'i> {
    fn parse_declarations(&self) -> bool {
        false
    }

    fn parse_qualified(&self) -> bool {
        true
    }
}

enum BodyItem {
    Declaration(OwnedDeclaration),
    /// A nested rule or at-rule.
    Nested,
}

struct DeclarationListParser;

impl<'i> DeclarationParser<'i> for DeclarationListParser {
    type Declaration = BodyItem;
    type Error = ReadError;

    fn parse_value<'t>(
        &mut self,
        name: CowRcStr<'i>,
        input: &mut Parser<'i, 't>,
    ) -> ReadResult<'i, BodyItem> {
        // Custom properties may hold a `{...}` block as their value.
        let (value, important) = read_value(input, name.starts_with("--"))?;
        Ok(BodyItem::Declaration(OwnedDeclaration::new(
            name.to_string(),
            value,
            important,
        )))
    }
}

impl<'i> AtRuleParser<'i> for DeclarationListParser {
    type Prelude = ();
    type AtRule = BodyItem;
    type Error = ReadError;

    fn parse_prelude<'t>(
        &mut self,
        _name: CowRcStr<'i>,
        input: &mut Parser<'i, 't>,
    ) -> ReadResult<'i, ()> {
        skip_remaining(input);
        Ok(())
    }

    fn rule_without_block(&mut self, _prelude: (), _start: &ParserState) -> Result<BodyItem, ()> {
        Ok(BodyItem::Nested)
    }

    fn parse_block<'t>(
        &mut self,
        _prelude: (),
        _start: &ParserState,
        input: &mut Parser<'i, 't>,
    ) -> ReadResult<'i, BodyItem> {
        skip_remaining(input);
        Ok(BodyItem::Nested)
    }
}

impl<'i> QualifiedRuleParser<'i> for DeclarationListParser {
    type Prelude = ();
    type QualifiedRule = BodyItem;
    type Error = ReadError;

    fn parse_prelude<'t>(&mut self, input: &mut Parser<'i, 't>) -> ReadResult<'i, ()> {
        skip_remaining(input);
        Ok(())
    }

    fn parse_block<'t>(
        &mut self,
        _prelude: (),
        _start: &ParserState,
        input: &mut Parser<'i, 't>,
    ) -> ReadResult<'i, BodyItem> {
        skip_remaining(input);
        Ok(BodyItem::Nested)
    }
}

impl<'i> RuleBodyItemParser<'i, BodyItem, ReadError> for DeclarationListParser {
    fn parse_declarations(&self) -> bool {
        true
    }

    fn parse_qualified(&self) -> bool {
        true
    }
}

/// A style rule's block. A block holding nested rules turns the whole rule
/// into a `Node::Verbatim`.
fn read_style_rule<'i>(
    source: &'i str,
    prelude: RulePrelude<'i>,
    start: &ParserState,
    input: &mut Parser<'i, '_>,
) -> ReadResult<'i, ReadNode> {
    let mut declarations = Vec::new();
    let mut semicolon = false;
    let mut nested = false;
    let mut body_parser = DeclarationListParser;
    let mut body = RuleBodyParser::new(input, &mut body_parser);
    let mut item_start = body.input.position().byte_index();
    while let Some(result) = body.next() {
        let item_end = body.input.position().byte_index();
        let text = &source[item_start..item_end];
        let declaration = match result {
            Ok(BodyItem::Declaration(declaration)) => Some(declaration),
            Ok(BodyItem::Nested) => None,
            Err((error, _)) => Some(read_hacked_declaration(text).ok_or(error)?),
        };
        match declaration {
            Some(declaration) => {
                let (raws, ends_with_semicolon) = declaration_raws(text);
                semicolon = ends_with_semicolon;
                declarations.push(OwnedDeclaration {
                    raws: Some(raws),
                    ..declaration
                });
            }
            None => nested = true,
        }
        item_start = item_end;
    }
    let block_end = body.input.position().byte_index();
    ensure_closed(source, block_end, prelude.open)?;

    let rule_start = start.position().byte_index();
    let node = if nested {
        Node::Verbatim(VerbatimRule {
            before: String::new(),
            text: source[rule_start..=block_end].to_string(),
        })
    } else {
        Node::Rule(OwnedRule {
            selectors: prelude.selectors,
            declarations,
            raws: Some(RuleRaws {
                before: String::new(),
                selector: prelude.selector.to_string(),
                between: prelude.between.to_string(),
                semicolon,
                after: source[item_start..block_end].to_string(),
            }),
        })
    };
    Ok(ReadNode {
        start: rule_start,
        node,
    })
}

/// Normalized value text and whether it ended in `!important`.
fn read_value<'i>(input: &mut Parser<'i, '_>, allow_blocks: bool) -> ReadResult<'i, (String, bool)> {
    let mut writer = TokenWriter::new(false);
    loop {
        let important = input.try_parse(|input| {
            parse_important(input)?;
            input.expect_exhausted()
        });
        if important.is_ok() {
            return Ok((writer.finish(), true));
        }
        let location = input.current_source_location();
        match writer.write_token(input, true) {
            None => return Ok((writer.finish(), false)),
            Some(Token::CurlyBracketBlock) if !allow_blocks => {
                return Err(location.new_custom_error(ReadError::BlockInValue))
            }
            Some(_) => {}
        }
    }
}

/// Split the source of one declaration item into the whitespace, comments
/// and stray `;` before it, its text, and the whitespace after it. Also
/// reports whether a `;` ended it.
fn declaration_raws(text: &str) -> (DeclarationRaws, bool) {
    let mut input = ParserInput::new(text);
    let mut parser = Parser::new(&mut input);
    let mut start = None;
    let mut end = 0;
    let mut after_end = text.len();
    let mut semicolon = false;
    loop {
        let offset = parser.position().byte_index();
        let token = match parser.next_including_whitespace_and_comments() {
            Ok(token) => token.clone(),
            Err(_) => break,
        };
        match token {
            Token::WhiteSpace(_) => continue,
            Token::Comment(_) | Token::Semicolon if start.is_none() => continue,
            Token::Semicolon => {
                semicolon = true;
                after_end = offset;
                break;
            }
            Token::Function(_)
            | Token::ParenthesisBlock
            | Token::SquareBracketBlock
            | Token::CurlyBracketBlock => skip_block(&mut parser),
            _ => {}
        }
        start.get_or_insert(offset);
        end = parser.position().byte_index();
    }
    let start = start.unwrap_or(0);
    let raws = DeclarationRaws {
        before: text[..start].to_string(),
        text: text[start..end].to_string(),
        after: text[end..after_end].to_string(),
    };
    (raws, semicolon)
}

/// Skip the contents of the block the last token opened.
fn skip_block<'i>(input: &mut Parser<'i, '_>) {
    let _ = input.parse_nested_block(|nested| -> ReadResult<'i, ()> {
        skip_remaining(nested);
        Ok(())
    });
}

/// Legacy IE property hacks such as `*zoom:1` start with a delimiter, which
/// cssparser reads as the start of a nested rule. Recover them as plain
/// declarations.
fn read_hacked_declaration(text: &str) -> Option<OwnedDeclaration> {
    let mut input = ParserInput::new(text);
    let mut parser = Parser::new(&mut input);
    let mut name_start = None;
    let name_end = loop {
        let offset = parser.position().byte_index();
        match parser.next_including_whitespace_and_comments().ok()? {
            Token::WhiteSpace(_) | Token::Comment(_) => {}
            Token::Semicolon if name_start.is_none() => {}
            Token::Colon => break offset,
            Token::Delim(_) | Token::Ident(_) => {
                name_start.get_or_insert(offset);
            }
            _ => return None,
        }
    };
    let property = text[name_start?..name_end].trim_end();
    if property.contains(|c: char| c.is_ascii_whitespace()) {
        return None;
    }
    let (value, important) = parser
        .parse_until_before(Delimiter::Semicolon, |input| read_value(input, false))
        .ok()?;
    Some(OwnedDeclaration::new(property, value, important))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn only_rule(container: &Container) -> &OwnedRule {
        match container.nodes.as_slice() {
            [Node::Rule(rule)] => rule,
            other => panic!("expected a single rule, got {:?}", other),
        }
    }

    #[test]
    fn test_rule_raws_are_kept() {
        let sheet = parse_stylesheet("\n.a ,\n.b  { color : red ; }\n").unwrap();
        let rule = only_rule(&sheet);
        let raws = rule.raws.as_ref().unwrap();
        assert_eq!(raws.before, "\n");
        assert_eq!(raws.selector, ".a ,\n.b");
        assert_eq!(raws.between, "  ");
        assert!(raws.semicolon);
        assert_eq!(raws.after, " ");
        assert_eq!(sheet.after, "\n");

        let selectors: Vec<&str> = rule.selectors.iter().map(|s| s.text()).collect();
        assert_eq!(selectors, vec![".a", ".b"]);
        let decl = &rule.declarations[0];
        assert_eq!(decl.property, "color");
        assert_eq!(decl.value, "red");
        let decl_raws = decl.raws.as_ref().unwrap();
        assert_eq!(decl_raws.before, " ");
        assert_eq!(decl_raws.text, "color : red");
        assert_eq!(decl_raws.after, " ");
    }

    #[test]
    fn test_values_are_normalized() {
        let sheet =
            parse_stylesheet("h1{background:blue/*test*/;margin:  0   auto ! important}").unwrap();
        let rule = only_rule(&sheet);
        assert_eq!(rule.declarations[0], OwnedDeclaration::new("background", "blue", false));
        assert_eq!(rule.declarations[1], OwnedDeclaration::new("margin", "0 auto", true));
        assert!(!rule.raws.as_ref().unwrap().semicolon);
    }

    #[test]
    fn test_selector_list_ignores_nested_commas() {
        let sheet = parse_stylesheet(":is(h1, h2), a[title=\"x,y\"]{color:red}").unwrap();
        let selectors: Vec<&str> = only_rule(&sheet).selectors.iter().map(|s| s.text()).collect();
        assert_eq!(selectors, vec![":is(h1, h2)", "a[title=\"x,y\"]"]);
    }

    #[test]
    fn test_at_rules_and_comments() {
        let css = "@charset \"utf-8\";/* c */@media print{h1{color:red}}\
                   @font-face{font-family:\"x\";src:url(a.woff)}\
                   @-webkit-keyframes spin{from{color:red}to{color:red}}";
        let sheet = parse_stylesheet(css).unwrap();
        assert_eq!(sheet.nodes.len(), 5);
        assert!(matches!(&sheet.nodes[1], Node::Comment(c) if c.text == "/* c */"));

        let kinds: Vec<Option<ContainerKind>> = sheet
            .nodes
            .iter()
            .map(|node| match node {
                Node::AtRule(at_rule) => at_rule.container().map(|c| c.kind),
                _ => None,
            })
            .collect();
        assert_eq!(
            kinds,
            vec![
                None,
                None,
                Some(ContainerKind::Conditional),
                None,
                Some(ContainerKind::Keyframes)
            ]
        );
        match &sheet.nodes[3] {
            Node::AtRule(at_rule) => assert_eq!(
                at_rule.block,
                Some(AtRuleBlock::Verbatim("font-family:\"x\";src:url(a.woff)".to_string()))
            ),
            other => panic!("expected @font-face, got {:?}", other),
        }
    }

    #[test]
    fn test_unterminated_block_reports_position() {
        match parse_stylesheet("h1{color:red}\nh2{color:") {
            Err(BlazeCssError::Parse { line, column, .. }) => {
                assert_eq!(line, 2);
                assert_eq!(column, 3);
            }
            other => panic!("expected a parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_rejects_malformed_input() {
        assert!(parse_stylesheet("h1{color:red}}").is_err());
        assert!(parse_stylesheet("h1{color:\"red}").is_err());
        assert!(parse_stylesheet("h1{color:red}/* open").is_err());
        assert!(parse_stylesheet("h1{color}").is_err());
        assert!(parse_stylesheet("h1").is_err());
        assert!(parse_stylesheet("h1;h2{color:red}").is_err());
        assert!(parse_stylesheet("@import url(x.css)}").is_err());
    }

    #[test]
    fn test_nested_rules_are_kept_verbatim() {
        let css = "h1{h2{}h3{}} .a{color:red;&:hover{color:blue}}";
        let sheet = parse_stylesheet(css).unwrap();
        let texts: Vec<(&str, &str)> = sheet
            .nodes
            .iter()
            .map(|node| match node {
                Node::Verbatim(verbatim) => (verbatim.before.as_str(), verbatim.text.as_str()),
                other => panic!("expected a verbatim rule, got {:?}", other),
            })
            .collect();
        assert_eq!(
            texts,
            vec![("", "h1{h2{}h3{}}"), (" ", ".a{color:red;&:hover{color:blue}}")]
        );
    }

    #[test]
    fn test_property_hacks_are_declarations() {
        let sheet = parse_stylesheet(".a{ *zoom : 1; _height:1px;color:red }").unwrap();
        let rule = only_rule(&sheet);
        assert_eq!(rule.declarations[0], OwnedDeclaration::new("*zoom", "1", false));
        assert_eq!(rule.declarations[1], OwnedDeclaration::new("_height", "1px", false));
        let raws = rule.declarations[0].raws.as_ref().unwrap();
        assert_eq!(raws.before, " ");
        assert_eq!(raws.text, "*zoom : 1");
    }

    #[test]
    fn test_leading_charset_is_kept() {
        let sheet = parse_stylesheet("@charset \"utf-8\";\nh1{color:red}").unwrap();
        match &sheet.nodes[0] {
            Node::AtRule(at_rule) => {
                assert_eq!(at_rule.name, "charset");
                assert_eq!(at_rule.params, " \"utf-8\"");
                assert_eq!(at_rule.block, None);
            }
            other => panic!("expected @charset, got {:?}", other),
        }
        assert!(matches!(&sheet.nodes[1], Node::Rule(rule) if rule.raws.as_ref().unwrap().before == "\n"));
    }

    #[test]
    fn test_comment_positions() {
        match parse_stylesheet("h1{color:red}\n  /* open") {
            Err(BlazeCssError::Parse {
                message,
                line,
                column,
            }) => {
                assert_eq!(message, "unterminated comment");
                assert_eq!((line, column), (2, 3));
            }
            other => panic!("expected a parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_custom_property_blocks() {
        let css = "paper-card{--paper-card-content:{padding-top:0};margin:0 auto 16px}";
        let sheet = parse_stylesheet(css).unwrap();
        let rule = only_rule(&sheet);
        assert_eq!(rule.declarations.len(), 2);
        assert_eq!(rule.declarations[0].property, "--paper-card-content");
        assert_eq!(rule.declarations[0].value, "{padding-top:0}");
    }

    #[test]
    fn test_empty_rules_are_not_candidates() {
        let sheet = parse_stylesheet("h1{}").unwrap();
        assert!(!only_rule(&sheet).is_merge_candidate());
    }

    #[test]
    fn test_lightningcss_validation() {
        assert!(validate_with_lightningcss("h1{color:red}").is_ok());
        assert!(matches!(
            validate_with_lightningcss("h1..a{color:red}"),
            Err(BlazeCssError::Parse { .. })
        ));
    }
}
