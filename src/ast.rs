//! Lowering the marker tree into a typed syntax tree.
//!
//! This only runs once parsing has produced a tree with no `ERROR`
//! markers. The tree is expressed as a closed sum of node shapes so the
//! lowerer pattern-matches exhaustively instead of downcasting a generic
//! node to a typed wrapper at each call site.
//!
//! `string` has no `ParsedKind` of its own (the grammar inlines it into
//! `literal`/`keyword`): its open quote, interior pieces, and close quote
//! are flat sibling leaf markers, and the lowerer groups them back
//! together by scanning forward from the open quote.

use crate::kstr::KStr;
use crate::lexer::TokenKind;
use crate::location::Location;
use crate::marker::{Builder, Element, MarkerId, ParsedKind};
use crate::numeric::parse_number;

#[derive(Debug, Clone, PartialEq)]
pub enum AstNode {
    KsonRoot {
        content: Option<Box<AstNode>>,
        comments: Vec<KStr>,
        trailing_comments: Vec<KStr>,
        location: Location,
    },
    ObjectDefinition {
        name: Option<KStr>,
        internals: Box<AstNode>,
        location: Location,
    },
    ObjectInternals {
        properties: Vec<AstNode>,
        location: Location,
    },
    ObjectProperty {
        key: KStr,
        value: Box<AstNode>,
        comments: Vec<KStr>,
        location: Location,
    },
    List {
        elements: Vec<AstNode>,
        location: Location,
    },
    ListElement {
        value: Box<AstNode>,
        comments: Vec<KStr>,
        location: Location,
    },
    EmbedBlock {
        tag: Option<KStr>,
        content: KStr,
        location: Location,
    },
    Identifier {
        text: KStr,
        location: Location,
    },
    Str {
        text: KStr,
        location: Location,
    },
    Number {
        text: KStr,
        value: f64,
        location: Location,
    },
    True(Location),
    False(Location),
    Null(Location),
}

impl AstNode {
    pub fn location(&self) -> Location {
        match self {
            AstNode::KsonRoot { location, .. }
            | AstNode::ObjectDefinition { location, .. }
            | AstNode::ObjectInternals { location, .. }
            | AstNode::ObjectProperty { location, .. }
            | AstNode::List { location, .. }
            | AstNode::ListElement { location, .. }
            | AstNode::EmbedBlock { location, .. }
            | AstNode::Identifier { location, .. }
            | AstNode::Str { location, .. }
            | AstNode::Number { location, .. } => *location,
            AstNode::True(loc) | AstNode::False(loc) | AstNode::Null(loc) => *loc,
        }
    }
}

fn is_commentable(kind: ParsedKind) -> bool {
    matches!(kind, ParsedKind::Root | ParsedKind::ObjectProperty | ParsedKind::ListElement)
}

/// Comments on tokens owned directly by `id` (not inside any child
/// marker's span), in token order.
fn own_token_comments(builder: &Builder, id: MarkerId) -> Vec<KStr> {
    let node = builder.node(id);
    let mut covered = vec![false; node.last_token_index + 1 - node.first_token_index];
    for &child in &node.children {
        let c = builder.node(child);
        for idx in c.first_token_index..=c.last_token_index {
            if idx >= node.first_token_index {
                covered[idx - node.first_token_index] = true;
            }
        }
    }
    let mut out = Vec::new();
    for idx in node.first_token_index..=node.last_token_index {
        if !covered[idx - node.first_token_index] {
            out.extend(builder.tokens()[idx].comments.iter().cloned());
        }
    }
    out
}

/// This subtree's comments still waiting for a commentable ancestor to
/// claim them (empty if `id` itself is commentable — it already consumed
/// them into its own `comments` field).
fn gather_unclaimed(builder: &Builder, id: MarkerId) -> Vec<KStr> {
    let node = builder.node(id);
    match node.element {
        Element::Parsed(kind) if is_commentable(kind) => Vec::new(),
        _ => {
            let mut out = own_token_comments(builder, id);
            for &child in &node.children {
                out.extend(gather_unclaimed(builder, child));
            }
            out
        }
    }
}

/// All comments claimed by a commentable marker: its own directly-owned
/// tokens' comments, plus whatever non-commentable children didn't claim.
fn claimed_comments(builder: &Builder, id: MarkerId) -> Vec<KStr> {
    let node = builder.node(id);
    let mut out = own_token_comments(builder, id);
    for &child in &node.children {
        out.extend(gather_unclaimed(builder, child));
    }
    out
}

fn marker_location(builder: &Builder, id: MarkerId) -> Location {
    let node = builder.node(id);
    let first = builder.tokens()[node.first_token_index].location();
    let last = builder.tokens()[node.last_token_index].location();
    Location::merge(first, last)
}

fn token_text_of(builder: &Builder, id: MarkerId) -> KStr {
    builder.tokens()[builder.node(id).first_token_index].value.clone()
}

struct HasError;

/// Top-level entry point. Returns `None` if the tree contains any `ERROR`
/// marker.
pub fn lower(builder: &Builder) -> Option<AstNode> {
    lower_root(builder, builder.root()).ok()
}

fn lower_root(builder: &Builder, id: MarkerId) -> Result<AstNode, HasError> {
    if matches!(builder.node(id).element, Element::Parsed(ParsedKind::Error)) {
        return Err(HasError);
    }
    let children = builder.node(id).children.clone();
    let content_children: Vec<MarkerId> = children
        .into_iter()
        .filter(|&c| !matches!(builder.node(c).element, Element::Token(TokenKind::Eof)))
        .collect();
    let content = if content_children.is_empty() {
        None
    } else {
        let (node, _consumed) = lower_value_from(builder, &content_children, 0)?;
        Some(Box::new(node))
    };
    let comments = claimed_comments(builder, id);
    let trailing_comments = builder
        .tokens()
        .iter()
        .rev()
        .find(|t| t.kind == TokenKind::Eof)
        .map(|t| t.comments.clone())
        .unwrap_or_default();
    Ok(AstNode::KsonRoot {
        content,
        comments,
        trailing_comments,
        location: marker_location(builder, id),
    })
}

/// Lower the value starting at `children[start]`, returning how many
/// sibling entries it consumed (more than one only for a bare `string`).
fn lower_value_from(builder: &Builder, children: &[MarkerId], start: usize) -> Result<(AstNode, usize), HasError> {
    let id = children[start];
    match builder.node(id).element {
        Element::Token(TokenKind::StringOpenQuote) => lower_string(builder, children, start),
        _ => Ok((lower_single(builder, id)?, 1)),
    }
}

/// Lower a marker that is never the start of a multi-sibling production.
fn lower_single(builder: &Builder, id: MarkerId) -> Result<AstNode, HasError> {
    match builder.node(id).element {
        Element::Parsed(ParsedKind::Error) => Err(HasError),
        Element::Parsed(ParsedKind::ObjectDefinition) => lower_object_definition(builder, id),
        Element::Parsed(ParsedKind::List) => lower_list(builder, id),
        Element::Parsed(ParsedKind::EmbedBlock) => lower_embed(builder, id),
        Element::Token(TokenKind::Number) => lower_number(builder, id),
        Element::Token(TokenKind::Identifier) => Ok(AstNode::Identifier {
            text: token_text_of(builder, id),
            location: marker_location(builder, id),
        }),
        Element::Token(TokenKind::True) => Ok(AstNode::True(marker_location(builder, id))),
        Element::Token(TokenKind::False) => Ok(AstNode::False(marker_location(builder, id))),
        Element::Token(TokenKind::Null) => Ok(AstNode::Null(marker_location(builder, id))),
        _ => Err(HasError),
    }
}

fn lower_object_definition(builder: &Builder, id: MarkerId) -> Result<AstNode, HasError> {
    let children = builder.node(id).children.clone();
    let mut name = None;
    let mut internals = None;
    for &child in &children {
        match builder.node(child).element {
            Element::Token(TokenKind::Identifier) => name = Some(token_text_of(builder, child)),
            Element::Parsed(ParsedKind::ObjectInternals) => {
                internals = Some(Box::new(lower_object_internals(builder, child)?));
            }
            _ => {}
        }
    }
    Ok(AstNode::ObjectDefinition {
        name,
        internals: internals.ok_or(HasError)?,
        location: marker_location(builder, id),
    })
}

fn lower_object_internals(builder: &Builder, id: MarkerId) -> Result<AstNode, HasError> {
    let children = builder.node(id).children.clone();
    let mut properties = Vec::new();
    for &child in &children {
        if matches!(builder.node(child).element, Element::Parsed(ParsedKind::ObjectProperty)) {
            properties.push(lower_object_property(builder, child)?);
        }
    }
    Ok(AstNode::ObjectInternals {
        properties,
        location: marker_location(builder, id),
    })
}

fn lower_object_property(builder: &Builder, id: MarkerId) -> Result<AstNode, HasError> {
    let children = builder.node(id).children.clone();
    let mut key = None;
    let mut value = None;
    let mut i = 0;
    while i < children.len() {
        let child = children[i];
        match builder.node(child).element {
            Element::Parsed(ParsedKind::Keyword) => {
                key = Some(lower_keyword(builder, child)?);
                i += 1;
            }
            _ if key.is_some() && value.is_none() => {
                let (node, consumed) = lower_value_from(builder, &children, i)?;
                value = Some(Box::new(node));
                i += consumed;
            }
            _ => i += 1,
        }
    }
    Ok(AstNode::ObjectProperty {
        key: key.ok_or(HasError)?,
        value: value.ok_or(HasError)?,
        comments: claimed_comments(builder, id),
        location: marker_location(builder, id),
    })
}

fn lower_keyword(builder: &Builder, id: MarkerId) -> Result<KStr, HasError> {
    let children = builder.node(id).children.clone();
    if children.is_empty() {
        return Err(HasError);
    }
    match builder.node(children[0]).element {
        Element::Token(TokenKind::Identifier) => Ok(token_text_of(builder, children[0])),
        Element::Token(TokenKind::StringOpenQuote) => {
            let (node, _) = lower_string(builder, &children, 0)?;
            match node {
                AstNode::Str { text, .. } => Ok(text),
                _ => Err(HasError),
            }
        }
        _ => Err(HasError),
    }
}

fn lower_list(builder: &Builder, id: MarkerId) -> Result<AstNode, HasError> {
    let children = builder.node(id).children.clone();
    let mut elements = Vec::new();
    for &child in &children {
        if matches!(builder.node(child).element, Element::Parsed(ParsedKind::ListElement)) {
            elements.push(lower_list_element(builder, child)?);
        }
    }
    Ok(AstNode::List {
        elements,
        location: marker_location(builder, id),
    })
}

fn lower_list_element(builder: &Builder, id: MarkerId) -> Result<AstNode, HasError> {
    let children = builder.node(id).children.clone();
    let start = children
        .iter()
        .position(|&c| !matches!(builder.node(c).element, Element::Token(TokenKind::ListDash)))
        .ok_or(HasError)?;
    let (value, _) = lower_value_from(builder, &children, start)?;
    Ok(AstNode::ListElement {
        value: Box::new(value),
        comments: claimed_comments(builder, id),
        location: marker_location(builder, id),
    })
}

fn lower_embed(builder: &Builder, id: MarkerId) -> Result<AstNode, HasError> {
    let children = builder.node(id).children.clone();
    let mut tag = None;
    let mut content = KStr::empty();
    for &child in &children {
        match builder.node(child).element {
            Element::Token(TokenKind::EmbedTag) => {
                let text = token_text_of(builder, child);
                if !text.is_empty() {
                    tag = Some(text);
                }
            }
            Element::Token(TokenKind::EmbedContent) => content = token_text_of(builder, child),
            _ => {}
        }
    }
    Ok(AstNode::EmbedBlock {
        tag,
        content,
        location: marker_location(builder, id),
    })
}

fn lower_number(builder: &Builder, id: MarkerId) -> Result<AstNode, HasError> {
    let text = builder.tokens()[builder.node(id).first_token_index].text().to_string();
    let value = parse_number(&text).map_err(|_| HasError)?;
    Ok(AstNode::Number {
        text: KStr::new(&text),
        value,
        location: marker_location(builder, id),
    })
}

/// Scan forward from `children[start]` (a `STRING_OPEN_QUOTE` leaf marker)
/// through interior pieces to the matching close quote.
fn lower_string(builder: &Builder, children: &[MarkerId], start: usize) -> Result<(AstNode, usize), HasError> {
    let open = children[start];
    let open_location = marker_location(builder, open);
    let mut text = String::new();
    let mut i = start + 1;
    let mut close_location = open_location;
    loop {
        let child = *children.get(i).ok_or(HasError)?;
        match builder.node(child).element {
            Element::Token(TokenKind::String | TokenKind::StringEscape | TokenKind::StringUnicodeEscape) => {
                text.push_str(token_text_of(builder, child).as_str());
                i += 1;
            }
            Element::Token(TokenKind::StringIllegalCtl) => {
                i += 1;
            }
            Element::Token(TokenKind::StringCloseQuote) => {
                close_location = marker_location(builder, child);
                i += 1;
                break;
            }
            _ => return Err(HasError),
        }
    }
    Ok((
        AstNode::Str {
            text: KStr::new(&text),
            location: Location::merge(open_location, close_location),
        },
        i - start,
    ))
}
