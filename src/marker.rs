//! The marker tree and its builder.
//!
//! Unlike a rowan-style green/red tree built from back-edges to a
//! "creator" node, markers live in a flat arena indexed by parent. The
//! invariant that makes this cheap: at any moment, the only marker that
//! may receive a further nested `mark()`, `rollback_to()`, or `drop()` is
//! the deepest unresolved (`INCOMPLETE`) descendant of the root — always a
//! tail child, never an interior one. `Builder` owns the arena outright;
//! nothing outside it holds a reference into the tree.

use crate::diagnostics::Message;
use crate::lexer::{Token, TokenKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsedKind {
    Root,
    ObjectDefinition,
    ObjectInternals,
    ObjectProperty,
    List,
    ListElement,
    Keyword,
    EmbedBlock,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Element {
    Token(TokenKind),
    Parsed(ParsedKind),
    Incomplete,
}

pub type MarkerId = usize;

#[derive(Debug, Clone)]
pub struct MarkerNode {
    pub first_token_index: usize,
    pub last_token_index: usize,
    pub element: Element,
    pub error: Option<Message>,
    pub parent: Option<MarkerId>,
    pub children: Vec<MarkerId>,
}

/// A handle returned by [`Builder::mark`]. Consumed by exactly one of
/// `done`, `drop`, `rollback_to`, or `error`.
#[derive(Debug, Clone, Copy)]
#[must_use = "a marker must be resolved with done/drop/rollback_to/error"]
pub struct Marker(MarkerId);

impl Marker {
    pub fn id(self) -> MarkerId {
        self.0
    }

    pub fn done(self, builder: &mut Builder, kind: ParsedKind) -> MarkerId {
        builder.done(self.0, kind)
    }

    pub fn drop(self, builder: &mut Builder) {
        builder.drop_marker(self.0)
    }

    pub fn rollback_to(self, builder: &mut Builder) {
        builder.rollback_to(self.0)
    }

    pub fn error(self, builder: &mut Builder, message: Message) -> MarkerId {
        builder.error(self.0, message)
    }
}

/// Token cursor plus marker arena.
pub struct Builder {
    tokens: Vec<Token>,
    cursor: usize,
    nodes: Vec<MarkerNode>,
    root: MarkerId,
}

impl Builder {
    pub fn new(tokens: Vec<Token>) -> Self {
        let root = MarkerNode {
            first_token_index: 0,
            last_token_index: 0,
            element: Element::Incomplete,
            error: None,
            parent: None,
            children: Vec::new(),
        };
        Self {
            tokens,
            cursor: 0,
            nodes: vec![root],
            root: 0,
        }
    }

    pub fn root(&self) -> MarkerId {
        self.root
    }

    pub fn node(&self, id: MarkerId) -> &MarkerNode {
        &self.nodes[id]
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn token_kind(&self) -> TokenKind {
        self.tokens[self.cursor.min(self.tokens.len() - 1)].kind
    }

    pub fn token_text(&self) -> &str {
        self.tokens[self.cursor.min(self.tokens.len() - 1)].text()
    }

    pub fn current_token(&self) -> &Token {
        &self.tokens[self.cursor.min(self.tokens.len() - 1)]
    }

    pub fn look_ahead(&self, n: usize) -> TokenKind {
        let idx = (self.cursor + n).min(self.tokens.len() - 1);
        self.tokens[idx].kind
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn eof(&self) -> bool {
        self.token_kind() == TokenKind::Eof
    }

    pub fn advance(&mut self) {
        if !self.eof() {
            self.cursor += 1;
        }
    }

    /// Consume the current token as a resolved leaf marker (`Element::Token`)
    /// under the current deepest-incomplete marker, and advance past it.
    /// Used for tokens the grammar accepts directly (`literal`, `keyword`'s
    /// pieces, a `string`'s open/interior/close) without wrapping them in a
    /// `ParsedKind` — there is no parsed label for a bare token.
    pub fn bump(&mut self) -> MarkerId {
        let parent = self.deepest_incomplete(self.root);
        let kind = self.token_kind();
        let node = MarkerNode {
            first_token_index: self.cursor,
            last_token_index: self.cursor,
            element: Element::Token(kind),
            error: None,
            parent: Some(parent),
            children: Vec::new(),
        };
        let id = self.nodes.len();
        self.nodes.push(node);
        self.nodes[parent].children.push(id);
        self.advance();
        id
    }

    fn deepest_incomplete(&self, mut id: MarkerId) -> MarkerId {
        loop {
            match self.nodes[id].children.last() {
                Some(&child) if self.nodes[child].element == Element::Incomplete => id = child,
                _ => return id,
            }
        }
    }

    pub fn mark(&mut self) -> Marker {
        let parent = self.deepest_incomplete(self.root);
        let node = MarkerNode {
            first_token_index: self.cursor,
            last_token_index: self.cursor,
            element: Element::Incomplete,
            error: None,
            parent: Some(parent),
            children: Vec::new(),
        };
        let id = self.nodes.len();
        self.nodes.push(node);
        self.nodes[parent].children.push(id);
        Marker(id)
    }

    fn assert_is_tail(&self, id: MarkerId) {
        assert_eq!(
            id,
            self.deepest_incomplete(self.root),
            "marker {id} is not the deepest unresolved descendant; rollback_to/drop only ever act on a tail child"
        );
    }

    fn done(&mut self, id: MarkerId, kind: ParsedKind) -> MarkerId {
        self.assert_is_tail(id);
        let node = &mut self.nodes[id];
        node.element = Element::Parsed(kind);
        node.last_token_index = self.cursor.saturating_sub(1).max(node.first_token_index);
        id
    }

    /// Remove `id` but re-parent its children to `id`'s own parent, in
    /// place of `id` in the parent's child order.
    fn drop_marker(&mut self, id: MarkerId) {
        self.assert_is_tail(id);
        let parent = self.nodes[id].parent.expect("root marker cannot be dropped");
        let children = std::mem::take(&mut self.nodes[id].children);
        for &child in &children {
            self.nodes[child].parent = Some(parent);
        }
        let position = self.nodes[parent]
            .children
            .iter()
            .position(|&c| c == id)
            .expect("dropped marker must be a child of its recorded parent");
        self.nodes[parent].children.splice(position..=position, children);
    }

    fn rollback_to(&mut self, id: MarkerId) {
        self.assert_is_tail(id);
        let parent = self.nodes[id].parent.expect("root marker cannot be rolled back");
        self.cursor = self.nodes[id].first_token_index;
        self.nodes[parent].children.retain(|&c| c != id);
    }

    fn error(&mut self, id: MarkerId, message: Message) -> MarkerId {
        let resolved = self.done(id, ParsedKind::Error);
        self.nodes[resolved].error = Some(message);
        resolved
    }

    /// Finalize the root marker once the grammar has run to completion.
    pub fn finish_root(&mut self) {
        let root = self.root;
        if self.nodes[root].element == Element::Incomplete {
            self.done(root, ParsedKind::Root);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    fn builder_for(source: &str) -> Builder {
        Builder::new(tokenize(source, false))
    }

    #[test]
    fn mark_done_produces_a_single_child() {
        let mut b = builder_for("1");
        let m = b.mark();
        b.advance();
        m.done(&mut b, ParsedKind::ListElement);
        assert_eq!(b.node(b.root()).children.len(), 1);
    }

    #[test]
    fn rollback_to_restores_cursor_and_removes_node() {
        let mut b = builder_for("1 2");
        let m = b.mark();
        b.advance();
        m.rollback_to(&mut b);
        assert_eq!(b.cursor(), 0);
        assert!(b.node(b.root()).children.is_empty());
    }

    #[test]
    fn drop_reparents_children() {
        let mut b = builder_for("1");
        let outer = b.mark();
        let inner = b.mark();
        b.advance();
        inner.done(&mut b, ParsedKind::ListElement);
        outer.drop(&mut b);
        assert_eq!(b.node(b.root()).children.len(), 1);
        let reparented = b.node(b.root()).children[0];
        assert_eq!(b.node(reparented).parent, Some(b.root()));
    }

    #[test]
    #[should_panic]
    fn rollback_to_non_tail_panics() {
        let mut b = builder_for("1 2");
        let first = b.mark();
        b.advance();
        first.done(&mut b, ParsedKind::ListElement);
        first.rollback_to(&mut b);
    }
}
