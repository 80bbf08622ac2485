//! Front-end interface consumed by the transpiler.
//!
//! A parsed C++ translation unit is handed over as an [`Ast`]: a flat arena
//! of [`Node`]s plus the full token stream of the unit. Each node owns a
//! contiguous range of that stream, and each token points back at the
//! innermost node it belongs to. External dumpers (libclang scripts, for
//! example) produce this structure as JSON; tests build it with
//! [`AstBuilder`].

use std::collections::VecDeque;
use std::fmt;
use std::ops::Range;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

mod builder;
pub mod lexer;

pub use builder::AstBuilder;

/// Index of a node inside its [`Ast`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// The node kinds the transpiler distinguishes. Anything else a front-end
/// reports collapses into [`NodeKind::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    TranslationUnit,
    Namespace,
    ClassDecl,
    StructDecl,
    BaseSpecifier,
    FieldDecl,
    Method,
    Constructor,
    Destructor,
    FunctionDecl,
    ParmDecl,
    CompoundStmt,
    ForStmt,
    ForRangeStmt,
    DeclStmt,
    VarDecl,
    Expr,
    TypeRef,
    #[serde(other)]
    Other,
}

impl NodeKind {
    pub fn is_class_like(self) -> bool {
        matches!(self, NodeKind::ClassDecl | NodeKind::StructDecl)
    }

    pub fn is_method_like(self) -> bool {
        matches!(
            self,
            NodeKind::Method | NodeKind::Constructor | NodeKind::Destructor
        )
    }
}

/// Lexical category of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Identifier,
    Keyword,
    Punctuation,
    Comment,
    Literal,
}

/// A single lexical unit with the node that owns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    pub spelling: String,
    pub node: NodeId,
}

impl Token {
    pub fn is_punct(&self, spelling: &str) -> bool {
        self.kind == TokenKind::Punctuation && self.spelling == spelling
    }

    pub fn is_keyword(&self, spelling: &str) -> bool {
        self.kind == TokenKind::Keyword && self.spelling == spelling
    }
}

/// A 1-based line/column position, optionally tied to a file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub line: u32,
    #[serde(default)]
    pub column: u32,
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let file = self.file.as_deref().unwrap_or("<unknown>");
        write!(f, "{}:{}:{}", file, self.line, self.column)
    }
}

/// Inclusive source extent of a node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRange {
    #[serde(default)]
    pub start: SourceLocation,
    #[serde(default)]
    pub end: SourceLocation,
}

/// A native type as reported by the front-end, with the two decomposition
/// steps the transpiler needs: what a pointer/reference points to, and the
/// class a member pointer belongs to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeRef {
    pub spelling: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pointee: Option<Box<TypeRef>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_type: Option<Box<TypeRef>>,
}

impl TypeRef {
    pub fn named(spelling: impl Into<String>) -> Self {
        Self {
            spelling: spelling.into(),
            pointee: None,
            class_type: None,
        }
    }

    /// `T *` wrapping `inner`.
    pub fn pointer_to(inner: TypeRef) -> Self {
        Self {
            spelling: format!("{} *", inner.spelling),
            pointee: Some(Box::new(inner)),
            class_type: None,
        }
    }

    /// `T &` wrapping `inner`.
    pub fn reference_to(inner: TypeRef) -> Self {
        Self {
            spelling: format!("{} &", inner.spelling),
            pointee: Some(Box::new(inner)),
            class_type: None,
        }
    }

    pub fn pointee(&self) -> Option<&TypeRef> {
        self.pointee.as_deref().filter(|t| !t.spelling.is_empty())
    }

    pub fn class_type(&self) -> Option<&TypeRef> {
        self.class_type.as_deref().filter(|t| !t.spelling.is_empty())
    }
}

/// One node of the syntax tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub kind: NodeKind,
    #[serde(default)]
    pub spelling: String,
    #[serde(default)]
    pub parent: Option<NodeId>,
    #[serde(default)]
    pub children: Vec<NodeId>,
    /// Half-open range into [`Ast::tokens`].
    #[serde(default)]
    pub tokens: Range<usize>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub ty: Option<TypeRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_type: Option<TypeRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brief_comment: Option<String>,
    #[serde(default)]
    pub is_static: bool,
    /// Where the body of this declaration lives, when it is defined out of line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definition: Option<NodeId>,
    #[serde(default)]
    pub extent: SourceRange,
}

/// Errors raised while loading or validating an [`Ast`].
#[derive(Debug, thiserror::Error)]
pub enum AstError {
    #[error("invalid AST JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("node at index {index} has id {found:?}")]
    IdMismatch { index: usize, found: NodeId },
    #[error("node {from:?} refers to missing node {missing:?}")]
    DanglingNode { from: NodeId, missing: NodeId },
    #[error("token range {start}..{end} of node {node:?} exceeds {len} tokens")]
    TokenRange {
        node: NodeId,
        start: usize,
        end: usize,
        len: usize,
    },
    #[error("root node {0:?} does not exist")]
    MissingRoot(NodeId),
    #[error("node {parent:?} lists {child:?} as a child, but its parent is {found:?}")]
    ParentMismatch {
        parent: NodeId,
        child: NodeId,
        found: Option<NodeId>,
    },
    #[error("node {0:?} is reached twice from the root")]
    Cycle(NodeId),
}

/// A translation unit: node arena, token stream and the source files the
/// extents refer to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ast {
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub tokens: Vec<Token>,
    pub root: NodeId,
    /// File name → contents, used to recover the original text of a definition.
    #[serde(default)]
    pub files: IndexMap<String, String>,
}

impl Ast {
    /// Parse and validate a JSON dump.
    pub fn from_json(json: &str) -> Result<Self, AstError> {
        let ast: Ast = serde_json::from_str(json)?;
        ast.validate()?;
        Ok(ast)
    }

    pub fn to_json(&self) -> Result<String, AstError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check the arena invariants the transpiler relies on.
    pub fn validate(&self) -> Result<(), AstError> {
        if self.root.index() >= self.nodes.len() {
            return Err(AstError::MissingRoot(self.root));
        }
        let len = self.tokens.len();
        for (index, node) in self.nodes.iter().enumerate() {
            if node.id.index() != index {
                return Err(AstError::IdMismatch {
                    index,
                    found: node.id,
                });
            }
            let linked = node
                .children
                .iter()
                .chain(node.parent.iter())
                .chain(node.definition.iter());
            for &other in linked {
                if other.index() >= self.nodes.len() {
                    return Err(AstError::DanglingNode {
                        from: node.id,
                        missing: other,
                    });
                }
            }
            if node.tokens.start > node.tokens.end || node.tokens.end > len {
                return Err(AstError::TokenRange {
                    node: node.id,
                    start: node.tokens.start,
                    end: node.tokens.end,
                    len,
                });
            }
        }
        for token in &self.tokens {
            if token.node.index() >= self.nodes.len() {
                return Err(AstError::DanglingNode {
                    from: self.root,
                    missing: token.node,
                });
            }
        }
        for node in &self.nodes {
            for &child in &node.children {
                let found = self.nodes[child.index()].parent;
                if found != Some(node.id) {
                    return Err(AstError::ParentMismatch {
                        parent: node.id,
                        child,
                        found,
                    });
                }
            }
        }

        // walks must terminate
        let mut seen = vec![false; self.nodes.len()];
        let mut queue = VecDeque::from([self.root]);
        while let Some(id) = queue.pop_front() {
            if std::mem::replace(&mut seen[id.index()], true) {
                return Err(AstError::Cycle(id));
            }
            queue.extend(self.nodes[id.index()].children.iter().copied());
        }
        Ok(())
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub fn root(&self) -> &Node {
        self.node(self.root)
    }

    pub fn parent(&self, id: NodeId) -> Option<&Node> {
        self.node(id).parent.map(|p| self.node(p))
    }

    pub fn children(&self, id: NodeId) -> impl Iterator<Item = &Node> + '_ {
        self.node(id).children.iter().map(move |&c| self.node(c))
    }

    /// All tokens covered by a node, header and body alike.
    pub fn tokens(&self, id: NodeId) -> &[Token] {
        &self.tokens[self.node(id).tokens.clone()]
    }

    /// Breadth-first walk starting at (and including) `id`.
    pub fn walk(&self, id: NodeId) -> Walk<'_> {
        let mut queue = VecDeque::new();
        queue.push_back(id);
        Walk { ast: self, queue }
    }

    /// Every node of `kind` below (or at) `id`, in breadth-first order.
    pub fn find_kind(&self, id: NodeId, kind: NodeKind) -> impl Iterator<Item = &Node> + '_ {
        self.walk(id).filter(move |n| n.kind == kind)
    }

    /// The node holding the body of a declaration: the explicit definition
    /// link, or the declaration itself when it carries a compound statement.
    pub fn definition_of(&self, id: NodeId) -> Option<NodeId> {
        let node = self.node(id);
        if let Some(def) = node.definition {
            return Some(def);
        }
        self.children(id)
            .any(|c| c.kind == NodeKind::CompoundStmt)
            .then_some(id)
    }

    /// Original source lines spanned by `range`, if the file was captured.
    pub fn source_text(&self, range: &SourceRange) -> Option<String> {
        let file = range.start.file.as_deref()?;
        let contents = self.files.get(file)?;
        let start = range.start.line.max(1) as usize;
        let end = range.end.line.max(range.start.line).max(1) as usize;
        let lines: Vec<&str> = contents
            .lines()
            .skip(start - 1)
            .take(end + 1 - start)
            .collect();
        if lines.is_empty() {
            None
        } else {
            Some(lines.join("\n"))
        }
    }
}

/// Iterator returned by [`Ast::walk`].
pub struct Walk<'a> {
    ast: &'a Ast,
    queue: VecDeque<NodeId>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.queue.pop_front()?;
        let node = self.ast.node(id);
        self.queue.extend(node.children.iter().copied());
        Some(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Ast {
        let mut b = AstBuilder::new();
        b.file("widget.h", "class Widget {\n  int m_Count;\n};\n");
        let class = b.open(NodeKind::ClassDecl, "Widget");
        b.tokens("class Widget {");
        b.leaf(NodeKind::FieldDecl, "m_Count", "int m_Count;");
        b.tokens("};");
        b.close();
        b.set_extent(class, "widget.h", 1, 3);
        b.finish()
    }

    #[test]
    fn walk_is_breadth_first() {
        let ast = sample();
        let kinds: Vec<NodeKind> = ast.walk(ast.root).map(|n| n.kind).collect();
        assert_eq!(
            kinds,
            vec![
                NodeKind::TranslationUnit,
                NodeKind::ClassDecl,
                NodeKind::FieldDecl
            ]
        );
    }

    #[test]
    fn node_tokens_cover_children() {
        let ast = sample();
        let class = ast.find_kind(ast.root, NodeKind::ClassDecl).next().unwrap();
        let spellings: Vec<&str> = ast
            .tokens(class.id)
            .iter()
            .map(|t| t.spelling.as_str())
            .collect();
        assert_eq!(
            spellings,
            vec!["class", "Widget", "{", "int", "m_Count", ";", "}", ";"]
        );
        let field = ast.find_kind(ast.root, NodeKind::FieldDecl).next().unwrap();
        assert!(ast.tokens(field.id).iter().all(|t| t.node == field.id));
    }

    #[test]
    fn source_text_reads_extent_lines() {
        let ast = sample();
        let class = ast.find_kind(ast.root, NodeKind::ClassDecl).next().unwrap();
        let text = ast.source_text(&class.extent).unwrap();
        assert_eq!(text, "class Widget {\n  int m_Count;\n};");
    }

    #[test]
    fn json_round_trip_validates() {
        let ast = sample();
        let json = ast.to_json().unwrap();
        let back = Ast::from_json(&json).unwrap();
        assert_eq!(back, ast);
    }

    #[test]
    fn rejects_out_of_range_tokens() {
        let mut ast = sample();
        ast.nodes[1].tokens = 0..500;
        assert!(matches!(
            ast.validate(),
            Err(AstError::TokenRange { len: 8, .. })
        ));
    }

    #[test]
    fn rejects_child_lists_that_disagree_with_parents() {
        let json = r#"{
            "nodes": [{"id": 0, "kind": "translation_unit", "children": [1]},
                      {"id": 1, "kind": "class_decl", "parent": 0, "children": [0]}],
            "root": 0
        }"#;
        assert!(matches!(
            Ast::from_json(json),
            Err(AstError::ParentMismatch {
                parent: NodeId(1),
                child: NodeId(0),
                found: None,
            })
        ));
    }

    #[test]
    fn rejects_cycles_through_the_root() {
        let json = r#"{
            "nodes": [{"id": 0, "kind": "translation_unit", "parent": 1, "children": [1]},
                      {"id": 1, "kind": "class_decl", "parent": 0, "children": [0]}],
            "root": 0
        }"#;
        assert!(matches!(Ast::from_json(json), Err(AstError::Cycle(NodeId(0)))));
    }

    #[test]
    fn unknown_node_kinds_become_other() {
        let json = r#"{
            "nodes": [{"id": 0, "kind": "translation_unit", "children": [1]},
                      {"id": 1, "kind": "lambda_expr", "parent": 0}],
            "root": 0
        }"#;
        let ast = Ast::from_json(json).unwrap();
        assert_eq!(ast.node(NodeId(1)).kind, NodeKind::Other);
    }

    #[test]
    fn pointer_decomposition_skips_empty_pointee() {
        let ty = TypeRef {
            spelling: "int".into(),
            pointee: Some(Box::new(TypeRef::named(""))),
            class_type: None,
        };
        assert!(ty.pointee().is_none());
        let ptr = TypeRef::pointer_to(TypeRef::named("Foo"));
        assert_eq!(ptr.spelling, "Foo *");
        assert_eq!(ptr.pointee().unwrap().spelling, "Foo");
    }
}
