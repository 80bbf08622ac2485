use indexmap::IndexMap;

use crate::lexer::tokenize;
use crate::{Ast, Node, NodeId, NodeKind, SourceLocation, SourceRange, Token, TokenKind, TypeRef};

/// Incremental construction of an [`Ast`].
///
/// Nodes are opened and closed like a stack; every token pushed while a
/// node is the innermost open one is owned by it, and each node's token
/// range spans everything pushed between its `open` and `close`.
///
/// ```
/// use fpp_ast::{AstBuilder, NodeKind};
///
/// let mut b = AstBuilder::new();
/// b.open(NodeKind::FunctionDecl, "tick");
/// b.tokens("void tick()");
/// b.open(NodeKind::CompoundStmt, "");
/// b.tokens("{ return; }");
/// b.close();
/// b.close();
/// let ast = b.finish();
/// assert_eq!(ast.tokens.len(), 8);
/// ```
#[derive(Debug)]
pub struct AstBuilder {
    nodes: Vec<Node>,
    tokens: Vec<Token>,
    stack: Vec<NodeId>,
    files: IndexMap<String, String>,
}

impl Default for AstBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AstBuilder {
    /// Start a new unit with an open `TranslationUnit` root.
    pub fn new() -> Self {
        let root = Node {
            id: NodeId(0),
            kind: NodeKind::TranslationUnit,
            spelling: String::new(),
            parent: None,
            children: Vec::new(),
            tokens: 0..0,
            ty: None,
            result_type: None,
            brief_comment: None,
            is_static: false,
            definition: None,
            extent: SourceRange::default(),
        };
        Self {
            nodes: vec![root],
            tokens: Vec::new(),
            stack: vec![NodeId(0)],
            files: IndexMap::new(),
        }
    }

    /// Register the contents of a source file for [`Ast::source_text`].
    pub fn file(&mut self, name: &str, contents: &str) -> &mut Self {
        self.files.insert(name.to_string(), contents.to_string());
        self
    }

    fn current(&self) -> NodeId {
        *self.stack.last().unwrap_or(&NodeId(0))
    }

    /// Open a child of the innermost open node.
    pub fn open(&mut self, kind: NodeKind, spelling: &str) -> NodeId {
        let parent = self.current();
        let id = NodeId(self.nodes.len() as u32);
        let start = self.tokens.len();
        self.nodes.push(Node {
            id,
            kind,
            spelling: spelling.to_string(),
            parent: Some(parent),
            children: Vec::new(),
            tokens: start..start,
            ty: None,
            result_type: None,
            brief_comment: None,
            is_static: false,
            definition: None,
            extent: SourceRange::default(),
        });
        self.nodes[parent.index()].children.push(id);
        self.stack.push(id);
        id
    }

    /// Close the innermost open node. The root is never popped.
    pub fn close(&mut self) -> NodeId {
        let id = self.current();
        if self.stack.len() > 1 {
            self.stack.pop();
        }
        self.nodes[id.index()].tokens.end = self.tokens.len();
        id
    }

    /// Lex `src` and attach the tokens to the innermost open node.
    pub fn tokens(&mut self, src: &str) -> &mut Self {
        let owner = self.current();
        for lexed in tokenize(src) {
            self.tokens.push(Token {
                kind: lexed.kind,
                spelling: lexed.text,
                node: owner,
            });
        }
        self
    }

    /// Push one token verbatim.
    pub fn token(&mut self, kind: TokenKind, spelling: &str) -> &mut Self {
        let owner = self.current();
        self.tokens.push(Token {
            kind,
            spelling: spelling.to_string(),
            node: owner,
        });
        self
    }

    /// Open a node, give it the tokens of `src`, and close it.
    pub fn leaf(&mut self, kind: NodeKind, spelling: &str, src: &str) -> NodeId {
        let id = self.open(kind, spelling);
        self.tokens(src);
        self.close();
        id
    }

    pub fn set_type(&mut self, id: NodeId, ty: TypeRef) -> &mut Self {
        self.nodes[id.index()].ty = Some(ty);
        self
    }

    pub fn set_result_type(&mut self, id: NodeId, ty: TypeRef) -> &mut Self {
        self.nodes[id.index()].result_type = Some(ty);
        self
    }

    pub fn set_static(&mut self, id: NodeId) -> &mut Self {
        self.nodes[id.index()].is_static = true;
        self
    }

    pub fn set_brief_comment(&mut self, id: NodeId, comment: &str) -> &mut Self {
        self.nodes[id.index()].brief_comment = Some(comment.to_string());
        self
    }

    pub fn set_definition(&mut self, id: NodeId, definition: NodeId) -> &mut Self {
        self.nodes[id.index()].definition = Some(definition);
        self
    }

    /// Record that a node spans `start_line..=end_line` of `file`.
    pub fn set_extent(&mut self, id: NodeId, file: &str, start_line: u32, end_line: u32) -> &mut Self {
        let at = |line| SourceLocation {
            file: Some(file.to_string()),
            line,
            column: 1,
        };
        self.nodes[id.index()].extent = SourceRange {
            start: at(start_line),
            end: at(end_line),
        };
        self
    }

    /// Close every open node and produce the unit.
    pub fn finish(mut self) -> Ast {
        while self.stack.len() > 1 {
            self.close();
        }
        self.nodes[0].tokens.end = self.tokens.len();
        Ast {
            nodes: self.nodes,
            tokens: self.tokens,
            root: NodeId(0),
            files: self.files,
        }
    }
}
