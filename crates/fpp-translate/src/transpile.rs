//! Token transpiler.
//!
//! Rewrites the token stream of one definition into target-language text
//! in a single forward pass. There is no target grammar involved: every
//! token is mapped on its own, with a little lookahead for identifier
//! chains, punctuation runs and `else if`, and a handful of structural
//! rewrites for loops.

use std::collections::BTreeSet;

use fpp_ast::{Ast, Node, NodeId, NodeKind, Token, TokenKind};
use tracing::trace;

use crate::config::TranslateConfig;
use crate::naming::Namer;
use crate::scope::{Identifier, Owner, ScopeChain};

/// Suffix marking text that only approximates the original construct.
pub const APPROXIMATION_TAG: &str = "  # TODO";

const COLON_MARKER: &str = " COLON ";

const INDENT: &str = "    ";

/// Operators spaced on both sides when used between two operands.
const BINARY_OPERATORS: &[&str] = &[
    "+", "-", "*", "/", "%", "<", ">", "<=", ">=", "<<", ">>", "&", "|", "^", "+=", "-=", "*=",
    "/=", "%=", "&=", "|=", "^=", "<<=", ">>=",
];

/// Keywords that open a block and take a colon.
const BLOCK_KEYWORDS: &[&str] = &["if", "elif", "else", "while", "for", "do", "try", "def", "class"];

/// Result of transpiling one definition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outcome {
    pub text: String,
    pub observed: BTreeSet<String>,
    pub approximations: usize,
}

/// Position in the token stream of one node.
#[derive(Debug, Clone)]
struct TokenCursor<'a> {
    tokens: &'a [Token],
    pos: usize,
    end: usize,
}

impl<'a> TokenCursor<'a> {
    fn new(tokens: &'a [Token], start: usize, end: usize) -> Self {
        Self {
            tokens,
            pos: start,
            end: end.min(tokens.len()),
        }
    }

    fn peek_at(&self, offset: usize) -> Option<&'a Token> {
        let at = self.pos + offset;
        if at < self.end {
            self.tokens.get(at)
        } else {
            None
        }
    }

    fn peek(&self) -> Option<&'a Token> {
        self.peek_at(0)
    }

    fn bump(&mut self) -> Option<&'a Token> {
        let token = self.peek()?;
        self.pos += 1;
        Some(token)
    }

    /// Move forward to `pos`; never moves backwards.
    fn skip_to(&mut self, pos: usize) {
        self.pos = self.pos.max(pos.min(self.end));
    }

    fn is_done(&self) -> bool {
        self.pos >= self.end
    }
}

/// What the last emitted token was, for operand/operator decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Last {
    Nothing,
    Operand,
    Operator,
    Keyword,
}

#[derive(Debug)]
struct BodyState {
    depth: i32,
    out: String,
    /// A control keyword is waiting for its block colon.
    pending_colon: bool,
    /// Where the colon goes if the controlled statement has no braces.
    colon_at: Option<usize>,
    /// Paren depth while reading an `if`/`while` condition.
    condition: Option<i32>,
    pending_tag: bool,
    /// Increment from a prefix `++`/`--`, applied after its operand.
    pending_increment: Option<&'static str>,
    last: Last,
    member_access: bool,
    /// After `case`/`default`, until the label's colon.
    label: bool,
    /// Depths of blocks opened for brace-less control bodies.
    implicit: Vec<i32>,
}

impl BodyState {
    fn new(depth: i32) -> Self {
        Self {
            depth,
            out: String::new(),
            pending_colon: false,
            colon_at: None,
            condition: None,
            pending_tag: false,
            pending_increment: None,
            last: Last::Nothing,
            member_access: false,
            label: false,
            implicit: Vec::new(),
        }
    }

    fn write(&mut self, text: &str) {
        self.out.push_str(text);
    }

    fn trim_trailing_spaces(&mut self) {
        let len = self.out.trim_end_matches(' ').len();
        self.out.truncate(len);
    }

    /// Write an operand, separating it from a preceding word.
    fn operand(&mut self, text: &str) {
        if self
            .out
            .chars()
            .last()
            .is_some_and(|c| c.is_alphanumeric() || c == '_')
        {
            self.out.push(' ');
        }
        self.out.push_str(text);
        self.last = Last::Operand;
        self.member_access = false;
    }

    fn flush_increment(&mut self) {
        if let Some(increment) = self.pending_increment.take() {
            self.out.push_str(increment);
        }
    }

    /// End the current line: flush a pending increment, place a pending
    /// colon, append a pending tag, then indent for the current depth.
    fn newline(&mut self, block_open: bool) {
        self.flush_increment();
        if self.pending_colon && self.depth >= 0 {
            match self.colon_at.filter(|_| !block_open) {
                Some(at) if at <= self.out.len() => self.out.insert_str(at, ": "),
                _ => {
                    self.trim_trailing_spaces();
                    self.out.push(':');
                }
            }
            self.pending_colon = false;
            self.colon_at = None;
            self.condition = None;
        }
        if self.pending_tag {
            self.trim_trailing_spaces();
            self.out.push_str(APPROXIMATION_TAG);
            self.pending_tag = false;
        }
        self.out.push('\n');
        for _ in 0..self.depth.max(0) {
            self.out.push_str(INDENT);
        }
        self.last = Last::Nothing;
        self.member_access = false;
        self.label = false;
    }

    /// A control statement starts while an outer brace-less header still
    /// waits for its colon: close that header and nest the new statement
    /// one level deeper.
    fn open_implicit_block(&mut self) {
        let Some(at) = self.colon_at.filter(|_| self.pending_colon) else {
            return;
        };
        self.trim_trailing_spaces();
        self.out.insert(at.min(self.out.len()), ':');
        self.pending_colon = false;
        self.colon_at = None;
        self.condition = None;
        self.depth += 1;
        self.implicit.push(self.depth);
        self.newline(false);
    }

    /// Leave the implicit blocks that end with the statement just closed.
    /// A following `else` stays inside and pairs with the nearest `if`.
    fn close_implicit_blocks(&mut self, next_is_else: bool) {
        if next_is_else {
            return;
        }
        let mut closed = false;
        while self.implicit.last() == Some(&self.depth) {
            self.implicit.pop();
            self.depth -= 1;
            closed = true;
        }
        if closed {
            self.trim_trailing_spaces();
            for _ in 0..self.depth.max(0) {
                self.out.push_str(INDENT);
            }
        }
    }

    /// Write multi-line text produced at depth zero, re-indented here.
    fn write_block(&mut self, text: &str) {
        for (i, line) in text.lines().enumerate() {
            if i > 0 {
                self.out.push('\n');
                for _ in 0..self.depth.max(0) {
                    self.out.push_str(INDENT);
                }
            }
            self.out.push_str(line);
        }
    }
}

pub struct Transpiler<'a> {
    ast: &'a Ast,
    config: &'a TranslateConfig,
    namer: Namer<'a>,
    scopes: ScopeChain<'a>,
    observed: BTreeSet<String>,
    approximations: usize,
}

impl<'a> Transpiler<'a> {
    pub fn new(ast: &'a Ast, config: &'a TranslateConfig, scopes: ScopeChain<'a>) -> Self {
        Self {
            ast,
            config,
            namer: config.namer(),
            scopes,
            observed: BTreeSet::new(),
            approximations: 0,
        }
    }

    /// Transpile a whole definition. Tokens before its first `{` (the
    /// signature) are consumed but dropped.
    pub fn body(mut self, def: NodeId) -> Outcome {
        let range = self.ast.node(def).tokens.clone();
        let mut state = BodyState::new(-1);
        self.run(&mut state, range.start, range.end);
        state.flush_increment();
        if state.pending_tag {
            state.write(APPROXIMATION_TAG);
        }
        let text = finish(&state.out);
        trace!(node = def.0, approximations = self.approximations, "transpiled body");
        Outcome {
            text,
            observed: self.observed,
            approximations: self.approximations,
        }
    }

    /// Transpile one sub-node as a standalone piece of text.
    fn fragment(&mut self, id: NodeId) -> String {
        let range = self.ast.node(id).tokens.clone();
        let mut state = BodyState::new(0);
        self.run(&mut state, range.start, range.end);
        state.flush_increment();
        let mut text = finish(&state.out);
        if state.pending_tag {
            text.push_str(APPROXIMATION_TAG);
        }
        text
    }

    fn run(&mut self, state: &mut BodyState, start: usize, end: usize) {
        let ast: &'a Ast = self.ast;
        let mut cursor = TokenCursor::new(&ast.tokens, start, end);
        while !cursor.is_done() {
            self.scopes.expire(cursor.pos);
            self.step(state, &mut cursor);
        }
    }

    fn tag(&mut self, state: &mut BodyState) {
        if !state.pending_tag {
            state.pending_tag = true;
            self.approximations += 1;
        }
    }

    fn step(&mut self, state: &mut BodyState, cursor: &mut TokenCursor<'a>) {
        let Some(token) = cursor.peek() else {
            return;
        };
        if self.declaration_token(state, cursor, token) {
            return;
        }
        match token.kind {
            TokenKind::Comment => {
                cursor.bump();
                self.comment(state, &token.spelling);
            }
            TokenKind::Identifier => self.identifier(state, cursor),
            TokenKind::Keyword => self.keyword(state, cursor),
            TokenKind::Punctuation => self.punctuation(state, cursor),
            TokenKind::Literal => {
                cursor.bump();
                state.operand(&strip_literal_suffix(&token.spelling));
            }
        }
    }

    /// Drop the type tokens of a local variable declaration and bind the
    /// variable. Returns whether the token was consumed.
    fn declaration_token(
        &mut self,
        state: &mut BodyState,
        cursor: &mut TokenCursor<'a>,
        token: &Token,
    ) -> bool {
        let Some(decl) = self.enclosing_var_decl(token.node) else {
            return false;
        };
        let Some(name_at) = self.name_token(decl) else {
            return false;
        };
        if cursor.pos < name_at {
            cursor.bump();
            return true;
        }
        if cursor.pos > name_at {
            return false;
        }
        cursor.bump();
        let ty = decl.ty.as_ref().map(|t| self.config.types().resolve(t));
        let name = self.namer.segment(&decl.spelling);
        let mut ident = Identifier::new(&decl.spelling, &name, Owner::Local);
        if let Some(ty) = ty {
            ident = ident.with_type(ty);
        }
        self.scopes.bind_local(ident);
        state.operand(&name);
        true
    }

    fn enclosing_var_decl(&self, id: NodeId) -> Option<&'a Node> {
        let ast: &'a Ast = self.ast;
        let node = ast.node(id);
        match node.kind {
            NodeKind::VarDecl => Some(node),
            NodeKind::TypeRef => ast.parent(id).filter(|p| p.kind == NodeKind::VarDecl),
            _ => None,
        }
    }

    /// Index of the token spelling the declared name of `decl`.
    fn name_token(&self, decl: &Node) -> Option<usize> {
        decl.tokens.clone().find(|&i| {
            let t = &self.ast.tokens[i];
            t.kind == TokenKind::Identifier && t.node == decl.id && t.spelling == decl.spelling
        })
    }

    fn comment(&mut self, state: &mut BodyState, spelling: &str) {
        state.newline(false);
        let mut first = true;
        for line in spelling.lines() {
            let text = strip_comment_decoration(line);
            if text.is_empty() && spelling.lines().count() > 1 {
                continue;
            }
            if !first {
                state.newline(false);
            }
            state.write("# ");
            state.write(text);
            first = false;
        }
        state.newline(false);
    }

    fn identifier(&mut self, state: &mut BodyState, cursor: &mut TokenCursor<'a>) {
        let mut segments = Vec::new();
        if let Some(first) = cursor.bump() {
            segments.push(first.spelling.as_str());
        }
        while let (Some(sep), Some(next)) = (cursor.peek(), cursor.peek_at(1)) {
            let joins = sep.kind == TokenKind::Punctuation
                && matches!(sep.spelling.as_str(), "." | "->" | "::");
            if !joins || next.kind != TokenKind::Identifier {
                break;
            }
            segments.push(next.spelling.as_str());
            cursor.bump();
            cursor.bump();
        }
        let chain = segments.join(".");

        let head = segments.first().copied().unwrap_or_default();
        if self.config.is_external_symbol(head) {
            self.observed.insert(head.to_string());
        } else if self.config.is_external_symbol(&chain) {
            self.observed.insert(chain.clone());
        }

        let text = if state.member_access {
            self.namer.chain(&chain)
        } else {
            self.scopes.resolve_chain(&chain)
        };
        state.operand(&text);
        state.flush_increment();
    }

    fn keyword(&mut self, state: &mut BodyState, cursor: &mut TokenCursor<'a>) {
        let Some(token) = cursor.peek() else {
            return;
        };
        match token.spelling.as_str() {
            "this" => return self.identifier(state, cursor),
            "for" => return self.for_loop(state, cursor, token.node),
            _ => {}
        }
        cursor.bump();
        if matches!(token.spelling.as_str(), "if" | "while" | "else" | "do") {
            state.open_implicit_block();
        }
        match token.spelling.as_str() {
            "true" => state.operand("True"),
            "false" => state.operand("False"),
            "nullptr" => state.operand("None"),
            "new" | "auto" => {}
            "if" | "while" => {
                state.operand(&token.spelling);
                state.write(" ");
                self.open_condition(state);
            }
            "else" if cursor.peek().is_some_and(|t| t.is_keyword("if")) => {
                cursor.bump();
                state.operand("elif");
                state.write(" ");
                self.open_condition(state);
            }
            "else" | "do" => {
                state.operand(&token.spelling);
                state.pending_colon = true;
                state.colon_at = Some(state.out.len());
                state.condition = None;
                state.last = Last::Keyword;
                state.write(" ");
            }
            other => {
                state.operand(other);
                state.last = Last::Keyword;
                state.label = matches!(other, "case" | "default");
                if cursor.peek().is_some_and(|next| !hugs_previous(next)) {
                    state.write(" ");
                }
            }
        }
    }

    fn open_condition(&mut self, state: &mut BodyState) {
        state.pending_colon = true;
        state.colon_at = None;
        state.condition = Some(0);
        state.last = Last::Keyword;
    }

    fn punctuation(&mut self, state: &mut BodyState, cursor: &mut TokenCursor<'a>) {
        let Some(token) = cursor.peek() else {
            return;
        };
        match token.spelling.as_str() {
            "{" => {
                cursor.bump();
                state.depth += 1;
                self.scopes.push();
                if state.depth == 0 {
                    state.out.clear();
                    state.pending_colon = false;
                    state.colon_at = None;
                    state.pending_tag = false;
                    state.last = Last::Nothing;
                } else {
                    state.newline(true);
                }
            }
            "}" => {
                cursor.bump();
                self.scopes.pop();
                state.depth -= 1;
                state.newline(false);
                state.close_implicit_blocks(next_is_else(cursor));
            }
            ";" => {
                cursor.bump();
                state.newline(false);
                state.close_implicit_blocks(next_is_else(cursor));
            }
            "++" | "--" => {
                cursor.bump();
                let increment = if token.spelling == "++" { " += 1" } else { " -= 1" };
                if state.last == Last::Operand {
                    state.write(increment);
                } else {
                    state.pending_increment = Some(increment);
                }
            }
            _ => self.punctuation_run(state, cursor),
        }
    }

    /// Coalesce consecutive punctuation up to the next block delimiter or
    /// increment and emit the rewritten run.
    fn punctuation_run(&mut self, state: &mut BodyState, cursor: &mut TokenCursor<'a>) {
        let mut run = String::new();
        let mut label_end = false;
        while let Some(token) = cursor.peek() {
            if token.kind != TokenKind::Punctuation
                || matches!(token.spelling.as_str(), "{" | "}" | ";" | "++" | "--")
            {
                break;
            }
            cursor.bump();
            let spelling = token.spelling.as_str();

            if matches!(spelling, "*" | "&") && state.last != Last::Operand {
                self.tag(state);
                continue;
            }
            if spelling == ":" && state.label {
                run.push_str(COLON_MARKER.trim_end());
                label_end = true;
                break;
            }

            let mapped = match spelling {
                "=" => " = ",
                "," => ", ",
                "::" | "->" => ".",
                "&&" => " and ",
                "||" => " or ",
                "==" => " == ",
                "!=" => " != ",
                "!" => " not ",
                ":" => COLON_MARKER,
                "?" => " ? ",
                op if BINARY_OPERATORS.contains(&op) && state.last == Last::Operand => {
                    run.push(' ');
                    run.push_str(op);
                    run.push(' ');
                    state.last = Last::Operator;
                    continue;
                }
                other => other,
            };
            run.push_str(mapped);

            state.last = match spelling {
                ")" | "]" => Last::Operand,
                _ => Last::Operator,
            };
            state.member_access = matches!(spelling, "." | "->" | "::");

            if let Some(depth) = state.condition {
                match spelling {
                    "(" => state.condition = Some(depth + 1),
                    ")" if depth <= 1 => {
                        state.condition = None;
                        state.colon_at = Some(state.out.len() + run.len());
                    }
                    ")" => state.condition = Some(depth - 1),
                    _ => {}
                }
            }
        }
        state.write(&run);
        if label_end {
            state.newline(false);
        }
    }

    /// Rebuild a `for` statement owned by `node`.
    fn for_loop(&mut self, state: &mut BodyState, cursor: &mut TokenCursor<'a>, id: NodeId) {
        let ast: &'a Ast = self.ast;
        let node = ast.node(id);
        let children: Vec<&'a Node> = ast.children(id).collect();
        let end = node.tokens.end;
        state.open_implicit_block();

        match node.kind {
            NodeKind::ForRangeStmt if children.len() >= 3 => {
                let var = children
                    .iter()
                    .find(|c| c.kind == NodeKind::VarDecl)
                    .copied()
                    .unwrap_or(children[0]);
                let expr = children[children.len() - 2];
                let body = children[children.len() - 1];

                self.scopes.push_until(end);
                let name = self.namer.segment(&var.spelling);
                let mut ident = Identifier::new(&var.spelling, &name, Owner::Local);
                if let Some(ty) = var.ty.as_ref() {
                    ident = ident.with_type(self.config.types().resolve(ty));
                }
                self.scopes.bind_local(ident);
                let source = self.fragment(expr.id);

                state.operand(&format!("for {} in ({})", name, source));
                state.pending_colon = true;
                state.colon_at = None;
                self.enter_body(state, cursor, body, end);
            }
            NodeKind::ForStmt if children.len() == 4 => {
                let (init, cond, step, body) = (children[0], children[1], children[2], children[3]);
                self.scopes.push_until(end);

                state.newline(false);
                let init = self.fragment(init.id);
                state.write_block(&init);
                state.newline(false);

                let cond = self.fragment(cond.id);
                state.write(&format!("while ({}):", cond));
                self.tag(state);
                state.depth += 1;
                state.newline(false);
                let step = self.fragment(step.id);
                state.write_block(&step);
                self.tag(state);
                state.depth -= 1;
                state.last = Last::Nothing;

                self.enter_body(state, cursor, body, end);
            }
            NodeKind::ForStmt | NodeKind::ForRangeStmt => {
                self.scopes.push_until(end);
                state.newline(false);
                state.write("while True:");
                self.tag(state);
                match children.last().copied() {
                    Some(body) => self.enter_body(state, cursor, body, end),
                    None => cursor.skip_to(end),
                }
            }
            _ => {
                cursor.bump();
                state.operand("for");
                state.write(" ");
            }
        }
    }

    /// Continue with the body of a loop whose header has been written.
    fn enter_body(
        &mut self,
        state: &mut BodyState,
        cursor: &mut TokenCursor<'a>,
        body: &'a Node,
        end: usize,
    ) {
        if body.kind == NodeKind::CompoundStmt {
            cursor.skip_to(body.tokens.start);
            return;
        }
        if state.pending_colon {
            state.trim_trailing_spaces();
            state.write(":");
            state.pending_colon = false;
        }
        state.depth += 1;
        state.newline(false);
        let text = self.fragment(body.id);
        state.write_block(&text);
        state.depth -= 1;
        state.newline(false);
        cursor.skip_to(end);
        self.scopes.expire(end);
        state.close_implicit_blocks(next_is_else(cursor));
    }
}

fn next_is_else(cursor: &TokenCursor<'_>) -> bool {
    cursor.peek().is_some_and(|t| t.is_keyword("else"))
}

/// Tokens written without a space after a keyword.
fn hugs_previous(token: &Token) -> bool {
    token.kind == TokenKind::Punctuation
        && matches!(
            token.spelling.as_str(),
            ";" | ")" | "," | "." | "->" | "::" | "]" | "{" | "}"
        )
}

fn strip_comment_decoration(line: &str) -> &str {
    let line = line.trim();
    let line = line.strip_suffix("*/").unwrap_or(line);
    line.trim_start_matches(|c: char| c == '/' || c == '*' || c == '!' || c.is_whitespace())
        .trim_end()
}

/// Drop integer and floating-point suffixes; string and character
/// literals are returned unchanged.
pub fn strip_literal_suffix(literal: &str) -> String {
    if !literal.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
        return literal.to_string();
    }
    let is_hex = literal.starts_with("0x") || literal.starts_with("0X");
    let trimmed = if is_hex {
        literal.trim_end_matches(['u', 'U', 'l', 'L'])
    } else {
        literal.trim_end_matches(['u', 'U', 'l', 'L', 'f', 'F'])
    };
    trimmed.replace('\'', "_")
}

/// Normalize the spacing of one code line, leaving string literals alone.
fn tidy_line(line: &str) -> String {
    let indent_len = line.len() - line.trim_start_matches(' ').len();
    let (indent, code) = line.split_at(indent_len);
    if code.starts_with('#') {
        return line.trim_end().to_string();
    }
    let (code, tag) = match code.trim_end().strip_suffix(APPROXIMATION_TAG.trim_start()) {
        Some(rest) => (rest, APPROXIMATION_TAG),
        None => (code, ""),
    };

    let mut out = String::with_capacity(code.len());
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for c in code.chars() {
        if let Some(q) = quote {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => {
                quote = Some(c);
                out.push(c);
            }
            ' ' if out.is_empty() || out.ends_with([' ', '(', '[']) => {}
            ')' | ']' | ',' if out.ends_with(' ') => {
                out.pop();
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    let code = out.trim_end();
    if code.is_empty() {
        return String::new();
    }
    format!("{}{}{}", indent, code, tag)
}

fn indent_of(line: &str) -> usize {
    line.len() - line.trim_start_matches(' ').len()
}

fn opens_block(line: &str) -> bool {
    let code = line.trim();
    let code = code.strip_suffix(APPROXIMATION_TAG.trim_start()).unwrap_or(code).trim_end();
    let keyword = code
        .split(|c: char| !c.is_alphanumeric() && c != '_')
        .next()
        .unwrap_or_default();
    code.ends_with(':') && BLOCK_KEYWORDS.contains(&keyword)
}

/// Final cleanup: tidy every line, resolve colon markers at line ends,
/// drop blank lines and give empty blocks a `pass`.
fn finish(out: &str) -> String {
    let mut lines: Vec<String> = Vec::new();
    for raw in out.lines() {
        let line = tidy_line(raw);
        if line.trim().is_empty() {
            continue;
        }
        let line = match line.strip_suffix(COLON_MARKER.trim_end()) {
            Some(head) => format!("{}:", head.trim_end()),
            None => line,
        };
        lines.push(line);
    }

    let mut result: Vec<String> = Vec::with_capacity(lines.len());
    for (i, line) in lines.iter().enumerate() {
        result.push(line.clone());
        if opens_block(line) {
            let inner = lines
                .get(i + 1)
                .is_some_and(|next| indent_of(next) > indent_of(line));
            if !inner {
                result.push(format!("{}{}pass", " ".repeat(indent_of(line)), INDENT));
            }
        }
    }
    result.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_suffixes_are_stripped() {
        assert_eq!(strip_literal_suffix("1.5f"), "1.5");
        assert_eq!(strip_literal_suffix("10u"), "10");
        assert_eq!(strip_literal_suffix("5L"), "5");
        assert_eq!(strip_literal_suffix("0xFFul"), "0xFF");
        assert_eq!(strip_literal_suffix("0x1F"), "0x1F");
        assert_eq!(strip_literal_suffix("1'000"), "1_000");
        assert_eq!(strip_literal_suffix("\"10u\""), "\"10u\"");
    }

    #[test]
    fn tidy_collapses_spaces_outside_strings() {
        assert_eq!(tidy_line("    x  =  ( a ,b )"), "    x = (a,b)");
        assert_eq!(tidy_line("s = \"a  b\"  "), "s = \"a  b\"");
        assert_eq!(tidy_line("# keep  as is  "), "# keep  as is");
        assert_eq!(
            tidy_line("while (i  <  n):  # TODO"),
            "while (i < n):  # TODO"
        );
    }

    #[test]
    fn finish_resolves_colon_markers_and_fills_empty_blocks() {
        let out = "\ncase 3 COLON \n    x = 1\n\nif (a):\nb = a ? 1 COLON 2\n";
        assert_eq!(
            finish(out),
            "case 3:\n    x = 1\nif (a):\n    pass\nb = a ? 1 COLON 2"
        );
    }

    #[test]
    fn comment_decoration_is_stripped() {
        assert_eq!(strip_comment_decoration("// hello"), "hello");
        assert_eq!(strip_comment_decoration("/* block */"), "block");
        assert_eq!(strip_comment_decoration("   * continued"), "continued");
        assert_eq!(strip_comment_decoration("//! doc"), "doc");
    }
}
