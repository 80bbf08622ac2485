//! Layered identifier scopes.
//!
//! Scopes live in an arena and point at their parent by [`ScopeId`]. The
//! arena is filled while the declaration model is built and never changes
//! afterwards; bindings introduced while a body is transpiled (locals, loop
//! variables) go into a [`ScopeChain`] frame stacked on top of it.

use std::collections::HashMap;

use indexmap::IndexMap;

use crate::naming::Namer;
use crate::types::NativeType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(u32);

impl ScopeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// What kind of declaration an identifier was bound for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Owner {
    Container,
    Class,
    Field,
    Method,
    Function,
    Argument,
    Local,
    BaseAttribute,
}

/// A native spelling bound to its target-language form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identifier {
    pub native: String,
    pub name: String,
    /// Applied as `receiver.name` when the binding is found through the
    /// scope chain, e.g. `self` for class members.
    pub receiver: Option<String>,
    pub owner: Owner,
    pub ty: Option<NativeType>,
    /// Scope holding the members of the thing this identifier names.
    pub nested: Option<ScopeId>,
}

impl Identifier {
    pub fn new(native: &str, name: &str, owner: Owner) -> Self {
        Self {
            native: native.to_string(),
            name: name.to_string(),
            receiver: None,
            owner,
            ty: None,
            nested: None,
        }
    }

    pub fn with_receiver(mut self, receiver: &str) -> Self {
        self.receiver = Some(receiver.to_string());
        self
    }

    pub fn with_type(mut self, ty: NativeType) -> Self {
        self.ty = Some(ty);
        self
    }

    pub fn with_nested(mut self, scope: ScopeId) -> Self {
        self.nested = Some(scope);
        self
    }

    /// The expression used when this identifier is referenced by itself.
    pub fn qualified(&self) -> String {
        match &self.receiver {
            Some(receiver) => format!("{}.{}", receiver, self.name),
            None => self.name.clone(),
        }
    }
}

#[derive(Debug, Clone, Default)]
struct Scope {
    parent: Option<ScopeId>,
    bindings: IndexMap<String, Identifier>,
}

#[derive(Debug, Clone, Default)]
pub struct ScopeArena {
    scopes: Vec<Scope>,
    /// Resolved class name → the class's member scope.
    types: HashMap<String, ScopeId>,
}

impl ScopeArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self, parent: Option<ScopeId>) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(Scope {
            parent,
            bindings: IndexMap::new(),
        });
        id
    }

    /// Bind an identifier; a later binding of the same spelling in the same
    /// scope replaces the earlier one.
    pub fn bind(&mut self, scope: ScopeId, ident: Identifier) {
        self.scopes[scope.index()]
            .bindings
            .insert(ident.native.clone(), ident);
    }

    pub fn register_type(&mut self, name: &str, scope: ScopeId) {
        self.types.insert(name.to_string(), scope);
    }

    pub fn parent(&self, scope: ScopeId) -> Option<ScopeId> {
        self.scopes[scope.index()].parent
    }

    pub fn lookup_local(&self, scope: ScopeId, native: &str) -> Option<&Identifier> {
        self.scopes[scope.index()].bindings.get(native)
    }

    /// Look a spelling up in `scope` and then in each ancestor.
    pub fn lookup(&self, scope: ScopeId, native: &str) -> Option<&Identifier> {
        let mut current = Some(scope);
        while let Some(id) = current {
            if let Some(ident) = self.lookup_local(id, native) {
                return Some(ident);
            }
            current = self.parent(id);
        }
        None
    }

    /// The scope in which members of `ident` are looked up: its own nested
    /// scope, or the scope of the class its type names.
    pub fn member_scope(&self, ident: &Identifier) -> Option<ScopeId> {
        ident.nested.or_else(|| {
            let ty = ident.ty.as_ref()?;
            self.types.get(&ty.name).copied()
        })
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }
}

#[derive(Debug, Default)]
struct Frame {
    bindings: IndexMap<String, Identifier>,
    /// Token index at which this frame ends, for frames opened by a loop.
    until: Option<usize>,
}

/// A read-only arena scope plus mutable local frames.
#[derive(Debug)]
pub struct ScopeChain<'a> {
    arena: &'a ScopeArena,
    base: ScopeId,
    frames: Vec<Frame>,
    namer: Namer<'a>,
}

impl<'a> ScopeChain<'a> {
    pub fn new(arena: &'a ScopeArena, base: ScopeId, namer: Namer<'a>) -> Self {
        Self {
            arena,
            base,
            frames: Vec::new(),
            namer,
        }
    }

    pub fn push(&mut self) {
        self.frames.push(Frame::default());
    }

    /// Push a frame that [`ScopeChain::expire`] drops once the cursor passes `until`.
    pub fn push_until(&mut self, until: usize) {
        self.frames.push(Frame {
            bindings: IndexMap::new(),
            until: Some(until),
        });
    }

    pub fn pop(&mut self) {
        self.frames.pop();
    }

    /// Drop loop frames whose token range ends at or before `pos`.
    pub fn expire(&mut self, pos: usize) {
        while self
            .frames
            .last()
            .and_then(|f| f.until)
            .is_some_and(|until| pos >= until)
        {
            self.frames.pop();
        }
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Bind in the innermost frame, or open one if none exists.
    pub fn bind_local(&mut self, ident: Identifier) {
        if self.frames.is_empty() {
            self.push();
        }
        if let Some(frame) = self.frames.last_mut() {
            frame.bindings.insert(ident.native.clone(), ident);
        }
    }

    pub fn lookup(&self, native: &str) -> Option<&Identifier> {
        self.frames
            .iter()
            .rev()
            .find_map(|f| f.bindings.get(native))
            .or_else(|| self.arena.lookup(self.base, native))
    }

    /// Resolve a dotted chain (already normalized from `::` and `->`).
    pub fn resolve_chain(&self, chain: &str) -> String {
        let parts: Vec<&str> = chain.split('.').collect();
        let (head, suffix) = match parts.split_first() {
            Some(split) => split,
            None => return String::new(),
        };

        if *head == "this" {
            let Some((first, _)) = suffix.split_first() else {
                return "self".to_string();
            };
            return match self.lookup(first) {
                Some(ident) if ident.receiver.is_some() => self.compose(ident, &suffix[1..]),
                _ => format!("self.{}", self.namer.chain(&suffix.join("."))),
            };
        }

        match self.lookup(head) {
            Some(ident) => self.compose(ident, suffix),
            None => self.namer.chain(chain),
        }
    }

    /// `ident` followed by `suffix`, resolving each segment in the member
    /// scope of the previous one for as long as that works.
    fn compose(&self, ident: &Identifier, suffix: &[&str]) -> String {
        let mut out = ident.qualified();
        let mut current = ident;
        for (i, part) in suffix.iter().enumerate() {
            let member = self
                .arena
                .member_scope(current)
                .and_then(|scope| self.arena.lookup_local(scope, part));
            out.push('.');
            match member {
                Some(next) => {
                    out.push_str(&next.name);
                    current = next;
                }
                None => {
                    out.push_str(&self.namer.chain(&suffix[i..].join(".")));
                    break;
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TranslateConfig;

    fn ty(name: &str) -> NativeType {
        NativeType {
            native: name.to_string(),
            name: name.to_string(),
        }
    }

    #[test]
    fn child_scope_overlays_parent() {
        let mut arena = ScopeArena::new();
        let outer = arena.alloc(None);
        let inner = arena.alloc(Some(outer));
        arena.bind(outer, Identifier::new("x", "outer_x", Owner::Field));
        arena.bind(outer, Identifier::new("y", "outer_y", Owner::Field));
        arena.bind(inner, Identifier::new("x", "inner_x", Owner::Argument));

        assert_eq!(arena.lookup(inner, "x").unwrap().name, "inner_x");
        assert_eq!(arena.lookup(inner, "y").unwrap().name, "outer_y");
        assert_eq!(arena.lookup(outer, "x").unwrap().name, "outer_x");
        assert!(arena.lookup_local(inner, "y").is_none());
    }

    #[test]
    fn chain_resolves_through_member_scopes() {
        let config = TranslateConfig::default();
        let mut arena = ScopeArena::new();
        let container = arena.alloc(None);
        let widget = arena.alloc(Some(container));
        let method = arena.alloc(Some(widget));
        arena.register_type("Widget", widget);
        arena.bind(
            widget,
            Identifier::new("m_Count", "count", Owner::Field).with_receiver("self"),
        );
        arena.bind(
            widget,
            Identifier::new("resetAll", "reset_all", Owner::Method).with_receiver("self"),
        );
        arena.bind(
            method,
            Identifier::new("other", "other", Owner::Argument).with_type(ty("Widget")),
        );

        let chain = ScopeChain::new(&arena, method, config.namer());
        assert_eq!(chain.resolve_chain("m_Count"), "self.count");
        assert_eq!(chain.resolve_chain("other.m_Count"), "other.count");
        assert_eq!(chain.resolve_chain("other.resetAll"), "other.reset_all");
        assert_eq!(chain.resolve_chain("other.m_Count.toInt"), "other.count.to_int");
        assert_eq!(chain.resolve_chain("this"), "self");
        assert_eq!(chain.resolve_chain("this.m_Count"), "self.count");
        assert_eq!(chain.resolve_chain("this.m_hidden"), "self.hidden");
        assert_eq!(chain.resolve_chain("unknownThing.doIt"), "unknown_thing.do_it");
    }

    #[test]
    fn this_prefers_member_over_shadowing_argument() {
        let config = TranslateConfig::default();
        let mut arena = ScopeArena::new();
        let class = arena.alloc(None);
        let method = arena.alloc(Some(class));
        arena.bind(
            class,
            Identifier::new("size", "size", Owner::Field).with_receiver("self"),
        );
        arena.bind(method, Identifier::new("size", "size", Owner::Argument));
        let chain = ScopeChain::new(&arena, method, config.namer());
        assert_eq!(chain.resolve_chain("size"), "size");
        assert_eq!(chain.resolve_chain("this.size"), "self.size");
    }

    #[test]
    fn local_frames_shadow_and_expire() {
        let config = TranslateConfig::default();
        let mut arena = ScopeArena::new();
        let class = arena.alloc(None);
        arena.bind(
            class,
            Identifier::new("i", "i", Owner::Field).with_receiver("self"),
        );
        let mut chain = ScopeChain::new(&arena, class, config.namer());
        assert_eq!(chain.resolve_chain("i"), "self.i");

        chain.push_until(10);
        chain.bind_local(Identifier::new("i", "i", Owner::Local));
        assert_eq!(chain.resolve_chain("i"), "i");
        chain.expire(9);
        assert_eq!(chain.depth(), 1);
        chain.expire(10);
        assert_eq!(chain.depth(), 0);
        assert_eq!(chain.resolve_chain("i"), "self.i");
    }

    #[test]
    fn nested_container_scope_resolves_class_statics() {
        let config = TranslateConfig::default();
        let mut arena = ScopeArena::new();
        let container = arena.alloc(None);
        let class = arena.alloc(Some(container));
        arena.bind(
            container,
            Identifier::new("CDockManager", "CDockManager", Owner::Class).with_nested(class),
        );
        arena.bind(
            class,
            Identifier::new("configFlags", "config_flags", Owner::Method).with_receiver("self"),
        );
        let chain = ScopeChain::new(&arena, container, config.namer());
        assert_eq!(
            chain.resolve_chain("CDockManager.configFlags"),
            "CDockManager.config_flags"
        );
    }
}
