//! Declaration model.
//!
//! Classes, their fields and methods, and the synthetic container holding
//! free functions, collected from every translation unit, deduplicated and
//! bound into the scope arena. Method bodies are transpiled on first use
//! and cached.

use std::collections::BTreeSet;
use std::sync::OnceLock;

use fpp_ast::{Ast, Node, NodeId, NodeKind, SourceLocation};
use indexmap::IndexMap;
use tracing::debug;

use crate::config::TranslateConfig;
use crate::naming::underscore;
use crate::render::dedent;
use crate::scope::{Identifier, Owner, ScopeArena, ScopeChain, ScopeId};
use crate::transpile::Transpiler;
use crate::types::NativeType;

const RECEIVER: &str = "self";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Argument {
    pub native: String,
    pub name: String,
    pub ty: NativeType,
}

/// One entry of a rendered parameter list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Parameter {
    /// The implicit receiver of a non-static method.
    Receiver,
    Named(Argument),
}

impl Parameter {
    pub fn name(&self) -> &str {
        match self {
            Parameter::Receiver => RECEIVER,
            Parameter::Named(arg) => &arg.name,
        }
    }

    pub fn argument(&self) -> Option<&Argument> {
        match self {
            Parameter::Receiver => None,
            Parameter::Named(arg) => Some(arg),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub native: String,
    pub name: String,
    pub ty: NativeType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MethodKind {
    Constructor,
    Destructor,
    Method,
    Function,
}

/// Transpiled body of a method, computed once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MethodBody {
    /// Target text; `None` when no definition was available.
    pub text: Option<String>,
    /// Original source of the definition, dedented.
    pub reference: Option<String>,
    /// External symbols referenced from the body.
    pub observed: BTreeSet<String>,
    /// How many constructs were emitted with an approximation tag.
    pub approximations: usize,
}

#[derive(Debug)]
pub struct Method {
    /// Index of the translation unit the declaration came from.
    pub unit: usize,
    pub node: NodeId,
    pub kind: MethodKind,
    pub native_name: String,
    pub name: String,
    pub params: Vec<Parameter>,
    pub result: NativeType,
    pub has_return_value: bool,
    pub is_static: bool,
    pub brief: Option<String>,
    pub scope: ScopeId,
    pub location: Option<SourceLocation>,
    body: OnceLock<MethodBody>,
}

impl Method {
    pub fn arguments(&self) -> impl Iterator<Item = &Argument> {
        self.params.iter().filter_map(Parameter::argument)
    }

    pub fn file(&self) -> Option<&str> {
        self.location.as_ref().and_then(|l| l.file.as_deref())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclarationKind {
    Class,
    /// The synthetic container of free functions.
    Container,
}

#[derive(Debug)]
pub struct Declaration {
    pub kind: DeclarationKind,
    pub unit: usize,
    pub node: NodeId,
    pub native_name: String,
    pub name: String,
    pub bases: Vec<String>,
    pub base_attributes: BTreeSet<String>,
    pub fields: Vec<Field>,
    pub methods: Vec<Method>,
    pub scope: ScopeId,
    pub location: Option<SourceLocation>,
    /// External base classes.
    pub observed: BTreeSet<String>,
}

impl Declaration {
    pub fn file(&self) -> Option<&str> {
        self.location.as_ref().and_then(|l| l.file.as_deref())
    }
}

#[derive(Debug)]
pub struct DeclarationModel<'a> {
    asts: &'a [Ast],
    config: &'a TranslateConfig,
    scopes: ScopeArena,
    container: ScopeId,
    declarations: IndexMap<String, Declaration>,
}

impl<'a> DeclarationModel<'a> {
    /// Collect, deduplicate and bind every declaration in `asts`.
    pub fn build(asts: &'a [Ast], config: &'a TranslateConfig) -> Self {
        let mut builder = ModelBuilder {
            config,
            scopes: ScopeArena::new(),
        };
        let container = builder.scopes.alloc(None);

        let mut candidates = Vec::new();
        for (unit, ast) in asts.iter().enumerate() {
            candidates.extend(builder.collect_classes(unit, ast, container));
        }
        let mut declarations = prune(candidates, config);

        for decl in declarations.values() {
            builder.scopes.register_type(&decl.name, decl.scope);
            builder.scopes.bind(
                container,
                Identifier::new(&decl.native_name, &decl.name, Owner::Class).with_nested(decl.scope),
            );
            if decl.native_name != decl.name {
                builder.scopes.bind(
                    container,
                    Identifier::new(&decl.name, &decl.name, Owner::Class).with_nested(decl.scope),
                );
            }
        }

        if let Some(functions) = builder.collect_functions(asts, container) {
            declarations.insert(functions.name.clone(), functions);
        }
        declarations.sort_keys();

        debug!(
            declarations = declarations.len(),
            scopes = builder.scopes.len(),
            "declaration model built"
        );
        Self {
            asts,
            config,
            scopes: builder.scopes,
            container,
            declarations,
        }
    }

    pub fn config(&self) -> &'a TranslateConfig {
        self.config
    }

    pub fn scopes(&self) -> &ScopeArena {
        &self.scopes
    }

    pub fn container_scope(&self) -> ScopeId {
        self.container
    }

    /// Surviving declarations, sorted by resolved name.
    pub fn declarations(&self) -> &IndexMap<String, Declaration> {
        &self.declarations
    }

    pub fn get(&self, name: &str) -> Option<&Declaration> {
        self.declarations.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    /// The transpiled body of `method`, computed on first request.
    pub fn body<'m>(&self, method: &'m Method) -> &'m MethodBody {
        method.body.get_or_init(|| self.compute_body(method))
    }

    fn compute_body(&self, method: &Method) -> MethodBody {
        let ast = &self.asts[method.unit];
        let Some(def) = ast.definition_of(method.node) else {
            return MethodBody::default();
        };
        let chain = ScopeChain::new(&self.scopes, method.scope, self.config.namer());
        let outcome = Transpiler::new(ast, self.config, chain).body(def);
        let reference = ast
            .source_text(&ast.node(def).extent)
            .map(|text| dedent(&text));
        MethodBody {
            text: Some(outcome.text),
            reference,
            observed: outcome.observed,
            approximations: outcome.approximations,
        }
    }
}

struct ModelBuilder<'c> {
    config: &'c TranslateConfig,
    scopes: ScopeArena,
}

impl<'c> ModelBuilder<'c> {
    fn collect_classes(&mut self, unit: usize, ast: &Ast, container: ScopeId) -> Vec<Declaration> {
        let mut out = Vec::new();
        for node in ast.walk(ast.root) {
            if !node.kind.is_class_like() || node.spelling.is_empty() {
                continue;
            }
            if self
                .config
                .skip_class_prefixes
                .iter()
                .any(|p| node.spelling.starts_with(p.as_str()))
            {
                continue;
            }
            // forward declarations carry no body
            if !ast.tokens(node.id).iter().any(|t| t.is_punct("{")) {
                continue;
            }
            out.push(self.class(unit, ast, node, container));
        }
        out
    }

    fn class(&mut self, unit: usize, ast: &Ast, node: &Node, container: ScopeId) -> Declaration {
        let types = self.config.types();
        let namer = self.config.namer();
        let name = types.resolve_spelling(&node.spelling);

        let bases: Vec<String> = ast
            .children(node.id)
            .filter(|c| c.kind == NodeKind::BaseSpecifier)
            .map(|c| base_class_name(self.config, &c.spelling))
            .filter(|b| !b.is_empty() && *b != name)
            .collect();
        let base_attributes = self
            .config
            .base_attributes(bases.iter().map(String::as_str));
        let observed: BTreeSet<String> = bases
            .iter()
            .filter(|b| self.config.is_external_symbol(b))
            .cloned()
            .collect();

        let scope = self.scopes.alloc(Some(container));
        for attr in &base_attributes {
            self.scopes.bind(
                scope,
                Identifier::new(attr, attr, Owner::BaseAttribute).with_receiver(RECEIVER),
            );
        }

        let mut fields = Vec::new();
        for child in ast.children(node.id).filter(|c| c.kind == NodeKind::FieldDecl) {
            let ty = child
                .ty
                .as_ref()
                .map(|t| types.resolve(t))
                .unwrap_or_default();
            let field = Field {
                native: child.spelling.clone(),
                name: namer.declared(&child.spelling, &base_attributes),
                ty,
            };
            self.scopes.bind(
                scope,
                Identifier::new(&field.native, &field.name, Owner::Field)
                    .with_receiver(RECEIVER)
                    .with_type(field.ty.clone()),
            );
            fields.push(field);
        }

        let mut methods = Vec::new();
        for child in ast.children(node.id).filter(|c| c.kind.is_method_like()) {
            let kind = match child.kind {
                NodeKind::Constructor => MethodKind::Constructor,
                NodeKind::Destructor => MethodKind::Destructor,
                _ => MethodKind::Method,
            };
            let method = self.method(unit, ast, child, kind, scope, &base_attributes);
            let ident = Identifier::new(&method.native_name, &method.name, Owner::Method)
                .with_receiver(RECEIVER)
                .with_type(method.result.clone());
            self.scopes.bind(scope, ident);
            methods.push(method);
        }

        let location = start_location(node);
        debug!(
            class = %name,
            unit,
            methods = methods.len(),
            fields = fields.len(),
            "collected class"
        );
        Declaration {
            kind: DeclarationKind::Class,
            unit,
            node: node.id,
            native_name: node.spelling.clone(),
            name,
            bases,
            base_attributes,
            fields,
            methods,
            scope,
            location,
            observed,
        }
    }

    fn method(
        &mut self,
        unit: usize,
        ast: &Ast,
        node: &Node,
        kind: MethodKind,
        parent: ScopeId,
        guard: &BTreeSet<String>,
    ) -> Method {
        let types = self.config.types();
        let namer = self.config.namer();
        let name = match kind {
            MethodKind::Constructor => "__init__".to_string(),
            MethodKind::Destructor => "__del__".to_string(),
            _ => namer.declared(&node.spelling, guard),
        };

        let scope = self.scopes.alloc(Some(parent));
        let mut params = Vec::new();
        if kind != MethodKind::Function && !node.is_static {
            params.push(Parameter::Receiver);
        }
        let no_guard = BTreeSet::new();
        for parm in ast.children(node.id).filter(|c| c.kind == NodeKind::ParmDecl) {
            let ty = parm
                .ty
                .as_ref()
                .map(|t| types.resolve(t))
                .unwrap_or_default();
            let name = if parm.spelling.is_empty() {
                underscore(ty.short_name())
            } else {
                namer.declared(&parm.spelling, &no_guard)
            };
            if !parm.spelling.is_empty() {
                self.scopes.bind(
                    scope,
                    Identifier::new(&parm.spelling, &name, Owner::Argument).with_type(ty.clone()),
                );
            }
            params.push(Parameter::Named(Argument {
                native: parm.spelling.clone(),
                name,
                ty,
            }));
        }

        let result = node
            .result_type
            .as_ref()
            .map(|t| types.resolve(t))
            .unwrap_or_default();
        let has_return_value = !result.is_void();
        Method {
            unit,
            node: node.id,
            kind,
            native_name: node.spelling.clone(),
            name,
            params,
            result,
            has_return_value,
            is_static: node.is_static,
            brief: node.brief_comment.clone().filter(|c| !c.trim().is_empty()),
            scope,
            location: start_location(node),
            body: OnceLock::new(),
        }
    }

    /// Free functions from every unit, merged into one container.
    fn collect_functions(&mut self, asts: &[Ast], container: ScopeId) -> Option<Declaration> {
        let mut functions: IndexMap<(String, usize), Method> = IndexMap::new();
        let no_guard = BTreeSet::new();
        for (unit, ast) in asts.iter().enumerate() {
            for node in ast.find_kind(ast.root, NodeKind::FunctionDecl) {
                if node.spelling.is_empty()
                    || self
                        .config
                        .skip_function_prefixes
                        .iter()
                        .any(|p| node.spelling.starts_with(p.as_str()))
                {
                    continue;
                }
                let function = self.method(unit, ast, node, MethodKind::Function, container, &no_guard);
                if self.config.is_excluded_source(function.file()) {
                    debug!(function = %function.native_name, file = function.file(), "not in canonical sources");
                    continue;
                }
                let key = (function.native_name.clone(), function.params.len());
                let has_body = ast.definition_of(node.id).is_some();
                match functions.get(&key) {
                    Some(existing)
                        if has_body
                            && asts[existing.unit].definition_of(existing.node).is_none() =>
                    {
                        debug!(function = %function.native_name, "replacing declaration with definition");
                        functions.insert(key, function);
                    }
                    Some(_) => {}
                    None => {
                        functions.insert(key, function);
                    }
                }
            }
        }
        if functions.is_empty() {
            return None;
        }

        let methods: Vec<Method> = functions.into_values().collect();
        for function in &methods {
            self.scopes.bind(
                container,
                Identifier::new(&function.native_name, &function.name, Owner::Function)
                    .with_type(function.result.clone()),
            );
        }
        let name = self.config.function_container.clone();
        Some(Declaration {
            kind: DeclarationKind::Container,
            unit: 0,
            node: asts.first().map(|a| a.root).unwrap_or(NodeId(0)),
            native_name: name.clone(),
            name,
            bases: Vec::new(),
            base_attributes: BTreeSet::new(),
            fields: Vec::new(),
            methods,
            scope: container,
            location: None,
            observed: BTreeSet::new(),
        })
    }
}

/// Resolved name of a base specifier: leading `class`/`struct` and access
/// keywords dropped, then resolved like a type.
fn base_class_name(config: &TranslateConfig, spelling: &str) -> String {
    let mut name = spelling.trim();
    for keyword in ["virtual ", "public ", "protected ", "private ", "class ", "struct "] {
        if let Some(rest) = name.strip_prefix(keyword) {
            name = rest.trim_start();
        }
    }
    config.types().resolve_spelling(name)
}

/// Keep one declaration per resolved name: the one with the most methods,
/// a canonical source breaking ties.
fn prune(candidates: Vec<Declaration>, config: &TranslateConfig) -> IndexMap<String, Declaration> {
    let mut kept: IndexMap<String, Declaration> = IndexMap::new();
    for decl in candidates {
        let Some(current) = kept.get(&decl.name) else {
            kept.insert(decl.name.clone(), decl);
            continue;
        };
        let more_methods = decl.methods.len() > current.methods.len();
        let tie_to_canonical = decl.methods.len() == current.methods.len()
            && decl.file().is_some_and(|f| config.is_canonical(f))
            && !current.file().is_some_and(|f| config.is_canonical(f));
        if more_methods || tie_to_canonical {
            debug!(
                class = %decl.name,
                kept = decl.methods.len(),
                dropped = current.methods.len(),
                "duplicate declaration replaced"
            );
            kept.insert(decl.name.clone(), decl);
        } else {
            debug!(class = %decl.name, "duplicate declaration dropped");
        }
    }

    kept.retain(|name, decl| {
        let excluded = config.is_excluded_source(decl.file());
        if excluded {
            debug!(class = %name, file = decl.file(), "not in canonical sources");
        }
        !excluded
    });
    kept
}

fn start_location(node: &Node) -> Option<SourceLocation> {
    Some(node.extent.start.clone()).filter(|l| l.file.is_some() || l.line > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fpp_ast::{AstBuilder, TypeRef};

    fn widget_unit(methods: &[&str], file: &str) -> Ast {
        let mut b = AstBuilder::new();
        let class = b.open(NodeKind::ClassDecl, "Widget");
        b.tokens("class Widget {");
        let field = b.leaf(NodeKind::FieldDecl, "m_Count", "int m_Count;");
        b.set_type(field, TypeRef::named("int"));
        for name in methods {
            let m = b.leaf(NodeKind::Method, name, &format!("void {name}();"));
            b.set_result_type(m, TypeRef::named("void"));
        }
        b.tokens("};");
        b.close();
        b.set_extent(class, file, 1, 10);
        b.finish()
    }

    #[test]
    fn dedup_keeps_variant_with_more_methods() {
        let asts = vec![
            widget_unit(&["a", "b", "c"], "/tmp/one.h"),
            widget_unit(&["a", "b", "c", "d", "e"], "/tmp/two.h"),
        ];
        let config = TranslateConfig::default();
        let model = DeclarationModel::build(&asts, &config);
        let widget = model.get("Widget").unwrap();
        assert_eq!(widget.methods.len(), 5);
        assert_eq!(widget.unit, 1);
    }

    #[test]
    fn dedup_tie_prefers_canonical_source() {
        let asts = vec![
            widget_unit(&["a"], "/usr/include/widget.h"),
            widget_unit(&["b"], "/src/lib/widget.h"),
        ];
        let config = TranslateConfig {
            canonical_sources: vec!["/src/lib".into()],
            ..TranslateConfig::default()
        };
        let model = DeclarationModel::build(&asts, &config);
        assert_eq!(model.get("Widget").unwrap().methods[0].native_name, "b");
    }

    #[test]
    fn canonical_only_drops_foreign_declarations() {
        let asts = vec![widget_unit(&["a"], "/usr/include/widget.h")];
        let config = TranslateConfig {
            canonical_sources: vec!["/src/lib".into()],
            canonical_only: true,
            ..TranslateConfig::default()
        };
        assert!(DeclarationModel::build(&asts, &config).is_empty());
    }

    #[test]
    fn forward_declarations_and_skipped_prefixes_are_ignored() {
        let mut b = AstBuilder::new();
        b.leaf(NodeKind::ClassDecl, "Forward", "class Forward;");
        b.leaf(NodeKind::ClassDecl, "QtPrivate", "class QtPrivate { };");
        b.leaf(NodeKind::StructDecl, "Point", "struct Point { };");
        let asts = vec![b.finish()];
        let config = TranslateConfig {
            skip_class_prefixes: vec!["Qt".into()],
            ..TranslateConfig::default()
        };
        let model = DeclarationModel::build(&asts, &config);
        let names: Vec<&str> = model.declarations().keys().map(String::as_str).collect();
        assert_eq!(names, vec!["Point"]);
    }

    #[test]
    fn methods_get_receiver_and_special_names() {
        let mut b = AstBuilder::new();
        b.open(NodeKind::ClassDecl, "Widget");
        b.tokens("class Widget {");
        b.leaf(NodeKind::Constructor, "Widget", "Widget();");
        b.leaf(NodeKind::Destructor, "~Widget", "~Widget();");
        let eq = b.open(NodeKind::Method, "operator==");
        b.tokens("bool operator==(");
        let other = b.leaf(NodeKind::ParmDecl, "other", "const Widget & other");
        b.set_type(
            other,
            TypeRef::reference_to(TypeRef::named("const Widget")),
        );
        b.tokens(");");
        b.close();
        b.set_result_type(eq, TypeRef::named("bool"));
        let create = b.open(NodeKind::Method, "create");
        b.tokens("static Widget * create(");
        let unnamed = b.leaf(NodeKind::ParmDecl, "", "QWidget *");
        b.set_type(unnamed, TypeRef::pointer_to(TypeRef::named("QWidget")));
        b.tokens(");");
        b.close();
        b.set_static(create);
        b.set_result_type(create, TypeRef::pointer_to(TypeRef::named("Widget")));
        b.tokens("};");
        b.close();
        let asts = vec![b.finish()];

        let config = TranslateConfig::default();
        let model = DeclarationModel::build(&asts, &config);
        let widget = model.get("Widget").unwrap();
        let names: Vec<&str> = widget.methods.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["__init__", "__del__", "__eq__", "create"]);

        let eq = &widget.methods[2];
        assert_eq!(eq.params[0], Parameter::Receiver);
        assert_eq!(eq.params[1].name(), "other");
        assert!(eq.has_return_value);
        assert_eq!(eq.result.name, "bool");

        let create = &widget.methods[3];
        assert!(create.is_static);
        assert_eq!(create.params.len(), 1);
        assert_eq!(create.params[0].name(), "q_widget");
        assert_eq!(create.result.name, "Widget");
        assert!(!widget.methods[0].has_return_value);
    }

    #[test]
    fn fields_and_base_attributes_are_bound_in_class_scope() {
        let mut b = AstBuilder::new();
        b.open(NodeKind::ClassDecl, "ads::CDockWidget");
        b.tokens("class CDockWidget :");
        b.leaf(NodeKind::BaseSpecifier, "class QFrame", "public QFrame");
        b.tokens("{");
        b.leaf(NodeKind::FieldDecl, "m_Title", "QString m_Title;");
        let show = b.leaf(NodeKind::Method, "showEvent", "void showEvent();");
        b.set_result_type(show, TypeRef::named("void"));
        b.tokens("};");
        b.close();
        let asts = vec![b.finish()];

        let mut config = TranslateConfig {
            known_namespaces: vec!["ads::".into()],
            ..TranslateConfig::default()
        };
        config.base_classes.insert(
            "QFrame".into(),
            ["showEvent".to_string(), "update".to_string()].into_iter().collect(),
        );
        let model = DeclarationModel::build(&asts, &config);
        let decl = model.get("CDockWidget").unwrap();
        assert_eq!(decl.bases, vec!["QFrame"]);
        assert!(decl.observed.contains("QFrame"));
        assert_eq!(decl.fields[0].name, "title");
        assert_eq!(decl.methods[0].name, "showEvent");

        let scopes = model.scopes();
        assert_eq!(
            scopes.lookup(decl.scope, "update").unwrap().qualified(),
            "self.update"
        );
        assert_eq!(
            scopes.lookup(decl.scope, "m_Title").unwrap().qualified(),
            "self.title"
        );
        assert_eq!(
            scopes
                .lookup(model.container_scope(), "ads::CDockWidget")
                .unwrap()
                .name,
            "CDockWidget"
        );
    }

    #[test]
    fn free_functions_merge_into_container() {
        let mut one = AstBuilder::new();
        let decl = one.open(NodeKind::FunctionDecl, "clampValue");
        one.tokens("int clampValue(");
        one.leaf(NodeKind::ParmDecl, "v", "int v");
        one.tokens(");");
        one.close();
        one.set_result_type(decl, TypeRef::named("int"));
        one.leaf(NodeKind::FunctionDecl, "qt_metacall", "void qt_metacall();");

        let mut two = AstBuilder::new();
        let def = two.open(NodeKind::FunctionDecl, "clampValue");
        two.tokens("int clampValue(");
        two.leaf(NodeKind::ParmDecl, "v", "int v");
        two.tokens(")");
        two.open(NodeKind::CompoundStmt, "");
        two.tokens("{ return v; }");
        two.close();
        two.close();
        two.set_result_type(def, TypeRef::named("int"));

        let asts = vec![one.finish(), two.finish()];
        let config = TranslateConfig::default();
        let model = DeclarationModel::build(&asts, &config);
        let container = model.get("__init__").unwrap();
        assert_eq!(container.kind, DeclarationKind::Container);
        assert_eq!(container.methods.len(), 1);
        let function = &container.methods[0];
        assert_eq!(function.name, "clamp_value");
        assert_eq!(function.unit, 1);
        assert_eq!(function.params.len(), 1);
        assert_ne!(function.params[0], Parameter::Receiver);
        assert_eq!(model.body(function).text.as_deref(), Some("return v"));
        assert_eq!(
            model.scopes().lookup(model.container_scope(), "clampValue").unwrap().name,
            "clamp_value"
        );
    }

    #[test]
    fn canonical_only_filters_free_functions() {
        let mut b = AstBuilder::new();
        let system = b.open(NodeKind::FunctionDecl, "qHash");
        b.tokens("uint qHash(");
        b.leaf(NodeKind::ParmDecl, "key", "int key");
        b.tokens(")");
        b.leaf(NodeKind::CompoundStmt, "", "{ return key; }");
        b.close();
        b.set_result_type(system, TypeRef::named("uint"));
        b.set_extent(system, "/usr/include/qt/qhash.h", 10, 12);

        let local = b.open(NodeKind::FunctionDecl, "dockAreaCount");
        b.tokens("int dockAreaCount()");
        b.leaf(NodeKind::CompoundStmt, "", "{ return 0; }");
        b.close();
        b.set_result_type(local, TypeRef::named("int"));
        b.set_extent(local, "/src/proj/util.cpp", 3, 5);

        let unplaced = b.open(NodeKind::FunctionDecl, "helper");
        b.tokens("void helper()");
        b.leaf(NodeKind::CompoundStmt, "", "{ }");
        b.close();
        b.set_result_type(unplaced, TypeRef::named("void"));

        let asts = vec![b.finish()];
        let config = TranslateConfig {
            canonical_sources: vec!["/src/proj".into()],
            canonical_only: true,
            ..TranslateConfig::default()
        };
        let model = DeclarationModel::build(&asts, &config);
        let names: Vec<&str> = model.get("__init__").unwrap().methods.iter().map(|m| m.native_name.as_str()).collect();
        assert_eq!(names, vec!["dockAreaCount", "helper"]);

        let everything = TranslateConfig {
            canonical_sources: vec!["/src/proj".into()],
            ..TranslateConfig::default()
        };
        let model = DeclarationModel::build(&asts, &everything);
        assert_eq!(model.get("__init__").unwrap().methods.len(), 3);
    }

    #[test]
    fn body_is_cached() {
        let asts = vec![widget_unit(&["a"], "/tmp/w.h")];
        let config = TranslateConfig::default();
        let model = DeclarationModel::build(&asts, &config);
        let method = &model.get("Widget").unwrap().methods[0];
        let first = model.body(method) as *const MethodBody;
        let second = model.body(method) as *const MethodBody;
        assert_eq!(first, second);
        assert!(model.body(method).text.is_none());
    }
}
