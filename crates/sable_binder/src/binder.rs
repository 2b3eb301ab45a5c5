//! The binder implementation.
//!
//! Binding runs in three passes over a compilation unit:
//! - collect every namespace and method declaration, declaring methods whose
//!   return type is written out
//! - infer the return types of `var` methods with a worklist that repeats
//!   until a full pass makes no progress
//! - bind the script and every method body, then lower each method and check
//!   that non-void methods return on all paths
//!
//! Every rule violation is reported once and replaced by an error node, so
//! binding always completes.

use crate::context::BindContext;
use crate::methods::MethodTable;
use crate::scope::Scope;
use rayon::prelude::*;
use rustc_hash::FxHashSet;
use sable_bound::symbols::{
    LabelSymbol, MethodFlags, MethodSymbol, NamespaceSymbol, VariableSymbol, LOCAL_METHOD_SEPARATOR,
    SCRIPT_METHOD_NAME,
};
use sable_bound::tree::*;
use sable_bound::types::TypeSymbol;
use sable_diagnostics::{messages, DiagnosticBag, DiagnosticMessage};
use sable_flow::ControlFlowGraph;
use sable_syntax::node::*;
use sable_core::text::TextSpan;

/// Options for a bind.
#[derive(Debug, Clone, Copy, Default)]
pub struct BinderOptions {
    /// Lower and flow-check methods on the rayon thread pool.
    pub parallel_lowering: bool,
}

/// Everything a bind produces.
#[derive(Debug)]
pub struct BindingResult {
    /// Lowered methods and the entry point.
    pub program: BoundProgram,
    /// The same methods as bound, before lowering.
    pub methods: Vec<BoundMethod>,
    pub diagnostics: DiagnosticBag,
}

/// Bind a parsed compilation unit.
pub fn bind(unit: &CompilationUnit<'_>, options: BinderOptions) -> BindingResult {
    Binder::new(options).bind_compilation_unit(unit.statements)
}

/// A user method found while collecting declarations.
struct MethodEntry<'a> {
    syntax: &'a MethodDeclaration<'a>,
    /// The context the method was declared in.
    context: BindContext,
    flat_name: String,
    full_name: String,
    parameters: Vec<VariableRef>,
    symbol: Option<MethodRef>,
    declared: bool,
}

pub struct Binder<'a> {
    options: BinderOptions,
    pub(crate) diagnostics: DiagnosticBag,
    pub(crate) scope: Option<Box<Scope>>,
    pub(crate) methods: MethodTable,
    entries: Vec<MethodEntry<'a>>,
    /// Full names of `var` methods whose return type is still unknown.
    pub(crate) pending: FxHashSet<String>,
    /// Full name of the method whose return type is being inferred.
    pub(crate) inferring: Option<String>,
    /// Set when an analysis bind met a call to a pending method.
    pub(crate) blocked: bool,
    namespaces: FxHashSet<String>,
    label_count: u32,
}

impl<'a> Binder<'a> {
    pub fn new(options: BinderOptions) -> Self {
        Self {
            options,
            diagnostics: DiagnosticBag::new(),
            scope: None,
            methods: MethodTable::new(),
            entries: Vec::new(),
            pending: FxHashSet::default(),
            inferring: None,
            blocked: false,
            namespaces: FxHashSet::default(),
            label_count: 0,
        }
    }

    pub fn bind_compilation_unit(mut self, statements: &'a [Statement<'a>]) -> BindingResult {
        self.collect_namespaces(statements, None);
        self.collect_declarations(statements, &BindContext::top_level());
        tracing::debug!(methods = self.entries.len(), "collected method declarations");

        self.infer_return_types();

        let script = contains_script_statements(statements).then(|| {
            MethodSymbol::new(
                None,
                SCRIPT_METHOD_NAME,
                Vec::new(),
                TypeSymbol::Object,
                MethodFlags::SCRIPT,
                None,
            )
        });
        let entry_point = self.resolve_entry_point(script.as_ref());

        let mut bound = Vec::with_capacity(self.entries.len() + 1);
        let script_method = self.bind_script(statements, script);
        bound.extend(script_method);
        for index in 0..self.entries.len() {
            if let Some(method) = self.bind_method(index) {
                bound.push(method);
            }
        }

        let lowered = self.lower_and_check(&bound);

        BindingResult {
            program: BoundProgram {
                methods: lowered,
                entry_point,
            },
            methods: bound,
            diagnostics: self.diagnostics,
        }
    }

    // ========================================================================
    // Pass 1: declarations
    // ========================================================================

    fn collect_namespaces(&mut self, statements: &'a [Statement<'a>], prefix: Option<NamespaceSymbol>) {
        let mut prefix = prefix;
        for statement in statements {
            match statement {
                Statement::NamespaceDeclaration(declaration) => {
                    let names: Vec<&str> = declaration.name.segments.iter().map(|s| s.text).collect();
                    let namespace = match &prefix {
                        Some(outer) => outer.join(&names),
                        None => NamespaceSymbol::new(&names),
                    };
                    let mut known = Some(namespace.clone());
                    while let Some(ns) = known {
                        self.namespaces.insert(ns.full_name());
                        known = ns.parent();
                    }
                    match declaration.body {
                        Some(body) => self.collect_namespaces(body, Some(namespace)),
                        None => prefix = Some(namespace),
                    }
                }
                Statement::WithDeclaration(WithDeclaration { body: Some(body), .. }) => {
                    self.collect_namespaces(*body, prefix.clone())
                }
                _ => {}
            }
        }
    }

    fn collect_declarations(&mut self, statements: &'a [Statement<'a>], context: &BindContext) {
        let mut context = context.clone();
        for statement in statements {
            match statement {
                Statement::MethodDeclaration(declaration) => {
                    let flat_name = context.local_method_name(declaration.name.text);
                    let inner = context.enter_method(&flat_name, None);
                    self.add_entry(declaration, &context, flat_name);
                    self.collect_declarations(declaration.body.statements, &inner);
                }
                Statement::NamespaceDeclaration(declaration) => {
                    if context.is_in_method() {
                        continue;
                    }
                    let names: Vec<&str> = declaration.name.segments.iter().map(|s| s.text).collect();
                    let inner = context.enter_namespace(&names);
                    match declaration.body {
                        Some(body) => self.collect_declarations(body, &inner),
                        None => context = inner,
                    }
                }
                Statement::WithDeclaration(declaration) => {
                    let inner = self.apply_with(&context, declaration);
                    match declaration.body {
                        Some(body) => self.collect_declarations(body, &inner),
                        None => context = inner,
                    }
                }
                Statement::Block(block) => self.collect_declarations(block.statements, &context),
                Statement::If(statement) => {
                    self.collect_nested(statement.then_statement, &context);
                    if let Some(else_statement) = statement.else_statement {
                        self.collect_nested(else_statement, &context);
                    }
                }
                Statement::While(statement) => self.collect_nested(statement.body, &context),
                Statement::For(statement) => self.collect_nested(statement.body, &context),
                _ => {}
            }
        }
    }

    fn collect_nested(&mut self, statement: &'a Statement<'a>, context: &BindContext) {
        self.collect_declarations(std::slice::from_ref(statement), context);
    }

    fn add_entry(&mut self, syntax: &'a MethodDeclaration<'a>, context: &BindContext, flat_name: String) {
        let mut names = FxHashSet::default();
        let mut parameters = Vec::with_capacity(syntax.parameters.len());
        for parameter in syntax.parameters {
            if !names.insert(parameter.name.text) {
                self.report(parameter.name.span(), &messages::PARAMETER_0_IS_ALREADY_DECLARED, &[parameter.name.text]);
            }
            let ty = TypeSymbol::from_keyword(parameter.ty.keyword, parameter.ty.rank);
            parameters.push(VariableSymbol::parameter(parameter.name.text, ty));
        }

        let full_name = context.qualify(&flat_name);
        self.entries.push(MethodEntry {
            syntax,
            context: context.clone(),
            flat_name,
            full_name,
            parameters,
            symbol: None,
            declared: false,
        });

        if let Some(return_type) = syntax.return_type {
            let index = self.entries.len() - 1;
            self.declare_entry(index, TypeSymbol::from_keyword(return_type.keyword, return_type.rank));
        }
    }

    fn declare_entry(&mut self, index: usize, return_type: TypeSymbol) {
        let entry = &mut self.entries[index];
        entry.declared = true;

        let mut flags = MethodFlags::NONE;
        if entry.context.is_in_method() {
            flags |= MethodFlags::LOCAL;
        }
        if entry.syntax.return_type.is_none() {
            flags |= MethodFlags::IMPLICIT_RETURN;
        }
        let symbol = MethodSymbol::new(
            entry.context.namespace.clone(),
            &entry.flat_name,
            entry.parameters.clone(),
            return_type,
            flags,
            Some(entry.syntax.name.span()),
        );
        if self.methods.declare(symbol.clone()) {
            entry.symbol = Some(symbol);
        } else {
            let name = entry.syntax.name;
            self.report(name.span(), &messages::METHOD_0_IS_ALREADY_DECLARED, &[name.text]);
        }
    }

    // ========================================================================
    // Pass 2: return type inference
    // ========================================================================

    fn infer_return_types(&mut self) {
        let mut worklist: Vec<usize> = (0..self.entries.len()).filter(|&i| !self.entries[i].declared).collect();

        while !worklist.is_empty() {
            let mut remaining = Vec::with_capacity(worklist.len());
            let mut progressed = false;
            for &index in &worklist {
                match self.infer_return_type(index) {
                    Some(return_type) => {
                        tracing::debug!(
                            method = %self.entries[index].full_name,
                            return_type = %return_type,
                            "inferred return type"
                        );
                        self.declare_entry(index, return_type);
                        progressed = true;
                    }
                    None => remaining.push(index),
                }
            }
            worklist = remaining;
            if !progressed {
                break;
            }
        }

        self.pending.clear();
        self.inferring = None;
        tracing::debug!(unresolved = worklist.len(), "return type inference reached a fixpoint");

        for index in worklist {
            let name = self.entries[index].syntax.name;
            self.report(name.span(), &messages::RETURN_TYPE_OF_0_CANNOT_BE_INFERRED, &[name.text]);
            self.declare_entry(index, TypeSymbol::Error);
        }
    }

    /// Speculatively bind a `var` method and read its type off the returns that
    /// survive lowering. `None` means a call to another pending method got in the way.
    fn infer_return_type(&mut self, index: usize) -> Option<TypeSymbol> {
        let entry = &self.entries[index];
        let syntax = entry.syntax;
        let context = entry.context.enter_method(&entry.flat_name, None).analysis();
        let parameters = entry.parameters.clone();

        self.inferring = Some(entry.full_name.clone());
        self.pending = self
            .entries
            .iter()
            .enumerate()
            .filter(|(i, e)| *i != index && !e.declared)
            .map(|(_, e)| e.full_name.clone())
            .collect();
        self.blocked = false;

        let saved_diagnostics = std::mem::take(&mut self.diagnostics);
        let saved_labels = self.label_count;
        let body = self.bind_body(syntax, &parameters, &context);
        self.diagnostics = saved_diagnostics;
        self.label_count = saved_labels;

        if self.blocked {
            return None;
        }

        let lowered = sable_lowering::lower(body);
        let graph = ControlFlowGraph::create(&lowered);
        let returns: Vec<Option<TypeSymbol>> = graph
            .blocks
            .iter()
            .filter_map(|block| match block.last_statement() {
                Some(BoundStatement::Return { expression }) => Some(expression.as_ref().map(BoundExpression::ty)),
                _ => None,
            })
            .collect();
        Some(infer_from_returns(&returns))
    }

    // ========================================================================
    // Entry point
    // ========================================================================

    fn resolve_entry_point(&mut self, script: Option<&MethodRef>) -> Option<MethodRef> {
        let main = self
            .methods
            .lookup("Main")
            .and_then(|overloads| overloads.iter().find(|m| !m.is_placeholder()).cloned());

        match (script, main) {
            (Some(script), Some(main)) => {
                self.report(main.span.unwrap_or_default(), &messages::MAIN_AND_TOP_LEVEL_STATEMENTS, &[]);
                Some(script.clone())
            }
            (Some(script), None) => Some(script.clone()),
            (None, Some(main)) => {
                if !main.return_type.is_void() || !main.parameters.is_empty() {
                    self.report(main.span.unwrap_or_default(), &messages::MAIN_MUST_HAVE_CORRECT_SIGNATURE, &[]);
                }
                Some(main)
            }
            (None, None) => None,
        }
    }

    // ========================================================================
    // Pass 3: bodies
    // ========================================================================

    /// Bind the top-level statements. Declarations there are still checked even
    /// when there is no script to hold statements.
    fn bind_script(&mut self, statements: &'a [Statement<'a>], script: Option<MethodRef>) -> Option<BoundMethod> {
        let mut context = BindContext::top_level().enter_method(SCRIPT_METHOD_NAME, script.clone());
        context.flags |= crate::context::ContextFlags::TOP_LEVEL;

        let saved = self.scope.replace(Box::new(Scope::method_body()));
        let bound = self.bind_top_level(statements, &context);
        self.scope = saved;

        script.map(|symbol| BoundMethod {
            symbol,
            body: BoundStatement::Block { statements: bound },
        })
    }

    fn bind_top_level(&mut self, statements: &'a [Statement<'a>], context: &BindContext) -> Vec<BoundStatement> {
        if !context.is_in_namespace_body() {
            self.declare_labels(statements);
        }
        let mut context = context.clone();
        let mut bound = Vec::new();
        for statement in statements {
            match statement {
                Statement::MethodDeclaration(_) | Statement::Empty(_) => {}
                Statement::NamespaceDeclaration(declaration) => {
                    let names: Vec<&str> = declaration.name.segments.iter().map(|s| s.text).collect();
                    match declaration.body {
                        Some(body) => {
                            let inner = context.enter_namespace(&names);
                            bound.extend(self.bind_top_level(body, &inner));
                        }
                        None if !context.is_top_level() || context.is_in_namespace_body() => {
                            self.report(statement.span(), &messages::SIMPLE_NAMESPACE_MUST_BE_TOP_LEVEL, &[]);
                        }
                        None => context = context.enter_namespace(&names),
                    }
                }
                Statement::WithDeclaration(declaration) => {
                    let inner = self.bind_with(&context, declaration);
                    match declaration.body {
                        Some(body) => {
                            let mut inner = inner;
                            inner.flags -= crate::context::ContextFlags::TOP_LEVEL;
                            self.push_scope();
                            let statements = self.bind_top_level(body, &inner);
                            self.pop_scope();
                            bound.push(BoundStatement::Block { statements });
                        }
                        None => context = inner,
                    }
                }
                _ if context.is_in_namespace_body() => {
                    self.report(statement.span(), &messages::ONLY_DECLARATIONS_ALLOWED_IN_NAMESPACE, &[]);
                }
                _ => bound.push(self.bind_statement(statement, &context)),
            }
        }
        bound
    }

    fn bind_method(&mut self, index: usize) -> Option<BoundMethod> {
        let entry = &self.entries[index];
        let symbol = entry.symbol.clone()?;
        let syntax = entry.syntax;
        let context = entry.context.enter_method(&entry.flat_name, Some(symbol.clone()));
        let parameters = entry.parameters.clone();
        let body = self.bind_body(syntax, &parameters, &context);
        Some(BoundMethod { symbol, body })
    }

    fn bind_body(
        &mut self,
        syntax: &'a MethodDeclaration<'a>,
        parameters: &[VariableRef],
        context: &BindContext,
    ) -> BoundStatement {
        let mut scope = Scope::method_body();
        for parameter in parameters {
            // Duplicates were reported when the method was declared.
            scope.declare_variable(parameter.clone());
        }
        let saved = self.scope.replace(Box::new(scope));
        let body = self.bind_block(syntax.body.statements, context);
        self.scope = saved;
        body
    }

    fn lower_and_check(&mut self, methods: &[BoundMethod]) -> Vec<BoundMethod> {
        fn lower_one(method: &BoundMethod) -> (BoundMethod, bool) {
            let lowered = sable_lowering::lower_method(method.clone());
            let symbol = &lowered.symbol;
            let exempt = symbol.is_script() || symbol.return_type.is_void() || symbol.return_type.is_error();
            let returns = exempt || sable_flow::all_paths_return(&lowered.body);
            (lowered, returns)
        }

        let results: Vec<(BoundMethod, bool)> = if self.options.parallel_lowering {
            methods.par_iter().map(lower_one).collect()
        } else {
            methods.iter().map(lower_one).collect()
        };

        results
            .into_iter()
            .map(|(method, returns)| {
                if !returns {
                    let span = method.symbol.span.unwrap_or_default();
                    self.report(span, &messages::NOT_ALL_CODE_PATHS_RETURN_A_VALUE, &[]);
                }
                method
            })
            .collect()
    }

    // ========================================================================
    // Scopes and labels
    // ========================================================================

    pub(crate) fn push_scope(&mut self) {
        let parent = self.scope.take();
        self.scope = Some(Box::new(Scope::new(parent)));
    }

    fn push_loop_scope(&mut self, break_label: LabelRef, continue_label: LabelRef) {
        let parent = self.scope.take();
        self.scope = Some(Box::new(Scope::with_loop(parent, break_label, continue_label)));
    }

    pub(crate) fn pop_scope(&mut self) {
        if let Some(scope) = self.scope.take() {
            self.scope = scope.parent;
        }
    }

    pub(crate) fn current_scope(&mut self) -> &mut Scope {
        self.scope.get_or_insert_with(|| Box::new(Scope::method_body()))
    }

    pub(crate) fn lookup_variable(&self, name: &str) -> Option<VariableRef> {
        self.scope.as_ref().and_then(|scope| scope.lookup_variable(name))
    }

    fn declare_labels(&mut self, statements: &[Statement<'_>]) {
        for statement in statements {
            if let Statement::Label(label) = statement {
                let symbol = LabelSymbol::new(label.label.text);
                if !self.current_scope().declare_label(symbol) {
                    self.report(label.label.span(), &messages::LABEL_0_IS_ALREADY_DECLARED, &[label.label.text]);
                }
            }
        }
    }

    fn generate_loop_labels(&mut self) -> (LabelRef, LabelRef) {
        self.label_count += 1;
        (
            LabelSymbol::new(&format!("break{}", self.label_count)),
            LabelSymbol::new(&format!("continue{}", self.label_count)),
        )
    }

    pub(crate) fn report(&mut self, span: TextSpan, message: &DiagnosticMessage, args: &[&str]) {
        self.diagnostics.report(span, message, args);
    }

    // ========================================================================
    // Namespaces
    // ========================================================================

    /// The namespace a `with` refers to: absolute when known, otherwise
    /// relative to the current namespace when that is known.
    fn resolve_namespace(&self, context: &BindContext, name: &QualifiedName<'_>) -> NamespaceSymbol {
        let names: Vec<&str> = name.segments.iter().map(|s| s.text).collect();
        let absolute = NamespaceSymbol::new(&names);
        if self.namespaces.contains(&absolute.full_name()) {
            return absolute;
        }
        if let Some(current) = &context.namespace {
            let relative = current.join(&names);
            if self.namespaces.contains(&relative.full_name()) {
                return relative;
            }
        }
        absolute
    }

    fn apply_with(&self, context: &BindContext, declaration: &WithDeclaration<'_>) -> BindContext {
        let target = self.resolve_namespace(context, &declaration.name);
        match declaration.alias {
            Some(alias) => context.with_alias(alias.text, target),
            None => context.with_include(target),
        }
    }

    fn bind_with(&mut self, context: &BindContext, declaration: &WithDeclaration<'_>) -> BindContext {
        let target = self.resolve_namespace(context, &declaration.name);
        if !self.namespaces.contains(&target.full_name()) {
            let text = declaration.name.text();
            self.report(declaration.name.data.span, &messages::UNDEFINED_NAMESPACE_0, &[&text]);
        }
        self.apply_with(context, declaration)
    }

    // ========================================================================
    // Statements
    // ========================================================================

    fn bind_block(&mut self, statements: &'a [Statement<'a>], context: &BindContext) -> BoundStatement {
        self.push_scope();
        self.declare_labels(statements);
        let mut context = context.clone();
        let mut bound = Vec::with_capacity(statements.len());
        for statement in statements {
            match statement {
                Statement::WithDeclaration(declaration) if declaration.body.is_none() => {
                    context = self.bind_with(&context, declaration);
                }
                _ => bound.push(self.bind_statement(statement, &context)),
            }
        }
        self.pop_scope();
        BoundStatement::Block { statements: bound }
    }

    /// Bind the body of an `if` or loop. A lone statement gets its own scope.
    fn bind_nested(&mut self, statement: &'a Statement<'a>, context: &BindContext) -> BoundStatement {
        if let Statement::Block(block) = statement {
            return self.bind_block(block.statements, context);
        }
        self.push_scope();
        self.declare_labels(std::slice::from_ref(statement));
        let bound = self.bind_statement(statement, context);
        self.pop_scope();
        bound
    }

    fn bind_loop_body(
        &mut self,
        body: &'a Statement<'a>,
        context: &BindContext,
        break_label: &LabelRef,
        continue_label: &LabelRef,
    ) -> BoundStatement {
        self.push_loop_scope(break_label.clone(), continue_label.clone());
        let bound = self.bind_nested(body, context);
        self.pop_scope();
        bound
    }

    pub(crate) fn bind_statement(&mut self, statement: &'a Statement<'a>, context: &BindContext) -> BoundStatement {
        match statement {
            Statement::Block(block) => self.bind_block(block.statements, context),
            Statement::VariableDeclaration(declaration) => self.bind_variable_declaration(declaration, context),
            Statement::MethodDeclaration(declaration) => self
                .entries
                .iter()
                .find(|entry| std::ptr::eq(entry.syntax, declaration))
                .and_then(|entry| entry.symbol.clone())
                .map_or(BoundStatement::NoOp, |method| BoundStatement::MethodDeclaration { method }),
            Statement::NamespaceDeclaration(_) => {
                self.report(statement.span(), &messages::NAMESPACE_INSIDE_METHOD, &[]);
                BoundStatement::NoOp
            }
            Statement::WithDeclaration(declaration) => {
                let inner = self.bind_with(context, declaration);
                match declaration.body {
                    Some(body) => self.bind_block(body, &inner),
                    None => BoundStatement::NoOp,
                }
            }
            Statement::If(statement) => {
                let condition = self.bind_condition(statement.condition, context);
                let then_statement = self.bind_nested(statement.then_statement, context);
                let else_statement = statement
                    .else_statement
                    .map(|s| Box::new(self.bind_nested(s, context)));
                BoundStatement::If {
                    condition,
                    then_statement: Box::new(then_statement),
                    else_statement,
                }
            }
            Statement::While(statement) => {
                let (break_label, continue_label) = self.generate_loop_labels();
                let condition = self.bind_condition(statement.condition, context);
                let body = self.bind_loop_body(statement.body, context, &break_label, &continue_label);
                BoundStatement::While {
                    condition,
                    body: Box::new(body),
                    break_label,
                    continue_label,
                }
            }
            Statement::For(statement) => {
                let (break_label, continue_label) = self.generate_loop_labels();
                self.push_scope();
                let initializer = statement
                    .initializer
                    .map(|s| Box::new(self.bind_statement(s, context)));
                let condition = statement.condition.map(|c| self.bind_condition(c, context));
                let incrementor = statement.incrementor.map(|i| self.bind_expression(i, context));
                let body = self.bind_loop_body(statement.body, context, &break_label, &continue_label);
                self.pop_scope();
                BoundStatement::For {
                    initializer,
                    condition,
                    incrementor,
                    body: Box::new(body),
                    break_label,
                    continue_label,
                }
            }
            Statement::Break(data) => match self.scope.as_ref().and_then(|s| s.try_get_break_label()) {
                Some(label) => BoundStatement::Goto { label },
                None => {
                    self.report(data.span, &messages::BREAK_OUTSIDE_LOOP, &[]);
                    BoundStatement::NoOp
                }
            },
            Statement::Continue(data) => match self.scope.as_ref().and_then(|s| s.try_get_continue_label()) {
                Some(label) => BoundStatement::Goto { label },
                None => {
                    self.report(data.span, &messages::CONTINUE_OUTSIDE_LOOP, &[]);
                    BoundStatement::NoOp
                }
            },
            Statement::Return(statement) => self.bind_return(statement, context),
            Statement::Goto(statement) => {
                let name = statement.label;
                match self.scope.as_ref().and_then(|s| s.lookup_label(name.text)) {
                    Some(label) => BoundStatement::Goto { label },
                    None => {
                        self.report(name.span(), &messages::UNDEFINED_LABEL_0, &[name.text]);
                        BoundStatement::NoOp
                    }
                }
            }
            Statement::Label(statement) => match self.scope.as_ref().and_then(|s| s.lookup_label(statement.label.text)) {
                Some(label) => BoundStatement::Label { label },
                None => BoundStatement::NoOp,
            },
            Statement::Expression(statement) => BoundStatement::Expression {
                expression: self.bind_expression(statement.expression, context),
            },
            Statement::Empty(_) => BoundStatement::NoOp,
        }
    }

    fn bind_variable_declaration(
        &mut self,
        declaration: &'a VariableDeclaration<'a>,
        context: &BindContext,
    ) -> BoundStatement {
        let name = declaration.name;
        let initializer = self.bind_expression(declaration.initializer, context);

        let (variable, initializer) = match declaration.keyword {
            DeclarationKeyword::Typed(ty) => {
                let ty = TypeSymbol::from_keyword(ty.keyword, ty.rank);
                let initializer = self.bind_conversion(initializer, &ty);
                (VariableSymbol::local(name.text, false, ty), initializer)
            }
            DeclarationKeyword::Var | DeclarationKeyword::Set => {
                let read_only = matches!(declaration.keyword, DeclarationKeyword::Set);
                let ty = initializer.ty();
                if ty.is_void() {
                    let span = declaration.initializer.span();
                    self.report(span, &messages::CANNOT_ASSIGN_VOID_TO_AN_IMPLICITLY_TYPED_VARIABLE, &[]);
                    (
                        VariableSymbol::local(name.text, read_only, TypeSymbol::Error),
                        BoundExpression::error(span),
                    )
                } else {
                    match crate::expressions::constant_of(&initializer) {
                        Some(value) if read_only && ty.is_primitive() && value.ty() == ty => {
                            let span = initializer.span();
                            (
                                VariableSymbol::constant(name.text, value.clone()),
                                BoundExpression::literal(span, value),
                            )
                        }
                        _ => (VariableSymbol::local(name.text, read_only, ty), initializer),
                    }
                }
            }
        };

        if !self.current_scope().declare_variable(variable.clone()) {
            self.report(name.span(), &messages::VARIABLE_0_IS_ALREADY_DECLARED, &[name.text]);
        }
        BoundStatement::VariableDeclaration { variable, initializer }
    }

    fn bind_return(&mut self, statement: &'a ReturnStatement<'a>, context: &BindContext) -> BoundStatement {
        let expression = statement.expression.map(|e| self.bind_expression(e, context));
        if context.is_analysis() {
            return BoundStatement::Return { expression };
        }
        let Some(method) = context.method.clone() else {
            return BoundStatement::Return { expression };
        };

        if method.is_script() {
            let expression = expression.map(|e| self.bind_conversion(e, &TypeSymbol::Object));
            return BoundStatement::Return { expression };
        }
        if method.return_type.is_void() {
            if let Some(expression) = expression {
                let name = display_name(&method.name);
                self.report(expression.span(), &messages::VOID_METHOD_0_CANNOT_RETURN_A_VALUE, &[name]);
            }
            return BoundStatement::Return { expression: None };
        }
        if method.return_type.is_error() {
            return BoundStatement::Return { expression };
        }
        match expression {
            Some(expression) => BoundStatement::Return {
                expression: Some(self.bind_conversion(expression, &method.return_type)),
            },
            None => {
                let ty = method.return_type.to_string();
                self.report(statement.data.span, &messages::AN_EXPRESSION_OF_TYPE_0_IS_EXPECTED, &[&ty]);
                BoundStatement::Return { expression: None }
            }
        }
    }
}

/// The source-level name of a possibly nested local method.
pub(crate) fn display_name(flat_name: &str) -> &str {
    flat_name
        .rsplit(LOCAL_METHOD_SEPARATOR)
        .next()
        .unwrap_or(flat_name)
}

/// No returns or only empty ones give `void`; otherwise the first non-error type wins.
fn infer_from_returns(returns: &[Option<TypeSymbol>]) -> TypeSymbol {
    let mut values = returns.iter().flatten().peekable();
    if values.peek().is_none() {
        return TypeSymbol::Void;
    }
    values
        .find(|ty| !ty.is_error())
        .cloned()
        .unwrap_or(TypeSymbol::Error)
}

/// Whether the unit has statements that belong to the synthetic script method.
fn contains_script_statements(statements: &[Statement<'_>]) -> bool {
    for statement in statements {
        match statement {
            Statement::MethodDeclaration(_) | Statement::Empty(_) => {}
            // Everything after a simple namespace belongs to the namespace.
            Statement::NamespaceDeclaration(declaration) if declaration.body.is_none() => return false,
            Statement::NamespaceDeclaration(_) => {}
            Statement::WithDeclaration(declaration) => {
                if declaration.body.is_some_and(contains_script_statements) {
                    return true;
                }
            }
            _ => return true,
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_strips_enclosing_methods() {
        assert_eq!(display_name("Outer$Inner"), "Inner");
        assert_eq!(display_name("Main"), "Main");
    }

    #[test]
    fn test_infer_from_returns() {
        assert_eq!(infer_from_returns(&[]), TypeSymbol::Void);
        assert_eq!(infer_from_returns(&[None, None]), TypeSymbol::Void);
        assert_eq!(
            infer_from_returns(&[Some(TypeSymbol::Error), Some(TypeSymbol::Int), Some(TypeSymbol::String)]),
            TypeSymbol::Int
        );
        assert_eq!(infer_from_returns(&[Some(TypeSymbol::Error)]), TypeSymbol::Error);
    }
}
