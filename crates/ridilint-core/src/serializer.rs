//! Clause serializer: AST -> ordered entity list
//!
//! A single pre-order walk over the mago AST with exhaustive dispatch on
//! node kind. Only five statement kinds are emission-relevant (namespace,
//! use, class, function, variable reference); everything else is a
//! transparent pass-through whose children are still visited.
//!
//! The lexical context of class-family declarations is accumulated on an
//! explicit stack of string frames. Frames are pushed through scoped
//! helpers so every push is structurally paired with its pop. The current
//! namespace is deliberately NOT a stack frame: it is set by namespace
//! statements and persists across subsequent siblings until overwritten.

use std::collections::HashSet;

use mago_span::{HasSpan, Span};
use mago_syntax::ast::*;

use crate::entity::{Entity, EntityKind};

/// Serialize a parsed program into its flattened entity sequence.
///
/// Parse failures must be handled by the caller before this point; the
/// serializer never produces partial results for broken input.
pub fn serialize(program: &Program<'_>, source: &str) -> Vec<Entity> {
    let mut serializer = ClauseSerializer::new(source);
    for stmt in program.statements.iter() {
        serializer.walk_statement(stmt);
    }
    serializer.entities
}

struct ClauseSerializer<'s> {
    source: &'s str,
    entities: Vec<Entity>,
    /// Context frames for class-family clauses, joined by single spaces.
    stack: Vec<String>,
    /// Current namespace name; empty until a namespace statement is seen.
    namespace: String,
    /// Flat `function name ( ) [:Ret] {` prefix for variable clauses.
    function_prefix: String,
    /// Variable names already emitted in the current function scope.
    variables_seen: HashSet<String>,
}

impl<'s> ClauseSerializer<'s> {
    fn new(source: &'s str) -> Self {
        Self {
            source,
            entities: Vec::new(),
            stack: Vec::new(),
            namespace: String::new(),
            function_prefix: String::new(),
            variables_seen: HashSet::new(),
        }
    }

    fn text(&self, span: Span) -> &'s str {
        &self.source[span.start.offset as usize..span.end.offset as usize]
    }

    fn line_of(&self, offset: usize) -> usize {
        let mut line = 1;
        for (i, ch) in self.source.char_indices() {
            if i >= offset {
                break;
            }
            if ch == '\n' {
                line += 1;
            }
        }
        line
    }

    /// Push a context frame for the duration of `body`.
    fn scoped<R>(&mut self, frame: String, body: impl FnOnce(&mut Self) -> R) -> R {
        self.stack.push(frame);
        let result = body(self);
        self.stack.pop();
        result
    }

    /// Emit one entity: the joined context stack plus the node's own
    /// fragment, whitespace-trimmed.
    fn insert(&mut self, offset: usize, fragment: &str, kind: EntityKind) {
        let line = self.line_of(offset);
        let stacked = self.stack.join(" ");
        let clause = format!("{} {}", stacked, fragment).trim().to_string();
        self.entities.push(Entity::new(line, offset, clause, kind));
    }

    fn walk_statement(&mut self, stmt: &Statement<'_>) {
        match stmt {
            Statement::Namespace(ns) => {
                self.namespace = ns
                    .name
                    .as_ref()
                    .map(|name| self.text(name.span()).to_string())
                    .unwrap_or_default();
                let statements = match &ns.body {
                    NamespaceBody::Implicit(body) => &body.statements,
                    NamespaceBody::BraceDelimited(body) => &body.statements,
                };
                for inner in statements.iter() {
                    self.walk_statement(inner);
                }
            }
            Statement::Use(use_stmt) => {
                self.serialize_use(use_stmt);
            }
            Statement::Class(class) => {
                self.serialize_class(class);
            }
            Statement::Function(func) => {
                let name = self.text(func.name.span);
                self.enter_function_scope(name, &func.return_type_hint);
                for inner in func.body.statements.iter() {
                    self.walk_statement(inner);
                }
            }
            Statement::Interface(interface) => {
                self.walk_member_bodies(&interface.members);
            }
            Statement::Trait(trait_def) => {
                self.walk_member_bodies(&trait_def.members);
            }
            Statement::Enum(enum_def) => {
                self.walk_member_bodies(&enum_def.members);
            }
            Statement::Expression(expr_stmt) => {
                self.walk_expression(&expr_stmt.expression);
            }
            Statement::Block(block) => {
                for inner in block.statements.iter() {
                    self.walk_statement(inner);
                }
            }
            Statement::If(if_stmt) => {
                self.walk_expression(&if_stmt.condition);
                self.walk_if_body(&if_stmt.body);
            }
            Statement::Foreach(foreach) => {
                self.walk_expression(&foreach.expression);
                match &foreach.target {
                    ForeachTarget::Value(value) => {
                        self.walk_expression(&value.value);
                    }
                    ForeachTarget::KeyValue(kv) => {
                        self.walk_expression(&kv.key);
                        self.walk_expression(&kv.value);
                    }
                }
                self.walk_foreach_body(&foreach.body);
            }
            Statement::For(for_stmt) => {
                for expr in for_stmt.initializations.iter() {
                    self.walk_expression(expr);
                }
                for expr in for_stmt.conditions.iter() {
                    self.walk_expression(expr);
                }
                for expr in for_stmt.increments.iter() {
                    self.walk_expression(expr);
                }
                self.walk_for_body(&for_stmt.body);
            }
            Statement::While(while_stmt) => {
                self.walk_expression(&while_stmt.condition);
                self.walk_while_body(&while_stmt.body);
            }
            Statement::DoWhile(do_while) => {
                self.walk_statement(&do_while.statement);
                self.walk_expression(&do_while.condition);
            }
            Statement::Try(try_stmt) => {
                for inner in try_stmt.block.statements.iter() {
                    self.walk_statement(inner);
                }
                for catch in try_stmt.catch_clauses.iter() {
                    for inner in catch.block.statements.iter() {
                        self.walk_statement(inner);
                    }
                }
                if let Some(finally) = &try_stmt.finally_clause {
                    for inner in finally.block.statements.iter() {
                        self.walk_statement(inner);
                    }
                }
            }
            Statement::Switch(switch) => {
                self.walk_expression(&switch.expression);
                self.walk_switch_body(&switch.body);
            }
            Statement::Return(ret) => {
                if let Some(expr) = &ret.value {
                    self.walk_expression(expr);
                }
            }
            Statement::Echo(echo) => {
                for expr in echo.values.iter() {
                    self.walk_expression(expr);
                }
            }
            Statement::Global(global) => {
                for variable in global.variables.iter() {
                    if let Variable::Direct(var) = variable {
                        self.serialize_variable(var.span);
                    }
                }
            }
            Statement::Static(static_stmt) => {
                for item in static_stmt.items.iter() {
                    self.serialize_variable(item.variable().span);
                    if let Some(value) = item.value() {
                        self.walk_expression(value);
                    }
                }
            }
            Statement::Unset(unset) => {
                for value in unset.values.iter() {
                    self.walk_expression(value);
                }
            }
            _ => {}
        }
    }

    fn walk_if_body(&mut self, body: &IfBody<'_>) {
        match body {
            IfBody::Statement(stmt_body) => {
                self.walk_statement(stmt_body.statement);
                for else_if in stmt_body.else_if_clauses.iter() {
                    self.walk_expression(&else_if.condition);
                    self.walk_statement(else_if.statement);
                }
                if let Some(else_clause) = &stmt_body.else_clause {
                    self.walk_statement(else_clause.statement);
                }
            }
            IfBody::ColonDelimited(block) => {
                for inner in block.statements.iter() {
                    self.walk_statement(inner);
                }
                for else_if in block.else_if_clauses.iter() {
                    self.walk_expression(&else_if.condition);
                    for inner in else_if.statements.iter() {
                        self.walk_statement(inner);
                    }
                }
                if let Some(else_clause) = &block.else_clause {
                    for inner in else_clause.statements.iter() {
                        self.walk_statement(inner);
                    }
                }
            }
        }
    }

    fn walk_foreach_body(&mut self, body: &ForeachBody<'_>) {
        match body {
            ForeachBody::Statement(stmt) => {
                self.walk_statement(stmt);
            }
            ForeachBody::ColonDelimited(block) => {
                for inner in block.statements.iter() {
                    self.walk_statement(inner);
                }
            }
        }
    }

    fn walk_for_body(&mut self, body: &ForBody<'_>) {
        match body {
            ForBody::Statement(stmt) => {
                self.walk_statement(stmt);
            }
            ForBody::ColonDelimited(block) => {
                for inner in block.statements.iter() {
                    self.walk_statement(inner);
                }
            }
        }
    }

    fn walk_while_body(&mut self, body: &WhileBody<'_>) {
        match body {
            WhileBody::Statement(stmt) => {
                self.walk_statement(stmt);
            }
            WhileBody::ColonDelimited(block) => {
                for inner in block.statements.iter() {
                    self.walk_statement(inner);
                }
            }
        }
    }

    fn walk_switch_body(&mut self, body: &SwitchBody<'_>) {
        match body {
            SwitchBody::BraceDelimited(block) => {
                for case in block.cases.iter() {
                    for stmt in case.statements().iter() {
                        self.walk_statement(stmt);
                    }
                }
            }
            SwitchBody::ColonDelimited(block) => {
                for case in block.cases.iter() {
                    for stmt in case.statements().iter() {
                        self.walk_statement(stmt);
                    }
                }
            }
        }
    }

    fn walk_expression(&mut self, expr: &Expression<'_>) {
        match expr {
            Expression::Variable(Variable::Direct(var)) => {
                self.serialize_variable(var.span);
            }
            Expression::Assignment(assign) => {
                self.walk_expression(&assign.lhs);
                self.walk_expression(&assign.rhs);
            }
            Expression::Binary(binary) => {
                self.walk_expression(&binary.lhs);
                self.walk_expression(&binary.rhs);
            }
            Expression::UnaryPrefix(unary) => {
                self.walk_expression(&unary.operand);
            }
            Expression::UnaryPostfix(unary) => {
                self.walk_expression(&unary.operand);
            }
            Expression::Parenthesized(paren) => {
                self.walk_expression(&paren.expression);
            }
            Expression::Conditional(ternary) => {
                self.walk_expression(&ternary.condition);
                if let Some(then) = &ternary.then {
                    self.walk_expression(then);
                }
                self.walk_expression(&ternary.r#else);
            }
            Expression::ArrayAccess(access) => {
                self.walk_expression(&access.array);
                self.walk_expression(&access.index);
            }
            Expression::Array(array) => {
                self.walk_array_elements(&array.elements);
            }
            Expression::LegacyArray(array) => {
                self.walk_array_elements(&array.elements);
            }
            Expression::List(list) => {
                self.walk_array_elements(&list.elements);
            }
            Expression::ArrayAppend(append) => {
                self.walk_expression(&append.array);
            }
            Expression::Call(call) => match call {
                Call::Function(func_call) => {
                    self.walk_expression(&func_call.function);
                    self.walk_arguments(&func_call.argument_list);
                }
                Call::Method(method_call) => {
                    self.walk_expression(&method_call.object);
                    self.walk_arguments(&method_call.argument_list);
                }
                Call::NullSafeMethod(ns_call) => {
                    self.walk_expression(&ns_call.object);
                    self.walk_arguments(&ns_call.argument_list);
                }
                Call::StaticMethod(static_call) => {
                    self.walk_expression(&static_call.class);
                    self.walk_arguments(&static_call.argument_list);
                }
            },
            Expression::Instantiation(inst) => {
                self.walk_expression(&inst.class);
                if let Some(argument_list) = &inst.argument_list {
                    self.walk_arguments(argument_list);
                }
            }
            Expression::Clone(clone) => {
                self.walk_expression(&clone.object);
            }
            Expression::Throw(throw) => {
                self.walk_expression(&throw.exception);
            }
            Expression::Access(access) => match access {
                Access::Property(prop_access) => {
                    self.walk_expression(&prop_access.object);
                }
                Access::NullSafeProperty(ns_access) => {
                    self.walk_expression(&ns_access.object);
                }
                Access::StaticProperty(sp_access) => {
                    self.walk_expression(&sp_access.class);
                }
                Access::ClassConstant(cc_access) => {
                    self.walk_expression(&cc_access.class);
                }
            },
            Expression::Match(match_expr) => {
                self.walk_expression(&match_expr.expression);
                for arm in match_expr.arms.iter() {
                    match arm {
                        MatchArm::Expression(arm) => {
                            for condition in arm.conditions.iter() {
                                self.walk_expression(condition);
                            }
                            self.walk_expression(&arm.expression);
                        }
                        MatchArm::Default(arm) => {
                            self.walk_expression(&arm.expression);
                        }
                    }
                }
            }
            Expression::Yield(yield_expr) => match yield_expr {
                Yield::Value(value) => {
                    if let Some(expr) = &value.value {
                        self.walk_expression(expr);
                    }
                }
                Yield::Pair(pair) => {
                    self.walk_expression(&pair.key);
                    self.walk_expression(&pair.value);
                }
                Yield::From(from) => {
                    self.walk_expression(&from.iterator);
                }
            },
            // Interpolated strings, heredocs and shell-execute strings all
            // carry embedded expressions.
            Expression::CompositeString(string) => {
                for part in string.parts().iter() {
                    match part {
                        StringPart::Expression(expr) => self.walk_expression(expr),
                        StringPart::BracedExpression(braced) => {
                            self.walk_expression(&braced.expression)
                        }
                        StringPart::Literal(_) => {}
                    }
                }
            }
            Expression::Construct(construct) => match construct {
                Construct::Isset(isset) => {
                    for value in isset.values.iter() {
                        self.walk_expression(value);
                    }
                }
                Construct::Empty(empty) => self.walk_expression(&empty.value),
                Construct::Eval(eval) => self.walk_expression(&eval.value),
                Construct::Print(print) => self.walk_expression(&print.value),
                Construct::Include(include) => self.walk_expression(&include.value),
                Construct::IncludeOnce(include) => self.walk_expression(&include.value),
                Construct::Require(require) => self.walk_expression(&require.value),
                Construct::RequireOnce(require) => self.walk_expression(&require.value),
                Construct::Exit(exit) => {
                    if let Some(arguments) = &exit.arguments {
                        self.walk_arguments(arguments);
                    }
                }
                Construct::Die(die) => {
                    if let Some(arguments) = &die.arguments {
                        self.walk_arguments(arguments);
                    }
                }
            },
            // Anonymous functions do not reset the variable scope or the
            // function prefix; their bodies extend the enclosing scope.
            Expression::Closure(closure) => {
                for inner in closure.body.statements.iter() {
                    self.walk_statement(inner);
                }
            }
            Expression::ArrowFunction(arrow) => {
                self.walk_expression(&arrow.expression);
            }
            _ => {}
        }
    }

    fn walk_arguments(&mut self, argument_list: &ArgumentList<'_>) {
        for arg in argument_list.arguments.iter() {
            self.walk_expression(arg.value());
        }
    }

    fn walk_array_elements(&mut self, elements: &TokenSeparatedSequence<'_, ArrayElement<'_>>) {
        for element in elements.iter() {
            match element {
                ArrayElement::KeyValue(kv) => {
                    self.walk_expression(&kv.key);
                    self.walk_expression(&kv.value);
                }
                ArrayElement::Value(val) => {
                    self.walk_expression(&val.value);
                }
                ArrayElement::Variadic(variadic) => {
                    self.walk_expression(&variadic.value);
                }
                ArrayElement::Missing(_) => {}
            }
        }
    }

    /// Emit one `use` entity per imported name, all positioned at the use
    /// statement, with the current namespace (possibly empty) prefixed.
    ///
    /// Group imports are expanded with their prefix joined back on; the
    /// `function` and `const` markers of typed imports are not part of the
    /// clause.
    fn serialize_use(&mut self, use_stmt: &Use<'_>) {
        let mut names = Vec::new();
        match &use_stmt.items {
            UseItems::Sequence(seq) => {
                for item in seq.items.iter() {
                    names.push(self.use_item_name(item, None));
                }
            }
            UseItems::TypedSequence(typed_seq) => {
                for item in typed_seq.items.iter() {
                    names.push(self.use_item_name(item, None));
                }
            }
            UseItems::TypedList(typed_list) => {
                let prefix = self.text(typed_list.namespace.span());
                for item in typed_list.items.iter() {
                    names.push(self.use_item_name(item, Some(prefix)));
                }
            }
            UseItems::MixedList(mixed_list) => {
                let prefix = self.text(mixed_list.namespace.span());
                for maybe_typed in mixed_list.items.iter() {
                    names.push(self.use_item_name(&maybe_typed.item, Some(prefix)));
                }
            }
        }
        let offset = use_stmt.span().start.offset as usize;
        self.scoped(format!("namespace {}", self.namespace), |s| {
            for name in names {
                s.insert(offset, &format!("use {}", name), EntityKind::Use);
            }
        });
    }

    /// The imported name, never the alias.
    fn use_item_name(&self, item: &UseItem<'_>, prefix: Option<&str>) -> String {
        let name = self.text(item.name.span());
        let name = name.strip_prefix('\\').unwrap_or(name);
        match prefix {
            Some(prefix) => format!("{}\\{}", prefix.trim_end_matches('\\'), name),
            None => name.to_string(),
        }
    }

    fn serialize_class(&mut self, class: &Class<'_>) {
        let name = self.text(class.name.span);
        let offset = class.span().start.offset as usize;

        let depth = self.stack.len();
        if !self.namespace.is_empty() {
            self.stack.push(format!("namespace {}", self.namespace));
        }
        self.stack.push(format!("class {}", name));
        if let Some(parent) = class.extends.as_ref().and_then(|e| e.types.first()) {
            let parent_text = self.text(parent.span());
            let first_segment = parent_text.split('\\').next().unwrap_or(parent_text);
            self.stack.push(format!("extends {}", first_segment));
        }
        if let Some(implements) = &class.implements {
            for interface in implements.types.iter() {
                self.stack
                    .push(format!("implements {}", self.text(interface.span())));
            }
        }

        self.insert(offset, "", EntityKind::Class);

        self.scoped("{".to_string(), |s| {
            for member in class.members.iter() {
                match member {
                    ClassLikeMember::Constant(constant) => s.serialize_class_const(constant),
                    ClassLikeMember::Property(Property::Plain(prop)) => {
                        s.serialize_class_property(prop)
                    }
                    ClassLikeMember::Method(method) => s.serialize_class_method(method),
                    _ => {}
                }
            }
        });

        // Restore every frame pushed above, namespace frame included.
        self.stack.truncate(depth);

        // Method bodies are only descended into after the whole class
        // signature has been serialized, so every var entity of this class
        // follows every signature entity.
        self.walk_member_bodies(&class.members);
    }

    fn walk_member_bodies(&mut self, members: &Sequence<'_, ClassLikeMember<'_>>) {
        for member in members.iter() {
            if let ClassLikeMember::Method(method) = member {
                let name = self.text(method.name.span);
                self.enter_function_scope(name, &method.return_type_hint);
                if let MethodBody::Concrete(body) = &method.body {
                    for inner in body.statements.iter() {
                        self.walk_statement(inner);
                    }
                }
            }
        }
    }

    fn serialize_class_const(&mut self, constant: &ClassLikeConstant<'_>) {
        let mut clauses = vec![visibility_of(&constant.modifiers)];
        if constant.modifiers.contains_static() {
            clauses.push("static");
        }
        self.scoped(clauses.join(" "), |s| {
            for item in constant.items.iter() {
                let name_span = item.name.span();
                let name = s.text(name_span).to_string();
                s.insert(name_span.start.offset as usize, &name, EntityKind::Const);
            }
        });
    }

    fn serialize_class_property(&mut self, prop: &PlainProperty<'_>) {
        let mut clauses = vec![visibility_of(&prop.modifiers)];
        if prop.modifiers.contains_static() {
            clauses.push("static");
        }
        self.scoped(clauses.join(" "), |s| {
            for item in prop.items.iter() {
                let var_span = item.variable().span();
                let fragment = s.text(var_span).to_string();
                s.insert(var_span.start.offset as usize, &fragment, EntityKind::Property);
            }
        });
    }

    fn serialize_class_method(&mut self, method: &Method<'_>) {
        let mut clauses = vec![visibility_of(&method.modifiers)];
        if method.modifiers.contains_abstract() {
            clauses.push("abstract");
        }
        if method.modifiers.contains_final() {
            clauses.push("final");
        }
        if method.modifiers.contains_static() {
            clauses.push("static");
        }
        let name = self.text(method.name.span);
        let prefix = format!("{} function {} (", clauses.join(" "), name);
        // Param entities carry the method's own position, not the
        // parameter's; report consumers expect it that way.
        let offset = method.span().start.offset as usize;

        self.scoped(prefix, |s| {
            for param in method.parameter_list.parameters.iter() {
                let hint = param
                    .hint
                    .as_ref()
                    .map(|h| format!("{} ", s.text(h.span())))
                    .unwrap_or_default();
                let variable = s.text(param.variable.span);
                s.insert(offset, &format!("{}{}", hint, variable), EntityKind::Param);
            }

            let mut suffix = vec![")".to_string()];
            if let Some(ret) = &method.return_type_hint {
                suffix.push(format!(":{}", s.text(ret.hint.span())));
            }
            s.scoped(suffix.join(" "), |s| {
                s.insert(offset, "", EntityKind::Function);
            });
        });
    }

    /// Entering a named function or method: rebuild the flat variable-clause
    /// prefix (parameters deliberately omitted) and reset the scope tracker.
    fn enter_function_scope(
        &mut self,
        name: &str,
        return_type_hint: &Option<FunctionLikeReturnTypeHint<'_>>,
    ) {
        let mut clauses = vec!["function".to_string(), name.to_string(), "(".to_string(), ")".to_string()];
        if let Some(ret) = return_type_hint {
            clauses.push(format!(":{}", self.text(ret.hint.span())));
        }
        clauses.push("{".to_string());
        self.function_prefix = clauses.join(" ");
        self.variables_seen.clear();
    }

    /// First reference of a variable name in the current scope emits a
    /// `var` entity; later references are inert.
    fn serialize_variable(&mut self, span: Span) {
        let name = self.text(span);
        if self.variables_seen.contains(name) {
            return;
        }
        self.variables_seen.insert(name.to_string());
        let fragment = format!("{} {}", self.function_prefix, name);
        self.insert(span.start.offset as usize, &fragment, EntityKind::Var);
    }
}

fn visibility_of(modifiers: &Sequence<'_, Modifier<'_>>) -> &'static str {
    if modifiers.contains_private() {
        "private"
    } else if modifiers.contains_protected() {
        "protected"
    } else {
        // No explicit visibility (legacy `var` properties included) is
        // public.
        "public"
    }
}
