use rustpython_parser::ast::{self, Expr, Ranged, Stmt};
use rustpython_parser::{Parse, ParseError};

use quantor_model::ErrorList;

use crate::line_index::LineIndex;
use crate::whitelist;

/// Walks a parsed strategy module and accumulates every disallowed construct
/// it finds. Never executes the source — `ast::Suite::parse` only builds a
/// syntax tree.
pub struct StaticAnalyzer<'a> {
    lines: &'a LineIndex,
    errors: ErrorList,
}

impl<'a> StaticAnalyzer<'a> {
    /// Parse `source` and run every check, returning the accumulated errors.
    /// A syntax error short-circuits the remaining checks — there's no tree
    /// left to walk.
    pub fn analyze(source: &str) -> ErrorList {
        let lines = LineIndex::new(source);
        let mut errors = ErrorList::new();

        let suite = match ast::Suite::parse(source, "<strategy>") {
            Ok(suite) => suite,
            Err(err) => {
                errors.push_at(format!("Syntax error: {}", describe_parse_error(&err)), None);
                return errors;
            }
        };

        let mut analyzer = StaticAnalyzer {
            lines: &lines,
            errors,
        };
        analyzer.validate_strategy_class(&suite);
        for stmt in &suite {
            analyzer.walk_stmt(stmt);
        }
        analyzer.errors
    }

    fn push(&mut self, message: impl Into<String>, offset: rustpython_parser::text_size::TextSize) {
        self.errors.push_at(message, Some(self.lines.line_number(offset)));
    }

    fn validate_strategy_class(&mut self, suite: &[Stmt]) {
        if !find_strategy_class(suite) {
            self.errors
                .push("Code must define a class that inherits from Strategy");
        }
    }

    fn walk_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Global(s) => self.push("Disallowed syntax: Global", s.range.start()),
            Stmt::Nonlocal(s) => self.push("Disallowed syntax: Nonlocal", s.range.start()),
            Stmt::TryStar(s) => self.push("Disallowed syntax: TryStar", s.range.start()),

            Stmt::FunctionDef(s) => {
                self.walk_args(&s.args);
                for stmt in &s.body {
                    self.walk_stmt(stmt);
                }
                for d in &s.decorator_list {
                    self.walk_expr(d);
                }
            }
            Stmt::AsyncFunctionDef(s) => {
                self.walk_args(&s.args);
                for stmt in &s.body {
                    self.walk_stmt(stmt);
                }
            }
            Stmt::ClassDef(s) => {
                for base in &s.bases {
                    self.walk_expr(base);
                }
                for stmt in &s.body {
                    self.walk_stmt(stmt);
                }
            }
            Stmt::Return(s) => {
                if let Some(v) = &s.value {
                    self.walk_expr(v);
                }
            }
            Stmt::Delete(s) => {
                for t in &s.targets {
                    self.walk_expr(t);
                }
            }
            Stmt::Assign(s) => {
                for t in &s.targets {
                    self.walk_expr(t);
                }
                self.walk_expr(&s.value);
            }
            Stmt::AugAssign(s) => {
                self.walk_expr(&s.target);
                self.walk_expr(&s.value);
            }
            Stmt::AnnAssign(s) => {
                self.walk_expr(&s.target);
                if let Some(v) = &s.value {
                    self.walk_expr(v);
                }
            }
            Stmt::For(s) | Stmt::AsyncFor(s) => {
                self.walk_expr(&s.target);
                self.walk_expr(&s.iter);
                for stmt in &s.body {
                    self.walk_stmt(stmt);
                }
                for stmt in &s.orelse {
                    self.walk_stmt(stmt);
                }
            }
            Stmt::While(s) => {
                self.walk_expr(&s.test);
                for stmt in &s.body {
                    self.walk_stmt(stmt);
                }
                for stmt in &s.orelse {
                    self.walk_stmt(stmt);
                }
            }
            Stmt::If(s) => {
                self.walk_expr(&s.test);
                for stmt in &s.body {
                    self.walk_stmt(stmt);
                }
                for stmt in &s.orelse {
                    self.walk_stmt(stmt);
                }
            }
            Stmt::With(s) | Stmt::AsyncWith(s) => {
                for item in &s.items {
                    self.walk_expr(&item.context_expr);
                    if let Some(v) = &item.optional_vars {
                        self.walk_expr(v);
                    }
                }
                for stmt in &s.body {
                    self.walk_stmt(stmt);
                }
            }
            Stmt::Raise(s) => {
                if let Some(e) = &s.exc {
                    self.walk_expr(e);
                }
                if let Some(c) = &s.cause {
                    self.walk_expr(c);
                }
            }
            Stmt::Try(s) => {
                for stmt in &s.body {
                    self.walk_stmt(stmt);
                }
                for handler in &s.handlers {
                    let ast::ExceptHandler::ExceptHandler(h) = handler;
                    if let Some(ty) = &h.type_ {
                        self.walk_expr(ty);
                    }
                    for stmt in &h.body {
                        self.walk_stmt(stmt);
                    }
                }
                for stmt in &s.orelse {
                    self.walk_stmt(stmt);
                }
                for stmt in &s.finalbody {
                    self.walk_stmt(stmt);
                }
            }
            Stmt::Assert(s) => {
                self.walk_expr(&s.test);
                if let Some(m) = &s.msg {
                    self.walk_expr(m);
                }
            }
            Stmt::Import(s) => {
                for alias in &s.names {
                    let root = alias.name.split('.').next().unwrap_or(&alias.name);
                    if !whitelist::ALLOWED_MODULES.contains(&root) {
                        self.push(
                            format!("Import of '{}' is not allowed", alias.name),
                            s.range.start(),
                        );
                    }
                }
            }
            Stmt::ImportFrom(s) => {
                if let Some(module) = &s.module {
                    let root = module.split('.').next().unwrap_or(module);
                    if !whitelist::ALLOWED_MODULES.contains(&root) {
                        self.push(
                            format!("Import from '{module}' is not allowed"),
                            s.range.start(),
                        );
                    }
                }
            }
            Stmt::Expr(s) => self.walk_expr(&s.value),
            Stmt::Match(s) => {
                self.walk_expr(&s.subject);
                for case in &s.cases {
                    for stmt in &case.body {
                        self.walk_stmt(stmt);
                    }
                }
            }
            Stmt::Pass(_) | Stmt::Break(_) | Stmt::Continue(_) | Stmt::TypeAlias(_) => {}
        }
    }

    fn walk_args(&mut self, args: &ast::Arguments) {
        let groups = [&args.posonlyargs, &args.args, &args.kwonlyargs];
        for group in groups {
            for arg in group {
                if let Some(default) = &arg.default {
                    self.walk_expr(default);
                }
            }
        }
    }

    fn walk_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Call(e) => {
                if let Expr::Name(name) = e.func.as_ref() {
                    let id = name.id.as_str();
                    if whitelist::FORBIDDEN_BUILTINS.contains(&id) {
                        self.push(format!("Use of '{id}()' is forbidden"), e.range.start());
                    } else if is_builtin_like(id) && !whitelist::ALLOWED_BUILTINS.contains(&id) {
                        self.push(format!("Builtin '{id}()' is not allowed"), e.range.start());
                    }
                }
                self.walk_expr(&e.func);
                for arg in &e.args {
                    self.walk_expr(arg);
                }
                for kw in &e.keywords {
                    self.walk_expr(&kw.value);
                }
            }
            Expr::Attribute(e) => {
                if whitelist::FORBIDDEN_ATTRIBUTES.contains(&e.attr.as_str()) {
                    self.push(format!("Access to '{}' is forbidden", e.attr), e.range.start());
                }
                self.walk_expr(&e.value);
            }
            Expr::BinOp(e) => {
                self.walk_expr(&e.left);
                self.walk_expr(&e.right);
            }
            Expr::UnaryOp(e) => self.walk_expr(&e.operand),
            Expr::BoolOp(e) => {
                for v in &e.values {
                    self.walk_expr(v);
                }
            }
            Expr::Compare(e) => {
                self.walk_expr(&e.left);
                for c in &e.comparators {
                    self.walk_expr(c);
                }
            }
            Expr::IfExp(e) => {
                self.walk_expr(&e.test);
                self.walk_expr(&e.body);
                self.walk_expr(&e.orelse);
            }
            Expr::Dict(e) => {
                for k in e.keys.iter().flatten() {
                    self.walk_expr(k);
                }
                for v in &e.values {
                    self.walk_expr(v);
                }
            }
            Expr::Set(e) | Expr::List(e) => {
                for elt in &e.elts {
                    self.walk_expr(elt);
                }
            }
            Expr::Tuple(e) => {
                for elt in &e.elts {
                    self.walk_expr(elt);
                }
            }
            Expr::ListComp(e) | Expr::SetComp(e) => {
                self.walk_expr(&e.elt);
                self.walk_comprehensions(&e.generators);
            }
            Expr::DictComp(e) => {
                self.walk_expr(&e.key);
                self.walk_expr(&e.value);
                self.walk_comprehensions(&e.generators);
            }
            Expr::GeneratorExp(e) => {
                self.walk_expr(&e.elt);
                self.walk_comprehensions(&e.generators);
            }
            Expr::Lambda(e) => self.walk_expr(&e.body),
            Expr::Subscript(e) => {
                self.walk_expr(&e.value);
                self.walk_expr(&e.slice);
            }
            Expr::Starred(e) => self.walk_expr(&e.value),
            Expr::Slice(e) => {
                if let Some(v) = &e.lower {
                    self.walk_expr(v);
                }
                if let Some(v) = &e.upper {
                    self.walk_expr(v);
                }
                if let Some(v) = &e.step {
                    self.walk_expr(v);
                }
            }
            Expr::NamedExpr(e) => {
                self.walk_expr(&e.target);
                self.walk_expr(&e.value);
            }
            Expr::Await(e) => self.walk_expr(&e.value),
            Expr::Yield(e) => {
                if let Some(v) = &e.value {
                    self.walk_expr(v);
                }
            }
            Expr::YieldFrom(e) => self.walk_expr(&e.value),
            Expr::FormattedValue(e) => self.walk_expr(&e.value),
            Expr::JoinedStr(e) => {
                for v in &e.values {
                    self.walk_expr(v);
                }
            }
            Expr::Name(_) | Expr::Constant(_) => {}
        }
    }

    fn walk_comprehensions(&mut self, generators: &[ast::Comprehension]) {
        for gen in generators {
            self.walk_expr(&gen.target);
            self.walk_expr(&gen.iter);
            for cond in &gen.ifs {
                self.walk_expr(cond);
            }
        }
    }
}

fn find_strategy_class(suite: &[Stmt]) -> bool {
    for stmt in suite {
        match stmt {
            Stmt::ClassDef(s) => {
                for base in &s.bases {
                    match base {
                        Expr::Name(n) if n.id.as_str() == "Strategy" => return true,
                        Expr::Attribute(a) if a.attr.as_str() == "Strategy" => return true,
                        _ => {}
                    }
                }
                if find_strategy_class(&s.body) {
                    return true;
                }
            }
            Stmt::FunctionDef(s) => {
                if find_strategy_class(&s.body) {
                    return true;
                }
            }
            _ => {}
        }
    }
    false
}

/// Python's builtin names never appear as identifiers the parser can
/// distinguish from user-defined functions, so this mirrors the original's
/// `name in dir(builtins)` check with a fixed list of the ones that matter.
fn is_builtin_like(name: &str) -> bool {
    whitelist::ALLOWED_BUILTINS.contains(&name)
        || whitelist::FORBIDDEN_BUILTINS.contains(&name)
        || whitelist::OTHER_KNOWN_BUILTINS.contains(&name)
}

fn describe_parse_error(err: &ParseError) -> String {
    err.to_string()
}
