use std::sync::LazyLock;

use regex::Regex;
use rustc_hash::FxHashMap;
use rustpython_parser::ast::{
    Arg, Arguments, Comprehension, ExceptHandler, Expr, ExprContext, Stmt, StmtClassDef,
};

use crate::diagnostic::Issue;
use crate::utils::find_row;

/// Per-file mapping from line number to the issues the tree walk found
/// there. Insertion order within a line is reporting order.
pub type LineIssueIndex = FxHashMap<usize, Vec<Issue>>;

// Both predicates are anchored PREFIX matches, like Python's `re.match`:
// a name with a valid prefix passes even when its suffix would not
// independently match (`FooBar_baz` is accepted as CamelCase, `good_Name`
// as snake_case). Tightening them would change which names are flagged.
static CAMEL_CASE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^([A-Z]+[a-z]*)+").unwrap());
static SNAKE_CASE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[a-z_]+[0-9a-z_]*").unwrap());

fn is_camelcase(name: &str) -> bool {
    CAMEL_CASE.is_match(name)
}

fn is_snakecase(name: &str) -> bool {
    SNAKE_CASE.is_match(name)
}

/// S008: a class name must be CamelCase.
fn invalid_class_name(name: &str) -> Option<Issue> {
    (!is_camelcase(name))
        .then(|| Issue::new("S008", format!("Class name {name} should use CamelCase")))
}

/// S009: a function name must be snake_case.
fn invalid_function_name(name: &str) -> Option<Issue> {
    (!is_snakecase(name))
        .then(|| Issue::new("S009", format!("Function name {name} should use snake_case")))
}

/// S010: a positional parameter name must be snake_case. Anchored at the
/// def's line, not the parameter's own line.
fn invalid_argument_name(name: &str) -> Option<Issue> {
    (!is_snakecase(name))
        .then(|| Issue::new("S010", format!("Argument name {name} should be snake_case")))
}

/// S011: a name assigned to inside a function body must be snake_case.
/// Anchored at the assignment's own line.
fn invalid_variable_name(name: &str) -> Option<Issue> {
    (!is_snakecase(name))
        .then(|| Issue::new("S011", format!("Variable {name} should be snake_case")))
}

/// S012: a positional default value must not be a dict, list, or set
/// literal. Several mutable defaults on one def collapse to a single issue.
fn mutable_default(args: &Arguments) -> Option<Issue> {
    positional_params(args)
        .filter_map(|(_param, default)| default)
        .any(|default| matches!(default, Expr::Dict(_) | Expr::List(_) | Expr::Set(_)))
        .then(|| Issue::new("S012", "The default argument value is mutable"))
}

/// Positional parameters of a def (positional-only and regular), each with
/// its default when present. Keyword-only parameters, `*args` and
/// `**kwargs` are not style-checked.
fn positional_params(args: &Arguments) -> impl Iterator<Item = (&Arg, Option<&Expr>)> {
    args.posonlyargs
        .iter()
        .chain(&args.args)
        .map(|param| (&param.def, param.default.as_deref()))
}

/// Walks the parsed module exactly once, depth-first and pre-order, and
/// accumulates naming and default-argument issues into a [`LineIssueIndex`].
///
/// The checker never emits anything itself; the orchestrator merges the
/// index into the line-by-line output pass once the walk is complete.
pub struct AstChecker<'a> {
    line_issues: LineIssueIndex,
    loc_new_lines: &'a [usize],
}

impl<'a> AstChecker<'a> {
    pub fn new(loc_new_lines: &'a [usize]) -> Self {
        Self { line_issues: LineIssueIndex::default(), loc_new_lines }
    }

    pub fn check_suite(&mut self, suite: &[Stmt]) {
        for stmt in suite {
            self.visit_stmt(stmt);
        }
    }

    /// Hand the accumulated index to the orchestrator. Read-only from here
    /// on: the walk is done.
    pub fn into_line_issues(self) -> LineIssueIndex {
        self.line_issues
    }

    fn row_of(&self, offset: impl Into<u32>) -> usize {
        find_row(offset.into() as usize, self.loc_new_lines)
    }

    // Issues arrive as Option because each rule reports Some(Issue) or None.
    fn add_issue(&mut self, row: usize, issue: Option<Issue>) {
        if let Some(issue) = issue {
            self.line_issues.entry(row).or_default().push(issue);
        }
    }

    /// Dispatch a statement to its rules, then recurse into its child
    /// blocks. Only class and function definitions carry rules; every other
    /// compound statement just recurses so that nested definitions are
    /// reached. Statements without child blocks fall through.
    fn visit_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::ClassDef(def) => self.check_class_def(def),
            Stmt::FunctionDef(def) => {
                self.check_function_def(def.range.start(), def.name.as_str(), &def.args, &def.body);
            }
            Stmt::AsyncFunctionDef(def) => {
                self.check_function_def(def.range.start(), def.name.as_str(), &def.args, &def.body);
            }
            Stmt::If(stmt) => {
                self.check_suite(&stmt.body);
                self.check_suite(&stmt.orelse);
            }
            Stmt::While(stmt) => {
                self.check_suite(&stmt.body);
                self.check_suite(&stmt.orelse);
            }
            Stmt::For(stmt) => {
                self.check_suite(&stmt.body);
                self.check_suite(&stmt.orelse);
            }
            Stmt::AsyncFor(stmt) => {
                self.check_suite(&stmt.body);
                self.check_suite(&stmt.orelse);
            }
            Stmt::With(stmt) => self.check_suite(&stmt.body),
            Stmt::AsyncWith(stmt) => self.check_suite(&stmt.body),
            Stmt::Try(stmt) => {
                self.check_suite(&stmt.body);
                for handler in &stmt.handlers {
                    let ExceptHandler::ExceptHandler(handler) = handler;
                    self.check_suite(&handler.body);
                }
                self.check_suite(&stmt.orelse);
                self.check_suite(&stmt.finalbody);
            }
            Stmt::TryStar(stmt) => {
                self.check_suite(&stmt.body);
                for handler in &stmt.handlers {
                    let ExceptHandler::ExceptHandler(handler) = handler;
                    self.check_suite(&handler.body);
                }
                self.check_suite(&stmt.orelse);
                self.check_suite(&stmt.finalbody);
            }
            Stmt::Match(stmt) => {
                for case in &stmt.cases {
                    self.check_suite(&case.body);
                }
            }
            _ => {}
        }
    }

    fn check_class_def(&mut self, def: &StmtClassDef) {
        let row = self.row_of(def.range.start());
        self.add_issue(row, invalid_class_name(def.name.as_str()));
        self.check_suite(&def.body);
    }

    /// Rules for one def, in their fixed order: name, parameters, store
    /// targets in the body, mutable defaults. Then recurse into the body so
    /// nested defs get their own pass. A nested def's body is therefore
    /// scanned for store targets once per enclosing def and once for
    /// itself, which duplicates S011 for nested assignments. Preserved
    /// behavior.
    fn check_function_def(
        &mut self,
        start: impl Into<u32>,
        name: &str,
        args: &Arguments,
        body: &[Stmt],
    ) {
        let row = self.row_of(start);
        self.add_issue(row, invalid_function_name(name));
        for (param, _default) in positional_params(args) {
            self.add_issue(row, invalid_argument_name(param.arg.as_str()));
        }
        self.walk_body(body);
        self.add_issue(row, mutable_default(args));
        self.check_suite(body);
    }

    // ── Store-target sub-walk ──
    //
    // Visits every expression under a function body and flags simple names
    // in store context. Statements recurse into all their expression and
    // block children, expressions into their operands.

    fn walk_body(&mut self, body: &[Stmt]) {
        for stmt in body {
            self.walk_stmt(stmt);
        }
    }

    fn walk_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::FunctionDef(def) => {
                self.walk_args(&def.args);
                self.walk_body(&def.body);
            }
            Stmt::AsyncFunctionDef(def) => {
                self.walk_args(&def.args);
                self.walk_body(&def.body);
            }
            Stmt::ClassDef(def) => {
                for base in &def.bases {
                    self.walk_expr(base);
                }
                self.walk_body(&def.body);
            }
            Stmt::Return(stmt) => {
                if let Some(value) = &stmt.value {
                    self.walk_expr(value);
                }
            }
            Stmt::Delete(stmt) => {
                for target in &stmt.targets {
                    self.walk_expr(target);
                }
            }
            Stmt::Assign(stmt) => {
                for target in &stmt.targets {
                    self.walk_expr(target);
                }
                self.walk_expr(&stmt.value);
            }
            Stmt::AugAssign(stmt) => {
                self.walk_expr(&stmt.target);
                self.walk_expr(&stmt.value);
            }
            Stmt::AnnAssign(stmt) => {
                self.walk_expr(&stmt.target);
                if let Some(value) = &stmt.value {
                    self.walk_expr(value);
                }
            }
            Stmt::For(stmt) => {
                self.walk_expr(&stmt.target);
                self.walk_expr(&stmt.iter);
                self.walk_body(&stmt.body);
                self.walk_body(&stmt.orelse);
            }
            Stmt::AsyncFor(stmt) => {
                self.walk_expr(&stmt.target);
                self.walk_expr(&stmt.iter);
                self.walk_body(&stmt.body);
                self.walk_body(&stmt.orelse);
            }
            Stmt::While(stmt) => {
                self.walk_expr(&stmt.test);
                self.walk_body(&stmt.body);
                self.walk_body(&stmt.orelse);
            }
            Stmt::If(stmt) => {
                self.walk_expr(&stmt.test);
                self.walk_body(&stmt.body);
                self.walk_body(&stmt.orelse);
            }
            Stmt::With(stmt) => {
                for item in &stmt.items {
                    self.walk_expr(&item.context_expr);
                    if let Some(vars) = &item.optional_vars {
                        self.walk_expr(vars);
                    }
                }
                self.walk_body(&stmt.body);
            }
            Stmt::AsyncWith(stmt) => {
                for item in &stmt.items {
                    self.walk_expr(&item.context_expr);
                    if let Some(vars) = &item.optional_vars {
                        self.walk_expr(vars);
                    }
                }
                self.walk_body(&stmt.body);
            }
            Stmt::Raise(stmt) => {
                if let Some(exc) = &stmt.exc {
                    self.walk_expr(exc);
                }
                if let Some(cause) = &stmt.cause {
                    self.walk_expr(cause);
                }
            }
            Stmt::Try(stmt) => {
                self.walk_body(&stmt.body);
                for handler in &stmt.handlers {
                    let ExceptHandler::ExceptHandler(handler) = handler;
                    if let Some(type_) = &handler.type_ {
                        self.walk_expr(type_);
                    }
                    self.walk_body(&handler.body);
                }
                self.walk_body(&stmt.orelse);
                self.walk_body(&stmt.finalbody);
            }
            Stmt::TryStar(stmt) => {
                self.walk_body(&stmt.body);
                for handler in &stmt.handlers {
                    let ExceptHandler::ExceptHandler(handler) = handler;
                    if let Some(type_) = &handler.type_ {
                        self.walk_expr(type_);
                    }
                    self.walk_body(&handler.body);
                }
                self.walk_body(&stmt.orelse);
                self.walk_body(&stmt.finalbody);
            }
            Stmt::Assert(stmt) => {
                self.walk_expr(&stmt.test);
                if let Some(msg) = &stmt.msg {
                    self.walk_expr(msg);
                }
            }
            Stmt::Match(stmt) => {
                self.walk_expr(&stmt.subject);
                for case in &stmt.cases {
                    if let Some(guard) = &case.guard {
                        self.walk_expr(guard);
                    }
                    self.walk_body(&case.body);
                }
            }
            Stmt::Expr(stmt) => self.walk_expr(&stmt.value),
            _ => {}
        }
    }

    fn walk_args(&mut self, args: &Arguments) {
        for default in args
            .posonlyargs
            .iter()
            .chain(&args.args)
            .chain(&args.kwonlyargs)
            .filter_map(|param| param.default.as_deref())
        {
            self.walk_expr(default);
        }
    }

    fn walk_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Name(name) => {
                if matches!(name.ctx, ExprContext::Store) {
                    let row = self.row_of(name.range.start());
                    self.add_issue(row, invalid_variable_name(name.id.as_str()));
                }
            }
            Expr::BoolOp(expr) => {
                for value in &expr.values {
                    self.walk_expr(value);
                }
            }
            Expr::NamedExpr(expr) => {
                self.walk_expr(&expr.target);
                self.walk_expr(&expr.value);
            }
            Expr::BinOp(expr) => {
                self.walk_expr(&expr.left);
                self.walk_expr(&expr.right);
            }
            Expr::UnaryOp(expr) => self.walk_expr(&expr.operand),
            Expr::Lambda(expr) => {
                self.walk_args(&expr.args);
                self.walk_expr(&expr.body);
            }
            Expr::IfExp(expr) => {
                self.walk_expr(&expr.test);
                self.walk_expr(&expr.body);
                self.walk_expr(&expr.orelse);
            }
            Expr::Dict(expr) => {
                for key in expr.keys.iter().flatten() {
                    self.walk_expr(key);
                }
                for value in &expr.values {
                    self.walk_expr(value);
                }
            }
            Expr::Set(expr) => {
                for elt in &expr.elts {
                    self.walk_expr(elt);
                }
            }
            Expr::ListComp(expr) => {
                self.walk_expr(&expr.elt);
                self.walk_comprehensions(&expr.generators);
            }
            Expr::SetComp(expr) => {
                self.walk_expr(&expr.elt);
                self.walk_comprehensions(&expr.generators);
            }
            Expr::DictComp(expr) => {
                self.walk_expr(&expr.key);
                self.walk_expr(&expr.value);
                self.walk_comprehensions(&expr.generators);
            }
            Expr::GeneratorExp(expr) => {
                self.walk_expr(&expr.elt);
                self.walk_comprehensions(&expr.generators);
            }
            Expr::Await(expr) => self.walk_expr(&expr.value),
            Expr::Yield(expr) => {
                if let Some(value) = &expr.value {
                    self.walk_expr(value);
                }
            }
            Expr::YieldFrom(expr) => self.walk_expr(&expr.value),
            Expr::Compare(expr) => {
                self.walk_expr(&expr.left);
                for comparator in &expr.comparators {
                    self.walk_expr(comparator);
                }
            }
            Expr::Call(expr) => {
                self.walk_expr(&expr.func);
                for arg in &expr.args {
                    self.walk_expr(arg);
                }
                for keyword in &expr.keywords {
                    self.walk_expr(&keyword.value);
                }
            }
            Expr::FormattedValue(expr) => self.walk_expr(&expr.value),
            Expr::JoinedStr(expr) => {
                for value in &expr.values {
                    self.walk_expr(value);
                }
            }
            Expr::Attribute(expr) => self.walk_expr(&expr.value),
            Expr::Subscript(expr) => {
                self.walk_expr(&expr.value);
                self.walk_expr(&expr.slice);
            }
            Expr::Starred(expr) => self.walk_expr(&expr.value),
            Expr::List(expr) => {
                for elt in &expr.elts {
                    self.walk_expr(elt);
                }
            }
            Expr::Tuple(expr) => {
                for elt in &expr.elts {
                    self.walk_expr(elt);
                }
            }
            Expr::Slice(expr) => {
                if let Some(lower) = &expr.lower {
                    self.walk_expr(lower);
                }
                if let Some(upper) = &expr.upper {
                    self.walk_expr(upper);
                }
                if let Some(step) = &expr.step {
                    self.walk_expr(step);
                }
            }
            _ => {}
        }
    }

    fn walk_comprehensions(&mut self, generators: &[Comprehension]) {
        for generator in generators {
            self.walk_expr(&generator.target);
            self.walk_expr(&generator.iter);
            for if_ in &generator.ifs {
                self.walk_expr(if_);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rustpython_parser::{Parse, ast};

    use super::*;
    use crate::utils::find_new_lines;

    /// Parse a snippet, run the tree walk, and flatten the index into
    /// (row, "code message") pairs sorted by row (insertion order kept
    /// within a row).
    fn tree_issues(code: &str) -> Vec<(usize, String)> {
        let suite = ast::Suite::parse(code, "<test>").expect("test snippet should parse");
        let loc_new_lines = find_new_lines(code);
        let mut checker = AstChecker::new(&loc_new_lines);
        checker.check_suite(&suite);

        let mut rows: Vec<(usize, Vec<Issue>)> = checker.into_line_issues().into_iter().collect();
        rows.sort_by_key(|(row, _)| *row);
        rows.into_iter()
            .flat_map(|(row, issues)| {
                issues
                    .into_iter()
                    .map(move |issue| (row, issue.to_string()))
            })
            .collect()
    }

    #[test]
    fn test_class_name() {
        assert_eq!(
            tree_issues("class my_class:\n    pass\n"),
            vec![(1, "S008 Class name my_class should use CamelCase".to_string())]
        );
        assert!(tree_issues("class MyClass:\n    pass\n").is_empty());
    }

    #[test]
    fn test_function_name() {
        assert_eq!(
            tree_issues("def MyFunc():\n    pass\n"),
            vec![(1, "S009 Function name MyFunc should use snake_case".to_string())]
        );
        assert!(tree_issues("def my_func():\n    pass\n").is_empty());
    }

    #[test]
    fn test_argument_names_anchor_at_def_line() {
        assert_eq!(
            tree_issues("def f(X, ok, Y):\n    pass\n"),
            vec![
                (1, "S010 Argument name X should be snake_case".to_string()),
                (1, "S010 Argument name Y should be snake_case".to_string()),
            ]
        );
    }

    #[test]
    fn test_variable_anchor_at_own_line() {
        assert_eq!(
            tree_issues("def f():\n    My_Var = 1\n"),
            vec![(2, "S011 Variable My_Var should be snake_case".to_string())]
        );
    }

    #[test]
    fn test_module_level_assignment_is_not_checked() {
        assert!(tree_issues("My_Var = 1\n").is_empty());
    }

    #[test]
    fn test_for_loop_target_is_a_store() {
        assert_eq!(
            tree_issues("def f():\n    for Bad in range(3):\n        pass\n"),
            vec![(2, "S011 Variable Bad should be snake_case".to_string())]
        );
    }

    #[test]
    fn test_mutable_default_reported_once() {
        assert_eq!(
            tree_issues("def f(x={}, y=[]):\n    pass\n"),
            vec![(1, "S012 The default argument value is mutable".to_string())]
        );
        // set() is a call, not a literal; a tuple is not mutable
        assert!(tree_issues("def f(x=set(), y=1, z=()):\n    pass\n").is_empty());
    }

    #[test]
    fn test_def_line_issue_order() {
        // Name, then parameters, then mutable default, all on the def line.
        assert_eq!(
            tree_issues("def Bad(X, y={}):\n    pass\n"),
            vec![
                (1, "S009 Function name Bad should use snake_case".to_string()),
                (1, "S010 Argument name X should be snake_case".to_string()),
                (1, "S012 The default argument value is mutable".to_string()),
            ]
        );
    }

    #[test]
    fn test_prefix_matching_is_permissive() {
        // Valid prefix, invalid suffix: accepted, by (preserved) design.
        assert!(tree_issues("class FooBar_baz:\n    pass\n").is_empty());
        assert!(tree_issues("def good_Name():\n    pass\n").is_empty());
        // No valid prefix at all: flagged.
        assert_eq!(
            tree_issues("class _private:\n    pass\n"),
            vec![(1, "S008 Class name _private should use CamelCase".to_string())]
        );
    }

    #[test]
    fn test_method_inside_class() {
        assert_eq!(
            tree_issues("class C:\n    def BadMethod(self):\n        pass\n"),
            vec![(
                2,
                "S009 Function name BadMethod should use snake_case".to_string()
            )]
        );
    }

    #[test]
    fn test_nested_def_scanned_per_enclosing_def() {
        // The store sub-walk runs once for the outer def and once for the
        // inner one, so the inner assignment is reported twice.
        assert_eq!(
            tree_issues("def outer():\n    def inner():\n        Bad = 1\n"),
            vec![
                (3, "S011 Variable Bad should be snake_case".to_string()),
                (3, "S011 Variable Bad should be snake_case".to_string()),
            ]
        );
    }

    #[test]
    fn test_async_def_is_checked() {
        assert_eq!(
            tree_issues("async def BadAsync():\n    pass\n"),
            vec![(
                1,
                "S009 Function name BadAsync should use snake_case".to_string()
            )]
        );
    }

    #[test]
    fn test_def_inside_if_is_reached() {
        assert_eq!(
            tree_issues("if True:\n    def Bad():\n        pass\n"),
            vec![(2, "S009 Function name Bad should use snake_case".to_string())]
        );
    }
}
