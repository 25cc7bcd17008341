use std::mem;
use std::collections::HashMap;

use crate::error::{Error, ResolveError};
use crate::expr::Expr;
use crate::stmt::Stmt;
use crate::interpreter::Interpreter;
use crate::token::Token;

enum FunctionType {
    None,
    Function,
    Initializer,
    Method,
}

enum ClassType {
    None,
    Class,
    Subclass,
}

/// Walks the parsed tree once, before evaluation, to work out how many
/// enclosing scopes separate each variable reference from the scope that
/// declares it. The interpreter uses that distance instead of walking its
/// environment chain by name at every access.
pub struct Resolver<'a> {
    interpreter: &'a mut Interpreter,
    scopes: Vec<HashMap<String, bool>>,
    current_function: FunctionType,
    current_class: ClassType,
}

impl<'a> Resolver<'a> {
    pub fn new(interpreter: &'a mut Interpreter) -> Self {
        Resolver {
            interpreter,
            scopes: vec![],
            current_function: FunctionType::None,
            current_class: ClassType::None,
        }
    }

    pub fn resolve(&mut self, statements: &Vec<Stmt>) {
        for statement in statements {
            self.resolve_stmt(statement);
        }
    }

    fn resolve_function(&mut self, function: &Stmt, r#type: FunctionType) {
        let Stmt::Function(function) = function else { unreachable!() };

        let enclosing_function = mem::replace(&mut self.current_function, r#type);

        self.begin_scope();
        for param in &function.params {
            self.declare(param);
            self.define(param);
        }
        self.resolve(&function.body);
        self.end_scope();

        self.current_function = enclosing_function;
    }

    fn begin_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    fn end_scope(&mut self) {
        self.scopes.pop();
    }

    fn declare(&mut self, name: &Token) {
        if self.scopes.is_empty() {
            return;
        }

        let scope = self.scopes.last_mut().expect("stack to be not empty");
        if scope.contains_key(&name.lexeme) {
            ResolveError {
                token: name.clone(),
                message: format!("A variable is already defined with name '{}' in this scope", name.lexeme),
            }.throw();
        }
        scope.insert(name.lexeme.to_owned(), false);
    }

    fn define(&mut self, name: &Token) {
        if self.scopes.is_empty() {
            return;
        }

        self.scopes
            .last_mut()
            .expect("stack to be not empty")
            .insert(name.lexeme.to_owned(), true);
    }

    fn resolve_local(&mut self, name: &Token) {
        for (i, scope) in self.scopes.iter().rev().enumerate() {
            if scope.contains_key(&name.lexeme) {
                self.interpreter.resolve(name, i);
                return;
            }
        }
    }

    fn resolve_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Literal(_) => (),

            Expr::Variable(variable) => {
                if let Some(scope) = self.scopes.last() {
                    if let Some(entry) = scope.get(&variable.name.lexeme) {
                        if !entry {
                            ResolveError {
                                token: variable.name.to_owned(),
                                message: "Cannot read local variable in its own initializer".to_string(),
                            }.throw();
                        }
                    }
                }

                self.resolve_local(&variable.name);
            },

            Expr::Assign(assign) => {
                self.resolve_expr(&assign.value);
                self.resolve_local(&assign.name);
            },

            Expr::Logical(logical) => {
                self.resolve_expr(&logical.left);
                self.resolve_expr(&logical.right);
            },

            Expr::Unary(unary) => self.resolve_expr(&unary.expr),

            Expr::Binary(binary) => {
                self.resolve_expr(&binary.left);
                self.resolve_expr(&binary.right);
            },

            Expr::Grouping(grouping) => self.resolve_expr(&grouping.expr),

            Expr::Call(call) => {
                self.resolve_expr(&call.callee);
                for argument in &call.arguments {
                    self.resolve_expr(argument);
                }
            },

            Expr::Get(get) => self.resolve_expr(&get.object),

            Expr::Set(set) => {
                self.resolve_expr(&set.value);
                self.resolve_expr(&set.object);
            },

            Expr::This(this) => {
                if let ClassType::None = self.current_class {
                    ResolveError {
                        token: this.keyword.clone(),
                        message: "Cannot use 'this' outside of a class".to_string(),
                    }.throw();
                    return;
                }

                self.resolve_local(&this.keyword);
            },

            Expr::Super(super_expr) => {
                match self.current_class {
                    ClassType::Subclass => (),
                    ClassType::None => ResolveError {
                        token: super_expr.keyword.clone(),
                        message: "Cannot use 'super' outside of a class".to_string(),
                    }.throw(),
                    ClassType::Class => ResolveError {
                        token: super_expr.keyword.clone(),
                        message: "Cannot use 'super' in a class with no superclass".to_string(),
                    }.throw(),
                }

                self.resolve_local(&super_expr.keyword);
            },
        }
    }

    fn resolve_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Block(block) => {
                self.begin_scope();
                self.resolve(&block.statements);
                self.end_scope();
            },

            Stmt::Var(var) => {
                self.declare(&var.name);
                if let Some(initializer) = &var.initializer {
                    self.resolve_expr(initializer);
                }
                self.define(&var.name);
            },

            Stmt::Function(function) => {
                self.declare(&function.name);
                self.define(&function.name);

                self.resolve_function(stmt, FunctionType::Function);
            },

            Stmt::Expression(expr) => self.resolve_expr(&expr.expr),

            Stmt::If(if_stmt) => {
                self.resolve_expr(&if_stmt.condition);
                self.resolve_stmt(&if_stmt.then_branch);
                if let Some(else_branch) = &if_stmt.else_branch {
                    self.resolve_stmt(else_branch);
                }
            },

            Stmt::Print(print) => self.resolve_expr(&print.expr),

            Stmt::Return(return_stmt) => {
                if let FunctionType::None = self.current_function {
                    ResolveError {
                        token: return_stmt.keyword.clone(),
                        message: "Cannot return from top-level code".to_string(),
                    }.throw();
                }

                if let Some(value) = &return_stmt.value {
                    if let FunctionType::Initializer = self.current_function {
                        ResolveError {
                            token: return_stmt.keyword.clone(),
                            message: "Cannot return a value from an initializer".to_string(),
                        }.throw();
                        return;
                    }

                    self.resolve_expr(value);
                }
            },

            Stmt::While(while_stmt) => {
                self.resolve_expr(&while_stmt.condition);
                self.resolve_stmt(&while_stmt.body);
            },

            Stmt::Class(class_stmt) => {
                let enclosing_class = mem::replace(&mut self.current_class, ClassType::Class);

                self.declare(&class_stmt.name);
                self.define(&class_stmt.name);

                if let Some(ref superclass) = class_stmt.superclass {
                    let Expr::Variable(variable) = superclass else { unreachable!() };
                    if class_stmt.name.lexeme == variable.name.lexeme {
                        ResolveError {
                            token: variable.name.clone(),
                            message: "A class cannot inherit from itself".to_string(),
                        }.throw();
                    }

                    self.current_class = ClassType::Subclass;

                    self.resolve_expr(superclass);

                    self.begin_scope();
                    self.scopes
                        .last_mut()
                        .expect("stack to be not empty")
                        .insert("super".to_string(), true);
                }

                self.begin_scope();
                self.scopes
                    .last_mut()
                    .expect("stack to be not empty")
                    .insert("this".to_string(), true);

                for method in &class_stmt.methods {
                    let Stmt::Function(function) = method else { unreachable!() };
                    let declaration = if function.name.lexeme == "init" {
                        FunctionType::Initializer
                    } else {
                        FunctionType::Method
                    };
                    self.resolve_function(method, declaration);
                }

                self.end_scope();

                if class_stmt.superclass.is_some() {
                    self.end_scope();
                }

                self.current_class = enclosing_class;
            },
        }
    }
}
