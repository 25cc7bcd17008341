use std::cell::RefCell;
use std::collections::HashMap;
use std::io::{self, Write};
use std::rc::Rc;

use crate::class::Class;
use crate::environment::Environment;
use crate::error::{self, Error, RuntimeError};
use crate::expr::Expr;
use crate::function::{Function, NativeFunction};
use crate::literal::Literal;
use crate::object::{Callable, Object};
use crate::stmt::Stmt;
use crate::token::{Token, Type};

/// What executing a statement can produce besides a plain error: either a
/// genuine runtime error to report, or a `return` unwinding out of the
/// function body currently executing. Expression evaluation never produces
/// the `Return` variant — only statement execution can.
pub enum Signal {
    Return(Object),
    Runtime(RuntimeError),
}

impl From<RuntimeError> for Signal {
    fn from(err: RuntimeError) -> Self {
        Signal::Runtime(err)
    }
}

pub struct Interpreter {
    pub globals: Rc<RefCell<Environment>>,
    environment: Rc<RefCell<Environment>>,
    locals: HashMap<Token, usize>,
    output: Box<dyn Write>,
}

impl Interpreter {
    pub fn new() -> Self {
        Self::with_writer(Box::new(io::stdout()))
    }

    /// Builds an interpreter that writes `print` output to `writer` instead
    /// of the process's real stdout. Production code goes through [`new`],
    /// which wires up `io::stdout()`; tests wire up an in-memory buffer so
    /// they can assert on exactly what a Lox program printed.
    pub fn with_writer(writer: Box<dyn Write>) -> Self {
        let globals = Rc::new(RefCell::new(Environment::default()));

        for native in NativeFunction::get_globals() {
            globals.borrow_mut().define(&native.name.lexeme.clone(), Object::from(native));
        }

        Interpreter {
            globals: Rc::clone(&globals),
            environment: globals,
            locals: HashMap::new(),
            output: writer,
        }
    }

    pub fn interpret(&mut self, statements: &Vec<Stmt>) {
        for statement in statements {
            if let Err(signal) = self.execute(statement) {
                match signal {
                    Signal::Runtime(err) => {
                        err.throw();
                        return;
                    },
                    Signal::Return(_) => unreachable!("return outside of a function body"),
                }
            }
        }
    }

    /// Records how many enclosing scopes separate a variable reference from
    /// the scope that declares it, as determined by the resolver.
    pub fn resolve(&mut self, name: &Token, depth: usize) {
        self.locals.insert(name.clone(), depth);
    }

    fn look_up_variable(&self, name: &Token) -> Result<Object, RuntimeError> {
        match self.locals.get(name) {
            Some(distance) => self.environment.borrow().get_at(*distance, name),
            None => self.globals.borrow().get(name),
        }
    }

    /// Executes a block's statements in a fresh environment enclosing
    /// `environment`, restoring the interpreter's previous environment on
    /// every exit path (including early `return`/error propagation).
    pub fn execute_block(&mut self, statements: &[Stmt], environment: Rc<RefCell<Environment>>) -> Result<(), Signal> {
        let previous = std::mem::replace(&mut self.environment, environment);

        let result = statements.iter().try_for_each(|statement| self.execute(statement));

        self.environment = previous;
        result
    }

    fn execute(&mut self, stmt: &Stmt) -> Result<(), Signal> {
        match stmt {
            Stmt::Expression(data) => {
                self.evaluate(&data.expr)?;
                Ok(())
            },

            Stmt::Print(data) => {
                let value = self.evaluate(&data.expr)?;
                writeln!(self.output, "{value}").expect("writing to the print stream should not fail");
                Ok(())
            },

            Stmt::Var(data) => {
                let value = match &data.initializer {
                    Some(initializer) => self.evaluate(initializer)?,
                    None => Object::from(Literal::Nil),
                };

                self.environment.borrow_mut().define(&data.name.lexeme, value);
                Ok(())
            },

            Stmt::Block(data) => {
                let environment = Environment::new(Some(Rc::clone(&self.environment)));
                self.execute_block(&data.statements, Rc::new(RefCell::new(environment)))
            },

            Stmt::If(data) => {
                if self.evaluate(&data.condition)?.as_bool() {
                    self.execute(&data.then_branch)
                } else if let Some(else_branch) = &data.else_branch {
                    self.execute(else_branch)
                } else {
                    Ok(())
                }
            },

            Stmt::While(data) => {
                while self.evaluate(&data.condition)?.as_bool() {
                    self.execute(&data.body)?;
                }
                Ok(())
            },

            Stmt::Function(data) => {
                let function = Function::new(stmt.clone(), Rc::clone(&self.environment));
                self.environment.borrow_mut().define(&data.name.lexeme, Object::from(function));
                Ok(())
            },

            Stmt::Return(data) => {
                let value = match &data.value {
                    Some(expr) => self.evaluate(expr)?,
                    None => Object::from(Literal::Nil),
                };
                Err(Signal::Return(value))
            },

            Stmt::Class(data) => self.execute_class(data),
        }
    }

    fn execute_class(&mut self, data: &crate::stmt::ClassData) -> Result<(), Signal> {
        let superclass = match &data.superclass {
            Some(superclass_expr) => {
                let value = self.evaluate(superclass_expr)?;
                match value {
                    Object::Class(class) => Some(class),
                    _ => {
                        let Expr::Variable(variable) = superclass_expr else { unreachable!() };
                        return Err(RuntimeError {
                            token: variable.name.clone(),
                            message: "Superclass must be a class".to_string(),
                        }.into());
                    },
                }
            },
            None => None,
        };

        self.environment.borrow_mut().define(&data.name.lexeme, Object::from(Literal::Nil));

        let method_environment = if let Some(superclass) = &superclass {
            let environment = Environment::new(Some(Rc::clone(&self.environment)));
            let environment = Rc::new(RefCell::new(environment));
            environment.borrow_mut().define("super", Object::from(Rc::clone(superclass)));
            environment
        } else {
            Rc::clone(&self.environment)
        };

        let mut methods = HashMap::new();
        for method in &data.methods {
            let Stmt::Function(method_data) = method else { unreachable!() };
            let function = Function::new(method.clone(), Rc::clone(&method_environment));
            methods.insert(method_data.name.lexeme.clone(), function);
        }

        let class = match superclass {
            Some(superclass) => Class::with_superclass(data.name.lexeme.clone(), superclass, methods),
            None => Class::new(data.name.lexeme.clone(), methods),
        };

        self.environment.borrow_mut().assign(&data.name, Object::from(Rc::new(RefCell::new(class))))?;
        Ok(())
    }

    fn evaluate(&mut self, expr: &Expr) -> Result<Object, RuntimeError> {
        match expr {
            Expr::Literal(literal) => Ok(Object::from(literal.clone())),

            Expr::Grouping(data) => self.evaluate(&data.expr),

            Expr::Unary(data) => {
                let right = self.evaluate(&data.expr)?;

                match data.operator.r#type {
                    Type::Minus => (-right).ok_or_else(|| RuntimeError {
                        token: data.operator.clone(),
                        message: "Operand must be a number".to_string(),
                    }),
                    Type::Bang => Ok((!right).expect("logical not is defined for every object")),
                    _ => unreachable!(),
                }
            },

            Expr::Binary(data) => {
                let left = self.evaluate(&data.left)?;
                let right = self.evaluate(&data.right)?;

                match data.operator.r#type {
                    Type::Greater => self.compare(left, right, &data.operator, |o| o == std::cmp::Ordering::Greater),
                    Type::GreaterEqual => self.compare(left, right, &data.operator, |o| o != std::cmp::Ordering::Less),
                    Type::Less => self.compare(left, right, &data.operator, |o| o == std::cmp::Ordering::Less),
                    Type::LessEqual => self.compare(left, right, &data.operator, |o| o != std::cmp::Ordering::Greater),
                    Type::EqualEqual => Ok(Object::from(left == right)),
                    Type::BangEqual => Ok(Object::from(left != right)),
                    Type::Minus => (left - right).ok_or_else(|| RuntimeError {
                        token: data.operator.clone(),
                        message: "Operands must be numbers".to_string(),
                    }),
                    Type::Slash => (left / right).ok_or_else(|| RuntimeError {
                        token: data.operator.clone(),
                        message: "Operands must be numbers".to_string(),
                    }),
                    Type::Star => (left * right).ok_or_else(|| RuntimeError {
                        token: data.operator.clone(),
                        message: "Operands must be numbers".to_string(),
                    }),
                    Type::Plus => (left + right).ok_or_else(|| RuntimeError {
                        token: data.operator.clone(),
                        message: "Operands must be two numbers or two strings".to_string(),
                    }),
                    _ => unreachable!(),
                }
            },

            Expr::Logical(data) => {
                let left = self.evaluate(&data.left)?;
                let truthy = left.as_bool();

                if data.operator.r#type == Type::Or {
                    if truthy { return Ok(left); }
                } else if !truthy {
                    return Ok(left);
                }

                self.evaluate(&data.right)
            },

            Expr::Variable(data) => self.look_up_variable(&data.name),

            Expr::Assign(data) => {
                let value = self.evaluate(&data.value)?;

                match self.locals.get(&data.name) {
                    Some(distance) => self.environment.borrow_mut().assign_at(*distance, &data.name, value.clone()),
                    None => self.globals.borrow_mut().assign(&data.name, value.clone())?,
                }

                Ok(value)
            },

            Expr::Call(data) => {
                let callee = self.evaluate(&data.callee)?;

                let mut arguments = Vec::with_capacity(data.arguments.len());
                for argument in &data.arguments {
                    arguments.push(self.evaluate(argument)?);
                }

                self.call(callee, arguments, &data.paren)
            },

            Expr::Get(data) => {
                let object = self.evaluate(&data.object)?;
                match &object {
                    Object::Instance(instance) => instance.borrow().get(&data.name, &object),
                    _ => Err(RuntimeError {
                        token: data.name.clone(),
                        message: "Only instances have properties".to_string(),
                    }),
                }
            },

            Expr::Set(data) => {
                let object = self.evaluate(&data.object)?;
                match object {
                    Object::Instance(instance) => {
                        let value = self.evaluate(&data.value)?;
                        instance.borrow_mut().set(&data.name, value.clone());
                        Ok(value)
                    },
                    _ => Err(RuntimeError {
                        token: data.name.clone(),
                        message: "Only instances have fields".to_string(),
                    }),
                }
            },

            Expr::This(data) => self.look_up_variable(&data.keyword),

            Expr::Super(data) => {
                let distance = *self.locals.get(&data.keyword)
                    .expect("resolver to have recorded a distance for 'super'");

                let superclass = match self.environment.borrow().get_at(distance, &data.keyword)? {
                    Object::Class(class) => class,
                    _ => unreachable!("'super' always resolves to a class"),
                };

                let this_token = Token::from("this");
                let instance = self.environment.borrow().get_at(distance - 1, &this_token)?;

                let method = superclass.borrow().find_method(&data.method.lexeme).ok_or_else(|| RuntimeError {
                    token: data.method.clone(),
                    message: format!("Undefined property '{}'", data.method.lexeme),
                })?;

                Ok(Object::from(method.bind(instance)))
            },
        }
    }

    fn compare(
        &self,
        left: Object,
        right: Object,
        operator: &Token,
        test: impl Fn(std::cmp::Ordering) -> bool,
    ) -> Result<Object, RuntimeError> {
        left.partial_cmp(&right)
            .map(|ordering| Object::from(test(ordering)))
            .ok_or_else(|| RuntimeError {
                token: operator.clone(),
                message: "Operands must be numbers".to_string(),
            })
    }

    fn call(&mut self, callee: Object, arguments: Vec<Object>, paren: &Token) -> Result<Object, RuntimeError> {
        let arity = match &callee {
            Object::Function(f) => f.arity(),
            Object::NativeFunction(f) => f.arity(),
            Object::Class(c) => c.borrow().arity(),
            _ => {
                return Err(RuntimeError {
                    token: paren.clone(),
                    message: "Can only call functions and classes".to_string(),
                });
            },
        };

        if arguments.len() != arity {
            return Err(RuntimeError {
                token: paren.clone(),
                message: format!("Expected {arity} arguments but got {}", arguments.len()),
            });
        }

        match callee {
            Object::Function(f) => f.call(self, arguments),
            Object::NativeFunction(f) => f.call(self, arguments),
            Object::Class(c) => {
                let instance = Object::from(crate::class::Instance::from(&c));

                if let Some(initializer) = c.borrow().find_method("init") {
                    let bound = initializer.bind(instance.clone());
                    bound.call(self, arguments)?;
                }

                Ok(instance)
            },
            _ => unreachable!(),
        }
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}
