use std::fmt::Debug;
use std::cell::RefCell;
use std::fmt::Display;
use std::rc::Rc;

use crate::environment::Environment;
use crate::interpreter::{Interpreter, Signal};
use crate::object::{Object, Callable};
use crate::error::RuntimeError;
use crate::stmt::Stmt;
use crate::token::{Token, Type, Location};
use crate::literal::Literal;

/// A user-defined function or method. Holds its declaration, the
/// environment captured at declaration time (its closure), and whether it is
/// an `init` method (whose return value is always the bound instance,
/// regardless of what its body returns).
#[derive(Debug, Clone)]
pub struct Function {
    pub name: Token,
    pub params: Vec<Token>,
    pub body: Vec<Stmt>,
    pub closure: Rc<RefCell<Environment>>,
    pub is_initializer: bool,
}

/// Two functions are equal when they come from the same declaration and
/// share the same closure — comparing closures deeply would defeat the
/// purpose of reference-identity equality for callables (see `object.rs`).
impl PartialEq for Function {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.params == other.params
            && self.body == other.body
            && self.is_initializer == other.is_initializer
            && Rc::ptr_eq(&self.closure, &other.closure)
    }
}

impl Function {
    pub fn new(declaration: Stmt, closure: Rc<RefCell<Environment>>) -> Self {
        let Stmt::Function(data) = declaration else {
            panic!("Cannot construct Function from {declaration:?}");
        };
        let is_initializer = data.name.lexeme == "init";
        Function { name: data.name, params: data.params, body: data.body, closure, is_initializer }
    }

    /// Wraps this method in a fresh environment enclosing its original
    /// closure, with `this` bound to `instance`. Binding happens on every
    /// property access, so method identity is not preserved across gets.
    pub fn bind(&self, instance: Object) -> Self {
        let mut environment = Environment::new(Some(Rc::clone(&self.closure)));
        environment.define("this", instance);

        Function {
            name: self.name.clone(),
            params: self.params.clone(),
            body: self.body.clone(),
            closure: Rc::new(RefCell::new(environment)),
            is_initializer: self.is_initializer,
        }
    }
}

impl Callable for Function {
    fn call(&self, interpreter: &mut Interpreter, arguments: Vec<Object>) -> Result<Object, RuntimeError> {
        let mut environment = Environment::new(Some(Rc::clone(&self.closure)));

        self.params.iter().zip(arguments.iter()).for_each(|(param, arg)| {
            environment.define(&param.lexeme, arg.to_owned());
        });

        let result = interpreter.execute_block(&self.body, Rc::new(RefCell::new(environment)));

        if self.is_initializer {
            // `init` always yields the bound instance, regardless of any
            // explicit `return` inside its body (or whether it returned at
            // all).
            if let Err(Signal::Runtime(err)) = result {
                return Err(err);
            }
            return self.closure.borrow().get_at(0, &Token::from("this"));
        }

        match result {
            Ok(()) => Ok(Object::from(Literal::Nil)),
            Err(Signal::Return(value)) => Ok(value),
            Err(Signal::Runtime(err)) => Err(err),
        }
    }

    fn arity(&self) -> usize {
        self.params.len()
    }
}

impl Display for Function {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<fn {}>", self.name.lexeme)
    }
}

/// A built-in function implemented in the host language rather than Lox.
#[derive(Clone, PartialEq)]
pub struct NativeFunction {
    pub name: Token,
    pub arity: usize,
    pub function: fn(&mut Interpreter, Vec<Object>) -> Result<Object, RuntimeError>,
}

impl Callable for NativeFunction {
    fn call(&self, interpreter: &mut Interpreter, arguments: Vec<Object>) -> Result<Object, RuntimeError> {
        (self.function)(interpreter, arguments)
    }

    fn arity(&self) -> usize {
        self.arity
    }
}

impl NativeFunction {
    /// The fixed set of natives installed in the global environment at
    /// startup. `clock` is the only one the language defines.
    pub fn get_globals() -> Vec<NativeFunction> {
        vec![
            NativeFunction {
                name: Token::new(Type::Identifier, "clock".to_owned(), None, Location::new(0, 0)),
                arity: 0,
                function: |_, _| {
                    let now = std::time::SystemTime::now()
                        .duration_since(std::time::UNIX_EPOCH)
                        .unwrap()
                        .as_millis();
                    Ok(Object::from(now as f64))
                },
            },
        ]
    }
}

impl Display for NativeFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<native fn {}>", self.name.lexeme)
    }
}

impl Debug for NativeFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<native fn {}>", self.name.lexeme)
    }
}
