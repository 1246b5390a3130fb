//! Runtime values and the operator table that acts on them.

use std::cell::RefCell;
use std::fmt::{self, Display};
use std::rc::Rc;

use crate::ast::{BinOpKind, Stmts, UnaryOpKind};
use crate::env::Env;
use crate::error::SpylangError;
use crate::position::Span;

/// A number carries either an integer or a float; most arithmetic promotes
/// to float only when one operand already is one (see `Number::promote`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    pub fn as_f64(self) -> f64 {
        match self {
            Number::Int(v) => v as f64,
            Number::Float(v) => v,
        }
    }

    pub fn as_i64(self) -> i64 {
        match self {
            Number::Int(v) => v,
            Number::Float(v) => v as i64,
        }
    }

    pub fn is_zero(self) -> bool {
        match self {
            Number::Int(v) => v == 0,
            Number::Float(v) => v == 0.0,
        }
    }

    fn from_bool(b: bool) -> Number {
        Number::Int(if b { 1 } else { 0 })
    }
}

impl Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(v) => write!(f, "{v}"),
            Number::Float(v) => write!(f, "{v}"),
        }
    }
}

pub type NativeFn = fn(&[Value], &Span, &Env) -> Result<Value, SpylangError>;

/// A closure's captured defining environment, shared so that recursive
/// calls and reassignment through the closure chain all see the same cells.
#[derive(Clone)]
pub struct FunctionValue {
    pub name: Option<String>,
    pub arg_names: Rc<Vec<String>>,
    pub body: Rc<Stmts>,
    pub captured_env: Env,
    pub auto_return: bool,
}

#[derive(Clone)]
pub struct BuiltinValue {
    pub name: &'static str,
    pub arity: usize,
    pub handle: NativeFn,
}

/// A runtime value. `List` is `Rc<RefCell<_>>` so that `add_agent`,
/// `withdraw`, `expand`, and the `+`/`-`/`*` list operators all observe and
/// mutate the same underlying sequence through any alias - mirroring the
/// aliasing that falls out of the original's `List.copy` sharing its
/// `elements` list by reference instead of cloning it.
#[derive(Clone)]
pub enum Value {
    Null,
    Number(Number),
    Str(Rc<str>),
    List(Rc<RefCell<Vec<Value>>>),
    Range(i64, i64),
    Function(Rc<FunctionValue>),
    Builtin(Rc<BuiltinValue>),
}

impl Value {
    pub fn list(elements: Vec<Value>) -> Value {
        Value::List(Rc::new(RefCell::new(elements)))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "Null",
            Value::Number(_) => "Number",
            Value::Str(_) => "Str",
            Value::List(_) => "List",
            Value::Range(_, _) => "Range",
            Value::Function(_) => "Function",
            Value::Builtin(_) => "Builtin",
        }
    }

    /// `Number(0)` and the empty string are false; `Null` is false;
    /// everything else (including empty lists, ranges, functions) is true.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Number(n) => !n.is_zero(),
            Value::Str(s) => !s.is_empty(),
            Value::List(_) | Value::Range(_, _) | Value::Function(_) | Value::Builtin(_) => true,
        }
    }

    fn illegal_operation(&self, op: &str, other: &Value, span: &Span) -> SpylangError {
        SpylangError::runtime(
            span.clone(),
            format!(
                "illegal operation: {} {op} {}",
                self.type_name(),
                other.type_name()
            ),
        )
    }

    pub fn binary_op(
        &self,
        op: BinOpKind,
        other: &Value,
        span: &Span,
        right_span: &Span,
    ) -> Result<Value, SpylangError> {
        use BinOpKind::*;

        match op {
            And => return Ok(Value::Number(Number::from_bool(self.is_truthy() && other.is_truthy()))),
            Or => return Ok(Value::Number(Number::from_bool(self.is_truthy() || other.is_truthy()))),
            _ => {}
        }

        match (self, other) {
            (Value::Number(a), Value::Number(b)) => self.number_op(op, *a, *b, span, right_span),
            (Value::Str(a), Value::Str(b)) => self.str_op(op, a, b, span),
            (Value::Str(s), Value::Number(n)) => self.str_num_op(op, s, *n, span, other),
            (Value::List(_), _) => self.list_op(op, other, span),
            _ => Err(self.illegal_operation(op_symbol(op), other, span)),
        }
    }

    fn number_op(
        &self,
        op: BinOpKind,
        a: Number,
        b: Number,
        span: &Span,
        right_span: &Span,
    ) -> Result<Value, SpylangError> {
        use BinOpKind::*;

        let is_float = matches!(a, Number::Float(_)) || matches!(b, Number::Float(_));

        Ok(match op {
            Add => Value::Number(if is_float {
                Number::Float(a.as_f64() + b.as_f64())
            } else {
                Number::Int(a.as_i64() + b.as_i64())
            }),
            Sub => Value::Number(if is_float {
                Number::Float(a.as_f64() - b.as_f64())
            } else {
                Number::Int(a.as_i64() - b.as_i64())
            }),
            Mul => Value::Number(if is_float {
                Number::Float(a.as_f64() * b.as_f64())
            } else {
                Number::Int(a.as_i64() * b.as_i64())
            }),
            Div => {
                if b.is_zero() {
                    return Err(SpylangError::runtime(right_span.clone(), "Division by zero"));
                }
                Value::Number(Number::Float(a.as_f64() / b.as_f64()))
            }
            Mod => {
                if b.is_zero() {
                    return Err(SpylangError::runtime(right_span.clone(), "Division by zero"));
                }
                Value::Number(if is_float {
                    Number::Float(a.as_f64() % b.as_f64())
                } else {
                    Number::Int(a.as_i64() % b.as_i64())
                })
            }
            Pow => Value::Number(Number::Float(a.as_f64().powf(b.as_f64()))),
            Eq => Value::Number(Number::from_bool(a.as_f64() == b.as_f64())),
            Ne => Value::Number(Number::from_bool(a.as_f64() != b.as_f64())),
            Lt => Value::Number(Number::from_bool(a.as_f64() < b.as_f64())),
            Gt => Value::Number(Number::from_bool(a.as_f64() > b.as_f64())),
            Lte => Value::Number(Number::from_bool(a.as_f64() <= b.as_f64())),
            Gte => Value::Number(Number::from_bool(a.as_f64() >= b.as_f64())),
            And | Or => unreachable!("handled before dispatch"),
        })
    }

    fn str_op(&self, op: BinOpKind, a: &Rc<str>, b: &Rc<str>, span: &Span) -> Result<Value, SpylangError> {
        match op {
            BinOpKind::Add => Ok(Value::Str(Rc::from(format!("{a}{b}")))),
            BinOpKind::Eq => Ok(Value::Number(Number::from_bool(a == b))),
            BinOpKind::Ne => Ok(Value::Number(Number::from_bool(a != b))),
            _ => Err(SpylangError::runtime(
                span.clone(),
                format!("illegal operation: Str {} Str", op_symbol(op)),
            )),
        }
    }

    fn str_num_op(
        &self,
        op: BinOpKind,
        s: &Rc<str>,
        n: Number,
        span: &Span,
        other: &Value,
    ) -> Result<Value, SpylangError> {
        match op {
            BinOpKind::Mul => Ok(Value::Str(Rc::from(s.repeat(n.as_i64().max(0) as usize)))),
            _ => Err(self.illegal_operation(op_symbol(op), other, span)),
        }
    }

    fn list_op(&self, op: BinOpKind, other: &Value, span: &Span) -> Result<Value, SpylangError> {
        let Value::List(list) = self else {
            unreachable!("list_op only called on Value::List")
        };

        match op {
            BinOpKind::Add => {
                list.borrow_mut().push(other.clone());
                Ok(self.clone())
            }
            BinOpKind::Sub => {
                let Value::Number(n) = other else {
                    return Err(self.illegal_operation("-", other, span));
                };
                let index = n.as_i64();
                let mut elements = list.borrow_mut();
                if index < 0 || index as usize >= elements.len() {
                    return Err(SpylangError::runtime(
                        span.clone(),
                        "element at this index could not be removed from list because index is out of bounds",
                    ));
                }
                elements.remove(index as usize);
                drop(elements);
                Ok(self.clone())
            }
            BinOpKind::Mul => {
                let Value::List(other_list) = other else {
                    return Err(self.illegal_operation("*", other, span));
                };
                list.borrow_mut().extend(other_list.borrow().iter().cloned());
                Ok(self.clone())
            }
            BinOpKind::Div => {
                let Value::Number(n) = other else {
                    return Err(self.illegal_operation("/", other, span));
                };
                let index = n.as_i64();
                let elements = list.borrow();
                if index < 0 || index as usize >= elements.len() {
                    return Err(SpylangError::runtime(
                        span.clone(),
                        "element at this index could not be retrieved from list because index is out of bounds",
                    ));
                }
                Ok(elements[index as usize].clone())
            }
            _ => Err(self.illegal_operation(op_symbol(op), other, span)),
        }
    }

    pub fn unary_op(&self, op: UnaryOpKind, span: &Span) -> Result<Value, SpylangError> {
        match (op, self) {
            (UnaryOpKind::Neg, Value::Number(Number::Int(v))) => Ok(Value::Number(Number::Int(-v))),
            (UnaryOpKind::Neg, Value::Number(Number::Float(v))) => Ok(Value::Number(Number::Float(-v))),
            (UnaryOpKind::Neg, other) => Err(SpylangError::runtime(
                span.clone(),
                format!("illegal operation: -{}", other.type_name()),
            )),
            (UnaryOpKind::Not, value) => Ok(Value::Number(Number::from_bool(!value.is_truthy()))),
        }
    }
}

fn op_symbol(op: BinOpKind) -> &'static str {
    use BinOpKind::*;
    match op {
        Add => "+",
        Sub => "-",
        Mul => "*",
        Div => "/",
        Mod => "%",
        Pow => "^",
        Eq => "==",
        Ne => "!=",
        Lt => "<",
        Gt => ">",
        Lte => "<=",
        Gte => ">=",
        And => "and",
        Or => "or",
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Number(n) => write!(f, "{n}"),
            Value::Str(s) => write!(f, "{s}"),
            Value::List(elements) => {
                let elements = elements.borrow();
                let rendered: Vec<String> = elements.iter().map(|v| v.to_string()).collect();
                write!(f, "{}", rendered.join(", "))
            }
            Value::Range(start, end) => write!(f, "{start}..{end}"),
            Value::Function(func) => match &func.name {
                Some(name) => write!(f, "<mission {name}>"),
                None => write!(f, "<anonymous mission>"),
            },
            Value::Builtin(builtin) => write!(f, "<built-in mission {}>", builtin.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::Position;

    fn dummy_span() -> Span {
        let file: Rc<str> = Rc::from("<test>");
        let source: Rc<str> = Rc::from("");
        let pos = Position::start_of(file, source);
        Span::point(pos)
    }

    #[test]
    fn int_plus_int_stays_int() {
        let span = dummy_span();
        let result = Value::Number(Number::Int(1))
            .binary_op(BinOpKind::Add, &Value::Number(Number::Int(2)), &span, &span)
            .unwrap();
        assert!(matches!(result, Value::Number(Number::Int(3))));
    }

    #[test]
    fn int_div_int_promotes_to_float() {
        let span = dummy_span();
        let result = Value::Number(Number::Int(4))
            .binary_op(BinOpKind::Div, &Value::Number(Number::Int(2)), &span, &span)
            .unwrap();
        assert!(matches!(result, Value::Number(Number::Float(f)) if f == 2.0));
    }

    #[test]
    fn division_by_zero_is_a_runtime_error() {
        let span = dummy_span();
        let err = Value::Number(Number::Int(4))
            .binary_op(BinOpKind::Div, &Value::Number(Number::Int(0)), &span, &span)
            .unwrap_err();
        assert!(matches!(err, SpylangError::Runtime { .. }));
    }

    #[test]
    fn str_times_number_repeats() {
        let span = dummy_span();
        let result = Value::Str(Rc::from("ab"))
            .binary_op(BinOpKind::Mul, &Value::Number(Number::Int(3)), &span, &span)
            .unwrap();
        assert!(matches!(result, Value::Str(s) if &*s == "ababab"));
    }

    #[test]
    fn list_add_mutates_in_place_and_aliases() {
        let span = dummy_span();
        let list = Value::list(vec![Value::Number(Number::Int(1))]);
        let alias = list.clone();
        list.binary_op(BinOpKind::Add, &Value::Number(Number::Int(2)), &span, &span)
            .unwrap();

        let Value::List(cell) = alias else { panic!("expected list") };
        assert_eq!(cell.borrow().len(), 2);
    }

    #[test]
    fn empty_string_and_zero_are_falsy() {
        assert!(!Value::Str(Rc::from("")).is_truthy());
        assert!(!Value::Number(Number::Int(0)).is_truthy());
        assert!(Value::Str(Rc::from("x")).is_truthy());
    }
}
