//! The interpreter: frame layout, opcode dispatch, and self-class calls.

use retread_model::{Class, Insn, JType, Literal, Method, Opcode};
use retread_profile::{Recorder, HOOK_OWNER, ON_ENTER_NAME, ON_EXIT_NAME};

use crate::error::RuntimeError;
use crate::value::Value;

/// Nested self-call limit. Deep enough for honest workloads, shallow
/// enough that runaway recursion fails fast.
pub const MAX_CALL_DEPTH: usize = 256;

/// Run a method of `class`. Instance methods take their receiver as
/// `args[0]`, then the declared arguments in order.
pub fn run_method(
    class: &Class,
    name: &str,
    desc: &str,
    args: Vec<Value>,
) -> Result<Value, RuntimeError> {
    Vm {
        class,
        recorder: None,
    }
    .invoke(name, desc, args, 0)
}

/// Like [`run_method`], with hook calls routed into `recorder`.
pub fn run_with_recorder(
    class: &Class,
    name: &str,
    desc: &str,
    args: Vec<Value>,
    recorder: &mut Recorder,
) -> Result<Value, RuntimeError> {
    Vm {
        class,
        recorder: Some(recorder),
    }
    .invoke(name, desc, args, 0)
}

struct Vm<'a> {
    class: &'a Class,
    recorder: Option<&'a mut Recorder>,
}

impl<'a> Vm<'a> {
    fn invoke(
        &mut self,
        name: &str,
        desc: &str,
        args: Vec<Value>,
        depth: usize,
    ) -> Result<Value, RuntimeError> {
        if depth >= MAX_CALL_DEPTH {
            return Err(RuntimeError::CallDepthExceeded {
                limit: MAX_CALL_DEPTH,
            });
        }
        let class = self.class;
        let method = class
            .method(name, desc)
            .ok_or_else(|| RuntimeError::NoSuchMethod {
                name: name.to_string(),
                desc: desc.to_string(),
            })?;
        let sig = method.sig()?;
        let expected = sig.args.len() + usize::from(!method.is_static);
        if args.len() != expected {
            return Err(RuntimeError::WrongArgumentCount {
                name: name.to_string(),
                expected,
                got: args.len(),
            });
        }

        // Lay the arguments out in their local slots; wide types leave
        // their second slot unoccupied.
        let mut locals: Vec<Option<Value>> = Vec::new();
        let mut incoming = args.into_iter();
        if !method.is_static {
            set_local(&mut locals, 0, incoming.next().unwrap_or(Value::Null));
        }
        for i in 0..sig.args.len() {
            let slot = sig.arg_slot(i, method.is_static);
            set_local(&mut locals, slot, incoming.next().unwrap_or(Value::Null));
        }

        log::trace!("enter {}{} (depth {depth})", method.name, method.desc);
        self.run(method, locals, depth)
    }

    fn run(
        &mut self,
        method: &Method,
        mut locals: Vec<Option<Value>>,
        depth: usize,
    ) -> Result<Value, RuntimeError> {
        let stream = &method.stream;
        let mut stack: Vec<Value> = Vec::new();
        let mut pc = 0usize;

        loop {
            let Some(insn) = stream.get(pc) else {
                return Err(RuntimeError::FellOffEnd);
            };
            let at = pc;
            pc += 1;

            match insn {
                Insn::Label(_) | Insn::Frame | Insn::Line(_) => {}

                Insn::Simple(op) => match op {
                    Opcode::Nop => {}
                    Opcode::AconstNull => stack.push(Value::Null),
                    Opcode::IconstM1 => stack.push(Value::Int(-1)),
                    Opcode::Iconst0 => stack.push(Value::Int(0)),
                    Opcode::Iconst1 => stack.push(Value::Int(1)),
                    Opcode::Iconst2 => stack.push(Value::Int(2)),
                    Opcode::Iconst3 => stack.push(Value::Int(3)),
                    Opcode::Iconst4 => stack.push(Value::Int(4)),
                    Opcode::Iconst5 => stack.push(Value::Int(5)),
                    Opcode::Lconst0 => stack.push(Value::Long(0)),
                    Opcode::Lconst1 => stack.push(Value::Long(1)),
                    Opcode::Fconst0 => stack.push(Value::Float(0.0)),
                    Opcode::Fconst1 => stack.push(Value::Float(1.0)),
                    Opcode::Fconst2 => stack.push(Value::Float(2.0)),
                    Opcode::Dconst0 => stack.push(Value::Double(0.0)),
                    Opcode::Dconst1 => stack.push(Value::Double(1.0)),

                    Opcode::Pop => {
                        pop(&mut stack, at)?;
                    }
                    Opcode::Dup => {
                        let v = pop(&mut stack, at)?;
                        stack.push(v.clone());
                        stack.push(v);
                    }
                    Opcode::Swap => {
                        let b = pop(&mut stack, at)?;
                        let a = pop(&mut stack, at)?;
                        stack.push(b);
                        stack.push(a);
                    }

                    Opcode::Iadd => int_binop(&mut stack, at, i32::wrapping_add)?,
                    Opcode::Isub => int_binop(&mut stack, at, i32::wrapping_sub)?,
                    Opcode::Imul => int_binop(&mut stack, at, i32::wrapping_mul)?,
                    Opcode::Idiv => {
                        let b = pop_int(&mut stack, at)?;
                        let a = pop_int(&mut stack, at)?;
                        if b == 0 {
                            return Err(RuntimeError::DivisionByZero { at });
                        }
                        stack.push(Value::Int(a.wrapping_div(b)));
                    }
                    Opcode::Irem => {
                        let b = pop_int(&mut stack, at)?;
                        let a = pop_int(&mut stack, at)?;
                        if b == 0 {
                            return Err(RuntimeError::DivisionByZero { at });
                        }
                        stack.push(Value::Int(a.wrapping_rem(b)));
                    }
                    Opcode::Ineg => {
                        let a = pop_int(&mut stack, at)?;
                        stack.push(Value::Int(a.wrapping_neg()));
                    }

                    Opcode::Ladd => long_binop(&mut stack, at, i64::wrapping_add)?,
                    Opcode::Lsub => long_binop(&mut stack, at, i64::wrapping_sub)?,
                    Opcode::Lmul => long_binop(&mut stack, at, i64::wrapping_mul)?,
                    Opcode::Lcmp => {
                        let b = pop_long(&mut stack, at)?;
                        let a = pop_long(&mut stack, at)?;
                        stack.push(Value::Int(match a.cmp(&b) {
                            std::cmp::Ordering::Less => -1,
                            std::cmp::Ordering::Equal => 0,
                            std::cmp::Ordering::Greater => 1,
                        }));
                    }
                    Opcode::I2l => {
                        let a = pop_int(&mut stack, at)?;
                        stack.push(Value::Long(a as i64));
                    }
                    Opcode::L2i => {
                        let a = pop_long(&mut stack, at)?;
                        stack.push(Value::Int(a as i32));
                    }

                    Opcode::Arraylength => {
                        let arr = pop_array(&mut stack, at)?;
                        let len = arr.borrow().len();
                        stack.push(Value::Int(len as i32));
                    }
                    Opcode::Iaload | Opcode::Aaload | Opcode::Baload | Opcode::Caload
                    | Opcode::Saload | Opcode::Laload | Opcode::Faload | Opcode::Daload => {
                        let index = pop_int(&mut stack, at)?;
                        let arr = pop_array(&mut stack, at)?;
                        let items = arr.borrow();
                        let v = usize::try_from(index)
                            .ok()
                            .and_then(|i| items.get(i).cloned())
                            .ok_or(RuntimeError::IndexOutOfBounds {
                                at,
                                index,
                                length: items.len(),
                            })?;
                        stack.push(v);
                    }
                    Opcode::Iastore | Opcode::Aastore | Opcode::Bastore | Opcode::Castore
                    | Opcode::Sastore | Opcode::Lastore | Opcode::Fastore | Opcode::Dastore => {
                        let value = pop(&mut stack, at)?;
                        let index = pop_int(&mut stack, at)?;
                        let arr = pop_array(&mut stack, at)?;
                        let mut items = arr.borrow_mut();
                        let length = items.len();
                        let slot = usize::try_from(index)
                            .ok()
                            .filter(|&i| i < length)
                            .ok_or(RuntimeError::IndexOutOfBounds { at, index, length })?;
                        items[slot] = value;
                    }

                    Opcode::Ireturn
                    | Opcode::Lreturn
                    | Opcode::Freturn
                    | Opcode::Dreturn
                    | Opcode::Areturn => {
                        let v = pop(&mut stack, at)?;
                        log::trace!("exit {}{} (depth {depth})", method.name, method.desc);
                        return Ok(v);
                    }
                    Opcode::Return => {
                        log::trace!("exit {}{} (depth {depth})", method.name, method.desc);
                        return Ok(Value::Null);
                    }
                    Opcode::Athrow => return Err(RuntimeError::Thrown { at }),

                    other => {
                        return Err(RuntimeError::UnsupportedOpcode {
                            at,
                            mnemonic: other.mnemonic(),
                        })
                    }
                },

                Insn::Imm { op, value } => match op {
                    Opcode::Bipush | Opcode::Sipush => stack.push(Value::Int(*value)),
                    Opcode::Newarray => {
                        let len = pop_int(&mut stack, at)?;
                        let len = usize::try_from(len).map_err(|_| {
                            RuntimeError::IndexOutOfBounds {
                                at,
                                index: len,
                                length: 0,
                            }
                        })?;
                        stack.push(Value::int_array(len));
                    }
                    other => {
                        return Err(RuntimeError::UnsupportedOpcode {
                            at,
                            mnemonic: other.mnemonic(),
                        })
                    }
                },

                Insn::Ldc(lit) => stack.push(match lit {
                    Literal::Int(v) => match i32::try_from(*v) {
                        Ok(v) => Value::Int(v),
                        Err(_) => Value::Long(*v),
                    },
                    Literal::Float(v) => Value::Double(*v),
                    Literal::Str(s) => Value::Str(s.clone()),
                    Literal::Class(name) => Value::Str(name.clone()),
                }),

                Insn::Var { op, slot } => match op {
                    Opcode::Iload | Opcode::Lload | Opcode::Fload | Opcode::Dload
                    | Opcode::Aload => {
                        let v = get_local(&locals, *slot)
                            .ok_or(RuntimeError::UninitializedLocal { at, slot: *slot })?;
                        stack.push(v);
                    }
                    Opcode::Istore | Opcode::Lstore | Opcode::Fstore | Opcode::Dstore
                    | Opcode::Astore => {
                        let v = pop(&mut stack, at)?;
                        set_local(&mut locals, *slot, v);
                    }
                    other => {
                        return Err(RuntimeError::UnsupportedOpcode {
                            at,
                            mnemonic: other.mnemonic(),
                        })
                    }
                },

                Insn::Iinc { slot, delta } => {
                    match get_local(&locals, *slot) {
                        Some(Value::Int(v)) => {
                            set_local(&mut locals, *slot, Value::Int(v.wrapping_add(*delta as i32)))
                        }
                        Some(_) => return Err(RuntimeError::TypeMismatch { at }),
                        None => {
                            return Err(RuntimeError::UninitializedLocal { at, slot: *slot })
                        }
                    };
                }

                Insn::Jump { op, target } => {
                    let taken = match op {
                        Opcode::Goto => true,
                        Opcode::Ifeq => pop_int(&mut stack, at)? == 0,
                        Opcode::Ifne => pop_int(&mut stack, at)? != 0,
                        Opcode::Iflt => pop_int(&mut stack, at)? < 0,
                        Opcode::Ifge => pop_int(&mut stack, at)? >= 0,
                        Opcode::Ifgt => pop_int(&mut stack, at)? > 0,
                        Opcode::Ifle => pop_int(&mut stack, at)? <= 0,
                        Opcode::IfIcmpeq => int_pair(&mut stack, at, |a, b| a == b)?,
                        Opcode::IfIcmpne => int_pair(&mut stack, at, |a, b| a != b)?,
                        Opcode::IfIcmplt => int_pair(&mut stack, at, |a, b| a < b)?,
                        Opcode::IfIcmpge => int_pair(&mut stack, at, |a, b| a >= b)?,
                        Opcode::IfIcmpgt => int_pair(&mut stack, at, |a, b| a > b)?,
                        Opcode::IfIcmple => int_pair(&mut stack, at, |a, b| a <= b)?,
                        Opcode::IfAcmpeq => {
                            let b = pop(&mut stack, at)?;
                            let a = pop(&mut stack, at)?;
                            a == b
                        }
                        Opcode::IfAcmpne => {
                            let b = pop(&mut stack, at)?;
                            let a = pop(&mut stack, at)?;
                            a != b
                        }
                        Opcode::Ifnull => pop(&mut stack, at)? == Value::Null,
                        Opcode::Ifnonnull => pop(&mut stack, at)? != Value::Null,
                        other => {
                            return Err(RuntimeError::UnsupportedOpcode {
                                at,
                                mnemonic: other.mnemonic(),
                            })
                        }
                    };
                    if taken {
                        pc = stream.resolve(*target)?;
                    }
                }

                Insn::LookupSwitch { pairs, default } => {
                    let key = pop_int(&mut stack, at)?;
                    let target = pairs
                        .iter()
                        .find(|(k, _)| *k == key)
                        .map(|(_, l)| *l)
                        .unwrap_or(*default);
                    pc = stream.resolve(target)?;
                }
                Insn::TableSwitch {
                    low,
                    targets,
                    default,
                } => {
                    let key = pop_int(&mut stack, at)?;
                    let target = usize::try_from(key.wrapping_sub(*low))
                        .ok()
                        .and_then(|i| targets.get(i).copied())
                        .unwrap_or(*default);
                    pc = stream.resolve(target)?;
                }

                Insn::Type { op, ty: _ } => match op {
                    Opcode::Anewarray => {
                        let len = pop_int(&mut stack, at)?;
                        let len = usize::try_from(len).map_err(|_| {
                            RuntimeError::IndexOutOfBounds {
                                at,
                                index: len,
                                length: 0,
                            }
                        })?;
                        stack.push(Value::array_of(vec![Value::Null; len]));
                    }
                    other => {
                        return Err(RuntimeError::UnsupportedOpcode {
                            at,
                            mnemonic: other.mnemonic(),
                        })
                    }
                },

                Insn::MethodRef {
                    owner, name, desc, ..
                } => self.call(&mut stack, at, owner, name, desc, depth)?,

                Insn::Field { op, .. } => {
                    return Err(RuntimeError::UnsupportedOpcode {
                        at,
                        mnemonic: op.mnemonic(),
                    })
                }
                Insn::MultiANewArray { .. } => {
                    return Err(RuntimeError::UnsupportedOpcode {
                        at,
                        mnemonic: "MULTIANEWARRAY",
                    })
                }
            }
        }
    }

    /// Dispatch a call: hook calls go to the recorder, self-class calls
    /// recurse, anything else is out of scope.
    fn call(
        &mut self,
        stack: &mut Vec<Value>,
        at: usize,
        owner: &str,
        name: &str,
        desc: &str,
        depth: usize,
    ) -> Result<(), RuntimeError> {
        if owner == HOOK_OWNER {
            if name == ON_ENTER_NAME {
                let desc_v = pop(stack, at)?;
                let name_v = pop(stack, at)?;
                let owner_v = pop(stack, at)?;
                if let Some(rec) = self.recorder.as_deref_mut() {
                    match (&owner_v, &name_v, &desc_v) {
                        (Value::Str(o), Value::Str(n), Value::Str(d)) => rec.on_enter(o, n, d),
                        _ => return Err(RuntimeError::TypeMismatch { at }),
                    }
                }
                return Ok(());
            }
            if name == ON_EXIT_NAME {
                if let Some(rec) = self.recorder.as_deref_mut() {
                    rec.on_exit()?;
                }
                return Ok(());
            }
            return Err(RuntimeError::UnsupportedCall {
                at,
                owner: owner.to_string(),
                name: name.to_string(),
            });
        }

        let class = self.class;
        if owner != class.name {
            return Err(RuntimeError::UnsupportedCall {
                at,
                owner: owner.to_string(),
                name: name.to_string(),
            });
        }
        let callee = class
            .method(name, desc)
            .ok_or_else(|| RuntimeError::NoSuchMethod {
                name: name.to_string(),
                desc: desc.to_string(),
            })?;
        let sig = callee.sig()?;
        let argc = sig.args.len() + usize::from(!callee.is_static);
        let mut args = Vec::with_capacity(argc);
        for _ in 0..argc {
            args.push(pop(stack, at)?);
        }
        args.reverse();
        let result = self.invoke(name, desc, args, depth + 1)?;
        if sig.ret != JType::Void {
            stack.push(result);
        }
        Ok(())
    }
}

fn pop(stack: &mut Vec<Value>, at: usize) -> Result<Value, RuntimeError> {
    stack.pop().ok_or(RuntimeError::StackUnderflow { at })
}

fn pop_int(stack: &mut Vec<Value>, at: usize) -> Result<i32, RuntimeError> {
    match pop(stack, at)? {
        Value::Int(v) => Ok(v),
        _ => Err(RuntimeError::TypeMismatch { at }),
    }
}

fn pop_long(stack: &mut Vec<Value>, at: usize) -> Result<i64, RuntimeError> {
    match pop(stack, at)? {
        Value::Long(v) => Ok(v),
        _ => Err(RuntimeError::TypeMismatch { at }),
    }
}

fn pop_array(
    stack: &mut Vec<Value>,
    at: usize,
) -> Result<std::rc::Rc<std::cell::RefCell<Vec<Value>>>, RuntimeError> {
    match pop(stack, at)? {
        Value::Array(items) => Ok(items),
        _ => Err(RuntimeError::TypeMismatch { at }),
    }
}

fn int_binop(
    stack: &mut Vec<Value>,
    at: usize,
    f: impl Fn(i32, i32) -> i32,
) -> Result<(), RuntimeError> {
    let b = pop_int(stack, at)?;
    let a = pop_int(stack, at)?;
    stack.push(Value::Int(f(a, b)));
    Ok(())
}

fn long_binop(
    stack: &mut Vec<Value>,
    at: usize,
    f: impl Fn(i64, i64) -> i64,
) -> Result<(), RuntimeError> {
    let b = pop_long(stack, at)?;
    let a = pop_long(stack, at)?;
    stack.push(Value::Long(f(a, b)));
    Ok(())
}

fn int_pair(
    stack: &mut Vec<Value>,
    at: usize,
    f: impl Fn(i32, i32) -> bool,
) -> Result<bool, RuntimeError> {
    let b = pop_int(stack, at)?;
    let a = pop_int(stack, at)?;
    Ok(f(a, b))
}

fn get_local(locals: &[Option<Value>], slot: u16) -> Option<Value> {
    locals.get(slot as usize).and_then(|v| v.clone())
}

fn set_local(locals: &mut Vec<Option<Value>>, slot: u16, value: Value) {
    let slot = slot as usize;
    if locals.len() <= slot {
        locals.resize(slot + 1, None);
    }
    locals[slot] = Some(value);
}
