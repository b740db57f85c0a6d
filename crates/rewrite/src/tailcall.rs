//! Tail-recursion detection and the loop rewrite.
//!
//! A call is tail recursive when it targets the enclosing method itself
//! (same owner, name, and descriptor) and the literal next stream entry
//! is the return opcode matching the declared return type. The analyzer
//! walks the whole stream and reports the state after the final
//! executable instruction; the rewriter transforms the first qualifying
//! site it finds. That first-vs-last asymmetry is inherited behavior and
//! is pinned down by tests rather than resolved.

use retread_model::{Class, Insn, Method, Opcode};

use crate::error::RewriteError;

/// Does the method end in a recursive tail call?
///
/// Single forward walk. Markers carry the running answer forward
/// unchanged; a qualifying self-call followed by its matching return
/// sets it; every other executable instruction clears it.
pub fn is_tail_recursive(owner: &str, method: &Method) -> bool {
    let Ok(sig) = method.sig() else {
        return false;
    };
    let ret_op = sig.ret.return_opcode();
    let insns: Vec<&Insn> = method.stream.iter().collect();

    let mut tail_call = false;
    let mut i = 0;
    while i < insns.len() {
        match insns[i] {
            Insn::MethodRef {
                owner: o,
                name,
                desc,
                ..
            } if o == owner && *name == method.name && *desc == method.desc => {
                if i + 1 < insns.len() {
                    tail_call = matches!(insns[i + 1], Insn::Simple(op) if *op == ret_op);
                    // The entry after the call has been examined; resume
                    // past it.
                    i += 2;
                    continue;
                }
                // A self-call as the very last entry has no return after it.
                tail_call = false;
            }
            insn if insn.is_marker() => {}
            _ => tail_call = false,
        }
        i += 1;
    }
    tail_call
}

/// Indices of the methods in `class` the analyzer approves.
pub fn tail_recursive_methods(class: &Class) -> Vec<usize> {
    class
        .methods
        .iter()
        .enumerate()
        .filter(|(_, m)| is_tail_recursive(&class.name, m))
        .map(|(i, _)| i)
        .collect()
}

/// Rewrite the first qualifying self-call into argument stores plus a
/// jump back to the start of the method body.
///
/// The call pushes its arguments in declaration order, so they are
/// popped back into the argument slots in reverse order; instance
/// methods then discard the receiver the call had pushed. One site per
/// invocation.
pub fn optimize(owner: &str, method: &mut Method) -> Result<(), RewriteError> {
    let sig = method.sig()?;
    let ret_op = sig.ret.return_opcode();

    let mut first_label = None;
    let mut i = 0;
    while i < method.stream.len() {
        if first_label.is_none() {
            if let Some(Insn::Label(l)) = method.stream.get(i) {
                first_label = Some(*l);
            }
        }

        let self_call = matches!(
            method.stream.get(i),
            Some(Insn::MethodRef { owner: o, name, desc, .. })
                if o == owner && *name == method.name && *desc == method.desc
        );
        if !self_call || i + 1 >= method.stream.len() {
            i += 1;
            continue;
        }
        let returns_result =
            matches!(method.stream.get(i + 1), Some(Insn::Simple(op)) if *op == ret_op);
        if !returns_result {
            // Not returning the call's result; this site cannot become a
            // jump. The follow-up entry has already been examined.
            i += 2;
            continue;
        }

        // The loop head is the first label of the body, minting one when
        // the method had none before the call site.
        let head = match first_label {
            Some(l) => l,
            None => {
                let l = method.stream.fresh_label();
                method.stream.insert(0, Insn::Label(l));
                i += 1;
                l
            }
        };

        method.stream.remove(i); // the call
        method.stream.remove(i); // its return

        let mut at = i;
        for arg in (0..sig.args.len()).rev() {
            method.stream.insert(
                at,
                Insn::Var {
                    op: sig.args[arg].store_opcode(),
                    slot: sig.arg_slot(arg, method.is_static),
                },
            );
            at += 1;
        }
        if !method.is_static {
            // The receiver the call pushed is still on the stack.
            method.stream.insert(at, Insn::Simple(Opcode::Pop));
            at += 1;
        }
        method.stream.insert(
            at,
            Insn::Jump {
                op: Opcode::Goto,
                target: head,
            },
        );
        return Ok(());
    }

    Err(RewriteError::NotTailRecursive {
        name: method.name.clone(),
        desc: method.desc.clone(),
    })
}

/// Rewrite every method the analyzer approves; returns their names.
pub fn optimize_class(class: &mut Class) -> Vec<String> {
    let owner = class.name.clone();
    let mut rewritten = Vec::new();
    for method in &mut class.methods {
        if !is_tail_recursive(&owner, method) {
            continue;
        }
        match optimize(&owner, method) {
            Ok(()) => {
                log::debug!("rewrote tail call in {}{}", method.name, method.desc);
                rewritten.push(method.name.clone());
            }
            Err(err) => {
                // Unreachable for an approved method, but never silent.
                log::warn!("could not rewrite {}{}: {err}", method.name, method.desc);
            }
        }
    }
    rewritten
}

#[cfg(test)]
mod tests {
    use super::*;
    use retread_model::{InsnStream, Label, Opcode};

    const OWNER: &str = "lab/Example";

    fn self_call(method: &Method) -> Insn {
        Insn::MethodRef {
            op: if method.is_static {
                Opcode::Invokestatic
            } else {
                Opcode::Invokevirtual
            },
            owner: OWNER.to_string(),
            name: method.name.clone(),
            desc: method.desc.clone(),
        }
    }

    /// `f(I)I` that ends in `f(n); ireturn`.
    fn tail_recursive_method() -> Method {
        let mut m = Method::new("f", "(I)I", true);
        m.stream = InsnStream::new(vec![
            Insn::Label(Label(0)),
            Insn::Var {
                op: Opcode::Iload,
                slot: 0,
            },
            self_call(&m),
            Insn::Simple(Opcode::Ireturn),
        ]);
        m
    }

    #[test]
    fn detects_call_then_return() {
        assert!(is_tail_recursive(OWNER, &tail_recursive_method()));
    }

    #[test]
    fn extra_instruction_between_call_and_return_rejected() {
        let mut m = tail_recursive_method();
        let last = m.stream.len() - 1;
        m.stream.insert(last, Insn::Simple(Opcode::Iconst1));
        m.stream.insert(last + 1, Insn::Simple(Opcode::Iadd));
        assert!(!is_tail_recursive(OWNER, &m));
    }

    #[test]
    fn markers_between_call_and_return_rejected() {
        // The *literal* next entry must be the return; even a label in
        // between disqualifies the site.
        let mut m = tail_recursive_method();
        let last = m.stream.len() - 1;
        m.stream.insert(last, Insn::Line(10));
        assert!(!is_tail_recursive(OWNER, &m));
    }

    #[test]
    fn trailing_markers_carry_the_answer() {
        let mut m = tail_recursive_method();
        m.stream.push(Insn::Label(Label(1)));
        m.stream.push(Insn::Frame);
        m.stream.push(Insn::Line(99));
        assert!(is_tail_recursive(OWNER, &m));
    }

    #[test]
    fn different_callee_rejected() {
        let mut m = tail_recursive_method();
        let call_at = 2;
        m.stream.remove(call_at);
        m.stream.insert(
            call_at,
            Insn::MethodRef {
                op: Opcode::Invokestatic,
                owner: OWNER.to_string(),
                name: "g".to_string(),
                desc: "(I)I".to_string(),
            },
        );
        assert!(!is_tail_recursive(OWNER, &m));
    }

    #[test]
    fn overload_rejected() {
        let mut m = tail_recursive_method();
        let call_at = 2;
        m.stream.remove(call_at);
        m.stream.insert(
            call_at,
            Insn::MethodRef {
                op: Opcode::Invokestatic,
                owner: OWNER.to_string(),
                name: "f".to_string(),
                desc: "(J)J".to_string(), // same name, different descriptor
            },
        );
        assert!(!is_tail_recursive(OWNER, &m));
    }

    #[test]
    fn wrong_return_kind_rejected() {
        let mut m = tail_recursive_method();
        let last = m.stream.len() - 1;
        m.stream.remove(last);
        m.stream.push(Insn::Simple(Opcode::Lreturn));
        assert!(!is_tail_recursive(OWNER, &m));
    }

    #[test]
    fn self_call_at_stream_end_rejected() {
        let mut m = tail_recursive_method();
        let last = m.stream.len() - 1;
        m.stream.remove(last); // drop the return
        assert!(!is_tail_recursive(OWNER, &m));
    }

    #[test]
    fn last_candidate_wins() {
        // A qualifying site followed by a later non-qualifying one.
        let mut m = tail_recursive_method();
        m.stream.push(self_call(&m));
        m.stream.push(Insn::Simple(Opcode::Pop));
        assert!(!is_tail_recursive(OWNER, &m));
    }

    #[test]
    fn rewrite_static_one_arg() {
        let mut m = tail_recursive_method();
        let before = m.stream.len();
        optimize(OWNER, &mut m).unwrap();
        // Static, one argument: call + return out, store + goto in.
        assert_eq!(m.stream.len(), before);
        assert_eq!(
            m.stream.get(2),
            Some(&Insn::Var {
                op: Opcode::Istore,
                slot: 0
            })
        );
        assert_eq!(
            m.stream.get(3),
            Some(&Insn::Jump {
                op: Opcode::Goto,
                target: Label(0)
            })
        );
    }

    #[test]
    fn rewrite_length_deltas() {
        // Static with three args: net k - 1 = 2.
        let mut m = Method::new("f", "(III)I", true);
        m.stream = InsnStream::new(vec![
            Insn::Label(Label(0)),
            self_call(&m),
            Insn::Simple(Opcode::Ireturn),
        ]);
        let before = m.stream.len();
        optimize(OWNER, &mut m).unwrap();
        assert_eq!(m.stream.len(), before + 2);

        // Instance with three args: net k = 3.
        let mut m = Method::new("f", "(III)I", false);
        m.stream = InsnStream::new(vec![
            Insn::Label(Label(0)),
            self_call(&m),
            Insn::Simple(Opcode::Ireturn),
        ]);
        let before = m.stream.len();
        optimize(OWNER, &mut m).unwrap();
        assert_eq!(m.stream.len(), before + 3);
    }

    #[test]
    fn rewrite_stores_in_reverse_order_with_wide_slots() {
        // (IJI)I static: slots 0, 1 (wide), 3.
        let mut m = Method::new("f", "(IJI)I", true);
        m.stream = InsnStream::new(vec![
            Insn::Label(Label(0)),
            self_call(&m),
            Insn::Simple(Opcode::Ireturn),
        ]);
        optimize(OWNER, &mut m).unwrap();
        assert_eq!(
            m.stream.iter().collect::<Vec<_>>()[1..],
            [
                &Insn::Var {
                    op: Opcode::Istore,
                    slot: 3
                },
                &Insn::Var {
                    op: Opcode::Lstore,
                    slot: 1
                },
                &Insn::Var {
                    op: Opcode::Istore,
                    slot: 0
                },
                &Insn::Jump {
                    op: Opcode::Goto,
                    target: Label(0)
                },
            ]
        );
    }

    #[test]
    fn rewrite_instance_pops_receiver() {
        let mut m = Method::new("f", "(I)I", false);
        m.stream = InsnStream::new(vec![
            Insn::Label(Label(0)),
            self_call(&m),
            Insn::Simple(Opcode::Ireturn),
        ]);
        optimize(OWNER, &mut m).unwrap();
        assert_eq!(
            m.stream.iter().collect::<Vec<_>>()[1..],
            [
                &Insn::Var {
                    op: Opcode::Istore,
                    slot: 1
                },
                &Insn::Simple(Opcode::Pop),
                &Insn::Jump {
                    op: Opcode::Goto,
                    target: Label(0)
                },
            ]
        );
    }

    #[test]
    fn rewrite_without_leading_label_mints_one() {
        let mut m = Method::new("f", "(I)I", true);
        m.stream = InsnStream::new(vec![self_call(&m), Insn::Simple(Opcode::Ireturn)]);
        optimize(OWNER, &mut m).unwrap();
        let Some(Insn::Label(head)) = m.stream.get(0) else {
            panic!("expected a minted loop-head label at 0");
        };
        assert_eq!(
            m.stream.get(2),
            Some(&Insn::Jump {
                op: Opcode::Goto,
                target: *head
            })
        );
    }

    #[test]
    fn rewrite_refuses_non_tail_recursive() {
        let mut m = Method::new("g", "()V", true);
        m.stream = InsnStream::new(vec![Insn::Simple(Opcode::Return)]);
        assert_eq!(
            optimize(OWNER, &mut m),
            Err(RewriteError::NotTailRecursive {
                name: "g".to_string(),
                desc: "()V".to_string(),
            })
        );
    }

    #[test]
    fn rewritten_method_no_longer_detected() {
        let mut m = tail_recursive_method();
        optimize(OWNER, &mut m).unwrap();
        assert!(!is_tail_recursive(OWNER, &m));
        assert_eq!(
            optimize(OWNER, &mut m),
            Err(RewriteError::NotTailRecursive {
                name: "f".to_string(),
                desc: "(I)I".to_string(),
            })
        );
    }

    #[test]
    fn analyzer_last_rewriter_first_asymmetry() {
        // Two qualifying sites: the analyzer's answer is governed by the
        // last, the rewriter touches the first.
        let mut m = Method::new("f", "(I)I", true);
        m.stream = InsnStream::new(vec![
            Insn::Label(Label(0)),
            self_call(&m),
            Insn::Simple(Opcode::Ireturn),
            self_call(&m),
            Insn::Simple(Opcode::Ireturn),
        ]);
        assert!(is_tail_recursive(OWNER, &m));
        optimize(OWNER, &mut m).unwrap();
        // First site became store + goto; second site is untouched, so
        // the method is still tail recursive by the analyzer's reading.
        assert_eq!(
            m.stream.get(1),
            Some(&Insn::Var {
                op: Opcode::Istore,
                slot: 0
            })
        );
        assert!(matches!(m.stream.get(3), Some(Insn::MethodRef { .. })));
        assert!(is_tail_recursive(OWNER, &m));
    }

    #[test]
    fn class_level_rewrite_reports_names() {
        let mut class = Class::new(OWNER);
        class.methods.push(tail_recursive_method());
        let mut plain = Method::new("plain", "()V", true);
        plain.stream = InsnStream::new(vec![Insn::Simple(Opcode::Return)]);
        class.methods.push(plain);
        assert_eq!(optimize_class(&mut class), vec!["f".to_string()]);
        assert_eq!(tail_recursive_methods(&class), Vec::<usize>::new());
    }

    #[test]
    fn bad_descriptor_never_detected_but_rewrite_errors() {
        let mut m = Method::new("f", "(Q)V", true);
        m.stream = InsnStream::new(vec![Insn::Simple(Opcode::Return)]);
        assert!(!is_tail_recursive(OWNER, &m));
        assert!(matches!(
            optimize(OWNER, &mut m),
            Err(RewriteError::Model(_))
        ));
    }
}
