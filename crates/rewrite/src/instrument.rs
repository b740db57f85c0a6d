//! Entry/exit instrumentation.
//!
//! A patch is a short instruction sequence cloned into a method: the
//! entry patch lands at index 0, and an exit patch lands immediately
//! before every instruction that leaves the method — each return opcode
//! and ATHROW. No call-target analysis: every exit point gets a patch,
//! exceptional ones included.

use retread_model::{Class, Insn, Literal, Method, Opcode};
use retread_profile::{HOOK_OWNER, ON_ENTER_DESC, ON_ENTER_NAME, ON_EXIT_DESC, ON_EXIT_NAME};

/// Insert `entry` at the top of the method and a clone of `exit` before
/// every exit instruction.
///
/// The scan runs from the last index toward the first, so insertions
/// never disturb the indices still to be visited.
pub fn instrument(method: &mut Method, entry: &[Insn], exit: &[Insn]) {
    for (k, insn) in entry.iter().enumerate() {
        method.stream.insert(k, insn.clone());
    }
    for i in (0..method.stream.len()).rev() {
        let exits = method
            .stream
            .get(i)
            .and_then(|insn| insn.opcode())
            .is_some_and(|op| op.is_exit());
        if exits {
            for (k, insn) in exit.iter().enumerate() {
                method.stream.insert(i + k, insn.clone());
            }
        }
    }
}

/// The standard entry patch: push the method's identity, call the hook.
pub fn enter_patch(owner: &str, method: &Method) -> Vec<Insn> {
    vec![
        Insn::Ldc(Literal::Str(owner.to_string())),
        Insn::Ldc(Literal::Str(method.name.clone())),
        Insn::Ldc(Literal::Str(method.desc.clone())),
        Insn::MethodRef {
            op: Opcode::Invokestatic,
            owner: HOOK_OWNER.to_string(),
            name: ON_ENTER_NAME.to_string(),
            desc: ON_ENTER_DESC.to_string(),
        },
    ]
}

/// The standard exit patch: one hook call, no operands.
pub fn exit_patch() -> Vec<Insn> {
    vec![Insn::MethodRef {
        op: Opcode::Invokestatic,
        owner: HOOK_OWNER.to_string(),
        name: ON_EXIT_NAME.to_string(),
        desc: ON_EXIT_DESC.to_string(),
    }]
}

/// Apply the standard patches to every method of a class.
pub fn instrument_class(class: &mut Class) {
    let owner = class.name.clone();
    let exit = exit_patch();
    for method in &mut class.methods {
        let entry = enter_patch(&owner, method);
        instrument(method, &entry, &exit);
        log::debug!("instrumented {}.{}{}", owner, method.name, method.desc);
    }
}
