//! Integration tests: assembled programs through the interpreter.

use retread_asm::assemble;
use retread_profile::Recorder;
use retread_vm::{run_method, run_with_recorder, RuntimeError, Value, MAX_CALL_DEPTH};

#[test]
fn arithmetic_and_branches() {
    let class = assemble(
        "
.class lab/Math
.method max (II)I static
    iload 0
    iload 1
    if_icmpge first
    iload 1
    ireturn
first:
    iload 0
    ireturn
.end method
",
    )
    .unwrap();
    let result = run_method(&class, "max", "(II)I", vec![Value::Int(3), Value::Int(9)]).unwrap();
    assert_eq!(result, Value::Int(9));
    let result = run_method(&class, "max", "(II)I", vec![Value::Int(7), Value::Int(2)]).unwrap();
    assert_eq!(result, Value::Int(7));
}

#[test]
fn recursive_sum_over_array() {
    let class = assemble(
        "
.class lab/Sum
.method sum ([III)I static
start:
    iload 1
    aload 0
    arraylength
    if_icmpge base
    aload 0
    iload 1
    iconst_1
    iadd
    iload 2
    aload 0
    iload 1
    iaload
    iadd
    invokestatic lab/Sum sum ([III)I
    ireturn
base:
    iload 2
    ireturn
.end method
",
    )
    .unwrap();
    let arr = Value::array_of(vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
    let result = run_method(
        &class,
        "sum",
        "([III)I",
        vec![arr, Value::Int(0), Value::Int(0)],
    )
    .unwrap();
    assert_eq!(result, Value::Int(6));
}

#[test]
fn deep_recursion_hits_the_depth_cap() {
    let class = assemble(
        "
.class lab/Deep
.method down (I)I static
    iload 0
    ifle done
    iload 0
    iconst_1
    isub
    invokestatic lab/Deep down (I)I
    ireturn
done:
    iload 0
    ireturn
.end method
",
    )
    .unwrap();
    // Shallow recursion is fine.
    let result = run_method(&class, "down", "(I)I", vec![Value::Int(10)]).unwrap();
    assert_eq!(result, Value::Int(0));
    // Recursion deeper than the cap is not.
    let err = run_method(&class, "down", "(I)I", vec![Value::Int(100_000)]).unwrap_err();
    assert_eq!(
        err,
        RuntimeError::CallDepthExceeded {
            limit: MAX_CALL_DEPTH
        }
    );
}

#[test]
fn switch_dispatch() {
    let class = assemble(
        "
.class lab/Pick
.method pick (I)I static
    iload 0
    lookupswitch 0:zero 1000:big default:other
zero:
    iconst_0
    ireturn
big:
    bipush 99
    ireturn
other:
    iconst_m1
    ireturn
.end method
",
    )
    .unwrap();
    let run = |n| run_method(&class, "pick", "(I)I", vec![Value::Int(n)]).unwrap();
    assert_eq!(run(0), Value::Int(0));
    assert_eq!(run(1000), Value::Int(99));
    assert_eq!(run(5), Value::Int(-1));
}

#[test]
fn athrow_surfaces_as_thrown() {
    let class = assemble(
        "
.class lab/Boom
.method boom ()V static
    aconst_null
    athrow
.end method
",
    )
    .unwrap();
    let err = run_method(&class, "boom", "()V", vec![]).unwrap_err();
    assert!(matches!(err, RuntimeError::Thrown { at: 1 }));
}

#[test]
fn instance_method_receiver_in_slot_zero() {
    let class = assemble(
        "
.class lab/Inst
.method add (I)I
    iload 1
    iconst_1
    iadd
    ireturn
.end method
",
    )
    .unwrap();
    let result = run_method(&class, "add", "(I)I", vec![Value::Null, Value::Int(4)]).unwrap();
    assert_eq!(result, Value::Int(5));
}

#[test]
fn wide_arguments_occupy_two_slots() {
    let class = assemble(
        "
.class lab/Wide
.method second (JI)I static
    iload 2
    ireturn
.end method
",
    )
    .unwrap();
    let result = run_method(
        &class,
        "second",
        "(JI)I",
        vec![Value::Long(1), Value::Int(42)],
    )
    .unwrap();
    assert_eq!(result, Value::Int(42));
}

#[test]
fn hook_calls_feed_an_attached_recorder() {
    let class = assemble(
        "
.class lab/Hooked
.method f ()V static
    ldc \"lab/Hooked\"
    ldc \"f\"
    ldc \"()V\"
    invokestatic retread/profile/Recorder onEnter (Ljava/lang/String;Ljava/lang/String;Ljava/lang/String;)V
    invokestatic retread/profile/Recorder onExit ()V
    return
.end method
",
    )
    .unwrap();
    let mut rec = Recorder::new();
    run_with_recorder(&class, "f", "()V", vec![], &mut rec).unwrap();
    assert!(rec.is_balanced());
    assert_eq!(rec.tree().to_string(), "root\n  lab/Hooked.f()V\n");

    // Without a recorder the hook calls are inert.
    run_method(&class, "f", "()V", vec![]).unwrap();
}

#[test]
fn foreign_calls_are_rejected_explicitly() {
    let class = assemble(
        "
.class lab/Out
.method f ()V static
    invokestatic some/Other g ()V
    return
.end method
",
    )
    .unwrap();
    let err = run_method(&class, "f", "()V", vec![]).unwrap_err();
    assert!(matches!(err, RuntimeError::UnsupportedCall { owner, .. } if owner == "some/Other"));
}

#[test]
fn unsupported_opcode_is_explicit() {
    let class = assemble(
        "
.class lab/Mon
.method f ()V static
    aconst_null
    monitorenter
    return
.end method
",
    )
    .unwrap();
    let err = run_method(&class, "f", "()V", vec![]).unwrap_err();
    assert_eq!(
        err,
        RuntimeError::UnsupportedOpcode {
            at: 1,
            mnemonic: "MONITORENTER"
        }
    );
}

#[test]
fn missing_method_and_bad_arity() {
    let class = assemble(
        "
.class lab/E
.method f (I)I static
    iload 0
    ireturn
.end method
",
    )
    .unwrap();
    assert!(matches!(
        run_method(&class, "g", "()V", vec![]),
        Err(RuntimeError::NoSuchMethod { .. })
    ));
    assert!(matches!(
        run_method(&class, "f", "(I)I", vec![]),
        Err(RuntimeError::WrongArgumentCount {
            expected: 1,
            got: 0,
            ..
        })
    ));
}
