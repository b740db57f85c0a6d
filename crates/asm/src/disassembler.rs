//! Human-readable listings of instruction streams.
//!
//! One line per stream entry, numbered 0-based with markers included, so
//! the listing always has exactly as many lines as the stream has
//! entries. Branch operands render as the resolved entry id of their
//! target; a dangling target is a hard error, not a guess.

use std::fmt::Write;

use retread_model::opcode::{array_kind_name, OpKind};
use retread_model::{Class, Insn, Method, ModelError, Opcode};
use retread_model::stream::InsnStream;

/// Disassemble a whole class: header plus every method.
pub fn disassemble_class(class: &Class) -> Result<String, ModelError> {
    let mut out = format!("Class: {}\n", class.name);
    for method in &class.methods {
        out.push_str(&disassemble_method(method)?);
    }
    Ok(out)
}

/// Disassemble one method: header plus one line per stream entry.
pub fn disassemble_method(method: &Method) -> Result<String, ModelError> {
    let mut out = format!("  Method: {}{}\n", method.name, method.desc);
    for (idx, insn) in method.stream.iter().enumerate() {
        let line = disassemble_insn(idx, insn, &method.stream)?;
        out.push_str(&line);
        out.push('\n');
    }
    Ok(out)
}

/// Render a single entry as `<id>:\t<text>`.
pub fn disassemble_insn(
    idx: usize,
    insn: &Insn,
    stream: &InsnStream,
) -> Result<String, ModelError> {
    let text = render(insn, stream)?;
    Ok(format!("{idx}:\t{text}"))
}

fn render(insn: &Insn, stream: &InsnStream) -> Result<String, ModelError> {
    match insn {
        Insn::Label(_) => Ok("// label".to_string()),
        Insn::Frame => Ok("// stack frame map".to_string()),
        Insn::Line(_) => Ok("// line number information".to_string()),

        Insn::Simple(op) => Ok(checked(op, OpKind::None, op.mnemonic().to_string())),
        Insn::Imm { op, value } => {
            let operand = if *op == Opcode::Newarray {
                match array_kind_name(*value) {
                    Some(name) => name.to_string(),
                    None => value.to_string(),
                }
            } else {
                value.to_string()
            };
            Ok(checked(op, OpKind::Imm, format!("{} {operand}", op.mnemonic())))
        }
        Insn::Jump { op, target } => {
            if op.kind() != OpKind::Jump {
                return Ok(UNRECOGNIZED.to_string());
            }
            let id = stream.resolve(*target)?;
            Ok(format!("{} {id}", op.mnemonic()))
        }
        Insn::Ldc(lit) => Ok(format!("LDC {lit}")),
        Insn::Var { op, slot } => {
            Ok(checked(op, OpKind::Var, format!("{} {slot}", op.mnemonic())))
        }
        Insn::Iinc { slot, delta } => Ok(format!("IINC {slot} {delta}")),
        Insn::Type { op, ty } => Ok(checked(op, OpKind::Type, format!("{} {ty}", op.mnemonic()))),
        Insn::Field {
            op,
            owner,
            name,
            desc,
        } => Ok(checked(
            op,
            OpKind::Field,
            format!("{} {owner}.{name} {desc}", op.mnemonic()),
        )),
        Insn::MethodRef {
            op,
            owner,
            name,
            desc,
        } => Ok(checked(
            op,
            OpKind::Method,
            format!("{} {owner}.{name} {desc}", op.mnemonic()),
        )),
        Insn::MultiANewArray { desc, dims } => Ok(format!("MULTIANEWARRAY {desc} {dims}")),

        Insn::LookupSwitch { pairs, default } => {
            let mut sorted = pairs.clone();
            sorted.sort_by_key(|(k, _)| *k);
            let mut arms = Vec::with_capacity(sorted.len());
            for (key, target) in &sorted {
                arms.push((*key, stream.resolve(*target)?));
            }
            let default = stream.resolve(*default)?;
            Ok(switch_text("LOOKUPSWITCH", &arms, default))
        }
        Insn::TableSwitch {
            low,
            targets,
            default,
        } => {
            let mut arms = Vec::with_capacity(targets.len());
            for (i, target) in targets.iter().enumerate() {
                arms.push((low + i as i32, stream.resolve(*target)?));
            }
            let default = stream.resolve(*default)?;
            Ok(switch_text("TABLESWITCH", &arms, default))
        }
    }
}

const UNRECOGNIZED: &str = "// unrecognized";

/// The rendered text, unless the opcode's shape contradicts the variant.
fn checked(op: &Opcode, expected: OpKind, text: String) -> String {
    if op.kind() == expected {
        text
    } else {
        UNRECOGNIZED.to_string()
    }
}

fn switch_text(mnemonic: &str, arms: &[(i32, usize)], default: usize) -> String {
    let mut out = format!("{mnemonic} (");
    for (key, id) in arms {
        let _ = write!(out, " {key}: {id},");
    }
    let _ = write!(out, " default: {default} )");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use retread_model::{Label, Literal};

    fn only_line(insn: Insn) -> String {
        let stream = InsnStream::new(vec![insn]);
        disassemble_insn(0, stream.get(0).unwrap(), &stream).unwrap()
    }

    #[test]
    fn marker_lines() {
        assert_eq!(only_line(Insn::Label(Label(0))), "0:\t// label");
        assert_eq!(only_line(Insn::Frame), "0:\t// stack frame map");
        assert_eq!(only_line(Insn::Line(42)), "0:\t// line number information");
    }

    #[test]
    fn jump_renders_resolved_id() {
        let stream = InsnStream::new(vec![
            Insn::Simple(Opcode::Nop),
            Insn::Jump {
                op: Opcode::Goto,
                target: Label(0),
            },
            Insn::Label(Label(0)),
        ]);
        let line = disassemble_insn(1, stream.get(1).unwrap(), &stream).unwrap();
        assert_eq!(line, "1:\tGOTO 2");
    }

    #[test]
    fn dangling_target_is_fatal() {
        let stream = InsnStream::new(vec![Insn::Jump {
            op: Opcode::Goto,
            target: Label(9),
        }]);
        let err = disassemble_insn(0, stream.get(0).unwrap(), &stream).unwrap_err();
        assert_eq!(err, ModelError::TargetNotFound(9));
    }

    #[test]
    fn newarray_operand_maps_through_kind_table() {
        assert_eq!(
            only_line(Insn::Imm {
                op: Opcode::Newarray,
                value: 10
            }),
            "0:\tNEWARRAY T_INT"
        );
        // Unknown codes fall back to the raw number.
        assert_eq!(
            only_line(Insn::Imm {
                op: Opcode::Newarray,
                value: 99
            }),
            "0:\tNEWARRAY 99"
        );
    }

    #[test]
    fn literal_operands() {
        assert_eq!(only_line(Insn::Ldc(Literal::Int(10))), "0:\tLDC 10");
        assert_eq!(only_line(Insn::Ldc(Literal::Float(2.5))), "0:\tLDC 2.5");
        assert_eq!(
            only_line(Insn::Ldc(Literal::Str("hi".to_string()))),
            "0:\tLDC \"hi\""
        );
        assert_eq!(
            only_line(Insn::Ldc(Literal::Class("java/lang/Thread".to_string()))),
            "0:\tLDC class java/lang/Thread"
        );
    }

    #[test]
    fn member_operands() {
        assert_eq!(
            only_line(Insn::MethodRef {
                op: Opcode::Invokestatic,
                owner: "lab/Example".to_string(),
                name: "sum".to_string(),
                desc: "([III)I".to_string(),
            }),
            "0:\tINVOKESTATIC lab/Example.sum ([III)I"
        );
        assert_eq!(
            only_line(Insn::Field {
                op: Opcode::Getstatic,
                owner: "java/lang/System".to_string(),
                name: "out".to_string(),
                desc: "Ljava/io/PrintStream;".to_string(),
            }),
            "0:\tGETSTATIC java/lang/System.out Ljava/io/PrintStream;"
        );
    }

    #[test]
    fn lookupswitch_keys_ascend() {
        let stream = InsnStream::new(vec![
            Insn::LookupSwitch {
                pairs: vec![(1000, Label(1)), (0, Label(0))],
                default: Label(2),
            },
            Insn::Label(Label(0)),
            Insn::Label(Label(1)),
            Insn::Label(Label(2)),
        ]);
        let line = disassemble_insn(0, stream.get(0).unwrap(), &stream).unwrap();
        assert_eq!(line, "0:\tLOOKUPSWITCH ( 0: 1, 1000: 2, default: 3 )");
    }

    #[test]
    fn tableswitch_keys_count_up_from_low() {
        let stream = InsnStream::new(vec![
            Insn::TableSwitch {
                low: 5,
                targets: vec![Label(0), Label(1)],
                default: Label(2),
            },
            Insn::Label(Label(0)),
            Insn::Label(Label(1)),
            Insn::Label(Label(2)),
        ]);
        let line = disassemble_insn(0, stream.get(0).unwrap(), &stream).unwrap();
        assert_eq!(line, "0:\tTABLESWITCH ( 5: 1, 6: 2, default: 3 )");
    }

    #[test]
    fn contradictory_payload_is_unrecognized() {
        // IADD takes no operands; a Var payload wrapping it is nonsense.
        assert_eq!(
            only_line(Insn::Var {
                op: Opcode::Iadd,
                slot: 1
            }),
            "0:\t// unrecognized"
        );
        assert_eq!(
            only_line(Insn::Simple(Opcode::Iload)),
            "0:\t// unrecognized"
        );
    }

    #[test]
    fn method_listing_has_one_line_per_entry() {
        let mut method = Method::new("answer", "()I", true);
        method.stream.push(Insn::Label(Label(0)));
        method.stream.push(Insn::Imm {
            op: Opcode::Bipush,
            value: 42,
        });
        method.stream.push(Insn::Simple(Opcode::Ireturn));
        let text = disassemble_method(&method).unwrap();
        assert_eq!(
            text,
            "  Method: answer()I\n0:\t// label\n1:\tBIPUSH 42\n2:\tIRETURN\n"
        );
    }

    #[test]
    fn class_listing() {
        let mut class = Class::new("lab/Example");
        let mut m = Method::new("f", "()V", true);
        m.stream.push(Insn::Simple(Opcode::Return));
        class.methods.push(m);
        let text = disassemble_class(&class).unwrap();
        assert_eq!(text, "Class: lab/Example\n  Method: f()V\n0:\tRETURN\n");
    }
}
