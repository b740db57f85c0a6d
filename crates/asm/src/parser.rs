//! Parser for retread assembly text.
//!
//! Line-oriented: directives open and close classes and methods, a word
//! ending in `:` defines a label, and anything else is an instruction
//! whose operand pattern is dispatched on [`Opcode::kind`].

use std::collections::HashMap;

use retread_model::opcode::{array_kind_code, OpKind};
use retread_model::{Class, Insn, Label, Literal, Method, MethodSig, Opcode};

use crate::error::AsmError;
use crate::lexer::{tokenize_line, Token};

/// Assemble a complete text into a class.
pub fn assemble(text: &str) -> Result<Class, AsmError> {
    let mut asm = Assembler::default();
    for (i, line) in text.lines().enumerate() {
        let line_num = i + 1;
        let tokens = tokenize_line(line, line_num)?;
        if tokens.is_empty() {
            continue;
        }
        asm.take_line(&tokens, line_num)?;
    }
    asm.finish()
}

/// In-progress method state: the stream plus the name → id label table.
struct MethodCtx {
    method: Method,
    labels: HashMap<String, Label>,
    defined: Vec<String>,
    /// name → line of first reference, for the undefined-label error.
    referenced: HashMap<String, usize>,
    next_label: u32,
}

impl MethodCtx {
    fn new(method: Method) -> Self {
        Self {
            method,
            labels: HashMap::new(),
            defined: Vec::new(),
            referenced: HashMap::new(),
            next_label: 0,
        }
    }

    /// Id for a label name, allocating on first mention.
    fn label(&mut self, name: &str) -> Label {
        if let Some(l) = self.labels.get(name) {
            return *l;
        }
        let l = Label(self.next_label);
        self.next_label += 1;
        self.labels.insert(name.to_string(), l);
        l
    }

    fn reference(&mut self, name: &str, line: usize) -> Label {
        self.referenced.entry(name.to_string()).or_insert(line);
        self.label(name)
    }
}

#[derive(Default)]
struct Assembler {
    class: Option<Class>,
    cur: Option<MethodCtx>,
}

impl Assembler {
    fn take_line(&mut self, tokens: &[Token], line: usize) -> Result<(), AsmError> {
        let head = match &tokens[0] {
            Token::Word(w) => w.as_str(),
            Token::Str(s) => {
                return Err(AsmError::UnexpectedToken {
                    line,
                    token: s.clone(),
                })
            }
        };

        match head {
            ".class" => self.directive_class(&tokens[1..], line),
            ".method" => self.directive_method(&tokens[1..], line),
            ".end" => self.directive_end(&tokens[1..], line),
            ".line" => {
                let ctx = self.in_method(".line", line)?;
                let n = parse_num::<u32>(expect_word(&tokens[1..], 0, line, ".line", "a line number")?, line)?;
                expect_end(&tokens[2..], line)?;
                ctx.method.stream.push(Insn::Line(n));
                Ok(())
            }
            ".frame" => {
                let ctx = self.in_method(".frame", line)?;
                expect_end(&tokens[1..], line)?;
                ctx.method.stream.push(Insn::Frame);
                Ok(())
            }
            _ if head.starts_with('.') => Err(AsmError::Misplaced {
                line,
                what: head.to_string(),
            }),
            _ if head.ends_with(':') && head.len() > 1 => {
                let name = &head[..head.len() - 1];
                let ctx = self.in_method(head, line)?;
                if ctx.defined.iter().any(|d| d == name) {
                    return Err(AsmError::DuplicateLabel {
                        line,
                        label: name.to_string(),
                    });
                }
                expect_end(&tokens[1..], line)?;
                ctx.defined.push(name.to_string());
                let l = ctx.label(name);
                ctx.method.stream.push(Insn::Label(l));
                Ok(())
            }
            _ => self.instruction(head, &tokens[1..], line),
        }
    }

    fn directive_class(&mut self, args: &[Token], line: usize) -> Result<(), AsmError> {
        if self.class.is_some() {
            return Err(AsmError::Misplaced {
                line,
                what: ".class".to_string(),
            });
        }
        let name = expect_word(args, 0, line, ".class", "a class name")?;
        expect_end(&args[1..], line)?;
        self.class = Some(Class::new(name));
        Ok(())
    }

    fn directive_method(&mut self, args: &[Token], line: usize) -> Result<(), AsmError> {
        if self.class.is_none() || self.cur.is_some() {
            return Err(AsmError::Misplaced {
                line,
                what: ".method".to_string(),
            });
        }
        let name = expect_word(args, 0, line, ".method", "a name and a descriptor")?.to_string();
        let desc = expect_word(args, 1, line, ".method", "a name and a descriptor")?.to_string();
        MethodSig::parse(&desc).map_err(|_| AsmError::BadDescriptor {
            line,
            desc: desc.clone(),
        })?;
        let is_static = match args.get(2) {
            None => false,
            Some(Token::Word(w)) if w == "static" => {
                expect_end(&args[3..], line)?;
                true
            }
            Some(t) => {
                return Err(AsmError::UnexpectedToken {
                    line,
                    token: t.text().to_string(),
                })
            }
        };
        self.cur = Some(MethodCtx::new(Method::new(name, desc, is_static)));
        Ok(())
    }

    fn directive_end(&mut self, args: &[Token], line: usize) -> Result<(), AsmError> {
        match args.first() {
            Some(Token::Word(w)) if w == "method" => {}
            _ => {
                return Err(AsmError::Misplaced {
                    line,
                    what: ".end".to_string(),
                })
            }
        }
        expect_end(&args[1..], line)?;
        let ctx = self.cur.take().ok_or_else(|| AsmError::Misplaced {
            line,
            what: ".end method".to_string(),
        })?;
        // Every referenced label must have a definition by now.
        for (name, first_line) in &ctx.referenced {
            if !ctx.defined.iter().any(|d| d == name) {
                return Err(AsmError::UndefinedLabel {
                    line: *first_line,
                    label: name.clone(),
                    method: ctx.method.name.clone(),
                });
            }
        }
        // `in_method` guarantees a class exists whenever a method is open.
        if let Some(class) = self.class.as_mut() {
            class.methods.push(ctx.method);
        }
        Ok(())
    }

    fn instruction(&mut self, mnemonic: &str, args: &[Token], line: usize) -> Result<(), AsmError> {
        let op = Opcode::from_mnemonic(mnemonic).ok_or_else(|| AsmError::UnknownOpcode {
            line,
            token: mnemonic.to_string(),
        })?;
        let ctx = self.in_method(mnemonic, line)?;
        let insn = parse_operands(op, args, ctx, line)?;
        ctx.method.stream.push(insn);
        Ok(())
    }

    fn in_method(&mut self, what: &str, line: usize) -> Result<&mut MethodCtx, AsmError> {
        self.cur.as_mut().ok_or_else(|| AsmError::Misplaced {
            line,
            what: what.to_string(),
        })
    }

    fn finish(self) -> Result<Class, AsmError> {
        if let Some(ctx) = self.cur {
            return Err(AsmError::UnclosedMethod {
                method: ctx.method.name,
            });
        }
        self.class.ok_or(AsmError::MissingClass)
    }
}

fn parse_operands(
    op: Opcode,
    args: &[Token],
    ctx: &mut MethodCtx,
    line: usize,
) -> Result<Insn, AsmError> {
    let mn = op.mnemonic();
    match op.kind() {
        OpKind::None => {
            expect_end(args, line)?;
            Ok(Insn::Simple(op))
        }
        OpKind::Imm => {
            let word = expect_word(args, 0, line, mn, "an immediate operand")?;
            expect_end(&args[1..], line)?;
            // NEWARRAY also accepts the element-kind name.
            let value = if op == Opcode::Newarray {
                match array_kind_code(word) {
                    Some(code) => code,
                    None => parse_num::<i32>(word, line)?,
                }
            } else {
                parse_num::<i32>(word, line)?
            };
            Ok(Insn::Imm { op, value })
        }
        OpKind::Var => {
            let slot = parse_num::<u16>(expect_word(args, 0, line, mn, "a slot index")?, line)?;
            expect_end(&args[1..], line)?;
            Ok(Insn::Var { op, slot })
        }
        OpKind::Iinc => {
            let slot = parse_num::<u16>(
                expect_word(args, 0, line, mn, "a slot index and a delta")?,
                line,
            )?;
            let delta = parse_num::<i16>(
                expect_word(args, 1, line, mn, "a slot index and a delta")?,
                line,
            )?;
            expect_end(&args[2..], line)?;
            Ok(Insn::Iinc { slot, delta })
        }
        OpKind::Jump => {
            let name = expect_word(args, 0, line, mn, "a label")?.to_string();
            expect_end(&args[1..], line)?;
            let target = ctx.reference(&name, line);
            Ok(Insn::Jump { op, target })
        }
        OpKind::Ldc => parse_ldc(args, line),
        OpKind::Type => {
            let ty = expect_word(args, 0, line, mn, "a type name")?.to_string();
            expect_end(&args[1..], line)?;
            Ok(Insn::Type { op, ty })
        }
        OpKind::Field => {
            let (owner, name, desc) = parse_member(args, line, mn)?;
            Ok(Insn::Field {
                op,
                owner,
                name,
                desc,
            })
        }
        OpKind::Method => {
            let (owner, name, desc) = parse_member(args, line, mn)?;
            MethodSig::parse(&desc).map_err(|_| AsmError::BadDescriptor {
                line,
                desc: desc.clone(),
            })?;
            Ok(Insn::MethodRef {
                op,
                owner,
                name,
                desc,
            })
        }
        OpKind::LookupSwitch => parse_lookupswitch(args, ctx, line),
        OpKind::TableSwitch => parse_tableswitch(args, ctx, line),
        OpKind::MultiArray => {
            let desc = expect_word(args, 0, line, mn, "a descriptor and a dimension count")?
                .to_string();
            let dims = parse_num::<u8>(
                expect_word(args, 1, line, mn, "a descriptor and a dimension count")?,
                line,
            )?;
            expect_end(&args[2..], line)?;
            Ok(Insn::MultiANewArray { desc, dims })
        }
    }
}

fn parse_ldc(args: &[Token], line: usize) -> Result<Insn, AsmError> {
    match args.first() {
        Some(Token::Str(s)) => {
            expect_end(&args[1..], line)?;
            Ok(Insn::Ldc(Literal::Str(s.clone())))
        }
        Some(Token::Word(w)) if w.eq_ignore_ascii_case("class") => {
            let name = expect_word(args, 1, line, "LDC", "a class name")?.to_string();
            expect_end(&args[2..], line)?;
            Ok(Insn::Ldc(Literal::Class(name)))
        }
        Some(Token::Word(w)) => {
            expect_end(&args[1..], line)?;
            if let Ok(v) = w.parse::<i64>() {
                return Ok(Insn::Ldc(Literal::Int(v)));
            }
            match w.parse::<f64>() {
                Ok(v) => Ok(Insn::Ldc(Literal::Float(v))),
                Err(_) => Err(AsmError::InvalidNumber {
                    line,
                    token: w.clone(),
                }),
            }
        }
        None => Err(AsmError::MissingArgument {
            line,
            mnemonic: "LDC".to_string(),
            expected: "a constant operand",
        }),
    }
}

fn parse_member(
    args: &[Token],
    line: usize,
    mn: &str,
) -> Result<(String, String, String), AsmError> {
    let owner = expect_word(args, 0, line, mn, "owner, name, and descriptor")?.to_string();
    let name = expect_word(args, 1, line, mn, "owner, name, and descriptor")?.to_string();
    let desc = expect_word(args, 2, line, mn, "owner, name, and descriptor")?.to_string();
    expect_end(&args[3..], line)?;
    Ok((owner, name, desc))
}

/// `lookupswitch k:L k:L ... default:L` — pairs in written order, one
/// `default:` entry required.
fn parse_lookupswitch(
    args: &[Token],
    ctx: &mut MethodCtx,
    line: usize,
) -> Result<Insn, AsmError> {
    let mut pairs = Vec::new();
    let mut default = None;
    for tok in args {
        let (lhs, label) = split_switch_arm(tok, line)?;
        let target = ctx.reference(label, line);
        if lhs.eq_ignore_ascii_case("default") {
            if default.replace(target).is_some() {
                return Err(AsmError::UnexpectedToken {
                    line,
                    token: tok.text().to_string(),
                });
            }
        } else {
            pairs.push((parse_num::<i32>(lhs, line)?, target));
        }
    }
    let default = default.ok_or(AsmError::MissingArgument {
        line,
        mnemonic: "LOOKUPSWITCH".to_string(),
        expected: "a default: arm",
    })?;
    Ok(Insn::LookupSwitch { pairs, default })
}

/// `tableswitch <low> L L ... default:L`.
fn parse_tableswitch(
    args: &[Token],
    ctx: &mut MethodCtx,
    line: usize,
) -> Result<Insn, AsmError> {
    let low = parse_num::<i32>(
        expect_word(args, 0, line, "TABLESWITCH", "a low key")?,
        line,
    )?;
    let mut targets = Vec::new();
    let mut default = None;
    for tok in &args[1..] {
        let word = match tok {
            Token::Word(w) => w.as_str(),
            Token::Str(s) => {
                return Err(AsmError::UnexpectedToken {
                    line,
                    token: s.clone(),
                })
            }
        };
        if let Some(label) = word.strip_prefix("default:") {
            if default.replace(ctx.reference(label, line)).is_some() {
                return Err(AsmError::UnexpectedToken {
                    line,
                    token: word.to_string(),
                });
            }
        } else if default.is_some() {
            return Err(AsmError::UnexpectedToken {
                line,
                token: word.to_string(),
            });
        } else {
            targets.push(ctx.reference(word, line));
        }
    }
    let default = default.ok_or(AsmError::MissingArgument {
        line,
        mnemonic: "TABLESWITCH".to_string(),
        expected: "a default: arm",
    })?;
    Ok(Insn::TableSwitch {
        low,
        targets,
        default,
    })
}

fn split_switch_arm<'a>(tok: &'a Token, line: usize) -> Result<(&'a str, &'a str), AsmError> {
    let word = match tok {
        Token::Word(w) => w.as_str(),
        Token::Str(s) => {
            return Err(AsmError::UnexpectedToken {
                line,
                token: s.clone(),
            })
        }
    };
    word.split_once(':').ok_or_else(|| AsmError::UnexpectedToken {
        line,
        token: word.to_string(),
    })
}

fn expect_word<'a>(
    args: &'a [Token],
    idx: usize,
    line: usize,
    mnemonic: &str,
    expected: &'static str,
) -> Result<&'a str, AsmError> {
    match args.get(idx) {
        Some(Token::Word(w)) => Ok(w),
        Some(Token::Str(s)) => Err(AsmError::UnexpectedToken {
            line,
            token: s.clone(),
        }),
        None => Err(AsmError::MissingArgument {
            line,
            mnemonic: mnemonic.to_string(),
            expected,
        }),
    }
}

fn parse_num<T: std::str::FromStr>(word: &str, line: usize) -> Result<T, AsmError> {
    word.parse().map_err(|_| AsmError::InvalidNumber {
        line,
        token: word.to_string(),
    })
}

fn expect_end(remaining: &[Token], line: usize) -> Result<(), AsmError> {
    if let Some(tok) = remaining.first() {
        return Err(AsmError::UnexpectedToken {
            line,
            token: tok.text().to_string(),
        });
    }
    Ok(())
}
