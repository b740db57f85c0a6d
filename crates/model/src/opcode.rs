//! Opcode definitions for the stack-machine instruction set.
//!
//! Discriminants are the real bytecode values; they matter here only as
//! identity, since container decoding and encoding live outside this core.

/// Operand-shape category of an opcode.
///
/// The assembler uses this to decide how to parse operands, and the
/// disassembler uses it to reject instruction payloads that contradict
/// their opcode (rendered as an `// unrecognized` line).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpKind {
    /// Opcode only.
    None,
    /// One immediate integer (BIPUSH, SIPUSH, NEWARRAY).
    Imm,
    /// Local-variable slot index (typed loads/stores, RET).
    Var,
    /// Slot index plus signed delta (IINC).
    Iinc,
    /// Branch to a label.
    Jump,
    /// Constant-pool literal (LDC).
    Ldc,
    /// Type name operand (NEW, ANEWARRAY, CHECKCAST, INSTANCEOF).
    Type,
    /// Field reference: owner, name, descriptor.
    Field,
    /// Method reference: owner, name, descriptor.
    Method,
    /// Sparse branch table.
    LookupSwitch,
    /// Dense branch table.
    TableSwitch,
    /// Multi-dimensional array creation.
    MultiArray,
}

/// Identifies the operation an instruction performs.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    // Constants
    Nop = 0x00,
    AconstNull = 0x01,
    IconstM1 = 0x02,
    Iconst0 = 0x03,
    Iconst1 = 0x04,
    Iconst2 = 0x05,
    Iconst3 = 0x06,
    Iconst4 = 0x07,
    Iconst5 = 0x08,
    Lconst0 = 0x09,
    Lconst1 = 0x0a,
    Fconst0 = 0x0b,
    Fconst1 = 0x0c,
    Fconst2 = 0x0d,
    Dconst0 = 0x0e,
    Dconst1 = 0x0f,
    Bipush = 0x10,
    Sipush = 0x11,
    Ldc = 0x12,

    // Local loads
    Iload = 0x15,
    Lload = 0x16,
    Fload = 0x17,
    Dload = 0x18,
    Aload = 0x19,

    // Array loads
    Iaload = 0x2e,
    Laload = 0x2f,
    Faload = 0x30,
    Daload = 0x31,
    Aaload = 0x32,
    Baload = 0x33,
    Caload = 0x34,
    Saload = 0x35,

    // Local stores
    Istore = 0x36,
    Lstore = 0x37,
    Fstore = 0x38,
    Dstore = 0x39,
    Astore = 0x3a,

    // Array stores
    Iastore = 0x4f,
    Lastore = 0x50,
    Fastore = 0x51,
    Dastore = 0x52,
    Aastore = 0x53,
    Bastore = 0x54,
    Castore = 0x55,
    Sastore = 0x56,

    // Stack shuffles
    Pop = 0x57,
    Pop2 = 0x58,
    Dup = 0x59,
    DupX1 = 0x5a,
    DupX2 = 0x5b,
    Dup2 = 0x5c,
    Dup2X1 = 0x5d,
    Dup2X2 = 0x5e,
    Swap = 0x5f,

    // Arithmetic
    Iadd = 0x60,
    Ladd = 0x61,
    Fadd = 0x62,
    Dadd = 0x63,
    Isub = 0x64,
    Lsub = 0x65,
    Fsub = 0x66,
    Dsub = 0x67,
    Imul = 0x68,
    Lmul = 0x69,
    Fmul = 0x6a,
    Dmul = 0x6b,
    Idiv = 0x6c,
    Ldiv = 0x6d,
    Fdiv = 0x6e,
    Ddiv = 0x6f,
    Irem = 0x70,
    Lrem = 0x71,
    Frem = 0x72,
    Drem = 0x73,
    Ineg = 0x74,
    Lneg = 0x75,
    Fneg = 0x76,
    Dneg = 0x77,

    // Shifts and bitwise
    Ishl = 0x78,
    Lshl = 0x79,
    Ishr = 0x7a,
    Lshr = 0x7b,
    Iushr = 0x7c,
    Lushr = 0x7d,
    Iand = 0x7e,
    Land = 0x7f,
    Ior = 0x80,
    Lor = 0x81,
    Ixor = 0x82,
    Lxor = 0x83,

    /// Increment a local slot in place. Slot and delta travel with the
    /// instruction, not on the stack.
    Iinc = 0x84,

    // Conversions
    I2l = 0x85,
    I2f = 0x86,
    I2d = 0x87,
    L2i = 0x88,
    L2f = 0x89,
    L2d = 0x8a,
    F2i = 0x8b,
    F2l = 0x8c,
    F2d = 0x8d,
    D2i = 0x8e,
    D2l = 0x8f,
    D2f = 0x90,
    I2b = 0x91,
    I2c = 0x92,
    I2s = 0x93,

    // Long/float comparisons
    Lcmp = 0x94,
    Fcmpl = 0x95,
    Fcmpg = 0x96,
    Dcmpl = 0x97,
    Dcmpg = 0x98,

    // Conditional branches
    Ifeq = 0x99,
    Ifne = 0x9a,
    Iflt = 0x9b,
    Ifge = 0x9c,
    Ifgt = 0x9d,
    Ifle = 0x9e,
    IfIcmpeq = 0x9f,
    IfIcmpne = 0xa0,
    IfIcmplt = 0xa1,
    IfIcmpge = 0xa2,
    IfIcmpgt = 0xa3,
    IfIcmple = 0xa4,
    IfAcmpeq = 0xa5,
    IfAcmpne = 0xa6,

    // Unconditional control transfer
    Goto = 0xa7,
    Jsr = 0xa8,
    /// Return from a JSR subroutine. A local-variable op, not a branch.
    Ret = 0xa9,
    Tableswitch = 0xaa,
    Lookupswitch = 0xab,

    // Returns
    Ireturn = 0xac,
    Lreturn = 0xad,
    Freturn = 0xae,
    Dreturn = 0xaf,
    Areturn = 0xb0,
    Return = 0xb1,

    // Field access
    Getstatic = 0xb2,
    Putstatic = 0xb3,
    Getfield = 0xb4,
    Putfield = 0xb5,

    // Method invocation
    Invokevirtual = 0xb6,
    Invokespecial = 0xb7,
    Invokestatic = 0xb8,
    Invokeinterface = 0xb9,

    // Objects and arrays
    New = 0xbb,
    Newarray = 0xbc,
    Anewarray = 0xbd,
    Arraylength = 0xbe,
    Athrow = 0xbf,
    Checkcast = 0xc0,
    Instanceof = 0xc1,
    Monitorenter = 0xc2,
    Monitorexit = 0xc3,
    Multianewarray = 0xc5,
    Ifnull = 0xc6,
    Ifnonnull = 0xc7,
}

/// All opcodes, in discriminant order.
pub const ALL_OPCODES: [Opcode; 156] = [
    Opcode::Nop,
    Opcode::AconstNull,
    Opcode::IconstM1,
    Opcode::Iconst0,
    Opcode::Iconst1,
    Opcode::Iconst2,
    Opcode::Iconst3,
    Opcode::Iconst4,
    Opcode::Iconst5,
    Opcode::Lconst0,
    Opcode::Lconst1,
    Opcode::Fconst0,
    Opcode::Fconst1,
    Opcode::Fconst2,
    Opcode::Dconst0,
    Opcode::Dconst1,
    Opcode::Bipush,
    Opcode::Sipush,
    Opcode::Ldc,
    Opcode::Iload,
    Opcode::Lload,
    Opcode::Fload,
    Opcode::Dload,
    Opcode::Aload,
    Opcode::Iaload,
    Opcode::Laload,
    Opcode::Faload,
    Opcode::Daload,
    Opcode::Aaload,
    Opcode::Baload,
    Opcode::Caload,
    Opcode::Saload,
    Opcode::Istore,
    Opcode::Lstore,
    Opcode::Fstore,
    Opcode::Dstore,
    Opcode::Astore,
    Opcode::Iastore,
    Opcode::Lastore,
    Opcode::Fastore,
    Opcode::Dastore,
    Opcode::Aastore,
    Opcode::Bastore,
    Opcode::Castore,
    Opcode::Sastore,
    Opcode::Pop,
    Opcode::Pop2,
    Opcode::Dup,
    Opcode::DupX1,
    Opcode::DupX2,
    Opcode::Dup2,
    Opcode::Dup2X1,
    Opcode::Dup2X2,
    Opcode::Swap,
    Opcode::Iadd,
    Opcode::Ladd,
    Opcode::Fadd,
    Opcode::Dadd,
    Opcode::Isub,
    Opcode::Lsub,
    Opcode::Fsub,
    Opcode::Dsub,
    Opcode::Imul,
    Opcode::Lmul,
    Opcode::Fmul,
    Opcode::Dmul,
    Opcode::Idiv,
    Opcode::Ldiv,
    Opcode::Fdiv,
    Opcode::Ddiv,
    Opcode::Irem,
    Opcode::Lrem,
    Opcode::Frem,
    Opcode::Drem,
    Opcode::Ineg,
    Opcode::Lneg,
    Opcode::Fneg,
    Opcode::Dneg,
    Opcode::Ishl,
    Opcode::Lshl,
    Opcode::Ishr,
    Opcode::Lshr,
    Opcode::Iushr,
    Opcode::Lushr,
    Opcode::Iand,
    Opcode::Land,
    Opcode::Ior,
    Opcode::Lor,
    Opcode::Ixor,
    Opcode::Lxor,
    Opcode::Iinc,
    Opcode::I2l,
    Opcode::I2f,
    Opcode::I2d,
    Opcode::L2i,
    Opcode::L2f,
    Opcode::L2d,
    Opcode::F2i,
    Opcode::F2l,
    Opcode::F2d,
    Opcode::D2i,
    Opcode::D2l,
    Opcode::D2f,
    Opcode::I2b,
    Opcode::I2c,
    Opcode::I2s,
    Opcode::Lcmp,
    Opcode::Fcmpl,
    Opcode::Fcmpg,
    Opcode::Dcmpl,
    Opcode::Dcmpg,
    Opcode::Ifeq,
    Opcode::Ifne,
    Opcode::Iflt,
    Opcode::Ifge,
    Opcode::Ifgt,
    Opcode::Ifle,
    Opcode::IfIcmpeq,
    Opcode::IfIcmpne,
    Opcode::IfIcmplt,
    Opcode::IfIcmpge,
    Opcode::IfIcmpgt,
    Opcode::IfIcmple,
    Opcode::IfAcmpeq,
    Opcode::IfAcmpne,
    Opcode::Goto,
    Opcode::Jsr,
    Opcode::Ret,
    Opcode::Tableswitch,
    Opcode::Lookupswitch,
    Opcode::Ireturn,
    Opcode::Lreturn,
    Opcode::Freturn,
    Opcode::Dreturn,
    Opcode::Areturn,
    Opcode::Return,
    Opcode::Getstatic,
    Opcode::Putstatic,
    Opcode::Getfield,
    Opcode::Putfield,
    Opcode::Invokevirtual,
    Opcode::Invokespecial,
    Opcode::Invokestatic,
    Opcode::Invokeinterface,
    Opcode::New,
    Opcode::Newarray,
    Opcode::Anewarray,
    Opcode::Arraylength,
    Opcode::Athrow,
    Opcode::Checkcast,
    Opcode::Instanceof,
    Opcode::Monitorenter,
    Opcode::Monitorexit,
    Opcode::Multianewarray,
    Opcode::Ifnull,
    Opcode::Ifnonnull,
];

impl Opcode {
    /// Uppercase mnemonic, as printed by the disassembler.
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Opcode::Nop => "NOP",
            Opcode::AconstNull => "ACONST_NULL",
            Opcode::IconstM1 => "ICONST_M1",
            Opcode::Iconst0 => "ICONST_0",
            Opcode::Iconst1 => "ICONST_1",
            Opcode::Iconst2 => "ICONST_2",
            Opcode::Iconst3 => "ICONST_3",
            Opcode::Iconst4 => "ICONST_4",
            Opcode::Iconst5 => "ICONST_5",
            Opcode::Lconst0 => "LCONST_0",
            Opcode::Lconst1 => "LCONST_1",
            Opcode::Fconst0 => "FCONST_0",
            Opcode::Fconst1 => "FCONST_1",
            Opcode::Fconst2 => "FCONST_2",
            Opcode::Dconst0 => "DCONST_0",
            Opcode::Dconst1 => "DCONST_1",
            Opcode::Bipush => "BIPUSH",
            Opcode::Sipush => "SIPUSH",
            Opcode::Ldc => "LDC",
            Opcode::Iload => "ILOAD",
            Opcode::Lload => "LLOAD",
            Opcode::Fload => "FLOAD",
            Opcode::Dload => "DLOAD",
            Opcode::Aload => "ALOAD",
            Opcode::Iaload => "IALOAD",
            Opcode::Laload => "LALOAD",
            Opcode::Faload => "FALOAD",
            Opcode::Daload => "DALOAD",
            Opcode::Aaload => "AALOAD",
            Opcode::Baload => "BALOAD",
            Opcode::Caload => "CALOAD",
            Opcode::Saload => "SALOAD",
            Opcode::Istore => "ISTORE",
            Opcode::Lstore => "LSTORE",
            Opcode::Fstore => "FSTORE",
            Opcode::Dstore => "DSTORE",
            Opcode::Astore => "ASTORE",
            Opcode::Iastore => "IASTORE",
            Opcode::Lastore => "LASTORE",
            Opcode::Fastore => "FASTORE",
            Opcode::Dastore => "DASTORE",
            Opcode::Aastore => "AASTORE",
            Opcode::Bastore => "BASTORE",
            Opcode::Castore => "CASTORE",
            Opcode::Sastore => "SASTORE",
            Opcode::Pop => "POP",
            Opcode::Pop2 => "POP2",
            Opcode::Dup => "DUP",
            Opcode::DupX1 => "DUP_X1",
            Opcode::DupX2 => "DUP_X2",
            Opcode::Dup2 => "DUP2",
            Opcode::Dup2X1 => "DUP2_X1",
            Opcode::Dup2X2 => "DUP2_X2",
            Opcode::Swap => "SWAP",
            Opcode::Iadd => "IADD",
            Opcode::Ladd => "LADD",
            Opcode::Fadd => "FADD",
            Opcode::Dadd => "DADD",
            Opcode::Isub => "ISUB",
            Opcode::Lsub => "LSUB",
            Opcode::Fsub => "FSUB",
            Opcode::Dsub => "DSUB",
            Opcode::Imul => "IMUL",
            Opcode::Lmul => "LMUL",
            Opcode::Fmul => "FMUL",
            Opcode::Dmul => "DMUL",
            Opcode::Idiv => "IDIV",
            Opcode::Ldiv => "LDIV",
            Opcode::Fdiv => "FDIV",
            Opcode::Ddiv => "DDIV",
            Opcode::Irem => "IREM",
            Opcode::Lrem => "LREM",
            Opcode::Frem => "FREM",
            Opcode::Drem => "DREM",
            Opcode::Ineg => "INEG",
            Opcode::Lneg => "LNEG",
            Opcode::Fneg => "FNEG",
            Opcode::Dneg => "DNEG",
            Opcode::Ishl => "ISHL",
            Opcode::Lshl => "LSHL",
            Opcode::Ishr => "ISHR",
            Opcode::Lshr => "LSHR",
            Opcode::Iushr => "IUSHR",
            Opcode::Lushr => "LUSHR",
            Opcode::Iand => "IAND",
            Opcode::Land => "LAND",
            Opcode::Ior => "IOR",
            Opcode::Lor => "LOR",
            Opcode::Ixor => "IXOR",
            Opcode::Lxor => "LXOR",
            Opcode::Iinc => "IINC",
            Opcode::I2l => "I2L",
            Opcode::I2f => "I2F",
            Opcode::I2d => "I2D",
            Opcode::L2i => "L2I",
            Opcode::L2f => "L2F",
            Opcode::L2d => "L2D",
            Opcode::F2i => "F2I",
            Opcode::F2l => "F2L",
            Opcode::F2d => "F2D",
            Opcode::D2i => "D2I",
            Opcode::D2l => "D2L",
            Opcode::D2f => "D2F",
            Opcode::I2b => "I2B",
            Opcode::I2c => "I2C",
            Opcode::I2s => "I2S",
            Opcode::Lcmp => "LCMP",
            Opcode::Fcmpl => "FCMPL",
            Opcode::Fcmpg => "FCMPG",
            Opcode::Dcmpl => "DCMPL",
            Opcode::Dcmpg => "DCMPG",
            Opcode::Ifeq => "IFEQ",
            Opcode::Ifne => "IFNE",
            Opcode::Iflt => "IFLT",
            Opcode::Ifge => "IFGE",
            Opcode::Ifgt => "IFGT",
            Opcode::Ifle => "IFLE",
            Opcode::IfIcmpeq => "IF_ICMPEQ",
            Opcode::IfIcmpne => "IF_ICMPNE",
            Opcode::IfIcmplt => "IF_ICMPLT",
            Opcode::IfIcmpge => "IF_ICMPGE",
            Opcode::IfIcmpgt => "IF_ICMPGT",
            Opcode::IfIcmple => "IF_ICMPLE",
            Opcode::IfAcmpeq => "IF_ACMPEQ",
            Opcode::IfAcmpne => "IF_ACMPNE",
            Opcode::Goto => "GOTO",
            Opcode::Jsr => "JSR",
            Opcode::Ret => "RET",
            Opcode::Tableswitch => "TABLESWITCH",
            Opcode::Lookupswitch => "LOOKUPSWITCH",
            Opcode::Ireturn => "IRETURN",
            Opcode::Lreturn => "LRETURN",
            Opcode::Freturn => "FRETURN",
            Opcode::Dreturn => "DRETURN",
            Opcode::Areturn => "ARETURN",
            Opcode::Return => "RETURN",
            Opcode::Getstatic => "GETSTATIC",
            Opcode::Putstatic => "PUTSTATIC",
            Opcode::Getfield => "GETFIELD",
            Opcode::Putfield => "PUTFIELD",
            Opcode::Invokevirtual => "INVOKEVIRTUAL",
            Opcode::Invokespecial => "INVOKESPECIAL",
            Opcode::Invokestatic => "INVOKESTATIC",
            Opcode::Invokeinterface => "INVOKEINTERFACE",
            Opcode::New => "NEW",
            Opcode::Newarray => "NEWARRAY",
            Opcode::Anewarray => "ANEWARRAY",
            Opcode::Arraylength => "ARRAYLENGTH",
            Opcode::Athrow => "ATHROW",
            Opcode::Checkcast => "CHECKCAST",
            Opcode::Instanceof => "INSTANCEOF",
            Opcode::Monitorenter => "MONITORENTER",
            Opcode::Monitorexit => "MONITOREXIT",
            Opcode::Multianewarray => "MULTIANEWARRAY",
            Opcode::Ifnull => "IFNULL",
            Opcode::Ifnonnull => "IFNONNULL",
        }
    }

    /// Look an opcode up by mnemonic, case-insensitively.
    pub fn from_mnemonic(s: &str) -> Option<Opcode> {
        ALL_OPCODES
            .iter()
            .find(|op| op.mnemonic().eq_ignore_ascii_case(s))
            .copied()
    }

    /// Operand-shape category.
    pub fn kind(&self) -> OpKind {
        use Opcode::*;
        match self {
            Bipush | Sipush | Newarray => OpKind::Imm,
            Ldc => OpKind::Ldc,
            Iload | Lload | Fload | Dload | Aload | Istore | Lstore | Fstore | Dstore
            | Astore | Ret => OpKind::Var,
            Iinc => OpKind::Iinc,
            Ifeq | Ifne | Iflt | Ifge | Ifgt | Ifle | IfIcmpeq | IfIcmpne | IfIcmplt
            | IfIcmpge | IfIcmpgt | IfIcmple | IfAcmpeq | IfAcmpne | Goto | Jsr | Ifnull
            | Ifnonnull => OpKind::Jump,
            Tableswitch => OpKind::TableSwitch,
            Lookupswitch => OpKind::LookupSwitch,
            Getstatic | Putstatic | Getfield | Putfield => OpKind::Field,
            Invokevirtual | Invokespecial | Invokestatic | Invokeinterface => OpKind::Method,
            New | Anewarray | Checkcast | Instanceof => OpKind::Type,
            Multianewarray => OpKind::MultiArray,
            _ => OpKind::None,
        }
    }

    /// True for the six return opcodes.
    pub fn is_return(&self) -> bool {
        matches!(
            self,
            Opcode::Ireturn
                | Opcode::Lreturn
                | Opcode::Freturn
                | Opcode::Dreturn
                | Opcode::Areturn
                | Opcode::Return
        )
    }

    /// True for every opcode that terminates the method: a return or ATHROW.
    pub fn is_exit(&self) -> bool {
        self.is_return() || *self == Opcode::Athrow
    }
}

/// NEWARRAY element-kind operand table.
pub const ARRAY_KINDS: [(i32, &str); 8] = [
    (4, "T_BOOLEAN"),
    (5, "T_CHAR"),
    (6, "T_FLOAT"),
    (7, "T_DOUBLE"),
    (8, "T_BYTE"),
    (9, "T_SHORT"),
    (10, "T_INT"),
    (11, "T_LONG"),
];

/// Human name for a NEWARRAY element-kind code.
pub fn array_kind_name(code: i32) -> Option<&'static str> {
    ARRAY_KINDS
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| *name)
}

/// Inverse of [`array_kind_name`], case-insensitive.
pub fn array_kind_code(name: &str) -> Option<i32> {
    ARRAY_KINDS
        .iter()
        .find(|(_, n)| n.eq_ignore_ascii_case(name))
        .map(|(c, _)| *c)
}
