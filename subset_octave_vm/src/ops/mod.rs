//! Operators: registry, kernels and dispatch.
//!
//! The registry maps `(operator, operand type tags)` to kernel functions.
//! It is filled once at startup by the installers in `install` and read
//! without locks afterwards. The dispatcher looks up the exact operand
//! tags first and walks the promotion ladder (`promote`) when no kernel
//! matches.

pub mod assign;
pub mod dispatch;
pub mod install;
pub mod kernels;
pub mod promote;
pub mod registry;

use std::fmt;

pub use assign::assign_element;
pub use dispatch::{binary_op, concat, concat_all, matrix_literal, unary_op};
pub use registry::{global, initialize_with, OperatorRegistry, RegistryBuilder, TypeInfoDump};

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BinaryOp {
    Add,
    Sub,
    /// Matrix product `*`
    Mul,
    /// Right division `/`
    Div,
    /// Matrix power `^`
    Pow,
    /// Left division `\`
    LDiv,
    Lt,
    Le,
    Eq,
    Ge,
    Gt,
    Ne,
    ElMul,
    ElDiv,
    ElPow,
    ElLDiv,
    ElAnd,
    ElOr,
}

impl BinaryOp {
    pub const ALL: [BinaryOp; 18] = [
        BinaryOp::Add,
        BinaryOp::Sub,
        BinaryOp::Mul,
        BinaryOp::Div,
        BinaryOp::Pow,
        BinaryOp::LDiv,
        BinaryOp::Lt,
        BinaryOp::Le,
        BinaryOp::Eq,
        BinaryOp::Ge,
        BinaryOp::Gt,
        BinaryOp::Ne,
        BinaryOp::ElMul,
        BinaryOp::ElDiv,
        BinaryOp::ElPow,
        BinaryOp::ElLDiv,
        BinaryOp::ElAnd,
        BinaryOp::ElOr,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Pow => "^",
            BinaryOp::LDiv => "\\",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Eq => "==",
            BinaryOp::Ge => ">=",
            BinaryOp::Gt => ">",
            BinaryOp::Ne => "!=",
            BinaryOp::ElMul => ".*",
            BinaryOp::ElDiv => "./",
            BinaryOp::ElPow => ".^",
            BinaryOp::ElLDiv => ".\\",
            BinaryOp::ElAnd => "&",
            BinaryOp::ElOr => "|",
        }
    }

    /// Parse an evaluator operator symbol. `~=` and `**` are accepted as
    /// aliases.
    pub fn from_symbol(sym: &str) -> Option<BinaryOp> {
        match sym {
            "~=" => Some(BinaryOp::Ne),
            "**" => Some(BinaryOp::Pow),
            ".**" => Some(BinaryOp::ElPow),
            _ => BinaryOp::ALL.iter().copied().find(|op| op.as_str() == sym),
        }
    }

    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            BinaryOp::Lt | BinaryOp::Le | BinaryOp::Eq | BinaryOp::Ge | BinaryOp::Gt | BinaryOp::Ne
        )
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum UnaryOp {
    Not,
    UPlus,
    UMinus,
    /// `.'`
    Transpose,
    /// `'`
    Hermitian,
    Incr,
    Decr,
}

impl UnaryOp {
    pub const ALL: [UnaryOp; 7] = [
        UnaryOp::Not,
        UnaryOp::UPlus,
        UnaryOp::UMinus,
        UnaryOp::Transpose,
        UnaryOp::Hermitian,
        UnaryOp::Incr,
        UnaryOp::Decr,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            UnaryOp::Not => "!",
            UnaryOp::UPlus => "+",
            UnaryOp::UMinus => "-",
            UnaryOp::Transpose => ".'",
            UnaryOp::Hermitian => "'",
            UnaryOp::Incr => "++",
            UnaryOp::Decr => "--",
        }
    }

    pub fn from_symbol(sym: &str) -> Option<UnaryOp> {
        match sym {
            "~" => Some(UnaryOp::Not),
            _ => UnaryOp::ALL.iter().copied().find(|op| op.as_str() == sym),
        }
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbols_round_trip() {
        for op in BinaryOp::ALL {
            assert_eq!(BinaryOp::from_symbol(op.as_str()), Some(op));
        }
        for op in UnaryOp::ALL {
            assert_eq!(UnaryOp::from_symbol(op.as_str()), Some(op));
        }
        assert_eq!(BinaryOp::from_symbol("~="), Some(BinaryOp::Ne));
        assert_eq!(UnaryOp::from_symbol("~"), Some(UnaryOp::Not));
        assert_eq!(BinaryOp::from_symbol("&&"), None);
    }
}
