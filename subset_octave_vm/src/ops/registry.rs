//! Operator registry.
//!
//! A `RegistryBuilder` collects kernels during startup; `build()` freezes it
//! into an `OperatorRegistry` that only supports lookups. The process-wide
//! table lives in a `OnceCell` and is created on first use by `global()`,
//! or explicitly by `initialize_with()`.
//!
//! Each kernel is identified by its Rust type: registering the same function
//! twice under one key is a no-op, while a different function under an
//! occupied key is a `StartupRegistrationConflict`.

use std::any::{type_name, TypeId};
use std::collections::HashMap;
use std::fmt;

use once_cell::sync::OnceCell;
use serde::Serialize;

use super::{install, BinaryOp, UnaryOp};
use crate::error::{VmError, VmResult};
use crate::types::TypeTag;
use crate::value::Value;

pub type UnaryFn = dyn Fn(&Value) -> VmResult<Value> + Send + Sync;
pub type BinaryFn = dyn Fn(&Value, &Value) -> VmResult<Value> + Send + Sync;
/// Concatenation along a 0-based dimension
pub type ConcatFn = dyn Fn(&Value, &Value, usize) -> VmResult<Value> + Send + Sync;

/// A registered kernel and its identity
pub struct Kernel<F: ?Sized> {
    name: &'static str,
    id: TypeId,
    func: Box<F>,
}

impl<F: ?Sized> Kernel<F> {
    /// Rust type name of the registered function
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn func(&self) -> &F {
        &self.func
    }
}

impl<F: ?Sized> fmt::Debug for Kernel<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Kernel").field("name", &self.name).finish()
    }
}

fn insert<K, F>(
    table: &mut HashMap<K, Kernel<F>>,
    key: K,
    kernel: Kernel<F>,
    describe: impl FnOnce(&K) -> String,
) -> VmResult<()>
where
    K: std::hash::Hash + Eq,
    F: ?Sized,
{
    if let Some(existing) = table.get(&key) {
        if existing.id == kernel.id {
            return Ok(());
        }
        return Err(VmError::StartupRegistrationConflict {
            key: describe(&key),
            existing: existing.name,
            replacement: kernel.name,
        });
    }
    table.insert(key, kernel);
    Ok(())
}

/// Mutable registry used during startup
#[derive(Default)]
pub struct RegistryBuilder {
    unary: HashMap<(UnaryOp, TypeTag), Kernel<UnaryFn>>,
    binary: HashMap<(BinaryOp, TypeTag, TypeTag), Kernel<BinaryFn>>,
    concat: HashMap<(TypeTag, TypeTag), Kernel<ConcatFn>>,
    assign_conv: HashMap<(TypeTag, TypeTag), TypeTag>,
}

impl fmt::Debug for RegistryBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryBuilder")
            .field("unary", &self.unary.len())
            .field("binary", &self.binary.len())
            .field("concat", &self.concat.len())
            .field("assign_conv", &self.assign_conv.len())
            .finish()
    }
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_unary<F>(&mut self, op: UnaryOp, operand: TypeTag, f: F) -> VmResult<()>
    where
        F: Fn(&Value) -> VmResult<Value> + Send + Sync + 'static,
    {
        let kernel = Kernel {
            name: type_name::<F>(),
            id: TypeId::of::<F>(),
            func: Box::new(f) as Box<UnaryFn>,
        };
        insert(&mut self.unary, (op, operand), kernel, |(op, t)| {
            format!("unary '{}' ({})", op, t)
        })
    }

    pub fn register_binary<F>(
        &mut self,
        op: BinaryOp,
        left: TypeTag,
        right: TypeTag,
        f: F,
    ) -> VmResult<()>
    where
        F: Fn(&Value, &Value) -> VmResult<Value> + Send + Sync + 'static,
    {
        let kernel = Kernel {
            name: type_name::<F>(),
            id: TypeId::of::<F>(),
            func: Box::new(f) as Box<BinaryFn>,
        };
        insert(&mut self.binary, (op, left, right), kernel, |(op, l, r)| {
            format!("binary '{}' ({}, {})", op, l, r)
        })
    }

    pub fn register_concat<F>(&mut self, left: TypeTag, right: TypeTag, f: F) -> VmResult<()>
    where
        F: Fn(&Value, &Value, usize) -> VmResult<Value> + Send + Sync + 'static,
    {
        let kernel = Kernel {
            name: type_name::<F>(),
            id: TypeId::of::<F>(),
            func: Box::new(f) as Box<ConcatFn>,
        };
        insert(&mut self.concat, (left, right), kernel, |(l, r)| {
            format!("concatenation ({}, {})", l, r)
        })
    }

    /// Record that storing a `value`-typed element into a `container`
    /// requires converting the container (and the value) to `result`.
    pub fn register_assign_conversion(
        &mut self,
        container: TypeTag,
        value: TypeTag,
        result: TypeTag,
    ) -> VmResult<()> {
        match self.assign_conv.get(&(container, value)) {
            Some(&existing) if existing == result => Ok(()),
            Some(&existing) => Err(VmError::StartupRegistrationConflict {
                key: format!("assignment conversion ({}, {})", container, value),
                existing: existing.name(),
                replacement: result.name(),
            }),
            None => {
                self.assign_conv.insert((container, value), result);
                Ok(())
            }
        }
    }

    pub fn build(self) -> OperatorRegistry {
        OperatorRegistry {
            unary: self.unary,
            binary: self.binary,
            concat: self.concat,
            assign_conv: self.assign_conv,
        }
    }
}

/// Frozen operator table
pub struct OperatorRegistry {
    unary: HashMap<(UnaryOp, TypeTag), Kernel<UnaryFn>>,
    binary: HashMap<(BinaryOp, TypeTag, TypeTag), Kernel<BinaryFn>>,
    concat: HashMap<(TypeTag, TypeTag), Kernel<ConcatFn>>,
    assign_conv: HashMap<(TypeTag, TypeTag), TypeTag>,
}

impl fmt::Debug for OperatorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperatorRegistry")
            .field("unary", &self.unary.len())
            .field("binary", &self.binary.len())
            .field("concat", &self.concat.len())
            .field("assign_conv", &self.assign_conv.len())
            .finish()
    }
}

impl OperatorRegistry {
    /// Build a registry with the default kernel set
    pub fn with_defaults() -> VmResult<Self> {
        let mut builder = RegistryBuilder::new();
        install::install_default(&mut builder)?;
        Ok(builder.build())
    }

    pub fn lookup_unary(&self, op: UnaryOp, operand: TypeTag) -> Option<&Kernel<UnaryFn>> {
        self.unary.get(&(op, operand))
    }

    pub fn lookup_binary(
        &self,
        op: BinaryOp,
        left: TypeTag,
        right: TypeTag,
    ) -> Option<&Kernel<BinaryFn>> {
        self.binary.get(&(op, left, right))
    }

    pub fn lookup_concat(&self, left: TypeTag, right: TypeTag) -> Option<&Kernel<ConcatFn>> {
        self.concat.get(&(left, right))
    }

    pub fn lookup_assign_conversion(&self, container: TypeTag, value: TypeTag) -> Option<TypeTag> {
        self.assign_conv.get(&(container, value)).copied()
    }

    /// `typeinfo` names of every runtime type
    pub fn type_names(&self) -> Vec<&'static str> {
        TypeTag::ALL.iter().map(|t| t.name()).collect()
    }

    /// Serializable snapshot of the whole table, sorted for stable output
    pub fn dump(&self) -> TypeInfoDump {
        let mut unary: Vec<UnaryEntry> = self
            .unary
            .iter()
            .map(|(&(op, t), k)| UnaryEntry {
                op: op.as_str(),
                operand: t.name(),
                kernel: k.name,
            })
            .collect();
        unary.sort_by(|a, b| (a.op, a.operand).cmp(&(b.op, b.operand)));

        let mut binary: Vec<BinaryEntry> = self
            .binary
            .iter()
            .map(|(&(op, l, r), k)| BinaryEntry {
                op: op.as_str(),
                left: l.name(),
                right: r.name(),
                kernel: k.name,
            })
            .collect();
        binary.sort_by(|a, b| (a.op, a.left, a.right).cmp(&(b.op, b.left, b.right)));

        let mut concat: Vec<ConcatEntry> = self
            .concat
            .iter()
            .map(|(&(l, r), k)| ConcatEntry {
                left: l.name(),
                right: r.name(),
                kernel: k.name,
            })
            .collect();
        concat.sort_by(|a, b| (a.left, a.right).cmp(&(b.left, b.right)));

        let mut assign_conversions: Vec<AssignEntry> = self
            .assign_conv
            .iter()
            .map(|(&(c, v), &r)| AssignEntry {
                container: c.name(),
                value: v.name(),
                result: r.name(),
            })
            .collect();
        assign_conversions.sort_by(|a, b| (a.container, a.value).cmp(&(b.container, b.value)));

        TypeInfoDump {
            types: self.type_names(),
            unary,
            binary,
            concat,
            assign_conversions,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UnaryEntry {
    pub op: &'static str,
    pub operand: &'static str,
    pub kernel: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct BinaryEntry {
    pub op: &'static str,
    pub left: &'static str,
    pub right: &'static str,
    pub kernel: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConcatEntry {
    pub left: &'static str,
    pub right: &'static str,
    pub kernel: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct AssignEntry {
    pub container: &'static str,
    pub value: &'static str,
    pub result: &'static str,
}

/// Registry contents as reported by `typeinfo --dump`
#[derive(Debug, Clone, Serialize)]
pub struct TypeInfoDump {
    pub types: Vec<&'static str>,
    pub unary: Vec<UnaryEntry>,
    pub binary: Vec<BinaryEntry>,
    pub concat: Vec<ConcatEntry>,
    pub assign_conversions: Vec<AssignEntry>,
}

static REGISTRY: OnceCell<OperatorRegistry> = OnceCell::new();

/// The process-wide registry, built with the default kernels on first use.
///
/// A registration conflict is returned from every call, so evaluation can
/// never start on a partial table.
pub fn global() -> VmResult<&'static OperatorRegistry> {
    REGISTRY.get_or_try_init(OperatorRegistry::with_defaults)
}

/// Install the process-wide registry with a custom installer. Fails if the
/// registry was already created.
pub fn initialize_with<F>(installer: F) -> VmResult<&'static OperatorRegistry>
where
    F: FnOnce(&mut RegistryBuilder) -> VmResult<()>,
{
    if REGISTRY.get().is_some() {
        return Err(VmError::internal("operator registry is already initialized"));
    }
    let mut builder = RegistryBuilder::new();
    installer(&mut builder)?;
    let registry = builder.build();
    REGISTRY
        .try_insert(registry)
        .map_err(|_| VmError::internal("operator registry is already initialized"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first(_: &Value, _: &Value) -> VmResult<Value> {
        Ok(Value::Scalar(1.0))
    }

    fn second(_: &Value, _: &Value) -> VmResult<Value> {
        Ok(Value::Scalar(2.0))
    }

    #[test]
    fn test_same_kernel_is_idempotent() {
        let mut b = RegistryBuilder::new();
        b.register_binary(BinaryOp::Add, TypeTag::Scalar, TypeTag::Scalar, first)
            .unwrap();
        b.register_binary(BinaryOp::Add, TypeTag::Scalar, TypeTag::Scalar, first)
            .unwrap();
        let reg = b.build();
        let k = reg
            .lookup_binary(BinaryOp::Add, TypeTag::Scalar, TypeTag::Scalar)
            .unwrap();
        assert!(k.name().ends_with("first"));
    }

    #[test]
    fn test_conflict_is_fatal() {
        let mut b = RegistryBuilder::new();
        b.register_binary(BinaryOp::Add, TypeTag::Scalar, TypeTag::Scalar, first)
            .unwrap();
        let err = b
            .register_binary(BinaryOp::Add, TypeTag::Scalar, TypeTag::Scalar, second)
            .unwrap_err();
        assert!(err.is_fatal());
        assert!(err.to_string().contains("binary '+' (scalar, scalar)"));
    }

    #[test]
    fn test_assign_conversion_conflict() {
        let mut b = RegistryBuilder::new();
        b.register_assign_conversion(TypeTag::Matrix, TypeTag::ComplexScalar, TypeTag::ComplexMatrix)
            .unwrap();
        b.register_assign_conversion(TypeTag::Matrix, TypeTag::ComplexScalar, TypeTag::ComplexMatrix)
            .unwrap();
        assert!(b
            .register_assign_conversion(TypeTag::Matrix, TypeTag::ComplexScalar, TypeTag::Matrix)
            .is_err());
    }

    #[test]
    fn test_default_dump_is_sorted() {
        let reg = OperatorRegistry::with_defaults().unwrap();
        let dump = reg.dump();
        assert_eq!(dump.types.len(), TypeTag::ALL.len());
        let keys: Vec<_> = dump.binary.iter().map(|e| (e.op, e.left, e.right)).collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
        assert!(dump
            .binary
            .iter()
            .any(|e| e.op == "+" && e.left == "matrix" && e.right == "matrix"));
    }
}
