use std::collections::HashMap;
use std::fmt;

/// A fully resolved Mica type.
#[derive(Debug, Clone, PartialEq)]
pub enum MicaType {
    Int,
    Float,
    Bool,
    String,
    /// The type of calls that return nothing.
    Unit,
    /// The type of the `nil` literal before it is matched against a pointer
    /// or interface.
    Nil,
    /// Reference to a declared type by name. The table holds its underlying
    /// type and method set.
    Named(String),
    Pointer(Box<MicaType>),
    Fn(Vec<MicaType>, Box<MicaType>),
    /// Fields in declaration order. Equality is structural, so two struct
    /// types match only when names and field types line up exactly.
    Struct(Vec<(String, MicaType)>),
    /// Methods in declaration order, with embedded interfaces already
    /// flattened in.
    Interface(Vec<Method>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Method {
    pub name: String,
    /// Always a `MicaType::Fn`.
    pub sig: MicaType,
}

impl fmt::Display for MicaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MicaType::Int => write!(f, "int"),
            MicaType::Float => write!(f, "float"),
            MicaType::Bool => write!(f, "bool"),
            MicaType::String => write!(f, "string"),
            MicaType::Unit => write!(f, "()"),
            MicaType::Nil => write!(f, "nil"),
            MicaType::Named(name) => write!(f, "{name}"),
            MicaType::Pointer(inner) => write!(f, "*{inner}"),
            MicaType::Fn(params, ret) => {
                write!(f, "func(")?;
                for (i, p) in params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{p}")?;
                }
                write!(f, ")")?;
                if **ret != MicaType::Unit {
                    write!(f, " {ret}")?;
                }
                Ok(())
            }
            MicaType::Struct(fields) => {
                write!(f, "struct {{")?;
                for (i, (name, ty)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, "; ")?;
                    }
                    write!(f, " {name} {ty}")?;
                }
                write!(f, " }}")
            }
            MicaType::Interface(methods) => {
                if methods.is_empty() {
                    return write!(f, "interface {{}}");
                }
                write!(f, "interface {{")?;
                for (i, m) in methods.iter().enumerate() {
                    if i > 0 {
                        write!(f, ";")?;
                    }
                    write!(f, " {}", m.name)?;
                }
                write!(f, " }}")
            }
        }
    }
}

/// Resolved information about one `type` declaration.
#[derive(Debug, Clone)]
pub struct NamedInfo {
    /// The underlying type with all name indirection removed; never a
    /// `Named` at the top level.
    pub underlying: MicaType,
    /// Methods declared with this type as receiver. Does not include the
    /// underlying interface's methods.
    pub methods: Vec<Method>,
}

/// All declared named types of a file, keyed by name.
#[derive(Debug, Default)]
pub struct TypeTable {
    pub(crate) named: HashMap<String, NamedInfo>,
}

impl TypeTable {
    pub fn lookup_underlying(&self, name: &str) -> Option<&MicaType> {
        self.named.get(name).map(|info| &info.underlying)
    }

    pub fn receiver_methods(&self, name: &str) -> &[Method] {
        self.named.get(name).map(|info| info.methods.as_slice()).unwrap_or(&[])
    }

    /// Look up a field or method on `ty`, the way a selector expression
    /// does. Dereferences one level of pointer, then tries receiver methods
    /// before the underlying type's members.
    pub fn member(&self, ty: &MicaType, name: &str) -> Option<MicaType> {
        let ty = match ty {
            MicaType::Pointer(inner) => inner,
            other => other,
        };
        match ty {
            MicaType::Named(type_name) => {
                let info = self.named.get(type_name)?;
                if let Some(m) = info.methods.iter().find(|m| m.name == name) {
                    return Some(m.sig.clone());
                }
                self.member(&info.underlying, name)
            }
            MicaType::Interface(methods) => {
                methods.iter().find(|m| m.name == name).map(|m| m.sig.clone())
            }
            MicaType::Struct(fields) => {
                fields.iter().find(|(f, _)| f == name).map(|(_, t)| t.clone())
            }
            _ => None,
        }
    }
}
