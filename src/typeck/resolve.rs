use std::collections::{HashMap, HashSet};

use crate::diagnostics::CheckError;
use crate::parser::ast::{Decl, File, MethodSig, TypeDecl, TypeExpr};
use crate::span::{Span, Spanned};
use crate::typeck::types::{Method, MicaType, NamedInfo, TypeTable};

fn builtin_type(name: &str) -> Option<MicaType> {
    match name {
        "int" => Some(MicaType::Int),
        "float" => Some(MicaType::Float),
        "bool" => Some(MicaType::Bool),
        "string" => Some(MicaType::String),
        _ => None,
    }
}

/// Resolver environment for named types. The table builder and the finished
/// table both answer the two questions lowering needs: does this name exist,
/// and what does it stand for underneath.
pub(crate) trait NamedEnv {
    fn has(&self, name: &str) -> bool;
    fn underlying(&mut self, name: &str, span: Span) -> Result<MicaType, CheckError>;
}

/// Lower a syntactic type expression into a `MicaType`. Named references are
/// kept as `Named` so identity survives; interface embeds are flattened here
/// because the method set must be complete before shadow analysis runs.
pub(crate) fn lower_type(
    te: &Spanned<TypeExpr>,
    env: &mut dyn NamedEnv,
) -> Result<MicaType, CheckError> {
    match &te.node {
        TypeExpr::Named(name) => {
            if let Some(basic) = builtin_type(name) {
                return Ok(basic);
            }
            if env.has(name) {
                Ok(MicaType::Named(name.clone()))
            } else {
                Err(CheckError::type_err(format!("unknown type {name}"), te.span))
            }
        }
        TypeExpr::Pointer(inner) => Ok(MicaType::Pointer(Box::new(lower_type(inner, env)?))),
        TypeExpr::Func { params, return_type } => {
            let mut ptys = Vec::with_capacity(params.len());
            for p in params {
                ptys.push(lower_type(p, env)?);
            }
            let ret = match return_type {
                Some(rt) => lower_type(rt, env)?,
                None => MicaType::Unit,
            };
            Ok(MicaType::Fn(ptys, Box::new(ret)))
        }
        TypeExpr::Struct(fields) => {
            let mut out = Vec::with_capacity(fields.len());
            for f in fields {
                let ty = lower_type(&f.ty, env)?;
                if out.iter().any(|(n, _)| n == &f.name.node) {
                    return Err(CheckError::type_err(
                        format!("duplicate field {}", f.name.node),
                        f.name.span,
                    ));
                }
                out.push((f.name.node.clone(), ty));
            }
            Ok(MicaType::Struct(out))
        }
        TypeExpr::Interface { methods, embeds } => {
            let mut out: Vec<Method> = Vec::new();
            for embed in embeds {
                let name = match &embed.node {
                    TypeExpr::Named(n) => n,
                    _ => {
                        return Err(CheckError::type_err(
                            "embedded type must be an interface name",
                            embed.span,
                        ));
                    }
                };
                let under = env.underlying(name, embed.span)?;
                let embedded = match under {
                    MicaType::Interface(ms) => ms,
                    _ => {
                        return Err(CheckError::type_err(
                            format!("embedded type {name} is not an interface"),
                            embed.span,
                        ));
                    }
                };
                for m in embedded {
                    push_method(&mut out, m, embed.span)?;
                }
            }
            for sig in methods {
                let m = lower_method_sig(sig, env)?;
                push_method(&mut out, m, sig.name.span)?;
            }
            Ok(MicaType::Interface(out))
        }
    }
}

fn push_method(set: &mut Vec<Method>, m: Method, span: Span) -> Result<(), CheckError> {
    if let Some(existing) = set.iter().find(|e| e.name == m.name) {
        // Identical duplicates from diamond embedding are fine, conflicting
        // signatures are not.
        if existing.sig == m.sig {
            return Ok(());
        }
        return Err(CheckError::type_err(
            format!("duplicate method {} with conflicting signature", m.name),
            span,
        ));
    }
    set.push(m);
    Ok(())
}

fn lower_method_sig(sig: &MethodSig, env: &mut dyn NamedEnv) -> Result<Method, CheckError> {
    let mut ptys = Vec::with_capacity(sig.params.len());
    for p in &sig.params {
        ptys.push(lower_type(&p.ty, env)?);
    }
    let ret = match &sig.return_type {
        Some(rt) => lower_type(rt, env)?,
        None => MicaType::Unit,
    };
    Ok(Method {
        name: sig.name.node.clone(),
        sig: MicaType::Fn(ptys, Box::new(ret)),
    })
}

/// Builds the type table in dependency order. Underlyings are forced lazily
/// with memoization; a name reached while it is being forced is a cycle.
struct TableBuilder<'a> {
    decls: HashMap<String, &'a TypeDecl>,
    resolved: HashMap<String, MicaType>,
    visiting: HashSet<String>,
}

impl NamedEnv for TableBuilder<'_> {
    fn has(&self, name: &str) -> bool {
        self.decls.contains_key(name)
    }

    fn underlying(&mut self, name: &str, span: Span) -> Result<MicaType, CheckError> {
        self.force(name, span)
    }
}

impl<'a> TableBuilder<'a> {
    fn new(file: &'a File) -> Result<Self, CheckError> {
        let mut decls = HashMap::new();
        for decl in &file.decls {
            if let Decl::Type(td) = &decl.node {
                if decls.insert(td.name.node.clone(), td).is_some() {
                    return Err(CheckError::type_err(
                        format!("{} redeclared in this package", td.name.node),
                        td.name.span,
                    ));
                }
            }
        }
        Ok(Self { decls, resolved: HashMap::new(), visiting: HashSet::new() })
    }

    /// Resolve `name` down to a non-named underlying type.
    fn force(&mut self, name: &str, span: Span) -> Result<MicaType, CheckError> {
        if let Some(done) = self.resolved.get(name) {
            return Ok(done.clone());
        }
        if let Some(basic) = builtin_type(name) {
            return Ok(basic);
        }
        let td = match self.decls.get(name) {
            Some(td) => *td,
            None => {
                return Err(CheckError::type_err(format!("unknown type {name}"), span));
            }
        };
        if !self.visiting.insert(name.to_string()) {
            return Err(CheckError::type_err(
                format!("invalid recursive type {name}"),
                td.name.span,
            ));
        }
        let lowered = lower_type(&td.ty, self)?;
        // Chains of named types collapse to the final underlying.
        let underlying = match lowered {
            MicaType::Named(other) => self.force(&other, td.ty.span)?,
            other => other,
        };
        self.visiting.remove(name);
        self.resolved.insert(name.to_string(), underlying.clone());
        Ok(underlying)
    }
}

/// Resolve every type declaration in `file` and attach receiver methods.
pub fn build_type_table(file: &File) -> Result<TypeTable, CheckError> {
    let mut builder = TableBuilder::new(file)?;

    let names: Vec<(String, Span)> = builder
        .decls
        .iter()
        .map(|(n, td)| (n.clone(), td.name.span))
        .collect();
    for (name, span) in &names {
        builder.force(name, *span)?;
    }

    let mut named = HashMap::new();
    for (name, underlying) in builder.resolved {
        named.insert(name, NamedInfo { underlying, methods: Vec::new() });
    }
    let mut table = TypeTable { named };

    for decl in &file.decls {
        let Decl::Func(fd) = &decl.node else { continue };
        let Some(recv) = &fd.receiver else { continue };

        let recv_ty = table.resolve(&recv.ty)?;
        let base = match &recv_ty {
            MicaType::Named(n) => n.clone(),
            MicaType::Pointer(inner) => match inner.as_ref() {
                MicaType::Named(n) => n.clone(),
                _ => {
                    return Err(CheckError::type_err(
                        "receiver type must be a declared type or pointer to one",
                        recv.ty.span,
                    ));
                }
            },
            _ => {
                return Err(CheckError::type_err(
                    "receiver type must be a declared type or pointer to one",
                    recv.ty.span,
                ));
            }
        };
        if matches!(table.lookup_underlying(&base), Some(MicaType::Interface(_))) {
            return Err(CheckError::type_err(
                format!("cannot declare method on interface type {base}"),
                recv.ty.span,
            ));
        }

        let mut ptys = Vec::with_capacity(fd.params.len());
        for p in &fd.params {
            ptys.push(table.resolve(&p.ty)?);
        }
        let ret = match &fd.return_type {
            Some(rt) => table.resolve(rt)?,
            None => MicaType::Unit,
        };
        let method = Method {
            name: fd.name.node.clone(),
            sig: MicaType::Fn(ptys, Box::new(ret)),
        };

        let info = table
            .named
            .get_mut(&base)
            .ok_or_else(|| CheckError::type_err(format!("unknown type {base}"), recv.ty.span))?;
        if info.methods.iter().any(|m| m.name == method.name) {
            return Err(CheckError::type_err(
                format!("method {}.{} redeclared", base, method.name),
                fd.name.span,
            ));
        }
        info.methods.push(method);
    }

    Ok(table)
}

/// Adapter so a finished table can serve as the lowering environment for
/// type expressions found in function signatures and bodies.
struct TableEnv<'a>(&'a TypeTable);

impl NamedEnv for TableEnv<'_> {
    fn has(&self, name: &str) -> bool {
        self.0.named.contains_key(name)
    }

    fn underlying(&mut self, name: &str, span: Span) -> Result<MicaType, CheckError> {
        if let Some(basic) = builtin_type(name) {
            return Ok(basic);
        }
        self.0
            .lookup_underlying(name)
            .cloned()
            .ok_or_else(|| CheckError::type_err(format!("unknown type {name}"), span))
    }
}

impl TypeTable {
    /// Lower a type expression against the declared types of this table.
    pub fn resolve(&self, te: &Spanned<TypeExpr>) -> Result<MicaType, CheckError> {
        lower_type(te, &mut TableEnv(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::lex;
    use crate::parser::Parser;

    fn table(src: &str) -> Result<TypeTable, CheckError> {
        let tokens = lex(src).unwrap();
        let file = Parser::new(&tokens, src).parse_file().unwrap();
        build_type_table(&file)
    }

    #[test]
    fn embedding_flattens_methods() {
        let t = table(
            "type DB interface {\n\tquery(x int) bool\n}\ntype TX interface {\n\tDB\n\tcommit(s string)\n}\n",
        )
        .unwrap();
        match t.lookup_underlying("TX").unwrap() {
            MicaType::Interface(methods) => {
                assert_eq!(methods.len(), 2);
                assert_eq!(methods[0].name, "query");
                assert_eq!(methods[1].name, "commit");
            }
            other => panic!("expected interface, got {other:?}"),
        }
    }

    #[test]
    fn recursive_interface_is_an_error() {
        let err = table("type A interface {\n\tB\n}\ntype B interface {\n\tA\n}\n").unwrap_err();
        assert!(err.to_string().contains("invalid recursive type"));
    }

    #[test]
    fn named_chain_collapses() {
        let t = table("type A int\ntype B A\n").unwrap();
        assert_eq!(t.lookup_underlying("B"), Some(&MicaType::Int));
    }

    #[test]
    fn unknown_type_is_an_error() {
        let err = table("type A Zap\n").unwrap_err();
        assert!(err.to_string().contains("unknown type Zap"));
    }

    #[test]
    fn embedding_a_struct_is_an_error() {
        let err =
            table("type S struct {\n\tn int\n}\ntype I interface {\n\tS\n}\n").unwrap_err();
        assert!(err.to_string().contains("not an interface"));
    }

    #[test]
    fn receiver_methods_attach_to_named_type() {
        let t = table("type T struct {\n\tn int\n}\nfunc (t *T) run(x int) {\n}\n").unwrap();
        let methods = t.receiver_methods("T");
        assert_eq!(methods.len(), 1);
        assert_eq!(methods[0].name, "run");
        assert_eq!(
            methods[0].sig,
            MicaType::Fn(vec![MicaType::Int], Box::new(MicaType::Unit))
        );
    }

    #[test]
    fn duplicate_type_decl_is_an_error() {
        let err = table("type A int\ntype A bool\n").unwrap_err();
        assert!(err.to_string().contains("redeclared"));
    }

    #[test]
    fn diamond_embedding_dedupes_identical_methods() {
        let t = table(
            "type Base interface {\n\tid(x int)\n}\ntype L interface {\n\tBase\n}\ntype R interface {\n\tBase\n}\ntype Both interface {\n\tL\n\tR\n}\n",
        )
        .unwrap();
        match t.lookup_underlying("Both").unwrap() {
            MicaType::Interface(methods) => assert_eq!(methods.len(), 1),
            other => panic!("expected interface, got {other:?}"),
        }
    }
}
