pub mod resolve;
pub mod scope;
pub mod types;

use crate::diagnostics::CheckError;
use crate::parser::ast::{Block, Decl, Expr, File, FuncDecl, Param, Stmt};
use crate::span::{Span, Spanned};
use resolve::build_type_table;
use scope::{Binding, BindingKind, ScopeArena, ScopeId};
use types::{MicaType, TypeTable};

/// The result of checking one file: the resolved type table and the scope
/// tree with every binding in place. Shadow analysis runs over this.
#[derive(Debug)]
pub struct Checked {
    pub types: TypeTable,
    pub scopes: ScopeArena,
}

pub fn check(file: &File) -> Result<Checked, CheckError> {
    let types = build_type_table(file)?;
    let mut scopes = ScopeArena::new(file.span);
    Binder { types: &types, scopes: &mut scopes }.bind_file(file)?;
    Ok(Checked { types, scopes })
}

struct Binder<'a> {
    types: &'a TypeTable,
    scopes: &'a mut ScopeArena,
}

impl Binder<'_> {
    fn bind_file(&mut self, file: &File) -> Result<(), CheckError> {
        let package = self.scopes.package();

        // Pre-declared output builtin.
        self.scopes.declare(
            package,
            Binding {
                name: "print".to_string(),
                kind: BindingKind::Func,
                ty: MicaType::Fn(Vec::new(), Box::new(MicaType::Unit)),
                decl_span: Span::dummy(),
                visible_from: 0,
            },
        );

        // Package-level names first; they are visible throughout the file,
        // so function bodies can call forward.
        for decl in &file.decls {
            match &decl.node {
                Decl::Type(td) => {
                    self.declare_package(
                        &td.name,
                        BindingKind::Type,
                        MicaType::Named(td.name.node.clone()),
                    )?;
                }
                Decl::Func(fd) => {
                    if fd.receiver.is_some() {
                        continue;
                    }
                    let ty = self.fn_type(&fd.params, fd.return_type.as_ref())?;
                    self.declare_package(&fd.name, BindingKind::Func, ty)?;
                }
                Decl::ExternFunc(ef) => {
                    let ty = self.fn_type(&ef.params, ef.return_type.as_ref())?;
                    self.declare_package(&ef.name, BindingKind::Func, ty)?;
                }
                Decl::Var(vd) => {
                    let ty = self.types.resolve(&vd.ty)?;
                    self.declare_package(&vd.name, BindingKind::Var, ty)?;
                }
            }
        }

        for decl in &file.decls {
            if let Decl::Func(fd) = &decl.node {
                self.bind_function(fd, decl.span)?;
            }
        }
        Ok(())
    }

    fn declare_package(
        &mut self,
        name: &Spanned<String>,
        kind: BindingKind,
        ty: MicaType,
    ) -> Result<(), CheckError> {
        let package = self.scopes.package();
        if self.scopes.lookup_local(package, &name.node).is_some() {
            return Err(CheckError::type_err(
                format!("{} redeclared in this package", name.node),
                name.span,
            ));
        }
        self.scopes.declare(
            package,
            Binding {
                name: name.node.clone(),
                kind,
                ty,
                decl_span: name.span,
                visible_from: name.span.start,
            },
        );
        Ok(())
    }

    fn fn_type(
        &self,
        params: &[Param],
        return_type: Option<&Spanned<crate::parser::ast::TypeExpr>>,
    ) -> Result<MicaType, CheckError> {
        let mut ptys = Vec::with_capacity(params.len());
        for p in params {
            ptys.push(self.types.resolve(&p.ty)?);
        }
        let ret = match return_type {
            Some(rt) => self.types.resolve(rt)?,
            None => MicaType::Unit,
        };
        Ok(MicaType::Fn(ptys, Box::new(ret)))
    }

    fn bind_function(&mut self, fd: &FuncDecl, decl_span: Span) -> Result<(), CheckError> {
        let scope = self.scopes.push_scope(self.scopes.package(), decl_span);
        if let Some(recv) = &fd.receiver {
            self.declare_param(scope, recv, decl_span.start)?;
        }
        for p in &fd.params {
            self.declare_param(scope, p, decl_span.start)?;
        }
        self.bind_block(&fd.body.node, scope)
    }

    fn declare_param(
        &mut self,
        scope: ScopeId,
        param: &Param,
        visible_from: usize,
    ) -> Result<(), CheckError> {
        let ty = self.types.resolve(&param.ty)?;
        if self.scopes.lookup_local(scope, &param.name.node).is_some() {
            return Err(CheckError::type_err(
                format!("duplicate parameter {}", param.name.node),
                param.name.span,
            ));
        }
        self.scopes.declare(
            scope,
            Binding {
                name: param.name.node.clone(),
                kind: BindingKind::Param,
                ty,
                decl_span: param.name.span,
                visible_from,
            },
        );
        Ok(())
    }

    fn bind_block(&mut self, block: &Block, scope: ScopeId) -> Result<(), CheckError> {
        for stmt in &block.stmts {
            match &stmt.node {
                Stmt::Var(vd) => {
                    let ty = self.types.resolve(&vd.ty)?;
                    self.declare_local(scope, &vd.name, ty, stmt.span.end)?;
                }
                Stmt::Short { name, value } => {
                    let ty = self.infer_expr(value, scope)?;
                    if ty == MicaType::Nil {
                        return Err(CheckError::type_err("use of untyped nil", value.span));
                    }
                    self.declare_local(scope, name, ty, stmt.span.end)?;
                }
                Stmt::Assign { target, value } => {
                    self.infer_expr(target, scope)?;
                    self.infer_expr(value, scope)?;
                }
                Stmt::Return(value) => {
                    if let Some(e) = value {
                        self.infer_expr(e, scope)?;
                    }
                }
                Stmt::Expr(e) => {
                    self.infer_expr(e, scope)?;
                }
                Stmt::Block(b) => {
                    let child = self.scopes.push_scope(scope, b.span);
                    self.bind_block(&b.node, child)?;
                }
            }
        }
        Ok(())
    }

    fn declare_local(
        &mut self,
        scope: ScopeId,
        name: &Spanned<String>,
        ty: MicaType,
        visible_from: usize,
    ) -> Result<(), CheckError> {
        if self.scopes.lookup_local(scope, &name.node).is_some() {
            return Err(CheckError::type_err(
                format!("{} redeclared in this block", name.node),
                name.span,
            ));
        }
        self.scopes.declare(
            scope,
            Binding {
                name: name.node.clone(),
                kind: BindingKind::Var,
                ty,
                decl_span: name.span,
                visible_from,
            },
        );
        Ok(())
    }

    fn infer_expr(&mut self, e: &Spanned<Expr>, scope: ScopeId) -> Result<MicaType, CheckError> {
        match &e.node {
            Expr::IntLit(_) => Ok(MicaType::Int),
            Expr::FloatLit(_) => Ok(MicaType::Float),
            Expr::StringLit(_) => Ok(MicaType::String),
            Expr::BoolLit(_) => Ok(MicaType::Bool),
            Expr::NilLit => Ok(MicaType::Nil),
            Expr::Ident(name) => {
                match self.scopes.lookup_parent(scope, name, e.span.start) {
                    Some(id) => Ok(self.scopes.binding(id).ty.clone()),
                    None => Err(CheckError::type_err(format!("undefined: {name}"), e.span)),
                }
            }
            Expr::Field { object, name } => {
                let oty = self.infer_expr(object, scope)?;
                self.types.member(&oty, &name.node).ok_or_else(|| {
                    CheckError::type_err(
                        format!("{oty} has no field or method {}", name.node),
                        name.span,
                    )
                })
            }
            Expr::Call { callee, args } => {
                let cty = self.infer_expr(callee, scope)?;
                for arg in args {
                    self.infer_expr(arg, scope)?;
                }
                match cty {
                    MicaType::Fn(_, ret) => Ok(*ret),
                    other => Err(CheckError::type_err(
                        format!("cannot call non-function value of type {other}"),
                        callee.span,
                    )),
                }
            }
            Expr::Closure { params, return_type, body } => {
                let cscope = self.scopes.push_scope(scope, e.span);
                let mut ptys = Vec::with_capacity(params.len());
                for p in params {
                    ptys.push(self.types.resolve(&p.ty)?);
                    self.declare_param(cscope, p, e.span.start)?;
                }
                self.bind_block(&body.node, cscope)?;
                let ret = match return_type {
                    Some(rt) => self.types.resolve(rt)?,
                    None => MicaType::Unit,
                };
                Ok(MicaType::Fn(ptys, Box::new(ret)))
            }
            Expr::AddrOf(inner) => {
                Ok(MicaType::Pointer(Box::new(self.infer_expr(inner, scope)?)))
            }
            Expr::Neg(inner) => self.infer_expr(inner, scope),
            Expr::Binary { op, lhs, rhs } => {
                use crate::parser::ast::BinOp;
                let l = self.infer_expr(lhs, scope)?;
                let r = self.infer_expr(rhs, scope)?;
                match op {
                    BinOp::Eq | BinOp::Ne => Ok(MicaType::Bool),
                    _ => {
                        if l != r {
                            return Err(CheckError::type_err(
                                format!("mismatched types {l} and {r}"),
                                e.span,
                            ));
                        }
                        Ok(l)
                    }
                }
            }
        }
    }
}
