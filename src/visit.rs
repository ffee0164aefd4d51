//! AST traversal.
//!
//! Implement [`Visitor`] and override the hooks you care about; each default
//! delegates to the matching `walk_*` function, which recurses into children
//! in source order. Call `walk_*` yourself from an override to keep
//! descending, or skip the call to prune the subtree.

use crate::parser::ast::*;
use crate::span::Spanned;

pub trait Visitor {
    fn visit_file(&mut self, file: &File) {
        walk_file(self, file);
    }

    fn visit_decl(&mut self, decl: &Spanned<Decl>) {
        walk_decl(self, decl);
    }

    fn visit_type_decl(&mut self, decl: &TypeDecl) {
        walk_type_decl(self, decl);
    }

    fn visit_function(&mut self, func: &FuncDecl) {
        walk_function(self, func);
    }

    fn visit_extern_fn(&mut self, func: &ExternFnDecl) {
        walk_extern_fn(self, func);
    }

    fn visit_var_decl(&mut self, decl: &VarDecl) {
        walk_var_decl(self, decl);
    }

    fn visit_block(&mut self, block: &Spanned<Block>) {
        walk_block(self, block);
    }

    fn visit_stmt(&mut self, stmt: &Spanned<Stmt>) {
        walk_stmt(self, stmt);
    }

    fn visit_expr(&mut self, expr: &Spanned<Expr>) {
        walk_expr(self, expr);
    }

    fn visit_type_expr(&mut self, ty: &Spanned<TypeExpr>) {
        walk_type_expr(self, ty);
    }
}

pub fn walk_file<V: Visitor + ?Sized>(v: &mut V, file: &File) {
    for decl in &file.decls {
        v.visit_decl(decl);
    }
}

pub fn walk_decl<V: Visitor + ?Sized>(v: &mut V, decl: &Spanned<Decl>) {
    match &decl.node {
        Decl::Type(td) => v.visit_type_decl(td),
        Decl::Func(fd) => v.visit_function(fd),
        Decl::ExternFunc(ef) => v.visit_extern_fn(ef),
        Decl::Var(vd) => v.visit_var_decl(vd),
    }
}

pub fn walk_type_decl<V: Visitor + ?Sized>(v: &mut V, decl: &TypeDecl) {
    v.visit_type_expr(&decl.ty);
}

pub fn walk_function<V: Visitor + ?Sized>(v: &mut V, func: &FuncDecl) {
    if let Some(recv) = &func.receiver {
        v.visit_type_expr(&recv.ty);
    }
    for p in &func.params {
        v.visit_type_expr(&p.ty);
    }
    if let Some(rt) = &func.return_type {
        v.visit_type_expr(rt);
    }
    v.visit_block(&func.body);
}

pub fn walk_extern_fn<V: Visitor + ?Sized>(v: &mut V, func: &ExternFnDecl) {
    for p in &func.params {
        v.visit_type_expr(&p.ty);
    }
    if let Some(rt) = &func.return_type {
        v.visit_type_expr(rt);
    }
}

pub fn walk_var_decl<V: Visitor + ?Sized>(v: &mut V, decl: &VarDecl) {
    v.visit_type_expr(&decl.ty);
}

pub fn walk_block<V: Visitor + ?Sized>(v: &mut V, block: &Spanned<Block>) {
    for stmt in &block.node.stmts {
        v.visit_stmt(stmt);
    }
}

pub fn walk_stmt<V: Visitor + ?Sized>(v: &mut V, stmt: &Spanned<Stmt>) {
    match &stmt.node {
        Stmt::Var(vd) => v.visit_var_decl(vd),
        Stmt::Short { value, .. } => v.visit_expr(value),
        Stmt::Assign { target, value } => {
            v.visit_expr(target);
            v.visit_expr(value);
        }
        Stmt::Return(value) => {
            if let Some(e) = value {
                v.visit_expr(e);
            }
        }
        Stmt::Expr(e) => v.visit_expr(e),
        Stmt::Block(b) => v.visit_block(b),
    }
}

pub fn walk_expr<V: Visitor + ?Sized>(v: &mut V, expr: &Spanned<Expr>) {
    match &expr.node {
        Expr::IntLit(_)
        | Expr::FloatLit(_)
        | Expr::StringLit(_)
        | Expr::BoolLit(_)
        | Expr::NilLit
        | Expr::Ident(_) => {}
        Expr::Field { object, .. } => v.visit_expr(object),
        Expr::Call { callee, args } => {
            v.visit_expr(callee);
            for arg in args {
                v.visit_expr(arg);
            }
        }
        Expr::Closure { params, return_type, body } => {
            for p in params {
                v.visit_type_expr(&p.ty);
            }
            if let Some(rt) = return_type {
                v.visit_type_expr(rt);
            }
            v.visit_block(body);
        }
        Expr::AddrOf(inner) | Expr::Neg(inner) => v.visit_expr(inner),
        Expr::Binary { lhs, rhs, .. } => {
            v.visit_expr(lhs);
            v.visit_expr(rhs);
        }
    }
}

pub fn walk_type_expr<V: Visitor + ?Sized>(v: &mut V, ty: &Spanned<TypeExpr>) {
    match &ty.node {
        TypeExpr::Named(_) => {}
        TypeExpr::Pointer(inner) => v.visit_type_expr(inner),
        TypeExpr::Func { params, return_type } => {
            for p in params {
                v.visit_type_expr(p);
            }
            if let Some(rt) = return_type {
                v.visit_type_expr(rt);
            }
        }
        TypeExpr::Struct(fields) => {
            for f in fields {
                v.visit_type_expr(&f.ty);
            }
        }
        TypeExpr::Interface { methods, embeds } => {
            for embed in embeds {
                v.visit_type_expr(embed);
            }
            for m in methods {
                for p in &m.params {
                    v.visit_type_expr(&p.ty);
                }
                if let Some(rt) = &m.return_type {
                    v.visit_type_expr(rt);
                }
            }
        }
    }
}
