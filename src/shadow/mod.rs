pub mod similar;

use crate::parser::ast::{Block, Expr, File, Param, TypeExpr};
use crate::span::{Span, Spanned};
use crate::typeck::scope::{BindingId, ScopeId};
use crate::typeck::Checked;
use crate::visit::{self, Visitor};
use similar::similar;

/// A pairing discovered at a closure boundary: referencing `outer` inside
/// the closure probably means the author wanted `inner`, the parameter.
#[derive(Debug, Clone)]
struct ShadowRelation {
    outer: BindingId,
    inner: BindingId,
}

/// One suspicious reference found in a closure body.
#[derive(Debug, Clone, PartialEq)]
pub struct ShadowDiagnostic {
    pub span: Span,
    pub suggestion: String,
}

/// Walk `file` and report every reference to an outer variable made inside
/// a closure that takes a similarly typed parameter.
pub fn analyze(file: &File, checked: &Checked) -> Vec<ShadowDiagnostic> {
    let mut diags = Vec::new();
    ShadowWalker {
        checked,
        scope: checked.scopes.package(),
        shadowed: Vec::new(),
        diags: &mut diags,
    }
    .visit_file(file);
    diags
}

/// One walker per closure nesting level. Each closure spawns a sub-walker
/// whose shadow set extends the parent's, so relations established by an
/// enclosing closure stay in force inside nested ones.
struct ShadowWalker<'a> {
    checked: &'a Checked,
    scope: ScopeId,
    shadowed: Vec<ShadowRelation>,
    diags: &'a mut Vec<ShadowDiagnostic>,
}

impl ShadowWalker<'_> {
    fn check_ident(&mut self, name: &str, span: Span) {
        let scopes = &self.checked.scopes;
        let Some(id) = scopes.lookup_parent(self.scope, name, span.start) else {
            return;
        };
        for rel in &self.shadowed {
            if rel.outer == id {
                self.diags.push(ShadowDiagnostic {
                    span,
                    suggestion: scopes.binding(rel.inner).name.clone(),
                });
            }
        }
    }

    fn enter_closure(&mut self, closure_span: Span, params: &[Param], body: &Spanned<Block>) {
        let scopes = &self.checked.scopes;
        let Some(closure_scope) = scopes.innermost(self.scope, body.span.start) else {
            return;
        };
        let Some(enclosing) = scopes.parent(closure_scope) else {
            return;
        };

        // Every name declared in an enclosing scope is a candidate outer
        // variable. First occurrence wins when a name repeats further out;
        // lookup would resolve to the nearer binding either way.
        let mut names: Vec<&str> = Vec::new();
        let mut cur = Some(enclosing);
        while let Some(s) = cur {
            for n in scopes.names(s) {
                if !names.contains(&n) {
                    names.push(n);
                }
            }
            cur = scopes.parent(s);
        }

        let mut shadowed = self.shadowed.clone();
        for param in params {
            let Some(inner) = scopes.lookup_local(closure_scope, &param.name.node) else {
                continue;
            };
            let inner_ty = &scopes.binding(inner).ty;
            for name in &names {
                let Some(outer) = scopes.lookup_parent(enclosing, name, closure_span.start)
                else {
                    continue;
                };
                let outer_ty = &scopes.binding(outer).ty;
                if similar(&self.checked.types, outer_ty, inner_ty) {
                    shadowed.push(ShadowRelation { outer, inner });
                }
            }
        }

        ShadowWalker {
            checked: self.checked,
            scope: closure_scope,
            shadowed,
            diags: &mut *self.diags,
        }
        .visit_block(body);
    }
}

impl Visitor for ShadowWalker<'_> {
    fn visit_expr(&mut self, expr: &Spanned<Expr>) {
        match &expr.node {
            Expr::Ident(name) => self.check_ident(name, expr.span),
            Expr::Closure { params, body, .. } => {
                // Parameter and return types belong to the closure's own
                // signature, not its body; they are not references.
                self.enter_closure(expr.span, params, body);
            }
            _ => visit::walk_expr(self, expr),
        }
    }

    fn visit_type_expr(&mut self, ty: &Spanned<TypeExpr>) {
        if let TypeExpr::Named(name) = &ty.node {
            self.check_ident(name, ty.span);
        }
        visit::walk_type_expr(self, ty);
    }
}
