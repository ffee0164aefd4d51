use crate::span::Span;
use crate::typeck::types::MicaType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BindingId(u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    Var,
    Param,
    Func,
    Type,
}

/// One declared name: a variable, parameter, function, or type name. Type
/// and function names live in scopes alongside variables, so they take part
/// in shadow relations too.
#[derive(Debug, Clone)]
pub struct Binding {
    pub name: String,
    pub kind: BindingKind,
    pub ty: MicaType,
    pub decl_span: Span,
    /// Byte offset from which the binding can be referenced. Ignored in the
    /// package scope, where declaration order does not matter.
    pub visible_from: usize,
}

#[derive(Debug)]
struct Scope {
    parent: Option<ScopeId>,
    span: Span,
    /// Declaration order is preserved; shadow analysis walks names in the
    /// order they appear.
    entries: Vec<(String, BindingId)>,
    children: Vec<ScopeId>,
}

/// The scope tree of one file. The root is the package scope, spanning the
/// whole file; function bodies, closures, and blocks hang beneath it.
#[derive(Debug)]
pub struct ScopeArena {
    scopes: Vec<Scope>,
    bindings: Vec<Binding>,
}

impl ScopeArena {
    pub fn new(file_span: Span) -> Self {
        let package = Scope {
            parent: None,
            span: file_span,
            entries: Vec::new(),
            children: Vec::new(),
        };
        Self { scopes: vec![package], bindings: Vec::new() }
    }

    pub fn package(&self) -> ScopeId {
        ScopeId(0)
    }

    pub fn push_scope(&mut self, parent: ScopeId, span: Span) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(Scope {
            parent: Some(parent),
            span,
            entries: Vec::new(),
            children: Vec::new(),
        });
        self.scopes[parent.0 as usize].children.push(id);
        id
    }

    pub fn declare(&mut self, scope: ScopeId, binding: Binding) -> BindingId {
        let id = BindingId(self.bindings.len() as u32);
        let name = binding.name.clone();
        self.bindings.push(binding);
        self.scopes[scope.0 as usize].entries.push((name, id));
        id
    }

    pub fn binding(&self, id: BindingId) -> &Binding {
        &self.bindings[id.0 as usize]
    }

    pub fn parent(&self, scope: ScopeId) -> Option<ScopeId> {
        self.scopes[scope.0 as usize].parent
    }

    pub fn span(&self, scope: ScopeId) -> Span {
        self.scopes[scope.0 as usize].span
    }

    /// Names declared directly in `scope`, in declaration order.
    pub fn names(&self, scope: ScopeId) -> impl Iterator<Item = &str> {
        self.scopes[scope.0 as usize].entries.iter().map(|(n, _)| n.as_str())
    }

    /// Look `name` up in `scope` alone, ignoring position.
    pub fn lookup_local(&self, scope: ScopeId, name: &str) -> Option<BindingId> {
        self.scopes[scope.0 as usize]
            .entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, id)| *id)
    }

    /// Resolve `name` as seen from byte offset `pos` inside `scope`,
    /// walking outward through parents. A local binding declared after
    /// `pos` does not hide an outer one; the search keeps going outward.
    /// Package-level bindings are visible regardless of position.
    pub fn lookup_parent(&self, scope: ScopeId, name: &str, pos: usize) -> Option<BindingId> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let s = &self.scopes[id.0 as usize];
            if let Some((_, bid)) = s.entries.iter().find(|(n, _)| n == name) {
                if s.parent.is_none() || self.bindings[bid.0 as usize].visible_from <= pos {
                    return Some(*bid);
                }
            }
            current = s.parent;
        }
        None
    }

    /// The innermost scope under `scope` whose span contains `pos`.
    pub fn innermost(&self, scope: ScopeId, pos: usize) -> Option<ScopeId> {
        let s = &self.scopes[scope.0 as usize];
        if !s.span.contains(pos) {
            return None;
        }
        for &child in &s.children {
            if let Some(found) = self.innermost(child, pos) {
                return Some(found);
            }
        }
        Some(scope)
    }
}
