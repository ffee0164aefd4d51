use crate::span::{Span, Spanned};

/// One parsed Mica source file.
#[derive(Debug)]
pub struct File {
    pub decls: Vec<Spanned<Decl>>,
    /// Span of the whole file; the package scope covers it.
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum Decl {
    Type(TypeDecl),
    Func(FuncDecl),
    ExternFunc(ExternFnDecl),
    Var(VarDecl),
}

#[derive(Debug, Clone)]
pub struct TypeDecl {
    pub name: Spanned<String>,
    pub ty: Spanned<TypeExpr>,
}

#[derive(Debug, Clone)]
pub struct FuncDecl {
    pub receiver: Option<Param>,
    pub name: Spanned<String>,
    pub params: Vec<Param>,
    pub return_type: Option<Spanned<TypeExpr>>,
    pub body: Spanned<Block>,
}

#[derive(Debug, Clone)]
pub struct ExternFnDecl {
    pub name: Spanned<String>,
    pub params: Vec<Param>,
    pub return_type: Option<Spanned<TypeExpr>>,
}

#[derive(Debug, Clone)]
pub struct VarDecl {
    pub name: Spanned<String>,
    pub ty: Spanned<TypeExpr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: Spanned<String>,
    pub ty: Spanned<TypeExpr>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeExpr {
    Named(String),
    Pointer(Box<Spanned<TypeExpr>>),
    Func {
        params: Vec<Spanned<TypeExpr>>,
        return_type: Option<Box<Spanned<TypeExpr>>>,
    },
    Struct(Vec<FieldDef>),
    Interface {
        methods: Vec<MethodSig>,
        /// Embedded interface names; each is a `TypeExpr::Named`.
        embeds: Vec<Spanned<TypeExpr>>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDef {
    pub name: Spanned<String>,
    pub ty: Spanned<TypeExpr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodSig {
    pub name: Spanned<String>,
    pub params: Vec<Param>,
    pub return_type: Option<Spanned<TypeExpr>>,
}

#[derive(Debug, Clone)]
pub struct Block {
    pub stmts: Vec<Spanned<Stmt>>,
}

#[derive(Debug, Clone)]
pub enum Stmt {
    Var(VarDecl),
    Short {
        name: Spanned<String>,
        value: Spanned<Expr>,
    },
    Assign {
        target: Spanned<Expr>,
        value: Spanned<Expr>,
    },
    Return(Option<Spanned<Expr>>),
    Expr(Spanned<Expr>),
    Block(Spanned<Block>),
}

#[derive(Debug, Clone)]
pub enum Expr {
    IntLit(i64),
    FloatLit(f64),
    StringLit(String),
    BoolLit(bool),
    NilLit,
    Ident(String),
    Field {
        object: Box<Spanned<Expr>>,
        name: Spanned<String>,
    },
    Call {
        callee: Box<Spanned<Expr>>,
        args: Vec<Spanned<Expr>>,
    },
    Closure {
        params: Vec<Param>,
        return_type: Option<Spanned<TypeExpr>>,
        body: Spanned<Block>,
    },
    AddrOf(Box<Spanned<Expr>>),
    Neg(Box<Spanned<Expr>>),
    Binary {
        op: BinOp,
        lhs: Box<Spanned<Expr>>,
        rhs: Box<Spanned<Expr>>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Eq,
    Ne,
}
