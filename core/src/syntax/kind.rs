//! file: core/src/syntax/kind.rs
//! description: closed set of syntax node kinds.
//!
//! `NodeKind` mirrors the node classes of Python's `ast` module that the
//! front-end produces. Trees imported from JSON may carry classes this crate
//! does not know about; those keep their tag in `NodeKind::Other`.
//!

use std::fmt;

macro_rules! node_kinds {
    ($($variant:ident => $tag:literal,)*) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub enum NodeKind {
            $($variant,)*
            /// A class not produced by the front-end, kept by name.
            Other(String),
        }

        impl NodeKind {
            /// The class name as it appears in Python's `ast` module.
            pub fn tag(&self) -> &str {
                match self {
                    $(NodeKind::$variant => $tag,)*
                    NodeKind::Other(tag) => tag.as_str(),
                }
            }

            pub fn from_tag(tag: &str) -> Self {
                match tag {
                    $($tag => NodeKind::$variant,)*
                    other => NodeKind::Other(other.to_string()),
                }
            }
        }
    };
}

node_kinds! {
    Module => "Module",
    FunctionDef => "FunctionDef",
    Arguments => "arguments",
    Arg => "arg",
    Keyword => "keyword",

    Pass => "Pass",
    Break => "Break",
    Continue => "Continue",
    Return => "Return",
    Assign => "Assign",
    AugAssign => "AugAssign",
    Expr => "Expr",
    If => "If",
    While => "While",
    For => "For",

    BoolOp => "BoolOp",
    BinOp => "BinOp",
    UnaryOp => "UnaryOp",
    Compare => "Compare",
    IfExp => "IfExp",
    Call => "Call",
    Attribute => "Attribute",
    Subscript => "Subscript",
    Name => "Name",
    Constant => "Constant",
    List => "List",
    Tuple => "Tuple",

    Load => "Load",
    Store => "Store",

    And => "And",
    Or => "Or",

    Add => "Add",
    Sub => "Sub",
    Mult => "Mult",
    MatMult => "MatMult",
    Div => "Div",
    FloorDiv => "FloorDiv",
    Mod => "Mod",
    Pow => "Pow",

    Invert => "Invert",
    Not => "Not",
    UAdd => "UAdd",
    USub => "USub",

    Eq => "Eq",
    NotEq => "NotEq",
    Lt => "Lt",
    LtE => "LtE",
    Gt => "Gt",
    GtE => "GtE",
    Is => "Is",
    IsNot => "IsNot",
    In => "In",
    NotIn => "NotIn",
}

impl NodeKind {
    /// Name of the translation rule for this kind, `on_<kind>` lower-cased.
    pub fn handler_name(&self) -> String {
        format!("on_{}", self.tag().to_lowercase())
    }

    /// Binary operator kind for an operator token (`+`, `//`, ...).
    pub fn binary_operator(token: &str) -> Option<Self> {
        let kind = match token {
            "+" => NodeKind::Add,
            "-" => NodeKind::Sub,
            "*" => NodeKind::Mult,
            "@" => NodeKind::MatMult,
            "/" => NodeKind::Div,
            "//" => NodeKind::FloorDiv,
            "%" => NodeKind::Mod,
            "**" => NodeKind::Pow,
            _ => return None,
        };
        Some(kind)
    }

    pub fn unary_operator(token: &str) -> Option<Self> {
        let kind = match token {
            "~" => NodeKind::Invert,
            "not" => NodeKind::Not,
            "+" => NodeKind::UAdd,
            "-" => NodeKind::USub,
            _ => return None,
        };
        Some(kind)
    }

    /// Comparison operator kind. Multi-word operators are expected with
    /// single spaces (`not in`, `is not`).
    pub fn comparison_operator(token: &str) -> Option<Self> {
        let kind = match token {
            "==" => NodeKind::Eq,
            "!=" => NodeKind::NotEq,
            "<" => NodeKind::Lt,
            "<=" => NodeKind::LtE,
            ">" => NodeKind::Gt,
            ">=" => NodeKind::GtE,
            "is" => NodeKind::Is,
            "is not" => NodeKind::IsNot,
            "in" => NodeKind::In,
            "not in" => NodeKind::NotIn,
            _ => return None,
        };
        Some(kind)
    }

    /// Kinds that may appear on the left of an assignment.
    pub fn is_assignable(&self) -> bool {
        matches!(
            self,
            NodeKind::Name
                | NodeKind::Attribute
                | NodeKind::Subscript
                | NodeKind::Tuple
                | NodeKind::List
        )
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}
