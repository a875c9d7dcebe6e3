use formula_frame::Column;

/// A deferred computation supplied by the host.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    /// The literal absence marker.
    Null,
    /// A bare name, resolved against the namespace or by the host.
    Symbol(String),
    /// A function call.
    Call { function: String, args: Vec<Arg> },
    /// An inline vector constant.
    Literal(Column),
    /// A host value that is not a vector (a function, an environment, ...), named by its type.
    Foreign(String),
}

/// A call argument, optionally named.
#[derive(Clone, Debug, PartialEq)]
pub struct Arg {
    pub name: Option<String>,
    pub value: Expr,
}

impl Expr {
    pub fn symbol(name: impl Into<String>) -> Self {
        Expr::Symbol(name.into())
    }

    pub fn call(function: impl Into<String>, args: impl IntoIterator<Item = Expr>) -> Self {
        Expr::Call {
            function: function.into(),
            args: args
                .into_iter()
                .map(|value| Arg { name: None, value })
                .collect(),
        }
    }

    /// Append a named argument. No-op on anything but a call.
    pub fn named_arg(mut self, name: impl Into<String>, value: Expr) -> Self {
        if let Expr::Call { args, .. } = &mut self {
            args.push(Arg {
                name: Some(name.into()),
                value,
            });
        }
        self
    }

    pub fn literal(column: Column) -> Self {
        Expr::Literal(column)
    }
}

impl From<bool> for Expr {
    fn from(value: bool) -> Self {
        Expr::Literal(value.into())
    }
}

impl From<i64> for Expr {
    fn from(value: i64) -> Self {
        Expr::Literal(value.into())
    }
}

impl From<f64> for Expr {
    fn from(value: f64) -> Self {
        Expr::Literal(value.into())
    }
}

impl From<&str> for Expr {
    fn from(value: &str) -> Self {
        Expr::Literal(value.into())
    }
}

/// An expression bound to the name of the column it produces.
#[derive(Clone, Debug, PartialEq)]
pub struct NamedExpr {
    pub name: String,
    pub expr: Expr,
}

impl NamedExpr {
    pub fn new(name: impl Into<String>, expr: Expr) -> Self {
        Self {
            name: name.into(),
            expr,
        }
    }
}

/// Result of evaluating an expression for one group.
#[derive(Clone, Debug, PartialEq)]
pub enum Datum {
    Null,
    Vector(Column),
    Foreign(String),
}

impl From<Column> for Datum {
    fn from(column: Column) -> Self {
        Datum::Vector(column)
    }
}
