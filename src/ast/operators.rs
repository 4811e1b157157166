/// Script operators and functions.
///
/// Precedence follows the usual rule that a lower number binds tighter.
/// Functions and unary operators sit at precedence 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    // Comparison
    /// Equal (`==`)
    Equal,
    /// Not equal (`!=`)
    NotEqual,
    /// Less than (`<`)
    LessThan,
    /// Greater than (`>`)
    GreaterThan,
    /// Less than or equal (`<=`)
    LessEqual,
    /// Greater than or equal (`>=`)
    GreaterEqual,
    /// Membership in a list (`in`)
    In,
    /// Emptiness test against a boolean (`empty`)
    Empty,
    /// Presence test against a boolean (`has`)
    Has,
    /// Presence test against a boolean (`exists`)
    Exists,

    // Logical
    /// Logical OR (`||`)
    Or,
    /// Logical AND (`&&`)
    And,
    /// Logical NOT (`!`)
    Not,

    // Arithmetic
    /// Addition or string concatenation (`+`)
    Add,
    /// Subtraction (`-`)
    Subtract,
    /// Multiplication (`*`)
    Multiply,
    /// Division (`/`)
    Divide,

    /// Regex match (`~=`, also written `=~`)
    Regex,

    // Functions
    /// `length(v)`
    Length,
    /// `count(path)`
    Count,
    /// `match(s, pattern)`, anchored
    Match,
    /// `search(s, pattern)`, unanchored
    Search,
}

impl Operator {
    /// Every operator, in lookup order.
    pub const ALL: [Operator; 22] = [
        Operator::Equal,
        Operator::NotEqual,
        Operator::LessThan,
        Operator::GreaterThan,
        Operator::LessEqual,
        Operator::GreaterEqual,
        Operator::In,
        Operator::Empty,
        Operator::Has,
        Operator::Exists,
        Operator::Or,
        Operator::And,
        Operator::Not,
        Operator::Add,
        Operator::Subtract,
        Operator::Multiply,
        Operator::Divide,
        Operator::Regex,
        Operator::Length,
        Operator::Count,
        Operator::Match,
        Operator::Search,
    ];

    /// Text the operator is written and rendered as.
    pub fn name(self) -> &'static str {
        match self {
            Operator::Equal => "==",
            Operator::NotEqual => "!=",
            Operator::LessThan => "<",
            Operator::GreaterThan => ">",
            Operator::LessEqual => "<=",
            Operator::GreaterEqual => ">=",
            Operator::In => "in",
            Operator::Empty => "empty",
            Operator::Has => "has",
            Operator::Exists => "exists",
            Operator::Or => "||",
            Operator::And => "&&",
            Operator::Not => "!",
            Operator::Add => "+",
            Operator::Subtract => "-",
            Operator::Multiply => "*",
            Operator::Divide => "/",
            Operator::Regex => "~=",
            Operator::Length => "length",
            Operator::Count => "count",
            Operator::Match => "match",
            Operator::Search => "search",
        }
    }

    pub fn precedence(self) -> u8 {
        match self {
            Operator::Multiply | Operator::Divide => 1,
            Operator::Add | Operator::Subtract => 2,
            Operator::Equal
            | Operator::NotEqual
            | Operator::LessThan
            | Operator::GreaterThan
            | Operator::LessEqual
            | Operator::GreaterEqual
            | Operator::In
            | Operator::Empty
            | Operator::Has
            | Operator::Exists => 3,
            Operator::Or | Operator::And => 4,
            Operator::Not
            | Operator::Regex
            | Operator::Length
            | Operator::Count
            | Operator::Match
            | Operator::Search => 0,
        }
    }

    /// Number of operands.
    pub fn arity(self) -> usize {
        match self {
            Operator::Not | Operator::Length | Operator::Count => 1,
            _ => 2,
        }
    }

    /// True when the left operand is a path whose raw match list is handed
    /// to the operator instead of its first match.
    pub fn gets_left(self) -> bool {
        self == Operator::Count
    }

    /// True for operators written as `name(args)`.
    pub fn is_function(self) -> bool {
        matches!(
            self,
            Operator::Length | Operator::Count | Operator::Match | Operator::Search
        )
    }

    /// Looks up an operator by its written form.
    pub fn from_name(name: &str) -> Option<Operator> {
        if name == "=~" {
            return Some(Operator::Regex);
        }
        Operator::ALL.into_iter().find(|op| op.name() == name)
    }

    /// True if `partial` followed by `next` is a prefix of some operator
    /// name.
    pub(crate) fn continues(partial: &[u8], next: u8) -> bool {
        Operator::ALL.iter().any(|op| {
            let name = op.name().as_bytes();
            partial.len() < name.len() && name.starts_with(partial) && name[partial.len()] == next
        })
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
