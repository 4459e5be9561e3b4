use thiserror::Error;

/// An out-of-range access into a persistent stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("index {index} out of range for a stack of size {size}")]
pub struct IndexError {
    pub index : usize,
    pub size : usize,
}

/// Structural and resolution failures reported by the type checker.
///
/// Everything carried here is already rendered to a string, so errors can outlive
/// the terms that produced them and cross thread boundaries freely.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeError {
    #[error("unresolved global `{0}`")]
    UnresolvedGlobal(String),

    #[error("local `{name}` with index {index} cannot be resolved in a context of {depth} locals")]
    UnresolvedLocal { name : String, index : usize, depth : usize },

    #[error("`{fun}` is applied to {supplied} arguments, but its type `{fun_type}` only accepts {accepted}")]
    NotAFunction { fun : String, fun_type : String, supplied : usize, accepted : usize },

    #[error("match on `{scrutinee}`, whose type `{scrutinee_type}` is not an inductive type")]
    NotInductive { scrutinee : String, scrutinee_type : String },

    #[error("fix index {index} out of range for a bundle of {size} functions")]
    FixIndexOutOfRange { index : usize, size : usize },
}

impl From<IndexError> for TypeError {
    fn from(e : IndexError) -> Self {
        TypeError::UnresolvedLocal { name : String::new(), index : e.index, depth : e.size }
    }
}
