use strum_macros::{AsRefStr, Display, EnumIter, IntoStaticStr};

/// The three kinds of operations a module can declare.
///
/// The string form is the short tag used in trace output.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, AsRefStr, IntoStaticStr, EnumIter,
)]
pub enum Category {
    /// Read operation, served by the host's read surface.
    #[strum(serialize = "get")]
    Getter,
    /// Synchronous state transition, applied through `commit`.
    #[strum(serialize = "mut")]
    Mutation,
    /// Dispatched operation, applied through `dispatch`.
    #[strum(serialize = "act")]
    Action,
}

impl Category {
    /// Human readable singular noun, used in error messages.
    #[must_use]
    pub const fn noun(self) -> &'static str {
        match self {
            Self::Getter => "getter",
            Self::Mutation => "mutation",
            Self::Action => "action",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_trace_tags() {
        let tags: Vec<&'static str> = Category::iter().map(Into::into).collect();
        assert_eq!(tags, ["get", "mut", "act"]);
        assert_eq!(Category::Mutation.to_string(), "mut");
    }
}
