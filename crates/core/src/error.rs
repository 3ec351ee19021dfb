use std::borrow::Cow;

/// Errors raised while declaring, registering or calling store module operations.
#[storemod_derive::storemod_error]
pub enum ModuleError {
    /// An operation table is malformed, e.g. the same name declared twice in one category.
    /// Raised before anything reaches the host.
    #[error("Configuration error{}: {message}", format_context(.context))]
    Configuration { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// An argument or a result could not cross the host boundary.
    #[error("Serialization error{}: {source}", format_context(.context))]
    Serialization { source: serde_json::Error, context: Option<Cow<'static, str>> },

    /// The host handed an entry a state of a different type than the module declared.
    #[error("State mismatch{}: {message}", format_context(.context))]
    StateMismatch { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The host does not know the requested `<module>/<operation>` key.
    #[error("Unknown operation{}: {message}", format_context(.context))]
    UnknownOperation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The host refused to register a module.
    #[error("Registration error{}: {message}", format_context(.context))]
    Registration { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Internal fallback for failures raised by operation bodies.
    #[error("Internal module error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
