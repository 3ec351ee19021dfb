use std::borrow::Cow;

#[storemod_derive::storemod_error]
pub enum StoreError {
    /// The configuration could not be read or does not match [`crate::StoreConfig`].
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },
}
