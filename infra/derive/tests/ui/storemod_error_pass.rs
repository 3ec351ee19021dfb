use std::borrow::Cow;
use storemod_derive::storemod_error;

#[storemod_error]
pub enum DemoError {
    #[error("IO error{}: {source}", format_context(.context))]
    Io {
        #[source]
        source: std::io::Error,
        context: Option<Cow<'static, str>>,
    },

    #[error("Internal error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn main() {
    let internal: DemoError = "boom".into();
    assert!(matches!(internal, DemoError::Internal { .. }));

    let io: DemoError = std::io::Error::other("disk").into();
    assert_eq!(io.to_string(), "IO error: disk");
}
