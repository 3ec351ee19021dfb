use storemod_derive::storemod_error;

#[storemod_error]
pub enum DemoError {
    #[error("Rejected: {message}")]
    Rejected { message: String, context: Option<String> },
}

fn main() {}
