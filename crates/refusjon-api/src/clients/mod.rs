pub mod email;

pub use email::{EmailClient, EmailMessage};
