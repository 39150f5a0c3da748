pub mod identity;
pub mod session;

pub use identity::IdentityClient;
pub use session::Session;
