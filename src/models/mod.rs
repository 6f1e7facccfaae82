pub mod credential;
pub mod token;
pub mod user;

pub use credential::Credential;
pub use token::TokenResponse;
pub use user::UserProfile;
