pub mod account;
pub mod profile;
pub mod registration;

pub use account::{Account, Role, Scope};
pub use profile::{Profession, Profile, WorkplaceType};
pub use registration::RegistrationInput;
