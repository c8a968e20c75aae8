//! Data model: options, questions, documents, attempts and owner profiles.

mod attempt;
mod document;
mod option;
mod owner;
mod question;

pub use attempt::{Answer, Attempt};
pub use document::Document;
pub use option::AnswerOption;
pub use owner::{OwnerProfile, Preferences};
pub use question::Question;
