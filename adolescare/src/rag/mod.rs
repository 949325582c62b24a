mod answerer;
mod title;

pub use answerer::{Answer, Answerer, RetrievalMode, RetrievalQa, NOT_FOUND_MESSAGE};
pub use title::{clean_title, TitleGenerator, DEFAULT_TITLE};
