mod api;
mod provider;

#[cfg(test)]
mod tests;

pub use provider::EmbeddingProvider;
