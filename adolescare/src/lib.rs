//! Question answering, daily tips and symptom insights over a fixed corpus of
//! adolescent reproductive-health documents.

pub mod api;
pub mod cache;
pub mod config;
pub mod embeddings;
pub mod error;
pub mod index;
pub mod llm;
pub mod models;
pub mod processing;
pub mod rag;
pub mod retry;
pub mod services;
