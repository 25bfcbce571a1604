//! Sponte educational API (SOAP) used to resolve CPFs to AlunoIDs

pub mod client;
pub mod envelope;
pub mod extract;

pub use client::SponteClient;
