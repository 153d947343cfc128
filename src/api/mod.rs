pub mod client;
pub mod processor;

pub use client::FaceAppClient;
pub use processor::FaceApp;
