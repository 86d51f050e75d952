// Adapters layer: concrete implementations for external systems (model API, image codec).

pub mod gemini;
pub mod image;
