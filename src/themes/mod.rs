// AI theme discovery: two-phase, provider-backed open-set clustering.
//
// Phase 1 asks a text-generation provider to name the themes in a random
// sample of reviews. Phase 2 sends every review, in small batches, to be
// assigned to one of those themes. Discovery failures are fatal;
// categorization failures only push a batch into the "Outros" bucket.
//
// The CompletionProvider trait keeps Gemini and OpenAI interchangeable.

pub mod engine;
pub mod gemini;
pub mod json;
pub mod openai;
pub mod pacer;
pub mod prompts;
pub mod provider;
