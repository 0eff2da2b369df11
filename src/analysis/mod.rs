// Local review analytics: sentiment scoring and the three keyword-driven
// cluster views (words, topics, phrases).
//
// Everything here is pure and deterministic: each call builds its own
// accumulators from the review slice and returns fresh clusters.

pub mod cluster;
pub mod phrases;
pub mod sentiment;
pub mod topics;
pub mod words;
