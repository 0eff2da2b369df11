// App Store integration: app metadata lookup and the customer-review feed.
//
// The client talks to Apple's public iTunes endpoints (no auth). Ingestion
// walks the most-recent-first RSS feed page by page and keeps only the last
// twelve months of reviews.

pub mod client;
pub mod feed;
pub mod ingest;
