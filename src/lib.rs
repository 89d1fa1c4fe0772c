// Broadsheet: content-based news feed recommendations.
//
// This is the library root. Post headers are embedded into vector space
// with a local ONNX sentence encoder, cached in SQLite, and ranked by
// cosine similarity against each user's recently-viewed posts.

pub mod cache;
pub mod config;
pub mod encoder;
pub mod error;
pub mod feed;
pub mod maintenance;
pub mod output;
pub mod similarity;
pub mod store;
