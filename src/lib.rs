// Murmur: latent topic extraction for forum post dumps.
//
// This is the library root. Each module corresponds to a stage of the
// topic pipeline: corpus preparation, lexicon data, the topic model itself,
// report building, and the run orchestration that ties them together.

pub mod config;
pub mod corpus;
pub mod lexicon;
pub mod model;
pub mod output;
pub mod pipeline;
pub mod report;
