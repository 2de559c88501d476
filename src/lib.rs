// scamcheck: heuristic scam-likelihood scoring for URLs
//
// The scorer and the rate limiter carry all the logic; the web module wraps
// them in a small JSON API.

pub mod config;
pub mod output;
pub mod rate_limit;
pub mod scoring;
pub mod web;
