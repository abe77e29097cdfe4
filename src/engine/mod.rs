//! Core engine — the fetch → sanitize → prompt → extract → parse →
//! validate → persist pipeline.

pub mod pipeline;
