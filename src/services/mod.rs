pub mod aggregator;
pub mod classifier;
pub mod emitter;
pub mod epg_index;
pub mod m3u_parser;
pub mod pipeline;
pub mod series;
