//! Output helpers: the sampled run history and its tabular/CSV rendering.

pub mod record_output;
