pub mod diagnostic;
pub mod error;
pub mod output;
pub mod parser;
pub mod score;
pub mod synth;
pub mod timeline;
pub mod wave;

pub use error::ScoreError;
