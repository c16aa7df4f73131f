pub mod args;
pub mod audio;
pub mod batch;
pub mod catalog;
pub mod convert;
pub mod error;
pub mod probe;
pub mod transcode;
pub mod tts;
