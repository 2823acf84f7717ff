//! Testing utilities and mock implementations.
//!
//! This module provides mock implementations of the converter traits so
//! consumers can be tested without an ffmpeg installation.
//!
//! # Example
//!
//! ```rust,ignore
//! use ffconvert_core::testing::{MockConverter, MockMetadataReader};
//!
//! let reader = MockMetadataReader::new();
//! reader.set_result("/music/a.wav", MediaInfo { /* ... */ }).await;
//!
//! let converter = MockConverter::new();
//! converter.set_progress_steps(vec![0.25, 0.5, 1.0]).await;
//! ```

mod mock_converter;
mod mock_metadata;

pub use mock_converter::{MockConverter, RecordedConversion};
pub use mock_metadata::MockMetadataReader;
