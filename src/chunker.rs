//! Fixed-size overlapping text windows.

use crate::error::{RagError, Result};
use bincode::{Decode, Encode};
use serde::{Deserialize, Serialize};

/// Configuration for text chunking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkConfig {
    /// Characters per chunk.
    pub chunk_size: usize,
    /// Characters shared with the previous chunk.
    pub chunk_overlap: usize,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
        }
    }
}

impl ChunkConfig {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            chunk_size,
            chunk_overlap,
        }
    }

    /// Distance between consecutive chunk starts, or an error when it is not positive.
    pub fn stride(&self) -> Result<usize> {
        if self.chunk_size == 0 || self.chunk_overlap >= self.chunk_size {
            return Err(RagError::InvalidChunkConfig {
                size: self.chunk_size,
                overlap: self.chunk_overlap,
            });
        }
        Ok(self.chunk_size - self.chunk_overlap)
    }
}

/// A contiguous window of the source document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct Chunk {
    /// Position in the chunk list.
    pub index: usize,
    /// Character offset of the first character in the full text.
    pub start: usize,
    /// Chunk text.
    pub text: String,
}

impl Chunk {
    /// Length in characters.
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Slide a window of `chunk_size` characters over `text` with stride
/// `chunk_size - chunk_overlap`, starting at 0 and continuing while the start
/// offset is inside the text. The last chunk may be shorter.
///
/// Offsets count characters, not bytes.
pub fn chunk_text(text: &str, config: &ChunkConfig) -> Result<Vec<Chunk>> {
    let stride = config.stride()?;
    let chars: Vec<char> = text.chars().collect();

    let chunks = (0..chars.len())
        .step_by(stride)
        .enumerate()
        .map(|(index, start)| {
            let end = (start + config.chunk_size).min(chars.len());
            Chunk {
                index,
                start,
                text: chars[start..end].iter().collect(),
            }
        })
        .collect();

    Ok(chunks)
}
