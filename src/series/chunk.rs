//! Chunked accumulation buffer
//!
//! Values arrive one at a time while a series is collecting. Rather than
//! growing one array, they are written into fixed-capacity chunks appended
//! in order; the chunks are read end-to-end exactly once when the series
//! is finalized.

use crate::series::types::Sample;

/// Values held by each chunk
pub const CHUNK_CAPACITY: usize = 10;

#[derive(Debug, Clone)]
struct Chunk<T> {
    cells: [T; CHUNK_CAPACITY],
    count: usize,
}

impl<T: Sample> Chunk<T> {
    fn new() -> Self {
        Self {
            cells: [T::default(); CHUNK_CAPACITY],
            count: 0,
        }
    }

    fn is_full(&self) -> bool {
        self.count == CHUNK_CAPACITY
    }

    fn filled(&self) -> &[T] {
        &self.cells[..self.count]
    }
}

/// Append-only sequence of fixed-capacity chunks, addressed by index
#[derive(Debug, Clone)]
pub struct ChunkBuffer<T> {
    chunks: Vec<Chunk<T>>,
    len: usize,
}

impl<T: Sample> Default for ChunkBuffer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Sample> ChunkBuffer<T> {
    pub fn new() -> Self {
        Self {
            chunks: Vec::new(),
            len: 0,
        }
    }

    /// Append a value to the tail chunk, opening a new chunk when it is full
    pub fn push(&mut self, value: T) {
        let needs_chunk = self.chunks.last().map(Chunk::is_full).unwrap_or(true);
        if needs_chunk {
            self.chunks.push(Chunk::new());
        }

        let last = self.chunks.len() - 1;
        let tail = &mut self.chunks[last];
        tail.cells[tail.count] = value;
        tail.count += 1;
        self.len += 1;
    }

    /// Total values held across all chunks
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of chunks allocated so far
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Values in append order
    pub fn iter(&self) -> impl Iterator<Item = T> + '_ {
        self.chunks.iter().flat_map(|c| c.filled().iter().copied())
    }

    /// Copy every value into one contiguous array, releasing the chunks
    pub fn into_contiguous(self) -> Vec<T> {
        let mut values = Vec::with_capacity(self.len);
        for chunk in &self.chunks {
            values.extend_from_slice(chunk.filled());
        }
        values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunks_fill_in_order() {
        let mut buffer = ChunkBuffer::new();
        assert!(buffer.is_empty());
        assert_eq!(buffer.chunk_count(), 0);

        for i in 0..CHUNK_CAPACITY as i64 {
            buffer.push(i);
        }
        assert_eq!(buffer.chunk_count(), 1);

        buffer.push(99);
        assert_eq!(buffer.chunk_count(), 2);
        assert_eq!(buffer.len(), CHUNK_CAPACITY + 1);
    }

    #[test]
    fn test_into_contiguous_preserves_order() {
        let mut buffer = ChunkBuffer::new();
        for i in 0..37 {
            buffer.push(i as f64 * 0.5);
        }
        assert_eq!(buffer.chunk_count(), 4);

        let iterated: Vec<f64> = buffer.iter().collect();
        let values = buffer.into_contiguous();
        assert_eq!(values.len(), 37);
        assert_eq!(values, iterated);
        assert_eq!(values[0], 0.0);
        assert_eq!(values[36], 18.0);
    }

    #[test]
    fn test_empty_buffer_flattens_to_nothing() {
        let buffer: ChunkBuffer<i32> = ChunkBuffer::new();
        assert!(buffer.into_contiguous().is_empty());
    }
}
