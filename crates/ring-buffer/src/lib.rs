//! Capped FIFO Ring Buffer
//!
//! Bounded history store: pushing past capacity evicts the oldest entry.
//! Not synchronized; owners serialize access (the fusion manager keeps it
//! behind its state mutex).

mod buffer;

pub use buffer::RingBuffer;
