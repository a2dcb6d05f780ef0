//! Partitioning of index ranges into contiguous blocks for parallel loops.

use std::ops::Range;

/// How finely a parallel loop splits its range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Grain {
    /// One block per worker, at least one.
    #[default]
    Auto,
    /// Blocks of at most this many indices (zero is treated as one).
    Size(usize),
}

impl Grain {
    /// Number of blocks to cut a range of `len` indices into.
    pub fn block_count(self, len: usize, thread_count: usize) -> usize {
        match self {
            Grain::Auto => thread_count.max(1),
            Grain::Size(size) => len.div_ceil(size.max(1)),
        }
    }
}

/// A deterministic split of `start..end` into contiguous, non-empty blocks.
///
/// When the length does not divide evenly, the first `len % blocks` blocks are
/// one index longer than the rest.
///
/// ```
/// use utl_parallel::Blocks;
///
/// let blocks = Blocks::new(0..10, 3);
/// let ranges: Vec<_> = blocks.iter().collect();
/// assert_eq!(ranges, [0..4, 4..7, 7..10]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blocks {
    start: usize,
    len: usize,
    num_blocks: usize,
    block_size: usize,
    remainder: usize,
}

impl Blocks {
    /// Split `range` into at most `num_blocks` blocks. An empty range has no
    /// blocks; a range shorter than `num_blocks` gets one block per index.
    pub fn new(range: Range<usize>, num_blocks: usize) -> Self {
        let len = range.len();
        let num_blocks = num_blocks.max(1).min(len);
        let (block_size, remainder) = if num_blocks == 0 {
            (0, 0)
        } else {
            (len / num_blocks, len % num_blocks)
        };
        Self {
            start: range.start,
            len,
            num_blocks,
            block_size,
            remainder,
        }
    }

    pub fn num_blocks(&self) -> usize {
        self.num_blocks
    }

    /// Total number of indices covered.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The `i`-th block.
    ///
    /// # Panics
    /// If `i >= num_blocks()`.
    pub fn block(&self, i: usize) -> Range<usize> {
        assert!(
            i < self.num_blocks,
            "block {i} out of range for {} blocks",
            self.num_blocks
        );
        let begin = self.start + i * self.block_size + i.min(self.remainder);
        let size = self.block_size + usize::from(i < self.remainder);
        begin..begin + size
    }

    pub fn iter(&self) -> impl Iterator<Item = Range<usize>> + '_ {
        (0..self.num_blocks).map(|i| self.block(i))
    }
}
