//! Estimated reading time

use super::ContentBlock;

/// Default reading speed
pub const WORDS_PER_MINUTE: usize = 200;

/// Whitespace-separated words in `text`
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Words in a block: its heading plus every body entry
pub fn block_words(block: &ContentBlock) -> usize {
    let body: usize = block.body.iter().map(|entry| count_words(&entry.text)).sum();
    count_words(&block.heading) + body
}

/// Minutes needed to read `blocks`, rounded up
///
/// Zero words read in zero minutes; anything else takes at least one.
pub fn read_time(blocks: &[ContentBlock], words_per_minute: usize) -> usize {
    let total: usize = blocks.iter().map(block_words).sum();
    total.div_ceil(words_per_minute.max(1))
}
