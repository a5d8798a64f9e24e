//! Bag-of-words name matching for drivesync.
//!
//! Scraped line-item names and catalog product names rarely agree byte for
//! byte (`"Lait demi écrémé 1L"` vs `"Lait demi-écrémé 1L"`), so matching
//! works on token multisets: names are tokenized into lowercase word/number
//! runs, vectorized over a shared vocabulary, and compared by cosine
//! similarity. Thresholding on the resulting percentage is the caller's
//! concern.

pub mod bow;

pub use bow::{best_match, cosine_similarity, tokenize, vectorize, Match, Named};
