#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod resident;

pub use crate::resident::{CacheStats, DEFAULT_CACHE_CAPACITY, ResidentCache};
