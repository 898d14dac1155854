pub mod bloom_filter;
pub mod candidates_util;
pub mod reach;
pub mod request_util;
pub mod tokenizer;
