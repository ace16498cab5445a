//! Core markup scanning primitives
//!
//! This module contains the fundamental building blocks for the tag reader:
//! - Scanner: SIMD-accelerated delimiter detection using memchr
//! - Tokenizer: Lenient splitting of the buffer into node tokens
//! - Attributes: Attribute list parsing into an ordered table
//! - Entities: Character reference decoding and attribute escaping
//! - Date: Multi-format date recognition in text content
//! - Span: Byte ranges into the source buffer

pub mod attributes;
pub mod date;
pub mod entities;
pub mod scanner;
pub mod span;
pub mod tokenizer;
