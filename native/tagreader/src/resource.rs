//! ResourceArc Wrappers
//!
//! Persistent reader state handed to the BEAM. The reader is a single-owner
//! cursor; the mutex serializes calls made from different processes.

use crate::config::ReaderOptions;
use crate::reader::TagReader;
use rustler::ResourceArc;
use std::sync::Mutex;

/// Wrapper for TagReader that can be stored in a ResourceArc
pub struct TagReaderResource {
    pub inner: Mutex<TagReader>,
}

impl TagReaderResource {
    pub fn new(data: String, options: ReaderOptions) -> Self {
        TagReaderResource {
            inner: Mutex::new(TagReader::with_options(data, options)),
        }
    }

    /// Run `f` with exclusive access to the reader.
    ///
    /// # Errors
    ///
    /// Returns `"mutex_poisoned"` if a previous call panicked while holding
    /// the reader.
    pub fn with_reader<F, R>(&self, f: F) -> Result<R, &'static str>
    where
        F: FnOnce(&mut TagReader) -> R,
    {
        let mut guard = self.inner.lock().map_err(|_| "mutex_poisoned")?;
        Ok(f(&mut guard))
    }
}

#[rustler::resource_impl]
impl rustler::Resource for TagReaderResource {}

/// Type alias for the ResourceArc
pub type TagReaderRef = ResourceArc<TagReaderResource>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_reader_mutates_shared_state() {
        let resource = TagReaderResource::new("<a><b>".to_string(), ReaderOptions::default());
        resource.with_reader(|r| {
            r.read_next();
        }).unwrap();
        let name = resource.with_reader(|r| r.read_next().tag_name().into_owned()).unwrap();
        assert_eq!(name, "b");
    }
}
