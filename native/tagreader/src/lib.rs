//! TagReader - sequential HTML/XML tag reader
//!
//! A forward-only cursor over a markup buffer, exposed to Elixir as a
//! resource. Each reader advances one node at a time and supports:
//! - Node inspection (tag name, attributes, text, comments)
//! - Balanced group extraction and forward searches
//! - Staged attribute edits with canonical re-rendering
//! - Date recognition in text and attachment collection

// Some constructors and accessors are only reached from the unit tests
#![allow(dead_code)]

use rustler::{Atom, Binary, Encoder, Env, NifResult, ResourceArc, Term};

mod config;
mod core;
mod error;
mod reader;
mod resource;
mod term;

use resource::{TagReaderRef, TagReaderResource};
use term::{bytes_to_binary, error_to_term, result_to_term, str_to_binary};

// ============================================================================
// Allocator Configuration
// ============================================================================

#[cfg(feature = "mimalloc")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

// ============================================================================
// Helpers
// ============================================================================

/// Lock the reader and run `f`. A poisoned lock raises `:mutex_poisoned`.
fn with_reader<F, R>(reader: &TagReaderRef, f: F) -> NifResult<R>
where
    F: FnOnce(&mut reader::TagReader) -> R,
{
    reader
        .with_reader(f)
        .map_err(|_| rustler::Error::Term(Box::new(term::mutex_poisoned())))
}

/// `:ok` or `{:error, {kind, message}}` for operations without a value
fn unit_result_to_term<T>(env: Env<'_>, result: error::Result<T>) -> Term<'_> {
    match result {
        Ok(_) => term::ok().encode(env),
        Err(err) => error_to_term(env, &err),
    }
}

fn decode_data(data: &Binary) -> String {
    String::from_utf8_lossy(data.as_slice()).into_owned()
}

// ============================================================================
// Construction
// ============================================================================

/// Create a reader over `data`. `opts` is a keyword list of boolean options.
#[rustler::nif]
fn reader_new<'a>(env: Env<'a>, data: Binary<'a>, opts: Vec<(Atom, bool)>) -> NifResult<TagReaderRef> {
    let options = term::options_from_keywords(env, opts)?;
    Ok(ResourceArc::new(TagReaderResource::new(decode_data(&data), options)))
}

/// Reset the reader onto fresh data. Clears position, edits and attachments.
#[rustler::nif]
fn reader_init(reader: TagReaderRef, data: Binary) -> NifResult<Atom> {
    let data = decode_data(&data);
    with_reader(&reader, |r| {
        r.init(data);
    })?;
    Ok(term::ok())
}

// ============================================================================
// Navigation and Node State
// ============================================================================

/// Advance one node. Returns EOF after the move.
#[rustler::nif]
fn reader_read_next(reader: TagReaderRef) -> NifResult<bool> {
    with_reader(&reader, |r| r.read_next().eof())
}

/// Map of every read-only property of the current node
#[rustler::nif]
fn reader_current<'a>(env: Env<'a>, reader: TagReaderRef) -> NifResult<Term<'a>> {
    with_reader(&reader, |r| term::current_to_map(env, r))?
}

#[rustler::nif]
fn reader_attr_names<'a>(env: Env<'a>, reader: TagReaderRef) -> NifResult<Term<'a>> {
    with_reader(&reader, |r| term::strings_to_list(env, &r.attr_names()))
}

/// Attribute value, or `""` when absent
#[rustler::nif]
fn reader_get_attr<'a>(env: Env<'a>, reader: TagReaderRef, name: &str) -> NifResult<Term<'a>> {
    with_reader(&reader, |r| str_to_binary(env, r.get_attr(name)))
}

#[rustler::nif]
fn reader_get_bool_attr(reader: TagReaderRef, name: &str) -> NifResult<bool> {
    with_reader(&reader, |r| r.get_bool_attr(name))
}

/// Source fragment between two byte offsets
#[rustler::nif]
fn reader_get_range_pos<'a>(env: Env<'a>, reader: TagReaderRef, start: usize, end: usize) -> NifResult<Term<'a>> {
    with_reader(&reader, |r| {
        result_to_term(env, r.get_range_pos(start, end).map(|s| str_to_binary(env, s)))
    })
}

#[rustler::nif]
fn reader_set_force_lower_case(reader: TagReaderRef, value: bool) -> NifResult<Atom> {
    with_reader(&reader, |r| {
        r.set_force_lower_case(value);
    })?;
    Ok(term::ok())
}

#[rustler::nif]
fn reader_set_mask_line_breaks(reader: TagReaderRef, value: bool) -> NifResult<Atom> {
    with_reader(&reader, |r| {
        r.set_mask_line_breaks(value);
    })?;
    Ok(term::ok())
}

// ============================================================================
// Edits and Serialization
// ============================================================================

#[rustler::nif]
fn reader_set_attr<'a>(env: Env<'a>, reader: TagReaderRef, name: &str, value: &str) -> NifResult<Term<'a>> {
    with_reader(&reader, |r| unit_result_to_term(env, r.set_attr(name, value)))
}

#[rustler::nif]
fn reader_delete_opt_attr<'a>(env: Env<'a>, reader: TagReaderRef, name: &str) -> NifResult<Term<'a>> {
    with_reader(&reader, |r| unit_result_to_term(env, r.delete_opt_attr(name)))
}

/// Rendered tag with staged edits applied
#[rustler::nif]
fn reader_tag_str<'a>(env: Env<'a>, reader: TagReaderRef) -> NifResult<Term<'a>> {
    with_reader(&reader, |r| {
        result_to_term(env, r.get_tag_str().map(|s| str_to_binary(env, &s)))
    })
}

/// Canonical form of the current node as a binary
#[rustler::nif]
fn reader_export_tag<'a>(env: Env<'a>, reader: TagReaderRef) -> NifResult<Term<'a>> {
    with_reader(&reader, |r| {
        let mut out = Vec::new();
        result_to_term(env, r.export_tag(&mut out).map(|()| bytes_to_binary(env, &out)))
    })
}

// ============================================================================
// Extraction and Search
// ============================================================================

/// Raw markup of the current element through its matching closer
#[rustler::nif(schedule = "DirtyCpu")]
fn reader_read_html_group<'a>(env: Env<'a>, reader: TagReaderRef) -> NifResult<Term<'a>> {
    with_reader(&reader, |r| {
        result_to_term(env, r.read_html_group().map(|s| str_to_binary(env, s)))
    })
}

#[rustler::nif(schedule = "DirtyCpu")]
fn reader_read_html_until_tag<'a>(env: Env<'a>, reader: TagReaderRef, name: &str) -> NifResult<Term<'a>> {
    with_reader(&reader, |r| {
        result_to_term(env, r.read_html_until_tag(name).map(|s| str_to_binary(env, s)))
    })
}

#[rustler::nif(schedule = "DirtyCpu")]
fn reader_read_text_until_tag<'a>(env: Env<'a>, reader: TagReaderRef, name: &str) -> NifResult<Term<'a>> {
    with_reader(&reader, |r| {
        result_to_term(env, r.read_text_until_tag(name).map(|s| str_to_binary(env, &s)))
    })
}

#[rustler::nif(schedule = "DirtyCpu")]
fn reader_skip_to_plain_text<'a>(env: Env<'a>, reader: TagReaderRef, text: &str) -> NifResult<Term<'a>> {
    with_reader(&reader, |r| unit_result_to_term(env, r.skip_to_plain_text(text)))
}

/// `{:ok, found?}`; a miss is an error unless `optional`
#[rustler::nif(schedule = "DirtyCpu")]
fn reader_skip_to_tag<'a>(
    env: Env<'a>,
    reader: TagReaderRef,
    name: &str,
    mask: Option<&str>,
    optional: bool,
) -> NifResult<Term<'a>> {
    with_reader(&reader, |r| {
        result_to_term(env, r.skip_to_tag(name, mask, optional).map(|found| found.encode(env)))
    })
}

#[rustler::nif(schedule = "DirtyCpu")]
fn reader_skip_to_tag_inc<'a>(
    env: Env<'a>,
    reader: TagReaderRef,
    name: &str,
    mask: Option<&str>,
    optional: bool,
) -> NifResult<Term<'a>> {
    with_reader(&reader, |r| {
        result_to_term(env, r.skip_to_tag_inc(name, mask, optional).map(|found| found.encode(env)))
    })
}

/// `{:ok, {{y, m, d}, {h, mi, s}}}`
#[rustler::nif]
fn reader_read_date<'a>(env: Env<'a>, reader: TagReaderRef) -> NifResult<Term<'a>> {
    with_reader(&reader, |r| {
        result_to_term(env, r.read_date().map(|dt| term::datetime_to_term(env, &dt)))
    })
}

// ============================================================================
// Compound Attachments
// ============================================================================

/// Register an attachment; returns its file name
#[rustler::nif]
fn reader_register_compound_attc<'a>(
    env: Env<'a>,
    reader: TagReaderRef,
    file_name: &str,
    data: &str,
) -> NifResult<Term<'a>> {
    with_reader(&reader, |r| str_to_binary(env, &r.register_compound_attc(file_name, data)))
}

/// Every registered attachment, serialized into one binary
#[rustler::nif]
fn reader_export_compound_attc<'a>(env: Env<'a>, reader: TagReaderRef) -> NifResult<Term<'a>> {
    with_reader(&reader, |r| {
        let mut out = Vec::new();
        result_to_term(env, r.export_compound_attc(&mut out).map(|_| bytes_to_binary(env, &out)))
    })
}

// ============================================================================
// NIF Initialization
// ============================================================================

rustler::init!("Elixir.TagReader.Native");
