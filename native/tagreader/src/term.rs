//! Elixir Term Conversion Utilities
//!
//! Converts reader state, results and errors to Elixir terms.

use rustler::{Atom, Encoder, Env, NewBinary, NifResult, Term};

use crate::config::ReaderOptions;
use crate::core::date::DateTime;
use crate::error::ReaderError;
use crate::reader::{NodeKind, TagReader};

// Pre-defined atoms for efficiency - created once at compile time
rustler::atoms! {
    ok,
    error,
    mutex_poisoned,

    // error kinds
    not_found,
    unbalanced_markup,
    no_date_at_position,
    invalid_state,
    invalid_range,
    io,

    // node kinds
    before_start,
    named_tag,
    closing_tag,
    comment,
    misc_text,
    plain_text,

    // reader_current keys
    kind,
    attr_names,
    cur_line_index,
    eof,
    force_lower_case,
    is_group_tag,
    is_closing_tag,
    raw_text,
    tag_name,
    tag_pos,
    tag_str,
}

/// Convert bytes to a binary term (more efficient than .encode())
#[inline]
pub fn bytes_to_binary<'a>(env: Env<'a>, bytes: &[u8]) -> Term<'a> {
    let mut binary = NewBinary::new(env, bytes.len());
    binary.as_mut_slice().copy_from_slice(bytes);
    binary.into()
}

/// Convert a string to a binary term
#[inline]
pub fn str_to_binary<'a>(env: Env<'a>, s: &str) -> Term<'a> {
    bytes_to_binary(env, s.as_bytes())
}

/// Optional string as a binary or `nil`
fn opt_str_to_term<'a>(env: Env<'a>, s: Option<&str>) -> Term<'a> {
    match s {
        Some(s) => str_to_binary(env, s),
        None => rustler::types::atom::nil().encode(env),
    }
}

fn node_kind_atom(kind: NodeKind) -> Atom {
    match kind {
        NodeKind::BeforeStart => before_start(),
        NodeKind::NamedTag => named_tag(),
        NodeKind::ClosingTag => closing_tag(),
        NodeKind::Comment => comment(),
        NodeKind::MiscText => misc_text(),
        NodeKind::PlainText => plain_text(),
    }
}

fn error_kind_atom(err: &ReaderError) -> Atom {
    match err {
        ReaderError::NotFound { .. } => not_found(),
        ReaderError::UnbalancedMarkup { .. } => unbalanced_markup(),
        ReaderError::NoDateAtPosition { .. } => no_date_at_position(),
        ReaderError::InvalidState(_) => invalid_state(),
        ReaderError::InvalidRange { .. } => invalid_range(),
        ReaderError::Io(_) => io(),
    }
}

/// `{:error, {kind, message}}`
pub fn error_to_term<'a>(env: Env<'a>, err: &ReaderError) -> Term<'a> {
    tracing::debug!(kind = err.kind(), error = %err, "reader call failed");
    let reason = (error_kind_atom(err), str_to_binary(env, &err.to_string()));
    (error(), reason).encode(env)
}

/// `{:ok, value}` or `{:error, {kind, message}}`
pub fn result_to_term<'a>(env: Env<'a>, result: crate::error::Result<Term<'a>>) -> Term<'a> {
    match result {
        Ok(value) => (ok(), value).encode(env),
        Err(err) => error_to_term(env, &err),
    }
}

/// Build reader options from a keyword list of booleans. Unknown keys are
/// ignored.
pub fn options_from_keywords(env: Env<'_>, opts: Vec<(Atom, bool)>) -> NifResult<ReaderOptions> {
    let mut options = ReaderOptions::default();
    for (key, value) in opts {
        let name = key.to_term(env).atom_to_string()?;
        if !options.set(&name, value) {
            tracing::debug!(option = %name, "ignoring unknown reader option");
        }
    }
    Ok(options)
}

/// Erlang calendar datetime `{{Y, M, D}, {H, Mi, S}}`
pub fn datetime_to_term<'a>(env: Env<'a>, dt: &DateTime) -> Term<'a> {
    ((dt.year, dt.month, dt.day), (dt.hour, dt.minute, dt.second)).encode(env)
}

/// List of binaries
pub fn strings_to_list<'a, S: AsRef<str>>(env: Env<'a>, items: &[S]) -> Term<'a> {
    let mut list = Term::list_new_empty(env);
    for item in items.iter().rev() {
        list = list.list_prepend(str_to_binary(env, item.as_ref()));
    }
    list
}

/// Snapshot of every read-only property of the current node as a map
pub fn current_to_map<'a>(env: Env<'a>, reader: &TagReader) -> NifResult<Term<'a>> {
    let plain = reader.plain_text();
    let tag = reader.tag_str();
    let pairs: Vec<(Term<'a>, Term<'a>)> = vec![
        (kind().encode(env), node_kind_atom(reader.kind()).encode(env)),
        (tag_name().encode(env), str_to_binary(env, &reader.tag_name())),
        (tag_pos().encode(env), reader.tag_pos().encode(env)),
        (cur_line_index().encode(env), reader.cur_line_index().encode(env)),
        (eof().encode(env), reader.eof().encode(env)),
        (force_lower_case().encode(env), reader.force_lower_case().encode(env)),
        (is_group_tag().encode(env), reader.is_group_tag().encode(env)),
        (is_closing_tag().encode(env), reader.is_closing_tag().encode(env)),
        (attr_names().encode(env), strings_to_list(env, &reader.attr_names())),
        (comment().encode(env), opt_str_to_term(env, reader.comment())),
        (misc_text().encode(env), opt_str_to_term(env, reader.misc_text())),
        (plain_text().encode(env), opt_str_to_term(env, plain.as_deref())),
        (raw_text().encode(env), opt_str_to_term(env, reader.raw_text())),
        (tag_str().encode(env), opt_str_to_term(env, tag.as_deref())),
    ];
    Term::map_from_pairs(env, &pairs)
}
