// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Serialized-size estimate for registry documents.
//!
//! Documents are measured in the spaced ASCII encoding: `", "` and `": "`
//! separators, every character outside printable ASCII escaped as `\uXXXX`
//! (UTF-16 code units, lowercase hex). Numbers are written with the digits
//! the registry sent, so integers wider than 64 bits keep their exact length.
//! Published sizes are only comparable within this encoding.

use std::io;

use serde::Serialize;
use serde_json::ser::Formatter;
use serde_json::Value;

const BYTES_PER_MIB: f64 = 1024.0 * 1024.0;

/// Size of `data` in MiB, rounded to two decimals (ties to even).
///
/// Empty documents (null, `{}`, `[]`, `""`, `false`, `0`) report `0.0`.
pub fn calculate_size(data: &Value) -> f64 {
    if is_empty(data) {
        return 0.0;
    }
    match serialized_len(data) {
        Ok(len) => round_mib(len),
        Err(e) => {
            tracing::warn!(err = %e, "failed to serialize document for sizing");
            0.0
        }
    }
}

/// Byte length of `data` in the measured encoding.
pub fn serialized_len(data: &Value) -> serde_json::Result<usize> {
    let mut counter = ByteCounter(0);
    let mut ser = serde_json::Serializer::with_formatter(&mut counter, SpacedAsciiFormatter);
    data.serialize(&mut ser)?;
    Ok(counter.0)
}

/// Whether a document counts as "no data".
pub fn is_empty(data: &Value) -> bool {
    match data {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

fn round_mib(len: usize) -> f64 {
    let mib = len as f64 / BYTES_PER_MIB;
    (mib * 100.0).round_ties_even() / 100.0
}

/// Counts bytes instead of buffering them.
struct ByteCounter(usize);

impl io::Write for ByteCounter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0 += buf.len();
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

struct SpacedAsciiFormatter;

impl Formatter for SpacedAsciiFormatter {
    fn begin_array_value<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        writer.write_all(b": ")
    }

    fn write_string_fragment<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        fragment: &str,
    ) -> io::Result<()> {
        let mut start = 0;
        for (i, ch) in fragment.char_indices() {
            if (' '..='~').contains(&ch) {
                continue;
            }
            writer.write_all(&fragment.as_bytes()[start..i])?;
            let mut units = [0u16; 2];
            for unit in ch.encode_utf16(&mut units) {
                write!(writer, "\\u{unit:04x}")?;
            }
            start = i + ch.len_utf8();
        }
        writer.write_all(&fragment.as_bytes()[start..])
    }
}

#[cfg(test)]
#[path = "size_tests.rs"]
mod tests;
