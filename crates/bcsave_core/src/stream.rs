use std::borrow::Cow;
use std::fmt;

use serde::{Serialize, Serializer};

use crate::dict::Dict;
use crate::error::{Result, SaveError};

/// Counts above this are treated as corrupt input rather than allocated.
pub const DEFAULT_COUNT_CAP: usize = 1 << 24;

const VARINT_MAX_GROUPS: usize = 4;
const VARINT_LIMIT: u32 = 1 << (7 * VARINT_MAX_GROUPS);

pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
    count_cap: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self::with_count_cap(data, DEFAULT_COUNT_CAP)
    }

    pub fn with_count_cap(data: &'a [u8], count_cap: usize) -> Self {
        Self {
            data,
            pos: 0,
            count_cap,
        }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn count_cap(&self) -> usize {
        self.count_cap
    }

    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.remaining() < n {
            return Err(SaveError::truncated(self.pos, n, self.remaining()));
        }
        let out = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    /// Consume everything that is left.
    pub fn read_rest(&mut self) -> &'a [u8] {
        let out = &self.data[self.pos..];
        self.pos = self.data.len();
        out
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut buf = [0u8; N];
        buf.copy_from_slice(self.read_bytes(N)?);
        Ok(buf)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_array::<1>()?[0])
    }

    pub fn read_bool(&mut self) -> Result<bool> {
        Ok(self.read_u8()? != 0)
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        Ok(i16::from_le_bytes(self.read_array()?))
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(u16::from_le_bytes(self.read_array()?))
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        Ok(i32::from_le_bytes(self.read_array()?))
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    pub fn read_i64(&mut self) -> Result<i64> {
        Ok(i64::from_le_bytes(self.read_array()?))
    }

    pub fn read_f64(&mut self) -> Result<f64> {
        Ok(f64::from_le_bytes(self.read_array()?))
    }

    /// An `i32` element count, checked against sign and the plausibility cap.
    pub fn read_count(&mut self) -> Result<usize> {
        let at = self.pos;
        let raw = self.read_i32()?;
        self.check_count(at, i64::from(raw))
    }

    pub fn read_short_count(&mut self) -> Result<usize> {
        let at = self.pos;
        let raw = self.read_i16()?;
        self.check_count(at, i64::from(raw))
    }

    pub fn read_byte_count(&mut self) -> Result<usize> {
        Ok(usize::from(self.read_u8()?))
    }

    fn check_count(&self, at: usize, raw: i64) -> Result<usize> {
        if raw < 0 {
            return Err(SaveError::invalid(at, format!("negative count {raw}")));
        }
        if raw as u64 > self.count_cap as u64 {
            return Err(SaveError::implausible(at, raw, self.count_cap));
        }
        Ok(raw as usize)
    }

    /// Guard a count-derived allocation: never reserve more slots than the
    /// remaining input could possibly fill.
    fn capacity_hint(&self, count: usize, elem_size: usize) -> usize {
        count.min(self.remaining() / elem_size.max(1))
    }

    pub fn read_string(&mut self) -> Result<SaveString> {
        let at = self.pos;
        let raw = self.read_i32()?;
        if raw < 0 {
            return Err(SaveError::invalid(at, format!("negative string length {raw}")));
        }
        let len = raw as usize;
        if len > self.remaining() {
            return Err(SaveError::invalid(
                at,
                format!(
                    "string length {len} exceeds remaining {} bytes",
                    self.remaining()
                ),
            ));
        }
        let bytes = self.read_bytes(len)?;
        Ok(SaveString::from_wire(bytes))
    }

    pub fn read_int_list(&mut self, n: usize) -> Result<Vec<i32>> {
        let mut out = Vec::with_capacity(self.capacity_hint(n, 4));
        for _ in 0..n {
            out.push(self.read_i32()?);
        }
        Ok(out)
    }

    pub fn read_int_list_prefixed(&mut self) -> Result<Vec<i32>> {
        let n = self.read_count()?;
        self.read_int_list(n)
    }

    pub fn read_bool_list(&mut self, n: usize) -> Result<Vec<bool>> {
        let mut out = Vec::with_capacity(self.capacity_hint(n, 1));
        for _ in 0..n {
            out.push(self.read_bool()?);
        }
        Ok(out)
    }

    pub fn read_bool_list_prefixed(&mut self) -> Result<Vec<bool>> {
        let n = self.read_count()?;
        self.read_bool_list(n)
    }

    pub fn read_int_bool_dict(&mut self) -> Result<Dict<i32, bool>> {
        let n = self.read_count()?;
        let mut out = Dict::with_capacity(self.capacity_hint(n, 5));
        for _ in 0..n {
            let key = self.read_i32()?;
            let value = self.read_bool()?;
            out.push_raw(key, value);
        }
        Ok(out)
    }

    pub fn read_int_int_dict(&mut self) -> Result<Dict<i32, i32>> {
        let n = self.read_count()?;
        let mut out = Dict::with_capacity(self.capacity_hint(n, 8));
        for _ in 0..n {
            let key = self.read_i32()?;
            let value = self.read_i32()?;
            out.push_raw(key, value);
        }
        Ok(out)
    }

    pub fn read_int_double_dict(&mut self) -> Result<Dict<i32, f64>> {
        let n = self.read_count()?;
        let mut out = Dict::with_capacity(self.capacity_hint(n, 12));
        for _ in 0..n {
            let key = self.read_i32()?;
            let value = self.read_f64()?;
            out.push_raw(key, value);
        }
        Ok(out)
    }

    pub fn read_short_bool_dict(&mut self) -> Result<Dict<i16, bool>> {
        let n = self.read_count()?;
        let mut out = Dict::with_capacity(self.capacity_hint(n, 3));
        for _ in 0..n {
            let key = self.read_i16()?;
            let value = self.read_bool()?;
            out.push_raw(key, value);
        }
        Ok(out)
    }

    /// 7-bit groups, most significant first, high bit set on all but the
    /// last group. Only minimal encodings of at most four groups are valid.
    pub fn read_variable_length_int(&mut self) -> Result<u32> {
        let at = self.pos;
        let mut value = 0u32;
        for group in 0..VARINT_MAX_GROUPS {
            let byte = self.read_u8()?;
            if group == 0 && byte == 0x80 {
                return Err(SaveError::invalid(at, "non-minimal variable-length int"));
            }
            value = (value << 7) | u32::from(byte & 0x7f);
            if byte & 0x80 == 0 {
                return Ok(value);
            }
        }
        Err(SaveError::invalid(
            at,
            "variable-length int exceeds four groups",
        ))
    }

    pub fn read_variable_length_count(&mut self) -> Result<usize> {
        let at = self.pos;
        let raw = self.read_variable_length_int()?;
        self.check_count(at, i64::from(raw))
    }
}

#[derive(Debug, Default)]
pub struct ByteWriter {
    buf: Vec<u8>,
}

impl ByteWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    pub fn position(&self) -> usize {
        self.buf.len()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    pub fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    pub fn write_bool(&mut self, v: bool) {
        self.buf.push(u8::from(v));
    }

    pub fn write_i16(&mut self, v: i16) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub fn write_u16(&mut self, v: u16) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub fn write_i32(&mut self, v: i32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub fn write_i64(&mut self, v: i64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub fn write_f64(&mut self, v: f64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub fn write_count(&mut self, len: usize, field: &'static str) -> Result<()> {
        let raw = i32::try_from(len).map_err(|_| {
            SaveError::invariant(field, format!("{len} entries do not fit an i32 count"))
        })?;
        self.write_i32(raw);
        Ok(())
    }

    pub fn write_short_count(&mut self, len: usize, field: &'static str) -> Result<()> {
        let raw = i16::try_from(len).map_err(|_| {
            SaveError::invariant(field, format!("{len} entries do not fit an i16 count"))
        })?;
        self.write_i16(raw);
        Ok(())
    }

    pub fn write_byte_count(&mut self, len: usize, field: &'static str) -> Result<()> {
        let raw = u8::try_from(len).map_err(|_| {
            SaveError::invariant(field, format!("{len} entries do not fit a byte count"))
        })?;
        self.write_u8(raw);
        Ok(())
    }

    pub fn write_string(&mut self, s: &SaveString, field: &'static str) -> Result<()> {
        let bytes = s.to_wire(field)?;
        self.write_count(bytes.len(), field)?;
        self.write_bytes(&bytes);
        Ok(())
    }

    pub fn write_int_list(&mut self, values: &[i32]) {
        for &v in values {
            self.write_i32(v);
        }
    }

    pub fn write_int_list_prefixed(&mut self, values: &[i32], field: &'static str) -> Result<()> {
        self.write_count(values.len(), field)?;
        self.write_int_list(values);
        Ok(())
    }

    pub fn write_bool_list(&mut self, values: &[bool]) {
        for &v in values {
            self.write_bool(v);
        }
    }

    pub fn write_bool_list_prefixed(
        &mut self,
        values: &[bool],
        field: &'static str,
    ) -> Result<()> {
        self.write_count(values.len(), field)?;
        self.write_bool_list(values);
        Ok(())
    }

    pub fn write_int_bool_dict(&mut self, dict: &Dict<i32, bool>, field: &'static str) -> Result<()> {
        self.write_count(dict.len(), field)?;
        for (k, &v) in dict.iter() {
            self.write_i32(k);
            self.write_bool(v);
        }
        Ok(())
    }

    pub fn write_int_int_dict(&mut self, dict: &Dict<i32, i32>, field: &'static str) -> Result<()> {
        self.write_count(dict.len(), field)?;
        for (k, &v) in dict.iter() {
            self.write_i32(k);
            self.write_i32(v);
        }
        Ok(())
    }

    pub fn write_int_double_dict(
        &mut self,
        dict: &Dict<i32, f64>,
        field: &'static str,
    ) -> Result<()> {
        self.write_count(dict.len(), field)?;
        for (k, &v) in dict.iter() {
            self.write_i32(k);
            self.write_f64(v);
        }
        Ok(())
    }

    pub fn write_short_bool_dict(
        &mut self,
        dict: &Dict<i16, bool>,
        field: &'static str,
    ) -> Result<()> {
        self.write_count(dict.len(), field)?;
        for (k, &v) in dict.iter() {
            self.write_i16(k);
            self.write_bool(v);
        }
        Ok(())
    }

    pub fn write_variable_length_int(&mut self, value: u32, field: &'static str) -> Result<()> {
        if value >= VARINT_LIMIT {
            return Err(SaveError::invariant(
                field,
                format!("{value} does not fit a four-group variable-length int"),
            ));
        }
        let mut groups = [0u8; VARINT_MAX_GROUPS];
        let mut n = 0;
        let mut rest = value;
        loop {
            groups[n] = (rest & 0x7f) as u8;
            n += 1;
            rest >>= 7;
            if rest == 0 {
                break;
            }
        }
        for idx in (0..n).rev() {
            let continuation = if idx == 0 { 0 } else { 0x80 };
            self.write_u8(groups[idx] | continuation);
        }
        Ok(())
    }

    pub fn write_variable_length_count(&mut self, len: usize, field: &'static str) -> Result<()> {
        let raw = u32::try_from(len).map_err(|_| {
            SaveError::invariant(field, format!("{len} entries do not fit a count"))
        })?;
        self.write_variable_length_int(raw, field)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum TextEncoding {
    #[default]
    Utf8,
    /// Payload was not valid UTF-8; kept byte-per-char so it re-encodes verbatim.
    Latin1,
}

/// A length-prefixed save string.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SaveString {
    text: String,
    encoding: TextEncoding,
}

impl SaveString {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            encoding: TextEncoding::Utf8,
        }
    }

    fn from_wire(bytes: &[u8]) -> Self {
        match std::str::from_utf8(bytes) {
            Ok(text) => Self::new(text),
            Err(_) => Self {
                text: bytes.iter().map(|&b| char::from(b)).collect(),
                encoding: TextEncoding::Latin1,
            },
        }
    }

    fn to_wire(&self, field: &'static str) -> Result<Cow<'_, [u8]>> {
        match self.encoding {
            TextEncoding::Utf8 => Ok(Cow::Borrowed(self.text.as_bytes())),
            TextEncoding::Latin1 => self
                .text
                .chars()
                .map(|c| {
                    u8::try_from(u32::from(c)).map_err(|_| {
                        SaveError::invariant(field, format!("{c:?} is outside the byte range"))
                    })
                })
                .collect::<Result<Vec<u8>>>()
                .map(Cow::Owned),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// True when the stored bytes were not UTF-8.
    pub fn is_raw_bytes(&self) -> bool {
        self.encoding == TextEncoding::Latin1
    }

    pub fn set(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.encoding = TextEncoding::Utf8;
    }
}

impl From<&str> for SaveString {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for SaveString {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}

impl fmt::Display for SaveString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl Serialize for SaveString {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.text)
    }
}

/// Unix seconds, stored as a double or an integer depending on the version.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Timestamp {
    Float(f64),
    Int(i64),
}

impl Default for Timestamp {
    fn default() -> Self {
        Timestamp::Int(0)
    }
}

impl Timestamp {
    pub fn as_f64(&self) -> f64 {
        match *self {
            Timestamp::Float(v) => v,
            Timestamp::Int(v) => v as f64,
        }
    }

    /// Saturating truncation toward zero for stored doubles.
    pub fn as_i64(&self) -> i64 {
        match *self {
            Timestamp::Float(v) => v as i64,
            Timestamp::Int(v) => v,
        }
    }

    pub fn as_i32(&self) -> i32 {
        self.as_i64().clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
    }
}
