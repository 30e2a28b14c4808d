//! Binary wire codec: schema-driven encode/decode of one record.
//!
//! On-disk layout of one record ("frame"), concatenated back-to-back in a
//! shard with no file-level header, footer or record count:
//!
//! ```text
//! frame   := len: u32 LE (payload bytes) | crc: u32 LE (crc32 of payload) | payload
//! payload := field*
//! field   := index: u16 LE (position in the schema) | body
//! body    := i64 LE                      Bool / Int32 / Int64
//!          | f32 LE                      Float32 / Float64 (narrowed)
//!          | blen: u32 LE | raw bytes    String / ArrayInt32 / ArrayFloat32
//! ```
//!
//! Unset fields are skipped entirely — no placeholder is written — so the
//! decoder substitutes a type-appropriate default for any schema field
//! absent from the payload. Record boundaries are discoverable only by
//! walking frames sequentially with the shared schema.

use crate::error::{Error, Result};
use crate::schema::{Schema, WireType};
use crate::value::Value;
use std::io::{ErrorKind, Read};
use std::path::Path;

/// Bytes of framing overhead per record (length + checksum).
pub const FRAME_HEADER_BYTES: usize = 8;

/// Encode one record as a complete frame.
///
/// `values` holds the current value of each schema field in wire order;
/// `None` marks an unset field, which is skipped. The returned length is
/// exactly the record's on-disk footprint, which is what the shard writer
/// measures against its size threshold.
///
/// # Errors
/// [`Error::TypeMismatch`] if a value's variant does not match its declared
/// wire type. The only tolerated cross-matches are `Float32`/`Float64`
/// values on either float wire type (both encode as f32 anyway). 64-bit
/// arrays are always rejected, never narrowed.
pub fn encode(schema: &Schema, values: &[Option<Value>]) -> Result<Vec<u8>> {
    if values.len() != schema.len() {
        return Err(Error::Configuration(format!(
            "expected {} field values, got {}",
            schema.len(),
            values.len()
        )));
    }

    let mut payload = Vec::new();
    for (index, (field, value)) in schema.fields().iter().zip(values).enumerate() {
        let value = match value {
            Some(v) => v,
            None => continue, // unset fields are simply not written
        };
        payload.extend_from_slice(&(index as u16).to_le_bytes());
        encode_body(&mut payload, &field.name, field.wire_type, value)?;
    }

    let crc = crc32fast::hash(&payload);
    let mut frame = Vec::with_capacity(FRAME_HEADER_BYTES + payload.len());
    frame.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    frame.extend_from_slice(&crc.to_le_bytes());
    frame.extend_from_slice(&payload);
    Ok(frame)
}

/// Exact on-disk footprint of a record, i.e. `encode(..).len()`.
///
/// The shard writer encodes each chunk once right before its roll
/// decision and writes those same bytes, so the size is never computed
/// against stale field values.
pub fn byte_size(schema: &Schema, values: &[Option<Value>]) -> Result<u64> {
    Ok(encode(schema, values)?.len() as u64)
}

fn encode_body(out: &mut Vec<u8>, name: &str, wire_type: WireType, value: &Value) -> Result<()> {
    let mismatch = || Error::TypeMismatch {
        field: name.to_string(),
        expected: wire_type.name(),
        got: value.kind(),
    };

    match wire_type {
        // The integer family all travels as a signed 64-bit value.
        WireType::Bool => match value {
            Value::Bool(b) => out.extend_from_slice(&(*b as i64).to_le_bytes()),
            _ => return Err(mismatch()),
        },
        WireType::Int32 => match value {
            Value::Int32(i) => out.extend_from_slice(&(*i as i64).to_le_bytes()),
            _ => return Err(mismatch()),
        },
        WireType::Int64 => match value {
            Value::Int64(i) => out.extend_from_slice(&i.to_le_bytes()),
            _ => return Err(mismatch()),
        },
        // Scalar doubles are narrowed; the loss is accepted by design.
        WireType::Float32 | WireType::Float64 => match value {
            Value::Float32(f) => out.extend_from_slice(&f.to_le_bytes()),
            Value::Float64(f) => out.extend_from_slice(&(*f as f32).to_le_bytes()),
            _ => return Err(mismatch()),
        },
        WireType::String => match value {
            Value::Str(s) => encode_bytes(out, s.as_bytes()),
            _ => return Err(mismatch()),
        },
        WireType::ArrayInt32 => match value {
            Value::ArrayInt32(v) => {
                let mut raw = Vec::with_capacity(v.len() * 4);
                for x in v {
                    raw.extend_from_slice(&x.to_le_bytes());
                }
                encode_bytes(out, &raw);
            }
            _ => return Err(mismatch()),
        },
        WireType::ArrayFloat32 => match value {
            Value::ArrayFloat32(v) => {
                let mut raw = Vec::with_capacity(v.len() * 4);
                for x in v {
                    raw.extend_from_slice(&x.to_le_bytes());
                }
                encode_bytes(out, &raw);
            }
            _ => return Err(mismatch()),
        },
    }
    Ok(())
}

fn encode_bytes(out: &mut Vec<u8>, raw: &[u8]) {
    out.extend_from_slice(&(raw.len() as u32).to_le_bytes());
    out.extend_from_slice(raw);
}

/// Decode one frame payload into typed values, one per schema field, in
/// schema order.
///
/// Fields absent from the payload come back as their type default
/// (`false` / `0` / `0.0` / `""` / empty array), mirroring the encoder's
/// skip behavior. `Float64` fields decode as [`Value::Float32`] — values
/// are never wider than what was stored.
///
/// # Errors
/// [`Error::Decode`] on truncated bodies, field indices outside the
/// schema, or array byte lengths that are not a multiple of 4.
pub fn decode(schema: &Schema, payload: &[u8]) -> Result<Vec<Value>> {
    let mut values: Vec<Option<Value>> = vec![None; schema.len()];
    let mut cursor = 0usize;

    while cursor < payload.len() {
        let index = u16::from_le_bytes(take::<2>(payload, &mut cursor)?) as usize;
        let field = schema
            .fields()
            .get(index)
            .ok_or_else(|| Error::Decode(format!("field index {index} outside schema")))?;

        let value = match field.wire_type {
            WireType::Bool => {
                Value::Bool(i64::from_le_bytes(take::<8>(payload, &mut cursor)?) != 0)
            }
            WireType::Int32 => {
                Value::Int32(i64::from_le_bytes(take::<8>(payload, &mut cursor)?) as i32)
            }
            WireType::Int64 => Value::Int64(i64::from_le_bytes(take::<8>(payload, &mut cursor)?)),
            WireType::Float32 | WireType::Float64 => {
                Value::Float32(f32::from_le_bytes(take::<4>(payload, &mut cursor)?))
            }
            WireType::String => {
                let raw = take_bytes(payload, &mut cursor)?;
                Value::Str(String::from_utf8(raw.to_vec()).map_err(|e| {
                    Error::Decode(format!("field '{}' is not valid utf-8: {e}", field.name))
                })?)
            }
            WireType::ArrayInt32 => {
                let raw = take_bytes(payload, &mut cursor)?;
                Value::ArrayInt32(reinterpret(raw, &field.name, i32::from_le_bytes)?)
            }
            WireType::ArrayFloat32 => {
                let raw = take_bytes(payload, &mut cursor)?;
                Value::ArrayFloat32(reinterpret(raw, &field.name, f32::from_le_bytes)?)
            }
        };
        values[index] = Some(value);
    }

    Ok(values
        .into_iter()
        .zip(schema.fields())
        .map(|(v, f)| v.unwrap_or_else(|| Value::default_for(f.wire_type)))
        .collect())
}

fn take<const N: usize>(payload: &[u8], cursor: &mut usize) -> Result<[u8; N]> {
    let end = *cursor + N;
    let slice = payload
        .get(*cursor..end)
        .ok_or_else(|| Error::Decode(format!("payload truncated at byte {cursor}")))?;
    *cursor = end;
    let mut buf = [0u8; N];
    buf.copy_from_slice(slice);
    Ok(buf)
}

fn take_bytes<'a>(payload: &'a [u8], cursor: &mut usize) -> Result<&'a [u8]> {
    let len = u32::from_le_bytes(take::<4>(payload, cursor)?) as usize;
    let end = *cursor + len;
    let slice = payload
        .get(*cursor..end)
        .ok_or_else(|| Error::Decode(format!("byte field truncated at byte {cursor}")))?;
    *cursor = end;
    Ok(slice)
}

fn reinterpret<T>(raw: &[u8], field: &str, from_le: fn([u8; 4]) -> T) -> Result<Vec<T>> {
    if raw.len() % 4 != 0 {
        return Err(Error::Decode(format!(
            "array field '{field}' has {} bytes, not a multiple of 4",
            raw.len()
        )));
    }
    Ok(raw
        .chunks_exact(4)
        .map(|c| from_le([c[0], c[1], c[2], c[3]]))
        .collect())
}

/// Read the next frame's payload from a shard file.
///
/// Returns `Ok(None)` on a clean end of file. A frame cut short mid-header
/// or mid-payload, and a payload failing its checksum, are both
/// [`Error::Corrupt`] — the reader never guesses at boundaries.
pub fn read_frame(reader: &mut impl Read, path: &Path) -> Result<Option<Vec<u8>>> {
    let mut header = [0u8; FRAME_HEADER_BYTES];
    match read_exact_or_eof(reader, &mut header) {
        Ok(false) => return Ok(None),
        Ok(true) => {}
        Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
            return Err(Error::Corrupt {
                path: path.to_path_buf(),
                detail: "torn frame header".into(),
            })
        }
        Err(e) => return Err(Error::io(path, e)),
    }

    let len = u32::from_le_bytes([header[0], header[1], header[2], header[3]]) as usize;
    let crc = u32::from_le_bytes([header[4], header[5], header[6], header[7]]);

    let mut payload = vec![0u8; len];
    reader.read_exact(&mut payload).map_err(|e| {
        if e.kind() == ErrorKind::UnexpectedEof {
            Error::Corrupt {
                path: path.to_path_buf(),
                detail: format!("frame truncated: expected {len} payload bytes"),
            }
        } else {
            Error::io(path, e)
        }
    })?;

    let actual = crc32fast::hash(&payload);
    if actual != crc {
        return Err(Error::Corrupt {
            path: path.to_path_buf(),
            detail: format!("checksum mismatch: stored {crc:#010x}, computed {actual:#010x}"),
        });
    }
    Ok(Some(payload))
}

/// Like `read_exact`, but distinguishes "no more frames" (clean EOF before
/// any byte) from a torn frame header.
fn read_exact_or_eof(reader: &mut impl Read, buf: &mut [u8]) -> std::io::Result<bool> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) if filled == 0 => return Ok(false),
            Ok(0) => {
                return Err(std::io::Error::new(
                    ErrorKind::UnexpectedEof,
                    "torn frame header",
                ))
            }
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Schema;

    fn toy_schema() -> std::sync::Arc<Schema> {
        Schema::builder()
            .field("flag", WireType::Bool)
            .field("label", WireType::Int32)
            .field("count", WireType::Int64)
            .field("likelihood", WireType::Float32)
            .field("weight", WireType::Float64)
            .field("name", WireType::String)
            .field("bins", WireType::ArrayInt32)
            .field("data", WireType::ArrayFloat32)
            .build()
            .unwrap()
    }

    #[test]
    fn every_type_round_trips() {
        let schema = toy_schema();
        let values = vec![
            Some(Value::Bool(true)),
            Some(Value::Int32(-7)),
            Some(Value::Int64(1 << 40)),
            Some(Value::Float32(0.25)),
            Some(Value::Float64(0.1234567890123456)),
            Some(Value::Str("kphxde".into())),
            Some(Value::ArrayInt32(vec![1, -2, 3])),
            Some(Value::ArrayFloat32(vec![0.5, -1.5])),
        ];

        let frame = encode(&schema, &values).unwrap();
        assert_eq!(byte_size(&schema, &values).unwrap(), frame.len() as u64);
        let payload = &frame[FRAME_HEADER_BYTES..];
        let decoded = decode(&schema, payload).unwrap();

        assert_eq!(decoded[0], Value::Bool(true));
        assert_eq!(decoded[1], Value::Int32(-7));
        assert_eq!(decoded[2], Value::Int64(1 << 40));
        assert_eq!(decoded[3], Value::Float32(0.25));
        // Doubles come back narrowed, never widened.
        assert_eq!(decoded[4], Value::Float32(0.1234567890123456_f64 as f32));
        assert_eq!(decoded[5], Value::Str("kphxde".into()));
        assert_eq!(decoded[6], Value::ArrayInt32(vec![1, -2, 3]));
        assert_eq!(decoded[7], Value::ArrayFloat32(vec![0.5, -1.5]));
    }

    #[test]
    fn unset_fields_decode_to_defaults() {
        let schema = toy_schema();
        let values: Vec<Option<Value>> = vec![None; schema.len()];
        let frame = encode(&schema, &values).unwrap();
        // Nothing but the header: skipped fields leave no placeholder.
        assert_eq!(frame.len(), FRAME_HEADER_BYTES);

        let decoded = decode(&schema, &frame[FRAME_HEADER_BYTES..]).unwrap();
        assert_eq!(decoded[0], Value::Bool(false));
        assert_eq!(decoded[1], Value::Int32(0));
        assert_eq!(decoded[3], Value::Float32(0.0));
        assert_eq!(decoded[5], Value::Str(String::new()));
        assert_eq!(decoded[7], Value::ArrayFloat32(Vec::new()));
    }

    #[test]
    fn wide_arrays_are_rejected_not_narrowed() {
        let schema = Schema::builder()
            .field("data", WireType::ArrayFloat32)
            .build()
            .unwrap();
        let err = encode(&schema, &[Some(Value::ArrayFloat64(vec![0.1, 0.2]))]).unwrap_err();
        assert!(matches!(
            err,
            Error::TypeMismatch { ref field, got: "array_float64", .. } if field == "data"
        ));

        let schema = Schema::builder()
            .field("bins", WireType::ArrayInt32)
            .build()
            .unwrap();
        let err = encode(&schema, &[Some(Value::ArrayInt64(vec![1]))]).unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { got: "array_int64", .. }));
    }

    #[test]
    fn scalar_mismatches_are_fatal() {
        let schema = Schema::builder()
            .field("label", WireType::Int32)
            .build()
            .unwrap();
        let err = encode(&schema, &[Some(Value::Str("3".into()))]).unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { .. }));

        // Int64 is not implicitly accepted where Int32 was declared.
        let err = encode(&schema, &[Some(Value::Int64(3))]).unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { .. }));
    }

    #[test]
    fn checksum_mismatch_is_corrupt() {
        let schema = Schema::builder()
            .field("name", WireType::String)
            .build()
            .unwrap();
        let mut frame = encode(&schema, &[Some(Value::Str("abc".into()))]).unwrap();
        let last = frame.len() - 1;
        frame[last] ^= 0xFF;

        let mut cursor = std::io::Cursor::new(frame);
        let err = read_frame(&mut cursor, Path::new("0.rec")).unwrap_err();
        assert!(matches!(err, Error::Corrupt { .. }));
    }

    #[test]
    fn frames_are_delimited_back_to_back() {
        let schema = Schema::builder()
            .field("label", WireType::Int32)
            .build()
            .unwrap();
        let mut buf = Vec::new();
        for i in 0..3 {
            buf.extend(encode(&schema, &[Some(Value::Int32(i))]).unwrap());
        }

        let mut cursor = std::io::Cursor::new(buf);
        let path = Path::new("0.rec");
        for i in 0..3 {
            let payload = read_frame(&mut cursor, path).unwrap().unwrap();
            assert_eq!(decode(&schema, &payload).unwrap()[0], Value::Int32(i));
        }
        assert!(read_frame(&mut cursor, path).unwrap().is_none());
    }
}
