//! Streaming readers and writers over a sequence, one element at a time.
//!
//! Grounded on `examples/original_source/ReadOnlyStream.h` /
//! `WriteOnlyStream.h`'s `ArrayImpl`/`IoStreamImpl` split — an in-memory
//! source/sink (`EagerSequence`/`LazySequence`) or a raw I/O handle paired
//! with a (de)serializing closure, picked at construction time. This crate
//! expresses that split as an internal enum rather than the original's
//! virtual-dispatch `IStreamImpl` base, per `SPEC_FULL.md` §4.10a.

use std::cell::RefCell;
use std::io::{BufRead, Write};
use std::rc::Rc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::cardinal::Cardinal;
use crate::eager::EagerSequence;
use crate::error::{Error, Result};
use crate::sequence::LazySequence;

/// Parses one record (a line, with the trailing newline already
/// stripped) into a `T`.
pub type Deserializer<T> = Rc<dyn Fn(&str) -> Result<T>>;

/// Renders a `T` as the line that will be written for it (no trailing
/// newline — `WriteStream::write_next` adds it).
pub type Serializer<T> = Rc<dyn Fn(&T) -> String>;

enum StreamSource<T> {
    Eager(EagerSequence<T>, usize),
    Lazy(LazySequence<T>, usize),
    Io {
        reader: Box<dyn BufRead>,
        deserializer: Deserializer<T>,
    },
}

/// Pulls one element at a time from an in-memory sequence or a raw
/// reader. Reading past the end of a [`LazySequence`] source drives its
/// generator the same way [`LazySequence::get`] would.
pub struct ReadStream<T> {
    source: StreamSource<T>,
    closed: bool,
}

impl<T: Clone + PartialEq + 'static> ReadStream<T> {
    pub fn from_eager(seq: EagerSequence<T>) -> Self {
        ReadStream {
            source: StreamSource::Eager(seq, 0),
            closed: false,
        }
    }

    pub fn from_lazy(seq: LazySequence<T>) -> Self {
        ReadStream {
            source: StreamSource::Lazy(seq, 0),
            closed: false,
        }
    }

    /// Reads newline-delimited records from `reader`, parsing each line
    /// with `deserializer`.
    pub fn from_io(reader: Box<dyn BufRead>, deserializer: Deserializer<T>) -> Self {
        ReadStream {
            source: StreamSource::Io {
                reader,
                deserializer,
            },
            closed: false,
        }
    }

    /// `Ok(None)` marks a clean end of stream; `Err` marks a real
    /// failure (malformed record, or a generator's rule failing
    /// mid-materialization). Once [`Self::close`] has been called,
    /// every further read fails with [`Error::EndOfStream`] instead,
    /// matching `ReadOnlyStream::Read`'s `isOpen` check in
    /// `examples/original_source/ReadOnlyStream.h`.
    pub fn read_next(&mut self) -> Result<Option<T>> {
        if self.closed {
            return Err(Error::EndOfStream);
        }
        match &mut self.source {
            StreamSource::Eager(seq, pos) => {
                if *pos >= seq.len() {
                    return Ok(None);
                }
                let v = seq.get(*pos)?.clone();
                *pos += 1;
                Ok(Some(v))
            }
            StreamSource::Lazy(seq, pos) => match seq.get(*pos) {
                Ok(v) => {
                    *pos += 1;
                    Ok(Some(v))
                }
                Err(Error::OutOfRange { .. }) => Ok(None),
                Err(e) => Err(e),
            },
            StreamSource::Io {
                reader,
                deserializer,
            } => {
                let mut line = String::new();
                let bytes = reader.read_line(&mut line).map_err(|e| Error::Io(e.to_string()))?;
                if bytes == 0 {
                    return Ok(None);
                }
                let trimmed = line.trim_end_matches(['\n', '\r']);
                deserializer(trimmed).map(Some)
            }
        }
    }

    /// `pos >= length` for a finite source, `false` for an `Omega`-length
    /// [`LazySequence`], and a non-consuming peek at the underlying
    /// reader for an `Io` source — mirrors `ReadOnlyStream::IsEndOfStream`
    /// in `examples/original_source/ReadOnlyStream.h`.
    pub fn is_end_of_stream(&mut self) -> Result<bool> {
        if self.closed {
            return Ok(true);
        }
        match &mut self.source {
            StreamSource::Eager(seq, pos) => Ok(*pos >= seq.len()),
            StreamSource::Lazy(seq, pos) => match seq.length() {
                Cardinal::Finite(n) => Ok(*pos >= n),
                Cardinal::Omega => Ok(false),
            },
            StreamSource::Io { reader, .. } => {
                let buf = reader.fill_buf().map_err(|e| Error::Io(e.to_string()))?;
                Ok(buf.is_empty())
            }
        }
    }

    /// Moves the read cursor to `index` without materializing anything in
    /// between — the lazy-seek contract `SPEC_FULL.md` §9 calls for.
    /// Supported only over sequence-backed sources; mirrors
    /// `ArrayImpl::Seek`/`IoStreamImpl::Seek` in
    /// `examples/original_source/ReadOnlyStream.h`, where seeking a raw
    /// input stream throws `std::logic_error`.
    pub fn seek(&mut self, index: usize) -> Result<()> {
        match &mut self.source {
            StreamSource::Eager(seq, pos) => {
                if index > seq.len() {
                    return Err(Error::OutOfRange {
                        index,
                        length: seq.len().to_string(),
                    });
                }
                *pos = index;
                Ok(())
            }
            StreamSource::Lazy(seq, pos) => {
                if let Cardinal::Finite(n) = seq.length() {
                    if index > n {
                        return Err(Error::OutOfRange {
                            index,
                            length: n.to_string(),
                        });
                    }
                }
                *pos = index;
                Ok(())
            }
            StreamSource::Io { .. } => Err(Error::InvalidArgument(
                "seek not supported for generic IO streams".into(),
            )),
        }
    }

    /// Marks the stream closed: every further `read_next` fails with
    /// `Error::EndOfStream`, regardless of source.
    pub fn close(&mut self) {
        self.closed = true;
    }
}

impl<T: Clone + PartialEq + DeserializeOwned + 'static> ReadStream<T> {
    /// Convenience constructor: one JSON document per line, via
    /// `serde_json` — the one (de)serialization crate this pack's
    /// teacher stack actually depends on (`synth`'s `Cargo.toml`).
    pub fn from_io_json(reader: Box<dyn BufRead>) -> Self {
        Self::from_io(reader, json_deserializer())
    }
}

enum WriteSink<T> {
    Eager(Rc<RefCell<EagerSequence<T>>>),
    Io {
        sink: Box<dyn Write>,
        serializer: Serializer<T>,
    },
}

/// Hands each value either to an in-memory [`EagerSequence`] (appended in
/// place) or to a channel, one record per line, via a caller-supplied
/// `Serializer` — the symmetric counterpart of [`ReadStream`], mirroring
/// `WriteOnlyStream`'s `ArrayImpl`/`IoStreamImpl` split in
/// `examples/original_source/WriteOnlyStream.h`.
pub struct WriteStream<T> {
    sink: WriteSink<T>,
    count: usize,
}

impl<T: Clone> WriteStream<T> {
    pub fn new(sink: Box<dyn Write>, serializer: Serializer<T>) -> Self {
        WriteStream {
            sink: WriteSink::Io { sink, serializer },
            count: 0,
        }
    }

    /// Appends to `seq` in place. `seq` is shared via `Rc<RefCell<_>>`
    /// rather than owned outright, so the caller can keep reading it as
    /// this stream grows it — the same sharing idiom
    /// [`crate::generator::Cache`] uses for a generator's cache.
    pub fn from_eager(seq: Rc<RefCell<EagerSequence<T>>>) -> Self {
        let count = seq.borrow().len();
        WriteStream {
            sink: WriteSink::Eager(seq),
            count,
        }
    }

    /// Writes `value`, returning the stream's new record count —
    /// `WriteOnlyStream::Write`'s return value in
    /// `examples/original_source/WriteOnlyStream.h`.
    pub fn write_next(&mut self, value: &T) -> Result<usize> {
        match &mut self.sink {
            WriteSink::Eager(seq) => {
                seq.borrow_mut().append(value.clone());
                self.count = seq.borrow().len();
                Ok(self.count)
            }
            WriteSink::Io { sink, serializer } => {
                let line = serializer(value);
                writeln!(sink, "{line}").map_err(|e| Error::Io(e.to_string()))?;
                self.count += 1;
                Ok(self.count)
            }
        }
    }

    pub fn flush(&mut self) -> Result<()> {
        match &mut self.sink {
            WriteSink::Eager(_) => Ok(()),
            WriteSink::Io { sink, .. } => sink.flush().map_err(|e| Error::Io(e.to_string())),
        }
    }
}

impl<T: Clone + Serialize + 'static> WriteStream<T> {
    /// Convenience constructor mirroring [`ReadStream::from_io_json`].
    pub fn to_io_json(sink: Box<dyn Write>) -> Self {
        Self::new(sink, json_serializer())
    }
}

fn json_deserializer<T: DeserializeOwned + 'static>() -> Deserializer<T> {
    Rc::new(|line: &str| serde_json::from_str(line).map_err(|e| Error::Codec(e.to_string())))
}

fn json_serializer<T: Serialize + 'static>() -> Serializer<T> {
    Rc::new(|value: &T| {
        serde_json::to_string(value).unwrap_or_else(|e| {
            log::warn!("serializer: failed to encode value as JSON: {e}");
            String::new()
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_stream_over_eager_sequence() {
        let seq = EagerSequence::from_vec(vec![1, 2, 3]);
        let mut rs = ReadStream::from_eager(seq);
        assert_eq!(rs.read_next().unwrap(), Some(1));
        assert_eq!(rs.read_next().unwrap(), Some(2));
        assert_eq!(rs.read_next().unwrap(), Some(3));
        assert_eq!(rs.read_next().unwrap(), None);
    }

    #[test]
    fn read_stream_over_lazy_sequence_stops_cleanly_at_the_end() {
        let seq = LazySequence::from_vec(vec!["a", "b"]);
        let mut rs = ReadStream::from_lazy(seq);
        assert_eq!(rs.read_next().unwrap(), Some("a"));
        assert_eq!(rs.read_next().unwrap(), Some("b"));
        assert_eq!(rs.read_next().unwrap(), None);
    }

    #[test]
    fn json_round_trip_through_a_byte_buffer() {
        let mut buf: Vec<u8> = Vec::new();
        {
            let mut ws: WriteStream<i32> = WriteStream::to_io_json(Box::new(&mut buf));
            ws.write_next(&1).unwrap();
            ws.write_next(&2).unwrap();
            ws.flush().unwrap();
        }
        let mut rs: ReadStream<i32> = ReadStream::from_io_json(Box::new(buf.as_slice()));
        assert_eq!(rs.read_next().unwrap(), Some(1));
        assert_eq!(rs.read_next().unwrap(), Some(2));
        assert_eq!(rs.read_next().unwrap(), None);
    }

    #[test]
    fn io_stream_reports_a_deserializer_error() {
        let reader: Box<dyn BufRead> = Box::new("not json\n".as_bytes());
        let mut rs: ReadStream<i32> = ReadStream::from_io_json(reader);
        assert!(rs.read_next().is_err());
    }

    #[test]
    fn custom_deserializer_parses_csv_like_lines() {
        let reader: Box<dyn BufRead> = Box::new("1,2\n3,4\n".as_bytes());
        let deserializer: Deserializer<(i32, i32)> = Rc::new(|line: &str| {
            let mut parts = line.split(',');
            let a = parts
                .next()
                .ok_or_else(|| Error::Codec("missing first field".into()))?
                .parse()
                .map_err(|_| Error::Codec("bad first field".into()))?;
            let b = parts
                .next()
                .ok_or_else(|| Error::Codec("missing second field".into()))?
                .parse()
                .map_err(|_| Error::Codec("bad second field".into()))?;
            Ok((a, b))
        });
        let mut rs = ReadStream::from_io(reader, deserializer);
        assert_eq!(rs.read_next().unwrap(), Some((1, 2)));
        assert_eq!(rs.read_next().unwrap(), Some((3, 4)));
        assert_eq!(rs.read_next().unwrap(), None);
    }

    #[test]
    fn seek_moves_the_cursor_without_reading() {
        let seq = EagerSequence::from_vec(vec![1, 2, 3, 4]);
        let mut rs = ReadStream::from_eager(seq);
        rs.seek(2).unwrap();
        assert_eq!(rs.read_next().unwrap(), Some(3));
        assert!(rs.seek(10).is_err());
    }

    #[test]
    fn seek_is_rejected_on_an_io_source() {
        let reader: Box<dyn BufRead> = Box::new("1\n2\n".as_bytes());
        let deserializer: Deserializer<i32> =
            Rc::new(|line: &str| line.parse().map_err(|_| Error::Codec("bad int".into())));
        let mut rs = ReadStream::from_io(reader, deserializer);
        assert!(rs.seek(1).is_err());
    }

    #[test]
    fn is_end_of_stream_reflects_position_and_cardinality() {
        let finite = LazySequence::from_vec(vec![1, 2]);
        let mut rs = ReadStream::from_lazy(finite);
        assert!(!rs.is_end_of_stream().unwrap());
        rs.read_next().unwrap();
        rs.read_next().unwrap();
        assert!(rs.is_end_of_stream().unwrap());

        let rule: crate::generator::Rule<i64> =
            Rc::new(|prefix: &[i64]| prefix.last().map(|n| n + 1).unwrap_or(0));
        let infinite = LazySequence::generated(rule, Vec::new());
        let mut rs = ReadStream::from_lazy(infinite);
        assert!(!rs.is_end_of_stream().unwrap());
    }

    #[test]
    fn close_makes_further_reads_fail_with_end_of_stream() {
        let seq = EagerSequence::from_vec(vec![1, 2]);
        let mut rs = ReadStream::from_eager(seq);
        rs.close();
        assert!(rs.is_end_of_stream().unwrap());
        assert!(matches!(rs.read_next(), Err(Error::EndOfStream)));
    }

    #[test]
    fn write_stream_appends_to_a_shared_eager_sequence() {
        let seq = Rc::new(RefCell::new(EagerSequence::from_vec(vec![1, 2])));
        let mut ws = WriteStream::from_eager(seq.clone());
        assert_eq!(ws.write_next(&3).unwrap(), 3);
        assert_eq!(ws.write_next(&4).unwrap(), 4);
        assert_eq!(seq.borrow().as_slice(), &[1, 2, 3, 4]);
    }

    #[test]
    fn write_next_returns_the_running_record_count() {
        let mut buf: Vec<u8> = Vec::new();
        let mut ws: WriteStream<i32> = WriteStream::to_io_json(Box::new(&mut buf));
        assert_eq!(ws.write_next(&1).unwrap(), 1);
        assert_eq!(ws.write_next(&2).unwrap(), 2);
    }
}
