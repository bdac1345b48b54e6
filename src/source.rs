//! Streaming decoder for the dictionary source file.
//!
//! The source is one JSON array of records:
//!
//! ```json
//! [
//!   {"word": "Apple", "pos": "noun", "definitions": ["A fruit."]},
//!   {"word": "run", "pos": "verb", "definitions": ["To move fast.", "To operate."]}
//! ]
//! ```
//!
//! [`RecordReader`] yields one [`RawRecord`] at a time so the array is never held
//! in memory as a whole.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize, de};

use crate::error::{DictError, Result};

/// One record of the build source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawRecord {
    pub word: String,
    pub pos: String,
    pub definitions: Vec<String>,
}

// Records are JSON objects only; a missing or null `definitions` is empty.
impl<'de> Deserialize<'de> for RawRecord {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct RawRecordHelper {
            word: String,
            pos: String,
            #[serde(default, deserialize_with = "null_as_empty")]
            definitions: Vec<String>,
        }

        let fields = serde_json::Map::deserialize(deserializer)?;
        let helper = RawRecordHelper::deserialize(serde_json::Value::Object(fields))
            .map_err(<D::Error as de::Error>::custom)?;
        Ok(RawRecord {
            word: helper.word,
            pos: helper.pos,
            definitions: helper.definitions,
        })
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

impl RawRecord {
    /// Create a new record.
    pub fn new<W, P, I, D>(word: W, pos: P, definitions: I) -> Self
    where
        W: Into<String>,
        P: Into<String>,
        I: IntoIterator<Item = D>,
        D: Into<String>,
    {
        RawRecord {
            word: word.into(),
            pos: pos.into(),
            definitions: definitions.into_iter().map(Into::into).collect(),
        }
    }

    /// Return the record with its word lowercased and trimmed and its part of
    /// speech trimmed. The part of speech keeps its case.
    pub fn normalized(self) -> Self {
        RawRecord {
            word: normalize_word(&self.word),
            pos: self.pos.trim().to_string(),
            definitions: self.definitions,
        }
    }
}

/// Canonical form of a word: surrounding whitespace removed, lowercase.
pub fn normalize_word(word: &str) -> String {
    word.trim().to_lowercase()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Nothing consumed yet; expecting `[`.
    Start,
    /// After `[`; expecting a record or `]`.
    First,
    /// After a record; expecting `,` or `]`.
    Rest,
    Done,
}

/// Lazily decodes a JSON array of [`RawRecord`]s.
///
/// Any framing or decoding problem is reported once as
/// [`DictError::MalformedSource`] carrying the index of the record being read,
/// after which the iterator is exhausted.
pub struct RecordReader<R> {
    reader: R,
    state: State,
    index: usize,
}

impl RecordReader<BufReader<File>> {
    /// Open a source file for streaming.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Ok(RecordReader::new(BufReader::new(file)))
    }
}

impl<R: BufRead> RecordReader<R> {
    /// Wrap a buffered reader.
    pub fn new(reader: R) -> Self {
        RecordReader {
            reader,
            state: State::Start,
            index: 0,
        }
    }

    /// Peek the next byte that is not JSON whitespace, consuming the whitespace.
    fn peek_token(&mut self) -> io::Result<Option<u8>> {
        loop {
            let buf = self.reader.fill_buf()?;
            if buf.is_empty() {
                return Ok(None);
            }
            let skip = buf
                .iter()
                .take_while(|b| matches!(b, b' ' | b'\t' | b'\n' | b'\r'))
                .count();
            if skip < buf.len() {
                let byte = buf[skip];
                self.reader.consume(skip);
                return Ok(Some(byte));
            }
            let len = buf.len();
            self.reader.consume(len);
        }
    }

    fn fail(&mut self, reason: impl Into<String>) -> Option<Result<RawRecord>> {
        self.state = State::Done;
        Some(Err(DictError::malformed(self.index, reason)))
    }

    fn decode_record(&mut self) -> Option<Result<RawRecord>> {
        let mut de = serde_json::Deserializer::from_reader(&mut self.reader);
        match RawRecord::deserialize(&mut de) {
            Ok(record) => {
                self.index += 1;
                self.state = State::Rest;
                Some(Ok(record))
            }
            Err(e) => self.fail(e.to_string()),
        }
    }

    /// Consume the closing `]` and make sure only whitespace follows it.
    fn finish(&mut self) -> Option<Result<RawRecord>> {
        self.reader.consume(1);
        match self.peek_token() {
            Ok(None) => {
                self.state = State::Done;
                None
            }
            Ok(Some(byte)) => self.fail(format!(
                "unexpected trailing content {:?} after `]`",
                byte as char
            )),
            Err(e) => self.fail(e.to_string()),
        }
    }
}

impl<R: BufRead> Iterator for RecordReader<R> {
    type Item = Result<RawRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.state == State::Done {
            return None;
        }

        let token = match self.peek_token() {
            Ok(token) => token,
            Err(e) => return self.fail(e.to_string()),
        };

        match (self.state, token) {
            (State::Start, Some(b'[')) => {
                self.reader.consume(1);
                self.state = State::First;
                self.next()
            }
            (State::Start, Some(byte)) => self.fail(format!(
                "expected `[` at start of source, found {:?}",
                byte as char
            )),
            (State::Start, None) => self.fail("empty source, expected `[`"),
            (_, None) => self.fail("unexpected end of source, expected `]`"),
            (_, Some(b']')) => self.finish(),
            (State::First, Some(_)) => self.decode_record(),
            (State::Rest, Some(b',')) => {
                self.reader.consume(1);
                self.decode_record()
            }
            (State::Rest, Some(byte)) => {
                self.fail(format!("expected `,` or `]`, found {:?}", byte as char))
            }
            (State::Done, Some(_)) => None,
        }
    }
}
