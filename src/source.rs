//! Frame sources: the seam to the external recognizer.

use crate::error::SourceError;
use crate::schema::Frame;
use serde::Deserialize;
use std::collections::VecDeque;
use std::io::BufRead;

pub trait FrameSource {
    fn name(&self) -> &'static str;

    /// Next frame in capture order, or `None` once the stream is exhausted.
    fn next_frame(&mut self) -> Option<Result<Frame, SourceError>>;
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Record {
    Failed { error: String },
    Frame(Frame),
}

/// Reads one JSON record per line.
///
/// A record of the form `{"error": "..."}` stands for a frame the recognizer
/// failed on. Blank lines and `#` comments are skipped.
pub struct JsonLinesSource<R> {
    reader: R,
    line: usize,
    buf: String,
}

impl<R: BufRead> JsonLinesSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: 0,
            buf: String::new(),
        }
    }

    /// 1-based number of the last line read.
    pub fn line(&self) -> usize {
        self.line
    }
}

impl<R: BufRead> FrameSource for JsonLinesSource<R> {
    fn name(&self) -> &'static str {
        "jsonl"
    }

    fn next_frame(&mut self) -> Option<Result<Frame, SourceError>> {
        loop {
            self.buf.clear();
            match self.reader.read_line(&mut self.buf) {
                Ok(0) => return None,
                Ok(_) => self.line += 1,
                Err(e) => return Some(Err(e.into())),
            }

            let text = self.buf.trim();
            if text.is_empty() || text.starts_with('#') {
                continue;
            }

            return Some(match serde_json::from_str::<Record>(text) {
                Ok(Record::Frame(frame)) => Ok(frame),
                Ok(Record::Failed { error }) => Err(SourceError::detector(error)),
                Err(source) => Err(SourceError::Parse {
                    line: self.line,
                    source,
                }),
            });
        }
    }
}

/// Replays a prepared sequence of frames and failures.
#[derive(Default)]
pub struct ScriptedSource {
    frames: VecDeque<Result<Frame, SourceError>>,
}

impl ScriptedSource {
    pub fn new(frames: Vec<Result<Frame, SourceError>>) -> Self {
        Self {
            frames: frames.into(),
        }
    }

    pub fn from_frames(frames: impl IntoIterator<Item = Frame>) -> Self {
        Self {
            frames: frames.into_iter().map(Ok).collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl FrameSource for ScriptedSource {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn next_frame(&mut self) -> Option<Result<Frame, SourceError>> {
        self.frames.pop_front()
    }
}
