use marshal_api::{CodecConfig, MarshalError, Tag};
use marshal_codec::cursor::ByteReader;

use crate::config::InspectArgs;
use crate::error::CliError;

const PREVIEW_CHARS: usize = 40;

pub fn run(args: &InspectArgs, codec: &CodecConfig) -> Result<(), CliError> {
    let bytes = super::read_buffer(&args.input, args.hex_input)?;
    let mut inspector = Inspector::new(&bytes, codec);
    let result = inspector.walk(0);

    // The dump up to the failure point is still printed.
    for line in &inspector.lines {
        println!("{line}");
    }
    result?;
    let trailing = inspector.reader.remaining();
    if trailing > 0 {
        println!("{:06x}  ({trailing} trailing bytes)", inspector.reader.position());
    }
    Ok(())
}

/// Walks a buffer tag by tag, producing one line per tag:
/// offset, indentation by nesting, tag byte, tag name and payload summary.
struct Inspector<'a> {
    reader: ByteReader<'a>,
    lines: Vec<String>,
    interned: u32,
    max_depth: usize,
}

impl<'a> Inspector<'a> {
    fn new(bytes: &'a [u8], codec: &CodecConfig) -> Self {
        Self {
            reader: ByteReader::new(bytes, codec.byte_order),
            lines: Vec::new(),
            interned: 0,
            max_depth: codec.max_depth,
        }
    }

    fn walk(&mut self, depth: usize) -> Result<(), MarshalError> {
        let offset = self.reader.position();
        let byte = self.reader.read_u8()?;
        self.entry(byte, offset, depth)
    }

    fn line(&mut self, offset: usize, depth: usize, tag: Tag, detail: impl std::fmt::Display) {
        self.lines.push(format!(
            "{offset:06x}  {:indent$}{}  {:<10} {detail}",
            "",
            tag.byte() as char,
            tag.name(),
            indent = depth * 2
        ));
    }

    fn entry(&mut self, byte: u8, offset: usize, depth: usize) -> Result<(), MarshalError> {
        let Some(tag) = Tag::from_byte(byte) else {
            return Err(MarshalError::UnknownTag { tag: byte, offset });
        };
        match tag {
            Tag::Null | Tag::True | Tag::False => self.line(offset, depth, tag, ""),
            Tag::Int32 => {
                let n = self.reader.read_i32()?;
                self.line(offset, depth, tag, n);
            }
            Tag::Int64 => {
                let n = self.reader.read_i64_halves()?;
                self.line(offset, depth, tag, n);
            }
            Tag::Float64 => {
                let n = self.reader.read_f64()?;
                self.line(offset, depth, tag, n);
            }
            Tag::ByteString => {
                let payload = self.reader.read_prefixed()?;
                self.line(offset, depth, tag, preview(payload));
            }
            Tag::Unicode => {
                let text = self.reader.read_str()?;
                self.line(offset, depth, tag, preview(text.as_bytes()));
            }
            Tag::Interned => {
                let payload = self.reader.read_str()?.as_bytes();
                let index = self.interned;
                self.interned += 1;
                self.line(offset, depth, tag, format!("#{index} {}", preview(payload)));
            }
            Tag::StringRef => {
                let index = self.reader.read_u32()?;
                if index >= self.interned {
                    return Err(MarshalError::BadReference { index, len: self.interned as usize });
                }
                self.line(offset, depth, tag, format!("#{index}"));
            }
            Tag::List | Tag::Tuple => {
                self.enter(depth)?;
                let count = self.reader.read_u32()?;
                self.line(offset, depth, tag, format!("count={count}"));
                for _ in 0..count {
                    self.walk(depth + 1)?;
                }
            }
            Tag::Dict => {
                self.enter(depth)?;
                self.line(offset, depth, tag, "");
                loop {
                    let offset = self.reader.position();
                    let byte = self.reader.read_u8()?;
                    if byte == Tag::DictEnd.byte() {
                        self.line(offset, depth, Tag::DictEnd, "");
                        break;
                    }
                    self.entry(byte, offset, depth + 1)?;
                    self.walk(depth + 1)?;
                }
            }
            // Only meaningful where a dict expects its next key.
            Tag::DictEnd => return Err(MarshalError::UnknownTag { tag: byte, offset }),
        }
        Ok(())
    }

    fn enter(&self, depth: usize) -> Result<(), MarshalError> {
        if depth >= self.max_depth {
            return Err(MarshalError::DepthLimitExceeded { limit: self.max_depth });
        }
        Ok(())
    }
}

/// `len=N "text…"`, lossy for non-UTF-8 payloads.
fn preview(payload: &[u8]) -> String {
    let text = String::from_utf8_lossy(payload);
    let mut shown: String = text.chars().take(PREVIEW_CHARS).collect();
    if text.chars().count() > PREVIEW_CHARS {
        shown.push('…');
    }
    format!("len={} {shown:?}", payload.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use marshal_api::{ByteOrder, Value};

    fn dump(bytes: &[u8]) -> (Vec<String>, Result<(), MarshalError>) {
        let codec = CodecConfig::default().with_byte_order(ByteOrder::little_endian());
        let mut inspector = Inspector::new(bytes, &codec);
        let result = inspector.walk(0);
        (inspector.lines, result)
    }

    #[test]
    fn envelope_dump_has_one_line_per_tag() {
        let codec = CodecConfig::default().with_byte_order(ByteOrder::little_endian());
        let bytes = marshal_codec::marshal_column_with(b"f", &[Value::Int32(1000000)], &codec).unwrap();
        let (lines, result) = dump(&bytes);
        assert!(result.is_ok());
        assert_eq!(lines.len(), 5);
        assert!(lines[0].starts_with("000000  {  dict"));
        assert!(lines[1].contains("bytes") && lines[1].contains("len=1 \"f\""));
        assert!(lines[2].contains("count=1"));
        assert!(lines[3].ends_with("1000000"));
        assert!(lines[4].starts_with("000011  0  dict-end"));
    }

    #[test]
    fn partial_dump_survives_errors() {
        let (lines, result) = dump(b"[\x02\x00\x00\x00Nx");
        assert_eq!(lines.len(), 2);
        assert_eq!(result, Err(MarshalError::UnknownTag { tag: b'x', offset: 6 }));
    }

    #[test]
    fn invalid_utf8_text_stops_the_dump() {
        let (lines, result) = dump(b"[\x02\x00\x00\x00Nu\x02\x00\x00\x00\xc3\x28");
        assert_eq!(lines.len(), 2);
        assert!(matches!(result, Err(MarshalError::InvalidEncoding { offset: 11, .. })));

        let (lines, result) = dump(b"t\x01\x00\x00\x00\xff");
        assert!(lines.is_empty());
        assert!(matches!(result, Err(MarshalError::InvalidEncoding { offset: 5, .. })));
    }

    #[test]
    fn byte_strings_need_not_be_utf8() {
        let (lines, result) = dump(b"s\x02\x00\x00\x00\xc3\x28");
        assert!(result.is_ok());
        assert!(lines[0].contains("len=2"));
    }

    #[test]
    fn stray_terminator_is_rejected() {
        let (lines, result) = dump(b"0");
        assert!(lines.is_empty());
        assert_eq!(result, Err(MarshalError::UnknownTag { tag: b'0', offset: 0 }));
    }

    #[test]
    fn int64_shows_full_value() {
        let (lines, result) = dump(b"I\x01\x00\x00\x00\x00\x00\x20\x00");
        assert!(result.is_ok());
        assert!(lines[0].ends_with("9007199254740993"));
    }

    #[test]
    fn interned_strings_are_numbered() {
        let (lines, result) = dump(b"[\x02\x00\x00\x00t\x01\x00\x00\x00aR\x00\x00\x00\x00");
        assert!(result.is_ok());
        assert!(lines[1].contains("#0 len=1 \"a\""));
        assert!(lines[2].ends_with("#0"));
    }
}
