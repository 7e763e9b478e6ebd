//! `.ztgfx` container reading and parsing

use super::{Container, FATZ_MAGIC, FATZ_RESERVED_SIZE, Frame, MagicVariant, Row, Run};
use crate::error::{Error, FormatError, Result};
use crate::events::{DecodeEvent, EventSink, TracingSink};
use byteorder::{LittleEndian, ReadBytesExt};
use std::fs::File;
use std::io::{self, BufReader, Cursor, Read, Seek, SeekFrom};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

/// Upper bound on up-front allocation driven by header counts
const MAX_PREALLOC: usize = 1024;

/// Read a .ztgfx file from disk
///
/// # Errors
///
/// Returns [`Error::Io`] if the file cannot be opened.
/// Returns [`Error::Format`] if the container is truncated or declares a negative length.
///
/// [`Error::Io`]: crate::Error::Io
/// [`Error::Format`]: crate::Error::Format
pub fn read_ztgfx<P: AsRef<Path>>(path: P) -> Result<Container> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    read_ztgfx_from(&mut reader, &mut TracingSink)
}

/// Parse .ztgfx data from bytes
///
/// # Errors
///
/// Returns [`Error::Format`] if the data is truncated or declares a negative length.
///
/// [`Error::Format`]: crate::Error::Format
pub fn parse_ztgfx_bytes(data: &[u8]) -> Result<Container> {
    read_ztgfx_from(&mut Cursor::new(data), &mut TracingSink)
}

/// Decode a container from a seekable stream positioned at its first byte,
/// reporting milestones to `sink`.
///
/// # Errors
///
/// Returns [`Error::Format`] if the stream is truncated or declares a negative length.
///
/// [`Error::Format`]: crate::Error::Format
pub fn read_ztgfx_from<R: Read + Seek>(reader: &mut R, sink: &mut dyn EventSink) -> Result<Container> {
    decode_container(reader, sink, None)
}

/// Container decode with an optional cancel flag, checked before each frame.
pub(crate) fn decode_container<R: Read + Seek>(
    reader: &mut R,
    sink: &mut dyn EventSink,
    cancel: Option<&AtomicBool>,
) -> Result<Container> {
    let magic_variant = read_variant(reader)?;
    sink.record(DecodeEvent::VariantDetected { variant: magic_variant });

    let animation_speed = read_i32(reader, "animation_speed")?;

    let name_length = read_i32(reader, "name_length")?;
    let palette_file_name = read_name(reader, name_length)?;

    let declared_frames = read_i32(reader, "frame_count")?;
    let frame_count = usize::try_from(declared_frames).map_err(|_| FormatError::InvalidLength {
        field: "frame_count",
        value: declared_frames,
    })?;

    sink.record(DecodeEvent::HeaderRead {
        animation_speed,
        palette_file_name: palette_file_name.clone(),
        frame_count: declared_frames,
    });

    let mut frames = Vec::with_capacity(frame_count.min(MAX_PREALLOC));
    for index in 0..frame_count {
        if cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
            return Err(Error::Cancelled);
        }
        frames.push(read_frame(reader, index, sink)?);
    }

    Ok(Container {
        magic_variant,
        animation_speed,
        palette_file_name,
        frame_count,
        frames,
    })
}

/// Detect the header variant, leaving the cursor on the `animation_speed` field
fn read_variant<R: Read + Seek>(reader: &mut R) -> std::result::Result<MagicVariant, FormatError> {
    let start = reader
        .stream_position()
        .map_err(|e| FormatError::from_read("magic", e))?;

    let mut magic = [0u8; 4];
    match reader.read_exact(&mut magic) {
        Ok(()) if &magic == FATZ_MAGIC => {
            let mut reserved = [0u8; FATZ_RESERVED_SIZE];
            reader
                .read_exact(&mut reserved)
                .map_err(|e| FormatError::from_read("reserved header bytes", e))?;
            return Ok(MagicVariant::ClassicHeader);
        }
        // A stream too short for the magic is decoded as a bare header and
        // fails on the speed field instead.
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {}
        Err(e) => return Err(FormatError::from_read("magic", e)),
    }

    reader
        .seek(SeekFrom::Start(start))
        .map_err(|e| FormatError::from_read("magic", e))?;
    Ok(MagicVariant::BareHeader)
}

/// Read a length-prefixed, NUL-padded name
fn read_name<R: Read>(reader: &mut R, name_length: i32) -> std::result::Result<String, FormatError> {
    let len = u64::try_from(name_length).map_err(|_| FormatError::InvalidLength {
        field: "name_length",
        value: name_length,
    })?;

    let mut bytes = Vec::new();
    reader
        .by_ref()
        .take(len)
        .read_to_end(&mut bytes)
        .map_err(|e| FormatError::from_read("palette_file_name", e))?;
    if (bytes.len() as u64) < len {
        return Err(FormatError::Truncated {
            field: "palette_file_name",
            source: io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("expected {len} bytes, found {}", bytes.len()),
            ),
        });
    }

    Ok(String::from_utf8_lossy(&bytes).trim_end_matches('\0').to_string())
}

fn read_frame<R: Read + Seek>(
    reader: &mut R,
    index: usize,
    sink: &mut dyn EventSink,
) -> std::result::Result<Frame, FormatError> {
    let byte_size = read_i32(reader, "frame_byte_size")?;
    let start_offset = reader
        .stream_position()
        .map_err(|e| FormatError::from_read("frame_byte_size", e))?;

    let height = read_i16(reader, "height")?;
    let width = read_i16(reader, "width")?;
    let row_offset_v = read_i16(reader, "row_offset_v")?;
    let row_offset_h = read_i16(reader, "row_offset_h")?;
    read_i16(reader, "reserved frame field")?;

    if height < 0 {
        return Err(FormatError::InvalidLength {
            field: "height",
            value: i32::from(height),
        });
    }
    if width < 0 {
        return Err(FormatError::InvalidLength {
            field: "width",
            value: i32::from(width),
        });
    }

    let rows = (0..height)
        .map(|_| read_row(reader))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let frame = Frame {
        byte_size,
        start_offset,
        height,
        width,
        row_offset_v,
        row_offset_h,
        rows,
    };

    sink.record(DecodeEvent::FrameDecoded {
        index,
        byte_size,
        start_offset,
        width,
        height,
    });

    // Forward-only resync to the declared frame end
    let current = reader
        .stream_position()
        .map_err(|e| FormatError::from_read("frame rows", e))?;
    let declared_end = frame.declared_end();
    if current < declared_end {
        reader
            .seek(SeekFrom::Start(declared_end))
            .map_err(|e| FormatError::from_read("frame padding", e))?;
        sink.record(DecodeEvent::FrameResynced {
            index,
            from: current,
            to: declared_end,
        });
    } else if current > declared_end {
        sink.record(DecodeEvent::FrameOverrun {
            index,
            declared_end,
            actual_end: current,
        });
    }

    Ok(frame)
}

fn read_row<R: Read>(reader: &mut R) -> std::result::Result<Row, FormatError> {
    let run_count = read_u8(reader, "run_count")?;

    let mut runs = Vec::with_capacity(usize::from(run_count));
    for _ in 0..run_count {
        let transparent_count = read_u8(reader, "transparent_count")?;
        let color_count = read_u8(reader, "color_count")?;

        let mut indices = vec![0u8; usize::from(color_count)];
        reader
            .read_exact(&mut indices)
            .map_err(|e| FormatError::from_read("palette_indices", e))?;

        runs.push(Run {
            transparent_count,
            indices,
        });
    }

    Ok(Row { runs })
}

fn read_i32<R: Read>(reader: &mut R, field: &'static str) -> std::result::Result<i32, FormatError> {
    reader
        .read_i32::<LittleEndian>()
        .map_err(|e| FormatError::from_read(field, e))
}

fn read_i16<R: Read>(reader: &mut R, field: &'static str) -> std::result::Result<i16, FormatError> {
    reader
        .read_i16::<LittleEndian>()
        .map_err(|e| FormatError::from_read(field, e))
}

fn read_u8<R: Read>(reader: &mut R, field: &'static str) -> std::result::Result<u8, FormatError> {
    reader.read_u8().map_err(|e| FormatError::from_read(field, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::NullSink;

    /// Bare header with one palette name and no frames yet
    fn header(speed: i32, name: &[u8], frames: i32) -> Vec<u8> {
        let mut data = Vec::new();
        data.extend_from_slice(&speed.to_le_bytes());
        data.extend_from_slice(&(name.len() as i32).to_le_bytes());
        data.extend_from_slice(name);
        data.extend_from_slice(&frames.to_le_bytes());
        data
    }

    /// Frame record: size prefix, geometry, reserved field, then row bytes
    fn frame(byte_size: i32, height: i16, width: i16, rows: &[u8]) -> Vec<u8> {
        let mut data = Vec::new();
        data.extend_from_slice(&byte_size.to_le_bytes());
        for v in [height, width, 0, 0, 0] {
            data.extend_from_slice(&v.to_le_bytes());
        }
        data.extend_from_slice(rows);
        data
    }

    fn decode(data: &[u8]) -> (Result<Container>, Vec<DecodeEvent>) {
        let mut events = Vec::new();
        let result = read_ztgfx_from(&mut Cursor::new(data), &mut events);
        (result, events)
    }

    #[test]
    fn test_bare_header() {
        let data = header(250, b"fence.pal\0\0\0", 0);
        let container = parse_ztgfx_bytes(&data).unwrap();
        assert_eq!(container.magic_variant, MagicVariant::BareHeader);
        assert_eq!(container.animation_speed, 250);
        assert_eq!(container.palette_file_name, "fence.pal");
        assert_eq!(container.frame_count, 0);
        assert!(container.frames.is_empty());
    }

    #[test]
    fn test_classic_header_skips_nine_bytes() {
        for reserved in [[0u8; 5], [0xFF, 1, 2, 3, 4]] {
            let mut data = FATZ_MAGIC.to_vec();
            data.extend_from_slice(&reserved);
            data.extend(header(-7, b"x.pal", 0));

            let container = parse_ztgfx_bytes(&data).unwrap();
            assert_eq!(container.magic_variant, MagicVariant::ClassicHeader);
            assert_eq!(container.animation_speed, -7);
            assert_eq!(container.palette_file_name, "x.pal");
        }
    }

    #[test]
    fn test_bare_header_rereads_peeked_bytes() {
        // The speed bytes double as the (non-matching) magic
        let data = header(0x5A54_4147, b"", 0); // "GATZ"
        assert_ne!(&data[..4], FATZ_MAGIC);
        let mut cursor = Cursor::new(&data[..]);
        let container = read_ztgfx_from(&mut cursor, &mut NullSink).unwrap();
        assert_eq!(container.animation_speed, 0x5A54_4147);
        assert_eq!(cursor.position(), data.len() as u64);
    }

    #[test]
    fn test_truncated_header() {
        let (result, _) = decode(&[1, 2, 3]);
        assert!(matches!(
            result,
            Err(Error::Format(FormatError::Truncated { field: "animation_speed", .. }))
        ));
    }

    #[test]
    fn test_truncated_name() {
        let mut data = 10i32.to_le_bytes().to_vec();
        data.extend_from_slice(&8i32.to_le_bytes());
        data.extend_from_slice(b"abc");
        let (result, _) = decode(&data);
        assert!(matches!(
            result,
            Err(Error::Format(FormatError::Truncated { field: "palette_file_name", .. }))
        ));
    }

    #[test]
    fn test_negative_lengths() {
        let mut data = 10i32.to_le_bytes().to_vec();
        data.extend_from_slice(&(-1i32).to_le_bytes());
        let (result, _) = decode(&data);
        assert!(matches!(
            result,
            Err(Error::Format(FormatError::InvalidLength { field: "name_length", value: -1 }))
        ));

        let (result, _) = decode(&header(1, b"", -3));
        assert!(matches!(
            result,
            Err(Error::Format(FormatError::InvalidLength { field: "frame_count", value: -3 }))
        ));
    }

    #[test]
    fn test_frame_rows_and_runs() {
        // Two rows: [2 transparent, colors 5 6], [no runs]
        let rows = [1, 2, 2, 5, 6, 0];
        let mut data = header(100, b"a.pal", 1);
        data.extend(frame(10 + rows.len() as i32, 2, 4, &rows));

        let container = parse_ztgfx_bytes(&data).unwrap();
        assert_eq!(container.frames.len(), container.frame_count);
        let frame = &container.frames[0];
        assert_eq!((frame.width, frame.height), (4, 2));
        assert_eq!(frame.start_offset, (data.len() - rows.len() - 10) as u64);
        assert_eq!(frame.rows.len(), 2);
        assert_eq!(frame.rows[0].runs, vec![Run { transparent_count: 2, indices: vec![5, 6] }]);
        assert!(frame.rows[1].runs.is_empty());
    }

    #[test]
    fn test_resync_to_declared_size() {
        // First frame declares 4 padding bytes beyond its single empty row
        let mut data = header(1, b"", 2);
        let mut first = frame(10 + 1 + 4, 1, 1, &[0]);
        first.extend_from_slice(&[0xEE; 4]);
        data.extend(first);
        data.extend(frame(10 + 1, 1, 3, &[0]));

        let (result, events) = decode(&data);
        let container = result.unwrap();
        assert_eq!(container.frames.len(), 2);
        assert_eq!(container.frames[1].width, 3);
        assert_eq!(
            container.frames[1].start_offset,
            container.frames[0].declared_end() + 4
        );
        assert!(events.iter().any(|e| matches!(
            e,
            DecodeEvent::FrameResynced { index: 0, .. }
        )));
    }

    #[test]
    fn test_overrun_is_reported_not_rewound() {
        // Declared size covers only the geometry, not the row byte
        let mut data = header(1, b"", 2);
        data.extend(frame(10, 1, 2, &[0]));
        data.extend(frame(11, 1, 5, &[0]));

        let (result, events) = decode(&data);
        let container = result.unwrap();
        assert_eq!(container.frames[1].width, 5);
        assert!(events.contains(&DecodeEvent::FrameOverrun {
            index: 0,
            declared_end: container.frames[0].start_offset + 10,
            actual_end: container.frames[0].start_offset + 11,
        }));
    }

    #[test]
    fn test_truncated_row_aborts_decode() {
        let mut data = header(1, b"", 1);
        data.extend(frame(20, 1, 4, &[1, 0, 3, 9]));
        let (result, _) = decode(&data);
        assert!(matches!(
            result,
            Err(Error::Format(FormatError::Truncated { field: "palette_indices", .. }))
        ));
    }

    #[test]
    fn test_negative_dimensions_rejected() {
        let mut data = header(1, b"", 1);
        data.extend(frame(10, -1, 4, &[]));
        let (result, _) = decode(&data);
        assert!(matches!(
            result,
            Err(Error::Format(FormatError::InvalidLength { field: "height", value: -1 }))
        ));
    }

    #[test]
    fn test_cancel_before_frames() {
        let mut data = header(1, b"", 1);
        data.extend(frame(11, 1, 1, &[0]));
        let cancel = AtomicBool::new(true);
        let result = decode_container(&mut Cursor::new(&data[..]), &mut NullSink, Some(&cancel));
        assert!(matches!(result, Err(Error::Cancelled)));
    }
}
