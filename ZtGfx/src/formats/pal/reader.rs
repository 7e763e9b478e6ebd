//! `.pal` file reading and parsing

use super::{ENTRY_SIZE, Palette, Rgba};
use crate::error::{FormatError, PaletteError, Result};
use crate::events::{DecodeEvent, EventSink, TracingSink};
use byteorder::{LittleEndian, ReadBytesExt};
use std::fs::File;
use std::io::{BufReader, Cursor, Read};
use std::path::Path;

/// Upper bound on up-front allocation driven by the declared color count
const MAX_PREALLOC: usize = 256;

/// Read a .pal file from disk
///
/// # Errors
///
/// Returns [`PaletteError::NotFound`] if the file cannot be opened.
/// Returns [`Error::Format`] if the palette is truncated or declares a negative count.
///
/// [`PaletteError::NotFound`]: crate::error::PaletteError::NotFound
/// [`Error::Format`]: crate::Error::Format
pub fn read_pal<P: AsRef<Path>>(path: P) -> Result<Palette> {
    read_pal_with_events(path, &mut TracingSink)
}

/// Read a .pal file from disk, reporting decode events to `sink`
///
/// # Errors
///
/// Same as [`read_pal`].
pub fn read_pal_with_events<P: AsRef<Path>>(path: P, sink: &mut dyn EventSink) -> Result<Palette> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| PaletteError::NotFound {
        path: path.to_path_buf(),
        source,
    })?;
    read_pal_from(&mut BufReader::new(file), sink)
}

/// Parse .pal data from bytes
///
/// # Errors
///
/// Returns [`Error::Format`] if the data is truncated or declares a negative count.
///
/// [`Error::Format`]: crate::Error::Format
pub fn parse_pal_bytes(data: &[u8]) -> Result<Palette> {
    read_pal_from(&mut Cursor::new(data), &mut TracingSink)
}

/// Decode a palette from a stream, reporting the color count to `sink`
///
/// # Errors
///
/// Returns [`Error::Format`] if the stream is truncated or declares a negative count.
///
/// [`Error::Format`]: crate::Error::Format
pub fn read_pal_from<R: Read>(reader: &mut R, sink: &mut dyn EventSink) -> Result<Palette> {
    let declared = reader
        .read_i32::<LittleEndian>()
        .map_err(|e| FormatError::from_read("color_count", e))?;
    let color_count = usize::try_from(declared).map_err(|_| FormatError::InvalidLength {
        field: "color_count",
        value: declared,
    })?;

    let mut colors = Vec::with_capacity(color_count.min(MAX_PREALLOC));
    let mut entry = [0u8; ENTRY_SIZE];
    for _ in 0..color_count {
        reader
            .read_exact(&mut entry)
            .map_err(|e| FormatError::from_read("palette entry", e))?;
        colors.push(Rgba::from_bgra(entry));
    }

    sink.record(DecodeEvent::PaletteLoaded { color_count });

    Ok(Palette { colors })
}
