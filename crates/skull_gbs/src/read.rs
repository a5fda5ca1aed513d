//! Types for reading scene records
//!

use binrw::{BinRead, Endian};
use std::{io::Cursor, path::Path};
use tracing::{debug, instrument, warn};

use crate::{
    endian,
    error::{Error, Result},
    types::{
        Font, SceneHeader, Section, Texture, FONT_HEADER_SIZE, FOOTER, HEADER_SIZE, TEXTURE_SIZE,
    },
};

/// An uninterpreted section carried through unchanged
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSection {
    /// Which section the bytes belong to
    pub kind: Section,
    /// `None` when the section is absent from the record
    pub data: Option<Vec<u8>>,
}

impl RawSection {
    /// An absent section
    pub fn absent(kind: Section) -> Self {
        Self { kind, data: None }
    }

    /// Whether the section is present in the record
    pub fn is_present(&self) -> bool {
        self.data.is_some()
    }

    /// Number of bytes the section occupies when written
    pub fn len(&self) -> usize {
        self.data.as_ref().map_or(0, Vec::len)
    }

    /// Whether the section carries no bytes
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A parsed scene record
///
/// ```no_run
/// fn list_fonts(path: &std::path::Path) -> skull_gbs::error::Result<()> {
///     let record = skull_gbs::SceneRecord::open(path)?;
///
///     for font in &record.fonts {
///         println!("{}: {} characters", font.name, font.characters.len());
///     }
///
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SceneRecord {
    /// Header as read, kept up to date by merges
    pub header: SceneHeader,
    /// Byte order used for every multi-byte field
    pub endian: Endian,
    pub fonts: Vec<Font>,
    pub textures: Vec<Texture>,
    pub sounds: RawSection,
    pub views: RawSection,
    pub messages: RawSection,
    /// Unrecognised bytes following the last known section
    pub tail: Vec<u8>,
    /// Whether the record ends with [`FOOTER`]
    pub footer: bool,
    /// Whether the header's file size leaves out the footer
    pub size_excludes_footer: bool,
}

impl SceneRecord {
    /// Read and parse a scene record from disk
    #[instrument(err)]
    pub fn open(path: &Path) -> Result<SceneRecord> {
        let buffer = std::fs::read(path)?;
        Self::parse(&buffer)
    }

    /// Parse a scene record, detecting its byte order
    pub fn parse(buffer: &[u8]) -> Result<SceneRecord> {
        if buffer.len() < HEADER_SIZE {
            return Err(Error::Truncated {
                needed: HEADER_SIZE,
                actual: buffer.len(),
            });
        }

        let endian = endian::detect(buffer);
        let header =
            SceneHeader::read_options(&mut Cursor::new(&buffer[..HEADER_SIZE]), endian, ())?;

        let footer = Self::has_footer(buffer);
        let data_end = if footer { buffer.len() - 4 } else { buffer.len() };
        let size_excludes_footer = footer && header.file_size as usize == data_end;

        let data = &buffer[..data_end];
        let mut high_water = HEADER_SIZE as u64;

        // counts come from the file, so never reserve more than the data could hold
        let mut fonts =
            Vec::with_capacity(capacity_for(header.fonts_count, data.len(), FONT_HEADER_SIZE));
        if header.fonts_count > 0 {
            let mut cursor = Self::section_cursor(data, &header, Section::Fonts)?;
            for _ in 0..header.fonts_count {
                fonts.push(Font::read_options(&mut cursor, endian, ())?);
            }
            high_water = high_water.max(cursor.position());
        }

        let mut textures =
            Vec::with_capacity(capacity_for(header.textures_count, data.len(), TEXTURE_SIZE));
        if header.textures_count > 0 {
            let mut cursor = Self::section_cursor(data, &header, Section::Textures)?;
            for _ in 0..header.textures_count {
                textures.push(Texture::read_options(&mut cursor, endian, ())?);
            }
            high_water = high_water.max(cursor.position());
        }

        let mut raw = |section: Section| -> Result<RawSection> {
            if header.count(section) == 0 && header.offset(section) == 0 {
                return Ok(RawSection::absent(section));
            }

            let (start, end) = Self::raw_bounds(data, &header, section)?;
            high_water = high_water.max(end as u64);
            Ok(RawSection {
                kind: section,
                data: Some(data[start..end].to_vec()),
            })
        };
        let sounds = raw(Section::Sounds)?;
        let views = raw(Section::Views)?;
        let messages = raw(Section::Messages)?;

        let tail = data
            .get(high_water as usize..)
            .map(<[u8]>::to_vec)
            .unwrap_or_default();

        debug!(
            "parsed {} fonts, {} textures, {} tail bytes, footer: {}",
            fonts.len(),
            textures.len(),
            tail.len(),
            footer
        );

        Ok(SceneRecord {
            header,
            endian,
            fonts,
            textures,
            sounds,
            views,
            messages,
            tail,
            footer,
            size_excludes_footer,
        })
    }

    /// Whether the record is stored big endian, as used by the PS3 release
    pub fn is_big_endian(&self) -> bool {
        self.endian == Endian::Big
    }

    /// The same record, written with a different byte order
    pub fn with_byte_order(mut self, endian: Endian) -> SceneRecord {
        self.endian = endian;
        self
    }

    /// The opaque section for `kind`, if it is one
    pub fn raw_section(&self, kind: Section) -> Option<&RawSection> {
        match kind {
            Section::Sounds => Some(&self.sounds),
            Section::Views => Some(&self.views),
            Section::Messages => Some(&self.messages),
            Section::Textures | Section::Fonts => None,
        }
    }

    fn has_footer(buffer: &[u8]) -> bool {
        buffer.len() >= HEADER_SIZE + 4 && {
            let tail = &buffer[buffer.len() - 4..];
            tail == FOOTER.to_le_bytes() || tail == FOOTER.to_be_bytes()
        }
    }

    fn section_start(data: &[u8], header: &SceneHeader, section: Section) -> Result<usize> {
        let start = HEADER_SIZE as u64 + header.offset(section) as u64;
        if start > data.len() as u64 {
            return Err(Error::SectionOutOfBounds {
                section,
                offset: start,
                end: data.len() as u64,
            });
        }
        Ok(start as usize)
    }

    fn section_cursor<'a>(
        data: &'a [u8],
        header: &SceneHeader,
        section: Section,
    ) -> Result<Cursor<&'a [u8]>> {
        let start = Self::section_start(data, header, section)?;
        let mut cursor = Cursor::new(data);
        cursor.set_position(start as u64);
        Ok(cursor)
    }

    /// An opaque section runs up to the next larger offset of any section, or the end of the data.
    fn raw_bounds(data: &[u8], header: &SceneHeader, section: Section) -> Result<(usize, usize)> {
        let start = Self::section_start(data, header, section)?;
        let offset = header.offset(section);

        let end = Section::ALL
            .iter()
            .map(|s| header.offset(*s))
            .filter(|o| *o > offset)
            .min()
            .map_or(data.len(), |o| HEADER_SIZE + o as usize);

        if end > data.len() {
            warn!(
                "{} section claims to end at {:#x}, clamping to {:#x}",
                section,
                end,
                data.len()
            );
        }

        Ok((start, end.min(data.len())))
    }
}

fn capacity_for(count: u32, available: usize, item_size: u32) -> usize {
    (count as usize).min(available / item_size as usize)
}
