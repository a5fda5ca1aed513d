//! Serializing scene records
//!

use binrw::BinWrite;
use std::{
    io::{Cursor, Seek, SeekFrom, Write},
    path::Path,
};
use tracing::{debug, instrument};

use crate::{
    error::{Error, Result},
    read::SceneRecord,
    types::{Section, FOOTER, HEADER_SIZE},
};

impl SceneRecord {
    /// Serialize the record into a new buffer
    ///
    /// Sections are written in [`Section::ALL`] order followed by the tail and the footer. Counts
    /// for fonts and textures, every offset and the file size are recomputed from what is written;
    /// the values held in [`SceneRecord::header`] are ignored for those fields.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut cursor = Cursor::new(vec![0u8; HEADER_SIZE]);
        cursor.seek(SeekFrom::End(0))?;

        let mut header = self.header;
        header.fonts_count = to_u32(self.fonts.len(), "font count")?;
        header.textures_count = to_u32(self.textures.len(), "texture count")?;

        for section in Section::ALL {
            let start = relative_offset(cursor.position())?;
            let present = match section {
                Section::Textures => {
                    for texture in &self.textures {
                        texture.write_options(&mut cursor, self.endian, ())?;
                    }
                    !self.textures.is_empty()
                }
                Section::Fonts => {
                    for font in &self.fonts {
                        font.write_options(&mut cursor, self.endian, ())?;
                    }
                    !self.fonts.is_empty()
                }
                Section::Sounds | Section::Views | Section::Messages => {
                    match self.raw_section(section).and_then(|s| s.data.as_ref()) {
                        Some(data) => {
                            cursor.write_all(data)?;
                            true
                        }
                        None => false,
                    }
                }
            };
            *header.offset_mut(section) = if present { start } else { 0 };
        }

        cursor.write_all(&self.tail)?;

        let data_len = cursor.position();
        if self.footer {
            FOOTER.write_options(&mut cursor, self.endian, ())?;
        }

        let file_size = if self.footer && !self.size_excludes_footer {
            cursor.position()
        } else {
            data_len
        };
        header.file_size = u32::try_from(file_size).map_err(|_| Error::Overflow("file size"))?;

        cursor.rewind()?;
        header.write_options(&mut cursor, self.endian, ())?;

        debug!("serialized {} bytes as {:?} endian", file_size, self.endian);

        Ok(cursor.into_inner())
    }

    /// Serialize the record into a writer
    pub fn write<W: Write>(&self, mut writer: W) -> Result<()> {
        writer.write_all(&self.to_bytes()?)?;
        Ok(())
    }

    /// Serialize the record to disk, replacing any existing file
    #[instrument(skip(self), err)]
    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_bytes()?)?;
        Ok(())
    }
}

fn to_u32(value: usize, what: &'static str) -> Result<u32> {
    u32::try_from(value).map_err(|_| Error::Overflow(what))
}

fn relative_offset(position: u64) -> Result<u32> {
    u32::try_from(position - HEADER_SIZE as u64).map_err(|_| Error::Overflow("section offset"))
}

#[cfg(test)]
mod test {
    use binrw::Endian;
    use pretty_assertions::{assert_eq, assert_str_eq};

    use crate::error::Result;
    use crate::read::{RawSection, SceneRecord};
    use crate::types::{SceneHeader, Section, Texture, HEADER_SIZE};

    fn empty_record(endian: Endian) -> SceneRecord {
        SceneRecord {
            header: SceneHeader {
                magic: *b"CSGG",
                version: *b"1.00\0\0\0\0",
                ..Default::default()
            },
            endian,
            fonts: Vec::new(),
            textures: Vec::new(),
            sounds: RawSection::absent(Section::Sounds),
            views: RawSection::absent(Section::Views),
            messages: RawSection::absent(Section::Messages),
            tail: Vec::new(),
            footer: false,
            size_excludes_footer: false,
        }
    }

    #[test]
    fn write_empty_record() -> Result<()> {
        let bytes = empty_record(Endian::Little).to_bytes()?;

        assert_eq!(bytes.len(), HEADER_SIZE);
        assert_str_eq!(format!("{:02X?}", &bytes[4..8]), "[3C, 00, 00, 00]");

        Ok(())
    }

    #[test]
    fn write_recomputes_offsets() -> Result<()> {
        let mut record = empty_record(Endian::Big);
        record.header.textures_offset = 0x999;
        record.textures.push(Texture {
            id: 1,
            kind: 0,
            path: "a.dds".into(),
        });
        record.messages.data = Some(vec![0xAA; 6]);

        let bytes = record.to_bytes()?;
        let reparsed = SceneRecord::parse(&bytes)?;

        assert_eq!(reparsed.endian, Endian::Big);
        assert_eq!(reparsed.header.textures_count, 1);
        assert_eq!(reparsed.header.textures_offset, 0);
        assert_eq!(reparsed.header.messages_offset, 0x11C);
        assert_eq!(reparsed.header.sounds_offset, 0);
        assert_eq!(reparsed.header.file_size as usize, bytes.len());
        assert_eq!(reparsed.messages.data, Some(vec![0xAA; 6]));

        Ok(())
    }

    #[test]
    fn write_footer_keeps_size_convention() -> Result<()> {
        let mut record = empty_record(Endian::Little);
        record.footer = true;
        record.size_excludes_footer = true;

        let bytes = record.to_bytes()?;
        assert_eq!(bytes.len(), HEADER_SIZE + 4);
        assert_str_eq!(format!("{:02X?}", &bytes[4..8]), "[3C, 00, 00, 00]");
        assert_str_eq!(format!("{:02X?}", &bytes[HEADER_SIZE..]), "[21, 43, 34, 12]");

        record.size_excludes_footer = false;
        let bytes = record.to_bytes()?;
        assert_str_eq!(format!("{:02X?}", &bytes[4..8]), "[40, 00, 00, 00]");

        Ok(())
    }
}
