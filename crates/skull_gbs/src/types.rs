//! Base types for the structure of a GBS scene record.

use binrw::{binrw, BinRead, BinResult, BinWrite, Endian};
use derive_more::derive::{Deref, Display};
use std::{
    fmt,
    io::{Read, Seek, Write},
};

#[cfg(feature = "serde")]
use serde::Serialize;

/// Size of the fixed header at the start of every scene record
pub const HEADER_SIZE: usize = 0x3C;

/// Marker some scene records carry in their last four bytes
pub const FOOTER: u32 = 0x1234_4321;

/// Size of the fixed part of a font entry, before its characters
pub const FONT_HEADER_SIZE: u32 = 0x64;

/// Size of a single character entry
pub const CHARACTER_SIZE: u32 = 0x28;

/// Size of a single texture entry
pub const TEXTURE_SIZE: u32 = 0x11C;

/// A zero padded string stored in exactly `N` bytes.
///
/// Shorter values are padded with NUL bytes, longer ones are truncated.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Deref)]
pub struct FixedStr<const N: usize>([u8; N]);

impl<const N: usize> FixedStr<N> {
    /// Build a string slot from arbitrary bytes
    pub fn new(value: impl AsRef<[u8]>) -> Self {
        let value = value.as_ref();
        let mut bytes = [0u8; N];
        let len = value.len().min(N);
        bytes[..len].copy_from_slice(&value[..len]);
        Self(bytes)
    }

    /// The bytes up to the first NUL
    pub fn trimmed(&self) -> &[u8] {
        let end = self.0.iter().position(|b| *b == 0).unwrap_or(N);
        &self.0[..end]
    }

    /// Lossy UTF-8 view of the value without its padding
    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(self.trimmed()).into_owned()
    }
}

impl<const N: usize> Default for FixedStr<N> {
    fn default() -> Self {
        Self([0u8; N])
    }
}

impl<const N: usize> From<&str> for FixedStr<N> {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl<const N: usize> fmt::Debug for FixedStr<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.to_string_lossy())
    }
}

impl<const N: usize> fmt::Display for FixedStr<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_lossy())
    }
}

impl<const N: usize> BinRead for FixedStr<N> {
    type Args<'a> = ();

    fn read_options<R: Read + Seek>(
        reader: &mut R,
        _endian: Endian,
        _args: Self::Args<'_>,
    ) -> BinResult<Self> {
        let mut bytes = [0u8; N];
        reader.read_exact(&mut bytes)?;
        Ok(Self(bytes))
    }
}

impl<const N: usize> BinWrite for FixedStr<N> {
    type Args<'a> = ();

    fn write_options<W: Write + Seek>(
        &self,
        writer: &mut W,
        _endian: Endian,
        _args: Self::Args<'_>,
    ) -> BinResult<()> {
        writer.write_all(&self.0)?;
        Ok(())
    }
}

/// The sections of a scene record, in the order they are written.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Section {
    /// Texture references
    #[display("textures")]
    Textures,
    /// Font atlases
    #[display("fonts")]
    Fonts,
    /// Opaque sound data
    #[display("sounds")]
    Sounds,
    /// Opaque view data
    #[display("views")]
    Views,
    /// Opaque message data
    #[display("messages")]
    Messages,
}

impl Section {
    /// Every section in serialization order
    pub const ALL: [Section; 5] = [
        Section::Textures,
        Section::Fonts,
        Section::Sounds,
        Section::Views,
        Section::Messages,
    ];

    /// Position of the section in serialization order
    pub fn position(self) -> usize {
        self as usize
    }
}

/// Scene record header
///
/// All offsets are relative to the end of this header. The byte order is decided per file.
#[derive(BinRead, BinWrite, Debug, Default, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct SceneHeader {
    /// Four byte tag, usually "CSGG"
    #[cfg_attr(feature = "serde", serde(serialize_with = "crate::serde::lossy_bytes"))]
    pub magic: [u8; 4],
    /// Size of the whole file, with or without the footer
    pub file_size: u32,
    /// Data version string
    #[cfg_attr(feature = "serde", serde(serialize_with = "crate::serde::lossy_bytes"))]
    pub version: [u8; 8],
    pub scene_id: u32,
    pub fonts_count: u32,
    pub textures_count: u32,
    pub sounds_count: u32,
    pub views_count: u32,
    pub messages_count: u32,
    pub fonts_offset: u32,
    pub textures_offset: u32,
    pub sounds_offset: u32,
    pub views_offset: u32,
    pub messages_offset: u32,
}

impl SceneHeader {
    /// Element count stored for a section
    pub fn count(&self, section: Section) -> u32 {
        match section {
            Section::Textures => self.textures_count,
            Section::Fonts => self.fonts_count,
            Section::Sounds => self.sounds_count,
            Section::Views => self.views_count,
            Section::Messages => self.messages_count,
        }
    }

    /// Offset stored for a section
    pub fn offset(&self, section: Section) -> u32 {
        match section {
            Section::Textures => self.textures_offset,
            Section::Fonts => self.fonts_offset,
            Section::Sounds => self.sounds_offset,
            Section::Views => self.views_offset,
            Section::Messages => self.messages_offset,
        }
    }

    pub(crate) fn offset_mut(&mut self, section: Section) -> &mut u32 {
        match section {
            Section::Textures => &mut self.textures_offset,
            Section::Fonts => &mut self.fonts_offset,
            Section::Sounds => &mut self.sounds_offset,
            Section::Views => &mut self.views_offset,
            Section::Messages => &mut self.messages_offset,
        }
    }
}

/// A single glyph inside a font atlas
#[derive(BinRead, BinWrite, Debug, Default, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Character {
    /// Four byte character code
    #[cfg_attr(feature = "serde", serde(serialize_with = "crate::serde::lossy_bytes"))]
    pub code: [u8; 4],
    pub is_image_glyph: u32,
    pub x_offset: u32,
    pub y_offset: u32,
    pub width: u32,
    pub height: u32,
    pub top: u32,
    pub advance: u32,
    pub left_bearing: u32,
    /// Page of the atlas the glyph lives on
    pub atlas_index: u32,
}

/// Font entry
///
/// The character count is not stored here; it is derived from `characters` on write.
#[binrw]
#[derive(Debug, Default, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Font {
    /// Four byte tag, usually "GFNT"
    #[cfg_attr(feature = "serde", serde(serialize_with = "crate::serde::lossy_bytes"))]
    pub label: [u8; 4],
    /// Byte length of the entry as recorded in the file
    pub length: u32,
    pub id: u32,
    pub name: FixedStr<64>,
    pub size: u32,
    pub atlas_width: u32,
    pub atlas_height: u32,
    pub max_top: u32,
    pub atlas_count: u32,

    #[br(temp)]
    #[bw(try_calc = u32::try_from(characters.len()))]
    characters_count: u32,

    #[br(count = characters_count)]
    pub characters: Vec<Character>,
}

impl Font {
    /// Number of bytes this font occupies when written
    pub fn byte_len(&self) -> u32 {
        FONT_HEADER_SIZE + CHARACTER_SIZE * self.characters.len() as u32
    }

    /// Whether a character with this code is already present
    pub fn has_character(&self, code: &[u8; 4]) -> bool {
        self.characters.iter().any(|c| &c.code == code)
    }
}

/// Texture entry
///
/// Only the id, type and path are meaningful; the rest of the 0x11C byte record is derived on write.
#[binrw]
#[derive(Debug, Default, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Texture {
    pub id: u16,
    pub kind: u16,
    pub path: FixedStr<260>,

    #[br(temp)]
    #[bw(calc = *id)]
    _repeated_id: u16,

    #[br(temp)]
    #[bw(calc = *kind)]
    _repeated_kind: u16,

    #[br(temp)]
    #[bw(calc = 0u64)]
    _reserved: u64,

    #[br(temp)]
    #[bw(calc = 1.0f32)]
    _scale_u: f32,

    #[br(temp)]
    #[bw(calc = 1.0f32)]
    _scale_v: f32,
}
