//! Combining the fonts and textures of two scene records
//!

use std::ops::{BitOr, BitOrAssign};
use tracing::{debug, instrument};

use crate::{
    read::SceneRecord,
    types::{Font, Section, Texture, CHARACTER_SIZE, TEXTURE_SIZE},
};

/// Divisor applied to glyph positions and sizes when rescaling
pub const COORD_DIVISOR: f64 = 1.5;

/// Divisor applied to glyph advances when rescaling
pub const ADVANCE_DIVISOR: f64 = 1.45;

/// Policy flags for [`merge`]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MergeConfig(u32);

impl MergeConfig {
    /// No flags
    pub const NONE: MergeConfig = MergeConfig(0);
    /// Append fonts whose id is unknown to the base record
    pub const ADD_NEW_FONTS: MergeConfig = MergeConfig(1 << 0);
    /// Rescale appended glyphs and the font's `max_top`
    pub const DIVIDE_COORDS: MergeConfig = MergeConfig(1 << 1);
    /// Give appended textures the id following the last texture
    pub const CALCULATE_TEXTURE_ID: MergeConfig = MergeConfig(1 << 2);
    /// Every flag
    pub const ALL: MergeConfig = MergeConfig(0b111);

    /// Whether every flag in `other` is set
    pub const fn contains(self, other: MergeConfig) -> bool {
        self.0 & other.0 == other.0
    }

    /// The raw flag bits
    pub const fn bits(self) -> u32 {
        self.0
    }
}

impl BitOr for MergeConfig {
    type Output = MergeConfig;

    fn bitor(self, rhs: Self) -> Self::Output {
        MergeConfig(self.0 | rhs.0)
    }
}

impl BitOrAssign for MergeConfig {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

fn scale(value: u32, divisor: f64) -> u32 {
    (f64::from(value) / divisor).round() as u32
}

/// Fold the characters of `incoming` into `host`.
///
/// Characters whose code the host already has are skipped. Appended characters have their atlas
/// index shifted past the host's atlases as they were before this merge.
pub fn merge_font(mut host: Font, incoming: &Font, config: MergeConfig) -> Font {
    let divide = config.contains(MergeConfig::DIVIDE_COORDS);
    let base_atlas = host.atlas_count;

    if divide {
        let max_top = scale(incoming.max_top, COORD_DIVISOR);
        if max_top > host.max_top {
            host.max_top = max_top;
        }
    }

    for character in &incoming.characters {
        if host.has_character(&character.code) {
            continue;
        }

        let mut appended = *character;
        if divide {
            appended.x_offset = scale(appended.x_offset, COORD_DIVISOR);
            appended.y_offset = scale(appended.y_offset, COORD_DIVISOR);
            appended.width = scale(appended.width, COORD_DIVISOR);
            appended.height = scale(appended.height, COORD_DIVISOR);
            appended.top = scale(appended.top, COORD_DIVISOR);
            appended.advance = scale(appended.advance, ADVANCE_DIVISOR);
        }
        appended.atlas_index = appended.atlas_index.wrapping_add(base_atlas);

        if appended.atlas_index.wrapping_add(1) > host.atlas_count {
            host.atlas_count = appended.atlas_index.wrapping_add(1);
        }
        host.length = host.length.wrapping_add(CHARACTER_SIZE);
        host.characters.push(appended);
    }

    host
}

/// Add `incoming` to a texture table unless its id is already taken.
///
/// Returns the table and whether the texture was appended.
pub fn merge_texture(
    mut host: Vec<Texture>,
    incoming: &Texture,
    config: MergeConfig,
) -> (Vec<Texture>, bool) {
    if host.iter().any(|t| t.id == incoming.id) {
        return (host, false);
    }

    let mut appended = incoming.clone();
    if config.contains(MergeConfig::CALCULATE_TEXTURE_ID) {
        if let Some(last) = host.last() {
            appended.id = last.id.wrapping_add(1);
        }
    }
    host.push(appended);

    (host, true)
}

/// Combine the fonts and textures of `incoming` into a copy of `base`.
///
/// The header of the result is kept consistent with the layout [`SceneRecord::to_bytes`] produces
/// after every single append.
#[instrument(skip_all, fields(config = config.bits()))]
pub fn merge(base: &SceneRecord, incoming: &SceneRecord, config: MergeConfig) -> SceneRecord {
    let mut merged = base.clone();

    for font in &incoming.fonts {
        match merged.fonts.iter().position(|f| f.id == font.id) {
            Some(index) => {
                let host = std::mem::take(&mut merged.fonts[index]);
                let before = host.characters.len();
                let updated = merge_font(host, font, config);
                let added = (updated.characters.len() - before) as u32;
                merged.fonts[index] = updated;

                if added > 0 {
                    debug!("appended {} characters to font {}", added, font.id);
                    merged.grow_section(Section::Fonts, added * CHARACTER_SIZE);
                }
            }
            None if config.contains(MergeConfig::ADD_NEW_FONTS) => {
                debug!("adding font {}", font.id);
                merged.grow_section(Section::Fonts, font.byte_len());
                merged.fonts.push(font.clone());
                merged.header.fonts_count = merged.header.fonts_count.wrapping_add(1);
            }
            None => debug!("skipping unknown font {}", font.id),
        }
    }

    for texture in &incoming.textures {
        let host = std::mem::take(&mut merged.textures);
        let (updated, appended) = merge_texture(host, texture, config);

        if appended {
            debug!("adding texture {}", texture.id);
            merged.grow_section(Section::Textures, TEXTURE_SIZE);
            merged.header.textures_count = merged.header.textures_count.wrapping_add(1);
        }
        merged.textures = updated;
    }

    merged
}

impl SceneRecord {
    /// Number of bytes a section occupies when written
    pub fn section_len(&self, section: Section) -> u32 {
        match section {
            Section::Textures => TEXTURE_SIZE * self.textures.len() as u32,
            Section::Fonts => self.fonts.iter().map(Font::byte_len).sum(),
            Section::Sounds | Section::Views | Section::Messages => {
                self.raw_section(section).map_or(0, |s| s.len() as u32)
            }
        }
    }

    /// Whether a section is written at all
    pub fn section_present(&self, section: Section) -> bool {
        match section {
            Section::Textures => !self.textures.is_empty(),
            Section::Fonts => !self.fonts.is_empty(),
            Section::Sounds | Section::Views | Section::Messages => {
                self.raw_section(section).is_some_and(|s| s.is_present())
            }
        }
    }

    /// Account for `delta` bytes about to be appended to `section`.
    ///
    /// Must be called before the bytes are added. The file size grows by `delta`, every present
    /// section written after `section` moves by `delta`, and a section that was absent receives
    /// the offset it will be written at.
    pub fn grow_section(&mut self, section: Section, delta: u32) {
        self.header.file_size = self.header.file_size.wrapping_add(delta);

        if !self.section_present(section) {
            let offset: u32 = Section::ALL[..section.position()]
                .iter()
                .filter(|s| self.section_present(**s))
                .map(|s| self.section_len(*s))
                .sum();
            *self.header.offset_mut(section) = offset;
        }

        for later in &Section::ALL[section.position() + 1..] {
            if self.section_present(*later) {
                let offset = self.header.offset_mut(*later);
                *offset = offset.wrapping_add(delta);
            }
        }
    }
}
