use binrw::Endian;
use serde::{ser::SerializeStruct, Serialize, Serializer};

use crate::{
    read::{RawSection, SceneRecord},
    types::FixedStr,
};

/// Serialize a fixed byte field as a string, dropping trailing NULs
pub(crate) fn lossy_bytes<const N: usize, S>(bytes: &[u8; N], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&FixedStr::<N>::new(bytes).to_string_lossy())
}

impl<const N: usize> Serialize for FixedStr<N> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string_lossy())
    }
}

impl Serialize for RawSection {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("RawSection", 3)?;
        state.serialize_field("kind", &self.kind)?;
        state.serialize_field("present", &self.is_present())?;
        state.serialize_field("len", &self.len())?;
        state.end()
    }
}

impl Serialize for SceneRecord {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let endian = match self.endian {
            Endian::Big => "big",
            Endian::Little => "little",
        };

        let mut state = serializer.serialize_struct("SceneRecord", 9)?;
        state.serialize_field("endian", endian)?;
        state.serialize_field("header", &self.header)?;
        state.serialize_field("fonts", &self.fonts)?;
        state.serialize_field("textures", &self.textures)?;
        state.serialize_field("sounds", &self.sounds)?;
        state.serialize_field("views", &self.views)?;
        state.serialize_field("messages", &self.messages)?;
        state.serialize_field("tail_len", &self.tail.len())?;
        state.serialize_field("footer", &self.footer)?;
        state.end()
    }
}
