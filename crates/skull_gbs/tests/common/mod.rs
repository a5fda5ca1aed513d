use byteorder::{ByteOrder, WriteBytesExt};
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Footer {
    None,
    /// footer present and included in the file size
    Counted,
    /// footer present but left out of the file size
    Excluded,
}

fn fixed<const N: usize>(value: &str) -> [u8; N] {
    let mut out = [0u8; N];
    out[..value.len()].copy_from_slice(value.as_bytes());
    out
}

pub fn textures<E: ByteOrder>(entries: &[(u16, &str)]) -> Vec<u8> {
    let mut out = Vec::new();
    for (id, path) in entries {
        out.write_u16::<E>(*id).unwrap();
        out.write_u16::<E>(0).unwrap();
        out.write_all(&fixed::<260>(path)).unwrap();
        out.write_u16::<E>(*id).unwrap();
        out.write_u16::<E>(0).unwrap();
        out.write_u64::<E>(0).unwrap();
        out.write_f32::<E>(1.0).unwrap();
        out.write_f32::<E>(1.0).unwrap();
    }
    out
}

pub fn font<E: ByteOrder>(id: u32, characters: &[(u8, u32)]) -> Vec<u8> {
    let mut out = Vec::new();
    out.write_all(b"GFNT").unwrap();
    out.write_u32::<E>(0x64 + 0x28 * characters.len() as u32).unwrap();
    out.write_u32::<E>(id).unwrap();
    out.write_all(&fixed::<64>("Main")).unwrap();
    for value in [24, 512, 512, 20, 1, characters.len() as u32] {
        out.write_u32::<E>(value).unwrap();
    }
    for (code, x_offset) in characters {
        out.write_all(&[*code, 0, 0, 0]).unwrap();
        for value in [0, *x_offset, 0, 16, 20, 18, 17, 1, 0] {
            out.write_u32::<E>(value).unwrap();
        }
    }
    out
}

/// A scene with two textures and one font, optionally followed by sounds and messages, a tail and
/// a footer.
pub fn scene<E: ByteOrder>(with_raw: bool, tail: &[u8], footer: Footer) -> Vec<u8> {
    let textures = textures::<E>(&[(1, "ui/a.dds"), (2, "ui/b.dds")]);
    let fonts = font::<E>(10, &[(b'A', 0), (b'B', 16)]);
    let sounds = vec![0x51u8; 5];
    let messages = vec![0x4Du8; 3];

    let fonts_offset = textures.len() as u32;
    let sounds_offset = fonts_offset + fonts.len() as u32;
    let messages_offset = sounds_offset + sounds.len() as u32;

    let mut body = Vec::new();
    body.extend_from_slice(&textures);
    body.extend_from_slice(&fonts);
    if with_raw {
        body.extend_from_slice(&sounds);
        body.extend_from_slice(&messages);
    }
    body.extend_from_slice(tail);

    let data_len = 0x3C + body.len() as u32;
    let file_size = match footer {
        Footer::None | Footer::Excluded => data_len,
        Footer::Counted => data_len + 4,
    };

    let (counts, offsets) = if with_raw {
        ([1, 2, 1, 0, 2], [fonts_offset, 0, sounds_offset, 0, messages_offset])
    } else {
        ([1, 2, 0, 0, 0], [fonts_offset, 0, 0, 0, 0])
    };

    let mut out = Vec::new();
    out.write_all(b"CSGG").unwrap();
    out.write_u32::<E>(file_size).unwrap();
    out.write_all(b"1.00\0\0\0\0").unwrap();
    out.write_u32::<E>(3).unwrap();
    for value in counts.into_iter().chain(offsets) {
        out.write_u32::<E>(value).unwrap();
    }
    out.extend_from_slice(&body);
    if footer != Footer::None {
        out.write_u32::<E>(0x1234_4321).unwrap();
    }
    out
}
