mod common;

use binrw::Endian;
use byteorder::{BigEndian, LittleEndian};
use pretty_assertions::assert_eq;
use skull_gbs::{error::Result, SceneRecord};
use tracing::info;
use tracing_test::traced_test;

use common::{scene, Footer};

fn validate_roundtrip(input: &[u8], endian: Endian) -> Result<SceneRecord> {
    info!("round tripping {} bytes", input.len());

    let record = SceneRecord::parse(input)?;
    assert_eq!(record.endian, endian);

    let output = record.to_bytes()?;
    assert_eq!(output.len(), input.len());
    assert_eq!(output, input);

    Ok(record)
}

#[traced_test]
#[test]
fn roundtrip_little_endian() -> Result<()> {
    let record = validate_roundtrip(&scene::<LittleEndian>(true, &[], Footer::None), Endian::Little)?;

    assert_eq!(record.fonts.len(), 1);
    assert_eq!(record.fonts[0].id, 10);
    assert_eq!(record.fonts[0].name.to_string_lossy(), "Main");
    assert_eq!(record.fonts[0].characters.len(), 2);
    assert_eq!(record.textures.len(), 2);
    assert_eq!(record.textures[1].path.to_string_lossy(), "ui/b.dds");
    assert_eq!(record.sounds.data, Some(vec![0x51; 5]));
    assert!(!record.views.is_present());
    assert_eq!(record.messages.data, Some(vec![0x4D; 3]));

    Ok(())
}

#[traced_test]
#[test]
fn roundtrip_big_endian() -> Result<()> {
    let record = validate_roundtrip(&scene::<BigEndian>(true, &[], Footer::None), Endian::Big)?;
    assert_eq!(record.fonts[0].characters[1].x_offset, 16);

    Ok(())
}

#[traced_test]
#[test]
fn roundtrip_tail_and_footer() -> Result<()> {
    let tail = [0xDE, 0xAD, 0xBE, 0xEF, 0x01];

    for footer in [Footer::Counted, Footer::Excluded] {
        let record = validate_roundtrip(&scene::<LittleEndian>(false, &tail, footer), Endian::Little)?;
        assert_eq!(record.tail, tail);
        assert!(record.footer);
        assert_eq!(record.size_excludes_footer, footer == Footer::Excluded);

        validate_roundtrip(&scene::<BigEndian>(false, &tail, footer), Endian::Big)?;
    }

    Ok(())
}

#[traced_test]
#[test]
fn footer_decides_byte_order() -> Result<()> {
    let mut input = scene::<BigEndian>(false, &[], Footer::Excluded);

    // make the size field look like a little endian file of this length
    let len = input.len() as u32;
    input[4..8].copy_from_slice(&len.to_le_bytes());

    let record = SceneRecord::parse(&input)?;
    assert_eq!(record.endian, Endian::Big);
    assert_eq!(record.fonts[0].id, 10);
    assert_eq!(record.textures[0].id, 1);

    Ok(())
}

#[traced_test]
#[test]
fn convert_byte_order() -> Result<()> {
    let little = scene::<LittleEndian>(true, &[], Footer::Counted);
    let big = scene::<BigEndian>(true, &[], Footer::Counted);

    let converted = SceneRecord::parse(&little)?
        .with_byte_order(Endian::Big)
        .to_bytes()?;
    assert_eq!(converted, big);

    Ok(())
}

#[traced_test]
#[test]
fn stale_offsets_are_recomputed() -> Result<()> {
    let input = scene::<LittleEndian>(true, &[], Footer::None);

    let mut record = SceneRecord::parse(&input)?;
    record.header.sounds_offset = 0xFFFF;
    record.header.file_size = 1;

    assert_eq!(record.to_bytes()?, input);

    Ok(())
}

#[traced_test]
#[test]
fn open_and_save() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("scene.gbs");
    let input = scene::<BigEndian>(true, &[], Footer::None);
    std::fs::write(&path, &input)?;

    let record = SceneRecord::open(&path)?;
    let out = dir.path().join("scene.pc.gbs");
    record.with_byte_order(Endian::Little).save(&out)?;

    assert_eq!(
        std::fs::read(&out)?,
        scene::<LittleEndian>(true, &[], Footer::None)
    );

    Ok(())
}
