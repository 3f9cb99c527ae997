use std::fs;
use std::path::{Path, PathBuf};

const DATA_TYPE_UTF8: u32 = 1;
const DATA_TYPE_INTEGER: u32 = 0;
const MVHD_PAYLOAD_LEN: usize = 100;
const MDAT_PAYLOAD_LEN: usize = 32;

fn main() -> Result<(), String> {
    let root = PathBuf::from("tests/golden");
    write_fixture(&root.join("full_tags"), FixtureSpec::full_tags())?;
    write_fixture(&root.join("title_only"), FixtureSpec::title_only())?;
    write_fixture(&root.join("free_text_genre"), FixtureSpec::free_text_genre())?;
    write_fixture(&root.join("malformed_item"), FixtureSpec::malformed_item())?;
    Ok(())
}

struct FixtureSpec {
    items: Vec<Vec<u8>>,
}

impl FixtureSpec {
    fn full_tags() -> Self {
        Self {
            items: vec![
                text_item(b"\xa9nam", "Golden Hour"),
                text_item(b"\xa9ART", "The Fixtures"),
                text_item(b"soar", "Fixtures, The"),
                text_item(b"\xa9alb", "Synthetic Sessions"),
                text_item(b"soal", "Synthetic Sessions"),
                text_item(b"\xa9day", "2019"),
                binary_item(b"trkn", &[0x00, 0x00, 0x00, 0x07, 0x00, 0x0c, 0x00, 0x00]),
                binary_item(b"gnre", &[0x00, 0x12]),
                text_item(b"\xa9cmt", "recorded live"),
                text_item(b"\xa9lyr", "one two three"),
            ],
        }
    }

    fn title_only() -> Self {
        Self {
            items: vec![text_item(b"\xa9nam", "Test Song")],
        }
    }

    fn free_text_genre() -> Self {
        Self {
            items: vec![
                text_item(b"\xa9nam", "Night Drive"),
                text_item(b"\xa9gen", "Synthwave"),
            ],
        }
    }

    fn malformed_item() -> Self {
        Self {
            items: vec![
                atom(b"\xa9nam", &[0x00, 0x00, 0x00, 0x10]),
                text_item(b"\xa9ART", "Still Here"),
                binary_item(b"trkn", &[0x00, 0x01]),
            ],
        }
    }
}

fn write_fixture(dir: &Path, spec: FixtureSpec) -> Result<(), String> {
    fs::create_dir_all(dir).map_err(|err| format!("failed to create {}: {}", dir.display(), err))?;
    let path = dir.join("input.m4a");
    fs::write(&path, build_m4a(&spec.items))
        .map_err(|err| format!("failed to write {}: {}", path.display(), err))?;
    Ok(())
}

fn build_m4a(items: &[Vec<u8>]) -> Vec<u8> {
    let ilst = atom(b"ilst", &items.concat());

    let mut meta = vec![0u8; 4];
    meta.extend(atom(b"hdlr", &hdlr_payload()));
    meta.extend(ilst);
    let udta = atom(b"udta", &atom(b"meta", &meta));

    let moov = atom(
        b"moov",
        &[atom(b"mvhd", &[0u8; MVHD_PAYLOAD_LEN]), udta].concat(),
    );
    [
        atom(b"ftyp", b"M4A \x00\x00\x02\x00M4A mp42isom"),
        atom(b"free", &[]),
        moov,
        atom(b"mdat", &[0u8; MDAT_PAYLOAD_LEN]),
    ]
    .concat()
}

fn hdlr_payload() -> Vec<u8> {
    let mut payload = vec![0u8; 8];
    payload.extend_from_slice(b"mdir");
    payload.extend_from_slice(b"appl");
    payload.extend_from_slice(&[0u8; 9]);
    payload
}

fn text_item(kind: &[u8; 4], value: &str) -> Vec<u8> {
    item(kind, DATA_TYPE_UTF8, value.as_bytes())
}

fn binary_item(kind: &[u8; 4], value: &[u8]) -> Vec<u8> {
    item(kind, DATA_TYPE_INTEGER, value)
}

fn item(kind: &[u8; 4], data_type: u32, value: &[u8]) -> Vec<u8> {
    let mut data = Vec::with_capacity(8 + value.len());
    data.extend_from_slice(&data_type.to_be_bytes());
    data.extend_from_slice(&[0u8; 4]);
    data.extend_from_slice(value);
    atom(kind, &atom(b"data", &data))
}

fn atom(kind: &[u8; 4], payload: &[u8]) -> Vec<u8> {
    let size = (8 + payload.len()) as u32;
    let mut bytes = Vec::with_capacity(size as usize);
    bytes.extend_from_slice(&size.to_be_bytes());
    bytes.extend_from_slice(kind);
    bytes.extend_from_slice(payload);
    bytes
}
