use std::fs;

use tempfile::TempDir;
use trackcurate::io::split_cache::{read_cache, write_cache};

#[test]
fn roundtrip_preserves_tracks_and_crc() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("split_tracks.bin");
    write_cache(&path, 0xDEAD_BEEF, &[3, 17, 42]).unwrap();

    let cache = read_cache(&path).unwrap();
    assert_eq!(cache.input_crc, 0xDEAD_BEEF);
    assert_eq!(cache.tracks, vec![3, 17, 42]);
}

#[test]
fn empty_candidate_set_roundtrips() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("split_tracks.bin");
    write_cache(&path, 1, &[]).unwrap();

    let cache = read_cache(&path).unwrap();
    assert!(cache.tracks.is_empty());
}

#[test]
fn bad_magic_is_rejected() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("split_tracks.bin");
    fs::write(&path, vec![0u8; 32]).unwrap();

    let err = read_cache(&path).unwrap_err().to_string();
    assert!(err.contains("bad magic"));
}

#[test]
fn truncated_file_is_rejected() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("split_tracks.bin");
    fs::write(&path, b"TCSP").unwrap();

    let err = read_cache(&path).unwrap_err().to_string();
    assert!(err.contains("truncated"));
}

#[test]
fn length_mismatch_is_rejected() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("split_tracks.bin");
    write_cache(&path, 1, &[3, 17]).unwrap();
    let mut bytes = fs::read(&path).unwrap();
    bytes.truncate(bytes.len() - 8);
    fs::write(&path, bytes).unwrap();

    let err = read_cache(&path).unwrap_err().to_string();
    assert!(err.contains("length mismatch"));
}
