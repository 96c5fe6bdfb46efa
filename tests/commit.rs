//! End-to-end tag round-trip tests driven entirely through the public API.
//!
//! These build a full file byte-for-byte (ID3v2 region plus a fake audio
//! body, optionally plus an ID3v1 trailer) rather than relying on checked-in
//! binary fixtures, since this crate has no `res/test/*.mp3` directory to
//! draw on.
use id3kit::id3v1::Id3v1Tag;
use id3kit::id3v2::{FramePayload, OpenMode, SaveVersion, Tag};

fn temp_path(label: &str) -> std::path::PathBuf {
    use std::sync::atomic::{AtomicU32, Ordering};
    static COUNTER: AtomicU32 = AtomicU32::new(0);
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    std::env::temp_dir().join(format!("id3kit_commit_test_{}_{}_{}.mp3", label, std::process::id(), n))
}

fn minimal_v24_tag_bytes(title: &str, artist: &str) -> Vec<u8> {
    fn frame(fid: &[u8; 4], text: &str) -> Vec<u8> {
        let mut payload = vec![3u8];
        payload.extend(text.as_bytes());
        let mut out = Vec::new();
        out.extend(fid);
        out.extend((payload.len() as u32).to_be_bytes());
        out.push(0);
        out.push(0);
        out.extend(payload);
        out
    }

    let mut body = Vec::new();
    body.extend(frame(b"TIT2", title));
    body.extend(frame(b"TPE1", artist));
    // An unknown frame-ID: must be dropped on parse and absent afterwards.
    body.extend(frame(b"XXXX", "should be dropped"));

    let mut out = Vec::new();
    out.extend(b"ID3");
    out.push(4);
    out.push(0);
    out.push(0);
    out.extend(id3kit_syncsafe(body.len() as u32));
    out.extend(body);
    out
}

// Mirrors the crate's private sync-safe encoder; duplicated here because
// integration tests only see the public surface.
fn id3kit_syncsafe(n: u32) -> [u8; 4] {
    [
        ((n >> 21) & 0x7F) as u8,
        ((n >> 14) & 0x7F) as u8,
        ((n >> 7) & 0x7F) as u8,
        (n & 0x7F) as u8,
    ]
}

fn id3v1_trailer(songname: &str, track: u8) -> [u8; 128] {
    let mut raw = [0u8; 128];
    raw[0..3].copy_from_slice(b"TAG");
    raw[3..3 + songname.len()].copy_from_slice(songname.as_bytes());
    raw[97 + 28] = 0;
    raw[97 + 29] = track;
    raw[127] = 12;
    raw
}

#[test]
fn unregistered_frame_is_kept_as_unknown_and_order_is_stable() {
    let path = temp_path("order");
    std::fs::write(&path, minimal_v24_tag_bytes("Title", "Artist")).unwrap();

    let tag = Tag::open(&path, OpenMode::Read).unwrap();
    let fids: Vec<&str> = tag.frames().iter().map(|f| f.fid()).collect();
    assert_eq!(fids, vec!["TIT2", "TPE1"]);
    assert_eq!(tag.unknown_frames().len(), 1);
    assert_eq!(tag.unknown_frames()[0].fid(), "XXXX");

    std::fs::remove_file(&path).ok();
}

#[test]
fn fast_path_roundtrip_is_byte_identical_when_untouched() {
    let path = temp_path("identical");
    let data = minimal_v24_tag_bytes("Same", "Artist");
    std::fs::write(&path, &data).unwrap();

    let mut tag = Tag::open(&path, OpenMode::Modify).unwrap();
    // No mutation: the unknown XXXX frame round-trips through its own
    // preserved-bytes list, so re-committing reproduces the tag region
    // exactly (same required size, zero padding).
    tag.commit(false).unwrap();

    let reopened = Tag::open(&path, OpenMode::Read).unwrap();
    assert_eq!(reopened.frames().len(), 2);
    assert_eq!(reopened.unknown_frames().len(), 1);
    match reopened.frames()[0].payload() {
        FramePayload::Text { values, .. } => assert_eq!(values[0], "Same"),
        _ => panic!("wrong shape"),
    }

    std::fs::remove_file(&path).ok();
}

#[test]
fn new_tag_can_be_built_from_scratch_and_committed() {
    let path = temp_path("new");
    std::fs::write(&path, b"\xFF\xFB\x90\x00fake mpeg audio frame data here").unwrap();

    let mut tag = Tag::open(&path, OpenMode::New(SaveVersion::V24)).unwrap();
    assert!(!tag.tag_exists());

    let mut frame = id3kit::id3v2::Frame::new(tag.version(), "TIT2").unwrap();
    let encoding = match frame.payload() {
        FramePayload::Text { encoding, .. } => *encoding,
        _ => unreachable!(),
    };
    frame.set_payload(FramePayload::Text {
        encoding,
        values: vec!["Brand New".to_string()],
    });
    tag.frames_mut().push(frame);

    tag.commit(false).unwrap();
    assert!(tag.tag_exists());

    let reopened = Tag::open(&path, OpenMode::Read).unwrap();
    assert_eq!(reopened.frames().len(), 1);
    match reopened.frames()[0].payload() {
        FramePayload::Text { values, .. } => assert_eq!(values[0], "Brand New"),
        _ => panic!("wrong shape"),
    }

    let on_disk = std::fs::read(&path).unwrap();
    assert!(on_disk.ends_with(b"fake mpeg audio frame data here"));

    std::fs::remove_file(&path).ok();
}

#[test]
fn id3v2_commit_never_touches_an_id3v1_trailer() {
    let path = temp_path("v1v2");
    let mut data = minimal_v24_tag_bytes("Hi", "Bye");
    data.extend(b"\xFF\xFB\x90\x00fake audio");
    data.extend(id3v1_trailer("OldSong", 3));
    std::fs::write(&path, &data).unwrap();

    let v1_before = Id3v1Tag::open(&path).unwrap();

    let mut tag = Tag::open(&path, OpenMode::Modify).unwrap();
    if let FramePayload::Text { values, .. } = tag.frames_mut()[0].payload_mut() {
        values[0] = "x".repeat(5000);
    }
    tag.commit(false).unwrap();

    let v1_after = Id3v1Tag::open(&path).unwrap();
    assert_eq!(v1_before, v1_after);
    assert_eq!(v1_after.track(), Some(3));
    assert_eq!(v1_after.songname(), "OldSong");

    std::fs::remove_file(&path).ok();
}
