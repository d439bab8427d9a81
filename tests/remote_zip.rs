//! End-to-end tests of the extraction engine over an in-memory transport.

use std::io::Write;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use tokio_util::sync::CancellationToken;

use zipgrab::{
    ArchiveLocation, CompressionMethod, Error, ExtractOptions, ProgressListener, RangedResponse,
    RemoteZip, Result, SizeProbe, Transport,
};

/// Serves a byte buffer over the `Transport` seam.
///
/// `redirects` are handed out one per size probe before the length is
/// reported. `tail_garbage` bytes are appended to every ranged body to
/// simulate a server returning more than was asked for.
#[derive(Debug)]
struct MemoryTransport {
    data: Vec<u8>,
    redirects: Mutex<Vec<ArchiveLocation>>,
    always_redirect: bool,
    tail_garbage: usize,
    gets: AtomicUsize,
}

impl MemoryTransport {
    fn new(data: Vec<u8>) -> Self {
        Self {
            data,
            redirects: Mutex::new(Vec::new()),
            always_redirect: false,
            tail_garbage: 0,
            gets: AtomicUsize::new(0),
        }
    }

    fn with_redirects(mut self, mut hops: Vec<&str>) -> Self {
        hops.reverse();
        self.redirects = Mutex::new(
            hops.into_iter()
                .map(|url| ArchiveLocation::parse(url).unwrap())
                .collect(),
        );
        self
    }

    fn with_tail_garbage(mut self, bytes: usize) -> Self {
        self.tail_garbage = bytes;
        self
    }

    fn ranged_gets(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn probe_size(&self, location: &ArchiveLocation) -> Result<SizeProbe> {
        if self.always_redirect {
            return Ok(SizeProbe::Redirect(
                location.redirected(location.url().clone()),
            ));
        }
        if let Some(target) = self.redirects.lock().unwrap().pop() {
            // A redirect replaces the URL and keeps the user-agent.
            return Ok(SizeProbe::Redirect(
                location.redirected(target.url().clone()),
            ));
        }
        Ok(SizeProbe::Length(self.data.len() as u64))
    }

    async fn ranged_get(
        &self,
        _location: &ArchiveLocation,
        start: u64,
        end: u64,
    ) -> Result<RangedResponse> {
        self.gets.fetch_add(1, Ordering::SeqCst);

        let len = self.data.len() as u64;
        if start >= len {
            return Ok(RangedResponse {
                status: 416,
                body: Bytes::new(),
            });
        }

        let end = end.min(len - 1);
        let mut body = self.data[start as usize..=end as usize].to_vec();
        body.extend(std::iter::repeat(0xAA).take(self.tail_garbage));

        Ok(RangedResponse {
            status: 206,
            body: body.into(),
        })
    }
}

/// Builds a minimal conforming ZIP archive in memory.
#[derive(Default)]
struct ArchiveBuilder {
    data: Vec<u8>,
    central: Vec<u8>,
    count: u16,
}

impl ArchiveBuilder {
    fn new() -> Self {
        Self::default()
    }

    /// Append a member. `local_compressed` overrides the compressed size
    /// written into the local header, for writers that store zero there.
    fn member(
        &mut self,
        name: &str,
        method: u16,
        payload: &[u8],
        uncompressed: u32,
        local_compressed: Option<u32>,
    ) -> &mut Self {
        let offset = self.data.len() as u32;
        let compressed = payload.len() as u32;

        // local file header
        self.data.extend_from_slice(b"PK\x03\x04");
        self.data.extend_from_slice(&20u16.to_le_bytes()); // version needed
        self.data.extend_from_slice(&0u16.to_le_bytes()); // flags
        self.data.extend_from_slice(&method.to_le_bytes());
        self.data.extend_from_slice(&0u32.to_le_bytes()); // time + date
        self.data.extend_from_slice(&0u32.to_le_bytes()); // crc32
        self.data
            .extend_from_slice(&local_compressed.unwrap_or(compressed).to_le_bytes());
        self.data.extend_from_slice(&uncompressed.to_le_bytes());
        self.data
            .extend_from_slice(&(name.len() as u16).to_le_bytes());
        self.data.extend_from_slice(&0u16.to_le_bytes()); // extra len
        self.data.extend_from_slice(name.as_bytes());
        self.data.extend_from_slice(payload);

        // central directory file header
        self.central.extend_from_slice(b"PK\x01\x02");
        self.central.extend_from_slice(&20u16.to_le_bytes()); // version made by
        self.central.extend_from_slice(&20u16.to_le_bytes()); // version needed
        self.central.extend_from_slice(&0u16.to_le_bytes()); // flags
        self.central.extend_from_slice(&method.to_le_bytes());
        self.central.extend_from_slice(&0u32.to_le_bytes()); // time + date
        self.central.extend_from_slice(&0u32.to_le_bytes()); // crc32
        self.central.extend_from_slice(&compressed.to_le_bytes());
        self.central.extend_from_slice(&uncompressed.to_le_bytes());
        self.central
            .extend_from_slice(&(name.len() as u16).to_le_bytes());
        self.central.extend_from_slice(&0u16.to_le_bytes()); // extra len
        self.central.extend_from_slice(&0u16.to_le_bytes()); // comment len
        self.central.extend_from_slice(&0u16.to_le_bytes()); // disk start
        self.central.extend_from_slice(&0u16.to_le_bytes()); // internal attrs
        self.central.extend_from_slice(&0u32.to_le_bytes()); // external attrs
        self.central.extend_from_slice(&offset.to_le_bytes());
        self.central.extend_from_slice(name.as_bytes());

        self.count += 1;
        self
    }

    fn directory(&mut self, name: &str) -> &mut Self {
        assert!(name.ends_with('/'));
        self.member(name, 0, &[], 0, None)
    }

    fn finish(&mut self) -> Vec<u8> {
        let mut data = std::mem::take(&mut self.data);
        let cd_offset = data.len() as u32;
        let cd_size = self.central.len() as u32;
        data.extend_from_slice(&self.central);

        data.extend_from_slice(b"PK\x05\x06");
        data.extend_from_slice(&0u16.to_le_bytes()); // disk number
        data.extend_from_slice(&0u16.to_le_bytes()); // directory start disk
        data.extend_from_slice(&self.count.to_le_bytes()); // disk entries
        data.extend_from_slice(&self.count.to_le_bytes()); // total entries
        data.extend_from_slice(&cd_size.to_le_bytes());
        data.extend_from_slice(&cd_offset.to_le_bytes());
        data.extend_from_slice(&0u16.to_le_bytes()); // comment length
        data
    }
}

fn deflate(data: &[u8]) -> Vec<u8> {
    let mut encoder =
        flate2::write::DeflateEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

fn location() -> ArchiveLocation {
    ArchiveLocation::parse("http://zips.test/archive.zip").unwrap()
}

async fn connect(transport: MemoryTransport) -> RemoteZip<MemoryTransport> {
    RemoteZip::connect(std::sync::Arc::new(transport), location())
        .await
        .unwrap()
}

#[tokio::test]
async fn lists_members_in_storage_order() {
    let body = b"hello over http ranges\n";
    let packed = deflate(body);

    let data = ArchiveBuilder::new()
        .member("hello.txt", 0, body, body.len() as u32, None)
        .directory("docs/")
        .member("docs/readme.md", 8, &packed, body.len() as u32, None)
        .finish();

    let archive = connect(MemoryTransport::new(data)).await;
    let entries = archive.entries().await.unwrap();

    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0].name, "hello.txt");
    assert_eq!(entries[0].method, CompressionMethod::Stored);
    assert_eq!(entries[0].uncompressed_size, body.len() as u64);
    assert_eq!(entries[1].name, "docs/");
    assert!(entries[1].is_directory);
    assert_eq!(entries[2].name, "docs/readme.md");
    assert_eq!(entries[2].method, CompressionMethod::Deflate);
    assert_eq!(entries[2].compressed_size, packed.len() as u64);
}

#[tokio::test]
async fn locates_directory_from_end_record() {
    let mut builder = ArchiveBuilder::new();
    // Pad the archive so the tail window covers only part of it.
    let pad = vec![b'x'; 4400];
    builder.member("pad.bin", 0, &pad, pad.len() as u32, None);
    let data = builder.finish();
    let expected_offset = 30 + "pad.bin".len() as u32 + pad.len() as u32;

    let archive = connect(MemoryTransport::new(data)).await;
    assert!(archive.archive_length() > 4096);

    let pointer = archive.locate_directory().await.unwrap();
    assert_eq!(pointer.offset, expected_offset);
    assert_eq!(pointer.size, 46 + "pad.bin".len() as u32);
}

#[tokio::test]
async fn locate_reads_size_and_offset_from_end_record() {
    // 5000-byte archive whose end record declares a 400-byte directory
    // at offset 4500.
    let mut data = vec![0u8; 5000];
    let eocd_at = 4978;
    data[eocd_at..eocd_at + 4].copy_from_slice(b"PK\x05\x06");
    data[eocd_at + 12..eocd_at + 16].copy_from_slice(&400u32.to_le_bytes());
    data[eocd_at + 16..eocd_at + 20].copy_from_slice(&4500u32.to_le_bytes());

    let archive = connect(MemoryTransport::new(data)).await;
    let pointer = archive.locate_directory().await.unwrap();
    assert_eq!(pointer.size, 400);
    assert_eq!(pointer.offset, 4500);
}

#[tokio::test]
async fn truncated_end_record_is_a_short_read() {
    // The signature sits 10 bytes before the end of the archive, so the
    // fixed 22-byte record cannot fit.
    let mut data = vec![0u8; 500];
    let at = 500 - 14;
    data[at..at + 4].copy_from_slice(b"PK\x05\x06");

    let archive = connect(MemoryTransport::new(data)).await;
    let err = archive.locate_directory().await.unwrap_err();
    assert!(matches!(err, Error::ShortRead { expected: 22, .. }));
}

#[tokio::test]
async fn extracts_stored_member_byte_identical() {
    let body = b"stored members come back verbatim";
    let data = ArchiveBuilder::new()
        .member("raw.bin", 0, body, body.len() as u32, None)
        .finish();

    let archive = connect(MemoryTransport::new(data)).await;
    let entries = archive.entries().await.unwrap();

    let mut sink = Vec::new();
    let written = archive
        .extract(&entries[0], &mut sink, &ExtractOptions::default())
        .await
        .unwrap();

    assert_eq!(written, body.len() as u64);
    assert_eq!(sink, body);
}

#[tokio::test]
async fn extracts_deflate_member() {
    let body: Vec<u8> = (0..10_000u32).flat_map(|i| i.to_le_bytes()).collect();
    let packed = deflate(&body);
    let data = ArchiveBuilder::new()
        .member("blob.bin", 8, &packed, body.len() as u32, None)
        .finish();

    let archive = connect(MemoryTransport::new(data)).await;
    let entries = archive.entries().await.unwrap();

    let mut sink = Vec::new();
    let written = archive
        .extract(&entries[0], &mut sink, &ExtractOptions::default())
        .await
        .unwrap();

    assert_eq!(written, body.len() as u64);
    assert_eq!(sink, body);
}

#[tokio::test]
async fn zero_local_size_quirk_uses_central_directory_size() {
    let body = b"finder wrote a zero into the local header";
    let packed = deflate(body);
    let data = ArchiveBuilder::new()
        .member("quirk.txt", 8, &packed, body.len() as u32, Some(0))
        .finish();

    let archive = connect(MemoryTransport::new(data)).await;
    let entries = archive.entries().await.unwrap();
    assert_eq!(entries[0].compressed_size, packed.len() as u64);

    let range = archive.resolve(&entries[0]).await.unwrap();
    let expected_start = 30 + "quirk.txt".len() as u64;
    assert_eq!(range.start, expected_start);
    assert_eq!(range.end, expected_start + packed.len() as u64);

    let mut sink = Vec::new();
    let written = archive
        .extract(&entries[0], &mut sink, &ExtractOptions::default())
        .await
        .unwrap();
    assert_eq!(written, body.len() as u64);
    assert_eq!(sink, body);
}

#[tokio::test]
async fn never_writes_past_uncompressed_size() {
    let body = b"exactly this much and not a byte more";
    let data = ArchiveBuilder::new()
        .member("capped.txt", 0, body, body.len() as u32, None)
        .finish();

    // The server pads every ranged body with garbage.
    let transport = MemoryTransport::new(data).with_tail_garbage(64);
    let archive = connect(transport).await;
    let entries = archive.entries().await.unwrap();

    let mut sink = Vec::new();
    let written = archive
        .extract(&entries[0], &mut sink, &ExtractOptions::default())
        .await
        .unwrap();

    assert_eq!(written, body.len() as u64);
    assert_eq!(sink, body);
}

#[tokio::test]
async fn directory_entry_extracts_without_a_fetch() {
    let data = ArchiveBuilder::new().directory("empty/").finish();

    let transport = std::sync::Arc::new(MemoryTransport::new(data));
    let archive = RemoteZip::connect(transport.clone(), location())
        .await
        .unwrap();
    let entries = archive.entries().await.unwrap();
    assert!(entries[0].is_directory);

    // entries() issued the tail and directory fetches
    let gets_before = transport.ranged_gets();

    let mut sink = Vec::new();
    let written = archive
        .extract(&entries[0], &mut sink, &ExtractOptions::default())
        .await
        .unwrap();

    assert_eq!(written, 0);
    assert!(sink.is_empty());
    assert_eq!(transport.ranged_gets(), gets_before);
}

#[tokio::test]
async fn local_header_signature_mismatch_is_detected() {
    let body = b"payload";
    let mut data = ArchiveBuilder::new()
        .member("bad.bin", 0, body, body.len() as u32, None)
        .finish();
    // Corrupt the local header signature; the central directory still
    // points at offset 0.
    data[0..4].copy_from_slice(b"JUNK");

    let archive = connect(MemoryTransport::new(data)).await;
    let entries = archive.entries().await.unwrap();

    let err = archive.resolve(&entries[0]).await.unwrap_err();
    assert!(matches!(err, Error::SignatureMismatch { offset: 0 }));
}

#[tokio::test]
async fn missing_end_record_is_terminal() {
    let data = vec![0x42u8; 2000];
    let archive = connect(MemoryTransport::new(data)).await;

    let err = archive.locate_directory().await.unwrap_err();
    assert!(matches!(err, Error::SignatureNotFound));
}

#[tokio::test]
async fn unsupported_method_is_rejected() {
    let body = b"bzip2 maybe";
    let data = ArchiveBuilder::new()
        .member("odd.bin", 12, body, body.len() as u32, None)
        .finish();

    let archive = connect(MemoryTransport::new(data)).await;
    let entries = archive.entries().await.unwrap();
    assert_eq!(entries[0].method, CompressionMethod::Unknown(12));

    let mut sink = Vec::new();
    let err = archive
        .extract(&entries[0], &mut sink, &ExtractOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::UnsupportedMethod(12)));
}

#[tokio::test]
async fn probe_follows_redirects_and_keeps_user_agent() {
    let data = ArchiveBuilder::new().directory("d/").finish();
    let transport = MemoryTransport::new(data)
        .with_redirects(vec!["http://cdn.test/a.zip", "http://cdn2.test/a.zip"]);

    let archive = RemoteZip::connect(
        std::sync::Arc::new(transport),
        location().with_user_agent("zipgrab-test"),
    )
    .await
    .unwrap();

    assert_eq!(archive.location().url().host_str(), Some("cdn2.test"));
    assert_eq!(archive.location().user_agent(), Some("zipgrab-test"));
    assert!(archive.archive_length() > 0);
}

#[tokio::test]
async fn endless_redirects_are_capped() {
    let mut transport = MemoryTransport::new(vec![0u8; 10]);
    transport.always_redirect = true;

    let err = RemoteZip::connect(std::sync::Arc::new(transport), location())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::TooManyRedirects { .. }));
}

#[tokio::test]
async fn zero_length_archive_is_size_unavailable() {
    let transport = std::sync::Arc::new(MemoryTransport::new(Vec::new()));
    let err = RemoteZip::connect(transport, location()).await.unwrap_err();
    assert!(matches!(err, Error::SizeUnavailable { .. }));
}

#[tokio::test]
async fn cancellation_between_chunks_is_cooperative() {
    let body = vec![0x5Au8; 16 * 1024];
    let data = ArchiveBuilder::new()
        .member("big.bin", 0, &body, body.len() as u32, None)
        .finish();

    let archive = connect(MemoryTransport::new(data)).await;
    let entries = archive.entries().await.unwrap();

    let cancel = CancellationToken::new();
    cancel.cancel();
    let options = ExtractOptions {
        cancel,
        ..Default::default()
    };

    let mut sink = Vec::new();
    let err = archive
        .extract(&entries[0], &mut sink, &options)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Cancelled));
    // The pending cancellation tripped before the first chunk.
    assert!(sink.is_empty());
}

#[derive(Default)]
struct RecordingListener {
    calls: Mutex<Vec<(u64, usize, u64)>>,
}

impl ProgressListener for RecordingListener {
    fn on_progress(&self, total_written: u64, chunk_len: usize, total_size: u64) {
        self.calls.lock().unwrap().push((total_written, chunk_len, total_size));
    }
}

#[tokio::test]
async fn progress_listener_sees_running_totals() {
    let body = vec![0x33u8; 5000];
    let data = ArchiveBuilder::new()
        .member("p.bin", 0, &body, body.len() as u32, None)
        .finish();

    let archive = connect(MemoryTransport::new(data)).await;
    let entries = archive.entries().await.unwrap();

    let listener = RecordingListener::default();
    let options = ExtractOptions {
        progress: Some(&listener),
        ..Default::default()
    };

    let mut sink = Vec::new();
    archive
        .extract(&entries[0], &mut sink, &options)
        .await
        .unwrap();

    let calls = listener.calls.lock().unwrap().clone();
    assert!(calls.len() >= 3); // 5000 bytes in 2048-byte chunks
    let mut running = 0u64;
    for (total, delta, size) in &calls {
        running += *delta as u64;
        assert_eq!(*total, running);
        assert_eq!(*size, body.len() as u64);
    }
    assert_eq!(running, body.len() as u64);
}

#[tokio::test]
async fn extracts_to_a_file_sink() {
    let body = b"lands on disk";
    let data = ArchiveBuilder::new()
        .member("disk.txt", 0, body, body.len() as u32, None)
        .finish();

    let archive = connect(MemoryTransport::new(data)).await;
    let entries = archive.entries().await.unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("disk.txt");
    let mut file = tokio::fs::File::create(&path).await.unwrap();
    archive
        .extract(&entries[0], &mut file, &ExtractOptions::default())
        .await
        .unwrap();
    drop(file);

    assert_eq!(std::fs::read(&path).unwrap(), body);
}
