//! File upload rules.

use std::io::Write;

use nebula_rules::{FileUpload, Value};
use pretty_assertions::assert_eq;
use rstest::rstest;

use crate::{check, field};

const PNG: &[u8] = &[0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n', 0, 0, 0, 13];
const TWO_MB: usize = 2 * 1024 * 1024;

fn upload(name: &str, content: &[u8]) -> Value {
    Value::File(FileUpload::in_memory(name, content.to_vec()))
}

#[rstest]
#[case(TWO_MB - 1, false)]
#[case(TWO_MB, false)]
#[case(TWO_MB + 1, true)]
#[tokio::test]
async fn size_limit_is_inclusive(#[case] len: usize, #[case] rejected: bool) {
    let report = check(vec![field("avatar", upload("a.bin", &vec![0u8; len]), "size:2mb")]).await;
    assert_eq!(report.contains("avatar"), rejected);
    if rejected {
        assert_eq!(report.get("avatar").unwrap().key, "size.file_mb");
        assert_eq!(
            report.message("avatar"),
            Some("The avatar field may not be greater than 2 megabytes.")
        );
    }
}

#[tokio::test]
async fn terabyte_limit_never_rejects() {
    let report = check(vec![field("dump", upload("d.bin", &[1, 2, 3]), "size:1tb")]).await;
    assert!(report.is_empty());
}

#[tokio::test]
async fn unmatched_size_spec_is_ignored() {
    let report = check(vec![field("dump", upload("d.bin", &[1, 2, 3]), "size:2 MB")]).await;
    assert!(report.is_empty());
}

#[tokio::test]
async fn image_rules_sniff_content() {
    let report = check(vec![
        field("photo", upload("photo.png", PNG), "required|image"),
        field("scan", upload("scan.png", b"plain text, not an image"), "image"),
        field("icon", upload("icon.png", PNG), "image:jpg,jpeg"),
    ])
    .await;

    assert!(!report.contains("photo"));
    assert_eq!(
        report.message("scan"),
        Some("The scan field must be an image.")
    );
    assert_eq!(
        report.message("icon"),
        Some("The icon field must be an image of type: jpg,jpeg.")
    );
}

#[tokio::test]
async fn on_disk_uploads_are_read_for_mimes() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"%PDF-1.7\n%binary").unwrap();
    let size = file.as_file().metadata().unwrap().len();
    let pdf = FileUpload::on_disk("contract.pdf", file.path(), size);

    let report = check(vec![
        field("contract", pdf.clone(), "file|mimes:pdf"),
        field("notes", pdf, "file:txt"),
    ])
    .await;
    assert!(!report.contains("contract"));
    assert_eq!(report.get("notes").unwrap().key, "file_type");
}

#[tokio::test]
async fn unreadable_upload_fails_file_rule() {
    let dir = tempfile::tempdir().unwrap();
    let missing = FileUpload::on_disk("gone.txt", dir.path().join("gone.txt"), 10);

    let report = check(vec![
        field("attachment", missing.clone(), "file"),
        field("document", missing, "mimes:txt"),
    ])
    .await;
    assert_eq!(
        report.message("attachment"),
        Some("The attachment field must be a readable file.")
    );
    assert_eq!(report.get("document").unwrap().key, "mimes");
}

#[tokio::test]
async fn file_rules_apply_per_element() {
    let gallery = Value::List(vec![
        upload("a.png", PNG),
        upload("b.txt", b"hello"),
        upload("c.png", PNG),
    ]);
    let report = check(vec![field("gallery", gallery, "image")]).await;

    let items = report.get("gallery").unwrap().detail.as_list().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(
        items[0].as_message(),
        Some("The gallery (2) field must be an image.")
    );
}
