use musee_media::{AudioPolicy, MediaError, MediaSettings, MediaStore, Upload};
use musee_types::AssetKind;

fn store_in(dir: &std::path::Path) -> MediaStore {
    MediaStore::new(dir, MediaSettings::default())
}

#[tokio::test]
async fn stores_under_kind_directory() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(dir.path());

    let upload = Upload::new("radeau.jpg", b"\xFF\xD8\xFFjpeg".to_vec());
    let path = store
        .store_asset(AssetKind::TargetImage, &upload)
        .await
        .expect("store should succeed");

    assert!(path.starts_with("targets/"), "unexpected path {path}");
    assert!(path.ends_with(".jpg"));
    let written = std::fs::read(store.resolve(&path)).unwrap();
    assert_eq!(written, upload.bytes);
}

#[tokio::test]
async fn concurrent_uploads_with_same_name_do_not_collide() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(dir.path());
    let a = Upload::new("photo.png", vec![1u8; 16]);
    let b = Upload::new("photo.png", vec![2u8; 16]);

    let (first, second) = tokio::join!(
        store.store_asset(AssetKind::OverlayImage, &a),
        store.store_asset(AssetKind::OverlayImage, &b),
    );
    let (first, second) = (first.unwrap(), second.unwrap());

    assert_ne!(first, second);
    assert_eq!(std::fs::read(store.resolve(&first)).unwrap(), a.bytes);
    assert_eq!(std::fs::read(store.resolve(&second)).unwrap(), b.bytes);
}

#[tokio::test]
async fn missing_optional_upload_yields_empty_reference() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(dir.path());

    let path = store.maybe_store_asset(AssetKind::Audio, None).await.unwrap();
    assert_eq!(path, "");
    assert!(!dir.path().join("audio").exists(), "nothing written");

    let upload = Upload::new("guide.mp3", vec![0x49, 0x44, 0x33]);
    let path = store
        .maybe_store_asset(AssetKind::Audio, Some(&upload))
        .await
        .unwrap();
    assert!(path.starts_with("audio/") && path.ends_with(".mp3"));
}

#[tokio::test]
async fn rejected_audio_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(dir.path());

    let err = store
        .store_asset(AssetKind::Audio, &Upload::new("guide.ogg", vec![1, 2]))
        .await
        .unwrap_err();
    assert!(matches!(err, MediaError::Validation(_)));
    assert!(!dir.path().join("audio").exists());

    let permissive = MediaStore::new(
        dir.path(),
        MediaSettings {
            audio_policy: AudioPolicy::AcceptAny,
            ..MediaSettings::default()
        },
    );
    assert!(permissive
        .store_asset(AssetKind::Audio, &Upload::new("guide.ogg", vec![1, 2]))
        .await
        .is_ok());
}

#[tokio::test]
async fn unwritable_root_is_a_storage_error() {
    let dir = tempfile::tempdir().unwrap();
    // A regular file where the media root should be.
    let blocker = dir.path().join("media");
    std::fs::write(&blocker, b"not a directory").unwrap();
    let store = store_in(&blocker);

    let err = store
        .store_asset(AssetKind::TargetImage, &Upload::new("a.jpg", vec![1]))
        .await
        .unwrap_err();
    assert!(matches!(err, MediaError::Storage { .. }), "got {err:?}");
}
