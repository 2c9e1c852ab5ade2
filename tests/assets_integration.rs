use std::fs;

use mhdqa_gui::assets::{StaticAssets, img_to_bytes, img_to_html, load_styles};
use mhdqa_gui::config::AssetsConfig;
use mhdqa_gui::error::AppError;

#[test]
fn test_image_markup_embeds_base64() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("logo.png");
    fs::write(&path, b"\x89PNG").expect("write logo");

    assert_eq!(img_to_bytes(&path).expect("encode"), "iVBORw==");
    assert_eq!(
        img_to_html(&path).expect("markup"),
        "<img src='data:image/png;base64,iVBORw==' class='img-fluid'>"
    );
}

#[test]
fn test_image_markup_is_always_png() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("logo.jpg");
    fs::write(&path, b"\xFF\xD8\xFF").expect("write logo");

    let html = img_to_html(&path).expect("markup");
    assert!(html.starts_with("<img src='data:image/png;base64,/9j/"));
}

#[test]
fn test_missing_image_is_asset_not_found() {
    let dir = tempfile::tempdir().expect("tempdir");
    let result = img_to_html(dir.path().join("nope.png"));
    assert!(matches!(result, Err(AppError::AssetNotFound { .. })));
}

#[test]
fn test_styles_are_read_verbatim() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("styles.md");
    let markup = "<style>\n.chat-row { display: flex; }\n</style>\n";
    fs::write(&path, markup).expect("write styles");

    assert_eq!(load_styles(&path).expect("styles"), markup);
}

#[test]
fn test_static_assets_degrade_to_notices() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(dir.path().join("styles.md"), "<style></style>").expect("write styles");

    let assets = StaticAssets::load(&AssetsConfig {
        static_dir: dir.path().to_path_buf(),
        logo_path: dir.path().join("logo.png"),
        styles_path: dir.path().join("styles.md"),
    });

    assert!(!assets.logo.is_ready());
    assert!(assets.logo.html().contains("ASSET_NOT_FOUND"));
    assert!(assets.styles.is_ready());
    assert_eq!(assets.styles.html(), "<style></style>");
}
