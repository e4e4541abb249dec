use fitroom::catalog::{CatalogStore, FsCatalogStore};
use fitroom::compose::encode_png;
use fitroom::loader;
use fitroom::segmentation::Mask;
use fitroom::session::{Garment, Preview, TryOnSession};
use fitroom::store::{FsStore, HistoryStore};
use image::{Rgb, RgbImage, Rgba, RgbaImage};
use tempfile::tempdir;

fn full_mask(width: u32, height: u32) -> Mask {
    Mask::new(width, height, vec![255; (width * height) as usize])
}

#[test]
fn empty_catalog_still_previews_the_masked_photo() {
    let dir = tempdir().unwrap();
    let catalog = FsCatalogStore::new(dir.path());

    let items = catalog.list().expect("list");
    assert!(items.is_empty());

    let mut session = TryOnSession::new();
    session.model_ready();
    let request = session
        .submit_photo(RgbImage::from_pixel(8, 8, Rgb([7, 7, 7])))
        .expect("request");
    session.complete_segmentation(request.generation, Ok(full_mask(8, 8)));

    // Nothing to select, so the preview is the segmented photo alone
    match session.preview() {
        Preview::Masked(masked) => assert_eq!(masked.dimensions(), (8, 8)),
        _ => panic!("expected masked preview"),
    }
}

#[test]
fn saved_look_round_trips_through_history() {
    let dir = tempdir().unwrap();
    let catalog = FsCatalogStore::new(dir.path());
    let store = FsStore::new(dir.path());

    let garment_png =
        encode_png(&RgbaImage::from_pixel(10, 10, Rgba([200, 0, 0, 255]))).expect("encode");
    let item = catalog
        .create("Blue T-Shirt", "T-Shirts", &garment_png)
        .expect("create");

    let mut session = TryOnSession::new();
    session.model_ready();
    let request = session
        .submit_photo(RgbImage::from_pixel(16, 24, Rgb([40, 50, 60])))
        .expect("request");
    session.complete_segmentation(request.generation, Ok(full_mask(16, 24)));

    let image = loader::load_garment(&item.image_path).expect("garment decodes");
    session.select_garment(Some(Garment {
        item: item.clone(),
        image,
    }));

    let combined = session.combined().expect("combined");
    let png = encode_png(combined).expect("encode");
    let record = store
        .record_try_on("ada", &item.id, &png)
        .expect("record try-on");

    let history = store.list_try_on_history("ada").expect("history");
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].id, record.id);
    assert_eq!(history[0].clothing_item_id, item.id);

    // The stored look is the canvas-sized composite, alpha intact
    let decoded = image::open(&history[0].image_path)
        .expect("stored look decodes")
        .to_rgba8();
    assert_eq!(decoded.dimensions(), (16, 24));
}
