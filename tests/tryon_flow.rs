// End-to-end: place tattoos over a photo, edit them, export, read the PNG back.

use image::{Rgba, RgbaImage};
use tattoo_tryon::catalog::{Catalog, Tattoo};
use tattoo_tryon::compositor::Compositor;
use tattoo_tryon::export::export_png;
use tattoo_tryon::gamma::GammaLut;
use tattoo_tryon::scene::{Action, Scene, Variant};
use tattoo_tryon::types::{FrameBuffer, Size, pack_rgb};

const SKIN: u32 = 0x00_E0_B0_90;

fn catalog(lut: &GammaLut) -> Catalog {
    Catalog::from_tattoos(vec![
        Tattoo::new("red", RgbaImage::from_pixel(40, 40, Rgba([255, 0, 0, 255])), lut),
        Tattoo::new("green", RgbaImage::from_pixel(40, 40, Rgba([0, 255, 0, 255])), lut),
    ])
}

#[test]
fn test_export_contains_background_and_last_committed_overlays() {
    let size = Size { width: 320, height: 240 };
    let lut = GammaLut::new();
    let cat = catalog(&lut);
    let mut comp = Compositor::new(size);

    // Photo smaller than the surface gets stretched.
    let mut photo = FrameBuffer::new(160, 120);
    photo.fill(SKIN);

    let mut scene = Scene::new(Variant::Studio, size);
    scene = scene.reduce(Action::AddOverlay { tattoo: 0, width: 40, height: 40 });
    scene = scene.reduce(Action::SetOpacity(1.0));
    scene = scene.reduce(Action::AddOverlay { tattoo: 1, width: 40, height: 40 });
    scene = scene.reduce(Action::SetOpacity(1.0));

    // Both start centred at (140,100); drag the green one (on top) 100px right.
    scene = scene.reduce(Action::PointerDown { x: 150.0, y: 110.0 });
    scene = scene.reduce(Action::PointerMove { x: 250.0, y: 110.0 });
    scene = scene.reduce(Action::PointerUp);
    assert_eq!(scene.selected, Some(1));
    assert_eq!((scene.overlays[1].x, scene.overlays[1].y), (240.0, 100.0));

    assert!(comp.redraw_if_dirty(&scene, Some(&photo), &cat));
    let out = comp.render_for_export(&scene, Some(&photo), &cat);
    let dir = tempfile::tempdir().unwrap();
    let path = export_png(&out, dir.path()).unwrap();

    let png = image::open(&path).unwrap().to_rgb8();
    assert_eq!(png.dimensions(), (320, 240));
    assert_eq!(png.get_pixel(5, 5).0, [0xE0, 0xB0, 0x90]);
    assert_eq!(png.get_pixel(160, 120).0, [255, 0, 0]);
    assert_eq!(png.get_pixel(260, 120).0, [0, 255, 0]);
}

#[test]
fn test_delete_then_export_drops_only_that_tattoo() {
    let size = Size { width: 200, height: 200 };
    let lut = GammaLut::new();
    let cat = catalog(&lut);
    let comp = Compositor::new(size);

    let mut scene = Scene::new(Variant::Studio, size);
    scene = scene.reduce(Action::AddOverlay { tattoo: 0, width: 40, height: 40 });
    scene = scene.reduce(Action::SetOpacity(1.0));
    scene = scene.reduce(Action::AddOverlay { tattoo: 1, width: 40, height: 40 });
    scene = scene.reduce(Action::DeleteSelected);

    assert_eq!(scene.overlays.len(), 1);
    assert_eq!(scene.selected, None);

    let out = comp.render_for_export(&scene, None, &cat);
    assert_eq!(out.pixels[100 * 200 + 100], pack_rgb(255, 0, 0));
}
