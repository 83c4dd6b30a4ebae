//! Tests for the Page Translator: image placement, resource sharing and
//! interpreter failures.

mod common;

use common::{Op, ScriptedInterpreter, ScriptedPage, assert_approx};
use pdf2ofd_core::geometry::Boundary;
use pdf2ofd_core::interp::PageInfo;
use pdf2ofd_core::model::{
    Color, GraphicsState, ImageCodec, ImageData, PixelFormat, RenderingMode, Rgb8, WindingRule,
};
use pdf2ofd_core::ofd::PageObject;
use pdf2ofd_core::translate::translate_page;
use pdf2ofd_core::{ConversionContext, Diagnostic, PageCanvas, PageEventSink, PageFrame};

fn raster() -> ImageData {
    ImageData::Raster {
        width: 2,
        height: 2,
        format: PixelFormat::Rgb8,
        pixels: vec![
            255, 0, 0, 0, 255, 0, //
            0, 0, 255, 255, 255, 255,
        ],
    }
}

// ============================================================================
// Images
// ============================================================================

#[test]
fn test_image_fills_ctm_unit_square() {
    let ctx = ConversionContext::default();
    let mut canvas = PageCanvas::new(&ctx, PageFrame::with_scale(0, 300.0, 200.0, 1.0));
    let state = GraphicsState {
        ctm: (100.0, 0.0, 0.0, 50.0, 10.0, 20.0),
        ..GraphicsState::default()
    };
    canvas.on_image(&state, &raster());

    let page = canvas.into_page();
    let image = page.layer.objects()[0].as_image().unwrap();
    assert_eq!(image.boundary, Boundary::new(10.0, 130.0, 100.0, 50.0));
    assert_eq!(image.ctm, (100.0, 0.0, 0.0, 50.0, 0.0, 0.0));
}

#[test]
fn test_image_placement_is_scaled() {
    let ctx = ConversionContext::default();
    let mut canvas = PageCanvas::new(&ctx, PageFrame::with_scale(0, 400.0, 400.0, 0.5));
    let state = GraphicsState {
        ctm: (100.0, 0.0, 0.0, 100.0, 40.0, 60.0),
        ..GraphicsState::default()
    };
    canvas.on_image(&state, &raster());

    let page = canvas.into_page();
    let image = page.layer.objects()[0].as_image().unwrap();
    assert_eq!(image.boundary, Boundary::new(20.0, 120.0, 50.0, 50.0));
}

#[test]
fn test_identical_images_share_resource() {
    let ctx = ConversionContext::default();
    let mut canvas = PageCanvas::new(&ctx, PageFrame::with_scale(0, 100.0, 100.0, 1.0));
    let mut state = GraphicsState {
        ctm: (10.0, 0.0, 0.0, 10.0, 0.0, 0.0),
        ..GraphicsState::default()
    };
    canvas.on_image(&state, &raster());
    state.ctm = (10.0, 0.0, 0.0, 10.0, 50.0, 50.0);
    canvas.on_image(&state, &raster());

    let page = canvas.into_page();
    let images: Vec<_> = page.layer.iter().filter_map(PageObject::as_image).collect();
    assert_eq!(images.len(), 2);
    assert_ne!(images[0].id, images[1].id);
    assert_eq!(images[0].resource_id, images[1].resource_id);

    let (_, registry, _) = ctx.into_parts();
    let manifest = registry.into_manifest();
    assert_eq!(manifest.multimedia.len(), 1);
    assert_eq!(manifest.files.len(), 1);
    assert_eq!(manifest.multimedia[0].id, images[0].resource_id);
    assert!(manifest.multimedia[0].file.ends_with(".png"));
}

#[test]
fn test_encoded_jpeg_passes_through() {
    let ctx = ConversionContext::default();
    let mut canvas = PageCanvas::new(&ctx, PageFrame::with_scale(0, 100.0, 100.0, 1.0));
    let state = GraphicsState::default();
    let jpeg = vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10];
    canvas.on_image(
        &state,
        &ImageData::Encoded {
            codec: ImageCodec::Jpeg,
            bytes: jpeg.clone(),
        },
    );
    assert_eq!(canvas.layer().len(), 1);

    let (_, registry, _) = ctx.into_parts();
    let manifest = registry.into_manifest();
    let (name, bytes) = manifest.files.first().unwrap();
    assert!(name.ends_with(".jpg"));
    assert_eq!(bytes, &jpeg);
}

#[test]
fn test_bad_raster_is_dropped() {
    let ctx = ConversionContext::default();
    let mut canvas = PageCanvas::new(&ctx, PageFrame::with_scale(3, 100.0, 100.0, 1.0));
    let state = GraphicsState::default();
    canvas.on_image(
        &state,
        &ImageData::Raster {
            width: 4,
            height: 4,
            format: PixelFormat::Rgba8,
            pixels: vec![0; 10],
        },
    );
    canvas.on_move_to(0.0, 0.0);
    canvas.on_line_to(10.0, 10.0);
    let mut state = state;
    canvas.on_stroke(&mut state);

    // the page carries on after the failed image
    let page = canvas.into_page();
    assert_eq!(page.layer.len(), 1);
    assert!(page.layer.objects()[0].as_path().is_some());
    let diagnostics = ctx.diagnostics();
    assert!(matches!(
        diagnostics.as_slice(),
        [Diagnostic::ImageEncodeFailure { page: 3, .. }]
    ));
}

// ============================================================================
// Page translation
// ============================================================================

#[test]
fn test_frame_scales_page_to_target_width() {
    let frame = PageFrame::fit(0, PageInfo { width: 595.0, height: 842.0 }, 210.0).unwrap();
    assert_eq!(frame.scale, 0.35);
    assert_approx(frame.target_width(), 208.25);
    assert_approx(frame.target_height(), 294.7);
    assert!(PageFrame::fit(0, PageInfo { width: 0.0, height: 842.0 }, 210.0).is_none());
    assert!(PageFrame::fit(0, PageInfo { width: 595.0, height: -1.0 }, 210.0).is_none());
}

#[test]
fn test_interpreter_failure_keeps_partial_layer() {
    let interp = ScriptedInterpreter::new(vec![ScriptedPage::new(
        100.0,
        100.0,
        vec![
            Op::Rect(0.0, 0.0, 10.0, 10.0),
            Op::Fill(WindingRule::NonZero),
            Op::Fail("bad operator".into()),
            Op::Rect(0.0, 0.0, 20.0, 20.0),
            Op::Fill(WindingRule::NonZero),
        ],
    )]);
    let ctx = ConversionContext::default();
    let page = translate_page(&ctx, &interp, PageFrame::with_scale(0, 100.0, 100.0, 1.0));

    assert_eq!(page.layer.len(), 1);
    assert_eq!(page.physical_box, Boundary::new(0.0, 0.0, 100.0, 100.0));
    let diagnostics = ctx.diagnostics();
    assert_eq!(diagnostics.len(), 1);
    match &diagnostics[0] {
        Diagnostic::PageFailed { page, reason } => {
            assert_eq!(*page, 0);
            assert!(reason.contains("bad operator"));
        }
        other => panic!("unexpected diagnostic {other:?}"),
    }
}

#[test]
fn test_open_run_is_flushed_at_page_end() {
    let ctx = ConversionContext::default();
    let mut canvas = PageCanvas::new(&ctx, PageFrame::with_scale(0, 100.0, 100.0, 1.0));
    let font = common::ascii_font(1, "Helvetica");
    let mut state = GraphicsState::default();
    state.text.font_size = 10.0;
    canvas.on_begin_text(b"A");
    canvas.on_glyph(
        &state,
        &pdf2ofd_core::GlyphEvent {
            trm: (10.0, 0.0, 0.0, 10.0, 10.0, 50.0),
            font,
            code: 65,
            displacement: (0.5, 0.0),
        },
    );
    // no end-text event
    let page = canvas.into_page();
    assert_eq!(page.layer.len(), 1);
    assert_eq!(page.layer.objects()[0].as_text().unwrap().text_code.content, "A");
}

#[test]
fn test_unterminated_runs_keep_their_style() {
    let ctx = ConversionContext::default();
    let mut canvas = PageCanvas::new(&ctx, PageFrame::with_scale(0, 100.0, 100.0, 1.0));
    let font = common::ascii_font(1, "Helvetica");
    let mut state = GraphicsState::default();
    state.text.font_size = 10.0;
    state.text.rendering_mode = RenderingMode::Stroke;
    state.stroke_color = Some(Color::Rgb(1.0, 0.0, 0.0));
    let glyph = |code: u32, y: f64| pdf2ofd_core::GlyphEvent {
        trm: (10.0, 0.0, 0.0, 10.0, 10.0, y),
        font: font.clone(),
        code,
        displacement: (0.5, 0.0),
    };

    canvas.on_begin_text(b"A");
    canvas.on_glyph(&state, &glyph(65, 50.0));
    // next text-show begins without an end event
    canvas.on_begin_text(b"B");
    canvas.on_glyph(&state, &glyph(66, 30.0));
    let page = canvas.into_page();

    assert_eq!(page.layer.len(), 2);
    for (object, content) in page.layer.iter().zip(["A", "B"]) {
        let text = object.as_text().unwrap();
        assert_eq!(text.text_code.content, content);
        assert!(text.stroke);
        assert!(!text.fill);
        assert_eq!(text.stroke_color, Some(Rgb8 { r: 255, g: 0, b: 0 }));
    }
}
