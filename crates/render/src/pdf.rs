//! Serialization of laid-out pages into a PDF file.

use pdf_writer::{Content, Finish, Name, Pdf, Rect, Ref, Str, TextStr};

use crate::canvas::{A4_HEIGHT, A4_WIDTH, Op, Page, Rgb};
use crate::logo::Logo;
use crate::metrics::{Font, encode};

const LOGO: Name<'static> = Name(b"Im1");
const WATERMARK_STATE: Name<'static> = Name(b"GS1");

/// Low-opacity copy of the logo centered on every page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Watermark {
    /// Side of the square the logo is fitted into.
    pub extent: f32,
    pub opacity: f32,
}

pub(crate) fn write_pdf(pages: &[Page], logo: Option<&Logo>, watermark: Watermark, title: &str) -> Vec<u8> {
    let mut alloc = Ref::new(1);
    let catalog_id = alloc.bump();
    let tree_id = alloc.bump();
    let info_id = alloc.bump();
    let font_ids: Vec<(Font, Ref)> = Font::ALL.iter().map(|f| (*f, alloc.bump())).collect();
    let logo_ids = logo.map(|l| LogoIds {
        image: alloc.bump(),
        mask: l.alpha.as_ref().map(|_| alloc.bump()),
        state: alloc.bump(),
    });
    let page_ids: Vec<(Ref, Ref)> = pages.iter().map(|_| (alloc.bump(), alloc.bump())).collect();

    let mut pdf = Pdf::new();
    pdf.catalog(catalog_id).pages(tree_id);
    pdf.pages(tree_id)
        .kids(page_ids.iter().map(|(page, _)| *page))
        .count(page_ids.len() as i32);
    pdf.document_info(info_id)
        .title(TextStr(title))
        .producer(TextStr("billforge"));

    for (font, id) in &font_ids {
        pdf.type1_font(*id)
            .base_font(Name(font.base_font()))
            .encoding_predefined(Name(b"WinAnsiEncoding"));
    }

    if let (Some(logo), Some(ids)) = (logo, logo_ids) {
        let mut image = pdf.image_xobject(ids.image, &logo.rgb);
        image.width(logo.width as i32);
        image.height(logo.height as i32);
        image.color_space().device_rgb();
        image.bits_per_component(8);
        if let Some(mask) = ids.mask {
            image.s_mask(mask);
        }
        image.finish();

        if let (Some(mask_id), Some(alpha)) = (ids.mask, logo.alpha.as_ref()) {
            let mut mask = pdf.image_xobject(mask_id, alpha);
            mask.width(logo.width as i32);
            mask.height(logo.height as i32);
            mask.color_space().device_gray();
            mask.bits_per_component(8);
            mask.finish();
        }

        pdf.ext_graphics(ids.state)
            .non_stroking_alpha(watermark.opacity);
    }

    let watermark = logo.map(|l| placement(l, watermark.extent));
    for (page, (page_id, content_id)) in pages.iter().zip(&page_ids) {
        let mut page_obj = pdf.page(*page_id);
        page_obj.media_box(Rect::new(0.0, 0.0, A4_WIDTH, A4_HEIGHT));
        page_obj.parent(tree_id);
        page_obj.contents(*content_id);

        let mut resources = page_obj.resources();
        let mut fonts = resources.fonts();
        for (font, id) in &font_ids {
            fonts.pair(Name(font.resource_name()), *id);
        }
        fonts.finish();
        if let Some(ids) = logo_ids {
            resources.x_objects().pair(LOGO, ids.image);
            resources.ext_g_states().pair(WATERMARK_STATE, ids.state);
        }
        resources.finish();
        page_obj.finish();

        pdf.stream(*content_id, &page_content(page, watermark));
    }

    pdf.finish()
}

#[derive(Debug, Clone, Copy)]
struct LogoIds {
    image: Ref,
    mask: Option<Ref>,
    state: Ref,
}

/// Logo fitted into a centered `extent` square: `[x, y, w, h]`.
fn placement(logo: &Logo, extent: f32) -> [f32; 4] {
    let (w, h) = logo.fit(extent);
    [(A4_WIDTH - w) / 2.0, (A4_HEIGHT - h) / 2.0, w, h]
}

fn page_content(page: &Page, watermark: Option<[f32; 4]>) -> Vec<u8> {
    let mut content = Content::new();

    if let Some([x, y, w, h]) = watermark {
        content.save_state();
        content.set_parameters(WATERMARK_STATE);
        content.transform([w, 0.0, 0.0, h, x, y]);
        content.x_object(LOGO);
        content.restore_state();
    }

    for op in &page.ops {
        match op {
            Op::Text {
                x,
                y,
                font,
                size,
                color: Rgb(r, g, b),
                text,
            } => {
                content.set_fill_rgb(*r, *g, *b);
                content.begin_text();
                content.set_font(Name(font.resource_name()), *size);
                content.next_line(*x, *y);
                content.show(Str(&encode(text)));
                content.end_text();
            }
            Op::FillRect {
                x,
                y,
                w,
                h,
                color: Rgb(r, g, b),
            } => {
                content.set_fill_rgb(*r, *g, *b);
                content.rect(*x, *y, *w, *h);
                content.fill_nonzero();
            }
            Op::StrokeRect { x, y, w, h } => {
                let Rgb(r, g, b) = Rgb::GRID;
                content.set_stroke_rgb(r, g, b);
                content.set_line_width(0.5);
                content.rect(*x, *y, *w, *h);
                content.stroke();
            }
            Op::Logo { x, y, w, h } => {
                content.save_state();
                content.transform([*w, 0.0, 0.0, *h, *x, *y]);
                content.x_object(LOGO);
                content.restore_state();
            }
        }
    }

    content.finish()
}
