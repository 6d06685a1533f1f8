//! Verification report rendering. Produces the PDF offered for download
//! on the result step and attached to the dispatch email.

use anyhow::{bail, Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use rp_api_types::VerificationRecord;

const PAGE_WIDTH: f32 = 612.0;
const PAGE_HEIGHT: f32 = 792.0;
const MARGIN: f32 = 54.0;
const LEADING: f32 = 18.0;
const PHOTO_MAX_WIDTH: f32 = 240.0;
const PHOTO_MAX_HEIGHT: f32 = 180.0;

pub struct ReportInput<'a> {
    pub verified: bool,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub contact_email: &'a str,
    pub records: &'a [VerificationRecord],
    /// Captured ID photo as a data URL. Embedded when it is a JPEG;
    /// other encodings render a text-only report.
    pub id_photo: Option<&'a str>,
}

/// Render the verification report as PDF bytes.
pub fn render_report(input: &ReportInput<'_>) -> Result<Vec<u8>> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let bold_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
    });

    let mut resources = dictionary! {
        "Font" => dictionary! { "F1" => font_id, "F2" => bold_id },
    };

    let mut operations = text_operations(input);

    if let Some(jpeg) = input.id_photo.and_then(jpeg_from_data_url) {
        if let Some((width, height)) = jpeg_dimensions(&jpeg) {
            let image_id = doc.add_object(Stream::new(
                dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Image",
                    "Width" => width as i64,
                    "Height" => height as i64,
                    "ColorSpace" => "DeviceRGB",
                    "BitsPerComponent" => 8,
                    "Filter" => "DCTDecode",
                },
                jpeg,
            ));
            resources.set("XObject", dictionary! { "IdPhoto" => image_id });
            operations.extend(photo_operations(width, height));
        }
    }

    let content = Content { operations };
    let content_id = doc.add_object(Stream::new(
        dictionary! {},
        content.encode().context("encode page content")?,
    ));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "Resources" => resources,
        "MediaBox" => vec![
            0.into(),
            0.into(),
            PAGE_WIDTH.into(),
            PAGE_HEIGHT.into(),
        ],
    });

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).context("serialize report")?;
    Ok(bytes)
}

fn text_operations(input: &ReportInput<'_>) -> Vec<Operation> {
    let mut ops = vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec!["F2".into(), 18.into()]),
        Operation::new("TL", vec![LEADING.into()]),
        Operation::new(
            "Td",
            vec![MARGIN.into(), (PAGE_HEIGHT - MARGIN).into()],
        ),
        Operation::new(
            "Tj",
            vec![Object::string_literal("RentProof Identity Verification Report")],
        ),
        Operation::new("T*", vec![]),
        Operation::new("Tf", vec!["F1".into(), 11.into()]),
    ];

    let mut line = |text: String| {
        ops.push(Operation::new("T*", vec![]));
        ops.push(Operation::new("Tj", vec![Object::string_literal(text)]));
    };

    let name = format!("{} {}", input.first_name, input.last_name);
    line(format!("Applicant: {}", name.trim()));
    line(format!("Contact: {}", input.contact_email));
    line(String::new());

    let verdict = if input.verified {
        "Result: VERIFIED"
    } else {
        "Result: VERIFICATION FAILED"
    };
    line(verdict.to_owned());
    line(String::new());

    if input.records.is_empty() {
        line("No per-field verification detail was returned.".to_owned());
    } else {
        line("Verification detail:".to_owned());
        for record in input.records {
            let flag = if record.passed { "pass" } else { "fail" };
            line(format!("  {}: {}", record.name, flag));
            for probability in &record.probability {
                line(format!(
                    "      {}: {:.2}%",
                    probability.kind,
                    probability.score * 100.0
                ));
            }
        }
    }

    ops.push(Operation::new("ET", vec![]));
    ops
}

/// Place the ID photo in the lower-left corner, scaled to fit.
fn photo_operations(width: u32, height: u32) -> Vec<Operation> {
    let scale = (PHOTO_MAX_WIDTH / width as f32).min(PHOTO_MAX_HEIGHT / height as f32);
    let draw_w = width as f32 * scale;
    let draw_h = height as f32 * scale;
    vec![
        Operation::new("q", vec![]),
        Operation::new(
            "cm",
            vec![
                draw_w.into(),
                0.into(),
                0.into(),
                draw_h.into(),
                MARGIN.into(),
                MARGIN.into(),
            ],
        ),
        Operation::new("Do", vec!["IdPhoto".into()]),
        Operation::new("Q", vec![]),
    ]
}

/// Decode a `data:image/jpeg;base64,...` URL. Other mime types are not
/// embeddable here and yield `None`.
fn jpeg_from_data_url(data_url: &str) -> Option<Vec<u8>> {
    let rest = data_url.strip_prefix("data:image/jpeg;base64,")
        .or_else(|| data_url.strip_prefix("data:image/jpg;base64,"))?;
    STANDARD.decode(rest.trim()).ok()
}

/// Read pixel dimensions from a JPEG stream by walking its segment
/// markers to the first start-of-frame.
pub fn jpeg_dimensions(bytes: &[u8]) -> Option<(u32, u32)> {
    if bytes.len() < 4 || bytes[0] != 0xFF || bytes[1] != 0xD8 {
        return None;
    }
    let mut pos = 2;
    while pos + 4 <= bytes.len() {
        if bytes[pos] != 0xFF {
            return None;
        }
        let marker = bytes[pos + 1];
        // Standalone markers carry no length.
        if (0xD0..=0xD9).contains(&marker) || marker == 0x01 {
            pos += 2;
            continue;
        }
        let length = u16::from_be_bytes([bytes[pos + 2], bytes[pos + 3]]) as usize;
        if length < 2 {
            return None;
        }
        let is_sof = matches!(marker, 0xC0..=0xCF) && !matches!(marker, 0xC4 | 0xC8 | 0xCC);
        if is_sof {
            if pos + 9 > bytes.len() {
                return None;
            }
            let height = u16::from_be_bytes([bytes[pos + 5], bytes[pos + 6]]) as u32;
            let width = u16::from_be_bytes([bytes[pos + 7], bytes[pos + 8]]) as u32;
            return Some((width, height));
        }
        pos += 2 + length;
    }
    None
}

/// Base64 body for the dispatch request.
pub fn encode_report(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decode a dispatched report body back into PDF bytes.
pub fn decode_report(encoded: &str) -> Result<Vec<u8>> {
    let bytes = STANDARD.decode(encoded).context("decode report body")?;
    if !bytes.starts_with(b"%PDF") {
        bail!("report body is not a PDF");
    }
    Ok(bytes)
}
