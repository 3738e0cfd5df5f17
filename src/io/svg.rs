// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Standalone SVG export.
//!
//! Writes a [`Scene`] as one SVG document. The image is embedded as a data
//! URI so the file has no external references and can be rasterized as is.

use anyhow::{Context, Result};
use std::fmt::Write as _;
use std::path::Path;

use crate::layout::labels::TextAlign;
use crate::models::annotation::AnnotationKind;
use crate::render::color::Rgba;
use crate::render::scene::{ConnectorStyle, LabelItem, Scene, SceneItem, ShapeItem};

const FONT_FAMILY: &str = "Helvetica, Arial, sans-serif";

/// Render `scene` to SVG markup. `image_href` is the `href` of the image.
pub fn scene_to_svg(scene: &Scene, image_href: &str) -> Result<String> {
    let mut svg = String::new();
    writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" width="{w:.0}" height="{h:.0}" viewBox="0 0 {w:.2} {h:.2}">"#,
        w = scene.width,
        h = scene.height
    )?;

    for item in &scene.items {
        match item {
            SceneItem::Background { rect, color } => {
                writeln!(
                    svg,
                    r#"  <rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" {}/>"#,
                    rect.x,
                    rect.y,
                    rect.width,
                    rect.height,
                    paint("fill", *color)
                )?;
            }
            SceneItem::Image { rect } => {
                writeln!(
                    svg,
                    r#"  <image x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" href="{href}" xlink:href="{href}" preserveAspectRatio="none"/>"#,
                    rect.x,
                    rect.y,
                    rect.width,
                    rect.height,
                    href = escape_xml(image_href)
                )?;
            }
            SceneItem::Connector {
                path,
                color,
                width,
                style,
                ..
            } => {
                let dash = match style {
                    ConnectorStyle::Solid => String::new(),
                    ConnectorStyle::Dashed => format!(r#" stroke-dasharray="{:.1} {:.1}""#, width * 4.0, width * 3.0),
                    ConnectorStyle::Dotted => format!(r#" stroke-dasharray="{:.1} {:.1}" stroke-linecap="round""#, width, width * 2.5),
                };
                writeln!(
                    svg,
                    r#"  <path d="{}" fill="none" {} stroke-width="{:.2}"{}/>"#,
                    path.to_svg_data(),
                    paint("stroke", *color),
                    width,
                    dash
                )?;
            }
            SceneItem::Shape(shape) => write_shape(&mut svg, shape)?,
            SceneItem::Badge {
                center,
                radius,
                number,
                fill,
                text,
                ..
            } => {
                writeln!(
                    svg,
                    r#"  <circle cx="{:.2}" cy="{:.2}" r="{:.2}" {}/>"#,
                    center.x,
                    center.y,
                    radius,
                    paint("fill", *fill)
                )?;
                writeln!(
                    svg,
                    r#"  <text x="{:.2}" y="{:.2}" font-family="{}" font-size="{:.1}" font-weight="bold" text-anchor="middle" dominant-baseline="central" {}>{}</text>"#,
                    center.x,
                    center.y,
                    FONT_FAMILY,
                    radius * 1.1,
                    paint("fill", *text),
                    number
                )?;
            }
            SceneItem::Label(label) => write_label(&mut svg, label)?,
            // Editing chrome.
            SceneItem::Preview(_) | SceneItem::Handle { .. } => {}
        }
    }

    writeln!(svg, "</svg>")?;
    Ok(svg)
}

/// Render and write `scene` to `path`.
pub fn export_svg(scene: &Scene, image_href: &str, path: &Path) -> Result<()> {
    let svg = scene_to_svg(scene, image_href)?;
    std::fs::write(path, svg).with_context(|| format!("Failed to write {}", path.display()))?;
    log::info!("Exported SVG to {}", path.display());
    Ok(())
}

fn write_shape(svg: &mut String, shape: &ShapeItem) -> Result<()> {
    let paint_attrs = if shape.filled() {
        paint("fill", shape.color)
    } else {
        format!(
            r#"fill="none" {} stroke-width="{:.2}""#,
            paint("stroke", shape.color),
            shape.stroke_width
        )
    };
    let r = shape.rect;
    match shape.kind {
        AnnotationKind::Rectangle => writeln!(
            svg,
            r#"  <rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" {}/>"#,
            r.x, r.y, r.width, r.height, paint_attrs
        )?,
        AnnotationKind::Circle | AnnotationKind::Dot => {
            let c = r.center();
            writeln!(
                svg,
                r#"  <ellipse cx="{:.2}" cy="{:.2}" rx="{:.2}" ry="{:.2}" {}/>"#,
                c.x,
                c.y,
                r.width / 2.0,
                r.height / 2.0,
                paint_attrs
            )?
        }
        AnnotationKind::Freehand => {
            let mut points = String::new();
            for p in &shape.points {
                write!(points, "{:.2},{:.2} ", p.x, p.y)?;
            }
            writeln!(
                svg,
                r#"  <polyline points="{}" {} stroke-linecap="round" stroke-linejoin="round"/>"#,
                points.trim_end(),
                paint_attrs
            )?
        }
    }
    Ok(())
}

fn write_label(svg: &mut String, label: &LabelItem) -> Result<()> {
    let anchor = match label.align {
        TextAlign::Left => "start",
        TextAlign::Right => "end",
    };
    let style = if label.placeholder {
        r#" font-style="italic""#
    } else {
        ""
    };
    for line in &label.lines {
        writeln!(
            svg,
            r#"  <text x="{:.2}" y="{:.2}" font-family="{}" font-size="{:.1}" text-anchor="{}" dominant-baseline="hanging" {}{}>{}</text>"#,
            line.x,
            line.top,
            FONT_FAMILY,
            label.font_size,
            anchor,
            paint("fill", label.color),
            style,
            escape_xml(&line.text)
        )?;
    }
    Ok(())
}

/// `fill`/`stroke` attribute with opacity when translucent.
fn paint(attr: &str, color: Rgba) -> String {
    if color.a == 255 {
        format!(r#"{attr}="{}""#, color.to_hex())
    } else {
        format!(
            r#"{attr}="{}" {attr}-opacity="{:.3}""#,
            color.to_hex(),
            color.opacity()
        )
    }
}

fn escape_xml(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::config::LayoutConfig;
    use crate::layout::compute_layout;
    use crate::models::annotation::{Annotation, Point, Size};
    use crate::render::scene::{build_scene, RenderStyle, SceneOptions};

    fn sample_scene(style: &RenderStyle) -> Scene {
        let annotations = vec![
            Annotation {
                id: 1,
                kind: AnnotationKind::Rectangle,
                number: 1,
                position: Point::new(50.0, 50.0),
                size: Size::new(100.0, 70.0),
                points: Vec::new(),
                color: "#e53e3e".to_string(),
                text: "Tom & Jerry <3".to_string(),
                label_position: None,
            },
            Annotation {
                id: 2,
                kind: AnnotationKind::Freehand,
                number: 2,
                position: Point::ZERO,
                size: Size::default(),
                points: vec![Point::new(600.0, 300.0), Point::new(650.0, 320.0)],
                color: "blue".to_string(),
                text: String::new(),
                label_position: None,
            },
        ];
        let config = LayoutConfig::default();
        let layout = compute_layout(&annotations, Size::new(800.0, 600.0), &config).unwrap();
        let options = SceneOptions {
            selection: Some(1),
            show_handles: true,
            ..Default::default()
        };
        build_scene(&annotations, &layout, &config, style, &options)
    }

    #[test]
    fn test_svg_is_self_contained() {
        let scene = sample_scene(&RenderStyle::default());
        let svg = scene_to_svg(&scene, "data:image/png;base64,AAAA").unwrap();
        assert!(svg.starts_with("<svg "));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert!(svg.contains(r#"href="data:image/png;base64,AAAA""#));
        assert_eq!(svg.matches("<path ").count(), 2);
        assert!(svg.contains("<polyline points=\""));
    }

    #[test]
    fn test_label_text_escaped() {
        let svg = scene_to_svg(&sample_scene(&RenderStyle::default()), "x").unwrap();
        assert!(svg.contains("Tom &amp; Jerry &lt;3"));
        assert!(svg.contains("Add note…"));
        assert!(svg.contains(r#"text-anchor="end""#));
    }

    #[test]
    fn test_dashed_connectors() {
        let style = RenderStyle {
            connector_style: ConnectorStyle::Dashed,
            ..Default::default()
        };
        let svg = scene_to_svg(&sample_scene(&style), "x").unwrap();
        assert_eq!(svg.matches("stroke-dasharray").count(), 2);
    }

    #[test]
    fn test_handles_not_exported() {
        let scene = sample_scene(&RenderStyle::default());
        assert!(scene.items.iter().any(|i| matches!(i, SceneItem::Handle { .. })));
        let svg = scene_to_svg(&scene, "x").unwrap();
        // Background, shape rectangle only; handles would add eight more.
        assert_eq!(svg.matches("<rect ").count(), 2);
    }

    #[test]
    fn test_export_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.svg");
        export_svg(&sample_scene(&RenderStyle::default()), "x", &path).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("viewBox"));
    }
}
