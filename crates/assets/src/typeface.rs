use glam::Vec2;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::AssetError;

/// A font in the typeface JSON layout: glyph outlines as compact command
/// strings in font units, scaled by `size / resolution` when laid out.
#[derive(Debug, Clone, Deserialize)]
pub struct Typeface {
    #[serde(rename = "familyName", default)]
    pub family_name: String,
    pub resolution: f32,
    #[serde(rename = "boundingBox", default)]
    pub bounding_box: BoundingBox,
    #[serde(rename = "underlineThickness", default)]
    pub underline_thickness: f32,
    pub glyphs: HashMap<String, Glyph>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct BoundingBox {
    #[serde(rename = "xMin", default)]
    pub x_min: f32,
    #[serde(rename = "xMax", default)]
    pub x_max: f32,
    #[serde(rename = "yMin", default)]
    pub y_min: f32,
    #[serde(rename = "yMax", default)]
    pub y_max: f32,
}

/// One glyph: horizontal advance plus an optional outline.
#[derive(Debug, Clone, Deserialize)]
pub struct Glyph {
    /// Horizontal advance in font units.
    pub ha: f32,
    /// Outline commands; absent for blank glyphs such as space.
    #[serde(default)]
    pub o: Option<String>,
}

/// A decoded outline command, in font units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    MoveTo(Vec2),
    LineTo(Vec2),
    QuadTo { ctrl: Vec2, to: Vec2 },
    CubicTo { ctrl1: Vec2, ctrl2: Vec2, to: Vec2 },
}

impl Glyph {
    /// Decode the outline string.
    ///
    /// Curve commands list the end point first: `q x y cx cy` and
    /// `b x y c1x c1y c2x c2y`. Tokens other than `m`, `l`, `q`, `b` (such as
    /// a trailing `z`) are skipped.
    pub fn commands(&self) -> Result<Vec<PathCommand>, AssetError> {
        let Some(outline) = &self.o else {
            return Ok(Vec::new());
        };
        let mut tokens = outline.split_whitespace();
        let mut commands = Vec::new();
        while let Some(token) = tokens.next() {
            let cmd = match token {
                "m" => PathCommand::MoveTo(point(&mut tokens)?),
                "l" => PathCommand::LineTo(point(&mut tokens)?),
                "q" => {
                    let to = point(&mut tokens)?;
                    let ctrl = point(&mut tokens)?;
                    PathCommand::QuadTo { ctrl, to }
                }
                "b" => {
                    let to = point(&mut tokens)?;
                    let ctrl1 = point(&mut tokens)?;
                    let ctrl2 = point(&mut tokens)?;
                    PathCommand::CubicTo { ctrl1, ctrl2, to }
                }
                other if other.parse::<f32>().is_ok() => {
                    return Err(AssetError::Typeface(format!(
                        "coordinate {other:?} without a command"
                    )));
                }
                _ => continue,
            };
            commands.push(cmd);
        }
        Ok(commands)
    }

    /// Flatten the outline into closed contours.
    ///
    /// Each curve contributes `curve_segments` points; coordinates are mapped
    /// with `p * scale + offset`.
    pub fn contours(
        &self,
        scale: f32,
        offset: Vec2,
        curve_segments: u32,
    ) -> Result<Vec<Vec<Vec2>>, AssetError> {
        let segments = curve_segments.max(1);
        let map = |p: Vec2| p * scale + offset;
        let mut contours = Vec::new();
        let mut current: Vec<Vec2> = Vec::new();
        let mut pen = Vec2::ZERO;

        for cmd in self.commands()? {
            match cmd {
                PathCommand::MoveTo(p) => {
                    if current.len() >= 3 {
                        contours.push(std::mem::take(&mut current));
                    }
                    current.clear();
                    pen = map(p);
                    current.push(pen);
                }
                PathCommand::LineTo(p) => {
                    pen = map(p);
                    current.push(pen);
                }
                PathCommand::QuadTo { ctrl, to } => {
                    let (c, end) = (map(ctrl), map(to));
                    for i in 1..=segments {
                        let t = i as f32 / segments as f32;
                        let s = 1.0 - t;
                        current.push(pen * (s * s) + c * (2.0 * s * t) + end * (t * t));
                    }
                    pen = end;
                }
                PathCommand::CubicTo { ctrl1, ctrl2, to } => {
                    let (c1, c2, end) = (map(ctrl1), map(ctrl2), map(to));
                    for i in 1..=segments {
                        let t = i as f32 / segments as f32;
                        let s = 1.0 - t;
                        current.push(
                            pen * (s * s * s)
                                + c1 * (3.0 * s * s * t)
                                + c2 * (3.0 * s * t * t)
                                + end * (t * t * t),
                        );
                    }
                    pen = end;
                }
            }
        }
        if current.len() >= 3 {
            contours.push(current);
        }
        Ok(contours)
    }
}

fn point<'a>(tokens: &mut impl Iterator<Item = &'a str>) -> Result<Vec2, AssetError> {
    let mut coord = || -> Result<f32, AssetError> {
        let token = tokens
            .next()
            .ok_or_else(|| AssetError::Typeface("outline ends mid-command".into()))?;
        token
            .parse::<f32>()
            .map_err(|_| AssetError::Typeface(format!("bad coordinate {token:?}")))
    };
    let x = coord()?;
    let y = coord()?;
    Ok(Vec2::new(x, y))
}

impl Typeface {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, AssetError> {
        let file = File::open(path)?;
        let face: Self = serde_json::from_reader(BufReader::new(file))?;
        face.check()?;
        Ok(face)
    }

    pub fn from_json(json: &str) -> Result<Self, AssetError> {
        let face: Self = serde_json::from_str(json)?;
        face.check()?;
        Ok(face)
    }

    fn check(&self) -> Result<(), AssetError> {
        if !(self.resolution.is_finite() && self.resolution > 0.0) {
            return Err(AssetError::Typeface(format!(
                "resolution must be positive, got {}",
                self.resolution
            )));
        }
        Ok(())
    }

    pub fn glyph(&self, c: char) -> Option<&Glyph> {
        let mut buf = [0u8; 4];
        self.glyphs.get(c.encode_utf8(&mut buf) as &str)
    }

    /// Distance between baselines at the given size.
    pub fn line_height(&self, size: f32) -> f32 {
        let bb = &self.bounding_box;
        (bb.y_max - bb.y_min + self.underline_thickness) * size / self.resolution
    }

    /// Lay out `text` and flatten every glyph outline into contours.
    ///
    /// `\n` starts a new line. Characters without a glyph use `?` when the
    /// font has one and are skipped (with a warning) otherwise.
    pub fn layout(
        &self,
        text: &str,
        size: f32,
        curve_segments: u32,
    ) -> Result<Vec<Vec<Vec2>>, AssetError> {
        let scale = size / self.resolution;
        let line_height = self.line_height(size);
        let mut offset = Vec2::ZERO;
        let mut contours = Vec::new();

        for c in text.chars() {
            if c == '\n' {
                offset.x = 0.0;
                offset.y -= line_height;
                continue;
            }
            let Some(glyph) = self.glyph(c).or_else(|| self.glyph('?')) else {
                tracing::warn!(
                    "character {c:?} is missing from typeface {:?}",
                    self.family_name
                );
                continue;
            };
            contours.extend(glyph.contours(scale, offset, curve_segments)?);
            offset.x += glyph.ha * scale;
        }
        Ok(contours)
    }
}
