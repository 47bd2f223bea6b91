//! Skin patterns: layered genes the renderer turns into a texture.

use crate::atlas::{Atlas, AtlasSlot, RandomSource};
use crate::buffer::{BinBuffer, FormatError};

/// Upper bound on pattern layers in a record.
pub const MAX_LAYERS: u8 = 8;

/// Palette image dimensions the pattern renderer samples colours from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Patterns {
    pub palette_width: u8,
    pub palette_height: u8,
}

impl Patterns {
    pub fn new(palette_width: u8, palette_height: u8) -> Self {
        Self {
            palette_width: palette_width.max(1),
            palette_height: palette_height.max(1),
        }
    }

    /// Pull a sample back inside the palette image.
    pub fn clamp(&self, sample: PaletteSample) -> PaletteSample {
        PaletteSample {
            x: sample.x.min(self.palette_width - 1),
            y: sample.y.min(self.palette_height - 1),
        }
    }
}

impl Default for Patterns {
    fn default() -> Self {
        Self::new(16, 16)
    }
}

/// Coordinates of a colour in the palette image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaletteSample {
    pub x: u8,
    pub y: u8,
}

impl PaletteSample {
    fn serialize(&self, buffer: &mut BinBuffer) {
        buffer.write_u8(self.x);
        buffer.write_u8(self.y);
    }

    /// Read a sample, rejecting coordinates outside the palette image.
    fn deserialize(buffer: &mut BinBuffer, patterns: &Patterns) -> Result<Self, FormatError> {
        let x = buffer.read_u8()?;
        let y = buffer.read_u8()?;

        if x >= patterns.palette_width {
            return Err(FormatError::OutOfRange {
                field: "palette x",
                value: x as u32,
            });
        }
        if y >= patterns.palette_height {
            return Err(FormatError::OutOfRange {
                field: "palette y",
                value: y as u32,
            });
        }

        Ok(Self { x, y })
    }
}

/// Body shape genes: how the silhouette tapers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapeBody {
    pub center_power: u8,
    pub radius_power: u8,
    pub rear_power: u8,
}

/// A pattern layer drawn over the base colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    Spots {
        palette: PaletteSample,
        scale: u8,
        stretch: u8,
        threshold: u8,
        x: u8,
        y: u8,
        roughness: u8,
    },
    Stripes {
        palette: PaletteSample,
        scale: u8,
        distortion: u8,
        roughness: u8,
        threshold: u8,
        slant: u8,
        suppression: u8,
        focus: u8,
        power: u8,
    },
}

impl Layer {
    const TAG_SPOTS: u8 = 0;
    const TAG_STRIPES: u8 = 1;

    pub fn palette(&self) -> PaletteSample {
        match *self {
            Layer::Spots { palette, .. } | Layer::Stripes { palette, .. } => palette,
        }
    }

    fn serialize(&self, buffer: &mut BinBuffer) {
        match *self {
            Layer::Spots {
                palette,
                scale,
                stretch,
                threshold,
                x,
                y,
                roughness,
            } => {
                buffer.write_u8(Self::TAG_SPOTS);
                palette.serialize(buffer);
                for gene in [scale, stretch, threshold, x, y, roughness] {
                    buffer.write_u8(gene);
                }
            }
            Layer::Stripes {
                palette,
                scale,
                distortion,
                roughness,
                threshold,
                slant,
                suppression,
                focus,
                power,
            } => {
                buffer.write_u8(Self::TAG_STRIPES);
                palette.serialize(buffer);
                for gene in [
                    scale,
                    distortion,
                    roughness,
                    threshold,
                    slant,
                    suppression,
                    focus,
                    power,
                ] {
                    buffer.write_u8(gene);
                }
            }
        }
    }

    fn deserialize(buffer: &mut BinBuffer, patterns: &Patterns) -> Result<Self, FormatError> {
        match buffer.read_u8()? {
            Self::TAG_SPOTS => Ok(Layer::Spots {
                palette: PaletteSample::deserialize(buffer, patterns)?,
                scale: buffer.read_u8()?,
                stretch: buffer.read_u8()?,
                threshold: buffer.read_u8()?,
                x: buffer.read_u8()?,
                y: buffer.read_u8()?,
                roughness: buffer.read_u8()?,
            }),
            Self::TAG_STRIPES => Ok(Layer::Stripes {
                palette: PaletteSample::deserialize(buffer, patterns)?,
                scale: buffer.read_u8()?,
                distortion: buffer.read_u8()?,
                roughness: buffer.read_u8()?,
                threshold: buffer.read_u8()?,
                slant: buffer.read_u8()?,
                suppression: buffer.read_u8()?,
                focus: buffer.read_u8()?,
                power: buffer.read_u8()?,
            }),
            tag => Err(FormatError::OutOfRange {
                field: "pattern layer kind",
                value: tag as u32,
            }),
        }
    }
}

/// A fish's complete skin pattern and the atlas slot it is drawn in.
#[derive(Debug, PartialEq)]
pub struct Pattern {
    pub base: PaletteSample,
    pub shape_body: ShapeBody,
    pub shape_fin: u8,
    pub layers: Vec<Layer>,
    slot: Option<AtlasSlot>,
}

impl Pattern {
    pub fn new(base: PaletteSample, shape_body: ShapeBody, shape_fin: u8, layers: Vec<Layer>) -> Self {
        Self {
            base,
            shape_body,
            shape_fin,
            layers,
            slot: None,
        }
    }

    pub fn slot(&self) -> Option<&AtlasSlot> {
        self.slot.as_ref()
    }

    /// Reserve a slot if needed and draw the pattern into it. A slot left
    /// over from a previous atlas is replaced.
    pub fn attach(&mut self, atlas: &mut impl Atlas, random_source: &RandomSource) {
        if !self.slot.as_ref().is_some_and(|slot| atlas.owns(slot)) {
            self.slot = Some(atlas.allocate());
        }

        atlas.write(self, random_source);
    }

    /// Give the slot back. Calling this again is a no-op.
    pub fn release(&mut self, atlas: &mut impl Atlas) {
        if let Some(slot) = self.slot.take() {
            atlas.free(slot);
        }
    }

    pub fn serialize(&self, buffer: &mut BinBuffer) {
        self.base.serialize(buffer);
        buffer.write_u8(self.shape_body.center_power);
        buffer.write_u8(self.shape_body.radius_power);
        buffer.write_u8(self.shape_body.rear_power);
        buffer.write_u8(self.shape_fin);

        // Readers refuse more than MAX_LAYERS
        let layers = &self.layers[..self.layers.len().min(MAX_LAYERS as usize)];
        buffer.write_u8(layers.len() as u8);

        for layer in layers {
            layer.serialize(buffer);
        }
    }

    /// Read a pattern; the result has no atlas slot yet. Palette samples
    /// must lie inside `patterns`.
    pub fn deserialize(buffer: &mut BinBuffer, patterns: &Patterns) -> Result<Self, FormatError> {
        let base = PaletteSample::deserialize(buffer, patterns)?;
        let shape_body = ShapeBody {
            center_power: buffer.read_u8()?,
            radius_power: buffer.read_u8()?,
            rear_power: buffer.read_u8()?,
        };
        let shape_fin = buffer.read_u8()?;
        let layer_count = buffer.read_u8()?;

        if layer_count > MAX_LAYERS {
            return Err(FormatError::OutOfRange {
                field: "pattern layer count",
                value: layer_count as u32,
            });
        }

        let layers = (0..layer_count)
            .map(|_| Layer::deserialize(buffer, patterns))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::new(base, shape_body, shape_fin, layers))
    }
}
