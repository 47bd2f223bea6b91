//! Blueprints - immutable genetic templates fish are spawned from.
//!
//! Every gene of a fish is drawn once from the matching sampler of its
//! species blueprint. Blueprints only hold `Copy` samplers and `'static`
//! slices, so a whole species can be declared in a `static`.

use rand::Rng;

use crate::atlas::{Atlas, RandomSource};
use crate::components::{
    Body, Fins, Fish, Genes, Layer, PaletteSample, Pattern, Patterns, ShapeBody, Tail,
};
use crate::math::Vec2;
use crate::samplers::Sampler;

/// Where in the palette a colour is taken from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaletteSampleBlueprint {
    pub x: Sampler,
    pub y: Sampler,
}

impl PaletteSampleBlueprint {
    pub const fn new(x: Sampler, y: Sampler) -> Self {
        Self { x, y }
    }

    fn spawn(&self, patterns: &Patterns, rng: &mut impl Rng) -> PaletteSample {
        patterns.clamp(PaletteSample {
            x: self.x.draw_u8(rng),
            y: self.y.draw_u8(rng),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeBodyBlueprint {
    pub center_power: Sampler,
    pub radius_power: Sampler,
    pub rear_power: Sampler,
}

impl ShapeBodyBlueprint {
    pub const fn new(center_power: Sampler, radius_power: Sampler, rear_power: Sampler) -> Self {
        Self {
            center_power,
            radius_power,
            rear_power,
        }
    }

    fn spawn(&self, rng: &mut impl Rng) -> ShapeBody {
        ShapeBody {
            center_power: self.center_power.draw_u8(rng),
            radius_power: self.radius_power.draw_u8(rng),
            rear_power: self.rear_power.draw_u8(rng),
        }
    }
}

/// Template for one pattern layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LayerBlueprint {
    Spots {
        palette: PaletteSampleBlueprint,
        scale: Sampler,
        stretch: Sampler,
        threshold: Sampler,
        x: Sampler,
        y: Sampler,
        roughness: Sampler,
    },
    Stripes {
        palette: PaletteSampleBlueprint,
        scale: Sampler,
        distortion: Sampler,
        roughness: Sampler,
        threshold: Sampler,
        slant: Sampler,
        suppression: Sampler,
        focus: Sampler,
        power: Sampler,
    },
}

impl LayerBlueprint {
    fn spawn(&self, patterns: &Patterns, rng: &mut impl Rng) -> Layer {
        match self {
            LayerBlueprint::Spots {
                palette,
                scale,
                stretch,
                threshold,
                x,
                y,
                roughness,
            } => Layer::Spots {
                palette: palette.spawn(patterns, rng),
                scale: scale.draw_u8(rng),
                stretch: stretch.draw_u8(rng),
                threshold: threshold.draw_u8(rng),
                x: x.draw_u8(rng),
                y: y.draw_u8(rng),
                roughness: roughness.draw_u8(rng),
            },
            LayerBlueprint::Stripes {
                palette,
                scale,
                distortion,
                roughness,
                threshold,
                slant,
                suppression,
                focus,
                power,
            } => Layer::Stripes {
                palette: palette.spawn(patterns, rng),
                scale: scale.draw_u8(rng),
                distortion: distortion.draw_u8(rng),
                roughness: roughness.draw_u8(rng),
                threshold: threshold.draw_u8(rng),
                slant: slant.draw_u8(rng),
                suppression: suppression.draw_u8(rng),
                focus: focus.draw_u8(rng),
                power: power.draw_u8(rng),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PatternBlueprint {
    pub base: PaletteSampleBlueprint,
    pub shape_body: ShapeBodyBlueprint,
    pub shape_fin: Sampler,
    pub layers: &'static [LayerBlueprint],
}

impl PatternBlueprint {
    pub const fn new(
        base: PaletteSampleBlueprint,
        shape_body: ShapeBodyBlueprint,
        shape_fin: Sampler,
        layers: &'static [LayerBlueprint],
    ) -> Self {
        Self {
            base,
            shape_body,
            shape_fin,
            layers,
        }
    }

    fn spawn(&self, patterns: &Patterns, rng: &mut impl Rng) -> Pattern {
        let base = self.base.spawn(patterns, rng);
        let shape_body = self.shape_body.spawn(rng);
        let shape_fin = self.shape_fin.draw_u8(rng);
        let layers = self
            .layers
            .iter()
            .map(|layer| layer.spawn(patterns, rng))
            .collect();

        Pattern::new(base, shape_body, shape_fin, layers)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FinsBlueprint {
    pub length: Sampler,
}

impl FinsBlueprint {
    /// Fins every species shares.
    pub const STANDARD: Self = Self {
        length: Sampler::linear(40.0, 60.0),
    };
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TailBlueprint {
    pub length: Sampler,
    pub skin: Sampler,
}

impl TailBlueprint {
    pub const fn new(length: Sampler, skin: Sampler) -> Self {
        Self { length, skin }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyBlueprint {
    pub length: Sampler,
    pub radius: Sampler,
    pub fins: FinsBlueprint,
    pub tail: TailBlueprint,
    pub pattern: PatternBlueprint,
}

impl BodyBlueprint {
    pub const fn new(
        length: Sampler,
        radius: Sampler,
        fins: FinsBlueprint,
        tail: TailBlueprint,
        pattern: PatternBlueprint,
    ) -> Self {
        Self {
            length,
            radius,
            fins,
            tail,
            pattern,
        }
    }

    fn spawn(&self, patterns: &Patterns, rng: &mut impl Rng) -> Body {
        Body {
            length: self.length.draw_u8(rng).max(1),
            radius: self.radius.draw_u8(rng),
            fins: Fins {
                length: self.fins.length.draw_u8(rng),
            },
            tail: Tail {
                length: self.tail.length.draw_u8(rng),
                skin: self.tail.skin.draw_u8(rng),
            },
            pattern: self.pattern.spawn(patterns, rng),
        }
    }
}

/// A species.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Blueprint {
    pub name: &'static str,
    pub school_size: Sampler,
    pub growth_speed: Sampler,
    pub mating_frequency: Sampler,
    pub offspring_count: Sampler,
    pub lifetime: Sampler,
    pub body: BodyBlueprint,
}

impl Blueprint {
    /// Create a fish of this species at `position` heading `direction`,
    /// with its pattern drawn into the atlas.
    pub fn spawn(
        &self,
        position: Vec2,
        direction: Vec2,
        atlas: &mut impl Atlas,
        patterns: &Patterns,
        random_source: &RandomSource,
        rng: &mut impl Rng,
    ) -> Fish {
        let genes = Genes {
            growth_speed: self.growth_speed.draw_u8(rng),
            mating_frequency: self.mating_frequency.draw_u8(rng),
            offspring_count: self.offspring_count.draw_u8(rng),
            lifetime: self.lifetime.draw_u16(rng).max(1),
        };
        let body = self.body.spawn(patterns, rng);

        let mut fish = Fish::new(body, genes, position, direction);
        fish.attach(atlas, random_source);

        fish
    }

    /// Number of fish in a newly primed school, at least one.
    pub fn school_size(&self, rng: &mut impl Rng) -> u8 {
        self.school_size.draw_u8(rng).max(1)
    }
}
