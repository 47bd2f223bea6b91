//! The species catalog.

use crate::samplers::Sampler;

use super::blueprint::{
    Blueprint, BodyBlueprint, FinsBlueprint, LayerBlueprint, PaletteSampleBlueprint,
    PatternBlueprint, ShapeBodyBlueprint, TailBlueprint,
};

/// Index of a blueprint in [`BLUEPRINTS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlueprintId(u8);

impl BlueprintId {
    /// Only indices inside the catalog are accepted.
    pub fn new(index: usize) -> Option<Self> {
        (index < BLUEPRINTS.len()).then_some(Self(index as u8))
    }

    pub fn index(&self) -> usize {
        self.0 as usize
    }

    pub fn blueprint(&self) -> &'static Blueprint {
        &BLUEPRINTS[self.index()]
    }

    pub fn all() -> impl Iterator<Item = BlueprintId> {
        (0..BLUEPRINTS.len()).map(|index| Self(index as u8))
    }
}

static GOLD_SPOTS: [LayerBlueprint; 1] = [LayerBlueprint::Spots {
    palette: PaletteSampleBlueprint::new(Sampler::linear(6.0, 8.0), Sampler::linear(6.0, 8.0)),
    scale: Sampler::linear(50.0, 100.0),
    stretch: Sampler::linear(120.0, 136.0),
    threshold: Sampler::linear(80.0, 100.0),
    x: Sampler::linear(120.0, 136.0),
    y: Sampler::linear(120.0, 136.0),
    roughness: Sampler::linear(30.0, 50.0),
}];

static STRIPES: [LayerBlueprint; 1] = [LayerBlueprint::Stripes {
    palette: PaletteSampleBlueprint::new(Sampler::linear(4.0, 6.0), Sampler::linear(4.0, 6.0)),
    scale: Sampler::linear(210.0, 240.0),
    distortion: Sampler::linear(70.0, 100.0),
    roughness: Sampler::linear(100.0, 130.0),
    threshold: Sampler::linear(120.0, 136.0),
    slant: Sampler::linear(130.0, 160.0),
    suppression: Sampler::linear(80.0, 100.0),
    focus: Sampler::linear(120.0, 136.0),
    power: Sampler::linear(30.0, 60.0),
}];

pub static BLUEPRINTS: [Blueprint; 2] = [
    Blueprint {
        name: "gold spotted",
        school_size: Sampler::plateau(2.0, 3.0, 4.0, 1.0),
        growth_speed: Sampler::linear(170.0, 200.0),
        mating_frequency: Sampler::linear(180.0, 200.0),
        offspring_count: Sampler::linear(4.0, 6.0),
        lifetime: Sampler::linear(25000.0, 30000.0),
        body: BodyBlueprint::new(
            Sampler::plateau(70.0, 90.0, 120.0, 5.0),
            Sampler::linear(100.0, 120.0),
            FinsBlueprint::STANDARD,
            TailBlueprint::new(Sampler::linear(120.0, 150.0), Sampler::linear(100.0, 120.0)),
            PatternBlueprint::new(
                PaletteSampleBlueprint::new(Sampler::linear(3.0, 5.0), Sampler::linear(10.0, 11.0)),
                ShapeBodyBlueprint::new(
                    Sampler::linear(220.0, 240.0),
                    Sampler::linear(120.0, 140.0),
                    Sampler::linear(150.0, 160.0),
                ),
                Sampler::linear(60.0, 90.0),
                &GOLD_SPOTS,
            ),
        ),
    },
    Blueprint {
        name: "striped",
        school_size: Sampler::plateau(1.0, 2.0, 5.0, 1.0),
        growth_speed: Sampler::linear(130.0, 170.0),
        mating_frequency: Sampler::linear(150.0, 160.0),
        offspring_count: Sampler::linear(2.0, 4.0),
        lifetime: Sampler::linear(20000.0, 25000.0),
        body: BodyBlueprint::new(
            Sampler::linear(150.0, 180.0),
            Sampler::linear(80.0, 100.0),
            FinsBlueprint::STANDARD,
            TailBlueprint::new(Sampler::linear(100.0, 140.0), Sampler::linear(180.0, 220.0)),
            PatternBlueprint::new(
                PaletteSampleBlueprint::new(Sampler::linear(7.0, 9.0), Sampler::linear(12.0, 14.0)),
                ShapeBodyBlueprint::new(
                    Sampler::linear(50.0, 100.0),
                    Sampler::linear(170.0, 200.0),
                    Sampler::linear(160.0, 170.0),
                ),
                Sampler::linear(200.0, 230.0),
                &STRIPES,
            ),
        ),
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atlas::{RandomSource, SlotAtlas};
    use crate::components::{Layer, Patterns};
    use crate::math::Vec2;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_blueprint_ids() {
        assert!(BlueprintId::new(0).is_some());
        assert!(BlueprintId::new(BLUEPRINTS.len()).is_none());
        assert_eq!(BlueprintId::all().count(), BLUEPRINTS.len());
    }

    #[test]
    fn test_spawned_genes_lie_in_ranges() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut atlas = SlotAtlas::new(8);
        let source = RandomSource::new(5);
        let patterns = Patterns::default();

        for blueprint in BLUEPRINTS.iter() {
            for _ in 0..50 {
                let fish = blueprint.spawn(
                    Vec2::ZERO,
                    Vec2::new(0.0, 1.0),
                    &mut atlas,
                    &patterns,
                    &source,
                    &mut rng,
                );

                assert!(blueprint.growth_speed.covers(fish.genes.growth_speed as f32));
                assert!(blueprint.mating_frequency.covers(fish.genes.mating_frequency as f32));
                assert!(blueprint.offspring_count.covers(fish.genes.offspring_count as f32));
                assert!(blueprint.lifetime.covers(fish.genes.lifetime as f32));
                assert!(blueprint.body.length.covers(fish.body.length as f32));
                assert!(blueprint.body.tail.skin.covers(fish.body.tail.skin as f32));
                assert_eq!(fish.body.pattern.layers.len(), blueprint.body.pattern.layers.len());
                assert!(fish.body.pattern.slot().is_some());
                assert_eq!(fish.age(), 0);
                assert!(blueprint.school_size(&mut rng) >= 1);
            }
        }
    }

    #[test]
    fn test_palette_samples_are_clamped() {
        let mut rng = StdRng::seed_from_u64(12);
        let mut atlas = SlotAtlas::new(8);
        let source = RandomSource::new(5);
        let patterns = Patterns::new(4, 4);

        let fish = BLUEPRINTS[1].spawn(
            Vec2::ZERO,
            Vec2::new(1.0, 0.0),
            &mut atlas,
            &patterns,
            &source,
            &mut rng,
        );

        assert!(fish.body.pattern.base.x < 4 && fish.body.pattern.base.y < 4);
        for layer in &fish.body.pattern.layers {
            assert!(matches!(layer, Layer::Stripes { .. }));
            assert!(layer.palette().x < 4 && layer.palette().y < 4);
        }
    }

    #[test]
    fn test_spawning_is_deterministic() {
        let spawn = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut atlas = SlotAtlas::new(8);
            BLUEPRINTS[0].spawn(
                Vec2::ZERO,
                Vec2::new(1.0, 0.0),
                &mut atlas,
                &Patterns::default(),
                &RandomSource::new(1),
                &mut rng,
            )
        };

        let (a, b) = (spawn(3), spawn(3));
        assert_eq!(a.genes, b.genes);
        assert_eq!(a.body.pattern.layers, b.body.pattern.layers);
    }
}
